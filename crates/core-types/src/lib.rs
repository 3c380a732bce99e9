//! # Café Dashboard Core Types
//!
//! The shared vocabulary of the workspace. Every other crate speaks in terms of
//! the records and result shapes declared here.
//!
//! - `Order` / `OrderItem`: read-only records owned by the external order system.
//! - `OrderStatus`: the lifecycle value reports filter on.
//! - `DateWindow`: the half-open time interval used by revenue queries.
//! - `ItemSales`, `StatusCount`, `DashboardStats`: the shapes of aggregate results.

pub mod enums;
pub mod error;
pub mod structs;
pub mod window;

// Re-export the core types to provide a clean public API.
pub use enums::OrderStatus;
pub use error::CoreError;
pub use structs::{CustomerId, DashboardStats, ItemSales, Order, OrderId, OrderItem, StatusCount};
pub use window::DateWindow;
