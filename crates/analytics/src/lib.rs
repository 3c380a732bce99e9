//! # Café Dashboard Analytics
//!
//! This crate computes the dashboard's aggregates (revenue, status counts,
//! best sellers, recent orders) over an order store.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Pure aggregation logic. It knows nothing about SQL; it
//!   depends only on `core-types` and on the `OrderStore` capability trait it declares.
//! - **Read-Only:** The `OrderAnalyticsReader` never mutates the store. Every call is a
//!   single logical read and can run concurrently with any other.
//!
//! ## Public API
//!
//! - `OrderAnalyticsReader`: The entry point that exposes every dashboard query.
//! - `OrderStore`: The storage capabilities the reader needs (filter, aggregate, sort/limit).
//! - `InMemoryOrderStore`: A complete in-process store, used by tests and the demo command.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod memory;
pub mod reader;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use error::AnalyticsError;
pub use memory::InMemoryOrderStore;
pub use reader::{OrderAnalyticsReader, ReaderSettings};
pub use store::{OrderFilter, OrderQuery, OrderSort, OrderStore, merge_status_counts};
