//! # Café Dashboard Database Crate
//!
//! The PostgreSQL backend of the order store. It turns each `OrderStore`
//! capability into one parameterised SQL statement.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate encapsulates all database-specific logic and
//!   exposes it through the `analytics::OrderStore` trait, so the analytics layer
//!   never sees SQL.
//! - **Read-Only:** Orders are written by the order-management system. Nothing here
//!   inserts, updates or deletes rows.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share one bounded
//!   connection pool (`PgPool`).
//!
//! ## Expected Schema
//!
//! ```sql
//! CREATE TABLE orders (
//!     id           BIGINT PRIMARY KEY,
//!     customer_id  BIGINT NOT NULL,
//!     status       TEXT NOT NULL,
//!     total_amount NUMERIC(12, 2) NOT NULL,
//!     order_date   TIMESTAMPTZ NOT NULL
//! );
//! CREATE TABLE order_items (
//!     id             BIGINT PRIMARY KEY,
//!     order_id       BIGINT NOT NULL REFERENCES orders (id),
//!     item_name      TEXT NOT NULL,
//!     quantity       INTEGER NOT NULL,
//!     price_at_order NUMERIC(12, 2) NOT NULL
//! );
//! ```
//!
//! ## Public API
//!
//! - `connect`: Establishes the connection pool from `ConnectionSettings`.
//! - `DbRepository`: Holds the pool and implements `OrderStore`.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{ConnectionSettings, connect};
pub use error::DbError;
pub use repository::DbRepository;
