//! Common types module for the lavadero workflow system.
//!
//! This module defines the core data types and structures shared by all
//! crates of the laundry order workflow and delivery-routing engine. It
//! provides a centralized location for domain types to ensure consistency
//! across all components.

/// Client directory types keyed by phone number.
pub mod client;
/// Delivery grouping types for routing stops.
pub mod delivery;
/// Geographic primitives: coordinates and search bias.
pub mod geo;
/// Order and order status types for the wash workflow.
pub mod order;
/// Registry trait for self-registering backend implementations.
pub mod registry;
/// Storage namespace keys for persisted records.
pub mod storage;
/// Configuration validation types for backend configs.
pub mod validation;

// Re-export all types for convenient access
pub use client::*;
pub use delivery::*;
pub use geo::*;
pub use order::*;
pub use registry::*;
pub use storage::*;
pub use validation::*;
