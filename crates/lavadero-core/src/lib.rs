//! Core workflow engine for the lavadero system.
//!
//! This module provides the order status workflow and delivery-routing
//! logic: optimistic status and payment updates with rollback, grouping
//! of pending deliveries by client, nearest-first route sequencing from
//! the business origin, and the builder that composes the engine from
//! pluggable storage and geocoder backends.

pub mod builder;
pub mod clients;
pub mod delivery;
pub mod engine;
pub mod routing;
pub mod state;

pub use builder::{BuilderError, EngineBuilder, EngineFactories};
pub use clients::{ClientDirectory, DirectoryError};
pub use delivery::group_for_delivery;
pub use engine::{DeliveryBoard, EngineError, OrderIntake, WorkflowEngine};
pub use routing::{navigation_url, sequence_by_distance};
pub use state::{OrderStateError, OrderStateMachine, PaymentResolution, StatusView};
