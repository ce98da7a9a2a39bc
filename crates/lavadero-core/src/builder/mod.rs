//! Engine builder.
//!
//! Assembles a [`WorkflowEngine`] from a validated configuration and a
//! set of implementation factories. The builder resolves each section's
//! primary implementation by name, runs its factory against the
//! section's TOML table and wires the resulting backends into their
//! services.

use crate::engine::WorkflowEngine;
use lavadero_config::Config;
use lavadero_geo::{GeocodeService, GeocoderFactory};
use lavadero_storage::{StorageFactory, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while building the engine.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Factory registries for all pluggable backends.
pub struct EngineFactories {
	/// Storage implementation factories keyed by name.
	pub storage_factories: HashMap<String, StorageFactory>,
	/// Geocoder implementation factories keyed by name.
	pub geocoder_factories: HashMap<String, GeocoderFactory>,
}

impl Default for EngineFactories {
	/// All implementations compiled into the workspace.
	fn default() -> Self {
		Self {
			storage_factories: lavadero_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			geocoder_factories: lavadero_geo::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}
}

/// Builder for constructing a WorkflowEngine instance.
pub struct EngineBuilder {
	config: Config,
}

impl EngineBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine, instantiating each primary backend.
	pub fn build(self, factories: EngineFactories) -> Result<WorkflowEngine, BuilderError> {
		let storage = {
			let name = &self.config.storage.primary;
			let factory = factories.storage_factories.get(name).ok_or_else(|| {
				BuilderError::Config(format!("Storage implementation '{}' not found", name))
			})?;
			let section = self
				.config
				.storage
				.implementations
				.get(name)
				.ok_or_else(|| {
					BuilderError::Config(format!("No configuration for storage '{}'", name))
				})?;
			let backend = factory(section).map_err(|e| {
				tracing::error!(component = "storage", implementation = %name, error = %e, "Failed to create backend");
				BuilderError::Config(format!("Failed to create storage '{}': {}", name, e))
			})?;
			tracing::info!(component = "storage", implementation = %name, "Loaded");
			Arc::new(StorageService::new(backend))
		};

		let geocode = {
			let name = &self.config.geocoder.primary;
			let factory = factories.geocoder_factories.get(name).ok_or_else(|| {
				BuilderError::Config(format!("Geocoder implementation '{}' not found", name))
			})?;
			let section = self
				.config
				.geocoder
				.implementations
				.get(name)
				.ok_or_else(|| {
					BuilderError::Config(format!("No configuration for geocoder '{}'", name))
				})?;
			let backend = factory(section).map_err(|e| {
				tracing::error!(component = "geocoder", implementation = %name, error = %e, "Failed to create backend");
				BuilderError::Config(format!("Failed to create geocoder '{}': {}", name, e))
			})?;
			tracing::info!(component = "geocoder", implementation = %name, "Loaded");
			Arc::new(GeocodeService::new(
				backend,
				self.config.geocoder.bias(),
				Duration::from_millis(self.config.geocoder.cooldown_ms),
			))
		};

		Ok(WorkflowEngine::new(self.config, storage, geocode))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::OrderIntake;
	use rust_decimal_macros::dec;

	fn config(storage_primary: &str) -> Config {
		format!(
			r#"
[business]
name = "Lavadero Norte"
origin_address = "Av. Rivadavia 1000, Buenos Aires"

[storage]
primary = "{storage_primary}"
[storage.implementations.memory]

[geocoder]
primary = "fixed"
[geocoder.implementations.fixed]
[geocoder.implementations.fixed.addresses]
"Av. Rivadavia 1000, Buenos Aires" = [-34.6037, -58.3816]
"#
		)
		.parse()
		.expect("test config should validate")
	}

	#[tokio::test]
	async fn builds_engine_from_config() {
		let engine = EngineBuilder::new(config("memory"))
			.build(EngineFactories::default())
			.unwrap();

		let order = engine
			.register_order(OrderIntake {
				total_amount: dec!(1000),
				..OrderIntake::default()
			})
			.await
			.unwrap();
		assert_eq!(order.nro, 1);
	}

	#[test]
	fn unknown_primary_fails_to_build() {
		// Validation requires the primary to exist in implementations, so
		// sidestep it by removing the factory instead.
		let mut factories = EngineFactories::default();
		factories.storage_factories.remove("memory");

		let result = EngineBuilder::new(config("memory")).build(factories);
		assert!(matches!(result, Err(BuilderError::Config(_))));
	}
}
