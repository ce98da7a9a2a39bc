//! Configuration module for the lavadero workflow system.
//!
//! This module provides structures and utilities for managing the engine
//! configuration. It supports loading configuration from TOML files with
//! `${VAR}` environment-variable resolution and validates that all
//! required values are properly set before the engine is built.

use lavadero_types::{BoundingBox, RegionBias};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the workflow engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity and routing origin of the business.
	pub business: BusinessConfig,
	/// Configuration for the record store backend.
	pub storage: StorageConfig,
	/// Configuration for address geocoding.
	pub geocoder: GeocoderConfig,
	/// Configuration for delivery route sequencing.
	#[serde(default)]
	pub routing: RoutingConfig,
}

/// Identity and routing origin of the business.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BusinessConfig {
	/// Display name of the laundry.
	pub name: String,
	/// Free-text address of the shop, the fixed origin for all delivery
	/// routes. Geocoded once and cached across sessions.
	pub origin_address: String,
}

/// Configuration for the record store backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for address geocoding.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocoderConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Minimum delay between external lookups in milliseconds.
	/// Defaults to 1100 ms per the provider's usage policy.
	#[serde(default = "default_cooldown_ms")]
	pub cooldown_ms: u64,
	/// ISO country code biasing lookups, e.g. "ar".
	#[serde(default)]
	pub region: Option<String>,
	/// Bounding box `[west, south, east, north]` restricting lookups to
	/// the service area.
	#[serde(default)]
	pub bounding_box: Option<[f64; 4]>,
	/// Map of geocoder implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

impl GeocoderConfig {
	/// Returns the search bias assembled from region and bounding box.
	pub fn bias(&self) -> RegionBias {
		RegionBias {
			country: self.region.clone(),
			viewbox: self.bounding_box.map(|[west, south, east, north]| BoundingBox {
				west,
				south,
				east,
				north,
			}),
		}
	}
}

/// Returns the default geocoding cooldown in milliseconds.
///
/// The external provider's usage policy asks for at most roughly one
/// request per second; 1100 ms keeps a small margin.
fn default_cooldown_ms() -> u64 {
	1100
}

/// Configuration for delivery route sequencing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoutingConfig {
	/// Maximum number of intermediate waypoints in a navigation link.
	/// Defaults to 14, the external mapping provider's limit; excess
	/// stops are silently dropped from the link.
	#[serde(default = "default_max_waypoints")]
	pub max_waypoints: usize,
}

impl Default for RoutingConfig {
	fn default() -> Self {
		Self {
			max_waypoints: default_max_waypoints(),
		}
	}
}

/// Returns the default navigation-link waypoint cap.
fn default_max_waypoints() -> usize {
	14
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable,
/// supporting defaults with `${VAR_NAME:-default_value}`.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;
	for cap in re.captures_iter(input) {
		let full = cap.get(0).expect("capture 0 always present");
		let var_name = cap.get(1).expect("group 1 is mandatory").as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(d) => d.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)))
				},
			},
		};

		result.push_str(&input[last_end..full.start()]);
		result.push_str(&value);
		last_end = full.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a TOML file.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		// Validate business config
		if self.business.name.is_empty() {
			return Err(ConfigError::Validation(
				"Business name cannot be empty".into(),
			));
		}
		if self.business.origin_address.is_empty() {
			return Err(ConfigError::Validation(
				"Business origin_address cannot be empty".into(),
			));
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		// Validate geocoder config
		if self.geocoder.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one geocoder implementation must be configured".into(),
			));
		}
		if !self
			.geocoder
			.implementations
			.contains_key(&self.geocoder.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary geocoder '{}' not found in implementations",
				self.geocoder.primary
			)));
		}
		if self.geocoder.cooldown_ms < 1000 {
			return Err(ConfigError::Validation(
				"Geocoder cooldown_ms must be at least 1000".into(),
			));
		}
		if let Some(viewbox) = self.geocoder.bias().viewbox {
			if !viewbox.is_valid() {
				return Err(ConfigError::Validation(
					"Geocoder bounding_box must be [west, south, east, north] with west < east and south < north"
						.into(),
				));
			}
		}

		// Validate routing config
		if self.routing.max_waypoints == 0 || self.routing.max_waypoints > 14 {
			return Err(ConfigError::Validation(
				"Routing max_waypoints must be between 1 and 14".into(),
			));
		}

		Ok(())
	}
}

/// Parses a Config from a TOML string, resolving environment variables
/// and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
