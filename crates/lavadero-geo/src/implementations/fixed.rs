//! Fixed-table geocoder backend.
//!
//! Answers lookups from a coordinate table in the configuration file.
//! Useful for development and tests, and for shops whose delivery area
//! is small enough to enumerate by hand.

use crate::{GeocodeError, GeocoderInterface};
use async_trait::async_trait;
use lavadero_types::{
	ConfigSchema, GeoPoint, ImplementationRegistry, RegionBias, Schema, ValidationError,
};
use std::collections::HashMap;

/// Geocoder answering from a fixed address table.
pub struct FixedGeocoder {
	table: HashMap<String, GeoPoint>,
}

impl FixedGeocoder {
	/// Creates a geocoder from an address-to-position table.
	pub fn new(table: HashMap<String, GeoPoint>) -> Self {
		Self { table }
	}
}

#[async_trait]
impl GeocoderInterface for FixedGeocoder {
	async fn resolve(
		&self,
		address: &str,
		_bias: &RegionBias,
	) -> Result<Option<GeoPoint>, GeocodeError> {
		Ok(self.table.get(address.trim()).copied())
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FixedGeocoderSchema)
	}
}

/// Configuration schema for the fixed geocoder.
pub struct FixedGeocoderSchema;

impl ConfigSchema for FixedGeocoderSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// The address table is validated structurally by the factory.
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Registry for the fixed geocoder implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "fixed";
	type Factory = crate::GeocoderFactory;

	fn factory() -> Self::Factory {
		create_geocoder
	}
}

impl crate::GeocoderRegistry for Registry {}

/// Factory function to create a fixed geocoder from configuration.
///
/// Configuration parameters:
/// - `addresses`: table mapping address strings to `[lat, lng]` pairs
///   (optional; an empty table resolves nothing)
pub fn create_geocoder(config: &toml::Value) -> Result<Box<dyn GeocoderInterface>, GeocodeError> {
	let mut table = HashMap::new();

	if let Some(addresses) = config.get("addresses") {
		let entries = addresses.as_table().ok_or_else(|| {
			GeocodeError::Configuration("addresses must be a table".into())
		})?;
		for (address, value) in entries {
			let pair = value
				.as_array()
				.filter(|a| a.len() == 2)
				.ok_or_else(|| {
					GeocodeError::Configuration(format!(
						"Address '{}' must map to [lat, lng]",
						address
					))
				})?;
			let coord = |v: &toml::Value| v.as_float().or_else(|| v.as_integer().map(|i| i as f64));
			let (lat, lng) = match (coord(&pair[0]), coord(&pair[1])) {
				(Some(lat), Some(lng)) => (lat, lng),
				_ => {
					return Err(GeocodeError::Configuration(format!(
						"Address '{}' has non-numeric coordinates",
						address
					)))
				},
			};
			table.insert(address.trim().to_string(), GeoPoint::new(lat, lng));
		}
	}

	Ok(Box::new(FixedGeocoder::new(table)))
}
