//! Nominatim geocoder backend.
//!
//! Resolves addresses through the OpenStreetMap Nominatim search API.
//! The service's usage policy allows roughly one request per second;
//! pacing is enforced by the GeocodeService cooldown, not here.

use crate::{GeocodeError, GeocoderInterface};
use async_trait::async_trait;
use lavadero_types::{
	ConfigSchema, Field, FieldType, GeoPoint, ImplementationRegistry, RegionBias, Schema,
	ValidationError,
};
use serde::Deserialize;

const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// Nominatim requires an identifying User-Agent on every request.
const USER_AGENT: &str = "lavadero-workflow/0.1";

/// Geocoder backed by the Nominatim HTTP API.
pub struct NominatimGeocoder {
	client: reqwest::Client,
	endpoint: String,
}

impl NominatimGeocoder {
	/// Creates a geocoder against the given search endpoint.
	pub fn new(endpoint: impl Into<String>) -> Result<Self, GeocodeError> {
		let client = reqwest::Client::builder()
			.user_agent(USER_AGENT)
			.build()
			.map_err(|e| GeocodeError::Configuration(e.to_string()))?;
		Ok(Self {
			client,
			endpoint: endpoint.into(),
		})
	}
}

/// One entry of a Nominatim search response. Coordinates arrive as
/// strings.
#[derive(Debug, Deserialize)]
struct SearchResult {
	lat: String,
	lon: String,
}

#[async_trait]
impl GeocoderInterface for NominatimGeocoder {
	async fn resolve(
		&self,
		address: &str,
		bias: &RegionBias,
	) -> Result<Option<GeoPoint>, GeocodeError> {
		let mut query: Vec<(&str, String)> = vec![
			("q", address.to_string()),
			("format", "jsonv2".to_string()),
			("limit", "1".to_string()),
		];
		if let Some(country) = &bias.country {
			query.push(("countrycodes", country.clone()));
		}
		if let Some(viewbox) = &bias.viewbox {
			// Nominatim expects lon/lat corner order: x1,y1,x2,y2.
			query.push((
				"viewbox",
				format!(
					"{},{},{},{}",
					viewbox.west, viewbox.north, viewbox.east, viewbox.south
				),
			));
			query.push(("bounded", "1".to_string()));
		}

		let response = self
			.client
			.get(&self.endpoint)
			.query(&query)
			.send()
			.await
			.map_err(|e| GeocodeError::Network(e.to_string()))?;

		if !response.status().is_success() {
			return Err(GeocodeError::Network(format!(
				"HTTP {}",
				response.status()
			)));
		}

		let results: Vec<SearchResult> = response
			.json()
			.await
			.map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

		let Some(hit) = results.into_iter().next() else {
			return Ok(None);
		};

		let lat: f64 = hit
			.lat
			.parse()
			.map_err(|_| GeocodeError::InvalidResponse(format!("Bad latitude: {}", hit.lat)))?;
		let lng: f64 = hit
			.lon
			.parse()
			.map_err(|_| GeocodeError::InvalidResponse(format!("Bad longitude: {}", hit.lon)))?;

		Ok(Some(GeoPoint::new(lat, lng)))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(NominatimSchema)
	}
}

/// Configuration schema for the Nominatim geocoder.
pub struct NominatimSchema;

impl ConfigSchema for NominatimSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![Field::new("endpoint", FieldType::String)]).validate(config)
	}
}

/// Registry for the Nominatim geocoder implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "nominatim";
	type Factory = crate::GeocoderFactory;

	fn factory() -> Self::Factory {
		create_geocoder
	}
}

impl crate::GeocoderRegistry for Registry {}

/// Factory function to create a Nominatim geocoder from configuration.
///
/// Configuration parameters:
/// - `endpoint`: search URL (optional, defaults to the public instance)
pub fn create_geocoder(config: &toml::Value) -> Result<Box<dyn GeocoderInterface>, GeocodeError> {
	NominatimSchema
		.validate(config)
		.map_err(|e| GeocodeError::Configuration(e.to_string()))?;

	let endpoint = config
		.get("endpoint")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_ENDPOINT);
	Ok(Box::new(NominatimGeocoder::new(endpoint)?))
}
