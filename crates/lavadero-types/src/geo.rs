//! Geographic primitives.
//!
//! Coordinates are plain WGS84 degrees. `RegionBias` carries the optional
//! country hint and bounding box passed through to geocoder backends so
//! free-text lookups stay inside the business's service area.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
	pub lat: f64,
	pub lng: f64,
}

impl GeoPoint {
	pub fn new(lat: f64, lng: f64) -> Self {
		Self { lat, lng }
	}
}

impl fmt::Display for GeoPoint {
	/// Renders as `lat,lng`, the form mapping URLs expect.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{},{}", self.lat, self.lng)
	}
}

/// A geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
	pub west: f64,
	pub south: f64,
	pub east: f64,
	pub north: f64,
}

impl BoundingBox {
	/// Checks that the box is well formed: finite edges, west of east,
	/// south of north.
	pub fn is_valid(&self) -> bool {
		[self.west, self.south, self.east, self.north]
			.iter()
			.all(|v| v.is_finite())
			&& self.west < self.east
			&& self.south < self.north
	}
}

/// Search bias applied to free-text geocoding lookups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionBias {
	/// ISO country code hint, e.g. `"ar"`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub country: Option<String>,
	/// Bounding box restricting results to the service area.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub viewbox: Option<BoundingBox>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_renders_lat_comma_lng() {
		let p = GeoPoint::new(-34.6037, -58.3816);
		assert_eq!(p.to_string(), "-34.6037,-58.3816");
	}

	#[test]
	fn bounding_box_validity() {
		let ok = BoundingBox {
			west: -59.0,
			south: -35.0,
			east: -58.0,
			north: -34.0,
		};
		assert!(ok.is_valid());

		let flipped = BoundingBox {
			west: -58.0,
			south: -35.0,
			east: -59.0,
			north: -34.0,
		};
		assert!(!flipped.is_valid());

		let nan = BoundingBox {
			west: f64::NAN,
			south: -35.0,
			east: -58.0,
			north: -34.0,
		};
		assert!(!nan.is_valid());
	}
}
