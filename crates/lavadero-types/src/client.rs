//! Client directory types.
//!
//! Clients are keyed by phone number, treated as an opaque string rather
//! than a parsed telephone number. At most one record exists per phone
//! (upsert semantics). Coordinates are populated lazily by geocoding and
//! written back for reuse.

use crate::GeoPoint;
use serde::{Deserialize, Serialize};

/// Placeholder shown when a client record has no name.
pub const NAME_PLACEHOLDER: &str = "Sin nombre";
/// Placeholder shown when a client record has no address.
pub const ADDRESS_PLACEHOLDER: &str = "Sin dirección";

/// A client of the laundry service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
	/// Phone number, the directory key.
	pub phone: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Free-text delivery address.
	#[serde(default)]
	pub address: String,
	/// Cached geocoded position, if resolution has succeeded before.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub position: Option<GeoPoint>,
}

impl Client {
	/// Creates a client record with no cached position.
	pub fn new(
		phone: impl Into<String>,
		name: impl Into<String>,
		address: impl Into<String>,
	) -> Self {
		Self {
			phone: phone.into(),
			name: name.into(),
			address: address.into(),
			position: None,
		}
	}

	/// Returns the display name, substituting the placeholder when empty.
	pub fn display_name(&self) -> &str {
		if self.name.is_empty() {
			NAME_PLACEHOLDER
		} else {
			&self.name
		}
	}

	/// Returns the address, substituting the placeholder when empty.
	pub fn display_address(&self) -> &str {
		if self.address.is_empty() {
			ADDRESS_PLACEHOLDER
		} else {
			&self.address
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn placeholders_substitute_empty_fields() {
		let c = Client::new("111", "", "");
		assert_eq!(c.display_name(), NAME_PLACEHOLDER);
		assert_eq!(c.display_address(), ADDRESS_PLACEHOLDER);
	}

	#[test]
	fn real_fields_pass_through() {
		let c = Client::new("111", "Ana", "Av. Siempreviva 742");
		assert_eq!(c.display_name(), "Ana");
		assert_eq!(c.display_address(), "Av. Siempreviva 742");
	}
}
