//! Storage-related types for the workflow system.

use std::str::FromStr;

/// Id under which the geocoded business origin is cached in the
/// [`StorageKey::GeoCache`] namespace.
pub const ORIGIN_CACHE_ID: &str = "origin";

/// Storage namespaces for the persisted record collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Namespace for order records, keyed by ticket number.
	Orders,
	/// Namespace for client records, keyed by phone number.
	Clients,
	/// Namespace for cached geocoding results that survive restarts.
	GeoCache,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::Clients => "clients",
			StorageKey::GeoCache => "geocache",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[Self::Orders, Self::Clients, Self::GeoCache].into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"orders" => Ok(Self::Orders),
			"clients" => Ok(Self::Clients),
			"geocache" => Ok(Self::GeoCache),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
