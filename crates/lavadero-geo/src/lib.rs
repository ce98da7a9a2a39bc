//! Geocoding module for the lavadero workflow system.
//!
//! This module resolves free-text addresses to coordinates for delivery
//! routing. The [`GeocodeService`] wraps a pluggable backend with a
//! process-wide cache and a cooldown guard that keeps external lookups
//! politely spaced, and persists the business origin across sessions.

use async_trait::async_trait;
use lavadero_storage::StorageService;
use lavadero_types::{
	ConfigSchema, GeoPoint, ImplementationRegistry, RegionBias, StorageKey, ORIGIN_CACHE_ID,
};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

pub mod distance;

/// Re-export implementations
pub mod implementations {
	pub mod fixed;
	pub mod nominatim;
}

/// Errors that can occur during geocoding operations.
///
/// All of these are non-fatal to the workflow: a failed lookup degrades
/// to position-unknown and the affected stop is simply sorted last.
#[derive(Debug, Error)]
pub enum GeocodeError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when the provider returns an unusable payload.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for geocoder backends.
#[async_trait]
pub trait GeocoderInterface: Send + Sync {
	/// Resolves a free-text address to coordinates.
	///
	/// Returns `Ok(None)` when the provider has no match for the address
	/// within the given bias; that is an expected outcome, not an error.
	async fn resolve(
		&self,
		address: &str,
		bias: &RegionBias,
	) -> Result<Option<GeoPoint>, GeocodeError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for geocoder factory functions.
pub type GeocoderFactory = fn(&toml::Value) -> Result<Box<dyn GeocoderInterface>, GeocodeError>;

/// Registry trait for geocoder implementations.
pub trait GeocoderRegistry: ImplementationRegistry<Factory = GeocoderFactory> {}

/// Get all registered geocoder implementations.
pub fn get_all_implementations() -> Vec<(&'static str, GeocoderFactory)> {
	use implementations::{fixed, nominatim};

	vec![
		(fixed::Registry::NAME, fixed::Registry::factory()),
		(nominatim::Registry::NAME, nominatim::Registry::factory()),
	]
}

/// Caching, rate-limited front end over a geocoder backend.
///
/// Lookups for addresses already resolved in this process never reach
/// the backend. Misses are serialized behind a cooldown guard so that
/// external requests stay at least `cooldown` apart, honoring the
/// provider's usage policy. Failures resolve to position-unknown and are
/// not negatively cached, so a later load retries them.
pub struct GeocodeService {
	geocoder: Box<dyn GeocoderInterface>,
	bias: RegionBias,
	cooldown: Duration,
	cache: RwLock<HashMap<String, GeoPoint>>,
	/// Earliest instant the next external lookup may be issued.
	next_allowed: Mutex<Option<Instant>>,
}

impl GeocodeService {
	/// Creates a new GeocodeService over the given backend.
	pub fn new(geocoder: Box<dyn GeocoderInterface>, bias: RegionBias, cooldown: Duration) -> Self {
		Self {
			geocoder,
			bias,
			cooldown,
			cache: RwLock::new(HashMap::new()),
			next_allowed: Mutex::new(None),
		}
	}

	/// Resolves an address to coordinates, consulting the cache first.
	///
	/// Returns `None` for blank addresses, provider misses and lookup
	/// failures alike; the caller treats all three as position-unknown.
	pub async fn locate(&self, address: &str) -> Option<GeoPoint> {
		let address = address.trim();
		if address.is_empty() {
			return None;
		}

		if let Some(position) = self.cache.read().await.get(address) {
			return Some(*position);
		}

		self.reserve_slot().await;

		match self.geocoder.resolve(address, &self.bias).await {
			Ok(Some(position)) => {
				self.cache
					.write()
					.await
					.insert(address.to_string(), position);
				tracing::debug!(address, %position, "Address geocoded");
				Some(position)
			},
			Ok(None) => {
				tracing::debug!(address, "No geocoding match");
				None
			},
			Err(e) => {
				tracing::warn!(address, error = %e, "Geocoding failed");
				None
			},
		}
	}

	/// Resolves the business origin, persisting the result.
	///
	/// The first successful resolution is written to the record store
	/// under a fixed key; later calls, including after a restart, read
	/// the persisted value and issue no external lookup.
	pub async fn origin(&self, storage: &StorageService, address: &str) -> Option<GeoPoint> {
		if let Ok(position) = storage
			.retrieve::<GeoPoint>(StorageKey::GeoCache.as_str(), ORIGIN_CACHE_ID)
			.await
		{
			return Some(position);
		}

		let position = self.locate(address).await?;
		if let Err(e) = storage
			.store(StorageKey::GeoCache.as_str(), ORIGIN_CACHE_ID, &position)
			.await
		{
			// The origin still works for this session; only the cache
			// write is lost.
			tracing::warn!(error = %e, "Could not persist origin position");
		}
		Some(position)
	}

	/// Waits until the cooldown window has passed and claims the next
	/// request slot.
	///
	/// The guard is a recorded next-allowed instant, not a blocking
	/// sleep; concurrent callers queue on the mutex and are released one
	/// cooldown apart.
	async fn reserve_slot(&self) {
		let mut next_allowed = self.next_allowed.lock().await;
		if let Some(at) = *next_allowed {
			if at > Instant::now() {
				tokio::time::sleep_until(at).await;
			}
		}
		*next_allowed = Some(Instant::now() + self.cooldown);
	}
}
