//! Client directory backed by the record store.
//!
//! One record per phone number, upsert semantics. The directory also
//! owns position enrichment: a client without coordinates gets geocoded
//! on demand and the result is written back for reuse.

use lavadero_geo::GeocodeService;
use lavadero_storage::{StorageError, StorageService};
use lavadero_types::{Client, StorageKey};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for DirectoryError {
	fn from(e: StorageError) -> Self {
		DirectoryError::Storage(e.to_string())
	}
}

/// Phone-keyed client records.
pub struct ClientDirectory {
	storage: Arc<StorageService>,
}

impl ClientDirectory {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Looks up a client by phone. Unknown phones are `Ok(None)`.
	pub async fn get(&self, phone: &str) -> Result<Option<Client>, DirectoryError> {
		match self
			.storage
			.retrieve::<Client>(StorageKey::Clients.as_str(), phone)
			.await
		{
			Ok(client) => Ok(Some(client)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	/// Creates or replaces the record for the client's phone.
	pub async fn upsert(&self, client: &Client) -> Result<(), DirectoryError> {
		self.storage
			.store(StorageKey::Clients.as_str(), &client.phone, client)
			.await?;
		Ok(())
	}

	/// Loads the whole directory as a phone-keyed map.
	pub async fn all(&self) -> Result<HashMap<String, Client>, DirectoryError> {
		let clients: Vec<Client> = self
			.storage
			.retrieve_all(StorageKey::Clients.as_str())
			.await?;
		Ok(clients.into_iter().map(|c| (c.phone.clone(), c)).collect())
	}

	/// Fills in the client's position if it is missing, persisting on
	/// success.
	///
	/// Returns whether the record now carries a position. A lookup miss
	/// or failure leaves the record untouched so a later load retries.
	/// Concurrent enrichment of the same record is last-writer-wins;
	/// both writers store the same resolved position.
	pub async fn ensure_position(
		&self,
		client: &mut Client,
		geocode: &GeocodeService,
	) -> Result<bool, DirectoryError> {
		if client.position.is_some() {
			return Ok(true);
		}
		if client.address.trim().is_empty() {
			return Ok(false);
		}

		match geocode.locate(&client.address).await {
			Some(position) => {
				client.position = Some(position);
				self.upsert(client).await?;
				tracing::debug!(phone = %client.phone, %position, "Client position resolved");
				Ok(true)
			},
			None => Ok(false),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use lavadero_geo::{GeocodeError, GeocoderInterface};
	use lavadero_storage::implementations::memory::MemoryStorage;
	use lavadero_types::{ConfigSchema, GeoPoint, RegionBias};
	use std::time::Duration;

	struct TableGeocoder(HashMap<String, GeoPoint>);

	#[async_trait]
	impl GeocoderInterface for TableGeocoder {
		async fn resolve(
			&self,
			address: &str,
			_bias: &RegionBias,
		) -> Result<Option<GeoPoint>, GeocodeError> {
			Ok(self.0.get(address).copied())
		}

		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			unimplemented!("not used in tests")
		}
	}

	fn directory() -> ClientDirectory {
		ClientDirectory::new(Arc::new(StorageService::new(Box::new(MemoryStorage::new()))))
	}

	fn geocode_with(table: HashMap<String, GeoPoint>) -> GeocodeService {
		GeocodeService::new(
			Box::new(TableGeocoder(table)),
			RegionBias::default(),
			Duration::from_millis(1100),
		)
	}

	#[tokio::test]
	async fn upsert_replaces_existing_record() {
		let dir = directory();
		dir.upsert(&Client::new("111", "Ana", "Av. Siempreviva 742"))
			.await
			.unwrap();
		dir.upsert(&Client::new("111", "Ana María", "Calle Falsa 123"))
			.await
			.unwrap();

		let stored = dir.get("111").await.unwrap().unwrap();
		assert_eq!(stored.name, "Ana María");
		assert_eq!(stored.address, "Calle Falsa 123");
		assert_eq!(dir.all().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn unknown_phone_is_none() {
		let dir = directory();
		assert!(dir.get("999").await.unwrap().is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn ensure_position_geocodes_and_persists() {
		let dir = directory();
		let geocode = geocode_with(HashMap::from([(
			"Calle Falsa 123".to_string(),
			GeoPoint::new(-34.6, -58.4),
		)]));

		let mut client = Client::new("111", "Ana", "Calle Falsa 123");
		dir.upsert(&client).await.unwrap();

		assert!(dir.ensure_position(&mut client, &geocode).await.unwrap());
		assert_eq!(client.position, Some(GeoPoint::new(-34.6, -58.4)));

		let stored = dir.get("111").await.unwrap().unwrap();
		assert_eq!(stored.position, Some(GeoPoint::new(-34.6, -58.4)));
	}

	#[tokio::test(start_paused = true)]
	async fn ensure_position_skips_resolved_and_blank() {
		let dir = directory();
		let geocode = geocode_with(HashMap::new());

		let mut resolved = Client::new("111", "Ana", "Calle Falsa 123");
		resolved.position = Some(GeoPoint::new(-34.6, -58.4));
		assert!(dir.ensure_position(&mut resolved, &geocode).await.unwrap());

		let mut blank = Client::new("222", "Beto", "");
		assert!(!dir.ensure_position(&mut blank, &geocode).await.unwrap());
		assert!(blank.position.is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn unresolvable_address_leaves_record_untouched() {
		let dir = directory();
		let geocode = geocode_with(HashMap::new());

		let mut client = Client::new("111", "Ana", "Dirección inexistente 1");
		dir.upsert(&client).await.unwrap();

		assert!(!dir.ensure_position(&mut client, &geocode).await.unwrap());
		assert!(client.position.is_none());
		let stored = dir.get("111").await.unwrap().unwrap();
		assert!(stored.position.is_none());
	}
}
