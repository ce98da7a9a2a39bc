//! Record store module for the lavadero workflow system.
//!
//! This module provides the abstraction over the external record store
//! holding orders, clients and the persisted geocode cache. Backends are
//! simple key-value stores; the typed [`StorageService`] wrapper adds
//! JSON serialization and namespace handling on top.

use async_trait::async_trait;
use lavadero_types::{ConfigSchema, ImplementationRegistry};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested record is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for record store backends.
///
/// Keys are flat strings of the form `namespace:id`. Backends provide
/// raw byte operations plus prefix listing, which the workflow uses to
/// load every record of one collection (e.g. all orders).
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, overwriting any prior value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in the store.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Lists all keys starting with the given prefix, in no particular order.
	async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations, used by the engine builder to register them.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level record store that provides typed operations.
///
/// Wraps a low-level backend and provides convenient methods for storing
/// and retrieving typed records with automatic JSON serialization.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(namespace: &str, id: &str) -> String {
		format!("{}:{}", namespace, id)
	}

	/// Stores a serializable record, creating or overwriting it.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&Self::key(namespace, id), bytes).await
	}

	/// Retrieves and deserializes a record.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&Self::key(namespace, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Retrieves every record of a namespace, in no particular order.
	pub async fn retrieve_all<T: DeserializeOwned>(
		&self,
		namespace: &str,
	) -> Result<Vec<T>, StorageError> {
		let prefix = format!("{}:", namespace);
		let keys = self.backend.list_keys(&prefix).await?;
		let mut records = Vec::with_capacity(keys.len());
		for key in keys {
			// A record deleted between listing and reading is skipped.
			match self.backend.get_bytes(&key).await {
				Ok(bytes) => {
					let record = serde_json::from_slice(&bytes)
						.map_err(|e| StorageError::Serialization(e.to_string()))?;
					records.push(record);
				},
				Err(StorageError::NotFound) => continue,
				Err(e) => return Err(e),
			}
		}
		Ok(records)
	}

	/// Removes a record from the store.
	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&Self::key(namespace, id)).await
	}

	/// Updates an existing record.
	///
	/// Returns [`StorageError::NotFound`] if the record does not exist,
	/// making it semantically different from [`StorageService::store`]
	/// which will create or overwrite.
	pub async fn update<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = Self::key(namespace, id);
		if !self.backend.exists(&key).await? {
			return Err(StorageError::NotFound);
		}
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Checks if a record exists in the store.
	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key(namespace, id)).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryStorage;
	use serde::Deserialize;

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Record {
		id: String,
		value: u32,
	}

	fn service() -> StorageService {
		StorageService::new(Box::new(MemoryStorage::new()))
	}

	#[tokio::test]
	async fn store_and_retrieve_roundtrip() {
		let storage = service();
		let record = Record {
			id: "7".into(),
			value: 42,
		};
		storage.store("orders", "7", &record).await.unwrap();
		let back: Record = storage.retrieve("orders", "7").await.unwrap();
		assert_eq!(back, record);
	}

	#[tokio::test]
	async fn update_requires_existing_record() {
		let storage = service();
		let record = Record {
			id: "7".into(),
			value: 1,
		};
		let result = storage.update("orders", "7", &record).await;
		assert!(matches!(result, Err(StorageError::NotFound)));

		storage.store("orders", "7", &record).await.unwrap();
		storage.update("orders", "7", &record).await.unwrap();
	}

	#[tokio::test]
	async fn retrieve_all_scopes_to_namespace() {
		let storage = service();
		for id in ["1", "2", "3"] {
			let record = Record {
				id: id.into(),
				value: 0,
			};
			storage.store("orders", id, &record).await.unwrap();
		}
		let client = Record {
			id: "111".into(),
			value: 0,
		};
		storage.store("clients", "111", &client).await.unwrap();

		let orders: Vec<Record> = storage.retrieve_all("orders").await.unwrap();
		assert_eq!(orders.len(), 3);
		let clients: Vec<Record> = storage.retrieve_all("clients").await.unwrap();
		assert_eq!(clients.len(), 1);
	}
}
