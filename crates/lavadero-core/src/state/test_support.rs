//! Shared fixtures for state-machine tests.

use crate::state::OrderStateMachine;
use async_trait::async_trait;
use lavadero_storage::implementations::memory::MemoryStorage;
use lavadero_storage::{StorageError, StorageInterface, StorageService};
use lavadero_types::{ConfigSchema, Order, OrderStatus, StorageKey};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Backend that accepts a fixed number of writes, then rejects the rest.
///
/// Reads always pass through, letting tests seed records and then force
/// a store-write failure on the operation under test.
pub(crate) struct BudgetedStorage {
	inner: MemoryStorage,
	writes_left: AtomicUsize,
}

impl BudgetedStorage {
	pub(crate) fn new(write_budget: usize) -> Self {
		Self {
			inner: MemoryStorage::new(),
			writes_left: AtomicUsize::new(write_budget),
		}
	}
}

#[async_trait]
impl StorageInterface for BudgetedStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		self.inner.get_bytes(key).await
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let allowed = self
			.writes_left
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok();
		if !allowed {
			return Err(StorageError::Backend("simulated write failure".into()));
		}
		self.inner.set_bytes(key, value).await
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		self.inner.delete(key).await
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		self.inner.exists(key).await
	}

	async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		self.inner.list_keys(prefix).await
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		self.inner.config_schema()
	}
}

/// Builds a state machine over a backend with the given write budget.
pub(crate) fn service_with_write_budget(
	write_budget: usize,
) -> (OrderStateMachine, Arc<StorageService>) {
	let storage = Arc::new(StorageService::new(Box::new(BudgetedStorage::new(
		write_budget,
	))));
	(OrderStateMachine::new(storage.clone()), storage)
}

/// A state machine whose backend never fails.
pub(crate) async fn working_service() -> (OrderStateMachine, Arc<StorageService>) {
	service_with_write_budget(usize::MAX)
}

/// A state machine whose backend accepts one seed write, then fails.
pub(crate) async fn failing_service() -> (OrderStateMachine, Arc<StorageService>) {
	service_with_write_budget(1)
}

/// An unpaid order with no line items.
pub(crate) fn sample_order(nro: u64, status: OrderStatus) -> Order {
	Order {
		nro,
		client_phone: Some("1155550000".into()),
		total_amount: Decimal::from(1000),
		status,
		paid: false,
		line_items: vec![],
		photo_url: None,
		created_at: 100,
		updated_at: 100,
	}
}

/// Seeds an order into the store and returns the local copy.
pub(crate) async fn order_in(storage: &StorageService, nro: u64, status: OrderStatus) -> Order {
	let order = sample_order(nro, status);
	storage
		.store(StorageKey::Orders.as_str(), &nro.to_string(), &order)
		.await
		.expect("seed write should fit the budget");
	order
}
