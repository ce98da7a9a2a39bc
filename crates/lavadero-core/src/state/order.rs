//! Order state machine implementation.
//!
//! Applies status and payment changes to orders with optimistic local
//! updates: the caller's in-memory order is mutated first, the store
//! write follows, and a failed write restores the captured pre-image of
//! the mutated fields. No automatic retry. The conventional forward flow
//! is Lavar -> Lavando -> Guardado -> Entregar -> Entregado, but the
//! domain permits any transition; stricter policies belong to callers.

use lavadero_storage::StorageService;
use lavadero_types::{Order, OrderStatus, StorageKey};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors that can occur during order state management.
#[derive(Debug, Error)]
pub enum OrderStateError {
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Order not found: {0}")]
	OrderNotFound(u64),
}

/// Operator's answer to the unpaid-delivery prompt.
///
/// Delivering an unpaid order asks whether to settle payment in the
/// same step. Accepting marks the order paid together with the status
/// change; acknowledging delivers it with payment untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentResolution {
	/// Mark the order paid together with the delivery.
	MarkPaid,
	/// Deliver the order, leaving payment as is.
	LeaveUnpaid,
}

/// Manages order state transitions and persistence.
pub struct OrderStateMachine {
	storage: Arc<StorageService>,
}

impl OrderStateMachine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Whether delivering this order should prompt for payment first.
	pub fn needs_payment_prompt(order: &Order) -> bool {
		!order.paid
	}

	fn now() -> u64 {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.unwrap_or_default()
			.as_secs()
	}

	async fn persist(&self, order: &Order) -> Result<(), OrderStateError> {
		self.storage
			.update(StorageKey::Orders.as_str(), &order.nro.to_string(), order)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))
	}

	/// Sets an order's status, rolling back on store failure.
	///
	/// Unconstrained: no transition is illegal. Only the status and
	/// update stamp are restored on failure, so concurrent changes to
	/// unrelated fields are never clobbered.
	pub async fn set_status(
		&self,
		order: &mut Order,
		new_status: OrderStatus,
	) -> Result<(), OrderStateError> {
		if order.status == new_status {
			return Ok(());
		}

		let prev_status = order.status;
		let prev_updated = order.updated_at;
		order.status = new_status;
		order.updated_at = Self::now();

		if let Err(e) = self.persist(order).await {
			order.status = prev_status;
			order.updated_at = prev_updated;
			tracing::warn!(
				order = order.nro,
				from = %prev_status,
				to = %new_status,
				error = %e,
				"Status update failed, rolled back"
			);
			return Err(e);
		}

		tracing::info!(order = order.nro, from = %prev_status, to = %new_status, "Status updated");
		Ok(())
	}

	/// Delivers an order, optionally settling payment in the same write.
	pub async fn mark_delivered(
		&self,
		order: &mut Order,
		resolution: PaymentResolution,
	) -> Result<(), OrderStateError> {
		let prev_status = order.status;
		let prev_paid = order.paid;
		let prev_updated = order.updated_at;

		order.status = OrderStatus::Entregado;
		if resolution == PaymentResolution::MarkPaid {
			order.paid = true;
		}
		order.updated_at = Self::now();

		if let Err(e) = self.persist(order).await {
			order.status = prev_status;
			order.paid = prev_paid;
			order.updated_at = prev_updated;
			tracing::warn!(order = order.nro, error = %e, "Delivery update failed, rolled back");
			return Err(e);
		}

		tracing::info!(order = order.nro, paid = order.paid, "Order delivered");
		Ok(())
	}

	/// Flips an order's paid flag, rolling back on store failure.
	///
	/// Payment is independent of status; this never touches it.
	pub async fn toggle_paid(&self, order: &mut Order) -> Result<(), OrderStateError> {
		let prev_paid = order.paid;
		let prev_updated = order.updated_at;
		order.paid = !order.paid;
		order.updated_at = Self::now();

		if let Err(e) = self.persist(order).await {
			order.paid = prev_paid;
			order.updated_at = prev_updated;
			tracing::warn!(order = order.nro, error = %e, "Payment toggle failed, rolled back");
			return Err(e);
		}

		tracing::info!(order = order.nro, paid = order.paid, "Payment toggled");
		Ok(())
	}

	/// Updates an order with a closure and persists it.
	///
	/// Reads the stored record, applies the update, stamps `updated_at`
	/// and writes it back. Used for field edits outside the optimistic
	/// status/payment flows.
	pub async fn update_order_with<F>(&self, nro: u64, updater: F) -> Result<Order, OrderStateError>
	where
		F: FnOnce(&mut Order),
	{
		let mut order = self.get_order(nro).await?;
		updater(&mut order);
		order.updated_at = Self::now();
		self.persist(&order).await?;
		Ok(order)
	}

	/// Gets an order by ticket number.
	pub async fn get_order(&self, nro: u64) -> Result<Order, OrderStateError> {
		self.storage
			.retrieve(StorageKey::Orders.as_str(), &nro.to_string())
			.await
			.map_err(|e| match e {
				lavadero_storage::StorageError::NotFound => OrderStateError::OrderNotFound(nro),
				other => OrderStateError::Storage(other.to_string()),
			})
	}

	/// Stores a new order.
	pub async fn store_order(&self, order: &Order) -> Result<(), OrderStateError> {
		self.storage
			.store(StorageKey::Orders.as_str(), &order.nro.to_string(), order)
			.await
			.map_err(|e| OrderStateError::Storage(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::state::test_support::{failing_service, working_service, order_in};
	use lavadero_types::OrderStatus;

	#[tokio::test]
	async fn status_update_persists() {
		let (machine, storage) = working_service().await;
		let mut order = order_in(&storage, 1, OrderStatus::Lavar).await;

		machine
			.set_status(&mut order, OrderStatus::Lavando)
			.await
			.unwrap();

		assert_eq!(order.status, OrderStatus::Lavando);
		let stored = machine.get_order(1).await.unwrap();
		assert_eq!(stored.status, OrderStatus::Lavando);
	}

	#[tokio::test]
	async fn failed_status_update_rolls_back() {
		let (machine, storage) = failing_service().await;
		let mut order = order_in(&storage, 1, OrderStatus::Lavar).await;
		let stamp_before = order.updated_at;

		let result = machine.set_status(&mut order, OrderStatus::Lavando).await;

		assert!(result.is_err());
		assert_eq!(order.status, OrderStatus::Lavar);
		assert_eq!(order.updated_at, stamp_before);
	}

	#[tokio::test]
	async fn any_to_any_transition_is_allowed() {
		let (machine, storage) = working_service().await;
		let mut order = order_in(&storage, 1, OrderStatus::Entregado).await;

		// Corrections may move a delivered order anywhere.
		machine
			.set_status(&mut order, OrderStatus::Lavar)
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::Lavar);
	}

	#[tokio::test]
	async fn toggle_paid_leaves_status_alone() {
		let (machine, storage) = working_service().await;
		let mut order = order_in(&storage, 1, OrderStatus::Guardado).await;

		machine.toggle_paid(&mut order).await.unwrap();
		assert!(order.paid);
		assert_eq!(order.status, OrderStatus::Guardado);

		machine.toggle_paid(&mut order).await.unwrap();
		assert!(!order.paid);
		assert_eq!(order.status, OrderStatus::Guardado);
	}

	#[tokio::test]
	async fn failed_toggle_rolls_back_paid_only() {
		let (machine, storage) = failing_service().await;
		let mut order = order_in(&storage, 1, OrderStatus::Entregar).await;

		let result = machine.toggle_paid(&mut order).await;
		assert!(result.is_err());
		assert!(!order.paid);
		assert_eq!(order.status, OrderStatus::Entregar);
	}

	#[tokio::test]
	async fn delivery_can_settle_payment() {
		let (machine, storage) = working_service().await;
		let mut order = order_in(&storage, 1, OrderStatus::Entregar).await;
		assert!(OrderStateMachine::needs_payment_prompt(&order));

		machine
			.mark_delivered(&mut order, PaymentResolution::MarkPaid)
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::Entregado);
		assert!(order.paid);
	}

	#[tokio::test]
	async fn delivery_can_leave_payment_untouched() {
		let (machine, storage) = working_service().await;
		let mut order = order_in(&storage, 1, OrderStatus::Entregar).await;

		machine
			.mark_delivered(&mut order, PaymentResolution::LeaveUnpaid)
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::Entregado);
		assert!(!order.paid);
	}

	#[tokio::test]
	async fn failed_delivery_rolls_back_both_fields() {
		let (machine, storage) = failing_service().await;
		let mut order = order_in(&storage, 1, OrderStatus::Entregar).await;

		let result = machine
			.mark_delivered(&mut order, PaymentResolution::MarkPaid)
			.await;
		assert!(result.is_err());
		assert_eq!(order.status, OrderStatus::Entregar);
		assert!(!order.paid);
	}

	#[tokio::test]
	async fn missing_order_is_reported_by_number() {
		let (machine, _storage) = working_service().await;
		let result = machine.get_order(99).await;
		assert!(matches!(result, Err(OrderStateError::OrderNotFound(99))));
	}
}
