//! In-memory working set of orders sharing one status.
//!
//! The presentation layer shows one status at a time. A `StatusView`
//! mirrors that working set: transitioning an order to another status
//! removes it from the view optimistically while the store is updated,
//! and a failed write puts it back at its original place with its
//! pre-transition fields restored.

use crate::state::{OrderStateError, OrderStateMachine, PaymentResolution};
use lavadero_types::{Order, OrderStatus};

/// The orders currently shown for one status, in ticket order.
#[derive(Debug)]
pub struct StatusView {
	status: OrderStatus,
	orders: Vec<Order>,
}

impl StatusView {
	/// Builds a view over the orders carrying the given status.
	///
	/// Orders with any other status are dropped; the rest are sorted by
	/// ticket number.
	pub fn new(status: OrderStatus, orders: Vec<Order>) -> Self {
		let mut orders: Vec<Order> = orders.into_iter().filter(|o| o.status == status).collect();
		orders.sort_by_key(|o| o.nro);
		Self { status, orders }
	}

	/// The status this view displays.
	pub fn status(&self) -> OrderStatus {
		self.status
	}

	/// The orders currently in the view.
	pub fn orders(&self) -> &[Order] {
		&self.orders
	}

	pub fn len(&self) -> usize {
		self.orders.len()
	}

	pub fn is_empty(&self) -> bool {
		self.orders.is_empty()
	}

	fn take(&mut self, nro: u64) -> Result<(usize, Order), OrderStateError> {
		let idx = self
			.orders
			.iter()
			.position(|o| o.nro == nro)
			.ok_or(OrderStateError::OrderNotFound(nro))?;
		Ok((idx, self.orders.remove(idx)))
	}

	/// Moves an order to another status.
	///
	/// The order leaves the view immediately; if the store rejects the
	/// update it returns to its original index with its previous status.
	pub async fn transition(
		&mut self,
		machine: &OrderStateMachine,
		nro: u64,
		target: OrderStatus,
	) -> Result<(), OrderStateError> {
		let (idx, mut order) = self.take(nro)?;

		match machine.set_status(&mut order, target).await {
			Ok(()) => {
				if target == self.status {
					// No-op transition keeps the order in place.
					self.orders.insert(idx, order);
				}
				Ok(())
			},
			Err(e) => {
				self.orders.insert(idx, order);
				Err(e)
			},
		}
	}

	/// Delivers an order out of this view.
	pub async fn mark_delivered(
		&mut self,
		machine: &OrderStateMachine,
		nro: u64,
		resolution: PaymentResolution,
	) -> Result<(), OrderStateError> {
		let (idx, mut order) = self.take(nro)?;

		match machine.mark_delivered(&mut order, resolution).await {
			Ok(()) => {
				if self.status == OrderStatus::Entregado {
					self.orders.insert(idx, order);
				}
				Ok(())
			},
			Err(e) => {
				self.orders.insert(idx, order);
				Err(e)
			},
		}
	}

	/// Toggles payment on an order without moving it.
	pub async fn toggle_paid(
		&mut self,
		machine: &OrderStateMachine,
		nro: u64,
	) -> Result<(), OrderStateError> {
		let order = self
			.orders
			.iter_mut()
			.find(|o| o.nro == nro)
			.ok_or(OrderStateError::OrderNotFound(nro))?;
		machine.toggle_paid(order).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::state::test_support::{order_in, sample_order, service_with_write_budget};

	#[tokio::test]
	async fn view_filters_and_sorts_by_ticket() {
		let orders = vec![
			sample_order(3, OrderStatus::Lavar),
			sample_order(1, OrderStatus::Lavar),
			sample_order(2, OrderStatus::Entregar),
		];
		let view = StatusView::new(OrderStatus::Lavar, orders);
		let nros: Vec<u64> = view.orders().iter().map(|o| o.nro).collect();
		assert_eq!(nros, vec![1, 3]);
	}

	#[tokio::test]
	async fn transition_removes_from_view() {
		let (machine, storage) = service_with_write_budget(usize::MAX);
		let a = order_in(&storage, 1, OrderStatus::Lavar).await;
		let b = order_in(&storage, 2, OrderStatus::Lavar).await;

		let mut view = StatusView::new(OrderStatus::Lavar, vec![a, b]);
		view.transition(&machine, 1, OrderStatus::Lavando)
			.await
			.unwrap();

		let nros: Vec<u64> = view.orders().iter().map(|o| o.nro).collect();
		assert_eq!(nros, vec![2]);
		assert_eq!(
			machine.get_order(1).await.unwrap().status,
			OrderStatus::Lavando
		);
	}

	#[tokio::test]
	async fn failed_transition_restores_view_position() {
		// Two seed writes allowed, then every write fails.
		let (machine, storage) = service_with_write_budget(2);
		let a = order_in(&storage, 1, OrderStatus::Lavar).await;
		let b = order_in(&storage, 2, OrderStatus::Lavar).await;

		let mut view = StatusView::new(OrderStatus::Lavar, vec![a, b]);
		let result = view.transition(&machine, 1, OrderStatus::Lavando).await;

		assert!(result.is_err());
		let nros: Vec<u64> = view.orders().iter().map(|o| o.nro).collect();
		assert_eq!(nros, vec![1, 2]);
		assert_eq!(view.orders()[0].status, OrderStatus::Lavar);
	}

	#[tokio::test]
	async fn toggle_paid_keeps_order_in_view() {
		let (machine, storage) = service_with_write_budget(usize::MAX);
		let a = order_in(&storage, 1, OrderStatus::Entregar).await;

		let mut view = StatusView::new(OrderStatus::Entregar, vec![a]);
		view.toggle_paid(&machine, 1).await.unwrap();

		assert_eq!(view.len(), 1);
		assert!(view.orders()[0].paid);
		assert_eq!(view.orders()[0].status, OrderStatus::Entregar);
	}

	#[tokio::test]
	async fn unknown_ticket_is_rejected() {
		let (machine, _storage) = service_with_write_budget(usize::MAX);
		let mut view = StatusView::new(OrderStatus::Lavar, vec![]);
		let result = view.transition(&machine, 42, OrderStatus::Lavando).await;
		assert!(matches!(result, Err(OrderStateError::OrderNotFound(42))));
	}
}
