//! Delivery grouping types.
//!
//! A `DeliveryGroup` is an ephemeral aggregate of every order a single
//! client currently has scheduled for delivery. Groups are recomputed on
//! every load and never persisted; one group is one routing stop.

use crate::{GeoPoint, Order};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All pending-delivery orders for one client, treated as one stop.
///
/// Invariant: `orders` is non-empty. A group dissolves as soon as no
/// member order remains scheduled for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryGroup {
	/// Grouping key; empty string for orders with no recorded phone.
	pub phone: String,
	/// Client display name, placeholder-substituted.
	pub name: String,
	/// Client delivery address, placeholder-substituted.
	pub address: String,
	/// Geocoded position of the address, when known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub position: Option<GeoPoint>,
	/// Straight-line distance from the business origin in km; `None`
	/// when the position is unknown. Unknowns sort last.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub distance_from_origin: Option<f64>,
	/// Member orders, in load order.
	pub orders: Vec<Order>,
}

impl DeliveryGroup {
	/// Returns the combined total of all member orders.
	pub fn total(&self) -> Decimal {
		self.orders.iter().map(Order::total).sum()
	}
}
