//! Order types for the laundry workflow.
//!
//! This module defines the order record, its line items and the status
//! values an order moves through between intake and delivery. Status is a
//! free-form field with a documented conventional forward flow; the domain
//! itself does not restrict which transitions are allowed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single article line on an order ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
	/// Article description as written on the ticket.
	pub article: String,
	/// Number of units of this article.
	pub quantity: u32,
	/// Price per unit.
	pub unit_price: Decimal,
}

impl LineItem {
	/// Returns `quantity × unit_price` for this line.
	pub fn subtotal(&self) -> Decimal {
		Decimal::from(self.quantity) * self.unit_price
	}
}

/// A laundry service order.
///
/// Orders are identified by a sequential ticket number assigned at intake.
/// The stored `total_amount` is a fallback used when the order carries no
/// line items; otherwise the displayed total is derived from the items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	/// Sequential ticket number, unique across all orders.
	pub nro: u64,
	/// Phone number of the owning client, when known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client_phone: Option<String>,
	/// Stored total, used only when `line_items` is empty.
	#[serde(default)]
	pub total_amount: Decimal,
	/// Current workflow status.
	pub status: OrderStatus,
	/// Whether the order has been paid. Independent of status.
	#[serde(default)]
	pub paid: bool,
	/// Ticket line items, possibly empty for legacy records.
	#[serde(default)]
	pub line_items: Vec<LineItem>,
	/// Optional photo of the ticket or garments.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub photo_url: Option<String>,
	/// Timestamp when this order was created (Unix seconds).
	pub created_at: u64,
	/// Timestamp when this order was last updated (Unix seconds).
	pub updated_at: u64,
}

impl Order {
	/// Returns the displayed total for this order.
	///
	/// The sum of line-item subtotals when items exist, otherwise the
	/// stored `total_amount`. An order with neither defaults to zero
	/// rather than failing.
	pub fn total(&self) -> Decimal {
		if self.line_items.is_empty() {
			self.total_amount
		} else {
			self.line_items.iter().map(LineItem::subtotal).sum()
		}
	}

	/// Returns the grouping key for this order's client.
	///
	/// Orders without a phone number group under the empty string. This
	/// is accepted data, not an error, but callers should surface it as a
	/// data-quality condition.
	pub fn phone_key(&self) -> &str {
		self.client_phone.as_deref().unwrap_or("")
	}
}

/// Workflow status of an order.
///
/// The conventional forward flow is `Lavar → Lavando → Guardado →
/// Entregar → Entregado`, with `Guardar` as an administrative holding
/// state. No status is terminal and any status may be set from any other;
/// stricter transition policies belong to callers, not to the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
	/// Awaiting wash.
	Lavar,
	/// Washing in progress.
	Lavando,
	/// To be put into storage.
	Guardar,
	/// Stored, awaiting delivery or pickup.
	Guardado,
	/// Scheduled for home delivery.
	Entregar,
	/// Delivered to the client.
	Entregado,
}

impl OrderStatus {
	/// Returns the store spelling of this status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Lavar => "LAVAR",
			OrderStatus::Lavando => "LAVANDO",
			OrderStatus::Guardar => "GUARDAR",
			OrderStatus::Guardado => "GUARDADO",
			OrderStatus::Entregar => "ENTREGAR",
			OrderStatus::Entregado => "ENTREGADO",
		}
	}

	/// Returns an iterator over all status values in conventional order.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Lavar,
			Self::Lavando,
			Self::Guardar,
			Self::Guardado,
			Self::Entregar,
			Self::Entregado,
		]
		.into_iter()
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
