//! Delivery grouping.
//!
//! Collapses every order scheduled for delivery into one group per
//! client, so each client is a single routing stop regardless of how
//! many tickets they have open. Groups are ephemeral: recomputed on
//! every load, discarded once no member order remains in Entregar.

use lavadero_types::{
	Client, DeliveryGroup, Order, OrderStatus, ADDRESS_PLACEHOLDER, NAME_PLACEHOLDER,
};
use std::collections::HashMap;

/// Groups pending-delivery orders by client phone.
///
/// Orders not in [`OrderStatus::Entregar`] are ignored. Orders without a
/// phone fall into a single empty-key group; that is accepted data, but
/// it is logged as a data-quality condition. Client name and address
/// come from the directory, with literal placeholders for missing
/// records or fields. Groups preserve first-appearance order.
pub fn group_for_delivery(
	orders: Vec<Order>,
	directory: &HashMap<String, Client>,
) -> Vec<DeliveryGroup> {
	let mut index: HashMap<String, usize> = HashMap::new();
	let mut groups: Vec<DeliveryGroup> = Vec::new();

	for order in orders
		.into_iter()
		.filter(|o| o.status == OrderStatus::Entregar)
	{
		let phone = order.phone_key().to_string();
		if phone.is_empty() {
			tracing::warn!(order = order.nro, "Order has no client phone, grouped under empty key");
		}

		match index.get(&phone) {
			Some(&i) => groups[i].orders.push(order),
			None => {
				let client = directory.get(&phone);
				let group = DeliveryGroup {
					phone: phone.clone(),
					name: client
						.map(|c| c.display_name().to_string())
						.unwrap_or_else(|| NAME_PLACEHOLDER.to_string()),
					address: client
						.map(|c| c.display_address().to_string())
						.unwrap_or_else(|| ADDRESS_PLACEHOLDER.to_string()),
					position: client.and_then(|c| c.position),
					distance_from_origin: None,
					orders: vec![order],
				};
				index.insert(phone, groups.len());
				groups.push(group);
			},
		}
	}

	groups
}
