//! Delivery route sequencing.
//!
//! Orders the day's stops by straight-line distance from the business
//! origin and renders the sequence as a Google Maps directions URL.
//! Straight-line distance is a heuristic: the produced order is a
//! suggestion for the driver, not an optimal route.

use lavadero_geo::distance::haversine_km;
use lavadero_types::{DeliveryGroup, GeoPoint};
use std::cmp::Ordering;

/// Maximum number of intermediate stops a directions URL may carry.
pub const MAX_WAYPOINTS: usize = 14;

/// Sorts groups nearest-first from the origin.
///
/// Fills each group's `distance_from_origin` first; groups without a
/// position, or when the origin itself is unknown, keep `None` and sort
/// after every known distance. The sort is stable, so unknowns and ties
/// keep their grouping order.
pub fn sequence_by_distance(groups: &mut [DeliveryGroup], origin: Option<GeoPoint>) {
	for group in groups.iter_mut() {
		group.distance_from_origin = match (origin, group.position) {
			(Some(from), Some(to)) => Some(haversine_km(from, to)),
			_ => None,
		};
	}

	groups.sort_by(|a, b| match (a.distance_from_origin, b.distance_from_origin) {
		(Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	});
}

/// Renders the sequenced stops as a Google Maps directions URL.
///
/// Only stops with a known position appear. The last positioned stop is
/// the destination; the ones before it become waypoints, truncated to
/// `max_waypoints` without warning. Returns `None` when no stop has a
/// position.
pub fn navigation_url(
	origin: GeoPoint,
	groups: &[DeliveryGroup],
	max_waypoints: usize,
) -> Option<String> {
	let stops: Vec<GeoPoint> = groups.iter().filter_map(|g| g.position).collect();
	let destination = stops.last()?;

	let mut url = format!(
		"https://www.google.com/maps/dir/?api=1&origin={}&destination={}",
		origin, destination
	);

	let waypoints = &stops[..stops.len() - 1];
	let waypoints = &waypoints[..waypoints.len().min(max_waypoints)];
	if !waypoints.is_empty() {
		let joined = waypoints
			.iter()
			.map(GeoPoint::to_string)
			.collect::<Vec<_>>()
			.join("|");
		url.push_str("&waypoints=");
		url.push_str(&joined);
	}

	Some(url)
}
