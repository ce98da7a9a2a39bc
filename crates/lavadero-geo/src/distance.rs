//! Great-circle distance between coordinate pairs.

use lavadero_types::GeoPoint;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Returns the haversine distance between two points in kilometers.
///
/// Pure and deterministic; symmetric within floating-point tolerance,
/// and zero for identical points.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
	let lat_a = a.lat.to_radians();
	let lat_b = b.lat.to_radians();
	let delta_lat = (b.lat - a.lat).to_radians();
	let delta_lng = (b.lng - a.lng).to_radians();

	let h = (delta_lat / 2.0).sin().powi(2)
		+ lat_a.cos() * lat_b.cos() * (delta_lng / 2.0).sin().powi(2);
	let c = 2.0 * h.sqrt().asin();

	EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identical_points_are_zero_apart() {
		let p = GeoPoint::new(-34.6037, -58.3816);
		assert_eq!(haversine_km(p, p), 0.0);
	}

	#[test]
	fn distance_is_symmetric() {
		// Obelisco to La Plata cathedral
		let a = GeoPoint::new(-34.6037, -58.3816);
		let b = GeoPoint::new(-34.9206, -57.9537);
		let ab = haversine_km(a, b);
		let ba = haversine_km(b, a);
		assert!((ab - ba).abs() < 1e-9);
	}

	#[test]
	fn known_distance_is_in_range() {
		// Buenos Aires to La Plata is roughly 52 km in a straight line.
		let a = GeoPoint::new(-34.6037, -58.3816);
		let b = GeoPoint::new(-34.9206, -57.9537);
		let d = haversine_km(a, b);
		assert!(d > 45.0 && d < 60.0, "got {}", d);
	}
}
