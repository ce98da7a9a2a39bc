//! Registry trait for self-registering backend implementations.
//!
//! Each pluggable backend module (storage, geocoder) provides a Registry
//! struct implementing this trait, declaring the name used to reference it
//! from configuration together with its factory function.

/// Base trait for implementation registries.
///
/// The name must match the key used in the TOML configuration, for
/// example `"memory"` for `storage.implementations.memory` or
/// `"nominatim"` for `geocoder.implementations.nominatim`.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	///
	/// Each module defines its own factory type, for example
	/// `StorageFactory` for storage backends or `GeocoderFactory` for
	/// geocoder backends.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
