//! Configuration validation types for backend configs.
//!
//! Backend implementations receive their configuration as raw TOML
//! tables. This module provides a small schema framework used to check
//! those tables before a backend is constructed, with typed errors that
//! name the offending field.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// A required field is absent from the configuration table.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// A field is present but carries an unacceptable value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// A field has the wrong TOML type.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Expected type of a configuration field.
#[derive(Debug, Clone)]
pub enum FieldType {
	/// A string value.
	String,
	/// An integer, optionally bounded inclusively on either side.
	Integer {
		min: Option<i64>,
		max: Option<i64>,
	},
	/// A floating-point value. Integers are accepted and widened.
	Float,
	/// A boolean value.
	Boolean,
	/// An array whose elements all share one type.
	Array(Box<FieldType>),
}

impl FieldType {
	fn name(&self) -> &'static str {
		match self {
			FieldType::String => "string",
			FieldType::Integer { .. } => "integer",
			FieldType::Float => "float",
			FieldType::Boolean => "boolean",
			FieldType::Array(_) => "array",
		}
	}

	fn check(&self, field: &str, value: &toml::Value) -> Result<(), ValidationError> {
		let mismatch = || ValidationError::TypeMismatch {
			field: field.to_string(),
			expected: self.name().to_string(),
			actual: value.type_str().to_string(),
		};

		match self {
			FieldType::String => value.as_str().map(|_| ()).ok_or_else(mismatch),
			FieldType::Integer { min, max } => {
				let n = value.as_integer().ok_or_else(mismatch)?;
				if let Some(min) = min {
					if n < *min {
						return Err(ValidationError::InvalidValue {
							field: field.to_string(),
							message: format!("{} is below the minimum {}", n, min),
						});
					}
				}
				if let Some(max) = max {
					if n > *max {
						return Err(ValidationError::InvalidValue {
							field: field.to_string(),
							message: format!("{} is above the maximum {}", n, max),
						});
					}
				}
				Ok(())
			},
			FieldType::Float => {
				if value.as_float().is_some() || value.as_integer().is_some() {
					Ok(())
				} else {
					Err(mismatch())
				}
			},
			FieldType::Boolean => value.as_bool().map(|_| ()).ok_or_else(mismatch),
			FieldType::Array(inner) => {
				let items = value.as_array().ok_or_else(mismatch)?;
				for item in items {
					inner.check(field, item)?;
				}
				Ok(())
			},
		}
	}
}

/// A named field within a configuration schema.
#[derive(Debug, Clone)]
pub struct Field {
	pub name: &'static str,
	pub field_type: FieldType,
}

impl Field {
	pub fn new(name: &'static str, field_type: FieldType) -> Self {
		Self { name, field_type }
	}
}

/// Validation schema for one backend's configuration table.
///
/// Required fields must be present; optional fields are type-checked
/// only when present. Unknown fields are ignored.
#[derive(Debug, Clone)]
pub struct Schema {
	required: Vec<Field>,
	optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.to_string()))?;
			field.field_type.check(field.name, value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(field.name) {
				field.field_type.check(field.name, value)?;
			}
		}

		Ok(())
	}
}

/// Trait implemented by each backend to expose its configuration schema.
pub trait ConfigSchema: Send + Sync {
	/// Validates the raw TOML configuration for this backend.
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(s: &str) -> toml::Value {
		s.parse().unwrap()
	}

	#[test]
	fn required_field_missing_is_reported() {
		let schema = Schema::new(vec![Field::new("endpoint", FieldType::String)], vec![]);
		let err = schema.validate(&parse("other = 1")).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "endpoint"));
	}

	#[test]
	fn integer_bounds_are_enforced() {
		let schema = Schema::new(
			vec![Field::new(
				"cooldown_ms",
				FieldType::Integer {
					min: Some(1000),
					max: None,
				},
			)],
			vec![],
		);
		assert!(schema.validate(&parse("cooldown_ms = 1100")).is_ok());
		assert!(schema.validate(&parse("cooldown_ms = 500")).is_err());
	}

	#[test]
	fn float_accepts_integers() {
		let schema = Schema::new(vec![Field::new("lat", FieldType::Float)], vec![]);
		assert!(schema.validate(&parse("lat = -34.6")).is_ok());
		assert!(schema.validate(&parse("lat = -34")).is_ok());
		assert!(schema.validate(&parse("lat = \"x\"")).is_err());
	}

	#[test]
	fn array_elements_are_checked() {
		let schema = Schema::new(
			vec![Field::new(
				"bounding_box",
				FieldType::Array(Box::new(FieldType::Float)),
			)],
			vec![],
		);
		assert!(schema
			.validate(&parse("bounding_box = [-59.0, -35.0, -58.0, -34.0]"))
			.is_ok());
		assert!(schema
			.validate(&parse("bounding_box = [\"w\", \"s\"]"))
			.is_err());
	}
}
