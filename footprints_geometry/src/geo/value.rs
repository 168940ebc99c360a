//! Scalar property values. Nested values cannot be represented.

use serde::{Serialize, Serializer};
use std::{
	fmt::{self, Debug, Display},
	hash::{Hash, Hasher},
};

#[derive(Clone, PartialEq)]
pub enum GeoValue {
	Bool(bool),
	Double(f64),
	Int(i64),
	Null,
	String(String),
	UInt(u64),
}

impl GeoValue {
	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			GeoValue::String(s) => Some(s),
			_ => None,
		}
	}

	/// Numeric value as `f64`, `None` for strings, booleans and null.
	#[must_use]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			GeoValue::Double(v) => Some(*v),
			GeoValue::Int(v) => Some(*v as f64),
			GeoValue::UInt(v) => Some(*v as f64),
			_ => None,
		}
	}
}

impl Eq for GeoValue {}

// doubles hash by bit pattern so that values can key the property tables of a layer
impl Hash for GeoValue {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			GeoValue::Bool(v) => v.hash(state),
			GeoValue::Double(v) => v.to_bits().hash(state),
			GeoValue::Int(v) => v.hash(state),
			GeoValue::Null => {}
			GeoValue::String(v) => v.hash(state),
			GeoValue::UInt(v) => v.hash(state),
		}
	}
}

impl Serialize for GeoValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			GeoValue::Bool(v) => serializer.serialize_bool(*v),
			GeoValue::Double(v) => serializer.serialize_f64(*v),
			GeoValue::Int(v) => serializer.serialize_i64(*v),
			GeoValue::Null => serializer.serialize_unit(),
			GeoValue::String(v) => serializer.serialize_str(v),
			GeoValue::UInt(v) => serializer.serialize_u64(*v),
		}
	}
}

impl Debug for GeoValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GeoValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
			GeoValue::Double(v) => f.debug_tuple("Double").field(v).finish(),
			GeoValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
			GeoValue::Null => f.write_str("Null"),
			GeoValue::String(v) => f.debug_tuple("String").field(v).finish(),
			GeoValue::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
		}
	}
}

impl Display for GeoValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			GeoValue::Bool(v) => write!(f, "{v}"),
			GeoValue::Double(v) => write!(f, "{v}"),
			GeoValue::Int(v) => write!(f, "{v}"),
			GeoValue::Null => f.write_str("null"),
			GeoValue::String(v) => f.write_str(v),
			GeoValue::UInt(v) => write!(f, "{v}"),
		}
	}
}

impl From<&str> for GeoValue {
	fn from(value: &str) -> Self {
		GeoValue::String(value.to_string())
	}
}

impl From<String> for GeoValue {
	fn from(value: String) -> Self {
		GeoValue::String(value)
	}
}

impl From<bool> for GeoValue {
	fn from(value: bool) -> Self {
		GeoValue::Bool(value)
	}
}

impl From<f64> for GeoValue {
	fn from(value: f64) -> Self {
		GeoValue::Double(value)
	}
}

impl From<f32> for GeoValue {
	fn from(value: f32) -> Self {
		GeoValue::Double(f64::from(value))
	}
}

impl From<i64> for GeoValue {
	fn from(value: i64) -> Self {
		GeoValue::Int(value)
	}
}

impl From<i32> for GeoValue {
	fn from(value: i32) -> Self {
		if value < 0 {
			GeoValue::Int(i64::from(value))
		} else {
			GeoValue::UInt(value as u64)
		}
	}
}

impl From<u64> for GeoValue {
	fn from(value: u64) -> Self {
		GeoValue::UInt(value)
	}
}

impl From<u32> for GeoValue {
	fn from(value: u32) -> Self {
		GeoValue::UInt(u64::from(value))
	}
}
