//! Cell values and column types.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{SeedingError, SeedingResult};

/// Type of a column.
///
/// Fixture columns start as [`DataType::Unknown`]; columns read from a live
/// database carry the type declared in its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
	/// Type not known; values are kept as parsed.
	#[default]
	Unknown,
	/// Boolean column.
	Boolean,
	/// Integer column of any width.
	Integer,
	/// Floating point or fixed precision numeric column.
	Real,
	/// Character column.
	Text,
	/// Binary column.
	Bytes,
}

impl DataType {
	/// Map a declared SQL type name onto a [`DataType`].
	///
	/// Follows SQLite's affinity rules, which also cover the type names used
	/// by PostgreSQL and MySQL catalogs.
	///
	/// # Example
	///
	/// ```
	/// # use fixturekit_seeding::DataType;
	/// assert_eq!(DataType::from_sql_type("BIGINT"), DataType::Integer);
	/// assert_eq!(DataType::from_sql_type("numeric(10,2)"), DataType::Real);
	/// assert_eq!(DataType::from_sql_type("VARCHAR(64)"), DataType::Text);
	/// assert_eq!(DataType::from_sql_type("bytea"), DataType::Bytes);
	/// ```
	pub fn from_sql_type(declared: &str) -> Self {
		let upper = declared.trim().to_uppercase();
		if upper.is_empty() {
			return Self::Unknown;
		}
		if upper.starts_with("BOOL") || upper == "BIT" || upper == "TINYINT(1)" {
			Self::Boolean
		} else if upper.contains("INT") {
			Self::Integer
		} else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
			Self::Text
		} else if upper.contains("BLOB") || upper.contains("BYTEA") || upper.contains("BINARY") {
			Self::Bytes
		} else if ["REAL", "FLOA", "DOUB", "NUMERIC", "DECIMAL"]
			.iter()
			.any(|t| upper.contains(t))
		{
			Self::Real
		} else {
			Self::Text
		}
	}

	/// Lower-case type name.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Unknown => "unknown",
			Self::Boolean => "boolean",
			Self::Integer => "integer",
			Self::Real => "real",
			Self::Text => "text",
			Self::Bytes => "bytes",
		}
	}
}

impl fmt::Display for DataType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// A nullable scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// SQL NULL.
	Null,
	/// Boolean.
	Boolean(bool),
	/// 64-bit integer.
	Integer(i64),
	/// 64-bit float.
	Real(f64),
	/// Character data.
	Text(String),
	/// Binary data.
	Bytes(Vec<u8>),
}

impl Value {
	/// Returns true for [`Value::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Natural type of this value.
	pub fn data_type(&self) -> DataType {
		match self {
			Self::Null => DataType::Unknown,
			Self::Boolean(_) => DataType::Boolean,
			Self::Integer(_) => DataType::Integer,
			Self::Real(_) => DataType::Real,
			Self::Text(_) => DataType::Text,
			Self::Bytes(_) => DataType::Bytes,
		}
	}

	/// Text form used in fixture files, `None` for null.
	///
	/// Binary data is written as base64.
	pub fn to_text(&self) -> Option<String> {
		match self {
			Self::Null => None,
			Self::Boolean(b) => Some(b.to_string()),
			Self::Integer(i) => Some(i.to_string()),
			Self::Real(r) => Some(r.to_string()),
			Self::Text(s) => Some(s.clone()),
			Self::Bytes(b) => Some(BASE64.encode(b)),
		}
	}

	/// Convert to the representation expected by a column of type `target`.
	///
	/// Null stays null and [`DataType::Unknown`] leaves the value untouched.
	///
	/// # Example
	///
	/// ```
	/// # use fixturekit_seeding::{DataType, Value};
	/// let v = Value::from("9001").coerce(DataType::Integer).unwrap();
	/// assert_eq!(v, Value::Integer(9001));
	/// assert!(Value::from("n/a").coerce(DataType::Integer).is_err());
	/// ```
	pub fn coerce(&self, target: DataType) -> SeedingResult<Value> {
		let fail = || SeedingError::Conversion {
			value: self.to_text().unwrap_or_default(),
			target: target.name().to_string(),
		};

		let converted = match (self, target) {
			(Self::Null, _) | (_, DataType::Unknown) => self.clone(),

			(Self::Integer(_), DataType::Integer) => self.clone(),
			(Self::Real(r), DataType::Integer) => Self::Integer(exact_integer(*r).ok_or_else(fail)?),
			(Self::Boolean(b), DataType::Integer) => Self::Integer(i64::from(*b)),
			(Self::Text(s), DataType::Integer) => {
				let trimmed = s.trim();
				match trimmed.parse::<i64>() {
					Ok(i) => Self::Integer(i),
					Err(_) => match trimmed.parse::<f64>().ok().and_then(exact_integer) {
						Some(i) => Self::Integer(i),
						None => return Err(fail()),
					},
				}
			}

			(Self::Real(_), DataType::Real) => self.clone(),
			(Self::Integer(i), DataType::Real) => Self::Real(*i as f64),
			(Self::Boolean(b), DataType::Real) => Self::Real(if *b { 1.0 } else { 0.0 }),
			(Self::Text(s), DataType::Real) => {
				Self::Real(s.trim().parse::<f64>().map_err(|_| fail())?)
			}

			(Self::Boolean(_), DataType::Boolean) => self.clone(),
			(Self::Integer(i), DataType::Boolean) => Self::Boolean(*i != 0),
			(Self::Text(s), DataType::Boolean) => {
				Self::Boolean(parse_boolean(s).ok_or_else(fail)?)
			}

			(Self::Bytes(_), DataType::Bytes) => self.clone(),
			(Self::Text(s), DataType::Bytes) => Self::Bytes(
				BASE64
					.decode(s.trim())
					.unwrap_or_else(|_| s.as_bytes().to_vec()),
			),

			(_, DataType::Text) => Self::Text(self.to_text().unwrap_or_default()),
			(other, DataType::Bytes) => {
				Self::Bytes(other.to_text().unwrap_or_default().into_bytes())
			}
			_ => return Err(fail()),
		};
		Ok(converted)
	}
}

/// The integer `r` holds exactly, if it is whole and fits an `i64`.
///
/// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
pub fn exact_integer(r: f64) -> Option<i64> {
	const LIMIT: f64 = 9_223_372_036_854_775_808.0;
	if r.is_finite() && r.fract() == 0.0 && (-LIMIT..LIMIT).contains(&r) {
		Some(r as i64)
	} else {
		None
	}
}

/// Interpret common boolean spellings.
pub fn parse_boolean(text: &str) -> Option<bool> {
	match text.trim().to_lowercase().as_str() {
		"true" | "t" | "1" | "yes" | "y" => Some(true),
		"false" | "f" | "0" | "no" | "n" => Some(false),
		_ => None,
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.to_text() {
			Some(text) => write!(f, "{}", text),
			None => f.write_str("NULL"),
		}
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Integer(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Integer(i64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Real(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Boolean(value)
	}
}

impl From<Vec<u8>> for Value {
	fn from(value: Vec<u8>) -> Self {
		Self::Bytes(value)
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(Self::Null)
	}
}
