//! Conversion between dataset values and driver rows.

use fixturekit_seeding::{DataType, Value};
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Row};

pub(crate) type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

/// Binds `value`, already coerced to `bind_type`.
///
/// Nulls are bound with the column's type so that server backends accept
/// them without an explicit cast.
pub(crate) fn bind_value<'q>(query: AnyQuery<'q>, value: &Value, bind_type: DataType) -> AnyQuery<'q> {
	match value {
		Value::Null => match bind_type {
			DataType::Boolean => query.bind(None::<bool>),
			DataType::Integer => query.bind(None::<i64>),
			DataType::Real => query.bind(None::<f64>),
			DataType::Bytes => query.bind(None::<Vec<u8>>),
			DataType::Text | DataType::Unknown => query.bind(None::<String>),
		},
		Value::Boolean(b) => query.bind(*b),
		Value::Integer(i) => query.bind(*i),
		Value::Real(r) => query.bind(*r),
		Value::Text(s) => query.bind(s.clone()),
		Value::Bytes(b) => query.bind(b.clone()),
	}
}

/// Reads column `index` of a driver row.
///
/// The portable row only knows its runtime value kind, so each supported
/// Rust type is tried in turn. A value none of them accepts reads as null.
pub(crate) fn decode_value(row: &AnyRow, index: usize) -> Value {
	if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
		return value.map(Value::Integer).unwrap_or(Value::Null);
	}
	if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
		return value.map(Value::Real).unwrap_or(Value::Null);
	}
	if let Ok(value) = row.try_get::<Option<String>, _>(index) {
		return value.map(Value::Text).unwrap_or(Value::Null);
	}
	if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
		return value.map(Value::Boolean).unwrap_or(Value::Null);
	}
	if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
		return value.map(Value::Bytes).unwrap_or(Value::Null);
	}
	Value::Null
}

/// Reads a driver row into values typed after the catalog columns.
///
/// SQLite stores booleans as integers and accepts any value in any column,
/// so a value that does not convert to its column type is kept as read.
pub(crate) fn decode_row(row: &AnyRow, types: &[DataType]) -> Vec<Value> {
	types
		.iter()
		.enumerate()
		.map(|(index, data_type)| {
			let raw = decode_value(row, index);
			raw.coerce(*data_type).unwrap_or(raw)
		})
		.collect()
}
