//! Dataset equality assertions.
//!
//! Two datasets are equal when they hold the same tables (names compared
//! without regard to case), each table has the same columns and row count,
//! and every cell holds an equal value. Table order and column order do not
//! matter; row order does.

use fixturekit_seeding::{Dataset, Table, Value, exact_integer, parse_boolean};
use thiserror::Error;

/// The first, or every, difference between an expected and an actual dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetMismatch {
	/// An expected table is absent.
	#[error("Expected table {table} is missing")]
	MissingTable {
		/// Table name.
		table: String,
	},

	/// The actual dataset holds a table that is not expected.
	#[error("Unexpected table {table}")]
	UnexpectedTable {
		/// Table name.
		table: String,
	},

	/// Column sets differ.
	#[error("Table {table}: expected columns [{}] but was [{}]", .expected.join(", "), .actual.join(", "))]
	Columns {
		/// Table name.
		table: String,
		/// Expected column names.
		expected: Vec<String>,
		/// Actual column names.
		actual: Vec<String>,
	},

	/// Row counts differ.
	#[error("Table {table}: expected {expected} rows but was {actual}")]
	RowCount {
		/// Table name.
		table: String,
		/// Expected row count.
		expected: usize,
		/// Actual row count.
		actual: usize,
	},

	/// One cell differs.
	#[error("Table {table}, row {row}, column {column}: expected <{expected}> but was <{actual}>")]
	Value {
		/// Table name.
		table: String,
		/// Zero-based row index.
		row: usize,
		/// Column name.
		column: String,
		/// Expected value.
		expected: Value,
		/// Actual value.
		actual: Value,
	},

	/// Several differences, in discovery order.
	#[error("{} differences:\n{}", .0.len(), list(.0))]
	Multiple(Vec<DatasetMismatch>),
}

fn list(mismatches: &[DatasetMismatch]) -> String {
	mismatches
		.iter()
		.map(|m| format!("  - {}", m))
		.collect::<Vec<_>>()
		.join("\n")
}

/// Value equality used by the assertions.
///
/// Nulls only equal nulls. When either side is a number both sides are
/// compared numerically, so `"9001"` equals `9001`. Integers compare
/// exactly and a real only equals an integer it holds exactly. Two NaNs are
/// equal. When either side is a boolean the other side may be spelled
/// `true`, `false`, `1` or `0`. Everything else compares by text form.
///
/// # Examples
///
/// ```
/// use fixturekit_seeding::Value;
/// use fixturekit_test::values_equal;
///
/// assert!(values_equal(&Value::from("4.50"), &Value::Real(4.5)));
/// assert!(values_equal(&Value::from("1"), &Value::Boolean(true)));
/// assert!(!values_equal(&Value::Null, &Value::from("")));
/// ```
pub fn values_equal(expected: &Value, actual: &Value) -> bool {
	match (expected, actual) {
		(Value::Null, Value::Null) => true,
		(Value::Null, _) | (_, Value::Null) => false,
		(Value::Boolean(_), _) | (_, Value::Boolean(_)) => {
			match (as_boolean(expected), as_boolean(actual)) {
				(Some(a), Some(b)) => a == b,
				_ => false,
			}
		}
		(Value::Integer(_) | Value::Real(_), _) | (_, Value::Integer(_) | Value::Real(_)) => {
			match (as_number(expected), as_number(actual)) {
				(Some(a), Some(b)) => a.matches(b),
				_ => false,
			}
		}
		_ => expected.to_text() == actual.to_text(),
	}
}

#[derive(Debug, Clone, Copy)]
enum Number {
	Integer(i64),
	Real(f64),
}

impl Number {
	fn matches(self, other: Number) -> bool {
		match (self, other) {
			(Number::Integer(a), Number::Integer(b)) => a == b,
			(Number::Real(a), Number::Real(b)) => a == b || (a.is_nan() && b.is_nan()),
			(Number::Integer(i), Number::Real(r)) | (Number::Real(r), Number::Integer(i)) => {
				exact_integer(r) == Some(i)
			}
		}
	}
}

fn as_number(value: &Value) -> Option<Number> {
	match value {
		Value::Integer(i) => Some(Number::Integer(*i)),
		Value::Real(r) => Some(Number::Real(*r)),
		Value::Text(s) => {
			let trimmed = s.trim();
			match trimmed.parse::<i64>() {
				Ok(i) => Some(Number::Integer(i)),
				Err(_) => trimmed.parse::<f64>().ok().map(Number::Real),
			}
		}
		_ => None,
	}
}

fn as_boolean(value: &Value) -> Option<bool> {
	match value {
		Value::Boolean(b) => Some(*b),
		Value::Integer(0) => Some(false),
		Value::Integer(1) => Some(true),
		Value::Text(s) => parse_boolean(s),
		_ => None,
	}
}

fn table_mismatches(expected: &Table, actual: &Table, out: &mut Vec<DatasetMismatch>, first_only: bool) {
	let table = expected.name().to_string();

	let mapping: Option<Vec<usize>> = expected
		.columns()
		.iter()
		.map(|c| actual.column_index(&c.name))
		.collect();
	let mapping = match mapping {
		Some(mapping) if expected.columns().len() == actual.columns().len() => mapping,
		_ => {
			out.push(DatasetMismatch::Columns {
				table,
				expected: expected.column_names().iter().map(|c| c.to_string()).collect(),
				actual: actual.column_names().iter().map(|c| c.to_string()).collect(),
			});
			return;
		}
	};

	if expected.row_count() != actual.row_count() {
		out.push(DatasetMismatch::RowCount {
			table,
			expected: expected.row_count(),
			actual: actual.row_count(),
		});
		return;
	}

	for (row, (expected_row, actual_row)) in expected.rows().iter().zip(actual.rows()).enumerate() {
		for (position, (column, &index)) in expected.columns().iter().zip(&mapping).enumerate() {
			let want = expected_row.get(position).unwrap_or(&Value::Null);
			let got = actual_row.get(index).unwrap_or(&Value::Null);
			if !values_equal(want, got) {
				out.push(DatasetMismatch::Value {
					table: table.clone(),
					row,
					column: column.name.clone(),
					expected: want.clone(),
					actual: got.clone(),
				});
				if first_only {
					return;
				}
			}
		}
	}
}

fn dataset_mismatches(expected: &Dataset, actual: &Dataset, first_only: bool) -> Vec<DatasetMismatch> {
	let mut out = Vec::new();
	for table in expected {
		match actual.table(table.name()) {
			Some(found) => table_mismatches(table, found, &mut out, first_only),
			None => out.push(DatasetMismatch::MissingTable {
				table: table.name().to_string(),
			}),
		}
		if first_only && !out.is_empty() {
			return out;
		}
	}
	for table in actual {
		if expected.table(table.name()).is_none() {
			out.push(DatasetMismatch::UnexpectedTable {
				table: table.name().to_string(),
			});
			if first_only {
				return out;
			}
		}
	}
	out
}

/// Compares two tables, reporting the first difference.
pub fn compare_tables(expected: &Table, actual: &Table) -> Result<(), DatasetMismatch> {
	let mut out = Vec::new();
	table_mismatches(expected, actual, &mut out, true);
	out.into_iter().next().map_or(Ok(()), Err)
}

/// Compares two datasets, reporting the first difference.
pub fn compare_datasets(expected: &Dataset, actual: &Dataset) -> Result<(), DatasetMismatch> {
	dataset_mismatches(expected, actual, true)
		.into_iter()
		.next()
		.map_or(Ok(()), Err)
}

/// Compares two datasets, reporting every difference.
///
/// Structural differences in a table (columns, row count) hide the cell
/// differences of that table.
pub fn compare_datasets_all(expected: &Dataset, actual: &Dataset) -> Result<(), DatasetMismatch> {
	let mut mismatches = dataset_mismatches(expected, actual, false);
	match mismatches.len() {
		0 => Ok(()),
		1 => Err(mismatches.remove(0)),
		_ => Err(DatasetMismatch::Multiple(mismatches)),
	}
}

/// Panics unless both tables are equal.
#[track_caller]
pub fn assert_table_eq(expected: &Table, actual: &Table) {
	if let Err(mismatch) = compare_tables(expected, actual) {
		panic!("Table assertion failed: {}", mismatch);
	}
}

/// Panics unless both datasets are equal.
#[track_caller]
pub fn assert_dataset_eq(expected: &Dataset, actual: &Dataset) {
	if let Err(mismatch) = compare_datasets_all(expected, actual) {
		panic!("Dataset assertion failed: {}", mismatch);
	}
}
