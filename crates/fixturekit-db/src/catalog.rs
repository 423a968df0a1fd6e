//! Live table metadata.

use fixturekit_seeding::{Column, DataType};
use sqlx::{AnyConnection, Row};

use crate::dialect::{ColumnInfo, Dialect, validate_identifier};
use crate::error::{DatabaseError, DatabaseResult};

/// A live table and its columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
	/// Table name as stored in the catalog.
	pub name: String,
	/// Columns in declaration order.
	pub columns: Vec<ColumnInfo>,
}

impl TableInfo {
	/// Column by name, ignoring case.
	pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
		self.columns
			.iter()
			.find(|c| c.name.eq_ignore_ascii_case(name))
	}

	/// Catalog columns as dataset columns.
	pub fn dataset_columns(&self) -> Vec<Column> {
		self.columns
			.iter()
			.map(|c| Column::typed(c.name.clone(), c.data_type))
			.collect()
	}

	/// Column types in declaration order.
	pub fn column_types(&self) -> Vec<DataType> {
		self.columns.iter().map(|c| c.data_type).collect()
	}
}

/// Names of the user tables visible through `conn`.
pub async fn table_names(conn: &mut AnyConnection, dialect: Dialect) -> DatabaseResult<Vec<String>> {
	let rows = sqlx::query(dialect.list_tables_sql())
		.fetch_all(&mut *conn)
		.await
		.map_err(DatabaseError::query("Failed to list tables"))?;

	rows.iter()
		.map(|row| {
			row.try_get::<String, _>(0)
				.map_err(DatabaseError::query("Failed to read table name"))
		})
		.collect()
}

/// Metadata for the table called `name`, matched without regard to case.
///
/// # Errors
///
/// Returns [`DatabaseError::NoSuchTable`] when the catalog has no such table.
pub async fn table_info(conn: &mut AnyConnection, dialect: Dialect, name: &str) -> DatabaseResult<TableInfo> {
	validate_identifier(name)?;

	let stored = table_names(conn, dialect)
		.await?
		.into_iter()
		.find(|t| t.eq_ignore_ascii_case(name))
		.ok_or_else(|| DatabaseError::NoSuchTable(name.to_string()))?;

	let rows = sqlx::query(dialect.columns_sql())
		.bind(stored.clone())
		.fetch_all(&mut *conn)
		.await
		.map_err(DatabaseError::query(format!("Failed to read columns of {}", stored)))?;

	let columns = rows
		.iter()
		.map(|row| {
			let column: String = row.try_get(0)?;
			let declared: Option<String> = row.try_get(1)?;
			Ok(ColumnInfo::new(column, declared.unwrap_or_default()))
		})
		.collect::<Result<Vec<_>, sqlx::Error>>()
		.map_err(DatabaseError::query(format!("Failed to read columns of {}", stored)))?;

	tracing::trace!(table = %stored, columns = columns.len(), "Resolved table metadata");
	Ok(TableInfo {
		name: stored,
		columns,
	})
}
