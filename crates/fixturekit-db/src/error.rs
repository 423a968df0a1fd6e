//! Error types for database access.

use std::path::PathBuf;

use fixturekit_conf::ConfigError;
use fixturekit_seeding::SeedingError;
use thiserror::Error;

use crate::operation::DatabaseOperation;

/// Errors raised while connecting, preparing the schema, applying datasets
/// or reading tables back.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DatabaseError {
	/// The datasource profile is unusable.
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),

	/// No connection could be established or acquired.
	#[error("Connection error: {0}")]
	Connection(#[source] sqlx::Error),

	/// The schema script could not be read.
	#[error("Unable to read schema script {}: {source}", .path.display())]
	SchemaRead {
		/// Script path.
		path: PathBuf,
		/// Underlying I/O failure.
		#[source]
		source: std::io::Error,
	},

	/// The schema script failed to execute.
	#[error("Schema execution failed for {origin}: {source}")]
	SchemaExecution {
		/// Script path or label.
		origin: String,
		/// Database failure.
		#[source]
		source: sqlx::Error,
	},

	/// A catalog or data query failed outside of a dataset operation.
	#[error("{context}: {source}")]
	Query {
		/// What was being done.
		context: String,
		/// Database failure.
		#[source]
		source: sqlx::Error,
	},

	/// A statement issued for one dataset row failed.
	#[error("{operation} failed on table {table}, row {row}: {source}")]
	Apply {
		/// Operation being applied.
		operation: DatabaseOperation,
		/// Table name.
		table: String,
		/// Zero-based row index within the dataset table.
		row: usize,
		/// Database failure.
		#[source]
		source: sqlx::Error,
	},

	/// A fixture value does not fit the live column type.
	#[error("Table {table}, row {row}, column {column}: {source}")]
	Conversion {
		/// Table name.
		table: String,
		/// Zero-based row index.
		row: usize,
		/// Column name.
		column: String,
		/// Conversion failure.
		#[source]
		source: SeedingError,
	},

	/// The operation matches rows by key but none were declared.
	#[error("{operation} requires key columns for table {table}")]
	MissingKeyColumns {
		/// Operation being applied.
		operation: DatabaseOperation,
		/// Table name.
		table: String,
	},

	/// A declared key column is absent from the dataset table.
	#[error("Key column {column} is not part of the dataset for table {table}")]
	KeyColumnMissing {
		/// Table name.
		table: String,
		/// Key column name.
		column: String,
	},

	/// A column does not exist in the live table.
	#[error("Column {column} does not exist in table {table}")]
	UnknownColumn {
		/// Table name.
		table: String,
		/// Column name.
		column: String,
	},

	/// UPDATE found no live row with the dataset row's key.
	#[error("{operation} found no row in table {table} matching dataset row {row}")]
	RowNotFound {
		/// Operation being applied.
		operation: DatabaseOperation,
		/// Table name.
		table: String,
		/// Zero-based row index.
		row: usize,
	},

	/// The table does not exist in the database.
	#[error("No such table: {0}")]
	NoSuchTable(String),

	/// A table or column name cannot be used in generated SQL.
	#[error("Invalid SQL identifier: '{0}'")]
	InvalidIdentifier(String),

	/// Operation name not recognized.
	#[error("Unknown database operation: {0}")]
	UnknownOperation(String),

	/// Building a dataset failed.
	#[error(transparent)]
	Seeding(#[from] SeedingError),
}

impl DatabaseError {
	pub(crate) fn query(context: impl Into<String>) -> impl FnOnce(sqlx::Error) -> Self {
		let context = context.into();
		move |source| Self::Query { context, source }
	}
}

/// Result type alias for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
