//! Dataset operations.
//!
//! A [`DatabaseOperation`] reconciles the rows of a [`Dataset`] with the
//! live tables of the same names. Tables are processed in dataset order;
//! deletions run in reverse dataset order so that child tables listed after
//! their parents are emptied first.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use fixturekit_seeding::{Dataset, Table, Value};
use sqlx::AnyConnection;

use crate::catalog::{TableInfo, table_info};
use crate::datasource::DataSource;
use crate::dialect::{ColumnInfo, Dialect, validate_identifier};
use crate::error::{DatabaseError, DatabaseResult};
use crate::row::bind_value;

/// How a dataset is reconciled with the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseOperation {
	/// Leaves the database untouched.
	None,
	/// Inserts every dataset row. Existing rows with the same key make the
	/// operation fail.
	Insert,
	/// Empties every dataset table, then inserts the dataset rows.
	CleanInsert,
	/// Updates rows whose key matches a dataset row and inserts the others.
	/// Rows absent from the dataset are kept.
	Refresh,
	/// Updates rows by key; every dataset row must already exist.
	Update,
	/// Deletes the rows whose key matches a dataset row.
	Delete,
	/// Deletes every row of the dataset tables.
	DeleteAll,
}

impl DatabaseOperation {
	/// All operations, in declaration order.
	pub const ALL: [DatabaseOperation; 7] = [
		Self::None,
		Self::Insert,
		Self::CleanInsert,
		Self::Refresh,
		Self::Update,
		Self::Delete,
		Self::DeleteAll,
	];

	/// Canonical upper-case name.
	pub fn name(&self) -> &'static str {
		match self {
			Self::None => "NONE",
			Self::Insert => "INSERT",
			Self::CleanInsert => "CLEAN_INSERT",
			Self::Refresh => "REFRESH",
			Self::Update => "UPDATE",
			Self::Delete => "DELETE",
			Self::DeleteAll => "DELETE_ALL",
		}
	}

	/// Whether rows are matched by key columns.
	pub fn requires_keys(&self) -> bool {
		matches!(self, Self::Refresh | Self::Update | Self::Delete)
	}

	/// Applies `dataset` through a connection of `source`.
	///
	/// With [`ApplyOptions::use_transaction`] set, all statements run in one
	/// transaction that is rolled back on the first error.
	///
	/// # Errors
	///
	/// - [`DatabaseError::NoSuchTable`] or [`DatabaseError::UnknownColumn`]
	///   when the dataset names something the database lacks
	/// - [`DatabaseError::MissingKeyColumns`] when a key based operation has
	///   no key for a table
	/// - [`DatabaseError::Conversion`] when a value does not fit its column
	/// - [`DatabaseError::Apply`] when a statement fails
	/// - [`DatabaseError::RowNotFound`] when UPDATE meets a missing row
	pub async fn execute(
		self,
		source: &DataSource,
		dataset: &Dataset,
		options: &ApplyOptions,
	) -> DatabaseResult<ApplyReport> {
		tracing::info!(
			datasource = source.name(),
			operation = %self,
			tables = dataset.len(),
			rows = dataset.row_count(),
			"Applying dataset"
		);

		if self == Self::None {
			return Ok(ApplyReport::default());
		}

		let dialect = source.dialect();
		if !options.use_transaction {
			let mut conn = source.connect().await?;
			return self.run(&mut *conn, dialect, dataset, &options.keys).await;
		}

		let mut tx = source
			.pool()
			.begin()
			.await
			.map_err(DatabaseError::Connection)?;
		match self.run(&mut *tx, dialect, dataset, &options.keys).await {
			Ok(report) => {
				tx.commit().await.map_err(DatabaseError::Connection)?;
				Ok(report)
			}
			Err(error) => {
				tracing::warn!(operation = %self, error = %error, "Rolling back dataset operation");
				if let Err(rollback) = tx.rollback().await {
					tracing::warn!(error = %rollback, "Rollback failed");
				}
				Err(error)
			}
		}
	}

	async fn run(
		self,
		conn: &mut AnyConnection,
		dialect: Dialect,
		dataset: &Dataset,
		keys: &KeyColumns,
	) -> DatabaseResult<ApplyReport> {
		let mut plans = Vec::with_capacity(dataset.len());
		for table in dataset {
			plans.push(TablePlan::resolve(conn, dialect, table, self, keys).await?);
		}

		let mut report = ApplyReport {
			tables: plans.len(),
			..ApplyReport::default()
		};
		match self {
			Self::None => {}
			Self::Insert => {
				for plan in &plans {
					report.inserted += plan.insert_all(conn, self).await?;
				}
			}
			Self::CleanInsert => {
				for plan in plans.iter().rev() {
					report.deleted += plan.delete_all(conn, self).await?;
				}
				for plan in &plans {
					report.inserted += plan.insert_all(conn, self).await?;
				}
			}
			Self::Refresh => {
				for plan in &plans {
					for row in 0..plan.table.row_count() {
						if plan.exists(conn, self, row).await? {
							report.updated += plan.update(conn, self, row).await?;
						} else {
							report.inserted += plan.insert(conn, self, row).await?;
						}
					}
				}
			}
			Self::Update => {
				for plan in &plans {
					for row in 0..plan.table.row_count() {
						if !plan.exists(conn, self, row).await? {
							return Err(DatabaseError::RowNotFound {
								operation: self,
								table: plan.table.name().to_string(),
								row,
							});
						}
						report.updated += plan.update(conn, self, row).await?;
					}
				}
			}
			Self::Delete => {
				for plan in plans.iter().rev() {
					for row in (0..plan.table.row_count()).rev() {
						report.deleted += plan.delete(conn, self, row).await?;
					}
				}
			}
			Self::DeleteAll => {
				for plan in plans.iter().rev() {
					report.deleted += plan.delete_all(conn, self).await?;
				}
			}
		}

		tracing::debug!(
			operation = %self,
			inserted = report.inserted,
			updated = report.updated,
			deleted = report.deleted,
			"Dataset applied"
		);
		Ok(report)
	}
}

impl fmt::Display for DatabaseOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for DatabaseOperation {
	type Err = DatabaseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
		Self::ALL
			.into_iter()
			.find(|op| op.name() == normalized)
			.ok_or_else(|| DatabaseError::UnknownOperation(s.to_string()))
	}
}

/// Key columns per table, used to match dataset rows with live rows.
///
/// Table names are matched without regard to case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyColumns {
	tables: HashMap<String, Vec<String>>,
}

impl KeyColumns {
	/// No keys.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds the key of `table`.
	pub fn with(mut self, table: &str, columns: &[&str]) -> Self {
		self.insert(table, columns.iter().map(|c| c.to_string()).collect());
		self
	}

	/// Sets the key of `table`, replacing an earlier one.
	pub fn insert(&mut self, table: &str, columns: Vec<String>) {
		self.tables.insert(table.to_ascii_uppercase(), columns);
	}

	/// Key of `table`, if declared.
	pub fn get(&self, table: &str) -> Option<&[String]> {
		self.tables
			.get(&table.to_ascii_uppercase())
			.map(Vec::as_slice)
	}

	/// Returns true when no key is declared.
	pub fn is_empty(&self) -> bool {
		self.tables.is_empty()
	}
}

/// Settings for one dataset operation.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
	/// Key columns for REFRESH, UPDATE and DELETE.
	pub keys: KeyColumns,
	/// Run all statements in one transaction.
	pub use_transaction: bool,
}

impl Default for ApplyOptions {
	fn default() -> Self {
		Self {
			keys: KeyColumns::default(),
			use_transaction: true,
		}
	}
}

/// Row counts of an applied operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
	/// Dataset tables processed.
	pub tables: usize,
	/// Rows inserted.
	pub inserted: u64,
	/// Rows updated.
	pub updated: u64,
	/// Rows deleted.
	pub deleted: u64,
}

impl ApplyReport {
	/// Rows inserted or updated.
	pub fn written(&self) -> u64 {
		self.inserted + self.updated
	}
}

impl std::ops::AddAssign for ApplyReport {
	fn add_assign(&mut self, other: Self) {
		self.tables += other.tables;
		self.inserted += other.inserted;
		self.updated += other.updated;
		self.deleted += other.deleted;
	}
}

/// Applies datasets to one datasource with fixed options.
///
/// # Example
///
/// ```no_run
/// use fixturekit_db::{DataSource, DatabaseOperation, DatasetApplier};
/// use fixturekit_seeding::FixtureLoader;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let source = DataSource::from_profile_path("liveDB.properties").await?;
/// let dataset = FixtureLoader::new().load("authors.xml", None)?;
///
/// DatasetApplier::new(&source)
///     .with_key("ARTICLE_AUTHOR", &["AUTHOR_ID", "LANG_CODE"])
///     .apply(DatabaseOperation::Refresh, &dataset)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DatasetApplier {
	source: DataSource,
	options: ApplyOptions,
}

impl DatasetApplier {
	/// Applier with default options.
	pub fn new(source: &DataSource) -> Self {
		Self {
			source: source.clone(),
			options: ApplyOptions::default(),
		}
	}

	/// Replaces all key columns.
	pub fn with_keys(mut self, keys: KeyColumns) -> Self {
		self.options.keys = keys;
		self
	}

	/// Declares the key of one table.
	pub fn with_key(mut self, table: &str, columns: &[&str]) -> Self {
		self.options.keys = self.options.keys.with(table, columns);
		self
	}

	/// Enables or disables the enclosing transaction.
	pub fn with_transaction(mut self, enabled: bool) -> Self {
		self.options.use_transaction = enabled;
		self
	}

	/// Current options.
	pub fn options(&self) -> &ApplyOptions {
		&self.options
	}

	/// Applies `dataset` with `operation`.
	pub async fn apply(&self, operation: DatabaseOperation, dataset: &Dataset) -> DatabaseResult<ApplyReport> {
		operation.execute(&self.source, dataset, &self.options).await
	}
}

/// A dataset table matched against its live counterpart.
struct TablePlan<'a> {
	table: &'a Table,
	info: TableInfo,
	dialect: Dialect,
	/// Live column for each dataset column, in dataset order.
	columns: Vec<ColumnInfo>,
	/// Dataset column indexes forming the key.
	keys: Vec<usize>,
}

impl<'a> TablePlan<'a> {
	async fn resolve(
		conn: &mut AnyConnection,
		dialect: Dialect,
		table: &'a Table,
		operation: DatabaseOperation,
		keys: &KeyColumns,
	) -> DatabaseResult<Self> {
		let info = table_info(conn, dialect, table.name()).await?;

		let columns = table
			.columns()
			.iter()
			.map(|column| {
				validate_identifier(&column.name)?;
				info.column(&column.name)
					.cloned()
					.ok_or_else(|| DatabaseError::UnknownColumn {
						table: table.name().to_string(),
						column: column.name.clone(),
					})
			})
			.collect::<DatabaseResult<Vec<_>>>()?;

		let keys = if operation.requires_keys() {
			let declared = keys
				.get(table.name())
				.filter(|k| !k.is_empty())
				.ok_or_else(|| DatabaseError::MissingKeyColumns {
					operation,
					table: table.name().to_string(),
				})?;
			declared
				.iter()
				.map(|key| {
					table
						.column_index(key)
						.ok_or_else(|| DatabaseError::KeyColumnMissing {
							table: table.name().to_string(),
							column: key.clone(),
						})
				})
				.collect::<DatabaseResult<Vec<_>>>()?
		} else {
			Vec::new()
		};

		Ok(Self {
			table,
			info,
			dialect,
			columns,
			keys,
		})
	}

	fn bound_value(&self, row: usize, column: usize) -> DatabaseResult<Value> {
		let live = &self.columns[column];
		let value = self.table.rows()[row]
			.get(column)
			.unwrap_or(&Value::Null);
		value
			.coerce(self.dialect.bind_type(live))
			.map_err(|source| DatabaseError::Conversion {
				table: self.table.name().to_string(),
				row,
				column: live.name.clone(),
				source,
			})
	}

	/// Key predicate with parameters numbered from `first`. Null keys never
	/// match.
	fn key_predicate(&self, first: usize) -> String {
		self.keys
			.iter()
			.enumerate()
			.map(|(i, &column)| {
				let live = &self.columns[column];
				format!("{} = {}", live.name, self.dialect.value_marker(first + i, live))
			})
			.collect::<Vec<_>>()
			.join(" AND ")
	}

	async fn execute(
		&self,
		conn: &mut AnyConnection,
		operation: DatabaseOperation,
		row: usize,
		sql: &str,
		bound: &[usize],
	) -> DatabaseResult<u64> {
		let mut query = sqlx::query(sql);
		for &column in bound {
			let value = self.bound_value(row, column)?;
			query = bind_value(query, &value, self.dialect.bind_type(&self.columns[column]));
		}
		let result = query
			.execute(&mut *conn)
			.await
			.map_err(|source| self.apply_error(operation, row, source))?;
		Ok(result.rows_affected())
	}

	fn apply_error(&self, operation: DatabaseOperation, row: usize, source: sqlx::Error) -> DatabaseError {
		DatabaseError::Apply {
			operation,
			table: self.table.name().to_string(),
			row,
			source,
		}
	}

	async fn insert(&self, conn: &mut AnyConnection, operation: DatabaseOperation, row: usize) -> DatabaseResult<u64> {
		if self.columns.is_empty() {
			return Ok(0);
		}
		let names = self
			.columns
			.iter()
			.map(|c| c.name.as_str())
			.collect::<Vec<_>>()
			.join(", ");
		let markers = self
			.columns
			.iter()
			.enumerate()
			.map(|(i, c)| self.dialect.value_marker(i + 1, c))
			.collect::<Vec<_>>()
			.join(", ");
		let sql = format!("INSERT INTO {} ({}) VALUES ({})", self.info.name, names, markers);
		let bound = (0..self.columns.len()).collect::<Vec<_>>();
		self.execute(conn, operation, row, &sql, &bound).await
	}

	async fn insert_all(&self, conn: &mut AnyConnection, operation: DatabaseOperation) -> DatabaseResult<u64> {
		let mut inserted = 0;
		for row in 0..self.table.row_count() {
			inserted += self.insert(conn, operation, row).await?;
		}
		tracing::debug!(table = %self.info.name, rows = inserted, "Inserted rows");
		Ok(inserted)
	}

	async fn exists(&self, conn: &mut AnyConnection, operation: DatabaseOperation, row: usize) -> DatabaseResult<bool> {
		let sql = format!(
			"SELECT 1 FROM {} WHERE {} LIMIT 1",
			self.info.name,
			self.key_predicate(1)
		);
		let mut query = sqlx::query(&sql);
		for &column in &self.keys {
			let value = self.bound_value(row, column)?;
			query = bind_value(query, &value, self.dialect.bind_type(&self.columns[column]));
		}
		let found = query
			.fetch_optional(&mut *conn)
			.await
			.map_err(|source| self.apply_error(operation, row, source))?;
		Ok(found.is_some())
	}

	async fn update(&self, conn: &mut AnyConnection, operation: DatabaseOperation, row: usize) -> DatabaseResult<u64> {
		let assigned = (0..self.columns.len())
			.filter(|c| !self.keys.contains(c))
			.collect::<Vec<_>>();
		if assigned.is_empty() {
			return Ok(0);
		}

		let assignments = assigned
			.iter()
			.enumerate()
			.map(|(i, &column)| {
				let live = &self.columns[column];
				format!("{} = {}", live.name, self.dialect.value_marker(i + 1, live))
			})
			.collect::<Vec<_>>()
			.join(", ");
		let sql = format!(
			"UPDATE {} SET {} WHERE {}",
			self.info.name,
			assignments,
			self.key_predicate(assigned.len() + 1)
		);

		let mut bound = assigned;
		bound.extend(self.keys.iter().copied());
		self.execute(conn, operation, row, &sql, &bound).await
	}

	async fn delete(&self, conn: &mut AnyConnection, operation: DatabaseOperation, row: usize) -> DatabaseResult<u64> {
		let sql = format!("DELETE FROM {} WHERE {}", self.info.name, self.key_predicate(1));
		self.execute(conn, operation, row, &sql, &self.keys).await
	}

	async fn delete_all(&self, conn: &mut AnyConnection, operation: DatabaseOperation) -> DatabaseResult<u64> {
		let sql = format!("DELETE FROM {}", self.info.name);
		let result = sqlx::query(&sql)
			.execute(&mut *conn)
			.await
			.map_err(|source| self.apply_error(operation, 0, source))?;
		tracing::debug!(table = %self.info.name, rows = result.rows_affected(), "Deleted all rows");
		Ok(result.rows_affected())
	}
}
