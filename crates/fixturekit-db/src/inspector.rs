//! Reading live tables back as datasets.

use fixturekit_seeding::{Dataset, Table};
use sqlx::AnyConnection;

use crate::catalog::{self, table_info};
use crate::datasource::DataSource;
use crate::dialect::Dialect;
use crate::error::{DatabaseError, DatabaseResult};
use crate::operation::KeyColumns;
use crate::row::decode_row;

/// An ordered selection of table names.
///
/// The dataset built from a filter holds exactly the named tables, in the
/// order given here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceFilter {
	tables: Vec<String>,
}

impl SequenceFilter {
	/// Filter keeping `tables` in the given order.
	pub fn new<I, S>(tables: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			tables: tables.into_iter().map(Into::into).collect(),
		}
	}

	/// Selected table names.
	pub fn tables(&self) -> &[String] {
		&self.tables
	}
}

/// Read-only view of the tables behind a datasource.
///
/// Rows are ordered by the declared key of each table, or by every column
/// when no key is declared, so two reads of unchanged tables agree. Nulls
/// sort last on every backend.
#[derive(Debug, Clone)]
pub struct DatasetInspector {
	source: DataSource,
	keys: KeyColumns,
}

impl DatasetInspector {
	/// Inspector over `source`.
	pub fn new(source: &DataSource) -> Self {
		Self {
			source: source.clone(),
			keys: KeyColumns::default(),
		}
	}

	/// Orders rows of keyed tables by their key.
	pub fn with_keys(mut self, keys: KeyColumns) -> Self {
		self.keys = keys;
		self
	}

	/// Names of every user table.
	pub async fn table_names(&self) -> DatabaseResult<Vec<String>> {
		let mut conn = self.source.connect().await?;
		catalog::table_names(&mut conn, self.source.dialect()).await
	}

	/// Reads one table. The returned table keeps the caller's spelling of
	/// `name`; columns carry the catalog's names and types.
	pub async fn load_table(&self, name: &str) -> DatabaseResult<Table> {
		let mut conn = self.source.connect().await?;
		self.read_table(&mut conn, self.source.dialect(), name).await
	}

	/// Reads exactly the tables named by `filter`, in filter order.
	///
	/// # Errors
	///
	/// Returns [`DatabaseError::NoSuchTable`] for a name the database lacks.
	pub async fn filtered_dataset(&self, filter: &SequenceFilter) -> DatabaseResult<Dataset> {
		let names: Vec<&str> = filter.tables().iter().map(String::as_str).collect();
		self.read_tables(&names).await
	}

	/// Reads every user table.
	pub async fn dataset(&self) -> DatabaseResult<Dataset> {
		let names = self.table_names().await?;
		let names: Vec<&str> = names.iter().map(String::as_str).collect();
		self.read_tables(&names).await
	}

	async fn read_tables(&self, names: &[&str]) -> DatabaseResult<Dataset> {
		let dialect = self.source.dialect();
		let mut conn = self.source.connect().await?;
		let mut dataset = Dataset::new();
		for name in names {
			let table = self.read_table(&mut conn, dialect, name).await?;
			dataset.add_table(table)?;
		}
		Ok(dataset)
	}

	async fn read_table(&self, conn: &mut AnyConnection, dialect: Dialect, name: &str) -> DatabaseResult<Table> {
		let info = table_info(conn, dialect, name).await?;

		let selected = info
			.columns
			.iter()
			.map(|c| dialect.select_expression(c))
			.collect::<Vec<_>>()
			.join(", ");
		let order = match self.keys.get(name) {
			Some(keys) if !keys.is_empty() => keys
				.iter()
				.map(|key| {
					info.column(key)
						.map(|c| dialect.order_expression(&info.name, &c.name))
						.ok_or_else(|| DatabaseError::UnknownColumn {
							table: name.to_string(),
							column: key.clone(),
						})
				})
				.collect::<DatabaseResult<Vec<_>>>()?,
			_ => info
				.columns
				.iter()
				.map(|c| dialect.order_expression(&info.name, &c.name))
				.collect(),
		};

		let sql = format!(
			"SELECT {} FROM {} ORDER BY {}",
			selected,
			info.name,
			order.join(", ")
		);
		let rows = sqlx::query(&sql)
			.fetch_all(&mut *conn)
			.await
			.map_err(DatabaseError::query(format!("Failed to read table {}", name)))?;

		let types = info.column_types();
		let mut table = Table::new(name, info.dataset_columns());
		for row in &rows {
			table.push_row(decode_row(row, &types))?;
		}
		tracing::debug!(table = name, rows = table.row_count(), "Read table");
		Ok(table)
	}
}

/// Reads exactly `tables`, in the given order.
///
/// # Example
///
/// ```no_run
/// use fixturekit_db::{DataSource, filter_and_iterate, log_dataset};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let source = DataSource::from_profile_path("prefDB.properties").await?;
/// let dataset = filter_and_iterate(&source, &["CATEGORY", "ALERT_TYPE"]).await?;
/// log_dataset(&dataset);
/// # Ok(())
/// # }
/// ```
pub async fn filter_and_iterate(source: &DataSource, tables: &[&str]) -> DatabaseResult<Dataset> {
	DatasetInspector::new(source)
		.filtered_dataset(&SequenceFilter::new(tables.iter().copied()))
		.await
}

/// Writes every cell of `dataset` to the log.
pub fn log_dataset(dataset: &Dataset) {
	let mut current: Option<&str> = None;
	for cell in dataset.cells() {
		if current != Some(cell.table) {
			current = Some(cell.table);
			tracing::info!(table = cell.table, "Table");
		}
		tracing::info!(
			table = cell.table,
			row = cell.row,
			"{} = {}",
			cell.column,
			cell.value
		);
	}
}
