//! In-memory dataset model.
//!
//! A [`Dataset`] is an ordered collection of uniquely named [`Table`]s. Table
//! and column names are matched case-insensitively, row and table order are
//! preserved exactly as built.

use std::iter::FusedIterator;

use super::value::{DataType, Value};
use crate::error::{SeedingError, SeedingResult};

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
	/// Column name as written in the source.
	pub name: String,
	/// Column type.
	pub data_type: DataType,
}

impl Column {
	/// Creates a column of unknown type.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			data_type: DataType::Unknown,
		}
	}

	/// Creates a column of the given type.
	pub fn typed(name: impl Into<String>, data_type: DataType) -> Self {
		Self {
			name: name.into(),
			data_type,
		}
	}
}

/// One row of a table, positionally aligned with its columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
	values: Vec<Value>,
}

impl Row {
	/// Creates a row from values in column order.
	pub fn new(values: Vec<Value>) -> Self {
		Self { values }
	}

	/// Values in column order.
	pub fn values(&self) -> &[Value] {
		&self.values
	}

	/// Mutable values in column order.
	pub fn values_mut(&mut self) -> &mut [Value] {
		&mut self.values
	}

	/// Value at column position `index`.
	pub fn get(&self, index: usize) -> Option<&Value> {
		self.values.get(index)
	}

	/// Number of values.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns true when the row holds no values.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Consumes the row.
	pub fn into_values(self) -> Vec<Value> {
		self.values
	}
}

/// A named table with ordered columns and rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
	name: String,
	columns: Vec<Column>,
	rows: Vec<Row>,
}

impl Table {
	/// Creates an empty table with the given columns.
	pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
		Self {
			name: name.into(),
			columns,
			rows: Vec::new(),
		}
	}

	/// Creates a table whose columns are all of unknown type.
	///
	/// # Example
	///
	/// ```
	/// # use fixturekit_seeding::{Table, Value};
	/// let mut table = Table::with_column_names("ALERT_TYPE", &["ALERT_TYPE_ID", "NAME"]);
	/// table.push_row(vec![Value::from("1"), Value::from("Email")]).unwrap();
	/// assert_eq!(table.value(0, "name"), Some(&Value::from("Email")));
	/// ```
	pub fn with_column_names(name: impl Into<String>, columns: &[&str]) -> Self {
		Self::new(name, columns.iter().map(|c| Column::new(*c)).collect())
	}

	/// Table name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Columns in order.
	pub fn columns(&self) -> &[Column] {
		&self.columns
	}

	/// Column names in order.
	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|c| c.name.as_str()).collect()
	}

	/// Position of the named column (case-insensitive).
	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns
			.iter()
			.position(|c| c.name.eq_ignore_ascii_case(name))
	}

	/// Appends a column; existing rows read null for it.
	pub fn add_column(&mut self, column: Column) -> usize {
		for row in &mut self.rows {
			row.values.push(Value::Null);
		}
		self.columns.push(column);
		self.columns.len() - 1
	}

	/// Sets the type of every column.
	pub fn set_column_types(&mut self, types: &[DataType]) {
		for (column, data_type) in self.columns.iter_mut().zip(types) {
			column.data_type = *data_type;
		}
	}

	/// Appends a row given in column order.
	pub fn push_row(&mut self, values: Vec<Value>) -> SeedingResult<()> {
		if values.len() != self.columns.len() {
			return Err(SeedingError::RowLength {
				table: self.name.clone(),
				expected: self.columns.len(),
				found: values.len(),
			});
		}
		self.rows.push(Row::new(values));
		Ok(())
	}

	/// Rows in order.
	pub fn rows(&self) -> &[Row] {
		&self.rows
	}

	/// Mutable rows in order.
	pub fn rows_mut(&mut self) -> &mut [Row] {
		&mut self.rows
	}

	/// Number of rows.
	pub fn row_count(&self) -> usize {
		self.rows.len()
	}

	/// Value at `row` for the named column.
	pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
		let index = self.column_index(column)?;
		self.rows.get(row)?.get(index)
	}

	/// Returns true when `name` designates this table (case-insensitive).
	pub fn is_named(&self, name: &str) -> bool {
		self.name.eq_ignore_ascii_case(name)
	}
}

/// An ordered set of uniquely named tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
	tables: Vec<Table>,
}

impl Dataset {
	/// Creates an empty dataset.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a dataset from tables, rejecting duplicate names.
	pub fn from_tables(tables: Vec<Table>) -> SeedingResult<Self> {
		let mut dataset = Self::new();
		for table in tables {
			dataset.add_table(table)?;
		}
		Ok(dataset)
	}

	/// Appends a table.
	pub fn add_table(&mut self, table: Table) -> SeedingResult<()> {
		if self.table(table.name()).is_some() {
			return Err(SeedingError::DuplicateTable(table.name));
		}
		self.tables.push(table);
		Ok(())
	}

	/// The named table (case-insensitive).
	pub fn table(&self, name: &str) -> Option<&Table> {
		self.tables.iter().find(|t| t.is_named(name))
	}

	/// The named table, mutably.
	pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
		self.tables.iter_mut().find(|t| t.is_named(name))
	}

	/// The named table or [`SeedingError::NoSuchTable`].
	pub fn require_table(&self, name: &str) -> SeedingResult<&Table> {
		self.table(name)
			.ok_or_else(|| SeedingError::NoSuchTable(name.to_string()))
	}

	/// Tables in order.
	pub fn tables(&self) -> &[Table] {
		&self.tables
	}

	/// Mutable tables in order.
	pub fn tables_mut(&mut self) -> &mut [Table] {
		&mut self.tables
	}

	/// Table names in order.
	pub fn table_names(&self) -> Vec<&str> {
		self.tables.iter().map(Table::name).collect()
	}

	/// Number of tables.
	pub fn len(&self) -> usize {
		self.tables.len()
	}

	/// Returns true when the dataset holds no tables.
	pub fn is_empty(&self) -> bool {
		self.tables.is_empty()
	}

	/// Total number of rows across all tables.
	pub fn row_count(&self) -> usize {
		self.tables.iter().map(Table::row_count).sum()
	}

	/// A dataset holding exactly the named tables, in the given order.
	pub fn select(&self, names: &[&str]) -> SeedingResult<Dataset> {
		let mut selected = Dataset::new();
		for name in names {
			selected.add_table(self.require_table(name)?.clone())?;
		}
		Ok(selected)
	}

	/// Lazily walks every cell: tables in order, then rows, then columns.
	///
	/// The iterator is finite and cannot be restarted; call `cells` again for
	/// another pass.
	///
	/// # Example
	///
	/// ```
	/// # use fixturekit_seeding::{Dataset, Table, Value};
	/// let mut table = Table::with_column_names("CATEGORY", &["ID", "NAME"]);
	/// table.push_row(vec![Value::from(1), Value::from("News")]).unwrap();
	/// let dataset = Dataset::from_tables(vec![table]).unwrap();
	///
	/// let cells: Vec<String> = dataset
	///     .cells()
	///     .map(|c| format!("{}[{}].{}={}", c.table, c.row, c.column, c.value))
	///     .collect();
	/// assert_eq!(cells, vec!["CATEGORY[0].ID=1", "CATEGORY[0].NAME=News"]);
	/// ```
	pub fn cells(&self) -> Cells<'_> {
		Cells {
			tables: &self.tables,
			table: 0,
			row: 0,
			column: 0,
		}
	}

	/// Consumes the dataset.
	pub fn into_tables(self) -> Vec<Table> {
		self.tables
	}
}

impl IntoIterator for Dataset {
	type Item = Table;
	type IntoIter = std::vec::IntoIter<Table>;

	fn into_iter(self) -> Self::IntoIter {
		self.tables.into_iter()
	}
}

impl<'a> IntoIterator for &'a Dataset {
	type Item = &'a Table;
	type IntoIter = std::slice::Iter<'a, Table>;

	fn into_iter(self) -> Self::IntoIter {
		self.tables.iter()
	}
}

/// One cell visited by [`Dataset::cells`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell<'a> {
	/// Table name.
	pub table: &'a str,
	/// Zero-based row index within the table.
	pub row: usize,
	/// Column name.
	pub column: &'a str,
	/// Cell value.
	pub value: &'a Value,
}

/// Iterator over the cells of a dataset.
#[derive(Debug, Clone)]
pub struct Cells<'a> {
	tables: &'a [Table],
	table: usize,
	row: usize,
	column: usize,
}

impl<'a> Iterator for Cells<'a> {
	type Item = Cell<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let table = self.tables.get(self.table)?;
			let Some(row) = table.rows.get(self.row) else {
				self.table += 1;
				self.row = 0;
				self.column = 0;
				continue;
			};
			let Some(value) = row.values.get(self.column) else {
				self.row += 1;
				self.column = 0;
				continue;
			};

			let cell = Cell {
				table: &table.name,
				row: self.row,
				column: &table.columns[self.column].name,
				value,
			};
			self.column += 1;
			return Some(cell);
		}
	}
}

impl FusedIterator for Cells<'_> {}
