//! Backend-specific SQL fragments.
//!
//! Identifiers are never quoted: fixtures name tables the way the DDL does,
//! and each backend folds unquoted names its own way. Every identifier is
//! validated before it is spliced into a statement.

use fixturekit_conf::DatabaseType;
use fixturekit_seeding::DataType;

use crate::error::{DatabaseError, DatabaseResult};

/// A live column as described by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
	/// Column name as stored in the catalog.
	pub name: String,
	/// Declared type name.
	pub declared_type: String,
	/// Type the declared name maps onto.
	pub data_type: DataType,
}

impl ColumnInfo {
	/// Builds column metadata from a catalog entry.
	pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
		let declared_type = declared_type.into();
		Self {
			name: name.into(),
			data_type: DataType::from_sql_type(&declared_type),
			declared_type,
		}
	}
}

/// SQL dialect for one [`DatabaseType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
	database_type: DatabaseType,
}

impl Dialect {
	/// Dialect for the given backend.
	pub fn new(database_type: DatabaseType) -> Self {
		Self { database_type }
	}

	/// Backend this dialect targets.
	pub fn database_type(&self) -> DatabaseType {
		self.database_type
	}

	/// Bind parameter marker for the 1-based parameter `index`.
	///
	/// # Examples
	///
	/// ```
	/// use fixturekit_conf::DatabaseType;
	/// use fixturekit_db::Dialect;
	///
	/// assert_eq!(Dialect::new(DatabaseType::Postgres).placeholder(2), "$2");
	/// assert_eq!(Dialect::new(DatabaseType::Sqlite).placeholder(2), "?");
	/// ```
	pub fn placeholder(&self, index: usize) -> String {
		match self.database_type {
			DatabaseType::Postgres => format!("${}", index),
			DatabaseType::Sqlite | DatabaseType::Mysql => "?".to_string(),
		}
	}

	/// Whether values of `column` travel as text.
	///
	/// The portable driver only exchanges booleans, integers, floats, text
	/// and bytes. On server backends every other declared type (dates,
	/// fixed precision numerics, enums) is read through a text cast and
	/// written through a cast from text.
	pub fn uses_text_transfer(&self, column: &ColumnInfo) -> bool {
		if self.database_type == DatabaseType::Sqlite {
			return false;
		}
		let declared = column.declared_type.to_lowercase();
		let fixed_precision = declared.contains("numeric") || declared.contains("decimal");
		fixed_precision || matches!(column.data_type, DataType::Text | DataType::Unknown)
	}

	/// Type the bound value must have for `column`.
	pub fn bind_type(&self, column: &ColumnInfo) -> DataType {
		if self.uses_text_transfer(column) {
			DataType::Text
		} else {
			column.data_type
		}
	}

	/// Parameter marker for `column`, cast to the column type where the
	/// backend does not convert text parameters implicitly.
	pub fn value_marker(&self, index: usize, column: &ColumnInfo) -> String {
		let placeholder = self.placeholder(index);
		if self.database_type == DatabaseType::Postgres && self.uses_text_transfer(column) {
			format!("CAST({} AS {})", placeholder, column.declared_type)
		} else {
			placeholder
		}
	}

	/// Select-list expression reading `column`.
	///
	/// SQLite reports a column's type from its declaration, and the portable
	/// driver rejects declared booleans, dates and numerics. Those columns
	/// are read as text and converted back by the row decoder.
	pub fn select_expression(&self, column: &ColumnInfo) -> String {
		match self.database_type {
			DatabaseType::Sqlite if !is_native_sqlite_type(&column.declared_type) => {
				format!("CAST({0} AS TEXT) AS {0}", column.name)
			}
			_ if !self.uses_text_transfer(column) => column.name.clone(),
			DatabaseType::Postgres => format!("CAST({0} AS TEXT) AS {0}", column.name),
			DatabaseType::Mysql => format!("CAST({0} AS CHAR) AS {0}", column.name),
			DatabaseType::Sqlite => column.name.clone(),
		}
	}

	/// ORDER BY terms sorting rows of `table` by `column` with nulls last.
	///
	/// Backends disagree on where nulls sort, so the null test comes first.
	/// The column is qualified so that a cast in the select list does not
	/// change the sort.
	pub fn order_expression(&self, table: &str, column: &str) -> String {
		format!("{0}.{1} IS NULL, {0}.{1}", table, column)
	}

	/// Query listing the user tables of the connected schema, one name per row.
	pub fn list_tables_sql(&self) -> &'static str {
		match self.database_type {
			DatabaseType::Sqlite => {
				"SELECT name FROM sqlite_master \
				 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
			}
			DatabaseType::Postgres => {
				"SELECT CAST(table_name AS TEXT) FROM information_schema.tables \
				 WHERE table_schema = current_schema() AND table_type = 'BASE TABLE' \
				 ORDER BY table_name"
			}
			DatabaseType::Mysql => {
				"SELECT CAST(table_name AS CHAR) FROM information_schema.tables \
				 WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' \
				 ORDER BY table_name"
			}
		}
	}

	/// Query returning `(name, declared type)` for each column of the table
	/// bound as the single parameter, in declaration order.
	pub fn columns_sql(&self) -> &'static str {
		match self.database_type {
			DatabaseType::Sqlite => "SELECT name, type FROM pragma_table_info(?) ORDER BY cid",
			DatabaseType::Postgres => {
				"SELECT CAST(column_name AS TEXT), CAST(udt_name AS TEXT) \
				 FROM information_schema.columns \
				 WHERE table_schema = current_schema() AND table_name = $1 \
				 ORDER BY ordinal_position"
			}
			DatabaseType::Mysql => {
				"SELECT CAST(column_name AS CHAR), CAST(column_type AS CHAR) \
				 FROM information_schema.columns \
				 WHERE table_schema = DATABASE() AND table_name = ? \
				 ORDER BY ordinal_position"
			}
		}
	}
}

/// Whether the portable driver decodes columns declared as `declared` on
/// SQLite. Undeclared columns report the type of each stored value.
fn is_native_sqlite_type(declared: &str) -> bool {
	let declared = declared.trim().to_lowercase();
	declared.is_empty()
		|| ["int", "char", "clob", "text", "blob", "real", "floa", "doub"]
			.iter()
			.any(|affinity| declared.contains(affinity))
}

/// Rejects names that could not be spliced into SQL unquoted.
///
/// Letters, digits, `_` and `$` are accepted, as is a single `.` separating
/// a schema from a table.
pub fn validate_identifier(name: &str) -> DatabaseResult<&str> {
	let mut parts = name.split('.');
	let valid = name.split('.').count() <= 2
		&& parts.all(|part| {
			!part.is_empty()
				&& !part.starts_with(|c: char| c.is_ascii_digit())
				&& part
					.chars()
					.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
		});
	if valid {
		Ok(name)
	} else {
		Err(DatabaseError::InvalidIdentifier(name.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("ARTICLE_AUTHOR")]
	#[case("user_answer")]
	#[case("public.CATEGORY")]
	#[case("T1")]
	fn test_valid_identifiers(#[case] name: &str) {
		assert_eq!(validate_identifier(name).unwrap(), name);
	}

	#[rstest]
	#[case("")]
	#[case("1ARTICLE")]
	#[case("ARTICLE; DROP TABLE USERS")]
	#[case("A-B")]
	#[case("a.b.c")]
	#[case("\"quoted\"")]
	#[case("a.")]
	fn test_invalid_identifiers(#[case] name: &str) {
		assert!(matches!(
			validate_identifier(name),
			Err(DatabaseError::InvalidIdentifier(_))
		));
	}

	#[rstest]
	fn test_postgres_casts_non_native_types() {
		let dialect = Dialect::new(DatabaseType::Postgres);
		let date = ColumnInfo::new("PUBLISHED", "date");
		let amount = ColumnInfo::new("AMOUNT", "numeric");
		let id = ColumnInfo::new("AUTHOR_ID", "int4");

		assert_eq!(dialect.value_marker(1, &date), "CAST($1 AS date)");
		assert_eq!(dialect.select_expression(&date), "CAST(PUBLISHED AS TEXT) AS PUBLISHED");
		assert_eq!(dialect.bind_type(&amount), DataType::Text);
		assert_eq!(dialect.value_marker(3, &id), "$3");
		assert_eq!(dialect.select_expression(&id), "AUTHOR_ID");
		assert_eq!(dialect.bind_type(&id), DataType::Integer);
	}

	#[rstest]
	fn test_mysql_reads_text_through_char_cast() {
		let dialect = Dialect::new(DatabaseType::Mysql);
		let created = ColumnInfo::new("CREATED", "datetime");
		assert_eq!(dialect.value_marker(1, &created), "?");
		assert_eq!(dialect.select_expression(&created), "CAST(CREATED AS CHAR) AS CREATED");
	}

	#[rstest]
	fn test_sqlite_writes_columns_as_declared() {
		let dialect = Dialect::new(DatabaseType::Sqlite);
		let created = ColumnInfo::new("CREATED", "DATE");
		let published = ColumnInfo::new("PUBLISHED", "BOOLEAN");
		assert!(!dialect.uses_text_transfer(&created));
		assert_eq!(dialect.value_marker(1, &created), "?");
		assert_eq!(dialect.bind_type(&created), DataType::Text);
		assert_eq!(dialect.bind_type(&published), DataType::Boolean);
	}

	#[rstest]
	#[case("DATE", "CAST(C AS TEXT) AS C")]
	#[case("DATETIME", "CAST(C AS TEXT) AS C")]
	#[case("BOOLEAN", "CAST(C AS TEXT) AS C")]
	#[case("NUMERIC(10,2)", "CAST(C AS TEXT) AS C")]
	#[case("INTEGER", "C")]
	#[case("VARCHAR(10)", "C")]
	#[case("DOUBLE", "C")]
	#[case("BLOB", "C")]
	#[case("", "C")]
	fn test_sqlite_reads_non_native_types_as_text(#[case] declared: &str, #[case] expected: &str) {
		let dialect = Dialect::new(DatabaseType::Sqlite);
		assert_eq!(dialect.select_expression(&ColumnInfo::new("C", declared)), expected);
	}

	#[rstest]
	fn test_order_expression_puts_nulls_last() {
		let dialect = Dialect::new(DatabaseType::Postgres);
		assert_eq!(
			dialect.order_expression("CATEGORY", "DESCRIPTION"),
			"CATEGORY.DESCRIPTION IS NULL, CATEGORY.DESCRIPTION"
		);
	}
}
