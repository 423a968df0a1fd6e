//! Live table inspection tests.

use crate::common::{TestDatabase, flat};
use fixturekit_db::{
	DatabaseError, DatabaseOperation, DatasetApplier, DatasetInspector, KeyColumns, SequenceFilter,
	filter_and_iterate,
};
use fixturekit_seeding::{DataType, Value};
use rstest::rstest;

const PREFERENCES: &str = r#"<dataset>
	<CATEGORY CATEGORY_ID="2" NAME="Music"/>
	<CATEGORY CATEGORY_ID="1" NAME="Sport"/>
	<ALERT_TYPE ALERT_TYPE_ID="1" NAME="Email"/>
	<ARTICLE_AUTHOR AUTHOR_ID="9001" LANG_CODE="en-US" FIRST_NAME="Fred" LAST_NAME="[null]"/>
</dataset>"#;

async fn seeded() -> TestDatabase {
	let db = TestDatabase::with_schema().await;
	DatasetApplier::new(&db.source)
		.apply(DatabaseOperation::CleanInsert, &flat(PREFERENCES))
		.await
		.unwrap();
	db
}

#[rstest]
#[tokio::test]
async fn test_filter_keeps_named_tables_in_caller_order() {
	// Arrange
	let db = seeded().await;

	// Act
	let dataset = filter_and_iterate(&db.source, &["CATEGORY", "ALERT_TYPE"])
		.await
		.unwrap();

	// Assert
	assert_eq!(dataset.table_names(), vec!["CATEGORY", "ALERT_TYPE"]);
	let cells: Vec<_> = dataset
		.cells()
		.map(|cell| (cell.table, cell.row, cell.column, cell.value.clone()))
		.collect();
	assert_eq!(cells.len(), 6);
	assert_eq!(cells[0], ("CATEGORY", 0, "CATEGORY_ID", Value::Integer(1)));
	assert_eq!(cells[5], ("ALERT_TYPE", 0, "NAME", Value::from("Email")));
}

#[rstest]
#[tokio::test]
async fn test_filter_with_unknown_table_fails() {
	// Arrange
	let db = seeded().await;
	let filter = SequenceFilter::new(["CATEGORY", "USER_ANSWER"]);

	// Act
	let result = DatasetInspector::new(&db.source).filtered_dataset(&filter).await;

	// Assert
	assert!(matches!(result, Err(DatabaseError::NoSuchTable(name)) if name == "USER_ANSWER"));
}

#[rstest]
#[tokio::test]
async fn test_load_table_keeps_caller_spelling_and_types() {
	// Arrange
	let db = seeded().await;

	// Act
	let table = DatasetInspector::new(&db.source)
		.load_table("article_author")
		.await
		.unwrap();

	// Assert
	assert_eq!(table.name(), "article_author");
	assert_eq!(table.columns()[0].name, "AUTHOR_ID");
	assert_eq!(table.columns()[0].data_type, DataType::Integer);
	assert_eq!(table.value(0, "LAST_NAME"), Some(&Value::Null));
}

#[rstest]
#[tokio::test]
async fn test_rows_follow_declared_key() {
	// Arrange
	let db = seeded().await;
	let keys = KeyColumns::new().with("CATEGORY", &["NAME"]);

	// Act
	let table = DatasetInspector::new(&db.source)
		.with_keys(keys)
		.load_table("CATEGORY")
		.await
		.unwrap();

	// Assert
	assert_eq!(table.value(0, "NAME"), Some(&Value::from("Music")));
	assert_eq!(table.value(1, "NAME"), Some(&Value::from("Sport")));
}

#[rstest]
#[tokio::test]
async fn test_table_names_lists_user_tables() {
	// Arrange
	let db = TestDatabase::with_schema().await;

	// Act
	let names = DatasetInspector::new(&db.source).table_names().await.unwrap();

	// Assert
	assert_eq!(names, vec!["ALERT_TYPE", "ARTICLE", "ARTICLE_AUTHOR", "CATEGORY"]);
}

#[rstest]
#[tokio::test]
async fn test_whole_database_dataset() {
	// Arrange
	let db = seeded().await;

	// Act
	let dataset = DatasetInspector::new(&db.source).dataset().await.unwrap();

	// Assert
	assert_eq!(dataset.len(), 4);
	assert_eq!(dataset.row_count(), 4);
	assert_eq!(dataset.table("ARTICLE").unwrap().row_count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_reads_boolean_date_and_numeric_columns() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	sqlx::query(
		"CREATE TABLE EVENT (EVENT_ID INTEGER PRIMARY KEY, HELD DATE, CREATED DATETIME, ACTIVE BOOLEAN, FEE NUMERIC)",
	)
	.execute(db.source.pool())
	.await
	.unwrap();
	let events = flat(
		r#"<dataset>
		<EVENT EVENT_ID="1" HELD="2011-04-02" CREATED="2011-04-02 10:30:00" ACTIVE="true" FEE="12.5"/>
		<EVENT EVENT_ID="2" HELD="[null]" CREATED="[null]" ACTIVE="[null]" FEE="[null]"/>
		<EVENT EVENT_ID="3" HELD="2012-01-31" CREATED="[null]" ACTIVE="false" FEE="3"/>
	</dataset>"#,
	);
	DatasetApplier::new(&db.source)
		.apply(DatabaseOperation::Insert, &events)
		.await
		.unwrap();

	// Act
	let table = DatasetInspector::new(&db.source).load_table("EVENT").await.unwrap();

	// Assert
	assert_eq!(table.row_count(), 3);
	assert_eq!(table.value(0, "HELD"), Some(&Value::from("2011-04-02")));
	assert_eq!(table.value(0, "CREATED"), Some(&Value::from("2011-04-02 10:30:00")));
	assert_eq!(table.value(0, "ACTIVE"), Some(&Value::Boolean(true)));
	assert_eq!(table.value(0, "FEE"), Some(&Value::Real(12.5)));
	assert_eq!(table.value(1, "HELD"), Some(&Value::Null));
	assert_eq!(table.value(1, "CREATED"), Some(&Value::Null));
	assert_eq!(table.value(1, "ACTIVE"), Some(&Value::Null));
	assert_eq!(table.value(1, "FEE"), Some(&Value::Null));
	assert_eq!(table.value(2, "ACTIVE"), Some(&Value::Boolean(false)));
	assert_eq!(table.value(2, "FEE"), Some(&Value::Real(3.0)));
}

#[rstest]
#[tokio::test]
async fn test_rows_sort_nulls_last() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	sqlx::query("CREATE TABLE NOTE (BODY VARCHAR(64), SEQ INTEGER)")
		.execute(db.source.pool())
		.await
		.unwrap();
	let notes = flat(
		r#"<dataset>
		<NOTE BODY="[null]" SEQ="1"/>
		<NOTE BODY="Later" SEQ="2"/>
	</dataset>"#,
	);
	DatasetApplier::new(&db.source)
		.apply(DatabaseOperation::Insert, &notes)
		.await
		.unwrap();
	let keys = KeyColumns::new().with("NOTE", &["BODY"]);

	// Act
	let unkeyed = DatasetInspector::new(&db.source).load_table("NOTE").await.unwrap();
	let keyed = DatasetInspector::new(&db.source)
		.with_keys(keys)
		.load_table("NOTE")
		.await
		.unwrap();

	// Assert
	assert_eq!(unkeyed.value(0, "BODY"), Some(&Value::from("Later")));
	assert_eq!(unkeyed.value(1, "BODY"), Some(&Value::Null));
	assert_eq!(keyed.value(0, "SEQ"), Some(&Value::Integer(2)));
	assert_eq!(keyed.value(1, "SEQ"), Some(&Value::Integer(1)));
}
