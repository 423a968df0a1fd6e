//! Dataset operation tests.

use crate::common::{TestDatabase, flat, full};
use fixturekit_db::{DatabaseError, DatabaseOperation, DatasetApplier, DatasetInspector, KeyColumns};
use fixturekit_seeding::Value;
use rstest::rstest;

const AUTHORS: &str = r#"<dataset>
	<table name="ARTICLE_AUTHOR">
		<column>AUTHOR_ID</column>
		<column>LANG_CODE</column>
		<column>FIRST_NAME</column>
		<column>LAST_NAME</column>
		<row><value>9000</value><value>en-US</value><value>Ada</value><value>Lovelace</value></row>
		<row><value>9001</value><value>en-US</value><value>Fred</value><null/></row>
	</table>
</dataset>"#;

const ARTICLES: &str = r#"<dataset>
	<ARTICLE ARTICLE_ID="1" AUTHOR_ID="9000" TITLE="Notes" RATING="4.5" PUBLISHED="true"/>
	<ARTICLE ARTICLE_ID="2" AUTHOR_ID="9001" TITLE="Drafts" RATING="[null]" PUBLISHED="false"/>
</dataset>"#;

fn author_keys() -> KeyColumns {
	KeyColumns::new().with("ARTICLE_AUTHOR", &["AUTHOR_ID", "LANG_CODE"])
}

#[rstest]
#[tokio::test]
async fn test_insert_reproduces_rows() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let dataset = full(AUTHORS);

	// Act
	let report = DatasetApplier::new(&db.source)
		.apply(DatabaseOperation::Insert, &dataset)
		.await
		.unwrap();

	// Assert
	assert_eq!(report.inserted, 2);
	let table = DatasetInspector::new(&db.source)
		.load_table("ARTICLE_AUTHOR")
		.await
		.unwrap();
	assert_eq!(table.row_count(), 2);
	assert_eq!(table.value(1, "AUTHOR_ID"), Some(&Value::Integer(9001)));
	assert_eq!(table.value(1, "LAST_NAME"), Some(&Value::Null));
}

#[rstest]
#[tokio::test]
async fn test_insert_coerces_fixture_text() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let dataset = flat(ARTICLES);

	// Act
	DatasetApplier::new(&db.source)
		.apply(DatabaseOperation::Insert, &dataset)
		.await
		.unwrap();

	// Assert
	let table = DatasetInspector::new(&db.source).load_table("ARTICLE").await.unwrap();
	assert_eq!(table.value(0, "RATING"), Some(&Value::Real(4.5)));
	assert_eq!(table.value(0, "PUBLISHED"), Some(&Value::Boolean(true)));
	assert_eq!(table.value(1, "RATING"), Some(&Value::Null));
	assert_eq!(table.value(1, "PUBLISHED"), Some(&Value::Boolean(false)));
}

#[rstest]
#[tokio::test]
async fn test_insert_duplicate_key_reports_row() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let dataset = full(AUTHORS);
	let applier = DatasetApplier::new(&db.source);
	applier.apply(DatabaseOperation::Insert, &dataset).await.unwrap();

	// Act
	let result = applier.apply(DatabaseOperation::Insert, &dataset).await;

	// Assert
	match result {
		Err(DatabaseError::Apply { operation, table, row, .. }) => {
			assert_eq!(operation, DatabaseOperation::Insert);
			assert_eq!(table, "ARTICLE_AUTHOR");
			assert_eq!(row, 0);
		}
		other => panic!("Expected apply error, got {:?}", other),
	}
	assert_eq!(db.count("ARTICLE_AUTHOR").await, 2);
}

#[rstest]
#[tokio::test]
async fn test_failed_insert_rolls_back() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let dataset = flat(
		r#"<dataset>
			<CATEGORY CATEGORY_ID="1" NAME="Sport"/>
			<CATEGORY CATEGORY_ID="1" NAME="Music"/>
		</dataset>"#,
	);

	// Act
	let result = DatasetApplier::new(&db.source)
		.apply(DatabaseOperation::Insert, &dataset)
		.await;

	// Assert
	assert!(matches!(result, Err(DatabaseError::Apply { row: 1, .. })));
	assert_eq!(db.count("CATEGORY").await, 0);
}

#[rstest]
#[tokio::test]
async fn test_without_transaction_keeps_earlier_rows() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let dataset = flat(
		r#"<dataset>
			<CATEGORY CATEGORY_ID="1" NAME="Sport"/>
			<CATEGORY CATEGORY_ID="1" NAME="Music"/>
		</dataset>"#,
	);

	// Act
	let result = DatasetApplier::new(&db.source)
		.with_transaction(false)
		.apply(DatabaseOperation::Insert, &dataset)
		.await;

	// Assert
	assert!(result.is_err());
	assert_eq!(db.count("CATEGORY").await, 1);
}

#[rstest]
#[tokio::test]
async fn test_clean_insert_is_idempotent() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let dataset = full(AUTHORS);
	let applier = DatasetApplier::new(&db.source);
	let inspector = DatasetInspector::new(&db.source);

	// Act
	applier.apply(DatabaseOperation::CleanInsert, &dataset).await.unwrap();
	let once = inspector.load_table("ARTICLE_AUTHOR").await.unwrap();
	let report = applier.apply(DatabaseOperation::CleanInsert, &dataset).await.unwrap();
	let twice = inspector.load_table("ARTICLE_AUTHOR").await.unwrap();

	// Assert
	assert_eq!(report.deleted, 2);
	assert_eq!(report.inserted, 2);
	assert_eq!(once, twice);
}

#[rstest]
#[tokio::test]
async fn test_clean_insert_empties_declared_empty_table() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	sqlx::query("INSERT INTO ALERT_TYPE (ALERT_TYPE_ID, NAME) VALUES (7, 'SMS')")
		.execute(db.source.pool())
		.await
		.unwrap();
	let dataset = flat("<dataset><ALERT_TYPE/></dataset>");

	// Act
	DatasetApplier::new(&db.source)
		.apply(DatabaseOperation::CleanInsert, &dataset)
		.await
		.unwrap();

	// Assert
	assert_eq!(db.count("ALERT_TYPE").await, 0);
}

#[rstest]
#[tokio::test]
async fn test_refresh_updates_and_inserts_without_deleting() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let applier = DatasetApplier::new(&db.source).with_keys(author_keys());
	applier
		.apply(DatabaseOperation::Insert, &full(AUTHORS))
		.await
		.unwrap();
	let refresh = flat(
		r#"<dataset>
			<ARTICLE_AUTHOR AUTHOR_ID="9001" LANG_CODE="en-US" FIRST_NAME="Frednando" LAST_NAME="Trinsomething"/>
			<ARTICLE_AUTHOR AUTHOR_ID="9002" LANG_CODE="fr-FR" FIRST_NAME="Zoe" LAST_NAME="Martin"/>
		</dataset>"#,
	);

	// Act
	let report = applier.apply(DatabaseOperation::Refresh, &refresh).await.unwrap();

	// Assert
	assert_eq!(report.updated, 1);
	assert_eq!(report.inserted, 1);
	assert_eq!(db.count("ARTICLE_AUTHOR").await, 3);
	let (first, last): (String, String) = sqlx::query_as(
		"SELECT FIRST_NAME, LAST_NAME FROM ARTICLE_AUTHOR WHERE AUTHOR_ID = 9001 AND LANG_CODE = 'en-US'",
	)
	.fetch_one(db.source.pool())
	.await
	.unwrap();
	assert_eq!(first, "Frednando");
	assert_eq!(last, "Trinsomething");
}

#[rstest]
#[case(DatabaseOperation::Refresh)]
#[case(DatabaseOperation::Update)]
#[case(DatabaseOperation::Delete)]
#[tokio::test]
async fn test_key_operations_require_keys(#[case] operation: DatabaseOperation) {
	// Arrange
	let db = TestDatabase::with_schema().await;

	// Act
	let result = DatasetApplier::new(&db.source)
		.apply(operation, &full(AUTHORS))
		.await;

	// Assert
	assert!(matches!(
		result,
		Err(DatabaseError::MissingKeyColumns { operation: op, ref table }) if op == operation && table == "ARTICLE_AUTHOR"
	));
}

#[rstest]
#[tokio::test]
async fn test_update_fails_for_missing_row() {
	// Arrange
	let db = TestDatabase::with_schema().await;

	// Act
	let result = DatasetApplier::new(&db.source)
		.with_keys(author_keys())
		.apply(DatabaseOperation::Update, &full(AUTHORS))
		.await;

	// Assert
	assert!(matches!(result, Err(DatabaseError::RowNotFound { row: 0, .. })));
}

#[rstest]
#[tokio::test]
async fn test_delete_removes_only_dataset_rows() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let applier = DatasetApplier::new(&db.source).with_keys(author_keys());
	applier
		.apply(DatabaseOperation::Insert, &full(AUTHORS))
		.await
		.unwrap();
	let doomed = flat(r#"<dataset><ARTICLE_AUTHOR AUTHOR_ID="9000" LANG_CODE="en-US"/></dataset>"#);

	// Act
	let report = applier.apply(DatabaseOperation::Delete, &doomed).await.unwrap();

	// Assert
	assert_eq!(report.deleted, 1);
	assert_eq!(db.count("ARTICLE_AUTHOR").await, 1);
}

#[rstest]
#[tokio::test]
async fn test_delete_all_and_none() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let applier = DatasetApplier::new(&db.source);
	let dataset = full(AUTHORS);
	applier.apply(DatabaseOperation::Insert, &dataset).await.unwrap();

	// Act
	let untouched = applier.apply(DatabaseOperation::None, &dataset).await.unwrap();
	let count_after_none = db.count("ARTICLE_AUTHOR").await;
	applier.apply(DatabaseOperation::DeleteAll, &dataset).await.unwrap();

	// Assert
	assert_eq!(untouched.tables, 0);
	assert_eq!(count_after_none, 2);
	assert_eq!(db.count("ARTICLE_AUTHOR").await, 0);
}

#[rstest]
#[tokio::test]
async fn test_unknown_column_is_rejected() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let dataset = flat(r#"<dataset><CATEGORY CATEGORY_ID="1" NAME="Sport" COLOUR="red"/></dataset>"#);

	// Act
	let result = DatasetApplier::new(&db.source)
		.apply(DatabaseOperation::Insert, &dataset)
		.await;

	// Assert
	assert!(matches!(
		result,
		Err(DatabaseError::UnknownColumn { ref column, .. }) if column == "COLOUR"
	));
}

#[rstest]
#[tokio::test]
async fn test_unknown_table_is_rejected() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let dataset = flat(r#"<dataset><USER_ANSWER ANSWER_ID="1"/></dataset>"#);

	// Act
	let result = DatasetApplier::new(&db.source)
		.apply(DatabaseOperation::Insert, &dataset)
		.await;

	// Assert
	assert!(matches!(result, Err(DatabaseError::NoSuchTable(name)) if name == "USER_ANSWER"));
}

#[rstest]
#[tokio::test]
async fn test_unconvertible_value_names_cell() {
	// Arrange
	let db = TestDatabase::with_schema().await;
	let dataset = flat(r#"<dataset><CATEGORY CATEGORY_ID="one" NAME="Sport"/></dataset>"#);

	// Act
	let result = DatasetApplier::new(&db.source)
		.apply(DatabaseOperation::Insert, &dataset)
		.await;

	// Assert
	assert!(matches!(
		result,
		Err(DatabaseError::Conversion { row: 0, ref column, .. }) if column == "CATEGORY_ID"
	));
}
