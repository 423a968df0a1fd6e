//! Lifecycle tests for `DatabaseTestCase` on throwaway SQLite databases.

use std::sync::Arc;

use fixturekit_db::{DatabaseOperation, KeyColumns, SchemaInitializer, filter_and_iterate, log_dataset};
use fixturekit_seeding::{FixtureFormat, FixtureLoader, Value};
use fixturekit_test::fixtures::{SqliteDatabase, fixture_loader, sqlite_database};
use fixturekit_test::{DatabaseTestCase, DatasetMismatch, LogCapture, VerificationError};
use rstest::rstest;

const SCHEMA: &str = "
CREATE TABLE CATEGORY (CATEGORY_ID INTEGER PRIMARY KEY, NAME VARCHAR(64) NOT NULL);
CREATE TABLE ALERT_TYPE (ALERT_TYPE_ID INTEGER PRIMARY KEY, NAME VARCHAR(64) NOT NULL, DESCRIPTION VARCHAR(255));
";

const SEED: &str = r#"<dataset>
	<CATEGORY CATEGORY_ID="1" NAME="Sport"/>
	<CATEGORY CATEGORY_ID="2" NAME="Music"/>
	<ALERT_TYPE ALERT_TYPE_ID="1" NAME="Email" DESCRIPTION="[null]"/>
</dataset>"#;

fn test_case(db: &SqliteDatabase, loader: &FixtureLoader, schema: Arc<SchemaInitializer>) -> DatabaseTestCase {
	DatabaseTestCase::new(db.source())
		.with_schema(schema)
		.with_dataset(loader.load_str(SEED, Some(FixtureFormat::Flat)).unwrap())
}

#[rstest]
#[tokio::test]
async fn test_set_up_seeds_and_verifies(
	#[future] sqlite_database: SqliteDatabase,
	fixture_loader: FixtureLoader,
) {
	// Arrange
	let db = sqlite_database.await;
	let schema = Arc::new(SchemaInitializer::from_sql(SCHEMA));
	let case = test_case(&db, &fixture_loader, schema.clone());

	// Act
	case.set_up().await.unwrap();
	let report = case.set_up().await.unwrap();

	// Assert
	assert!(schema.is_applied());
	assert_eq!(report.deleted, 3);
	assert_eq!(report.inserted, 3);
	case.assert_database(case.dataset()).await;
}

#[rstest]
#[tokio::test]
async fn test_verify_reports_differing_cell(
	#[future] sqlite_database: SqliteDatabase,
	fixture_loader: FixtureLoader,
) {
	// Arrange
	let db = sqlite_database.await;
	let case = test_case(&db, &fixture_loader, Arc::new(SchemaInitializer::from_sql(SCHEMA)));
	case.set_up().await.unwrap();
	let expected = fixture_loader
		.load_str(
			r#"<dataset><ALERT_TYPE ALERT_TYPE_ID="1" NAME="SMS" DESCRIPTION="[null]"/></dataset>"#,
			None,
		)
		.unwrap();

	// Act
	let result = case.verify(&expected).await;

	// Assert
	match result {
		Err(VerificationError::Mismatch(DatasetMismatch::Value { table, row, column, expected, actual })) => {
			assert_eq!(table, "ALERT_TYPE");
			assert_eq!(row, 0);
			assert_eq!(column, "NAME");
			assert_eq!(expected, Value::from("SMS"));
			assert_eq!(actual, Value::from("Email"));
		}
		other => panic!("Expected a value mismatch, got {:?}", other),
	}
}

#[rstest]
#[tokio::test]
async fn test_tear_down_operation(
	#[future] sqlite_database: SqliteDatabase,
	fixture_loader: FixtureLoader,
) {
	// Arrange
	let db = sqlite_database.await;
	let case = test_case(&db, &fixture_loader, Arc::new(SchemaInitializer::from_sql(SCHEMA)))
		.with_keys(KeyColumns::new().with("CATEGORY", &["CATEGORY_ID"]))
		.with_teardown_operation(DatabaseOperation::DeleteAll);
	case.set_up().await.unwrap();

	// Act
	let report = case.tear_down().await.unwrap();

	// Assert
	assert_eq!(report.deleted, 3);
	let remaining = case.inspector().dataset().await.unwrap();
	assert_eq!(remaining.row_count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_logged_iteration_names_every_cell(
	#[future] sqlite_database: SqliteDatabase,
	fixture_loader: FixtureLoader,
) {
	// Arrange
	let db = sqlite_database.await;
	let case = test_case(&db, &fixture_loader, Arc::new(SchemaInitializer::from_sql(SCHEMA)));
	case.set_up().await.unwrap();
	let dataset = filter_and_iterate(db.source(), &["CATEGORY", "ALERT_TYPE"])
		.await
		.unwrap();
	let capture = LogCapture::new();
	let _guard = capture.set_default();

	// Act
	log_dataset(&dataset);

	// Assert
	let messages = capture.messages();
	assert_eq!(messages[0], "Table");
	assert!(messages.contains(&"NAME = Music".to_string()));
	assert!(messages.contains(&"DESCRIPTION = NULL".to_string()));
	assert_eq!(capture.events().iter().filter(|e| e.message == "Table").count(), 2);
}
