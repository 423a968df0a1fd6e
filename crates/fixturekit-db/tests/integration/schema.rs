//! Schema initialization tests.

use crate::common::{SCHEMA, TestDatabase};
use fixturekit_db::{DatabaseError, DatasetInspector, SchemaInitializer};
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

#[rstest]
#[tokio::test]
async fn test_ensure_schema_runs_once() {
	// Arrange
	let db = TestDatabase::empty().await;
	let mut script = NamedTempFile::with_suffix(".sql").unwrap();
	write!(script, "{}", SCHEMA).unwrap();
	let initializer = SchemaInitializer::from_path(script.path()).unwrap();

	// Act
	let first = initializer.ensure_schema(&db.source).await.unwrap();
	let second = initializer.ensure_schema(&db.source).await.unwrap();

	// Assert
	assert!(first);
	assert!(!second);
	assert!(initializer.is_applied());
	let names = DatasetInspector::new(&db.source).table_names().await.unwrap();
	assert_eq!(names.len(), 4);
}

#[rstest]
#[tokio::test]
async fn test_failing_script_stays_unapplied() {
	// Arrange
	let db = TestDatabase::empty().await;
	let initializer = SchemaInitializer::from_sql("CREATE TABLE BROKEN (;");

	// Act
	let result = initializer.ensure_schema(&db.source).await;

	// Assert
	assert!(matches!(
		result,
		Err(DatabaseError::SchemaExecution { ref origin, .. }) if origin == "<inline>"
	));
	assert!(!initializer.is_applied());
}
