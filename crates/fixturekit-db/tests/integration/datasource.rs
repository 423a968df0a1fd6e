//! Datasource construction tests.

use fixturekit_conf::{ConfigError, DatabaseType, ProfileLoader};
use fixturekit_db::{DataSource, DatabaseError};
use rstest::rstest;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

#[rstest]
#[tokio::test]
async fn test_from_profile_connects() {
	// Arrange
	let dir = tempfile::tempdir().unwrap();
	let mut file = NamedTempFile::with_suffix(".properties").unwrap();
	writeln!(file, "jdbc.driver=org.sqlite.JDBC").unwrap();
	writeln!(file, "jdbc.url=jdbc:sqlite://${{db.dir}}/live.db?mode=rwc").unwrap();
	writeln!(file, "jdbc.username=sa").unwrap();
	writeln!(file, "jdbc.password=secret").unwrap();
	let profile = ProfileLoader::for_file(file.path())
		.variable("db.dir", dir.path().display().to_string())
		.load()
		.unwrap();

	// Act
	let source = DataSource::from_profile(&profile).await.unwrap();

	// Assert
	assert_eq!(source.database_type(), DatabaseType::Sqlite);
	source.check_connection().await.unwrap();
	let conn = source.connect().await;
	assert!(conn.is_ok());
}

#[rstest]
#[tokio::test]
async fn test_missing_url_fails_fast() {
	// Arrange
	let mut file = NamedTempFile::with_suffix(".properties").unwrap();
	writeln!(file, "jdbc.driver=org.sqlite.JDBC").unwrap();

	// Act
	let result = DataSource::from_profile_path(file.path()).await;

	// Assert
	assert!(matches!(
		result,
		Err(DatabaseError::Config(ConfigError::MissingKey(key))) if key == "jdbc.url"
	));
}

#[rstest]
#[tokio::test]
async fn test_missing_profile_file_fails() {
	// Act
	let result = DataSource::from_profile_path("/nonexistent/liveDB.properties").await;

	// Assert
	assert!(matches!(result, Err(DatabaseError::Config(_))));
}

#[rstest]
#[tokio::test]
#[serial(env)]
async fn test_env_override_replaces_url() {
	// Arrange
	let dir = tempfile::tempdir().unwrap();
	let url = format!("sqlite://{}/override.db?mode=rwc", dir.path().display());
	// SAFETY: serialized with the other tests touching the environment.
	unsafe { std::env::set_var("FIXTUREKIT_TEST_JDBC_URL", &url) };
	let profile = ProfileLoader::new("override")
		.env_overrides("FIXTUREKIT_TEST_")
		.load()
		.unwrap();

	// Act
	let source = DataSource::from_profile(&profile).await;
	// SAFETY: as above.
	unsafe { std::env::remove_var("FIXTUREKIT_TEST_JDBC_URL") };

	// Assert
	let source = source.unwrap();
	source.check_connection().await.unwrap();
	assert_eq!(source.name(), "override");
}
