//! Shared helpers for fixturekit-db integration tests.

use fixturekit_db::{DataSource, init_schema};
use fixturekit_seeding::{FixtureFormat, FixtureLoader};
use fixturekit_seeding::Dataset;
use tempfile::TempDir;

/// Schema shared by the integration tests.
pub const SCHEMA: &str = "
CREATE TABLE ARTICLE_AUTHOR (
	AUTHOR_ID INTEGER NOT NULL,
	LANG_CODE VARCHAR(8) NOT NULL,
	FIRST_NAME VARCHAR(64),
	LAST_NAME VARCHAR(64),
	PRIMARY KEY (AUTHOR_ID, LANG_CODE)
);
CREATE TABLE ARTICLE (
	ARTICLE_ID INTEGER PRIMARY KEY,
	AUTHOR_ID INTEGER NOT NULL,
	TITLE VARCHAR(128) NOT NULL,
	RATING REAL,
	PUBLISHED BOOLEAN
);
CREATE TABLE CATEGORY (
	CATEGORY_ID INTEGER PRIMARY KEY,
	NAME VARCHAR(64) NOT NULL
);
CREATE TABLE ALERT_TYPE (
	ALERT_TYPE_ID INTEGER PRIMARY KEY,
	NAME VARCHAR(64) NOT NULL
);
";

/// A SQLite database living in a temporary directory.
///
/// The directory is removed when the value is dropped.
pub struct TestDatabase {
	pub source: DataSource,
	_dir: TempDir,
}

impl TestDatabase {
	/// Creates an empty database file.
	pub async fn empty() -> Self {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
		let source = DataSource::from_url(&url).await.unwrap();
		Self { source, _dir: dir }
	}

	/// Creates a database with [`SCHEMA`] applied.
	pub async fn with_schema() -> Self {
		let db = Self::empty().await;
		init_schema(&db.source, SCHEMA).await.unwrap();
		db
	}

	/// Row count of `table`.
	pub async fn count(&self, table: &str) -> i64 {
		sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
			.fetch_one(self.source.pool())
			.await
			.unwrap()
	}
}

/// Parses a FLAT fixture held in memory.
pub fn flat(content: &str) -> Dataset {
	FixtureLoader::new()
		.load_str(content, Some(FixtureFormat::Flat))
		.unwrap()
}

/// Parses a FULL fixture held in memory.
pub fn full(content: &str) -> Dataset {
	FixtureLoader::new()
		.load_str(content, Some(FixtureFormat::Full))
		.unwrap()
}
