//! Shared helpers for the fixturekit integration tests.
//!
//! Every test gets its own database file in a temporary directory; the
//! directory is handed to the profiles through the `db.dir` variable.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use fixturekit::{DataSource, Dataset, FixtureFormat, FixtureLoader, ProfileLoader, SchemaInitializer};
use tempfile::TempDir;

/// Article database profile.
pub const LIVE_DB: &str = "liveDB.properties";

/// Marketing preferences database profile.
pub const PREF_DB: &str = "prefDB.properties";

/// Path of a file under `tests/resources`.
pub fn resource(relative: &str) -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR"))
		.join("tests")
		.join("resources")
		.join(relative)
}

/// Loads a fixture resource with the `[null]` substitution.
pub fn load_fixture(relative: &str, format: FixtureFormat) -> Dataset {
	FixtureLoader::new()
		.load(resource(relative), Some(format))
		.unwrap()
}

/// A database built from one of the resource profiles.
pub struct ProfileDatabase {
	pub source: DataSource,
	pub dir: TempDir,
}

impl ProfileDatabase {
	/// Opens `profile` against a fresh directory and runs `schema` once.
	pub async fn open(profile: &str, schema: &str) -> Self {
		let dir = tempfile::tempdir().unwrap();
		let profile = ProfileLoader::for_file(&resource(profile))
			.variable("db.dir", dir.path().display().to_string())
			.load()
			.unwrap();
		let source = DataSource::from_profile(&profile).await.unwrap();

		SchemaInitializer::from_path(resource(schema))
			.unwrap()
			.ensure_schema(&source)
			.await
			.unwrap();

		Self { source, dir }
	}

	/// The article database with its schema.
	pub async fn live() -> Self {
		Self::open(LIVE_DB, "schemas/liveDB-schema.sql").await
	}

	/// The preferences database with its schema.
	pub async fn preferences() -> Self {
		Self::open(PREF_DB, "schemas/preferencesDB-schema.sql").await
	}

	/// Row count of `table`.
	pub async fn count(&self, table: &str) -> i64 {
		sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
			.fetch_one(self.source.pool())
			.await
			.unwrap()
	}

	/// Writes a profile with a concrete URL for this database, for the
	/// commands that load profiles themselves.
	pub fn write_profile(&self, name: &str, database_file: &str) -> PathBuf {
		let path = self.dir.path().join(name);
		let url = format!(
			"jdbc:sqlite://{}?mode=rwc",
			self.dir.path().join(database_file).display()
		);
		std::fs::write(&path, format!("jdbc.url={}\njdbc.driver=sqlite\n", url)).unwrap();
		path
	}
}
