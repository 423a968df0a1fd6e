//! rstest fixtures for database tests.
//!
//! # Example
//!
//! ```ignore
//! use fixturekit_test::fixtures::{SqliteDatabase, sqlite_database};
//! use rstest::rstest;
//!
//! #[rstest]
//! #[tokio::test]
//! async fn test_with_database(#[future] sqlite_database: SqliteDatabase) {
//!     let db = sqlite_database.await;
//!     db.source().check_connection().await.unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};

use fixturekit_db::{DataSource, DatabaseResult};
use fixturekit_seeding::FixtureLoader;
use rstest::fixture;
use tempfile::TempDir;

use crate::logging::LogCapture;

/// A SQLite database file in its own temporary directory.
///
/// Dropping it closes nothing explicitly; the directory is removed with it.
#[derive(Debug)]
pub struct SqliteDatabase {
	source: DataSource,
	path: PathBuf,
	_dir: TempDir,
}

impl SqliteDatabase {
	/// Opens (creating it) `test.db` inside `dir`.
	pub async fn open_in(dir: TempDir) -> DatabaseResult<Self> {
		let path = dir.path().join("test.db");
		let source = DataSource::from_url(&Self::url_for(&path)).await?;
		Ok(Self {
			source,
			path,
			_dir: dir,
		})
	}

	/// Connection URL for the database file at `path`.
	pub fn url_for(path: &Path) -> String {
		format!("sqlite://{}?mode=rwc", path.display())
	}

	/// Datasource of the database.
	pub fn source(&self) -> &DataSource {
		&self.source
	}

	/// Path of the database file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Connection URL of the database.
	pub fn url(&self) -> String {
		Self::url_for(&self.path)
	}
}

/// Temporary directory removed at the end of the test.
#[fixture]
pub fn temp_dir() -> TempDir {
	tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Empty SQLite database in a temporary directory.
#[fixture]
pub async fn sqlite_database(temp_dir: TempDir) -> SqliteDatabase {
	SqliteDatabase::open_in(temp_dir)
		.await
		.expect("Failed to open SQLite test database")
}

/// Loader with the default `[null]` substitution.
#[fixture]
pub fn fixture_loader() -> FixtureLoader {
	FixtureLoader::new()
}

/// Log capture installed as the thread's default subscriber.
///
/// Events are only captured while the returned guard is alive.
#[fixture]
pub fn log_capture() -> (LogCapture, tracing::subscriber::DefaultGuard) {
	let capture = LogCapture::new();
	let guard = capture.set_default();
	(capture, guard)
}
