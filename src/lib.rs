//! # fixturekit
//!
//! DbUnit-style fixtures for relational database tests.
//!
//! fixturekit loads XML datasets (FLAT and FULL layouts) into a database,
//! reconciles them with live tables through a named operation, reads live
//! tables back as datasets and asserts that the database holds what a test
//! expects. Everything runs on tokio against SQLite, PostgreSQL or MySQL.
//!
//! ## Crates
//!
//! - [`conf`] - Configuration profiles and datasource settings
//! - [`seeding`] - Dataset model, XML fixture loading and serialization
//! - [`db`] - Datasources, schema setup, dataset operations, inspection
//! - [`test`] - Dataset assertions and the test-case lifecycle (feature `test`)
//! - [`commands`] - `loaddata` and `dumpdata`, also shipped as the `fixturekit` binary
//!
//! ## Feature Flags
//!
//! - `test` (default) - re-exports `fixturekit-test`
//!
//! ## Quick Example
//!
//! ```no_run
//! use fixturekit::prelude::*;
//!
//! # async fn run() -> fixturekit::Result<()> {
//! let source = DataSource::from_profile_path("tests/resources/prefDB.properties").await?;
//! SchemaInitializer::from_path("tests/resources/schemas/preferencesDB-schema.sql")?
//!     .ensure_schema(&source)
//!     .await?;
//!
//! let dataset = FixtureLoader::new().load("tests/resources/data/marketing-preferences.xml", None)?;
//! DatasetApplier::new(&source)
//!     .apply(DatabaseOperation::CleanInsert, &dataset)
//!     .await?;
//!
//! let live = filter_and_iterate(&source, &["CATEGORY", "ALERT_TYPE"]).await?;
//! log_dataset(&live);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod commands;
pub mod error;

pub use error::{Error, Result};

/// Configuration profiles.
pub mod conf {
	pub use fixturekit_conf::*;
}

/// Dataset model and XML fixtures.
pub mod seeding {
	pub use fixturekit_seeding::*;
}

/// Database access.
pub mod db {
	pub use fixturekit_db::*;
}

/// Test assertions and lifecycle.
#[cfg(feature = "test")]
pub mod test {
	pub use fixturekit_test::*;
}

pub use fixturekit_conf::{ConfigError, DataSourceSettings, DatabaseType, Profile, ProfileLoader};
pub use fixturekit_db::{
	ApplyOptions, ApplyReport, DataSource, DatabaseError, DatabaseOperation, DatasetApplier,
	DatasetInspector, KeyColumns, SchemaInitializer, SequenceFilter, filter_and_iterate,
	init_schema, log_dataset,
};
pub use fixturekit_seeding::{
	Dataset, FixtureFormat, FixtureLoader, FixtureSerializer, NULL_TOKEN, SeedingError,
	Substitutions, Table, Value,
};
#[cfg(feature = "test")]
pub use fixturekit_test::{
	DatabaseTestCase, DatasetMismatch, assert_dataset_eq, assert_table_eq, compare_datasets,
};

/// Common imports.
pub mod prelude {
	pub use crate::error::{Error, Result};
	pub use fixturekit_conf::{Profile, ProfileLoader};
	pub use fixturekit_db::{
		DataSource, DatabaseOperation, DatasetApplier, DatasetInspector, KeyColumns,
		SchemaInitializer, SequenceFilter, filter_and_iterate, log_dataset,
	};
	pub use fixturekit_seeding::{Dataset, FixtureFormat, FixtureLoader, Substitutions, Value};
	#[cfg(feature = "test")]
	pub use fixturekit_test::{DatabaseTestCase, assert_dataset_eq, compare_datasets};
}
