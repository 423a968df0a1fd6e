//! # fixturekit-db
//!
//! Database side of fixturekit: pooled datasources built from configuration
//! profiles, schema setup, dataset operations and inspection of live tables.
//!
//! All access goes through the portable `sqlx` driver, so the same code runs
//! against SQLite, PostgreSQL and MySQL.
//!
//! ## Example
//!
//! ```no_run
//! use fixturekit_db::{DataSource, DatabaseOperation, DatasetApplier, SchemaInitializer};
//! use fixturekit_seeding::FixtureLoader;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = DataSource::from_profile_path("prefDB.properties").await?;
//! SchemaInitializer::from_path("preferencesDB-schema.sql")?
//!     .ensure_schema(&source)
//!     .await?;
//!
//! let dataset = FixtureLoader::new().load("marketing-preferences.xml", None)?;
//! DatasetApplier::new(&source)
//!     .apply(DatabaseOperation::CleanInsert, &dataset)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod catalog;
pub mod datasource;
pub mod dialect;
pub mod error;
pub mod inspector;
pub mod operation;
mod row;
pub mod schema;

pub use catalog::TableInfo;
pub use datasource::DataSource;
pub use dialect::{ColumnInfo, Dialect};
pub use error::{DatabaseError, DatabaseResult};
pub use inspector::{DatasetInspector, SequenceFilter, filter_and_iterate, log_dataset};
pub use operation::{ApplyOptions, ApplyReport, DatabaseOperation, DatasetApplier, KeyColumns};
pub use schema::{SchemaInitializer, init_schema};
