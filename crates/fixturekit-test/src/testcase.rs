//! Database test case lifecycle.
//!
//! A [`DatabaseTestCase`] bundles what a group of database tests shares: the
//! datasource, the schema script and the dataset seeded before each test.
//! `set_up` prepares the schema once for the whole group and then applies
//! the set-up operation; `tear_down` applies the tear-down operation.

use std::sync::Arc;

use fixturekit_db::{
	ApplyReport, DataSource, DatabaseError, DatabaseOperation, DatabaseResult, DatasetApplier,
	DatasetInspector, KeyColumns, SchemaInitializer, SequenceFilter,
};
use fixturekit_seeding::Dataset;
use thiserror::Error;

use crate::assertions::{DatasetMismatch, compare_datasets_all};

/// Failure of [`DatabaseTestCase::verify`].
#[derive(Debug, Error)]
pub enum VerificationError {
	/// The live tables could not be read.
	#[error(transparent)]
	Database(#[from] DatabaseError),
	/// The live tables differ from the expected dataset.
	#[error(transparent)]
	Mismatch(#[from] DatasetMismatch),
}

/// Shared setup for a group of database tests.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use fixturekit_db::{DataSource, SchemaInitializer};
/// use fixturekit_seeding::FixtureLoader;
/// use fixturekit_test::DatabaseTestCase;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let source = DataSource::from_profile_path("prefDB.properties").await?;
/// let schema = Arc::new(SchemaInitializer::from_path("preferencesDB-schema.sql")?);
/// let case = DatabaseTestCase::new(&source)
///     .with_schema(schema)
///     .with_dataset(FixtureLoader::new().load("marketing-preferences.xml", None)?);
///
/// case.set_up().await?;
/// let expected = FixtureLoader::new().load("assert-this.xml", None)?;
/// case.assert_database(&expected).await;
/// case.tear_down().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseTestCase {
	source: DataSource,
	schema: Option<Arc<SchemaInitializer>>,
	dataset: Dataset,
	keys: KeyColumns,
	setup_operation: DatabaseOperation,
	teardown_operation: DatabaseOperation,
}

impl DatabaseTestCase {
	/// Test case seeding nothing, with CLEAN_INSERT on set-up and NONE on
	/// tear-down.
	pub fn new(source: &DataSource) -> Self {
		Self {
			source: source.clone(),
			schema: None,
			dataset: Dataset::new(),
			keys: KeyColumns::default(),
			setup_operation: DatabaseOperation::CleanInsert,
			teardown_operation: DatabaseOperation::None,
		}
	}

	/// Schema applied once across every test case sharing `schema`.
	pub fn with_schema(mut self, schema: Arc<SchemaInitializer>) -> Self {
		self.schema = Some(schema);
		self
	}

	/// Dataset applied by set-up and tear-down.
	pub fn with_dataset(mut self, dataset: Dataset) -> Self {
		self.dataset = dataset;
		self
	}

	/// Key columns for key based operations and row ordering.
	pub fn with_keys(mut self, keys: KeyColumns) -> Self {
		self.keys = keys;
		self
	}

	/// Operation applied by [`set_up`](Self::set_up).
	pub fn with_setup_operation(mut self, operation: DatabaseOperation) -> Self {
		self.setup_operation = operation;
		self
	}

	/// Operation applied by [`tear_down`](Self::tear_down).
	pub fn with_teardown_operation(mut self, operation: DatabaseOperation) -> Self {
		self.teardown_operation = operation;
		self
	}

	/// Datasource under test.
	pub fn source(&self) -> &DataSource {
		&self.source
	}

	/// Seeded dataset.
	pub fn dataset(&self) -> &Dataset {
		&self.dataset
	}

	/// Applier sharing this test case's keys.
	pub fn applier(&self) -> DatasetApplier {
		DatasetApplier::new(&self.source).with_keys(self.keys.clone())
	}

	/// Inspector sharing this test case's keys.
	pub fn inspector(&self) -> DatasetInspector {
		DatasetInspector::new(&self.source).with_keys(self.keys.clone())
	}

	/// Ensures the schema, then applies the set-up operation.
	pub async fn set_up(&self) -> DatabaseResult<ApplyReport> {
		if let Some(schema) = &self.schema {
			schema.ensure_schema(&self.source).await?;
		}
		self.applier()
			.apply(self.setup_operation, &self.dataset)
			.await
	}

	/// Applies the tear-down operation.
	pub async fn tear_down(&self) -> DatabaseResult<ApplyReport> {
		self.applier()
			.apply(self.teardown_operation, &self.dataset)
			.await
	}

	/// Reads the tables named by `expected`, in its order, and compares them.
	pub async fn verify(&self, expected: &Dataset) -> Result<(), VerificationError> {
		let filter = SequenceFilter::new(expected.table_names());
		let actual = self.inspector().filtered_dataset(&filter).await?;
		compare_datasets_all(expected, &actual)?;
		Ok(())
	}

	/// Panics unless the live tables named by `expected` equal it.
	pub async fn assert_database(&self, expected: &Dataset) {
		if let Err(error) = self.verify(expected).await {
			panic!("Database assertion failed: {}", error);
		}
	}
}
