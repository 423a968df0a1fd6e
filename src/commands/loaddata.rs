//! loaddata command implementation.
//!
//! This command loads XML fixture files into the database.

use std::path::PathBuf;

use fixturekit_db::{ApplyReport, DatabaseOperation, DatasetApplier, KeyColumns, SchemaInitializer};
use fixturekit_seeding::{FixtureFormat, FixtureLoader, NULL_TOKEN, SeedingError, Substitutions};

use super::open_datasource;
use crate::error::{Error, Result};

/// Arguments for the loaddata command.
#[derive(Debug, Clone, Default)]
pub struct LoadDataArgs {
	/// Fixture file paths to load, in order.
	pub fixture_paths: Vec<PathBuf>,
}

/// Options for the loaddata command.
#[derive(Debug, Clone)]
pub struct LoadDataOptions {
	/// Configuration profile naming the target database.
	pub profile: Option<PathBuf>,

	/// Prefix of environment variables overriding profile keys.
	pub env_prefix: Option<String>,

	/// DDL script executed before the fixtures are applied.
	pub schema: Option<PathBuf>,

	/// Operation applied to every fixture.
	pub operation: DatabaseOperation,

	/// Fixture layout; detected per file when unset.
	pub format: Option<FixtureFormat>,

	/// Key columns for REFRESH, UPDATE and DELETE.
	pub keys: KeyColumns,

	/// Cell text replaced by null.
	pub null_token: String,

	/// Wrap each fixture in a transaction.
	pub use_transaction: bool,

	/// Verbosity level.
	pub verbosity: u8,
}

impl Default for LoadDataOptions {
	fn default() -> Self {
		Self {
			profile: None,
			env_prefix: None,
			schema: None,
			operation: DatabaseOperation::CleanInsert,
			format: None,
			keys: KeyColumns::default(),
			null_token: NULL_TOKEN.to_string(),
			use_transaction: true,
			verbosity: 0,
		}
	}
}

impl LoadDataOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the configuration profile.
	pub fn with_profile(mut self, path: impl Into<PathBuf>) -> Self {
		self.profile = Some(path.into());
		self
	}

	/// Sets the environment override prefix.
	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = Some(prefix.into());
		self
	}

	/// Sets the DDL script.
	pub fn with_schema(mut self, path: impl Into<PathBuf>) -> Self {
		self.schema = Some(path.into());
		self
	}

	/// Sets the operation.
	pub fn with_operation(mut self, operation: DatabaseOperation) -> Self {
		self.operation = operation;
		self
	}

	/// Forces a fixture layout.
	pub fn with_format(mut self, format: FixtureFormat) -> Self {
		self.format = Some(format);
		self
	}

	/// Declares the key columns of `table`.
	pub fn with_key(mut self, table: &str, columns: Vec<String>) -> Self {
		self.keys.insert(table, columns);
		self
	}

	/// Sets the null token.
	pub fn with_null_token(mut self, token: impl Into<String>) -> Self {
		self.null_token = token.into();
		self
	}

	/// Sets use transaction flag.
	pub fn with_transaction(mut self, use_tx: bool) -> Self {
		self.use_transaction = use_tx;
		self
	}

	/// Sets verbosity level.
	pub fn with_verbosity(mut self, level: u8) -> Self {
		self.verbosity = level;
		self
	}
}

/// Outcome of a loaddata run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadDataResult {
	/// Fixture files applied.
	pub fixtures_loaded: usize,
	/// Row counts summed over all fixtures.
	pub report: ApplyReport,
}

/// The loaddata command for installing fixtures.
///
/// Equivalent to Django's `manage.py loaddata`, with the reconciling
/// operation chosen by the caller.
///
/// # Example
///
/// ```no_run
/// use fixturekit::commands::{LoadDataArgs, LoadDataCommand, LoadDataOptions};
/// use fixturekit::DatabaseOperation;
///
/// # async fn run() -> fixturekit::Result<()> {
/// let args = LoadDataArgs {
///     fixture_paths: vec!["tests/resources/data/articles/authors.xml".into()],
/// };
/// let options = LoadDataOptions::new()
///     .with_profile("tests/resources/liveDB.properties")
///     .with_operation(DatabaseOperation::Refresh)
///     .with_key("ARTICLE_AUTHOR", vec!["AUTHOR_ID".into(), "LANG_CODE".into()]);
///
/// let result = LoadDataCommand::new().execute(args, options).await?;
/// println!("Installed {} object(s)", result.report.written());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct LoadDataCommand;

impl LoadDataCommand {
	/// Creates a new loaddata command.
	pub fn new() -> Self {
		Self
	}

	/// Returns the command name.
	pub fn name(&self) -> &str {
		"loaddata"
	}

	/// Returns the command description.
	pub fn description(&self) -> &str {
		"Installs the named fixture(s) in the database"
	}

	/// Returns the command help text.
	pub fn help(&self) -> &str {
		r#"
Usage: loaddata --profile FILE [options] fixture [fixture ...]

Installs the named fixture(s) in the database.

Arguments:
  fixture                 One or more XML fixture files to load

Options:
  --profile FILE          Configuration profile (.properties or .toml)
  --env-prefix PREFIX     Let PREFIX* environment variables override the profile
  --schema FILE           DDL script executed before loading
  --operation OP          NONE, INSERT, CLEAN_INSERT (default), REFRESH,
                          UPDATE, DELETE or DELETE_ALL
  --format FORMAT         flat or full (detected when omitted)
  --key TABLE=COL,COL     Key columns for REFRESH, UPDATE and DELETE
  --null-token TEXT       Cell text loaded as null (default [null])
  --no-transaction        Apply statements without a transaction
  --verbosity LEVEL       Verbosity level (0=minimal, 1=normal, 2=verbose)
"#
	}

	/// Executes the loaddata command.
	///
	/// Fixtures are applied one after another, each with its own
	/// transaction unless disabled.
	///
	/// # Errors
	///
	/// Fails before touching the database when no fixture is named, a
	/// fixture file is missing or no profile is given. Afterwards the first
	/// configuration, schema, parse or apply error stops the run.
	pub async fn execute(&self, args: LoadDataArgs, options: LoadDataOptions) -> Result<LoadDataResult> {
		if args.fixture_paths.is_empty() {
			return Err(Error::invalid_argument(
				"fixture_paths",
				"At least one fixture file must be specified",
			));
		}

		for path in &args.fixture_paths {
			if !path.exists() {
				return Err(SeedingError::FileNotFound(path.display().to_string()).into());
			}
		}

		let profile = options
			.profile
			.as_deref()
			.ok_or_else(|| Error::invalid_argument("profile", "A configuration profile is required"))?;
		let source = open_datasource(profile, options.env_prefix.as_deref()).await?;

		if let Some(schema) = &options.schema {
			SchemaInitializer::from_path(schema)?
				.ensure_schema(&source)
				.await?;
		}

		let loader = FixtureLoader::new().with_substitutions(Substitutions::new().with_null(&options.null_token));
		let applier = DatasetApplier::new(&source)
			.with_keys(options.keys.clone())
			.with_transaction(options.use_transaction);

		let mut result = LoadDataResult::default();
		for path in &args.fixture_paths {
			let dataset = loader.load(path, options.format)?;
			let report = applier.apply(options.operation, &dataset).await?;
			tracing::info!(
				fixture = %path.display(),
				operation = %options.operation,
				inserted = report.inserted,
				updated = report.updated,
				deleted = report.deleted,
				"Fixture loaded"
			);
			if options.verbosity > 1 {
				println!("Processed {} ({} table(s))", path.display(), report.tables);
			}
			result.fixtures_loaded += 1;
			result.report += report;
		}
		source.close().await;

		if options.verbosity > 0 {
			self.print_result(&result);
		}

		Ok(result)
	}

	/// Prints the load result summary.
	fn print_result(&self, result: &LoadDataResult) {
		println!(
			"Installed {} object(s) from {} fixture(s)",
			result.report.written(),
			result.fixtures_loaded
		);
		if result.report.deleted > 0 {
			println!("Deleted {} object(s)", result.report.deleted);
		}
	}
}

/// Parses a `TABLE=COL,COL` key declaration.
///
/// # Example
///
/// ```
/// use fixturekit::commands::parse_key_columns;
///
/// let (table, columns) = parse_key_columns("ARTICLE_AUTHOR=AUTHOR_ID,LANG_CODE").unwrap();
/// assert_eq!(table, "ARTICLE_AUTHOR");
/// assert_eq!(columns, vec!["AUTHOR_ID", "LANG_CODE"]);
/// ```
pub fn parse_key_columns(spec: &str) -> Result<(String, Vec<String>)> {
	let invalid = || Error::invalid_argument("key", format!("expected TABLE=COLUMN[,COLUMN...], got '{}'", spec));

	let (table, columns) = spec.split_once('=').ok_or_else(invalid)?;
	let table = table.trim();
	let columns: Vec<String> = columns
		.split(',')
		.map(str::trim)
		.filter(|c| !c.is_empty())
		.map(String::from)
		.collect();
	if table.is_empty() || columns.is_empty() {
		return Err(invalid());
	}
	Ok((table.to_string(), columns))
}
