//! dumpdata command implementation.
//!
//! This command writes live tables out as an XML fixture that loaddata can
//! install again.

use std::path::PathBuf;

use fixturekit_db::{DatasetInspector, KeyColumns, SequenceFilter};
use fixturekit_seeding::{FixtureFormat, FixtureSerializer, NULL_TOKEN};

use super::open_datasource;
use crate::error::{Error, Result};

/// Arguments for the dumpdata command.
#[derive(Debug, Clone, Default)]
pub struct DumpDataArgs {
	/// Tables to dump, in output order. Empty dumps every table.
	pub tables: Vec<String>,
}

/// Options for the dumpdata command.
#[derive(Debug, Clone)]
pub struct DumpDataOptions {
	/// Configuration profile naming the source database.
	pub profile: Option<PathBuf>,

	/// Prefix of environment variables overriding profile keys.
	pub env_prefix: Option<String>,

	/// Output layout.
	pub format: FixtureFormat,

	/// Destination file; the fixture is returned only when unset.
	pub output: Option<PathBuf>,

	/// Text written for null cells of FLAT output.
	pub null_token: String,

	/// Key columns used to order rows.
	pub keys: KeyColumns,

	/// Spaces per nesting level.
	pub indent: usize,
}

impl Default for DumpDataOptions {
	fn default() -> Self {
		Self {
			profile: None,
			env_prefix: None,
			format: FixtureFormat::Flat,
			output: None,
			null_token: NULL_TOKEN.to_string(),
			keys: KeyColumns::default(),
			indent: 2,
		}
	}
}

impl DumpDataOptions {
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

	/// Sets the output layout.
	pub fn with_format(mut self, format: FixtureFormat) -> Self {
		self.format = format;
		self
	}

	/// Writes the fixture to `path`.
	pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
		self.output = Some(path.into());
		self
	}

	/// Sets the null token.
	pub fn with_null_token(mut self, token: impl Into<String>) -> Self {
		self.null_token = token.into();
		self
	}

	/// Orders the rows of `table` by `columns`.
	pub fn with_key(mut self, table: &str, columns: Vec<String>) -> Self {
		self.keys.insert(table, columns);
		self
	}

	/// Sets the indentation.
	pub fn with_indent(mut self, indent: usize) -> Self {
		self.indent = indent;
		self
	}
}

/// Outcome of a dumpdata run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpDataResult {
	/// Tables written.
	pub tables: usize,
	/// Rows written.
	pub rows: usize,
	/// The serialized fixture.
	pub content: String,
}

/// The dumpdata command for exporting tables.
///
/// Equivalent to Django's `manage.py dumpdata`, writing FLAT or FULL XML.
#[derive(Debug, Default)]
pub struct DumpDataCommand;

impl DumpDataCommand {
	/// Creates a new dumpdata command.
	pub fn new() -> Self {
		Self
	}

	/// Returns the command name.
	pub fn name(&self) -> &str {
		"dumpdata"
	}

	/// Returns the command description.
	pub fn description(&self) -> &str {
		"Outputs the contents of the database as a fixture"
	}

	/// Returns the command help text.
	pub fn help(&self) -> &str {
		r#"
Usage: dumpdata --profile FILE [options] [table ...]

Outputs the contents of the named tables, or of every table, as an XML fixture.

Arguments:
  table                   Tables to dump, in output order

Options:
  --profile FILE          Configuration profile (.properties or .toml)
  --env-prefix PREFIX     Let PREFIX* environment variables override the profile
  --format FORMAT         flat (default) or full
  --output FILE           Write the fixture to FILE instead of stdout
  --key TABLE=COL,COL     Order the rows of TABLE by these columns
  --null-token TEXT       Text written for null cells (default [null])
  --indent N              Spaces per nesting level, 0 for one line
"#
	}

	/// Executes the dumpdata command.
	///
	/// # Errors
	///
	/// Fails when no profile is given, a named table does not exist or the
	/// output file cannot be written.
	pub async fn execute(&self, args: DumpDataArgs, options: DumpDataOptions) -> Result<DumpDataResult> {
		let profile = options
			.profile
			.as_deref()
			.ok_or_else(|| Error::invalid_argument("profile", "A configuration profile is required"))?;
		let source = open_datasource(profile, options.env_prefix.as_deref()).await?;

		let inspector = DatasetInspector::new(&source).with_keys(options.keys.clone());
		let dataset = if args.tables.is_empty() {
			inspector.dataset().await?
		} else {
			inspector
				.filtered_dataset(&SequenceFilter::new(args.tables.iter().cloned()))
				.await?
		};
		source.close().await;

		let content = FixtureSerializer::new()
			.with_format(options.format)
			.with_indent(options.indent)
			.with_null_token(options.null_token.as_str())
			.serialize(&dataset)?;

		if let Some(path) = &options.output {
			std::fs::write(path, &content)?;
			tracing::info!(
				output = %path.display(),
				tables = dataset.len(),
				rows = dataset.row_count(),
				"Fixture written"
			);
		}

		Ok(DumpDataResult {
			tables: dataset.len(),
			rows: dataset.row_count(),
			content,
		})
	}
}
