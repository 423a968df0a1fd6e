//! Fixture loading.
//!
//! Reads fixture files, parses them and applies sentinel substitution.

use std::path::Path;

use super::dataset::Dataset;
use super::format::FixtureFormat;
use super::parser::FixtureParser;
use super::substitution::Substitutions;
use crate::error::{SeedingError, SeedingResult};

/// Loads XML fixtures into [`Dataset`]s.
///
/// The default loader turns `[null]` cells into nulls and leaves FLAT column
/// sensing off.
///
/// # Example
///
/// ```
/// use fixturekit_seeding::{FixtureFormat, FixtureLoader, Value};
///
/// let dataset = FixtureLoader::new()
///     .load_str(r#"<dataset><ALERT_TYPE ALERT_TYPE_ID="1" NAME="[null]"/></dataset>"#, Some(FixtureFormat::Flat))
///     .unwrap();
/// assert_eq!(dataset.table("ALERT_TYPE").unwrap().value(0, "NAME"), Some(&Value::Null));
/// ```
#[derive(Debug, Clone)]
pub struct FixtureLoader {
	parser: FixtureParser,
	substitutions: Substitutions,
}

impl Default for FixtureLoader {
	fn default() -> Self {
		Self {
			parser: FixtureParser::new(),
			substitutions: Substitutions::null_token(),
		}
	}
}

impl FixtureLoader {
	/// Creates a loader with the `[null]` substitution.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the substitution rules.
	pub fn with_substitutions(mut self, substitutions: Substitutions) -> Self {
		self.substitutions = substitutions;
		self
	}

	/// Sets FLAT column sensing.
	pub fn with_column_sensing(mut self, enabled: bool) -> Self {
		self.parser = self.parser.with_column_sensing(enabled);
		self
	}

	/// Active substitution rules.
	pub fn substitutions(&self) -> &Substitutions {
		&self.substitutions
	}

	/// Loads a fixture file.
	///
	/// With `format` set to `None` the layout is detected from the content.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - The file extension is not `.xml`
	/// - The file cannot be read
	/// - The content is not a well-formed dataset in the given layout
	pub fn load(&self, path: impl AsRef<Path>, format: Option<FixtureFormat>) -> SeedingResult<Dataset> {
		let path = path.as_ref();
		if !FixtureFormat::is_supported_path(path) {
			return Err(SeedingError::UnsupportedExtension(
				path.extension()
					.and_then(|e| e.to_str())
					.unwrap_or("(none)")
					.to_string(),
			));
		}

		let content = std::fs::read_to_string(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				SeedingError::FileNotFound(path.display().to_string())
			} else {
				SeedingError::Io(e)
			}
		})?;

		self.load_named(&content, format, &path.display().to_string())
	}

	/// Loads fixture content held in memory.
	pub fn load_str(&self, content: &str, format: Option<FixtureFormat>) -> SeedingResult<Dataset> {
		self.load_named(content, format, "<string>")
	}

	/// Loads fixture content, naming it `origin` in errors and logs.
	pub fn load_named(
		&self,
		content: &str,
		format: Option<FixtureFormat>,
		origin: &str,
	) -> SeedingResult<Dataset> {
		let format = format.unwrap_or_else(|| FixtureFormat::detect(content));
		let mut dataset = self.parser.parse(content, format, origin)?;
		self.substitutions.apply(&mut dataset);

		tracing::debug!(
			origin,
			%format,
			tables = dataset.len(),
			rows = dataset.row_count(),
			"Loaded fixture"
		);
		Ok(dataset)
	}
}
