//! Named configuration profiles.
//!
//! A profile is the merged, interpolated result of one or more
//! [`ConfigSource`]s. It is immutable once loaded.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{ConfigError, ConfigResult};
use crate::sources::{ConfigSource, EnvSource, PropertiesFileSource, TomlFileSource};

/// Keys containing this fragment are never written to the log.
pub const REDACTED_KEY_FRAGMENT: &str = "pass";

const MAX_EXPANSION_DEPTH: usize = 16;

/// A loaded configuration profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
	name: String,
	values: IndexMap<String, String>,
}

impl Profile {
	/// Build a profile from already-resolved values.
	pub fn new(name: impl Into<String>, values: IndexMap<String, String>) -> Self {
		Self {
			name: name.into(),
			values,
		}
	}

	/// Load a profile from a single properties (or `.toml`) file.
	///
	/// The profile is named after the file stem. `${name}` references are
	/// resolved against the file itself and the process environment.
	pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
		ProfileLoader::for_file(path.as_ref()).load()
	}

	/// Profile name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Value of `key`, if present.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.values.get(key).map(String::as_str)
	}

	/// Value of `key`, or [`ConfigError::MissingKey`].
	pub fn require(&self, key: &str) -> ConfigResult<&str> {
		self.get(key)
			.ok_or_else(|| ConfigError::MissingKey(key.to_string()))
	}

	/// All entries in load order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Entries safe to display: every key containing `pass` is left out.
	pub fn redacted_entries(&self) -> impl Iterator<Item = (&str, &str)> {
		self.iter()
			.filter(|(key, _)| !key.to_lowercase().contains(REDACTED_KEY_FRAGMENT))
	}

	/// Write the displayable entries to the debug log.
	pub fn log_redacted(&self) {
		tracing::debug!(profile = %self.name, "Datasource configuration - ");
		for (key, value) in self.redacted_entries() {
			tracing::debug!(profile = %self.name, "   {:<12}: {}", key, value);
		}
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Whether the profile is empty.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

/// Builder merging configuration sources into a [`Profile`]
///
/// # Examples
///
/// ```no_run
/// use fixturekit_conf::ProfileLoader;
///
/// let profile = ProfileLoader::new("prefDB")
///     .properties_file("tests/resources/prefDB.properties")
///     .env_overrides("FIXTUREKIT_")
///     .variable("db.dir", "/tmp/fixtures")
///     .load()?;
/// # Ok::<(), fixturekit_conf::ConfigError>(())
/// ```
pub struct ProfileLoader {
	name: String,
	sources: Vec<Box<dyn ConfigSource>>,
	variables: IndexMap<String, String>,
	interpolate: bool,
}

impl ProfileLoader {
	/// Create a loader for the named profile with interpolation enabled.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			sources: Vec::new(),
			variables: IndexMap::new(),
			interpolate: true,
		}
	}

	/// Loader for a single file, choosing TOML or properties by extension.
	pub fn for_file(path: &Path) -> Self {
		let name = path
			.file_stem()
			.and_then(|s| s.to_str())
			.unwrap_or("default")
			.to_string();
		let loader = Self::new(name);
		let is_toml = path
			.extension()
			.and_then(|e| e.to_str())
			.is_some_and(|e| e.eq_ignore_ascii_case("toml"));
		if is_toml {
			loader.toml_file(path)
		} else {
			loader.properties_file(path)
		}
	}

	/// Add an arbitrary source.
	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Add a required properties file.
	pub fn properties_file(self, path: impl Into<PathBuf>) -> Self {
		self.add_source(PropertiesFileSource::new(path))
	}

	/// Add a required TOML file.
	pub fn toml_file(self, path: impl Into<PathBuf>) -> Self {
		self.add_source(TomlFileSource::new(path))
	}

	/// Allow environment variables with `prefix` to override known keys.
	pub fn env_overrides(self, prefix: impl Into<String>) -> Self {
		self.add_source(EnvSource::new(prefix))
	}

	/// Provide a value for `${name}` references that no source defines.
	pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.variables.insert(name.into(), value.into());
		self
	}

	/// Enable or disable `${name}` expansion.
	pub fn with_interpolation(mut self, enabled: bool) -> Self {
		self.interpolate = enabled;
		self
	}

	/// Merge all sources (higher priority wins) and resolve references.
	pub fn load(mut self) -> ConfigResult<Profile> {
		self.sources.sort_by_key(|s| s.priority());

		let mut merged: IndexMap<String, String> = IndexMap::new();
		for source in &self.sources {
			let values = source.load()?;
			tracing::trace!(
				profile = %self.name,
				source = %source.description(),
				entries = values.len(),
				"Loaded configuration source"
			);
			merged.extend(values);
		}

		if self.interpolate {
			let mut resolved = IndexMap::with_capacity(merged.len());
			for (key, value) in &merged {
				let expanded = expand(key, value, &merged, &self.variables, 0)?;
				resolved.insert(key.clone(), expanded);
			}
			merged = resolved;
		}

		Ok(Profile::new(self.name, merged))
	}
}

fn expand(
	key: &str,
	value: &str,
	config: &IndexMap<String, String>,
	variables: &IndexMap<String, String>,
	depth: usize,
) -> ConfigResult<String> {
	if depth > MAX_EXPANSION_DEPTH {
		return Err(ConfigError::InvalidValue {
			key: key.to_string(),
			message: "variable expansion does not terminate".to_string(),
		});
	}

	let mut out = String::with_capacity(value.len());
	let mut rest = value;
	while let Some(start) = rest.find("${") {
		out.push_str(&rest[..start]);
		let after = &rest[start + 2..];
		let Some(end) = after.find('}') else {
			// Unterminated reference stays literal.
			out.push_str(&rest[start..]);
			return Ok(out);
		};
		let name = &after[..end];
		let replacement = if let Some(raw) = config.get(name) {
			expand(key, raw, config, variables, depth + 1)?
		} else if let Some(var) = variables.get(name) {
			var.clone()
		} else if let Ok(env) = std::env::var(name) {
			env
		} else {
			return Err(ConfigError::UnresolvedVariable(name.to_string()));
		};
		out.push_str(&replacement);
		rest = &after[end + 1..];
	}
	out.push_str(rest);
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sources::DefaultSource;
	use rstest::rstest;
	use std::io::Write;
	use std::sync::{Arc, Mutex};
	use tempfile::NamedTempFile;
	use tracing_subscriber::layer::SubscriberExt as _;
	use tracing_subscriber::util::SubscriberInitExt as _;

	fn properties_file(lines: &[&str]) -> NamedTempFile {
		let mut file = NamedTempFile::with_suffix(".properties").unwrap();
		for line in lines {
			writeln!(file, "{}", line).unwrap();
		}
		file
	}

	#[rstest]
	fn test_from_file_names_profile_after_stem() {
		let file = properties_file(&["jdbc.url=sqlite::memory:"]);
		let profile = Profile::from_file(file.path()).unwrap();

		let stem = file.path().file_stem().unwrap().to_str().unwrap();
		assert_eq!(profile.name(), stem);
		assert_eq!(profile.get("jdbc.url"), Some("sqlite::memory:"));
	}

	#[rstest]
	fn test_missing_profile_fails_fast() {
		let result = Profile::from_file("/nonexistent/liveDB.properties");
		assert!(matches!(result, Err(ConfigError::NotFound(_))));
	}

	#[rstest]
	fn test_higher_priority_source_wins() {
		let file = properties_file(&["jdbc.url=sqlite://file.db", "jdbc.driver=sqlite"]);
		let profile = ProfileLoader::new("layered")
			.properties_file(file.path())
			.add_source(DefaultSource::new().with_value("jdbc.url", "sqlite::memory:").with_value("pool.max_size", "2"))
			.load()
			.unwrap();

		assert_eq!(profile.get("jdbc.url"), Some("sqlite://file.db"));
		assert_eq!(profile.get("pool.max_size"), Some("2"));
	}

	#[rstest]
	fn test_interpolation_uses_keys_then_variables() {
		let file = properties_file(&[
			"db.name=prefs",
			"jdbc.url=sqlite://${db.dir}/${db.name}.db?mode=rwc",
		]);
		let profile = ProfileLoader::new("prefDB")
			.properties_file(file.path())
			.variable("db.dir", "/tmp/fixtures")
			.load()
			.unwrap();

		assert_eq!(
			profile.get("jdbc.url"),
			Some("sqlite:///tmp/fixtures/prefs.db?mode=rwc")
		);
	}

	#[rstest]
	fn test_unresolved_variable_fails() {
		let file = properties_file(&["jdbc.url=sqlite://${fixturekit.undefined.dir}/x.db"]);
		let result = ProfileLoader::new("broken").properties_file(file.path()).load();
		assert!(
			matches!(result, Err(ConfigError::UnresolvedVariable(name)) if name == "fixturekit.undefined.dir")
		);
	}

	#[rstest]
	fn test_cyclic_reference_fails() {
		let file = properties_file(&["a=${b}", "b=${a}"]);
		let result = ProfileLoader::new("cyclic").properties_file(file.path()).load();
		assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
	}

	#[rstest]
	fn test_interpolation_can_be_disabled() {
		let file = properties_file(&["jdbc.url=sqlite://${db.dir}/x.db"]);
		let profile = ProfileLoader::new("raw")
			.properties_file(file.path())
			.with_interpolation(false)
			.load()
			.unwrap();
		assert_eq!(profile.get("jdbc.url"), Some("sqlite://${db.dir}/x.db"));
	}

	#[rstest]
	fn test_redacted_entries_skip_password_keys() {
		let file = properties_file(&[
			"jdbc.username=sa",
			"jdbc.password=hunter2",
			"jdbc.passphrase=other",
			"jdbc.url=sqlite::memory:",
		]);
		let profile = Profile::from_file(file.path()).unwrap();

		let keys: Vec<&str> = profile.redacted_entries().map(|(k, _)| k).collect();
		assert_eq!(keys, vec!["jdbc.username", "jdbc.url"]);
	}

	#[rstest]
	fn test_log_redacted_never_writes_password() {
		// Arrange
		struct LogCapture {
			logs: Arc<Mutex<Vec<String>>>,
		}

		impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for LogCapture {
			fn on_event(
				&self,
				event: &tracing::Event<'_>,
				_ctx: tracing_subscriber::layer::Context<'_, S>,
			) {
				struct MessageVisitor {
					message: String,
				}

				impl tracing::field::Visit for MessageVisitor {
					fn record_debug(
						&mut self,
						field: &tracing::field::Field,
						value: &dyn std::fmt::Debug,
					) {
						if field.name() == "message" {
							self.message = format!("{:?}", value);
						}
					}
				}

				let mut visitor = MessageVisitor {
					message: String::new(),
				};
				event.record(&mut visitor);
				self.logs.lock().unwrap().push(visitor.message);
			}
		}

		let logs = Arc::new(Mutex::new(Vec::new()));
		let _guard = tracing_subscriber::registry()
			.with(LogCapture { logs: logs.clone() })
			.set_default();
		let file = properties_file(&["jdbc.password=hunter2", "jdbc.url=sqlite::memory:"]);
		let profile = Profile::from_file(file.path()).unwrap();

		// Act
		profile.log_redacted();

		// Assert
		let captured = logs.lock().unwrap();
		assert!(captured.iter().any(|line| line.contains("jdbc.url")));
		assert!(
			!captured.iter().any(|line| line.contains("hunter2")),
			"Password leaked into log: {:?}",
			*captured
		);
	}
}
