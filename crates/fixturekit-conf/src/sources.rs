//! Configuration sources for layered profiles
//!
//! Provides different sources of configuration that can be merged together
//! in priority order (environment overrides > profile files > defaults).

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::datasource::RECOGNIZED_KEYS;
use crate::error::{ConfigError, ConfigResult};
use crate::properties::parse_properties;

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> ConfigResult<IndexMap<String, String>>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

fn read_source(path: &Path, required: bool) -> ConfigResult<Option<String>> {
	match fs::read_to_string(path) {
		Ok(content) => Ok(Some(content)),
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
			if required {
				Err(ConfigError::NotFound(path.to_path_buf()))
			} else {
				Ok(None)
			}
		}
		Err(source) => Err(ConfigError::Io {
			path: path.to_path_buf(),
			source,
		}),
	}
}

/// `.properties` file configuration source
pub struct PropertiesFileSource {
	path: PathBuf,
	required: bool,
}

impl PropertiesFileSource {
	/// Create a source for a required properties file
	///
	/// # Examples
	///
	/// ```
	/// use fixturekit_conf::sources::PropertiesFileSource;
	///
	/// let source = PropertiesFileSource::new("liveDB.properties");
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}

	/// Treat a missing file as an empty source instead of an error
	pub fn optional(mut self) -> Self {
		self.required = false;
		self
	}
}

impl ConfigSource for PropertiesFileSource {
	fn load(&self) -> ConfigResult<IndexMap<String, String>> {
		match read_source(&self.path, self.required)? {
			Some(content) => parse_properties(&content, &self.path.display().to_string()),
			None => Ok(IndexMap::new()),
		}
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("Properties file: {}", self.path.display())
	}
}

/// TOML file configuration source
///
/// Nested tables flatten into dotted keys, so `[jdbc] url = "..."` reads as
/// `jdbc.url`.
pub struct TomlFileSource {
	path: PathBuf,
	required: bool,
}

impl TomlFileSource {
	/// Create a source for a required TOML file
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}

	/// Treat a missing file as an empty source instead of an error
	pub fn optional(mut self) -> Self {
		self.required = false;
		self
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> ConfigResult<IndexMap<String, String>> {
		let Some(content) = read_source(&self.path, self.required)? else {
			return Ok(IndexMap::new());
		};

		let table: toml::Table = toml::from_str(&content)?;
		let mut config = IndexMap::new();
		for (key, value) in &table {
			flatten_toml(key, value, &mut config);
		}
		Ok(config)
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

fn flatten_toml(prefix: &str, value: &toml::Value, out: &mut IndexMap<String, String>) {
	match value {
		toml::Value::Table(table) => {
			for (key, nested) in table {
				flatten_toml(&format!("{}.{}", prefix, key), nested, out);
			}
		}
		toml::Value::Array(items) => {
			let joined = items
				.iter()
				.map(toml_scalar)
				.collect::<Vec<_>>()
				.join(",");
			out.insert(prefix.to_string(), joined);
		}
		scalar => {
			out.insert(prefix.to_string(), toml_scalar(scalar));
		}
	}
}

fn toml_scalar(value: &toml::Value) -> String {
	match value {
		toml::Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Environment variable overrides
///
/// Each known key maps to one variable: the prefix followed by the key in
/// upper case with `.` and `-` replaced by `_` (`jdbc.url` with prefix
/// `FIXTUREKIT_` reads `FIXTUREKIT_JDBC_URL`). Only known keys are consulted;
/// the datasource keys are known by default.
pub struct EnvSource {
	prefix: String,
	keys: Vec<String>,
}

impl EnvSource {
	/// Create an override source with the given variable prefix
	///
	/// # Examples
	///
	/// ```
	/// use fixturekit_conf::sources::EnvSource;
	///
	/// let source = EnvSource::new("FIXTUREKIT_").with_key("schema.path");
	/// assert_eq!(source.variable_name("jdbc.url"), "FIXTUREKIT_JDBC_URL");
	/// ```
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			keys: RECOGNIZED_KEYS.iter().map(|k| k.to_string()).collect(),
		}
	}

	/// Add another key that may be overridden from the environment
	pub fn with_key(mut self, key: impl Into<String>) -> Self {
		self.keys.push(key.into());
		self
	}

	/// Name of the environment variable consulted for `key`
	pub fn variable_name(&self, key: &str) -> String {
		format!("{}{}", self.prefix, key.to_uppercase().replace(['.', '-'], "_"))
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> ConfigResult<IndexMap<String, String>> {
		let mut config = IndexMap::new();
		for key in &self.keys {
			if let Ok(value) = std::env::var(self.variable_name(key)) {
				config.insert(key.clone(), value);
			}
		}
		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

/// In-memory defaults
#[derive(Default)]
pub struct DefaultSource {
	values: IndexMap<String, String>,
}

impl DefaultSource {
	/// Create an empty default source
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a default value
	pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.values.insert(key.into(), value.into());
		self
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> ConfigResult<IndexMap<String, String>> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Default values".to_string()
	}
}
