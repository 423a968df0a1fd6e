//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a configuration profile or extracting
/// datasource settings from it.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The configuration source does not exist.
	#[error("Configuration source not found: {}", .0.display())]
	NotFound(PathBuf),

	/// The configuration source exists but could not be read.
	#[error("Unable to read {}: {source}", .path.display())]
	Io {
		/// Path of the source.
		path: PathBuf,
		/// Underlying I/O failure.
		#[source]
		source: std::io::Error,
	},

	/// A properties source is malformed.
	#[error("Parse error in {origin} at line {line}: {message}")]
	Parse {
		/// Description of the source being parsed.
		origin: String,
		/// 1-based line number.
		line: usize,
		/// What went wrong.
		message: String,
	},

	/// A TOML source is malformed.
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A required key is absent from the profile.
	#[error("Missing required configuration key: {0}")]
	MissingKey(String),

	/// A `${name}` reference could not be resolved.
	#[error("Unresolved variable ${{{0}}}")]
	UnresolvedVariable(String),

	/// A value could not be interpreted.
	#[error("Invalid value for '{key}': {message}")]
	InvalidValue {
		/// Offending key.
		key: String,
		/// What went wrong.
		message: String,
	},

	/// The driver identifier names a backend we cannot reach.
	#[error("Unsupported database driver: {0}")]
	UnsupportedDriver(String),

	/// The configured driver and the URL scheme disagree.
	#[error("Driver '{driver}' does not match connection URL scheme '{scheme}'")]
	DriverMismatch {
		/// Value of the driver key.
		driver: String,
		/// Backend implied by the URL.
		scheme: String,
	},
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
