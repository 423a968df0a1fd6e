//! Datasource settings extracted from a configuration profile.
//!
//! The recognized keys follow the JDBC naming used by existing fixture
//! profiles: `jdbc.url`, `jdbc.driver`, `jdbc.username` and `jdbc.password`.
//! Optional `pool.*` keys tune the connection pool.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{ConfigError, ConfigResult};
use crate::profile::Profile;

/// Key holding the connection URL.
pub const URL_KEY: &str = "jdbc.url";
/// Key holding the driver identifier.
pub const DRIVER_KEY: &str = "jdbc.driver";
/// Key holding the user name.
pub const USERNAME_KEY: &str = "jdbc.username";
/// Key holding the password.
pub const PASSWORD_KEY: &str = "jdbc.password";

/// Minimum number of pooled connections.
pub const POOL_MIN_SIZE_KEY: &str = "pool.min_size";
/// Maximum number of pooled connections.
pub const POOL_MAX_SIZE_KEY: &str = "pool.max_size";
/// Seconds to wait for a free connection.
pub const POOL_ACQUIRE_TIMEOUT_KEY: &str = "pool.acquire_timeout_secs";
/// Seconds an idle connection is kept.
pub const POOL_IDLE_TIMEOUT_KEY: &str = "pool.idle_timeout_secs";
/// Seconds a connection lives before it is recycled.
pub const POOL_MAX_LIFETIME_KEY: &str = "pool.max_lifetime_secs";

/// Every key the datasource understands.
pub const RECOGNIZED_KEYS: &[&str] = &[
	URL_KEY,
	DRIVER_KEY,
	USERNAME_KEY,
	PASSWORD_KEY,
	POOL_MIN_SIZE_KEY,
	POOL_MAX_SIZE_KEY,
	POOL_ACQUIRE_TIMEOUT_KEY,
	POOL_IDLE_TIMEOUT_KEY,
	POOL_MAX_LIFETIME_KEY,
];

/// Database backend reachable through a datasource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
	Sqlite,
	Postgres,
	Mysql,
}

impl DatabaseType {
	/// Determine the backend from a connection URL scheme.
	///
	/// A leading `jdbc:` is tolerated.
	///
	/// # Examples
	///
	/// ```
	/// use fixturekit_conf::DatabaseType;
	///
	/// assert_eq!(DatabaseType::from_url("sqlite::memory:").unwrap(), DatabaseType::Sqlite);
	/// assert_eq!(DatabaseType::from_url("postgresql://localhost/prefs").unwrap(), DatabaseType::Postgres);
	/// assert_eq!(DatabaseType::from_url("jdbc:mysql://localhost/prefs").unwrap(), DatabaseType::Mysql);
	/// assert!(DatabaseType::from_url("hsqldb:mem:test").is_err());
	/// ```
	pub fn from_url(url: &str) -> ConfigResult<Self> {
		let url = strip_jdbc_prefix(url);
		let scheme = url.split(':').next().unwrap_or_default().to_lowercase();
		match scheme.as_str() {
			"sqlite" => Ok(Self::Sqlite),
			"postgres" | "postgresql" => Ok(Self::Postgres),
			"mysql" | "mariadb" => Ok(Self::Mysql),
			_ => Err(ConfigError::UnsupportedDriver(format!(
				"no backend for URL scheme '{}'",
				scheme
			))),
		}
	}

	/// Determine the backend from a driver identifier.
	///
	/// Accepts short names (`sqlite`, `postgres`, `mysql`, ...) as well as
	/// JDBC driver class names that mention the backend
	/// (`org.postgresql.Driver`, `org.sqlite.JDBC`, `com.mysql.cj.jdbc.Driver`).
	pub fn from_driver(driver: &str) -> ConfigResult<Self> {
		let lowered = driver.trim().to_lowercase();
		if lowered.contains("sqlite") {
			Ok(Self::Sqlite)
		} else if lowered.contains("postgres") || lowered == "pg" {
			Ok(Self::Postgres)
		} else if lowered.contains("mysql") || lowered.contains("mariadb") {
			Ok(Self::Mysql)
		} else {
			Err(ConfigError::UnsupportedDriver(driver.to_string()))
		}
	}

	/// Short backend name.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Sqlite => "sqlite",
			Self::Postgres => "postgres",
			Self::Mysql => "mysql",
		}
	}

	/// Whether the backend authenticates with a user name and password.
	pub fn uses_credentials(&self) -> bool {
		!matches!(self, Self::Sqlite)
	}
}

impl fmt::Display for DatabaseType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

fn strip_jdbc_prefix(url: &str) -> &str {
	url.strip_prefix("jdbc:").unwrap_or(url)
}

/// Connection pool tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
	/// Minimum number of connections kept open
	pub min_size: u32,
	/// Maximum number of connections
	pub max_size: u32,
	/// Time to wait for a free connection
	pub acquire_timeout: Duration,
	/// Idle time before a connection is closed (None = no limit)
	pub idle_timeout: Option<Duration>,
	/// Lifetime before a connection is recycled (None = no limit)
	pub max_lifetime: Option<Duration>,
}

impl Default for PoolSettings {
	fn default() -> Self {
		Self {
			min_size: 0,
			max_size: 5,
			acquire_timeout: Duration::from_secs(30),
			idle_timeout: Some(Duration::from_secs(600)),
			max_lifetime: Some(Duration::from_secs(1800)),
		}
	}
}

/// Everything needed to build a connection pool
#[derive(Debug)]
pub struct DataSourceSettings {
	/// Connection URL without the optional `jdbc:` prefix
	pub url: String,
	/// Driver identifier as configured
	pub driver: Option<String>,
	/// Backend implied by the URL
	pub database_type: DatabaseType,
	/// User name for server backends
	pub username: Option<String>,
	/// Password for server backends
	pub password: Option<SecretString>,
	/// Pool tuning
	pub pool: PoolSettings,
}

impl DataSourceSettings {
	/// Settings for a bare URL with default pool tuning.
	pub fn new(url: impl Into<String>) -> ConfigResult<Self> {
		let url = url.into();
		let url = strip_jdbc_prefix(&url);
		// sqlx only registers the mysql scheme for MariaDB servers
		let url = match url.strip_prefix("mariadb:") {
			Some(rest) => format!("mysql:{}", rest),
			None => url.to_string(),
		};
		let database_type = DatabaseType::from_url(&url)?;
		Ok(Self {
			url,
			driver: None,
			database_type,
			username: None,
			password: None,
			pool: PoolSettings::default(),
		})
	}

	/// Extract the recognized keys from a loaded profile.
	///
	/// Fails when `jdbc.url` is missing, when `jdbc.driver` names another
	/// backend than the URL, or when a pool key is not a number.
	pub fn from_profile(profile: &Profile) -> ConfigResult<Self> {
		let mut settings = Self::new(profile.require(URL_KEY)?)?;

		if let Some(driver) = profile.get(DRIVER_KEY).filter(|d| !d.trim().is_empty()) {
			let declared = DatabaseType::from_driver(driver)?;
			if declared != settings.database_type {
				return Err(ConfigError::DriverMismatch {
					driver: driver.to_string(),
					scheme: settings.database_type.name().to_string(),
				});
			}
			settings.driver = Some(driver.to_string());
		}

		settings.username = profile.get(USERNAME_KEY).map(str::to_string);
		settings.password = profile
			.get(PASSWORD_KEY)
			.map(|p| SecretString::from(p.to_string()));

		let defaults = PoolSettings::default();
		settings.pool = PoolSettings {
			min_size: parse_number(profile, POOL_MIN_SIZE_KEY)?.unwrap_or(defaults.min_size),
			max_size: parse_number(profile, POOL_MAX_SIZE_KEY)?.unwrap_or(defaults.max_size),
			acquire_timeout: parse_number(profile, POOL_ACQUIRE_TIMEOUT_KEY)?
				.map(Duration::from_secs)
				.unwrap_or(defaults.acquire_timeout),
			idle_timeout: parse_number(profile, POOL_IDLE_TIMEOUT_KEY)?
				.map(Duration::from_secs)
				.or(defaults.idle_timeout),
			max_lifetime: parse_number(profile, POOL_MAX_LIFETIME_KEY)?
				.map(Duration::from_secs)
				.or(defaults.max_lifetime),
		};
		if settings.pool.max_size == 0 || settings.pool.min_size > settings.pool.max_size {
			return Err(ConfigError::InvalidValue {
				key: POOL_MAX_SIZE_KEY.to_string(),
				message: format!(
					"pool bounds {}..{} are not usable",
					settings.pool.min_size, settings.pool.max_size
				),
			});
		}

		Ok(settings)
	}

	/// Set user name and password.
	pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
		self.username = Some(username.into());
		self.password = Some(SecretString::from(password.into()));
		self
	}

	/// Set pool tuning.
	pub fn with_pool(mut self, pool: PoolSettings) -> Self {
		self.pool = pool;
		self
	}

	/// URL handed to the driver.
	///
	/// For server backends the configured user name and password are
	/// injected when the URL does not carry its own.
	pub fn connect_url(&self) -> ConfigResult<String> {
		if !self.database_type.uses_credentials() {
			return Ok(self.url.clone());
		}
		let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) else {
			return Ok(self.url.clone());
		};

		let mut parsed = url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidValue {
			key: URL_KEY.to_string(),
			message: e.to_string(),
		})?;
		if !parsed.username().is_empty() {
			return Ok(self.url.clone());
		}

		let invalid = |_| ConfigError::InvalidValue {
			key: URL_KEY.to_string(),
			message: "URL cannot carry credentials".to_string(),
		};
		parsed.set_username(username).map_err(invalid)?;
		if let Some(password) = &self.password {
			parsed
				.set_password(Some(password.expose_secret()))
				.map_err(invalid)?;
		}
		Ok(parsed.into())
	}
}

fn parse_number<T: std::str::FromStr>(profile: &Profile, key: &str) -> ConfigResult<Option<T>>
where
	T::Err: fmt::Display,
{
	profile
		.get(key)
		.map(|raw| {
			raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
				key: key.to_string(),
				message: e.to_string(),
			})
		})
		.transpose()
}
