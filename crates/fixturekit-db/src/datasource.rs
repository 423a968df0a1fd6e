//! Pooled connection factory built from a configuration profile.

use std::path::Path;

use fixturekit_conf::{DataSourceSettings, DatabaseType, Profile};
use sqlx::pool::{PoolConnection, PoolOptions};
use sqlx::{Any, AnyPool};

use crate::dialect::Dialect;
use crate::error::{DatabaseError, DatabaseResult};

/// A pooled connection factory.
///
/// Cloning is cheap and every clone shares the same pool. Connections handed
/// out by [`DataSource::connect`] go back to the pool when dropped.
#[derive(Debug, Clone)]
pub struct DataSource {
	pool: AnyPool,
	database_type: DatabaseType,
	name: String,
}

impl DataSource {
	/// Builds a datasource from a loaded profile.
	///
	/// Every profile entry is written to the debug log, except keys containing
	/// `pass`.
	///
	/// # Errors
	///
	/// Fails when the profile lacks `jdbc.url`, names a driver that does not
	/// match the URL, or when the pool cannot open its connections.
	pub async fn from_profile(profile: &Profile) -> DatabaseResult<Self> {
		tracing::info!(profile = profile.name(), "Creating datasource");
		profile.log_redacted();

		let settings = DataSourceSettings::from_profile(profile)?;
		Self::connect_with(profile.name(), &settings).await
	}

	/// Loads the profile at `path` and builds a datasource from it.
	pub async fn from_profile_path(path: impl AsRef<Path>) -> DatabaseResult<Self> {
		let profile = Profile::from_file(path)?;
		Self::from_profile(&profile).await
	}

	/// Builds a datasource from explicit settings.
	pub async fn from_settings(settings: &DataSourceSettings) -> DatabaseResult<Self> {
		Self::connect_with(settings.database_type.name(), settings).await
	}

	/// Builds a datasource for a bare connection URL with default pool tuning.
	pub async fn from_url(url: &str) -> DatabaseResult<Self> {
		let settings = DataSourceSettings::new(url)?;
		Self::from_settings(&settings).await
	}

	async fn connect_with(name: &str, settings: &DataSourceSettings) -> DatabaseResult<Self> {
		sqlx::any::install_default_drivers();

		let pool_settings = &settings.pool;
		let mut options = PoolOptions::<Any>::new()
			.min_connections(pool_settings.min_size)
			.max_connections(pool_settings.max_size)
			.acquire_timeout(pool_settings.acquire_timeout);

		if let Some(idle_timeout) = pool_settings.idle_timeout {
			options = options.idle_timeout(idle_timeout);
		}
		if let Some(max_lifetime) = pool_settings.max_lifetime {
			options = options.max_lifetime(max_lifetime);
		}

		let url = settings.connect_url()?;
		let pool = options
			.connect(&url)
			.await
			.map_err(DatabaseError::Connection)?;

		tracing::debug!(
			datasource = name,
			database = %settings.database_type,
			max_connections = pool_settings.max_size,
			"Connection pool ready"
		);

		Ok(Self {
			pool,
			database_type: settings.database_type,
			name: name.to_string(),
		})
	}

	/// Acquires a connection from the pool.
	pub async fn connect(&self) -> DatabaseResult<PoolConnection<Any>> {
		self.pool.acquire().await.map_err(DatabaseError::Connection)
	}

	/// Runs a trivial query to prove the database is reachable.
	pub async fn check_connection(&self) -> DatabaseResult<()> {
		sqlx::query("SELECT 1")
			.execute(&self.pool)
			.await
			.map_err(DatabaseError::Connection)?;
		Ok(())
	}

	/// Underlying pool.
	pub fn pool(&self) -> &AnyPool {
		&self.pool
	}

	/// Backend behind this datasource.
	pub fn database_type(&self) -> DatabaseType {
		self.database_type
	}

	/// SQL dialect of the backend.
	pub fn dialect(&self) -> Dialect {
		Dialect::new(self.database_type)
	}

	/// Profile name, or the backend name when built from bare settings.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Closes every pooled connection.
	pub async fn close(&self) {
		self.pool.close().await;
	}
}
