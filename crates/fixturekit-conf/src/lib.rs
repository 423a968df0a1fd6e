//! # fixturekit configuration
//!
//! Named configuration profiles and the datasource settings extracted from
//! them.
//!
//! A profile is an ordered key/value map merged from one or more sources:
//!
//! - Java-style `.properties` files
//! - TOML files (nested tables flatten to dotted keys)
//! - environment overrides (`FIXTUREKIT_JDBC_URL` overrides `jdbc.url`)
//! - in-memory defaults
//!
//! `${name}` references are expanded after merging.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fixturekit_conf::{DataSourceSettings, Profile};
//!
//! let profile = Profile::from_file("tests/resources/liveDB.properties")?;
//! let settings = DataSourceSettings::from_profile(&profile)?;
//! println!("connecting to a {} database", settings.database_type);
//! # Ok::<(), fixturekit_conf::ConfigError>(())
//! ```

pub mod datasource;
pub mod error;
pub mod profile;
pub mod properties;
pub mod sources;

pub use datasource::{DataSourceSettings, DatabaseType, PoolSettings};
pub use error::{ConfigError, ConfigResult};
pub use profile::{Profile, ProfileLoader};
pub use sources::{ConfigSource, DefaultSource, EnvSource, PropertiesFileSource, TomlFileSource};
