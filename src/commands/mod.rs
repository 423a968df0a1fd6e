//! Fixture management commands.
//!
//! - [`LoadDataCommand`] - Installs XML fixtures into a database
//! - [`DumpDataCommand`] - Writes live tables out as an XML fixture

pub mod dumpdata;
pub mod loaddata;

use std::path::Path;

use fixturekit_conf::ProfileLoader;
use fixturekit_db::DataSource;

use crate::error::Result;

pub use dumpdata::{DumpDataArgs, DumpDataCommand, DumpDataOptions, DumpDataResult};
pub use loaddata::{
	LoadDataArgs, LoadDataCommand, LoadDataOptions, LoadDataResult, parse_key_columns,
};

/// Opens the datasource described by the profile at `path`.
///
/// With `env_prefix` set, environment variables such as
/// `{prefix}JDBC_URL` override the matching profile keys.
pub(crate) async fn open_datasource(path: &Path, env_prefix: Option<&str>) -> Result<DataSource> {
	let mut loader = ProfileLoader::for_file(path);
	if let Some(prefix) = env_prefix {
		loader = loader.env_overrides(prefix);
	}
	let profile = loader.load()?;
	Ok(DataSource::from_profile(&profile).await?)
}
