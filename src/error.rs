//! Unified error type for the facade and its commands.

use fixturekit_conf::ConfigError;
use fixturekit_db::DatabaseError;
use fixturekit_seeding::SeedingError;
use thiserror::Error;

/// Any failure raised while loading, applying, dumping or verifying datasets.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
	/// A configuration profile could not be loaded or is incomplete.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// A fixture could not be read, parsed or written.
	#[error(transparent)]
	Seeding(#[from] SeedingError),

	/// A database operation failed.
	#[error(transparent)]
	Database(#[from] DatabaseError),

	/// The live database does not match an expected dataset.
	#[cfg(feature = "test")]
	#[error(transparent)]
	Mismatch(#[from] fixturekit_test::DatasetMismatch),

	/// A command was invoked with arguments it cannot use.
	#[error("Invalid argument {argument}: {message}")]
	InvalidArgument {
		/// Argument name.
		argument: String,
		/// What is wrong with it.
		message: String,
	},

	/// Writing command output failed.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

impl Error {
	pub(crate) fn invalid_argument(argument: &str, message: impl Into<String>) -> Self {
		Self::InvalidArgument {
			argument: argument.to_string(),
			message: message.into(),
		}
	}
}

#[cfg(feature = "test")]
impl From<fixturekit_test::VerificationError> for Error {
	fn from(error: fixturekit_test::VerificationError) -> Self {
		match error {
			fixturekit_test::VerificationError::Database(e) => Self::Database(e),
			fixturekit_test::VerificationError::Mismatch(e) => Self::Mismatch(e),
		}
	}
}

/// Result type alias for facade operations.
pub type Result<T> = std::result::Result<T, Error>;
