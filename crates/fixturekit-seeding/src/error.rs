//! Error types for the seeding module.
//!
//! This module defines the error types used throughout the fixturekit-seeding crate.

use thiserror::Error;

/// Errors that can occur while reading, building or writing datasets.
#[derive(Debug, Error)]
pub enum SeedingError {
	/// Fixture content is not a well-formed dataset document.
	#[error("Parse error in {origin}: {message}")]
	Parse {
		/// Path or label of the fixture source.
		origin: String,
		/// What went wrong, including the position in the source.
		message: String,
	},

	/// Error serializing a dataset to fixture format.
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// I/O operation failed.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// Fixture file not found.
	#[error("Fixture file not found: {0}")]
	FileNotFound(String),

	/// Unsupported file extension.
	#[error("Unsupported file extension: {0}")]
	UnsupportedExtension(String),

	/// Unknown fixture format name.
	#[error("Invalid fixture format: {0}")]
	InvalidFormat(String),

	/// A dataset already holds a table with this name.
	#[error("Duplicate table in dataset: {0}")]
	DuplicateTable(String),

	/// A table was requested that the dataset does not hold.
	#[error("No such table: {0}")]
	NoSuchTable(String),

	/// A row does not supply one value per column.
	#[error("Row for table {table} has {found} values but the table has {expected} columns")]
	RowLength {
		/// Table name.
		table: String,
		/// Number of columns.
		expected: usize,
		/// Number of values supplied.
		found: usize,
	},

	/// A value cannot be represented in the requested type.
	#[error("Cannot convert '{value}' to {target}")]
	Conversion {
		/// Text form of the offending value.
		value: String,
		/// Target type name.
		target: String,
	},
}

/// Result type alias for seeding operations.
pub type SeedingResult<T> = Result<T, SeedingError>;
