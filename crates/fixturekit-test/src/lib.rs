//! # fixturekit-test
//!
//! Test-side helpers for fixturekit.
//!
//! ## Features
//!
//! - **Assertions**: [`assert_dataset_eq`] and [`compare_datasets`] check an
//!   expected dataset against live tables, naming the first differing cell
//! - **[`DatabaseTestCase`]**: schema-once, seed-per-test lifecycle
//! - **Fixtures**: rstest fixtures for throwaway SQLite databases
//! - **Logging**: [`LogCapture`] records `tracing` events for assertions

#![warn(missing_docs)]

pub mod assertions;
pub mod fixtures;
pub mod logging;
pub mod testcase;

pub use assertions::{
	DatasetMismatch, assert_dataset_eq, assert_table_eq, compare_datasets, compare_datasets_all,
	compare_tables, values_equal,
};
pub use fixtures::SqliteDatabase;
pub use logging::{CapturedEvent, LogCapture, init_test_logging};
pub use testcase::{DatabaseTestCase, VerificationError};
