//! Dataset model and XML fixture handling for fixturekit.
//!
//! This crate reads DbUnit-compatible dataset documents into an in-memory
//! [`Dataset`] and writes datasets back out:
//!
//! - **FLAT XML**: one element per row, named after its table
//! - **FULL XML**: explicit `<column>` declarations and `<null/>` cells
//! - **Substitutions**: sentinel tokens such as `[null]` replaced after parsing
//!
//! # Quick Start
//!
//! ```no_run
//! use fixturekit_seeding::prelude::*;
//!
//! let dataset = FixtureLoader::new().load("tests/resources/data/marketing-preferences.xml", None)?;
//! for cell in dataset.cells() {
//!     println!("{}[{}].{} = {}", cell.table, cell.row, cell.column, cell.value);
//! }
//! # Ok::<(), SeedingError>(())
//! ```
//!
//! # Architecture
//!
//! - [`Dataset`](fixtures::Dataset) - Ordered, uniquely named tables
//! - [`FixtureFormat`](fixtures::FixtureFormat) - FLAT or FULL layout
//! - [`FixtureParser`](fixtures::FixtureParser) - Parse XML content
//! - [`FixtureLoader`](fixtures::FixtureLoader) - Load fixture files with substitution
//! - [`FixtureSerializer`](fixtures::FixtureSerializer) - Serialize datasets to XML

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod fixtures;
pub mod prelude;

// Re-export commonly used types at crate root
pub use error::{SeedingError, SeedingResult};
pub use fixtures::{
	Cell, Cells, Column, DataType, Dataset, FixtureFormat, FixtureLoader, FixtureParser,
	FixtureSerializer, NULL_TOKEN, Row, Substitutions, Table, Value, exact_integer, parse_boolean,
};
