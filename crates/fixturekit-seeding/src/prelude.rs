//! Convenience re-exports for common usage.
//!
//! ```
//! use fixturekit_seeding::prelude::*;
//!
//! let loader = FixtureLoader::new().with_substitutions(Substitutions::null_token());
//! # let _ = loader;
//! ```

// Error types
pub use crate::error::{SeedingError, SeedingResult};

// Fixture types
pub use crate::fixtures::{
	Column, DataType, Dataset, FixtureFormat, FixtureLoader, FixtureParser, FixtureSerializer, Row,
	Substitutions, Table, Value,
};
