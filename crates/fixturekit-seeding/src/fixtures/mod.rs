//! XML fixture datasets.
//!
//! - [`Dataset`], [`Table`], [`Column`], [`Row`] and [`Value`] model the data
//! - [`FixtureParser`] reads FLAT and FULL XML
//! - [`FixtureLoader`] reads files and applies [`Substitutions`]
//! - [`FixtureSerializer`] writes datasets back to XML

pub mod dataset;
pub mod format;
pub mod loader;
pub mod parser;
pub mod serializer;
pub mod substitution;
pub mod value;

pub use dataset::{Cell, Cells, Column, Dataset, Row, Table};
pub use format::FixtureFormat;
pub use loader::FixtureLoader;
pub use parser::FixtureParser;
pub use serializer::FixtureSerializer;
pub use substitution::{NULL_TOKEN, Substitutions};
pub use value::{DataType, Value, exact_integer, parse_boolean};
