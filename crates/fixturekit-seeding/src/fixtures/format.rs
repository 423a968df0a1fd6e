//! Fixture format definitions.
//!
//! Two XML dataset layouts are understood:
//!
//! FLAT, one element per row, named after the table, with one attribute per
//! column:
//!
//! ```xml
//! <dataset>
//!   <ARTICLE_GLUE ARTICLE_ID="1" CATEGORY_ID="10"/>
//! </dataset>
//! ```
//!
//! FULL, explicit column declarations and native nulls:
//!
//! ```xml
//! <dataset>
//!   <table name="ARTICLE_AUTHOR">
//!     <column>AUTHOR_ID</column>
//!     <column>MIDDLE_NAME</column>
//!     <row><value>9001</value><null/></row>
//!   </table>
//! </dataset>
//! ```

use std::path::Path;
use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::SeedingError;

/// Supported fixture file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FixtureFormat {
	/// Flat XML: row elements named after their table (default).
	#[default]
	Flat,

	/// Full XML: `<table>`, `<column>`, `<row>`, `<value>` and `<null/>`.
	Full,
}

impl FixtureFormat {
	/// Determines the layout of an XML dataset from its first table element.
	///
	/// A `<table name="...">` element with children means FULL; anything else,
	/// including an empty dataset or unreadable content, means FLAT.
	///
	/// # Example
	///
	/// ```
	/// # use fixturekit_seeding::FixtureFormat;
	/// let full = r#"<dataset><table name="ARTICLE"><column>ID</column></table></dataset>"#;
	/// assert_eq!(FixtureFormat::detect(full), FixtureFormat::Full);
	/// assert_eq!(FixtureFormat::detect(r#"<dataset><ARTICLE ID="1"/></dataset>"#), FixtureFormat::Flat);
	/// ```
	pub fn detect(content: &str) -> Self {
		let mut reader = Reader::from_str(content);
		let mut buf = Vec::new();
		let mut depth = 0usize;

		loop {
			let event = match reader.read_event_into(&mut buf) {
				Ok(event) => event,
				Err(_) => return Self::Flat,
			};
			match event {
				Event::Eof => return Self::Flat,
				Event::Start(ref e) if depth == 1 => {
					let is_table = e.name().as_ref() == b"table"
						&& e.attributes().flatten().any(|a| a.key.as_ref() == b"name");
					return if is_table { Self::Full } else { Self::Flat };
				}
				Event::Empty(_) if depth == 1 => return Self::Flat,
				Event::Start(_) => depth += 1,
				Event::End(_) => depth = depth.saturating_sub(1),
				_ => {}
			}
			buf.clear();
		}
	}

	/// Returns true for paths with an `.xml` extension.
	///
	/// The layout itself is never inferred from the path.
	pub fn is_supported_path(path: &Path) -> bool {
		path.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
	}

	/// Format name as used on the command line.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Flat => "flat",
			Self::Full => "full",
		}
	}
}

impl FromStr for FixtureFormat {
	type Err = SeedingError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"flat" | "flatxml" | "flat-xml" => Ok(Self::Flat),
			"full" | "xml" | "full-xml" => Ok(Self::Full),
			other => Err(SeedingError::InvalidFormat(other.to_string())),
		}
	}
}

impl std::fmt::Display for FixtureFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Flat => write!(f, "FLAT"),
			Self::Full => write!(f, "FULL"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::path::PathBuf;

	#[rstest]
	#[case("flat", FixtureFormat::Flat)]
	#[case("FLAT", FixtureFormat::Flat)]
	#[case("full", FixtureFormat::Full)]
	#[case("Full-XML", FixtureFormat::Full)]
	fn test_fixture_format_from_str(#[case] input: &str, #[case] expected: FixtureFormat) {
		assert_eq!(input.parse::<FixtureFormat>().unwrap(), expected);
	}

	#[rstest]
	fn test_fixture_format_from_str_rejects_unknown() {
		let result = "yaml".parse::<FixtureFormat>();
		assert!(matches!(result, Err(SeedingError::InvalidFormat(name)) if name == "yaml"));
	}

	#[rstest]
	#[case(r#"<?xml version="1.0"?><dataset><table name="A"><column>X</column></table></dataset>"#, FixtureFormat::Full)]
	#[case(r#"<dataset>
		<!-- authors -->
		<table name="ARTICLE_AUTHOR">
			<column>AUTHOR_ID</column>
		</table>
	</dataset>"#, FixtureFormat::Full)]
	#[case(r#"<dataset><CATEGORY CATEGORY_ID="1"/></dataset>"#, FixtureFormat::Flat)]
	#[case(r#"<dataset><CATEGORY CATEGORY_ID="1"></CATEGORY></dataset>"#, FixtureFormat::Flat)]
	#[case(r#"<dataset><table name="A"/></dataset>"#, FixtureFormat::Flat)]
	#[case("<dataset/>", FixtureFormat::Flat)]
	#[case("not xml at all <<<", FixtureFormat::Flat)]
	fn test_detect(#[case] content: &str, #[case] expected: FixtureFormat) {
		assert_eq!(FixtureFormat::detect(content), expected);
	}

	#[rstest]
	fn test_is_supported_path() {
		assert!(FixtureFormat::is_supported_path(&PathBuf::from("data/authors.xml")));
		assert!(FixtureFormat::is_supported_path(&PathBuf::from("DATA.XML")));
		assert!(!FixtureFormat::is_supported_path(&PathBuf::from("fixtures.json")));
		assert!(!FixtureFormat::is_supported_path(&PathBuf::from("no_extension")));
	}

	#[rstest]
	fn test_display() {
		assert_eq!(FixtureFormat::Flat.to_string(), "FLAT");
		assert_eq!(FixtureFormat::Full.name(), "full");
	}
}
