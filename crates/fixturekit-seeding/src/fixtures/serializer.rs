//! Dataset serialization for fixture output.
//!
//! Writes datasets back to FLAT or FULL XML so that dumped tables can be
//! loaded again by [`FixtureLoader`](super::FixtureLoader).

use std::path::Path;

use quick_xml::escape::escape;

use super::dataset::{Dataset, Table};
use super::format::FixtureFormat;
use crate::error::SeedingResult;

const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";

/// Fixture serializer for exporting datasets.
#[derive(Debug, Clone)]
pub struct FixtureSerializer {
	/// Output format.
	format: FixtureFormat,

	/// Spaces per nesting level; zero writes everything on one line.
	indent: usize,

	/// Text written for null cells in FLAT output. `None` omits the attribute.
	null_token: Option<String>,
}

impl FixtureSerializer {
	/// Creates a new fixture serializer with default settings.
	pub fn new() -> Self {
		Self {
			format: FixtureFormat::Flat,
			indent: 2,
			null_token: None,
		}
	}

	/// Sets the output format.
	pub fn with_format(mut self, format: FixtureFormat) -> Self {
		self.format = format;
		self
	}

	/// Sets the indentation level.
	pub fn with_indent(mut self, indent: usize) -> Self {
		self.indent = indent;
		self
	}

	/// Writes null cells of FLAT output as `token` instead of omitting them.
	///
	/// Omitted attributes in the first row of a table drop the column when
	/// the fixture is read back, so dumps meant for reloading should set this
	/// to the loader's null token.
	pub fn with_null_token(mut self, token: impl Into<String>) -> Self {
		self.null_token = Some(token.into());
		self
	}

	/// Serializes a dataset to a string.
	pub fn serialize(&self, dataset: &Dataset) -> SeedingResult<String> {
		let mut out = String::new();
		out.push_str(XML_DECLARATION);
		self.newline(&mut out);
		out.push_str("<dataset>");
		self.newline(&mut out);
		for table in dataset {
			match self.format {
				FixtureFormat::Flat => self.write_flat_table(&mut out, table),
				FixtureFormat::Full => self.write_full_table(&mut out, table),
			}
		}
		out.push_str("</dataset>");
		self.newline(&mut out);
		Ok(out)
	}

	fn write_flat_table(&self, out: &mut String, table: &Table) {
		let name = table.name();
		if table.row_count() == 0 {
			self.open_line(out, 1);
			out.push_str(&format!("<{}/>", name));
			self.newline(out);
			return;
		}

		for row in table.rows() {
			self.open_line(out, 1);
			out.push('<');
			out.push_str(name);
			for (column, value) in table.columns().iter().zip(row.values()) {
				let text = match (value.to_text(), &self.null_token) {
					(Some(text), _) => text,
					(None, Some(token)) => token.clone(),
					(None, None) => continue,
				};
				out.push_str(&format!(" {}=\"{}\"", column.name, escape(text.as_str())));
			}
			out.push_str("/>");
			self.newline(out);
		}
	}

	fn write_full_table(&self, out: &mut String, table: &Table) {
		self.open_line(out, 1);
		out.push_str(&format!("<table name=\"{}\">", escape(table.name())));
		self.newline(out);

		for column in table.columns() {
			self.open_line(out, 2);
			out.push_str(&format!("<column>{}</column>", escape(column.name.as_str())));
			self.newline(out);
		}
		for row in table.rows() {
			self.open_line(out, 2);
			out.push_str("<row>");
			self.newline(out);
			for value in row.values() {
				self.open_line(out, 3);
				match value.to_text() {
					Some(text) => out.push_str(&format!("<value>{}</value>", escape(text.as_str()))),
					None => out.push_str("<null/>"),
				}
				self.newline(out);
			}
			self.open_line(out, 2);
			out.push_str("</row>");
			self.newline(out);
		}

		self.open_line(out, 1);
		out.push_str("</table>");
		self.newline(out);
	}

	fn open_line(&self, out: &mut String, level: usize) {
		out.push_str(&" ".repeat(self.indent * level));
	}

	fn newline(&self, out: &mut String) {
		if self.indent > 0 {
			out.push('\n');
		}
	}

	/// Writes a serialized dataset to a file.
	pub fn write_to_file(&self, dataset: &Dataset, path: &Path) -> SeedingResult<()> {
		let content = self.serialize(dataset)?;
		std::fs::write(path, content)?;
		Ok(())
	}

	/// Returns the configured output format.
	pub fn format(&self) -> FixtureFormat {
		self.format
	}

	/// Returns the configured indentation level.
	pub fn indent(&self) -> usize {
		self.indent
	}
}

impl Default for FixtureSerializer {
	fn default() -> Self {
		Self::new()
	}
}
