//! Fixture parsing functionality.
//!
//! This module turns FLAT and FULL XML dataset documents into [`Dataset`]s
//! using `quick-xml`. Parsing never substitutes sentinel tokens; see
//! [`FixtureLoader`](super::FixtureLoader) for that.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, BytesText, Event};

use super::dataset::{Column, Dataset, Table};
use super::format::FixtureFormat;
use super::value::Value;
use crate::error::{SeedingError, SeedingResult};

const ROOT_ELEMENT: &str = "dataset";

/// Parser for XML dataset documents.
#[derive(Debug, Clone, Default)]
pub struct FixtureParser {
	column_sensing: bool,
}

impl FixtureParser {
	/// Creates a new fixture parser.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets whether FLAT rows may introduce columns the first row lacked.
	///
	/// When disabled (the default) such attributes are ignored with a warning.
	/// When enabled the column is appended and earlier rows read null for it.
	pub fn with_column_sensing(mut self, enabled: bool) -> Self {
		self.column_sensing = enabled;
		self
	}

	/// Parses `content` in the given layout. `origin` names the source in
	/// error messages.
	pub fn parse(&self, content: &str, format: FixtureFormat, origin: &str) -> SeedingResult<Dataset> {
		match format {
			FixtureFormat::Flat => self.parse_flat(content, origin),
			FixtureFormat::Full => parse_full(content, origin),
		}
	}

	fn parse_flat(&self, content: &str, origin: &str) -> SeedingResult<Dataset> {
		let mut xml = XmlStream::new(content, origin);
		let mut dataset = Dataset::new();
		let mut depth = 0usize;
		let mut seen_root = false;

		loop {
			let event = xml.next()?;
			match event {
				Event::Eof => break,
				Event::Start(ref e) | Event::Empty(ref e) => {
					let is_empty = matches!(event, Event::Empty(_));
					match depth {
						0 => {
							xml.expect_root(e, seen_root)?;
							seen_root = true;
						}
						1 => self.flat_row(&mut dataset, &xml, e)?,
						_ => {
							let name = xml.name(e.name().as_ref())?;
							return Err(xml.error(format!("unexpected element <{}> inside a row", name)));
						}
					}
					if !is_empty {
						depth += 1;
					}
				}
				Event::End(_) => depth = depth.saturating_sub(1),
				Event::Text(ref t) => xml.reject_text(t.as_ref())?,
				Event::CData(ref c) => xml.reject_text(c.as_ref())?,
				_ => {}
			}
		}

		if !seen_root {
			return Err(xml.error(format!("missing <{}> root element", ROOT_ELEMENT)));
		}
		Ok(dataset)
	}

	fn flat_row(&self, dataset: &mut Dataset, xml: &XmlStream<'_>, e: &BytesStart<'_>) -> SeedingResult<()> {
		let table_name = xml.name(e.name().as_ref())?;
		let attributes = xml.attributes(e)?;

		// A table that reappears later appends to its first occurrence.
		let index = match dataset.tables().iter().position(|t| t.is_named(&table_name)) {
			Some(index) => index,
			None => {
				dataset.add_table(Table::new(table_name.clone(), Vec::new()))?;
				dataset.len() - 1
			}
		};
		let table = &mut dataset.tables_mut()[index];

		if attributes.is_empty() {
			return Ok(());
		}
		if table.columns().is_empty() {
			for (column, _) in &attributes {
				table.add_column(Column::new(column.clone()));
			}
		}

		let mut values = vec![Value::Null; table.columns().len()];
		for (column, text) in attributes {
			match table.column_index(&column) {
				Some(position) => values[position] = Value::Text(text),
				None if self.column_sensing => {
					table.add_column(Column::new(column));
					values.push(Value::Text(text));
				}
				None => {
					tracing::warn!(
						origin = %xml.origin,
						table = %table.name(),
						column = %column,
						row = table.row_count(),
						"Ignoring column not declared by the first row"
					);
				}
			}
		}
		table.push_row(values)
	}
}

/// Position inside a FULL document.
enum FullState {
	Root,
	Dataset,
	Table(Table),
	Column(Table, String),
	Row(Table, Vec<Value>),
	Value(Table, Vec<Value>, String),
	Null(Table, Vec<Value>),
	Done,
}

impl FullState {
	fn context(&self) -> &'static str {
		match self {
			Self::Root => "the document",
			Self::Dataset => "<dataset>",
			Self::Table(_) => "<table>",
			Self::Column(..) => "<column>",
			Self::Row(..) => "<row>",
			Self::Value(..) => "<value>",
			Self::Null(..) => "<null>",
			Self::Done => "the end of the document",
		}
	}
}

fn parse_full(content: &str, origin: &str) -> SeedingResult<Dataset> {
	let mut xml = XmlStream::new(content, origin);
	let mut dataset = Dataset::new();
	let mut state = FullState::Root;

	loop {
		let event = xml.next()?;
		state = match event {
			Event::Eof => break,
			Event::Start(ref e) => full_start(state, &xml, e, &mut dataset)?,
			Event::Empty(ref e) => {
				let opened = full_start(state, &xml, e, &mut dataset)?;
				full_end(opened, &xml, &mut dataset)?
			}
			Event::End(_) => full_end(state, &xml, &mut dataset)?,
			Event::Text(ref t) => match state {
				FullState::Column(table, mut text) => {
					text.push_str(&xml.text(t)?);
					FullState::Column(table, text)
				}
				FullState::Value(table, values, mut text) => {
					text.push_str(&xml.text(t)?);
					FullState::Value(table, values, text)
				}
				other => {
					xml.reject_text(t.as_ref())?;
					other
				}
			},
			Event::CData(ref c) => match state {
				FullState::Column(table, mut text) => {
					text.push_str(&String::from_utf8_lossy(c.as_ref()));
					FullState::Column(table, text)
				}
				FullState::Value(table, values, mut text) => {
					text.push_str(&String::from_utf8_lossy(c.as_ref()));
					FullState::Value(table, values, text)
				}
				other => {
					xml.reject_text(c.as_ref())?;
					other
				}
			},
			_ => state,
		};
	}

	match state {
		FullState::Done => Ok(dataset),
		FullState::Root => Err(xml.error(format!("missing <{}> root element", ROOT_ELEMENT))),
		other => Err(xml.error(format!("document ends inside {}", other.context()))),
	}
}

fn full_start(
	state: FullState,
	xml: &XmlStream<'_>,
	e: &BytesStart<'_>,
	dataset: &mut Dataset,
) -> SeedingResult<FullState> {
	let element = xml.name(e.local_name().as_ref())?;

	let next = match (state, element.as_str()) {
		(FullState::Root, _) => {
			xml.expect_root(e, false)?;
			FullState::Dataset
		}
		(FullState::Dataset, "table") => {
			let name = xml
				.attributes(e)?
				.into_iter()
				.find(|(key, _)| key == "name")
				.map(|(_, value)| value)
				.filter(|value| !value.trim().is_empty())
				.ok_or_else(|| xml.error("<table> requires a name attribute"))?;
			if dataset.table(&name).is_some() {
				return Err(SeedingError::DuplicateTable(name));
			}
			FullState::Table(Table::new(name, Vec::new()))
		}
		(FullState::Table(table), "column") => {
			if table.row_count() > 0 {
				return Err(xml.error(format!(
					"<column> after the first <row> of table {}",
					table.name()
				)));
			}
			FullState::Column(table, String::new())
		}
		(FullState::Table(table), "row") => FullState::Row(table, Vec::new()),
		(FullState::Row(table, values), "value") => FullState::Value(table, values, String::new()),
		(FullState::Row(table, values), "null") => FullState::Null(table, values),
		(state, other) => {
			return Err(xml.error(format!(
				"unexpected element <{}> inside {}",
				other,
				state.context()
			)));
		}
	};
	Ok(next)
}

fn full_end(state: FullState, xml: &XmlStream<'_>, dataset: &mut Dataset) -> SeedingResult<FullState> {
	let next = match state {
		FullState::Dataset => FullState::Done,
		FullState::Table(table) => {
			dataset.add_table(table)?;
			FullState::Dataset
		}
		FullState::Column(mut table, name) => {
			let name = name.trim();
			if name.is_empty() {
				return Err(xml.error(format!("empty <column> in table {}", table.name())));
			}
			if table.column_index(name).is_some() {
				return Err(xml.error(format!(
					"column {} declared twice in table {}",
					name,
					table.name()
				)));
			}
			table.add_column(Column::new(name));
			FullState::Table(table)
		}
		FullState::Row(mut table, values) => {
			if values.len() != table.columns().len() {
				return Err(xml.error(format!(
					"row {} of table {} has {} values but {} columns are declared",
					table.row_count(),
					table.name(),
					values.len(),
					table.columns().len()
				)));
			}
			table.push_row(values)?;
			FullState::Table(table)
		}
		FullState::Value(table, mut values, text) => {
			values.push(Value::Text(text));
			FullState::Row(table, values)
		}
		FullState::Null(table, mut values) => {
			values.push(Value::Null);
			FullState::Row(table, values)
		}
		other => other,
	};
	Ok(next)
}

/// Event source with position-aware error reporting.
struct XmlStream<'a> {
	reader: Reader<&'a [u8]>,
	content: &'a str,
	origin: &'a str,
}

impl<'a> XmlStream<'a> {
	fn new(content: &'a str, origin: &'a str) -> Self {
		Self {
			reader: Reader::from_str(content),
			content,
			origin,
		}
	}

	fn next(&mut self) -> SeedingResult<Event<'a>> {
		self.reader.read_event().map_err(|e| {
			let position = self.reader.error_position() as usize;
			self.error_at(position, format!("malformed XML: {}", e))
		})
	}

	fn expect_root(&self, e: &BytesStart<'_>, seen_root: bool) -> SeedingResult<()> {
		if seen_root {
			return Err(self.error("more than one root element"));
		}
		let name = self.name(e.local_name().as_ref())?;
		if name != ROOT_ELEMENT {
			return Err(self.error(format!(
				"expected <{}> root element, found <{}>",
				ROOT_ELEMENT, name
			)));
		}
		Ok(())
	}

	fn name(&self, raw: &[u8]) -> SeedingResult<String> {
		std::str::from_utf8(raw)
			.map(str::to_string)
			.map_err(|_| self.error("element name is not valid UTF-8"))
	}

	fn attributes(&self, e: &BytesStart<'_>) -> SeedingResult<Vec<(String, String)>> {
		let mut attributes = Vec::new();
		for attribute in e.attributes() {
			let attribute =
				attribute.map_err(|err| self.error(format!("malformed attribute: {}", err)))?;
			let key = self.name(attribute.key.as_ref())?;
			let value = attribute
				.unescape_value()
				.map_err(|err| self.error(format!("malformed value for attribute {}: {}", key, err)))?;
			attributes.push((key, value.into_owned()));
		}
		Ok(attributes)
	}

	fn text(&self, t: &BytesText<'_>) -> SeedingResult<String> {
		t.unescape()
			.map(Cow::into_owned)
			.map_err(|err| self.error(format!("malformed text: {}", err)))
	}

	fn reject_text(&self, raw: &[u8]) -> SeedingResult<()> {
		if raw.iter().all(u8::is_ascii_whitespace) {
			Ok(())
		} else {
			Err(self.error("unexpected text content"))
		}
	}

	fn error(&self, message: impl Into<String>) -> SeedingError {
		self.error_at(self.reader.buffer_position() as usize, message)
	}

	fn error_at(&self, position: usize, message: impl Into<String>) -> SeedingError {
		let clamped = position.min(self.content.len());
		let line = self.content.as_bytes()[..clamped]
			.iter()
			.filter(|b| **b == b'\n')
			.count() + 1;
		SeedingError::Parse {
			origin: self.origin.to_string(),
			message: format!("{} (line {}, byte {})", message.into(), line, position),
		}
	}
}
