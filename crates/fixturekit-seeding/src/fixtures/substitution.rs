//! Sentinel substitution applied to parsed datasets.

use super::dataset::Dataset;
use super::value::Value;

/// Token conventionally written in fixtures for a null cell.
pub const NULL_TOKEN: &str = "[null]";

/// Rules replacing sentinel tokens in text cells.
///
/// Whole-cell rules are tried first: a text cell equal to a token becomes
/// the mapped value. Otherwise substring rules rewrite the text in
/// registration order.
///
/// # Example
///
/// ```
/// # use fixturekit_seeding::{Substitutions, Value};
/// let rules = Substitutions::new()
///     .with_null("[null]")
///     .with_substring("${year}", "2024");
///
/// assert_eq!(rules.apply_value(&Value::from("[null]")), Value::Null);
/// assert_eq!(rules.apply_value(&Value::from("Season ${year}")), Value::from("Season 2024"));
/// assert_eq!(rules.apply_value(&Value::from("[null] ")), Value::from("[null] "));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitutions {
	objects: Vec<(String, Value)>,
	substrings: Vec<(String, String)>,
}

impl Substitutions {
	/// No rules.
	pub fn new() -> Self {
		Self::default()
	}

	/// The canonical rule set: `[null]` becomes null.
	pub fn null_token() -> Self {
		Self::new().with_null(NULL_TOKEN)
	}

	/// Cells equal to `token` become null.
	pub fn with_null(self, token: impl Into<String>) -> Self {
		self.with_object(token, Value::Null)
	}

	/// Cells equal to `token` become `value`.
	pub fn with_object(mut self, token: impl Into<String>, value: impl Into<Value>) -> Self {
		self.objects.push((token.into(), value.into()));
		self
	}

	/// Occurrences of `from` inside text cells become `to`.
	pub fn with_substring(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
		let from = from.into();
		if !from.is_empty() {
			self.substrings.push((from, to.into()));
		}
		self
	}

	/// Returns true when no rule is registered.
	pub fn is_empty(&self) -> bool {
		self.objects.is_empty() && self.substrings.is_empty()
	}

	/// Result of applying the rules to one value.
	pub fn apply_value(&self, value: &Value) -> Value {
		let Value::Text(text) = value else {
			return value.clone();
		};

		if let Some((_, replacement)) = self.objects.iter().find(|(token, _)| token == text) {
			return replacement.clone();
		}

		let mut rewritten = text.clone();
		for (from, to) in &self.substrings {
			if rewritten.contains(from.as_str()) {
				rewritten = rewritten.replace(from.as_str(), to);
			}
		}
		Value::Text(rewritten)
	}

	/// Applies the rules to every cell of `dataset` in place.
	pub fn apply(&self, dataset: &mut Dataset) {
		if self.is_empty() {
			return;
		}
		let mut replaced = 0usize;
		for table in dataset.tables_mut() {
			for row in table.rows_mut() {
				for value in row.values_mut() {
					let substituted = self.apply_value(value);
					if substituted != *value {
						*value = substituted;
						replaced += 1;
					}
				}
			}
		}
		tracing::trace!(replaced, "Applied fixture substitutions");
	}
}
