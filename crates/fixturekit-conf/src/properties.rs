//! Java-style `.properties` parsing.
//!
//! Supports `key=value`, `key: value` and `key value` entries, `#` and `!`
//! comment lines, backslash line continuation and the `\t`, `\n`, `\r`,
//! `\f`, `\\` and `\uXXXX` escapes.

use indexmap::IndexMap;

use crate::error::{ConfigError, ConfigResult};

/// Parses properties text into an ordered key/value map.
///
/// Later duplicates overwrite earlier entries but keep the original position.
///
/// # Examples
///
/// ```
/// use fixturekit_conf::properties::parse_properties;
///
/// let map = parse_properties("jdbc.url = sqlite::memory:\n# comment\njdbc.username: sa\n", "inline").unwrap();
/// assert_eq!(map["jdbc.url"], "sqlite::memory:");
/// assert_eq!(map["jdbc.username"], "sa");
/// ```
pub fn parse_properties(content: &str, origin: &str) -> ConfigResult<IndexMap<String, String>> {
	let mut entries = IndexMap::new();
	let mut lines = content.lines().enumerate();

	while let Some((index, raw)) = lines.next() {
		let line_number = index + 1;
		let trimmed = raw.trim_start();
		if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
			continue;
		}

		let mut logical = trimmed.to_string();
		while ends_with_continuation(&logical) {
			logical.pop();
			match lines.next() {
				Some((_, next)) => logical.push_str(next.trim_start()),
				None => break,
			}
		}

		let (key, value) = split_entry(&logical);
		let key = unescape(key, origin, line_number)?;
		let value = unescape(value, origin, line_number)?;
		entries.insert(key, value);
	}

	Ok(entries)
}

/// An odd number of trailing backslashes continues the entry on the next line.
fn ends_with_continuation(line: &str) -> bool {
	line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
	let mut escaped = false;
	let mut key_end = line.len();

	for (idx, ch) in line.char_indices() {
		if escaped {
			escaped = false;
			continue;
		}
		match ch {
			'\\' => escaped = true,
			'=' | ':' => {
				key_end = idx;
				break;
			}
			c if c.is_whitespace() => {
				key_end = idx;
				break;
			}
			_ => {}
		}
	}

	let key = &line[..key_end];
	let rest = line[key_end..].trim_start();
	let value = rest
		.strip_prefix(['=', ':'])
		.map(str::trim_start)
		.unwrap_or(rest);
	(key, value)
}

fn unescape(raw: &str, origin: &str, line: usize) -> ConfigResult<String> {
	let mut out = String::with_capacity(raw.len());
	let mut chars = raw.chars();

	while let Some(ch) = chars.next() {
		if ch != '\\' {
			out.push(ch);
			continue;
		}
		match chars.next() {
			Some('t') => out.push('\t'),
			Some('n') => out.push('\n'),
			Some('r') => out.push('\r'),
			Some('f') => out.push('\u{000C}'),
			Some('u') => {
				let hex: String = chars.by_ref().take(4).collect();
				let decoded = (hex.len() == 4)
					.then(|| u32::from_str_radix(&hex, 16).ok())
					.flatten()
					.and_then(char::from_u32)
					.ok_or_else(|| ConfigError::Parse {
						origin: origin.to_string(),
						line,
						message: format!("malformed \\u escape '\\u{}'", hex),
					})?;
				out.push(decoded);
			}
			Some(other) => out.push(other),
			None => {}
		}
	}

	Ok(out)
}
