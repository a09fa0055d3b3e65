//! INI document parsing: raw bytes into a [`Snapshot`].

use crate::snapshot::Snapshot;
use iniwatch_common::{ConfigError, Key};

/// Parse an INI document.
///
/// Keys before the first section header land in the root group (`""`).
/// Repeated sections merge, and a repeated key within a section keeps the
/// last value.
pub fn parse(raw: &[u8]) -> Result<Snapshot, ConfigError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| ConfigError::ParseError(format!("document is not valid UTF-8: {e}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut snapshot = Snapshot::new();
    let mut section = String::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let Some(end) = rest.find(']') else {
                return Err(ConfigError::ParseError(format!(
                    "line {line_no}: unterminated section header '{line}'"
                )));
            };
            let trailing = rest[end + 1..].trim_start();
            if !(trailing.is_empty() || trailing.starts_with(';') || trailing.starts_with('#')) {
                return Err(ConfigError::ParseError(format!(
                    "line {line_no}: unexpected text after section header '{line}'"
                )));
            }
            section = rest[..end].trim().to_string();
            continue;
        }

        let Some(pos) = line.find(|c: char| c == '=' || c == ':') else {
            return Err(ConfigError::ParseError(format!(
                "line {line_no}: key-value delimiter not found in '{line}'"
            )));
        };

        let name = line[..pos].trim();
        if name.is_empty() {
            return Err(ConfigError::ParseError(format!(
                "line {line_no}: empty key name"
            )));
        }

        let value = parse_value(line[pos + 1..].trim());
        snapshot.insert(Key::new(section.as_str(), name), value);
    }

    Ok(snapshot)
}

/// Unquote a value, or drop a trailing inline comment from an unquoted one.
fn parse_value(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }

    let mut prev_is_space = false;
    for (pos, c) in value.char_indices() {
        if prev_is_space && (c == ';' || c == '#') {
            return value[..pos].trim_end();
        }
        prev_is_space = c.is_whitespace();
    }
    value
}
