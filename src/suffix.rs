//! Suffix composition for annotation text.
//!
//! When a stamp or default text is finalized, a fixed label and/or a UTC
//! timestamp can be appended in one of several layouts. [`strip`] inverts
//! [`compose`] for the same config, so re-editing an annotation never
//! accumulates suffixes across saves.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format used in composed suffixes.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Byte length of a formatted timestamp, e.g. `2025-01-15T10:00:00Z`.
const TIMESTAMP_LEN: usize = 20;

/// Where composed suffixes are placed relative to the base text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuffixPlacement {
    /// Suffixes follow the base text on the same line, space separated.
    #[default]
    Adjacent,
    /// Base text, then one line with all suffixes space separated.
    BelowSingleLine,
    /// Base text, then each suffix on its own line.
    BelowMultiLine,
}

/// A bracket pair wrapped around each suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketPair {
    pub open: String,
    pub close: String,
}

impl BracketPair {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// The `[` `]` pair.
    pub fn square() -> Self {
        Self::new("[", "]")
    }
}

/// Host-supplied suffix policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuffixConfig {
    /// Fixed text appended after the base text (e.g. reviewer initials).
    #[serde(default)]
    pub fixed_text: Option<String>,
    /// Whether to append a UTC timestamp.
    #[serde(default)]
    pub timestamp: bool,
    /// Bracket pair wrapped around each suffix.
    #[serde(default)]
    pub brackets: Option<BracketPair>,
    #[serde(default)]
    pub placement: SuffixPlacement,
}

impl SuffixConfig {
    fn is_active(&self) -> bool {
        self.fixed_text.is_some() || self.timestamp
    }
}

/// Append the configured suffixes to `base`.
///
/// Composition order is always fixed text first, then timestamp. With no
/// suffix enabled the base text is returned unchanged.
pub fn compose(base: &str, config: &SuffixConfig, now: DateTime<Utc>) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(fixed) = &config.fixed_text {
        parts.push(wrap(config, fixed));
    }
    if config.timestamp {
        parts.push(wrap(config, &now.format(TIMESTAMP_FORMAT).to_string()));
    }
    if parts.is_empty() {
        return base.to_string();
    }

    match config.placement {
        SuffixPlacement::Adjacent => {
            let mut out = String::from(base);
            for part in parts {
                out.push(' ');
                out.push_str(&part);
            }
            out
        }
        SuffixPlacement::BelowSingleLine => format!("{}\n{}", base, parts.join(" ")),
        SuffixPlacement::BelowMultiLine => {
            let mut out = String::from(base);
            for part in parts {
                out.push('\n');
                out.push_str(&part);
            }
            out
        }
    }
}

/// Remove the suffixes [`compose`] appended under the same config.
///
/// Suffixes are removed from the end in reverse composition order
/// (timestamp, then fixed text). Timestamps are recognized by parsing, not
/// by value, so any compose-produced timestamp strips cleanly. Text that
/// does not carry the expected suffixes is returned unchanged.
pub fn strip(text: &str, config: &SuffixConfig) -> String {
    if !config.is_active() {
        return text.to_string();
    }
    match config.placement {
        SuffixPlacement::Adjacent => strip_adjacent(text, config),
        SuffixPlacement::BelowSingleLine => strip_below_single_line(text, config),
        SuffixPlacement::BelowMultiLine => strip_below_multi_line(text, config),
    }
}

fn wrap(config: &SuffixConfig, part: &str) -> String {
    match &config.brackets {
        Some(pair) => format!("{}{}{}", pair.open, part, pair.close),
        None => part.to_string(),
    }
}

/// Remove the brackets around a suffix part, if configured.
fn unwrap_part<'a>(part: &'a str, config: &SuffixConfig) -> Option<&'a str> {
    match &config.brackets {
        Some(pair) => part
            .strip_prefix(pair.open.as_str())?
            .strip_suffix(pair.close.as_str()),
        None => Some(part),
    }
}

fn is_timestamp_part(part: &str, config: &SuffixConfig) -> bool {
    unwrap_part(part, config)
        .map(|inner| NaiveDateTime::parse_from_str(inner, TIMESTAMP_FORMAT).is_ok())
        .unwrap_or(false)
}

fn strip_adjacent(text: &str, config: &SuffixConfig) -> String {
    let mut rest = text;
    if config.timestamp {
        match strip_trailing_timestamp(rest, config) {
            Some(r) => rest = r,
            None => return text.to_string(),
        }
    }
    if let Some(fixed) = &config.fixed_text {
        let expected = format!(" {}", wrap(config, fixed));
        match rest.strip_suffix(expected.as_str()) {
            Some(r) => rest = r,
            None => return text.to_string(),
        }
    }
    rest.to_string()
}

/// Remove a `" " + wrapped timestamp` tail, returning the remainder.
fn strip_trailing_timestamp<'a>(text: &'a str, config: &SuffixConfig) -> Option<&'a str> {
    let (open_len, close_len) = match &config.brackets {
        Some(pair) => (pair.open.len(), pair.close.len()),
        None => (0, 0),
    };
    let tail_len = 1 + open_len + TIMESTAMP_LEN + close_len;
    if text.len() < tail_len || !text.is_char_boundary(text.len() - tail_len) {
        return None;
    }
    let (rest, tail) = text.split_at(text.len() - tail_len);
    let part = tail.strip_prefix(' ')?;
    if is_timestamp_part(part, config) {
        Some(rest)
    } else {
        None
    }
}

fn strip_below_single_line(text: &str, config: &SuffixConfig) -> String {
    let Some(newline) = text.rfind('\n') else {
        return text.to_string();
    };
    let mut line = &text[newline + 1..];

    if let Some(fixed) = &config.fixed_text {
        let expected = wrap(config, fixed);
        match line.strip_prefix(expected.as_str()) {
            Some(r) => line = r,
            None => return text.to_string(),
        }
        if config.timestamp {
            match line.strip_prefix(' ') {
                Some(r) => line = r,
                None => return text.to_string(),
            }
        }
    }
    if config.timestamp {
        if !is_timestamp_part(line, config) {
            return text.to_string();
        }
        line = "";
    }

    if line.is_empty() {
        text[..newline].to_string()
    } else {
        text.to_string()
    }
}

fn strip_below_multi_line(text: &str, config: &SuffixConfig) -> String {
    let mut rest = text;
    if config.timestamp {
        let Some(newline) = rest.rfind('\n') else {
            return text.to_string();
        };
        if !is_timestamp_part(&rest[newline + 1..], config) {
            return text.to_string();
        }
        rest = &rest[..newline];
    }
    if let Some(fixed) = &config.fixed_text {
        let expected = format!("\n{}", wrap(config, fixed));
        match rest.strip_suffix(expected.as_str()) {
            Some(r) => rest = r,
            None => return text.to_string(),
        }
    }
    rest.to_string()
}
