// 🧹 Name Normalizer - raw CSV text -> SQL-safe literals and short codes
//
// Every text value that reaches the emitter is a `SqlText`. Public
// constructors escape single quotes; text cut from an existing `SqlText`
// goes back in through `from_escaped` and is never escaped twice.

use serde::Serialize;
use std::fmt;

/// Right-padding character for derived codes
pub const CODE_FILLER: char = 'X';

/// Length of codes derived from constituency names (`"Kafue"` -> `KAFU`)
pub const NAME_CODE_LENGTH: usize = 4;

// ============================================================================
// SQL TEXT
// ============================================================================

/// Quote-escaped, trimmed text ready to sit between `'...'` in a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SqlText(String);

impl SqlText {
    /// Escape single quotes by doubling them, then trim surrounding whitespace
    pub fn escape(raw: &str) -> Self {
        SqlText(raw.replace('\'', "''").trim().to_string())
    }

    /// Wrap text already escaped, e.g. words re-joined from other `SqlText`s
    pub(crate) fn from_escaped(escaped: String) -> Self {
        SqlText(escaped.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SqlText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// CLEANING
// ============================================================================

/// What an empty source value turns into.
///
/// Attribute fields (names, MP, party) become `TBD`; structural fields (codes,
/// parent references) stay empty so the caller can tell they were missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Tbd,
    Empty,
}

impl Placeholder {
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Tbd => "TBD",
            Placeholder::Empty => "",
        }
    }
}

/// Clean a raw field for SQL insertion.
///
/// Order: empty/whitespace-only -> placeholder, escape quotes, trim.
pub fn clean(raw: Option<&str>, placeholder: Placeholder) -> SqlText {
    match raw {
        Some(value) if !value.trim().is_empty() => SqlText::escape(value),
        _ => SqlText::escape(placeholder.token()),
    }
}

/// Left-pad a numeric source code with zeros (`"5"` -> `"005"`).
pub fn zero_pad(code: &str, width: usize) -> String {
    format!("{:0>width$}", code.trim(), width = width)
}

// ============================================================================
// CODE DERIVATION
// ============================================================================

/// Derive a fixed-length alphabetic code from a free-text name.
///
/// Only ASCII letters survive (punctuation and digits are dropped, so
/// `"Kapiri-Mposhi"` is one word). A single word contributes its first
/// `target_length` letters; otherwise the first two words contribute
/// `target_length / 2` letters each. Short results are padded with `X`.
///
/// ```
/// use geo_seed::normalize::derive_code_from_name;
///
/// assert_eq!(derive_code_from_name("Kafue", 4), "KAFU");
/// assert_eq!(derive_code_from_name("Kabwe Central", 4), "KACE");
/// ```
pub fn derive_code_from_name(name: &str, target_length: usize) -> String {
    let letters: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    let words: Vec<&str> = letters.split_whitespace().collect();

    let mut code: String = match words.as_slice() {
        [] => String::new(),
        [only] => only.chars().take(target_length).collect(),
        [first, second, ..] => {
            let prefix = (target_length / 2).max(1);
            first
                .chars()
                .take(prefix)
                .chain(second.chars().take(prefix))
                .collect()
        }
    };

    code.truncate(target_length);
    while code.len() < target_length {
        code.push(CODE_FILLER);
    }
    code
}
