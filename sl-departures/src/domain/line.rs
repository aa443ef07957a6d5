//! Line identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A line designation such as `"17"`, `"4"` or `"Spårväg City"`.
///
/// Upstream sends lines as strings, but configuration files commonly
/// write them as bare numbers, so both forms are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineId {
    Number(i64),
    Text(String),
}

impl LineId {
    /// Whether two line ids designate the same line.
    ///
    /// Text is compared case-insensitively. A number never matches text,
    /// even when the text spells the same number.
    pub fn matches(&self, other: &LineId) -> bool {
        match (self, other) {
            (LineId::Text(a), LineId::Text(b)) => a.to_uppercase() == b.to_uppercase(),
            (LineId::Number(a), LineId::Number(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for LineId {
    fn from(s: &str) -> Self {
        LineId::Text(s.to_string())
    }
}

impl From<i64> for LineId {
    fn from(n: i64) -> Self {
        LineId::Number(n)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineId::Number(n) => write!(f, "{n}"),
            LineId::Text(s) => f.write_str(s),
        }
    }
}
