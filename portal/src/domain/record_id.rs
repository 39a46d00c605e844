//! Identifier of a backend record.
//!
//! The bookkeeping backend emits integer ids, but nothing in the portal does
//! arithmetic on them, so string ids decode too and both render unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer or string identifier, rendered as the backend sent it.
///
/// # Examples
/// ```
/// use portal::domain::RecordId;
///
/// let id: RecordId = serde_json::from_str("42").expect("integer id");
/// assert_eq!(id.to_string(), "42");
/// let id: RecordId = serde_json::from_str("\"c-7\"").expect("string id");
/// assert_eq!(id.to_string(), "c-7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric primary key.
    Number(i64),
    /// Opaque string key.
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => value.fmt(f),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        value
            .parse::<i64>()
            .map_or_else(|_| Self::Text(value.to_owned()), Self::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("17", RecordId::Number(17))]
    #[case("abc", RecordId::Text("abc".to_owned()))]
    fn path_segments_prefer_numbers(#[case] raw: &str, #[case] expected: RecordId) {
        assert_eq!(RecordId::from(raw), expected);
    }

    #[rstest]
    fn numeric_and_textual_forms_compare_by_variant() {
        assert_ne!(RecordId::from(5), RecordId::Text("5".to_owned()));
    }
}
