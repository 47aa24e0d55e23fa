use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A validated hex color, `#RGB` or `#RRGGBB`. The original spelling and
/// case are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Creates a new `Color`, validating the hex digit count.
    pub fn new(s: impl Into<String>) -> Result<Self, ModelError> {
        let s = s.into();
        if !is_hex_color(&s) {
            return Err(ModelError::InvalidColor(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Color {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> String {
        c.0
    }
}

impl TryFrom<String> for Color {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_colors() {
        for s in ["#fff", "#FFF", "#a1b2c3", "#000000"] {
            assert!(Color::new(s).is_ok(), "expected {s} to be valid");
        }
    }

    #[test]
    fn invalid_colors() {
        for s in ["fff", "#ff", "#ffff", "#fffffff", "#ggg", "#", ""] {
            assert!(
                matches!(Color::new(s), Err(ModelError::InvalidColor(_))),
                "expected {s} to be invalid"
            );
        }
    }

    #[test]
    fn serde_rejects_invalid() {
        let result: Result<Color, _> = serde_json::from_str("\"#12\"");
        assert!(result.is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let c = Color::new("#abc").unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#abc\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
