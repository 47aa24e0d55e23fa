use std::fmt;

/// Errors that occur when constructing or validating model values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    /// Color string is not `#RGB` or `#RRGGBB`.
    InvalidColor(String),
    /// Horizontal label alignment is not `left`, `center` or `right`.
    InvalidLabelHorizontal(String),
    /// Vertical label alignment is not `top`, `center` or `bottom`.
    InvalidLabelVertical(String),
    /// Relationship symbol is not one of `>`, `<`, `-`, `<>`, `~`.
    InvalidRelationshipSymbol(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColor(s) => {
                write!(f, "invalid color '{s}': must be #RGB or #RRGGBB")
            }
            Self::InvalidLabelHorizontal(s) => {
                write!(
                    f,
                    "invalid horizontal label alignment '{s}': must be left, center or right"
                )
            }
            Self::InvalidLabelVertical(s) => {
                write!(
                    f,
                    "invalid vertical label alignment '{s}': must be top, center or bottom"
                )
            }
            Self::InvalidRelationshipSymbol(s) => {
                write!(
                    f,
                    "invalid relationship symbol '{s}': must be one of >, <, -, <>, ~"
                )
            }
        }
    }
}

impl std::error::Error for ModelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let cases = vec![
            (ModelError::InvalidColor("#12".into()), "invalid color '#12'"),
            (
                ModelError::InvalidLabelHorizontal("middle".into()),
                "invalid horizontal label alignment 'middle'",
            ),
            (
                ModelError::InvalidLabelVertical("up".into()),
                "invalid vertical label alignment 'up'",
            ),
            (
                ModelError::InvalidRelationshipSymbol("=>".into()),
                "invalid relationship symbol '=>'",
            ),
        ];

        for (error, expected_prefix) in cases {
            let msg = error.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error display for {error:?} = '{msg}', expected to start with '{expected_prefix}'"
            );
        }
    }

    #[test]
    fn error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ModelError::InvalidColor("x".into()));
        assert!(err.to_string().contains("invalid color"));
    }
}
