use diagram_forge_dsl::{DslError, ParseDiagnostic, Position, Span};
use miette::{Diagnostic, NamedSource, SourceSpan};

/// A parse problem prepared for rich miette rendering.
///
/// The module-level `#[allow(unused_assignments)]` in main.rs is required
/// because miette's derive macro generates assignment patterns that rustc
/// flags as unused.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct DiagramDiagnostic {
    #[source_code]
    src: NamedSource<String>,

    #[label("{label}")]
    span: SourceSpan,

    message: String,
    label: String,

    #[help]
    suggestion: Option<String>,
}

fn source_span(span: Span, source: &str) -> SourceSpan {
    let start = span.start.offset.min(source.len());
    (start, span.len().min(source.len() - start)).into()
}

/// Highlights the character at `position`, or nothing at end of input.
fn point_span(position: Position, source: &str) -> SourceSpan {
    let start = position.offset.min(source.len());
    let len = source[start..].chars().next().map_or(0, char::len_utf8);
    (start, len).into()
}

/// Convert a recovered `ParseDiagnostic` into a `DiagramDiagnostic`.
pub fn parse_diagnostic_to_diagnostic(
    diagnostic: &ParseDiagnostic,
    source: &str,
    filename: &str,
) -> DiagramDiagnostic {
    let src = NamedSource::new(filename, source.to_string());
    let span = source_span(diagnostic.span(), source);

    match diagnostic {
        ParseDiagnostic::UnexpectedToken {
            expected, found, ..
        } => DiagramDiagnostic {
            src,
            span,
            message: format!("unexpected token: expected {expected}, found {found}"),
            label: format!("expected {expected}"),
            suggestion: Some("This construct was skipped; the rest of the file was kept.".into()),
        },

        ParseDiagnostic::UnexpectedEndOfInput { expected, .. } => DiagramDiagnostic {
            src,
            span,
            message: format!("unexpected end of input: expected {expected}"),
            label: "input ended here".to_string(),
            suggestion: Some(format!("Add {expected} to complete the definition.")),
        },

        ParseDiagnostic::UnclosedBlock {
            construct, name, ..
        } => DiagramDiagnostic {
            src,
            span,
            message: format!("{construct} '{name}' is missing its closing '}}'"),
            label: "block opened here".to_string(),
            suggestion: Some("Close the block with '}' before the next declaration.".into()),
        },

        ParseDiagnostic::InvalidSettingValue {
            key, value, reason, ..
        } => DiagramDiagnostic {
            src,
            span,
            message: format!("invalid value '{value}' for {key}"),
            label: reason.clone(),
            suggestion: Some(format!("The {key} setting was ignored.")),
        },

        _ => DiagramDiagnostic {
            src,
            span,
            message: diagnostic.to_string(),
            label: "here".to_string(),
            suggestion: None,
        },
    }
}

/// Convert a fatal `DslError` into a `DiagramDiagnostic`.
pub fn dsl_error_to_diagnostic(error: &DslError, source: &str, filename: &str) -> DiagramDiagnostic {
    let src = NamedSource::new(filename, source.to_string());

    match error {
        DslError::UnterminatedString {
            quote, position, ..
        } => DiagramDiagnostic {
            src,
            span: point_span(*position, source),
            message: format!("unterminated string starting with {quote}"),
            label: "string starts here".to_string(),
            suggestion: Some(format!("Add a closing {quote}.")),
        },

        DslError::UnexpectedCharacter {
            character,
            position,
            ..
        } => DiagramDiagnostic {
            src,
            span: point_span(*position, source),
            message: format!("unexpected character '{character}'"),
            label: "not part of any token".to_string(),
            suggestion: Some("Quote the name if it contains special characters.".into()),
        },

        DslError::InvalidColor { text, position, .. } => DiagramDiagnostic {
            src,
            span: source_span(
                Span::new(
                    *position,
                    Position::new(
                        position.line,
                        position.column + text.chars().count(),
                        position.offset + text.len(),
                    ),
                ),
                source,
            ),
            message: format!("invalid color '{text}'"),
            label: "expected #RGB or #RRGGBB".to_string(),
            suggestion: None,
        },

        _ => DiagramDiagnostic {
            src,
            span: (0, 0).into(),
            message: error.to_string(),
            label: "error".to_string(),
            suggestion: None,
        },
    }
}

/// Render every recovered diagnostic for a file using miette.
pub fn render_diagnostics(
    diagnostics: &[ParseDiagnostic],
    source: &str,
    filename: &str,
) -> Vec<miette::Report> {
    diagnostics
        .iter()
        .map(|d| miette::Report::new(parse_diagnostic_to_diagnostic(d, source, filename)))
        .collect()
}
