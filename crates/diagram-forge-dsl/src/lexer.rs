use logos::Logos;

use crate::error::{DslError, Position, Span};
use crate::token::Token;

/// Number of characters of source shown in lexical error messages.
const CONTEXT_CHARS: usize = 20;

/// A token paired with its source span and text.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    pub text: String,
}

/// Byte offsets of line starts, for offset to line/column conversion.
struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    fn position(&self, offset: usize) -> Position {
        let line = self.starts.partition_point(|&start| start <= offset);
        let line_start = self.starts[line.saturating_sub(1)];
        let column = self.source[line_start..offset].chars().count() + 1;
        Position::new(line, column, offset)
    }

    fn span(&self, range: std::ops::Range<usize>) -> Span {
        Span::new(self.position(range.start), self.position(range.end))
    }
}

/// Tokenizes diagram source into spanned tokens.
///
/// Line comments are kept as [`Token::Comment`]; whitespace and block
/// comments are dropped. The result always ends with a single
/// [`Token::Eof`] positioned at the end of the input.
///
/// # Errors
///
/// Stops at the first unterminated string, unexpected character, or
/// malformed color literal.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, DslError> {
    let lines = LineIndex::new(source);
    let mut tokens = Vec::new();

    for (result, range) in Token::lexer(source).spanned() {
        let text = &source[range.clone()];
        match result {
            Ok(Token::Color) if !is_hex_color(text) => {
                return Err(DslError::InvalidColor {
                    text: text.to_string(),
                    position: lines.position(range.start),
                    context: excerpt(source, range.start),
                });
            }
            Ok(token) => tokens.push(SpannedToken {
                token,
                span: lines.span(range.clone()),
                text: text.to_string(),
            }),
            Err(()) => return Err(lexical_error(source, &lines, range.start)),
        }
    }

    tokens.push(SpannedToken {
        token: Token::Eof,
        span: Span::point(lines.position(source.len())),
        text: String::new(),
    });
    tracing::trace!(count = tokens.len(), "tokenized");
    Ok(tokens)
}

fn lexical_error(source: &str, lines: &LineIndex<'_>, offset: usize) -> DslError {
    let position = lines.position(offset);
    let context = excerpt(source, offset);
    match source[offset..].chars().next() {
        Some(quote @ ('"' | '\'' | '`')) => DslError::UnterminatedString {
            quote,
            position,
            context,
        },
        Some(character) => DslError::UnexpectedCharacter {
            character,
            position,
            context,
        },
        None => DslError::UnexpectedCharacter {
            character: '\0',
            position,
            context,
        },
    }
}

fn excerpt(source: &str, offset: usize) -> String {
    source[offset..]
        .chars()
        .take_while(|&c| c != '\n')
        .take(CONTEXT_CHARS)
        .collect()
}

fn is_hex_color(text: &str) -> bool {
    text.strip_prefix('#').is_some_and(|digits| {
        matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
    })
}
