use std::fmt;

/// A location in the source text.
///
/// `line` and `column` are 1-indexed; `column` counts characters, not
/// bytes. `offset` is the 0-indexed byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A source range from `start` (inclusive) to `end` (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width span at `position`.
    pub fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end)
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}..{}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// Errors that stop processing of a document.
///
/// The tokenizer produces every variant except `InputTooLarge`, which is
/// checked before tokenizing. Each lexical variant carries a short excerpt
/// of the source starting at the offending position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DslError {
    /// A quoted string runs to the end of the input.
    UnterminatedString {
        quote: char,
        position: Position,
        context: String,
    },

    /// A character that starts no token.
    UnexpectedCharacter {
        character: char,
        position: Position,
        context: String,
    },

    /// A `#` literal that is not exactly 3 or 6 hex digits.
    InvalidColor {
        text: String,
        position: Position,
        context: String,
    },

    /// The document exceeds the configured size limit.
    InputTooLarge { size: usize, limit: usize },
}

impl DslError {
    /// Source position of the error, if it has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::UnterminatedString { position, .. }
            | Self::UnexpectedCharacter { position, .. }
            | Self::InvalidColor { position, .. } => Some(*position),
            Self::InputTooLarge { .. } => None,
        }
    }
}

impl fmt::Display for DslError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString {
                quote,
                position,
                context,
            } => write!(
                f,
                "{position}: unterminated string starting with {quote} near `{context}`"
            ),
            Self::UnexpectedCharacter {
                character,
                position,
                context,
            } => write!(
                f,
                "{position}: unexpected character '{character}' near `{context}`"
            ),
            Self::InvalidColor {
                text,
                position,
                context,
            } => write!(
                f,
                "{position}: invalid color '{text}': expected #RGB or #RRGGBB near `{context}`"
            ),
            Self::InputTooLarge { size, limit } => write!(
                f,
                "input is {size} bytes, exceeding the limit of {limit} bytes"
            ),
        }
    }
}

impl std::error::Error for DslError {}

/// A recoverable problem found while parsing.
///
/// The parser records one of these and resynchronizes instead of failing,
/// so a document can yield a partial diagram plus a list of diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseDiagnostic {
    /// The parser found a token it cannot use here.
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    /// The input ended while a construct was incomplete.
    UnexpectedEndOfInput { expected: String, span: Span },

    /// A block was still open when the input ended or another top-level
    /// construct began. `span` covers the block's opening line.
    UnclosedBlock {
        construct: String,
        name: String,
        span: Span,
    },

    /// A recognized setting had a value it cannot accept. The setting is
    /// ignored.
    InvalidSettingValue {
        key: String,
        value: String,
        reason: String,
        span: Span,
    },
}

impl ParseDiagnostic {
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEndOfInput { span, .. }
            | Self::UnclosedBlock { span, .. }
            | Self::InvalidSettingValue { span, .. } => *span,
        }
    }

    pub fn position(&self) -> Position {
        self.span().start
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = self.position();
        match self {
            Self::UnexpectedToken {
                expected, found, ..
            } => write!(
                f,
                "{position}: unexpected token: expected {expected}, found {found}"
            ),
            Self::UnexpectedEndOfInput { expected, .. } => {
                write!(f, "{position}: unexpected end of input: expected {expected}")
            }
            Self::UnclosedBlock {
                construct, name, ..
            } => write!(f, "{position}: {construct} '{name}' is missing its closing '}}'"),
            Self::InvalidSettingValue {
                key, value, reason, ..
            } => write!(f, "{position}: invalid value '{value}' for {key}: {reason}"),
        }
    }
}

impl std::error::Error for ParseDiagnostic {}
