use logos::Logos;

/// Tokens produced by the diagram lexer.
///
/// Whitespace and block comments are skipped by logos. Line comments are
/// kept as [`Token::Comment`] so the parser can attach them to the next
/// construct. Keywords match ASCII case-insensitively.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum Token {
    // -- Top-level keywords --
    #[token("project", ignore(ascii_case))]
    Project,

    #[token("table", ignore(ascii_case))]
    Table,

    #[token("area", ignore(ascii_case))]
    Area,

    #[token("ref", ignore(ascii_case))]
    Ref,

    // -- Block keywords --
    #[token("note", ignore(ascii_case))]
    Note,

    #[token("indexes", ignore(ascii_case))]
    Indexes,

    #[token("commoncolumns", ignore(ascii_case))]
    #[token("common_columns", ignore(ascii_case))]
    CommonColumns,

    // -- Constraint keywords --
    #[token("pk", ignore(ascii_case))]
    Pk,

    #[token("fk", ignore(ascii_case))]
    Fk,

    #[token("unique", ignore(ascii_case))]
    Unique,

    #[token("not", ignore(ascii_case))]
    Not,

    #[token("null", ignore(ascii_case))]
    Null,

    #[token("increment", ignore(ascii_case))]
    Increment,

    #[token("default", ignore(ascii_case))]
    Default,

    // -- Punctuation --
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    // -- Relationship operators --
    #[token(">")]
    Greater,

    #[token("<")]
    Less,

    #[token("<>")]
    LessGreater,

    #[token("-")]
    Minus,

    #[token("~")]
    Tilde,

    // -- Literals --
    /// A double-quoted string, e.g. `"hello"`.
    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleString,

    /// A single-quoted string, e.g. `'hello'`.
    #[regex(r"'([^'\\]|\\.)*'")]
    SingleString,

    /// A backtick string holding a function or expression, e.g. `` `now()` ``.
    #[regex(r"`([^`\\]|\\.)*`")]
    BacktickString,

    /// A number, optionally negative and optionally decimal.
    #[regex(r"-?[0-9]+", priority = 2)]
    #[regex(r"-?[0-9]+\.[0-9]+", priority = 3)]
    Number,

    /// `#` followed by a run of word characters. The lexer rejects runs
    /// that are not exactly 3 or 6 hex digits.
    #[regex(r"#[0-9A-Za-z_]*")]
    Color,

    /// A line comment, `//` up to the end of the line.
    #[regex(r"//[^\n]*")]
    Comment,

    // -- Identifiers --
    /// Letters, digits and underscores, plus the Hiragana, Katakana, CJK
    /// Unified Ideographs and Hangul Syllables blocks. The Katakana block
    /// includes the prolonged sound mark `ー`. Cannot start with a digit.
    #[regex(r"[A-Za-z_\u{3040}-\u{309F}\u{30A0}-\u{30FF}\u{4E00}-\u{9FFF}\u{AC00}-\u{D7AF}][A-Za-z0-9_\u{3040}-\u{309F}\u{30A0}-\u{30FF}\u{4E00}-\u{9FFF}\u{AC00}-\u{D7AF}]*")]
    Ident,

    /// End of input. Appended by the lexer, never matched.
    Eof,
}

impl Token {
    /// Returns a human-readable description of this token kind.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Project => "'Project'",
            Self::Table => "'Table'",
            Self::Area => "'Area'",
            Self::Ref => "'Ref'",
            Self::Note => "'Note'",
            Self::Indexes => "'indexes'",
            Self::CommonColumns => "'CommonColumns'",
            Self::Pk => "'pk'",
            Self::Fk => "'fk'",
            Self::Unique => "'unique'",
            Self::Not => "'not'",
            Self::Null => "'null'",
            Self::Increment => "'increment'",
            Self::Default => "'default'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::Dot => "'.'",
            Self::Greater => "'>'",
            Self::Less => "'<'",
            Self::LessGreater => "'<>'",
            Self::Minus => "'-'",
            Self::Tilde => "'~'",
            Self::DoubleString => "string literal",
            Self::SingleString => "string literal",
            Self::BacktickString => "expression literal",
            Self::Number => "number",
            Self::Color => "color literal",
            Self::Comment => "comment",
            Self::Ident => "identifier",
            Self::Eof => "end of input",
        }
    }

    /// Keywords that start a top-level construct. The parser never treats
    /// these as names unless they are followed by `:`.
    pub fn is_top_level_keyword(&self) -> bool {
        matches!(self, Self::Project | Self::Table | Self::Area | Self::Ref)
    }

    /// Tokens usable wherever a table, column or area name is expected.
    pub fn is_name(&self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::DoubleString
                | Self::SingleString
                | Self::Note
                | Self::Indexes
                | Self::CommonColumns
                | Self::Pk
                | Self::Fk
                | Self::Unique
                | Self::Not
                | Self::Null
                | Self::Increment
                | Self::Default
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self,
            Self::DoubleString | Self::SingleString | Self::BacktickString
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
