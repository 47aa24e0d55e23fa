use diagram_forge_core::types::{Color, LabelHorizontal, LabelVertical, RelationshipKind};

use crate::ast::{
    AreaNode, ColumnConstraints, ColumnNode, DefaultKind, DefaultValue, Endpoint, IndexNode,
    Program, ProjectNode, RefNode, TableNode,
};
use crate::error::{ParseDiagnostic, Span};
use crate::lexer::SpannedToken;
use crate::token::Token;

/// A parsed document: every construct that parsed cleanly, plus the
/// problems the parser recovered from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedProgram {
    pub program: Program,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Parses a token stream produced by [`tokenize`](crate::lexer::tokenize).
///
/// Never fails. When a construct cannot be parsed the parser records a
/// diagnostic, skips ahead to the next `}` or top-level keyword, and
/// continues. Line comments are attached to the next construct or column
/// that parses successfully.
pub fn parse_tokens(tokens: &[SpannedToken]) -> ParsedProgram {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    tracing::debug!(
        tables = program.tables.len(),
        refs = program.refs.len(),
        areas = program.areas.len(),
        diagnostics = parser.diagnostics.len(),
        "parsed document"
    );
    ParsedProgram {
        program,
        diagnostics: parser.diagnostics,
    }
}

/// A top-level construct before it is filed into the [`Program`].
enum Item {
    Project(ProjectNode),
    Table(TableNode),
    Ref(RefNode),
    Area(AreaNode),
}

/// A setting key as written, plus its lookup form: lowercase with
/// underscores removed, so `pos_x`, `posX` and `POSX` all match `posx`.
struct SettingKey {
    text: String,
    normalized: String,
}

impl SettingKey {
    fn new(text: String) -> Self {
        let normalized = text
            .chars()
            .filter(|&c| c != '_')
            .collect::<String>()
            .to_lowercase();
        Self { text, normalized }
    }
}

/// Recursive descent parser over a borrowed token slice.
struct Parser<'t> {
    tokens: &'t [SpannedToken],
    pos: usize,
    /// Comments seen since the last construct took them.
    pending_comments: Vec<String>,
    diagnostics: Vec<ParseDiagnostic>,
    /// Span of the most recently consumed token.
    last_span: Span,
    /// Returned once the cursor runs past the slice.
    eof: SpannedToken,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [SpannedToken]) -> Self {
        let end = tokens.last().map(|st| st.span.end).unwrap_or_default();
        Self {
            tokens,
            pos: 0,
            pending_comments: Vec::new(),
            diagnostics: Vec::new(),
            last_span: Span::default(),
            eof: SpannedToken {
                token: Token::Eof,
                span: Span::point(end),
                text: String::new(),
            },
        }
    }

    // -- Cursor helpers --

    /// Moves any comment tokens at the cursor into the pending buffer.
    fn collect_comments(&mut self) {
        while let Some(st) = self.tokens.get(self.pos) {
            if st.token != Token::Comment {
                break;
            }
            self.pending_comments.push(comment_text(&st.text));
            self.pos += 1;
        }
    }

    fn current(&mut self) -> &SpannedToken {
        self.collect_comments();
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn peek(&mut self) -> Token {
        self.current().token
    }

    /// The `n`th significant token after the current one, skipping
    /// comments without collecting them.
    fn peek_nth(&self, n: usize) -> Token {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .filter(|st| st.token != Token::Comment)
            .nth(n)
            .map_or(Token::Eof, |st| st.token)
    }

    /// True if the current token is an identifier spelled `word`, ignoring
    /// ASCII case.
    fn peek_is_word(&mut self, word: &str) -> bool {
        let st = self.current();
        st.token == Token::Ident && st.text.eq_ignore_ascii_case(word)
    }

    fn advance(&mut self) -> SpannedToken {
        let st = self.current().clone();
        if st.token != Token::Eof {
            self.pos += 1;
        }
        self.last_span = st.span;
        st
    }

    fn at(&mut self, token: Token) -> bool {
        self.peek() == token
    }

    fn eat(&mut self, token: Token) -> Option<SpannedToken> {
        if self.at(token) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consumes the current token if it is `token`. Leaves the cursor in
    /// place otherwise, so recovery can see what was there.
    fn expect(&mut self, token: Token) -> Result<SpannedToken, ParseDiagnostic> {
        if self.at(token) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(token.description()))
        }
    }

    fn current_span(&mut self) -> Span {
        self.current().span
    }

    fn unexpected(&mut self, expected: &str) -> ParseDiagnostic {
        let st = self.current();
        if st.token == Token::Eof {
            ParseDiagnostic::UnexpectedEndOfInput {
                expected: expected.to_string(),
                span: st.span,
            }
        } else {
            ParseDiagnostic::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("{} ('{}')", st.token.description(), st.text),
                span: st.span,
            }
        }
    }

    fn take_comments(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_comments)
    }

    /// Puts comments taken by a failed construct back in front of any
    /// collected since.
    fn restore_comments(&mut self, mut comments: Vec<String>) {
        comments.append(&mut self.pending_comments);
        self.pending_comments = comments;
    }

    fn report(&mut self, diagnostic: ParseDiagnostic) {
        tracing::debug!(%diagnostic, "recovering from parse error");
        self.diagnostics.push(diagnostic);
    }

    fn invalid_value(&mut self, key: &SettingKey, value: &SpannedToken, reason: &str) {
        self.report(ParseDiagnostic::InvalidSettingValue {
            key: key.text.clone(),
            value: value.text.clone(),
            reason: reason.to_string(),
            span: value.span,
        });
    }

    // -- Grammar productions --

    /// program = (project | table | ref | area)*
    fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        loop {
            let token = self.peek();
            if token == Token::Eof {
                break;
            }
            let comments = self.take_comments();
            let item = match token {
                Token::Project => self.parse_project().map(Item::Project),
                Token::Table => self.parse_table().map(Item::Table),
                Token::Ref => self.parse_ref().map(Item::Ref),
                Token::Area => self.parse_area().map(Item::Area),
                _ => Err(self.unexpected("'Project', 'Table', 'Ref' or 'Area'")),
            };
            match item {
                Ok(item) => file_item(&mut program, item, comments),
                Err(diagnostic) => {
                    self.restore_comments(comments);
                    self.report(diagnostic);
                    self.synchronize();
                }
            }
        }

        if !self.pending_comments.is_empty() {
            tracing::trace!(
                count = self.pending_comments.len(),
                "dropping trailing comments"
            );
        }
        program
    }

    /// Skips to just past the next `}`, or to the next top-level keyword,
    /// whichever comes first.
    fn synchronize(&mut self) {
        loop {
            match self.peek() {
                Token::Eof => return,
                Token::RBrace => {
                    self.advance();
                    return;
                }
                token if token.is_top_level_keyword() => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Checks the next token of a block body. Consumes the closing `}` and
    /// returns `None`; reports an unclosed block at end of input or at a
    /// top-level keyword; otherwise returns the token without consuming it.
    fn block_entry(
        &mut self,
        construct: &str,
        name: &str,
        open: Span,
    ) -> Result<Option<Token>, ParseDiagnostic> {
        match self.peek() {
            Token::RBrace => {
                self.advance();
                Ok(None)
            }
            token if token == Token::Eof || token.is_top_level_keyword() => {
                Err(ParseDiagnostic::UnclosedBlock {
                    construct: construct.to_string(),
                    name: name.to_string(),
                    span: open,
                })
            }
            token => Ok(Some(token)),
        }
    }

    /// project = "Project" name settings? ("{" (key ":" value | note)* "}")?
    fn parse_project(&mut self) -> Result<ProjectNode, ParseDiagnostic> {
        let start = self.expect(Token::Project)?.span;
        let (name, _) = self.expect_name("project name")?;
        let mut node = ProjectNode {
            name,
            ..ProjectNode::default()
        };

        if self.at(Token::LBracket) {
            self.parse_settings(|p, key| p.apply_project_setting(&mut node, key))?;
        }

        if self.at(Token::LBrace) {
            let open = start.to(self.advance().span);
            let name = node.name.clone();
            while let Some(token) = self.block_entry("project", &name, open)? {
                match token {
                    Token::Note if self.note_follows() => node.note = Some(self.parse_note()?),
                    token if token.is_name() && self.peek_nth(1) == Token::Colon => {
                        let key = self.setting_key()?;
                        if !self.apply_project_setting(&mut node, &key)? {
                            self.skip_body_value();
                        }
                    }
                    _ => {
                        self.advance();
                    }
                }
            }
        }

        node.span = start.to(self.last_span);
        Ok(node)
    }

    fn apply_project_setting(
        &mut self,
        node: &mut ProjectNode,
        key: &SettingKey,
    ) -> Result<bool, ParseDiagnostic> {
        match key.normalized.as_str() {
            "databasetype" => node.database_type = Some(self.setting_text()?),
            "note" => node.note = Some(self.setting_string()?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// table = "Table" name ("as" name)? settings? "{" table_body "}"
    fn parse_table(&mut self) -> Result<TableNode, ParseDiagnostic> {
        let start = self.expect(Token::Table)?.span;
        let (name, _) = self.expect_name("table name")?;
        let mut node = TableNode {
            name,
            ..TableNode::default()
        };

        if self.peek_is_word("as") {
            self.advance();
            node.alias = Some(self.expect_name("table alias")?.0);
        }

        if self.at(Token::LBracket) {
            self.parse_settings(|p, key| p.apply_table_setting(&mut node, key))?;
        }

        let open = start.to(self.expect(Token::LBrace)?.span);
        let name = node.name.clone();
        while let Some(token) = self.block_entry("table", &name, open)? {
            match token {
                Token::Note if self.note_follows() => node.note = Some(self.parse_note()?),
                Token::Indexes if self.peek_nth(1) == Token::LBrace => {
                    node.indexes.extend(self.parse_indexes()?);
                }
                token if token.is_name() => {
                    let comments = self.take_comments();
                    let mut column = match self.parse_column() {
                        Ok(column) => column,
                        Err(diagnostic) => {
                            self.restore_comments(comments);
                            return Err(diagnostic);
                        }
                    };
                    column.comments = comments;
                    node.columns.push(column);
                }
                _ => {
                    self.advance();
                }
            }
        }

        node.span = start.to(self.last_span);
        Ok(node)
    }

    fn apply_table_setting(
        &mut self,
        node: &mut TableNode,
        key: &SettingKey,
    ) -> Result<bool, ParseDiagnostic> {
        match key.normalized.as_str() {
            "alias" => node.alias = Some(self.setting_text()?),
            "posx" => {
                if let Some(x) = self.setting_number(key)? {
                    node.settings.pos_x = Some(x);
                }
            }
            "posy" => {
                if let Some(y) = self.setting_number(key)? {
                    node.settings.pos_y = Some(y);
                }
            }
            "color" | "headercolor" => {
                if let Some(color) = self.setting_color(key)? {
                    node.settings.color = Some(color);
                }
            }
            "note" => node.note = Some(self.setting_string()?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// column = name type ("(" raw ")")? settings?
    fn parse_column(&mut self) -> Result<ColumnNode, ParseDiagnostic> {
        let (name, start) = self.expect_name("column name")?;
        let (type_name, _) = self.expect_name("column type")?;

        let type_params = if self.at(Token::LParen) {
            Some(self.raw_parens()?)
        } else {
            None
        };

        let mut constraints = ColumnConstraints::default();
        if self.at(Token::LBracket) {
            self.parse_settings(|p, key| p.apply_column_setting(&mut constraints, key))?;
        }

        Ok(ColumnNode {
            name,
            type_name,
            type_params,
            constraints,
            span: start.to(self.last_span),
            comments: Vec::new(),
        })
    }

    fn apply_column_setting(
        &mut self,
        constraints: &mut ColumnConstraints,
        key: &SettingKey,
    ) -> Result<bool, ParseDiagnostic> {
        match key.normalized.as_str() {
            "pk" => constraints.pk = true,
            "primary" if self.peek_is_word("key") => {
                self.advance();
                constraints.pk = true;
            }
            "fk" => constraints.fk = true,
            "unique" => constraints.unique = true,
            "not" => {
                self.expect(Token::Null)?;
                constraints.not_null = true;
            }
            "null" => constraints.not_null = false,
            "increment" | "autoincrement" => constraints.increment = true,
            "default" => constraints.default = Some(self.setting_default()?),
            "alias" => constraints.alias = Some(self.setting_text()?),
            "note" => constraints.note = Some(self.setting_string()?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// default = ":" (string | expression | number | word ("(" raw ")")?)
    fn setting_default(&mut self) -> Result<DefaultValue, ParseDiagnostic> {
        self.expect(Token::Colon)?;
        let kind = match self.peek() {
            Token::DoubleString | Token::SingleString => DefaultKind::String,
            Token::BacktickString => DefaultKind::Expression,
            Token::Number | Token::Null | Token::Ident => DefaultKind::Literal,
            _ => return Err(self.unexpected("default value")),
        };
        let st = self.advance();

        if st.token == Token::Ident && self.at(Token::LParen) {
            let args = self.raw_parens()?;
            return Ok(DefaultValue {
                value: format!("{}({args})", st.text),
                kind: DefaultKind::Expression,
            });
        }

        Ok(DefaultValue {
            value: value_text(&st),
            kind,
        })
    }

    /// Collects the text between a pair of parentheses, consuming both.
    ///
    /// Tokens are joined with a single space, except that commas are
    /// written as `,` with no surrounding space.
    fn raw_parens(&mut self) -> Result<String, ParseDiagnostic> {
        self.expect(Token::LParen)?;
        let mut raw = String::new();
        let mut depth = 0usize;
        let mut previous: Option<Token> = None;

        loop {
            match self.peek() {
                Token::RParen if depth == 0 => {
                    self.advance();
                    return Ok(raw);
                }
                token if token == Token::Eof || token.is_top_level_keyword() => {
                    return Err(self.unexpected("')'"));
                }
                _ => {}
            }

            let st = self.advance();
            match st.token {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            if st.token != Token::Comma && previous.is_some_and(|p| p != Token::Comma) {
                raw.push(' ');
            }
            raw.push_str(&st.text);
            previous = Some(st.token);
        }
    }

    /// indexes = "indexes" "{" index* "}"
    fn parse_indexes(&mut self) -> Result<Vec<IndexNode>, ParseDiagnostic> {
        let start = self.expect(Token::Indexes)?.span;
        let open = start.to(self.expect(Token::LBrace)?.span);
        let mut indexes = Vec::new();

        while let Some(token) = self.block_entry("indexes", "indexes", open)? {
            if token == Token::LParen || token == Token::BacktickString || token.is_name() {
                indexes.push(self.parse_index()?);
            } else {
                self.advance();
            }
        }
        Ok(indexes)
    }

    /// index = (column | "(" column ("," column)* ")") settings?
    fn parse_index(&mut self) -> Result<IndexNode, ParseDiagnostic> {
        let start = self.current_span();
        let mut index = IndexNode::default();

        if self.eat(Token::LParen).is_some() {
            loop {
                index.columns.push(self.expect_index_column()?);
                if self.eat(Token::Comma).is_none() {
                    break;
                }
            }
            self.expect(Token::RParen)?;
        } else {
            index.columns.push(self.expect_index_column()?);
        }

        if self.at(Token::LBracket) {
            self.parse_settings(|p, key| p.apply_index_setting(&mut index, key))?;
        }

        index.span = start.to(self.last_span);
        Ok(index)
    }

    fn expect_index_column(&mut self) -> Result<String, ParseDiagnostic> {
        if self.at(Token::BacktickString) {
            return Ok(value_text(&self.advance()));
        }
        Ok(self.expect_name("index column")?.0)
    }

    fn apply_index_setting(
        &mut self,
        index: &mut IndexNode,
        key: &SettingKey,
    ) -> Result<bool, ParseDiagnostic> {
        match key.normalized.as_str() {
            "unique" => index.unique = true,
            "pk" => index.pk = true,
            "name" => index.name = Some(self.setting_text()?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// ref = "Ref" name? ":"? endpoint op endpoint settings?
    ///     | "Ref" name? "{" endpoint op endpoint settings? "}"
    fn parse_ref(&mut self) -> Result<RefNode, ParseDiagnostic> {
        let start = self.expect(Token::Ref)?.span;

        let name = if self.peek().is_name()
            && matches!(self.peek_nth(1), Token::Colon | Token::LBrace)
        {
            Some(self.expect_name("reference name")?.0)
        } else {
            None
        };
        self.eat(Token::Colon);
        let braced = self.eat(Token::LBrace).is_some();

        let from = self.parse_endpoint()?;
        let kind = self.parse_relationship()?;
        let to = self.parse_endpoint()?;
        let mut node = RefNode {
            name,
            from,
            to,
            kind,
            swap_edge: None,
            note: None,
            span: start,
            comments: Vec::new(),
        };

        if self.at(Token::LBracket) {
            self.parse_settings(|p, key| p.apply_ref_setting(&mut node, key))?;
        }
        if braced {
            self.expect(Token::RBrace)?;
        }

        node.span = start.to(self.last_span);
        Ok(node)
    }

    /// endpoint = name "." name
    fn parse_endpoint(&mut self) -> Result<Endpoint, ParseDiagnostic> {
        let (table, start) = self.expect_name("table name")?;
        self.expect(Token::Dot)?;
        let (column, end) = self.expect_name("column name")?;
        Ok(Endpoint {
            table,
            column,
            span: start.to(end),
        })
    }

    fn parse_relationship(&mut self) -> Result<RelationshipKind, ParseDiagnostic> {
        let kind = match self.peek() {
            Token::Greater => RelationshipKind::ManyToOne,
            Token::Less => RelationshipKind::OneToMany,
            Token::Minus => RelationshipKind::OneToOne,
            Token::LessGreater => RelationshipKind::ManyToMany,
            Token::Tilde => RelationshipKind::Inferred,
            _ => {
                return Err(
                    self.unexpected("relationship operator ('>', '<', '-', '<>' or '~')")
                );
            }
        };
        self.advance();
        Ok(kind)
    }

    fn apply_ref_setting(
        &mut self,
        node: &mut RefNode,
        key: &SettingKey,
    ) -> Result<bool, ParseDiagnostic> {
        match key.normalized.as_str() {
            "swapedge" => {
                if let Some(swap) = self.setting_bool(key)? {
                    node.swap_edge = Some(swap);
                }
            }
            "note" => node.note = Some(self.setting_string()?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// area = "Area" name settings? "{" area_body "}"
    ///
    /// The body holds member table names, `key: value` settings, a
    /// `CommonColumns` list and a note, in any order.
    fn parse_area(&mut self) -> Result<AreaNode, ParseDiagnostic> {
        let start = self.expect(Token::Area)?.span;
        let (name, _) = self.expect_name("area name")?;
        let mut node = AreaNode {
            name,
            ..AreaNode::default()
        };

        if self.at(Token::LBracket) {
            self.parse_settings(|p, key| p.apply_area_setting(&mut node, key))?;
        }

        let open = start.to(self.expect(Token::LBrace)?.span);
        let name = node.name.clone();
        while let Some(token) = self.block_entry("area", &name, open)? {
            match token {
                Token::Note if self.note_follows() => node.note = Some(self.parse_note()?),
                Token::CommonColumns => {
                    node.common_columns.extend(self.parse_common_columns()?);
                }
                token if token.is_name() && self.peek_nth(1) == Token::Colon => {
                    let key = self.setting_key()?;
                    if !self.apply_area_setting(&mut node, &key)? {
                        self.skip_body_value();
                    }
                }
                token if token.is_name() => {
                    node.tables.push(self.expect_name("table name")?.0);
                }
                _ => {
                    self.advance();
                }
            }
        }

        node.span = start.to(self.last_span);
        Ok(node)
    }

    fn apply_area_setting(
        &mut self,
        node: &mut AreaNode,
        key: &SettingKey,
    ) -> Result<bool, ParseDiagnostic> {
        let settings = &mut node.settings;
        match key.normalized.as_str() {
            "posx" | "posy" | "width" | "height" => {
                if let Some(value) = self.setting_number(key)? {
                    let slot = match key.normalized.as_str() {
                        "posx" => &mut settings.pos_x,
                        "posy" => &mut settings.pos_y,
                        "width" => &mut settings.width,
                        _ => &mut settings.height,
                    };
                    *slot = Some(value);
                }
            }
            "color" => {
                if let Some(color) = self.setting_color(key)? {
                    settings.color = Some(color);
                }
            }
            "databasetype" => settings.database_type = Some(self.setting_text()?),
            "labelhorizontal" => {
                let value = self.setting_value()?;
                match value_text(&value).parse::<LabelHorizontal>() {
                    Ok(label) => settings.label_horizontal = Some(label),
                    Err(_) => self.invalid_value(key, &value, "expected left, center or right"),
                }
            }
            "labelvertical" => {
                let value = self.setting_value()?;
                match value_text(&value).parse::<LabelVertical>() {
                    Ok(label) => settings.label_vertical = Some(label),
                    Err(_) => self.invalid_value(key, &value, "expected top, center or bottom"),
                }
            }
            "note" => node.note = Some(self.setting_string()?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// common_columns = "CommonColumns" ":"? "[" (column ","?)* "]"
    fn parse_common_columns(&mut self) -> Result<Vec<ColumnNode>, ParseDiagnostic> {
        self.expect(Token::CommonColumns)?;
        self.eat(Token::Colon);
        self.expect(Token::LBracket)?;
        let mut columns = Vec::new();

        loop {
            match self.peek() {
                Token::RBracket => {
                    self.advance();
                    return Ok(columns);
                }
                token if token == Token::Eof || token.is_top_level_keyword() => {
                    return Err(self.unexpected("']'"));
                }
                token if token.is_name() => {
                    let comments = self.take_comments();
                    let mut column = match self.parse_column() {
                        Ok(column) => column,
                        Err(diagnostic) => {
                            self.restore_comments(comments);
                            return Err(diagnostic);
                        }
                    };
                    column.comments = comments;
                    columns.push(column);
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// note = "Note" (":" string | "{" string "}")
    fn parse_note(&mut self) -> Result<String, ParseDiagnostic> {
        self.expect(Token::Note)?;
        if self.eat(Token::LBrace).is_some() {
            let text = self.expect_string("note text")?;
            self.expect(Token::RBrace)?;
            return Ok(text);
        }
        self.expect(Token::Colon)?;
        self.expect_string("note text")
    }

    /// True if the `Note` at the cursor starts a note rather than naming a
    /// column or table.
    fn note_follows(&self) -> bool {
        matches!(self.peek_nth(1), Token::Colon | Token::LBrace)
    }

    // -- Settings --

    /// settings = "[" (entry ("," entry)*)? "]"
    ///
    /// `apply` is called with the cursor just past each key. It consumes
    /// the rest of the entry and returns `true`, or returns `false` for an
    /// unknown key, which is then skipped up to the next `,` or `]`.
    fn parse_settings<F>(&mut self, mut apply: F) -> Result<(), ParseDiagnostic>
    where
        F: FnMut(&mut Self, &SettingKey) -> Result<bool, ParseDiagnostic>,
    {
        self.expect(Token::LBracket)?;
        loop {
            match self.peek() {
                Token::RBracket => {
                    self.advance();
                    return Ok(());
                }
                Token::Comma => {
                    self.advance();
                    continue;
                }
                _ => {}
            }

            let key = self.setting_key()?;
            if !apply(self, &key)? {
                tracing::trace!(key = %key.text, "skipping unknown setting");
                self.skip_setting_value()?;
            }

            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::RBracket => {}
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }
    }

    /// A setting name. Top-level keywords are accepted only when followed
    /// by `:`, as in `ref: > users.id`.
    fn setting_key(&mut self) -> Result<SettingKey, ParseDiagnostic> {
        let token = self.peek();
        let keyword_key = token.is_top_level_keyword() && self.peek_nth(1) == Token::Colon;
        if token.is_name() || keyword_key {
            let st = self.advance();
            Ok(SettingKey::new(value_text(&st)))
        } else {
            Err(self.unexpected("setting name"))
        }
    }

    /// Skips the remainder of an unknown setting, stopping before the `,`
    /// or `]` that ends it.
    fn skip_setting_value(&mut self) -> Result<(), ParseDiagnostic> {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                Token::Comma | Token::RBracket if depth == 0 => return Ok(()),
                Token::Eof | Token::RBrace if depth == 0 => return Err(self.unexpected("']'")),
                Token::Eof => return Err(self.unexpected("']'")),
                token if token.is_top_level_keyword() && self.peek_nth(1) != Token::Colon => {
                    return Err(self.unexpected("']'"));
                }
                Token::LBracket | Token::LParen | Token::LBrace => {
                    depth += 1;
                    self.advance();
                }
                Token::RBracket | Token::RParen | Token::RBrace => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skips `: value` after an unknown `key:` line in a block body.
    fn skip_body_value(&mut self) {
        self.eat(Token::Colon);
        let token = self.peek();
        if token != Token::RBrace && token != Token::Eof && !token.is_top_level_keyword() {
            self.advance();
        }
    }

    /// `":" value` where value is any single word, string, number or color.
    fn setting_value(&mut self) -> Result<SpannedToken, ParseDiagnostic> {
        self.expect(Token::Colon)?;
        let token = self.peek();
        if token.is_name() || token.is_string() || matches!(token, Token::Number | Token::Color)
        {
            Ok(self.advance())
        } else {
            Err(self.unexpected("setting value"))
        }
    }

    fn setting_text(&mut self) -> Result<String, ParseDiagnostic> {
        Ok(value_text(&self.setting_value()?))
    }

    fn setting_string(&mut self) -> Result<String, ParseDiagnostic> {
        self.expect(Token::Colon)?;
        self.expect_string("string literal")
    }

    fn setting_number(&mut self, key: &SettingKey) -> Result<Option<f64>, ParseDiagnostic> {
        let value = self.setting_value()?;
        let parsed = match value.token {
            Token::Number | Token::DoubleString | Token::SingleString => {
                value_text(&value).parse::<f64>().ok()
            }
            _ => None,
        };
        if parsed.is_none() {
            self.invalid_value(key, &value, "expected a number");
        }
        Ok(parsed)
    }

    fn setting_bool(&mut self, key: &SettingKey) -> Result<Option<bool>, ParseDiagnostic> {
        let value = self.setting_value()?;
        let text = value_text(&value);
        let parsed = if text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        };
        if parsed.is_none() {
            self.invalid_value(key, &value, "expected true or false");
        }
        Ok(parsed)
    }

    fn setting_color(&mut self, key: &SettingKey) -> Result<Option<Color>, ParseDiagnostic> {
        let value = self.setting_value()?;
        match Color::new(value_text(&value)) {
            Ok(color) => Ok(Some(color)),
            Err(_) => {
                self.invalid_value(key, &value, "expected #RGB or #RRGGBB");
                Ok(None)
            }
        }
    }

    // -- Terminals --

    /// A name: identifier, quoted string, or non-structural keyword.
    /// Returns the unquoted text and the token's span.
    fn expect_name(&mut self, context: &str) -> Result<(String, Span), ParseDiagnostic> {
        if self.peek().is_name() {
            let st = self.advance();
            Ok((value_text(&st), st.span))
        } else {
            Err(self.unexpected(context))
        }
    }

    fn expect_string(&mut self, context: &str) -> Result<String, ParseDiagnostic> {
        if self.peek().is_string() {
            Ok(value_text(&self.advance()))
        } else {
            Err(self.unexpected(context))
        }
    }
}

fn file_item(program: &mut Program, item: Item, comments: Vec<String>) {
    match item {
        Item::Project(mut node) => {
            node.comments = comments;
            if let Some(previous) = program.project.replace(node) {
                tracing::warn!(project = %previous.name, "replacing earlier Project block");
            }
        }
        Item::Table(mut node) => {
            node.comments = comments;
            program.tables.push(node);
        }
        Item::Ref(mut node) => {
            node.comments = comments;
            program.refs.push(node);
        }
        Item::Area(mut node) => {
            node.comments = comments;
            program.areas.push(node);
        }
    }
}

/// The text of a token as a value: strings are unquoted, everything else
/// is taken verbatim.
fn value_text(st: &SpannedToken) -> String {
    if st.token.is_string() {
        unquote_string(&st.text)
    } else {
        st.text.clone()
    }
}

/// Strips the surrounding quotes and resolves escape sequences.
/// Unknown escapes keep their backslash.
fn unquote_string(s: &str) -> String {
    let mut chars = s.chars();
    chars.next();
    chars.next_back();
    let inner = chars.as_str();

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some(escaped @ ('\\' | '"' | '\'' | '`')) => result.push(escaped),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn comment_text(raw: &str) -> String {
    raw.strip_prefix("//").unwrap_or(raw).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    // -- Helpers --

    fn parse(source: &str) -> ParsedProgram {
        parse_tokens(&tokenize(source).expect("tokenize should succeed"))
    }

    fn parse_ok(source: &str) -> Program {
        let parsed = parse(source);
        assert!(
            parsed.diagnostics.is_empty(),
            "unexpected diagnostics: {:?}",
            parsed.diagnostics
        );
        parsed.program
    }

    fn one_table(source: &str) -> TableNode {
        let program = parse_ok(source);
        assert_eq!(program.tables.len(), 1, "expected exactly one table");
        program.tables.into_iter().next().unwrap()
    }

    // -- Tables and columns --

    #[test]
    fn parse_minimal_table() {
        let table = one_table("Table users { id serial }");
        assert_eq!(table.name, "users");
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].name, "id");
        assert_eq!(table.columns[0].type_name, "serial");
        assert_eq!(table.columns[0].type_params, None);
    }

    #[test]
    fn parse_empty_table() {
        let table = one_table("Table empty {}");
        assert!(table.columns.is_empty());
    }

    #[test]
    fn type_params_are_joined_raw() {
        let table = one_table(
            "Table t {
                a varchar(255)
                b decimal(10, 2)
                c enum('x', 'y')
            }",
        );
        assert_eq!(table.columns[0].type_params.as_deref(), Some("255"));
        assert_eq!(table.columns[1].type_params.as_deref(), Some("10,2"));
        assert_eq!(table.columns[2].type_params.as_deref(), Some("'x','y'"));
    }

    #[test]
    fn column_constraints() {
        let table = one_table(
            "Table t { id int [pk, increment, not null, unique, note: 'key', alias: 'ID'] }",
        );
        let c = &table.columns[0].constraints;
        assert!(c.pk && c.increment && c.not_null && c.unique);
        assert!(!c.fk);
        assert_eq!(c.note.as_deref(), Some("key"));
        assert_eq!(c.alias.as_deref(), Some("ID"));
    }

    #[test]
    fn primary_key_spelled_out() {
        let table = one_table("Table t { id int [primary key] }");
        assert!(table.columns[0].constraints.pk);
    }

    #[test]
    fn null_clears_not_null() {
        let table = one_table("Table t { a int [not null, null] }");
        assert!(!table.columns[0].constraints.not_null);
    }

    #[test]
    fn default_kinds() {
        let table = one_table(
            "Table t {
                a text [default: 'hello']
                b timestamp [default: `now()`]
                c timestamp [default: now()]
                d int [default: 0]
                e bool [default: true]
                f text [default: null]
                g text [default: nextval('seq')]
            }",
        );
        let defaults: Vec<(String, DefaultKind)> = table
            .columns
            .iter()
            .map(|c| {
                let d = c.constraints.default.clone().unwrap();
                (d.value, d.kind)
            })
            .collect();
        assert_eq!(
            defaults,
            vec![
                ("hello".into(), DefaultKind::String),
                ("now()".into(), DefaultKind::Expression),
                ("now()".into(), DefaultKind::Expression),
                ("0".into(), DefaultKind::Literal),
                ("true".into(), DefaultKind::Literal),
                ("null".into(), DefaultKind::Literal),
                ("nextval('seq')".into(), DefaultKind::Expression),
            ]
        );
    }

    #[test]
    fn table_settings_and_alias() {
        let table = one_table(
            "Table users as U [pos_x: 100, posY: -20.5, color: #abc, note: 'people'] { id int }",
        );
        assert_eq!(table.alias.as_deref(), Some("U"));
        assert_eq!(table.settings.pos_x, Some(100.0));
        assert_eq!(table.settings.pos_y, Some(-20.5));
        assert_eq!(table.settings.color.as_ref().map(Color::as_str), Some("#abc"));
        assert_eq!(table.note.as_deref(), Some("people"));
    }

    #[test]
    fn table_note_forms() {
        let a = one_table("Table t { id int\n Note: 'first' }");
        assert_eq!(a.note.as_deref(), Some("first"));
        let b = one_table("Table t { id int\n Note { 'second' } }");
        assert_eq!(b.note.as_deref(), Some("second"));
    }

    #[test]
    fn note_and_indexes_can_name_columns() {
        let table = one_table("Table t { note text\n indexes int }");
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["note", "indexes"]);
        assert!(table.note.is_none());
    }

    #[test]
    fn quoted_and_keyword_names() {
        let table = one_table(r#"Table "Table" { "Ref" int  'my col' text }"#);
        assert_eq!(table.name, "Table");
        assert_eq!(table.columns[0].name, "Ref");
        assert_eq!(table.columns[1].name, "my col");
    }

    #[test]
    fn unicode_names() {
        let table = one_table("Table 用户 { 名前 text }");
        assert_eq!(table.name, "用户");
        assert_eq!(table.columns[0].name, "名前");
    }

    // -- Indexes --

    #[test]
    fn indexes_block() {
        let table = one_table(
            "Table t {
                a int
                b int
                indexes {
                    (a, b) [unique, name: 'ab_idx']
                    a [pk]
                    `lower(b)`
                    b [type: hash]
                }
            }",
        );
        assert_eq!(table.indexes.len(), 4);
        assert_eq!(table.indexes[0].columns, vec!["a", "b"]);
        assert!(table.indexes[0].unique);
        assert_eq!(table.indexes[0].name.as_deref(), Some("ab_idx"));
        assert!(table.indexes[1].pk);
        assert_eq!(table.indexes[2].columns, vec!["lower(b)"]);
        assert!(!table.indexes[3].unique);
    }

    // -- References --

    #[test]
    fn ref_operators() {
        let program = parse_ok(
            "Ref: a.x > b.y
             Ref: a.x < b.y
             Ref: a.x - b.y
             Ref: a.x <> b.y
             Ref: a.x ~ b.y",
        );
        let kinds: Vec<RelationshipKind> = program.refs.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, RelationshipKind::ALL.to_vec());
        assert_eq!(program.refs[0].from.table, "a");
        assert_eq!(program.refs[0].from.column, "x");
        assert_eq!(program.refs[0].to.table, "b");
        assert_eq!(program.refs[0].to.column, "y");
    }

    #[test]
    fn ref_forms() {
        let program = parse_ok(
            "Ref fk_orders: orders.user_id > users.id
             Ref orders.id - invoices.order_id
             Ref named { a.b > c.d }
             Ref \"quoted name\": e.f > g.h",
        );
        assert_eq!(program.refs.len(), 4);
        assert_eq!(program.refs[0].name.as_deref(), Some("fk_orders"));
        assert_eq!(program.refs[1].name, None);
        assert_eq!(program.refs[1].from.table, "orders");
        assert_eq!(program.refs[2].name.as_deref(), Some("named"));
        assert_eq!(program.refs[3].name.as_deref(), Some("quoted name"));
    }

    #[test]
    fn ref_settings() {
        let program = parse_ok("Ref: a.b > c.d [swap_edge: true, note: 'why', delete: cascade]");
        let r = &program.refs[0];
        assert_eq!(r.swap_edge, Some(true));
        assert_eq!(r.note.as_deref(), Some("why"));
    }

    // -- Areas and project --

    #[test]
    fn area_with_everything() {
        let program = parse_ok(
            "Area sales [pos_x: 10, pos_y: 20, width: 300, height: 200, color: #123456,
                        labelHorizontal: right, labelVertical: 'bottom'] {
                customers
                orders
                database_type: 'MySQL'
                CommonColumns: [
                    created_at timestamp [not null],
                    updated_at timestamp
                ]
                Note: 'sales context'
            }",
        );
        let area = &program.areas[0];
        assert_eq!(area.name, "sales");
        assert_eq!(area.tables, vec!["customers", "orders"]);
        assert_eq!(area.settings.pos_x, Some(10.0));
        assert_eq!(area.settings.height, Some(200.0));
        assert_eq!(area.settings.label_horizontal, Some(LabelHorizontal::Right));
        assert_eq!(area.settings.label_vertical, Some(LabelVertical::Bottom));
        assert_eq!(area.settings.database_type.as_deref(), Some("MySQL"));
        assert_eq!(area.common_columns.len(), 2);
        assert!(area.common_columns[0].constraints.not_null);
        assert_eq!(area.note.as_deref(), Some("sales context"));
    }

    #[test]
    fn common_columns_without_commas() {
        let program = parse_ok("Area a { CommonColumns [ x int y int ] }");
        assert_eq!(program.areas[0].common_columns.len(), 2);
    }

    #[test]
    fn project_settings_and_body() {
        let program = parse_ok(
            "Project shop [note: 'bracket note'] {
                database_type: 'PostgreSQL'
                unknown_key: 'ignored'
            }",
        );
        let project = program.project.unwrap();
        assert_eq!(project.name, "shop");
        assert_eq!(project.database_type.as_deref(), Some("PostgreSQL"));
        assert_eq!(project.note.as_deref(), Some("bracket note"));
    }

    #[test]
    fn project_without_body() {
        let program = parse_ok("Project p\nTable t { id int }");
        assert_eq!(program.project.map(|p| p.name).as_deref(), Some("p"));
        assert_eq!(program.tables.len(), 1);
    }

    // -- Comments --

    #[test]
    fn comments_attach_to_next_construct_and_column() {
        let program = parse_ok(
            "// people
             // and their stuff
             Table users {
                 // surrogate key
                 id int
                 email text
             }
             // link
             Ref: a.b > c.d",
        );
        let table = &program.tables[0];
        assert_eq!(table.comments, vec!["people", "and their stuff"]);
        assert_eq!(table.columns[0].comments, vec!["surrogate key"]);
        assert!(table.columns[1].comments.is_empty());
        assert_eq!(program.refs[0].comments, vec!["link"]);
    }

    #[test]
    fn comments_survive_a_failed_construct() {
        let parsed = parse(
            "// kept
             Table broken [pos_x: ] { }
             Table good { id int }",
        );
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.program.tables.len(), 1);
        assert_eq!(parsed.program.tables[0].name, "good");
        assert_eq!(parsed.program.tables[0].comments, vec!["kept"]);
    }

    #[test]
    fn comments_of_a_failed_column_move_to_next_construct() {
        let parsed = parse("Table t {\n // keep me\n id int [pk\n}\nTable u { id int }");
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.program.tables.len(), 1);
        assert_eq!(parsed.program.tables[0].name, "u");
        assert_eq!(parsed.program.tables[0].comments, vec!["keep me"]);
    }

    #[test]
    fn comments_of_a_failed_common_column_move_to_next_construct() {
        let parsed = parse(
            "Area a {\n CommonColumns: [\n // shared\n x int [pk pk]\n ]\n}\nTable u { id int }",
        );
        assert_eq!(parsed.diagnostics.len(), 1);
        assert!(parsed.program.areas.is_empty());
        assert_eq!(parsed.program.tables[0].comments, vec!["shared"]);
    }

    // -- Recovery --

    #[test]
    fn unclosed_table_recovers_at_next_keyword() {
        let parsed = parse("Table broken {\nTable valid { id serial }\n");
        assert_eq!(parsed.program.tables.len(), 1);
        assert_eq!(parsed.program.tables[0].name, "valid");
        assert_eq!(parsed.diagnostics.len(), 1);
        match &parsed.diagnostics[0] {
            ParseDiagnostic::UnclosedBlock {
                construct, name, span,
            } => {
                assert_eq!(construct, "table");
                assert_eq!(name, "broken");
                assert_eq!(span.start.line, 1);
            }
            other => panic!("expected UnclosedBlock, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_table_at_end_of_input() {
        let parsed = parse("Table t { id int");
        assert!(parsed.program.tables.is_empty());
        assert!(matches!(
            parsed.diagnostics.as_slice(),
            [ParseDiagnostic::UnclosedBlock { .. }]
        ));
    }

    #[test]
    fn stray_top_level_tokens_are_skipped() {
        let parsed = parse("garbage here\nTable t { id int }");
        assert_eq!(parsed.program.tables.len(), 1);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert!(matches!(
            &parsed.diagnostics[0],
            ParseDiagnostic::UnexpectedToken { span, .. } if span.start.line == 1
        ));
    }

    #[test]
    fn broken_ref_does_not_hide_later_constructs() {
        let parsed = parse("Ref: a.b >> c.d\nTable t { id int }\nRef: t.id > u.id");
        assert_eq!(parsed.program.tables.len(), 1);
        assert_eq!(parsed.program.refs.len(), 1);
        assert_eq!(parsed.diagnostics.len(), 1);
    }

    #[test]
    fn unknown_settings_are_skipped() {
        let table = one_table("Table t { id int [pk, check: (id > 0), ref: > u.id, unique] }");
        let c = &table.columns[0].constraints;
        assert!(c.pk);
        assert!(c.unique);
    }

    #[test]
    fn invalid_setting_value_keeps_the_construct() {
        let parsed = parse("Table t [color: 'red', pos_x: 'left'] { id int }");
        assert_eq!(parsed.program.tables.len(), 1);
        assert!(parsed.program.tables[0].settings.color.is_none());
        assert_eq!(parsed.diagnostics.len(), 2);
        assert!(parsed
            .diagnostics
            .iter()
            .all(|d| matches!(d, ParseDiagnostic::InvalidSettingValue { .. })));
    }

    #[test]
    fn invalid_label_alignment_is_reported() {
        let parsed = parse("Area a [labelHorizontal: middle] { }");
        assert_eq!(parsed.program.areas.len(), 1);
        assert!(parsed.program.areas[0].settings.label_horizontal.is_none());
        assert!(matches!(
            &parsed.diagnostics[0],
            ParseDiagnostic::InvalidSettingValue { key, .. } if key == "labelHorizontal"
        ));
    }

    #[test]
    fn unterminated_settings_list() {
        let parsed = parse("Table t { id int [pk\nTable u { id int }");
        assert_eq!(parsed.program.tables.len(), 1);
        assert_eq!(parsed.program.tables[0].name, "u");
        assert!(!parsed.diagnostics.is_empty());
    }

    #[test]
    fn parse_tokens_tolerates_missing_eof() {
        let mut tokens = tokenize("Table t { id int }").unwrap();
        tokens.pop();
        let parsed = parse_tokens(&tokens);
        assert_eq!(parsed.program.tables.len(), 1);
        assert!(parsed.diagnostics.is_empty());
    }

    // -- Helpers --

    #[test]
    fn unquote_handles_escapes() {
        assert_eq!(unquote_string(r#""a\"b\\c\nd""#), "a\"b\\c\nd");
        assert_eq!(unquote_string(r"'it\'s'"), "it's");
        assert_eq!(unquote_string(r#""\q""#), "\\q");
        assert_eq!(unquote_string("\"\""), "");
    }

    #[test]
    fn comment_text_strips_marker() {
        assert_eq!(comment_text("//  spaced  "), "spaced");
        assert_eq!(comment_text("//"), "");
    }
}
