//! Syntax tree produced by the parser.
//!
//! Nodes keep names exactly as written (quotes removed) and carry the span
//! of their source text. Top-level nodes and columns also carry the line
//! comments that preceded them.

use diagram_forge_core::types::{Color, LabelHorizontal, LabelVertical, RelationshipKind};

use crate::error::Span;

/// A whole document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub project: Option<ProjectNode>,
    pub tables: Vec<TableNode>,
    pub refs: Vec<RefNode>,
    pub areas: Vec<AreaNode>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectNode {
    pub name: String,
    pub database_type: Option<String>,
    pub note: Option<String>,
    pub span: Span,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableNode {
    pub name: String,
    pub alias: Option<String>,
    pub columns: Vec<ColumnNode>,
    pub indexes: Vec<IndexNode>,
    pub settings: TableSettings,
    pub note: Option<String>,
    pub span: Span,
    pub comments: Vec<String>,
}

/// Bracketed settings on a table header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSettings {
    pub pos_x: Option<f64>,
    pub pos_y: Option<f64>,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnNode {
    pub name: String,
    pub type_name: String,
    /// Raw parameter text, e.g. `10,2` for `decimal(10, 2)`.
    pub type_params: Option<String>,
    pub constraints: ColumnConstraints,
    pub span: Span,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnConstraints {
    pub pk: bool,
    pub fk: bool,
    pub unique: bool,
    pub not_null: bool,
    pub increment: bool,
    pub default: Option<DefaultValue>,
    pub alias: Option<String>,
    pub note: Option<String>,
}

/// A column default with the literal form it was written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultValue {
    pub value: String,
    pub kind: DefaultKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultKind {
    /// A quoted string.
    String,
    /// A backtick expression or a bare call such as `now()`.
    Expression,
    /// A number, boolean, `null` or bare word.
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexNode {
    pub columns: Vec<String>,
    pub unique: bool,
    pub pk: bool,
    pub name: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefNode {
    pub name: Option<String>,
    pub from: Endpoint,
    pub to: Endpoint,
    pub kind: RelationshipKind,
    pub swap_edge: Option<bool>,
    pub note: Option<String>,
    pub span: Span,
    pub comments: Vec<String>,
}

/// `table.column`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    pub table: String,
    pub column: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AreaNode {
    pub name: String,
    /// Member table names as listed.
    pub tables: Vec<String>,
    pub settings: AreaSettings,
    pub common_columns: Vec<ColumnNode>,
    pub note: Option<String>,
    pub span: Span,
    pub comments: Vec<String>,
}

/// Settings of an area, from its header brackets or `key: value` body
/// lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AreaSettings {
    pub pos_x: Option<f64>,
    pub pos_y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub color: Option<Color>,
    pub database_type: Option<String>,
    pub label_horizontal: Option<LabelHorizontal>,
    pub label_vertical: Option<LabelVertical>,
}
