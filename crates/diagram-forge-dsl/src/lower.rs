//! Lowering from the syntax tree to the domain model.

use chrono::{DateTime, Utc};
use diagram_forge_core::types::{
    Area, Column, Diagram, DiagramId, Index, Position, Reference, Table, DEFAULT_DATABASE_TYPE,
    DEFAULT_DIAGRAM_NAME,
};

use crate::ast::{AreaNode, ColumnNode, IndexNode, Program, RefNode, TableNode};

/// Caller-controlled inputs to [`lower`].
#[derive(Debug, Clone, Default)]
pub struct LowerOptions {
    /// Id for the diagram. A fresh one is generated when `None`.
    pub diagram_id: Option<DiagramId>,
    /// Database type used when the document's `Project` block names none.
    pub default_database_type: Option<String>,
    /// Creation and update time. Defaults to the current time.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Lowers a parsed program into a [`Diagram`].
///
/// Tables are lowered first, then references, then areas, so an area can
/// list tables declared after it. Every reference's from-column is marked
/// as a foreign key. Duplicate names and dangling references are kept as
/// they are; see [`Diagram::integrity_issues`].
pub fn lower(program: &Program, options: &LowerOptions) -> Diagram {
    let project = program.project.as_ref();

    let database_type = project
        .and_then(|p| p.database_type.clone())
        .or_else(|| options.default_database_type.clone())
        .unwrap_or_else(|| DEFAULT_DATABASE_TYPE.to_string());
    let name = project.map_or_else(|| DEFAULT_DIAGRAM_NAME.to_string(), |p| p.name.clone());

    let mut diagram = Diagram::new(
        options.diagram_id.clone().unwrap_or_default(),
        name,
        database_type,
        options.timestamp.unwrap_or_else(Utc::now),
    );
    diagram.project_name = project.map(|p| p.name.clone());
    diagram.note = project.and_then(|p| p.note.clone());

    diagram.tables = program.tables.iter().map(lower_table).collect();
    diagram.references = program.refs.iter().map(lower_ref).collect();
    for node in &program.areas {
        let area = lower_area(node, &mut diagram.tables);
        diagram.areas.push(area);
    }

    diagram.mark_foreign_keys();

    tracing::debug!(
        diagram = %diagram.id,
        tables = diagram.tables.len(),
        references = diagram.references.len(),
        areas = diagram.areas.len(),
        "lowered document"
    );
    diagram
}

fn lower_table(node: &TableNode) -> Table {
    let mut table = Table::new(&node.name, node.columns.iter().map(lower_column).collect());
    table.alias = node.alias.clone();
    table.indexes = node.indexes.iter().map(lower_index).collect();
    table.color = node.settings.color.clone();
    table.position = position(node.settings.pos_x, node.settings.pos_y);
    table.note = node.note.clone();
    table.comments = node.comments.clone();
    table
}

fn lower_column(node: &ColumnNode) -> Column {
    let constraints = &node.constraints;
    Column {
        name: node.name.clone(),
        alias: constraints.alias.clone(),
        column_type: normalize_type(&node.type_name),
        type_params: node.type_params.clone(),
        pk: constraints.pk,
        fk: constraints.fk,
        unique: constraints.unique,
        not_null: constraints.not_null,
        increment: constraints.increment,
        default: constraints.default.as_ref().map(|d| d.value.clone()),
        note: constraints.note.clone(),
        comments: node.comments.clone(),
    }
}

fn lower_index(node: &IndexNode) -> Index {
    Index {
        columns: node.columns.clone(),
        unique: node.unique,
        pk: node.pk,
        name: node.name.clone(),
    }
}

fn lower_ref(node: &RefNode) -> Reference {
    let mut reference = Reference::new(
        &node.from.table,
        &node.from.column,
        &node.to.table,
        &node.to.column,
        node.kind,
    );
    reference.swap_edge = node.swap_edge;
    reference.note = node.note.clone();
    reference.comments = node.comments.clone();
    reference
}

/// Builds an area and records its membership on both sides. Member names
/// that match no table are dropped.
fn lower_area(node: &AreaNode, tables: &mut [Table]) -> Area {
    let settings = &node.settings;
    let mut area = Area::new(&node.name);
    area.color = settings.color.clone();
    area.position = position(settings.pos_x, settings.pos_y);
    area.width = settings.width;
    area.height = settings.height;
    area.label_horizontal = settings.label_horizontal;
    area.label_vertical = settings.label_vertical;
    area.database_type = settings.database_type.clone();
    area.common_columns = node.common_columns.iter().map(lower_column).collect();
    area.note = node.note.clone();
    area.comments = node.comments.clone();

    for member in &node.tables {
        let Some(table) = tables.iter_mut().find(|t| &t.name == member) else {
            tracing::warn!(
                area = %node.name,
                table = %member,
                "area member names no table, dropping it"
            );
            continue;
        };
        if !area.contains(&table.id) {
            area.table_ids.push(table.id.clone());
        }
        if !table.area_ids.contains(&area.id) {
            table.area_ids.push(area.id.clone());
        }
    }
    area
}

/// A position exists once either coordinate is given; the missing one is 0.
fn position(x: Option<f64>, y: Option<f64>) -> Option<Position> {
    if x.is_none() && y.is_none() {
        return None;
    }
    Some(Position::new(x.unwrap_or(0.0), y.unwrap_or(0.0)))
}

/// Maps common spellings of a column type to a canonical lowercase name.
///
/// Matching ignores ASCII case. Names outside the table are returned
/// unchanged, so engine-specific types are never rejected.
pub fn normalize_type(name: &str) -> String {
    let canonical = match name.to_ascii_lowercase().as_str() {
        "int" | "int4" | "integer" => "integer",
        "int2" | "smallint" => "smallint",
        "int8" | "bigint" => "bigint",
        "bool" | "boolean" => "boolean",
        "float4" | "real" => "real",
        "float8" | "double" => "double",
        "dec" | "decimal" => "decimal",
        "numeric" => "numeric",
        "float" => "float",
        "serial" => "serial",
        "bigserial" => "bigserial",
        "smallserial" => "smallserial",
        "varchar" => "varchar",
        "char" => "char",
        "text" => "text",
        "uuid" => "uuid",
        "date" => "date",
        "time" => "time",
        "timestamp" => "timestamp",
        "timestamptz" => "timestamptz",
        "json" => "json",
        "jsonb" => "jsonb",
        "bytea" => "bytea",
        "blob" => "blob",
        _ => return name.to_string(),
    };
    canonical.to_string()
}
