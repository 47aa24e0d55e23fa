use diagram_forge_core::types::{Area, Column, Diagram, Index, Position, Reference, Table};

use crate::lower::normalize_type;

const INDENT: &str = "  ";

/// Keywords that would be read as structure if written as a bare name.
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "project",
    "table",
    "area",
    "ref",
    "note",
    "indexes",
    "commoncolumns",
    "common_columns",
];

/// Serializes a diagram to diagram markup.
///
/// The output is canonical: two-space indentation, settings in a fixed
/// order, and one blank line between blocks. Parsing it back yields the
/// same tables, columns, references and area memberships.
pub fn serialize(diagram: &Diagram) -> String {
    let mut output = String::new();
    print_project(diagram, &mut output);

    for table in &diagram.tables {
        output.push('\n');
        print_table(table, &mut output);
    }

    if !diagram.references.is_empty() {
        output.push('\n');
        for reference in &diagram.references {
            print_reference(reference, &mut output);
        }
    }

    for area in &diagram.areas {
        if is_printable(diagram, area) {
            output.push('\n');
            print_area(diagram, area, &mut output);
        }
    }

    output
}

fn print_project(diagram: &Diagram, output: &mut String) {
    let name = diagram.project_name.as_deref().unwrap_or(&diagram.name);
    output.push_str("Project ");
    output.push_str(&quote_ident(name));
    output.push_str(" {\n");
    output.push_str(INDENT);
    output.push_str("database_type: ");
    output.push_str(&quote_string(&diagram.database_type));
    output.push('\n');
    if let Some(note) = &diagram.note {
        output.push_str(INDENT);
        output.push_str("Note: ");
        output.push_str(&quote_string(note));
        output.push('\n');
    }
    output.push_str("}\n");
}

fn print_table(table: &Table, output: &mut String) {
    print_comments(&table.comments, "", output);
    output.push_str("Table ");
    output.push_str(&quote_ident(&table.name));

    let mut settings = Vec::new();
    if let Some(alias) = &table.alias {
        settings.push(format!("alias: {}", quote_string(alias)));
    }
    push_position(&mut settings, table.position);
    if let Some(color) = &table.color {
        settings.push(format!("color: {color}"));
    }
    push_settings(&settings, output);
    output.push_str(" {\n");

    for column in &table.columns {
        print_column(column, INDENT, output);
    }

    if !table.indexes.is_empty() {
        output.push_str(INDENT);
        output.push_str("indexes {\n");
        for index in &table.indexes {
            print_index(index, output);
        }
        output.push_str(INDENT);
        output.push_str("}\n");
    }

    if let Some(note) = &table.note {
        output.push_str(INDENT);
        output.push_str("Note: ");
        output.push_str(&quote_string(note));
        output.push('\n');
    }

    output.push_str("}\n");
}

fn print_column(column: &Column, indent: &str, output: &mut String) {
    print_comments(&column.comments, indent, output);
    output.push_str(indent);
    output.push_str(&quote_ident(&column.name));
    output.push(' ');
    output.push_str(&quote_ident(&normalize_type(&column.column_type)));
    if let Some(params) = &column.type_params {
        output.push('(');
        output.push_str(params);
        output.push(')');
    }

    let mut settings: Vec<String> = [
        (column.pk, "pk"),
        (column.fk, "fk"),
        (column.unique, "unique"),
        (column.not_null, "not null"),
        (column.increment, "increment"),
    ]
    .into_iter()
    .filter_map(|(set, label)| set.then(|| label.to_string()))
    .collect();
    if let Some(default) = &column.default {
        settings.push(format!("default: {}", format_default(default)));
    }
    if let Some(alias) = &column.alias {
        settings.push(format!("alias: {}", quote_string(alias)));
    }
    if let Some(note) = &column.note {
        settings.push(format!("note: {}", quote_string(note)));
    }
    push_settings(&settings, output);
    output.push('\n');
}

fn print_index(index: &Index, output: &mut String) {
    output.push_str(INDENT);
    output.push_str(INDENT);
    output.push('(');
    let columns: Vec<String> = index
        .columns
        .iter()
        .map(|c| {
            if c.contains('(') {
                format!("`{}`", escape(c, '`'))
            } else {
                quote_ident(c)
            }
        })
        .collect();
    output.push_str(&columns.join(", "));
    output.push(')');

    let mut settings = Vec::new();
    if index.unique {
        settings.push("unique".to_string());
    }
    if index.pk {
        settings.push("pk".to_string());
    }
    if let Some(name) = &index.name {
        settings.push(format!("name: {}", quote_string(name)));
    }
    push_settings(&settings, output);
    output.push('\n');
}

fn print_reference(reference: &Reference, output: &mut String) {
    print_comments(&reference.comments, "", output);
    output.push_str("Ref: ");
    output.push_str(&quote_ident(reference.from_table.table_name()));
    output.push('.');
    output.push_str(&quote_ident(&reference.from_column));
    output.push(' ');
    output.push_str(reference.kind.symbol());
    output.push(' ');
    output.push_str(&quote_ident(reference.to_table.table_name()));
    output.push('.');
    output.push_str(&quote_ident(&reference.to_column));

    let mut settings = Vec::new();
    if let Some(swap) = reference.swap_edge {
        settings.push(format!("swap_edge: {swap}"));
    }
    if let Some(note) = &reference.note {
        settings.push(format!("note: {}", quote_string(note)));
    }
    push_settings(&settings, output);
    output.push('\n');
}

/// An area is printed only if it has something a reader can see: a member
/// table that exists, a common column, or a note.
fn is_printable(diagram: &Diagram, area: &Area) -> bool {
    area.table_ids
        .iter()
        .any(|id| diagram.table_by_id(id).is_some())
        || !area.common_columns.is_empty()
        || area.note.is_some()
}

fn print_area(diagram: &Diagram, area: &Area, output: &mut String) {
    print_comments(&area.comments, "", output);
    output.push_str("Area ");
    output.push_str(&quote_ident(&area.name));

    let mut settings = Vec::new();
    push_position(&mut settings, area.position);
    for (key, value) in [("width", area.width), ("height", area.height)] {
        if let Some(value) = value.filter(|v| v.is_finite()) {
            settings.push(format!("{key}: {value}"));
        }
    }
    if let Some(color) = &area.color {
        settings.push(format!("color: {color}"));
    }
    if let Some(label) = area.label_horizontal {
        settings.push(format!("labelHorizontal: {label}"));
    }
    if let Some(label) = area.label_vertical {
        settings.push(format!("labelVertical: {label}"));
    }
    push_settings(&settings, output);
    output.push_str(" {\n");

    for id in &area.table_ids {
        if let Some(table) = diagram.table_by_id(id) {
            output.push_str(INDENT);
            output.push_str(&quote_ident(&table.name));
            output.push('\n');
        }
    }

    if let Some(database_type) = &area.database_type {
        output.push_str(INDENT);
        output.push_str("database_type: ");
        output.push_str(&quote_string(database_type));
        output.push('\n');
    }

    if !area.common_columns.is_empty() {
        output.push_str(INDENT);
        output.push_str("CommonColumns: [\n");
        let nested = INDENT.repeat(2);
        for column in &area.common_columns {
            print_column(column, &nested, output);
        }
        output.push_str(INDENT);
        output.push_str("]\n");
    }

    if let Some(note) = &area.note {
        output.push_str(INDENT);
        output.push_str("Note: ");
        output.push_str(&quote_string(note));
        output.push('\n');
    }

    output.push_str("}\n");
}

fn print_comments(comments: &[String], indent: &str, output: &mut String) {
    for comment in comments {
        let mut lines = comment.lines().peekable();
        if lines.peek().is_none() {
            output.push_str(indent);
            output.push_str("//\n");
            continue;
        }
        for line in lines {
            output.push_str(indent);
            output.push_str("// ");
            output.push_str(line.trim_end());
            output.push('\n');
        }
    }
}

fn push_position(settings: &mut Vec<String>, position: Option<Position>) {
    if let Some(position) = position.filter(|p| p.x.is_finite() && p.y.is_finite()) {
        settings.push(format!("pos_x: {}", position.x));
        settings.push(format!("pos_y: {}", position.y));
    }
}

fn push_settings(settings: &[String], output: &mut String) {
    if !settings.is_empty() {
        output.push_str(" [");
        output.push_str(&settings.join(", "));
        output.push(']');
    }
}

/// Writes a name bare when the lexer would read it back as a single
/// identifier, and double-quoted otherwise.
fn quote_ident(name: &str) -> String {
    let bare = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !STRUCTURAL_KEYWORDS.contains(&name.to_ascii_lowercase().as_str());
    if bare {
        name.to_string()
    } else {
        quote_string(name)
    }
}

fn quote_string(value: &str) -> String {
    format!("\"{}\"", escape(value, '"'))
}

/// Renders a column default in the literal form the parser reads back to
/// the same value: backticks for calls, bare for numbers, booleans and
/// null, single quotes otherwise.
fn format_default(value: &str) -> String {
    if value.contains('(') && value.contains(')') {
        format!("`{}`", escape(value, '`'))
    } else if is_bare_literal(value) {
        value.to_string()
    } else {
        format!("'{}'", escape(value, '\''))
    }
}

fn is_bare_literal(value: &str) -> bool {
    if ["true", "false", "null"]
        .iter()
        .any(|word| value.eq_ignore_ascii_case(word))
    {
        return true;
    }
    let digits = value.strip_prefix('-').unwrap_or(value);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    all_digits(whole) && fraction.map_or(true, all_digits)
}

fn escape(value: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c if c == quote => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}
