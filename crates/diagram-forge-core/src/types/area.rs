use serde::{Deserialize, Serialize};

use super::color::Color;
use super::column::Column;
use super::element_id::{AreaId, TableId};
use super::label_alignment::{LabelHorizontal, LabelVertical};
use super::position::Position;

/// A named group of tables, typically one bounded context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    /// Member tables in the order they are listed in the area.
    pub table_ids: Vec<TableId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_horizontal: Option<LabelHorizontal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_vertical: Option<LabelVertical>,
    /// Overrides the diagram's database type for tables in this area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_type: Option<String>,
    /// Columns every member table conceptually carries. They are not
    /// copied into the member tables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub common_columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Area {
    /// Creates an empty area whose id is derived from its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: AreaId::for_name(&name),
            name,
            table_ids: Vec::new(),
            color: None,
            position: None,
            width: None,
            height: None,
            label_horizontal: None,
            label_vertical: None,
            database_type: None,
            common_columns: Vec::new(),
            note: None,
            comments: Vec::new(),
        }
    }

    /// True if the table is a member of this area.
    pub fn contains(&self, table: &TableId) -> bool {
        self.table_ids.contains(table)
    }
}
