use serde::{Deserialize, Serialize};

use super::color::Color;
use super::column::Column;
use super::element_id::{AreaId, TableId};
use super::index::Index;
use super::position::Position;

/// A table: id, name, ordered columns, indexes, and presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Ids of the areas this table belongs to, in area declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub area_ids: Vec<AreaId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Table {
    /// Creates a table whose id is derived from its name.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let name = name.into();
        Self {
            id: TableId::for_name(&name),
            name,
            alias: None,
            columns,
            indexes: Vec::new(),
            color: None,
            position: None,
            area_ids: Vec::new(),
            note: None,
            comments: Vec::new(),
        }
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks up a column by name for modification.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Table {} {{", self.name)?;
        for column in &self.columns {
            writeln!(f, "  {column}")?;
        }
        write!(f, "}}")
    }
}
