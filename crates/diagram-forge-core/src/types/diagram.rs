use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::area::Area;
use super::diagram_id::DiagramId;
use super::element_id::TableId;
use super::reference::Reference;
use super::table::Table;

/// Database type used when neither the document nor the caller names one.
pub const DEFAULT_DATABASE_TYPE: &str = "PostgreSQL";

/// Name given to diagrams whose document has no `Project` block.
pub const DEFAULT_DIAGRAM_NAME: &str = "Untitled Diagram";

/// A complete database diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub id: DiagramId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub database_type: String,
    pub tables: Vec<Table>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Diagram {
    /// Creates an empty diagram stamped with `timestamp` for both creation
    /// and update times.
    pub fn new(
        id: DiagramId,
        name: impl Into<String>,
        database_type: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            project_name: None,
            database_type: database_type.into(),
            tables: Vec::new(),
            references: Vec::new(),
            areas: Vec::new(),
            note: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Looks up the first table with the given name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Looks up the first table with the given id.
    pub fn table_by_id(&self, id: &TableId) -> Option<&Table> {
        self.tables.iter().find(|t| &t.id == id)
    }

    /// Looks up the first table with the given id for modification.
    pub fn table_by_id_mut(&mut self, id: &TableId) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| &t.id == id)
    }

    /// Looks up the first area with the given name.
    pub fn area(&self, name: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.name == name)
    }

    /// Marks the column named by each reference's from-endpoint as a
    /// foreign key. References whose table or column does not exist are
    /// skipped.
    pub fn mark_foreign_keys(&mut self) {
        let endpoints: Vec<(TableId, String)> = self
            .references
            .iter()
            .map(|r| (r.from_table.clone(), r.from_column.clone()))
            .collect();
        for (table_id, column_name) in endpoints {
            if let Some(column) = self
                .table_by_id_mut(&table_id)
                .and_then(|t| t.column_mut(&column_name))
            {
                column.fk = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::column::Column;
    use crate::types::relationship_kind::RelationshipKind;

    fn sample() -> Diagram {
        let mut diagram = Diagram::new(
            DiagramId::from_string("d1"),
            "Shop",
            DEFAULT_DATABASE_TYPE,
            Utc::now(),
        );
        diagram.tables.push(Table::new("users", vec![Column::new("id", "serial")]));
        diagram.tables.push(Table::new(
            "orders",
            vec![Column::new("id", "serial"), Column::new("user_id", "integer")],
        ));
        diagram.references.push(Reference::new(
            "orders",
            "user_id",
            "users",
            "id",
            RelationshipKind::ManyToOne,
        ));
        diagram
    }

    #[test]
    fn new_diagram_is_empty() {
        let now = Utc::now();
        let d = Diagram::new(DiagramId::new(), "X", "MySQL", now);
        assert!(d.tables.is_empty());
        assert_eq!(d.created_at, now);
        assert_eq!(d.updated_at, now);
    }

    #[test]
    fn lookups() {
        let d = sample();
        assert!(d.table("users").is_some());
        assert!(d.table_by_id(&TableId::for_name("orders")).is_some());
        assert!(d.table("missing").is_none());
    }

    #[test]
    fn mark_foreign_keys_sets_from_column() {
        let mut d = sample();
        d.mark_foreign_keys();
        let orders = d.table("orders").unwrap();
        assert!(orders.column("user_id").unwrap().fk);
        assert!(!orders.column("id").unwrap().fk);
        assert!(!d.table("users").unwrap().column("id").unwrap().fk);
    }

    #[test]
    fn mark_foreign_keys_ignores_dangling_references() {
        let mut d = sample();
        d.references.push(Reference::new(
            "ghost",
            "x",
            "users",
            "id",
            RelationshipKind::Inferred,
        ));
        d.mark_foreign_keys();
        assert_eq!(d.tables.len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let d = sample();
        let json = serde_json::to_string_pretty(&d).unwrap();
        let back: Diagram = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }
}
