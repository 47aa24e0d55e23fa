use serde::{Deserialize, Serialize};

use super::element_id::{ReferenceId, TableId};
use super::relationship_kind::RelationshipKind;

/// A relationship between a column of one table and a column of another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: ReferenceId,
    pub from_table: TableId,
    pub from_column: String,
    pub to_table: TableId,
    pub to_column: String,
    pub kind: RelationshipKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_edge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Reference {
    /// Creates a reference between two endpoints given by table and column
    /// name. The id and table ids are derived from the names.
    pub fn new(
        from_table: &str,
        from_column: &str,
        to_table: &str,
        to_column: &str,
        kind: RelationshipKind,
    ) -> Self {
        Self {
            id: ReferenceId::for_endpoints(from_table, from_column, to_table, to_column),
            from_table: TableId::for_name(from_table),
            from_column: from_column.to_string(),
            to_table: TableId::for_name(to_table),
            to_column: to_column.to_string(),
            kind,
            swap_edge: None,
            note: None,
            comments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_ids() {
        let r = Reference::new("orders", "user_id", "users", "id", RelationshipKind::ManyToOne);
        assert_eq!(r.id.as_str(), "ref-orders.user_id-users.id");
        assert_eq!(r.from_table.as_str(), "table-orders");
        assert_eq!(r.to_table.as_str(), "table-users");
    }

    #[test]
    fn serde_roundtrip() {
        let mut r = Reference::new("a", "b", "c", "d", RelationshipKind::OneToOne);
        r.swap_edge = Some(true);
        r.note = Some("primary owner".into());
        let json = serde_json::to_string(&r).unwrap();
        let back: Reference = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
