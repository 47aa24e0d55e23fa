//! Referential integrity and uniqueness report for a [`Diagram`].
//!
//! Lowering never rejects duplicate names or dangling references. This
//! module lets callers find them after the fact and decide what to do.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::types::{AreaId, Diagram, ReferenceId, TableId};

/// A single integrity finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum IntegrityIssue {
    /// Two or more tables share a name (and therefore an id).
    DuplicateTable { id: TableId },
    /// Two or more areas share a name.
    DuplicateArea { id: AreaId },
    /// The same endpoint pair is declared more than once.
    DuplicateReference { id: ReferenceId },
    /// A reference points at a table that is not declared.
    UnknownTable {
        reference: ReferenceId,
        table: TableId,
    },
    /// A reference points at a column its table does not have.
    UnknownColumn {
        reference: ReferenceId,
        table: TableId,
        column: String,
    },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTable { id } => write!(f, "duplicate table '{id}'"),
            Self::DuplicateArea { id } => write!(f, "duplicate area '{id}'"),
            Self::DuplicateReference { id } => write!(f, "duplicate reference '{id}'"),
            Self::UnknownTable { reference, table } => {
                write!(f, "reference '{reference}' points at unknown table '{table}'")
            }
            Self::UnknownColumn {
                reference,
                table,
                column,
            } => write!(
                f,
                "reference '{reference}' points at unknown column '{column}' of '{table}'"
            ),
        }
    }
}

impl Diagram {
    /// Collects every integrity issue in declaration order: duplicate
    /// tables, duplicate areas, then per-reference findings.
    pub fn integrity_issues(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        let mut seen_tables = HashSet::with_capacity(self.tables.len());
        for table in &self.tables {
            if !seen_tables.insert(&table.id) {
                issues.push(IntegrityIssue::DuplicateTable {
                    id: table.id.clone(),
                });
            }
        }

        let mut seen_areas = HashSet::with_capacity(self.areas.len());
        for area in &self.areas {
            if !seen_areas.insert(&area.id) {
                issues.push(IntegrityIssue::DuplicateArea {
                    id: area.id.clone(),
                });
            }
        }

        let mut seen_refs = HashSet::with_capacity(self.references.len());
        for reference in &self.references {
            if !seen_refs.insert(&reference.id) {
                issues.push(IntegrityIssue::DuplicateReference {
                    id: reference.id.clone(),
                });
            }
            for (table_id, column) in [
                (&reference.from_table, &reference.from_column),
                (&reference.to_table, &reference.to_column),
            ] {
                match self.table_by_id(table_id) {
                    None => issues.push(IntegrityIssue::UnknownTable {
                        reference: reference.id.clone(),
                        table: table_id.clone(),
                    }),
                    Some(table) if table.column(column).is_none() => {
                        issues.push(IntegrityIssue::UnknownColumn {
                            reference: reference.id.clone(),
                            table: table_id.clone(),
                            column: column.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        tracing::debug!(diagram = %self.id, issues = issues.len(), "integrity check");
        issues
    }
}
