use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a table, derived from its name: `table-<name>`.
///
/// Two tables with the same name share an id; collisions are not rejected
/// here (see [`crate::integrity`]).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    pub fn for_name(name: &str) -> Self {
        Self(format!("table-{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The table name this id was derived from.
    pub fn table_name(&self) -> &str {
        self.0.strip_prefix("table-").unwrap_or(&self.0)
    }
}

/// Identifier of an area, derived from its name: `area-<name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(String);

impl AreaId {
    pub fn for_name(name: &str) -> Self {
        Self(format!("area-{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a reference, derived from all four endpoint components.
///
/// Format: `ref-<from_table>.<from_column>-<to_table>.<to_column>`, with
/// `\`, `.` and `-` inside a component escaped by a backslash so distinct
/// endpoints never produce the same id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(String);

impl ReferenceId {
    pub fn for_endpoints(
        from_table: &str,
        from_column: &str,
        to_table: &str,
        to_column: &str,
    ) -> Self {
        Self(format!(
            "ref-{}.{}-{}.{}",
            escape_component(from_table),
            escape_component(from_column),
            escape_component(to_table),
            escape_component(to_column)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn escape_component(component: &str) -> String {
    let mut escaped = String::with_capacity(component.len());
    for c in component.chars() {
        if matches!(c, '\\' | '.' | '-') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

impl_display!(TableId, AreaId, ReferenceId);
