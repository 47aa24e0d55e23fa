use std::fmt;

use mti::prelude::{MagicTypeIdExt, V7};
use serde::{Deserialize, Serialize};

/// Identifier of a whole diagram.
///
/// Callers may supply their own id (for instance one assigned by a storage
/// layer); otherwise a TypeID with prefix "diagram" is generated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagramId(String);

const PREFIX: &str = "diagram";

impl DiagramId {
    /// Generates a new random `DiagramId` using UUIDv7.
    pub fn new() -> Self {
        Self(PREFIX.create_type_id::<V7>().to_string())
    }

    /// Wraps a caller-supplied identifier verbatim.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DiagramId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
