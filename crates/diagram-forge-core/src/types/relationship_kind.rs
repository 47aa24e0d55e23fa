use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Cardinality between the two endpoints of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    /// `>`
    ManyToOne,
    /// `<`
    OneToMany,
    /// `-`
    OneToOne,
    /// `<>`
    ManyToMany,
    /// `~`: cardinality not stated in the source.
    Inferred,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 5] = [
        Self::ManyToOne,
        Self::OneToMany,
        Self::OneToOne,
        Self::ManyToMany,
        Self::Inferred,
    ];

    /// The DSL operator for this kind.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::ManyToOne => ">",
            Self::OneToMany => "<",
            Self::OneToOne => "-",
            Self::ManyToMany => "<>",
            Self::Inferred => "~",
        }
    }
}

impl FromStr for RelationshipKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.symbol() == s)
            .ok_or_else(|| ModelError::InvalidRelationshipSymbol(s.to_string()))
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManyToOne => write!(f, "many-to-one"),
            Self::OneToMany => write!(f, "one-to-many"),
            Self::OneToOne => write!(f, "one-to-one"),
            Self::ManyToMany => write!(f, "many-to-many"),
            Self::Inferred => write!(f, "inferred"),
        }
    }
}
