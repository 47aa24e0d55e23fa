use std::fmt;

use serde::{Deserialize, Serialize};

/// A column of a table, or a common column shared by an area.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub column_type: String,
    /// Raw text between the type's parentheses, e.g. `"100"` or `"10,2"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_params: Option<String>,
    #[serde(default)]
    pub pk: bool,
    #[serde(default)]
    pub fk: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub increment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl Column {
    /// Creates a column with no constraints.
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            ..Self::default()
        }
    }

    /// Builder-style setter for the raw type parameters.
    pub fn with_type_params(mut self, params: impl Into<String>) -> Self {
        self.type_params = Some(params.into());
        self
    }

    /// The type as written in the DSL, including parameters: `varchar(100)`.
    pub fn full_type(&self) -> String {
        match &self.type_params {
            Some(params) => format!("{}({params})", self.column_type),
            None => self.column_type.clone(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.full_type())?;
        let flags: Vec<&str> = [
            (self.pk, "pk"),
            (self.fk, "fk"),
            (self.unique, "unique"),
            (self.not_null, "not null"),
            (self.increment, "increment"),
        ]
        .into_iter()
        .filter_map(|(set, label)| set.then_some(label))
        .collect();
        if !flags.is_empty() {
            write!(f, " [{}]", flags.join(", "))?;
        }
        Ok(())
    }
}
