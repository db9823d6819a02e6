use crate::query::Value;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric id paired with its symbolic template name.
///
/// An id of `0` is the "does not exist" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub id: i64,
    #[serde(rename = "template_name")]
    pub template: String,
}

impl Identifier {
    pub const UNSET: &'static str = "UNSET";

    pub fn new(id: i64, template: impl Into<String>) -> Self {
        Self {
            id,
            template: template.into(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.id != 0
    }

    pub fn matches(&self, query: &Value) -> bool {
        let by_id = match query {
            Value::Int(id) => *id == self.id,
            Value::Float(id) => *id == self.id as f64,
            _ => false,
        };

        by_id || query.to_string() == self.template
    }

    pub fn is(&self, reference: &Reference) -> bool {
        match reference {
            Reference::Id(id) => *id == self.id,
            Reference::Name(name) => *name == self.template,
        }
    }
}

impl Default for Identifier {
    fn default() -> Self {
        Self::new(0, Self::UNSET)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.template)
    }
}

/// A raw enum-valued field of a template record.
///
/// Upstream data uses either the numeric value or the symbolic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Id(i64),
    Name(String),
}

impl Reference {
    /// The textual key used to join records referring to the same entity.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<&Reference> for Value {
    fn from(reference: &Reference) -> Self {
        match reference {
            Reference::Id(id) => Value::Int(*id),
            Reference::Name(name) => Value::String(name.clone()),
        }
    }
}
