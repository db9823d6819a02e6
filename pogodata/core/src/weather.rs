use crate::icon::{Icon, IconSet};
use crate::identifier::Identifier;
use crate::locale::{self, Language};
use crate::query::{Entity, Predicate, Query};
use crate::Database;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub proto: Identifier,
    pub names: locale::Map,
    pub boosts: Vec<Identifier>,
    query: Query,
}

impl Weather {
    pub fn new(proto: Identifier, names: locale::Map, boosts: Vec<Identifier>) -> Self {
        let query = Query::new()
            .with("weather", Predicate::Identifier(proto.clone()))
            .with("name", Predicate::texts(names.values().cloned()))
            .with("boosts", Predicate::identifiers(&boosts));

        Self {
            proto,
            names,
            boosts,
            query,
        }
    }

    pub fn summary(&self) -> &Identifier {
        &self.proto
    }

    pub fn details(&self, database: &Database, language: Language, iconset: IconSet) -> Details<'_> {
        Details {
            proto: &self.proto,
            name: self.names.localized(language).map(String::as_str),
            assets: database.icons().weather(self, iconset),
            boosts: &self.boosts,
        }
    }
}

impl Entity for Weather {
    fn id(&self) -> u64 {
        u64::try_from(self.proto.id).unwrap_or_default()
    }

    fn query(&self) -> &Query {
        &self.query
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Details<'a> {
    #[serde(flatten)]
    pub proto: &'a Identifier,
    pub name: Option<&'a str>,
    pub assets: Vec<Icon>,
    pub boosts: &'a [Identifier],
}
