use crate::identifier::Identifier;
use crate::locale::{self, Language};
use crate::query::{Entity, Predicate, Query};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub proto: Identifier,
    /// The raw template key the move was joined under.
    pub key: String,
    pub names: locale::Map,
    pub type_: Identifier,
    pub pve: Pve,
    pub pvp: Pvp,
    query: Query,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pve {
    pub power: f64,
    pub energy_delta: i64,
    pub duration: i64,
    pub window: Window,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Window {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Pvp {
    pub power: f64,
    pub energy_delta: i64,
}

impl Move {
    pub fn new(
        proto: Identifier,
        key: String,
        names: locale::Map,
        type_: Identifier,
        pve: Pve,
        pvp: Pvp,
    ) -> Self {
        let query = Query::new()
            .with("move", Predicate::Identifier(proto.clone()))
            .with("name", Predicate::texts(names.values().cloned()))
            .with("type", Predicate::Identifier(type_.clone()))
            .with("pve_power", Predicate::QFloat(pve.power))
            .with("pve_energy_delta", Predicate::QInt(pve.energy_delta))
            .with("pve_duration", Predicate::QInt(pve.duration))
            .with("pve_window_start", Predicate::QInt(pve.window.start))
            .with("pve_window_end", Predicate::QInt(pve.window.end))
            .with("pvp_power", Predicate::QFloat(pvp.power))
            .with("pvp_energy_delta", Predicate::QInt(pvp.energy_delta));

        Self {
            proto,
            key,
            names,
            type_,
            pve,
            pvp,
            query,
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            proto: self.proto.clone(),
            type_: self.type_.clone(),
        }
    }

    pub fn details(&self, language: Language) -> Details<'_> {
        Details {
            summary: self.summary(),
            name: self.names.localized(language).map(String::as_str),
            pve: self.pve,
            pvp: self.pvp,
        }
    }
}

impl Entity for Move {
    fn id(&self) -> u64 {
        u64::try_from(self.proto.id).unwrap_or_default()
    }

    fn query(&self) -> &Query {
        &self.query
    }
}

/// A move as referenced by other entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    #[serde(flatten)]
    pub proto: Identifier,
    #[serde(rename = "type")]
    pub type_: Identifier,
}

#[derive(Debug, Clone, Serialize)]
pub struct Details<'a> {
    #[serde(flatten)]
    pub summary: Summary,
    pub name: Option<&'a str>,
    pub pve: Pve,
    pub pvp: Pvp,
}
