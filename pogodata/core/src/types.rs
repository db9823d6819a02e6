use crate::icon::{Icon, IconSet};
use crate::identifier::Identifier;
use crate::locale::{self, Language};
use crate::query::{Entity, Predicate, Query};
use crate::Database;

use serde::Serialize;

/// A Pokémon type and its matchups.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    pub proto: Identifier,
    pub names: locale::Map,
    pub effective_against: Vec<Identifier>,
    pub weak_against: Vec<Identifier>,
    pub resists: Vec<Identifier>,
    pub resisted_by: Vec<Identifier>,
    query: Query,
}

impl Type {
    /// Creates a type, looking up its matchups among `types`.
    pub fn new(proto: Identifier, names: locale::Map, types: &[Identifier]) -> Self {
        let related = |ids: &[i64]| -> Vec<Identifier> {
            types
                .iter()
                .filter(|candidate| ids.contains(&candidate.id))
                .cloned()
                .collect()
        };

        let (super_effective, not_very_effective) = EFFECTIVENESS
            .iter()
            .find(|matchup| matchup.0 == proto.id)
            .map(|matchup| (matchup.1, matchup.2))
            .unwrap_or_default();

        let mut type_ = Self {
            effective_against: related(super_effective),
            weak_against: related(&attackers(proto.id, |matchup| matchup.1)),
            resists: related(&attackers(proto.id, |matchup| matchup.2)),
            resisted_by: related(not_very_effective),
            proto,
            names,
            query: Query::new(),
        };

        type_.make_query();
        type_
    }

    fn make_query(&mut self) {
        self.query = Query::new()
            .with("type", Predicate::Identifier(self.proto.clone()))
            .with("name", Predicate::texts(self.names.values().cloned()))
            .with("effective_against", Predicate::identifiers(&self.effective_against))
            .with("weak_against", Predicate::identifiers(&self.weak_against))
            .with("resists", Predicate::identifiers(&self.resists))
            .with("resisted_by", Predicate::identifiers(&self.resisted_by));
    }

    pub fn summary(&self) -> &Identifier {
        &self.proto
    }

    pub fn details(&self, database: &Database, language: Language, iconset: IconSet) -> Details<'_> {
        Details {
            proto: &self.proto,
            name: self.names.localized(language).map(String::as_str),
            assets: database.icons().r#type(self, iconset),
            effective_against: &self.effective_against,
            weak_against: &self.weak_against,
            resists: &self.resists,
            resisted_by: &self.resisted_by,
        }
    }
}

impl Entity for Type {
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
    pub effective_against: &'a [Identifier],
    pub weak_against: &'a [Identifier],
    pub resists: &'a [Identifier],
    pub resisted_by: &'a [Identifier],
}

const NORMAL: i64 = 1;
const FIGHTING: i64 = 2;
const FLYING: i64 = 3;
const POISON: i64 = 4;
const GROUND: i64 = 5;
const ROCK: i64 = 6;
const BUG: i64 = 7;
const GHOST: i64 = 8;
const STEEL: i64 = 9;
const FIRE: i64 = 10;
const WATER: i64 = 11;
const GRASS: i64 = 12;
const ELECTRIC: i64 = 13;
const PSYCHIC: i64 = 14;
const ICE: i64 = 15;
const DRAGON: i64 = 16;
const DARK: i64 = 17;
const FAIRY: i64 = 18;

/// The attacking types whose `chart` entry lists `defender`.
fn attackers(defender: i64, chart: impl Fn(&Matchup) -> &'static [i64]) -> Vec<i64> {
    EFFECTIVENESS
        .iter()
        .filter(|matchup| chart(matchup).contains(&defender))
        .map(|matchup| matchup.0)
        .collect()
}

/// Attacking type, the types it hits super effectively and the types that
/// resist it or are immune to it.
type Matchup = (i64, &'static [i64], &'static [i64]);

const EFFECTIVENESS: [Matchup; 18] = [
    (NORMAL, &[], &[ROCK, GHOST, STEEL]),
    (
        FIGHTING,
        &[NORMAL, ROCK, STEEL, ICE, DARK],
        &[FLYING, POISON, BUG, GHOST, PSYCHIC, FAIRY],
    ),
    (FLYING, &[FIGHTING, BUG, GRASS], &[ROCK, STEEL, ELECTRIC]),
    (POISON, &[GRASS, FAIRY], &[POISON, GROUND, ROCK, GHOST, STEEL]),
    (
        GROUND,
        &[POISON, ROCK, STEEL, FIRE, ELECTRIC],
        &[FLYING, BUG, GRASS],
    ),
    (ROCK, &[FLYING, BUG, FIRE, ICE], &[FIGHTING, GROUND, STEEL]),
    (
        BUG,
        &[GRASS, PSYCHIC, DARK],
        &[FIGHTING, FLYING, POISON, GHOST, STEEL, FIRE, FAIRY],
    ),
    (GHOST, &[GHOST, PSYCHIC], &[NORMAL, DARK]),
    (STEEL, &[ROCK, ICE, FAIRY], &[STEEL, FIRE, WATER, ELECTRIC]),
    (FIRE, &[BUG, STEEL, GRASS, ICE], &[ROCK, FIRE, WATER, DRAGON]),
    (WATER, &[GROUND, ROCK, FIRE], &[WATER, GRASS, DRAGON]),
    (
        GRASS,
        &[GROUND, ROCK, WATER],
        &[FLYING, POISON, BUG, STEEL, FIRE, GRASS, DRAGON],
    ),
    (ELECTRIC, &[FLYING, WATER], &[GROUND, GRASS, ELECTRIC, DRAGON]),
    (PSYCHIC, &[FIGHTING, POISON], &[STEEL, PSYCHIC, DARK]),
    (ICE, &[FLYING, GROUND, GRASS, DRAGON], &[STEEL, FIRE, WATER, ICE]),
    (DRAGON, &[DRAGON], &[STEEL, FAIRY]),
    (DARK, &[GHOST, PSYCHIC], &[FIGHTING, DARK, FAIRY]),
    (FAIRY, &[FIGHTING, DRAGON, DARK], &[POISON, STEEL, FIRE]),
];
