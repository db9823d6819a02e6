//! Per-field predicates and linear-scan filtering.
//!
//! Every entity carries a [`Query`]: an ordered table from a filterable field
//! name to a [`Predicate`] holding the stored value. Filtering evaluates the
//! caller's [`Criteria`] against that table.
use crate::Error;
use crate::identifier::Identifier;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Filter criteria, keyed by field name.
pub type Criteria = BTreeMap<String, Value>;

/// A value supplied by the caller of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Interprets raw request text: numbers and `true`/`false` become typed
    /// values, everything else stays text.
    pub fn parse(raw: &str) -> Self {
        if let Ok(bool) = raw.parse::<bool>() {
            return Self::Bool(bool);
        }

        if let Ok(int) = raw.parse::<i64>() {
            return Self::Int(int);
        }

        match raw.parse::<f64>() {
            Ok(float) => Self::Float(float),
            Err(_) => Self::String(raw.to_owned()),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(int) => Some(*int as f64),
            Self::Float(float) => Some(*float),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(bool) => write!(f, "{bool}"),
            Self::Int(int) => write!(f, "{int}"),
            Self::Float(float) => write!(f, "{float}"),
            Self::String(string) => f.write_str(string),
        }
    }
}

impl From<&str> for Value {
    fn from(string: &str) -> Self {
        Self::String(string.to_owned())
    }
}

impl From<i64> for Value {
    fn from(int: i64) -> Self {
        Self::Int(int)
    }
}

/// One element of a list-valued field.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Text(String),
    Identifier(Identifier),
}

impl Member {
    fn matches(&self, token: &str) -> bool {
        match self {
            Self::Text(text) => text == token,
            Self::Identifier(identifier) => {
                identifier.template == token || identifier.id.to_string() == token
            }
        }
    }
}

/// A stored value together with the way queries are matched against it.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Identifier(Identifier),
    QInt(i64),
    QFloat(f64),
    QList(Vec<Member>),
}

impl Predicate {
    pub fn texts(texts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::QList(texts.into_iter().map(|text| Member::Text(text.into())).collect())
    }

    pub fn identifiers<'a>(identifiers: impl IntoIterator<Item = &'a Identifier>) -> Self {
        Self::QList(
            identifiers
                .into_iter()
                .cloned()
                .map(Member::Identifier)
                .collect(),
        )
    }

    pub fn matches(&self, query: &Value) -> Result<bool, Error> {
        Ok(match self {
            Self::Int(stored) => query.as_f64() == Some(*stored as f64),
            Self::Float(stored) => query.as_f64() == Some(*stored),
            Self::String(stored) => matches!(query, Value::String(query) if query == stored),
            Self::Bool(stored) => matches!(query, Value::Bool(query) if query == stored),
            Self::Identifier(stored) => stored.matches(query),
            Self::QInt(stored) => quantified(query, *stored as f64)?,
            Self::QFloat(stored) => quantified(query, *stored)?,
            Self::QList(stored) => listed(&query.to_string(), stored)?,
        })
    }
}

fn quantified(query: &Value, stored: f64) -> Result<bool, Error> {
    let invalid = || Error::InvalidQueryArgument(query.to_string());

    match query {
        Value::Int(_) | Value::Float(_) => Ok(query.as_f64() == Some(stored)),
        Value::Bool(_) => Err(invalid()),
        Value::String(raw) => {
            let raw = raw.trim();

            if let Ok(number) = raw.parse::<f64>() {
                return Ok(number == stored);
            }

            if let Some(bound) = raw.strip_prefix('>') {
                let bound: f64 = bound.trim().parse().map_err(|_| invalid())?;
                return Ok(stored > bound);
            }

            if let Some(bound) = raw.strip_prefix('<') {
                let bound: f64 = bound.trim().parse().map_err(|_| invalid())?;
                return Ok(stored < bound);
            }

            Err(invalid())
        }
    }
}

fn listed(query: &str, stored: &[Member]) -> Result<bool, Error> {
    let contains = |token: &str| stored.iter().any(|member| member.matches(token));

    if let Some(complete) = query.strip_prefix(':') {
        let tokens: BTreeSet<&str> = complete.split([',', '|']).collect();

        let covered = stored
            .iter()
            .all(|member| tokens.iter().any(|token| member.matches(token)));

        return Ok(covered && tokens.iter().all(|token| contains(token)));
    }

    match (query.contains(','), query.contains('|')) {
        (true, true) => Err(Error::MixedListOperators(query.to_owned())),
        (true, false) => {
            let tokens: BTreeSet<&str> = query.split(',').collect();

            Ok(tokens.iter().all(|token| contains(token)))
        }
        (false, true) => Ok(query.split('|').any(contains)),
        (false, false) => Ok(contains(query)),
    }
}

/// The filterable fields of an entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query(BTreeMap<&'static str, Predicate>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &'static str, predicate: Predicate) -> Self {
        let _ = self.0.insert(field, predicate);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Predicate> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    /// Matches the criteria against this table.
    ///
    /// An `id` criterion is compared against `id` on its own and every other
    /// criterion is ignored. Fields missing from the table are ignored.
    pub fn compare(&self, id: u64, criteria: &Criteria) -> Result<bool, Error> {
        if let Some(query) = criteria.get("id") {
            let invalid = || Error::InvalidQueryArgument(query.to_string());

            let query = match query {
                Value::Int(int) => u64::try_from(*int).map_err(|_| invalid())?,
                Value::String(raw) => raw.trim().parse().map_err(|_| invalid())?,
                Value::Float(float) if float.fract() == 0.0 && *float >= 0.0 => *float as u64,
                _ => return Err(invalid()),
            };

            return Ok(query == id);
        }

        for (field, query) in criteria {
            let Some(predicate) = self.0.get(field.as_str()) else {
                continue;
            };

            if !predicate.matches(query)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// An entity that can be filtered.
pub trait Entity {
    fn id(&self) -> u64;

    fn query(&self) -> &Query;

    fn compare(&self, criteria: &Criteria) -> Result<bool, Error> {
        self.query().compare(self.id(), criteria)
    }
}

#[cfg(test)]
mod query_test {
    use assert_matches::assert_matches;

    use crate::Error;
    use crate::identifier::Identifier;
    use crate::query::{Criteria, Predicate, Query, Value};

    fn qlist(query: &str) -> Result<bool, Error> {
        Predicate::texts(["fire", "flying"]).matches(&Value::from(query))
    }

    fn criteria<const N: usize>(entries: [(&str, Value); N]) -> Criteria {
        entries
            .into_iter()
            .map(|(field, value)| (field.to_owned(), value))
            .collect()
    }

    #[test]
    fn qlist_complete_match_requires_every_member() {
        assert_matches!(qlist(":fire|flying"), Ok(true));
        assert_matches!(qlist(":flying,fire"), Ok(true));
        assert_matches!(qlist(":fire"), Ok(false));
        assert_matches!(qlist(":fire,flying,water"), Ok(false));
    }

    #[test]
    fn qlist_or_needs_one_token() {
        assert_matches!(qlist("fire|water"), Ok(true));
        assert_matches!(qlist("water|grass"), Ok(false));
    }

    #[test]
    fn qlist_and_needs_every_token() {
        assert_matches!(qlist("fire,flying"), Ok(true));
        assert_matches!(qlist("fire,flying,water"), Ok(false));
    }

    #[test]
    fn qlist_bare_token_is_membership() {
        assert_matches!(qlist("fire"), Ok(true));
        assert_matches!(qlist("fir"), Ok(false));
    }

    #[test]
    fn qlist_rejects_mixed_operators() {
        assert_matches!(qlist("fire,flying|water"), Err(Error::MixedListOperators(_)));
        assert_matches!(qlist(":fire,flying|water"), Ok(false));
    }

    #[test]
    fn qlist_matches_identifier_members_by_name_or_id() {
        let types = [
            Identifier::new(10, "POKEMON_TYPE_FIRE"),
            Identifier::new(3, "POKEMON_TYPE_FLYING"),
        ];
        let predicate = Predicate::identifiers(&types);

        assert_matches!(predicate.matches(&Value::from("POKEMON_TYPE_FIRE")), Ok(true));
        assert_matches!(predicate.matches(&Value::Int(3)), Ok(true));
        assert_matches!(predicate.matches(&Value::from(":10|POKEMON_TYPE_FLYING")), Ok(true));
        assert_matches!(predicate.matches(&Value::from(":10")), Ok(false));
    }

    #[test]
    fn qint_compares_ranges() {
        let predicate = Predicate::QInt(50);

        assert_matches!(predicate.matches(&Value::from(">40")), Ok(true));
        assert_matches!(predicate.matches(&Value::from("<40")), Ok(false));
        assert_matches!(predicate.matches(&Value::from("<60")), Ok(true));
        assert_matches!(predicate.matches(&Value::from("50")), Ok(true));
        assert_matches!(predicate.matches(&Value::Int(50)), Ok(true));
        assert_matches!(predicate.matches(&Value::Int(49)), Ok(false));
        assert_matches!(
            predicate.matches(&Value::from("abc")),
            Err(Error::InvalidQueryArgument(argument)) if argument == "abc"
        );
        assert_matches!(
            predicate.matches(&Value::from(">abc")),
            Err(Error::InvalidQueryArgument(_))
        );
    }

    #[test]
    fn qfloat_compares_ranges() {
        let predicate = Predicate::QFloat(0.125);

        assert_matches!(predicate.matches(&Value::from(">0.1")), Ok(true));
        assert_matches!(predicate.matches(&Value::Float(0.125)), Ok(true));
        assert_matches!(predicate.matches(&Value::from("<0.1")), Ok(false));
    }

    #[test]
    fn exact_predicates() {
        assert_matches!(Predicate::Bool(true).matches(&Value::Bool(true)), Ok(true));
        assert_matches!(Predicate::Bool(true).matches(&Value::from("true")), Ok(false));
        assert_matches!(Predicate::Int(3).matches(&Value::Float(3.0)), Ok(true));
        assert_matches!(Predicate::String("base".to_owned()).matches(&Value::from("base")), Ok(true));
    }

    #[test]
    fn compare_ignores_unknown_fields() {
        let query = Query::new()
            .with("shiny", Predicate::QInt(0))
            .with("deployable", Predicate::Bool(true));

        let matching = criteria([("deployable", Value::Bool(true))]);
        assert_matches!(query.compare(1, &matching), Ok(true));

        let mut with_unknown = matching.clone();
        let _ = with_unknown.insert("colour".to_owned(), Value::from("blue"));
        assert_matches!(query.compare(1, &with_unknown), Ok(true));

        let failing = criteria([("deployable", Value::Bool(false))]);
        assert_matches!(query.compare(1, &failing), Ok(false));
    }

    #[test]
    fn compare_id_bypasses_everything_else() {
        let query = Query::new().with("deployable", Predicate::Bool(true));

        let by_id = criteria([("id", Value::Int(15010)), ("deployable", Value::Bool(false))]);
        assert_matches!(query.compare(15010, &by_id), Ok(true));
        assert_matches!(query.compare(150, &by_id), Ok(false));

        let textual = criteria([("id", Value::from("150"))]);
        assert_matches!(query.compare(150, &textual), Ok(true));

        let invalid = criteria([("id", Value::from("mewtwo"))]);
        assert_matches!(query.compare(150, &invalid), Err(Error::InvalidQueryArgument(_)));
    }

    #[test]
    fn parses_request_values() {
        assert_eq!(Value::parse("25"), Value::Int(25));
        assert_eq!(Value::parse("2.5"), Value::Float(2.5));
        assert_eq!(Value::parse("true"), Value::Bool(true));
        assert_eq!(Value::parse(">40"), Value::from(">40"));
        assert_eq!(Value::parse("BULBASAUR"), Value::from("BULBASAUR"));
    }
}
