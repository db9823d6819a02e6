//! Turns command-line queries into JSON responses.
use pogodata::{Criteria, Database, IconSet, Language, Value};

use serde::Serialize;

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Pokemon,
    Types,
    Moves,
    Weather,
}

impl Endpoint {
    pub const ALL: &'static [Self] = &[Self::Pokemon, Self::Types, Self::Moves, Self::Weather];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pokemon => "pokemon",
            Self::Types => "types",
            Self::Moves => "moves",
            Self::Weather => "weather",
        }
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(endpoint: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str() == endpoint)
            .ok_or_else(|| Error::UnknownEndpoint(endpoint.to_owned()))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "unknown endpoint `{0}`. Please use one of the following: {}",
        Endpoint::ALL.iter().map(|endpoint| endpoint.as_str()).collect::<Vec<_>>().join(", ")
    )]
    UnknownEndpoint(String),
    #[error("invalid argument `{0}`, expected key=value")]
    InvalidArgument(String),
    #[error("invalid body: {0}")]
    InvalidBody(serde_json::Error),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Query(#[from] pogodata::core::Error),
}

/// A query against one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub endpoint: Endpoint,
    pub criteria: Criteria,
    pub language: Language,
    pub iconset: IconSet,
}

impl Request {
    /// Builds a request out of `key=value` arguments and an optional JSON
    /// object. Keys of the body override the arguments.
    pub fn parse<'a>(
        endpoint: &str,
        arguments: impl IntoIterator<Item = &'a str>,
        body: Option<&str>,
    ) -> Result<Self, Error> {
        let endpoint = endpoint.parse()?;
        let mut criteria = Criteria::new();

        for argument in arguments {
            let (key, value) = argument
                .split_once('=')
                .ok_or_else(|| Error::InvalidArgument(argument.to_owned()))?;

            let _ = criteria.insert(key.to_owned(), Value::parse(value));
        }

        if let Some(body) = body {
            let body: Criteria = serde_json::from_str(body).map_err(Error::InvalidBody)?;
            criteria.extend(body);
        }

        let language = Language::select(
            criteria
                .remove("language")
                .map(|language| language.to_string())
                .as_deref(),
        )?;

        let iconset = criteria
            .remove("iconset")
            .map(|iconset| iconset.to_string().parse::<IconSet>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            endpoint,
            criteria,
            language,
            iconset,
        })
    }

    /// Runs the request and returns the details of every match.
    pub fn run(&self, database: &Database) -> Result<serde_json::Value, Error> {
        let Self {
            criteria,
            language,
            iconset,
            ..
        } = self;

        match self.endpoint {
            Endpoint::Pokemon => details(
                database.get_pokemon(criteria)?,
                |pokemon| pokemon.details(database, *language, *iconset),
            ),
            Endpoint::Types => details(database.get_types(criteria)?, |type_| {
                type_.details(database, *language, *iconset)
            }),
            Endpoint::Moves => details(database.get_moves(criteria)?, |move_| {
                move_.details(*language)
            }),
            Endpoint::Weather => details(database.get_weather(criteria)?, |weather| {
                weather.details(database, *language, *iconset)
            }),
        }
    }
}

fn details<'a, T, D: Serialize>(
    entities: Vec<&'a T>,
    view: impl Fn(&'a T) -> D,
) -> Result<serde_json::Value, Error> {
    let views: Vec<D> = entities.into_iter().map(view).collect();

    Ok(serde_json::to_value(views)?)
}

/// Parses and runs a request. Failures are reported as `{"error": ...}`.
pub fn respond<'a>(
    database: &Database,
    endpoint: &str,
    arguments: impl IntoIterator<Item = &'a str>,
    body: Option<&str>,
) -> serde_json::Value {
    Request::parse(endpoint, arguments, body)
        .and_then(|request| request.run(database))
        .unwrap_or_else(failure)
}

pub fn failure(error: impl fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": error.to_string() })
}
