pub use pogodata_core as core;

pub mod config;
pub mod session;

mod data;
mod error;

pub use crate::core::{
    Criteria, Database, Entity, IconSet, Icons, Identifier, Language, Locales, Manifest, Move,
    Pokemon, Type, Value, Weather,
};
pub use config::Config;
pub use data::PogoData;
pub use error::{Error, Result};
pub use session::Session;
