mod database;
mod error;
mod map;

pub mod gamemaster;
pub mod icon;
pub mod identifier;
pub mod locale;
pub mod moves;
pub mod pokemon;
pub mod proto;
pub mod query;
pub mod types;
pub mod weather;

pub use database::{Database, Sources};
pub use error::Error;
pub use gamemaster::Gamemaster;
pub use icon::{IconSet, Icons, Manifest};
pub use identifier::Identifier;
pub use locale::{Language, Locales};
pub use map::Map;
pub use moves::Move;
pub use pokemon::Pokemon;
pub use proto::Schema;
pub use query::{Criteria, Entity, Query, Value};
pub use types::Type;
pub use weather::Weather;
