use crate::icon::IconSet;
use crate::locale::Language;

use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("invalid query argument: `{0}`")]
    InvalidQueryArgument(String),
    #[error("cannot mix and match | and , in qlists. Argument: `{0}`")]
    MixedListOperators(String),
    #[error(
        "unknown language `{0}`. Please use one of the following: {}",
        Language::options()
    )]
    UnknownLanguage(String),
    #[error(
        "unknown iconset `{0}`. Please use one of the following: {}",
        IconSet::options()
    )]
    UnknownIconSet(String),
    #[error("move not found: {0}")]
    MissingMove(String),
    #[error("invalid gamemaster: {0}")]
    InvalidGamemaster(Arc<serde_json::Error>),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidGamemaster(Arc::new(error))
    }
}
