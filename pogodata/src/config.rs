use crate::Error;
use crate::core::{IconSet, Language};

use serde::{Deserialize, Serialize};
use tokio::fs;

use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Where the data is fetched from and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub protos_url: String,
    pub gamemaster_url: String,
    /// URL templates of locale files. `{language}` is replaced by the
    /// language's file name. Later files override earlier ones.
    pub locale_urls: Vec<String>,
    pub languages: Vec<Language>,
    pub iconsets: Vec<IconSet>,
    pub retries: usize,
    /// Request timeout, in seconds.
    pub timeout: u64,
}

impl Config {
    pub const ENVIRONMENT_VARIABLE: &'static str = "POGODEX_CONFIG";

    pub fn path() -> PathBuf {
        env::var_os(Self::ENVIRONMENT_VARIABLE)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::config_dir()
                    .unwrap_or_default()
                    .join("pogodex")
                    .join("config.ron")
            })
    }

    /// Loads the configuration at `path`, or at [`Config::path`].
    ///
    /// A missing file yields the defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::path);

        match fs::read_to_string(&path).await {
            Ok(config) => {
                log::info!("Loading configuration: {}", path.display());
                Self::parse(&config)
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                log::info!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(error) => Err(error.into()),
        }
    }

    pub fn parse(config: &str) -> Result<Self, Error> {
        Ok(ron::from_str(config)?)
    }

    pub fn locale_urls(&self, language: Language) -> impl Iterator<Item = String> + '_ {
        self.locale_urls
            .iter()
            .map(move |template| template.replace("{language}", language.as_str()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protos_url:
                "https://raw.githubusercontent.com/Furtif/POGOProtos/master/base/vbase.proto"
                    .to_owned(),
            gamemaster_url:
                "https://raw.githubusercontent.com/PokeMiners/game_masters/master/latest/latest.json"
                    .to_owned(),
            locale_urls: vec![
                "https://raw.githubusercontent.com/PokeMiners/pogo_assets/master/Texts/Latest%20APK/{language}.txt".to_owned(),
                "https://raw.githubusercontent.com/PokeMiners/pogo_assets/master/Texts/Latest%20Remote/{language}.txt".to_owned(),
            ],
            languages: Language::ALL.to_vec(),
            iconsets: IconSet::ALL.to_vec(),
            retries: 2,
            timeout: 30,
        }
    }
}
