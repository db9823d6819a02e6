use crate::Error;

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A language the game ships text resources for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    English,
    BrazilianPortuguese,
    ChineseTraditional,
    French,
    German,
    Italian,
    Japanese,
    Korean,
    Russian,
    Spanish,
    Thai,
}

impl Language {
    pub const ALL: &'static [Self] = &[
        Self::English,
        Self::BrazilianPortuguese,
        Self::ChineseTraditional,
        Self::French,
        Self::German,
        Self::Italian,
        Self::Japanese,
        Self::Korean,
        Self::Russian,
        Self::Spanish,
        Self::Thai,
    ];

    /// The canonical value, which is also the name of the upstream text file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::BrazilianPortuguese => "BrazilianPortuguese",
            Self::ChineseTraditional => "ChineseTraditional",
            Self::French => "French",
            Self::German => "German",
            Self::Italian => "Italian",
            Self::Japanese => "Japanese",
            Self::Korean => "Korean",
            Self::Russian => "Russian",
            Self::Spanish => "Spanish",
            Self::Thai => "Thai",
        }
    }

    pub(crate) fn options() -> String {
        Self::ALL
            .iter()
            .map(|language| language.as_str().to_lowercase())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parses an optional language selector. `None` means English.
    pub fn select(language: Option<&str>) -> Result<Self, Error> {
        language.map_or(Ok(Self::English), |language| language.parse())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(language: &str) -> Result<Self, Self::Err> {
        Ok(match language.trim().to_lowercase().as_str() {
            "english" | "en" => Self::English,
            "brazilianportuguese" | "brazilian" | "portuguese" | "ptbr" | "pt-br" => {
                Self::BrazilianPortuguese
            }
            "chinesetraditional" | "chinese" | "zh" | "ch" => Self::ChineseTraditional,
            "french" | "fr" => Self::French,
            "german" | "de" => Self::German,
            "italian" | "it" => Self::Italian,
            "japanese" | "ja" | "jp" => Self::Japanese,
            "korean" | "ko" => Self::Korean,
            "russian" | "ru" => Self::Russian,
            "spanish" | "es" => Self::Spanish,
            "thai" | "th" => Self::Thai,
            _ => return Err(Error::UnknownLanguage(language.to_owned())),
        })
    }
}

impl TryFrom<String> for Language {
    type Error = Error;

    fn try_from(language: String) -> Result<Self, Self::Error> {
        language.parse()
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.as_str().to_owned()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Localized values keyed by language.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Map<T = String>(BTreeMap<Language, T>);

impl<T> Map<T> {
    pub fn new() -> Self
    where
        T: Default,
    {
        Self::default()
    }

    pub fn insert(&mut self, language: Language, value: T) -> Option<T> {
        self.0.insert(language, value)
    }

    pub fn get(&self, language: Language) -> Option<&T> {
        self.0.get(&language)
    }

    /// The value for `language`, or the English one.
    pub fn localized(&self, language: Language) -> Option<&T> {
        self.get(language).or_else(|| self.get(Language::English))
    }

    pub fn has_english(&self) -> bool {
        self.0.contains_key(&Language::English)
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.0.keys().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.values()
    }

    pub fn as_str(&self) -> &str
    where
        T: AsRef<str>,
    {
        self.get(Language::English)
            .or_else(|| self.0.values().next())
            .map(AsRef::as_ref)
            .unwrap_or("Unknown")
    }
}

impl<T> FromIterator<(Language, T)> for Map<T> {
    fn from_iter<I: IntoIterator<Item = (Language, T)>>(iter: I) -> Self {
        Self(BTreeMap::from_iter(iter))
    }
}

/// The text resources of every loaded language.
#[derive(Debug, Clone, Default)]
pub struct Locales {
    languages: BTreeMap<Language, BTreeMap<String, String>>,
}

impl Locales {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a text resource file into `language`. Keys already present are
    /// overridden.
    pub fn extend(&mut self, language: Language, text: &str) {
        let resources = self.languages.entry(language).or_default();
        let mut key = None;

        for line in text.lines() {
            let line = line.trim_end_matches('\r');

            if let Some(resource) = line.strip_prefix("RESOURCE ID: ") {
                key = Some(resource.trim().to_lowercase());
            } else if let Some(value) = line.strip_prefix("TEXT: ") {
                if let Some(key) = key.take() {
                    let _ = resources.insert(key, value.to_owned());
                }
            }
        }

        log::debug!("Loaded {} text resources for {language}", resources.len());
    }

    pub fn len(&self, language: Language) -> usize {
        self.languages.get(&language).map_or(0, BTreeMap::len)
    }

    /// The text of `key` in `language`, falling back to English.
    pub fn get(&self, key: &str, language: Language) -> Option<&str> {
        let key = key.to_lowercase();

        self.resource(&key, language)
            .or_else(|| self.resource(&key, Language::English))
    }

    /// Like [`Locales::get`], but unknown languages fall back to English.
    pub fn lookup(&self, key: &str, language: &str) -> Option<&str> {
        self.get(key, language.parse().unwrap_or(Language::English))
    }

    /// The text of `key` in every supported language.
    pub fn get_all(&self, key: &str) -> Map {
        Language::ALL
            .iter()
            .filter_map(|&language| Some((language, self.get(key, language)?.to_owned())))
            .collect()
    }

    fn resource(&self, key: &str, language: Language) -> Option<&str> {
        self.languages.get(&language)?.get(key).map(String::as_str)
    }
}
