//! Icon-set conventions and asset lookup.
//!
//! Each [`IconSet`] lives in a GitHub repository. A [`Manifest`] lists the
//! files of that repository, so lookups are resolved by probing candidate
//! names against it instead of requesting them.
use crate::Error;
use crate::pokemon::{Kind, Pokemon};
use crate::types::Type;
use crate::weather::Weather;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum IconSet {
    #[default]
    Pogo,
    PogoOptimized,
    PogoOutline,
    Home,
    HomeOutline,
    Shuffle,
    SugimoriOptimized,
    DerpAfd,
    DerpFlork,
}

/// How the files of an icon set are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// The game's own asset layout.
    PokeMiners,
    /// `pokemon_icon_SSS_FF[_CC].png` files at the repository root.
    Pmsf,
}

impl IconSet {
    pub const ALL: &'static [Self] = &[
        Self::Pogo,
        Self::PogoOptimized,
        Self::PogoOutline,
        Self::Home,
        Self::HomeOutline,
        Self::Shuffle,
        Self::SugimoriOptimized,
        Self::DerpAfd,
        Self::DerpFlork,
    ];

    pub fn id(self) -> u32 {
        match self {
            Self::Pogo => 0,
            Self::PogoOptimized => 1,
            Self::PogoOutline => 2,
            Self::Home => 20,
            Self::HomeOutline => 21,
            Self::Shuffle => 30,
            Self::SugimoriOptimized => 40,
            Self::DerpAfd => 50,
            Self::DerpFlork => 51,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pogo => "POGO",
            Self::PogoOptimized => "POGO_OPTIMIZED",
            Self::PogoOutline => "POGO_OUTLINE",
            Self::Home => "HOME",
            Self::HomeOutline => "HOME_OUTLINE",
            Self::Shuffle => "SHUFFLE",
            Self::SugimoriOptimized => "SUGIMORI_OPTIMIZED",
            Self::DerpAfd => "DERP_AFD",
            Self::DerpFlork => "DERP_FLORK",
        }
    }

    /// The raw content URL every asset path is relative to.
    pub fn url(self) -> &'static str {
        match self {
            Self::Pogo => "https://raw.githubusercontent.com/PokeMiners/pogo_assets/master/",
            Self::PogoOptimized => {
                "https://raw.githubusercontent.com/whitewillem/PogoAssets/resized/no_border/"
            }
            Self::PogoOutline => {
                "https://raw.githubusercontent.com/whitewillem/PogoAssets/resized/icons_large/"
            }
            Self::Home => "https://raw.githubusercontent.com/nileplumb/PkmnHomeIcons/master/pmsf/",
            Self::HomeOutline => {
                "https://raw.githubusercontent.com/nileplumb/PkmnHomeIcons/master/pmsf_OS_128/"
            }
            Self::Shuffle => {
                "https://raw.githubusercontent.com/nileplumb/PkmnShuffleMap/master/PMSF_icons_large/"
            }
            Self::SugimoriOptimized => {
                "https://raw.githubusercontent.com/xxleevo/monicons/master/classic/"
            }
            Self::DerpAfd => "https://raw.githubusercontent.com/ccev/pogoafd/master/sprites/",
            Self::DerpFlork => "https://raw.githubusercontent.com/xxleevo/monicons/master/derpy/",
        }
    }

    pub fn convention(self) -> Convention {
        match self {
            Self::Pogo => Convention::PokeMiners,
            _ => Convention::Pmsf,
        }
    }

    pub(crate) fn options() -> String {
        Self::ALL
            .iter()
            .map(|iconset| format!("{} ({})", iconset.name(), iconset.id()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for IconSet {
    type Err = Error;

    fn from_str(iconset: &str) -> Result<Self, Self::Err> {
        let raw = iconset.trim();

        Self::ALL
            .iter()
            .copied()
            .find(|candidate| {
                candidate.name().eq_ignore_ascii_case(raw)
                    || raw.parse::<u32>().is_ok_and(|id| id == candidate.id())
            })
            .ok_or_else(|| Error::UnknownIconSet(iconset.to_owned()))
    }
}

impl TryFrom<String> for IconSet {
    type Error = Error;

    fn try_from(iconset: String) -> Result<Self, Self::Error> {
        iconset.parse()
    }
}

impl From<IconSet> for String {
    fn from(iconset: IconSet) -> Self {
        iconset.name().to_owned()
    }
}

impl fmt::Display for IconSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The file listing of an icon set repository.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    paths: Vec<String>,
    files: BTreeSet<String>,
}

impl Manifest {
    pub fn new(paths: impl IntoIterator<Item = String>) -> Self {
        let paths: Vec<String> = paths.into_iter().collect();
        let files = paths.iter().map(|path| basename(path).to_owned()).collect();

        Self { paths, files }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// File names without their directories, sorted.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    pub fn contains(&self, file: &str) -> bool {
        self.files.contains(file)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Icon {
    pub name: String,
    pub url: String,
    pub shiny: bool,
    pub female: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<bool>,
}

impl Icon {
    fn new(name: impl Into<String>, url: String) -> Self {
        Self {
            name: name.into(),
            url,
            shiny: false,
            female: false,
            day: None,
        }
    }
}

/// The manifests of every loaded icon set.
#[derive(Debug, Clone, Default)]
pub struct Icons {
    manifests: BTreeMap<IconSet, Manifest>,
}

impl Icons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, iconset: IconSet, manifest: Manifest) {
        log::debug!("Loaded manifest of {iconset} with {} files", manifest.len());

        let _ = self.manifests.insert(iconset, manifest);
    }

    pub fn manifest(&self, iconset: IconSet) -> Option<&Manifest> {
        self.manifests.get(&iconset)
    }

    pub fn pokemon(&self, pokemon: &Pokemon, iconset: IconSet) -> Vec<Icon> {
        let Some(manifest) = self.manifest(iconset) else {
            return Vec::new();
        };

        match iconset.convention() {
            Convention::PokeMiners => addressable(pokemon, iconset, manifest)
                .unwrap_or_else(|| precomputed(pokemon, iconset, manifest)),
            Convention::Pmsf => vec![pmsf(pokemon, iconset, manifest)],
        }
    }

    pub fn r#type(&self, type_: &Type, iconset: IconSet) -> Vec<Icon> {
        if iconset.convention() != Convention::PokeMiners {
            return Vec::new();
        }

        let template = type_.proto.template.to_lowercase();
        let name = template.strip_prefix("pokemon_type_").unwrap_or(&template);

        vec![Icon::new(
            name,
            format!("{}Images/Types/{name}.png", iconset.url()),
        )]
    }

    pub fn weather(&self, weather: &Weather, iconset: IconSet) -> Vec<Icon> {
        if iconset.convention() != Convention::PokeMiners {
            return Vec::new();
        }

        let icon = |name: &str, day: Option<bool>| {
            let name = format!("weatherIcon_small_{name}");
            let url = format!("{}Images/Weather/{name}.png", iconset.url());

            Icon {
                day,
                ..Icon::new(name, url)
            }
        };

        match weather.proto.id {
            1 => vec![
                icon("sunny", Some(true)),
                icon(&weather.proto.template.to_lowercase(), Some(false)),
            ],
            3 => vec![
                icon("partlycloudy_day", Some(true)),
                icon("partlycloudy_night", Some(false)),
            ],
            2 => vec![icon("rain", None)],
            4 => vec![icon("cloudy", None)],
            _ => vec![icon(&weather.proto.template.to_lowercase(), None)],
        }
    }
}

/// Probes the game's addressable assets, `pm<species>[.f<form>][.c<costume>].icon`.
fn addressable(pokemon: &Pokemon, iconset: IconSet, manifest: &Manifest) -> Option<Vec<Icon>> {
    let mut forms = Vec::new();

    if pokemon.kind == Kind::TempEvolution {
        let temp = &pokemon.temp_evolution.template;
        forms.push(format!(".f{}", temp.replace("TEMP_EVOLUTION_", "")));
    } else {
        let form = pokemon
            .form
            .template
            .replace(&pokemon.pokemon.template, "");
        let form = form.trim_matches('_');

        if !matches!(form, "" | "NORMAL" | "SHADOW" | "PURIFIED" | "UNSET") {
            forms.push(format!(".f{form}"));
        }
    }
    forms.push(String::new());

    let mut costumes = Vec::new();

    if pokemon.costume.is_set() {
        costumes.push(format!(".c{}", pokemon.costume.template));
    }
    costumes.push(String::new());

    let name = forms.iter().find_map(|form| {
        costumes.iter().find_map(|costume| {
            let name = format!("pm{}{form}{costume}.icon", pokemon.pokemon.id);

            manifest.contains(&format!("{name}.png")).then_some(name)
        })
    })?;

    let url = |name: &str| {
        format!(
            "{}Images/Pokemon/Addressable%20Assets/{name}.png",
            iconset.url()
        )
    };

    let mut icons = vec![Icon::new(name.as_str(), url(&name))];

    let female = name.replace(".icon", ".g2.icon");
    if manifest.contains(&format!("{female}.png")) {
        icons.push(Icon {
            female: true,
            ..Icon::new(female.as_str(), url(&female))
        });
    }

    for icon in icons.clone() {
        let shiny = icon.name.replace(".icon", ".s.icon");

        if manifest.contains(&format!("{shiny}.png")) {
            icons.push(Icon {
                shiny: true,
                female: icon.female,
                ..Icon::new(shiny.as_str(), url(&shiny))
            });
        }
    }

    Some(icons)
}

/// The asset names computed during reconciliation and their shiny variants,
/// kept only when present in the manifest.
fn precomputed(pokemon: &Pokemon, iconset: IconSet, manifest: &Manifest) -> Vec<Icon> {
    [false, true]
        .into_iter()
        .flat_map(|shiny| {
            pokemon
                .assets
                .iter()
                .enumerate()
                .map(move |(index, asset)| (shiny, index == 1, asset))
        })
        .filter_map(|(shiny, female, asset)| {
            let name = if shiny {
                format!("{asset}_shiny")
            } else {
                asset.clone()
            };

            if !manifest.contains(&format!("{name}.png")) {
                return None;
            }

            let url = format!("{}Images/Pokemon/{name}.png", iconset.url());

            Some(Icon {
                shiny,
                female,
                ..Icon::new(name, url)
            })
        })
        .collect()
}

fn pmsf(pokemon: &Pokemon, iconset: IconSet, manifest: &Manifest) -> Icon {
    const DEFAULT: &str = "pokemon_icon_000_00";

    let candidates = [pokemon.pokemon.id, 0].into_iter().flat_map(|species| {
        [pokemon.form.id, 0].into_iter().flat_map(move |form| {
            [pokemon.costume.id, 0].into_iter().map(move |costume| {
                let form = if form == 0 {
                    "_00".to_owned()
                } else {
                    format!("_{form}")
                };

                let costume = if costume > 0 {
                    format!("_{costume}")
                } else {
                    String::new()
                };

                format!("pokemon_icon_{species:03}{form}{costume}")
            })
        })
    });

    let name = candidates
        .into_iter()
        .find(|name| manifest.contains(&format!("{name}.png")))
        .unwrap_or_else(|| DEFAULT.to_owned());

    let url = format!("{}{name}.png", iconset.url());

    Icon::new(name, url)
}
