use crate::Database;
use crate::gamemaster::{self, EvolutionBranch, PokemonSettings};
use crate::icon::{Icon, IconSet};
use crate::identifier::Identifier;
use crate::locale::{self, Language};
use crate::moves;
use crate::query::{Entity, Predicate, Query};

use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct Pokemon {
    pub id: u64,
    pub kind: Kind,
    pub pokemon: Identifier,
    pub form: Identifier,
    pub costume: Identifier,
    pub temp_evolution: Identifier,
    pub names: locale::Map,
    pub generation: u32,
    pub rarity: Identifier,
    pub base_stats: Option<Stats>,
    pub types: Vec<Identifier>,
    pub moves: Vec<moves::Summary>,
    pub elite_moves: Vec<moves::Summary>,
    pub info: Info,
    pub evolutions: Vec<Evolution>,
    pub temp_evolutions: Vec<TempEvolution>,
    pub assets: Vec<String>,
    pub(crate) asset_value: Option<String>,
    pub(crate) asset_suffix: Option<String>,
    pub(crate) has_female_asset: bool,
    pub(crate) evolution_branch: Vec<EvolutionBranch>,
    query: Query,
}

/// What a Pokémon entry is a variant of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    #[default]
    Base,
    Form,
    TempEvolution,
    Costume,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Form => "form",
            Self::TempEvolution => "temp_evolution",
            Self::Costume => "costume",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub attack: i64,
    pub defense: i64,
    pub stamina: i64,
}

impl From<gamemaster::Stats> for Stats {
    fn from(stats: gamemaster::Stats) -> Self {
        Self {
            attack: stats.base_attack,
            defense: stats.base_defense,
            stamina: stats.base_stamina,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Info {
    pub bonus_stardust: i64,
    pub bonus_candy: i64,
    pub bonus_xl: i64,
    pub deployable: bool,
    pub tradable: bool,
    pub transferable: bool,
    pub buddy_distance: f64,
    pub height: f64,
    pub weight: f64,
    pub gender_ratio: GenderRatio,
    pub third_move: ThirdMove,
    pub encounter: Encounter,
}

impl Info {
    pub fn new(settings: &PokemonSettings) -> Self {
        let encounter = &settings.encounter;

        Self {
            bonus_stardust: encounter.bonus_stardust_capture_reward,
            bonus_candy: encounter.bonus_candy_capture_reward,
            bonus_xl: encounter.bonus_xl_candy_capture_reward,
            deployable: settings.is_deployable,
            tradable: settings.is_tradable,
            transferable: settings.is_transferable,
            buddy_distance: settings.km_buddy_distance,
            height: settings.height_std_dev,
            weight: settings.weight_std_dev,
            gender_ratio: GenderRatio::default(),
            third_move: ThirdMove {
                candy: settings.third_move.candy_to_unlock,
                stardust: settings.third_move.stardust_to_unlock,
            },
            encounter: Encounter {
                base_capture_rate: encounter.base_capture_rate,
                flee_rate: encounter.base_flee_rate,
                attack: Attack {
                    duration: encounter.attack_timer,
                    probability: encounter.attack_probability,
                },
                dodge: Dodge {
                    duration: encounter.dodge_duration,
                    probability: encounter.dodge_probability,
                    distance: encounter.dodge_distance,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GenderRatio {
    pub male: f64,
    pub female: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ThirdMove {
    pub candy: i64,
    pub stardust: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Encounter {
    pub base_capture_rate: f64,
    pub flee_rate: f64,
    pub attack: Attack,
    pub dodge: Dodge,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Attack {
    pub duration: f64,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Dodge {
    pub duration: f64,
    pub probability: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evolution {
    pub into: Summary,
    pub candy: i64,
    pub quest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TempEvolution {
    pub into: Summary,
    pub energy_initial: i64,
    pub energy_subsequent: i64,
}

/// The identity of a Pokémon entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub id: u64,
    pub shiny: i64,
    pub pokemon_type: Kind,
    pub pokemon: Identifier,
    pub form: Identifier,
    pub costume: Identifier,
    pub temp_evolution: Identifier,
}

#[derive(Debug, Clone, Serialize)]
pub struct Details<'a> {
    #[serde(flatten)]
    pub summary: Summary,
    pub name: Option<&'a str>,
    pub generation: u32,
    pub rarity: &'a Identifier,
    pub types: &'a [Identifier],
    pub moves: &'a [moves::Summary],
    pub elite_moves: &'a [moves::Summary],
    pub evolutions: &'a [Evolution],
    pub temp_evolutions: &'a [TempEvolution],
    pub base_stats: Option<Stats>,
    pub max_cp: Option<i64>,
    pub assets: Vec<Icon>,
    pub info: &'a Info,
}

impl Pokemon {
    pub const MAX_LEVEL: f64 = 50.0;

    pub fn new(pokemon: Identifier) -> Self {
        let mut new = Self {
            id: 0,
            kind: Kind::Base,
            generation: generation(pokemon.id),
            pokemon,
            form: Identifier::default(),
            costume: Identifier::default(),
            temp_evolution: Identifier::default(),
            names: locale::Map::new(),
            rarity: Identifier::default(),
            base_stats: None,
            types: Vec::new(),
            moves: Vec::new(),
            elite_moves: Vec::new(),
            info: Info::default(),
            evolutions: Vec::new(),
            temp_evolutions: Vec::new(),
            assets: Vec::new(),
            asset_value: None,
            asset_suffix: None,
            has_female_asset: false,
            evolution_branch: Vec::new(),
            query: Query::new(),
        };

        new.refresh();
        new
    }

    /// Recomputes the composite id, the asset names and the query table.
    ///
    /// Must be called after changing any identity or filterable field.
    pub fn refresh(&mut self) {
        self.id = self.composite_id();
        self.assets = self.make_assets();
        self.query = self.make_query();
    }

    /// The non-zero identity ids concatenated in order species, form,
    /// costume and temporary evolution. `0` if the species is unknown.
    fn composite_id(&self) -> u64 {
        if !self.pokemon.is_set() {
            return 0;
        }

        let mut id = String::new();

        for part in [
            &self.pokemon,
            &self.form,
            &self.costume,
            &self.temp_evolution,
        ] {
            if part.id > 0 {
                let _ = write!(id, "{}", part.id);
            }
        }

        id.parse().unwrap_or_else(|_| {
            log::warn!("Composite id of {} does not fit: {id}", self.pokemon);
            0
        })
    }

    fn asset(&self, female: bool) -> String {
        let mut asset = String::from("pokemon_icon_");

        if let Some(suffix) = &self.asset_suffix {
            asset.push_str(suffix);
        } else {
            let _ = write!(asset, "{:03}_", self.pokemon.id);

            match &self.asset_value {
                Some(value) => asset.push_str(value),
                None => {
                    let _ = write!(asset, "0{}", u8::from(female));
                }
            }
        }

        if self.costume.is_set() {
            let _ = write!(asset, "_{:02}", self.costume.id);
        }

        asset
    }

    fn make_assets(&self) -> Vec<String> {
        let mut assets = vec![self.asset(false)];

        if self.has_female_asset {
            let female = self.asset(true);

            if female != assets[0] {
                assets.push(female);
            }
        }

        assets
    }

    fn make_query(&self) -> Query {
        let stats = self.base_stats.unwrap_or_default();
        let move_protos = |summaries: &[moves::Summary]| {
            Predicate::identifiers(summaries.iter().map(|summary| &summary.proto))
        };

        Query::new()
            .with("id", Predicate::Int(i64::try_from(self.id).unwrap_or(i64::MAX)))
            .with("pokemon", Predicate::Identifier(self.pokemon.clone()))
            .with("name", Predicate::texts(self.names.values().cloned()))
            .with("shiny", Predicate::QInt(0))
            .with("form", Predicate::Identifier(self.form.clone()))
            .with("costume", Predicate::Identifier(self.costume.clone()))
            .with("temp_evolution", Predicate::Identifier(self.temp_evolution.clone()))
            .with("assets", Predicate::texts(self.assets.iter().cloned()))
            .with("bonus_stardust", Predicate::QInt(self.info.bonus_stardust))
            .with("bonus_candy", Predicate::QInt(self.info.bonus_candy))
            .with("bonus_xl", Predicate::QInt(self.info.bonus_xl))
            .with("deployable", Predicate::Bool(self.info.deployable))
            .with("tradable", Predicate::Bool(self.info.tradable))
            .with("transferable", Predicate::Bool(self.info.transferable))
            .with("buddy_distance", Predicate::QFloat(self.info.buddy_distance))
            .with("weight", Predicate::QFloat(self.info.weight))
            .with("height", Predicate::QFloat(self.info.height))
            .with("male_ratio", Predicate::QFloat(self.info.gender_ratio.male))
            .with("female_ratio", Predicate::QFloat(self.info.gender_ratio.female))
            .with(
                "base_capture_rate",
                Predicate::QFloat(self.info.encounter.base_capture_rate),
            )
            .with("flee_rate", Predicate::QFloat(self.info.encounter.flee_rate))
            .with("pokemon_type", Predicate::String(self.kind.as_str().to_owned()))
            .with("generation", Predicate::QInt(i64::from(self.generation)))
            .with("rarity", Predicate::Identifier(self.rarity.clone()))
            .with("types", Predicate::identifiers(&self.types))
            .with("attack", Predicate::QInt(stats.attack))
            .with("defense", Predicate::QInt(stats.defense))
            .with("stamina", Predicate::QInt(stats.stamina))
            .with("moves", move_protos(&self.moves))
            .with("elite_moves", move_protos(&self.elite_moves))
    }

    /// The combat power at `level` with the given attack, defense and stamina
    /// IVs. `None` without base stats or for an unknown level.
    pub fn cp(&self, level: f64, ivs: [i64; 3]) -> Option<i64> {
        let stats = self.base_stats?;
        let multiplier = cp_multiplier(level)?;

        let attack = (stats.attack + ivs[0]) as f64;
        let defense = (stats.defense + ivs[1]) as f64;
        let stamina = (stats.stamina + ivs[2]) as f64;

        let cp = (attack * defense.sqrt() * stamina.sqrt() * multiplier.powi(2) / 10.0).floor();

        Some((cp as i64).max(10))
    }

    pub fn summary(&self) -> Summary {
        Summary {
            id: self.id,
            shiny: 0,
            pokemon_type: self.kind,
            pokemon: self.pokemon.clone(),
            form: self.form.clone(),
            costume: self.costume.clone(),
            temp_evolution: self.temp_evolution.clone(),
        }
    }

    pub fn details(&self, database: &Database, language: Language, iconset: IconSet) -> Details<'_> {
        Details {
            summary: self.summary(),
            name: self.names.localized(language).map(String::as_str),
            generation: self.generation,
            rarity: &self.rarity,
            types: &self.types,
            moves: &self.moves,
            elite_moves: &self.elite_moves,
            evolutions: &self.evolutions,
            temp_evolutions: &self.temp_evolutions,
            base_stats: self.base_stats,
            max_cp: self.cp(Self::MAX_LEVEL, [15, 15, 15]),
            assets: database.icons().pokemon(self, iconset),
            info: &self.info,
        }
    }

    /// The ordering of the published list.
    pub(crate) fn sort_key(&self) -> (i64, i64, i64, i64) {
        (
            self.pokemon.id,
            self.form.id,
            self.temp_evolution.id,
            self.costume.id,
        )
    }
}

impl Entity for Pokemon {
    fn id(&self) -> u64 {
        self.id
    }

    fn query(&self) -> &Query {
        &self.query
    }
}

/// The generation a species was introduced in, or `0` if unknown.
pub fn generation(species: i64) -> u32 {
    const LAST_OF_GENERATION: [i64; 9] = [151, 251, 386, 493, 649, 721, 809, 905, 1025];

    if species <= 0 {
        return 0;
    }

    LAST_OF_GENERATION
        .iter()
        .position(|last| species <= *last)
        .map_or(0, |generation| generation as u32 + 1)
}

/// The combat power multiplier of `level`, from 1 to 51 in half steps.
pub fn cp_multiplier(level: f64) -> Option<f64> {
    let steps = level * 2.0;

    if steps.fract() != 0.0 || !(2.0..=102.0).contains(&steps) {
        return None;
    }

    let index = level.floor() as usize - 1;
    let lower = CP_MULTIPLIERS[index];

    if level.fract() == 0.0 {
        return Some(lower);
    }

    let upper = *CP_MULTIPLIERS.get(index + 1)?;

    Some(((lower.powi(2) + upper.powi(2)) / 2.0).sqrt())
}

const CP_MULTIPLIERS: [f64; 51] = [
    0.094, 0.16639787, 0.21573247, 0.25572005, 0.29024988, 0.3210876, 0.34921268, 0.37523559,
    0.39956728, 0.42250001, 0.44310755, 0.46279839, 0.48168495, 0.49985844, 0.51739395,
    0.53435433, 0.55079269, 0.56675452, 0.58227891, 0.59740001, 0.61215729, 0.62656713,
    0.64065295, 0.65443563, 0.667934, 0.68116492, 0.69414365, 0.70688421, 0.71939909, 0.7317,
    0.73776948, 0.74378943, 0.74976104, 0.75568551, 0.76156384, 0.76739717, 0.7731865,
    0.77893275, 0.78463697, 0.79030001, 0.79530001, 0.8003, 0.8053, 0.81029999, 0.81529999,
    0.82029999, 0.82529999, 0.83029999, 0.83529999, 0.84029999, 0.84529999,
];
