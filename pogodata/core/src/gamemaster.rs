//! The upstream template records and the settings the reconciler reads.
//!
//! Records are loosely typed upstream, so every field is optional or defaulted.
use crate::Error;
use crate::identifier::Reference;

use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// The full list of template records.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Gamemaster(Vec<Template>);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub template_id: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Gamemaster {
    pub fn new(templates: Vec<Template>) -> Self {
        Self(templates)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `settings` of every template whose id matches `pattern`.
    ///
    /// Templates without those settings, or whose settings do not have the
    /// expected shape, are skipped.
    pub fn settings<'a, T>(
        &'a self,
        pattern: &str,
        settings: &'a str,
    ) -> impl Iterator<Item = (&'a str, T)> + 'a
    where
        T: DeserializeOwned,
    {
        let pattern = match Regex::new(pattern) {
            Ok(pattern) => Some(pattern),
            Err(error) => {
                log::error!("Invalid template pattern: {error}");
                None
            }
        };

        self.0
            .iter()
            .filter(move |template| {
                pattern
                    .as_ref()
                    .is_some_and(|pattern| pattern.is_match(&template.template_id))
            })
            .filter_map(move |template| {
                let data = template.data.get(settings)?;

                match T::deserialize(data) {
                    Ok(settings) => Some((template.template_id.as_str(), settings)),
                    Err(error) => {
                        log::warn!("Skipping template {}: {error}", template.template_id);
                        None
                    }
                }
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PokemonSettings {
    pub pokemon_id: Option<Reference>,
    pub form: Option<Reference>,
    #[serde(rename = "type")]
    pub type_1: Option<Reference>,
    #[serde(rename = "type2")]
    pub type_2: Option<Reference>,
    pub stats: Option<Stats>,
    pub quick_moves: Vec<Reference>,
    pub cinematic_moves: Vec<Reference>,
    pub elite_quick_move: Vec<Reference>,
    pub elite_cinematic_move: Vec<Reference>,
    pub encounter: Encounter,
    pub is_deployable: bool,
    pub is_tradable: bool,
    pub is_transferable: bool,
    pub km_buddy_distance: f64,
    pub height_std_dev: f64,
    pub weight_std_dev: f64,
    pub third_move: ThirdMove,
    pub evolution_branch: Vec<EvolutionBranch>,
    pub temp_evo_overrides: Vec<TempEvoOverride>,
    pub pokemon_class: Option<Reference>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub base_attack: i64,
    pub base_defense: i64,
    pub base_stamina: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Encounter {
    pub base_capture_rate: f64,
    pub base_flee_rate: f64,
    #[serde(rename = "attackTimerS")]
    pub attack_timer: f64,
    pub attack_probability: f64,
    #[serde(rename = "dodgeDurationS")]
    pub dodge_duration: f64,
    pub dodge_probability: f64,
    pub dodge_distance: f64,
    pub bonus_stardust_capture_reward: i64,
    pub bonus_candy_capture_reward: i64,
    pub bonus_xl_candy_capture_reward: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThirdMove {
    pub stardust_to_unlock: i64,
    pub candy_to_unlock: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvolutionBranch {
    pub evolution: Option<Reference>,
    pub form: Option<Reference>,
    pub candy_cost: i64,
    pub temporary_evolution: Option<Reference>,
    pub temporary_evolution_energy_cost: i64,
    pub temporary_evolution_energy_cost_subsequent: i64,
    pub quest_display: Vec<QuestDisplay>,
}

impl EvolutionBranch {
    pub fn quest(&self) -> Option<&str> {
        self.quest_display
            .iter()
            .find_map(|quest| quest.quest_requirement_template_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestDisplay {
    pub quest_requirement_template_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TempEvoOverride {
    pub temp_evo_id: Option<Reference>,
    pub stats: Option<Stats>,
    #[serde(rename = "typeOverride1")]
    pub type_override_1: Option<Reference>,
    #[serde(rename = "typeOverride2")]
    pub type_override_2: Option<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoveSettings {
    pub movement_id: Option<Reference>,
    pub pokemon_type: Option<Reference>,
    pub power: f64,
    pub energy_delta: i64,
    pub duration_ms: i64,
    pub damage_window_start_ms: i64,
    pub damage_window_end_ms: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CombatMove {
    pub unique_id: Option<Reference>,
    #[serde(rename = "type")]
    pub type_: Option<Reference>,
    pub power: f64,
    pub energy_delta: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherAffinity {
    pub weather_condition: Option<Reference>,
    pub pokemon_type: Vec<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormSettings {
    pub pokemon: Option<Reference>,
    pub forms: Vec<Form>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Form {
    pub form: Option<Reference>,
    pub asset_bundle_value: Option<Reference>,
    pub asset_bundle_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemporaryEvolutionSettings {
    pub pokemon_id: Option<Reference>,
    pub temporary_evolutions: Vec<TemporaryEvolution>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemporaryEvolution {
    pub temporary_evolution_id: Option<Reference>,
    pub asset_bundle_value: Option<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenderSettings {
    pub pokemon: Option<Reference>,
    pub form: Option<Reference>,
    pub gender: Gender,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gender {
    pub male_percent: f64,
    pub female_percent: f64,
}
