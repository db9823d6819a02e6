use crate::gamemaster::{
    CombatMove, FormSettings, Gamemaster, GenderSettings, MoveSettings, PokemonSettings,
    TemporaryEvolutionSettings, WeatherAffinity,
};
use crate::icon::{IconSet, Icons};
use crate::identifier::{Identifier, Reference};
use crate::locale::Locales;
use crate::moves::{self, Move, Pve, Pvp, Window};
use crate::pokemon::{self, Evolution, Kind, Pokemon, TempEvolution};
use crate::proto::{Enumeration, Schema};
use crate::query::Criteria;
use crate::{Error, Map, Type, Weather};

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, LazyLock};

/// The raw inputs of a single load.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub schema: Schema,
    pub gamemaster: Gamemaster,
    pub locales: Locales,
    pub icons: Icons,
}

/// An immutable snapshot of every reconciled entity.
#[derive(Debug, Clone)]
pub struct Database {
    pub pokemon: Map<u64, Pokemon>,
    pub types: Map<String, Type>,
    pub moves: Map<String, Move>,
    pub weather: Map<String, Weather>,
    locales: Arc<Locales>,
    icons: Arc<Icons>,
}

impl Database {
    /// Builds the entity graph out of the raw sources.
    ///
    /// Fails if a Pokémon references a move that does not exist. Every other
    /// dangling reference is skipped.
    pub fn reconcile(sources: Sources) -> Result<Self, Error> {
        let Sources {
            mut schema,
            gamemaster,
            locales,
            icons,
        } = sources;

        log::info!("Reconciling {} templates", gamemaster.len());

        let enums = Enums::resolve(&mut schema);

        let types = make_types(&enums, &locales);
        log::info!("Prepared {} types", types.len());

        let weather = make_weather(&gamemaster, &enums, &locales, &types);
        log::info!("Prepared {} weather conditions", weather.len());

        let moves = make_moves(&gamemaster, &enums, &locales, &types);
        log::info!("Prepared {} moves", moves.len());

        let mut pokemon = make_pokemon(&gamemaster, &enums, &locales, &types, &moves)?;
        log::info!("Prepared {} base Pokémon", pokemon.len());

        add_forms(&mut pokemon, &gamemaster, &enums);
        apply_temp_evolution_assets(&mut pokemon, &gamemaster);
        link_evolutions(&mut pokemon);

        if let Some(manifest) = icons.manifest(IconSet::Pogo) {
            let files: Vec<&str> = manifest.files().collect();

            mark_female_assets(&mut pokemon, &files);
            add_costumes(&mut pokemon, &files, &enums.costumes);
        } else {
            log::warn!("No {} manifest loaded, skipping female and costume assets", IconSet::Pogo);
        }

        pokemon.sort_by_key(Pokemon::sort_key);
        remove_duplicates(&mut pokemon);
        log::info!("Reconciled {} Pokémon", pokemon.len());

        Ok(Self {
            pokemon: Map::new(pokemon, |pokemon| pokemon.id),
            types: Map::new(types, |type_| type_.proto.template.clone()),
            moves: Map::new(moves.values, |move_| move_.key.clone()),
            weather: Map::new(weather, |weather| weather.proto.template.clone()),
            locales: Arc::new(locales),
            icons: Arc::new(icons),
        })
    }

    pub fn get_pokemon(&self, criteria: &Criteria) -> Result<Vec<&Pokemon>, Error> {
        self.pokemon.filter(criteria)
    }

    pub fn get_types(&self, criteria: &Criteria) -> Result<Vec<&Type>, Error> {
        self.types.filter(criteria)
    }

    pub fn get_moves(&self, criteria: &Criteria) -> Result<Vec<&Move>, Error> {
        self.moves.filter(criteria)
    }

    pub fn get_weather(&self, criteria: &Criteria) -> Result<Vec<&Weather>, Error> {
        self.weather.filter(criteria)
    }

    pub fn locales(&self) -> &Locales {
        &self.locales
    }

    pub fn icons(&self) -> &Icons {
        &self.icons
    }
}

struct Enums {
    forms: Arc<Enumeration>,
    temp_evolutions: Arc<Enumeration>,
    species: Arc<Enumeration>,
    costumes: Arc<Enumeration>,
    classes: Arc<Enumeration>,
    types: Arc<Enumeration>,
    moves: Arc<Enumeration>,
    weather: Arc<Enumeration>,
}

impl Enums {
    fn resolve(schema: &mut Schema) -> Self {
        Self {
            forms: schema.enumeration("Form", None, None),
            temp_evolutions: schema.enumeration("HoloTemporaryEvolutionId", None, None),
            species: schema.enumeration("HoloPokemonId", None, None),
            costumes: schema.enumeration("Costume", None, None),
            classes: schema.enumeration("HoloPokemonClass", None, None),
            types: schema.enumeration("HoloPokemonType", None, None),
            moves: schema.enumeration("HoloPokemonMove", None, None),
            weather: schema.enumeration("WeatherCondition", None, None),
        }
    }
}

fn make_types(enums: &Enums, locales: &Locales) -> Vec<Type> {
    let members: Vec<Identifier> = enums.types.members().filter(Identifier::is_set).collect();

    members
        .iter()
        .map(|proto| Type::new(proto.clone(), locales.get_all(&proto.template), &members))
        .collect()
}

fn find_type(types: &[Type], reference: &Reference) -> Option<Identifier> {
    let found = types
        .iter()
        .find(|type_| type_.proto.is(reference))
        .map(|type_| type_.proto.clone());

    if found.is_none() {
        log::warn!("Type {reference} not found");
    }

    found
}

fn make_weather(
    gamemaster: &Gamemaster,
    enums: &Enums,
    locales: &Locales,
    types: &[Type],
) -> Vec<Weather> {
    let affinities =
        gamemaster.settings::<WeatherAffinity>(r"^WEATHER_AFFINITY_", "weatherAffinities");

    let mut weather = Vec::new();

    for (template, affinity) in affinities {
        let Some(proto) = affinity
            .weather_condition
            .as_ref()
            .and_then(|condition| enums.weather.try_resolve(condition))
        else {
            log::warn!("Skipping {template}: unknown weather condition");
            continue;
        };

        let names = locales.get_all(&format!("weather_{}", proto.template));
        let boosts = affinity
            .pokemon_type
            .iter()
            .filter_map(|reference| find_type(types, reference))
            .collect();

        weather.push(Weather::new(proto, names, boosts));
    }

    weather
}

/// Moves in template order, looked up by their raw key.
struct Moves {
    values: Vec<Move>,
    by_key: BTreeMap<String, usize>,
}

impl Moves {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn summary(&self, reference: &Reference) -> Result<moves::Summary, Error> {
        let found = match self.by_key.get(&reference.key()) {
            Some(index) => self.values.get(*index),
            None => self.values.iter().find(|move_| move_.proto.is(reference)),
        };

        found
            .map(Move::summary)
            .ok_or_else(|| Error::MissingMove(reference.to_string()))
    }

    fn summaries<'a>(
        &self,
        references: impl IntoIterator<Item = &'a Reference>,
    ) -> Result<Vec<moves::Summary>, Error> {
        references
            .into_iter()
            .map(|reference| self.summary(reference))
            .collect()
    }
}

fn make_moves(gamemaster: &Gamemaster, enums: &Enums, locales: &Locales, types: &[Type]) -> Moves {
    let combat: BTreeMap<String, CombatMove> = gamemaster
        .settings::<CombatMove>(r"^COMBAT_V\d{4}_MOVE_", "combatMove")
        .filter_map(|(_, combat)| Some((combat.unique_id.as_ref()?.key(), combat)))
        .collect();

    let mut values = Vec::new();
    let mut by_key = BTreeMap::new();

    for (template, settings) in gamemaster.settings::<MoveSettings>(r"^V\d{4}_MOVE_", "moveSettings") {
        let Some(movement) = &settings.movement_id else {
            log::debug!("Skipping {template}: no movement id");
            continue;
        };

        let key = movement.key();
        let combat = combat.get(&key);
        let proto = enums.moves.resolve(movement);

        let type_ = settings
            .pokemon_type
            .as_ref()
            .or_else(|| combat.and_then(|combat| combat.type_.as_ref()))
            .and_then(|reference| find_type(types, reference))
            .unwrap_or_default();

        let pve = Pve {
            power: settings.power,
            energy_delta: settings.energy_delta,
            duration: settings.duration_ms,
            window: Window {
                start: settings.damage_window_start_ms,
                end: settings.damage_window_end_ms,
            },
        };

        let pvp = combat
            .map(|combat| Pvp {
                power: combat.power,
                energy_delta: combat.energy_delta,
            })
            .unwrap_or_default();

        let names = locales.get_all(&format!("move_name_{:04}", proto.id));

        let _ = by_key.insert(key.clone(), values.len());
        values.push(Move::new(proto, key, names, type_, pve, pvp));
    }

    Moves { values, by_key }
}

fn make_pokemon(
    gamemaster: &Gamemaster,
    enums: &Enums,
    locales: &Locales,
    types: &[Type],
    moves: &Moves,
) -> Result<Vec<Pokemon>, Error> {
    let genders = gender_ratios(gamemaster);
    let resolve_types = |references: [Option<&Reference>; 2]| -> Vec<Identifier> {
        references
            .into_iter()
            .flatten()
            .filter_map(|reference| find_type(types, reference))
            .collect()
    };

    let mut list = Vec::new();

    for (template, settings) in
        gamemaster.settings::<PokemonSettings>(r"^V\d{4}_POKEMON_", "pokemonSettings")
    {
        if settings.form.is_none() && settings.pokemon_id.is_none() {
            log::debug!("Skipping {template}: neither form nor species");
            continue;
        }

        let species = enums.species.resolve_optional(settings.pokemon_id.as_ref());

        if !species.is_set() {
            log::warn!("Skipping {template}: unknown species");
            continue;
        }

        let names_key = format!("pokemon_name_{:04}", species.id);

        let form = enums.forms.resolve_optional(settings.form.as_ref());

        if settings.form.is_some() && !form.is_set() {
            log::warn!("Skipping {template}: unknown form");
            continue;
        }

        let mut base = Pokemon::new(species);
        base.form = form;
        base.names = locales.get_all(&names_key);
        base.types = resolve_types([settings.type_1.as_ref(), settings.type_2.as_ref()]);
        base.moves = moves.summaries(settings.quick_moves.iter().chain(&settings.cinematic_moves))?;
        base.elite_moves = moves.summaries(
            settings
                .elite_quick_move
                .iter()
                .chain(&settings.elite_cinematic_move),
        )?;
        base.base_stats = settings.stats.map(pokemon::Stats::from);
        base.rarity = enums.classes.resolve_optional(settings.pokemon_class.as_ref());
        base.info = pokemon::Info::new(&settings);
        base.evolution_branch = settings.evolution_branch.clone();

        if let Some(gender) = settings
            .pokemon_id
            .as_ref()
            .and_then(|species| gender_ratio(&genders, species, settings.form.as_ref()))
        {
            base.info.gender_ratio = gender;
        }

        base.refresh();

        let mut evolved = Vec::new();

        for override_ in &settings.temp_evo_overrides {
            let temp_evolution = enums
                .temp_evolutions
                .resolve_optional(override_.temp_evo_id.as_ref());

            if !temp_evolution.is_set() {
                log::warn!("Skipping temporary evolution of {template}: unknown evolution id");
                continue;
            }

            let mut variant = base.clone();
            variant.kind = Kind::TempEvolution;
            variant.temp_evolution = temp_evolution;
            variant.names = locales.get_all(&format!(
                "{names_key}_{:04}",
                variant.temp_evolution.id
            ));

            let types = resolve_types([
                override_.type_override_1.as_ref(),
                override_.type_override_2.as_ref(),
            ]);
            if !types.is_empty() {
                variant.types = types;
            }

            if let Some(stats) = override_.stats {
                variant.base_stats = Some(stats.into());
            }

            variant.evolution_branch.clear();
            variant.refresh();

            let branch = settings.evolution_branch.iter().find(|branch| {
                branch
                    .temporary_evolution
                    .as_ref()
                    .is_some_and(|temp| variant.temp_evolution.is(temp))
            });

            base.temp_evolutions.push(TempEvolution {
                into: variant.summary(),
                energy_initial: branch.map_or(0, |branch| branch.temporary_evolution_energy_cost),
                energy_subsequent: branch.map_or(0, |branch| {
                    branch.temporary_evolution_energy_cost_subsequent
                }),
            });

            evolved.push(variant);
        }

        list.push(base);
        list.append(&mut evolved);
    }

    Ok(list)
}

type Genders = BTreeMap<(String, Option<String>), pokemon::GenderRatio>;

fn gender_ratios(gamemaster: &Gamemaster) -> Genders {
    gamemaster
        .settings::<GenderSettings>(r"^SPAWN_V\d{4}_POKEMON_", "genderSettings")
        .filter_map(|(_, settings)| {
            let species = settings.pokemon.as_ref()?.key();
            let form = settings.form.as_ref().map(Reference::key);

            Some((
                (species, form),
                pokemon::GenderRatio {
                    male: settings.gender.male_percent,
                    female: settings.gender.female_percent,
                },
            ))
        })
        .collect()
}

fn gender_ratio(
    genders: &Genders,
    species: &Reference,
    form: Option<&Reference>,
) -> Option<pokemon::GenderRatio> {
    let species = species.key();

    genders
        .get(&(species.clone(), form.map(Reference::key)))
        .or_else(|| genders.get(&(species, None)))
        .copied()
}

fn add_forms(list: &mut Vec<Pokemon>, gamemaster: &Gamemaster, enums: &Enums) {
    let mut added = 0;

    for (template, settings) in
        gamemaster.settings::<FormSettings>(r"^FORMS_V\d{4}_POKEMON_", "formSettings")
    {
        for form in &settings.forms {
            let Some(name) = &form.form else {
                continue;
            };

            let existing = list
                .iter()
                .position(|pokemon| pokemon.kind != Kind::TempEvolution && pokemon.form.is(name));

            let index = match existing {
                Some(index) => index,
                None => {
                    let Some(first) = settings.pokemon.as_ref().and_then(|species| {
                        list.iter().position(|pokemon| pokemon.pokemon.is(species))
                    }) else {
                        log::warn!("Skipping form {name} of {template}: species not found");
                        continue;
                    };

                    let proto = enums.forms.resolve(name);

                    if !proto.is_set() {
                        log::warn!("Skipping form {name} of {template}: unknown form");
                        continue;
                    }

                    let mut variant = list[first].clone();
                    variant.kind = Kind::Form;
                    variant.form = proto;

                    list.push(variant);
                    added += 1;

                    list.len() - 1
                }
            };

            let pokemon = &mut list[index];

            if form.asset_bundle_value.is_some() || form.asset_bundle_suffix.is_some() {
                pokemon.asset_value = form.asset_bundle_value.as_ref().map(Reference::key);
                pokemon.asset_suffix = form.asset_bundle_suffix.clone();
            }

            pokemon.refresh();
        }
    }

    log::info!("Added {added} missing forms");
}

fn apply_temp_evolution_assets(list: &mut [Pokemon], gamemaster: &Gamemaster) {
    let settings = gamemaster.settings::<TemporaryEvolutionSettings>(
        r"^TEMPORARY_EVOLUTION_V\d{4}_POKEMON_",
        "temporaryEvolutionSettings",
    );

    for (_, settings) in settings {
        let Some(species) = &settings.pokemon_id else {
            continue;
        };

        for evolution in &settings.temporary_evolutions {
            let Some(temp_evolution) = &evolution.temporary_evolution_id else {
                continue;
            };

            for pokemon in list.iter_mut().filter(|pokemon| {
                pokemon.pokemon.is(species) && pokemon.temp_evolution.is(temp_evolution)
            }) {
                pokemon.asset_value = evolution.asset_bundle_value.as_ref().map(Reference::key);
                pokemon.refresh();
            }
        }
    }
}

/// Keeps the first Pokémon of every composite id.
fn remove_duplicates(list: &mut Vec<Pokemon>) {
    let mut seen = BTreeSet::new();

    list.retain(|pokemon| {
        let unique = pokemon.id != 0 && seen.insert(pokemon.id);

        if !unique {
            log::warn!(
                "Dropping {} {}: duplicate id {}",
                pokemon.kind.as_str(),
                pokemon.pokemon,
                pokemon.id
            );
        }

        unique
    });
}

fn link_evolutions(list: &mut [Pokemon]) {
    let snapshot: &[Pokemon] = list;

    let evolutions: Vec<Vec<Evolution>> = (0..snapshot.len())
        .map(|index| {
            if snapshot[index].kind == Kind::TempEvolution {
                return Vec::new();
            }

            let mut evolutions = Vec::new();
            let mut visited = BTreeSet::from([index]);

            walk_evolutions(snapshot, index, &mut visited, &mut evolutions);

            evolutions
        })
        .collect();

    for (pokemon, evolutions) in list.iter_mut().zip(evolutions) {
        pokemon.evolutions = evolutions;
    }
}

/// Appends the evolutions reachable from `current` in preorder.
fn walk_evolutions(
    list: &[Pokemon],
    current: usize,
    visited: &mut BTreeSet<usize>,
    evolutions: &mut Vec<Evolution>,
) {
    for branch in &list[current].evolution_branch {
        if branch.temporary_evolution.is_some() {
            continue;
        }

        let target = list.iter().position(|pokemon| {
            pokemon.kind != Kind::TempEvolution
                && match (&branch.form, &branch.evolution) {
                    (Some(form), _) => pokemon.form.is(form),
                    (None, Some(species)) => pokemon.pokemon.is(species),
                    (None, None) => false,
                }
        });

        let Some(target) = target else {
            log::warn!(
                "Evolution of {} into {:?} not found",
                list[current].pokemon,
                branch.form.as_ref().or(branch.evolution.as_ref())
            );
            continue;
        };

        if !visited.insert(target) {
            log::debug!("Evolution cycle at {}", list[target].pokemon);
            continue;
        }

        evolutions.push(Evolution {
            into: list[target].summary(),
            candy: branch.candy_cost,
            quest: branch.quest().map(str::to_owned),
        });

        walk_evolutions(list, target, visited, evolutions);
    }
}

static FEMALE_ASSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^pokemon_icon_(\d{3})_01\.png$").expect("valid female asset pattern")
});

static COSTUME_ASSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^pokemon_icon_(\d{3})_(\d{2})_(\d{2})\.png$").expect("valid costume asset pattern")
});

fn mark_female_assets(list: &mut [Pokemon], files: &[&str]) {
    for file in files {
        let Some(female) = FEMALE_ASSET.captures(file) else {
            continue;
        };

        let male = format!("pokemon_icon_{}_00", &female[1]);

        for pokemon in list
            .iter_mut()
            .filter(|pokemon| pokemon.assets.contains(&male))
        {
            pokemon.has_female_asset = true;
            pokemon.refresh();
        }
    }
}

fn add_costumes(list: &mut Vec<Pokemon>, files: &[&str], costumes: &Enumeration) {
    let mut seen = BTreeSet::new();
    let mut variants = Vec::new();

    for file in files {
        let Some(costume) = COSTUME_ASSET.captures(file) else {
            continue;
        };

        let (species, value, id) = (&costume[1], &costume[2], &costume[3]);
        let value = if value == "01" { "00" } else { value };
        let asset = format!("pokemon_icon_{species}_{value}");

        let Some(base) = list
            .iter()
            .position(|pokemon| pokemon.assets.contains(&asset))
        else {
            log::debug!("No Pokémon with asset {asset} for {file}");
            continue;
        };

        let Some(identifier) = id
            .parse()
            .ok()
            .and_then(|id| costumes.try_get(id))
            .filter(Identifier::is_set)
        else {
            log::warn!("Unknown costume {id} in {file}");
            continue;
        };

        if !seen.insert((base, identifier.id)) {
            continue;
        }

        let mut variant = list[base].clone();
        variant.kind = Kind::Costume;
        variant.costume = identifier;
        variant.has_female_asset = value == "00"
            && files.contains(&format!("pokemon_icon_{species}_01_{id}.png").as_str());
        variant.refresh();

        variants.push(variant);
    }

    log::info!("Added {} costume variants", variants.len());

    list.append(&mut variants);
}

#[cfg(test)]
mod database_test {
    use pretty_assertions::assert_eq;

    use crate::database::link_evolutions;
    use crate::gamemaster::EvolutionBranch;
    use crate::identifier::{Identifier, Reference};
    use crate::pokemon::Pokemon;

    fn evolving(id: i64, template: &str, into: Option<(&str, i64)>) -> Pokemon {
        let mut pokemon = Pokemon::new(Identifier::new(id, template));

        if let Some((target, candy)) = into {
            pokemon.evolution_branch = vec![EvolutionBranch {
                evolution: Some(Reference::Name(target.to_owned())),
                candy_cost: candy,
                ..EvolutionBranch::default()
            }];
        }

        pokemon
    }

    fn chain(pokemon: &Pokemon) -> Vec<(&str, i64)> {
        pokemon
            .evolutions
            .iter()
            .map(|evolution| (evolution.into.pokemon.template.as_str(), evolution.candy))
            .collect()
    }

    #[test]
    fn flattens_evolution_chains() {
        let mut list = vec![
            evolving(1, "BULBASAUR", Some(("IVYSAUR", 25))),
            evolving(2, "IVYSAUR", Some(("VENUSAUR", 100))),
            evolving(3, "VENUSAUR", None),
        ];

        link_evolutions(&mut list);

        assert_eq!(chain(&list[0]), vec![("IVYSAUR", 25), ("VENUSAUR", 100)]);
        assert_eq!(chain(&list[1]), vec![("VENUSAUR", 100)]);
        assert!(list[2].evolutions.is_empty());
    }

    #[test]
    fn terminates_on_cycles() {
        let mut list = vec![
            evolving(1, "A", Some(("B", 10))),
            evolving(2, "B", Some(("A", 20))),
        ];

        link_evolutions(&mut list);

        assert_eq!(chain(&list[0]), vec![("B", 10)]);
        assert_eq!(chain(&list[1]), vec![("A", 20)]);
    }

    #[test]
    fn skips_missing_targets() {
        let mut list = vec![evolving(1, "A", Some(("MISSING", 10)))];

        link_evolutions(&mut list);

        assert!(list[0].evolutions.is_empty());
    }
}
