use assert_matches::assert_matches;
use pogodata_core::pokemon::Kind;
use pogodata_core::{
    Criteria, Database, Error, Gamemaster, IconSet, Icons, Language, Locales, Manifest, Schema,
    Sources, Value,
};
use pretty_assertions::assert_eq;

const PROTOS: &str = "
syntax = \"proto3\";
package POGOProtos.Rpc;

enum HoloPokemonClass {
\tPOKEMON_CLASS_NORMAL = 0;
\tPOKEMON_CLASS_LEGENDARY = 1;
}

enum HoloPokemonId {
\tMISSINGNO = 0;
\tBULBASAUR = 1;
\tIVYSAUR = 2;
\tVENUSAUR = 3;
\tPIKACHU = 25;
\tUNOWN = 201;
}

enum HoloPokemonMove {
\tMOVE_UNSET = 0;
\tSLUDGE_BOMB = 90;
\tVINE_WHIP_FAST = 214;
}

enum HoloPokemonType {
\tPOKEMON_TYPE_NONE = 0;
\tPOKEMON_TYPE_POISON = 4;
\tPOKEMON_TYPE_GROUND = 5;
\tPOKEMON_TYPE_FIRE = 10;
\tPOKEMON_TYPE_GRASS = 12;
\tPOKEMON_TYPE_ELECTRIC = 13;
}

enum HoloTemporaryEvolutionId {
\tTEMP_EVOLUTION_UNSET = 0;
\tTEMP_EVOLUTION_MEGA = 1;
}

message GameplayWeatherProto {
\tenum WeatherCondition {
\t\tNONE = 0;
\t\tCLEAR = 1;
\t\tRAINY = 2;
\t}
}

message PokemonDisplayProto {
\tenum Costume {
\t\tUNSET = 0;
\t\tHOLIDAY_2016 = 1;
\t}
\tenum Form {
\t\tFORM_UNSET = 0;
\t\tUNOWN_A = 1;
\t\tUNOWN_B = 2;
\t\tPIKACHU_NORMAL = 598;
\t}
}
";

const GAMEMASTER: &str = r#"[
    {
        "templateId": "COMBAT_V0214_MOVE_VINE_WHIP_FAST",
        "data": {
            "combatMove": {
                "uniqueId": "VINE_WHIP_FAST",
                "type": "POKEMON_TYPE_GRASS",
                "power": 5.0,
                "energyDelta": 8
            }
        }
    },
    {
        "templateId": "SPAWN_V0001_POKEMON_BULBASAUR",
        "data": {
            "genderSettings": {
                "pokemon": "BULBASAUR",
                "gender": { "malePercent": 0.875, "femalePercent": 0.125 }
            }
        }
    },
    {
        "templateId": "FORMS_V0201_POKEMON_UNOWN",
        "data": {
            "formSettings": {
                "pokemon": "UNOWN",
                "forms": [
                    { "form": "UNOWN_A", "assetBundleValue": 11 },
                    { "form": "UNOWN_B", "assetBundleValue": 12 },
                    { "assetBundleSuffix": "ignored" }
                ]
            }
        }
    },
    {
        "templateId": "TEMPORARY_EVOLUTION_V0003_POKEMON_VENUSAUR",
        "data": {
            "temporaryEvolutionSettings": {
                "pokemonId": "VENUSAUR",
                "temporaryEvolutions": [
                    { "temporaryEvolutionId": "TEMP_EVOLUTION_MEGA", "assetBundleValue": 51 }
                ]
            }
        }
    },
    {
        "templateId": "V0001_POKEMON_BULBASAUR",
        "data": {
            "pokemonSettings": {
                "pokemonId": "BULBASAUR",
                "type": "POKEMON_TYPE_GRASS",
                "type2": "POKEMON_TYPE_POISON",
                "stats": { "baseStamina": 128, "baseAttack": 118, "baseDefense": 111 },
                "quickMoves": ["VINE_WHIP_FAST"],
                "cinematicMoves": ["SLUDGE_BOMB"],
                "encounter": { "baseCaptureRate": 0.2, "baseFleeRate": 0.1 },
                "thirdMove": { "stardustToUnlock": 10000, "candyToUnlock": 25 },
                "isTransferable": true,
                "evolutionBranch": [
                    {
                        "evolution": "IVYSAUR",
                        "candyCost": 25,
                        "questDisplay": [{ "questRequirementTemplateId": "BULBASAUR_QUEST" }]
                    }
                ]
            }
        }
    },
    {
        "templateId": "V0002_POKEMON_IVYSAUR",
        "data": {
            "pokemonSettings": {
                "pokemonId": "IVYSAUR",
                "type": "POKEMON_TYPE_GRASS",
                "type2": "POKEMON_TYPE_POISON",
                "evolutionBranch": [{ "evolution": "VENUSAUR", "candyCost": 100 }]
            }
        }
    },
    {
        "templateId": "V0003_POKEMON_VENUSAUR",
        "data": {
            "pokemonSettings": {
                "pokemonId": "VENUSAUR",
                "type": "POKEMON_TYPE_GRASS",
                "type2": "POKEMON_TYPE_POISON",
                "stats": { "baseStamina": 190, "baseAttack": 198, "baseDefense": 189 },
                "eliteQuickMove": ["VINE_WHIP_FAST"],
                "evolutionBranch": [
                    {
                        "temporaryEvolution": "TEMP_EVOLUTION_MEGA",
                        "temporaryEvolutionEnergyCost": 200,
                        "temporaryEvolutionEnergyCostSubsequent": 40
                    }
                ],
                "tempEvoOverrides": [
                    {
                        "tempEvoId": "TEMP_EVOLUTION_MEGA",
                        "stats": { "baseStamina": 190, "baseAttack": 241, "baseDefense": 246 },
                        "typeOverride1": "POKEMON_TYPE_GRASS",
                        "typeOverride2": "POKEMON_TYPE_POISON"
                    }
                ]
            }
        }
    },
    {
        "templateId": "V0025_POKEMON_PIKACHU_NORMAL",
        "data": {
            "pokemonSettings": {
                "pokemonId": "PIKACHU",
                "form": "PIKACHU_NORMAL",
                "type": "POKEMON_TYPE_ELECTRIC"
            }
        }
    },
    {
        "templateId": "V0201_POKEMON_UNOWN",
        "data": { "pokemonSettings": { "pokemonId": "UNOWN" } }
    },
    {
        "templateId": "V0999_POKEMON_NOTHING",
        "data": { "pokemonSettings": {} }
    },
    {
        "templateId": "V0090_MOVE_SLUDGE_BOMB",
        "data": {
            "moveSettings": {
                "movementId": "SLUDGE_BOMB",
                "pokemonType": "POKEMON_TYPE_POISON",
                "power": 80.0,
                "energyDelta": -50,
                "durationMs": 2300
            }
        }
    },
    {
        "templateId": "V0214_MOVE_VINE_WHIP_FAST",
        "data": {
            "moveSettings": {
                "movementId": "VINE_WHIP_FAST",
                "pokemonType": "POKEMON_TYPE_GRASS",
                "power": 7.0,
                "energyDelta": 6,
                "durationMs": 600,
                "damageWindowStartMs": 350,
                "damageWindowEndMs": 600
            }
        }
    },
    {
        "templateId": "WEATHER_AFFINITY_CLEAR",
        "data": {
            "weatherAffinities": {
                "weatherCondition": "CLEAR",
                "pokemonType": ["POKEMON_TYPE_GRASS", "POKEMON_TYPE_FIRE", "POKEMON_TYPE_GROUND"]
            }
        }
    },
    {
        "templateId": "WEATHER_AFFINITY_WINDY",
        "data": {
            "weatherAffinities": { "weatherCondition": "WINDY", "pokemonType": [] }
        }
    }
]"#;

const ENGLISH: &str = "RESOURCE ID: pokemon_name_0001
TEXT: Bulbasaur
RESOURCE ID: pokemon_name_0003
TEXT: Venusaur
RESOURCE ID: pokemon_name_0003_0001
TEXT: Mega Venusaur
RESOURCE ID: pokemon_type_grass
TEXT: Grass
RESOURCE ID: move_name_0214
TEXT: Vine Whip
RESOURCE ID: weather_clear
TEXT: Clear
";

const GERMAN: &str = "RESOURCE ID: pokemon_name_0001
TEXT: Bisasam
RESOURCE ID: pokemon_type_grass
TEXT: Pflanze
";

fn sources(gamemaster: &str) -> Sources {
    let mut locales = Locales::new();
    locales.extend(Language::English, ENGLISH);
    locales.extend(Language::German, GERMAN);

    let mut icons = Icons::new();
    icons.insert(
        IconSet::Pogo,
        Manifest::new(
            [
                "Images/Pokemon/pokemon_icon_025_00.png",
                "Images/Pokemon/pokemon_icon_025_01.png",
                "Images/Pokemon/pokemon_icon_025_00_01.png",
                "Images/Pokemon/pokemon_icon_025_01_01.png",
                "Images/Pokemon/pokemon_icon_025_00_01_shiny.png",
            ]
            .map(str::to_owned),
        ),
    );

    Sources {
        schema: Schema::new(PROTOS),
        gamemaster: Gamemaster::from_json(gamemaster).unwrap(),
        locales,
        icons,
    }
}

fn database() -> Database {
    Database::reconcile(sources(GAMEMASTER)).unwrap()
}

fn criteria<const N: usize>(entries: [(&str, Value); N]) -> Criteria {
    entries
        .into_iter()
        .map(|(field, value)| (field.to_owned(), value))
        .collect()
}

fn ids(database: &Database) -> Vec<u64> {
    database
        .pokemon
        .values()
        .iter()
        .map(|pokemon| pokemon.id)
        .collect()
}

#[test]
fn publishes_sorted_pokemon() {
    let database = database();

    assert_eq!(
        ids(&database),
        vec![1, 2, 3, 31, 25598, 255981, 201, 2011, 2012]
    );
}

#[test]
fn base_and_temp_evolution() {
    let database = database();

    let venusaurs = database
        .get_pokemon(&criteria([("pokemon", Value::from("VENUSAUR"))]))
        .unwrap();
    assert_eq!(venusaurs.len(), 2);

    let (base, mega) = (venusaurs[0], venusaurs[1]);
    assert_eq!(base.kind, Kind::Base);
    assert_eq!(mega.kind, Kind::TempEvolution);
    assert_eq!(base.pokemon, mega.pokemon);
    assert_ne!(base.id, mega.id);

    assert_eq!(mega.names.as_str(), "Mega Venusaur");
    assert_eq!(mega.base_stats.map(|stats| stats.attack), Some(241));
    assert_eq!(base.base_stats.map(|stats| stats.attack), Some(198));
    assert_eq!(mega.assets, vec!["pokemon_icon_003_51"]);
    assert_eq!(base.elite_moves[0].proto.template, "VINE_WHIP_FAST");
    assert!(mega.evolutions.is_empty());

    assert_eq!(base.temp_evolutions.len(), 1);
    assert_eq!(base.temp_evolutions[0].into.id, mega.id);
    assert_eq!(base.temp_evolutions[0].energy_initial, 200);
    assert_eq!(base.temp_evolutions[0].energy_subsequent, 40);
}

#[test]
fn evolution_chain() {
    let database = database();
    let bulbasaur = database.pokemon.get(&1).unwrap();

    let chain: Vec<_> = bulbasaur
        .evolutions
        .iter()
        .map(|evolution| (evolution.into.id, evolution.candy, evolution.quest.as_deref()))
        .collect();

    assert_eq!(
        chain,
        vec![(2, 25, Some("BULBASAUR_QUEST")), (3, 100, None)]
    );
}

#[test]
fn base_pokemon_details() {
    let database = database();
    let bulbasaur = database.pokemon.get(&1).unwrap();

    assert_eq!(bulbasaur.generation, 1);
    assert_eq!(bulbasaur.types.len(), 2);
    assert_eq!(bulbasaur.moves.len(), 2);
    assert_eq!(bulbasaur.moves[1].type_.template, "POKEMON_TYPE_POISON");
    assert_eq!(bulbasaur.info.gender_ratio.male, 0.875);
    assert_eq!(bulbasaur.info.third_move.candy, 25);
    assert_eq!(bulbasaur.info.third_move.stardust, 10000);
    assert_eq!(bulbasaur.info.encounter.base_capture_rate, 0.2);
    assert!(bulbasaur.info.transferable);
    assert_eq!(
        bulbasaur.names.get(Language::German).map(String::as_str),
        Some("Bisasam")
    );

    let details = serde_json::to_value(bulbasaur.details(
        &database,
        Language::German,
        IconSet::Pogo,
    ))
    .unwrap();

    assert_eq!(details["name"], "Bisasam");
    assert_eq!(details["pokemon_type"], "base");
    assert_eq!(details["pokemon"]["template_name"], "BULBASAUR");
    assert_eq!(details["assets"], serde_json::json!([]));
    assert!(details["max_cp"].as_i64().unwrap() > 1000);
}

#[test]
fn forms_and_asset_values() {
    let database = database();

    let unowns = database
        .get_pokemon(&criteria([("pokemon_type", Value::from("form"))]))
        .unwrap();

    let forms: Vec<_> = unowns
        .iter()
        .map(|unown| (unown.form.template.as_str(), unown.assets[0].as_str()))
        .collect();

    assert_eq!(
        forms,
        vec![
            ("UNOWN_A", "pokemon_icon_201_11"),
            ("UNOWN_B", "pokemon_icon_201_12"),
        ]
    );
}

#[test]
fn female_and_costume_assets() {
    let database = database();

    let pikachu = database.pokemon.get(&25598).unwrap();
    assert_eq!(pikachu.assets, vec!["pokemon_icon_025_00", "pokemon_icon_025_01"]);

    let costumes = database
        .get_pokemon(&criteria([("pokemon_type", Value::from("costume"))]))
        .unwrap();
    assert_eq!(costumes.len(), 1);

    let holiday = costumes[0];
    assert_eq!(holiday.costume.template, "HOLIDAY_2016");
    assert_eq!(holiday.form.template, "PIKACHU_NORMAL");
    assert_eq!(
        holiday.assets,
        vec!["pokemon_icon_025_00_01", "pokemon_icon_025_01_01"]
    );

    let icons: Vec<_> = database
        .icons()
        .pokemon(holiday, IconSet::Pogo)
        .into_iter()
        .map(|icon| (icon.name, icon.female, icon.shiny))
        .collect();

    assert_eq!(
        icons,
        vec![
            ("pokemon_icon_025_00_01".to_owned(), false, false),
            ("pokemon_icon_025_01_01".to_owned(), true, false),
            ("pokemon_icon_025_00_01_shiny".to_owned(), false, true),
        ]
    );
}

#[test]
fn publishes_distinct_ids() {
    for database in [database(), Database::reconcile(sources(UNRESOLVED)).unwrap()] {
        let ids = ids(&database);
        let unique: std::collections::BTreeSet<_> = ids.iter().copied().collect();

        assert!(!ids.contains(&0));
        assert_eq!(unique.len(), ids.len());
    }
}

const UNRESOLVED: &str = r#"[
    {
        "templateId": "FORMS_V0201_POKEMON_UNOWN",
        "data": {
            "formSettings": {
                "pokemon": "UNOWN",
                "forms": [{ "form": "UNOWN_Z" }, { "form": "UNOWN_A" }]
            }
        }
    },
    {
        "templateId": "V0001_POKEMON_BULBASAUR",
        "data": {
            "pokemonSettings": {
                "pokemonId": "BULBASAUR",
                "tempEvoOverrides": [{ "tempEvoId": "TEMP_EVOLUTION_MEGA_Z" }]
            }
        }
    },
    {
        "templateId": "V0001_POKEMON_BULBASAUR_COPY",
        "data": { "pokemonSettings": { "pokemonId": "BULBASAUR", "isTransferable": true } }
    },
    {
        "templateId": "V0025_POKEMON_PIKACHU_COSPLAY",
        "data": { "pokemonSettings": { "pokemonId": "PIKACHU", "form": "PIKACHU_COSPLAY" } }
    },
    {
        "templateId": "V0201_POKEMON_UNOWN",
        "data": { "pokemonSettings": { "pokemonId": "UNOWN" } }
    },
    {
        "templateId": "V0201_POKEMON_UNOWN_A",
        "data": { "pokemonSettings": { "form": "UNOWN_A" } }
    },
    {
        "templateId": "V1000_POKEMON_NEWMON",
        "data": { "pokemonSettings": { "pokemonId": "NEWMON" } }
    }
]"#;

#[test]
fn skips_unresolved_identities() {
    let database = Database::reconcile(sources(UNRESOLVED)).unwrap();

    assert_eq!(ids(&database), vec![1, 201, 2011]);

    let bulbasaur = database.pokemon.get(&1).unwrap();
    assert_eq!(bulbasaur.kind, Kind::Base);
    assert!(bulbasaur.temp_evolutions.is_empty());
    assert!(!bulbasaur.info.transferable);

    assert!(
        database
            .get_pokemon(&criteria([("pokemon_type", Value::from("temp_evolution"))]))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn queries_every_entity() {
    let database = database();

    assert_eq!(database.types.len(), 5);
    let grass = database
        .get_types(&criteria([("name", Value::from("Pflanze"))]))
        .unwrap();
    assert_eq!(grass[0].proto.template, "POKEMON_TYPE_GRASS");
    assert_eq!(grass[0].effective_against.len(), 1);

    let moves = database
        .get_moves(&criteria([("pvp_energy_delta", Value::Int(8))]))
        .unwrap();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].pve.window.start, 350);
    assert_eq!(database.moves.get("SLUDGE_BOMB").unwrap().pvp.power, 0.0);

    let weather = database
        .get_weather(&criteria([("boosts", Value::from("POKEMON_TYPE_GRASS,POKEMON_TYPE_FIRE"))]))
        .unwrap();
    assert_eq!(weather.len(), 1);
    assert_eq!(database.weather.len(), 1);

    let by_id = database
        .get_pokemon(&criteria([("id", Value::from("31")), ("pokemon_type", Value::from("base"))]))
        .unwrap();
    assert_eq!(by_id.len(), 1);
    assert_eq!(by_id[0].kind, Kind::TempEvolution);

    assert_matches!(
        database.get_pokemon(&criteria([("attack", Value::from("strong"))])),
        Err(Error::InvalidQueryArgument(_))
    );
}

#[test]
fn missing_move_fails() {
    let gamemaster = r#"[
        {
            "templateId": "V0001_POKEMON_BULBASAUR",
            "data": {
                "pokemonSettings": { "pokemonId": "BULBASAUR", "quickMoves": ["TACKLE_FAST"] }
            }
        }
    ]"#;

    assert_matches!(
        Database::reconcile(sources(gamemaster)),
        Err(Error::MissingMove(name)) if name == "TACKLE_FAST"
    );
}
