use cosmic_sim::battle::{BattleOptions, Outcome};
use cosmic_sim::catalog::Catalog;
use cosmic_sim::config::ScenarioConfig;
use cosmic_sim::error::{CatalogError, ConfigError, SaveError};
use cosmic_sim::save::SaveData;
use cosmic_sim::simulation::{run_and_aggregate, run_battle_with_seed};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CATALOG: &str = r#"[
    {"id": 101, "name": "Pebble", "realm": 1, "power": 10, "defense": 100, "rarity": "common"},
    {"id": 401, "name": "Gull", "realm": 4, "power": 20, "defense": 60},
    {"id": 601, "name": "Comet", "realm": 6, "power": 15, "defense": 80},
    {"id": 501, "name": "Relic", "realm": 5, "power": 25, "defense": 90},
    {"id": 1101, "name": "Darth Vader", "realm": 11, "power": 2, "defense": 0.001},
    {"id": 1102, "name": "Aizen", "realm": 11, "power": 1, "defense": 0.002}
]"#;

const SAVE: &str = r#"{
    "purchasedSkills": [26001, 26201, 26401, 28001, 99999],
    "battle": {"globalAttackMult": 2.0},
    "upgrades": {"globalHPMult": 1.5},
    "ownedCards": [
        {"id": 101, "lvl": 4, "tier": 2, "qty": 9, "locked": true},
        {"id": "401", "level": 9},
        {"id": 77777, "lvl": 3}
    ]
}"#;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn fixture(scenario_name: &str, scenario: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "cards.json", CATALOG);
    write(dir.path(), "save.json", SAVE);
    write(dir.path(), scenario_name, scenario);
    dir
}

#[test]
fn catalog_file_round_trips_lookups() {
    let dir = fixture("unused.yaml", "catalog: cards.json\n");
    let catalog = Catalog::from_file(dir.path().join("cards.json")).unwrap();
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.get("101").unwrap().name, "Pebble");
    assert_eq!(catalog.find_by_name("darth vader").unwrap().id, "1101");
}

#[test]
fn missing_catalog_reports_path() {
    let dir = TempDir::new().unwrap();
    let err = Catalog::from_file(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, CatalogError::Io { .. }));
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn save_file_resolves_owned_cards() {
    let dir = fixture("unused.yaml", "catalog: cards.json\n");
    let catalog = Catalog::from_file(dir.path().join("cards.json")).unwrap();
    let save = SaveData::from_file(dir.path().join("save.json")).unwrap();

    assert_eq!(save.upgrades.global_attack_mult, 2.0);
    assert_eq!(save.upgrades.global_hp_mult, 1.5);

    // unknown id 77777 is skipped
    let roster = save.roster(&catalog);
    assert_eq!(roster.len(), 2);
    assert_eq!((roster[0].tier, roster[0].level, roster[0].quantity), (2, 4, 9));
    assert!(roster[0].locked);
    assert_eq!((roster[1].tier, roster[1].level, roster[1].quantity), (1, 9, 1));

    let config = save.battle_config();
    assert_eq!(config.slot_limit, 4);
    assert!((config.crit_chance - 0.05).abs() < 1e-9);
}

#[test]
fn broken_save_is_a_json_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "save.json", "{\"purchasedSkills\": [");
    assert!(matches!(
        SaveData::from_file(dir.path().join("save.json")),
        Err(SaveError::Json(_))
    ));
}

#[test]
fn yaml_scenario_builds_relative_to_its_directory() {
    let dir = fixture(
        "fight.yaml",
        "catalog: cards.json\nsave: save.json\nteam: [Pebble, Gull, Comet, Relic, '401']\nboss: Darth Vader\nseed: 11\n",
    );
    let config = ScenarioConfig::from_file(dir.path().join("fight.yaml")).unwrap();
    assert_eq!(config.seed, Some(11));
    let scenario = config.build().unwrap();

    // save grants one extra slot
    assert_eq!(scenario.team.len(), 4);
    assert_eq!(scenario.reserve.len(), 1);
    assert_eq!(scenario.reserve[0].name, "Gull");
    assert!(scenario.reserve[0].skills.is_empty());
    // 10 * 2 * sqrt(4) * 2.0
    assert_eq!(cosmic_sim::card::unit_attack(&scenario.team[0], &scenario.config), 80);

    let result = run_battle_with_seed(&scenario, &BattleOptions::default(), 11);
    assert!(matches!(result.outcome, Outcome::Victory | Outcome::Defeat));
    assert!(result.log[0].starts_with("Battle starts: Team (4) vs Darth Vader"));
}

#[test]
fn json_scenario_runs_a_batch() {
    let dir = fixture(
        "fight.json",
        r#"{"catalog": "cards.json", "team": ["Pebble", "Gull"], "boss": "Aizen", "skills": [26001]}"#,
    );
    let scenario = ScenarioConfig::from_file(dir.path().join("fight.json"))
        .unwrap()
        .build()
        .unwrap();
    let stats = run_and_aggregate(&scenario, 20, true, Some(5));
    assert_eq!(stats.total, 20);
    assert_eq!(stats.victories + stats.defeats, 20);
    assert_eq!(stats.errors, 0);
}

#[test]
fn unknown_team_card_fails_the_build() {
    let dir = fixture("fight.yaml", "catalog: cards.json\nteam: [Kraken]\nboss: Aizen\n");
    let err = ScenarioConfig::from_file(dir.path().join("fight.yaml"))
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownCard(ref key) if key == "Kraken"));
}

#[test]
fn malformed_yaml_is_reported() {
    let dir = fixture("fight.yaml", "catalog: [unclosed\n");
    assert!(matches!(
        ScenarioConfig::from_file(dir.path().join("fight.yaml")),
        Err(ConfigError::Yaml(_))
    ));
}
