//! Debug script to print computed team and boss stats for a scenario

use cosmic_sim::boss::BossUnit;
use cosmic_sim::card::CombatUnit;
use cosmic_sim::config::ScenarioConfig;
use cosmic_sim::skills::Mechanic;
use std::env;

fn print_unit(slot: &str, unit: &CombatUnit) {
    println!("{slot} {} (realm {})", unit.name, unit.realm);
    println!("  attack:  {}", unit.attack);
    println!("  hp:      {}", unit.hp);
    for (mechanic, value) in unit.skills.iter() {
        println!("  {:<19}{:.4}", format!("{}:", mechanic.label()), value);
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let Some(config_path) = args.get(1) else {
        eprintln!("usage: debug_stats <scenario.yaml>");
        std::process::exit(2);
    };

    let scenario = match ScenarioConfig::from_file(config_path).and_then(|c| c.build()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading scenario: {}", e);
            std::process::exit(1);
        }
    };
    let config = &scenario.config;

    println!("\n=== BATTLE CONFIG ===");
    println!("  attack mult: {:.4}", config.global_attack_mult);
    println!("  hp mult:     {:.4}", config.global_hp_mult);
    println!("  crit:        {:.4}", config.crit_chance);
    println!("  crit_dmg:    {:.4}", config.crit_damage);
    println!("  slots:       {}", config.slot_limit);
    for mechanic in Mechanic::ALL {
        let realms: Vec<String> = (1..=10)
            .filter(|&realm| config.is_fused(mechanic, realm))
            .map(|realm| realm.to_string())
            .collect();
        print!("  {:<19}{:.4}", format!("{}:", mechanic.label()), config.mechanic(mechanic));
        if !realms.is_empty() {
            print!("  fused into realms {}", realms.join(", "));
        }
        println!();
    }

    println!("\n=== TEAM ===");
    for (slot, card) in scenario.team.iter().enumerate() {
        print_unit(&format!("#{}", slot + 1), &CombatUnit::from_card(card, config));
    }
    if !scenario.reserve.is_empty() {
        println!("\n=== RESERVE ===");
        for (slot, unit) in scenario.reserve.iter().enumerate() {
            print_unit(&format!("R{}", slot + 1), unit);
        }
    }

    if let Some(boss) = &scenario.boss {
        let unit = BossUnit::spawn(boss);
        println!("\n=== BOSS {} (realm {}) ===", unit.name, unit.realm);
        println!("  attack:  {}", unit.attack);
        println!("  hp:      {}", unit.hp);
        for rule in boss.special_rules() {
            println!("  - {rule}");
        }
        println!("  suggested log interval: {}", scenario.suggested_log_every());
    }
}
