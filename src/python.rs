//! Python bindings for the battle simulator using PyO3

use crate::battle::BattleOptions;
use crate::boss::behavior_for;
use crate::catalog::Catalog;
use crate::config::{BattleScenario, ScenarioConfig};
use crate::save::SaveData;
use crate::simulation::{run_and_aggregate, run_battle, run_battle_with_seed};
use crate::skills::compile;
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value)
        .map_err(|e| PyRuntimeError::new_err(format!("Failed to serialize results: {}", e)))
}

/// Build a scenario from JSON strings
fn scenario_from_json(catalog_json: &str, scenario_json: &str, save_json: Option<&str>) -> PyResult<BattleScenario> {
    let catalog = Catalog::from_json_str(catalog_json)
        .map_err(|e| PyValueError::new_err(format!("Invalid catalog: {}", e)))?;
    let save = save_json
        .map(SaveData::from_json_str)
        .transpose()
        .map_err(|e| PyValueError::new_err(format!("Invalid save: {}", e)))?;
    ScenarioConfig::from_json(scenario_json)
        .and_then(|config| config.build_with(&catalog, save.as_ref()))
        .map_err(|e| PyValueError::new_err(format!("Invalid scenario: {}", e)))
}

/// Aggregated stats over many battles, as JSON
#[pyfunction]
#[pyo3(signature = (catalog_json, scenario_json, save_json=None, num_sims=100, parallel=true, seed=None))]
fn simulate_json(
    py: Python<'_>,
    catalog_json: &str,
    scenario_json: &str,
    save_json: Option<&str>,
    num_sims: usize,
    parallel: bool,
    seed: Option<u64>,
) -> PyResult<String> {
    let scenario = scenario_from_json(catalog_json, scenario_json, save_json)?;

    // Release GIL during computation to prevent GUI freezing
    let stats = py.allow_threads(|| run_and_aggregate(&scenario, num_sims, parallel, seed));

    to_json(&stats)
}

/// One battle with its full log, as JSON
#[pyfunction]
#[pyo3(signature = (catalog_json, scenario_json, save_json=None, seed=None, fast=false))]
fn battle_json(
    py: Python<'_>,
    catalog_json: &str,
    scenario_json: &str,
    save_json: Option<&str>,
    seed: Option<u64>,
    fast: bool,
) -> PyResult<String> {
    let scenario = scenario_from_json(catalog_json, scenario_json, save_json)?;
    let options = BattleOptions {
        fast_log: fast,
        log_every: scenario.suggested_log_every(),
        max_rounds: scenario.max_rounds,
    };

    let result = py.allow_threads(|| match seed {
        Some(seed) => run_battle_with_seed(&scenario, &options, seed),
        None => run_battle(&scenario, &options),
    });

    to_json(&result)
}

/// Aggregated stats for a scenario file
#[pyfunction]
#[pyo3(signature = (scenario_path, num_sims=100, parallel=true, seed=None))]
fn simulate_from_file(
    py: Python<'_>,
    scenario_path: &str,
    num_sims: usize,
    parallel: bool,
    seed: Option<u64>,
) -> PyResult<String> {
    let scenario = ScenarioConfig::from_file(scenario_path)
        .and_then(|config| config.build())
        .map_err(|e| PyIOError::new_err(format!("Failed to load scenario: {}", e)))?;

    let stats = py.allow_threads(|| run_and_aggregate(&scenario, num_sims, parallel, seed));

    to_json(&stats)
}

/// Compiled battle config for a list of purchased skill ids, as JSON
#[pyfunction]
fn compile_skills(skill_ids: Vec<u32>) -> PyResult<String> {
    to_json(&compile(skill_ids))
}

/// Display text for a boss's special rules
#[pyfunction]
fn boss_rules(name: &str) -> Vec<String> {
    behavior_for(name).special_rules()
}

/// Get number of threads being used for parallel simulation
#[pyfunction]
fn get_thread_count() -> PyResult<usize> {
    Ok(rayon::current_num_threads())
}

/// Get number of available CPU cores
#[pyfunction]
fn get_available_cores() -> PyResult<usize> {
    Ok(num_cpus::get())
}

/// Python module definition
#[pymodule]
fn cosmic_sim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(simulate_json, m)?)?;
    m.add_function(wrap_pyfunction!(battle_json, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_from_file, m)?)?;
    m.add_function(wrap_pyfunction!(compile_skills, m)?)?;
    m.add_function(wrap_pyfunction!(boss_rules, m)?)?;
    m.add_function(wrap_pyfunction!(get_thread_count, m)?)?;
    m.add_function(wrap_pyfunction!(get_available_cores, m)?)?;
    Ok(())
}
