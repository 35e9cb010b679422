//! Error types

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a battle refuses to start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum BattleError {
    #[error("No boss selected")]
    NoBossSelected,
    #[error("Empty team")]
    EmptyTeam,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate card id {0} in catalog")]
    DuplicateId(String),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to read save {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid save JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save root must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid scenario YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error("unknown card {0:?}")]
    UnknownCard(String),
    #[error("unknown boss {0:?}")]
    UnknownBoss(String),
}
