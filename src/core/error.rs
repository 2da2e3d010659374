use thiserror::Error;

use crate::terrain::Habitat;

#[derive(Error, Debug)]
pub enum WildlifeError {
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    /// No terrain-matching spawn point could be found. Placement recovers
    /// from this internally; it never reaches collaborators.
    #[error("No valid {habitat:?} placement for species {species}")]
    InvalidHabitatPlacement { species: String, habitat: Habitat },

    #[error("Unknown habitat region: {0}")]
    UnknownRegion(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WildlifeError>;
