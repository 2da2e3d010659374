//! Wildlife Sim - creature behavior, population and hunting core
//!
//! Headless simulation of wild animals for an open-world game: species
//! definitions, a per-creature behavior state machine, habitat-aware
//! spawning and the player's projectiles. Rendering and input live
//! elsewhere; they read [`creature::CreatureView`]s and drain
//! [`simulation::WildlifeEvent`]s.

pub mod core;
pub mod creature;
pub mod population;
pub mod projectile;
pub mod simulation;
pub mod spatial;
pub mod species;
pub mod terrain;

pub use crate::core::{Result, WildlifeConfig, WildlifeError};
pub use crate::simulation::{WildlifeEvent, WildlifeSim};
