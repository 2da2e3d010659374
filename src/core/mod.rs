pub mod config;
pub mod error;
pub mod types;

pub use config::{BehaviorConfig, DurationRange, PopulationConfig, ProjectileConfig, WildlifeConfig};
pub use error::{Result, WildlifeError};
pub use types::{CreatureId, ProjectileId, Rect, SceneId, SimTime, Vec2};
