//! Read-only species catalog
//!
//! Built once (from the built-in table or a TOML file) and then only queried.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use rand::Rng;
use serde::Deserialize;

use super::builtin::builtin_species;
use super::{RarityTier, SpeciesDef, SpeciesId, SpeciesStat};
use crate::core::error::{Result, WildlifeError};
use crate::terrain::Habitat;

/// Fixed payout for killing a creature of the given tier
pub fn reward_for_rarity(tier: RarityTier) -> u32 {
    match tier {
        RarityTier::Rare => 30,
        RarityTier::SuperRare => 50,
        RarityTier::Legendary => 100,
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    species: Vec<SpeciesDef>,
}

/// Immutable table of species, indexed by [`SpeciesId`]
#[derive(Debug, Clone)]
pub struct SpeciesCatalog {
    species: Vec<SpeciesDef>,
    by_name: AHashMap<String, SpeciesId>,
}

impl SpeciesCatalog {
    /// Build a catalog, validating every definition
    pub fn new(species: Vec<SpeciesDef>) -> Result<Self> {
        if species.len() > u16::MAX as usize {
            return Err(WildlifeError::InvalidConfig("too many species".into()));
        }

        let mut by_name = AHashMap::with_capacity(species.len());
        for (i, def) in species.iter().enumerate() {
            validate_def(def)?;
            if by_name.insert(def.name.clone(), SpeciesId(i as u16)).is_some() {
                return Err(WildlifeError::InvalidConfig(format!(
                    "duplicate species name '{}'",
                    def.name
                )));
            }
        }

        Ok(Self { species, by_name })
    }

    /// Catalog of the built-in species table.
    ///
    /// Skips the checks in [`SpeciesCatalog::new`]: the table is static and
    /// every entry passes them, with unique names.
    pub fn builtin() -> Self {
        let species = builtin_species();
        let by_name = species
            .iter()
            .enumerate()
            .map(|(i, def)| (def.name.clone(), SpeciesId(i as u16)))
            .collect();
        Self { species, by_name }
    }

    /// Parse a catalog from TOML (`[[species]]` tables)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.species)
    }

    /// Load a catalog from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Look up a species definition
    pub fn get(&self, id: SpeciesId) -> Result<&SpeciesDef> {
        self.species
            .get(id.0 as usize)
            .ok_or_else(|| WildlifeError::UnknownSpecies(id.to_string()))
    }

    /// Look up a single numeric attribute
    pub fn stat(&self, id: SpeciesId, stat: SpeciesStat) -> Result<f32> {
        Ok(self.get(id)?.stat(stat))
    }

    pub fn id_by_name(&self, name: &str) -> Result<SpeciesId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| WildlifeError::UnknownSpecies(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, &SpeciesDef)> + '_ {
        self.species
            .iter()
            .enumerate()
            .map(|(i, def)| (SpeciesId(i as u16), def))
    }

    pub fn list_by_habitat(&self, habitat: Habitat) -> Vec<SpeciesId> {
        self.iter()
            .filter(|(_, def)| def.habitat == habitat)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn list_by_rarity(&self, tier: RarityTier) -> Vec<SpeciesId> {
        self.iter()
            .filter(|(_, def)| def.rarity == Some(tier))
            .map(|(id, _)| id)
            .collect()
    }

    /// Pick a species living in `habitat`, weighted by spawn weight
    pub fn random_species_for_habitat(&self, habitat: Habitat, rng: &mut impl Rng) -> Option<SpeciesId> {
        self.weighted_pick(rng, |def| def.habitat == habitat)
    }

    /// Weighted pick among species matching `filter`
    pub fn weighted_pick(
        &self,
        rng: &mut impl Rng,
        filter: impl Fn(&SpeciesDef) -> bool,
    ) -> Option<SpeciesId> {
        let candidates: Vec<(SpeciesId, f32)> = self
            .iter()
            .filter(|(_, def)| filter(def) && def.spawn_weight > 0.0)
            .map(|(id, def)| (id, def.spawn_weight))
            .collect();

        let total: f32 = candidates.iter().map(|(_, w)| w).sum();
        if candidates.is_empty() || total <= 0.0 {
            return None;
        }

        let mut roll = rng.gen_range(0.0..total);
        for &(id, weight) in &candidates {
            if roll < weight {
                return Some(id);
            }
            roll -= weight;
        }
        candidates.last().map(|(id, _)| *id)
    }

    /// Payout for a kill: the tier reward, or the species bounty if untiered
    pub fn reward_for_species(&self, id: SpeciesId) -> Result<u32> {
        let def = self.get(id)?;
        Ok(match def.rarity {
            Some(tier) => reward_for_rarity(tier),
            None => def.bounty,
        })
    }
}

impl Default for SpeciesCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_def(def: &SpeciesDef) -> Result<()> {
    let invalid = |what: &str| {
        Err(WildlifeError::InvalidConfig(format!(
            "species '{}': {}",
            def.name, what
        )))
    };

    if def.name.trim().is_empty() {
        return invalid("name must not be empty");
    }
    if def.size <= 0.0 {
        return invalid("size must be positive");
    }
    if def.max_health <= 0.0 {
        return invalid("max_health must be positive");
    }
    if def.base_speed < 0.0 || def.flee_speed_multiplier <= 0.0 || def.agility <= 0.0 {
        return invalid("speeds and multipliers must be positive");
    }
    if !(def.vision_angle_degrees > 0.0 && def.vision_angle_degrees <= 360.0) {
        return invalid("vision_angle_degrees must be in (0, 360]");
    }
    if def.vision_distance < 0.0 || def.territory_radius < 0.0 || def.attack_range < 0.0 {
        return invalid("distances must not be negative");
    }
    if def.loot.iter().any(|l| l.max < l.min) {
        return invalid("loot entry max is below min");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_builtin_definitions_are_valid() {
        let catalog = SpeciesCatalog::builtin();
        for (_, def) in catalog.iter() {
            validate_def(def).unwrap();
        }
        assert!(SpeciesCatalog::new(builtin_species()).is_ok());
    }

    #[test]
    fn test_reward_mapping() {
        assert_eq!(reward_for_rarity(RarityTier::Rare), 30);
        assert_eq!(reward_for_rarity(RarityTier::SuperRare), 50);
        assert_eq!(reward_for_rarity(RarityTier::Legendary), 100);
    }

    #[test]
    fn test_unknown_species() {
        let catalog = SpeciesCatalog::builtin();
        assert!(matches!(
            catalog.get(SpeciesId(9999)),
            Err(WildlifeError::UnknownSpecies(_))
        ));
        assert!(matches!(
            catalog.id_by_name("Dodo"),
            Err(WildlifeError::UnknownSpecies(_))
        ));
    }

    #[test]
    fn test_every_habitat_and_tier_is_stocked() {
        let catalog = SpeciesCatalog::builtin();
        for habitat in Habitat::ALL {
            assert!(!catalog.list_by_habitat(habitat).is_empty(), "{:?}", habitat);
        }
        for tier in RarityTier::ALL {
            assert!(!catalog.list_by_rarity(tier).is_empty(), "{:?}", tier);
        }
    }

    #[test]
    fn test_random_species_stays_in_habitat() {
        let catalog = SpeciesCatalog::builtin();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let id = catalog.random_species_for_habitat(Habitat::Water, &mut rng).unwrap();
            assert_eq!(catalog.get(id).unwrap().habitat, Habitat::Water);
        }
    }

    #[test]
    fn test_weighting_favors_heavy_species() {
        let catalog = SpeciesCatalog::builtin();
        let trout = catalog.id_by_name("Brook Trout").unwrap();
        let gator = catalog.id_by_name("Alligator").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut trout_count = 0;
        let mut gator_count = 0;
        for _ in 0..2000 {
            match catalog.random_species_for_habitat(Habitat::Water, &mut rng) {
                Some(id) if id == trout => trout_count += 1,
                Some(id) if id == gator => gator_count += 1,
                _ => {}
            }
        }
        assert!(trout_count > gator_count * 3);
    }

    #[test]
    fn test_untiered_bounty() {
        let catalog = SpeciesCatalog::builtin();
        let wolf = catalog.id_by_name("Grey Wolf").unwrap();
        let bear = catalog.id_by_name("Grizzly Bear").unwrap();
        assert_eq!(catalog.reward_for_species(wolf).unwrap(), 25);
        assert_eq!(catalog.reward_for_species(bear).unwrap(), 100);
    }

    #[test]
    fn test_load_from_toml() {
        let catalog = SpeciesCatalog::from_toml_str(
            r#"
            [[species]]
            name = "Marsh Hen"
            habitat = "Water"
            size = 12.0
            base_speed = 40.0
            max_health = 10.0
            flee_speed_multiplier = 1.5
            rarity = "Rare"
            behavior = "Peaceful"
            threat = "Harmless"
            vision_angle_degrees = 200.0
            vision_distance = 100.0

            [[species.loot]]
            item = "feather"
            min = 1
            max = 3
            "#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 1);
        let id = catalog.id_by_name("Marsh Hen").unwrap();
        let def = catalog.get(id).unwrap();
        assert_eq!(def.rarity, Some(RarityTier::Rare));
        assert_eq!(def.agility, 1.0);
        assert_eq!(def.loot[0].chance, 1.0);
        assert_eq!(catalog.stat(id, SpeciesStat::Size).unwrap(), 12.0);
    }

    #[test]
    fn test_toml_validation_errors() {
        let result = SpeciesCatalog::from_toml_str(
            r#"
            [[species]]
            name = "Ghost"
            habitat = "Forest"
            size = 10.0
            base_speed = 40.0
            max_health = 0.0
            flee_speed_multiplier = 1.5
            behavior = "Peaceful"
            threat = "Harmless"
            vision_angle_degrees = 200.0
            vision_distance = 100.0
            "#,
        );
        assert!(matches!(result, Err(WildlifeError::InvalidConfig(_))));
    }
}
