//! Built-in species table
//!
//! Forest, plains, hills and water species. Untiered entries (no rarity)
//! exercise the legacy threat table; everything else follows its tier policy.

use super::{BehaviorTag, LootEntry, RarityTier, SpeciesDef, ThreatLevel};
use crate::terrain::Habitat;

fn loot(entries: &[(&str, u32, u32, f64)]) -> Vec<LootEntry> {
    entries
        .iter()
        .map(|&(item, min, max, chance)| LootEntry {
            item: item.to_string(),
            min,
            max,
            chance,
        })
        .collect()
}

/// Shared shape for the table below; per-species overrides follow
#[allow(clippy::too_many_arguments)]
fn species(
    name: &str,
    habitat: Habitat,
    rarity: Option<RarityTier>,
    behavior: BehaviorTag,
    threat: ThreatLevel,
    size: f32,
    base_speed: f32,
    max_health: f32,
) -> SpeciesDef {
    SpeciesDef {
        name: name.to_string(),
        habitat,
        size,
        base_speed,
        max_health,
        damage: 0.0,
        agility: 1.0,
        attack_range: 0.0,
        territory_radius: 0.0,
        flee_speed_multiplier: 1.5,
        rarity,
        behavior,
        threat,
        apex: false,
        can_traverse_water: false,
        vision_angle_degrees: 180.0,
        vision_distance: 200.0,
        spawn_weight: 1.0,
        bounty: 0,
        loot: Vec::new(),
    }
}

pub fn builtin_species() -> Vec<SpeciesDef> {
    use BehaviorTag::*;
    use Habitat::*;
    use ThreatLevel::*;

    vec![
        // === FOREST ===
        SpeciesDef {
            flee_speed_multiplier: 1.8,
            can_traverse_water: true,
            vision_angle_degrees: 240.0,
            vision_distance: 260.0,
            spawn_weight: 3.0,
            loot: loot(&[("venison", 2, 4, 1.0), ("deer_hide", 1, 1, 1.0), ("antler", 1, 2, 0.4)]),
            ..species("Deer", Forest, Some(RarityTier::Rare), Peaceful, Harmless, 28.0, 70.0, 60.0)
        },
        SpeciesDef {
            damage: 4.0,
            agility: 1.2,
            attack_range: 20.0,
            flee_speed_multiplier: 1.6,
            vision_angle_degrees: 200.0,
            vision_distance: 220.0,
            spawn_weight: 2.0,
            loot: loot(&[("fox_pelt", 1, 1, 1.0), ("raw_meat", 1, 1, 0.7)]),
            ..species("Red Fox", Forest, Some(RarityTier::Rare), Peaceful, Low, 20.0, 80.0, 40.0)
        },
        SpeciesDef {
            damage: 12.0,
            agility: 1.3,
            attack_range: 28.0,
            flee_speed_multiplier: 1.4,
            vision_angle_degrees: 160.0,
            spawn_weight: 1.5,
            loot: loot(&[("pork", 3, 5, 1.0), ("tusk", 1, 2, 0.6)]),
            ..species("Wild Boar", Forest, Some(RarityTier::SuperRare), Defensive, High, 32.0, 60.0, 120.0)
        },
        SpeciesDef {
            damage: 18.0,
            agility: 1.1,
            attack_range: 36.0,
            flee_speed_multiplier: 1.3,
            can_traverse_water: true,
            vision_distance: 220.0,
            loot: loot(&[("moose_meat", 4, 7, 1.0), ("moose_antler", 1, 2, 0.8)]),
            ..species("Moose", Forest, Some(RarityTier::SuperRare), Defensive, Medium, 48.0, 55.0, 200.0)
        },
        SpeciesDef {
            damage: 30.0,
            agility: 1.4,
            attack_range: 40.0,
            territory_radius: 250.0,
            flee_speed_multiplier: 1.2,
            apex: true,
            can_traverse_water: true,
            vision_angle_degrees: 120.0,
            vision_distance: 280.0,
            spawn_weight: 0.5,
            loot: loot(&[("bear_meat", 5, 8, 1.0), ("bear_pelt", 1, 1, 1.0), ("bear_claw", 2, 4, 0.5)]),
            ..species("Grizzly Bear", Forest, Some(RarityTier::Legendary), Territorial, Extreme, 50.0, 65.0, 300.0)
        },
        SpeciesDef {
            flee_speed_multiplier: 2.0,
            vision_angle_degrees: 270.0,
            vision_distance: 150.0,
            spawn_weight: 2.5,
            bounty: 5,
            loot: loot(&[("squirrel_tail", 1, 1, 0.5)]),
            ..species("Squirrel", Forest, None, Peaceful, Harmless, 10.0, 90.0, 15.0)
        },
        SpeciesDef {
            damage: 14.0,
            agility: 1.5,
            attack_range: 30.0,
            territory_radius: 180.0,
            flee_speed_multiplier: 1.2,
            vision_angle_degrees: 140.0,
            vision_distance: 260.0,
            bounty: 25,
            loot: loot(&[("wolf_pelt", 1, 1, 1.0), ("raw_meat", 1, 2, 0.8)]),
            ..species("Grey Wolf", Forest, None, Territorial, High, 30.0, 85.0, 90.0)
        },
        // === PLAINS ===
        SpeciesDef {
            flee_speed_multiplier: 2.0,
            vision_angle_degrees: 300.0,
            spawn_weight: 3.0,
            loot: loot(&[("rabbit_meat", 1, 2, 1.0), ("rabbit_fur", 1, 1, 0.8)]),
            ..species("Hare", Plains, Some(RarityTier::Rare), Peaceful, Harmless, 14.0, 95.0, 20.0)
        },
        SpeciesDef {
            damage: 22.0,
            attack_range: 40.0,
            flee_speed_multiplier: 1.3,
            vision_angle_degrees: 150.0,
            loot: loot(&[("bison_meat", 5, 9, 1.0), ("bison_hide", 1, 2, 1.0)]),
            ..species("Bison", Plains, Some(RarityTier::SuperRare), Defensive, High, 56.0, 50.0, 260.0)
        },
        SpeciesDef {
            damage: 6.0,
            attack_range: 24.0,
            territory_radius: 120.0,
            flee_speed_multiplier: 1.3,
            vision_distance: 180.0,
            spawn_weight: 2.0,
            bounty: 10,
            loot: loot(&[("goose_meat", 1, 2, 1.0), ("feather", 2, 5, 0.9)]),
            ..species("Canada Goose", Plains, None, Territorial, Medium, 22.0, 55.0, 35.0)
        },
        // === HILLS ===
        SpeciesDef {
            flee_speed_multiplier: 1.7,
            vision_angle_degrees: 220.0,
            vision_distance: 240.0,
            spawn_weight: 2.0,
            loot: loot(&[("goat_meat", 2, 3, 1.0), ("goat_horn", 1, 2, 0.5)]),
            ..species("Mountain Goat", Hills, Some(RarityTier::Rare), Peaceful, Low, 26.0, 75.0, 55.0)
        },
        SpeciesDef {
            damage: 24.0,
            agility: 1.6,
            attack_range: 34.0,
            territory_radius: 220.0,
            flee_speed_multiplier: 1.2,
            vision_angle_degrees: 130.0,
            vision_distance: 300.0,
            spawn_weight: 0.6,
            loot: loot(&[("cougar_pelt", 1, 1, 1.0), ("raw_meat", 2, 3, 1.0)]),
            ..species("Mountain Lion", Hills, Some(RarityTier::Legendary), Territorial, High, 38.0, 80.0, 180.0)
        },
        SpeciesDef {
            damage: 8.0,
            agility: 1.1,
            attack_range: 20.0,
            flee_speed_multiplier: 1.2,
            vision_distance: 160.0,
            spawn_weight: 1.5,
            bounty: 12,
            loot: loot(&[("badger_pelt", 1, 1, 1.0)]),
            ..species("Badger", Hills, None, Defensive, Medium, 18.0, 45.0, 50.0)
        },
        // === WATER ===
        SpeciesDef {
            vision_distance: 120.0,
            spawn_weight: 3.0,
            loot: loot(&[("trout", 1, 1, 1.0)]),
            ..species("Brook Trout", Water, Some(RarityTier::Rare), Peaceful, Harmless, 12.0, 60.0, 15.0)
        },
        SpeciesDef {
            damage: 5.0,
            agility: 1.2,
            attack_range: 18.0,
            flee_speed_multiplier: 1.3,
            vision_angle_degrees: 140.0,
            vision_distance: 150.0,
            spawn_weight: 1.5,
            loot: loot(&[("pike", 1, 1, 1.0)]),
            ..species("Northern Pike", Water, Some(RarityTier::SuperRare), Defensive, Low, 24.0, 70.0, 40.0)
        },
        SpeciesDef {
            damage: 35.0,
            agility: 1.3,
            attack_range: 42.0,
            territory_radius: 160.0,
            flee_speed_multiplier: 1.1,
            vision_angle_degrees: 160.0,
            vision_distance: 240.0,
            spawn_weight: 0.4,
            loot: loot(&[("gator_hide", 1, 1, 1.0), ("gator_tooth", 2, 6, 0.7)]),
            ..species("Alligator", Water, Some(RarityTier::Legendary), Territorial, Extreme, 60.0, 45.0, 280.0)
        },
    ]
}
