//! Decision policy and per-state behavior functions
//!
//! The policy (tier rules, legacy threat table, territory) may force a state
//! change before the current state runs. Each state then has its own
//! function returning a [`StateOutcome`]; none of them mutate the creature.

use rand::Rng;

use super::movement::{flee_target, pick_wander_target};
use super::{BehaviorState, Creature, MovementIntent, Perception, StateOutcome, TickContext, Transition};
use crate::core::config::BehaviorConfig;
use crate::species::{BehaviorTag, RarityTier, SpeciesDef, ThreatLevel};

impl Creature {
    /// Tier policy, legacy threat table and territory check, in that order.
    /// A rarity tier always takes precedence over the legacy tags.
    pub(crate) fn apply_policy(
        &mut self,
        def: &SpeciesDef,
        perception: &Perception,
        ctx: &TickContext<'_>,
        rng: &mut impl Rng,
    ) {
        let config = ctx.config;

        let forced = match def.rarity {
            Some(RarityTier::Rare) => {
                let wary_close =
                    self.is_wary() && perception.distance < self.detection_radius(config);
                if (perception.sees_player || wary_close) && self.state != BehaviorState::Fleeing {
                    Some(self.flee_from_player(config.rare_flee_duration.roll(rng), ctx, rng))
                } else {
                    None
                }
            }
            // Super-rare creatures ignore sightings and only answer damage
            Some(RarityTier::SuperRare) => None,
            Some(RarityTier::Legendary) => {
                (perception.sees_player && self.state != BehaviorState::Attacking)
                    .then(|| Transition::to(BehaviorState::Attacking, 0.0).with_target(ctx.player))
            }
            None => {
                if self.state.is_calm() && perception.distance < self.detection_radius(config) {
                    Some(self.legacy_reaction(def, perception, ctx, rng))
                } else {
                    None
                }
            }
        };

        if let Some(transition) = forced {
            self.apply_transition(transition);
        }

        if def.has_territory() && !matches!(def.rarity, Some(RarityTier::Rare | RarityTier::SuperRare)) {
            self.check_territory(def, perception, ctx, rng);
        }
    }

    fn check_territory(
        &mut self,
        def: &SpeciesDef,
        perception: &Perception,
        ctx: &TickContext<'_>,
        rng: &mut impl Rng,
    ) {
        let Some(territory) = self.territory else {
            return;
        };

        if territory.contains(ctx.player) {
            if !self.territory_intruded {
                tracing::debug!("{} {:?}: territory intruded", def.name, self.id);
            }
            self.territory_intruded = true;
            if self.state != BehaviorState::Attacking {
                self.apply_transition(
                    Transition::to(BehaviorState::Attacking, 0.0).with_target(ctx.player),
                );
            }
        } else if self.territory_intruded {
            self.territory_intruded = false;
            // A legendary that can still see the player keeps chasing on sight
            let seen_by_legendary =
                def.rarity == Some(RarityTier::Legendary) && perception.sees_player;
            if !def.apex && self.state == BehaviorState::Attacking && !seen_by_legendary {
                let target = pick_wander_target(
                    &self.habitat,
                    ctx.terrain,
                    self.position,
                    ctx.config.wander_target_attempts,
                    rng,
                );
                self.apply_transition(
                    Transition::to(BehaviorState::Wandering, ctx.config.wander_duration.roll(rng))
                        .with_target(target),
                );
            }
        }
    }

    /// Threat-level / temperament table for species without a rarity tier
    fn legacy_reaction(
        &self,
        def: &SpeciesDef,
        perception: &Perception,
        ctx: &TickContext<'_>,
        rng: &mut impl Rng,
    ) -> Transition {
        let config = ctx.config;
        let close = perception.distance < config.detection_radius * config.close_threat_fraction;
        let attack = || Transition::to(BehaviorState::Attacking, 0.0).with_target(ctx.player);

        match (def.threat, def.behavior) {
            (ThreatLevel::Harmless | ThreatLevel::Low, _)
            | (ThreatLevel::Medium, BehaviorTag::Peaceful) => {
                self.flee_from_player(config.flee_duration.roll(rng), ctx, rng)
            }
            (ThreatLevel::High | ThreatLevel::Extreme, BehaviorTag::Peaceful) => {
                Transition::to(BehaviorState::Alert, config.alert_duration.roll(rng))
            }
            (_, BehaviorTag::Defensive) => {
                if close {
                    attack()
                } else {
                    Transition::to(BehaviorState::Alert, config.alert_duration.roll(rng))
                }
            }
            (_, BehaviorTag::Territorial) => {
                if close {
                    attack()
                } else {
                    Transition::to(BehaviorState::Roaring, config.roar_duration.roll(rng))
                }
            }
        }
    }

    fn flee_from_player(&self, duration: f32, ctx: &TickContext<'_>, rng: &mut impl Rng) -> Transition {
        let target = flee_target(
            self.position,
            ctx.player,
            ctx.config.flee_distance,
            &self.habitat,
            rng,
        );
        Transition::to(BehaviorState::Fleeing, duration).with_target(target)
    }
}

/// Run the function for the creature's current state
pub fn execute_state(
    creature: &Creature,
    def: &SpeciesDef,
    perception: &Perception,
    ctx: &TickContext<'_>,
    rng: &mut impl Rng,
) -> StateOutcome {
    match creature.state {
        BehaviorState::Wandering => wandering(creature, def, ctx, rng),
        BehaviorState::Grazing => grazing(creature, def, ctx, rng),
        BehaviorState::Alert => alert(creature, def, perception, ctx, rng),
        BehaviorState::Fleeing => fleeing(creature, def, perception, ctx, rng),
        BehaviorState::Attacking => attacking(creature, def, perception, ctx, rng),
        BehaviorState::Hiding => hiding(creature, def, ctx, rng),
        BehaviorState::Roaring => roaring(creature, perception, ctx, rng),
        BehaviorState::Dead => StateOutcome::hold(),
    }
}

fn new_wander_leg(creature: &Creature, def: &SpeciesDef, ctx: &TickContext<'_>, rng: &mut impl Rng) -> StateOutcome {
    let config = ctx.config;
    let target = pick_wander_target(
        &creature.habitat,
        ctx.terrain,
        creature.position,
        config.wander_target_attempts,
        rng,
    );
    StateOutcome::move_to(target, def.base_speed * config.wander_speed_fraction).then(
        Transition::to(BehaviorState::Wandering, config.wander_duration.roll(rng)).with_target(target),
    )
}

fn wandering(creature: &Creature, def: &SpeciesDef, ctx: &TickContext<'_>, rng: &mut impl Rng) -> StateOutcome {
    let config = ctx.config;
    let arrived = creature.position.distance(&creature.target) <= config.arrival_distance;

    if arrived || creature.state_timer <= 0.0 {
        if rng.gen_bool(config.graze_chance) {
            return StateOutcome::hold().then(Transition::to(
                BehaviorState::Grazing,
                config.graze_duration.roll(rng),
            ));
        }
        return new_wander_leg(creature, def, ctx, rng);
    }

    StateOutcome::move_to(creature.target, def.base_speed * config.wander_speed_fraction)
}

fn grazing(creature: &Creature, def: &SpeciesDef, ctx: &TickContext<'_>, rng: &mut impl Rng) -> StateOutcome {
    if creature.state_timer <= 0.0 {
        return new_wander_leg(creature, def, ctx, rng);
    }
    StateOutcome::hold()
}

fn alert(
    creature: &Creature,
    def: &SpeciesDef,
    perception: &Perception,
    ctx: &TickContext<'_>,
    rng: &mut impl Rng,
) -> StateOutcome {
    let config = ctx.config;
    if creature.state_timer > 0.0 {
        return StateOutcome::hold().facing(perception.bearing_deg);
    }

    // Watch is over: decide what the player's position now means
    let nearby = perception.distance < creature.detection_radius(config);
    let attack = || {
        StateOutcome::hold()
            .then(Transition::to(BehaviorState::Attacking, 0.0).with_target(ctx.player))
    };

    match def.rarity {
        Some(RarityTier::SuperRare) => new_wander_leg(creature, def, ctx, rng),
        Some(RarityTier::Legendary) if perception.sees_player || nearby => attack(),
        _ if nearby && def.is_aggressive() => attack(),
        _ if nearby => {
            let duration = if def.rarity == Some(RarityTier::Rare) {
                config.rare_flee_duration.roll(rng)
            } else {
                config.flee_duration.roll(rng)
            };
            let target = flee_target(creature.position, ctx.player, config.flee_distance, &creature.habitat, rng);
            StateOutcome::hold().then(Transition::to(BehaviorState::Fleeing, duration).with_target(target))
        }
        _ => new_wander_leg(creature, def, ctx, rng),
    }
}

/// Flee speed with the rare-tier and injury boosts applied
pub fn flee_speed(creature: &Creature, def: &SpeciesDef, config: &BehaviorConfig) -> f32 {
    let mut speed = def.base_speed * def.flee_speed_multiplier;
    if def.rarity == Some(RarityTier::Rare) {
        speed *= config.rare_flee_speed_multiplier;
    }
    if creature.injured {
        speed *= config.injured_flee_speed_multiplier;
    }
    speed
}

fn fleeing(
    creature: &Creature,
    def: &SpeciesDef,
    perception: &Perception,
    ctx: &TickContext<'_>,
    rng: &mut impl Rng,
) -> StateOutcome {
    let config = ctx.config;
    let safety_multiplier = if def.rarity == Some(RarityTier::Rare) {
        config.rare_safety_distance_multiplier
    } else {
        config.safety_distance_multiplier
    };
    let safe = perception.distance > config.detection_radius * safety_multiplier;

    if creature.state_timer <= 0.0 || safe {
        return StateOutcome::hold().then(Transition::to(
            BehaviorState::Hiding,
            config.hide_duration.roll(rng),
        ));
    }

    let arrived = creature.position.distance(&creature.target) <= config.arrival_distance;
    let mut target = creature.target;
    if arrived || rng.gen_bool(config.flee_reaim_chance) {
        target = flee_target(creature.position, ctx.player, config.flee_distance, &creature.habitat, rng);
    }

    if creature.injured && rng.gen_bool(config.erratic_turn_chance) {
        let turn = rng.gen_range(-config.erratic_turn_max_deg..=config.erratic_turn_max_deg);
        let offset = (target - creature.position).rotated_deg(turn);
        target = creature.habitat.bounds.clamp(creature.position + offset);
    }

    StateOutcome::move_to(target, flee_speed(creature, def, config))
}

fn attacking(
    creature: &Creature,
    def: &SpeciesDef,
    perception: &Perception,
    ctx: &TickContext<'_>,
    rng: &mut impl Rng,
) -> StateOutcome {
    let config = ctx.config;

    // Apex and legendary hunters only break off once the player is out of sight
    let sight_bound = def.apex || def.rarity == Some(RarityTier::Legendary);
    let gave_up = if sight_bound {
        !perception.sees_player
    } else if let Some(territory) = creature.territory {
        territory.center.distance(&ctx.player) > territory.radius * config.territory_exit_multiplier
    } else {
        perception.distance > config.detection_radius * config.chase_abandon_multiplier
    };

    if gave_up {
        if def.apex {
            return StateOutcome::hold().then(Transition::to(
                BehaviorState::Alert,
                config.alert_duration.roll(rng),
            ));
        }
        return new_wander_leg(creature, def, ctx, rng);
    }

    if perception.distance <= def.attack_range {
        let off_cooldown = creature
            .last_attack_at
            .map_or(true, |t| ctx.now - t >= config.attack_cooldown as f64);
        let mut outcome = StateOutcome::hold().facing(perception.bearing_deg);
        outcome.attack = off_cooldown && def.damage > 0.0;
        return outcome;
    }

    StateOutcome {
        intent: MovementIntent::MoveTo {
            target: ctx.player,
            speed: def.base_speed * def.agility,
        },
        ..StateOutcome::hold()
    }
}

fn hiding(creature: &Creature, def: &SpeciesDef, ctx: &TickContext<'_>, rng: &mut impl Rng) -> StateOutcome {
    let config = ctx.config;
    let rare_and_hurt = def.rarity == Some(RarityTier::Rare) && creature.injured;

    if creature.state_timer <= 0.0 {
        if rare_and_hurt {
            let mut outcome = StateOutcome::hold().then(Transition::to(
                BehaviorState::Alert,
                config.extended_alert_duration.roll(rng),
            ));
            outcome.become_wary = true;
            return outcome;
        }
        return new_wander_leg(creature, def, ctx, rng);
    }

    let mut outcome = StateOutcome::hold();
    if rare_and_hurt {
        outcome.heal = config.hide_regen_per_sec * ctx.dt;
    }
    outcome
}

fn roaring(creature: &Creature, perception: &Perception, ctx: &TickContext<'_>, rng: &mut impl Rng) -> StateOutcome {
    if creature.state_timer <= 0.0 {
        return StateOutcome::hold().then(Transition::to(
            BehaviorState::Alert,
            ctx.config.alert_duration.roll(rng),
        ));
    }
    StateOutcome::hold().facing(perception.bearing_deg)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::core::types::Vec2;

    fn run(c: &mut Creature, d: &SpeciesDef, config: &BehaviorConfig, player: Vec2, dt: f32) {
        c.update(d, &ctx(config, player, dt), &mut rng());
    }

    #[test]
    fn test_rare_flees_on_sight() {
        let config = BehaviorConfig::default();
        let d = def("Deer");
        let mut c = spawn(&d, Vec2::ZERO);
        run(&mut c, &d, &config, Vec2::new(100.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Fleeing);
        assert!(c.target().x < 0.0);
        assert!(c.state_timer() <= config.rare_flee_duration.max);
    }

    #[test]
    fn test_super_rare_ignores_sighting() {
        let config = BehaviorConfig::default();
        let d = def("Wild Boar");
        let mut c = spawn(&d, Vec2::ZERO);
        run(&mut c, &d, &config, Vec2::new(40.0, 0.0), 0.1);
        assert!(c.state().is_calm());
    }

    #[test]
    fn test_legendary_attacks_on_sight() {
        let config = BehaviorConfig::default();
        let d = def("Mountain Lion");
        let mut c = spawn(&d, Vec2::ZERO);
        // Inside the cone but outside the 220 territory
        run(&mut c, &d, &config, Vec2::new(260.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Attacking);
    }

    #[test]
    fn test_legendary_keeps_attacking_far_from_its_territory() {
        let config = BehaviorConfig::default();
        let d = def("Mountain Lion"); // territory 220 around the spawn point
        let mut c = spawn(&d, Vec2::ZERO);
        c.position = Vec2::new(300.0, 0.0);
        let mut r = rng();

        for _ in 0..5 {
            // Well past twice the territory radius, still in plain sight
            let player = Vec2::new(c.position().x + 200.0, 0.0);
            c.update(&d, &ctx(&config, player, 0.1), &mut r);
            assert_eq!(c.state(), BehaviorState::Attacking);
        }
    }

    #[test]
    fn test_legacy_territorial_roars_then_attacks_up_close() {
        let config = BehaviorConfig::default();
        let d = def("Grey Wolf"); // territory 180, detection 200
        let mut c = spawn(&d, Vec2::ZERO);
        c.territory = None;
        run(&mut c, &d, &config, Vec2::new(150.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Roaring);

        let mut c = spawn(&d, Vec2::ZERO);
        c.territory = None;
        run(&mut c, &d, &config, Vec2::new(50.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Attacking);
    }

    #[test]
    fn test_legacy_harmless_flees() {
        let config = BehaviorConfig::default();
        let d = def("Squirrel");
        let mut c = spawn(&d, Vec2::ZERO);
        run(&mut c, &d, &config, Vec2::new(-120.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Fleeing);
    }

    #[test]
    fn test_legacy_ignores_player_outside_detection() {
        let config = BehaviorConfig::default();
        let d = def("Badger");
        let mut c = spawn(&d, Vec2::ZERO);
        run(&mut c, &d, &config, Vec2::new(500.0, 0.0), 0.1);
        assert!(c.state().is_calm());
    }

    #[test]
    fn test_territory_intrusion_and_release() {
        let config = BehaviorConfig::default();
        let d = def("Canada Goose"); // untiered territorial, radius 120
        let mut c = spawn(&d, Vec2::ZERO);
        c.facing_deg = 180.0; // looking away
        run(&mut c, &d, &config, Vec2::new(100.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Attacking);

        run(&mut c, &d, &config, Vec2::new(2000.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Wandering);
    }

    #[test]
    fn test_attack_respects_cooldown() {
        let config = BehaviorConfig::default();
        let d = def("Grizzly Bear");
        let mut c = spawn(&d, Vec2::ZERO);
        let player = Vec2::new(20.0, 0.0);
        let mut r = rng();

        let mut context = ctx(&config, player, 0.1);
        let first = c.update(&d, &context, &mut r);
        assert_eq!(c.state(), BehaviorState::Attacking);
        assert_eq!(first.map(|a| a.damage), Some(d.damage));

        context.now += 0.5;
        assert!(c.update(&d, &context, &mut r).is_none());

        context.now += config.attack_cooldown as f64;
        assert!(c.update(&d, &context, &mut r).is_some());
    }

    #[test]
    fn test_apex_gives_up_when_player_out_of_perception() {
        let config = BehaviorConfig::default();
        let d = def("Grizzly Bear");
        let mut c = spawn(&d, Vec2::ZERO);
        run(&mut c, &d, &config, Vec2::new(100.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Attacking);
        run(&mut c, &d, &config, Vec2::new(3000.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Alert);
    }

    #[test]
    fn test_flee_ends_in_hiding_when_safe() {
        let config = BehaviorConfig::default();
        let d = def("Hare");
        let mut c = spawn(&d, Vec2::ZERO);
        run(&mut c, &d, &config, Vec2::new(50.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Fleeing);
        // Player now beyond 4x detection
        c.facing_deg = 0.0;
        run(&mut c, &d, &config, Vec2::new(-900.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Hiding);
        assert_eq!(c.speed(), 0.0);
    }

    #[test]
    fn test_rare_injured_hides_regenerates_then_turns_wary() {
        let config = BehaviorConfig::default();
        let d = def("Deer");
        let mut c = spawn(&d, Vec2::ZERO);
        c.set_health(30.0);
        c.state = BehaviorState::Hiding;
        c.state_timer = 1.0;

        let far = Vec2::new(4000.0, 4000.0);
        run(&mut c, &d, &config, far, 0.5);
        assert!(c.health() > 30.0);
        assert_eq!(c.state(), BehaviorState::Hiding);

        run(&mut c, &d, &config, far, 0.6);
        assert_eq!(c.state(), BehaviorState::Alert);
        assert!(c.is_wary());
        assert!(c.detection_radius(&config) > config.detection_radius);
        assert!(c.state_timer() >= config.extended_alert_duration.min - 0.01);
    }

    #[test]
    fn test_flee_speed_boosts() {
        let config = BehaviorConfig::default();
        let d = def("Deer");
        let mut c = spawn(&d, Vec2::ZERO);
        let base = d.base_speed * d.flee_speed_multiplier;
        assert!((flee_speed(&c, &d, &config) - base * 1.5).abs() < 1e-3);
        c.set_health(10.0);
        assert!((flee_speed(&c, &d, &config) - base * 1.5 * 1.25).abs() < 1e-3);
    }

    #[test]
    fn test_roaring_decays_into_alert() {
        let config = BehaviorConfig::default();
        let d = def("Grey Wolf");
        let mut c = spawn(&d, Vec2::ZERO);
        c.territory = None;
        c.state = BehaviorState::Roaring;
        c.state_timer = 0.05;
        run(&mut c, &d, &config, Vec2::new(150.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Alert);
    }

    #[test]
    fn test_dead_creature_never_updates() {
        let config = BehaviorConfig::default();
        let d = def("Deer");
        let mut c = spawn(&d, Vec2::ZERO);
        c.set_health(0.0);
        run(&mut c, &d, &config, Vec2::new(10.0, 0.0), 0.1);
        assert_eq!(c.state(), BehaviorState::Dead);
        assert_eq!(c.position(), Vec2::ZERO);
    }
}
