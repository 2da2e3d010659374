//! Player projectiles: straight-line flight, expiry and collision with
//! creatures.
//!
//! Each tick the caller advances every projectile first, then resolves
//! collisions against the population. A projectile damages at most one
//! creature and is removed the moment it does.

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::core::config::ProjectileConfig;
use crate::core::error::Result;
use crate::core::types::{CreatureId, ProjectileId, Rect, SimTime, Vec2};
use crate::creature::{Attacker, DamageEvent};
use crate::population::PopulationManager;
use crate::species::SpeciesCatalog;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub origin: Vec2,
    pub position: Vec2,
    /// Position at the start of the last step, for swept collision
    pub previous: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub elapsed: f32,
    pub max_lifetime: f32,
    pub active: bool,
}

impl Projectile {
    /// Where along the last step (0 = previous, 1 = position) the
    /// projectile's box of half-size `half_extent` first touches `body`
    pub fn step_entry(&self, body: &Rect, half_extent: f32) -> Option<f32> {
        body.expanded(half_extent)
            .segment_entry(self.previous, self.position)
    }
}

/// A projectile struck a creature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectileHit {
    pub projectile: ProjectileId,
    pub creature: CreatureId,
    pub damage: f32,
    pub impact: Vec2,
    pub killed: bool,
}

pub struct ProjectileSystem {
    config: ProjectileConfig,
    bounds: Rect,
    projectiles: Vec<Projectile>,
    next_id: u64,
}

impl ProjectileSystem {
    /// `world_bounds` plus the configured margin is the flight envelope
    pub fn new(config: ProjectileConfig, world_bounds: Rect) -> Self {
        Self {
            bounds: world_bounds.expanded(config.bounds_margin),
            config,
            projectiles: Vec::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    /// Launch a projectile from `origin` toward `target`.
    ///
    /// Returns `None` when `origin` and `target` coincide (no direction).
    pub fn fire(&mut self, origin: Vec2, target: Vec2, damage: f32) -> Option<ProjectileId> {
        let direction = target - origin;
        if direction.length() <= f32::EPSILON {
            tracing::trace!("Projectile not fired: zero-length aim");
            return None;
        }

        let id = ProjectileId(self.next_id);
        self.next_id += 1;
        self.projectiles.push(Projectile {
            id,
            origin,
            position: origin,
            previous: origin,
            velocity: direction.normalize() * self.config.speed,
            damage,
            elapsed: 0.0,
            max_lifetime: self.config.max_lifetime,
            active: true,
        });
        Some(id)
    }

    /// Move every projectile, then drop the ones that expired or left the
    /// world
    pub fn advance_all(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for p in self.projectiles.iter_mut().filter(|p| p.active) {
            p.previous = p.position;
            p.position = p.position + p.velocity * dt;
            p.elapsed += dt;
            if p.elapsed >= p.max_lifetime || !self.bounds.contains(p.position) {
                p.active = false;
            }
        }
        self.projectiles.retain(|p| p.active);
    }

    /// Sweep every projectile's box along its last step against live
    /// creature bodies. The body touched earliest along the step takes the
    /// damage once and consumes the projectile.
    pub fn resolve_collisions(
        &mut self,
        population: &mut PopulationManager,
        catalog: &SpeciesCatalog,
    ) -> Result<Vec<ProjectileHit>> {
        let mut hits = Vec::new();
        if self.projectiles.is_empty() {
            return Ok(hits);
        }
        let mut bodies = population.live_bounds(catalog);

        for p in self.projectiles.iter_mut().filter(|p| p.active) {
            let half_extent = self.config.half_extent;
            let Some((_, slot)) = bodies
                .iter()
                .enumerate()
                .filter_map(|(slot, (_, body))| {
                    p.step_entry(body, half_extent).map(|t| (OrderedFloat(t), slot))
                })
                .min()
            else {
                continue;
            };
            let (creature, body) = bodies[slot];
            p.active = false;

            let event = DamageEvent {
                source: Attacker::Player,
                target: creature,
                amount: p.damage,
                origin: p.origin,
            };
            let Some(outcome) = population.apply_damage(catalog, &event)? else {
                continue;
            };
            if outcome.killed {
                bodies.swap_remove(slot);
            }
            tracing::trace!("Projectile {:?} hit {:?} for {}", p.id, creature, outcome.dealt);
            hits.push(ProjectileHit {
                projectile: p.id,
                creature,
                damage: outcome.dealt,
                impact: body.center(),
                killed: outcome.killed,
            });
        }

        self.projectiles.retain(|p| p.active);
        Ok(hits)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
    }
}

/// Caller-side rate limiter for the fire button
#[derive(Debug, Clone, Copy)]
pub struct FireGate {
    cooldown: f64,
    last_shot: Option<SimTime>,
}

impl FireGate {
    pub fn new(fire_rate: f32) -> Self {
        let cooldown = if fire_rate > 0.0 { 1.0 / fire_rate as f64 } else { 0.0 };
        Self {
            cooldown,
            last_shot: None,
        }
    }

    /// True (and the shot is recorded) if the cooldown has elapsed at `now`
    pub fn try_fire(&mut self, now: SimTime) -> bool {
        if let Some(last) = self.last_shot {
            if now - last < self.cooldown {
                return false;
            }
        }
        self.last_shot = Some(now);
        true
    }
}
