//! Behavior states and the values state functions hand back

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;

/// Behavior state of a creature. `Dead` is terminal; every other state can
/// be re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BehaviorState {
    #[default]
    Wandering,
    Grazing,
    Alert,
    Fleeing,
    Attacking,
    Hiding,
    Roaring,
    Dead,
}

impl BehaviorState {
    /// States in which the untiered threat table may interrupt the creature
    pub fn is_calm(&self) -> bool {
        matches!(self, BehaviorState::Wandering | BehaviorState::Grazing)
    }

    /// States that hold the creature in place
    pub fn is_stationary(&self) -> bool {
        matches!(
            self,
            BehaviorState::Grazing
                | BehaviorState::Alert
                | BehaviorState::Hiding
                | BehaviorState::Roaring
                | BehaviorState::Dead
        )
    }
}

/// Switch to `state` with a fresh timer and optionally a new movement target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: BehaviorState,
    pub timer: f32,
    pub target: Option<Vec2>,
}

impl Transition {
    pub fn to(state: BehaviorState, timer: f32) -> Self {
        Self {
            state,
            timer,
            target: None,
        }
    }

    pub fn with_target(mut self, target: Vec2) -> Self {
        self.target = Some(target);
        self
    }
}

/// What the creature wants to do with its legs this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementIntent {
    Hold,
    MoveTo { target: Vec2, speed: f32 },
}

/// Result of running one state function for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateOutcome {
    pub transition: Option<Transition>,
    pub intent: MovementIntent,
    /// Turn to face this heading (degrees)
    pub face: Option<f32>,
    /// Land an attack on the player this tick
    pub attack: bool,
    /// Health restored this tick
    pub heal: f32,
    /// Start a period of heightened wariness
    pub become_wary: bool,
}

impl StateOutcome {
    pub fn hold() -> Self {
        Self {
            transition: None,
            intent: MovementIntent::Hold,
            face: None,
            attack: false,
            heal: 0.0,
            become_wary: false,
        }
    }

    pub fn move_to(target: Vec2, speed: f32) -> Self {
        Self {
            intent: MovementIntent::MoveTo { target, speed },
            ..Self::hold()
        }
    }

    pub fn then(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn facing(mut self, heading: f32) -> Self {
        self.face = Some(heading);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calm_states() {
        assert!(BehaviorState::Wandering.is_calm());
        assert!(BehaviorState::Grazing.is_calm());
        assert!(!BehaviorState::Alert.is_calm());
        assert!(!BehaviorState::Dead.is_calm());
    }

    #[test]
    fn test_outcome_builders() {
        let outcome = StateOutcome::move_to(Vec2::new(1.0, 2.0), 5.0)
            .then(Transition::to(BehaviorState::Fleeing, 3.0).with_target(Vec2::new(1.0, 2.0)))
            .facing(90.0);
        assert_eq!(outcome.face, Some(90.0));
        assert_eq!(outcome.transition.unwrap().state, BehaviorState::Fleeing);
        assert!(matches!(outcome.intent, MovementIntent::MoveTo { speed, .. } if speed == 5.0));
        assert!(!outcome.attack);
    }
}
