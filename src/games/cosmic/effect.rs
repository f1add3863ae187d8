//! Effect evaluation: turns an upgrade level into its contribution.
//!
//! Evaluation is pure. The one state-dependent effect (Cosmic Forge) takes a
//! shared `&GameState`, so nothing evaluated during a tick can observe a
//! half-applied update.

use super::catalog::{self, Effect, UpgradeDef, GAS_GIANT_SIPHON, GAS_HARVESTER};
use super::state::GameState;

#[cfg(test)]
impl Effect {
    /// Value at level 0: 0 for additive production, 1 for multipliers.
    pub fn neutral(&self) -> f64 {
        match self {
            Effect::Additive { .. } => 0.0,
            Effect::Boost { .. } | Effect::Discount { .. } | Effect::NebulaForge { .. } => 1.0,
        }
    }

    /// True for effects that scale a cost down instead of production up.
    pub fn is_discount(&self) -> bool {
        matches!(self, Effect::Discount { .. })
    }
}

/// Contribution of `def` at `level`.
///
/// `state` is only read by [`Effect::NebulaForge`]; without it the forge
/// reports its neutral value.
pub fn evaluate(def: &UpgradeDef, level: u32, state: Option<&GameState>) -> f64 {
    let l = level as f64;
    match def.effect {
        Effect::Additive { per_level } => l * per_level,
        Effect::Boost { per_level } => 1.0 + l * per_level,
        // Bounded below so a cost can never reach zero.
        Effect::Discount { per_level, floor } => (1.0 - l * per_level).max(floor),
        Effect::NebulaForge { per_level } => match state {
            Some(state) => 1.0 + l * per_level * base_nebula_rate(state),
            None => 1.0,
        },
    }
}

/// Evaluate the catalog upgrade `id` at its current level in `state`.
/// Unknown ids contribute 0.
pub fn current(state: &GameState, id: &str) -> f64 {
    catalog::find(id).map_or(0.0, |def| evaluate(def, state.level(id), Some(state)))
}

/// Nebula Gas per second before condenser boosts.
pub fn base_nebula_rate(state: &GameState) -> f64 {
    additive(state, GAS_HARVESTER) + additive(state, GAS_GIANT_SIPHON)
}

fn additive(state: &GameState, id: &str) -> f64 {
    catalog::find(id).map_or(0.0, |def| evaluate(def, state.level(id), None))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::games::cosmic::catalog::all_upgrades;
    use proptest::prelude::*;

    fn arb_def() -> impl Strategy<Value = &'static UpgradeDef> {
        (0..all_upgrades().len()).prop_map(|i| &all_upgrades()[i])
    }

    proptest! {
        #[test]
        fn prop_production_effects_never_decrease(def in arb_def(), level in 0u32..10_000) {
            prop_assume!(!def.effect.is_discount());
            let state = GameState::new(0.0);
            let a = evaluate(def, level, Some(&state));
            let b = evaluate(def, level + 1, Some(&state));
            prop_assert!(b >= a, "{} dropped from {} to {}", def.id, a, b);
        }

        #[test]
        fn prop_discount_stays_in_unit_interval(level in 0u32..1_000_000) {
            for def in all_upgrades().iter().filter(|d| d.effect.is_discount()) {
                let v = evaluate(def, level, None);
                prop_assert!(v > 0.0 && v <= 1.0, "discount {} out of range", v);
            }
        }

        #[test]
        fn prop_effects_are_finite(def in arb_def(), level in 0u32..1_000_000) {
            let state = GameState::new(0.0);
            prop_assert!(evaluate(def, level, Some(&state)).is_finite());
        }
    }
}
