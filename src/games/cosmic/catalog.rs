//! Static upgrade catalog for Cosmic Clicker.
//!
//! Definitions here are immutable. Per-run levels live in
//! [`GameState`](super::state::GameState) and are combined with these
//! definitions only when an effect or cost is evaluated.

use serde::{Deserialize, Serialize};

/// The three balances a player accumulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    /// Primary currency: earned by clicking and passive production.
    Stardust,
    /// Secondary currency: passive production only.
    NebulaGas,
    /// Meta currency: earned only by going supernova (prestige).
    Antimatter,
}

impl Currency {
    /// All currencies in display order.
    pub fn all() -> &'static [Currency] {
        &[Currency::Stardust, Currency::NebulaGas, Currency::Antimatter]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Stardust => "Stardust",
            Currency::NebulaGas => "Nebula Gas",
            Currency::Antimatter => "Antimatter",
        }
    }

    /// Whether balances and upgrades in this currency survive a prestige.
    pub fn is_meta(&self) -> bool {
        matches!(self, Currency::Antimatter)
    }
}

/// Role tag of an upgrade, used for grouping and for prestige scoping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    ClickEffect,
    PassiveEffect,
    UtilityMultiplier,
    MetaEffect,
}

/// How an upgrade's level turns into a number.
///
/// Every variant returns its neutral value at level 0: `0.0` for additive
/// production, `1.0` for multipliers and discounts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// `per_level * level`, added to a production sum.
    Additive { per_level: f64 },
    /// `1 + per_level * level`, multiplied into a production chain.
    Boost { per_level: f64 },
    /// `max(1 - per_level * level, floor)`, multiplied into a cost.
    Discount { per_level: f64, floor: f64 },
    /// `1 + per_level * level * base nebula rate`. Reads sibling levels.
    NebulaForge { per_level: f64 },
}

/// Another upgrade that must reach `level` before this one is offered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Requirement {
    pub upgrade: &'static str,
    pub level: u32,
}

/// Static definition of a purchasable upgrade.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Level a fresh run starts at.
    pub base_level: u32,
    pub base_cost: f64,
    /// Geometric cost multiplier per level, always > 1.
    pub cost_growth: f64,
    pub effect: Effect,
    pub kind: UpgradeKind,
    pub currency: Currency,
    /// Inclusive cap; `None` is unbounded.
    pub max_level: Option<u32>,
    pub requirement: Option<Requirement>,
}

impl UpgradeDef {
    /// Catalog cost of the next level when the upgrade sits at `level`.
    /// Rounded up so costs stay integral. Overflows to infinity, never
    /// below `base_cost`.
    pub fn cost_at(&self, level: u32) -> f64 {
        (self.base_cost * self.cost_growth.powf(f64::from(level))).ceil()
    }

    pub fn is_maxed(&self, level: u32) -> bool {
        self.max_level.is_some_and(|max| level >= max)
    }
}

// ── Upgrade ids ─────────────────────────────────────────────────

pub const COSMIC_TAP: &str = "cosmic_tap";
pub const STARDUST_PROBE: &str = "stardust_probe";
pub const STAR_GAZER: &str = "star_gazer";
pub const REINFORCED_PROBES: &str = "reinforced_probes";
pub const ASTEROID_MINING: &str = "asteroid_mining";
pub const COMET_CHASERS: &str = "comet_chasers";
pub const SOLAR_WINDS: &str = "solar_winds";
pub const GAS_HARVESTER: &str = "gas_harvester";
pub const ORBITAL_COLLECTOR: &str = "orbital_collector";
pub const NEBULA_CONDENSER: &str = "nebula_condenser";
pub const GAS_GIANT_SIPHON: &str = "gas_giant_siphon";
pub const COSMIC_FORGE: &str = "cosmic_forge";
pub const COSMIC_SINGULARITY: &str = "cosmic_singularity";
pub const PRESTIGE_POWER: &str = "prestige_power";
pub const ACCELERATED_LEARNING: &str = "accelerated_learning";

/// Returns the full catalog in display order.
pub fn all_upgrades() -> &'static [UpgradeDef] {
    use Currency::*;
    use UpgradeKind::*;

    static UPGRADES: &[UpgradeDef] = &[
        // ── Stardust ────────────────────────────────────────────
        UpgradeDef {
            id: COSMIC_TAP,
            name: "Cosmic Tap",
            description: "Increases Stardust per click.",
            base_level: 1,
            base_cost: 5.0,
            cost_growth: 1.15,
            effect: Effect::Additive { per_level: 1.0 },
            kind: ClickEffect,
            currency: Stardust,
            max_level: None,
            requirement: None,
        },
        UpgradeDef {
            id: STARDUST_PROBE,
            name: "Stardust Probe",
            description: "Passively generates Stardust per second.",
            base_level: 0,
            base_cost: 15.0,
            cost_growth: 1.18,
            effect: Effect::Additive { per_level: 0.5 },
            kind: PassiveEffect,
            currency: Stardust,
            max_level: None,
            requirement: Some(Requirement { upgrade: COSMIC_TAP, level: 5 }),
        },
        UpgradeDef {
            id: STAR_GAZER,
            name: "Star Gazer",
            description: "Each level grants a bonus to Cosmic Tap.",
            base_level: 0,
            base_cost: 100.0,
            cost_growth: 1.2,
            effect: Effect::Additive { per_level: 5.0 },
            kind: ClickEffect,
            currency: Stardust,
            max_level: None,
            requirement: Some(Requirement { upgrade: COSMIC_TAP, level: 10 }),
        },
        UpgradeDef {
            id: REINFORCED_PROBES,
            name: "Reinforced Probes",
            description: "Stardust Probes are 25% more effective.",
            base_level: 0,
            base_cost: 500.0,
            cost_growth: 2.0,
            effect: Effect::Boost { per_level: 0.25 },
            kind: UtilityMultiplier,
            currency: Stardust,
            max_level: None,
            requirement: Some(Requirement { upgrade: STARDUST_PROBE, level: 10 }),
        },
        UpgradeDef {
            id: ASTEROID_MINING,
            name: "Asteroid Mining",
            description: "Mine asteroids for a new source of passive Stardust.",
            base_level: 0,
            base_cost: 1_000.0,
            cost_growth: 1.2,
            effect: Effect::Additive { per_level: 10.0 },
            kind: PassiveEffect,
            currency: Stardust,
            max_level: None,
            requirement: Some(Requirement { upgrade: STARDUST_PROBE, level: 25 }),
        },
        UpgradeDef {
            id: COMET_CHASERS,
            name: "Comet Chasers",
            description: "Boosts Asteroid Mining production by 50%.",
            base_level: 0,
            base_cost: 5_000.0,
            cost_growth: 2.5,
            effect: Effect::Boost { per_level: 0.5 },
            kind: UtilityMultiplier,
            currency: Stardust,
            max_level: None,
            requirement: Some(Requirement { upgrade: ASTEROID_MINING, level: 5 }),
        },
        UpgradeDef {
            id: SOLAR_WINDS,
            name: "Solar Winds",
            description: "Boosts all passive Stardust generation by 10%.",
            base_level: 0,
            base_cost: 15_000.0,
            cost_growth: 3.0,
            effect: Effect::Boost { per_level: 0.1 },
            kind: UtilityMultiplier,
            currency: Stardust,
            max_level: None,
            requirement: Some(Requirement { upgrade: ASTEROID_MINING, level: 15 }),
        },
        // ── Nebula Gas ──────────────────────────────────────────
        UpgradeDef {
            id: GAS_HARVESTER,
            name: "Gas Harvester",
            description: "Passively generates Nebula Gas per second.",
            base_level: 0,
            base_cost: 10.0,
            cost_growth: 1.25,
            effect: Effect::Additive { per_level: 0.2 },
            kind: PassiveEffect,
            currency: NebulaGas,
            max_level: None,
            requirement: None,
        },
        UpgradeDef {
            id: ORBITAL_COLLECTOR,
            name: "Orbital Collector",
            description: "Spawns clickable Stardust Fragments around the star.",
            base_level: 0,
            base_cost: 25.0,
            cost_growth: 1.5,
            effect: Effect::Additive { per_level: 0.05 },
            kind: UtilityMultiplier,
            currency: NebulaGas,
            max_level: Some(100),
            requirement: Some(Requirement { upgrade: GAS_HARVESTER, level: 1 }),
        },
        UpgradeDef {
            id: NEBULA_CONDENSER,
            name: "Nebula Condenser",
            description: "Boosts all passive Nebula Gas generation by 20%.",
            base_level: 0,
            base_cost: 50.0,
            cost_growth: 2.0,
            effect: Effect::Boost { per_level: 0.2 },
            kind: UtilityMultiplier,
            currency: NebulaGas,
            max_level: None,
            requirement: Some(Requirement { upgrade: GAS_HARVESTER, level: 5 }),
        },
        UpgradeDef {
            id: GAS_GIANT_SIPHON,
            name: "Gas Giant Siphon",
            description: "A new powerful source of passive Nebula Gas.",
            base_level: 0,
            base_cost: 100.0,
            cost_growth: 1.3,
            effect: Effect::Additive { per_level: 1.0 },
            kind: PassiveEffect,
            currency: NebulaGas,
            max_level: None,
            requirement: Some(Requirement { upgrade: GAS_HARVESTER, level: 15 }),
        },
        UpgradeDef {
            id: COSMIC_FORGE,
            name: "Cosmic Forge",
            description: "Boosts click power by 1% of your Nebula Gas per second.",
            base_level: 0,
            base_cost: 250.0,
            cost_growth: 5.0,
            effect: Effect::NebulaForge { per_level: 0.01 },
            kind: UtilityMultiplier,
            currency: NebulaGas,
            max_level: None,
            requirement: Some(Requirement { upgrade: NEBULA_CONDENSER, level: 5 }),
        },
        // ── Antimatter ──────────────────────────────────────────
        UpgradeDef {
            id: COSMIC_SINGULARITY,
            name: "Cosmic Singularity",
            description: "Permanently boosts all Stardust generation by 10% per level.",
            base_level: 0,
            base_cost: 1.0,
            cost_growth: 2.0,
            effect: Effect::Boost { per_level: 0.1 },
            kind: MetaEffect,
            currency: Antimatter,
            max_level: None,
            requirement: None,
        },
        UpgradeDef {
            id: PRESTIGE_POWER,
            name: "Prestige Power",
            description: "Gain 10% more Antimatter when you go supernova.",
            base_level: 0,
            base_cost: 5.0,
            cost_growth: 3.0,
            effect: Effect::Boost { per_level: 0.1 },
            kind: MetaEffect,
            currency: Antimatter,
            max_level: None,
            requirement: Some(Requirement { upgrade: COSMIC_SINGULARITY, level: 1 }),
        },
        UpgradeDef {
            id: ACCELERATED_LEARNING,
            name: "Accelerated Learning",
            description: "Reduces the cost of all Stardust upgrades by 2% per level.",
            base_level: 0,
            base_cost: 10.0,
            cost_growth: 4.0,
            effect: Effect::Discount { per_level: 0.02, floor: 0.1 },
            kind: MetaEffect,
            currency: Antimatter,
            max_level: None,
            requirement: Some(Requirement { upgrade: COSMIC_SINGULARITY, level: 3 }),
        },
    ];

    UPGRADES
}

/// Look up a definition by id.
pub fn find(id: &str) -> Option<&'static UpgradeDef> {
    all_upgrades().iter().find(|u| u.id == id)
}

/// Upgrades purchased with `currency`, in display order.
pub fn upgrades_for(currency: Currency) -> impl Iterator<Item = &'static UpgradeDef> {
    all_upgrades().iter().filter(move |u| u.currency == currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let mut seen = HashSet::new();
        for def in all_upgrades() {
            assert!(seen.insert(def.id), "duplicate id {}", def.id);
        }
    }

    #[test]
    fn costs_and_growth_are_valid() {
        for def in all_upgrades() {
            assert!(def.base_cost > 0.0, "{} has non-positive cost", def.id);
            assert!(def.cost_growth > 1.0, "{} growth must exceed 1", def.id);
        }
    }

    #[test]
    fn requirements_reference_known_upgrades() {
        for def in all_upgrades() {
            if let Some(req) = &def.requirement {
                assert!(find(req.upgrade).is_some(), "{} requires unknown {}", def.id, req.upgrade);
            }
        }
    }

    /// Follow every requirement chain; a cycle would lock content forever.
    #[test]
    fn requirement_graph_is_acyclic() {
        for def in all_upgrades() {
            let mut visited = HashSet::new();
            let mut current = def;
            visited.insert(current.id);
            while let Some(req) = &current.requirement {
                current = find(req.upgrade).unwrap();
                assert!(
                    visited.insert(current.id),
                    "requirement cycle through {}",
                    current.id
                );
            }
        }
    }

    #[test]
    fn requirements_share_the_purchase_currency() {
        // Prestige resets non-meta levels; a meta upgrade gated on a
        // non-meta one would relock after every supernova.
        for def in all_upgrades() {
            if let Some(req) = &def.requirement {
                let target = find(req.upgrade).unwrap();
                if def.currency.is_meta() {
                    assert!(target.currency.is_meta(), "{} gated on non-meta {}", def.id, target.id);
                }
            }
        }
    }

    #[test]
    fn cost_at_rounds_up() {
        let probe = find(STARDUST_PROBE).unwrap();
        assert_eq!(probe.cost_at(0), 15.0);
        assert_eq!(probe.cost_at(1), 18.0); // 17.7 → 18
        assert_eq!(probe.cost_at(2), 21.0); // 20.886 → 21
    }

    #[test]
    fn cost_at_beyond_i32_range_stays_positive() {
        let tap = find(COSMIC_TAP).unwrap();
        let cost = tap.cost_at(3_000_000_000);
        assert!(cost > 0.0);
        assert_eq!(cost, f64::INFINITY);
        assert!(tap.cost_at(u32::MAX) >= tap.cost_at(i32::MAX as u32));
    }

    #[test]
    fn max_level_is_inclusive() {
        let collector = find(ORBITAL_COLLECTOR).unwrap();
        assert!(!collector.is_maxed(99));
        assert!(collector.is_maxed(100));
        let probe = find(STARDUST_PROBE).unwrap();
        assert!(!probe.is_maxed(u32::MAX));
    }

    #[test]
    fn kinds_match_currency_scope() {
        for def in all_upgrades() {
            assert_eq!(def.kind == UpgradeKind::MetaEffect, def.currency.is_meta(), "{}", def.id);
        }
    }

    #[test]
    fn upgrades_for_filters_by_currency() {
        let nebula: Vec<&str> = upgrades_for(Currency::NebulaGas).map(|u| u.id).collect();
        assert_eq!(
            nebula,
            vec![GAS_HARVESTER, ORBITAL_COLLECTOR, NEBULA_CONDENSER, GAS_GIANT_SIPHON, COSMIC_FORGE]
        );
    }
}
