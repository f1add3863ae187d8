/// Cosmic Clicker game state definitions.

use std::collections::{BTreeMap, VecDeque};

use super::catalog::{self, Currency, UpgradeDef};

/// Ring buffer capacity for trend samples.
pub const HISTORY_CAPACITY: usize = 60;

/// Balance per currency. Balances never go below zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Balances {
    pub stardust: f64,
    pub nebula_gas: f64,
    pub antimatter: f64,
}

impl Balances {
    pub fn get(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Stardust => self.stardust,
            Currency::NebulaGas => self.nebula_gas,
            Currency::Antimatter => self.antimatter,
        }
    }

    fn slot(&mut self, currency: Currency) -> &mut f64 {
        match currency {
            Currency::Stardust => &mut self.stardust,
            Currency::NebulaGas => &mut self.nebula_gas,
            Currency::Antimatter => &mut self.antimatter,
        }
    }

    /// Add a non-negative amount. Negative or non-finite amounts are ignored.
    pub fn credit(&mut self, currency: Currency, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            *self.slot(currency) += amount;
        }
    }

    /// Subtract an amount, clamping at zero.
    pub fn debit(&mut self, currency: Currency, amount: f64) {
        let slot = self.slot(currency);
        *slot = (*slot - amount).max(0.0);
    }

    pub fn set(&mut self, currency: Currency, amount: f64) {
        *self.slot(currency) = amount.max(0.0);
    }
}

/// Mutable per-run data for one upgrade. The definition stays in the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeLevel {
    pub level: u32,
    /// Cached catalog cost of the next level (before discounts).
    pub cost: f64,
}

impl UpgradeLevel {
    pub fn at(def: &UpgradeDef, level: u32) -> Self {
        Self {
            level,
            cost: def.cost_at(level),
        }
    }

    pub fn default_for(def: &UpgradeDef) -> Self {
        Self::at(def, def.base_level)
    }
}

/// Lifetime player statistics. Survive prestige.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats {
    /// Manual activations of the star.
    pub total_clicks: u64,
    /// Completed prestige cycles.
    pub supernova_count: u32,
    /// Cumulative simulated seconds.
    pub play_time: f64,
}

/// Root aggregate of everything that is persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub currencies: Balances,
    /// Keyed by catalog id; always holds exactly one entry per catalog upgrade.
    pub upgrades: BTreeMap<&'static str, UpgradeLevel>,
    /// Stardust ever produced this run. Never decreases except on prestige.
    pub total_stardust_ever: f64,
    pub stats: Stats,
    /// Wall-clock anchor (ms since epoch) of the last tick.
    pub last_tick_ms: f64,
}

impl GameState {
    pub fn new(now_ms: f64) -> Self {
        Self {
            currencies: Balances::default(),
            upgrades: Self::default_upgrades(),
            total_stardust_ever: 0.0,
            stats: Stats::default(),
            last_tick_ms: now_ms,
        }
    }

    /// Catalog-default instance table.
    pub fn default_upgrades() -> BTreeMap<&'static str, UpgradeLevel> {
        catalog::all_upgrades()
            .iter()
            .map(|def| (def.id, UpgradeLevel::default_for(def)))
            .collect()
    }

    /// Current level of an upgrade; 0 for ids outside the catalog.
    pub fn level(&self, id: &str) -> u32 {
        self.upgrades.get(id).map_or(0, |u| u.level)
    }

    /// Cached catalog cost of the next level.
    pub fn cost(&self, id: &str) -> Option<f64> {
        self.upgrades.get(id).map(|u| u.cost)
    }

    /// Whether the upgrade's unlock requirement is met.
    pub fn is_unlocked(&self, def: &UpgradeDef) -> bool {
        match &def.requirement {
            None => true,
            Some(req) => self.level(req.upgrade) >= req.level,
        }
    }

    /// Set a level and refresh its cached cost.
    pub(super) fn set_level(&mut self, def: &'static UpgradeDef, level: u32) {
        self.upgrades.insert(def.id, UpgradeLevel::at(def, level));
    }
}

/// A clickable bonus spawned by the Orbital Collector.
#[derive(Clone, Debug, PartialEq)]
pub struct Collectible {
    pub id: u64,
    /// Stardust credited on collection, fixed at spawn.
    pub value: f64,
    /// Position in percent of the play area (0..100).
    pub x: f64,
    pub y: f64,
}

/// One point of the lifetime-earned trend.
#[derive(Clone, Debug, PartialEq)]
pub struct HistorySample {
    pub timestamp_ms: f64,
    pub total_stardust: f64,
}

/// Fixed-capacity FIFO of trend samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    samples: VecDeque<HistorySample>,
}

impl History {
    pub fn push(&mut self, sample: HistorySample) {
        self.samples.push_back(sample);
        while self.samples.len() > HISTORY_CAPACITY {
            self.samples.pop_front();
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cosmic::catalog::{find, COSMIC_TAP, STARDUST_PROBE};

    #[test]
    fn new_state_has_every_catalog_upgrade() {
        let state = GameState::new(0.0);
        assert_eq!(state.upgrades.len(), catalog::all_upgrades().len());
        assert_eq!(state.level(COSMIC_TAP), 1);
        assert_eq!(state.level(STARDUST_PROBE), 0);
        assert_eq!(state.cost(STARDUST_PROBE), Some(15.0));
    }

    #[test]
    fn base_level_cost_uses_growth() {
        let state = GameState::new(0.0);
        // Cosmic Tap starts at level 1: ceil(5 * 1.15) = 6
        assert_eq!(state.cost(COSMIC_TAP), Some(6.0));
    }

    #[test]
    fn unknown_id_has_level_zero() {
        let state = GameState::new(0.0);
        assert_eq!(state.level("warp_drive"), 0);
        assert_eq!(state.cost("warp_drive"), None);
    }

    #[test]
    fn unlock_follows_requirement() {
        let mut state = GameState::new(0.0);
        let probe = find(STARDUST_PROBE).unwrap();
        assert!(!state.is_unlocked(probe));
        state.set_level(find(COSMIC_TAP).unwrap(), 5);
        assert!(state.is_unlocked(probe));
    }

    #[test]
    fn debit_clamps_at_zero() {
        let mut b = Balances::default();
        b.credit(Currency::Stardust, 10.0);
        b.debit(Currency::Stardust, 25.0);
        assert_eq!(b.get(Currency::Stardust), 0.0);
    }

    #[test]
    fn credit_ignores_negative_and_nan() {
        let mut b = Balances::default();
        b.credit(Currency::NebulaGas, -5.0);
        b.credit(Currency::NebulaGas, f64::NAN);
        assert_eq!(b.get(Currency::NebulaGas), 0.0);
    }

    #[test]
    fn history_evicts_oldest_first() {
        let mut h = History::default();
        for i in 0..(HISTORY_CAPACITY + 5) {
            h.push(HistorySample {
                timestamp_ms: i as f64,
                total_stardust: i as f64,
            });
        }
        assert_eq!(h.len(), HISTORY_CAPACITY);
        assert_eq!(h.iter().next().unwrap().timestamp_ms, 5.0);
        assert_eq!(h.latest().unwrap().timestamp_ms, (HISTORY_CAPACITY + 4) as f64);
    }
}
