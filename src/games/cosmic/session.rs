//! The live simulation: one [`GameState`] plus the ephemeral data derived
//! from it (collectibles, trend history, spawn RNG).
//!
//! `Session` never hands out `&mut GameState`. Readers get a shared borrow or
//! an owned snapshot; every mutation goes through the entry points below.

use std::f64::consts::TAU;

use super::catalog::{self, ORBITAL_COLLECTOR};
use super::effect;
use super::logic::{self, Rates, Rejection};
use super::state::{Collectible, GameState, History, HistorySample};

/// Period of the external tick scheduler.
pub const TICK_PERIOD_MS: f64 = 100.0;
/// Live collectibles beyond this stop spawning.
pub const MAX_COLLECTIBLES: usize = 10;
/// Minimum wall-clock gap between trend samples.
pub const HISTORY_SAMPLE_MS: f64 = 1_000.0;

/// xorshift32, seeded per session.
#[derive(Clone, Debug, PartialEq)]
struct Rng(u32);

impl Rng {
    fn seeded(seed: u64) -> Self {
        let folded = (seed ^ (seed >> 32)) as u32 ^ 0x9E37_79B9;
        Self(if folded == 0 { 0x2545_F491 } else { folded })
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }
}

/// Numbers the presentation shows next to the balances.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedStats {
    pub stardust_per_second: f64,
    pub nebula_per_second: f64,
    pub stardust_per_click: f64,
    pub total_clicks: u64,
    pub supernova_count: u32,
    pub play_time: String,
    pub prestige_bonus: String,
    /// Antimatter a supernova would grant now.
    pub pending_antimatter: Option<f64>,
}

/// What one tick produced besides the state change itself.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub spawned: Option<Collectible>,
    pub sample: Option<HistorySample>,
    pub stats: DerivedStats,
}

#[derive(Clone, Debug)]
pub struct Session {
    state: GameState,
    collectibles: Vec<Collectible>,
    history: History,
    last_sample_ms: f64,
    next_collectible_id: u64,
    rng: Rng,
}

impl Session {
    /// A brand-new game.
    pub fn new(now_ms: f64) -> Self {
        Self::from_state(GameState::new(now_ms), now_ms)
    }

    /// Resume from a reconciled state. The tick anchor moves to `now_ms`,
    /// so time spent away is not credited.
    pub fn from_state(mut state: GameState, now_ms: f64) -> Self {
        state.last_tick_ms = now_ms;
        Self {
            state,
            collectibles: Vec::new(),
            history: History::default(),
            last_sample_ms: now_ms,
            next_collectible_id: 1,
            rng: Rng::seeded(now_ms.to_bits()),
        }
    }

    /// Replace the spawn RNG seed (deterministic replays).
    #[cfg(test)]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Rng::seeded(seed);
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Owned copy for comparing before and after.
    #[cfg(test)]
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn rates(&self) -> Rates {
        logic::passive_rates(&self.state)
    }

    pub fn derived_stats(&self) -> DerivedStats {
        let rates = self.rates();
        DerivedStats {
            stardust_per_second: rates.stardust,
            nebula_per_second: rates.nebula_gas,
            stardust_per_click: logic::click_value(&self.state),
            total_clicks: self.state.stats.total_clicks,
            supernova_count: self.state.stats.supernova_count,
            play_time: logic::format_play_time(self.state.stats.play_time),
            prestige_bonus: logic::prestige_bonus(&self.state),
            pending_antimatter: logic::prestige_gain(&self.state),
        }
    }

    /// Advance to wall-clock `now_ms`. A clock that went backwards counts as
    /// zero elapsed time.
    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        let elapsed = (now_ms - self.state.last_tick_ms) / 1000.0;
        self.advance(elapsed, now_ms)
    }

    /// Advance by an explicit `elapsed_secs`, treated as continuous accrual.
    pub fn advance(&mut self, elapsed_secs: f64, now_ms: f64) -> TickReport {
        let elapsed = if elapsed_secs.is_finite() && elapsed_secs > 0.0 {
            elapsed_secs
        } else {
            0.0
        };

        // Rates come from the pre-tick state and stay fixed for the whole tick.
        let rates = logic::passive_rates(&self.state);
        logic::accrue(&mut self.state, &rates, elapsed);

        let spawned = self.try_spawn(&rates, elapsed);

        let sample = if now_ms - self.last_sample_ms >= HISTORY_SAMPLE_MS {
            self.last_sample_ms = now_ms;
            let sample = HistorySample {
                timestamp_ms: now_ms,
                total_stardust: self.state.total_stardust_ever,
            };
            self.history.push(sample.clone());
            Some(sample)
        } else {
            None
        };

        self.state.stats.play_time += elapsed;
        self.state.last_tick_ms = now_ms;

        TickReport {
            spawned,
            sample,
            stats: self.derived_stats(),
        }
    }

    /// One linear spawn draw per tick: probability `rate * elapsed`, capped at 1.
    /// Long ticks therefore spawn at most one collectible.
    fn try_spawn(&mut self, rates: &Rates, elapsed: f64) -> Option<Collectible> {
        let level = self.state.level(ORBITAL_COLLECTOR);
        if level == 0 || self.collectibles.len() >= MAX_COLLECTIBLES {
            return None;
        }
        let def = catalog::find(ORBITAL_COLLECTOR)?;
        let chance = effect::evaluate(def, level, Some(&self.state)) * elapsed;
        if self.rng.next_f64() >= chance {
            return None;
        }

        let angle = self.rng.next_f64() * TAU;
        let radius = 40.0 + self.rng.next_f64() * 5.0;
        let collectible = Collectible {
            id: self.next_collectible_id,
            value: logic::collectible_value(&self.state, rates),
            x: 50.0 + angle.cos() * radius,
            y: 50.0 + angle.sin() * radius,
        };
        self.next_collectible_id += 1;
        self.collectibles.push(collectible.clone());
        Some(collectible)
    }

    /// Manual activation of the star. Returns the Stardust credited.
    pub fn activate_manual_production(&mut self) -> f64 {
        logic::click(&mut self.state)
    }

    pub fn purchase(&mut self, id: &str) -> Result<f64, Rejection> {
        logic::purchase(&mut self.state, id)
    }

    /// Go supernova. Clears collectibles and the trend history on success.
    pub fn prestige(&mut self) -> Option<f64> {
        let gain = logic::prestige(&mut self.state)?;
        self.collectibles.clear();
        self.history.clear();
        Some(gain)
    }

    /// Collect a live collectible, crediting the value fixed at spawn.
    pub fn collect(&mut self, id: u64) -> Option<f64> {
        let idx = self.collectibles.iter().position(|c| c.id == id)?;
        let collectible = self.collectibles.remove(idx);
        logic::earn_stardust(&mut self.state, collectible.value);
        Some(collectible.value)
    }

    /// Discard everything and start over.
    pub fn reset(&mut self, now_ms: f64) {
        *self = Session::new(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cosmic::catalog::*;

    /// Session whose state has the given levels, anchored at t=0.
    fn session_with(levels: &[(&str, u32)]) -> Session {
        let mut state = GameState::new(0.0);
        for (id, level) in levels {
            state.set_level(find(id).unwrap(), *level);
        }
        Session::from_state(state, 0.0).with_seed(7)
    }

    #[test]
    fn four_probes_for_ten_seconds_earn_twenty() {
        let mut s = session_with(&[(STARDUST_PROBE, 4)]);
        s.advance(10.0, 10_000.0);
        assert!((s.state().currencies.stardust - 20.0).abs() < 1e-9);
        assert!((s.state().total_stardust_ever - 20.0).abs() < 1e-9);
    }

    #[test]
    fn tick_uses_wall_clock_delta() {
        let mut s = session_with(&[(STARDUST_PROBE, 4)]);
        s.tick(2_500.0);
        assert!((s.state().currencies.stardust - 5.0).abs() < 1e-9);
        assert_eq!(s.state().last_tick_ms, 2_500.0);
    }

    #[test]
    fn zero_elapsed_leaves_balances() {
        let mut s = session_with(&[(STARDUST_PROBE, 4), (GAS_HARVESTER, 10)]);
        let before = s.state().currencies.clone();
        let report = s.advance(0.0, 0.0);
        assert_eq!(s.state().currencies, before);
        assert_eq!(s.state().stats.play_time, 0.0);
        assert!(report.spawned.is_none());
    }

    #[test]
    fn backwards_clock_counts_as_zero() {
        let mut s = session_with(&[(STARDUST_PROBE, 4)]);
        s.tick(5_000.0);
        let before = s.state().currencies.clone();
        s.tick(1_000.0);
        assert_eq!(s.state().currencies, before);
    }

    #[test]
    fn play_time_advances_with_elapsed() {
        let mut s = session_with(&[]);
        s.advance(1.5, 1_500.0);
        s.advance(0.25, 1_750.0);
        assert!((s.state().stats.play_time - 1.75).abs() < 1e-9);
    }

    #[test]
    fn hours_of_elapsed_time_accrue_linearly() {
        let mut s = session_with(&[(STARDUST_PROBE, 2)]);
        s.advance(3.0 * 3600.0, 3.0 * 3600.0 * 1000.0);
        assert!((s.state().currencies.stardust - 10_800.0).abs() < 1e-6);
    }

    #[test]
    fn history_samples_once_per_second() {
        let mut s = session_with(&[(STARDUST_PROBE, 2)]);
        assert!(s.advance(0.5, 500.0).sample.is_none());
        let sample = s.advance(0.5, 1_000.0).sample.unwrap();
        assert_eq!(sample.timestamp_ms, 1_000.0);
        assert!((sample.total_stardust - 1.0).abs() < 1e-9);
        assert!(s.advance(0.1, 1_100.0).sample.is_none());
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn history_is_capped() {
        let mut s = session_with(&[]);
        for i in 1..=200 {
            s.advance(1.0, i as f64 * 1_000.0);
        }
        assert_eq!(s.history().len(), 60);
        assert_eq!(s.history().iter().next().unwrap().timestamp_ms, 141_000.0);
    }

    #[test]
    fn no_spawns_without_collector() {
        let mut s = session_with(&[(STARDUST_PROBE, 10)]);
        for i in 1..=100 {
            assert!(s.advance(10.0, i as f64 * 10_000.0).spawned.is_none());
        }
        assert!(s.collectibles().is_empty());
    }

    #[test]
    fn certain_spawn_when_chance_reaches_one() {
        // 0.05/s * 20 levels * 1s = 1.0
        let mut s = session_with(&[(GAS_HARVESTER, 1), (ORBITAL_COLLECTOR, 20)]);
        let spawned = s.advance(1.0, 1_000.0).spawned.unwrap();
        assert_eq!(s.collectibles().len(), 1);
        assert!(spawned.value > 0.0);
        let dist = ((spawned.x - 50.0).powi(2) + (spawned.y - 50.0).powi(2)).sqrt();
        assert!((40.0..=45.0).contains(&dist), "radius {}", dist);
    }

    #[test]
    fn spawn_value_uses_rates_and_click() {
        let mut s = session_with(&[(GAS_HARVESTER, 1), (ORBITAL_COLLECTOR, 20), (STARDUST_PROBE, 4)]);
        let spawned = s.advance(1.0, 1_000.0).spawned.unwrap();
        // (2/s + 1 click) * (5 + 20 * 0.5)
        assert!((spawned.value - 45.0).abs() < 1e-9);
    }

    #[test]
    fn spawns_stop_at_cap() {
        let mut s = session_with(&[(GAS_HARVESTER, 1), (ORBITAL_COLLECTOR, 100)]);
        for i in 1..=50 {
            s.advance(1.0, i as f64 * 1_000.0);
        }
        assert_eq!(s.collectibles().len(), MAX_COLLECTIBLES);
    }

    #[test]
    fn long_tick_spawns_at_most_one() {
        let mut s = session_with(&[(GAS_HARVESTER, 1), (ORBITAL_COLLECTOR, 100)]);
        s.advance(3_600.0, 3_600_000.0);
        assert_eq!(s.collectibles().len(), 1);
    }

    #[test]
    fn collect_credits_and_removes() {
        let mut s = session_with(&[(GAS_HARVESTER, 1), (ORBITAL_COLLECTOR, 20)]);
        let c = s.advance(1.0, 1_000.0).spawned.unwrap();
        let before = s.state().total_stardust_ever;
        assert_eq!(s.collect(c.id), Some(c.value));
        assert!(s.collectibles().is_empty());
        assert!((s.state().total_stardust_ever - before - c.value).abs() < 1e-9);
        assert_eq!(s.collect(c.id), None);
    }

    #[test]
    fn collect_unknown_is_noop() {
        let mut s = session_with(&[]);
        let before = s.snapshot();
        assert_eq!(s.collect(42), None);
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn manual_activation_counts_clicks() {
        let mut s = session_with(&[]);
        s.activate_manual_production();
        s.activate_manual_production();
        assert_eq!(s.state().stats.total_clicks, 2);
        assert_eq!(s.state().currencies.stardust, 2.0);
        assert_eq!(s.derived_stats().total_clicks, 2);
    }

    #[test]
    fn purchase_of_fifteen_with_ten_is_rejected() {
        let mut s = session_with(&[(COSMIC_TAP, 5)]);
        for _ in 0..2 {
            s.activate_manual_production(); // 5 per click
        }
        assert_eq!(s.state().currencies.stardust, 10.0);
        assert!(s.purchase(STARDUST_PROBE).is_err());
        assert_eq!(s.state().currencies.stardust, 10.0);
        assert_eq!(s.state().level(STARDUST_PROBE), 0);
    }

    #[test]
    fn prestige_clears_ephemera() {
        let mut s = session_with(&[(GAS_HARVESTER, 1), (ORBITAL_COLLECTOR, 20), (COSMIC_TAP, 1_000)]);
        s.advance(1.0, 1_000.0);
        assert!(!s.collectibles().is_empty());
        assert_eq!(s.history().len(), 1);

        assert_eq!(s.prestige(), None);
        assert!(!s.collectibles().is_empty());

        // 1000 per click
        for _ in 0..1_000 {
            s.activate_manual_production();
        }
        assert_eq!(s.prestige(), Some(1.0));
        assert!(s.collectibles().is_empty());
        assert!(s.history().is_empty());
        assert_eq!(s.state().stats.supernova_count, 1);
    }

    #[test]
    fn reset_discards_everything() {
        let mut s = session_with(&[(GAS_HARVESTER, 1), (ORBITAL_COLLECTOR, 20)]);
        s.advance(1.0, 1_000.0);
        s.activate_manual_production();
        s.reset(5_000.0);
        assert_eq!(s.snapshot(), GameState::new(5_000.0));
        assert!(s.collectibles().is_empty());
        assert!(s.history().is_empty());
    }

    #[test]
    fn from_state_discards_offline_time() {
        let mut state = GameState::new(0.0);
        state.set_level(find(STARDUST_PROBE).unwrap(), 10);
        let mut s = Session::from_state(state, 86_400_000.0);
        s.tick(86_400_000.0);
        assert_eq!(s.state().currencies.stardust, 0.0);
    }

    #[test]
    fn derived_stats_report_pending_antimatter() {
        let mut s = session_with(&[(COSMIC_TAP, 1_000)]);
        assert_eq!(s.derived_stats().pending_antimatter, None);
        for _ in 0..1_000 {
            s.activate_manual_production();
        }
        assert_eq!(s.derived_stats().pending_antimatter, Some(1.0));
        assert_eq!(s.derived_stats().play_time, "0h 0m 0s");
    }

    #[test]
    fn same_seed_same_spawns() {
        let run = || {
            let mut s = session_with(&[(GAS_HARVESTER, 1), (ORBITAL_COLLECTOR, 3)]);
            (1..=200)
                .filter_map(|i| s.advance(0.1, i as f64 * 100.0).spawned)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::games::cosmic::catalog::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_accrual_independent_of_tick_split(
            probes in 0u32..100,
            harvesters in 0u32..100,
            total_secs in 0.0f64..1_000.0,
            splits in 1usize..50,
        ) {
            let mut state = GameState::new(0.0);
            state.set_level(find(COSMIC_TAP).unwrap(), 5);
            state.set_level(find(STARDUST_PROBE).unwrap(), probes);
            state.set_level(find(GAS_HARVESTER).unwrap(), harvesters);

            let mut once = Session::from_state(state.clone(), 0.0);
            once.advance(total_secs, total_secs * 1000.0);

            let mut many = Session::from_state(state, 0.0);
            let step = total_secs / splits as f64;
            for i in 1..=splits {
                many.advance(step, step * i as f64 * 1000.0);
            }

            let a = once.state();
            let b = many.state();
            prop_assert!((a.currencies.stardust - b.currencies.stardust).abs() < 1e-6);
            prop_assert!((a.currencies.nebula_gas - b.currencies.nebula_gas).abs() < 1e-6);
            prop_assert!((a.stats.play_time - b.stats.play_time).abs() < 1e-6);
        }

        #[test]
        fn prop_lifetime_never_decreases_across_ticks(
            steps in proptest::collection::vec(0.0f64..5.0, 1..50),
        ) {
            let mut s = Session::from_state(GameState::new(0.0), 0.0);
            let mut now = 0.0;
            let mut last = 0.0;
            for step in steps {
                now += step * 1000.0;
                s.activate_manual_production();
                let _ = s.purchase(COSMIC_TAP);
                s.tick(now);
                prop_assert!(s.state().total_stardust_ever >= last);
                last = s.state().total_stardust_ever;
            }
        }

        #[test]
        fn prop_collectibles_never_exceed_cap(level in 1u32..=100, ticks in 1usize..200) {
            let mut state = GameState::new(0.0);
            state.set_level(find(GAS_HARVESTER).unwrap(), 1);
            state.set_level(find(ORBITAL_COLLECTOR).unwrap(), level);
            let mut s = Session::from_state(state, 0.0).with_seed(level as u64);
            for i in 1..=ticks {
                s.advance(1.0, i as f64 * 1000.0);
                prop_assert!(s.collectibles().len() <= MAX_COLLECTIBLES);
            }
        }
    }
}
