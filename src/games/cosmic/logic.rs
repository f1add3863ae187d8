//! Cosmic Clicker economy: pure functions over [`GameState`].
//!
//! Production order is fixed so float rounding is reproducible:
//! base sums → per-source multipliers → meta boost → currency-wide boost.

use thiserror::Error;

use super::catalog::{self, Currency, *};
use super::effect::{self, current};
use super::state::GameState;

/// Lifetime Stardust needed before a supernova is allowed.
pub const PRESTIGE_THRESHOLD: f64 = 1_000_000.0;

/// Smallest amount any purchase can cost.
const MIN_COST: f64 = 1.0;

/// Passive production per second, per currency.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rates {
    pub stardust: f64,
    pub nebula_gas: f64,
}

#[cfg(test)]
impl Rates {
    pub fn get(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Stardust => self.stardust,
            Currency::NebulaGas => self.nebula_gas,
            Currency::Antimatter => 0.0,
        }
    }
}

/// Current passive production rates.
pub fn passive_rates(state: &GameState) -> Rates {
    let probes = current(state, STARDUST_PROBE) * current(state, REINFORCED_PROBES);
    let mining = current(state, ASTEROID_MINING) * current(state, COMET_CHASERS);
    let stardust = (probes + mining) * current(state, COSMIC_SINGULARITY) * current(state, SOLAR_WINDS);

    let nebula_gas = effect::base_nebula_rate(state) * current(state, NEBULA_CONDENSER);

    Rates { stardust, nebula_gas }
}

/// Stardust granted by one manual activation.
pub fn click_value(state: &GameState) -> f64 {
    let base = current(state, COSMIC_TAP) + current(state, STAR_GAZER);
    base * current(state, COSMIC_SINGULARITY) * current(state, COSMIC_FORGE)
}

/// Credit Stardust that was produced (not refunded): balance and lifetime counter move together.
pub fn earn_stardust(state: &mut GameState, amount: f64) {
    if amount.is_finite() && amount > 0.0 {
        state.currencies.credit(Currency::Stardust, amount);
        state.total_stardust_ever += amount;
    }
}

/// Manual activation of the star. Returns the Stardust credited.
pub fn click(state: &mut GameState) -> f64 {
    let value = click_value(state);
    earn_stardust(state, value);
    state.stats.total_clicks += 1;
    value
}

/// Apply `rates` over `elapsed_secs` of continuous time.
pub fn accrue(state: &mut GameState, rates: &Rates, elapsed_secs: f64) {
    if !(elapsed_secs > 0.0) {
        return;
    }
    earn_stardust(state, rates.stardust * elapsed_secs);
    state
        .currencies
        .credit(Currency::NebulaGas, rates.nebula_gas * elapsed_secs);
}

/// Value of a collectible spawned now, fixed for its lifetime.
pub fn collectible_value(state: &GameState, rates: &Rates) -> f64 {
    let level = state.level(ORBITAL_COLLECTOR) as f64;
    (rates.stardust + click_value(state)) * (5.0 + level * 0.5)
}

/// Cost multiplier applied to purchases in `currency`.
pub fn discount_for(state: &GameState, currency: Currency) -> f64 {
    match currency {
        Currency::Stardust => current(state, ACCELERATED_LEARNING),
        Currency::NebulaGas | Currency::Antimatter => 1.0,
    }
}

/// What a purchase of `id` would debit right now.
pub fn effective_cost(state: &GameState, id: &str) -> Option<f64> {
    let def = catalog::find(id)?;
    let cost = state.cost(id)?;
    Some((cost * discount_for(state, def.currency)).max(MIN_COST))
}

/// Why a purchase was turned down. Normal flow control, not a failure.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Rejection {
    #[error("unknown upgrade")]
    UnknownUpgrade,
    #[error("requirement not met")]
    Locked,
    #[error("already at max level")]
    MaxLevel,
    #[error("not enough {currency}: need {needed}, have {held}")]
    InsufficientFunds {
        currency: &'static str,
        needed: f64,
        held: f64,
    },
}

/// Buy one level of `id`. All-or-nothing: on rejection `state` is untouched.
/// Returns the amount debited.
pub fn purchase(state: &mut GameState, id: &str) -> Result<f64, Rejection> {
    let def = catalog::find(id).ok_or(Rejection::UnknownUpgrade)?;
    if !state.is_unlocked(def) {
        return Err(Rejection::Locked);
    }
    let level = state.level(id);
    let Some(next) = level.checked_add(1).filter(|_| !def.is_maxed(level)) else {
        return Err(Rejection::MaxLevel);
    };
    let cost = effective_cost(state, id).ok_or(Rejection::UnknownUpgrade)?;
    let held = state.currencies.get(def.currency);
    if held < cost {
        return Err(Rejection::InsufficientFunds {
            currency: def.currency.name(),
            needed: cost,
            held,
        });
    }

    state.currencies.debit(def.currency, cost);
    state.set_level(def, next);
    Ok(cost)
}

pub fn can_prestige(state: &GameState) -> bool {
    state.total_stardust_ever >= PRESTIGE_THRESHOLD
}

/// Antimatter a supernova would grant now; `None` below the threshold.
pub fn prestige_gain(state: &GameState) -> Option<f64> {
    if !can_prestige(state) {
        return None;
    }
    let tiers = ((state.total_stardust_ever / PRESTIGE_THRESHOLD).log10() + 1.0).floor();
    Some(tiers * current(state, PRESTIGE_POWER))
}

/// Go supernova: trade this run's progress for Antimatter.
///
/// Below the threshold this is a no-op returning `None`. Antimatter and
/// Antimatter upgrades carry over; everything else returns to catalog defaults.
pub fn prestige(state: &mut GameState) -> Option<f64> {
    let gain = prestige_gain(state)?;

    state.currencies.set(Currency::Stardust, 0.0);
    state.currencies.set(Currency::NebulaGas, 0.0);
    state.currencies.credit(Currency::Antimatter, gain);
    state.total_stardust_ever = 0.0;
    for def in catalog::all_upgrades().iter().filter(|d| !d.currency.is_meta()) {
        state.set_level(def, def.base_level);
    }
    state.stats.supernova_count += 1;

    Some(gain)
}

/// Format a number with commas (e.g. 1234567 → "1,234,567").
/// Very large values fall back to scientific notation.
pub fn format_number(n: f64) -> String {
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    if !n.is_finite() || n >= 1e15 {
        return format!("{:.2e}", n);
    }
    let int_part = n.floor() as u64;
    let frac = n - int_part as f64;

    let s = int_part.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let result: String = result.chars().rev().collect();

    // Only show a decimal for small values; rounding must not roll over to 10
    if frac >= 0.05 && frac < 0.95 && int_part < 1_000 {
        format!("{}.{}", result, (frac * 10.0).round() as u8)
    } else {
        result
    }
}

/// "1h 2m 3s"
pub fn format_play_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
}

/// Permanent Stardust bonus from Antimatter, e.g. "30%".
pub fn prestige_bonus(state: &GameState) -> String {
    format!("{:.0}%", (current(state, COSMIC_SINGULARITY) - 1.0) * 100.0)
}
