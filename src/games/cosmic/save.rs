//! Cosmic Clicker save/load.
//!
//! ## Reconciliation policy
//!
//! A stored blob is never trusted wholesale. Only levels are carried over per
//! known upgrade id; costs are recomputed from the catalog. Unknown ids are
//! dropped, catalog ids missing from the blob keep their defaults, and bad
//! numbers are reset. A blob that cannot be parsed at all yields a fresh game.
//!
//! `SAVE_VERSION` is written for diagnostics only. Blobs without it (or with
//! an older one) log a migration line and are reconciled like any other;
//! nothing is rejected by version.
//!
//! Fields are read one at a time from the raw JSON. A mistyped field is reset
//! on its own; only text that is not a JSON object counts as corrupt.
//!
//! The tick anchor is always reset to "now" on load. Time spent away is not
//! credited as offline production.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::console;

use super::catalog;
use super::state::{GameState, Stats};

/// Current blob format version.
const SAVE_VERSION: u32 = 1;

/// localStorage key.
pub const STORAGE_KEY: &str = "cosmic_clicker_save";

/// Autosave interval in wall-clock milliseconds.
pub const AUTOSAVE_PERIOD_MS: f64 = 5_000.0;

/// Highest level a stored blob may restore. Leaves headroom for purchases.
const MAX_LOADED_LEVEL: u32 = i32::MAX as u32;

/// Failure talking to the host key-value store. Always recovered locally.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("failed to encode save data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Host key-value storage holding the single save blob.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Browser `localStorage`.
pub struct LocalStorage;

impl LocalStorage {
    fn handle() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::handle()?
            .get_item(key)
            .map_err(|e| StorageError::Read(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::handle()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Self::handle()?
            .remove_item(key)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }
}

/// In-memory storage for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
    pub entries: BTreeMap<String, String>,
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Blob layout as written. Loading reads the raw JSON field by field
/// instead, so one mistyped value cannot sink the rest.
#[derive(Serialize)]
struct SaveData {
    version: u32,
    currencies: SavedBalances,
    upgrades: BTreeMap<&'static str, SavedUpgrade>,
    total_stardust_ever: f64,
    stats: SavedStats,
}

#[derive(Serialize)]
struct SavedBalances {
    stardust: f64,
    nebula_gas: f64,
    antimatter: f64,
}

/// `cost` is informational; loading recomputes it from the catalog.
#[derive(Serialize)]
struct SavedUpgrade {
    level: u32,
    cost: f64,
}

#[derive(Serialize)]
struct SavedStats {
    total_clicks: u64,
    supernova_count: u32,
    play_time: f64,
}

/// Something the reconciler had to fix while loading.
#[derive(Clone, Debug, PartialEq)]
pub enum Repair {
    /// Storage could not be read.
    Unreadable(String),
    /// Blob was not a JSON object.
    Corrupt(String),
    /// Top-level or nested field absent; default used.
    MissingField(&'static str),
    /// Group held something other than an object; defaults used.
    WrongType(&'static str),
    /// Field was not a finite non-negative number; reset to 0.
    InvalidNumber(&'static str),
    /// Upgrade id not in the catalog; dropped.
    UnknownUpgrade(String),
    /// Catalog upgrade absent from the blob; default kept.
    MissingUpgrade(&'static str),
    /// Entry had no usable level; default kept.
    InvalidLevel(&'static str),
    /// Level above the catalog cap or `MAX_LOADED_LEVEL`; clamped.
    ClampedLevel(&'static str),
}

/// Which load path produced the state.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    /// Nothing was stored.
    Fresh(GameState),
    /// Loaded with repairs (or fell back to fresh after corruption).
    Recovered { state: GameState, repairs: Vec<Repair> },
    /// Every field and every catalog upgrade present and valid.
    Loaded(GameState),
}

impl LoadOutcome {
    #[cfg(test)]
    pub fn state(&self) -> &GameState {
        match self {
            LoadOutcome::Fresh(s) | LoadOutcome::Loaded(s) => s,
            LoadOutcome::Recovered { state, .. } => state,
        }
    }

    pub fn into_state(self) -> GameState {
        match self {
            LoadOutcome::Fresh(s) | LoadOutcome::Loaded(s) => s,
            LoadOutcome::Recovered { state, .. } => state,
        }
    }

    fn is_corrupt(&self) -> bool {
        matches!(
            self,
            LoadOutcome::Recovered { repairs, .. }
                if repairs.iter().any(|r| matches!(r, Repair::Corrupt(_)))
        )
    }
}

/// Encode the persistent part of `state`.
pub fn serialize(state: &GameState) -> Result<String, StorageError> {
    let data = SaveData {
        version: SAVE_VERSION,
        currencies: SavedBalances {
            stardust: state.currencies.stardust,
            nebula_gas: state.currencies.nebula_gas,
            antimatter: state.currencies.antimatter,
        },
        upgrades: state
            .upgrades
            .iter()
            .map(|(id, u)| (*id, SavedUpgrade { level: u.level, cost: u.cost }))
            .collect(),
        total_stardust_ever: state.total_stardust_ever,
        stats: SavedStats {
            total_clicks: state.stats.total_clicks,
            supernova_count: state.stats.supernova_count,
            play_time: state.stats.play_time,
        },
    };
    Ok(serde_json::to_string(&data)?)
}

/// Rebuild a state from a stored blob. Never fails.
pub fn deserialize(blob: Option<&str>, now_ms: f64) -> LoadOutcome {
    let Some(json) = blob else {
        return LoadOutcome::Fresh(GameState::new(now_ms));
    };

    let root = match parse(json) {
        Ok(root) => root,
        Err(reason) => {
            return LoadOutcome::Recovered {
                state: GameState::new(now_ms),
                repairs: vec![Repair::Corrupt(reason)],
            }
        }
    };

    if let Some(note) = migration_note(root.get("version")) {
        console::log(&note);
    }

    let mut state = GameState::new(now_ms);
    let mut repairs = Vec::new();

    if let Some(c) = group(&root, "currencies", &mut repairs) {
        state.currencies.stardust = number(c.get("stardust"), "currencies.stardust", &mut repairs);
        state.currencies.nebula_gas = number(c.get("nebula_gas"), "currencies.nebula_gas", &mut repairs);
        state.currencies.antimatter = number(c.get("antimatter"), "currencies.antimatter", &mut repairs);
    }

    state.total_stardust_ever = number(root.get("total_stardust_ever"), "total_stardust_ever", &mut repairs);

    if let Some(s) = group(&root, "stats", &mut repairs) {
        state.stats = Stats {
            total_clicks: number(s.get("total_clicks"), "stats.total_clicks", &mut repairs) as u64,
            supernova_count: number(s.get("supernova_count"), "stats.supernova_count", &mut repairs) as u32,
            play_time: number(s.get("play_time"), "stats.play_time", &mut repairs),
        };
    }

    if let Some(saved) = group(&root, "upgrades", &mut repairs) {
        merge_upgrades(&mut state, saved, &mut repairs);
    }

    if repairs.is_empty() {
        LoadOutcome::Loaded(state)
    } else {
        LoadOutcome::Recovered { state, repairs }
    }
}

/// Only text that is not JSON, or JSON that is not an object, is corrupt.
fn parse(json: &str) -> Result<Map<String, Value>, String> {
    let value: Value = serde_json::from_str(json).map_err(|e| e.to_string())?;
    match value {
        Value::Object(root) => Ok(root),
        _ => Err("save data is not an object".to_string()),
    }
}

/// Log line for a blob written before the current format version.
fn migration_note(version: Option<&Value>) -> Option<String> {
    match version.and_then(Value::as_u64) {
        Some(v) if v >= u64::from(SAVE_VERSION) => None,
        Some(v) => Some(format!(
            "Cosmic Clicker: migrating save from version {v} to {SAVE_VERSION}"
        )),
        None => Some(format!(
            "Cosmic Clicker: migrating unversioned save to version {SAVE_VERSION}"
        )),
    }
}

/// A nested object, or `None` with a repair note.
fn group<'a>(
    root: &'a Map<String, Value>,
    field: &'static str,
    repairs: &mut Vec<Repair>,
) -> Option<&'a Map<String, Value>> {
    match root.get(field) {
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            repairs.push(Repair::WrongType(field));
            None
        }
        None => {
            repairs.push(Repair::MissingField(field));
            None
        }
    }
}

/// A non-negative finite number, or 0 with a repair note.
fn number(value: Option<&Value>, field: &'static str, repairs: &mut Vec<Repair>) -> f64 {
    match value.map(Value::as_f64) {
        Some(Some(v)) if v.is_finite() && v >= 0.0 => v,
        Some(_) => {
            repairs.push(Repair::InvalidNumber(field));
            0.0
        }
        None => {
            repairs.push(Repair::MissingField(field));
            0.0
        }
    }
}

/// Carry over levels only; costs come from the catalog.
fn merge_upgrades(state: &mut GameState, saved: &Map<String, Value>, repairs: &mut Vec<Repair>) {
    for id in saved.keys() {
        if catalog::find(id).is_none() {
            repairs.push(Repair::UnknownUpgrade(id.clone()));
        }
    }

    for def in catalog::all_upgrades() {
        let Some(entry) = saved.get(def.id) else {
            repairs.push(Repair::MissingUpgrade(def.id));
            continue;
        };
        let Some(raw) = entry.get("level").and_then(Value::as_u64) else {
            repairs.push(Repair::InvalidLevel(def.id));
            continue;
        };
        let ceiling = def.max_level.map_or(MAX_LOADED_LEVEL, |max| max.min(MAX_LOADED_LEVEL));
        let level = match u32::try_from(raw) {
            Ok(level) if level <= ceiling => level,
            _ => {
                repairs.push(Repair::ClampedLevel(def.id));
                ceiling
            }
        };
        state.set_level(def, level);
    }
}

/// Write `state` to storage. Failures are logged and returned; the caller's
/// state is never touched.
pub fn save_game(storage: &mut dyn Storage, state: &GameState) -> Result<(), StorageError> {
    let json = serialize(state).map_err(|e| {
        console::error(&format!("Cosmic Clicker: failed to encode save: {e}"));
        e
    })?;
    storage.set(STORAGE_KEY, &json).map_err(|e| {
        console::warn(&format!("Cosmic Clicker: failed to write save: {e}"));
        e
    })
}

/// Read and reconcile the stored blob. A corrupt blob is removed.
pub fn load_game(storage: &mut dyn Storage, now_ms: f64) -> LoadOutcome {
    let blob = match storage.get(STORAGE_KEY) {
        Ok(blob) => blob,
        Err(e) => {
            console::warn(&format!("Cosmic Clicker: could not read save, starting fresh: {e}"));
            return LoadOutcome::Recovered {
                state: GameState::new(now_ms),
                repairs: vec![Repair::Unreadable(e.to_string())],
            };
        }
    };

    let outcome = deserialize(blob.as_deref(), now_ms);
    match &outcome {
        LoadOutcome::Recovered { repairs, .. } if outcome.is_corrupt() => {
            console::warn(&format!(
                "Cosmic Clicker: discarding unreadable save data: {repairs:?}"
            ));
            if let Err(e) = storage.remove(STORAGE_KEY) {
                console::warn(&format!("Cosmic Clicker: failed to remove corrupt save: {e}"));
            }
        }
        LoadOutcome::Recovered { repairs, .. } => {
            console::log(&format!(
                "Cosmic Clicker: save data reconciled with {} repair(s): {repairs:?}",
                repairs.len()
            ));
        }
        LoadOutcome::Fresh(_) | LoadOutcome::Loaded(_) => {}
    }
    outcome
}

/// Remove the stored blob.
pub fn delete_save(storage: &mut dyn Storage) {
    if let Err(e) = storage.remove(STORAGE_KEY) {
        console::warn(&format!("Cosmic Clicker: failed to delete save: {e}"));
    }
}
