//! Semantic action IDs for Cosmic Clicker click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Star ────────────────────────────────────────────────────────
pub const CLICK_STAR: u16 = 0;

// ── Collectibles (base + index into the live list) ──────────────
pub const COLLECT_BASE: u16 = 10;

// ── Currency tabs ───────────────────────────────────────────────
pub const TAB_STARDUST: u16 = 30;
pub const TAB_NEBULA: u16 = 31;
pub const TAB_ANTIMATTER: u16 = 32;

// ── Upgrade purchase (base + display index in the current tab) ──
pub const BUY_UPGRADE_BASE: u16 = 100;

// ── Prestige / reset ────────────────────────────────────────────
pub const PRESTIGE: u16 = 200;
pub const RESET: u16 = 210;
