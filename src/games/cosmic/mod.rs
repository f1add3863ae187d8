//! Cosmic Clicker: an idle space economy.
//!
//! Click the star for Stardust, buy upgrades in three currencies, catch
//! drifting comets and go supernova for permanent Antimatter bonuses.

pub mod actions;
pub mod catalog;
pub mod effect;
pub mod logic;
pub mod render;
pub mod save;
pub mod session;
pub mod state;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::console;
use crate::games::Game;
use crate::input::{ClickState, InputEvent};

use catalog::{Currency, UpgradeDef};
use logic::{format_number, Rejection};
use save::{LoadOutcome, Storage};
use session::Session;
use state::GameState;

/// Messages kept in the on-screen log.
const LOG_CAPACITY: usize = 30;

/// Keys for listed upgrades, in list order. Skips the letters bound to
/// click (`c`), collect (`g`) and prestige (`p`).
const UPGRADE_KEYS: &str = "abdefhijklmnoqs";

/// What the player is looking at. Never persisted.
pub struct Presentation {
    pub tab: Currency,
    /// First reset press seen; the next one erases the save.
    pub reset_armed: bool,
    /// Newest last.
    pub log: VecDeque<String>,
}

impl Presentation {
    fn new() -> Self {
        Self {
            tab: Currency::Stardust,
            reset_armed: false,
            log: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    fn push_log(&mut self, msg: impl Into<String>) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(msg.into());
    }
}

/// Upgrades listed under `tab`: catalog order, unlocked only.
pub fn visible_upgrades(state: &GameState, tab: Currency) -> Vec<&'static UpgradeDef> {
    catalog::upgrades_for(tab).filter(|def| state.is_unlocked(def)).collect()
}

/// Key shown next to the `index`-th listed upgrade.
pub fn upgrade_key(index: usize) -> Option<char> {
    UPGRADE_KEYS.chars().nth(index)
}

pub struct CosmicGame {
    session: Session,
    storage: Box<dyn Storage>,
    ui: Presentation,
    /// Wall clock seen by the last tick; used to anchor a reset.
    now_ms: f64,
}

impl CosmicGame {
    pub fn new(session: Session, storage: Box<dyn Storage>, now_ms: f64) -> Self {
        Self {
            session,
            storage,
            ui: Presentation::new(),
            now_ms,
        }
    }

    /// Restore progress from `storage`, falling back to a fresh game.
    pub fn load(mut storage: Box<dyn Storage>, now_ms: f64) -> Self {
        let outcome = save::load_game(storage.as_mut(), now_ms);
        let greeting = match &outcome {
            LoadOutcome::Fresh(_) => "A new star ignites. Click it to gather Stardust.".to_string(),
            LoadOutcome::Loaded(_) => "Welcome back. Your star kept its place in the sky.".to_string(),
            LoadOutcome::Recovered { repairs, .. } => {
                format!("Save data was repaired ({} fix(es)).", repairs.len())
            }
        };
        let session = Session::from_state(outcome.into_state(), now_ms);
        let mut game = Self::new(session, storage, now_ms);
        game.ui.push_log(greeting);
        game
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub fn presentation(&self) -> &Presentation {
        &self.ui
    }

    fn manual_click(&mut self) {
        self.session.activate_manual_production();
    }

    fn select_tab(&mut self, tab: Currency) {
        self.ui.tab = tab;
    }

    /// Buy the `index`-th upgrade listed in the current tab.
    fn buy_listed(&mut self, index: usize) {
        let Some(def) = visible_upgrades(self.session.state(), self.ui.tab).get(index).copied() else {
            return;
        };
        match self.session.purchase(def.id) {
            Ok(cost) => {
                let level = self.session.state().level(def.id);
                self.ui.push_log(format!(
                    "Bought {} Lv {} for {} {}.",
                    def.name,
                    level,
                    format_number(cost),
                    def.currency.name()
                ));
            }
            Err(Rejection::InsufficientFunds { currency, needed, held }) => {
                self.ui.push_log(format!(
                    "{} needs {} {} (have {}).",
                    def.name,
                    format_number(needed),
                    currency,
                    format_number(held)
                ));
            }
            Err(Rejection::MaxLevel) => self.ui.push_log(format!("{} is fully upgraded.", def.name)),
            Err(reason) => self.ui.push_log(format!("Cannot buy {}: {}.", def.name, reason)),
        }
    }

    /// Collect the `index`-th live collectible.
    fn collect_at(&mut self, index: usize) {
        let Some(id) = self.session.collectibles().get(index).map(|c| c.id) else {
            return;
        };
        if let Some(value) = self.session.collect(id) {
            self.ui.push_log(format!("Caught a comet: +{} Stardust.", format_number(value)));
        }
    }

    fn go_supernova(&mut self) {
        match self.session.prestige() {
            Some(gain) => {
                self.ui.push_log(format!(
                    "SUPERNOVA! +{} Antimatter. The cosmos begins anew.",
                    format_number(gain)
                ));
                self.persist();
            }
            None => self.ui.push_log(format!(
                "Supernova needs {} total Stardust this run.",
                format_number(logic::PRESTIGE_THRESHOLD)
            )),
        }
    }

    /// First call arms, second call wipes the save and restarts.
    fn press_reset(&mut self) {
        if !self.ui.reset_armed {
            self.ui.reset_armed = true;
            self.ui.push_log("Press R again to erase all progress.");
            return;
        }
        self.ui.reset_armed = false;
        save::delete_save(self.storage.as_mut());
        self.session.reset(self.now_ms);
        console::log("Cosmic Clicker: progress reset");
        self.ui.push_log("All progress erased. A new star ignites.");
    }

    fn handle_key(&mut self, key: char) -> bool {
        match key {
            'c' | ' ' => self.manual_click(),
            '1' => self.select_tab(Currency::Stardust),
            '2' => self.select_tab(Currency::NebulaGas),
            '3' => self.select_tab(Currency::Antimatter),
            'g' => self.collect_at(0),
            'p' => self.go_supernova(),
            'R' => self.press_reset(),
            _ => match UPGRADE_KEYS.find(key) {
                Some(index) => self.buy_listed(index),
                None => return false,
            },
        }
        true
    }

    fn handle_click(&mut self, action_id: u16) -> bool {
        use actions::*;
        match action_id {
            CLICK_STAR => self.manual_click(),
            TAB_STARDUST => self.select_tab(Currency::Stardust),
            TAB_NEBULA => self.select_tab(Currency::NebulaGas),
            TAB_ANTIMATTER => self.select_tab(Currency::Antimatter),
            PRESTIGE => self.go_supernova(),
            RESET => self.press_reset(),
            id if (COLLECT_BASE..COLLECT_BASE + session::MAX_COLLECTIBLES as u16).contains(&id) => {
                self.collect_at((id - COLLECT_BASE) as usize)
            }
            id if (BUY_UPGRADE_BASE..BUY_UPGRADE_BASE + UPGRADE_KEYS.len() as u16).contains(&id) => {
                self.buy_listed((id - BUY_UPGRADE_BASE) as usize)
            }
            _ => return false,
        }
        true
    }
}

impl Game for CosmicGame {
    fn handle_input(&mut self, event: &InputEvent) -> bool {
        let is_reset = matches!(event, InputEvent::Key('R') | InputEvent::Click(actions::RESET));
        if !is_reset && self.ui.reset_armed {
            self.ui.reset_armed = false;
            self.ui.push_log("Reset cancelled.");
        }
        match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(id) => self.handle_click(*id),
        }
    }

    fn tick(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        let report = self.session.tick(now_ms);
        if let Some(c) = report.spawned {
            self.ui.push_log(format!(
                "A comet drifts past, carrying {} Stardust. [g] to catch it.",
                format_number(c.value)
            ));
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.session, &self.ui, f, area, click_state);
    }

    fn persist(&mut self) {
        if save::save_game(self.storage.as_mut(), self.session.state()).is_err() {
            self.ui.push_log("Autosave failed; progress is kept in memory.");
        }
    }
}
