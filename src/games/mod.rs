//! The seam between the host shell and a game.

pub mod cosmic;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

pub trait Game {
    /// Handle an input event. Returns true if the event was consumed.
    fn handle_input(&mut self, event: &InputEvent) -> bool;

    /// Advance the simulation to wall-clock `now_ms`.
    fn tick(&mut self, now_ms: f64);

    /// Draw the game and register this frame's click targets.
    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>);

    /// Write the current progress to storage. Failures are logged, not raised.
    fn persist(&mut self);
}
