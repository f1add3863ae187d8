//! Fixed-period scheduling for the draw loop.
//!
//! `draw_web()` runs at display rate with a variable delta. An [`Interval`]
//! turns that into "is it time yet?" for work that must happen on a fixed
//! period (simulation ticks, autosave). It fires at most once per poll: a
//! late frame produces one call covering the whole gap, never a burst of
//! catch-up calls.

pub struct Interval {
    period_ms: f64,
    /// Timestamp of the last firing; `None` until the first poll.
    last_fire: Option<f64>,
}

impl Interval {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            last_fire: None,
        }
    }

    /// Poll with the current wall-clock time. The first poll only sets the
    /// phase and never fires.
    pub fn due(&mut self, now_ms: f64) -> bool {
        match self.last_fire {
            None => {
                self.last_fire = Some(now_ms);
                false
            }
            // Clock moved backwards: re-anchor instead of stalling.
            Some(prev) if now_ms < prev => {
                self.last_fire = Some(now_ms);
                false
            }
            Some(prev) if now_ms - prev >= self.period_ms => {
                self.last_fire = Some(now_ms);
                true
            }
            Some(_) => false,
        }
    }
}
