//! Input plumbing shared by the host shell and the game: normalized events,
//! the per-frame click-target registry and pixel → cell conversion.

use ratzilla::ratatui::layout::Rect;

/// Keyboard and pointer input after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A printable key.
    Key(char),
    /// A press on a registered target, carrying its semantic action id.
    Click(u16),
}

/// Screen region bound to an action id for one frame.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Targets registered by the last render, plus the terminal size they were
/// laid out for. Rebuilt from scratch every frame.
#[derive(Default)]
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame at the given terminal size.
    pub fn begin_frame(&mut self, cols: u16, rows: u16) {
        self.terminal_cols = cols;
        self.terminal_rows = rows;
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Full-width target on `row`, ignored when the row lies outside `area`.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Targets for a one-line tab bar. `tab_widths` holds
    /// `(padded_label_width, action_id)` per tab in display order.
    ///
    /// Each tab's target spans its label plus half of the separator on each
    /// side. The first and last tabs stretch to the edges of `total_width`.
    pub fn register_tab_targets(
        &mut self,
        tab_widths: &[(u16, u16)],
        separator_width: u16,
        x: u16,
        y: u16,
        total_width: u16,
        height: u16,
    ) {
        let n = tab_widths.len();
        if n == 0 || total_width == 0 {
            return;
        }

        let mut starts = Vec::with_capacity(n);
        let mut cursor = 0u16;
        for (i, &(w, _)) in tab_widths.iter().enumerate() {
            if i > 0 {
                cursor += separator_width;
            }
            starts.push(cursor);
            cursor += w;
        }
        let end = |i: usize| starts[i] + tab_widths[i].0;

        for (i, &(_, action_id)) in tab_widths.iter().enumerate() {
            let left = if i == 0 { 0 } else { end(i - 1) + (starts[i] - end(i - 1)) / 2 };
            let right = if i == n - 1 {
                total_width
            } else {
                end(i) + (starts[i + 1] - end(i)) / 2
            };
            let w = right.saturating_sub(left);
            if w > 0 {
                self.add_click_target(Rect::new(x + left, y, w, height), action_id);
            }
        }
    }

    /// Action at a cell. Later registrations sit on top and win overlaps.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            let inside = col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height;
            inside.then_some(t.action_id)
        })
    }
}

/// Below this width panels stack vertically.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Pixel offset within the grid → row index. `None` outside the grid.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    pixel_to_cell(click_y, grid_height, terminal_rows)
}

/// Pixel offset within the grid → column index. `None` outside the grid.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    pixel_to_cell(click_x, grid_width, terminal_cols)
}

fn pixel_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / cells as f64)) as u16;
    (cell < cells).then_some(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_rows_and_columns() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 5, 10, 1), 1);
        cs.add_click_target(Rect::new(10, 5, 10, 1), 2);
        cs.add_click_target(Rect::new(0, 8, 40, 3), 3);

        assert_eq!(cs.hit_test(9, 5), Some(1));
        assert_eq!(cs.hit_test(10, 5), Some(2));
        assert_eq!(cs.hit_test(20, 5), None);
        assert_eq!(cs.hit_test(5, 7), None);
        assert_eq!(cs.hit_test(5, 10), Some(3));
        assert_eq!(cs.hit_test(5, 11), None);
    }

    #[test]
    fn later_target_wins_overlap() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 5, 80, 1), 1);
        cs.add_click_target(Rect::new(5, 5, 10, 1), 2);
        assert_eq!(cs.hit_test(7, 5), Some(2));
        assert_eq!(cs.hit_test(20, 5), Some(1));
    }

    #[test]
    fn row_target_respects_area() {
        let mut cs = ClickState::new();
        let area = Rect::new(5, 10, 30, 5);
        cs.add_row_target(area, 9, 1);
        cs.add_row_target(area, 15, 2);
        cs.add_row_target(area, 12, 3);
        assert_eq!(cs.targets.len(), 1);
        assert_eq!(cs.hit_test(6, 12), Some(3));
        assert_eq!(cs.hit_test(4, 12), None);
    }

    #[test]
    fn begin_frame_drops_old_targets() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 1, 80, 1), 1);
        cs.begin_frame(100, 40);
        assert!(cs.targets.is_empty());
        assert_eq!((cs.terminal_cols, cs.terminal_rows), (100, 40));
        assert_eq!(cs.hit_test(0, 1), None);
    }

    #[test]
    fn tab_targets_split_separators() {
        // [6]" │ "[6]" │ "[6]
        let mut cs = ClickState::new();
        cs.register_tab_targets(&[(6, 30), (6, 31), (6, 32)], 3, 0, 2, 80, 1);
        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(6, 2), Some(30));
        assert_eq!(cs.hit_test(7, 2), Some(31));
        assert_eq!(cs.hit_test(15, 2), Some(31));
        assert_eq!(cs.hit_test(16, 2), Some(32));
        assert_eq!(cs.hit_test(79, 2), Some(32));
    }

    #[test]
    fn tab_targets_with_offset_and_height() {
        let mut cs = ClickState::new();
        cs.register_tab_targets(&[(6, 1), (6, 2)], 1, 5, 3, 30, 2);
        assert_eq!(cs.hit_test(5, 4), Some(1));
        assert_eq!(cs.hit_test(4, 3), None);
        assert_eq!(cs.hit_test(34, 3), Some(2));
    }

    #[test]
    fn tab_targets_empty_input() {
        let mut cs = ClickState::new();
        cs.register_tab_targets(&[], 3, 0, 0, 80, 1);
        cs.register_tab_targets(&[(4, 1)], 3, 0, 0, 0, 1);
        assert!(cs.targets.is_empty());
    }

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(59));
        assert!(!is_narrow_layout(60));
    }

    #[test]
    fn pixel_to_row_and_col() {
        assert_eq!(pixel_y_to_row(0.0, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(14.9, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(15.0, 450.0, 30), Some(1));
        assert_eq!(pixel_y_to_row(449.0, 450.0, 30), Some(29));
        assert_eq!(pixel_x_to_col(10.0, 800.0, 80), Some(1));
        assert_eq!(pixel_x_to_col(799.0, 800.0, 80), Some(79));
    }

    #[test]
    fn pixel_outside_grid_is_none() {
        assert_eq!(pixel_y_to_row(450.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(-1.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(10.0, 0.0, 30), None);
        assert_eq!(pixel_x_to_col(10.0, 800.0, 0), None);
    }

    #[test]
    fn pixel_pipeline_reaches_target() {
        let mut cs = ClickState::new();
        cs.begin_frame(40, 30);
        cs.add_click_target(Rect::new(0, 11, 40, 1), 7);

        let grid_height = 30.0 * 15.0;
        let row = pixel_y_to_row(11.0 * 15.0 + 7.0, grid_height, cs.terminal_rows).unwrap();
        let col = pixel_x_to_col(100.0, 400.0, cs.terminal_cols).unwrap();
        assert_eq!(cs.hit_test(col, row), Some(7));
    }
}
