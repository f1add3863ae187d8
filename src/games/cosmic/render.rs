//! Cosmic Clicker rendering.
//!
//! Everything here reads a shared `&Session`; nothing in this module can
//! change the simulation.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::actions::*;
use super::catalog::{self, Currency, UpgradeDef, ORBITAL_COLLECTOR};
use super::logic::{self, format_number};
use super::session::{DerivedStats, Session, MAX_COLLECTIBLES};
use super::state::History;
use super::{upgrade_key, visible_upgrades, Presentation};

const STAR_ART: &[&str] = &[
    r"      .      ",
    r"   \  |  /   ",
    r" -- ( ✦ ) -- ",
    r"   /  |  \   ",
    r"      '      ",
];

/// Sparkline characters (8 levels).
const SPARKLINE_CHARS: &[char] = &[' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇'];

fn currency_color(currency: Currency) -> Color {
    match currency {
        Currency::Stardust => Color::Yellow,
        Currency::NebulaGas => Color::Magenta,
        Currency::Antimatter => Color::Cyan,
    }
}

fn panel(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(title, Style::default().fg(color).add_modifier(Modifier::BOLD)))
}

pub fn render(
    session: &Session,
    ui: &Presentation,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let stats = session.derived_stats();

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(10)])
        .split(area);
    render_header(session, &stats, f, outer[0]);

    if is_narrow_layout(area.width) {
        let comet_rows = session.collectibles().len().max(1) as u16 + 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(STAR_ART.len() as u16 + 3),
                Constraint::Length(comet_rows),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
                Constraint::Length(5),
            ])
            .split(outer[1]);
        render_star(session, &stats, f, chunks[0], click_state);
        render_collectibles(session, f, chunks[1], click_state);
        render_tabs(ui, f, chunks[2], click_state);
        render_upgrades(session, ui, f, chunks[3], click_state);
        render_prestige(ui, &stats, session, f, chunks[4], click_state);
        render_log(ui, f, chunks[5]);
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(outer[1]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(STAR_ART.len() as u16 + 3),
                Constraint::Length(MAX_COLLECTIBLES as u16 + 2),
                Constraint::Min(9),
            ])
            .split(columns[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
                Constraint::Length(8),
            ])
            .split(columns[1]);

        render_star(session, &stats, f, left[0], click_state);
        render_collectibles(session, f, left[1], click_state);
        render_stats(session, &stats, f, left[2]);
        render_tabs(ui, f, right[0], click_state);
        render_upgrades(session, ui, f, right[1], click_state);
        render_prestige(ui, &stats, session, f, right[2], click_state);
        render_log(ui, f, right[3]);
    }
}

fn render_header(session: &Session, stats: &DerivedStats, f: &mut Frame, area: Rect) {
    let balances = &session.state().currencies;
    let rate = |per_sec: f64| {
        if per_sec > 0.0 {
            format!(" (+{}/s)", format_number(per_sec))
        } else {
            String::new()
        }
    };

    let mut spans = Vec::new();
    for (i, currency) in Currency::all().iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
        }
        let per_sec = match currency {
            Currency::Stardust => stats.stardust_per_second,
            Currency::NebulaGas => stats.nebula_per_second,
            Currency::Antimatter => 0.0,
        };
        spans.push(Span::styled(
            format!("{} {}", currency.name(), format_number(balances.get(*currency))),
            Style::default().fg(currency_color(*currency)).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(rate(per_sec), Style::default().fg(Color::DarkGray)));
    }

    let title = Line::from(Span::styled(
        "✦ Cosmic Clicker ✦",
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));
    let widget = Paragraph::new(vec![title, Line::from(spans)])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    f.render_widget(widget, area);
}

fn render_star(
    session: &Session,
    stats: &DerivedStats,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    // Twinkle with the click count so feedback is visible without animation state.
    let twinkle = session.state().stats.total_clicks % 2 == 1;
    let star_style = if twinkle {
        Style::default().fg(Color::LightYellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };
    for row in STAR_ART {
        cl.push_clickable(Line::from(Span::styled(*row, star_style)), CLICK_STAR);
    }
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [c] ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(format!("Click the star  +{} Stardust", format_number(stats.stardust_per_click))),
        ]),
        CLICK_STAR,
    );

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1);
    let widget = Paragraph::new(cl.into_lines())
        .alignment(Alignment::Center)
        .block(panel("Star", Color::Yellow));
    f.render_widget(widget, area);
}

fn render_collectibles(
    session: &Session,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    let comets = session.collectibles();
    if comets.is_empty() {
        let hint = if session.state().level(ORBITAL_COLLECTOR) == 0 {
            " Orbital Collectors attract passing comets."
        } else {
            " Watching the sky for comets..."
        };
        cl.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));
    }
    for (i, comet) in comets.iter().enumerate() {
        let key = if i == 0 { " [g] " } else { "     " };
        cl.push_clickable(
            Line::from(vec![
                Span::styled(key, Style::default().fg(Color::Green)),
                Span::styled("☄ ", Style::default().fg(Color::LightCyan)),
                Span::raw(format!("Comet  +{} Stardust", format_number(comet.value))),
            ]),
            COLLECT_BASE + i as u16,
        );
    }

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1);
    let title = format!("Comets {}/{}", comets.len(), MAX_COLLECTIBLES);
    let widget = Paragraph::new(cl.into_lines()).block(panel(&title, Color::LightCyan));
    f.render_widget(widget, area);
}

fn render_stats(session: &Session, stats: &DerivedStats, f: &mut Frame, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let row = |name: &str, value: String| {
        Line::from(vec![Span::styled(format!(" {name:<16}"), label), Span::raw(value)])
    };

    let width = area.width.saturating_sub(4) as usize;
    let lines = vec![
        row("Per click", format_number(stats.stardust_per_click)),
        row("Stardust/s", format_number(stats.stardust_per_second)),
        row("Nebula Gas/s", format_number(stats.nebula_per_second)),
        row("Total clicks", format_number(stats.total_clicks as f64)),
        row("Supernovas", stats.supernova_count.to_string()),
        row("Antimatter bonus", stats.prestige_bonus.clone()),
        row("Play time", stats.play_time.clone()),
        Line::from(Span::styled(
            format!(" {}", sparkline(session.history(), width)),
            Style::default().fg(Color::Yellow),
        )),
    ];
    let widget = Paragraph::new(lines).block(panel("Statistics", Color::Blue));
    f.render_widget(widget, area);
}

/// Stardust earned per second between consecutive samples, newest on the
/// right, scaled to the busiest interval shown.
fn sparkline(history: &History, width: usize) -> String {
    let samples: Vec<_> = history.iter().collect();
    let rates: Vec<f64> = samples
        .windows(2)
        .map(|w| {
            let secs = (w[1].timestamp_ms - w[0].timestamp_ms) / 1000.0;
            if secs > 0.0 {
                ((w[1].total_stardust - w[0].total_stardust) / secs).max(0.0)
            } else {
                0.0
            }
        })
        .collect();
    let shown = &rates[rates.len().saturating_sub(width)..];
    let peak = shown.iter().copied().fold(0.0, f64::max);
    if peak <= 0.0 {
        return String::new();
    }
    let top = (SPARKLINE_CHARS.len() - 1) as f64;
    shown
        .iter()
        .map(|r| SPARKLINE_CHARS[((r / peak) * top).round() as usize])
        .collect()
}

fn render_tabs(ui: &Presentation, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let style = |currency: Currency| {
        let color = currency_color(currency);
        if ui.tab == currency {
            Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        }
    };
    let mut cs = click_state.borrow_mut();
    TabBar::new("│")
        .tab("[1] Stardust", style(Currency::Stardust), TAB_STARDUST)
        .tab("[2] Nebula", style(Currency::NebulaGas), TAB_NEBULA)
        .tab("[3] Antimatter", style(Currency::Antimatter), TAB_ANTIMATTER)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)))
        .render(f, area, &mut cs);
}

fn upgrade_line<'a>(session: &Session, def: &UpgradeDef, index: usize) -> Line<'a> {
    let state = session.state();
    let level = state.level(def.id);
    let key = upgrade_key(index).map_or("   ".to_string(), |k| format!("[{k}]"));
    let level_text = match def.max_level {
        Some(max) => format!("Lv {level}/{max}"),
        None => format!("Lv {level}"),
    };

    if def.is_maxed(level) {
        return Line::from(vec![
            Span::styled(format!(" {key} "), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{} {level_text}  MAX", def.name), Style::default().fg(Color::DarkGray)),
        ]);
    }

    let cost = logic::effective_cost(state, def.id).unwrap_or(f64::INFINITY);
    let affordable = state.currencies.get(def.currency) >= cost;
    let (key_style, name_style) = if affordable {
        (
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White),
        )
    } else {
        (Style::default().fg(Color::DarkGray), Style::default().fg(Color::Gray))
    };
    Line::from(vec![
        Span::styled(format!(" {key} "), key_style),
        Span::styled(format!("{} {level_text}", def.name), name_style),
        Span::styled(
            format!("  {} ", format_number(cost)),
            Style::default().fg(currency_color(def.currency)),
        ),
        Span::styled(def.description, Style::default().fg(Color::DarkGray)),
    ])
}

fn render_upgrades(
    session: &Session,
    ui: &Presentation,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let state = session.state();
    let listed = visible_upgrades(state, ui.tab);
    let locked = catalog::upgrades_for(ui.tab).count() - listed.len();

    let mut cl = ClickableList::new();
    for (i, def) in listed.iter().enumerate() {
        cl.push_clickable(upgrade_line(session, def, i), BUY_UPGRADE_BASE + i as u16);
    }
    if listed.is_empty() {
        cl.push(Line::from(Span::styled(
            " Nothing to buy here yet.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    if locked > 0 {
        cl.push(Line::from(Span::styled(
            format!(" {locked} more upgrade(s) locked."),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1);
    let title = format!("{} Upgrades", ui.tab.name());
    let widget = Paragraph::new(cl.into_lines()).block(panel(&title, currency_color(ui.tab)));
    f.render_widget(widget, area);
}

fn render_prestige(
    ui: &Presentation,
    stats: &DerivedStats,
    session: &Session,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    match stats.pending_antimatter {
        Some(gain) => cl.push_clickable(
            Line::from(vec![
                Span::styled(" [p] ", Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("Go Supernova  +{} Antimatter", format_number(gain)),
                    Style::default().fg(Color::LightRed),
                ),
            ]),
            PRESTIGE,
        ),
        None => {
            let progress = session.state().total_stardust_ever / logic::PRESTIGE_THRESHOLD * 100.0;
            cl.push(Line::from(Span::styled(
                format!(
                    " Supernova at {} Stardust this run ({:.1}%)",
                    format_number(logic::PRESTIGE_THRESHOLD),
                    progress.min(100.0)
                ),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let reset_line = if ui.reset_armed {
        Line::from(Span::styled(
            " [R] Press again to ERASE all progress",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(" [R] Reset save", Style::default().fg(Color::DarkGray)))
    };
    cl.push_clickable(reset_line, RESET);

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1);
    let widget = Paragraph::new(cl.into_lines()).block(panel("Supernova", Color::LightRed));
    f.render_widget(widget, area);
}

fn render_log(ui: &Presentation, f: &mut Frame, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = ui
        .log
        .iter()
        .skip(ui.log.len().saturating_sub(visible))
        .map(|msg| Line::from(format!(" {msg}")))
        .collect();
    let widget = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(panel("Log", Color::DarkGray));
    f.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::cosmic::state::HistorySample;

    fn history(points: &[(f64, f64)]) -> History {
        let mut h = History::default();
        for &(timestamp_ms, total_stardust) in points {
            h.push(HistorySample { timestamp_ms, total_stardust });
        }
        h
    }

    #[test]
    fn sparkline_needs_two_samples() {
        assert_eq!(sparkline(&history(&[]), 20), "");
        assert_eq!(sparkline(&history(&[(0.0, 5.0)]), 20), "");
    }

    #[test]
    fn sparkline_scales_to_peak() {
        let h = history(&[(0.0, 0.0), (1_000.0, 7.0), (2_000.0, 21.0), (3_000.0, 21.0)]);
        // rates 7, 14, 0
        assert_eq!(sparkline(&h, 20), "▄▇ ");
    }

    #[test]
    fn sparkline_keeps_newest_when_narrow() {
        let h = history(&[(0.0, 0.0), (1_000.0, 1.0), (2_000.0, 3.0), (3_000.0, 6.0)]);
        assert_eq!(sparkline(&h, 2).chars().count(), 2);
        assert!(sparkline(&h, 2).ends_with('▇'));
    }

    #[test]
    fn sparkline_treats_drop_as_zero() {
        let h = history(&[(0.0, 100.0), (1_000.0, 0.0)]);
        assert_eq!(sparkline(&h, 10), "");
    }
}
