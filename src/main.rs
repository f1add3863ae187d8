mod console;
mod games;
mod input;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use games::cosmic::save::{LocalStorage, AUTOSAVE_PERIOD_MS};
use games::cosmic::session::TICK_PERIOD_MS;
use games::cosmic::CosmicGame;
use games::Game;
use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};
use time::Interval;

/// Fixed-period work driven from the draw loop.
struct Schedule {
    tick: Interval,
    autosave: Interval,
}

/// Map a mouse position to a terminal cell using the grid container's
/// bounding rect.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let document = web_sys::window()?.document()?;
    // DomBackend renders into a <div> directly under <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

/// Best-effort save when the page is closed or reloaded.
fn install_unload_save(game: &Rc<RefCell<CosmicGame>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let on_unload = {
        let game = game.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            if let Ok(mut game) = game.try_borrow_mut() {
                game.persist();
            }
        }) as Box<dyn FnMut(_)>)
    };
    if window
        .add_event_listener_with_callback("beforeunload", on_unload.as_ref().unchecked_ref())
        .is_err()
    {
        console::warn("Cosmic Clicker: could not install the unload save hook");
    }
    // Lives as long as the page.
    on_unload.forget();
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let game = Rc::new(RefCell::new(CosmicGame::load(
        Box::new(LocalStorage),
        js_sys::Date::now(),
    )));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = {
                let cs = click_state.borrow();
                if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                    return;
                }
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.hit_test(col, row))
            };

            if let Some(action_id) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(action_id));
            }
        }
    });

    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                game.borrow_mut().handle_input(&InputEvent::Key(c));
            }
        }
    });

    install_unload_save(&game);

    let schedule = RefCell::new(Schedule {
        tick: Interval::new(TICK_PERIOD_MS),
        autosave: Interval::new(AUTOSAVE_PERIOD_MS),
    });

    terminal.draw_web(move |f| {
        let now = js_sys::Date::now();
        {
            let mut schedule = schedule.borrow_mut();
            if schedule.tick.due(now) {
                game.borrow_mut().tick(now);
            }
            if schedule.autosave.due(now) {
                game.borrow_mut().persist();
            }
        }

        let area = f.area();
        click_state.borrow_mut().begin_frame(area.width, area.height);
        game.borrow().render(f, area, &click_state);
    });

    Ok(())
}
