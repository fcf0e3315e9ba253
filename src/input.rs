//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  What a key does depends on
//! the current [`Mode`]: the search box swallows printable characters, the
//! detail overlay only listens for close keys.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] or the session for the action.
//! 2. Add a `KeyCode` match arm in the relevant `handle_*` function.
//! 3. Update the help text in [`crate::ui`].

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Mode};

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }

    match app.mode {
        Mode::Browse => handle_browse(app, key),
        Mode::Search => handle_search(app, key, now),
        Mode::Detail => handle_detail(app, key),
    }
}

fn handle_browse(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('/') => app.mode = Mode::Search,
        KeyCode::Char('c') => app.session.cycle_category(true),
        KeyCode::Char('C') => app.session.cycle_category(false),
        KeyCode::Char('n') => app.session.cycle_country(true),
        KeyCode::Char('N') => app.session.cycle_country(false),
        KeyCode::Char('s') => app.session.cycle_page_size(),
        KeyCode::Char('p') => app.session.switch_provider(),
        KeyCode::Right | KeyCode::Char(']') => app.session.next_page(),
        KeyCode::Left | KeyCode::Char('[') => app.session.prev_page(),
        _ => {}
    }
}

fn handle_search(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.mode = Mode::Browse,
        KeyCode::Backspace => app.pop_search_char(now),
        KeyCode::Delete => app.clear_search(now),
        KeyCode::Char(c) => app.push_search_char(c, now),
        _ => {}
    }
}

fn handle_detail(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_detail(),
        _ => {}
    }
}
