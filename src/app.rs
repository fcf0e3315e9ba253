use std::time::Instant;

use ratatui::widgets::ListState;

use crate::fetch::{FetchDone, FetchRequest};
use crate::location::MemoryLocation;
use crate::session::NewsSession;

/// Which part of the screen receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Moving through the article list.
    Browse,
    /// Typing into the search box.
    Search,
    /// The article detail overlay is open.
    Detail,
}

pub struct App {
    pub session: NewsSession<MemoryLocation>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    pub mode: Mode,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Advances every tick; drives the loading spinner.
    pub frame: usize,
}

impl App {
    pub fn new(session: NewsSession<MemoryLocation>) -> Self {
        Self {
            session,
            list_state: ListState::default(),
            mode: Mode::Browse,
            quit: false,
            frame: 0,
        }
    }

    /// Advance timers; returns a search to start, if any.
    pub fn tick(&mut self, now: Instant) -> Option<FetchRequest> {
        self.frame = self.frame.wrapping_add(1);
        self.session.tick(now)
    }

    pub fn on_fetch_done(&mut self, done: FetchDone) {
        if self.session.on_fetch_done(done) {
            let has_items = !self.session.outcome().data.articles.is_empty();
            self.list_state.select(has_items.then_some(0));
            if self.mode == Mode::Detail {
                self.mode = Mode::Browse;
            }
        }
    }

    fn article_count(&self) -> usize {
        self.session.outcome().data.articles.len()
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let len = self.article_count();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.article_count() == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.article_count() > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.article_count();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    // -- overlay & search box -------------------------------------------------

    pub fn open_detail(&mut self) {
        if let Some(i) = self.list_state.selected() {
            self.session.select(i);
            if self.session.selected_article().is_some() {
                self.mode = Mode::Detail;
            }
        }
    }

    pub fn close_detail(&mut self) {
        self.session.close_detail();
        self.mode = Mode::Browse;
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        let mut text = self.session.params().q.clone();
        text.push(c);
        self.session.set_search(text, now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        let mut text = self.session.params().q.clone();
        if text.pop().is_some() {
            self.session.set_search(text, now);
        }
    }

    pub fn clear_search(&mut self, now: Instant) {
        if !self.session.params().q.is_empty() {
            self.session.set_search("", now);
        }
    }
}
