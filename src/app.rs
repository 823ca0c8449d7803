//! Terminal state for a paged reply
//!
//! Holds the paged view on behalf of the invoking user and turns key presses
//! into the same navigation a chat platform's buttons would trigger.

use crossterm::event::{KeyCode, KeyEvent};

use crate::commands::{Embed, PagedView, ViewUpdate};
use crate::pager::{Direction, UserId};

/// Main application struct for one paged reply
pub struct App {
    /// The paged listing being browsed
    pub view: PagedView,
    /// Page currently on screen
    pub embed: Embed,
    /// User pressing the keys
    pub user: UserId,
    /// Private notice shown under the page, if any
    pub notice: Option<String>,
    /// Set once the idle timeout closes the view
    pub expired: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
}

impl App {
    /// Creates an App showing the first page of `view`
    pub fn new(view: PagedView, user: UserId) -> Self {
        let embed = view.embed();
        Self {
            view,
            embed,
            user,
            notice: None,
            expired: false,
            show_help: false,
            should_quit: false,
        }
    }

    /// Handles a key press.
    ///
    /// ←/h and →/l page, q/Esc quit, ? toggles help.
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.press(Direction::Previous);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.press(Direction::Next);
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    /// Applies a navigation press from the current user
    pub fn press(&mut self, direction: Direction) {
        if self.expired {
            return;
        }
        match self.view.press(self.user, direction) {
            ViewUpdate::Edit(embed) => {
                self.embed = embed;
                self.notice = None;
            }
            ViewUpdate::Notice(text) => {
                self.notice = Some(text);
            }
            ViewUpdate::Closed => self.close(),
        }
    }

    /// Checks the idle timeout; called on every loop iteration
    pub fn tick(&mut self) {
        if !self.expired && self.view.is_expired() {
            self.close();
        }
    }

    fn close(&mut self) {
        self.expired = true;
        self.notice = Some(self.view.label("ui.nav_expired"));
    }

    pub fn can_go_previous(&self) -> bool {
        !self.expired && self.view.has_previous()
    }

    pub fn can_go_next(&self) -> bool {
        !self.expired && self.view.has_next()
    }
}
