//! Core traits for the admin TUI architecture
//!
//! Every screen implements `AdminScreen` so the app shell can route input,
//! async results and drawing without knowing what the screen shows.

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::admin_tui::{
    app::{Route, Services},
    components::{list_detail::LayoutMode, notification::Notification},
    events::AppEvent,
};

/// Actions that can be returned from screen event handling
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// Navigate to a different screen
    NavigateTo(Route),
    /// Raise a notification
    Notify(Notification),
    /// Raise a notification, then navigate
    NotifyAndNavigate(Notification, Route),
    /// No action taken
    None,
}

/// Core trait for all TUI screens
pub trait AdminScreen {
    /// Called each time the screen becomes active; resets state and issues
    /// the screen's initial requests
    fn on_enter(&mut self, services: &Services);

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent, services: &Services) -> ScreenAction;

    /// Handle a left mouse-down inside the content area
    fn handle_click(&mut self, _column: u16, _row: u16, _services: &Services) -> ScreenAction {
        ScreenAction::None
    }

    /// Handle the result of a request this screen issued
    fn handle_event(&mut self, event: AppEvent, services: &Services) -> ScreenAction;

    /// Draw the screen content
    fn draw(&mut self, f: &mut Frame, area: Rect, mode: LayoutMode);

    /// Whether printable keys belong to the screen (forms) instead of global shortcuts
    fn captures_text(&self) -> bool {
        false
    }

    /// Screen-specific lines for the help popup
    fn help(&self) -> &'static str;
}

/// Trait for views with navigable lists
pub trait Navigable {
    /// Move selection up
    fn navigate_up(&mut self);

    /// Move selection down
    fn navigate_down(&mut self);

    /// Get currently selected index
    fn get_selected_index(&self) -> Option<usize>;

    /// Set selected index
    fn set_selected_index(&mut self, index: Option<usize>);

    /// Get total number of items
    fn get_item_count(&self) -> usize;

    /// Navigate to first item
    fn navigate_to_first(&mut self) {
        if self.get_item_count() > 0 {
            self.set_selected_index(Some(0));
        }
    }

    /// Navigate to last item
    fn navigate_to_last(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            self.set_selected_index(Some(count - 1));
        }
    }
}

/// Trait for form handling
pub trait FormHandler {
    /// Get current field index
    fn get_current_field(&self) -> usize;

    /// Set current field
    fn set_current_field(&mut self, field: usize);

    /// Get total number of fields
    fn get_field_count(&self) -> usize;

    /// Whether the field at `index` can take focus
    fn is_focusable(&self, _index: usize) -> bool {
        true
    }

    /// Move to next field
    fn next_field(&mut self) {
        let total = self.get_field_count();
        let mut next = self.get_current_field();
        for _ in 0..total {
            next = (next + 1) % total;
            if self.is_focusable(next) {
                self.set_current_field(next);
                return;
            }
        }
    }

    /// Move to previous field
    fn previous_field(&mut self) {
        let total = self.get_field_count();
        let mut prev = self.get_current_field();
        for _ in 0..total {
            prev = if prev == 0 { total - 1 } else { prev - 1 };
            if self.is_focusable(prev) {
                self.set_current_field(prev);
                return;
            }
        }
    }

    /// Handle character input for current field
    fn handle_char_input(&mut self, c: char);

    /// Handle backspace for current field
    fn handle_backspace(&mut self);

    /// Handle delete for current field
    fn handle_delete(&mut self);

    /// Check required fields; the error names the first offending field
    fn validate(&mut self) -> Result<(), String>;
}
