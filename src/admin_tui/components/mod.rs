//! Reusable UI components for the admin TUI
//!
//! Screens compose these instead of drawing widgets directly.

pub mod form_field;
pub mod list_detail;
pub mod nav_panel;
pub mod notification;

pub use form_field::{Form, FormField, FormFieldType, FormInput};
pub use list_detail::{Column, DetailTable, LayoutMode, ListClick, ListDetailView, ListRow};
pub use nav_panel::{NavClick, NavPanel, PanelState};
pub use notification::{Notification, NotificationCenter, NotificationKind};
