//! Transient toast notifications

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Block, Borders, Clear, Paragraph, Wrap,
    },
    Frame,
};

use crate::admin_tui::ui::Styles;

/// Types of notifications
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Notification with a short title and a static operator-facing message
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub raised_at: chrono::DateTime<chrono::Local>,
}

impl Notification {
    pub fn new(title: &str, message: &str, kind: NotificationKind) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            kind,
            raised_at: chrono::Local::now(),
        }
    }

    pub fn success(title: &str, message: &str) -> Self {
        Self::new(title, message, NotificationKind::Success)
    }

    pub fn error(message: &str) -> Self {
        Self::new("Error", message, NotificationKind::Error)
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// Holds the toast currently on screen
pub struct NotificationCenter {
    pub current: Option<Notification>,
    pub auto_clear_timeout: Option<std::time::Duration>,
    area: Option<Rect>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self {
            current: None,
            auto_clear_timeout: None,
            area: None,
        }
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_clear(mut self, timeout: std::time::Duration) -> Self {
        self.auto_clear_timeout = Some(timeout);
        self
    }

    /// Show a notification, replacing the previous one
    pub fn push(&mut self, notification: Notification) {
        self.current = Some(notification);
    }

    pub fn dismiss(&mut self) -> bool {
        self.area = None;
        self.current.take().is_some()
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Check if we should auto-clear the current notification
    pub fn should_auto_clear(&self) -> bool {
        if let (Some(timeout), Some(notification)) = (self.auto_clear_timeout, &self.current) {
            let elapsed = chrono::Local::now().signed_duration_since(notification.raised_at);
            return elapsed.to_std().unwrap_or_default() > timeout;
        }
        false
    }

    /// Drop the notification once its timeout passed
    pub fn expire(&mut self) -> bool {
        if self.should_auto_clear() {
            self.dismiss()
        } else {
            false
        }
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area
            .map(|area| crate::admin_tui::ui::rect_contains(area, column, row))
            .unwrap_or(false)
    }

    /// Render the toast in the top-right corner of `area`
    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        let Some(notification) = &self.current else {
            self.area = None;
            return;
        };

        let width = 44u16.min(area.width);
        let toast = Rect {
            x: area.x + area.width - width,
            y: area.y,
            width,
            height: 4u16.min(area.height),
        };

        let (style, prefix) = if notification.is_error() {
            (Styles::error(), "✗")
        } else {
            (Styles::success(), "✓")
        };

        let block = Block::default()
            .title(Span::styled(format!("{} {}", prefix, notification.title), style))
            .title(
                Title::from(Line::from(Span::styled("Esc to dismiss", Styles::inactive())))
                    .position(Position::Bottom)
                    .alignment(Alignment::Right),
            )
            .borders(Borders::ALL)
            .border_style(style);

        let paragraph = Paragraph::new(notification.message.as_str())
            .block(block)
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, toast);
        f.render_widget(paragraph, toast);
        self.area = Some(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let mut center = NotificationCenter::new();
        assert!(!center.dismiss());

        center.push(Notification::error("Failed to delete product."));
        assert!(center.current().unwrap().is_error());
        assert!(center.dismiss());
        assert!(center.current().is_none());
    }

    #[test]
    fn test_auto_clear_after_timeout() {
        let mut center = NotificationCenter::new().with_auto_clear(std::time::Duration::from_secs(4));
        let mut old = Notification::success("Deleted", "Product deleted successfully.");
        old.raised_at = chrono::Local::now() - chrono::Duration::seconds(10);
        center.push(old);
        assert!(center.expire());

        center.push(Notification::success("Deleted", "Product deleted successfully."));
        assert!(!center.expire());
        assert!(center.current().is_some());
    }

    #[test]
    fn test_no_timeout_keeps_notification() {
        let mut center = NotificationCenter::new();
        let mut old = Notification::error("Failed to load products.");
        old.raised_at = chrono::Local::now() - chrono::Duration::seconds(600);
        center.push(old);
        assert!(!center.expire());
    }
}
