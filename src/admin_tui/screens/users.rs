//! Users screen

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, error, info};

use crate::{
    admin_tui::{
        app::Services,
        components::{
            list_detail::{Column, LayoutMode, ListDetailView, ListRow},
            notification::Notification,
        },
        events::AppEvent,
        traits::{AdminScreen, Navigable, ScreenAction},
        ui::Styles,
    },
    models::User,
};

/// Initials standing in for the avatar image
fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

fn avatar(user: &User) -> Span<'static> {
    Span::styled(format!("({})", initials(&user.name)), Styles::badge())
}

impl ListRow for User {
    fn key(&self) -> &str {
        &self.id
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("Avatar", 6),
            Column::new("Name", 20),
            Column::new("Email", 28),
            Column::new("Registered At", 13),
        ]
    }

    fn cells(&self) -> Vec<Vec<Span<'static>>> {
        vec![
            vec![avatar(self)],
            vec![Span::styled(self.name.clone(), Styles::default().add_modifier(Modifier::BOLD))],
            vec![Span::raw(self.email.clone())],
            vec![Span::raw(self.registered_at.to_string())],
        ]
    }

    fn card(&self) -> Vec<Line<'static>> {
        vec![
            Line::from(vec![
                avatar(self),
                Span::raw(" "),
                Span::styled(self.name.clone(), Styles::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(Span::styled(self.email.clone(), Styles::inactive())),
            Line::from(Span::styled(
                format!("Registered: {}", self.registered_at),
                Styles::inactive(),
            )),
        ]
    }
}

/// Users screen state
pub struct UsersScreen {
    pub list: ListDetailView<User>,
    pub loading: bool,
    pub visit: u64,
}

impl Default for UsersScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl UsersScreen {
    pub fn new() -> Self {
        Self {
            list: ListDetailView::new("Users").with_empty_message("No registered users"),
            loading: false,
            visit: 0,
        }
    }
}

impl AdminScreen for UsersScreen {
    fn on_enter(&mut self, services: &Services) {
        self.visit += 1;
        self.list = ListDetailView::new("Users").with_empty_message("No registered users");
        self.loading = true;

        let users = services.users.clone();
        let visit = self.visit;
        services.spawn_request(async move {
            AppEvent::UsersLoaded {
                visit,
                result: users.list_users().await,
            }
        });
    }

    fn handle_key(&mut self, key: KeyEvent, _services: &Services) -> ScreenAction {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.navigate_up(),
            KeyCode::Down | KeyCode::Char('j') => self.list.navigate_down(),
            _ => {}
        }
        ScreenAction::None
    }

    fn handle_click(&mut self, column: u16, row: u16, _services: &Services) -> ScreenAction {
        self.list.click(column, row);
        ScreenAction::None
    }

    fn handle_event(&mut self, event: AppEvent, _services: &Services) -> ScreenAction {
        if event.visit() != self.visit {
            debug!("Dropping stale users result from visit {}", event.visit());
            return ScreenAction::None;
        }

        match event {
            AppEvent::UsersLoaded { result, .. } => {
                self.loading = false;
                match result {
                    Ok(users) => {
                        info!("Loaded {} users", users.len());
                        self.list.set_items(users);
                        ScreenAction::None
                    }
                    Err(e) => {
                        error!("{}", e);
                        ScreenAction::Notify(Notification::error("Failed to load users."))
                    }
                }
            }
            _ => ScreenAction::None,
        }
    }

    fn draw(&mut self, f: &mut Frame, area: Rect, mode: LayoutMode) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let header = Paragraph::new(vec![
            Line::from(Span::styled("Users", Styles::title())),
            Line::from(Span::styled("View and manage registered users", Styles::inactive())),
        ]);
        f.render_widget(header, chunks[0]);

        if self.loading {
            let placeholder = Paragraph::new(Span::styled("(░░) ░░░░░░░░░░░░", Styles::skeleton()))
                .block(
                    Block::default()
                        .title("Loading users...")
                        .borders(Borders::ALL)
                        .border_style(Styles::inactive_border()),
                );
            f.render_widget(placeholder, chunks[1]);
        } else {
            self.list.render(f, chunks[1], mode);
        }
    }

    fn help(&self) -> &'static str {
        "Users:\n\
        ↑/↓ or j/k - Select user"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_tui::app::tests::test_services;
    use crate::admin_tui::components::list_detail::tests::buffer_text;
    use crate::api::test_support::FakeCatalog;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    #[test]
    fn test_initials() {
        assert_eq!(initials("Sarah Williams"), "SW");
        assert_eq!(initials("cher"), "C");
        assert_eq!(initials(""), "");
    }

    #[tokio::test]
    async fn test_users_render_without_toggle() {
        let (services, mut rx) = test_services(Arc::new(FakeCatalog::default()));
        let mut screen = UsersScreen::new();
        screen.on_enter(&services);
        screen.handle_event(rx.recv().await.unwrap(), &services);
        assert!(!screen.loading);

        screen.list.toggle("1");
        assert_eq!(screen.list.expanded, None);

        let mut terminal = Terminal::new(TestBackend::new(110, 24)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                screen.draw(f, area, LayoutMode::Table);
            })
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("Registered At"));
        assert!(text.contains("(SW)"));
        assert!(!text.contains("▶"));
    }
}
