//! Dashboard screen: one card per managed collection with a live count

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, info, warn};

use crate::admin_tui::{
    app::{Route, Services},
    components::list_detail::LayoutMode,
    events::{AppEvent, CountCard},
    traits::{AdminScreen, ScreenAction},
    ui::{rect_contains, Styles},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountState {
    Loading,
    Loaded(usize),
    Failed,
}

impl CountState {
    fn text(&self) -> String {
        match self {
            CountState::Loading => "…".to_string(),
            CountState::Loaded(n) => n.to_string(),
            CountState::Failed => "-".to_string(),
        }
    }
}

struct CardInfo {
    card: CountCard,
    title: &'static str,
    description: &'static str,
    button: &'static str,
    route: Route,
}

const CARDS: [CardInfo; 3] = [
    CardInfo {
        card: CountCard::Products,
        title: "Products",
        description: "Manage your sneaker inventory",
        button: "View Products",
        route: Route::Products,
    },
    CardInfo {
        card: CountCard::Orders,
        title: "Orders",
        description: "View and manage customer orders",
        button: "View Orders",
        route: Route::Orders,
    },
    CardInfo {
        card: CountCard::Users,
        title: "Users",
        description: "Manage registered users",
        button: "View Users",
        route: Route::Users,
    },
];

fn card_index(card: CountCard) -> usize {
    CARDS.iter().position(|c| c.card == card).unwrap_or_default()
}

pub struct DashboardScreen {
    pub counts: [CountState; 3],
    pub selected: usize,
    pub visit: u64,
    card_areas: Vec<Rect>,
}

impl Default for DashboardScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            counts: [CountState::Loading; 3],
            selected: 0,
            visit: 0,
            card_areas: Vec::new(),
        }
    }

    pub fn count(&self, card: CountCard) -> CountState {
        self.counts[card_index(card)]
    }

    fn draw_card(&self, f: &mut Frame, area: Rect, index: usize) {
        let info = &CARDS[index];
        let border = if index == self.selected {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };

        let lines = vec![
            Line::from(Span::styled(self.counts[index].text(), Styles::title())),
            Line::from(Span::styled(info.description, Styles::inactive())),
            Line::from(""),
            Line::from(Span::styled(format!(" {} ", info.button), Styles::selected())),
        ];

        let card = Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .title(format!(" {} ", info.title))
                .borders(Borders::ALL)
                .border_style(border),
        );
        f.render_widget(card, area);
    }
}

impl AdminScreen for DashboardScreen {
    fn on_enter(&mut self, services: &Services) {
        self.visit += 1;
        self.counts = [CountState::Loading; 3];
        let visit = self.visit;

        let api = services.api.clone();
        services.spawn_request(async move {
            AppEvent::CountLoaded {
                visit,
                card: CountCard::Products,
                result: api.fetch_products().await.map(|p| p.len()),
            }
        });

        let orders = services.orders.clone();
        services.spawn_request(async move {
            AppEvent::CountLoaded {
                visit,
                card: CountCard::Orders,
                result: orders.list_orders().await.map(|o| o.len()),
            }
        });

        let users = services.users.clone();
        services.spawn_request(async move {
            AppEvent::CountLoaded {
                visit,
                card: CountCard::Users,
                result: users.list_users().await.map(|u| u.len()),
            }
        });
    }

    fn handle_key(&mut self, key: KeyEvent, _services: &Services) -> ScreenAction {
        match key.code {
            KeyCode::Left | KeyCode::Up | KeyCode::BackTab => {
                self.selected = (self.selected + CARDS.len() - 1) % CARDS.len();
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Tab => {
                self.selected = (self.selected + 1) % CARDS.len();
            }
            KeyCode::Enter => return ScreenAction::NavigateTo(CARDS[self.selected].route),
            KeyCode::Char('p') => return ScreenAction::NavigateTo(Route::Products),
            KeyCode::Char('o') => return ScreenAction::NavigateTo(Route::Orders),
            KeyCode::Char('u') => return ScreenAction::NavigateTo(Route::Users),
            _ => {}
        }
        ScreenAction::None
    }

    fn handle_click(&mut self, column: u16, row: u16, _services: &Services) -> ScreenAction {
        match self
            .card_areas
            .iter()
            .position(|a| rect_contains(*a, column, row))
        {
            Some(i) => {
                self.selected = i;
                ScreenAction::NavigateTo(CARDS[i].route)
            }
            None => ScreenAction::None,
        }
    }

    fn handle_event(&mut self, event: AppEvent, _services: &Services) -> ScreenAction {
        if event.visit() != self.visit {
            debug!("Dropping stale count from visit {}", event.visit());
            return ScreenAction::None;
        }

        if let AppEvent::CountLoaded { card, result, .. } = event {
            self.counts[card_index(card)] = match result {
                Ok(n) => {
                    info!("{:?} count: {}", card, n);
                    CountState::Loaded(n)
                }
                Err(e) => {
                    warn!("{:?} count unavailable: {}", card, e);
                    CountState::Failed
                }
            };
        }
        ScreenAction::None
    }

    fn draw(&mut self, f: &mut Frame, area: Rect, mode: LayoutMode) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let header = Paragraph::new(vec![
            Line::from(Span::styled("Dashboard", Styles::title())),
            Line::from(Span::styled(
                "Manage your sneaker store from one central location.",
                Styles::inactive(),
            )),
        ]);
        f.render_widget(header, chunks[0]);

        let (direction, constraint) = match mode {
            LayoutMode::Table => (Direction::Horizontal, Constraint::Ratio(1, 3)),
            LayoutMode::Cards => (Direction::Vertical, Constraint::Length(6)),
        };
        let body = match mode {
            LayoutMode::Table => Rect {
                height: chunks[1].height.min(8),
                ..chunks[1]
            },
            LayoutMode::Cards => chunks[1],
        };
        let areas = Layout::default()
            .direction(direction)
            .constraints([constraint; 3])
            .split(body);

        self.card_areas = areas.to_vec();
        for (i, card_area) in areas.iter().enumerate() {
            self.draw_card(f, *card_area, i);
        }
    }

    fn help(&self) -> &'static str {
        "Dashboard:\n\
        ←/→ or Tab - Select card\n\
        Enter - Open selected card\n\
        p / o / u - Products / Orders / Users"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_tui::app::tests::test_services;
    use crate::admin_tui::components::list_detail::tests::buffer_text;
    use crate::api::test_support::{product, FakeCatalog};
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    async fn loaded(api: FakeCatalog) -> DashboardScreen {
        let (services, mut rx) = test_services(Arc::new(api));
        let mut screen = DashboardScreen::new();
        screen.on_enter(&services);
        for _ in 0..3 {
            let event = rx.recv().await.unwrap();
            screen.handle_event(event, &services);
        }
        screen
    }

    #[tokio::test]
    async fn test_counts_load() {
        let screen = loaded(FakeCatalog::new(vec![product("a", "Dunk Low", 1)])).await;
        assert_eq!(screen.count(CountCard::Products), CountState::Loaded(1));
        assert_eq!(screen.count(CountCard::Orders), CountState::Loaded(3));
        assert_eq!(screen.count(CountCard::Users), CountState::Loaded(4));
    }

    #[tokio::test]
    async fn test_failed_count_shows_dash() {
        let mut screen = loaded(FakeCatalog::default().failing_fetch()).await;
        assert_eq!(screen.count(CountCard::Products), CountState::Failed);

        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                screen.draw(f, area, LayoutMode::Table);
            })
            .unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains(" - "));
        assert!(text.contains("View Orders"));
    }

    #[tokio::test]
    async fn test_stale_count_dropped() {
        let (services, mut rx) = test_services(Arc::new(FakeCatalog::default()));
        let mut screen = DashboardScreen::new();
        screen.on_enter(&services);
        screen.on_enter(&services);

        for _ in 0..3 {
            let event = rx.recv().await.unwrap();
            if event.visit() == 1 {
                screen.handle_event(event, &services);
            }
        }
        assert_eq!(screen.counts, [CountState::Loading; 3]);
    }

    #[tokio::test]
    async fn test_card_click_and_keys_navigate() {
        let (services, _rx) = test_services(Arc::new(FakeCatalog::default()));
        let mut screen = DashboardScreen::new();

        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                screen.draw(f, area, LayoutMode::Cards);
            })
            .unwrap();

        let users = screen.card_areas[2];
        assert_eq!(
            screen.handle_click(users.x + 2, users.y + 2, &services),
            ScreenAction::NavigateTo(Route::Users)
        );
        assert_eq!(screen.selected, 2);

        let right = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        screen.handle_key(right, &services);
        assert_eq!(screen.selected, 0);
        assert_eq!(
            screen.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &services),
            ScreenAction::NavigateTo(Route::Products)
        );
        assert_eq!(
            screen.handle_key(KeyEvent::new(KeyCode::Char('o'), KeyModifiers::NONE), &services),
            ScreenAction::NavigateTo(Route::Orders)
        );
    }
}
