//! Orders screen

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
            list_detail::{Column, DetailTable, LayoutMode, ListDetailView, ListRow},
            notification::Notification,
        },
        events::AppEvent,
        traits::{AdminScreen, Navigable, ScreenAction},
        ui::Styles,
    },
    models::{format_money, Order},
};

impl ListRow for Order {
    fn key(&self) -> &str {
        &self.id
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("Order ID", 9),
            Column::new("Customer", 16),
            Column::new("Email", 26),
            Column::new("Date", 10),
            Column::new("Total", 10),
            Column::new("Items", 5),
        ]
    }

    fn cells(&self) -> Vec<Vec<Span<'static>>> {
        vec![
            vec![Span::styled(self.id.clone(), Styles::default().add_modifier(Modifier::BOLD))],
            vec![Span::raw(self.customer_name.clone())],
            vec![Span::raw(self.customer_email.clone())],
            vec![Span::raw(self.created_at.to_string())],
            vec![Span::raw(format_money(self.total))],
            vec![Span::raw(self.item_count().to_string())],
        ]
    }

    fn card(&self) -> Vec<Line<'static>> {
        vec![
            Line::from(vec![
                Span::styled(self.id.clone(), Styles::default().add_modifier(Modifier::BOLD)),
                Span::raw("  "),
                Span::raw(format_money(self.total)),
            ]),
            Line::from(self.customer_name.clone()),
            Line::from(Span::styled(self.customer_email.clone(), Styles::inactive())),
            Line::from(Span::styled(self.created_at.to_string(), Styles::inactive())),
        ]
    }

    fn detail_label() -> Option<&'static str> {
        Some("Items")
    }

    fn detail(&self) -> DetailTable {
        DetailTable {
            headers: vec![
                Column::new("Product", 24),
                Column::new("Size", 6),
                Column::new("Qty", 4),
            ],
            rows: self
                .lines
                .iter()
                .map(|l| vec![l.name.clone(), l.size.clone(), format!("×{}", l.quantity)])
                .collect(),
        }
    }
}

/// Orders screen state
pub struct OrdersScreen {
    pub list: ListDetailView<Order>,
    pub loading: bool,
    pub visit: u64,
}

impl Default for OrdersScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl OrdersScreen {
    pub fn new() -> Self {
        Self {
            list: ListDetailView::new("Orders").with_empty_message("No orders"),
            loading: false,
            visit: 0,
        }
    }
}

impl AdminScreen for OrdersScreen {
    fn on_enter(&mut self, services: &Services) {
        self.visit += 1;
        self.list = ListDetailView::new("Orders").with_empty_message("No orders");
        self.loading = true;

        let orders = services.orders.clone();
        let visit = self.visit;
        services.spawn_request(async move {
            AppEvent::OrdersLoaded {
                visit,
                result: orders.list_orders().await,
            }
        });
    }

    fn handle_key(&mut self, key: KeyEvent, _services: &Services) -> ScreenAction {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.navigate_up(),
            KeyCode::Down | KeyCode::Char('j') => self.list.navigate_down(),
            KeyCode::Home => self.list.navigate_to_first(),
            KeyCode::End => self.list.navigate_to_last(),
            KeyCode::Enter | KeyCode::Char(' ') => self.list.toggle_selected(),
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
            debug!("Dropping stale orders result from visit {}", event.visit());
            return ScreenAction::None;
        }

        match event {
            AppEvent::OrdersLoaded { result, .. } => {
                self.loading = false;
                match result {
                    Ok(orders) => {
                        info!("Loaded {} orders", orders.len());
                        self.list.set_items(orders);
                        ScreenAction::None
                    }
                    Err(e) => {
                        error!("{}", e);
                        ScreenAction::Notify(Notification::error("Failed to load orders."))
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
            Line::from(Span::styled("Orders", Styles::title())),
            Line::from(Span::styled("View and manage customer orders", Styles::inactive())),
        ]);
        f.render_widget(header, chunks[0]);

        if self.loading {
            let placeholder = Paragraph::new(Span::styled("░░░░░░░░ ░░░░░░░░░░░░", Styles::skeleton()))
                .block(
                    Block::default()
                        .title("Loading orders...")
                        .borders(Borders::ALL)
                        .border_style(Styles::inactive_border()),
                );
            f.render_widget(placeholder, chunks[1]);
        } else {
            self.list.render(f, chunks[1], mode);
        }
    }

    fn help(&self) -> &'static str {
        "Orders:\n\
        ↑/↓ or j/k - Select order\n\
        Enter / Space - Show or hide ordered items"
    }
}
