//! Products screen: inventory list with variant expansion and delete

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, error, info};

use crate::{
    admin_tui::{
        app::{Route, Services},
        components::{
            list_detail::{Column, DetailTable, LayoutMode, ListDetailView, ListRow},
            notification::Notification,
        },
        events::AppEvent,
        traits::{AdminScreen, Navigable, ScreenAction},
        ui::{centered_box, rect_contains, Styles},
    },
    models::{format_money, format_size, Product},
};

impl ListRow for Product {
    fn key(&self) -> &str {
        &self.id
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("Name", 26),
            Column::new("Price", 18),
            Column::new("Gender", 8),
            Column::new("On Sale", 7),
        ]
    }

    fn cells(&self) -> Vec<Vec<Span<'static>>> {
        let on_sale = if self.is_on_sale() { "Yes" } else { "No" };
        vec![
            vec![Span::styled(
                self.name.clone(),
                Styles::default().add_modifier(Modifier::BOLD),
            )],
            price_spans(self),
            vec![Span::raw(self.gender.as_str().to_string())],
            vec![Span::raw(on_sale)],
        ]
    }

    fn card(&self) -> Vec<Line<'static>> {
        let mut title = vec![Span::styled(
            self.name.clone(),
            Styles::default().add_modifier(Modifier::BOLD),
        )];
        if self.is_on_sale() {
            title.push(Span::raw(" "));
            title.push(Span::styled(" Sale ", Styles::badge()));
        }

        vec![
            Line::from(title),
            Line::from(price_spans(self)),
            Line::from(Span::styled(self.gender.as_str().to_string(), Styles::inactive())),
        ]
    }

    fn detail_label() -> Option<&'static str> {
        Some("Variants")
    }

    fn detail(&self) -> DetailTable {
        DetailTable {
            headers: vec![Column::new("Size", 6), Column::new("Stock", 6)],
            rows: self
                .variants
                .iter()
                .map(|v| vec![format_size(v.size), v.stock.to_string()])
                .collect(),
        }
    }
}

/// Base price, struck through next to the sale price when discounted
fn price_spans(product: &Product) -> Vec<Span<'static>> {
    if product.is_on_sale() {
        vec![
            Span::styled(format_money(product.price), Styles::struck()),
            Span::raw(" "),
            Span::styled(format_money(product.sale_price()), Styles::success()),
        ]
    } else {
        vec![Span::raw(format_money(product.price))]
    }
}

/// Products screen state
pub struct ProductsScreen {
    pub list: ListDetailView<Product>,
    pub loading: bool,
    pub visit: u64,
    /// Product awaiting delete confirmation
    pub pending_delete: Option<String>,
    pub deleting: bool,
    add_button: Option<Rect>,
    dialog_area: Option<Rect>,
    cancel_button: Option<Rect>,
    delete_button: Option<Rect>,
}

impl Default for ProductsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductsScreen {
    pub fn new() -> Self {
        Self {
            list: ListDetailView::new("Products").with_empty_message("No products yet"),
            loading: false,
            visit: 0,
            pending_delete: None,
            deleting: false,
            add_button: None,
            dialog_area: None,
            cancel_button: None,
            delete_button: None,
        }
    }

    /// Fetch the product list for the current visit
    pub fn load(&mut self, services: &Services) {
        self.loading = true;
        let api = services.api.clone();
        let visit = self.visit;
        services.spawn_request(async move {
            AppEvent::ProductsLoaded {
                visit,
                result: api.fetch_products().await,
            }
        });
    }

    fn request_delete(&mut self) {
        if let Some(product) = self.list.selected() {
            self.pending_delete = Some(product.id.clone());
        }
    }

    fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    fn confirm_delete(&mut self, services: &Services) {
        if self.deleting {
            return;
        }
        let Some(id) = self.pending_delete.clone() else {
            return;
        };

        info!("Deleting product {}", id);
        self.deleting = true;
        let api = services.api.clone();
        let visit = self.visit;
        services.spawn_request(async move {
            let result = api.delete_product(&id).await;
            AppEvent::ProductDeleted { visit, id, result }
        });
    }

    fn handle_dialog_key(&mut self, key: KeyEvent, services: &Services) -> ScreenAction {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => self.confirm_delete(services),
            KeyCode::Char('n') | KeyCode::Esc => self.cancel_delete(),
            _ => {}
        }
        ScreenAction::None
    }

    fn draw_header(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(17)])
            .split(area);

        let header = Paragraph::new(vec![
            Line::from(Span::styled("Products", Styles::title())),
            Line::from(Span::styled("Manage your sneaker inventory", Styles::inactive())),
        ]);
        f.render_widget(header, chunks[0]);

        let button = Paragraph::new(Span::styled(" + Add Product ", Styles::selected()));
        let button_area = Rect { height: 1, ..chunks[1] };
        f.render_widget(button, button_area);
        self.add_button = Some(button_area);
    }

    fn draw_skeleton(&self, f: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        for _ in 0..3 {
            lines.push(Line::from(Span::styled("  ░░░░  ░░░░░░░░░░░░░░░░░░░░", Styles::skeleton())));
            lines.push(Line::from(Span::styled("  ░░░░  ░░░░░░░░░░░░", Styles::skeleton())));
            lines.push(Line::from(""));
        }
        let skeleton = Paragraph::new(lines).block(
            Block::default()
                .title("Loading products...")
                .borders(Borders::ALL)
                .border_style(Styles::inactive_border()),
        );
        f.render_widget(skeleton, area);
    }

    fn draw_delete_dialog(&mut self, f: &mut Frame, area: Rect) {
        let dialog = centered_box(52, 8, area);
        f.render_widget(Clear, dialog);

        let block = Block::default()
            .title(Span::styled("Confirm Delete", Styles::title()))
            .borders(Borders::ALL)
            .border_style(Styles::error());
        let inner = block.inner(dialog);
        f.render_widget(block, dialog);

        let name = self
            .pending_delete
            .as_deref()
            .and_then(|id| self.list.items.iter().find(|p| p.id == id))
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let body = Paragraph::new(vec![
            Line::from("Are you sure you want to delete this product?"),
            Line::from(Span::styled(name, Styles::info())),
        ])
        .wrap(Wrap { trim: true });
        f.render_widget(body, Rect { height: inner.height.saturating_sub(1), ..inner });

        let delete_label = if self.deleting { " Deleting... " } else { " Delete (y) " };
        let cancel_label = " Cancel (n) ";
        let row = inner.y + inner.height.saturating_sub(1);
        let delete_width = delete_label.chars().count() as u16;
        let cancel_width = cancel_label.chars().count() as u16;

        let delete_area = Rect {
            x: (inner.x + inner.width).saturating_sub(delete_width),
            y: row,
            width: delete_width.min(inner.width),
            height: 1,
        };
        let cancel_area = Rect {
            x: delete_area.x.saturating_sub(cancel_width + 1).max(inner.x),
            y: row,
            width: cancel_width.min(inner.width),
            height: 1,
        };
        let delete_style = if self.deleting { Styles::inactive() } else { Styles::selected() };
        f.render_widget(Paragraph::new(Span::styled(cancel_label, Styles::default())), cancel_area);
        f.render_widget(Paragraph::new(Span::styled(delete_label, delete_style)), delete_area);

        self.dialog_area = Some(dialog);
        self.cancel_button = Some(cancel_area);
        self.delete_button = Some(delete_area);
    }
}

impl AdminScreen for ProductsScreen {
    fn on_enter(&mut self, services: &Services) {
        self.visit += 1;
        self.list = ListDetailView::new("Products").with_empty_message("No products yet");
        self.pending_delete = None;
        self.deleting = false;
        self.load(services);
    }

    fn handle_key(&mut self, key: KeyEvent, services: &Services) -> ScreenAction {
        if self.pending_delete.is_some() {
            return self.handle_dialog_key(key, services);
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.navigate_up(),
            KeyCode::Down | KeyCode::Char('j') => self.list.navigate_down(),
            KeyCode::Home => self.list.navigate_to_first(),
            KeyCode::End => self.list.navigate_to_last(),
            KeyCode::Enter | KeyCode::Char(' ') => self.list.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(),
            KeyCode::Char('a') => return ScreenAction::NavigateTo(Route::AddProduct),
            KeyCode::Char('v') => return ScreenAction::NavigateTo(Route::AddVariant),
            KeyCode::Char('r') if !self.loading => self.load(services),
            _ => {}
        }
        ScreenAction::None
    }

    fn handle_click(&mut self, column: u16, row: u16, services: &Services) -> ScreenAction {
        if self.pending_delete.is_some() {
            if self.delete_button.is_some_and(|a| rect_contains(a, column, row)) {
                self.confirm_delete(services);
            } else if self.cancel_button.is_some_and(|a| rect_contains(a, column, row))
                || !self.dialog_area.is_some_and(|a| rect_contains(a, column, row))
            {
                self.cancel_delete();
            }
            return ScreenAction::None;
        }

        if self.add_button.is_some_and(|a| rect_contains(a, column, row)) {
            return ScreenAction::NavigateTo(Route::AddProduct);
        }
        self.list.click(column, row);
        ScreenAction::None
    }

    fn handle_event(&mut self, event: AppEvent, _services: &Services) -> ScreenAction {
        if event.visit() != self.visit {
            debug!("Dropping stale products result from visit {}", event.visit());
            return ScreenAction::None;
        }

        match event {
            AppEvent::ProductsLoaded { result, .. } => {
                self.loading = false;
                match result {
                    Ok(products) => {
                        info!("Loaded {} products", products.len());
                        self.list.set_items(products);
                        ScreenAction::None
                    }
                    Err(e) => {
                        error!("{}", e);
                        ScreenAction::Notify(Notification::error("Failed to load products."))
                    }
                }
            }
            AppEvent::ProductDeleted { id, result, .. } => {
                self.deleting = false;
                match result {
                    Ok(()) => {
                        info!("Deleted product {}", id);
                        self.list.remove(&id);
                        if self.pending_delete.as_deref() == Some(id.as_str()) {
                            self.pending_delete = None;
                        }
                        ScreenAction::Notify(Notification::success(
                            "Deleted",
                            "Product deleted successfully.",
                        ))
                    }
                    Err(e) => {
                        error!("{}", e);
                        ScreenAction::Notify(Notification::error("Failed to delete product."))
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

        self.draw_header(f, chunks[0]);

        if self.loading {
            self.draw_skeleton(f, chunks[1]);
        } else {
            self.list.render(f, chunks[1], mode);
        }

        if self.pending_delete.is_some() {
            self.draw_delete_dialog(f, area);
        } else {
            self.dialog_area = None;
            self.cancel_button = None;
            self.delete_button = None;
        }
    }

    fn help(&self) -> &'static str {
        "Products:\n\
        ↑/↓ or j/k - Select product\n\
        Enter / Space - Show or hide variants\n\
        d / Delete - Delete product (y to confirm, n to cancel)\n\
        a - Add product\n\
        v - Add variants\n\
        r - Reload"
    }
}
