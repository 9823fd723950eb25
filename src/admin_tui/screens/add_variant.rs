//! Add Variant screen: size/stock pairs submitted as an ordered batch

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    admin_tui::{
        app::{Route, Services},
        components::{
            form_field::{Form, FormField, FormFieldType, FormInput},
            list_detail::LayoutMode,
            notification::Notification,
        },
        events::AppEvent,
        traits::{AdminScreen, FormHandler, ScreenAction},
        ui::{rect_contains, Styles},
    },
    api::submit_variants,
    models::{NewVariant, Product},
};

const PRODUCT: usize = 0;

fn size_field(number: usize) -> FormField {
    FormField::new(&format!("Size #{}", number), FormFieldType::Number)
        .with_placeholder("Size (e.g. 42)")
        .required()
}

fn stock_field(number: usize) -> FormField {
    FormField::new(&format!("Stock #{}", number), FormFieldType::Integer)
        .with_placeholder("Stock")
        .required()
}

/// Add Variant screen state
pub struct AddVariantScreen {
    /// Product dropdown followed by a size and a stock field per pair
    pub form: Form,
    /// Row id of each pair, parallel to the pair fields
    pub pair_ids: Vec<Uuid>,
    pub loading_products: bool,
    pub submitting: bool,
    pub visit: u64,
    buttons: Vec<(Rect, Button)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Button {
    AddPair,
    RemovePair,
    Cancel,
    Submit,
}

impl Default for AddVariantScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl AddVariantScreen {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                FormField::new("Select Product", FormFieldType::Dropdown)
                    .with_placeholder("Select a product")
                    .required(),
                size_field(1),
                stock_field(1),
            ]),
            pair_ids: vec![Uuid::new_v4()],
            loading_products: false,
            submitting: false,
            visit: 0,
            buttons: Vec::new(),
        }
    }

    fn size_index(pair: usize) -> usize {
        1 + pair * 2
    }

    /// Pair the focused field belongs to
    fn current_pair(&self) -> Option<usize> {
        match self.form.current_field {
            PRODUCT => None,
            field => Some((field - 1) / 2),
        }
    }

    pub fn add_pair(&mut self) {
        let number = self.pair_ids.len() + 1;
        let at = self.form.fields.len();
        self.form.insert_field(at, size_field(number));
        self.form.insert_field(at + 1, stock_field(number));
        self.pair_ids.push(Uuid::new_v4());
        self.form.set_current_field(at);
    }

    /// Remove the pair at `pair`; the last remaining pair stays
    pub fn remove_pair(&mut self, pair: usize) -> bool {
        if self.pair_ids.len() <= 1 || pair >= self.pair_ids.len() {
            return false;
        }
        let size = Self::size_index(pair);
        self.form.remove_field(size + 1);
        self.form.remove_field(size);
        self.pair_ids.remove(pair);
        self.relabel();
        true
    }

    fn relabel(&mut self) {
        for pair in 0..self.pair_ids.len() {
            let size = Self::size_index(pair);
            if let Some(field) = self.form.get_field_mut(size) {
                field.label = format!("Size #{}", pair + 1);
            }
            if let Some(field) = self.form.get_field_mut(size + 1) {
                field.label = format!("Stock #{}", pair + 1);
            }
        }
    }

    /// Parsed pairs in operator order; call after validation
    fn variants(&self, product_id: &str) -> Vec<NewVariant> {
        (0..self.pair_ids.len())
            .filter_map(|pair| {
                let size = Self::size_index(pair);
                let parsed_size = self.form.value(size).parse::<f64>().ok()?;
                let stock = self.form.value(size + 1).parse::<i64>().ok()?;
                Some(NewVariant {
                    product_id: product_id.to_string(),
                    size: parsed_size,
                    stock,
                })
            })
            .collect()
    }

    fn load_products(&mut self, services: &Services) {
        self.loading_products = true;
        let api = services.api.clone();
        let visit = self.visit;
        services.spawn_request(async move {
            AppEvent::VariantProductsLoaded {
                visit,
                result: api.fetch_products().await,
            }
        });
    }

    fn set_products(&mut self, products: Vec<Product>) {
        let options = products.into_iter().map(|p| (p.id, p.name)).collect();
        if let Some(field) = self.form.get_field_mut(PRODUCT) {
            field.set_dropdown_options(options);
        }
    }

    fn submit(&mut self, services: &Services) -> ScreenAction {
        if self.submitting || self.loading_products {
            return ScreenAction::None;
        }

        let product_id = self.form.value(PRODUCT).to_string();
        if product_id.is_empty() {
            return ScreenAction::Notify(Notification::error("Please select a product."));
        }
        if let Err(message) = self.form.validate() {
            return ScreenAction::Notify(Notification::error(&message));
        }

        let variants = self.variants(&product_id);
        info!("Submitting {} variants for product {}", variants.len(), product_id);
        self.submitting = true;
        let api = services.api.clone();
        let visit = self.visit;
        services.spawn_request(async move {
            let report = submit_variants(api.as_ref(), &variants).await;
            AppEvent::VariantsSubmitted { visit, report }
        });
        ScreenAction::None
    }

    fn press(&mut self, button: Button, services: &Services) -> ScreenAction {
        match button {
            Button::AddPair => self.add_pair(),
            Button::RemovePair => {
                if let Some(pair) = self.current_pair() {
                    self.remove_pair(pair);
                }
            }
            Button::Cancel => return ScreenAction::NavigateTo(Route::Products),
            Button::Submit => return self.submit(services),
        }
        ScreenAction::None
    }

    fn draw_buttons(&mut self, f: &mut Frame, area: Rect) {
        self.buttons.clear();
        let can_remove = self.pair_ids.len() > 1 && self.current_pair().is_some();
        let submit_label = if self.submitting { " Adding... " } else { " Add Variants (Ctrl+S) " };

        let specs = [
            (Button::AddPair, " + Add Pair (Ctrl+N) ", Styles::info()),
            (
                Button::RemovePair,
                " Remove Pair (Ctrl+D) ",
                if can_remove { Styles::warning() } else { Styles::inactive() },
            ),
            (Button::Cancel, " Cancel (Esc) ", Styles::default()),
            (
                Button::Submit,
                submit_label,
                if self.submitting { Styles::inactive() } else { Styles::selected() },
            ),
        ];

        let mut x = area.x;
        let right = area.x + area.width;
        for (button, label, style) in specs {
            let width = label.chars().count() as u16;
            if x + width > right {
                break;
            }
            let rect = Rect { x, y: area.y, width, height: 1 };
            f.render_widget(Paragraph::new(Span::styled(label, style)), rect);
            self.buttons.push((rect, button));
            x += width + 1;
        }
    }
}

impl AdminScreen for AddVariantScreen {
    fn on_enter(&mut self, services: &Services) {
        let visit = self.visit + 1;
        *self = Self::new();
        self.visit = visit;
        self.load_products(services);
    }

    fn handle_key(&mut self, key: KeyEvent, services: &Services) -> ScreenAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('n') => return self.press(Button::AddPair, services),
                KeyCode::Char('d') => return self.press(Button::RemovePair, services),
                _ => {}
            }
        }

        match self.form.handle_key(key) {
            FormInput::Submit => self.submit(services),
            FormInput::Cancel => ScreenAction::NavigateTo(Route::Products),
            FormInput::Handled | FormInput::Unhandled => ScreenAction::None,
        }
    }

    fn handle_click(&mut self, column: u16, row: u16, services: &Services) -> ScreenAction {
        if let Some(&(_, button)) = self
            .buttons
            .iter()
            .find(|(area, _)| rect_contains(*area, column, row))
        {
            return self.press(button, services);
        }
        self.form.click(column, row);
        ScreenAction::None
    }

    fn handle_event(&mut self, event: AppEvent, _services: &Services) -> ScreenAction {
        if event.visit() != self.visit {
            debug!("Dropping stale add-variant result from visit {}", event.visit());
            return ScreenAction::None;
        }

        match event {
            AppEvent::VariantProductsLoaded { result, .. } => {
                self.loading_products = false;
                match result {
                    Ok(products) => {
                        debug!("{} products available for variants", products.len());
                        self.set_products(products);
                        ScreenAction::None
                    }
                    Err(e) => {
                        error!("{}", e);
                        ScreenAction::Notify(Notification::error("Failed to load products."))
                    }
                }
            }
            AppEvent::VariantsSubmitted { report, .. } => {
                self.submitting = false;
                match &report.failure {
                    None => {
                        info!("Added {} variants", report.submitted);
                        ScreenAction::NotifyAndNavigate(
                            Notification::success("Success", "Variants added successfully."),
                            Route::Products,
                        )
                    }
                    Some((index, e)) => {
                        warn!(
                            "Variant batch stopped at pair {} of {} ({} sent, {} skipped): {}",
                            index + 1,
                            report.total,
                            report.submitted,
                            report.skipped(),
                            e
                        );
                        ScreenAction::Notify(Notification::error("Failed to add variants."))
                    }
                }
            }
            _ => ScreenAction::None,
        }
    }

    fn draw(&mut self, f: &mut Frame, area: Rect, _mode: LayoutMode) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let header = Paragraph::new(vec![
            Line::from(Span::styled("Add Variant", Styles::title())),
            Line::from(Span::styled(
                "Add size and stock variants to an existing product",
                Styles::inactive(),
            )),
        ]);
        f.render_widget(header, chunks[0]);

        let status = if self.loading_products {
            Span::styled("Loading products...", Styles::skeleton())
        } else {
            Span::styled(
                format!("Size and Stock Pairs ({})", self.pair_ids.len()),
                Styles::info(),
            )
        };
        f.render_widget(Paragraph::new(status), chunks[1]);

        self.form.render(f, chunks[2]);
        self.draw_buttons(f, chunks[3]);
    }

    fn captures_text(&self) -> bool {
        true
    }

    fn help(&self) -> &'static str {
        "Add Variant:\n\
        ↑/↓ - Choose product when focused\n\
        Tab / Shift+Tab - Next / previous field\n\
        Ctrl+N - Add a size/stock pair\n\
        Ctrl+D - Remove the focused pair\n\
        Enter / Ctrl+S - Submit all pairs in order\n\
        Esc - Cancel and return to Products"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_tui::app::tests::test_services;
    use crate::api::test_support::{product, FakeCatalog};
    use std::sync::Arc;

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn fill_pairs(screen: &mut AddVariantScreen, pairs: &[(&str, &str)]) {
        while screen.pair_ids.len() < pairs.len() {
            screen.add_pair();
        }
        for (i, (size, stock)) in pairs.iter().enumerate() {
            let at = AddVariantScreen::size_index(i);
            screen.form.fields[at].value = size.to_string();
            screen.form.fields[at + 1].value = stock.to_string();
        }
    }

    async fn entered(api: Arc<FakeCatalog>) -> (AddVariantScreen, Services, tokio::sync::mpsc::UnboundedReceiver<AppEvent>) {
        let (services, mut rx) = test_services(api);
        let mut screen = AddVariantScreen::new();
        screen.on_enter(&services);
        assert!(screen.loading_products);
        screen.handle_event(rx.recv().await.unwrap(), &services);
        assert!(!screen.loading_products);
        (screen, services, rx)
    }

    #[tokio::test]
    async fn test_products_populate_dropdown() {
        let api = Arc::new(FakeCatalog::new(vec![product("p1", "Air Max", 0), product("p2", "Dunk", 0)]));
        let (mut screen, services, _rx) = entered(api).await;

        assert_eq!(screen.form.value(PRODUCT), "");
        assert_eq!(screen.form.fields[PRODUCT].dropdown_state.selected(), None);

        screen.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE), &services);
        assert_eq!(screen.form.value(PRODUCT), "p1");
        assert_eq!(screen.form.fields[PRODUCT].selected_label(), Some("Air Max"));
    }

    #[tokio::test]
    async fn test_failed_product_load_notifies() {
        let (services, mut rx) = test_services(Arc::new(FakeCatalog::default().failing_fetch()));
        let mut screen = AddVariantScreen::new();
        screen.on_enter(&services);

        match screen.handle_event(rx.recv().await.unwrap(), &services) {
            ScreenAction::Notify(n) => assert_eq!(n.message, "Failed to load products."),
            other => panic!("unexpected action {:?}", other),
        }
        assert!(!screen.loading_products);
    }

    #[tokio::test]
    async fn test_pairs_add_and_remove() {
        let api = Arc::new(FakeCatalog::default());
        let (mut screen, services, _rx) = entered(api).await;
        let first = screen.pair_ids[0];

        screen.handle_key(ctrl('n'), &services);
        screen.handle_key(ctrl('n'), &services);
        assert_eq!(screen.pair_ids.len(), 3);
        assert_eq!(screen.form.fields.len(), 7);

        // focus is on pair 3; remove it, then pair 2
        screen.handle_key(ctrl('d'), &services);
        assert_eq!(screen.pair_ids.len(), 2);
        screen.form.set_current_field(AddVariantScreen::size_index(1));
        screen.handle_key(ctrl('d'), &services);
        assert_eq!(screen.pair_ids, vec![first]);

        // the last pair cannot be removed
        screen.form.set_current_field(1);
        screen.handle_key(ctrl('d'), &services);
        assert_eq!(screen.pair_ids.len(), 1);
        assert_eq!(screen.form.fields[2].label, "Stock #1");
    }

    #[tokio::test]
    async fn test_no_product_selected_sends_nothing() {
        let api = Arc::new(FakeCatalog::new(vec![product("p1", "Air Max", 0)]));
        let (mut screen, services, _rx) = entered(api.clone()).await;
        fill_pairs(&mut screen, &[("42", "5")]);

        match screen.submit(&services) {
            ScreenAction::Notify(n) => assert_eq!(n.message, "Please select a product."),
            other => panic!("unexpected action {:?}", other),
        }
        assert!(!screen.submitting);
        assert!(api.attempted_variants().is_empty());
    }

    #[tokio::test]
    async fn test_batch_success_sends_in_order() {
        let api = Arc::new(FakeCatalog::new(vec![product("p1", "Air Max", 0)]));
        let (mut screen, services, mut rx) = entered(api.clone()).await;
        screen.form.fields[PRODUCT].value = "p1".to_string();
        fill_pairs(&mut screen, &[("42", "5"), ("42.5", "3"), ("43", "0")]);

        screen.submit(&services);
        let action = screen.handle_event(rx.recv().await.unwrap(), &services);

        let sizes: Vec<f64> = api.sent_variants().iter().map(|v| v.size).collect();
        assert_eq!(sizes, vec![42.0, 42.5, 43.0]);
        assert!(api.sent_variants().iter().all(|v| v.product_id == "p1"));
        match action {
            ScreenAction::NotifyAndNavigate(n, Route::Products) => {
                assert_eq!(n.message, "Variants added successfully.")
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_batch_failure_keeps_prefix() {
        // the second pair fails
        let api = Arc::new(FakeCatalog::new(vec![product("p1", "Air Max", 0)]).fail_variant_at(1));
        let (mut screen, services, mut rx) = entered(api.clone()).await;
        screen.form.fields[PRODUCT].value = "p1".to_string();
        fill_pairs(&mut screen, &[("40", "1"), ("41", "2"), ("42", "3"), ("43", "4")]);

        screen.submit(&services);
        let action = screen.handle_event(rx.recv().await.unwrap(), &services);

        assert_eq!(api.sent_variants().len(), 1);
        assert_eq!(api.attempted_variants().len(), 2);
        assert!(!screen.submitting);
        match action {
            ScreenAction::Notify(n) => assert_eq!(n.message, "Failed to add variants."),
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_numeric_stock_blocks_submit() {
        let api = Arc::new(FakeCatalog::default());
        let (mut screen, services, _rx) = entered(api.clone()).await;
        screen.form.fields[PRODUCT].value = "p1".to_string();
        fill_pairs(&mut screen, &[("42", "lots")]);

        assert!(matches!(screen.submit(&services), ScreenAction::Notify(ref n) if n.is_error()));
        assert!(api.attempted_variants().is_empty());
    }
}
