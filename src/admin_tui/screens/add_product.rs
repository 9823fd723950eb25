//! Add Product screen: multipart product creation form

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, error, info};

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
    api::{endpoints, FetchError},
    models::{on_sale_multiplier, Gender, ImageUpload, ProductDraft},
};

const NAME: usize = 0;
const DESCRIPTION: usize = 1;
const PRICE: usize = 2;
const GENDER: usize = 3;
const ON_SALE: usize = 4;
const SALE_PERCENTAGE: usize = 5;
const IMAGE: usize = 6;

fn product_form() -> Form {
    let genders = Gender::ALL
        .iter()
        .map(|g| (g.as_str().to_string(), g.label().to_string()))
        .collect();

    Form::new(vec![
        FormField::new("Name", FormFieldType::Text).required(),
        FormField::new("Description", FormFieldType::TextArea),
        FormField::new("Price", FormFieldType::Number)
            .with_placeholder("e.g. 129.99")
            .required(),
        FormField::new("Gender", FormFieldType::Dropdown)
            .with_placeholder("Select")
            .with_dropdown_options(genders)
            .required(),
        FormField::new("On Sale (Space)", FormFieldType::Toggle),
        FormField::new("Sale Percentage", FormFieldType::Number)
            .with_placeholder("e.g. 0.3 for 30%")
            .required()
            .hidden(true),
        FormField::new("Product Image", FormFieldType::FilePath)
            .with_placeholder("Path to a PNG, JPG or WEBP file"),
    ])
}

/// Scalar fields captured at submit time
struct DraftFields {
    name: String,
    description: String,
    price: String,
    gender: Gender,
    on_sale: f64,
}

impl DraftFields {
    fn into_draft(self, image: ImageUpload) -> ProductDraft {
        ProductDraft {
            name: self.name,
            description: self.description,
            price: self.price,
            gender: self.gender,
            on_sale: self.on_sale,
            image,
        }
    }
}

/// Add Product screen state
pub struct AddProductScreen {
    pub form: Form,
    pub submitting: bool,
    pub visit: u64,
    submit_button: Option<Rect>,
    cancel_button: Option<Rect>,
    change_button: Option<Rect>,
    /// Size of the selected image, keyed by the path it was read from
    image_size: Option<(String, Option<u64>)>,
}

impl Default for AddProductScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl AddProductScreen {
    pub fn new() -> Self {
        Self {
            form: product_form(),
            submitting: false,
            visit: 0,
            submit_button: None,
            cancel_button: None,
            change_button: None,
            image_size: None,
        }
    }

    fn on_sale(&self) -> bool {
        self.form.get_field(ON_SALE).map(|f| f.checked).unwrap_or(false)
    }

    /// Show the sale percentage only while the toggle is on
    fn sync_sale_field(&mut self) {
        let hidden = !self.on_sale();
        self.form.set_hidden(SALE_PERCENTAGE, hidden);
    }

    fn clear_image(&mut self) {
        if let Some(field) = self.form.get_field_mut(IMAGE) {
            field.clear();
        }
        self.image_size = None;
    }

    /// File size of the selected image; the filesystem is only touched when the path changes
    fn selected_image_size(&mut self) -> Option<u64> {
        let path = self.form.value(IMAGE);
        if path.is_empty() {
            self.image_size = None;
            return None;
        }
        match &self.image_size {
            Some((cached, size)) if cached == path => *size,
            _ => {
                let size = std::fs::metadata(path)
                    .ok()
                    .filter(|m| m.is_file())
                    .map(|m| m.len());
                debug!("Image preview for {} ({:?} bytes)", path, size);
                self.image_size = Some((path.to_string(), size));
                size
            }
        }
    }

    fn sale_percentage(&mut self) -> Result<f64, ScreenAction> {
        let value = self.form.value(SALE_PERCENTAGE).parse::<f64>().unwrap_or(f64::NAN);
        if (0.0..=1.0).contains(&value) {
            return Ok(value);
        }
        if let Some(field) = self.form.get_field_mut(SALE_PERCENTAGE) {
            field.validation_error = Some("Must be between 0 and 1".to_string());
        }
        Err(ScreenAction::Notify(Notification::error(
            "Sale percentage must be between 0 and 1.",
        )))
    }

    fn submit(&mut self, services: &Services) -> ScreenAction {
        if self.submitting {
            return ScreenAction::None;
        }
        if let Err(message) = self.form.validate() {
            return ScreenAction::Notify(Notification::error(&message));
        }

        let image_path = self.form.value(IMAGE).to_string();
        if image_path.is_empty() {
            return ScreenAction::Notify(Notification::error("Please upload a product image."));
        }

        let on_sale = self.on_sale();
        let percentage = if on_sale {
            match self.sale_percentage() {
                Ok(p) => p,
                Err(action) => return action,
            }
        } else {
            0.0
        };

        let fields = DraftFields {
            name: self.form.value(NAME).to_string(),
            description: self.form.value(DESCRIPTION).to_string(),
            price: self.form.value(PRICE).to_string(),
            gender: Gender::parse(self.form.value(GENDER)),
            on_sale: on_sale_multiplier(on_sale, percentage),
        };

        info!("Submitting product {:?}", fields.name);
        self.submitting = true;
        let api = services.api.clone();
        let visit = self.visit;
        services.spawn_request(async move {
            let result = match tokio::fs::read(&image_path).await {
                Ok(bytes) => {
                    let file_name = Path::new(&image_path)
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "image".to_string());
                    debug!("Read {} bytes from {}", bytes.len(), image_path);
                    let image = ImageUpload {
                        mime_type: ImageUpload::mime_for(&file_name),
                        file_name,
                        bytes,
                    };
                    api.add_product(fields.into_draft(image)).await
                }
                Err(e) => Err(FetchError::new(endpoints::ADD_PRODUCT, e)),
            };
            AppEvent::ProductAdded { visit, result }
        });
        ScreenAction::None
    }

    fn draw_image_preview(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Image Preview")
            .borders(Borders::ALL)
            .border_style(Styles::inactive_border());
        let inner = block.inner(area);
        f.render_widget(block, area);
        self.change_button = None;

        let Some(size) = self.selected_image_size() else {
            let hint = Paragraph::new(vec![
                Line::from(Span::styled("No image selected", Styles::inactive())),
                Line::from(Span::styled("PNG, JPG, WEBP (max 2MB)", Styles::inactive())),
            ]);
            f.render_widget(hint, inner);
            return;
        };

        let file_name = Path::new(self.form.value(IMAGE))
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let preview = Paragraph::new(vec![
            Line::from(Span::styled(format!("🖼 {}", file_name), Styles::info())),
            Line::from(Span::styled(
                format!("{} · {:.1} KB", ImageUpload::mime_for(&file_name), size as f64 / 1024.0),
                Styles::inactive(),
            )),
        ]);
        f.render_widget(preview, inner);

        let label = " Change (Ctrl+X) ";
        let width = (label.chars().count() as u16).min(inner.width);
        let button = Rect {
            x: inner.x + inner.width - width,
            y: inner.y,
            width,
            height: 1u16.min(inner.height),
        };
        f.render_widget(Paragraph::new(Span::styled(label, Styles::badge())), button);
        self.change_button = Some(button);
    }

    fn draw_buttons(&mut self, f: &mut Frame, area: Rect) {
        let submit_label = if self.submitting { " Adding... " } else { " Add Product (Ctrl+S) " };
        let cancel_label = " Cancel (Esc) ";
        let submit_width = (submit_label.chars().count() as u16).min(area.width);
        let cancel_width = cancel_label.chars().count() as u16;

        let submit = Rect {
            x: area.x + area.width - submit_width,
            width: submit_width,
            height: 1,
            ..area
        };
        let cancel = Rect {
            x: submit.x.saturating_sub(cancel_width + 2).max(area.x),
            width: cancel_width.min(area.width),
            height: 1,
            ..area
        };

        let submit_style = if self.submitting { Styles::inactive() } else { Styles::selected() };
        f.render_widget(Paragraph::new(Span::raw(cancel_label)), cancel);
        f.render_widget(Paragraph::new(Span::styled(submit_label, submit_style)), submit);
        self.submit_button = Some(submit);
        self.cancel_button = Some(cancel);
    }
}

impl AdminScreen for AddProductScreen {
    fn on_enter(&mut self, _services: &Services) {
        self.visit += 1;
        self.form = product_form();
        self.submitting = false;
        self.image_size = None;
    }

    fn handle_key(&mut self, key: KeyEvent, services: &Services) -> ScreenAction {
        if key.code == KeyCode::Char('x') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.clear_image();
            return ScreenAction::None;
        }

        let action = match self.form.handle_key(key) {
            FormInput::Submit => self.submit(services),
            FormInput::Cancel => ScreenAction::NavigateTo(Route::Products),
            FormInput::Handled | FormInput::Unhandled => ScreenAction::None,
        };
        self.sync_sale_field();
        action
    }

    fn handle_click(&mut self, column: u16, row: u16, services: &Services) -> ScreenAction {
        if self.submit_button.is_some_and(|a| rect_contains(a, column, row)) {
            return self.submit(services);
        }
        if self.cancel_button.is_some_and(|a| rect_contains(a, column, row)) {
            return ScreenAction::NavigateTo(Route::Products);
        }
        if self.change_button.is_some_and(|a| rect_contains(a, column, row)) {
            self.clear_image();
            self.form.set_current_field(IMAGE);
            return ScreenAction::None;
        }
        if self.form.click(column, row) {
            self.sync_sale_field();
        }
        ScreenAction::None
    }

    fn handle_event(&mut self, event: AppEvent, _services: &Services) -> ScreenAction {
        if event.visit() != self.visit {
            debug!("Dropping stale add-product result from visit {}", event.visit());
            return ScreenAction::None;
        }

        match event {
            AppEvent::ProductAdded { result, .. } => {
                self.submitting = false;
                match result {
                    Ok(()) => {
                        info!("Product added");
                        ScreenAction::NotifyAndNavigate(
                            Notification::success("Success", "Product added successfully."),
                            Route::Products,
                        )
                    }
                    Err(e) => {
                        error!("{}", e);
                        ScreenAction::Notify(Notification::error(
                            "Something went wrong. Please try again.",
                        ))
                    }
                }
            }
            _ => ScreenAction::None,
        }
    }

    fn draw(&mut self, f: &mut Frame, area: Rect, mode: LayoutMode) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let header = Paragraph::new(vec![
            Line::from(Span::styled("Add Product", Styles::title())),
            Line::from(Span::styled(
                "Add a new sneaker product to your inventory",
                Styles::inactive(),
            )),
        ]);
        f.render_widget(header, chunks[0]);

        // image preview beside the fields when wide, below them when narrow
        let body = match mode {
            LayoutMode::Table => Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]),
            LayoutMode::Cards => Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(4)])
                .split(chunks[1]),
        };

        self.form.render(f, body[0]);
        self.draw_image_preview(f, body[1]);
        self.draw_buttons(f, chunks[2]);
    }

    fn captures_text(&self) -> bool {
        true
    }

    fn help(&self) -> &'static str {
        "Add Product:\n\
        Tab / Shift+Tab - Next / previous field\n\
        ↑/↓ - Change gender when focused\n\
        Space - Toggle On Sale\n\
        Enter / Ctrl+S - Submit\n\
        Ctrl+X - Clear the selected image\n\
        Esc - Cancel and return to Products"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_tui::app::tests::test_services;
    use crate::api::test_support::FakeCatalog;
    use crate::models::format_multiplier;
    use std::io::Write;
    use std::sync::Arc;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn image_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"\x89PNG fake image").unwrap();
        file
    }

    fn filled(screen: &mut AddProductScreen, image: &Path) {
        screen.form.fields[NAME].value = "Air Max 90".to_string();
        screen.form.fields[DESCRIPTION].value = "Classic runner".to_string();
        screen.form.fields[PRICE].value = "200".to_string();
        screen.form.fields[GENDER].value = "men".to_string();
        screen.form.fields[IMAGE].value = image.display().to_string();
    }

    #[tokio::test]
    async fn test_sale_off_submits_full_price_multiplier() {
        let api = Arc::new(FakeCatalog::default());
        let (services, mut rx) = test_services(api.clone());
        let mut screen = AddProductScreen::new();
        screen.on_enter(&services);
        let image = image_file();
        filled(&mut screen, image.path());

        assert_eq!(screen.submit(&services), ScreenAction::None);
        assert!(screen.submitting);
        let action = screen.handle_event(rx.recv().await.unwrap(), &services);

        let added = api.added_products();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].on_sale, 1.0);
        assert_eq!(format_multiplier(added[0].on_sale), "1");
        assert_eq!(added[0].gender, Gender::Men);
        assert_eq!(added[0].image.mime_type, "image/png");
        assert_eq!(added[0].image.bytes, b"\x89PNG fake image".to_vec());
        match action {
            ScreenAction::NotifyAndNavigate(n, route) => {
                assert_eq!(n.message, "Product added successfully.");
                assert_eq!(route, Route::Products);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sale_on_submits_inverted_percentage() {
        let api = Arc::new(FakeCatalog::default());
        let (services, mut rx) = test_services(api.clone());
        let mut screen = AddProductScreen::new();
        screen.on_enter(&services);
        let image = image_file();
        filled(&mut screen, image.path());

        // Tab to the toggle and flip it; the percentage field appears
        screen.form.set_current_field(ON_SALE);
        screen.handle_key(press(KeyCode::Char(' ')), &services);
        assert!(!screen.form.fields[SALE_PERCENTAGE].hidden);
        screen.handle_key(press(KeyCode::Tab), &services);
        assert_eq!(screen.form.current_field, SALE_PERCENTAGE);
        for c in "0.3".chars() {
            screen.handle_key(press(KeyCode::Char(c)), &services);
        }

        screen.handle_key(press(KeyCode::Enter), &services);
        screen.handle_event(rx.recv().await.unwrap(), &services);

        let added = api.added_products();
        let on_sale = added[0]
            .text_fields()
            .into_iter()
            .find(|(k, _)| *k == "onSale")
            .map(|(_, v)| v);
        assert_eq!(on_sale.as_deref(), Some("0.7"));
    }

    #[tokio::test]
    async fn test_missing_image_sends_nothing() {
        let api = Arc::new(FakeCatalog::default());
        let (services, _rx) = test_services(api.clone());
        let mut screen = AddProductScreen::new();
        let image = image_file();
        filled(&mut screen, image.path());
        screen.form.fields[IMAGE].clear();

        match screen.submit(&services) {
            ScreenAction::Notify(n) => assert_eq!(n.message, "Please upload a product image."),
            other => panic!("unexpected action {:?}", other),
        }
        assert!(!screen.submitting);
        assert!(api.added_products().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_percentage_rejected() {
        let api = Arc::new(FakeCatalog::default());
        let (services, _rx) = test_services(api.clone());
        let mut screen = AddProductScreen::new();
        let image = image_file();
        filled(&mut screen, image.path());
        screen.form.fields[ON_SALE].checked = true;
        screen.sync_sale_field();
        screen.form.fields[SALE_PERCENTAGE].value = "1.5".to_string();

        assert!(matches!(screen.submit(&services), ScreenAction::Notify(ref n) if n.is_error()));
        assert!(screen.form.fields[SALE_PERCENTAGE].validation_error.is_some());
        assert!(!screen.submitting);
    }

    #[tokio::test]
    async fn test_required_fields_block_submit() {
        let (services, _rx) = test_services(Arc::new(FakeCatalog::default()));
        let mut screen = AddProductScreen::new();

        match screen.submit(&services) {
            ScreenAction::Notify(n) => assert_eq!(n.message, "Name: Required"),
            other => panic!("unexpected action {:?}", other),
        }
        assert!(!screen.submitting);
    }

    #[tokio::test]
    async fn test_api_failure_shows_generic_error() {
        let api = Arc::new(FakeCatalog::default().failing_add_product());
        let (services, mut rx) = test_services(api);
        let mut screen = AddProductScreen::new();
        screen.on_enter(&services);
        let image = image_file();
        filled(&mut screen, image.path());

        screen.submit(&services);
        let action = screen.handle_event(rx.recv().await.unwrap(), &services);
        assert!(!screen.submitting);
        match action {
            ScreenAction::Notify(n) => {
                assert!(n.is_error());
                assert_eq!(n.message, "Something went wrong. Please try again.");
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_image_size_read_once_per_path() {
        let (services, _rx) = test_services(Arc::new(FakeCatalog::default()));
        let mut screen = AddProductScreen::new();
        let mut first = image_file();
        screen.form.fields[IMAGE].value = first.path().display().to_string();
        assert_eq!(screen.selected_image_size(), Some(15));

        // later frames reuse the cached size even though the file grew
        first.write_all(b" more bytes").unwrap();
        first.flush().unwrap();
        assert_eq!(screen.selected_image_size(), Some(15));

        let mut second = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        second.write_all(b"jpeg").unwrap();
        screen.form.fields[IMAGE].value = second.path().display().to_string();
        assert_eq!(screen.selected_image_size(), Some(4));

        screen.form.fields[IMAGE].value = "/no/such/image.png".to_string();
        assert_eq!(screen.selected_image_size(), None);

        screen.form.fields[IMAGE].value = second.path().display().to_string();
        screen.selected_image_size();
        screen.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL), &services);
        assert!(screen.image_size.is_none());
        assert_eq!(screen.selected_image_size(), None);
    }

    #[tokio::test]
    async fn test_escape_cancels_to_products() {
        let (services, _rx) = test_services(Arc::new(FakeCatalog::default()));
        let mut screen = AddProductScreen::new();
        assert_eq!(
            screen.handle_key(press(KeyCode::Esc), &services),
            ScreenAction::NavigateTo(Route::Products)
        );
        assert!(screen.captures_text());
    }
}
