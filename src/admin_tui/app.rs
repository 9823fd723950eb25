//! Main TUI application state and event loop

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use super::components::{
    list_detail::LayoutMode,
    nav_panel::{NavClick, NavPanel},
    notification::{Notification, NotificationCenter},
};
use super::events::AppEvent;
use super::screens::*;
use super::traits::{AdminScreen, ScreenAction};
use super::ui::{centered_rect, rect_contains};
use crate::api::{ApiClient, CatalogApi, FixtureOrders, FixtureUsers, OrderSource, UserSource};
use crate::config::Config;

/// Application routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Dashboard,
    Products,
    AddProduct,
    AddVariant,
    Orders,
    Users,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Products => "/products",
            Route::AddProduct => "/products/add",
            Route::AddVariant => "/variants/add",
            Route::Orders => "/orders",
            Route::Users => "/users",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Products => "Products",
            Route::AddProduct => "Add Product",
            Route::AddVariant => "Add Variant",
            Route::Orders => "Orders",
            Route::Users => "Users",
        }
    }
}

/// Collaborators shared by every screen
#[derive(Clone)]
pub struct Services {
    pub api: Arc<dyn CatalogApi>,
    pub orders: Arc<dyn OrderSource>,
    pub users: Arc<dyn UserSource>,
    events: UnboundedSender<AppEvent>,
}

impl Services {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        orders: Arc<dyn OrderSource>,
        users: Arc<dyn UserSource>,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self { api, orders, users, events }
    }

    /// Run `request` on the runtime and post its outcome back to the UI loop
    pub fn spawn_request<F>(&self, request: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = request.await;
            if events.send(event).is_err() {
                debug!("UI loop closed before a request finished");
            }
        });
    }
}

/// One instance of every screen; each keeps its state between visits
pub struct Screens {
    pub dashboard: DashboardScreen,
    pub products: ProductsScreen,
    pub add_product: AddProductScreen,
    pub add_variant: AddVariantScreen,
    pub orders: OrdersScreen,
    pub users: UsersScreen,
}

impl Screens {
    fn new() -> Self {
        Self {
            dashboard: DashboardScreen::new(),
            products: ProductsScreen::new(),
            add_product: AddProductScreen::new(),
            add_variant: AddVariantScreen::new(),
            orders: OrdersScreen::new(),
            users: UsersScreen::new(),
        }
    }

    pub fn get_mut(&mut self, route: Route) -> &mut dyn AdminScreen {
        match route {
            Route::Dashboard => &mut self.dashboard,
            Route::Products => &mut self.products,
            Route::AddProduct => &mut self.add_product,
            Route::AddVariant => &mut self.add_variant,
            Route::Orders => &mut self.orders,
            Route::Users => &mut self.users,
        }
    }
}

/// Main TUI application state
pub struct App {
    /// Current active route
    pub route: Route,
    /// Application configuration
    pub config: Config,
    pub services: Services,
    events_rx: Option<UnboundedReceiver<AppEvent>>,

    pub screens: Screens,
    pub nav: NavPanel,
    pub notifications: NotificationCenter,

    // Global application state
    pub should_quit: bool,
    pub show_help_popup: bool,
    content_area: Rect,
    /// Layout of the last frame, or of the last resize
    layout: LayoutMode,
}

impl App {
    /// Create the application around the given collaborators
    pub fn new(
        config: Config,
        api: Arc<dyn CatalogApi>,
        orders: Arc<dyn OrderSource>,
        users: Arc<dyn UserSource>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let notifications = NotificationCenter::new().with_auto_clear(config.toast_timeout());

        Self {
            route: Route::Dashboard,
            config,
            services: Services::new(api, orders, users, events_tx),
            events_rx: Some(events_rx),
            screens: Screens::new(),
            nav: NavPanel::new(),
            notifications,
            should_quit: false,
            show_help_popup: false,
            content_area: Rect::default(),
            layout: LayoutMode::Cards,
        }
    }

    /// Create the application against the configured API, with fixture orders and users
    pub fn with_http_client(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config).context("Failed to build HTTP client")?;
        Ok(Self::new(
            config,
            Arc::new(api),
            Arc::new(FixtureOrders),
            Arc::new(FixtureUsers),
        ))
    }

    /// Enter the starting route and issue its requests
    pub fn start(&mut self) {
        info!("Starting at {}", self.route.path());
        self.screens.get_mut(self.route).on_enter(&self.services);
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let mut events_rx = self
            .events_rx
            .take()
            .context("Event loop is already running")?;
        let mut input = EventStream::new();
        let mut tick = tokio::time::interval(Duration::from_millis(250));

        self.start();

        let outcome = loop {
            if let Err(e) = terminal.draw(|f| self.draw(f)) {
                break Err(e.into());
            }

            tokio::select! {
                maybe_event = input.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_terminal_event(event),
                    Some(Err(e)) => {
                        error!("Failed to read terminal input: {}", e);
                        break Err(e.into());
                    }
                    None => break Ok(()),
                },
                Some(event) = events_rx.recv() => self.handle_app_event(event),
                _ = tick.tick() => {
                    self.notifications.expire();
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        self.events_rx = Some(events_rx);
        outcome
    }

    pub fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            Event::Resize(width, height) => {
                debug!("Terminal resized to {}x{}", width, height);
                self.set_layout(self.layout_mode(width));
            }
            _ => {}
        }
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.show_help_popup {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?')) {
                self.show_help_popup = false;
            }
            return;
        }

        let captures_text = self.screens.get_mut(self.route).captures_text();

        // Global shortcuts
        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = true;
                return;
            }
            KeyCode::F(2) => {
                self.toggle_nav();
                return;
            }
            KeyCode::Esc => {
                if self.notifications.dismiss() {
                    return;
                }
                if self.nav.is_open() {
                    self.nav.close();
                    return;
                }
            }
            _ => {}
        }

        if self.nav.is_open() {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => return self.nav.cursor_up(),
                KeyCode::Down | KeyCode::Char('j') => return self.nav.cursor_down(),
                KeyCode::Enter => return self.navigate_to(self.nav.selected_route()),
                KeyCode::Char('m') => return self.toggle_nav(),
                _ => {}
            }
        }

        if !captures_text {
            let shortcut = match key.code {
                KeyCode::Char('?') => {
                    self.show_help_popup = true;
                    return;
                }
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('m') => {
                    self.toggle_nav();
                    return;
                }
                KeyCode::Char('h') | KeyCode::Char('0') => Some(Route::Dashboard),
                KeyCode::Char('1') => Some(Route::Products),
                KeyCode::Char('2') => Some(Route::AddProduct),
                KeyCode::Char('3') => Some(Route::AddVariant),
                KeyCode::Char('4') => Some(Route::Orders),
                KeyCode::Char('5') => Some(Route::Users),
                _ => None,
            };
            if let Some(route) = shortcut {
                self.navigate_to(route);
                return;
            }
        }

        let action = self
            .screens
            .get_mut(self.route)
            .handle_key(key, &self.services);
        self.apply_action(action);
    }

    /// Handle left mouse-down; other mouse events are ignored
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let (column, row) = (mouse.column, mouse.row);

        if self.show_help_popup {
            self.show_help_popup = false;
            return;
        }
        if self.notifications.contains(column, row) {
            self.notifications.dismiss();
            return;
        }

        let was_open = self.nav.is_open();
        match self.nav.on_pointer_down(column, row) {
            NavClick::Entry(route) => self.navigate_to(route),
            NavClick::Title => self.navigate_to(Route::Dashboard),
            NavClick::Toggle | NavClick::Inside => {}
            NavClick::Outside => {
                if !was_open && rect_contains(self.content_area, column, row) {
                    let action = self
                        .screens
                        .get_mut(self.route)
                        .handle_click(column, row, &self.services);
                    self.apply_action(action);
                }
            }
        }
    }

    /// Deliver a request outcome to the screen that issued it
    pub fn handle_app_event(&mut self, event: AppEvent) {
        if event.route() != self.route {
            debug!(
                "Dropping result for {} while on {}",
                event.route().path(),
                self.route.path()
            );
            return;
        }
        let action = self
            .screens
            .get_mut(self.route)
            .handle_event(event, &self.services);
        self.apply_action(action);
    }

    fn apply_action(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::NavigateTo(route) => self.navigate_to(route),
            ScreenAction::Notify(notification) => self.notify(notification),
            ScreenAction::NotifyAndNavigate(notification, route) => {
                self.notify(notification);
                self.navigate_to(route);
            }
            ScreenAction::None => {}
        }
    }

    fn notify(&mut self, notification: Notification) {
        if notification.is_error() {
            warn!("Notify: {}", notification.message);
        } else {
            info!("Notify: {}", notification.message);
        }
        self.notifications.push(notification);
    }

    /// Switch to `route`, closing the navigation panel
    pub fn navigate_to(&mut self, route: Route) {
        self.nav.on_route_change(route);
        if route == self.route {
            return;
        }
        info!("Navigating {} -> {}", self.route.path(), route.path());
        self.route = route;
        self.show_help_popup = false;
        self.screens.get_mut(route).on_enter(&self.services);
    }

    pub fn layout_mode(&self, width: u16) -> LayoutMode {
        LayoutMode::for_width(width, self.config.breakpoint)
    }

    fn set_layout(&mut self, layout: LayoutMode) {
        if layout == LayoutMode::Table {
            self.nav.close();
        }
        self.layout = layout;
    }

    /// The wide panel is always shown, so only the narrow one toggles
    fn toggle_nav(&mut self) {
        match self.layout {
            LayoutMode::Cards => self.nav.toggle(),
            LayoutMode::Table => debug!("Menu toggle ignored in table layout"),
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();
        let mode = self.layout_mode(size.width);
        self.set_layout(mode);

        // Main layout: status bar at bottom, content area above
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.content_area = self.nav.content_area(chunks[0], mode);
        self.screens
            .get_mut(self.route)
            .draw(f, self.content_area, mode);
        self.nav.render(f, chunks[0], mode, self.route);

        self.draw_status_bar(f, chunks[1], mode);
        self.notifications.render(f, self.content_area);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    /// Draw status bar with current screen info and shortcuts
    fn draw_status_bar(&mut self, f: &mut Frame, area: Rect, mode: LayoutMode) {
        let keys = if self.screens.get_mut(self.route).captures_text() {
            "Tab: Next field | Ctrl+S: Submit | Esc: Cancel | F2: Menu | F1: Help"
        } else {
            "1-5: Go to | m: Menu | ?: Help | q: Quit"
        };
        let layout = match mode {
            LayoutMode::Table => "table",
            LayoutMode::Cards => "cards",
        };
        let status_text = format!(
            "{} {} [{}] | {}",
            self.route.title(),
            self.route.path(),
            layout,
            keys
        );

        let status_bar = Paragraph::new(status_text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }

    /// Draw help popup with context-sensitive shortcuts
    fn draw_help_popup(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(80, 70, area);

        f.render_widget(Clear, popup_area);

        let help_content = self.get_context_help();
        let help_popup = Paragraph::new(help_content)
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false });

        f.render_widget(help_popup, popup_area);
    }

    /// Get context-sensitive help content
    fn get_context_help(&mut self) -> String {
        let global_help = "Global Shortcuts:\n\
            F2 / m - Toggle navigation menu\n\
            1-5 - Products, Add Product, Add Variant, Orders, Users\n\
            h / 0 - Dashboard\n\
            Esc - Dismiss notification / close menu\n\
            q / Ctrl+C - Quit\n\
            F1 / ? - Toggle this help\n\
            Mouse - Click links, rows and fields\n\n";

        let screen_help = self.screens.get_mut(self.route).help();
        format!("{}{}", global_help, screen_help)
    }
}
