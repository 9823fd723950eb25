//! Collapsible navigation panel
//!
//! Always shown beside the content on wide terminals. On narrow ones it hides
//! behind a toggle in the top-left corner and overlays the content when open.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::admin_tui::{
    app::Route,
    components::list_detail::LayoutMode,
    ui::{rect_contains, Styles},
};

pub const PANEL_TITLE: &str = "Sneaker Admin";
const PANEL_WIDTH: u16 = 24;

/// Narrow-layout panel state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy)]
pub struct NavEntry {
    pub label: &'static str,
    pub icon: &'static str,
    pub route: Route,
}

pub const ROUTES: [NavEntry; 5] = [
    NavEntry { label: "Products", icon: "📦", route: Route::Products },
    NavEntry { label: "Add Product", icon: "⊕", route: Route::AddProduct },
    NavEntry { label: "Add Variant", icon: "≡", route: Route::AddVariant },
    NavEntry { label: "Orders", icon: "🛒", route: Route::Orders },
    NavEntry { label: "Users", icon: "👥", route: Route::Users },
];

/// What a pointer-down landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavClick {
    Entry(Route),
    Title,
    Toggle,
    /// Inside the panel but not on a link
    Inside,
    Outside,
}

pub struct NavPanel {
    pub state: PanelState,
    /// Keyboard cursor over `ROUTES` while the panel is open
    pub cursor: usize,
    panel_area: Option<Rect>,
    toggle_area: Option<Rect>,
    title_area: Option<Rect>,
    entry_areas: Vec<(Rect, Route)>,
}

impl Default for NavPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl NavPanel {
    pub fn new() -> Self {
        Self {
            state: PanelState::Closed,
            cursor: 0,
            panel_area: None,
            toggle_area: None,
            title_area: None,
            entry_areas: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == PanelState::Open
    }

    pub fn toggle(&mut self) {
        self.state = match self.state {
            PanelState::Closed => PanelState::Open,
            PanelState::Open => PanelState::Closed,
        };
    }

    pub fn close(&mut self) {
        self.state = PanelState::Closed;
    }

    pub fn on_route_change(&mut self, route: Route) {
        self.close();
        if let Some(index) = ROUTES.iter().position(|e| e.route == route) {
            self.cursor = index;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = if self.cursor == 0 { ROUTES.len() - 1 } else { self.cursor - 1 };
    }

    pub fn cursor_down(&mut self) {
        self.cursor = (self.cursor + 1) % ROUTES.len();
    }

    pub fn selected_route(&self) -> Route {
        ROUTES[self.cursor].route
    }

    /// Classify a pointer-down and apply the panel transition it causes
    pub fn on_pointer_down(&mut self, column: u16, row: u16) -> NavClick {
        if self.toggle_area.is_some_and(|a| rect_contains(a, column, row)) {
            self.toggle();
            return NavClick::Toggle;
        }

        if self.panel_area.is_some_and(|a| rect_contains(a, column, row)) {
            if self.title_area.is_some_and(|a| rect_contains(a, column, row)) {
                return NavClick::Title;
            }
            if let Some((_, route)) = self
                .entry_areas
                .iter()
                .find(|(area, _)| rect_contains(*area, column, row))
            {
                return NavClick::Entry(*route);
            }
            return NavClick::Inside;
        }

        if self.is_open() {
            self.close();
        }
        NavClick::Outside
    }

    /// Area left for the active screen
    pub fn content_area(&self, area: Rect, mode: LayoutMode) -> Rect {
        match mode {
            LayoutMode::Table => {
                let width = PANEL_WIDTH.min(area.width);
                Rect {
                    x: area.x + width,
                    width: area.width - width,
                    ..area
                }
            }
            LayoutMode::Cards => Rect {
                y: area.y + 1u16.min(area.height),
                height: area.height.saturating_sub(1),
                ..area
            },
        }
    }

    /// Draw the panel (and the narrow-layout toggle bar) over `area`
    pub fn render(&mut self, f: &mut Frame, area: Rect, mode: LayoutMode, current: Route) {
        self.panel_area = None;
        self.toggle_area = None;
        self.title_area = None;
        self.entry_areas.clear();

        match mode {
            LayoutMode::Table => {
                // open/closed only exists in the narrow layout
                self.close();
                let panel = Rect {
                    width: PANEL_WIDTH.min(area.width),
                    ..area
                };
                self.render_panel(f, panel, current);
            }
            LayoutMode::Cards => {
                let bar = Rect { height: 1u16.min(area.height), ..area };
                let icon = if self.is_open() { "✕" } else { "☰" };
                let line = Line::from(vec![
                    Span::styled(format!(" {} ", icon), Styles::title()),
                    Span::styled(PANEL_TITLE, Styles::info()),
                ]);
                f.render_widget(Paragraph::new(line), bar);
                self.toggle_area = Some(Rect { width: 3u16.min(bar.width), ..bar });

                if self.is_open() {
                    let panel = Rect {
                        y: area.y + bar.height,
                        width: (PANEL_WIDTH + 2).min(area.width),
                        height: area.height - bar.height,
                        ..area
                    };
                    f.render_widget(Clear, panel);
                    self.render_panel(f, panel, current);
                }
            }
        }
    }

    fn render_panel(&mut self, f: &mut Frame, panel: Rect, current: Route) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.is_open() {
                Styles::active_border()
            } else {
                Styles::inactive_border()
            });
        let inner = block.inner(panel);
        f.render_widget(block, panel);
        self.panel_area = Some(panel);

        if inner.height == 0 {
            return;
        }

        let title_style = if current == Route::Dashboard {
            Styles::selected()
        } else {
            Styles::title()
        };
        let title_area = Rect { height: 1, ..inner };
        f.render_widget(Paragraph::new(Span::styled(PANEL_TITLE, title_style)), title_area);
        self.title_area = Some(title_area);

        let bottom = inner.y + inner.height;
        for (i, entry) in ROUTES.iter().enumerate() {
            let y = inner.y + 2 + i as u16;
            if y >= bottom {
                break;
            }
            let marker = if self.is_open() && i == self.cursor { "›" } else { " " };
            let style = if entry.route == current {
                Styles::selected()
            } else {
                Styles::default()
            };
            let row = Rect { y, height: 1, ..inner };
            let line = Line::from(Span::styled(
                format!("{}{} {}", marker, entry.icon, entry.label),
                style,
            ));
            f.render_widget(Paragraph::new(line), row);
            self.entry_areas.push((row, entry.route));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_tui::components::list_detail::tests::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(nav: &mut NavPanel, width: u16, mode: LayoutMode, current: Route) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 16)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                nav.render(f, area, mode, current);
            })
            .unwrap();
        buffer_text(&terminal)
    }

    #[test]
    fn test_state_machine() {
        let mut nav = NavPanel::new();
        assert_eq!(nav.state, PanelState::Closed);

        nav.toggle();
        assert_eq!(nav.state, PanelState::Open);
        nav.toggle();
        assert_eq!(nav.state, PanelState::Closed);

        nav.toggle();
        nav.on_route_change(Route::Orders);
        assert_eq!(nav.state, PanelState::Closed);
        assert_eq!(nav.selected_route(), Route::Orders);
    }

    #[test]
    fn test_narrow_toggle_and_outside_click() {
        let mut nav = NavPanel::new();
        let closed = draw(&mut nav, 60, LayoutMode::Cards, Route::Products);
        assert!(closed.contains("☰"));
        assert!(!closed.contains("Add Variant"));

        assert_eq!(nav.on_pointer_down(1, 0), NavClick::Toggle);
        assert!(nav.is_open());

        let open = draw(&mut nav, 60, LayoutMode::Cards, Route::Products);
        assert!(open.contains("✕"));
        assert!(open.contains("Add Variant"));

        // inside the panel keeps it open
        assert_eq!(nav.on_pointer_down(2, 14), NavClick::Inside);
        assert!(nav.is_open());

        assert_eq!(nav.on_pointer_down(50, 10), NavClick::Outside);
        assert_eq!(nav.state, PanelState::Closed);
    }

    #[test]
    fn test_entry_and_title_clicks() {
        let mut nav = NavPanel::new();
        draw(&mut nav, 120, LayoutMode::Table, Route::Products);

        // border row 0, title row 1, blank row 2, entries from row 3
        assert_eq!(nav.on_pointer_down(3, 1), NavClick::Title);
        assert_eq!(nav.on_pointer_down(3, 3), NavClick::Entry(Route::Products));
        assert_eq!(nav.on_pointer_down(3, 6), NavClick::Entry(Route::Orders));
        assert_eq!(nav.on_pointer_down(80, 6), NavClick::Outside);
    }

    #[test]
    fn test_wide_panel_always_visible() {
        let mut nav = NavPanel::new();
        let text = draw(&mut nav, 120, LayoutMode::Table, Route::Users);
        assert!(text.contains(PANEL_TITLE));
        for entry in ROUTES.iter() {
            assert!(text.contains(entry.label));
        }

        let content = nav.content_area(Rect::new(0, 0, 120, 16), LayoutMode::Table);
        assert_eq!(content.x, PANEL_WIDTH);
        let narrow = nav.content_area(Rect::new(0, 0, 60, 16), LayoutMode::Cards);
        assert_eq!((narrow.y, narrow.width), (1, 60));
    }

    #[test]
    fn test_wide_render_drops_open_state() {
        let mut nav = NavPanel::new();
        nav.toggle();
        draw(&mut nav, 120, LayoutMode::Table, Route::Products);
        assert_eq!(nav.state, PanelState::Closed);

        // a click beside the panel is plain content
        assert_eq!(nav.on_pointer_down(80, 5), NavClick::Outside);
        assert!(!nav.is_open());
    }
}
