//! Responsive master-detail list
//!
//! Renders a collection as stacked cards on narrow terminals and as a column
//! table on wide ones. At most one item is expanded at a time; its detail
//! rows are drawn directly under it in either layout.

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::admin_tui::{
    traits::Navigable,
    ui::{fit, fit_spans, rect_contains, Styles},
};

/// Which rendering the viewport width calls for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Cards,
    Table,
}

impl LayoutMode {
    /// Cards below the breakpoint, table at or above it
    pub fn for_width(width: u16, breakpoint: u16) -> Self {
        if width < breakpoint {
            LayoutMode::Cards
        } else {
            LayoutMode::Table
        }
    }
}

/// Table column header and its width in display columns
#[derive(Debug, Clone)]
pub struct Column {
    pub title: &'static str,
    pub width: usize,
}

impl Column {
    pub const fn new(title: &'static str, width: usize) -> Self {
        Self { title, width }
    }
}

/// Nested rows revealed when an item is expanded
#[derive(Debug, Clone, Default)]
pub struct DetailTable {
    pub headers: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

/// How one item of a collection is presented
pub trait ListRow {
    /// Stable id used for the expanded-item selection
    fn key(&self) -> &str;

    fn columns() -> Vec<Column>;

    /// One styled cell per entry of `columns()`
    fn cells(&self) -> Vec<Vec<Span<'static>>>;

    /// Lines of the narrow-layout card
    fn card(&self) -> Vec<Line<'static>>;

    /// Label of the expand toggle ("Variants"); `None` disables expansion
    fn detail_label() -> Option<&'static str> {
        None
    }

    fn detail(&self) -> DetailTable {
        DetailTable::default()
    }
}

/// Result of a mouse-down on the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListClick {
    Selected(usize),
    Toggled(usize),
}

const COLUMN_SEPARATOR: &str = " │ ";
const TOGGLE_WIDTH: usize = 14;
const DETAIL_INDENT: usize = 4;

pub struct ListDetailView<T> {
    pub items: Vec<T>,
    pub cursor: Option<usize>,
    pub expanded: Option<String>,
    pub title: String,
    pub empty_message: String,
    state: ListState,
    item_hits: Vec<(Rect, usize)>,
    toggle_hits: Vec<(Rect, usize)>,
}

impl<T: ListRow> ListDetailView<T> {
    pub fn new(title: &str) -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            expanded: None,
            title: title.to_string(),
            empty_message: "Nothing to show".to_string(),
            state: ListState::default(),
            item_hits: Vec::new(),
            toggle_hits: Vec::new(),
        }
    }

    pub fn with_empty_message(mut self, message: &str) -> Self {
        self.empty_message = message.to_string();
        self
    }

    /// Replace the items, keeping the expansion if its item is still present
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        if let Some(key) = &self.expanded {
            if !self.items.iter().any(|item| item.key() == key) {
                self.expanded = None;
            }
        }
        self.cursor = match self.cursor {
            Some(i) if i < self.items.len() => Some(i),
            _ if !self.items.is_empty() => Some(0),
            _ => None,
        };
    }

    pub fn is_expandable(&self) -> bool {
        T::detail_label().is_some()
    }

    pub fn is_expanded(&self, key: &str) -> bool {
        self.expanded.as_deref() == Some(key)
    }

    /// Make `key` the only expanded item, or collapse it if it already is
    pub fn toggle(&mut self, key: &str) {
        if !self.is_expandable() {
            return;
        }
        if self.is_expanded(key) {
            self.expanded = None;
        } else {
            self.expanded = Some(key.to_string());
        }
    }

    pub fn toggle_selected(&mut self) {
        if let Some(key) = self.selected().map(|item| item.key().to_string()) {
            self.toggle(&key);
        }
    }

    pub fn selected(&self) -> Option<&T> {
        self.cursor.and_then(|i| self.items.get(i))
    }

    /// Remove the item with `key`; clears the expansion if it pointed there
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.key() == key)?;
        let removed = self.items.remove(index);

        if self.is_expanded(key) {
            self.expanded = None;
        }
        self.cursor = if self.items.is_empty() {
            None
        } else {
            self.cursor.map(|c| c.min(self.items.len() - 1))
        };
        Some(removed)
    }

    /// Select the item under the pointer; a hit on its toggle also toggles it
    pub fn click(&mut self, column: u16, row: u16) -> Option<ListClick> {
        if let Some(&(_, index)) = self
            .toggle_hits
            .iter()
            .find(|(area, _)| rect_contains(*area, column, row))
        {
            self.cursor = Some(index);
            if let Some(key) = self.items.get(index).map(|item| item.key().to_string()) {
                self.toggle(&key);
            }
            return Some(ListClick::Toggled(index));
        }

        let &(_, index) = self
            .item_hits
            .iter()
            .find(|(area, _)| rect_contains(*area, column, row))?;
        self.cursor = Some(index);
        Some(ListClick::Selected(index))
    }

    fn toggle_text(&self, item: &T) -> String {
        let label = T::detail_label().unwrap_or_default();
        let arrow = if self.is_expanded(item.key()) { "▼" } else { "▶" };
        format!("{} {} {}", arrow, item.detail().rows.len(), label)
    }

    fn detail_lines(item: &T) -> Vec<Line<'static>> {
        let detail = item.detail();
        let indent = " ".repeat(DETAIL_INDENT);

        let header: String = detail
            .headers
            .iter()
            .map(|c| fit(c.title, c.width))
            .collect::<Vec<_>>()
            .join(" ");
        let mut lines = vec![Line::from(vec![
            Span::raw(indent.clone()),
            Span::styled(header, Styles::title()),
        ])];

        for row in &detail.rows {
            let text: String = detail
                .headers
                .iter()
                .zip(row.iter())
                .map(|(c, value)| fit(value, c.width))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(Line::from(vec![Span::raw(indent.clone()), Span::raw(text)]));
        }
        lines
    }

    fn table_lines(&self, item: &T, is_selected: bool) -> Vec<Line<'static>> {
        let mut spans = Vec::new();
        for (i, (column, cell)) in T::columns().iter().zip(item.cells()).enumerate() {
            if i > 0 {
                spans.push(Span::styled(COLUMN_SEPARATOR, Styles::inactive_border()));
            }
            spans.extend(fit_spans(cell, column.width));
        }
        if self.is_expandable() {
            spans.push(Span::styled(COLUMN_SEPARATOR, Styles::inactive_border()));
            spans.push(Span::styled(fit(&self.toggle_text(item), TOGGLE_WIDTH), Styles::info()));
        }
        if is_selected {
            spans = spans
                .into_iter()
                .map(|s| {
                    let style = s.style.patch(Styles::selected());
                    Span::styled(s.content, style)
                })
                .collect();
        }

        let mut lines = vec![Line::from(spans)];
        if self.is_expanded(item.key()) {
            lines.extend(Self::detail_lines(item));
        }
        lines
    }

    fn card_lines(&self, item: &T, is_selected: bool) -> Vec<Line<'static>> {
        let marker = if is_selected {
            Span::styled("▌ ", Styles::title())
        } else {
            Span::raw("  ")
        };

        let mut lines: Vec<Line<'static>> = item
            .card()
            .into_iter()
            .map(|line| {
                let mut spans = vec![marker.clone()];
                spans.extend(line.spans);
                Line::from(spans)
            })
            .collect();

        if self.is_expandable() {
            lines.push(Line::from(vec![
                marker.clone(),
                Span::styled(self.toggle_text(item), Styles::info()),
            ]));
            if self.is_expanded(item.key()) {
                lines.extend(Self::detail_lines(item));
            }
        }
        lines.push(Line::from(""));
        lines
    }

    fn table_header(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, column) in T::columns().iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(COLUMN_SEPARATOR, Styles::inactive_border()));
            }
            spans.push(Span::styled(fit(column.title, column.width), Styles::title()));
        }
        if let Some(label) = T::detail_label() {
            spans.push(Span::styled(COLUMN_SEPARATOR, Styles::inactive_border()));
            spans.push(Span::styled(fit(label, TOGGLE_WIDTH), Styles::title()));
        }
        Line::from(spans)
    }

    /// Render the list in the layout `mode` asks for
    pub fn render(&mut self, f: &mut Frame, area: Rect, mode: LayoutMode) {
        self.item_hits.clear();
        self.toggle_hits.clear();

        let block = Block::default()
            .title(format!("{} ({})", self.title, self.items.len()))
            .borders(Borders::ALL)
            .border_style(Styles::active_border());
        let inner = block.inner(area);
        f.render_widget(block, area);

        if self.items.is_empty() {
            let empty = Paragraph::new(self.empty_message.as_str()).style(Styles::inactive());
            f.render_widget(empty, inner);
            return;
        }

        let mut list_area = inner;
        if mode == LayoutMode::Table && inner.height > 1 {
            let header_area = Rect { height: 1, ..inner };
            f.render_widget(Paragraph::new(self.table_header()), header_area);
            list_area = Rect {
                y: inner.y + 1,
                height: inner.height - 1,
                ..inner
            };
        }

        let rendered: Vec<Vec<Line<'static>>> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let is_selected = Some(i) == self.cursor;
                match mode {
                    LayoutMode::Table => self.table_lines(item, is_selected),
                    LayoutMode::Cards => self.card_lines(item, is_selected),
                }
            })
            .collect();

        // line within the item that carries the toggle
        let toggle_line = |item: &T| -> usize {
            match mode {
                LayoutMode::Table => 0,
                LayoutMode::Cards => item.card().len(),
            }
        };
        let heights: Vec<usize> = rendered.iter().map(|lines| lines.len()).collect();
        let toggle_offsets: Vec<usize> = self.items.iter().map(toggle_line).collect();

        let list_items: Vec<ListItem> = rendered
            .into_iter()
            .map(|lines| ListItem::new(Text::from(lines)))
            .collect();

        self.state.select(self.cursor);
        f.render_stateful_widget(List::new(list_items), list_area, &mut self.state);

        let bottom = list_area.y + list_area.height;
        let mut y = list_area.y;
        for index in self.state.offset()..self.items.len() {
            if y >= bottom {
                break;
            }
            let height = (heights[index] as u16).min(bottom - y);
            self.item_hits.push((
                Rect { x: list_area.x, y, width: list_area.width, height },
                index,
            ));

            let toggle_y = y + toggle_offsets[index] as u16;
            if self.is_expandable() && toggle_y < bottom {
                self.toggle_hits.push((
                    Rect { x: list_area.x, y: toggle_y, width: list_area.width, height: 1 },
                    index,
                ));
            }
            y += heights[index] as u16;
        }
    }
}

impl<T: ListRow> Navigable for ListDetailView<T> {
    fn navigate_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let selected = self.cursor.unwrap_or(0);
        self.cursor = Some(if selected == 0 {
            self.items.len() - 1
        } else {
            selected - 1
        });
    }

    fn navigate_down(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let selected = self.cursor.unwrap_or(0);
        self.cursor = Some((selected + 1) % self.items.len());
    }

    fn get_selected_index(&self) -> Option<usize> {
        self.cursor
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.cursor = index.filter(|i| *i < self.items.len());
    }

    fn get_item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[derive(Debug, Clone)]
    pub struct Row {
        pub id: &'static str,
        pub parts: usize,
    }

    impl ListRow for Row {
        fn key(&self) -> &str {
            self.id
        }

        fn columns() -> Vec<Column> {
            vec![Column::new("Ident", 8), Column::new("Parts", 6)]
        }

        fn cells(&self) -> Vec<Vec<Span<'static>>> {
            vec![vec![Span::raw(self.id)], vec![Span::raw(self.parts.to_string())]]
        }

        fn card(&self) -> Vec<Line<'static>> {
            vec![Line::from(format!("card {}", self.id))]
        }

        fn detail_label() -> Option<&'static str> {
            Some("Parts")
        }

        fn detail(&self) -> DetailTable {
            DetailTable {
                headers: vec![Column::new("Part", 6)],
                rows: (0..self.parts).map(|i| vec![format!("p{}", i)]).collect(),
            }
        }
    }

    pub fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    fn view() -> ListDetailView<Row> {
        let mut view = ListDetailView::new("Rows");
        view.set_items(vec![
            Row { id: "a", parts: 2 },
            Row { id: "b", parts: 0 },
            Row { id: "c", parts: 1 },
        ]);
        view
    }

    fn draw(view: &mut ListDetailView<Row>, width: u16, breakpoint: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 20)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                view.render(f, area, LayoutMode::for_width(area.width, breakpoint));
            })
            .unwrap();
        buffer_text(&terminal)
    }

    #[test]
    fn test_layout_mode_breakpoint() {
        assert_eq!(LayoutMode::for_width(99, 100), LayoutMode::Cards);
        assert_eq!(LayoutMode::for_width(100, 100), LayoutMode::Table);
        assert_eq!(LayoutMode::for_width(180, 100), LayoutMode::Table);
    }

    #[test]
    fn test_single_expansion_and_double_toggle() {
        let mut view = view();
        view.toggle("a");
        assert!(view.is_expanded("a"));

        view.toggle("c");
        assert!(view.is_expanded("c"));
        assert!(!view.is_expanded("a"));

        view.toggle("c");
        assert_eq!(view.expanded, None);
    }

    #[test]
    fn test_remove_clears_expansion_and_clamps_cursor() {
        let mut view = view();
        view.set_selected_index(Some(2));
        view.toggle("c");

        let removed = view.remove("c").unwrap();
        assert_eq!(removed.id, "c");
        assert_eq!(view.expanded, None);
        assert_eq!(view.cursor, Some(1));
        assert!(view.remove("zzz").is_none());
        assert_eq!(view.items.len(), 2);
    }

    #[test]
    fn test_table_and_card_rendering() {
        let mut view = view();
        let wide = draw(&mut view, 60, 50);
        assert!(wide.contains("Ident"));
        assert!(wide.contains("▶ 0 Parts"));
        assert!(!wide.contains("card a"));

        let narrow = draw(&mut view, 40, 50);
        assert!(narrow.contains("card a"));
        assert!(!narrow.contains("Ident"));
        assert!(narrow.contains("▶ 0 Parts"));
    }

    #[test]
    fn test_resize_keeps_expansion() {
        let mut view = view();
        view.toggle("a");

        let wide = draw(&mut view, 60, 50);
        assert!(wide.contains("▼ 2 Parts"));
        assert!(wide.contains("p1"));

        let narrow = draw(&mut view, 40, 50);
        assert!(view.is_expanded("a"));
        assert!(narrow.contains("▼ 2 Parts"));
        assert!(narrow.contains("p1"));
    }

    #[test]
    fn test_click_toggles_row() {
        let mut view = view();
        draw(&mut view, 60, 50);

        // border, header, then row "a" on line 2
        assert_eq!(view.click(5, 2), Some(ListClick::Toggled(0)));
        assert!(view.is_expanded("a"));

        draw(&mut view, 60, 50);
        assert_eq!(view.click(5, 2), Some(ListClick::Toggled(0)));
        assert_eq!(view.expanded, None);
        assert_eq!(view.click(5, 19), None);
    }

    #[test]
    fn test_empty_list_message() {
        let mut view: ListDetailView<Row> = ListDetailView::new("Rows").with_empty_message("No rows yet");
        let text = draw(&mut view, 60, 50);
        assert!(text.contains("No rows yet"));
        assert!(text.contains("Rows (0)"));
    }
}
