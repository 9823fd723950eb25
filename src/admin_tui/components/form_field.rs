//! Form field component for operator input

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::admin_tui::{
    traits::FormHandler,
    ui::{rect_contains, Styles},
};

/// Type of form field
#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldType {
    Text,
    TextArea,
    /// Decimal number
    Number,
    /// Whole number
    Integer,
    Dropdown,
    Toggle,
    /// Path to a local file
    FilePath,
}

/// Individual form field
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub field_type: FormFieldType,
    pub is_focused: bool,
    /// Cursor position in characters
    pub cursor_position: usize,
    /// (value, label) pairs
    pub dropdown_options: Vec<(String, String)>,
    pub dropdown_state: ListState,
    pub show_dropdown: bool,
    pub checked: bool,
    pub required: bool,
    pub hidden: bool,
    pub validation_error: Option<String>,
}

impl FormField {
    pub fn new(label: &str, field_type: FormFieldType) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            placeholder: String::new(),
            field_type,
            is_focused: false,
            cursor_position: 0,
            dropdown_options: Vec::new(),
            dropdown_state: ListState::default(),
            show_dropdown: false,
            checked: false,
            required: false,
            hidden: false,
            validation_error: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self.cursor_position = value.chars().count();
        self
    }

    pub fn with_dropdown_options(mut self, options: Vec<(String, String)>) -> Self {
        self.set_dropdown_options(options);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Replace the options; the value is kept only if it is still offered
    pub fn set_dropdown_options(&mut self, options: Vec<(String, String)>) {
        self.dropdown_options = options;
        let position = self.dropdown_options.iter().position(|(v, _)| *v == self.value);
        if position.is_none() {
            self.value.clear();
        }
        // nothing is highlighted until an option is actually chosen
        self.dropdown_state.select(position);
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.is_focused = focused;
        self.show_dropdown = focused && self.field_type == FormFieldType::Dropdown;
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn accepts_text(&self) -> bool {
        !matches!(self.field_type, FormFieldType::Dropdown | FormFieldType::Toggle)
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.accepts_text() {
            return;
        }
        let at = self.byte_index();
        self.value.insert(at, c);
        self.cursor_position += 1;
        self.validation_error = None;
    }

    pub fn delete_char(&mut self) {
        if !self.accepts_text() || self.cursor_position == 0 {
            return;
        }
        self.cursor_position -= 1;
        let at = self.byte_index();
        self.value.remove(at);
        self.validation_error = None;
    }

    pub fn delete_char_forward(&mut self) {
        if !self.accepts_text() || self.cursor_position >= self.value.chars().count() {
            return;
        }
        let at = self.byte_index();
        self.value.remove(at);
        self.validation_error = None;
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.value.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
        self.checked = false;
        self.validation_error = None;
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn toggle(&mut self) {
        if self.field_type == FormFieldType::Toggle {
            self.checked = !self.checked;
        }
    }

    /// Handle dropdown navigation
    pub fn dropdown_up(&mut self) {
        if self.dropdown_options.is_empty() {
            return;
        }
        let new_selected = match self.dropdown_state.selected() {
            Some(0) | None => self.dropdown_options.len() - 1,
            Some(selected) => selected - 1,
        };
        self.dropdown_state.select(Some(new_selected));
        self.select_dropdown_value();
    }

    pub fn dropdown_down(&mut self) {
        if self.dropdown_options.is_empty() {
            return;
        }
        let new_selected = match self.dropdown_state.selected() {
            Some(selected) => (selected + 1) % self.dropdown_options.len(),
            None => 0,
        };
        self.dropdown_state.select(Some(new_selected));
        self.select_dropdown_value();
    }

    pub fn select_dropdown_value(&mut self) {
        if let Some(selected) = self.dropdown_state.selected() {
            if let Some((value, _)) = self.dropdown_options.get(selected) {
                self.value = value.clone();
                self.cursor_position = self.value.chars().count();
                self.validation_error = None;
            }
        }
    }

    /// Label of the chosen dropdown option
    pub fn selected_label(&self) -> Option<&str> {
        self.dropdown_options
            .iter()
            .find(|(value, _)| *value == self.value)
            .map(|(_, label)| label.as_str())
    }

    pub fn height(&self) -> u16 {
        match self.field_type {
            FormFieldType::TextArea => 6,
            _ => 3,
        }
    }

    fn display_text(&self) -> (String, Style) {
        match self.field_type {
            FormFieldType::Toggle => {
                let mark = if self.checked { "[x] Yes" } else { "[ ] No" };
                (mark.to_string(), Styles::default())
            }
            FormFieldType::Dropdown => match self.selected_label() {
                Some(label) => (label.to_string(), Styles::default()),
                None => (self.placeholder.clone(), Styles::inactive()),
            },
            _ if self.value.is_empty() && !self.placeholder.is_empty() => {
                (self.placeholder.clone(), Styles::inactive())
            }
            _ => (self.value.clone(), Styles::default()),
        }
    }

    /// Render the form field
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let border_style = if self.is_focused {
            Styles::active_border()
        } else if self.validation_error.is_some() {
            Styles::error()
        } else {
            Styles::inactive_border()
        };

        let label = if self.required {
            format!("{} *", self.label)
        } else {
            self.label.clone()
        };
        let title = if let Some(ref error) = self.validation_error {
            format!("{} - {}", label, error)
        } else {
            label
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let (text, text_style) = self.display_text();
        let mut paragraph = Paragraph::new(text).style(text_style).block(block);
        if self.field_type == FormFieldType::TextArea {
            paragraph = paragraph.wrap(Wrap { trim: false });
        }
        f.render_widget(paragraph, area);

        if self.is_focused && self.accepts_text() {
            let before: String = self.value.chars().take(self.cursor_position).collect();
            let line = before.matches('\n').count() as u16;
            let column = before.rsplit('\n').next().unwrap_or("").width() as u16;
            let cursor_x = area.x + 1 + column;
            let cursor_y = area.y + 1 + line;
            if cursor_x < area.x + area.width.saturating_sub(1)
                && cursor_y < area.y + area.height.saturating_sub(1)
            {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }

    /// Render the option list below the field while it has focus
    pub fn render_dropdown(&mut self, f: &mut Frame, field_area: Rect, bounds: Rect) {
        if !self.show_dropdown || self.dropdown_options.is_empty() {
            return;
        }

        let below = field_area.y + field_area.height;
        let bottom = bounds.y + bounds.height;
        if below >= bottom {
            return;
        }
        let height = (self.dropdown_options.len() as u16 + 2).min(bottom - below);
        let area = Rect {
            x: field_area.x,
            y: below,
            width: field_area.width,
            height,
        };

        let items: Vec<ListItem> = self
            .dropdown_options
            .iter()
            .enumerate()
            .map(|(i, (_, label))| {
                let style = if Some(i) == self.dropdown_state.selected() {
                    Styles::selected()
                } else {
                    Style::default()
                };
                ListItem::new(label.clone()).style(style)
            })
            .collect();

        let block = Block::default()
            .title("Options (↑/↓)")
            .borders(Borders::ALL)
            .border_style(Styles::active_border());

        f.render_widget(Clear, area);
        f.render_stateful_widget(List::new(items).block(block), area, &mut self.dropdown_state);
    }

    /// Validate field value
    pub fn validate(&mut self) -> bool {
        self.validation_error = None;
        if self.hidden {
            return true;
        }

        let value = self.value.trim();
        if self.required && value.is_empty() && self.field_type != FormFieldType::Toggle {
            self.validation_error = Some("Required".to_string());
            return false;
        }
        if value.is_empty() {
            return true;
        }

        let error = match self.field_type {
            FormFieldType::Number if value.parse::<f64>().map_or(true, |n| !n.is_finite()) => {
                Some("Must be a number")
            }
            FormFieldType::Integer if value.parse::<i64>().is_err() => Some("Must be a whole number"),
            FormFieldType::FilePath if !Path::new(value).is_file() => Some("File not found"),
            _ => None,
        };
        self.validation_error = error.map(str::to_string);
        error.is_none()
    }
}

/// Outcome of a key handled by a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    Handled,
    Submit,
    Cancel,
    Unhandled,
}

/// Form container that manages multiple fields
pub struct Form {
    pub fields: Vec<FormField>,
    pub current_field: usize,
    field_areas: Vec<(Rect, usize)>,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        let mut form = Self {
            fields,
            current_field: 0,
            field_areas: Vec::new(),
        };
        form.update_focus();
        form
    }

    fn update_focus(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.set_focus(i == self.current_field);
        }
    }

    pub fn get_field(&self, index: usize) -> Option<&FormField> {
        self.fields.get(index)
    }

    pub fn get_field_mut(&mut self, index: usize) -> Option<&mut FormField> {
        self.fields.get_mut(index)
    }

    pub fn get_current_field(&self) -> Option<&FormField> {
        self.fields.get(self.current_field)
    }

    pub fn get_current_field_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.current_field)
    }

    /// Trimmed value of the field at `index`
    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.trim()).unwrap_or("")
    }

    pub fn set_hidden(&mut self, index: usize, hidden: bool) {
        if let Some(field) = self.fields.get_mut(index) {
            field.hidden = hidden;
            if hidden {
                field.validation_error = None;
            }
        }
        if hidden && index == self.current_field {
            self.next_field();
        }
    }

    pub fn insert_field(&mut self, index: usize, field: FormField) {
        let index = index.min(self.fields.len());
        self.fields.insert(index, field);
        if index <= self.current_field && self.fields.len() > 1 {
            self.current_field += 1;
        }
        self.update_focus();
    }

    pub fn remove_field(&mut self, index: usize) -> Option<FormField> {
        if index >= self.fields.len() {
            return None;
        }
        let removed = self.fields.remove(index);
        if self.current_field > index || self.current_field >= self.fields.len() {
            self.current_field = self.current_field.saturating_sub(1);
        }
        self.update_focus();
        Some(removed)
    }

    /// Validate all visible fields
    pub fn validate_all(&mut self) -> bool {
        let mut all_valid = true;
        for field in &mut self.fields {
            if !field.validate() {
                all_valid = false;
            }
        }
        all_valid
    }

    /// Route a key press to the focused field
    pub fn handle_key(&mut self, key: KeyEvent) -> FormInput {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let field_type = match self.get_current_field() {
            Some(field) => field.field_type.clone(),
            None => return FormInput::Unhandled,
        };

        match key.code {
            KeyCode::Esc => FormInput::Cancel,
            KeyCode::Char('s') if ctrl => FormInput::Submit,
            _ if ctrl => FormInput::Unhandled,
            KeyCode::Tab => {
                self.next_field();
                FormInput::Handled
            }
            KeyCode::BackTab => {
                self.previous_field();
                FormInput::Handled
            }
            KeyCode::Enter if field_type == FormFieldType::TextArea => {
                self.handle_char_input('\n');
                FormInput::Handled
            }
            KeyCode::Enter => FormInput::Submit,
            KeyCode::Up if field_type == FormFieldType::Dropdown => {
                if let Some(field) = self.get_current_field_mut() {
                    field.dropdown_up();
                }
                FormInput::Handled
            }
            KeyCode::Down if field_type == FormFieldType::Dropdown => {
                if let Some(field) = self.get_current_field_mut() {
                    field.dropdown_down();
                }
                FormInput::Handled
            }
            KeyCode::Up => {
                self.previous_field();
                FormInput::Handled
            }
            KeyCode::Down => {
                self.next_field();
                FormInput::Handled
            }
            KeyCode::Char(' ') if field_type == FormFieldType::Toggle => {
                if let Some(field) = self.get_current_field_mut() {
                    field.toggle();
                }
                FormInput::Handled
            }
            KeyCode::Char(c) => {
                self.handle_char_input(c);
                FormInput::Handled
            }
            KeyCode::Backspace => {
                self.handle_backspace();
                FormInput::Handled
            }
            KeyCode::Delete => {
                self.handle_delete();
                FormInput::Handled
            }
            KeyCode::Left => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_left();
                }
                FormInput::Handled
            }
            KeyCode::Right => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_right();
                }
                FormInput::Handled
            }
            KeyCode::Home => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_to_start();
                }
                FormInput::Handled
            }
            KeyCode::End => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_to_end();
                }
                FormInput::Handled
            }
            _ => FormInput::Unhandled,
        }
    }

    /// Focus the field under the pointer; a click on a toggle also flips it
    pub fn click(&mut self, column: u16, row: u16) -> bool {
        let Some(&(_, index)) = self
            .field_areas
            .iter()
            .find(|(area, _)| rect_contains(*area, column, row))
        else {
            return false;
        };
        self.set_current_field(index);
        if let Some(field) = self.get_current_field_mut() {
            field.toggle();
        }
        true
    }

    /// Render the visible fields top to bottom, scrolled so the focused one shows
    pub fn render(&mut self, f: &mut Frame, area: Rect) {
        self.field_areas.clear();

        let visible: Vec<usize> = (0..self.fields.len())
            .filter(|i| !self.fields[*i].hidden)
            .collect();

        // drop fields off the top until the focused one fits
        let mut first = 0;
        if let Some(focus_pos) = visible.iter().position(|i| *i == self.current_field) {
            let mut used: u16 = visible[..=focus_pos]
                .iter()
                .map(|i| self.fields[*i].height())
                .sum();
            while used > area.height && first < focus_pos {
                used -= self.fields[visible[first]].height();
                first += 1;
            }
        }

        let bottom = area.y + area.height;
        let mut y = area.y;
        for &index in &visible[first..] {
            let height = self.fields[index].height();
            if y + height > bottom {
                break;
            }
            let field_area = Rect {
                x: area.x,
                y,
                width: area.width,
                height,
            };
            self.fields[index].render(f, field_area);
            self.field_areas.push((field_area, index));
            y += height;
        }

        if let Some(&(field_area, index)) = self
            .field_areas
            .iter()
            .find(|(_, index)| *index == self.current_field)
        {
            self.fields[index].render_dropdown(f, field_area, area);
        }
    }
}

impl FormHandler for Form {
    fn get_current_field(&self) -> usize {
        self.current_field
    }

    fn set_current_field(&mut self, field: usize) {
        if field < self.fields.len() {
            self.current_field = field;
            self.update_focus();
        }
    }

    fn get_field_count(&self) -> usize {
        self.fields.len()
    }

    fn is_focusable(&self, index: usize) -> bool {
        self.fields.get(index).map(|f| !f.hidden).unwrap_or(false)
    }

    fn handle_char_input(&mut self, c: char) {
        if let Some(field) = self.get_current_field_mut() {
            field.insert_char(c);
        }
    }

    fn handle_backspace(&mut self) {
        if let Some(field) = self.get_current_field_mut() {
            field.delete_char();
        }
    }

    fn handle_delete(&mut self) {
        if let Some(field) = self.get_current_field_mut() {
            field.delete_char_forward();
        }
    }

    fn validate(&mut self) -> Result<(), String> {
        self.validate_all();
        for field in &self.fields {
            if let Some(ref error) = field.validation_error {
                return Err(format!("{}: {}", field.label, error));
            }
        }
        Ok(())
    }
}
