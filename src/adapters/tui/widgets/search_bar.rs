use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::adapters::tui::theme::Palette;

pub struct SearchBar {
    query: String,
    // Position in chars, not bytes
    cursor_position: usize,
    is_focused: bool,
}

impl SearchBar {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            cursor_position: 0,
            is_focused: false,
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_index = self.byte_index();
        self.query.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        self.cursor_position -= 1;
        let byte_index = self.byte_index();
        self.query.remove(byte_index);
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.cursor_position = 0;
    }

    fn byte_index(&self) -> usize {
        self.query
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.query.len())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let title = if self.is_focused {
            " Search (Enter to apply, Esc to clear) "
        } else {
            " Search (press / to focus) "
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.border(self.is_focused));

        let (search_text, text_style) = if self.query.is_empty() {
            let hint = if self.is_focused {
                "Type to search by title or description..."
            } else {
                "Press / to search"
            };
            (hint, palette.muted())
        } else {
            (self.query.as_str(), Style::default().fg(palette.text))
        };

        let paragraph = Paragraph::new(search_text).block(block).style(text_style);
        frame.render_widget(paragraph, area);

        if self.is_focused {
            let cursor_x = area.x + 1 + self.cursor_position as u16;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor_position(ratatui::layout::Position {
                    x: cursor_x,
                    y: area.y + 1,
                });
            }
        }
    }
}
