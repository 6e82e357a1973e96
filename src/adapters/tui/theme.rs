use ratatui::style::{Color, Modifier, Style};

use crate::domain::TaskStatus;
use crate::ports::Theme;

/// Colors for one display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub accent: Color,
    pub selection: Color,
    pub success: Color,
    pub error: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: Color::Rgb(255, 255, 255),
                text: Color::Rgb(31, 41, 55),
                muted: Color::Rgb(107, 114, 128),
                border: Color::Rgb(209, 213, 219),
                accent: Color::Rgb(59, 130, 246),
                selection: Color::Rgb(229, 231, 235),
                success: Color::Rgb(22, 101, 52),
                error: Color::Rgb(185, 28, 28),
            },
            Theme::Dark => Self {
                background: Color::Rgb(15, 23, 42),
                text: Color::Rgb(241, 245, 249),
                muted: Color::Rgb(148, 163, 184),
                border: Color::Rgb(51, 65, 85),
                accent: Color::Rgb(96, 165, 250),
                selection: Color::Rgb(30, 41, 59),
                success: Color::Rgb(16, 185, 129),
                error: Color::Rgb(248, 113, 113),
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.text).add_modifier(Modifier::BOLD)
    }

    pub fn status(&self, status: TaskStatus) -> Style {
        let color = match status.effective() {
            TaskStatus::InProgress => Color::Rgb(249, 115, 22),
            TaskStatus::Completed => Color::Rgb(22, 163, 74),
            _ => self.muted,
        };
        Style::default().fg(color)
    }
}
