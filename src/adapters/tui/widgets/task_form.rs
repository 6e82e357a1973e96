use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use crate::adapters::tui::theme::Palette;
use crate::domain::{Task, TaskDraft, TaskId, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Status,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Status,
            FormField::Status => FormField::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            FormField::Title => FormField::Status,
            FormField::Description => FormField::Title,
            FormField::Status => FormField::Description,
        }
    }
}

/// Create/edit form state. Stays open with `error` set when a submit fails.
#[derive(Debug, Clone)]
pub struct TaskForm {
    mode: FormMode,
    title: String,
    description: String,
    status: TaskStatus,
    focused: FormField,
    error: Option<String>,
}

impl TaskForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Todo,
            focused: FormField::Title,
            error: None,
        }
    }

    pub fn edit(task: &Task) -> Self {
        let draft = TaskDraft::from_task(task);
        Self {
            mode: FormMode::Edit(task.id.clone()),
            title: draft.title,
            description: draft.description,
            status: draft.status,
            focused: FormField::Title,
            error: None,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn focused(&self) -> FormField {
        self.focused
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn focus_next(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn focus_previous(&mut self) {
        self.focused = self.focused.previous();
    }

    pub fn insert_char(&mut self, c: char) {
        self.error = None;
        match self.focused {
            FormField::Title => self.title.push(c),
            FormField::Description => self.description.push(c),
            FormField::Status if c == ' ' => self.status = self.status.next(),
            FormField::Status => {}
        }
    }

    pub fn delete_char(&mut self) {
        self.error = None;
        match self.focused {
            FormField::Title => {
                self.title.pop();
            }
            FormField::Description => {
                self.description.pop();
            }
            FormField::Status => {}
        }
    }

    pub fn cycle_status(&mut self, forward: bool) {
        self.error = None;
        self.status = if forward {
            self.status.next()
        } else {
            self.status.previous()
        };
    }

    pub fn draft(&self) -> TaskDraft {
        TaskDraft::new(self.title.clone(), self.description.clone(), self.status)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let heading = match &self.mode {
            FormMode::Create => " New Task ",
            FormMode::Edit(_) => " Edit Task ",
        };

        let block = Block::default()
            .title(heading)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(palette.border(true))
            .style(palette.base());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Min(3),    // Description
                Constraint::Length(3), // Status
                Constraint::Length(2), // Error
                Constraint::Length(1), // Hints
            ])
            .split(inner);

        self.render_field(frame, chunks[0], FormField::Title, "Title *", &self.title, palette);
        self.render_field(
            frame,
            chunks[1],
            FormField::Description,
            "Description",
            &self.description,
            palette,
        );

        let status_line = Line::from(
            TaskStatus::ALL
                .iter()
                .flat_map(|status| {
                    let style = if *status == self.status {
                        palette.status(*status).add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    } else {
                        palette.muted()
                    };
                    [
                        Span::styled(format!(" {} {} ", status.icon(), status.label()), style),
                        Span::raw(" "),
                    ]
                })
                .collect::<Vec<_>>(),
        );
        let status_block = Block::default()
            .title(" Status (←/→) ")
            .borders(Borders::ALL)
            .border_style(palette.border(self.focused == FormField::Status));
        frame.render_widget(Paragraph::new(status_line).block(status_block), chunks[2]);

        if let Some(error) = &self.error {
            let paragraph = Paragraph::new(error.as_str())
                .style(Style::default().fg(palette.error))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, chunks[3]);
        }

        let hints = Paragraph::new("Tab: next field | Enter: save | Esc: cancel").style(palette.muted());
        frame.render_widget(hints, chunks[4]);
    }

    fn render_field(
        &self,
        frame: &mut Frame,
        area: Rect,
        field: FormField,
        label: &str,
        value: &str,
        palette: &Palette,
    ) {
        let focused = self.focused == field;
        let block = Block::default()
            .title(format!(" {label} "))
            .borders(Borders::ALL)
            .border_style(palette.border(focused));

        let paragraph = Paragraph::new(value)
            .block(block)
            .style(Style::default().fg(palette.text))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);

        if focused && field == FormField::Title {
            let cursor_x = area.x + 1 + value.chars().count() as u16;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor_position(ratatui::layout::Position {
                    x: cursor_x,
                    y: area.y + 1,
                });
            }
        }
    }
}
