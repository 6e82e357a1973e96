use color_eyre::Result;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    prelude::*,
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{
    event::{AppEvent, EventHandler},
    theme::Palette,
    widgets::{FormField, FormMode, SearchBar, TaskForm},
};
use crate::application::{AppError, Notification, NotificationLevel, TaskStore};
use crate::domain::*;
use crate::ports::{AppConfig, ConfigStore};

const TOAST_TTL: Duration = Duration::from_secs(4);

pub enum Screen {
    Dashboard,
    Detail(Task),
    Form(TaskForm),
    ConfirmDelete { task: Task, return_to_detail: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScreenKind {
    Dashboard,
    Detail,
    Form,
    ConfirmDelete,
}

pub struct App {
    store: Arc<TaskStore>,
    config_store: Arc<dyn ConfigStore>,
    config: AppConfig,
    palette: Palette,

    // Navigation
    screen: Screen,
    show_help: bool,

    // Filters
    search_bar: SearchBar,
    status_filter: StatusFilter,

    // Task list
    visible_tasks: Vec<Task>,
    counts: TaskCounts,
    task_list_state: TableState,

    // Loading states
    is_loading: bool,
    error_message: Option<String>,
    needs_reload: bool,

    toast: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(store: Arc<TaskStore>, config_store: Arc<dyn ConfigStore>, config: AppConfig) -> Self {
        let palette = Palette::for_theme(config.theme);
        Self {
            store,
            config_store,
            config,
            palette,
            screen: Screen::Dashboard,
            show_help: false,
            search_bar: SearchBar::new(),
            status_filter: StatusFilter::All,
            visible_tasks: Vec::new(),
            counts: TaskCounts::default(),
            task_list_state: TableState::default(),
            is_loading: false,
            error_message: None,
            // Load on startup
            needs_reload: true,
            toast: None,
        }
    }

    pub fn needs_reload(&self) -> bool {
        self.needs_reload
    }

    /// Show the loading placeholder before the next draw.
    pub fn mark_loading(&mut self) {
        self.is_loading = true;
        self.error_message = None;
    }

    pub async fn reload(&mut self) {
        self.needs_reload = false;
        self.store.load().await;
        self.pull_notifications().await;
        self.refresh_view().await;
    }

    fn screen_kind(&self) -> ScreenKind {
        match self.screen {
            Screen::Dashboard => ScreenKind::Dashboard,
            Screen::Detail(_) => ScreenKind::Detail,
            Screen::Form(_) => ScreenKind::Form,
            Screen::ConfirmDelete { .. } => ScreenKind::ConfirmDelete,
        }
    }

    fn current_filter(&self) -> TaskFilter {
        TaskFilter::new(self.search_bar.query(), self.status_filter)
    }

    /// Recompute the visible rows and counts from the store.
    async fn refresh_view(&mut self) {
        self.is_loading = self.store.is_loading().await;
        self.error_message = self.store.error().await;
        self.visible_tasks = self.store.filtered(&self.current_filter()).await;
        self.counts = self.store.counts().await;

        let len = self.visible_tasks.len();
        match self.task_list_state.selected() {
            _ if len == 0 => self.task_list_state.select(None),
            None => self.task_list_state.select(Some(0)),
            Some(selected) if selected >= len => self.task_list_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }

    async fn pull_notifications(&mut self) {
        if let Some(latest) = self.store.take_notifications().await.pop() {
            self.toast = Some((latest, Instant::now()));
        }
    }

    fn expire_toast(&mut self) {
        if let Some((_, shown_at)) = &self.toast {
            if shown_at.elapsed() >= TOAST_TTL {
                self.toast = None;
            }
        }
    }

    fn selected_task(&self) -> Option<&Task> {
        self.task_list_state
            .selected()
            .and_then(|i| self.visible_tasks.get(i))
    }

    fn select_task(&mut self, id: &TaskId) {
        if let Some(index) = self.visible_tasks.iter().position(|t| &t.id == id) {
            self.task_list_state.select(Some(index));
        }
    }

    /// Returns `true` when the application should exit.
    pub async fn handle_event(&mut self, event: AppEvent) -> Result<bool> {
        match event {
            AppEvent::Quit => return Ok(true),
            AppEvent::Tick => {
                self.expire_toast();
                return Ok(false);
            }
            _ => {}
        }

        if self.show_help {
            self.show_help = false;
            return Ok(false);
        }

        match self.screen_kind() {
            ScreenKind::Dashboard => return Ok(self.handle_dashboard_event(event).await),
            ScreenKind::Detail => return Ok(self.handle_detail_event(event).await),
            ScreenKind::Form => self.handle_form_event(event).await,
            ScreenKind::ConfirmDelete => self.handle_confirm_event(event).await,
        }

        Ok(false)
    }

    async fn handle_dashboard_event(&mut self, event: AppEvent) -> bool {
        if self.search_bar.is_focused() {
            match event {
                AppEvent::Character(c) => {
                    self.search_bar.insert_char(c);
                    self.refresh_view().await;
                }
                AppEvent::Backspace => {
                    self.search_bar.delete_char();
                    self.refresh_view().await;
                }
                AppEvent::Escape => {
                    self.search_bar.clear();
                    self.search_bar.set_focused(false);
                    self.refresh_view().await;
                }
                AppEvent::Enter | AppEvent::Tab | AppEvent::Down => {
                    self.search_bar.set_focused(false);
                }
                _ => {}
            }
            return false;
        }

        match event {
            AppEvent::Character('q') => return true,
            AppEvent::Character('/') => self.search_bar.set_focused(true),
            AppEvent::Character('?') => self.show_help = true,
            AppEvent::Tab | AppEvent::BackTab | AppEvent::Character('f') => {
                self.status_filter = self.status_filter.cycle();
                self.refresh_view().await;
            }
            AppEvent::Character(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.status_filter = StatusFilter::CYCLE[index];
                self.refresh_view().await;
            }
            AppEvent::Down | AppEvent::Character('j') => self.next_task(),
            AppEvent::Up | AppEvent::Character('k') => self.previous_task(),
            AppEvent::Home | AppEvent::Character('g') => {
                if !self.visible_tasks.is_empty() {
                    self.task_list_state.select(Some(0));
                }
            }
            AppEvent::End | AppEvent::Character('G') => {
                if !self.visible_tasks.is_empty() {
                    self.task_list_state.select(Some(self.visible_tasks.len() - 1));
                }
            }
            AppEvent::Enter => {
                if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
                    self.open_detail(&id).await;
                }
            }
            AppEvent::Character('n') => self.screen = Screen::Form(TaskForm::create()),
            AppEvent::Character('e') => {
                if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
                    self.open_edit(&id).await;
                }
            }
            AppEvent::Character('d') => {
                if let Some(task) = self.selected_task().cloned() {
                    self.screen = Screen::ConfirmDelete {
                        task,
                        return_to_detail: false,
                    };
                }
            }
            AppEvent::Character('r') => self.needs_reload = true,
            AppEvent::Character('t') => self.toggle_theme().await,
            AppEvent::Escape => {
                if !self.search_bar.query().is_empty() {
                    self.search_bar.clear();
                    self.refresh_view().await;
                }
            }
            _ => {}
        }

        false
    }

    async fn handle_detail_event(&mut self, event: AppEvent) -> bool {
        let Screen::Detail(task) = &self.screen else {
            return false;
        };
        let task = task.clone();

        match event {
            AppEvent::Escape | AppEvent::Backspace | AppEvent::Character('q') => {
                self.screen = Screen::Dashboard;
            }
            AppEvent::Character('e') => self.open_edit(&task.id).await,
            AppEvent::Character('d') => {
                self.screen = Screen::ConfirmDelete {
                    task,
                    return_to_detail: true,
                };
            }
            AppEvent::Character('?') => self.show_help = true,
            _ => {}
        }

        false
    }

    async fn handle_form_event(&mut self, event: AppEvent) {
        let Screen::Form(form) = &mut self.screen else {
            return;
        };

        match event {
            AppEvent::Escape => self.screen = Screen::Dashboard,
            AppEvent::Tab | AppEvent::Down => form.focus_next(),
            AppEvent::BackTab | AppEvent::Up => form.focus_previous(),
            AppEvent::Left if form.focused() == FormField::Status => form.cycle_status(false),
            AppEvent::Right if form.focused() == FormField::Status => form.cycle_status(true),
            AppEvent::Character(c) => form.insert_char(c),
            AppEvent::Backspace => form.delete_char(),
            AppEvent::Enter => {
                let mode = form.mode().clone();
                let draft = form.draft();
                self.submit_form(mode, draft).await;
            }
            _ => {}
        }
    }

    async fn handle_confirm_event(&mut self, event: AppEvent) {
        let Screen::ConfirmDelete {
            task,
            return_to_detail,
        } = &self.screen
        else {
            return;
        };
        let (task, return_to_detail) = (task.clone(), *return_to_detail);

        match event {
            AppEvent::Character('y') | AppEvent::Character('Y') | AppEvent::Enter => {
                let result = self.store.remove(&task.id).await;
                self.pull_notifications().await;
                self.screen = match result {
                    Ok(()) => Screen::Dashboard,
                    Err(_) if return_to_detail => Screen::Detail(task),
                    Err(_) => Screen::Dashboard,
                };
                self.refresh_view().await;
            }
            AppEvent::Character('n') | AppEvent::Character('q') | AppEvent::Escape => {
                self.screen = if return_to_detail {
                    Screen::Detail(task)
                } else {
                    Screen::Dashboard
                };
            }
            _ => {}
        }
    }

    async fn open_detail(&mut self, id: &TaskId) {
        let result = self.store.get_by_id(id).await;
        self.pull_notifications().await;
        if let Ok(task) = result {
            self.screen = Screen::Detail(task);
        }
    }

    async fn open_edit(&mut self, id: &TaskId) {
        let result = self.store.get_by_id(id).await;
        self.pull_notifications().await;
        if let Ok(task) = result {
            self.screen = Screen::Form(TaskForm::edit(&task));
        }
    }

    async fn submit_form(&mut self, mode: FormMode, draft: TaskDraft) {
        if let Err(err) = draft.validate() {
            if let Screen::Form(form) = &mut self.screen {
                form.set_error(AppError::from(err).user_message());
            }
            return;
        }

        let result = match &mode {
            FormMode::Create => self.store.create(&draft).await,
            FormMode::Edit(id) => self.store.update(id, &draft).await,
        };
        self.pull_notifications().await;

        match result {
            Ok(task) => {
                self.screen = Screen::Dashboard;
                self.refresh_view().await;
                self.select_task(&task.id);
            }
            Err(err) => {
                if let Screen::Form(form) = &mut self.screen {
                    form.set_error(err.user_message());
                }
            }
        }
    }

    async fn toggle_theme(&mut self) {
        self.config.theme = self.config.theme.toggled();
        self.palette = Palette::for_theme(self.config.theme);

        if let Err(e) = self.config_store.save_config(&self.config).await {
            tracing::warn!("Failed to save theme preference: {}", e);
            self.toast = Some((
                Notification {
                    level: NotificationLevel::Error,
                    message: format!("Could not save theme: {e}"),
                },
                Instant::now(),
            ));
        }
    }

    fn next_task(&mut self) {
        if self.visible_tasks.is_empty() {
            return;
        }

        let current = self.task_list_state.selected().unwrap_or(0);
        let next = if current >= self.visible_tasks.len() - 1 {
            0
        } else {
            current + 1
        };
        self.task_list_state.select(Some(next));
    }

    fn previous_task(&mut self) {
        if self.visible_tasks.is_empty() {
            return;
        }

        let current = self.task_list_state.selected().unwrap_or(0);
        let previous = if current == 0 {
            self.visible_tasks.len() - 1
        } else {
            current - 1
        };
        self.task_list_state.select(Some(previous));
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(self.palette.base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Length(3), // Search bar
                Constraint::Length(1), // Status filter tabs
                Constraint::Min(0),    // Task list
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        self.search_bar.render(frame, chunks[1], &self.palette);
        self.render_filter_tabs(frame, chunks[2]);
        self.render_task_list(frame, chunks[3]);
        self.render_status_bar(frame, chunks[4]);

        match &self.screen {
            Screen::Dashboard => {}
            Screen::Detail(task) => self.render_detail(frame, task),
            Screen::Form(form) => {
                let popup_area = Self::centered_rect(70, 70, area);
                frame.render_widget(Clear, popup_area);
                form.render(frame, popup_area, &self.palette);
            }
            Screen::ConfirmDelete { task, .. } => self.render_confirm_delete(frame, task),
        }

        if self.show_help {
            self.render_help(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let header = Line::from(vec![
            Span::styled(" 📋 Task Board ", self.palette.title()),
            Span::styled(format!("  {}", self.config.api_base_url), self.palette.muted()),
        ]);
        frame.render_widget(Paragraph::new(header), area);
    }

    fn render_filter_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = StatusFilter::CYCLE
            .iter()
            .enumerate()
            .map(|(i, filter)| {
                Line::from(format!(
                    " {} {} ({}) ",
                    i + 1,
                    filter.label(),
                    self.counts.count_for(*filter)
                ))
            })
            .collect();
        let selected = StatusFilter::CYCLE
            .iter()
            .position(|f| *f == self.status_filter)
            .unwrap_or(0);

        let tabs = Tabs::new(titles)
            .select(selected)
            .style(self.palette.muted())
            .highlight_style(
                Style::default()
                    .fg(self.palette.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .divider("|");
        frame.render_widget(tabs, area);
    }

    fn render_task_list(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!(" Tasks ({}) ", self.visible_tasks.len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.palette.border(!self.search_bar.is_focused()));

        if self.is_loading {
            let paragraph = Paragraph::new("Loading tasks...")
                .block(block)
                .style(self.palette.muted());
            frame.render_widget(paragraph, area);
            return;
        }

        if let Some(error) = &self.error_message {
            let paragraph = Paragraph::new(format!("{error}\n\nPress r to retry."))
                .block(block)
                .style(Style::default().fg(self.palette.error));
            frame.render_widget(paragraph, area);
            return;
        }

        if self.visible_tasks.is_empty() {
            let message = if self.counts.all == 0 {
                "No tasks yet. Press n to create one."
            } else {
                "No tasks match your search or filter"
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .style(self.palette.muted());
            frame.render_widget(paragraph, area);
            return;
        }

        let rows: Vec<Row> = self
            .visible_tasks
            .iter()
            .map(|task| {
                let status_style = self.palette.status(task.status);
                Row::new(vec![
                    Cell::from(task.status.icon()).style(status_style),
                    Cell::from(task.title.as_str()),
                    Cell::from(task.status.label()).style(status_style),
                    Cell::from(task.created_display()).style(self.palette.muted()),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(2),  // Status icon
                Constraint::Min(20),    // Title column (flexible)
                Constraint::Length(12), // Status label
                Constraint::Length(13), // Created date
            ],
        )
        .header(
            Row::new(vec!["", "Title", "Status", "Created"]).style(self.palette.muted()),
        )
        .block(block)
        .highlight_style(Style::default().bg(self.palette.selection))
        .highlight_symbol("▶ ");

        frame.render_stateful_widget(table, area, &mut self.task_list_state);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some((toast, _)) = &self.toast {
            let color = match toast.level {
                NotificationLevel::Success => self.palette.success,
                NotificationLevel::Error => self.palette.error,
            };
            let paragraph = Paragraph::new(toast.message.as_str()).style(Style::default().fg(color));
            frame.render_widget(paragraph, area);
            return;
        }

        let help_text = match self.screen {
            Screen::Dashboard if self.search_bar.is_focused() => {
                "Type to search | Enter: done | Esc: clear search"
            }
            Screen::Dashboard => {
                "j/k: navigate | Enter: view | n: new | e: edit | d: delete | Tab: filter | /: search | ?: help | q: quit"
            }
            Screen::Detail(_) => "e: edit | d: delete | Esc: back",
            Screen::Form(_) => "Tab: next field | ←/→: status | Enter: save | Esc: cancel",
            Screen::ConfirmDelete { .. } => "y: delete | n: cancel",
        };

        let paragraph = Paragraph::new(help_text).style(self.palette.muted());
        frame.render_widget(paragraph, area);
    }

    fn render_detail(&self, frame: &mut Frame, task: &Task) {
        let popup_area = Self::centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, popup_area);

        let status_style = self.palette.status(task.status);
        let mut lines = vec![
            Line::from(Span::styled(task.title.as_str(), self.palette.title())),
            Line::from(Span::styled(
                format!("{} {}", task.status.icon(), task.status.label()),
                status_style,
            )),
            Line::from(""),
        ];

        match task.description.as_deref().filter(|d| !d.trim().is_empty()) {
            Some(description) => {
                lines.extend(description.lines().map(|l| Line::from(l.to_string())));
            }
            None => lines.push(Line::from(Span::styled("No description", self.palette.muted()))),
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Created:      ", self.palette.muted()),
            Span::raw(Task::timestamp_display(&task.created_at)),
        ]));
        if let (true, Some(updated_at)) = (task.was_updated(), task.updated_at.as_ref()) {
            lines.push(Line::from(vec![
                Span::styled("Last updated: ", self.palette.muted()),
                Span::raw(Task::timestamp_display(updated_at)),
            ]));
        }
        lines.push(Line::from(Span::styled(
            format!("ID: {}", task.id),
            self.palette.muted(),
        )));

        let block = Block::default()
            .title(" Task Details ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.palette.border(true))
            .style(self.palette.base());

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup_area);
    }

    fn render_confirm_delete(&self, frame: &mut Frame, task: &Task) {
        let popup_area = Self::centered_rect(50, 25, frame.area());
        frame.render_widget(Clear, popup_area);

        let lines = vec![
            Line::from(format!("Delete \"{}\"?", task.title)),
            Line::from(""),
            Line::from(Span::styled("This cannot be undone.", self.palette.muted())),
            Line::from(""),
            Line::from(Span::styled(
                "y: delete | n: cancel",
                Style::default().fg(self.palette.error),
            )),
        ];

        let block = Block::default()
            .title(" Confirm Delete ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.palette.error))
            .style(self.palette.base());

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            popup_area,
        );
    }

    fn render_help(&self, frame: &mut Frame) {
        let popup_area = Self::centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            "Task Board Help",
            "",
            "Dashboard:",
            "  j/k or ↑/↓     - Move up/down in task list",
            "  g/G            - Go to first/last task",
            "  Enter          - View task details",
            "  /              - Focus search (title and description)",
            "  Tab or 1-4     - Change status filter",
            "",
            "Task Actions:",
            "  n              - New task",
            "  e              - Edit selected task",
            "  d              - Delete selected task",
            "  r              - Reload tasks from the server",
            "",
            "General:",
            "  t              - Toggle light/dark theme",
            "  ?              - Show this help",
            "  q              - Quit / close",
            "  Ctrl+C         - Force quit application",
            "",
            "Press any key to close this help",
        ]
        .join("\n");

        let paragraph = Paragraph::new(help_text)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .style(self.palette.base()),
            )
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
        let popup_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(r);

        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(popup_layout[1])[1]
    }
}

pub async fn run_tui(mut app: App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app).await;

    // Cleanup
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut event_handler = EventHandler::new();

    loop {
        if app.needs_reload() {
            app.mark_loading();
            terminal.draw(|frame| app.render(frame))?;
            app.reload().await;
        }

        terminal.draw(|frame| app.render(frame))?;

        let event = event_handler.next_event().await?;
        if app.handle_event(event).await? || event_handler.should_quit() {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::config::FileConfigStore;
    use crate::ports::{DeleteConfirmation, MockTaskRepository, RepositoryError};
    use chrono::Utc;
    use ratatui::backend::TestBackend;

    fn task(id: &str, title: &str, status: TaskStatus) -> Task {
        Task {
            id: id.into(),
            title: title.to_string(),
            description: None,
            status,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task("1", "Buy milk", TaskStatus::Todo),
            task("2", "Write report", TaskStatus::Completed),
            task("3", "Quarterly review", TaskStatus::InProgress),
        ]
    }

    fn visible_ids(app: &App) -> Vec<String> {
        app.visible_tasks.iter().map(|t| t.id.to_string()).collect()
    }

    async fn loaded_app(mut repo: MockTaskRepository) -> App {
        repo.expect_list_tasks().returning(|_| Ok(sample()));
        let store = Arc::new(TaskStore::new(Arc::new(repo)));
        let config_path = std::env::temp_dir()
            .join(format!("taskboard-tui-{}", uuid::Uuid::new_v4()))
            .join("config.json");
        let config_store: Arc<dyn ConfigStore> = Arc::new(FileConfigStore::with_path(config_path));

        let mut app = App::new(store, config_store, AppConfig::default());
        app.reload().await;
        app
    }

    async fn send(app: &mut App, events: &[AppEvent]) -> bool {
        let mut quit = false;
        for event in events {
            quit = app.handle_event(event.clone()).await.unwrap();
        }
        quit
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_event(AppEvent::Character(c)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_startup_load_selects_first_row() {
        let app = loaded_app(MockTaskRepository::new()).await;

        assert!(!app.needs_reload());
        assert_eq!(visible_ids(&app), vec!["1", "2", "3"]);
        assert_eq!(app.task_list_state.selected(), Some(0));
        assert_eq!(app.counts.all, 3);
    }

    #[tokio::test]
    async fn test_search_typing_filters_and_does_not_quit() {
        let mut app = loaded_app(MockTaskRepository::new()).await;

        send(&mut app, &[AppEvent::Character('/')]).await;
        type_text(&mut app, "qu").await;

        assert_eq!(app.search_bar.query(), "qu");
        assert_eq!(visible_ids(&app), vec!["3"]);

        send(&mut app, &[AppEvent::Escape]).await;
        assert_eq!(visible_ids(&app), vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_tab_cycles_status_filter() {
        let mut app = loaded_app(MockTaskRepository::new()).await;

        send(&mut app, &[AppEvent::Tab]).await;
        assert_eq!(app.status_filter, StatusFilter::Only(TaskStatus::Todo));
        assert_eq!(visible_ids(&app), vec!["1"]);

        send(&mut app, &[AppEvent::Character('4')]).await;
        assert_eq!(visible_ids(&app), vec!["2"]);
    }

    #[tokio::test]
    async fn test_q_quits_from_dashboard() {
        let mut app = loaded_app(MockTaskRepository::new()).await;
        assert!(send(&mut app, &[AppEvent::Character('q')]).await);
    }

    #[tokio::test]
    async fn test_delete_after_confirmation() {
        let mut repo = MockTaskRepository::new();
        repo.expect_delete_task()
            .withf(|id| id.as_str() == "2")
            .times(1)
            .returning(|_| Ok(DeleteConfirmation::default()));
        let mut app = loaded_app(repo).await;

        send(&mut app, &[AppEvent::Down, AppEvent::Character('d')]).await;
        assert_eq!(app.screen_kind(), ScreenKind::ConfirmDelete);

        send(&mut app, &[AppEvent::Character('y')]).await;
        assert_eq!(app.screen_kind(), ScreenKind::Dashboard);
        assert_eq!(visible_ids(&app), vec!["1", "3"]);

        let (toast, _) = app.toast.clone().unwrap();
        assert_eq!(toast.message, "Task deleted successfully!");
    }

    #[tokio::test]
    async fn test_cancel_delete_keeps_task() {
        let mut repo = MockTaskRepository::new();
        repo.expect_delete_task().never();
        let mut app = loaded_app(repo).await;

        send(&mut app, &[AppEvent::Character('d'), AppEvent::Character('n')]).await;
        assert_eq!(app.screen_kind(), ScreenKind::Dashboard);
        assert_eq!(visible_ids(&app).len(), 3);
    }

    #[tokio::test]
    async fn test_blank_title_keeps_form_open() {
        let mut repo = MockTaskRepository::new();
        repo.expect_create_task().never();
        let mut app = loaded_app(repo).await;

        send(&mut app, &[AppEvent::Character('n'), AppEvent::Enter]).await;

        let Screen::Form(form) = &app.screen else {
            panic!("form should stay open");
        };
        assert_eq!(form.error(), Some("Task title is required"));
    }

    #[tokio::test]
    async fn test_server_rejection_keeps_form_open_with_message() {
        let mut repo = MockTaskRepository::new();
        repo.expect_create_task()
            .returning(|_| Err(RepositoryError::Validation("Title too long".to_string())));
        let mut app = loaded_app(repo).await;

        send(&mut app, &[AppEvent::Character('n')]).await;
        type_text(&mut app, "Something").await;
        send(&mut app, &[AppEvent::Enter]).await;

        let Screen::Form(form) = &app.screen else {
            panic!("form should stay open");
        };
        assert_eq!(form.error(), Some("Title too long"));
        assert_eq!(visible_ids(&app).len(), 3);
    }

    #[tokio::test]
    async fn test_create_closes_form_and_selects_new_task() {
        let mut repo = MockTaskRepository::new();
        repo.expect_create_task()
            .withf(|draft| draft.title == "Plan trip" && draft.status == TaskStatus::InProgress)
            .returning(|draft| Ok(task("9", &draft.title, draft.status)));
        let mut app = loaded_app(repo).await;

        send(&mut app, &[AppEvent::Character('n')]).await;
        type_text(&mut app, "Plan trip").await;
        send(&mut app, &[AppEvent::Tab, AppEvent::Tab, AppEvent::Right, AppEvent::Enter]).await;

        assert_eq!(app.screen_kind(), ScreenKind::Dashboard);
        assert_eq!(visible_ids(&app), vec!["1", "2", "3", "9"]);
        assert_eq!(app.task_list_state.selected(), Some(3));
    }

    #[tokio::test]
    async fn test_view_fetches_fresh_task() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_task()
            .withf(|id| id.as_str() == "1")
            .times(1)
            .returning(|id| {
                let mut fresh = task(id.as_str(), "Buy milk", TaskStatus::Todo);
                fresh.description = Some("From the server".to_string());
                Ok(fresh)
            });
        let mut app = loaded_app(repo).await;

        send(&mut app, &[AppEvent::Enter]).await;
        let Screen::Detail(shown) = &app.screen else {
            panic!("detail should be open");
        };
        assert_eq!(shown.description.as_deref(), Some("From the server"));

        send(&mut app, &[AppEvent::Escape]).await;
        assert_eq!(app.screen_kind(), ScreenKind::Dashboard);
    }

    #[tokio::test]
    async fn test_failed_view_stays_on_dashboard_with_toast() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_task()
            .returning(|_| Err(RepositoryError::Fetch("Failed to fetch task".to_string())));
        let mut app = loaded_app(repo).await;

        send(&mut app, &[AppEvent::Enter]).await;
        assert_eq!(app.screen_kind(), ScreenKind::Dashboard);
        let (toast, _) = app.toast.clone().unwrap();
        assert_eq!(toast.level, NotificationLevel::Error);
        assert_eq!(toast.message, "Failed to fetch task");
    }

    #[tokio::test]
    async fn test_renders_every_screen() {
        let mut repo = MockTaskRepository::new();
        repo.expect_get_task()
            .returning(|id| Ok(task(id.as_str(), "Buy milk", TaskStatus::Todo)));
        let mut app = loaded_app(repo).await;
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|frame| app.render(frame)).unwrap();
        send(&mut app, &[AppEvent::Enter]).await;
        terminal.draw(|frame| app.render(frame)).unwrap();
        send(&mut app, &[AppEvent::Character('e')]).await;
        assert_eq!(app.screen_kind(), ScreenKind::Form);
        terminal.draw(|frame| app.render(frame)).unwrap();
        send(&mut app, &[AppEvent::Escape, AppEvent::Character('d')]).await;
        terminal.draw(|frame| app.render(frame)).unwrap();
        send(&mut app, &[AppEvent::Escape, AppEvent::Character('?')]).await;
        terminal.draw(|frame| app.render(frame)).unwrap();
    }
}
