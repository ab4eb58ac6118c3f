use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::watch;

use crate::auth::AuthSession;
use crate::board::TaskBoard;
use crate::input::TextInput;
use crate::models::{AuthStatus, InputMode, Priority, Screen, TabFilter, TaskId};

const TICK: Duration = Duration::from_millis(100);

const ACCENT: Color = Color::Rgb(0x4B, 0x6E, 0xFF);
const PENDING_COLOR: Color = Color::Rgb(0xFF, 0x9F, 0x1C);
const DONE_COLOR: Color = Color::Rgb(0x2E, 0xC4, 0xB6);

/// Display color and label for each priority
pub fn priority_style(priority: Priority) -> (Color, &'static str) {
    match priority {
        Priority::High => (Color::Rgb(0xFF, 0xCD, 0xD2), "High"),
        Priority::Medium => (Color::Rgb(0xFF, 0xF9, 0xC4), "Medium"),
        Priority::Low => (Color::Rgb(0xC8, 0xE6, 0xC9), "Low"),
    }
}

pub struct App {
    auth: AuthSession,
    status_rx: watch::Receiver<AuthStatus>,
    pub status: AuthStatus,
    pub board: TaskBoard,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub email: TextInput,
    pub password: TextInput,
    pub search: TextInput,
    pub task_text: TextInput,
    pub selected_priority: Priority,
    pub show_add_dialog: bool,
    pub task_list_state: ListState,
    pub should_quit: bool,
}

impl App {
    pub fn new(auth: AuthSession) -> Self {
        let status_rx = auth.subscribe();
        let status = status_rx.borrow().clone();
        let mut app = App {
            auth,
            status_rx,
            status,
            board: TaskBoard::new(),
            screen: Screen::Login,
            input_mode: InputMode::Email,
            email: TextInput::new(),
            password: TextInput::masked(),
            search: TextInput::new(),
            task_text: TextInput::new(),
            selected_priority: Priority::default(),
            show_add_dialog: false,
            task_list_state: ListState::default(),
            should_quit: false,
        };
        app.auth.check_status();
        app.sync_auth_status();
        app
    }

    /// Pick up the latest published status and navigate on it
    pub fn sync_auth_status(&mut self) {
        if !self.status_rx.has_changed().unwrap_or(false) {
            return;
        }
        let status = self.status_rx.borrow_and_update().clone();
        debug!("screen {:?} observed status {}", self.screen, status);

        match (&status, self.screen) {
            (AuthStatus::Authenticated, Screen::Login | Screen::Signup) => self.go_home(),
            (AuthStatus::Unauthenticated, Screen::Home) => {
                self.reset_board();
                self.go_to(Screen::Login);
            }
            _ => {}
        }
        self.status = status;
    }

    fn go_home(&mut self) {
        info!("signed in, opening board");
        self.password.clear();
        self.screen = Screen::Home;
        self.input_mode = InputMode::Normal;
        self.clamp_selection();
    }

    /// Tasks belong to the session that created them
    fn reset_board(&mut self) {
        info!("signed out, discarding {} task(s)", self.board.len());
        self.board = TaskBoard::new();
        self.search.clear();
        self.task_text.clear();
        self.selected_priority = Priority::default();
        self.task_list_state = ListState::default();
    }

    fn go_to(&mut self, screen: Screen) {
        self.screen = screen;
        self.input_mode = InputMode::Email;
        self.show_add_dialog = false;
        self.password.clear();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.input_mode {
            InputMode::Email | InputMode::Password => self.handle_auth_key(key),
            InputMode::Normal => self.handle_board_key(key),
            InputMode::Search => self.handle_search_key(key),
            InputMode::AddTask => self.handle_add_task_key(key),
        }
    }

    fn focused_auth_field(&mut self) -> &mut TextInput {
        if self.input_mode == InputMode::Password {
            &mut self.password
        } else {
            &mut self.email
        }
    }

    fn handle_auth_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let other = if self.screen == Screen::Login {
                    Screen::Signup
                } else {
                    Screen::Login
                };
                self.go_to(other);
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.input_mode = if self.input_mode == InputMode::Email {
                    InputMode::Password
                } else {
                    InputMode::Email
                };
            }
            KeyCode::Enter => {
                if self.input_mode == InputMode::Email {
                    self.input_mode = InputMode::Password;
                } else {
                    self.submit_credentials();
                }
            }
            KeyCode::Char(c) => self.focused_auth_field().insert_char(c),
            KeyCode::Backspace => self.focused_auth_field().delete_char(),
            KeyCode::Left => self.focused_auth_field().move_cursor_left(),
            KeyCode::Right => self.focused_auth_field().move_cursor_right(),
            KeyCode::Home => self.focused_auth_field().move_to_start(),
            KeyCode::End => self.focused_auth_field().move_to_end(),
            _ => {}
        }
    }

    pub fn submit_credentials(&mut self) {
        let email = self.email.value().trim().to_string();
        let password = self.password.value().to_string();
        match self.screen {
            Screen::Signup => self.auth.signup(&email, &password),
            _ => self.auth.login(&email, &password),
        }
        self.sync_auth_status();
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('a') | KeyCode::Char('n') => {
                self.show_add_dialog = true;
                self.input_mode = InputMode::AddTask;
            }
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Tab => self.set_filter(self.board.filter().next()),
            KeyCode::BackTab => self.set_filter(self.board.filter().previous()),
            KeyCode::Down | KeyCode::Char('j') => self.next_item(),
            KeyCode::Up | KeyCode::Char('k') => self.previous_item(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.selected_task_id() {
                    self.board.toggle_done(id);
                    // Toggling re-sorts the list; keep the cursor on the same task
                    let position = self.board.visible_list().iter().position(|t| t.id == id);
                    self.task_list_state.select(position);
                    self.clamp_selection();
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_task_id() {
                    self.board.remove(id);
                    self.clamp_selection();
                }
            }
            KeyCode::Char('s') => {
                self.auth.signout();
                self.sync_auth_status();
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.input_mode = InputMode::Normal,
            KeyCode::Esc => {
                self.search.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Char(c) => self.search.insert_char(c),
            KeyCode::Backspace => self.search.delete_char(),
            KeyCode::Left => self.search.move_cursor_left(),
            KeyCode::Right => self.search.move_cursor_right(),
            _ => {}
        }
        self.board.set_search_query(self.search.value());
        self.clamp_selection();
    }

    fn handle_add_task_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.show_add_dialog = false;
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => self.confirm_add_task(),
            KeyCode::Tab | KeyCode::Down => self.selected_priority = self.selected_priority.next(),
            KeyCode::BackTab | KeyCode::Up => self.selected_priority = self.selected_priority.previous(),
            KeyCode::Char(c) => self.task_text.insert_char(c),
            KeyCode::Backspace => self.task_text.delete_char(),
            KeyCode::Left => self.task_text.move_cursor_left(),
            KeyCode::Right => self.task_text.move_cursor_right(),
            _ => {}
        }
    }

    /// Blank text leaves the dialog open
    pub fn confirm_add_task(&mut self) {
        if self.board.add(self.task_text.value(), self.selected_priority).is_some() {
            self.task_text.clear();
            self.show_add_dialog = false;
            self.input_mode = InputMode::Normal;
            self.clamp_selection();
        }
    }

    fn set_filter(&mut self, tab: TabFilter) {
        self.board.set_filter(tab);
        self.clamp_selection();
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        let i = self.task_list_state.selected()?;
        self.board.visible_list().get(i).map(|t| t.id)
    }

    fn clamp_selection(&mut self) {
        let len = self.board.visible_list().len();
        let selected = match self.task_list_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.task_list_state.select(selected);
    }

    pub fn next_item(&mut self) {
        let len = self.board.visible_list().len();
        if len == 0 {
            return;
        }
        let i = match self.task_list_state.selected() {
            Some(i) if i + 1 >= len => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.task_list_state.select(Some(i));
    }

    pub fn previous_item(&mut self) {
        let len = self.board.visible_list().len();
        if len == 0 {
            return;
        }
        let i = match self.task_list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.task_list_state.select(Some(i));
    }
}

pub fn run_tui(auth: AuthSession) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(auth);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.sync_auth_status();
        terminal.draw(|f| ui(f, app))?;

        // Poll so background sign-in results get drawn without a key press
        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Login | Screen::Signup => render_auth(f, app),
        Screen::Home => render_home(f, app),
    }
}

// Helper function to create centered rectangles for popups
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

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let color = if focused { ACCENT } else { Color::Gray };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color))
}

/// Place the terminal cursor inside a bordered single-line field
fn place_cursor(f: &mut Frame, area: Rect, input: &TextInput) {
    let x = area.x + 1 + input.cursor() as u16;
    f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
}

fn render_auth(f: &mut Frame, app: &mut App) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    let (title, action, switch_hint) = match app.screen {
        Screen::Signup => ("Create account", "Sign up", "Ctrl+T: back to sign in"),
        _ => ("Sign in", "Log in", "Ctrl+T: create an account"),
    };

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(format!("TodoBoard - {}", title))
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(ACCENT));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    let email_focused = app.input_mode == InputMode::Email;
    f.render_widget(
        Paragraph::new(app.email.display()).block(field_block("Email", email_focused)),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new(app.password.display()).block(field_block("Password", !email_focused)),
        chunks[1],
    );

    let status_line = if app.status.is_loading() {
        Line::from(Span::styled("Please wait...", Style::default().fg(Color::Yellow)))
    } else if let Some(message) = app.status.error_message() {
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red)))
    } else {
        Line::from("")
    };
    f.render_widget(Paragraph::new(status_line).alignment(Alignment::Center), chunks[2]);

    let help = format!(
        "Enter: {}\nTab: switch field\n{}\nEsc: quit",
        action, switch_hint
    );
    f.render_widget(
        Paragraph::new(help)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray)),
        chunks[3],
    );

    if email_focused {
        place_cursor(f, chunks[0], &app.email);
    } else {
        place_cursor(f, chunks[1], &app.password);
    }
}

fn render_home(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_dashboard(f, app, chunks[1]);

    let searching = app.input_mode == InputMode::Search;
    let search_text = if app.search.is_empty() && !searching {
        Span::styled("Search tasks...", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.search.display())
    };
    f.render_widget(
        Paragraph::new(Line::from(search_text)).block(field_block("Search (/)", searching)),
        chunks[2],
    );

    let titles: Vec<Line> = TabFilter::ALL
        .iter()
        .map(|tab| Line::from(tab.label()))
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Filter (Tab)"))
        .select(app.board.filter().index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[3]);

    render_tasks(f, app, chunks[4]);

    let help = "a: add  space: toggle  d: delete  /: search  Tab: filter  s: sign out  q: quit";
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[5],
    );

    if searching {
        place_cursor(f, chunks[2], &app.search);
    }

    if app.show_add_dialog {
        render_add_dialog(f, app);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let who = app
        .auth
        .current_session()
        .map(|session| {
            format!(
                "  signed in as {} since {}",
                session.email,
                session.signed_in_at.with_timezone(&chrono::Local).format("%H:%M")
            )
        })
        .unwrap_or_default();
    let header = Line::from(vec![
        Span::styled("TodoList", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::styled(who, Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn render_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let stats = app.board.stats();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(50),
        ])
        .split(area);

    let card = |title: &'static str, count: usize, color: Color| {
        Paragraph::new(Line::from(Span::styled(
            count.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(color)),
        )
    };
    f.render_widget(card("Pending", stats.pending, PENDING_COLOR), cards[0]);
    f.render_widget(card("Done", stats.done, DONE_COLOR), cards[1]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Completion rate"))
        .gauge_style(Style::default().fg(ACCENT))
        .percent(stats.whole_percent().min(100) as u16)
        .label(format!("{}%", stats.whole_percent()));
    f.render_widget(gauge, cards[2]);
}

fn render_tasks(f: &mut Frame, app: &mut App, area: Rect) {
    let visible = app.board.visible_list();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|task| {
            let (color, label) = priority_style(task.priority);
            let check = if task.is_done { "[x] " } else { "[ ] " };
            let text_style = if task.is_done {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::raw(check),
                Span::styled(task.text.clone(), text_style),
                Span::styled(format!("  [{}]", label), Style::default().fg(color)),
            ]))
        })
        .collect();

    let title = if app.board.is_empty() {
        "Tasks (none yet, press a to add)".to_string()
    } else {
        format!("Tasks ({} of {})", items.len(), app.board.len())
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, &mut app.task_list_state);
}

fn render_add_dialog(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title("New task")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    f.render_widget(
        Paragraph::new(app.task_text.display()).block(field_block("What needs to be done?", true)),
        chunks[0],
    );

    let mut chips = vec![Span::raw("Priority: ")];
    for priority in Priority::ALL {
        let (color, label) = priority_style(priority);
        let style = if priority == app.selected_priority {
            Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };
        chips.push(Span::styled(format!(" {} ", label), style));
        chips.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(chips)), chunks[1]);

    f.render_widget(
        Paragraph::new("Enter: add  Tab: priority  Esc: cancel").style(Style::default().fg(Color::Gray)),
        chunks[2],
    );

    place_cursor(f, chunks[0], &app.task_text);
}
