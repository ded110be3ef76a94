use crate::core::exclusion::exclude_at_cursor;
use crate::core::navigation::{
    cursor_index, navigate_down, navigate_in, navigate_out, navigate_up,
};
use crate::core::selection::{
    count_selected_files, get_selected_paths, has_full_selection, has_partial_selection,
    toggle_selection,
};
use crate::core::settings::Settings;
use crate::core::token_counter::{format_token_count, node_tokens, sum_tokens};
use crate::core::tree_view::build_items;
use crate::domain::tree::{Node, Tree};
use crate::domain::view_state::ViewState;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::time::{Duration, Instant};

pub const PROMPT_LIMIT: usize = 4096;
const STATUS_TICKS: u16 = 30;
const TICK_RATE: Duration = Duration::from_millis(100);
const SETTINGS_ITEMS: [&str; 2] = ["Emoji icons", "Color scheme"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Prompt,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Quit,
    Generate,
}

/// What a finished selector session leaves behind.
pub struct Session {
    pub tree: Tree,
    pub state: ViewState,
    pub prompt: String,
    pub new_ignores: BTreeSet<String>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Full,
    Partial,
    Empty,
}

impl Mark {
    fn symbol(self) -> &'static str {
        match self {
            Mark::Full => "✓",
            Mark::Partial => "~",
            Mark::Empty => " ",
        }
    }
}

pub struct App {
    tree: Tree,
    state: ViewState,
    tokens: HashMap<String, usize>,
    settings: Settings,
    mode: Mode,
    settings_cursor: usize,
    prompt: String,
    status: Option<(String, u16)>,
    new_ignores: BTreeSet<String>,
    outcome: Option<Outcome>,
    list_state: ListState,
}

impl App {
    pub fn new(
        tree: Tree,
        tokens: HashMap<String, usize>,
        settings: Settings,
        prompt: String,
    ) -> Self {
        let root = tree.root().path.clone();
        let mut prompt = prompt;
        truncate_chars(&mut prompt, PROMPT_LIMIT);

        App {
            state: ViewState::new(&root).set_open(&root, true),
            tree,
            tokens,
            settings,
            mode: Mode::Browse,
            settings_cursor: 0,
            prompt,
            status: None,
            new_ignores: BTreeSet::new(),
            outcome: None,
            list_state: ListState::default(),
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn finish(self) -> Session {
        Session {
            tree: self.tree,
            state: self.state,
            prompt: self.prompt,
            new_ignores: self.new_ignores,
            outcome: self.outcome.unwrap_or(Outcome::Quit),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.outcome = Some(Outcome::Quit);
            return;
        }

        match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Prompt => self.handle_prompt_key(key),
            Mode::Settings => self.handle_settings_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        let tree = &self.tree;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.state = navigate_up(tree, &self.state),
            KeyCode::Down | KeyCode::Char('j') => self.state = navigate_down(tree, &self.state),
            KeyCode::Left | KeyCode::Char('h') => self.state = navigate_out(tree, &self.state),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => {
                self.state = navigate_in(tree, &self.state)
            }
            KeyCode::Char(' ') => self.state = toggle_selection(tree, &self.state),
            KeyCode::Char('x') => self.exclude_cursor(),
            KeyCode::Char('p') => self.mode = Mode::Prompt,
            KeyCode::Char('s') => {
                self.settings_cursor = 0;
                self.mode = Mode::Settings;
            }
            KeyCode::Char('g') => self.outcome = Some(Outcome::Generate),
            KeyCode::Char('q') => self.outcome = Some(Outcome::Quit),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Backspace => {
                self.prompt.pop();
            }
            KeyCode::Enter => self.push_prompt_char('\n'),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.push_prompt_char(c)
            }
            _ => {}
        }
    }

    fn push_prompt_char(&mut self, c: char) {
        if self.prompt.chars().count() < PROMPT_LIMIT {
            self.prompt.push(c);
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        let count = SETTINGS_ITEMS.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.settings_cursor = (self.settings_cursor + count - 1) % count
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.settings_cursor = (self.settings_cursor + 1) % count
            }
            KeyCode::Char(' ') | KeyCode::Enter if self.settings_cursor == 0 => {
                self.settings.toggle_emoji()
            }
            KeyCode::Left | KeyCode::Char('h') if self.settings_cursor == 1 => {
                self.settings.prev_scheme()
            }
            KeyCode::Right | KeyCode::Char('l') if self.settings_cursor == 1 => {
                self.settings.next_scheme()
            }
            KeyCode::Esc | KeyCode::Char('s') => self.mode = Mode::Browse,
            KeyCode::Char('q') => self.outcome = Some(Outcome::Quit),
            _ => {}
        }
    }

    fn exclude_cursor(&mut self) {
        match exclude_at_cursor(&mut self.tree, &self.state) {
            Some((state, excluded)) => {
                self.state = state;
                self.status = Some((format!("Excluded: {}", excluded.relative_path), STATUS_TICKS));
                self.new_ignores.insert(excluded.relative_path);
            }
            None => debug!("Nothing to exclude at {}", self.state.cursor_path()),
        }
    }

    /// Advances the status message timer by one tick.
    pub fn tick(&mut self) {
        if let Some((_, remaining)) = &mut self.status {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.status = None;
            }
        }
    }

    fn selected_tokens(&self) -> usize {
        sum_tokens(&get_selected_paths(&self.tree, &self.state), &self.tokens)
    }

    fn mark(&self, node: &Node) -> Mark {
        if node.is_dir {
            if has_full_selection(&self.tree, node, &self.state) {
                Mark::Full
            } else if has_partial_selection(&self.tree, node, &self.state) {
                Mark::Partial
            } else {
                Mark::Empty
            }
        } else if self.state.is_selected(&node.path) {
            Mark::Full
        } else {
            Mark::Empty
        }
    }

    fn icon(&self, node: &Node) -> &'static str {
        let open = self.state.is_open(&node.path);
        match (self.settings.emoji, node.is_dir, open) {
            (true, true, true) => "📂",
            (true, true, false) => "📁",
            (true, false, _) => "📄",
            (false, true, true) => "▼",
            (false, true, false) => "▶",
            (false, false, _) => " ",
        }
    }

    fn label(&self, node: &Node) -> String {
        format!(
            "{} {} {} ({})",
            self.mark(node).symbol(),
            self.icon(node),
            node.name,
            format_token_count(node_tokens(&self.tree, node, &self.tokens))
        )
    }

    fn list_items(&self) -> Vec<ListItem<'static>> {
        let scheme = self.settings.scheme();
        let items = build_items(&self.tree, self.tree.root(), &|node: &Node| {
            self.state.is_open(&node.path)
        });

        items
            .rows()
            .into_iter()
            .map(|row| {
                let node = *row.label;
                let color = match self.mark(node) {
                    Mark::Full => scheme.selected,
                    Mark::Partial => scheme.partial,
                    Mark::Empty if node.is_dir => scheme.directory,
                    Mark::Empty => scheme.unselected,
                };
                ListItem::new(Line::from(vec![
                    Span::styled(row.guide, Style::default().fg(Color::DarkGray)),
                    Span::styled(self.label(node), Style::default().fg(color)),
                ]))
            })
            .collect()
    }

    fn help_message(&self) -> &'static str {
        match self.mode {
            Mode::Browse => {
                "↑/↓: Navigate | ←/→: Collapse/Expand | Space: Select | x: Exclude | p: Prompt | s: Settings | g: Generate | q: Quit"
            }
            Mode::Prompt => "Type your prompt | Enter: New line | Backspace: Delete | Esc: Done",
            Mode::Settings => "↑/↓: Move | Space: Toggle | ←/→: Change scheme | Esc: Close",
        }
    }
}

fn truncate_chars(text: &mut String, limit: usize) {
    if let Some((byte_index, _)) = text.char_indices().nth(limit) {
        text.truncate(byte_index);
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    // Prompt
    let prompt_border = if app.mode == Mode::Prompt {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let prompt = Paragraph::new(app.prompt.as_str())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(prompt_border)
                .title("Prompt"),
        );
    f.render_widget(prompt, chunks[0]);

    let header = Paragraph::new(Span::styled(
        format!(
            "Picky - File Selector • Tokens selected: ~{}",
            format_token_count(app.selected_tokens())
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    f.render_widget(header, chunks[1]);

    let controls = Paragraph::new(Span::styled(
        app.help_message(),
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(controls, chunks[2]);

    // Files and directories tree
    let items = app.list_items();
    let flat = app.tree.flatten(&app.state);
    app.list_state
        .select(cursor_index(&flat, app.state.cursor_path()));
    let (selected, total) = count_selected_files(&app.tree, app.tree.root(), &app.state);

    let selected_style = Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let file_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Files ({} selected of {})",
            selected, total
        )))
        .highlight_style(selected_style);
    f.render_stateful_widget(file_list, chunks[3], &mut app.list_state);

    if let Some((message, _)) = &app.status {
        let status = Paragraph::new(Span::styled(
            message.as_str(),
            Style::default().fg(Color::Yellow),
        ));
        f.render_widget(status, chunks[4]);
    }

    if app.mode == Mode::Settings {
        render_settings(f, app);
    }
}

fn render_settings(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 6, f.area());
    let values = [
        if app.settings.emoji { "on" } else { "off" }.to_string(),
        app.settings.scheme().name.to_string(),
    ];
    let items: Vec<ListItem> = SETTINGS_ITEMS
        .iter()
        .zip(values)
        .map(|(name, value)| ListItem::new(format!("{}: {}", name, value)))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Settings (Esc to close)"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(app.settings_cursor));

    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut state);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Runs the interactive selector until the user quits or asks to generate.
/// The terminal is restored before returning, also on error.
pub fn run_tui(mut app: App) -> anyhow::Result<Session> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    let session = app.finish();
    info!(
        "Selector finished with {:?}, {} new exclusions",
        session.outcome,
        session.new_ignores.len()
    );
    Ok(session)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.tick();
            last_tick = Instant::now();
        }

        if app.outcome().is_some() {
            return Ok(());
        }
    }
}
