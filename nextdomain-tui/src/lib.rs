pub mod console;
pub mod typewriter;

use anyhow::Result;
use console::LogConsole;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use nextdomain_core::theme::{Palette, Rgb};
use nextdomain_core::{Effect, Job, Session, TaskReport};
use nextdomain_scanner::Probe;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use typewriter::{Step, Typewriter};

const MAX_OUTPUT_LINES: usize = 10_000;
const MAX_HISTORY: usize = 100;
const FRAME: Duration = Duration::from_millis(10);
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Messages from background tasks to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMessage {
    /// A spawned job finished (or panicked).
    Report(TaskReport),
    /// One log console tick.
    Tick { console: u64, count: u64 },
}

pub fn create_ui_channel() -> (
    mpsc::UnboundedSender<UiMessage>,
    mpsc::UnboundedReceiver<UiMessage>,
) {
    mpsc::unbounded_channel()
}

pub struct App {
    session: Session,
    probe: Probe,
    runtime: Handle,
    tx: mpsc::UnboundedSender<UiMessage>,
    rx: mpsc::UnboundedReceiver<UiMessage>,
    input: String,
    cursor_position: usize,
    history: Vec<String>,
    history_index: Option<usize>,
    temp_input: String,
    output: Vec<String>,
    scroll_back: usize,
    typewriter: Typewriter,
    console: Option<LogConsole>,
    consoles_opened: u64,
    running_tasks: usize,
    frame_count: usize,
    quit_after_typing: bool,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session, probe: Probe, runtime: Handle) -> Self {
        let (tx, rx) = create_ui_channel();
        let mut app = Self {
            session,
            probe,
            runtime,
            tx,
            rx,
            input: String::new(),
            cursor_position: 0,
            history: Vec::new(),
            history_index: None,
            temp_input: String::new(),
            output: Vec::new(),
            scroll_back: 0,
            typewriter: Typewriter::new(),
            console: None,
            consoles_opened: 0,
            running_tasks: 0,
            frame_count: 0,
            quit_after_typing: false,
            should_quit: false,
        };
        let effects = app.session.start();
        app.apply(effects);
        app
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn console(&self) -> Option<&LogConsole> {
        self.console.as_ref()
    }

    pub fn running_tasks(&self) -> usize {
        self.running_tasks
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_typing(&self) -> bool {
        self.typewriter.is_busy()
    }

    /// Applies session effects in order.
    pub fn apply(&mut self, effects: Vec<Effect>) {
        let settings = self.session.state().settings();
        let (typing_delay, matrix_delay) = (settings.typing_delay, settings.matrix_delay);

        for effect in effects {
            match effect {
                Effect::Print(text) => self.typewriter.push(&text, typing_delay),
                Effect::Echo(text) => self.typewriter.push(&text, Duration::ZERO),
                Effect::Clear => self.typewriter.clear(),
                Effect::Prefill(text) => {
                    self.cursor_position = text.len();
                    self.input = text;
                }
                Effect::Spawn(job) => self.spawn_job(job),
                Effect::Await(_) => {
                    self.input.clear();
                    self.cursor_position = 0;
                }
                Effect::Reset => {
                    let effects = self.session.start();
                    self.apply(effects);
                }
                Effect::Matrix(text) => {
                    self.typewriter.clear();
                    self.typewriter.push(&text, matrix_delay);
                }
                Effect::OpenConsole => {
                    if self.console.is_none() {
                        self.consoles_opened += 1;
                        info!("Opening log console");
                        self.console = Some(LogConsole::open(
                            self.consoles_opened,
                            &self.runtime,
                            self.tx.clone(),
                        ));
                    }
                }
                Effect::CloseConsole => {
                    if self.console.take().is_some() {
                        info!("Closing log console");
                    }
                }
                Effect::Exit => self.quit_after_typing = true,
            }
        }
    }

    fn spawn_job(&mut self, job: Job) {
        let task = job.task.name();
        let probe = self.probe.clone();
        let tx = self.tx.clone();
        self.running_tasks += 1;
        debug!("Spawning {}", task);

        self.runtime.spawn(async move {
            let worker = tokio::spawn(async move { job.run(&probe).await });
            let report = match worker.await {
                Ok(report) => report,
                Err(e) => {
                    error!("Task {} failed: {}", task, e);
                    TaskReport::panicked(task, e)
                }
            };
            // The UI may already be gone.
            let _ = tx.send(UiMessage::Report(report));
        });
    }

    /// Drains finished jobs and console ticks without blocking.
    pub fn process_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                UiMessage::Report(report) => {
                    self.running_tasks = self.running_tasks.saturating_sub(1);
                    let effects = self.session.complete(report);
                    self.apply(effects);
                }
                UiMessage::Tick { console, count } => {
                    if let Some(open) = self.console.as_mut().filter(|c| c.id() == console) {
                        open.record_tick(count);
                    }
                }
            }
        }
    }

    /// Reveals whatever the typewriter has due at `now`.
    pub fn tick(&mut self, now: Instant) {
        let steps = self.typewriter.advance(now);
        self.write_steps(steps);
        if self.quit_after_typing && !self.typewriter.is_busy() {
            self.should_quit = true;
        }
        self.frame_count = self.frame_count.wrapping_add(1);
    }

    fn fast_forward(&mut self) {
        let steps = self.typewriter.flush();
        self.write_steps(steps);
    }

    fn write_steps(&mut self, steps: Vec<Step>) {
        if steps.is_empty() {
            return;
        }
        for step in steps {
            match step {
                Step::NewLine => self.output.push(String::new()),
                Step::Char(c) => match self.output.last_mut() {
                    Some(line) => line.push(c),
                    None => self.output.push(c.to_string()),
                },
                Step::Clear => self.output.clear(),
            }
        }
        if self.output.len() > MAX_OUTPUT_LINES {
            self.output.drain(0..self.output.len() - MAX_OUTPUT_LINES);
        }
        self.scroll_back = 0;
    }

    /// Enter: fast-forwards typing, otherwise submits the input line.
    pub fn submit(&mut self) {
        if self.typewriter.is_busy() {
            self.fast_forward();
            return;
        }

        let input: String = self.input.drain(..).collect();
        self.cursor_position = 0;
        self.history_index = None;
        self.temp_input.clear();

        if !self.session.masks_input() && !input.trim().is_empty() {
            self.history.push(input.clone());
            if self.history.len() > MAX_HISTORY {
                self.history.remove(0);
            }
        }

        let session = &mut self.session;
        match catch_unwind(AssertUnwindSafe(|| session.submit(&input))) {
            Ok(effects) => self.apply(effects),
            Err(_) => {
                error!("Command handling panicked");
                self.session
                    .state_mut()
                    .remember_crash("Uncaught exception: command handling panicked");
                self.typewriter.push(
                    "Error processing command. System continuing safely.",
                    Duration::ZERO,
                );
            }
        }
    }

    /// Esc: leaves chat mode, otherwise quits.
    pub fn escape(&mut self) {
        if self.session.in_chat() {
            let effects = self.session.cancel();
            self.apply(effects);
            self.input.clear();
            self.cursor_position = 0;
        } else {
            self.should_quit = true;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char(c) => {
                self.input.insert(self.cursor_position, c);
                self.cursor_position += c.len_utf8();
                self.history_index = None;
                self.temp_input.clear();
            }
            KeyCode::Backspace => {
                if let Some(prev) = self.previous_boundary() {
                    self.input.remove(prev);
                    self.cursor_position = prev;
                    self.history_index = None;
                    self.temp_input.clear();
                }
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Up => self.navigate_history_backward(),
            KeyCode::Down => self.navigate_history_forward(),
            KeyCode::Left => {
                if let Some(prev) = self.previous_boundary() {
                    self.cursor_position = prev;
                }
            }
            KeyCode::Right => {
                if let Some(c) = self.input[self.cursor_position..].chars().next() {
                    self.cursor_position += c.len_utf8();
                }
            }
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = self.input.len(),
            KeyCode::Esc => self.escape(),
            KeyCode::PageUp => self.scroll_back += 10,
            KeyCode::PageDown => self.scroll_back = self.scroll_back.saturating_sub(10),
            _ => {}
        }
    }

    fn previous_boundary(&self) -> Option<usize> {
        self.input[..self.cursor_position]
            .char_indices()
            .next_back()
            .map(|(idx, _)| idx)
    }

    pub fn navigate_history_backward(&mut self) {
        if self.history.is_empty() {
            return;
        }

        if self.history_index.is_none() {
            self.temp_input = self.input.clone();
        }

        let idx = match self.history_index {
            None => self.history.len() - 1,
            Some(idx) => idx.saturating_sub(1),
        };
        self.history_index = Some(idx);
        self.input = self.history[idx].clone();
        self.cursor_position = self.input.len();
    }

    pub fn navigate_history_forward(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };

        if idx + 1 >= self.history.len() {
            self.input = std::mem::take(&mut self.temp_input);
            self.history_index = None;
        } else {
            self.history_index = Some(idx + 1);
            self.input = self.history[idx + 1].clone();
        }
        self.cursor_position = self.input.len();
    }
}

pub fn run(session: Session, probe: Probe, runtime: Handle) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, probe, runtime);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.process_messages();
        app.tick(Instant::now());
        terminal.draw(|f| ui(f, app))?;

        if app.should_quit {
            break;
        }

        if event::poll(FRAME)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }

    Ok(())
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Splits `line` into rows of at most `width` characters.
fn wrap_rows(line: &str, width: usize) -> Vec<String> {
    if width == 0 || line.is_empty() {
        return vec![line.to_string()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars.chunks(width).map(|row| row.iter().collect()).collect()
}

fn ui(f: &mut Frame, app: &App) {
    let palette: Palette = app.session.theme().palette();
    let (background, foreground) = (color(palette.background), color(palette.foreground));
    let (accent, accent_active) = (color(palette.accent), color(palette.accent_active));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Output
            Constraint::Length(1), // Rule
            Constraint::Length(1), // Input
            Constraint::Length(1), // Rule
            Constraint::Length(1), // Status
        ])
        .split(f.area());

    let output_area = match &app.console {
        Some(console) => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(chunks[0]);
            console.render(f, columns[1], foreground, accent_active);
            columns[0]
        }
        None => chunks[0],
    };

    let height = output_area.height as usize;
    let rows: Vec<String> = app
        .output
        .iter()
        .flat_map(|line| wrap_rows(line, output_area.width as usize))
        .collect();
    let bottom = rows.len().saturating_sub(app.scroll_back.min(rows.len()));
    let top = bottom.saturating_sub(height);
    let visible: Vec<Line> = rows[top..bottom]
        .iter()
        .map(|row| Line::from(row.as_str()))
        .collect();

    f.render_widget(
        Paragraph::new(visible).style(Style::default().fg(foreground).bg(background)),
        output_area,
    );

    let rule = "─".repeat(chunks[1].width as usize);
    f.render_widget(
        Paragraph::new(rule.as_str()).style(Style::default().fg(accent).bg(background)),
        chunks[1],
    );
    f.render_widget(
        Paragraph::new(rule.as_str()).style(Style::default().fg(accent).bg(background)),
        chunks[3],
    );

    let prompt = app.session.prompt_label();
    let shown = if app.session.masks_input() {
        "*".repeat(app.input.chars().count())
    } else {
        app.input.clone()
    };
    let input = Paragraph::new(Line::from(vec![
        Span::styled(prompt.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(shown),
    ]))
    .style(Style::default().fg(foreground).bg(background));
    f.render_widget(input, chunks[2]);

    let cursor_chars = app.input[..app.cursor_position].chars().count();
    f.set_cursor_position((
        chunks[2].x + (prompt.chars().count() + cursor_chars) as u16,
        chunks[2].y,
    ));

    let mut status = Vec::new();
    if app.running_tasks > 0 {
        status.push(Span::styled(
            format!("{} {} running | ", SPINNER[app.frame_count / 8 % SPINNER.len()], app.running_tasks),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    let hint = if app.session.in_chat() { " leave chat | " } else { " quit | " };
    status.extend([
        Span::styled("ESC", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(hint),
        Span::styled("help", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" for commands | "),
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" skip typing | "),
        Span::styled("↑↓", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" history | "),
        Span::styled("PgUp/PgDn", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" scroll | theme "),
        Span::raw(app.session.theme().as_str()),
    ]);
    f.render_widget(
        Paragraph::new(Line::from(status)).style(Style::default().fg(foreground).bg(accent)),
        chunks[4],
    );
}
