mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rapidkeys::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, ModeKind, TIME_OPTIONS, WORD_OPTIONS},
    history::{FileStore, History, KeyValueStore, MemoryStore},
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::{QuoteLength, SessionStatus},
    typing_test::TypingTest,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 100;
const LOG_FILE: &str = "rapidkeys.log";

/// minimal typing speed trainer with adaptive practice
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A minimal typing speed trainer. Time, word count and quote tests, live WPM and accuracy, results history and practice words biased toward your weakest keys."
)]
pub struct Cli {
    /// test mode (defaults to the last used)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<ModeKind>,

    /// seconds for time mode: 15, 30, 60 or 120
    #[clap(short = 's', long)]
    seconds: Option<u32>,

    /// word count for words mode: 10, 25, 50 or 100
    #[clap(short = 'w', long)]
    words: Option<usize>,

    /// quote length for quote mode
    #[clap(short = 'q', long, value_enum)]
    quote: Option<QuoteLength>,

    /// add capitalization and punctuation to generated words
    #[clap(long)]
    punctuation: bool,

    /// mix numbers into generated words
    #[clap(long)]
    numbers: bool,

    /// hide mistakes while typing
    #[clap(long)]
    confidence: bool,

    /// do not record results or key statistics
    #[clap(long)]
    no_save: bool,
}

impl Cli {
    /// Overlay the flags that were given on the persisted configuration.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(seconds) = self.seconds {
            config.time_secs = seconds;
        }
        if let Some(words) = self.words {
            config.word_count = words;
        }
        if let Some(length) = self.quote {
            config.quote_length = length;
        }
        config.include_punctuation |= self.punctuation;
        config.include_numbers |= self.numbers;
        config.confidence_mode |= self.confidence;
        config.sanitized()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Typing,
    Results,
    KeyStats,
}

#[derive(Debug, Clone, Copy, PartialEq, strum_macros::Display)]
pub enum SortBy {
    Key,
    Accuracy,
    Attempts,
}

#[derive(Debug)]
pub struct KeyStatsState {
    pub scroll_offset: usize,
    pub sort_by: SortBy,
    pub sort_ascending: bool,
}

impl Default for KeyStatsState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            sort_by: SortBy::Accuracy,
            sort_ascending: true,
        }
    }
}

pub type AppTest = TypingTest<Box<dyn KeyValueStore>>;

pub struct App {
    pub test: AppTest,
    pub state: AppState,
    pub key_stats_state: KeyStatsState,
    /// Best WPM on record before the current test.
    pub best_before: Option<u32>,
    config_store: Option<FileConfigStore>,
}

impl App {
    pub fn new(test: AppTest, config_store: Option<FileConfigStore>) -> Self {
        Self {
            best_before: test.history().best_wpm(),
            test,
            state: AppState::Typing,
            key_stats_state: KeyStatsState::default(),
            config_store,
        }
    }

    /// Returns true when the app should quit.
    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            // ctrl+c to quit; other chords are not typing
            return key.code == KeyCode::Char('c');
        }
        if key.code == KeyCode::Esc {
            self.new_test();
            return false;
        }

        match self.state {
            AppState::Typing => self.on_typing_key(key, now),
            AppState::Results => return self.on_results_key(key),
            AppState::KeyStats => self.on_key_stats_key(key),
        }
        false
    }

    pub fn on_tick(&mut self, now: Instant) {
        if self.test.tick(now) {
            self.state = AppState::Results;
        }
    }

    pub fn on_focus_lost(&mut self, now: Instant) {
        self.test.focus_lost(now);
    }

    fn on_typing_key(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Enter if self.test.status() == SessionStatus::Paused => {
                self.test.resume(now);
            }
            KeyCode::Backspace => {
                self.test.backspace();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => {
                self.test.type_char(c, now);
            }
            _ => {}
        }
        if self.test.status() == SessionStatus::Finished {
            self.state = AppState::Results;
        }
    }

    fn on_results_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => self.retry(),
            KeyCode::Char('n') => self.new_test(),
            KeyCode::Char('s') => self.state = AppState::KeyStats,
            KeyCode::Char('m') => self.update_config(|c| {
                c.mode = match c.mode {
                    ModeKind::Time => ModeKind::Words,
                    ModeKind::Words => ModeKind::Quote,
                    ModeKind::Quote => ModeKind::Time,
                }
            }),
            KeyCode::Char('l') => self.update_config(|c| match c.mode {
                ModeKind::Time => c.time_secs = next_option(&TIME_OPTIONS, c.time_secs),
                ModeKind::Words => c.word_count = next_option(&WORD_OPTIONS, c.word_count),
                ModeKind::Quote => {
                    c.quote_length = match c.quote_length {
                        QuoteLength::Short => QuoteLength::Medium,
                        QuoteLength::Medium => QuoteLength::Long,
                        QuoteLength::Long => QuoteLength::Short,
                    }
                }
            }),
            KeyCode::Char('p') => self.update_config(|c| c.include_punctuation ^= true),
            KeyCode::Char('u') => self.update_config(|c| c.include_numbers ^= true),
            KeyCode::Char('c') => self.update_config(|c| c.confidence_mode ^= true),
            _ => {}
        }
        false
    }

    fn on_key_stats_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => self.retry(),
            KeyCode::Char('n') => self.new_test(),
            KeyCode::Char('b') | KeyCode::Backspace => self.state = AppState::Results,
            _ => self.navigate_key_stats(key),
        }
    }

    fn navigate_key_stats(&mut self, key: KeyEvent) {
        let stats = &mut self.key_stats_state;
        match key.code {
            KeyCode::Up => stats.scroll_offset = stats.scroll_offset.saturating_sub(1),
            // clamped against the table height when rendering
            KeyCode::Down => stats.scroll_offset += 1,
            KeyCode::Char(c @ '1'..='3') => {
                stats.sort_by = match c {
                    '1' => SortBy::Key,
                    '2' => SortBy::Accuracy,
                    _ => SortBy::Attempts,
                };
                stats.scroll_offset = 0;
            }
            KeyCode::Char(' ') => {
                stats.sort_ascending = !stats.sort_ascending;
                stats.scroll_offset = 0;
            }
            _ => {}
        }
    }

    fn new_test(&mut self) {
        self.test.restart();
        self.enter_typing();
    }

    fn retry(&mut self) {
        self.test.retry();
        self.enter_typing();
    }

    fn enter_typing(&mut self) {
        self.best_before = self.test.history().best_wpm();
        self.state = AppState::Typing;
        self.key_stats_state = KeyStatsState::default();
    }

    /// Change a setting, persist it and start a fresh test with it.
    fn update_config(&mut self, change: impl FnOnce(&mut Config)) {
        let mut config = self.test.config().clone();
        change(&mut config);
        if let Some(store) = &self.config_store {
            if let Err(e) = store.save(&config) {
                warn!(error = %e, "failed to save config");
            }
        }
        self.test.set_config(config);
        self.enter_typing();
    }
}

fn next_option<T: Copy + PartialEq>(options: &[T], current: T) -> T {
    let idx = options.iter().position(|o| *o == current).map_or(0, |i| i + 1);
    options[idx % options.len()]
}

fn init_logging() -> Option<WorkerGuard> {
    let dir = AppDirs::log_dir()?;
    std::fs::create_dir_all(&dir).ok()?;
    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok()?;
    Some(guard)
}

fn build_app(cli: &Cli) -> App {
    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if let Err(e) = config_store.save(&config) {
        warn!(error = %e, "failed to save config");
    }

    let store: Box<dyn KeyValueStore> = match AppDirs::state_dir() {
        Some(dir) if !cli.no_save => Box::new(FileStore::new(dir)),
        _ => Box::new(MemoryStore::default()),
    };
    info!(mode = %config.test_mode(), no_save = cli.no_save, "starting");

    App::new(TypingTest::new(config, History::new(store)), Some(config_store))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _log_guard = init_logging();
    let mut app = build_app(&cli);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        let event = runner.step();
        if handle_event(app, event, Instant::now()) {
            break;
        }
    }

    info!("quit");
    Ok(())
}

/// Applies one loop event. The clock advances on every event, so steady
/// typing cannot hold off the countdown. Returns true to quit.
fn handle_event(app: &mut App, event: AppEvent, now: Instant) -> bool {
    app.on_tick(now);
    match event {
        AppEvent::Tick | AppEvent::FocusGained | AppEvent::Resize => false,
        AppEvent::FocusLost => {
            app.on_focus_lost(now);
            false
        }
        AppEvent::Key(key) => app.on_key(key, now),
    }
}
