use ratatui::Frame;

use crate::{
    ui::{key_stats::render_key_stats, render_results, render_typing},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

/// Words, caret, timer and live stats; also covers idle and paused
pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_typing(app, f.area(), f.buffer_mut());
    }
}

/// Scores, WPM chart and replay of the finished test
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_results(app, f.area(), f.buffer_mut());
    }
}

pub struct KeyStatsScreen;

impl Screen for KeyStatsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_key_stats(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Typing => Box::new(TypingScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::KeyStats => Box::new(KeyStatsScreen),
    }
}
