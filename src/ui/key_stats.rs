use std::collections::BTreeMap;

use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};
use rapidkeys::history::{WEAK_KEY_ACCURACY, WEAK_KEY_MIN_ATTEMPTS};
use rapidkeys::session::KeyStat;

use crate::{App, SortBy};

#[derive(Debug, Clone, PartialEq)]
pub struct KeyRowData {
    pub key: char,
    pub total: u64,
    pub errors: u64,
    /// Percent, 0 to 100.
    pub accuracy: f64,
    /// Attempts made in the test that just finished.
    pub session_attempts: u64,
}

impl KeyRowData {
    pub fn is_weak(&self) -> bool {
        self.total > WEAK_KEY_MIN_ATTEMPTS && self.accuracy < WEAK_KEY_ACCURACY * 100.0
    }
}

pub fn sorted_rows(
    stored: &BTreeMap<char, KeyStat>,
    session: &BTreeMap<char, KeyStat>,
    sort_by: &SortBy,
    ascending: bool,
) -> Vec<KeyRowData> {
    stored
        .iter()
        .map(|(&key, stat)| KeyRowData {
            key,
            total: stat.total,
            errors: stat.errors,
            accuracy: stat.accuracy() * 100.0,
            session_attempts: session.get(&key).map_or(0, |s| s.total),
        })
        .sorted_by(|a, b| {
            let cmp = match sort_by {
                SortBy::Key => a.key.cmp(&b.key),
                SortBy::Accuracy => a
                    .accuracy
                    .partial_cmp(&b.accuracy)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.key.cmp(&b.key)),
                SortBy::Attempts => a.total.cmp(&b.total).then(a.key.cmp(&b.key)),
            };
            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        })
        .collect()
}

/// Pure presenter for a single key stats row
pub fn present_row(data: &KeyRowData) -> Row<'static> {
    let key_display = if data.key == ' ' {
        "SPACE".to_string()
    } else {
        data.key.to_string()
    };

    let acc_color = if data.accuracy >= 95.0 {
        Color::Green
    } else if data.is_weak() {
        Color::Red
    } else {
        Color::Yellow
    };

    let attempts_display = if data.session_attempts > 0 {
        format!("{} (+{})", data.total, data.session_attempts)
    } else {
        data.total.to_string()
    };

    Row::new(vec![
        Cell::from(key_display).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{:.1}", data.accuracy)).style(Style::default().fg(acc_color)),
        Cell::from(data.errors.to_string()),
        Cell::from(attempts_display),
        Cell::from(if data.is_weak() { "practice" } else { "" })
            .style(Style::default().fg(Color::Red)),
    ])
}

/// Render the key accuracy screen
pub fn render_key_stats(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Stats table
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let state = &mut app.key_stats_state;
    let sort_direction = if state.sort_ascending { "↑" } else { "↓" };
    let title = Paragraph::new(format!(
        "Key Accuracy (Sort: {} {sort_direction})",
        state.sort_by
    ))
    .block(Block::default().borders(Borders::ALL).title("Stats"))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let rows = sorted_rows(
        &app.test.history().key_stats(),
        app.test.engine().key_stats(),
        &state.sort_by,
        state.sort_ascending,
    );

    if rows.is_empty() {
        let no_data = Paragraph::new("No key statistics yet. Finish a test to collect data.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[1]);
    } else {
        // borders + header
        let table_height = chunks[1].height.saturating_sub(3) as usize;
        let max_scroll = rows.len().saturating_sub(table_height);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        let indicator = |s: SortBy| if state.sort_by == s { sort_direction } else { "" };
        let header = Row::new(vec![
            Cell::from(format!("Key {}", indicator(SortBy::Key))),
            Cell::from(format!("Accuracy (%) {}", indicator(SortBy::Accuracy))),
            Cell::from("Errors"),
            Cell::from(format!("Attempts {}", indicator(SortBy::Attempts))),
            Cell::from(""),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let visible_rows: Vec<Row> = rows
            .iter()
            .skip(state.scroll_offset)
            .take(table_height)
            .map(present_row)
            .collect();

        let widths = [
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Min(10),
        ];

        let table = Table::new(visible_rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Keys"))
            .column_spacing(2);

        f.render_widget(table, chunks[1]);
    }

    let instructions = Paragraph::new(
        "(↑/↓) scroll  (1-3) sort  (space) reverse  (b/backspace) back  (n) new  (r) retry",
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(instructions, chunks[2]);
}
