pub mod charting;
pub mod key_stats;
pub mod screen;

use std::ops::Range;
use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget},
    Frame,
};
use rapidkeys::session::{CharState, SessionStatus};
use unicode_width::UnicodeWidthStr;

use crate::{ui::screen::current_screen, App};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Lines of words visible while typing.
const WORD_ROWS: usize = 3;
/// Lines of the replay shown under the results.
const REPLAY_ROWS: usize = 4;

pub fn draw(app: &mut App, f: &mut Frame) {
    current_screen(&app.state).render(app, f);
}

struct Styles {
    untyped: Style,
    correct: Style,
    incorrect: Style,
    caret: Style,
}

impl Styles {
    fn new(confidence_mode: bool) -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let (correct, incorrect) = if confidence_mode {
            (bold, bold)
        } else {
            (bold.fg(Color::Green), bold.fg(Color::Red))
        };
        Self {
            untyped: bold.add_modifier(Modifier::DIM),
            correct,
            incorrect,
            caret: bold
                .add_modifier(Modifier::DIM)
                .add_modifier(Modifier::UNDERLINED),
        }
    }
}

/// Spans for one word followed by its separating space.
///
/// `caret` is the cursor's char index when this is the current word; the caret
/// sits on the separator once every char and extra has been typed.
fn word_spans(
    chars: &[char],
    states: &[CharState],
    extras: &[char],
    caret: Option<usize>,
    styles: &Styles,
) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(chars.len() + extras.len() + 1);
    for (idx, c) in chars.iter().enumerate() {
        let style = if caret == Some(idx) {
            styles.caret
        } else {
            match states.get(idx).copied().unwrap_or_default() {
                CharState::Untyped => styles.untyped,
                CharState::Correct => styles.correct,
                CharState::Incorrect => styles.incorrect,
            }
        };
        spans.push(Span::styled(c.to_string(), style));
    }
    for c in extras {
        spans.push(Span::styled(c.to_string(), styles.incorrect));
    }
    let separator = if caret == Some(chars.len() + extras.len()) {
        styles.caret
    } else {
        Style::default()
    };
    spans.push(Span::styled(" ", separator));
    spans
}

/// Greedy word wrap: word index ranges per line, words separated by one column.
pub(crate) fn wrap_lines(widths: &[usize], max_width: usize) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used = 0;
    for (i, &w) in widths.iter().enumerate() {
        if i == start {
            used = w;
        } else if used + 1 + w > max_width {
            lines.push(start..i);
            start = i;
            used = w;
        } else {
            used += 1 + w;
        }
    }
    if start < widths.len() {
        lines.push(start..widths.len());
    }
    lines
}

/// Range of lines to show so the current word stays on the second row.
pub(crate) fn visible_lines(lines: &[Range<usize>], current_word: usize, rows: usize) -> Range<usize> {
    let current = lines
        .iter()
        .position(|r| r.contains(&current_word))
        .unwrap_or(lines.len().saturating_sub(1));
    let end = (current.saturating_sub(1) + rows).min(lines.len());
    end.saturating_sub(rows)..end
}

pub(crate) fn best_line(wpm: u32, best_before: Option<u32>) -> String {
    match best_before {
        Some(best) if wpm <= best => format!("personal best {best} wpm"),
        _ if wpm > 0 => "new personal best!".to_string(),
        _ => String::new(),
    }
}

pub(crate) fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let test = &app.test;
    let engine = test.engine();
    let cursor = engine.cursor();
    let status = test.status();
    let styles = Styles::new(test.config().confidence_mode);
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);

    let max_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1) as usize;
    let widths: Vec<usize> = engine
        .words()
        .iter()
        .enumerate()
        .map(|(i, w)| w.text.width() + engine.extras(i).len())
        .collect();
    let lines = wrap_lines(&widths, max_width);
    let window = visible_lines(&lines, cursor.word_index, WORD_ROWS);

    let text: Vec<Line> = lines[window]
        .iter()
        .map(|range| {
            let spans: Vec<Span> = range
                .clone()
                .flat_map(|i| {
                    let caret = (i == cursor.word_index && status != SessionStatus::Paused)
                        .then_some(cursor.char_index);
                    word_spans(
                        &engine.words()[i].chars,
                        engine.char_states(i),
                        engine.extras(i),
                        caret,
                        &styles,
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // status
            Constraint::Length(1),
            Constraint::Length(WORD_ROWS as u16),
            Constraint::Length(1),
            Constraint::Length(1), // hint
            Constraint::Min(0),
        ])
        .split(area);

    let mut status_spans = vec![
        Span::styled(test.mode().to_string(), dim_bold_style),
        Span::raw("   "),
        Span::styled(format!("{}s", test.timer()), bold_style.fg(Color::Yellow)),
    ];
    if status != SessionStatus::Idle {
        status_spans.push(Span::raw("   "));
        status_spans.push(Span::styled(
            format!(
                "{} wpm   {}% acc",
                test.live_wpm(Instant::now()),
                test.live_accuracy()
            ),
            bold_style,
        ));
    }
    if let Some(best) = app.best_before {
        status_spans.push(Span::raw("   "));
        status_spans.push(Span::styled(format!("best {best}"), dim_bold_style));
    }
    Paragraph::new(Line::from(status_spans))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let words = Paragraph::new(text);
    // a prompt that fits on one line is centered
    let words = if lines.len() == 1 {
        words.alignment(Alignment::Center)
    } else {
        words.alignment(Alignment::Left)
    };
    let words = if status == SessionStatus::Paused {
        words.style(Style::default().add_modifier(Modifier::DIM))
    } else {
        words
    };
    words.render(chunks[3], buf);

    let hint = match status {
        SessionStatus::Idle => Span::styled(
            "start typing to begin   (esc) restart   (ctrl+c) quit",
            Style::default().add_modifier(Modifier::ITALIC),
        ),
        SessionStatus::Paused => Span::styled(
            "PAUSED - press enter to resume",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ),
        SessionStatus::Running | SessionStatus::Finished => Span::styled(
            "(esc) restart",
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ),
    };
    Paragraph::new(hint)
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
}

pub(crate) fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let test = &app.test;
    let Some(result) = test.result() else {
        return;
    };
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),                     // chart
            Constraint::Length(1),                  // main stats
            Constraint::Length(1),                  // details
            Constraint::Length(1),                  // personal best
            Constraint::Length(1),                  // padding
            Constraint::Length(REPLAY_ROWS as u16), // replay
            Constraint::Length(1),                  // padding
            Constraint::Length(1),                  // settings
            Constraint::Length(1),                  // legend
        ])
        .split(area);

    let points = charting::chart_points(test.controller().snapshots());
    let (overall_duration, highest_wpm) = charting::compute_chart_params(&points, result.duration);
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&points)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        );
    chart.render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {} raw   {}% consistency",
            result.wpm, result.acc, result.raw, result.consistency
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{}   {}s   {} correct   {} incorrect   {} cpm",
            test.mode().to_string(),
            result.duration,
            result.correct,
            result.incorrect,
            result.cpm
        ),
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        best_line(result.wpm, app.best_before),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    let styles = Styles::new(false);
    let replay = test.replay();
    let max_width = chunks[5].width.max(1) as usize;
    let widths: Vec<usize> = replay
        .iter()
        .map(|w| w.text.width() + w.extras.len())
        .collect();
    let lines = wrap_lines(&widths, max_width);
    // the tail of the replay is the most recent typing
    let first = lines.len().saturating_sub(REPLAY_ROWS);
    let replay_text: Vec<Line> = lines[first..]
        .iter()
        .map(|range| {
            Line::from(
                replay[range.clone()]
                    .iter()
                    .flat_map(|w| word_spans(&w.chars, &w.states, &w.extras, None, &styles))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    Paragraph::new(replay_text).render(chunks[5], buf);

    let config = test.config();
    let on_off = |b: bool| if b { "on" } else { "off" };
    Paragraph::new(Span::styled(
        format!(
            "mode: {}   punctuation: {}   numbers: {}   confidence: {}",
            config.test_mode(),
            on_off(config.include_punctuation),
            on_off(config.include_numbers),
            on_off(config.confidence_mode)
        ),
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[7], buf);

    Paragraph::new(Span::styled(
        "(r)etry / (n)ew / (s)tats / (m)ode / (l)ength / (p)unctuation / n(u)mbers / (c)onfidence / (q)uit",
        italic_style,
    ))
    .render(chunks[8], buf);
}
