use crate::metrics;
use crate::session::SessionStats;
use crate::time_series::{wpm_values, WpmSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final scores for one test; also the persisted history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub date: DateTime<Utc>,
    pub wpm: u32,
    pub acc: u32,
    pub raw: u32,
    pub consistency: u32,
    /// Seconds credited to the test.
    pub duration: u32,
    pub correct: usize,
    pub incorrect: usize,
    #[serde(default)]
    pub cpm: u32,
}

impl SessionResult {
    pub fn compute(
        stats: &SessionStats,
        duration_secs: u32,
        snapshots: &[WpmSnapshot],
        date: DateTime<Utc>,
    ) -> Self {
        let typed = stats.correct + stats.incorrect;
        let keystrokes = if stats.total_keystrokes > 0 {
            stats.total_keystrokes
        } else {
            typed
        };
        let secs = metrics::floored_secs(duration_secs as f64);

        Self {
            date,
            wpm: metrics::wpm(stats.correct, secs),
            acc: metrics::accuracy(stats.correct, typed),
            raw: metrics::wpm(keystrokes, secs),
            consistency: metrics::consistency(&wpm_values(snapshots)),
            duration: duration_secs,
            correct: stats.correct,
            incorrect: stats.incorrect,
            cpm: metrics::cpm(keystrokes, secs),
        }
    }
}
