use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum overflow characters accepted per word.
pub const MAX_EXTRA_CHARS: usize = 15;

/// Size of the word pool generated for timed tests.
pub const TIME_MODE_POOL: usize = 300;

/// A single word the user is asked to type. Immutable for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub id: String,
    pub text: String,
    pub chars: Vec<char>,
}

impl Word {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let chars = text.chars().collect();
        Self {
            id: id.into(),
            text,
            chars,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Position of the caret. `char_index` runs past the word's length while extras are typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub word_index: usize,
    pub char_index: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharState {
    #[default]
    Untyped,
    Correct,
    Incorrect,
}

/// Cumulative keystroke counters. Backspace never decrements these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub correct: usize,
    pub incorrect: usize,
    pub extra: usize,
    pub total_keystrokes: usize,
}

/// Per-character attempt counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStat {
    pub total: u64,
    pub errors: u64,
}

impl KeyStat {
    /// Fraction of attempts typed correctly, 1.0 when never attempted.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.total.saturating_sub(self.errors) as f64 / self.total as f64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

impl SessionStatus {
    /// Keystrokes are accepted only while idle (auto-start) or running.
    pub fn accepts_input(&self) -> bool {
        matches!(self, SessionStatus::Idle | SessionStatus::Running)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuoteLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// What ends a test and how much text it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMode {
    /// Countdown of `seconds`; ends on timer expiry.
    Time { seconds: u32 },
    /// Ends once `count` words have been completed.
    Words { count: usize },
    /// One quote; ends when its last word is completed.
    Quote { length: QuoteLength },
}

impl TestMode {
    pub fn is_timed(&self) -> bool {
        matches!(self, TestMode::Time { .. })
    }
}

impl Default for TestMode {
    fn default() -> Self {
        TestMode::Time { seconds: 30 }
    }
}

impl fmt::Display for TestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestMode::Time { seconds } => write!(f, "time {seconds}"),
            TestMode::Words { count } => write!(f, "words {count}"),
            TestMode::Quote { length } => write!(f, "quote {length}"),
        }
    }
}
