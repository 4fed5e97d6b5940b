use crate::session::Cursor;
use std::sync::mpsc::{self, Receiver, Sender};

/// Signals the engine emits for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingEvent {
    CharacterTyped {
        expected: char,
        typed: char,
        correct: bool,
    },
    CursorMoved(Cursor),
    WordCompleted {
        word_index: usize,
    },
    TestCompleted,
    ErrorOccurred,
    StatsChanged {
        correct: usize,
        total_keystrokes: usize,
    },
}

/// Fan-out of [`TypingEvent`]s to subscribers, owned by the engine.
///
/// Each subscriber gets its own channel; subscribers whose receiver was
/// dropped are pruned on the next emit.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<TypingEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<TypingEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: TypingEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
