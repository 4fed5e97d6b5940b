use crate::events::{EventBus, TypingEvent};
use crate::session::{
    CharState, Cursor, KeyStat, SessionStats, TestMode, Word, MAX_EXTRA_CHARS,
};
use std::collections::BTreeMap;
use std::sync::mpsc::Receiver;
use tracing::trace;

/// Result of feeding one key into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeystrokeOutcome {
    /// No state changed: nothing to type, extra-character cap reached, or
    /// backspace at the very start.
    Ignored,
    Accepted { test_complete: bool },
}

impl KeystrokeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, KeystrokeOutcome::Accepted { .. })
    }

    pub fn test_complete(&self) -> bool {
        matches!(
            self,
            KeystrokeOutcome::Accepted {
                test_complete: true
            }
        )
    }
}

/// One word of a finished (or in-progress) session, for review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayWord {
    pub text: String,
    pub chars: Vec<char>,
    pub states: Vec<CharState>,
    pub extras: Vec<char>,
}

impl ReplayWord {
    pub fn has_errors(&self) -> bool {
        !self.extras.is_empty() || self.states.contains(&CharState::Incorrect)
    }
}

/// Keystroke bookkeeping for one test: cursor, per-character outcomes,
/// overflow characters, counters and per-key stats.
///
/// Status gating is the caller's job; every call here is applied as-is.
#[derive(Debug)]
pub struct TypingEngine {
    words: Vec<Word>,
    /// Number of completed words that ends the test, `None` for timed tests.
    completion_target: Option<usize>,
    cursor: Cursor,
    char_states: Vec<Vec<CharState>>,
    extras: Vec<Vec<char>>,
    stats: SessionStats,
    key_stats: BTreeMap<char, KeyStat>,
    events: EventBus,
}

impl TypingEngine {
    pub fn new(mode: TestMode, words: Vec<Word>) -> Self {
        let mut engine = Self {
            words: Vec::new(),
            completion_target: None,
            cursor: Cursor::default(),
            char_states: Vec::new(),
            extras: Vec::new(),
            stats: SessionStats::default(),
            key_stats: BTreeMap::new(),
            events: EventBus::new(),
        };
        engine.reset(mode, words);
        engine
    }

    /// Clear all per-session state and swap in a fresh word sequence.
    /// Subscribers stay registered.
    pub fn reset(&mut self, mode: TestMode, words: Vec<Word>) {
        self.completion_target = match mode {
            TestMode::Time { .. } => None,
            TestMode::Words { count } => Some(count.min(words.len())),
            TestMode::Quote { .. } => Some(words.len()),
        };
        self.char_states = words.iter().map(|w| vec![CharState::Untyped; w.len()]).collect();
        self.extras = vec![Vec::new(); words.len()];
        self.words = words;
        self.cursor = Cursor::default();
        self.stats = SessionStats::default();
        self.key_stats.clear();
        self.events.emit(TypingEvent::CursorMoved(self.cursor));
    }

    pub fn subscribe(&mut self) -> Receiver<TypingEvent> {
        self.events.subscribe()
    }

    pub fn process_character(&mut self, key: char) -> KeystrokeOutcome {
        let word_idx = self.cursor.word_index;
        let char_idx = self.cursor.char_index;
        let Some(word) = self.words.get(word_idx) else {
            return KeystrokeOutcome::Ignored;
        };
        let word_len = word.len();
        let mut test_complete = false;

        if char_idx < word_len {
            let expected = word.chars[char_idx];
            let correct = key == expected;

            let key_stat = self.key_stats.entry(expected).or_default();
            key_stat.total += 1;
            if correct {
                self.stats.correct += 1;
                self.char_states[word_idx][char_idx] = CharState::Correct;
            } else {
                key_stat.errors += 1;
                self.stats.incorrect += 1;
                self.char_states[word_idx][char_idx] = CharState::Incorrect;
            }
            self.stats.total_keystrokes += 1;
            self.cursor.char_index += 1;

            self.events.emit(TypingEvent::CharacterTyped {
                expected,
                typed: key,
                correct,
            });
            if !correct {
                self.events.emit(TypingEvent::ErrorOccurred);
            }
        } else if key == ' ' {
            self.stats.total_keystrokes += 1;
            self.cursor.word_index += 1;
            self.cursor.char_index = 0;
            self.events.emit(TypingEvent::WordCompleted {
                word_index: word_idx,
            });

            test_complete = self
                .completion_target
                .is_some_and(|target| self.cursor.word_index >= target);
        } else {
            let extras = &mut self.extras[word_idx];
            if extras.len() >= MAX_EXTRA_CHARS {
                trace!(word_idx, "extra character dropped at cap");
                return KeystrokeOutcome::Ignored;
            }
            extras.push(key);
            self.cursor.char_index += 1;
            self.stats.extra += 1;
            self.stats.incorrect += 1;
            self.stats.total_keystrokes += 1;
            self.events.emit(TypingEvent::ErrorOccurred);
        }

        self.events.emit(TypingEvent::StatsChanged {
            correct: self.stats.correct,
            total_keystrokes: self.stats.total_keystrokes,
        });
        self.events.emit(TypingEvent::CursorMoved(self.cursor));
        if test_complete {
            self.events.emit(TypingEvent::TestCompleted);
        }

        KeystrokeOutcome::Accepted { test_complete }
    }

    /// Step the cursor back one position, across word boundaries if needed.
    ///
    /// Only visual state is undone; counters and key stats keep every attempt.
    pub fn process_backspace(&mut self) -> KeystrokeOutcome {
        let word_idx = self.cursor.word_index;
        let char_idx = self.cursor.char_index;

        if char_idx > 0 {
            let word_len = self.words.get(word_idx).map_or(0, Word::len);
            if char_idx > word_len {
                self.extras[word_idx].pop();
            } else {
                self.char_states[word_idx][char_idx - 1] = CharState::Untyped;
            }
            self.cursor.char_index -= 1;
        } else if word_idx > 0 {
            let prev = word_idx - 1;
            self.cursor.word_index = prev;
            self.cursor.char_index = self.words[prev].len() + self.extras[prev].len();
        } else {
            return KeystrokeOutcome::Ignored;
        }

        self.stats.total_keystrokes += 1;
        self.events.emit(TypingEvent::CursorMoved(self.cursor));
        KeystrokeOutcome::Accepted {
            test_complete: false,
        }
    }

    /// Words up to and including the cursor's word with their typed state.
    pub fn build_replay(&self) -> Vec<ReplayWord> {
        let end = (self.cursor.word_index + 1).min(self.words.len());
        self.words[..end]
            .iter()
            .enumerate()
            .map(|(i, word)| ReplayWord {
                text: word.text.clone(),
                chars: word.chars.clone(),
                states: self.char_states[i].clone(),
                extras: self.extras[i].clone(),
            })
            .collect()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn key_stats(&self) -> &BTreeMap<char, KeyStat> {
        &self.key_stats
    }

    pub fn char_states(&self, word_idx: usize) -> &[CharState] {
        self.char_states.get(word_idx).map_or(&[], Vec::as_slice)
    }

    pub fn extras(&self, word_idx: usize) -> &[char] {
        self.extras.get(word_idx).map_or(&[], Vec::as_slice)
    }

    pub fn completion_target(&self) -> Option<usize> {
        self.completion_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::QuoteLength;
    use assert_matches::assert_matches;

    fn words(texts: &[&str]) -> Vec<Word> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Word::new(format!("word-{i}"), *t))
            .collect()
    }

    fn engine(texts: &[&str]) -> TypingEngine {
        TypingEngine::new(TestMode::Words { count: texts.len() }, words(texts))
    }

    fn type_str(engine: &mut TypingEngine, s: &str) -> Vec<KeystrokeOutcome> {
        s.chars().map(|c| engine.process_character(c)).collect()
    }

    #[test]
    fn test_new_engine_state() {
        let engine = engine(&["hello", "world"]);
        assert_eq!(engine.cursor(), Cursor::default());
        assert_eq!(engine.stats(), SessionStats::default());
        assert!(engine.key_stats().is_empty());
        assert_eq!(engine.char_states(0), &[CharState::Untyped; 5]);
        assert_eq!(engine.completion_target(), Some(2));
    }

    #[test]
    fn test_correct_character() {
        let mut engine = engine(&["test"]);

        assert_eq!(
            engine.process_character('t'),
            KeystrokeOutcome::Accepted {
                test_complete: false
            }
        );

        assert_eq!(engine.char_states(0)[0], CharState::Correct);
        assert_eq!(engine.cursor().char_index, 1);
        assert_eq!(engine.stats().correct, 1);
        assert_eq!(engine.stats().total_keystrokes, 1);
        assert_eq!(engine.key_stats()[&'t'], KeyStat { total: 1, errors: 0 });
    }

    #[test]
    fn test_incorrect_character_counts_against_expected_key() {
        let mut engine = engine(&["test"]);

        engine.process_character('x');

        assert_eq!(engine.char_states(0)[0], CharState::Incorrect);
        assert_eq!(engine.stats().incorrect, 1);
        assert_eq!(engine.key_stats()[&'t'], KeyStat { total: 1, errors: 1 });
        assert!(!engine.key_stats().contains_key(&'x'));
    }

    #[test]
    fn test_space_mid_word_is_compared_like_any_key() {
        let mut engine = engine(&["test", "run"]);

        engine.process_character('t');
        engine.process_character(' ');

        assert_eq!(engine.cursor(), Cursor { word_index: 0, char_index: 2 });
        assert_eq!(engine.char_states(0)[1], CharState::Incorrect);
        assert_eq!(engine.stats().incorrect, 1);
    }

    #[test]
    fn test_word_then_space_advances_exactly_one_word() {
        let mut engine = engine(&["the", "be", "of"]);

        type_str(&mut engine, "the ");

        assert_eq!(engine.cursor(), Cursor { word_index: 1, char_index: 0 });
        assert_eq!(engine.stats().correct, 3);
        assert_eq!(engine.stats().total_keystrokes, 4);
    }

    #[test]
    fn test_words_mode_completes_after_last_space() {
        let mut engine = engine(&["the", "be", "of"]);

        let outcomes = type_str(&mut engine, "the be of");
        assert!(outcomes.iter().all(|o| !o.test_complete()));

        assert!(engine.process_character(' ').test_complete());
        let stats = engine.stats();
        // spaces advance words and count as keystrokes, but carry no char state
        assert_eq!(stats.correct, 7);
        assert_eq!(stats.incorrect, 0);
        assert_eq!(stats.total_keystrokes, 10);
    }

    #[test]
    fn test_quote_mode_completes_after_last_word() {
        let mut engine = TypingEngine::new(
            TestMode::Quote {
                length: QuoteLength::Short,
            },
            words(&["Be", "kind."]),
        );
        assert_eq!(engine.completion_target(), Some(2));

        type_str(&mut engine, "Be kind.");
        assert!(engine.process_character(' ').test_complete());
    }

    #[test]
    fn test_time_mode_never_completes() {
        let mut engine = TypingEngine::new(TestMode::Time { seconds: 15 }, words(&["a", "b"]));

        let outcomes = type_str(&mut engine, "a b ");
        assert!(outcomes.iter().all(|o| !o.test_complete()));

        // pool exhausted
        assert_eq!(engine.process_character('c'), KeystrokeOutcome::Ignored);
        assert_eq!(engine.stats().total_keystrokes, 4);
    }

    #[test]
    fn test_extra_characters_capped() {
        let mut engine = engine(&["hi", "there"]);
        type_str(&mut engine, "hi");

        for i in 0..MAX_EXTRA_CHARS {
            assert!(engine.process_character('x').is_accepted(), "extra {i}");
        }
        let before = engine.stats();
        assert_eq!(before.extra, MAX_EXTRA_CHARS);
        assert_eq!(before.incorrect, MAX_EXTRA_CHARS);

        let rx = engine.subscribe();
        assert_eq!(engine.process_character('x'), KeystrokeOutcome::Ignored);
        assert_eq!(engine.stats(), before);
        assert_eq!(engine.extras(0).len(), MAX_EXTRA_CHARS);
        assert_eq!(engine.cursor().char_index, 2 + MAX_EXTRA_CHARS);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_space_after_extras_advances() {
        let mut engine = engine(&["hi", "there"]);
        type_str(&mut engine, "hiya ");

        assert_eq!(engine.cursor(), Cursor { word_index: 1, char_index: 0 });
        assert_eq!(engine.extras(0), &['y', 'a']);
    }

    #[test]
    fn test_correct_plus_incorrect_equals_total_without_backspace() {
        let mut engine = engine(&["alpha", "beta", "gamma", "delta"]);
        // no spaces: everything past "alpha" piles up as extras
        for c in "alpxa_betaaaa?gamma".chars() {
            engine.process_character(c);
            let stats = engine.stats();
            assert_eq!(stats.correct + stats.incorrect, stats.total_keystrokes);
        }
    }

    #[test]
    fn test_backspace_within_word() {
        let mut engine = engine(&["test"]);
        type_str(&mut engine, "tx");
        let before = engine.stats();
        let keys_before = engine.key_stats().clone();

        assert!(engine.process_backspace().is_accepted());

        assert_eq!(engine.cursor().char_index, 1);
        assert_eq!(engine.char_states(0)[1], CharState::Untyped);
        assert_eq!(engine.char_states(0)[0], CharState::Correct);
        let after = engine.stats();
        assert_eq!(after.correct, before.correct);
        assert_eq!(after.incorrect, before.incorrect);
        assert_eq!(after.extra, before.extra);
        assert_eq!(after.total_keystrokes, before.total_keystrokes + 1);
        assert_eq!(engine.key_stats(), &keys_before);
    }

    #[test]
    fn test_backspace_removes_extras_first() {
        let mut engine = engine(&["hi"]);
        type_str(&mut engine, "hizz");

        engine.process_backspace();

        assert_eq!(engine.extras(0), &['z']);
        assert_eq!(engine.cursor().char_index, 3);
        assert_eq!(engine.stats().extra, 2);
    }

    #[test]
    fn test_backspace_returns_to_previous_word_end() {
        let mut engine = engine(&["hi", "there"]);
        type_str(&mut engine, "hiq ");
        assert_eq!(engine.cursor(), Cursor { word_index: 1, char_index: 0 });

        engine.process_backspace();

        // lands after the typed extra
        assert_eq!(engine.cursor(), Cursor { word_index: 0, char_index: 3 });
        assert_eq!(engine.stats().total_keystrokes, 5);
    }

    #[test]
    fn test_backspace_at_start_is_ignored() {
        let mut engine = engine(&["test"]);
        assert_eq!(engine.process_backspace(), KeystrokeOutcome::Ignored);
        assert_eq!(engine.stats().total_keystrokes, 0);
    }

    #[test]
    fn test_corrected_mistake_still_counts_as_error() {
        let mut engine = engine(&["ab"]);
        type_str(&mut engine, "x");
        engine.process_backspace();
        type_str(&mut engine, "a");

        assert_eq!(engine.char_states(0)[0], CharState::Correct);
        assert_eq!(engine.key_stats()[&'a'], KeyStat { total: 2, errors: 1 });
        assert_eq!(engine.stats().incorrect, 1);
        assert_eq!(engine.stats().correct, 1);
    }

    #[test]
    fn test_events_for_keystrokes() {
        let mut engine = engine(&["ab", "c"]);
        let rx = engine.subscribe();

        engine.process_character('a');
        engine.process_character('x');
        engine.process_character(' ');
        engine.process_backspace();

        let events: Vec<TypingEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                TypingEvent::CharacterTyped {
                    expected: 'a',
                    typed: 'a',
                    correct: true
                },
                TypingEvent::StatsChanged {
                    correct: 1,
                    total_keystrokes: 1
                },
                TypingEvent::CursorMoved(Cursor {
                    word_index: 0,
                    char_index: 1
                }),
                TypingEvent::CharacterTyped {
                    expected: 'b',
                    typed: 'x',
                    correct: false
                },
                TypingEvent::ErrorOccurred,
                TypingEvent::StatsChanged {
                    correct: 1,
                    total_keystrokes: 2
                },
                TypingEvent::CursorMoved(Cursor {
                    word_index: 0,
                    char_index: 2
                }),
                TypingEvent::WordCompleted { word_index: 0 },
                TypingEvent::StatsChanged {
                    correct: 1,
                    total_keystrokes: 3
                },
                TypingEvent::CursorMoved(Cursor {
                    word_index: 1,
                    char_index: 0
                }),
                TypingEvent::CursorMoved(Cursor {
                    word_index: 0,
                    char_index: 2
                }),
            ]
        );
    }

    #[test]
    fn test_test_completed_event_is_last() {
        let mut engine = engine(&["a"]);
        let rx = engine.subscribe();
        type_str(&mut engine, "a ");
        let events: Vec<TypingEvent> = rx.try_iter().collect();
        assert_eq!(events.last(), Some(&TypingEvent::TestCompleted));
    }

    #[test]
    fn test_build_replay() {
        let mut engine = engine(&["ab", "cd", "ef"]);
        type_str(&mut engine, "axz c");

        let replay = engine.build_replay();

        assert_eq!(replay.len(), 2);
        assert_eq!(replay[0].text, "ab");
        assert_eq!(replay[0].states, vec![CharState::Correct, CharState::Incorrect]);
        assert_eq!(replay[0].extras, vec!['z']);
        assert!(replay[0].has_errors());
        assert_eq!(replay[1].states, vec![CharState::Correct, CharState::Untyped]);
        assert!(!replay[1].has_errors());
    }

    #[test]
    fn test_build_replay_after_pool_exhausted() {
        let mut engine = TypingEngine::new(TestMode::Time { seconds: 15 }, words(&["a"]));
        type_str(&mut engine, "a ");
        assert_eq!(engine.build_replay().len(), 1);
    }

    #[test]
    fn test_reset_clears_everything_and_swaps_words() {
        let mut engine = engine(&["ab", "cd"]);
        type_str(&mut engine, "axzz c");
        let rx = engine.subscribe();

        engine.reset(TestMode::Words { count: 1 }, words(&["new"]));

        assert_eq!(engine.words().len(), 1);
        assert_eq!(engine.words()[0].text, "new");
        assert_eq!(engine.cursor(), Cursor::default());
        assert_eq!(engine.stats(), SessionStats::default());
        assert!(engine.key_stats().is_empty());
        assert!(engine.extras(0).is_empty());
        assert_eq!(engine.char_states(0), &[CharState::Untyped; 3]);
        assert_matches!(rx.try_recv(), Ok(TypingEvent::CursorMoved(_)));
    }
}
