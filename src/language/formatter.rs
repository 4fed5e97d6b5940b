use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

pub const PUNCTUATION: [char; 6] = ['.', ',', ';', ':', '?', '!'];

const CAPITALIZE_RATE: f64 = 0.2;
const NUMBER_RATE: f64 = 0.1;
const PUNCTUATION_RATE: f64 = 0.2;

/// Per-word decoration applied to drawn vocabulary words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordFormatter {
    pub punctuation: bool,
    pub numbers: bool,
}

impl WordFormatter {
    pub fn new(punctuation: bool, numbers: bool) -> Self {
        Self {
            punctuation,
            numbers,
        }
    }

    /// Formatting only happens when at least one option is enabled; plain
    /// vocabulary is returned untouched otherwise.
    pub fn is_enabled(&self) -> bool {
        self.punctuation || self.numbers
    }

    /// Randomly capitalize, replace with a number, or append punctuation.
    ///
    /// A number replaces the word outright, so it never carries punctuation.
    pub fn format(&self, word: &str, rng: &mut dyn RngCore) -> String {
        let mut result = if rng.gen_bool(CAPITALIZE_RATE) {
            capitalize_first_letter(word)
        } else {
            word.to_string()
        };

        if self.numbers && rng.gen_bool(NUMBER_RATE) {
            return rng.gen_range(0..999).to_string();
        }

        if self.punctuation && rng.gen_bool(PUNCTUATION_RATE) {
            if let Some(mark) = PUNCTUATION.choose(rng) {
                result.push(*mark);
            }
        }

        result
    }

    pub fn format_all(&self, words: Vec<String>, rng: &mut dyn RngCore) -> Vec<String> {
        if !self.is_enabled() {
            return words;
        }
        words.iter().map(|w| self.format(w, rng)).collect()
    }
}

pub fn capitalize_first_letter(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
