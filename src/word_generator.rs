use crate::{
    language::{selector_for, Language, QuoteCorpus, WordFormatter},
    session::{QuoteLength, TestMode, Word, TIME_MODE_POOL},
};
use rand::RngCore;

/// Options that shape generated vocabulary; ignored for quotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordGenConfig {
    pub include_punctuation: bool,
    pub include_numbers: bool,
}

/// Handles all word and quote generation for a test
pub struct WordGenerator {
    language: Language,
    quotes: QuoteCorpus,
}

impl Default for WordGenerator {
    fn default() -> Self {
        Self::new(Language::english(), QuoteCorpus::english())
    }
}

impl WordGenerator {
    pub fn new(language: Language, quotes: QuoteCorpus) -> Self {
        Self { language, quotes }
    }

    /// Produce the word sequence for a test.
    ///
    /// `bias_chars` nudges vocabulary selection toward weak keys; quotes ignore it.
    pub fn generate(
        &self,
        mode: TestMode,
        config: WordGenConfig,
        bias_chars: &[char],
        rng: &mut dyn RngCore,
    ) -> Vec<Word> {
        match mode {
            TestMode::Time { .. } => self.generate_words(TIME_MODE_POOL, config, bias_chars, rng),
            TestMode::Words { count } => self.generate_words(count, config, bias_chars, rng),
            TestMode::Quote { length } => self.generate_quote(length, rng),
        }
    }

    fn generate_words(
        &self,
        count: usize,
        config: WordGenConfig,
        bias_chars: &[char],
        rng: &mut dyn RngCore,
    ) -> Vec<Word> {
        let selector = selector_for(bias_chars);
        let words = selector.select_words(&self.language, count, rng);

        let formatter = WordFormatter::new(config.include_punctuation, config.include_numbers);
        formatter
            .format_all(words, rng)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Word::new(format!("word-{i}"), text))
            .collect()
    }

    fn generate_quote(&self, length: QuoteLength, rng: &mut dyn RngCore) -> Vec<Word> {
        self.quotes
            .choose(length, rng)
            .map(split_quote)
            .unwrap_or_default()
    }
}

/// Split quote text on whitespace, keeping punctuation and case verbatim.
pub fn split_quote(text: &str) -> Vec<Word> {
    text.split_whitespace()
        .enumerate()
        .map(|(i, w)| Word::new(format!("quote-{i}"), w))
        .collect()
}
