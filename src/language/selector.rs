use super::core::Language;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Share of draws taken from the bias pool when one exists.
pub const BIAS_RATE: f64 = 0.4;

/// Trait for different word selection strategies
pub trait WordSelector {
    /// Draw `count` words (with replacement) from the language
    fn select_words(&self, language: &Language, count: usize, rng: &mut dyn RngCore)
        -> Vec<String>;
}

/// Uniform draw from the whole vocabulary
pub struct RandomSelector;

impl WordSelector for RandomSelector {
    fn select_words(
        &self,
        language: &Language,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        (0..count)
            .filter_map(|_| language.words.choose(rng).cloned())
            .collect()
    }
}

/// Leans toward words containing characters the user struggles with.
///
/// Each draw comes from the pool of words containing a bias character with
/// probability [`BIAS_RATE`], otherwise from the whole vocabulary. With no
/// matching words this degrades to [`RandomSelector`].
pub struct BiasedSelector {
    pub bias_chars: Vec<char>,
}

impl BiasedSelector {
    pub fn new(bias_chars: Vec<char>) -> Self {
        Self { bias_chars }
    }
}

impl WordSelector for BiasedSelector {
    fn select_words(
        &self,
        language: &Language,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        let biased = language.words_containing(&self.bias_chars);
        if biased.is_empty() {
            return RandomSelector.select_words(language, count, rng);
        }

        (0..count)
            .filter_map(|_| {
                if rng.gen_bool(BIAS_RATE) {
                    biased.choose(rng).map(|w| w.to_string())
                } else {
                    language.words.choose(rng).cloned()
                }
            })
            .collect()
    }
}

/// Pick the selector for a set of bias characters.
pub fn selector_for(bias_chars: &[char]) -> Box<dyn WordSelector> {
    if bias_chars.is_empty() {
        Box::new(RandomSelector)
    } else {
        Box::new(BiasedSelector::new(bias_chars.to_vec()))
    }
}
