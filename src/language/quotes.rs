use super::core::read_embedded;
use crate::session::QuoteLength;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

/// Quotes bucketed by length: short is roughly 80-160 characters,
/// medium 160-300, long 300 and up.
#[derive(Deserialize, Clone, Debug)]
pub struct QuoteCorpus {
    pub name: String,
    pub short: Vec<String>,
    pub medium: Vec<String>,
    pub long: Vec<String>,
}

impl QuoteCorpus {
    pub fn english() -> Self {
        read_embedded("quotes.json")
            .and_then(|s| serde_json::from_str(s).map_err(Into::into))
            .unwrap_or_else(|e| panic!("embedded quote corpus is invalid: {e}"))
    }

    pub fn quotes(&self, length: QuoteLength) -> &[String] {
        match length {
            QuoteLength::Short => &self.short,
            QuoteLength::Medium => &self.medium,
            QuoteLength::Long => &self.long,
        }
    }

    /// Pick one quote of the requested length, falling back to medium when
    /// that bucket is empty.
    pub fn choose<R: Rng + ?Sized>(&self, length: QuoteLength, rng: &mut R) -> Option<&str> {
        self.quotes(length)
            .choose(rng)
            .or_else(|| self.medium.choose(rng))
            .map(String::as_str)
    }
}
