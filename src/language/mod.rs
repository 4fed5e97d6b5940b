pub mod core;
pub mod formatter;
pub mod quotes;
pub mod selector;

// Re-export the main types for convenience
pub use core::Language;
pub use formatter::WordFormatter;
pub use quotes::QuoteCorpus;
pub use selector::{selector_for, BiasedSelector, RandomSelector, WordSelector};
