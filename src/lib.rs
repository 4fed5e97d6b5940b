// Library surface: the typing engine and everything around it that does not
// need a terminal. The TUI in main.rs is a thin layer on top.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod engine;
pub mod events;
pub mod history;
pub mod language;
pub mod metrics;
pub mod results;
pub mod runtime;
pub mod session;
pub mod time_series;
pub mod timer;
pub mod word_generator;
