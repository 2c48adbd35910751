pub mod api;
pub mod app;
pub mod config;
pub mod interactive;
pub mod logging;
pub mod reveal;
pub mod runtime;
pub mod session;
pub mod state;
pub mod terminal;
pub mod types;
pub mod ui;
pub mod util;

#[cfg(test)]
mod test_support;
