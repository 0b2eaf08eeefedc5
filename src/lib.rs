// Macro Tracker - Core Library
// Exposes all modules for the server binary, the setup checker, and tests

pub mod analyzer;
pub mod config;
pub mod db;
pub mod fetcher;
pub mod notifier;
pub mod server;
pub mod signal;

// Re-export commonly used types
pub use analyzer::Analyzer;
pub use config::AppConfig;
pub use db::{Database, MacroReading};
pub use fetcher::{FredClient, HistoryBundle, MacroSnapshot, SeriesPoint};
pub use notifier::Notifier;
pub use server::{router, AppState};
pub use signal::{evaluate, regime_score, Action, Signal};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
