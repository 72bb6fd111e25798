pub mod config;
pub mod logging;
pub mod scrape;
pub mod watcher;
