pub mod aggregator;
pub mod app;
pub mod display;
pub mod error;
pub mod input;
pub mod logging;
pub mod overlay;
pub mod platform;
pub mod scheduler;
pub mod settings;
