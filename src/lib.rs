// The binary entry point is main.rs; it and the integration tests and
// benchmarks all reach the code through this module tree.

pub mod api;
pub mod app;
pub mod clipboard;
pub mod config;
pub mod event;
pub mod logging;
pub mod session;
pub mod ui;
