// Public API for integration tests and the server binary

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod protocol;
pub mod questions;
pub mod registry;
pub mod room;
pub mod types;
pub mod ws;

// Re-export broadcast for testing
pub mod broadcast;
