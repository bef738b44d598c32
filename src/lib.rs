// Library exports for testing and reusability

// Database modules
pub mod db;

// Model modules
pub mod models;

// Service modules
pub mod services;

// Utility modules
pub mod utils;

// Command modules
pub mod commands;

// Shared application state
pub mod app_state;

pub use app_state::AppState;
