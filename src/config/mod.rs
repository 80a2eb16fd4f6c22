/// Application configuration loading from config.toml
pub mod app;

/// Database configuration and connection management
pub mod database;

/// Operator tokens from environment variables
pub mod operators;
