/// Application settings loading from abonementus.toml and environment
pub mod app;

/// Database configuration, connection management, and the number-column migration
pub mod database;
