pub mod config;
pub mod database;
pub mod events;
pub mod logging;
