pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod messages;
pub mod records;
