pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod dispatch;
pub mod error;
pub mod pages;
pub mod sanitize;
pub mod server;
pub mod session;
pub mod types;
