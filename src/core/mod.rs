pub mod commands;
pub mod config;
pub mod parse;
pub mod session;
