pub mod cmd;
pub mod config;
pub mod dirs;
pub mod display;
pub mod logs;
pub mod server;
pub mod types;
