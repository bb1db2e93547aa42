pub mod api;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod graph;
pub mod logging;
pub mod models;
pub mod row_table;
pub mod utils;

/// ASCII art logo for the dashboard header
pub const LOGO: &str = "\
 ┏┓╻╻┏┓╻┏━┓╻ ╻╺┳╸
 ┃┗┫┃┃┗┫┃ ┃┃ ┃ ┃
 ╹ ╹╹╹ ╹┗━┛┗━┛ ╹  dash";
