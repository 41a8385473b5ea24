// Library exports for the assistant contract checker
// Integration tests drive the client, checks and runner through these

pub mod api;
pub mod checks;
pub mod commands;
pub mod config;
pub mod report;
pub mod runner;
pub mod suites;
