// CLI module for oggpage
//
// Command-line front end over the library: page listings, seek indexes and
// checksum verification for one or many Ogg files.

pub mod commands;
pub mod config;
pub mod output;

pub use config::{Commands, Config};
pub use output::OutputFormatter;
