// CLI binary entry point for oggpage
//
// This is the main entry point for the oggpage command-line tool.

mod cli;

use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::error;
use oggpage::ScanConfig;

use cli::commands::{command_batch, command_index, command_pages, command_verify};
use cli::config::load_scan_config;
use cli::{Commands, Config, OutputFormatter};

fn init_logger(config: &Config) {
    // RUST_LOG wins; otherwise info, debug with --verbose, warn with --quiet
    let default_level = if config.verbose {
        "debug"
    } else if config.quiet {
        "warn"
    } else {
        "info"
    };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn resolve_scan_config(config: &Config) -> Result<ScanConfig> {
    match &config.config {
        Some(path) => load_scan_config(path),
        None => Ok(ScanConfig::default()),
    }
}

fn run(config: &Config) -> Result<()> {
    let scan_config = resolve_scan_config(config)?;
    let formatter = OutputFormatter::new(config.format, config.quiet);

    match &config.command {
        Commands::Pages { files, payload, output } => {
            command_pages(files, *payload, output.as_deref(), &scan_config, &formatter)
        }
        Commands::Index { files, output } => {
            command_index(files, output.as_deref(), &scan_config, &formatter)
        }
        Commands::Verify { files } => command_verify(files, &scan_config, &formatter),
        Commands::Batch { directory, pattern } => {
            command_batch(directory, pattern, &scan_config, &formatter)
        }
    }
}

fn main() {
    let config = Config::parse();
    init_logger(&config);

    if let Err(e) = run(&config) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
