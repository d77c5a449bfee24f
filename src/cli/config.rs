// CLI configuration
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use oggpage::ScanConfig;
use std::path::{Path, PathBuf};

/// oggpage - Ogg page inspection tool
#[derive(Parser, Debug)]
#[command(name = "oggpage")]
#[command(about = "Decode, index and verify the pages of Ogg files", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Scan settings as JSON (skip_payload, checksum_policy, progress_interval)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for decoded data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every page of the given file(s); "-" reads standard input
    Pages {
        /// Ogg file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Include each page payload, base64 encoded
        #[arg(short, long)]
        payload: bool,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Build a seek index with per-stream summaries and sequence gaps
    Index {
        /// Ogg file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check the stored CRC of every page
    Verify {
        /// Ogg file path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// Index every file under a directory matching a pattern
    Batch {
        /// Directory path
        #[arg(short, long)]
        directory: String,

        /// File pattern (e.g., "*.ogg", "*.opus")
        #[arg(short, long, default_value = "*.ogg")]
        pattern: String,
    },
}

/// Load scan settings from a JSON file; missing keys take their defaults
pub fn load_scan_config(path: &Path) -> Result<ScanConfig> {
    let text = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid scan config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oggpage::ChecksumPolicy;
    use std::io::Write;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let config = Config::try_parse_from([
            "oggpage", "pages", "a.ogg", "b.ogg", "--payload", "-f", "table", "-q",
        ])
        .unwrap();
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.quiet);
        match config.command {
            Commands::Pages { files, payload, output } => {
                assert_eq!(files, vec!["a.ogg", "b.ogg"]);
                assert!(payload);
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_files_are_required() {
        assert!(Config::try_parse_from(["oggpage", "verify"]).is_err());
        assert!(Config::try_parse_from(["oggpage", "index", "--format", "key-value", "x.ogg"]).is_ok());
    }

    #[test]
    fn test_load_scan_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"checksum_policy": "warn", "skip_payload": true}}"#).unwrap();

        let config = load_scan_config(file.path()).unwrap();
        assert_eq!(config.checksum_policy, ChecksumPolicy::Warn);
        assert!(config.skip_payload);
        assert_eq!(config.progress_interval, 1000);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, "not json").unwrap();
        assert!(load_scan_config(bad.path()).is_err());
        assert!(load_scan_config(Path::new("/nonexistent/scan.json")).is_err());
    }
}
