use std::path::PathBuf;

use clap::Parser;

/// Keystone: module initialization and service supervision
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Init tag to run instead of a normal startup (e.g. "install")
    #[arg(long, default_value = "")]
    pub action: String,

    /// Configuration file (.json, .yaml/.yml or .toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long, value_name = "SECS")]
    pub run_for: Option<u64>,
}
