//! Command-line definitions for the grid harvester relay.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Drives a financial data page in an existing WebDriver session.
///
/// Reads `SCRAPE_CMD` frames from stdin, one JSON document per line, and
/// writes progress and completion events to stdout in the same framing.
#[derive(Parser, Debug)]
#[command(name = "grid-harvester")]
#[command(version)]
pub(crate) struct Cli {
    /// WebDriver server endpoint
    #[arg(long, env = "GRID_WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Id of the WebDriver session whose current tab is driven
    #[arg(long, env = "GRID_SESSION_ID")]
    pub session_id: Option<String>,

    /// RON file with engine tunables
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<LevelFilter>,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Skip copying each finished report to the page clipboard
    #[arg(long)]
    pub no_clipboard: bool,
}
