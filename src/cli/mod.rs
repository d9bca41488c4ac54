//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

pub mod commands;
pub mod output;

pub use commands::Commands;
pub use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "bctheme", version, about = "Copy, package and apply CMS themes")]
pub struct Cli {
    /// Emit JSON on stdout instead of human-readable text
    #[arg(
        long,
        global = true,
        env = "BC_ROBOT",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file to use instead of the global and project files
    #[arg(long, global = true, env = "BC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Format requested by `--robot` or `BC_ROBOT`; `robot.format` can
    /// still switch a human run to JSON.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if self.robot {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}
