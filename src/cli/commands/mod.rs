//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod apply;
pub mod copy;
pub mod delete;
pub mod download;
pub mod export_data;
pub mod init;
pub mod list;
pub mod load_data;
pub mod market;
pub mod patterns;
pub mod show;
pub mod sites;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the install root, default config and database
    Init(init::InitArgs),

    /// List installed themes
    List(list::ListArgs),

    /// Show a theme's metadata, bundled plugins and default data
    Show(show::ShowArgs),

    /// List a theme's default-data patterns
    Patterns(patterns::PatternsArgs),

    /// Duplicate a theme under a new name
    Copy(copy::CopyArgs),

    /// Delete a theme directory
    Delete(delete::DeleteArgs),

    /// Package a theme as a zip archive
    Download(download::DownloadArgs),

    /// Export the current database as a default-data pattern archive
    ExportData(export_data::ExportDataArgs),

    /// Switch a site to a theme
    Apply(apply::ApplyArgs),

    /// Load a theme's default-data pattern into the database
    LoadData(load_data::LoadDataArgs),

    /// List sites and their themes
    Sites(sites::SitesArgs),

    /// List themes published in the theme market feed
    Market(market::MarketArgs),
}

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Init(args) => init::run(ctx, args),
        Commands::List(args) => list::run(ctx, args),
        Commands::Show(args) => show::run(ctx, args),
        Commands::Patterns(args) => patterns::run(ctx, args),
        Commands::Copy(args) => copy::run(ctx, args),
        Commands::Delete(args) => delete::run(ctx, args),
        Commands::Download(args) => download::run(ctx, args),
        Commands::ExportData(args) => export_data::run(ctx, args),
        Commands::Apply(args) => apply::run(ctx, args),
        Commands::LoadData(args) => load_data::run(ctx, args),
        Commands::Sites(args) => sites::run(ctx, args),
        Commands::Market(args) => market::run(ctx, args),
    }
}
