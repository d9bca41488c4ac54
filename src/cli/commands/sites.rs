//! bctheme sites - List sites and their themes

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json, robot_ok};
use crate::error::Result;
use crate::storage::SiteStore;

#[derive(Args, Debug)]
pub struct SitesArgs {}

pub fn run(ctx: &AppContext, _args: &SitesArgs) -> Result<()> {
    let sites = ctx.db.list_sites()?;

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&robot_ok(&sites));
    }

    if sites.is_empty() {
        println!("{}", "No sites. Run `bctheme init` first.".dimmed());
        return Ok(());
    }

    println!("{:6} {:24} {:24} {}", "ID".bold(), "TITLE".bold(), "THEME".bold(), "STATUS".bold());
    println!("{}", "─".repeat(66).dimmed());
    for site in &sites {
        let theme_missing = !ctx.scanner().exists(&site.theme);
        let theme = if theme_missing {
            site.theme.red()
        } else {
            site.theme.cyan()
        };
        let status = if site.status { "public" } else { "private" };
        println!("{:6} {:24} {:24} {}", site.id, site.title, theme, status.dimmed());
    }
    Ok(())
}
