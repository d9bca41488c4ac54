//! bctheme list - List installed themes

use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json, robot_ok};
use crate::error::Result;
use crate::storage::SiteStore;
use crate::theme::Theme;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show themes that ship default data
    #[arg(long)]
    pub with_data: bool,
}

#[derive(Serialize)]
struct ThemeRow<'a> {
    #[serde(flatten)]
    theme: &'a Theme,
    /// Ids of the sites currently using this theme.
    sites: Vec<i64>,
}

pub fn run(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    debug!(target: "list", mode = ?ctx.output_format, "output mode selected");

    let themes: Vec<Theme> = ctx
        .packager()
        .index()?
        .into_iter()
        .filter(|t| !args.with_data || t.has_default_data)
        .collect();
    let sites = ctx.db.list_sites()?;

    let rows: Vec<ThemeRow<'_>> = themes
        .iter()
        .map(|theme| ThemeRow {
            theme,
            sites: sites
                .iter()
                .filter(|s| s.theme == theme.name)
                .map(|s| s.id)
                .collect(),
        })
        .collect();

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&robot_ok(&rows));
    }

    if rows.is_empty() {
        println!("{}", "No themes installed".dimmed());
        println!();
        println!("Themes live in {}", ctx.paths.themes_root.display());
        return Ok(());
    }

    println!(
        "{:24} {:28} {:10} {:8} {}",
        "NAME".bold(),
        "TITLE".bold(),
        "VERSION".bold(),
        "DATA".bold(),
        "SITES".bold()
    );
    println!("{}", "─".repeat(80).dimmed());
    for row in &rows {
        let version = row.theme.version.as_deref().unwrap_or("-");
        let data = if row.theme.has_default_data { "yes" } else { "-" };
        let sites = row
            .sites
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let name = if row.sites.is_empty() {
            row.theme.name.normal()
        } else {
            row.theme.name.green()
        };
        println!(
            "{:24} {:28} {:10} {:8} {}",
            name,
            row.theme.title,
            version.dimmed(),
            data,
            sites
        );
    }
    println!();
    println!("{} themes", rows.len().to_string().bold());
    Ok(())
}
