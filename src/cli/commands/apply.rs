//! bctheme apply - Switch a site to a theme

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json, robot_ok};
use crate::error::Result;
use crate::storage::SiteStore;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Theme to apply
    pub theme: String,

    /// Site id
    #[arg(long, default_value = "1")]
    pub site: i64,
}

pub fn run(ctx: &AppContext, args: &ApplyArgs) -> Result<()> {
    let _lock = ctx.lock()?;
    let mut site = ctx.db.get_site(args.site)?;
    let previous = site.theme.clone();
    let messages = ctx.applier().apply(&mut site, &args.theme)?;

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&robot_ok(serde_json::json!({
            "site": site,
            "previous_theme": previous,
            "messages": messages,
        })));
    }

    println!(
        "{} Site {} now uses '{}' (was '{}')",
        "✓".green().bold(),
        site.id,
        site.theme.cyan(),
        previous
    );
    if !messages.is_empty() {
        println!();
        for line in &messages {
            println!("{line}");
        }
        println!(
            "{}",
            format!("List patterns with: bctheme patterns {}", site.theme).dimmed()
        );
    }
    Ok(())
}
