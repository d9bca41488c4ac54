//! bctheme delete - Delete a theme directory

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json, robot_ok};
use crate::error::{BcError, Result};
use crate::storage::SiteStore;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Theme to delete
    pub theme: String,

    /// Confirm the deletion
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(ctx: &AppContext, args: &DeleteArgs) -> Result<()> {
    if !args.yes {
        return Err(BcError::ApprovalRequired(format!(
            "deleting theme {} removes its directory; rerun with --yes",
            args.theme
        )));
    }

    let _lock = ctx.lock()?;
    let packager = ctx.packager();
    let theme = packager.theme(&args.theme)?;
    let in_use: Vec<i64> = ctx
        .db
        .list_sites()?
        .iter()
        .filter(|s| s.theme == theme.name)
        .map(|s| s.id)
        .collect();
    packager.delete(&args.theme)?;

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&robot_ok(serde_json::json!({
            "deleted": theme.name,
            "path": theme.path,
            "sites_using": in_use,
        })));
    }

    println!("{} Deleted '{}'", "✓".green().bold(), theme.name.cyan());
    if !in_use.is_empty() {
        println!(
            "{} still used by site(s) {}; apply another theme to them",
            "!".yellow(),
            in_use
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}
