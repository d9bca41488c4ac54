//! bctheme market - List themes published in the theme market feed

use clap::Args;
use colored::Colorize;

use crate::app::AppContext;
use crate::cli::output::{OutputFormat, emit_json, robot_ok};
use crate::error::Result;
use crate::market::{FeedSource, MarketClient};

#[derive(Args, Debug)]
pub struct MarketArgs {
    /// Feed URL or local RSS file to read instead of `market.url`
    #[arg(long)]
    pub url: Option<String>,

    /// Show at most this many themes
    #[arg(long, short)]
    pub limit: Option<usize>,
}

pub fn run(ctx: &AppContext, args: &MarketArgs) -> Result<()> {
    let client = match &args.url {
        Some(location) => MarketClient::new(FeedSource::parse(location), ctx.config.market.timeout_secs)?,
        None => MarketClient::from_config(&ctx.config.market)?,
    };

    let mut themes = client.themes()?;
    if let Some(limit) = args.limit {
        themes.truncate(limit);
    }

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&robot_ok(&themes));
    }

    if themes.is_empty() {
        println!("{}", "The market feed lists no themes".dimmed());
        return Ok(());
    }

    println!("{:32} {:10} {}", "TITLE".bold(), "VERSION".bold(), "CATEGORY".bold());
    println!("{}", "─".repeat(60).dimmed());
    for theme in &themes {
        println!(
            "{:32} {:10} {}",
            theme.title.cyan(),
            theme.version.as_deref().unwrap_or("-"),
            theme.category.as_deref().unwrap_or("-")
        );
        if let Some(link) = &theme.link {
            println!("  {}", link.dimmed());
        }
    }
    Ok(())
}
