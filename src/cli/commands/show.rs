//! bctheme show - Show a theme's metadata, bundled plugins and default data

use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_json, robot_ok};
use crate::error::Result;
use crate::theme::{PatternOptions, Theme};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Theme name
    pub theme: String,
}

#[derive(Serialize)]
struct ShowOutput {
    #[serde(flatten)]
    theme: Theme,
    info: Vec<String>,
    patterns: BTreeMap<String, String>,
}

pub fn run(ctx: &AppContext, args: &ShowArgs) -> Result<()> {
    let packager = ctx.packager();
    let theme = packager.theme(&args.theme)?;
    let info = packager.scanner().describe_theme(&args.theme)?;
    let patterns = packager.default_data_patterns(&args.theme, PatternOptions::default())?;

    if ctx.output_format == OutputFormat::Json {
        return emit_json(&robot_ok(ShowOutput {
            theme,
            info,
            patterns,
        }));
    }

    let mut layout = HumanLayout::new();
    layout
        .title(&format!("{} ({})", theme.title, theme.name))
        .kv("Path", &theme.path.display().to_string())
        .kv("Version", theme.version.as_deref().unwrap_or("-"));
    if let Some(author) = &theme.author {
        layout.kv("Author", author);
    }
    if let Some(url) = &theme.url {
        layout.kv("URL", url);
    }
    layout.kv("Screenshot", if theme.screenshot { "yes" } else { "no" });
    if let Some(description) = &theme.description {
        layout.blank().push_line(description.as_str());
    }
    if !info.is_empty() {
        layout.blank();
        for line in &info {
            layout.push_line(line.as_str());
        }
    }
    if !patterns.is_empty() {
        layout.blank().section("Default data");
        for (key, label) in &patterns {
            layout.bullet(&format!("{key}  {label}"));
        }
    }
    emit_human(layout);
    Ok(())
}
