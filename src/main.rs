//! bctheme - theme packaging and application for multi-site CMS installs.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use bctheme::Result;
use bctheme::app::AppContext;
use bctheme::cli::output::robot_error;
use bctheme::cli::{Cli, Commands, OutputFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut format = cli.output_format();
    match run(&cli, &mut format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if format == OutputFormat::Json {
                // Robot mode: JSON error output to stdout
                let response = robot_error(e.code(), e.to_string());
                println!("{}", serde_json::to_string(&response).unwrap_or_default());
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

/// `format` starts as the command-line choice and is replaced by the
/// context's resolved format once config is loaded, so errors are reported
/// the same way as results.
fn run(cli: &Cli, format: &mut OutputFormat) -> Result<()> {
    if let Commands::Init(args) = &cli.command {
        return bctheme::cli::commands::init::run_without_context(cli, args);
    }
    let ctx = AppContext::from_cli(cli)?;
    *format = ctx.output_format;
    bctheme::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,bctheme=info",
        1 => "info,bctheme=debug",
        2 => "debug,bctheme=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
