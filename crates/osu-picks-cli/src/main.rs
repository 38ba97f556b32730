//! osu-picks - Overplayed beatmap report for osu! lobby pick logs
//!
//! Usage:
//!   osu-picks [options]     Build the report and print pick statistics
//!   osu-picks --help        Show help

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let options = match cli::parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            cli::print_help();
            std::process::exit(1);
        }
    };

    if options.help {
        cli::print_help();
        return Ok(());
    }

    init_logging(options.log_file.as_deref());
    cli::run(options).await
}

fn init_logging(log_file: Option<&Path>) {
    // RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false);

    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => {
                let subscriber = builder
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .finish();
                let _ = tracing::subscriber::set_global_default(subscriber);
                return;
            }
            Err(e) => eprintln!("Warning: Cannot create log file {}: {}", path.display(), e),
        }
    }

    // stdout carries the progress bar and report output
    let subscriber = builder.with_writer(std::io::stderr).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
