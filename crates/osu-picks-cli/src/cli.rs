//! Command line handling
//!
//! Usage:
//!   osu-picks [options]
//!
//! Settings come from the config file, then `OSU_*` environment variables,
//! then the flags below. The minimum pick count is prompted for when it is
//! given nowhere else.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use osu_picks_core::{
    export_json, parse_min_pick_count, Config, Error, OsuApiClient, Pipeline, PipelineOutcome,
    PipelinePhase, ProgressBar,
};

/// Prompt shown when no minimum pick count was configured
pub const MIN_PICKS_PROMPT: &str = "Enter the minimum pick count to be considered overplayed: ";

/// CLI options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub database: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
    pub no_snapshot: bool,
    pub output: Option<PathBuf>,
    /// Raw threshold, validated together with prompted input
    pub min_picks: Option<String>,
    pub delay_ms: Option<u64>,
    pub top: Option<usize>,
    pub no_extremal: bool,
    pub stats_json: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub help: bool,
}

impl CliOptions {
    /// Override `config` with the flags that were given
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref path) = self.database {
            config.database_path = Some(path.clone());
        }
        if let Some(ref path) = self.snapshot {
            config.snapshot_path = Some(path.clone());
        }
        if self.no_snapshot {
            config.use_snapshot_cache = false;
        }
        if let Some(ref path) = self.output {
            config.output_path = path.clone();
        }
        if let Some(delay) = self.delay_ms {
            config.request_delay_ms = delay;
        }
        if let Some(top) = self.top {
            config.top_picker_count = top;
        }
        if self.no_extremal {
            config.compute_extremal_pickers = false;
        }
    }
}

/// Parse CLI arguments, excluding the program name
pub fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--help" | "-h" => options.help = true,
            "--no-snapshot" => options.no_snapshot = true,
            "--no-extremal" => options.no_extremal = true,
            "--db" | "--snapshot" | "--output" | "--min-picks" | "--delay-ms" | "--top"
            | "--stats-json" | "--config" | "--log-file" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| format!("{} requires a value", arg))?
                    .clone();
                match arg {
                    "--db" => options.database = Some(PathBuf::from(value)),
                    "--snapshot" => options.snapshot = Some(PathBuf::from(value)),
                    "--output" => options.output = Some(PathBuf::from(value)),
                    "--min-picks" => options.min_picks = Some(value),
                    "--delay-ms" => options.delay_ms = Some(parse_number(arg, &value)?),
                    "--top" => options.top = Some(parse_number(arg, &value)?),
                    "--stats-json" => options.stats_json = Some(PathBuf::from(value)),
                    "--config" => options.config = Some(PathBuf::from(value)),
                    _ => options.log_file = Some(PathBuf::from(value)),
                }
            }
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
        i += 1;
    }

    if options.snapshot.is_some() && options.no_snapshot {
        return Err("--snapshot and --no-snapshot are mutually exclusive".to_string());
    }

    Ok(options)
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, value))
}

/// Build the effective configuration: file, then environment, then flags
pub fn load_config(options: &CliOptions) -> anyhow::Result<Config> {
    let mut config = match options.config {
        Some(ref path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load(),
    };
    config.apply_env();
    options.apply(&mut config);
    Ok(config)
}

/// Take the threshold from the flags or config, prompting on `input` otherwise
pub fn resolve_min_pick_count<R: BufRead, W: Write>(
    options: &CliOptions,
    config: &Config,
    input: &mut R,
    output: &mut W,
) -> osu_picks_core::Result<u32> {
    if let Some(ref raw) = options.min_picks {
        return parse_min_pick_count(raw);
    }
    if let Some(count) = config.min_pick_count {
        return Ok(count);
    }

    write!(output, "{}", MIN_PICKS_PROMPT)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    parse_min_pick_count(&line)
}

/// Run the full report
pub async fn run(options: CliOptions) -> anyhow::Result<()> {
    let config = load_config(&options)?;

    let min_pick_count = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        resolve_min_pick_count(&options, &config, &mut input, &mut output)?
    };

    let api = config.api.clone();
    let run_config = config.into_run_config(min_pick_count)?;
    let credentials = api.credentials()?;

    print!("Requesting guest token... ");
    io::stdout().flush()?;
    let mut client = OsuApiClient::new(&api)?;
    client.request_guest_token(&credentials).await?;
    println!("Success!");

    let pipeline = Pipeline::new(run_config, &client)
        .with_progress_callback(ProgressBar::stdout_callback())
        .with_phase_callback(Box::new(print_phase));
    let outcome = pipeline.run().await?;

    print_outcome(&outcome, &pipeline.config().output_path);

    if let (Ok(stats), Some(path)) = (&outcome.stats, &options.stats_json) {
        export_json(stats, path)?;
        println!("Statistics exported to {}", path.display());
    }

    if !outcome.is_success() {
        anyhow::bail!("Run finished with errors");
    }

    Ok(())
}

fn print_phase(phase: PipelinePhase) {
    match phase {
        PipelinePhase::Scanning => {
            print!("Scanning Database... ");
            let _ = io::stdout().flush();
        }
        PipelinePhase::Scanned { .. } => println!("Success!"),
        PipelinePhase::SnapshotLoaded { entries } => {
            println!("Parsing old csv... {} beatmap sets cached", entries)
        }
        PipelinePhase::SnapshotUnavailable => {
            println!("Parsing old csv...");
            println!("Old csv couldnt be parsed. Searching only from bancho now.");
        }
        PipelinePhase::Resolving { total } => {
            println!("Gathering beatmap information... ({} beatmap sets)", total)
        }
        PipelinePhase::WritingReport => {
            println!();
            println!("Writing results to CSV...");
        }
        PipelinePhase::ComputingStats => println!("Printing stats..."),
    }
}

fn print_outcome(outcome: &PipelineOutcome, output_path: &Path) {
    let summary = &outcome.summary;
    println!(
        "{} beatmap sets: {} cached, {} fetched, {} not found, {} failed",
        summary.total(),
        summary.cached,
        summary.fetched,
        summary.not_found,
        summary.failed
    );

    match outcome.report {
        Ok(()) => println!(
            "Wrote {} rows to {}",
            outcome.records.len(),
            output_path.display()
        ),
        Err(ref e) => eprintln!("Error: {}", e),
    }

    match outcome.stats {
        Ok(ref stats) => {
            println!();
            print!("{}", stats);
        }
        Err(ref e @ Error::Store(_)) => eprintln!("Error: Failed to compute statistics: {}", e),
        Err(ref e) => eprintln!("Warning: Failed to compute statistics: {}", e),
    }
}

/// Print CLI help
pub fn print_help() {
    println!("osu-picks v{}", env!("CARGO_PKG_VERSION"));
    println!("Find overplayed beatmaps in an osu! lobby pick log");
    println!();
    println!("USAGE:");
    println!("    osu-picks [options]");
    println!();
    println!("OPTIONS:");
    println!("    --db <path>                 Pick database (SQLite, PICKS table)");
    println!("    --snapshot <path>           Previous report to reuse as a cache");
    println!("    --no-snapshot               Ignore any configured snapshot");
    println!("    --output <path>             Report path (default: overplayed.csv)");
    println!("    --min-picks <n>             Minimum pick count; prompted if omitted");
    println!("    --delay-ms <ms>             Pause after each osu! API lookup (default: 1000)");
    println!("    --top <n>                   Number of top pickers (default: 10)");
    println!("    --no-extremal               Skip overplayed/underplayed pickers");
    println!("    --stats-json <path>         Also export statistics as JSON");
    println!("    --config <path>             Config file to use instead of the default");
    println!("    --log-file <path>           Write logs to a file instead of stderr");
    println!("    --help                      Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    OSU_CLIENT_ID, OSU_CLIENT_SECRET   osu! OAuth client credentials");
    println!("    OSU_PICKS_DB, OSU_PICKS_SNAPSHOT   Database and snapshot paths");
    println!("    RUST_LOG                           Log filter (default: warn)");
    println!();
    println!("EXAMPLES:");
    println!("    osu-picks --db picks.db --min-picks 5");
    println!("    osu-picks --db picks.db --snapshot overplayed.csv --output new.csv");
}
