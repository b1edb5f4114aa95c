use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use androidstat_discovery::ReaderError;
use androidstat_discovery::adb::AdbReader;
use androidstat_discovery::config::StatConfig;
use androidstat_discovery::engine::MetricsEngine;
use androidstat_discovery::output::{OutputFormat, format_metrics, format_snapshot};
use androidstat_discovery::parse_meminfo_text;
use androidstat_discovery::recorder::CsvRecorder;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use regex::Regex;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod render;

use render::Measurement;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Json => Self::Json,
            CliOutputFormat::Yaml => Self::Yaml,
            CliOutputFormat::Table => Self::Table,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "androidstat")]
#[command(about = "Capture and watch memory statistics of Android apps over adb")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Path to the adb executable (overrides the config file).
    #[arg(long, global = true)]
    adb: Option<String>,
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture memory statistics of a running package, once or repeatedly.
    Meminfo(MeminfoArgs),
    /// List running processes on the device.
    Packages,
    /// List the metric names available for a running package.
    Names(NamesArgs),
    /// Parse captured dumpsys meminfo output from a file.
    ParseFile(ParseFileArgs),
    /// Parse captured dumpsys meminfo output from stdin.
    ParseStdin(ParseStdinArgs),
}

#[derive(Debug, Args)]
struct MeminfoArgs {
    /// Package name to analyze.
    #[arg(short, long)]
    package: String,
    /// Refresh interval in seconds; 0 captures once.
    #[arg(short = 't', long)]
    interval: Option<u64>,
    /// Stop after this many measurements.
    #[arg(long)]
    count: Option<u64>,
    /// CSV file the measurements are written to.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Regex selecting which metrics are displayed.
    #[arg(short, long)]
    filter: Option<String>,
    /// Regex selecting which metrics become CSV columns.
    #[arg(long)]
    output_filter: Option<String>,
    /// Output format for a single capture.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct NamesArgs {
    /// Package name to analyze.
    #[arg(short, long)]
    package: String,
}

#[derive(Debug, Args)]
struct ParseFileArgs {
    /// Path to captured dumpsys meminfo output.
    #[arg(long)]
    input: PathBuf,
    /// Regex selecting which metrics are printed.
    #[arg(short, long)]
    filter: Option<String>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ParseStdinArgs {
    /// Regex selecting which metrics are printed.
    #[arg(short, long)]
    filter: Option<String>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let result = match cli.command {
        Command::Meminfo(args) => run_meminfo(&cli.global, args),
        Command::Packages => run_packages(&cli.global),
        Command::Names(args) => run_names(&cli.global, args),
        Command::ParseFile(args) => run_parse_file(args),
        Command::ParseStdin(args) => run_parse_stdin(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(global: &GlobalArgs) -> Result<StatConfig, String> {
    let mut config = match &global.config {
        Some(path) => StatConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => StatConfig::default(),
    };
    if let Some(adb) = &global.adb {
        config.adb_path = adb.clone();
    }
    Ok(config)
}

fn compile_filter(pattern: Option<&str>) -> Result<Option<Regex>, String> {
    pattern
        .map(|p| Regex::new(p).map_err(|err| format!("Invalid filter '{p}': {err}")))
        .transpose()
}

fn run_meminfo(global: &GlobalArgs, args: MeminfoArgs) -> Result<(), String> {
    let mut config = load_config(global)?;
    if let Some(interval) = args.interval {
        config.interval_secs = interval;
    }
    if args.filter.is_some() {
        config.filter = args.filter.clone();
    }
    if args.output_filter.is_some() {
        config.output_filter = args.output_filter.clone();
    }

    let filter = config.filter_regex().map_err(|err| err.to_string())?;
    let output_filter = config.output_filter_regex().map_err(|err| err.to_string())?;

    let mut recorder = match &args.output {
        Some(path) => Some(CsvRecorder::create(path, output_filter).map_err(|err| {
            format!("Failed to create '{}': {err}", path.display())
        })?),
        None => None,
    };

    let mut engine = MetricsEngine::new(AdbReader::from_config(&config));

    if config.interval_secs == 0 {
        let snapshot = engine.scan(&args.package).map_err(|err| err.to_string())?;
        if let Some(recorder) = recorder.as_mut() {
            recorder
                .record(snapshot.captured_at.naive_local(), &snapshot.metrics)
                .map_err(|err| err.to_string())?;
        }
        let rendered = format_snapshot(&snapshot, filter.as_ref(), args.format.into())?;
        emit(&rendered);
        return Ok(());
    }

    let interval = Duration::from_secs(config.interval_secs);
    let started = Local::now();
    let mut last_seen = Instant::now();
    let mut stdout = io::stdout();
    let mut index = 0;

    loop {
        let tick = Instant::now();
        index += 1;
        let measurement = Measurement {
            started,
            current: Local::now(),
            index,
            interval,
        };
        render::draw_header(&mut stdout, &measurement).map_err(|err| err.to_string())?;

        match engine.scan(&args.package) {
            Ok(snapshot) => {
                last_seen = Instant::now();
                let rows: Vec<_> = engine
                    .record(&snapshot)
                    .into_iter()
                    .filter(|row| filter.as_ref().is_none_or(|re| re.is_match(&row.0)))
                    .collect();
                render::draw_active(&mut stdout, &snapshot.package, snapshot.pid)
                    .and_then(|()| render::draw_trends(&mut stdout, &rows))
                    .map_err(|err| err.to_string())?;

                if let (Some(recorder), Some(path)) = (recorder.as_mut(), args.output.as_deref()) {
                    let added = recorder
                        .record(snapshot.captured_at.naive_local(), &snapshot.metrics)
                        .map_err(|err| err.to_string())?;
                    render::draw_recorded(
                        &mut stdout,
                        &path.display().to_string(),
                        added,
                        recorder.bytes_written(),
                    )
                    .map_err(|err| err.to_string())?;
                }
            }
            Err(
                err @ (ReaderError::ProcessNotFound(_)
                | ReaderError::Scan(_)
                | ReaderError::CommandFailed { .. }
                | ReaderError::Timeout { .. }),
            ) => {
                debug!(package = %args.package, error = %err, "Process unavailable");
                render::draw_inactive(&mut stdout, &args.package, last_seen.elapsed())
                    .map_err(|err| err.to_string())?;
            }
            Err(err) => return Err(err.to_string()),
        }
        stdout.flush().map_err(|err| err.to_string())?;

        if args.count.is_some_and(|count| index >= count) {
            return Ok(());
        }
        match interval.checked_sub(tick.elapsed()) {
            Some(remaining) => std::thread::sleep(remaining),
            None => warn!(
                elapsed_ms = tick.elapsed().as_millis() as u64,
                "Measurement took longer than the refresh interval"
            ),
        }
    }
}

fn run_packages(global: &GlobalArgs) -> Result<(), String> {
    let config = load_config(global)?;
    let engine = MetricsEngine::new(AdbReader::from_config(&config));
    for name in engine.packages().map_err(|err| err.to_string())? {
        println!("{name}");
    }
    Ok(())
}

fn run_names(global: &GlobalArgs, args: NamesArgs) -> Result<(), String> {
    let config = load_config(global)?;
    let engine = MetricsEngine::new(AdbReader::from_config(&config));
    let snapshot = engine.scan(&args.package).map_err(|err| err.to_string())?;

    let mut names: Vec<_> = snapshot.metrics.keys().collect();
    names.sort();
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn run_parse_stdin(args: ParseStdinArgs) -> Result<(), String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|err| format!("Failed to read stdin: {err}"))?;
    run_parse_text(&text, args.filter.as_deref(), args.format.into())
}

fn run_parse_file(args: ParseFileArgs) -> Result<(), String> {
    let text = read_input(&args.input)?;
    run_parse_text(&text, args.filter.as_deref(), args.format.into())
}

fn read_input(path: &Path) -> Result<String, String> {
    let bytes =
        fs::read(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn run_parse_text(text: &str, filter: Option<&str>, format: OutputFormat) -> Result<(), String> {
    let filter = compile_filter(filter)?;
    let metrics = parse_meminfo_text(text).map_err(|err| err.to_string())?;
    let rendered = format_metrics(&metrics, filter.as_ref(), format)?;
    emit(&rendered);
    Ok(())
}

fn emit(rendered: &str) {
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
}
