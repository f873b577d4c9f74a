//! `iaaft`: generates IAAFT surrogates of a time series.
//!
//! Reads a one-dimensional series from a file (or stdin) and writes one
//! surrogate per line to stdout. Progress goes to stderr.
//!
//! **Usage:**
//! ```text
//! iaaft [--count N] [--detrend BOOL] [--verbose BOOL] [--seed S] [INPUT]
//! ```

use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use iaaft_surrogates::config::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use iaaft_surrogates::input::{parse_count, parse_flag, parse_series};
use iaaft_surrogates::{generate_surrogates, DegeneratePolicy, SurrogateConfig, SurrogateSet};
use tracing_subscriber::filter::LevelFilter;

/// Generate IAAFT surrogate time series.
#[derive(Parser, Debug)]
#[command(name = "iaaft", about = "Generate IAAFT surrogate time series", version)]
struct Args {
    /// Input series: one value per line, or one line of values. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Number of surrogates to generate.
    #[arg(long, short = 'n', default_value = "1", value_parser = count_arg)]
    count: usize,

    /// Subtract the line through the first and last sample before analysis.
    #[arg(long, default_value = "false", action = ArgAction::Set, value_parser = detrend_arg)]
    detrend: bool,

    /// Report progress on stderr.
    #[arg(long, default_value = "true", action = ArgAction::Set, value_parser = verbose_arg)]
    verbose: bool,

    /// Master seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Convergence threshold on the successive-iterate ratio.
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Maximum refinement iterations per surrogate.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Wall-clock budget per surrogate, in seconds.
    #[arg(long)]
    timeout_secs: Option<f64>,

    /// Refine surrogates in parallel.
    #[arg(long)]
    parallel: bool,

    /// Emit shuffled copies instead of failing when the series has zero energy.
    #[arg(long)]
    allow_degenerate: bool,

    /// Add the removed trend back to every surrogate (no effect without detrending).
    #[arg(long)]
    retrend: bool,
}

fn count_arg(text: &str) -> Result<usize, String> {
    parse_count(text).map_err(|e| e.to_string())
}

fn detrend_arg(text: &str) -> Result<bool, String> {
    parse_flag("detrend", text).map_err(|e| e.to_string())
}

fn verbose_arg(text: &str) -> Result<bool, String> {
    parse_flag("verbose", text).map_err(|e| e.to_string())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn build_config(args: &Args) -> Result<SurrogateConfig> {
    let mut config = SurrogateConfig::new(args.count)
        .with_detrend(args.detrend)
        .with_verbose(args.verbose)
        .with_tolerance(args.tolerance)
        .with_max_iterations(args.max_iterations)
        .with_parallel(args.parallel);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(secs) = args.timeout_secs {
        let timeout = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("invalid timeout: {} seconds", secs))?;
        config = config.with_timeout(timeout);
    }
    if args.allow_degenerate {
        config = config.with_degenerate_policy(DegeneratePolicy::PassThrough);
    }
    Ok(config)
}

/// One surrogate per line, values separated by spaces.
fn write_surrogates<W: Write>(set: &SurrogateSet, retrend: bool, out: &mut W) -> Result<()> {
    for index in 0..set.count() {
        let row = if retrend {
            set.retrended_row(index)
        } else {
            set.row(index).map(<[f64]>::to_vec)
        }
        .context("surrogate row missing")?;

        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    Ok(())
}

fn run<W: Write>(args: &Args, text: &str, out: &mut W) -> Result<()> {
    let series = parse_series(text)?;
    let config = build_config(args)?;
    let set = generate_surrogates(&series, &config)?;
    write_surrogates(&set, args.retrend, out)
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            LevelFilter::INFO
        } else {
            LevelFilter::WARN
        })
        .with_writer(io::stderr)
        .without_time()
        .with_target(false)
        .init();

    let text = read_input(args.input.as_ref())?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run(&args, &text, &mut out)?;
    out.flush()?;

    Ok(())
}
