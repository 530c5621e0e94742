use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fvg_engine::{
    GapTable, ScanConfig, detect_for_timeframes, enrich, sessions::resolve_sessions, store,
    tz::parse_tz,
};
use market_data::{BarSeries, Timeframe, io::json};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Multi-timeframe Fair Value Gap scanner")]
struct Cli {
    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Detect, enrich and print gaps for a JSON bar file
    Scan(ScanCmd),
    /// Print a stored pattern file
    Show {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ScanCmd {
    /// JSON array of row objects with an RFC 3339 `timestamp`
    #[arg(long, value_name = "FILE")]
    bars: PathBuf,
    #[arg(long, default_value = "UNKNOWN")]
    symbol: String,
    /// Timeframe of the input bars
    #[arg(long, default_value = "1m")]
    native: String,
    /// Exchange-local time zone of the series; also the clock of the
    /// default RTH/ETH sessions when no session file is given
    #[arg(long, default_value = "America/New_York")]
    tz: String,
    #[arg(long, value_delimiter = ',', required = true)]
    timeframes: Vec<String>,
    #[arg(long, default_value_t = 0.0)]
    min_width: f64,
    /// Session TOML; defaults to RTH 09:30-16:00 on the --tz clock
    #[arg(long, value_name = "FILE")]
    sessions: Option<PathBuf>,
    /// Reference price for distance; defaults to the last close
    #[arg(long)]
    price: Option<f64>,
    /// Save the enriched table as Arrow IPC
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
    /// One JSON object per gap instead of a text table
    #[arg(long)]
    json: bool,
    /// Scan timeframes one after another
    #[arg(long)]
    sequential: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn print_table(table: &GapTable, as_json: bool) -> Result<()> {
    if as_json {
        for gap in table {
            println!("{}", serde_json::to_string(gap)?);
        }
    } else {
        print!("{table}");
    }
    Ok(())
}

fn run_scan(cmd: ScanCmd) -> Result<()> {
    let text = std::fs::read_to_string(&cmd.bars)
        .with_context(|| format!("reading {}", cmd.bars.display()))?;
    let table = json::table_from_str(&text, json::TIMESTAMP_FIELD)?;

    let native: Timeframe = cmd
        .native
        .parse()
        .with_context(|| format!("native timeframe {:?}", cmd.native))?;
    let tz = parse_tz(&cmd.tz)?;
    let base = BarSeries::from_table(table, cmd.symbol, native, tz)?;
    info!(symbol = %base.symbol, bars = base.len(), timeframe = %native, "loaded bars");

    let sessions = resolve_sessions(cmd.sessions.as_deref(), base.tz)?;

    let cfg = ScanConfig {
        min_width: cmd.min_width,
        parallel: !cmd.sequential,
    };
    let gaps = detect_for_timeframes(&base, &cmd.timeframes, &cfg)?;
    let gaps = enrich(gaps, &base, &sessions, cmd.price);

    if let Some(out) = &cmd.out {
        store::save(&gaps, out)?;
    }
    print_table(&gaps, cmd.json)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Cmd::Scan(cmd) => run_scan(cmd)?,
        Cmd::Show { file, json } => {
            let table = store::load(&file)?;
            print_table(&table, json)?;
        }
    }

    Ok(())
}
