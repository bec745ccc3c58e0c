//! gridcalc CLI - evaluate cells from the command line or a sheet file

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use gridcalc::prelude::*;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gridcalc")]
#[command(author, version, about = "Spreadsheet formula evaluation tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only recalculate when all cells have been set
    #[arg(long, global = true)]
    manual: bool,

    /// Leave cells on a circular reference stale instead of marking them #CYCLE!
    #[arg(long, global = true)]
    no_cycle_detection: bool,

    /// Print a JSON object of address to value
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Set cells in order and print their values
    Eval {
        /// Assignments such as A1=10 or B1==A1*2
        #[arg(required = true, value_name = "ADDR=TEXT")]
        assignments: Vec<String>,

        /// Cells to print (default: every cell that was set)
        #[arg(short, long, value_name = "ADDR")]
        show: Vec<String>,
    },

    /// Evaluate a sheet file of `ADDR TEXT` lines and print every cell
    Run {
        /// Sheet file (default: stdin)
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut engine = Engine::with_options(EngineOptions {
        recalc_mode: if cli.manual {
            RecalcMode::Manual
        } else {
            RecalcMode::Automatic
        },
        detect_cycles: !cli.no_cycle_detection,
    });

    let cells = match cli.command {
        Commands::Eval { assignments, show } => eval(&mut engine, &assignments, &show)?,
        Commands::Run { input } => run(&mut engine, input.as_ref())?,
    };

    print_cells(&cells, cli.json)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn eval(
    engine: &mut Engine,
    assignments: &[String],
    show: &[String],
) -> Result<BTreeMap<String, String>> {
    for assignment in assignments {
        let Some((address, text)) = assignment.split_once('=') else {
            bail!("Expected ADDR=TEXT, got '{}'", assignment);
        };
        set_cell(engine, address.trim(), text)?;
    }
    finish(engine);

    if show.is_empty() {
        return Ok(engine.get_all_cells());
    }

    let mut cells = BTreeMap::new();
    for address in show {
        let value = engine
            .get_cell_value(address)
            .with_context(|| format!("Cannot show '{}'", address))?;
        cells.insert(address.to_uppercase(), value.to_string());
    }
    Ok(cells)
}

fn run(engine: &mut Engine, input: Option<&PathBuf>) -> Result<BTreeMap<String, String>> {
    let source = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?,
        None => io::read_to_string(io::stdin()).context("Failed to read stdin")?,
    };

    for (index, line) in source.lines().enumerate() {
        let Some((address, text)) = parse_line(line) else {
            continue;
        };
        set_cell(engine, address, text).with_context(|| format!("line {}", index + 1))?;
    }
    finish(engine);

    Ok(engine.get_all_cells())
}

fn set_cell(engine: &mut Engine, address: &str, text: &str) -> Result<()> {
    engine
        .set_cell(address, text)
        .with_context(|| format!("Cannot set '{}'", address))?;
    Ok(())
}

fn finish(engine: &mut Engine) {
    if engine.options().recalc_mode == RecalcMode::Manual {
        let stats = engine.recalculate();
        log::debug!("recalculated {} cells", stats.cells_evaluated);
    }
}

/// Split a sheet line into address and cell text
///
/// Accepts `A1 text`, `A1 = text` and `A1=text`. Blank lines and lines
/// starting with `#` are skipped.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let (address, rest) = line.split_at(end);

    if let Some(text) = rest.strip_prefix('=') {
        return Some((address, text));
    }

    let rest = rest.trim_start();
    let text = match rest.strip_prefix('=') {
        Some(after) if after.is_empty() || after.starts_with(char::is_whitespace) => {
            after.trim_start()
        }
        _ => rest,
    };
    Some((address, text))
}

fn print_cells(cells: &BTreeMap<String, String>, json: bool) -> Result<()> {
    let mut stdout = io::stdout().lock();

    if json {
        let text = serde_json::to_string_pretty(cells).context("Failed to encode JSON")?;
        writeln!(stdout, "{}", text).context("Failed to write to stdout")?;
        return Ok(());
    }

    let width = cells.keys().map(String::len).max().unwrap_or(0);
    for (address, value) in cells {
        writeln!(stdout, "{:<width$}  {}", address, value, width = width)
            .context("Failed to write to stdout")?;
    }
    Ok(())
}
