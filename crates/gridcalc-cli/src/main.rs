//! gridcalc CLI - evaluate expressions and edit grid snapshots

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridcalc::prelude::*;
use gridcalc::{evaluate, parse, EmptyScope};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "gridcalc")]
#[command(author, version, about = "Reactive spreadsheet grid calculator")]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a standalone expression
    Eval {
        /// Expression text, e.g. "1 + 2 * 3"
        expression: String,

        /// Print the canonical text of the parsed tree instead of its value
        #[arg(long)]
        tree: bool,
    },

    /// Apply assignments to a grid and print its cells
    Apply {
        /// Snapshot to start from (default: an empty grid)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Columns of a new grid
        #[arg(long, default_value = "10", conflicts_with = "snapshot")]
        columns: u32,

        /// Rows of a new grid
        #[arg(long, default_value = "10", conflicts_with = "snapshot")]
        rows: u32,

        /// Write the resulting snapshot to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Assignments of the form COORD=EXPR, applied as one batch
        #[arg(value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
    },

    /// Load a snapshot and print its cells
    Show {
        /// Snapshot file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Eval { expression, tree } => eval(&expression, tree),
        Commands::Apply {
            snapshot,
            columns,
            rows,
            output,
            assignments,
        } => apply(
            snapshot.as_deref(),
            GridOptions::new(columns, rows),
            output.as_deref(),
            &assignments,
        ),
        Commands::Show { input } => show(&input),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Split `B2=A0 + 1` at the first `=`
fn parse_assignment(text: &str) -> std::result::Result<(String, String), String> {
    match text.split_once('=') {
        Some((coordinate, expression)) if !coordinate.trim().is_empty() => {
            Ok((coordinate.trim().to_string(), expression.to_string()))
        }
        _ => Err(format!("expected COORD=EXPR, got {text:?}")),
    }
}

fn eval(expression: &str, tree: bool) -> Result<()> {
    let expr = parse(expression).with_context(|| format!("Failed to parse {expression:?}"))?;
    if tree {
        println!("{expr}");
        return Ok(());
    }

    let registry = FunctionRegistry::new();
    let value = evaluate(&expr, &registry, &mut EmptyScope)
        .with_context(|| format!("Failed to evaluate {expression:?}"))?;
    println!("{value}\t{}", value.kind());
    Ok(())
}

fn apply(
    snapshot: Option<&Path>,
    options: GridOptions,
    output: Option<&Path>,
    assignments: &[(String, String)],
) -> Result<()> {
    let mut grid = match snapshot {
        Some(path) => load(path)?,
        None => Grid::with_options(options),
    };

    let mut batch = Vec::with_capacity(assignments.len());
    for (coordinate, expression) in assignments {
        let address = CellAddress::parse_wire(coordinate)
            .with_context(|| format!("Invalid coordinate {coordinate:?}"))?;
        batch.push((address, expression.as_str()));
    }

    let stats = grid.apply(batch).context("Failed to apply assignments")?;
    debug!(?stats, "batch applied");

    print_cells(&grid)?;

    if let Some(path) = output {
        grid.save_path(path)
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        eprintln!("Wrote {} cells to '{}'", stats.formula_count, path.display());
    }

    Ok(())
}

fn show(input: &Path) -> Result<()> {
    let grid = load(input)?;
    let extent = grid.extent();
    eprintln!("Grid: {} columns x {} rows", extent.columns, extent.rows);
    print_cells(&grid)
}

fn load(path: &Path) -> Result<Grid> {
    Grid::load_path(path, FunctionRegistry::new())
        .with_context(|| format!("Failed to load snapshot '{}'", path.display()))
}

/// One `COORD<TAB>EXPR<TAB>VALUE` line per cell holding an expression
fn print_cells(grid: &Grid) -> Result<()> {
    let mut out = String::new();
    for cell in grid.cells() {
        if cell.has_expression() {
            out.push_str(&format!(
                "{}\t{}\t{}\n",
                cell.address(),
                cell.expression_text(),
                cell.value()
            ));
        }
    }

    io::stdout()
        .write_all(out.as_bytes())
        .context("Failed to write to stdout")
}
