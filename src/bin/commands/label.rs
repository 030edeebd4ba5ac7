use std::fs::File;
use std::io::{self as stdio, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use is_terminal::IsTerminal;
use prettytable::{Table, format, row};

use struct_forge::batch::{BatchConfig, BatchReport, CommandOracle, run_batch_with_progress};
use struct_forge::io::write_csv_records;

use crate::commands::{
    EngineArgs, collect_xyz_files, parse_range, print_boxed_label, progress_bar, read_geometry,
};

/// Labels candidate structures for a set of XYZ geometries.
#[derive(Debug, Args)]
pub struct LabelArgs {
    /// XYZ files or directories containing them.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,
    /// CSV output path. When omitted, stdout is used.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Program that reads an XYZ block on stdin and prints its canonical identifier.
    #[arg(long, value_name = "PROGRAM")]
    pub oracle_cmd: PathBuf,
    /// Extra argument passed to the oracle program (repeatable).
    #[arg(long, value_name = "ARG", allow_hyphen_values = true)]
    pub oracle_arg: Vec<String>,
    /// Worker threads; 0 uses every available core.
    #[arg(short, long, value_name = "INT", default_value_t = 0)]
    pub workers: usize,
    /// One-based inclusive slice of the sorted input files, e.g. `1-500`.
    #[arg(long, value_name = "A-B")]
    pub range: Option<String>,
    /// Seed for shuffling inputs before they are split among workers.
    #[arg(long, value_name = "INT")]
    pub shuffle_seed: Option<u64>,
    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Reads the inputs, runs the labeling batch, and writes the CSV table.
pub fn run(args: &LabelArgs) -> Result<()> {
    if args.output.is_none() && stdio::stdout().is_terminal() {
        bail!(
            "Refusing to stream CSV records to an interactive terminal. Use -o/--output or pipe the command into a file."
        );
    }

    let mut files = collect_xyz_files(&args.inputs)?;
    if files.is_empty() {
        bail!("No .xyz files found in the given inputs");
    }
    if let Some(text) = &args.range {
        let range = parse_range(text, files.len())?;
        files = files[range].to_vec();
    }

    let inputs = files.iter().map(|path| read_geometry(path)).collect();

    let oracle = CommandOracle::new(args.oracle_cmd.clone()).args(args.oracle_arg.iter());
    let config = BatchConfig::default()
        .workers(args.workers)
        .enumeration(args.engine.enumeration())
        .resolver(args.engine.resolver())
        .element_policy(args.engine.element_policy())
        .shuffle_seed(args.shuffle_seed);

    let bar = progress_bar(files.len(), "Labeling");
    let result = run_batch_with_progress(inputs, &config, &oracle, |stats| {
        bar.set_position(stats.processed() as u64);
    });
    match &result {
        Ok(_) => bar.finish_with_message("Labeling ✓"),
        Err(_) => bar.abandon_with_message("Labeling ✗"),
    }
    let report = result.context("Batch labeling failed")?;

    write_report(&report, args)?;
    print_summary(&report, args)?;
    Ok(())
}

fn write_report(report: &BatchReport, args: &LabelArgs) -> Result<()> {
    let records = report.sorted_records();
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_csv_records(&mut writer, records)
                .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
            writer.flush().context("Failed to flush output writer")?;
        }
        None => {
            let stdout = stdio::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_csv_records(&mut writer, records).context("Failed to write CSV to stdout")?;
            writer.flush().context("Failed to flush stdout")?;
        }
    }
    Ok(())
}

fn print_summary(report: &BatchReport, args: &LabelArgs) -> Result<()> {
    let mut stderr = stdio::stderr().lock();
    let stats = &report.stats;
    let valid = report.records.iter().filter(|r| r.validity).count();

    print_boxed_label(&mut stderr, "StructForge Labeling Summary")?;
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Metric", "Value"]);
    table.add_row(row!["Filters", args.engine.filters.filters()]);
    table.add_row(row!["Geometries", stats.inputs]);
    table.add_row(row!["Labeled", stats.labeled]);
    table.add_row(row!["Unique Compounds", stats.unique_compounds]);
    table.add_row(row![
        "Records (valid / invalid)",
        format!("{} / {}", valid, report.records.len() - valid)
    ]);
    table.add_row(row!["Unsupported Elements", stats.unsupported]);
    table.add_row(row!["No Candidates", stats.empty]);
    table.add_row(row!["Malformed Inputs", stats.malformed]);
    table.add_row(row!["Oracle Failures", stats.oracle_failures]);
    table.add_row(row!["Resolver Failures", stats.resolver_failures]);
    table
        .print(&mut stderr)
        .context("Failed to render labeling summary")?;
    Ok(())
}
