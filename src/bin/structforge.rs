use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

mod commands;

use commands::{inspect, label};

#[derive(Parser, Debug)]
#[command(
    name = "structforge",
    about = "Infers candidate bonding graphs from XYZ geometries and labels them against a canonical-identifier oracle.",
    version,
    author,
    arg_required_else_help = true
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Label every candidate structure of a batch of geometries and write a CSV table.
    Label(label::LabelArgs),
    /// Print the candidate structures and bonding models of one geometry.
    Inspect(inspect::InspectArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Label(args) => label::run(&args)?,
        Command::Inspect(args) => inspect::run(&args)?,
    }

    Ok(())
}
