mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::params::ParamsArgs;
use commands::simulate::SimulateArgs;

/// French succession simulation with decimal precision
#[derive(Parser)]
#[command(
    name = "succession",
    version,
    about = "French succession simulation with decimal precision",
    long_about = "Simulates the devolution and taxation of a French succession: \
                  matrimonial liquidation, estate reconstitution, devolution and \
                  reserve, share allocation, inheritance tax and life-insurance \
                  levies, with a full calculation trace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full succession simulation from a dossier file
    Simulate(SimulateArgs),
    /// Print the active legal parameter table
    Params(ParamsArgs),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Params(args) => commands::params::run(args),
    };

    match result {
        Ok(value) => output::render(&cli.output, &value),
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            process::exit(1);
        }
    }
}
