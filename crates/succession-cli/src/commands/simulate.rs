use clap::Args;
use serde_json::Value;

use succession_core::{simulate, LegalParameters, SimulationInput};

use crate::input;

/// Arguments for a succession simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to the dossier file (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a legal parameter table (defaults to the France 2025 table)
    #[arg(long)]
    pub params: Option<String>,
}

pub fn run(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dossier: SimulationInput = input::read_document_or_stdin(args.input.as_deref())?
        .ok_or("--input <dossier.json> or piped stdin required for a simulation")?;

    let params: LegalParameters = match args.params {
        Some(ref path) => input::file::read_document(path)?,
        None => LegalParameters::france_2025(),
    };

    let result = simulate(&dossier, &params)?;
    Ok(serde_json::to_value(result)?)
}
