use clap::Args;
use serde_json::Value;

use succession_core::LegalParameters;

/// Arguments for printing the legal parameter table
#[derive(Args)]
pub struct ParamsArgs {}

pub fn run(_args: ParamsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(LegalParameters::france_2025())?)
}
