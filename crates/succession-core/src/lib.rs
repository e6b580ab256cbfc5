//! Deterministic French succession engine.
//!
//! Given a fully-typed dossier (patrimony, family, prior gifts, debts,
//! matrimonial regime and testamentary wishes) and a legal parameter table,
//! [`simulate`] liquidates the matrimonial regime, reconstitutes the estate,
//! resolves the devolution and the reserve, allocates shares, and computes
//! inheritance tax and life-insurance levies — producing per-heir figures,
//! a step-by-step trace and structured warnings.
//!
//! The engine is a pure function of its inputs: no I/O, no ambient
//! configuration, bit-identical outputs for identical dossiers.

pub mod error;
pub mod output;
pub mod params;
pub mod trace;
pub mod types;

mod allocation;
mod devolution;
mod inheritance_tax;
mod life_insurance;
mod liquidation;
mod pipeline;
mod reconstitution;
mod usufruct;

pub use error::SuccessionError;
pub use output::{
    AssetBreakdown, BracketApplication, GlobalMetrics, HeirBreakdown, LiquidationDetails,
    SpouseDetails, SuccessionOutput,
};
pub use params::LegalParameters;
pub use pipeline::simulate;
pub use trace::{Audience, CalculationStep, Explanation, Severity, Warning, WarningCategory};
pub use types::*;

/// Standard result type for all succession operations.
pub type SuccessionResult<T> = Result<T, SuccessionError>;
