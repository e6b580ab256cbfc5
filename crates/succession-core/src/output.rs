//! Result structures returned by `simulate`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::trace::{CalculationStep, Warning};
use crate::types::{MatrimonialRegime, Money, Rate, SpouseChoice};

/// Headline figures of the whole simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalMetrics {
    pub total_estate_value: Money,
    pub legal_reserve_value: Money,
    pub disposable_quota_value: Money,
    pub total_tax_amount: Money,
    pub explanation_keys: Vec<String>,
}

/// One piecewise bracket application, for the per-heir tax audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketApplication {
    pub bracket_floor: Money,
    pub bracket_ceiling: Option<Money>,
    pub rate: Rate,
    pub taxable_in_bracket: Money,
    pub tax_in_bracket: Money,
}

/// Everything computed for one heir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeirBreakdown {
    pub id: String,
    pub name: String,
    /// Fraction of the succession mass, in [0, 1].
    pub legal_share_percent: Rate,
    pub gross_share_value: Money,
    pub taxable_base: Money,
    pub abatement_used: Money,
    pub tax_amount: Money,
    pub net_share_value: Money,
    pub received_assets: Vec<String>,
    pub tax_calculation_details: Value,
    pub explanation_keys: Vec<String>,
}

/// Matrimonial liquidation summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationDetails {
    pub regime: MatrimonialRegime,
    pub community_assets_total: Money,
    pub spouse_community_share: Money,
    pub deceased_community_share: Money,
    pub has_preciput: bool,
    pub preciput_value: Money,
    pub details: Vec<String>,
}

/// Outcome of the surviving spouse's statutory option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpouseDetails {
    pub has_usufruct: bool,
    pub usufruct_value: Money,
    pub usufruct_rate: Rate,
    pub choice_made: Option<SpouseChoice>,
}

/// How one asset travelled through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetBreakdown {
    pub id: String,
    pub label: String,
    pub estimated_value: Money,
    pub deceased_share: Money,
    pub spouse_share: Money,
    pub preciput_share: Money,
    /// Value retained in the succession mass (zero for life insurance).
    pub in_mass_value: Money,
    /// Taxation route: "SUCCESSION", "ASSURANCE_VIE_990I", "ASSURANCE_VIE_757B",
    /// "ASSURANCE_VIE_EXONEREE", "HORS_MASSE".
    pub tax_treatment: String,
}

/// Full result of one simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessionOutput {
    pub global_metrics: GlobalMetrics,
    pub heirs_breakdown: Vec<HeirBreakdown>,
    pub liquidation_details: LiquidationDetails,
    pub spouse_details: SpouseDetails,
    pub assets_breakdown: Vec<AssetBreakdown>,
    pub calculation_steps: Vec<CalculationStep>,
    pub warnings: Vec<Warning>,
}
