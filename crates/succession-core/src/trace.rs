//! Calculation trace: numbered steps, structured warnings and explanation
//! keys, accumulated append-only while the pipeline runs and returned with
//! the output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Audience {
    User,
    Notary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCategory {
    Legal,
    Fiscal,
    Data,
    Optimization,
}

/// A domain finding surfaced on the output instead of failing the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub severity: Severity,
    pub audience: Audience,
    pub category: WarningCategory,
    pub message: String,
    pub details: Value,
    pub explanation_keys: Vec<String>,
}

/// An explanation key paired with its value context. Consumers map the key
/// to localized text; the context carries the figures and the legal article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub key: String,
    pub context: Value,
}

/// One numbered pipeline step, for the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationStep {
    pub step_number: u32,
    pub step_name: String,
    pub description: String,
    pub result_summary: String,
}

/// Append-only trace owned by the pipeline for the duration of one run.
#[derive(Debug, Default)]
pub struct Tracer {
    steps: Vec<CalculationStep>,
    warnings: Vec<Warning>,
    explanations: Vec<Explanation>,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&mut self, name: &str, description: &str, result_summary: String) {
        let step_number = self.steps.len() as u32 + 1;
        self.steps.push(CalculationStep {
            step_number,
            step_name: name.to_string(),
            description: description.to_string(),
            result_summary,
        });
    }

    pub fn warn(
        &mut self,
        severity: Severity,
        audience: Audience,
        category: WarningCategory,
        message: impl Into<String>,
        details: Value,
        explanation_keys: &[&str],
    ) {
        self.warnings.push(Warning {
            severity,
            audience,
            category,
            message: message.into(),
            details,
            explanation_keys: explanation_keys.iter().map(|k| k.to_string()).collect(),
        });
    }

    pub fn explain(&mut self, key: &str, context: Value) {
        self.explanations.push(Explanation {
            key: key.to_string(),
            context,
        });
    }

    pub fn explanation_keys(&self) -> Vec<String> {
        self.explanations.iter().map(|e| e.key.clone()).collect()
    }

    pub fn into_parts(self) -> (Vec<CalculationStep>, Vec<Warning>, Vec<Explanation>) {
        (self.steps, self.warnings, self.explanations)
    }
}

/// Stable explanation-key identifiers. The consumer owns the wording; the
/// engine only guarantees the identifier and its context shape stay stable.
pub mod keys {
    // Liquidation
    pub const LIQUIDATION_SEPARATION: &str = "LIQUIDATION_SEPARATION";
    pub const LIQUIDATION_COMMUNITY_50: &str = "LIQUIDATION_COMMUNITY_50";
    pub const LIQUIDATION_UNIVERSAL: &str = "LIQUIDATION_UNIVERSAL";
    pub const LIQUIDATION_PROPRE: &str = "LIQUIDATION_PROPRE";
    pub const LIQUIDATION_PRECIPUT: &str = "LIQUIDATION_PRECIPUT";
    pub const LIQUIDATION_FULL_ATTRIBUTION: &str = "LIQUIDATION_FULL_ATTRIBUTION";
    pub const LIQUIDATION_UNEQUAL_SHARE: &str = "LIQUIDATION_UNEQUAL_SHARE";
    pub const LIQUIDATION_REWARD: &str = "LIQUIDATION_REWARD";
    pub const USUFRUCT_EXTINGUISHED: &str = "USUFRUCT_EXTINGUISHED";

    // Reconstitution
    pub const MASS_REPORTABLE_DONATION: &str = "MASS_REPORTABLE_DONATION";
    pub const MASS_DEBT_DEDUCTED: &str = "MASS_DEBT_DEDUCTED";
    pub const MASS_DEBT_PRORATA_769: &str = "MASS_DEBT_PRORATA_769";
    pub const MASS_FUNERAL_CAP: &str = "MASS_FUNERAL_CAP";
    pub const MASS_RIGHT_OF_RETURN: &str = "MASS_RIGHT_OF_RETURN";

    // Devolution & shares
    pub const SHARE_CHILDREN_EQUAL: &str = "SHARE_CHILDREN_EQUAL";
    pub const SHARE_REPRESENTATION: &str = "SHARE_REPRESENTATION";
    pub const SHARE_SPOUSE_QUARTER: &str = "SHARE_SPOUSE_QUARTER";
    pub const SHARE_SPOUSE_USUFRUCT: &str = "SHARE_SPOUSE_USUFRUCT";
    pub const SHARE_SPOUSE_DISPOSABLE_QUOTA: &str = "SHARE_SPOUSE_DISPOSABLE_QUOTA";
    pub const SHARE_SPOUSE_ALL_ESTATE: &str = "SHARE_SPOUSE_ALL_ESTATE";
    pub const SHARE_SPOUSE_WITH_PARENTS: &str = "SHARE_SPOUSE_WITH_PARENTS";
    pub const SHARE_PARENTS_SIBLINGS: &str = "SHARE_PARENTS_SIBLINGS";
    pub const SHARE_SIBLINGS_EQUAL: &str = "SHARE_SIBLINGS_EQUAL";
    pub const SHARE_CLEFT_SPLIT: &str = "SHARE_CLEFT_SPLIT";
    pub const RESERVE_CHILDREN: &str = "RESERVE_CHILDREN";
    pub const RESERVE_PARENTS: &str = "RESERVE_PARENTS";
    pub const SHARE_CUSTOM_TESTAMENT: &str = "SHARE_CUSTOM_TESTAMENT";
    pub const SHARE_SPECIFIC_BEQUEST: &str = "SHARE_SPECIFIC_BEQUEST";
    pub const IMPUTATION_GIFT: &str = "IMPUTATION_GIFT";

    // Usufruct valuation
    pub const USUFRUCT_VIAGER_SCALE: &str = "USUFRUCT_VIAGER_SCALE";
    pub const USUFRUCT_TEMPORAIRE: &str = "USUFRUCT_TEMPORAIRE";

    // Inheritance tax
    pub const ABATEMENT_CHILD_100K: &str = "ABATEMENT_CHILD_100K";
    pub const ABATEMENT_PARENT_100K: &str = "ABATEMENT_PARENT_100K";
    pub const ABATEMENT_SIBLING: &str = "ABATEMENT_SIBLING";
    pub const ABATEMENT_NEPHEW: &str = "ABATEMENT_NEPHEW";
    pub const ABATEMENT_DEFAULT: &str = "ABATEMENT_DEFAULT";
    pub const ABATEMENT_DISABLED_SUPPLEMENT: &str = "ABATEMENT_DISABLED_SUPPLEMENT";
    pub const ABATEMENT_CONSUMED_15Y: &str = "ABATEMENT_CONSUMED_15Y";
    pub const TAX_SPOUSE_EXEMPT: &str = "TAX_SPOUSE_EXEMPT";
    pub const TAX_DIRECT_LINE_BRACKETS: &str = "TAX_DIRECT_LINE_BRACKETS";
    pub const TAX_SIBLING_BRACKETS: &str = "TAX_SIBLING_BRACKETS";
    pub const TAX_FLAT_55: &str = "TAX_FLAT_55";
    pub const TAX_FLAT_60: &str = "TAX_FLAT_60";
    pub const TAX_SIMPLE_ADOPTION: &str = "TAX_SIMPLE_ADOPTION";
    pub const TAX_DUTREIL_75: &str = "TAX_DUTREIL_75";
    pub const TAX_RURAL_EXEMPTION: &str = "TAX_RURAL_EXEMPTION";
    pub const TAX_MAIN_RESIDENCE_20: &str = "TAX_MAIN_RESIDENCE_20";

    // Life insurance
    pub const LIFE_INSURANCE_990I: &str = "LIFE_INSURANCE_990I";
    pub const LIFE_INSURANCE_757B: &str = "LIFE_INSURANCE_757B";
    pub const LIFE_INSURANCE_VIE_GENERATION: &str = "LIFE_INSURANCE_VIE_GENERATION";
    pub const LIFE_INSURANCE_ANCIEN_EXEMPT: &str = "LIFE_INSURANCE_ANCIEN_EXEMPT";
    pub const LIFE_INSURANCE_DISMEMBERED: &str = "LIFE_INSURANCE_DISMEMBERED";
    pub const LIFE_INSURANCE_SPOUSE_EXEMPT: &str = "LIFE_INSURANCE_SPOUSE_EXEMPT";

    // Alerts
    pub const ALERT_RESERVE_EXCEEDED: &str = "ALERT_RESERVE_EXCEEDED";
    pub const ALERT_OVER_ALLOCATION: &str = "ALERT_OVER_ALLOCATION";
    pub const ALERT_INTERNATIONAL: &str = "ALERT_INTERNATIONAL";
    pub const ALERT_RETRANCHEMENT: &str = "ALERT_RETRANCHEMENT";
    pub const ALERT_SEPARATION_COMMUNITY_ASSET: &str = "ALERT_SEPARATION_COMMUNITY_ASSET";
    pub const ALERT_REWARD_PAYER_UNKNOWN: &str = "ALERT_REWARD_PAYER_UNKNOWN";
    pub const ALERT_JOINT_SUBSCRIPTION: &str = "ALERT_JOINT_SUBSCRIPTION";
    pub const ALERT_SPOUSE_OPTION_FALLBACK: &str = "ALERT_SPOUSE_OPTION_FALLBACK";
}
