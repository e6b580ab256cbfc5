//! Legal parameter table: tax brackets, allowances, the Art. 669 usufruct
//! scale and the life-insurance limits.
//!
//! The table is read-only input to `simulate`. Nothing in the engine reads
//! module-level state, so a simulation run against the 2025 table stays
//! reproducible after a later table ships.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// One progressive bracket. `up_to = None` marks the open-ended top band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxBracket {
    pub up_to: Option<Money>,
    pub rate: Rate,
}

/// Personal allowances by relationship (Art. 779, 788 CGI).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allowances {
    pub child: Money,
    pub parent: Money,
    pub sibling: Money,
    pub nephew_niece: Money,
    /// Anyone beyond the fourth degree, and strangers.
    pub default: Money,
    /// Supplement for disabled heirs (Art. 779 II), cumulative.
    pub disability_supplement: Money,
}

/// One band of the Art. 669 I viager scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsufructBand {
    /// Band applies while the usufructuary's age is strictly below this.
    pub below_age: u8,
    pub rate: Rate,
}

/// Art. 990 I and 757 B CGI limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifeInsuranceParams {
    /// Art. 990 I per-beneficiary allowance.
    pub per_beneficiary_allowance: Money,
    /// Art. 990 I: 20% up to this taxable amount, 31.25% above.
    pub reduced_rate_threshold: Money,
    pub base_rate: Rate,
    pub top_rate: Rate,
    /// Art. 757 B single allowance shared by all beneficiaries.
    pub post70_shared_allowance: Money,
    /// Vie-Génération rebate applied to the capital before allowances.
    pub vie_generation_rebate: Rate,
}

/// The full static table consumed by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalParameters {
    /// Art. 777 CGI, direct line.
    pub direct_line_brackets: Vec<TaxBracket>,
    /// Art. 777 CGI, siblings.
    pub sibling_brackets: Vec<TaxBracket>,
    /// Collaterals up to the fourth degree (nephews/nieces).
    pub fourth_degree_rate: Rate,
    /// Beyond the fourth degree and strangers.
    pub stranger_rate: Rate,
    pub allowances: Allowances,
    pub usufruct_scale: Vec<UsufructBand>,
    /// Floor of the viager scale (age 91 and beyond).
    pub usufruct_floor_rate: Rate,
    /// Art. 669 II: per started decade of a temporary usufruct.
    pub temporary_usufruct_rate_per_decade: Rate,
    pub life_insurance: LifeInsuranceParams,
    /// Funeral expenses deductible without invoice (Art. 775 CGI).
    pub funeral_expenses_cap: Money,
    /// Dutreil pact exemption (Art. 787 B CGI).
    pub professional_exemption_rate: Rate,
    /// Rural goods under long lease (Art. 793 CGI).
    pub rural_exemption_rate: Rate,
    pub rural_exemption_threshold: Money,
    pub rural_reduced_rate: Rate,
    /// Main residence occupied by the surviving spouse (Art. 764 bis CGI).
    pub main_residence_abatement: Rate,
    /// Fiscal recall window for declared gifts (Art. 784 CGI).
    pub recall_window_years: u32,
}

impl LegalParameters {
    /// Table in force for deaths in 2025.
    pub fn france_2025() -> Self {
        Self {
            direct_line_brackets: vec![
                TaxBracket { up_to: Some(dec!(8_072)), rate: dec!(0.05) },
                TaxBracket { up_to: Some(dec!(12_109)), rate: dec!(0.10) },
                TaxBracket { up_to: Some(dec!(15_932)), rate: dec!(0.15) },
                TaxBracket { up_to: Some(dec!(552_324)), rate: dec!(0.20) },
                TaxBracket { up_to: Some(dec!(902_838)), rate: dec!(0.30) },
                TaxBracket { up_to: Some(dec!(1_805_677)), rate: dec!(0.40) },
                TaxBracket { up_to: None, rate: dec!(0.45) },
            ],
            sibling_brackets: vec![
                TaxBracket { up_to: Some(dec!(24_430)), rate: dec!(0.35) },
                TaxBracket { up_to: None, rate: dec!(0.45) },
            ],
            fourth_degree_rate: dec!(0.55),
            stranger_rate: dec!(0.60),
            allowances: Allowances {
                child: dec!(100_000),
                parent: dec!(100_000),
                sibling: dec!(15_932),
                nephew_niece: dec!(7_967),
                default: dec!(1_594),
                disability_supplement: dec!(159_325),
            },
            usufruct_scale: vec![
                UsufructBand { below_age: 21, rate: dec!(0.90) },
                UsufructBand { below_age: 31, rate: dec!(0.80) },
                UsufructBand { below_age: 41, rate: dec!(0.70) },
                UsufructBand { below_age: 51, rate: dec!(0.60) },
                UsufructBand { below_age: 61, rate: dec!(0.50) },
                UsufructBand { below_age: 71, rate: dec!(0.40) },
                UsufructBand { below_age: 81, rate: dec!(0.30) },
                UsufructBand { below_age: 91, rate: dec!(0.20) },
            ],
            usufruct_floor_rate: dec!(0.10),
            temporary_usufruct_rate_per_decade: dec!(0.23),
            life_insurance: LifeInsuranceParams {
                per_beneficiary_allowance: dec!(152_500),
                reduced_rate_threshold: dec!(700_000),
                base_rate: dec!(0.20),
                top_rate: dec!(0.3125),
                post70_shared_allowance: dec!(30_500),
                vie_generation_rebate: dec!(0.20),
            },
            funeral_expenses_cap: dec!(1_500),
            professional_exemption_rate: dec!(0.75),
            rural_exemption_rate: dec!(0.75),
            rural_exemption_threshold: dec!(300_000),
            rural_reduced_rate: dec!(0.50),
            main_residence_abatement: dec!(0.20),
            recall_window_years: 15,
        }
    }
}
