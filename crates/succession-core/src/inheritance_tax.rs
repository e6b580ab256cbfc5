//! Inheritance tax per heir: partial exemptions on the base, the personal
//! allowance with its 15-year recall, then the progressive brackets or flat
//! rate matching the kinship.

use chrono::Months;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;

use crate::allocation::HeirAllocation;
use crate::life_insurance::LifeInsuranceOutcome;
use crate::liquidation::LiquidationOutcome;
use crate::output::BracketApplication;
use crate::params::LegalParameters;
use crate::reconstitution::ReconstitutionOutcome;
use crate::trace::{keys, Audience, Severity, Tracer, WarningCategory};
use crate::types::{
    AdoptionType, Heir, Money, Relationship, SimulationInput,
};

#[derive(Debug, Clone)]
pub(crate) struct HeirTax {
    pub heir_id: String,
    pub taxable_base: Money,
    pub allowance_used: Money,
    pub brackets_applied: Vec<BracketApplication>,
    pub tax_amount: Money,
    pub exempt: bool,
    pub explanation_keys: Vec<String>,
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InheritanceTaxOutcome {
    pub heirs: Vec<HeirTax>,
    pub total_tax: Money,
}

pub(crate) fn assess(
    input: &SimulationInput,
    liquidation: &LiquidationOutcome,
    reconstitution: &ReconstitutionOutcome,
    allocations: &[HeirAllocation],
    life_insurance: &LifeInsuranceOutcome,
    params: &LegalParameters,
    tracer: &mut Tracer,
) -> InheritanceTaxOutcome {
    let exemption_pool = asset_level_exemptions(input, liquidation, params, tracer);

    let mut heirs: Vec<HeirTax> = Vec::new();
    let mut total_tax = Decimal::ZERO;

    for heir in &input.heirs {
        if heir.renounces() {
            continue;
        }
        let allocation = allocations.iter().find(|a| a.heir_id == heir.id);
        let civil_share = allocation
            .map(|a| a.net_of_imputation)
            .unwrap_or(Decimal::ZERO);
        let share_fraction = allocation
            .map(|a| a.share_fraction)
            .unwrap_or(Decimal::ZERO);
        let right_of_return: Money = reconstitution
            .right_of_return
            .iter()
            .filter(|r| r.parent_id == heir.id)
            .map(|r| r.value)
            .sum();
        let addback = life_insurance.addback_for(&heir.id);

        if civil_share.is_zero() && right_of_return.is_zero() && addback.is_zero() {
            continue;
        }

        let assessment = assess_heir(
            input,
            heir,
            civil_share + right_of_return,
            share_fraction,
            exemption_pool,
            addback,
            params,
            tracer,
        );
        total_tax += assessment.tax_amount;
        heirs.push(assessment);
    }

    InheritanceTaxOutcome { heirs, total_tax }
}

#[allow(clippy::too_many_arguments)]
fn assess_heir(
    input: &SimulationInput,
    heir: &Heir,
    civil_share: Money,
    share_fraction: Decimal,
    exemption_pool: Money,
    addback_757b: Money,
    params: &LegalParameters,
    tracer: &mut Tracer,
) -> HeirTax {
    let mut heir_keys: Vec<String> = Vec::new();

    // Spouse and PACS partner owe nothing (Art. 796-0 bis CGI).
    if matches!(heir.relationship, Relationship::Spouse | Relationship::Partner) {
        tracer.explain(
            keys::TAX_SPOUSE_EXEMPT,
            json!({"article": "Art. 796-0 bis CGI", "heir_id": heir.id}),
        );
        heir_keys.push(keys::TAX_SPOUSE_EXEMPT.to_string());
        return HeirTax {
            heir_id: heir.id.clone(),
            taxable_base: Decimal::ZERO,
            allowance_used: Decimal::ZERO,
            brackets_applied: Vec::new(),
            tax_amount: Decimal::ZERO,
            exempt: true,
            explanation_keys: heir_keys,
            details: json!({
                "civil_share": civil_share.to_string(),
                "exempt": true,
            }),
        };
    }

    // Asset-level partial exemptions, spread over the mass pro-rata.
    let exemption_slice = exemption_pool * share_fraction;
    let base_after_exemptions = (civil_share - exemption_slice).max(Decimal::ZERO);
    let taxable_base = base_after_exemptions + addback_757b;

    let (allowance_amount, allowance_key, allowance_article) = base_allowance(heir, params);
    heir_keys.push(allowance_key.to_string());
    tracer.explain(
        allowance_key,
        json!({
            "article": allowance_article,
            "heir_id": heir.id,
            "allowance": allowance_amount.to_string(),
        }),
    );

    let mut allowance = allowance_amount;
    if heir.is_disabled {
        allowance += params.allowances.disability_supplement;
        heir_keys.push(keys::ABATEMENT_DISABLED_SUPPLEMENT.to_string());
        tracer.explain(
            keys::ABATEMENT_DISABLED_SUPPLEMENT,
            json!({
                "article": "Art. 779 II CGI",
                "heir_id": heir.id,
                "supplement": params.allowances.disability_supplement.to_string(),
            }),
        );
    }

    // Art. 784 CGI: declared gifts within the recall window consume the
    // allowance, never below zero.
    let recall = fiscal_recall(input, heir, params);
    if recall > Decimal::ZERO {
        let consumed = recall.min(allowance);
        allowance -= consumed;
        heir_keys.push(keys::ABATEMENT_CONSUMED_15Y.to_string());
        tracer.explain(
            keys::ABATEMENT_CONSUMED_15Y,
            json!({
                "article": "Art. 784 CGI",
                "heir_id": heir.id,
                "recalled": recall.to_string(),
                "allowance_left": allowance.to_string(),
            }),
        );
    }

    let allowance_used = allowance.min(taxable_base);
    let net_taxable = taxable_base - allowance_used;

    let (brackets_applied, raw_tax, rate_key, rate_article) =
        apply_rate_schedule(heir, net_taxable, params, tracer);
    heir_keys.push(rate_key.to_string());

    // Single rounding point per heir, half-to-even, cent precision.
    let tax_amount = raw_tax.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);

    HeirTax {
        heir_id: heir.id.clone(),
        taxable_base,
        allowance_used,
        brackets_applied,
        tax_amount,
        exempt: false,
        explanation_keys: heir_keys,
        details: json!({
            "civil_share": civil_share.to_string(),
            "exemption_slice": exemption_slice.to_string(),
            "addback_757b": addback_757b.to_string(),
            "allowance_available": allowance.to_string(),
            "allowance_used": allowance_used.to_string(),
            "net_taxable": net_taxable.to_string(),
            "rate_schedule": rate_article,
        }),
    }
}

/// Allowance by kinship (Art. 779, 788 CGI).
fn base_allowance(heir: &Heir, params: &LegalParameters) -> (Money, &'static str, &'static str) {
    let a = &params.allowances;
    match heir.relationship {
        Relationship::Child | Relationship::Grandchild | Relationship::GreatGrandchild => {
            (a.child, keys::ABATEMENT_CHILD_100K, "Art. 779 I CGI")
        }
        Relationship::Parent => (a.parent, keys::ABATEMENT_PARENT_100K, "Art. 779 I CGI"),
        Relationship::Sibling => (a.sibling, keys::ABATEMENT_SIBLING, "Art. 779 IV CGI"),
        Relationship::NephewNiece => (a.nephew_niece, keys::ABATEMENT_NEPHEW, "Art. 779 V CGI"),
        Relationship::Other | Relationship::Spouse | Relationship::Partner => {
            (a.default, keys::ABATEMENT_DEFAULT, "Art. 788 IV CGI")
        }
    }
}

/// Declared gifts to this heir dated within the recall window.
fn fiscal_recall(input: &SimulationInput, heir: &Heir, params: &LegalParameters) -> Money {
    let window_start = input
        .deceased
        .death_date
        .checked_sub_months(Months::new(params.recall_window_years * 12));
    let Some(window_start) = window_start else {
        return Decimal::ZERO;
    };

    input
        .donations
        .iter()
        .filter(|d| {
            d.beneficiary_id == heir.id
                && d.is_declared_to_tax
                && d.donation_date >= window_start
                && d.donation_date <= input.deceased.death_date
        })
        .map(|d| d.current_estimated_value.unwrap_or(d.original_value))
        .sum()
}

/// Pick and run the rate schedule for this heir.
fn apply_rate_schedule(
    heir: &Heir,
    net_taxable: Money,
    params: &LegalParameters,
    tracer: &mut Tracer,
) -> (Vec<BracketApplication>, Money, &'static str, &'static str) {
    enum Schedule {
        DirectLine,
        Sibling,
        Flat(Decimal, &'static str, &'static str),
    }

    let schedule = match (heir.relationship, heir.adoption_type) {
        (Relationship::Child, AdoptionType::Simple) => {
            if heir.has_received_continuous_care {
                Schedule::DirectLine
            } else {
                // Simple adoption without continuous care: taxed as a stranger.
                tracer.warn(
                    Severity::Warning,
                    Audience::User,
                    WarningCategory::Fiscal,
                    format!(
                        "Adoption simple sans soins continus: {} est taxé au taux \
                         des tiers (60%)",
                        heir.id
                    ),
                    json!({"heir_id": heir.id}),
                    &[keys::TAX_SIMPLE_ADOPTION],
                );
                Schedule::Flat(params.stranger_rate, keys::TAX_FLAT_60, "Art. 786 CGI")
            }
        }
        (Relationship::Child, _)
        | (Relationship::Grandchild, _)
        | (Relationship::GreatGrandchild, _)
        | (Relationship::Parent, _) => Schedule::DirectLine,
        (Relationship::Sibling, _) => Schedule::Sibling,
        (Relationship::NephewNiece, _) => {
            Schedule::Flat(params.fourth_degree_rate, keys::TAX_FLAT_55, "Art. 777 CGI")
        }
        _ => Schedule::Flat(params.stranger_rate, keys::TAX_FLAT_60, "Art. 777 CGI"),
    };

    match schedule {
        Schedule::DirectLine => {
            let (brackets, tax) = walk_brackets(&params.direct_line_brackets, net_taxable);
            tracer.explain(
                keys::TAX_DIRECT_LINE_BRACKETS,
                json!({
                    "article": "Art. 777 CGI",
                    "heir_id": heir.id,
                    "net_taxable": net_taxable.to_string(),
                    "tax": tax.to_string(),
                }),
            );
            (brackets, tax, keys::TAX_DIRECT_LINE_BRACKETS, "Art. 777 CGI (ligne directe)")
        }
        Schedule::Sibling => {
            let (brackets, tax) = walk_brackets(&params.sibling_brackets, net_taxable);
            tracer.explain(
                keys::TAX_SIBLING_BRACKETS,
                json!({
                    "article": "Art. 777 CGI",
                    "heir_id": heir.id,
                    "net_taxable": net_taxable.to_string(),
                    "tax": tax.to_string(),
                }),
            );
            (brackets, tax, keys::TAX_SIBLING_BRACKETS, "Art. 777 CGI (frères et sœurs)")
        }
        Schedule::Flat(rate, key, article) => {
            let tax = net_taxable * rate;
            let brackets = vec![BracketApplication {
                bracket_floor: Decimal::ZERO,
                bracket_ceiling: None,
                rate,
                taxable_in_bracket: net_taxable,
                tax_in_bracket: tax,
            }];
            tracer.explain(
                key,
                json!({
                    "article": article,
                    "heir_id": heir.id,
                    "rate": rate.to_string(),
                    "tax": tax.to_string(),
                }),
            );
            (brackets, tax, key, article)
        }
    }
}

/// Piecewise application of a progressive schedule.
fn walk_brackets(
    brackets: &[crate::params::TaxBracket],
    net_taxable: Money,
) -> (Vec<BracketApplication>, Money) {
    let mut applied: Vec<BracketApplication> = Vec::new();
    let mut tax = Decimal::ZERO;
    let mut floor = Decimal::ZERO;

    for bracket in brackets {
        if net_taxable <= floor {
            break;
        }
        let ceiling = bracket.up_to;
        let upper = ceiling.unwrap_or(net_taxable).min(net_taxable);
        let taxable_in_bracket = upper - floor;
        if taxable_in_bracket <= Decimal::ZERO {
            floor = upper;
            continue;
        }
        let tax_in_bracket = taxable_in_bracket * bracket.rate;
        tax += tax_in_bracket;
        applied.push(BracketApplication {
            bracket_floor: floor,
            bracket_ceiling: ceiling,
            rate: bracket.rate,
            taxable_in_bracket,
            tax_in_bracket,
        });
        match ceiling {
            Some(c) => floor = c,
            None => break,
        }
    }

    (applied, tax)
}

/// Total of the partial exemptions carried by in-mass assets.
fn asset_level_exemptions(
    input: &SimulationInput,
    liquidation: &LiquidationOutcome,
    params: &LegalParameters,
    tracer: &mut Tracer,
) -> Money {
    let mut pool = Decimal::ZERO;
    for asset in &input.assets {
        let Some(split) = liquidation
            .splits
            .iter()
            .find(|s| s.asset_id == asset.id)
        else {
            continue;
        };
        let in_mass = split.deceased_share;
        if in_mass.is_zero() {
            continue;
        }

        if asset.professional_exemption {
            // Dutreil: 75% of the professional value; the current account
            // (CCA) never enters the exemption base.
            let cca = asset.cca_value.unwrap_or(Decimal::ZERO);
            let eligible = (in_mass - cca).max(Decimal::ZERO);
            let exempt = eligible * params.professional_exemption_rate;
            pool += exempt;
            tracer.explain(
                keys::TAX_DUTREIL_75,
                json!({
                    "article": "Art. 787 B CGI",
                    "asset_id": asset.id,
                    "eligible": eligible.to_string(),
                    "exempt": exempt.to_string(),
                }),
            );
        } else if asset.rural_exemption {
            let threshold = params.rural_exemption_threshold;
            let below = in_mass.min(threshold) * params.rural_exemption_rate;
            let above = (in_mass - threshold).max(Decimal::ZERO) * params.rural_reduced_rate;
            let exempt = below + above;
            pool += exempt;
            tracer.explain(
                keys::TAX_RURAL_EXEMPTION,
                json!({
                    "article": "Art. 793 CGI",
                    "asset_id": asset.id,
                    "exempt": exempt.to_string(),
                }),
            );
        }

        if asset.is_main_residence && asset.spouse_occupies_property {
            let abatement = in_mass * params.main_residence_abatement;
            pool += abatement;
            tracer.explain(
                keys::TAX_MAIN_RESIDENCE_20,
                json!({
                    "article": "Art. 764 bis CGI",
                    "asset_id": asset.id,
                    "abatement": abatement.to_string(),
                }),
            );
        }
    }
    pool
}
