//! Share allocation: turn the devolution result and the testamentary wishes
//! into one fraction and one gross value per heir, impute prior gifts, and
//! detect liberalities that bite into the reserve (Art. 920 CC).

use rust_decimal::Decimal;
use serde_json::json;

use crate::devolution::{DevolutionOutcome, SuccessionOrder};
use crate::liquidation::LiquidationOutcome;
use crate::output::SpouseDetails;
use crate::params::LegalParameters;
use crate::trace::{keys, Audience, Severity, Tracer, WarningCategory};
use crate::types::{
    Money, Rate, Relationship, SimulationInput, SpouseChoice, TestamentDistribution,
};
use crate::usufruct;

#[derive(Debug, Clone)]
pub(crate) struct HeirAllocation {
    pub heir_id: String,
    /// Fraction of the succession mass, in [0, 1].
    pub share_fraction: Rate,
    pub gross_value: Money,
    pub imputed_gifts: Money,
    /// What the heir actually draws from the estate at death.
    pub net_of_imputation: Money,
    pub received_assets: Vec<String>,
    pub via_representation: bool,
}

/// One liberality trimmed back by the Art. 920 reduction.
#[derive(Debug, Clone)]
pub(crate) struct LiberalityReduction {
    pub liberality_id: String,
    pub kind: &'static str,
    pub original_value: Money,
    pub reduced_by: Money,
}

#[derive(Debug, Clone)]
pub(crate) struct AllocationOutcome {
    pub allocations: Vec<HeirAllocation>,
    pub spouse_details: SpouseDetails,
    pub reserve_value: Money,
    pub quota_value: Money,
    pub reductions: Vec<LiberalityReduction>,
}

pub(crate) fn allocate(
    input: &SimulationInput,
    liquidation: &LiquidationOutcome,
    mass: Money,
    devolution: &DevolutionOutcome,
    params: &LegalParameters,
    tracer: &mut Tracer,
) -> AllocationOutcome {
    let reserve_value = mass * devolution.reserve_fraction;
    let quota_value = mass - reserve_value;

    let mut spouse_details = SpouseDetails {
        has_usufruct: false,
        usufruct_value: Decimal::ZERO,
        usufruct_rate: Decimal::ZERO,
        choice_made: None,
    };

    let mut bequest_total = Decimal::ZERO;
    let allocations = match input.wishes.testament_distribution {
        TestamentDistribution::Legal => {
            legal_allocation(input, mass, devolution, params, &mut spouse_details, tracer)
        }
        TestamentDistribution::SpouseAll => {
            spouse_all_allocation(input, mass, devolution, params, &mut spouse_details, tracer)
        }
        TestamentDistribution::ChildrenAll => {
            children_all_allocation(input, mass, devolution, params, &mut spouse_details, tracer)
        }
        TestamentDistribution::Custom => custom_allocation(input, mass, devolution, tracer),
        TestamentDistribution::SpecificBequests => bequest_allocation(
            input,
            liquidation,
            mass,
            devolution,
            params,
            &mut spouse_details,
            &mut bequest_total,
            tracer,
        ),
    };

    let allocations = impute_gifts(input, allocations, tracer);

    validate_individual_reserves(input, mass, devolution, &allocations, tracer);

    let reductions = reduce_excessive_liberalities(input, quota_value, bequest_total, tracer);

    AllocationOutcome {
        allocations,
        spouse_details,
        reserve_value,
        quota_value,
        reductions,
    }
}

/// Fractions of the mass under the legal devolution, spouse option included.
fn legal_allocation(
    input: &SimulationInput,
    mass: Money,
    devolution: &DevolutionOutcome,
    params: &LegalParameters,
    spouse_details: &mut SpouseDetails,
    tracer: &mut Tracer,
) -> Vec<HeirAllocation> {
    if devolution.order != SuccessionOrder::Descendants {
        // Orders without a statutory option are already fully determined.
        return devolution
            .fixed_shares
            .iter()
            .map(|(id, fraction)| HeirAllocation {
                heir_id: id.clone(),
                share_fraction: *fraction,
                gross_value: mass * *fraction,
                imputed_gifts: Decimal::ZERO,
                net_of_imputation: mass * *fraction,
                received_assets: Vec::new(),
                via_representation: false,
            })
            .collect();
    }

    let n_souches = devolution.souches.len() as u32;
    let mut allocations: Vec<HeirAllocation> = Vec::new();
    let mut children_pool = Decimal::ONE;

    if let Some(spouse_id) = &devolution.spouse_id {
        let choice = resolve_spouse_choice(input, tracer);
        let spouse_fraction = match choice {
            SpouseChoice::Usufruct => {
                let spouse = input.heir(spouse_id);
                let age = spouse
                    .and_then(|s| s.birth_date)
                    .map(|b| usufruct::age_at(b, input.deceased.death_date));
                match age {
                    Some(age) => {
                        let rate = usufruct::viager_rate(params, age);
                        spouse_details.has_usufruct = true;
                        spouse_details.usufruct_rate = rate;
                        spouse_details.usufruct_value = mass * rate;
                        spouse_details.choice_made = Some(SpouseChoice::Usufruct);
                        tracer.explain(
                            keys::SHARE_SPOUSE_USUFRUCT,
                            json!({
                                "article": "Art. 757 CC / Art. 669 CGI",
                                "age": age,
                                "rate": rate.to_string(),
                            }),
                        );
                        rate
                    }
                    None => {
                        tracer.warn(
                            Severity::Warning,
                            Audience::User,
                            WarningCategory::Data,
                            "Usufruit du conjoint invalorisable sans date de naissance: \
                             option ramenée au quart en pleine propriété",
                            json!({"spouse_id": spouse_id}),
                            &[keys::ALERT_SPOUSE_OPTION_FALLBACK],
                        );
                        quarter_fraction(spouse_details, tracer)
                    }
                }
            }
            SpouseChoice::QuarterOwnership => quarter_fraction(spouse_details, tracer),
            SpouseChoice::DisposableQuota => {
                let fraction = match n_souches {
                    1 => Decimal::ONE / Decimal::TWO,
                    2 => Decimal::ONE / Decimal::from(3),
                    _ => Decimal::ONE / Decimal::from(4),
                };
                spouse_details.choice_made = Some(SpouseChoice::DisposableQuota);
                tracer.explain(
                    keys::SHARE_SPOUSE_DISPOSABLE_QUOTA,
                    json!({
                        "article": "Art. 1094-1 CC",
                        "fraction": fraction.to_string(),
                        "souches": n_souches,
                    }),
                );
                fraction
            }
        };

        children_pool = Decimal::ONE - spouse_fraction;
        allocations.push(HeirAllocation {
            heir_id: spouse_id.clone(),
            share_fraction: spouse_fraction,
            gross_value: mass * spouse_fraction,
            imputed_gifts: Decimal::ZERO,
            net_of_imputation: mass * spouse_fraction,
            received_assets: Vec::new(),
            via_representation: false,
        });
    }

    let per_souche = children_pool / Decimal::from(n_souches);
    for souche in &devolution.souches {
        for member in &souche.members {
            let fraction = per_souche * member.weight;
            allocations.push(HeirAllocation {
                heir_id: member.heir_id.clone(),
                share_fraction: fraction,
                gross_value: mass * fraction,
                imputed_gifts: Decimal::ZERO,
                net_of_imputation: mass * fraction,
                received_assets: Vec::new(),
                via_representation: member.via_representation,
            });
        }
    }
    tracer.explain(
        keys::SHARE_CHILDREN_EQUAL,
        json!({
            "article": "Art. 735 CC",
            "souches": n_souches,
            "per_souche": per_souche.to_string(),
        }),
    );

    allocations
}

/// Spouse statutory choice with precondition checks (Art. 757 CC).
fn resolve_spouse_choice(input: &SimulationInput, tracer: &mut Tracer) -> SpouseChoice {
    let requested = input
        .wishes
        .spouse_choice
        .unwrap_or(SpouseChoice::QuarterOwnership);

    match requested {
        SpouseChoice::Usufruct => {
            let all_common_union = input
                .heirs
                .iter()
                .filter(|h| h.relationship == Relationship::Child && !h.renounces())
                .all(|h| h.is_from_current_union);
            if all_common_union || input.wishes.has_spouse_donation {
                SpouseChoice::Usufruct
            } else {
                tracer.warn(
                    Severity::Warning,
                    Audience::User,
                    WarningCategory::Legal,
                    "Usufruit total indisponible en présence d'enfants d'une autre \
                     union sans donation entre époux: option ramenée au quart",
                    json!({}),
                    &[keys::ALERT_SPOUSE_OPTION_FALLBACK],
                );
                SpouseChoice::QuarterOwnership
            }
        }
        SpouseChoice::DisposableQuota => {
            if input.wishes.has_spouse_donation {
                SpouseChoice::DisposableQuota
            } else {
                tracer.warn(
                    Severity::Warning,
                    Audience::User,
                    WarningCategory::Legal,
                    "Quotité disponible entre époux réservée aux donations au dernier \
                     vivant: option ramenée au quart",
                    json!({}),
                    &[keys::ALERT_SPOUSE_OPTION_FALLBACK],
                );
                SpouseChoice::QuarterOwnership
            }
        }
        SpouseChoice::QuarterOwnership => SpouseChoice::QuarterOwnership,
    }
}

fn quarter_fraction(spouse_details: &mut SpouseDetails, tracer: &mut Tracer) -> Rate {
    spouse_details.choice_made = Some(SpouseChoice::QuarterOwnership);
    tracer.explain(
        keys::SHARE_SPOUSE_QUARTER,
        json!({"article": "Art. 757 CC", "fraction": "0.25"}),
    );
    Decimal::ONE / Decimal::from(4)
}

fn spouse_all_allocation(
    input: &SimulationInput,
    mass: Money,
    devolution: &DevolutionOutcome,
    params: &LegalParameters,
    spouse_details: &mut SpouseDetails,
    tracer: &mut Tracer,
) -> Vec<HeirAllocation> {
    let Some(spouse_id) = devolution.spouse_id.clone() else {
        tracer.warn(
            Severity::Warning,
            Audience::User,
            WarningCategory::Data,
            "Testament en faveur du conjoint sans conjoint survivant: \
             dévolution légale appliquée",
            json!({}),
            &[],
        );
        return legal_allocation(input, mass, devolution, params, spouse_details, tracer);
    };

    tracer.explain(
        keys::SHARE_SPOUSE_ALL_ESTATE,
        json!({"article": "legs universel", "spouse_id": spouse_id}),
    );
    let mut allocations = vec![HeirAllocation {
        heir_id: spouse_id,
        share_fraction: Decimal::ONE,
        gross_value: mass,
        imputed_gifts: Decimal::ZERO,
        net_of_imputation: mass,
        received_assets: Vec::new(),
        via_representation: false,
    }];
    // Reserved heirs keep a line with a zero share so the reserve check
    // can name them.
    for souche in &devolution.souches {
        for member in &souche.members {
            allocations.push(zero_allocation(&member.heir_id, member.via_representation));
        }
    }
    allocations
}

fn children_all_allocation(
    input: &SimulationInput,
    mass: Money,
    devolution: &DevolutionOutcome,
    params: &LegalParameters,
    spouse_details: &mut SpouseDetails,
    tracer: &mut Tracer,
) -> Vec<HeirAllocation> {
    if devolution.souches.is_empty() {
        tracer.warn(
            Severity::Warning,
            Audience::User,
            WarningCategory::Data,
            "Testament en faveur des enfants sans descendance acceptante: \
             dévolution légale appliquée",
            json!({}),
            &[],
        );
        return legal_allocation(input, mass, devolution, params, spouse_details, tracer);
    }

    let per_souche = Decimal::ONE / Decimal::from(devolution.souches.len() as u32);
    let mut allocations: Vec<HeirAllocation> = Vec::new();
    for souche in &devolution.souches {
        for member in &souche.members {
            let fraction = per_souche * member.weight;
            allocations.push(HeirAllocation {
                heir_id: member.heir_id.clone(),
                share_fraction: fraction,
                gross_value: mass * fraction,
                imputed_gifts: Decimal::ZERO,
                net_of_imputation: mass * fraction,
                received_assets: Vec::new(),
                via_representation: member.via_representation,
            });
        }
    }
    if let Some(spouse_id) = &devolution.spouse_id {
        allocations.push(zero_allocation(spouse_id, false));
    }
    tracer.explain(
        keys::SHARE_CHILDREN_EQUAL,
        json!({"article": "legs universel aux enfants", "souches": devolution.souches.len()}),
    );
    allocations
}

fn custom_allocation(
    input: &SimulationInput,
    mass: Money,
    devolution: &DevolutionOutcome,
    tracer: &mut Tracer,
) -> Vec<HeirAllocation> {
    let total: Rate = input.wishes.custom_shares.iter().map(|c| c.percentage).sum();
    if (total - Decimal::ONE).abs() > Decimal::new(1, 6) {
        tracer.warn(
            Severity::Warning,
            Audience::User,
            WarningCategory::Data,
            format!(
                "Les parts testamentaires totalisent {} au lieu de 1; elles sont \
                 appliquées telles quelles",
                total
            ),
            json!({"total": total.to_string()}),
            &[keys::ALERT_OVER_ALLOCATION],
        );
    }

    tracer.explain(
        keys::SHARE_CUSTOM_TESTAMENT,
        json!({"article": "Art. 967 CC", "beneficiaries": input.wishes.custom_shares.len()}),
    );

    let mut allocations: Vec<HeirAllocation> = input
        .wishes
        .custom_shares
        .iter()
        .map(|c| HeirAllocation {
            heir_id: c.beneficiary_id.clone(),
            share_fraction: c.percentage,
            gross_value: mass * c.percentage,
            imputed_gifts: Decimal::ZERO,
            net_of_imputation: mass * c.percentage,
            received_assets: Vec::new(),
            via_representation: false,
        })
        .collect();

    // Reserved heirs missing from the testament still need a line for the
    // reserve check.
    for souche in &devolution.souches {
        for member in &souche.members {
            if !allocations.iter().any(|a| a.heir_id == member.heir_id) {
                allocations.push(zero_allocation(&member.heir_id, member.via_representation));
            }
        }
    }
    allocations
}

#[allow(clippy::too_many_arguments)]
fn bequest_allocation(
    input: &SimulationInput,
    liquidation: &LiquidationOutcome,
    mass: Money,
    devolution: &DevolutionOutcome,
    params: &LegalParameters,
    spouse_details: &mut SpouseDetails,
    bequest_total: &mut Money,
    tracer: &mut Tracer,
) -> Vec<HeirAllocation> {
    // Value each bequest against what the deceased actually owned of the
    // asset after liquidation; scale back proportionally when one asset is
    // promised beyond 100%.
    let mut bequests: Vec<(String, String, Money)> = Vec::new(); // (heir, asset, value)

    for asset in &input.assets {
        let claims: Vec<_> = input
            .wishes
            .specific_bequests
            .iter()
            .filter(|b| b.asset_id == asset.id)
            .collect();
        if claims.is_empty() {
            continue;
        }
        if asset.is_life_insurance() {
            tracer.warn(
                Severity::Warning,
                Audience::User,
                WarningCategory::Data,
                format!(
                    "Legs sur le contrat d'assurance-vie {}: hors succession, \
                     la clause bénéficiaire prime",
                    asset.id
                ),
                json!({"asset_id": asset.id}),
                &[],
            );
            continue;
        }

        let bequeathable = liquidation
            .splits
            .iter()
            .find(|s| s.asset_id == asset.id)
            .map(|s| s.deceased_share)
            .unwrap_or(Decimal::ZERO);

        let claimed: Rate = claims.iter().map(|b| b.share_percentage).sum();
        let scale = if claimed > Decimal::ONE {
            tracer.warn(
                Severity::Warning,
                Audience::User,
                WarningCategory::Data,
                format!(
                    "Le bien {} est légué à {}% au total: legs réduits \
                     proportionnellement",
                    asset.id,
                    claimed * Decimal::ONE_HUNDRED
                ),
                json!({"asset_id": asset.id, "claimed": claimed.to_string()}),
                &[keys::ALERT_OVER_ALLOCATION],
            );
            Decimal::ONE / claimed
        } else {
            Decimal::ONE
        };

        for claim in claims {
            let value = bequeathable * claim.share_percentage * scale;
            if value > Decimal::ZERO {
                tracer.explain(
                    keys::SHARE_SPECIFIC_BEQUEST,
                    json!({
                        "article": "Art. 1014 CC",
                        "asset_id": asset.id,
                        "beneficiary_id": claim.beneficiary_id,
                        "value": value.to_string(),
                    }),
                );
                bequests.push((claim.beneficiary_id.clone(), asset.id.clone(), value));
            }
        }
    }

    *bequest_total = bequests.iter().map(|(_, _, v)| *v).sum();
    let remaining = (mass - *bequest_total).max(Decimal::ZERO);

    // The un-bequeathed remainder follows the legal devolution.
    let legal = legal_allocation(input, remaining, devolution, params, spouse_details, tracer);

    let mut allocations: Vec<HeirAllocation> = Vec::new();
    for alloc in legal {
        allocations.push(HeirAllocation {
            share_fraction: if mass > Decimal::ZERO {
                alloc.gross_value / mass
            } else {
                Decimal::ZERO
            },
            ..alloc
        });
    }
    for (heir_id, asset_id, value) in bequests {
        match allocations.iter_mut().find(|a| a.heir_id == heir_id) {
            Some(existing) => {
                existing.gross_value += value;
                existing.net_of_imputation += value;
                existing.share_fraction = if mass > Decimal::ZERO {
                    existing.gross_value / mass
                } else {
                    Decimal::ZERO
                };
                existing.received_assets.push(asset_id);
            }
            None => {
                allocations.push(HeirAllocation {
                    heir_id,
                    share_fraction: if mass > Decimal::ZERO {
                        value / mass
                    } else {
                        Decimal::ZERO
                    },
                    gross_value: value,
                    imputed_gifts: Decimal::ZERO,
                    net_of_imputation: value,
                    received_assets: vec![asset_id],
                    via_representation: false,
                });
            }
        }
    }

    allocations
}

fn zero_allocation(heir_id: &str, via_representation: bool) -> HeirAllocation {
    HeirAllocation {
        heir_id: heir_id.to_string(),
        share_fraction: Decimal::ZERO,
        gross_value: Decimal::ZERO,
        imputed_gifts: Decimal::ZERO,
        net_of_imputation: Decimal::ZERO,
        received_assets: Vec::new(),
        via_representation,
    }
}

/// Art. 843 CC: reportable gifts count against the beneficiary's share.
fn impute_gifts(
    input: &SimulationInput,
    allocations: Vec<HeirAllocation>,
    tracer: &mut Tracer,
) -> Vec<HeirAllocation> {
    allocations
        .into_iter()
        .map(|mut alloc| {
            let imputed: Money = input
                .donations
                .iter()
                .filter(|d| d.beneficiary_id == alloc.heir_id)
                .map(|d| d.reportable_value())
                .sum();
            if imputed > Decimal::ZERO {
                let net = (alloc.gross_value - imputed).max(Decimal::ZERO);
                tracer.explain(
                    keys::IMPUTATION_GIFT,
                    json!({
                        "article": "Art. 843 CC",
                        "heir_id": alloc.heir_id,
                        "imputed": imputed.to_string(),
                        "excess": (imputed - alloc.gross_value).max(Decimal::ZERO).to_string(),
                    }),
                );
                alloc.imputed_gifts = imputed;
                alloc.net_of_imputation = net;
            }
            alloc
        })
        .collect()
}

/// Warn when a reserved heir ends below their individual reserve.
fn validate_individual_reserves(
    input: &SimulationInput,
    mass: Money,
    devolution: &DevolutionOutcome,
    allocations: &[HeirAllocation],
    tracer: &mut Tracer,
) {
    if devolution.reserve_fraction.is_zero() || mass.is_zero() {
        return;
    }
    if input.wishes.testament_distribution == TestamentDistribution::Legal {
        return;
    }

    let n_souches = devolution.souches.len().max(1) as u32;
    let reserve_value = mass * devolution.reserve_fraction;
    let mut shortfalls: Vec<serde_json::Value> = Vec::new();

    for souche in &devolution.souches {
        for member in &souche.members {
            let individual_reserve =
                reserve_value / Decimal::from(n_souches) * member.weight;
            let received = allocations
                .iter()
                .find(|a| a.heir_id == member.heir_id)
                .map(|a| a.gross_value)
                .unwrap_or(Decimal::ZERO);
            if received < individual_reserve {
                shortfalls.push(json!({
                    "heir_id": member.heir_id,
                    "individual_reserve": individual_reserve.to_string(),
                    "received": received.to_string(),
                    "shortfall": (individual_reserve - received).to_string(),
                }));
            }
        }
    }

    if !shortfalls.is_empty() {
        tracer.warn(
            Severity::Warning,
            Audience::Notary,
            WarningCategory::Legal,
            "La répartition testamentaire entame la réserve héréditaire; \
             action en réduction ouverte aux héritiers réservataires",
            json!({"shortfalls": shortfalls}),
            &[keys::ALERT_RESERVE_EXCEEDED],
        );
    }
}

/// Art. 920–924 CC: liberalities beyond the disposable quota are reducible,
/// bequests first (latest first), then gifts from the most recent backwards.
/// The engine reports the reduction plan; it does not rebalance the shares.
fn reduce_excessive_liberalities(
    input: &SimulationInput,
    quota_value: Money,
    bequest_total: Money,
    tracer: &mut Tracer,
) -> Vec<LiberalityReduction> {
    let donation_total: Money = input
        .donations
        .iter()
        .map(|d| d.reportable_value())
        .sum();
    let total_liberalities = donation_total + bequest_total;
    if total_liberalities <= quota_value {
        return Vec::new();
    }

    let mut excess = total_liberalities - quota_value;
    let mut reductions: Vec<LiberalityReduction> = Vec::new();

    // Bequests take effect last, so they absorb the excess first; with no
    // individual dates they reduce from the last listed backwards.
    for bequest in input.wishes.specific_bequests.iter().rev() {
        if excess <= Decimal::ZERO {
            break;
        }
        let asset_value = input
            .assets
            .iter()
            .find(|a| a.id == bequest.asset_id)
            .map(|a| a.estimated_value)
            .unwrap_or(Decimal::ZERO);
        let value = asset_value * bequest.share_percentage;
        if value.is_zero() {
            continue;
        }
        let reduced = value.min(excess);
        reductions.push(LiberalityReduction {
            liberality_id: format!("legs:{}:{}", bequest.asset_id, bequest.beneficiary_id),
            kind: "bequest",
            original_value: value,
            reduced_by: reduced,
        });
        excess -= reduced;
    }

    let mut donations: Vec<_> = input
        .donations
        .iter()
        .filter(|d| d.reportable_value() > Decimal::ZERO)
        .collect();
    donations.sort_by(|a, b| b.donation_date.cmp(&a.donation_date));
    for donation in donations {
        if excess <= Decimal::ZERO {
            break;
        }
        let value = donation.reportable_value();
        let reduced = value.min(excess);
        reductions.push(LiberalityReduction {
            liberality_id: donation.id.clone(),
            kind: "donation",
            original_value: value,
            reduced_by: reduced,
        });
        excess -= reduced;
    }

    let details: Vec<serde_json::Value> = reductions
        .iter()
        .map(|r| {
            json!({
                "liberality": r.liberality_id,
                "kind": r.kind,
                "original_value": r.original_value.to_string(),
                "reduced_by": r.reduced_by.to_string(),
            })
        })
        .collect();
    tracer.warn(
        Severity::Warning,
        Audience::Notary,
        WarningCategory::Legal,
        format!(
            "Libéralités ({}) supérieures à la quotité disponible ({}): \
             réduction de {} à répartir",
            total_liberalities,
            quota_value,
            total_liberalities - quota_value
        ),
        json!({"reductions": details}),
        &[keys::ALERT_RESERVE_EXCEEDED],
    );

    reductions
}
