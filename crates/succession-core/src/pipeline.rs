//! Fixed-order orchestration of the whole simulation.
//!
//! `simulate` is the only public entry point: liquidation, reconstitution,
//! devolution, allocation, life-insurance taxation and inheritance taxation
//! always run, in that order (the Art. 757 B add-backs must exist before the
//! inheritance-tax stage). Every stage exit is checked for internal
//! consistency; domain findings travel as warnings on the output, never as
//! errors.

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;

use crate::allocation::{self, AllocationOutcome};
use crate::devolution::{self, SuccessionOrder};
use crate::error::SuccessionError;
use crate::inheritance_tax::{self, InheritanceTaxOutcome};
use crate::life_insurance::{self, LifeInsuranceOutcome};
use crate::liquidation::{self, LiquidationOutcome};
use crate::output::{
    AssetBreakdown, GlobalMetrics, HeirBreakdown, LiquidationDetails, SuccessionOutput,
};
use crate::params::LegalParameters;
use crate::reconstitution::{self, ReconstitutionOutcome};
use crate::trace::{keys, Audience, Severity, Tracer, WarningCategory};
use crate::types::{
    MatrimonialRegime, Money, Relationship, SimulationInput, TestamentDistribution,
};

/// Run one full succession simulation against a legal parameter table.
pub fn simulate(
    input: &SimulationInput,
    params: &LegalParameters,
) -> Result<SuccessionOutput, SuccessionError> {
    validate(input)?;

    let mut tracer = Tracer::new();
    emit_input_flags(input, &mut tracer);

    // Stage 1: matrimonial liquidation.
    let liquidation = liquidation::liquidate(input, params, &mut tracer);
    check_liquidation(&liquidation)?;
    tracer.step(
        "liquidation_matrimoniale",
        "Répartition des biens entre le défunt et le conjoint survivant",
        format!("actif net du défunt: {}", liquidation.deceased_net_assets),
    );

    // Stage 2: reconstitution of the succession mass.
    let reconstitution = reconstitution::reconstitute(input, &liquidation, params, &mut tracer);
    check_reconstitution(input, &liquidation, &reconstitution)?;
    tracer.step(
        "reconstitution_masse",
        "Actif net + donations rapportables − dettes déductibles",
        format!("masse successorale: {}", reconstitution.net_succession_mass),
    );

    // Stage 3: devolution order, souches and reserve.
    let devolution = devolution::solve(input, &mut tracer)?;
    tracer.step(
        "devolution",
        "Ordre successoral, souches et réserve héréditaire",
        format!(
            "réserve: {}, quotité disponible: {}",
            devolution.reserve_fraction, devolution.quota_fraction
        ),
    );

    // Stage 4: share allocation under the testamentary wishes.
    let mass = reconstitution.net_succession_mass;
    let allocation = allocation::allocate(
        input,
        &liquidation,
        mass,
        &devolution,
        params,
        &mut tracer,
    );
    check_allocation(input, &devolution, &allocation)?;
    tracer.step(
        "attribution_parts",
        "Parts brutes par héritier, imputation des donations",
        format!("{} attributions", allocation.allocations.len()),
    );

    // Stage 5: life insurance, outside the mass (feeds the tax stage).
    let life_insurance = life_insurance::assess(input, params, &mut tracer);
    tracer.step(
        "assurance_vie",
        "Taxation des capitaux d'assurance-vie (990 I / 757 B)",
        format!("prélèvements: {}", life_insurance.total_tax),
    );

    // Stage 6: inheritance tax per heir.
    let taxes = inheritance_tax::assess(
        input,
        &liquidation,
        &reconstitution,
        &allocation.allocations,
        &life_insurance,
        params,
        &mut tracer,
    );
    check_taxes(&taxes)?;
    tracer.step(
        "droits_succession",
        "Abattements, rappel fiscal et barèmes par héritier",
        format!("droits totaux: {}", taxes.total_tax),
    );

    Ok(assemble(
        input,
        liquidation,
        reconstitution,
        allocation,
        life_insurance,
        taxes,
        tracer,
    ))
}

/// Structural validation: the only failures the caller ever sees for a
/// malformed dossier.
fn validate(input: &SimulationInput) -> Result<(), SuccessionError> {
    if input.heirs.is_empty() {
        return Err(SuccessionError::InvalidInput {
            field: "heirs".into(),
            reason: "au moins un héritier est requis".into(),
        });
    }

    let mut seen = std::collections::HashSet::new();
    for heir in &input.heirs {
        if heir.id.is_empty() {
            return Err(SuccessionError::InvalidInput {
                field: "heirs.id".into(),
                reason: "identifiant vide".into(),
            });
        }
        if !seen.insert(heir.id.as_str()) {
            return Err(SuccessionError::InvalidInput {
                field: format!("heirs[{}]", heir.id),
                reason: "identifiant d'héritier dupliqué".into(),
            });
        }
    }

    let spouses = input
        .heirs
        .iter()
        .filter(|h| h.relationship == Relationship::Spouse)
        .count();
    if spouses > 1 {
        return Err(SuccessionError::InvalidInput {
            field: "heirs".into(),
            reason: "plus d'un conjoint survivant".into(),
        });
    }

    for asset in &input.assets {
        if asset.estimated_value < Decimal::ZERO {
            return Err(SuccessionError::InvalidInput {
                field: format!("assets[{}].estimated_value", asset.id),
                reason: "valeur négative".into(),
            });
        }
        if asset.premiums_before_70.is_some_and(|p| p < Decimal::ZERO)
            || asset.premiums_after_70.is_some_and(|p| p < Decimal::ZERO)
        {
            return Err(SuccessionError::InvalidInput {
                field: format!("assets[{}].premiums", asset.id),
                reason: "primes négatives".into(),
            });
        }
        if asset.community_funding_percentage < Decimal::ZERO
            || asset.community_funding_percentage > Decimal::ONE_HUNDRED
        {
            return Err(SuccessionError::InvalidInput {
                field: format!("assets[{}].community_funding_percentage", asset.id),
                reason: "doit être comprise entre 0 et 100".into(),
            });
        }
        for clause in &asset.life_insurance_beneficiaries {
            if clause.share < Decimal::ZERO || clause.share > Decimal::ONE {
                return Err(SuccessionError::InvalidInput {
                    field: format!("assets[{}].life_insurance_beneficiaries", asset.id),
                    reason: "quote-part hors de [0, 1]".into(),
                });
            }
        }
    }

    for debt in &input.debts {
        if debt.amount < Decimal::ZERO {
            return Err(SuccessionError::InvalidInput {
                field: format!("debts[{}].amount", debt.id),
                reason: "montant négatif".into(),
            });
        }
    }

    for donation in &input.donations {
        if donation.original_value < Decimal::ZERO
            || donation
                .current_estimated_value
                .is_some_and(|v| v < Decimal::ZERO)
        {
            return Err(SuccessionError::InvalidInput {
                field: format!("donations[{}]", donation.id),
                reason: "valeur négative".into(),
            });
        }
    }

    for share in &input.wishes.custom_shares {
        if share.percentage < Decimal::ZERO || share.percentage > Decimal::ONE {
            return Err(SuccessionError::InvalidInput {
                field: format!("wishes.custom_shares[{}]", share.beneficiary_id),
                reason: "part hors de [0, 1]".into(),
            });
        }
    }
    for bequest in &input.wishes.specific_bequests {
        if bequest.share_percentage < Decimal::ZERO || bequest.share_percentage > Decimal::ONE {
            return Err(SuccessionError::InvalidInput {
                field: format!("wishes.specific_bequests[{}]", bequest.asset_id),
                reason: "quote-part hors de [0, 1]".into(),
            });
        }
    }

    let adv = &input.matrimonial_advantages;
    if adv.has_unequal_share
        && (adv.spouse_share_percentage < Decimal::from(51)
            || adv.spouse_share_percentage > Decimal::from(99))
    {
        return Err(SuccessionError::InvalidInput {
            field: "matrimonial_advantages.spouse_share_percentage".into(),
            reason: "doit être comprise entre 51 et 99".into(),
        });
    }

    Ok(())
}

/// Non-fatal flags raised on the raw dossier before any computation.
fn emit_input_flags(input: &SimulationInput, tracer: &mut Tracer) {
    let is_foreign = |country: &Option<String>| {
        country
            .as_deref()
            .map(|c| !c.eq_ignore_ascii_case("FR") && !c.eq_ignore_ascii_case("FRANCE"))
            .unwrap_or(false)
    };

    if is_foreign(&input.deceased.residence_country) {
        tracer.warn(
            Severity::Warning,
            Audience::Notary,
            WarningCategory::Legal,
            "Résidence du défunt hors de France: le droit international privé \
             peut modifier la loi applicable (règlement UE 650/2012)",
            json!({"residence_country": input.deceased.residence_country}),
            &[keys::ALERT_INTERNATIONAL],
        );
    }
    for asset in &input.assets {
        if is_foreign(&asset.location_country) {
            tracer.warn(
                Severity::Info,
                Audience::Notary,
                WarningCategory::Legal,
                format!(
                    "Bien {} situé hors de France: conventions fiscales à vérifier",
                    asset.id
                ),
                json!({"asset_id": asset.id, "location_country": asset.location_country}),
                &[keys::ALERT_INTERNATIONAL],
            );
        }
    }

    let community = matches!(
        input.deceased.matrimonial_regime,
        MatrimonialRegime::CommunityLegal | MatrimonialRegime::CommunityUniversal
    );
    if community && input.deceased.marriage_date.is_none() {
        tracer.warn(
            Severity::Info,
            Audience::User,
            WarningCategory::Data,
            "Régime communautaire sans date de mariage: les biens communs non \
             datés sont présumés acquêts",
            json!({}),
            &[],
        );
    }

    for asset in &input.assets {
        if let (Some(acq), death) = (asset.acquisition_date, input.deceased.death_date) {
            if acq > death {
                tracer.warn(
                    Severity::Warning,
                    Audience::User,
                    WarningCategory::Data,
                    format!("Bien {} acquis après le décès: date suspecte", asset.id),
                    json!({"asset_id": asset.id}),
                    &[],
                );
            }
        }
    }

    let known = |id: &String| input.heirs.iter().any(|h| &h.id == id);
    for donation in &input.donations {
        if !known(&donation.beneficiary_id) {
            tracer.warn(
                Severity::Info,
                Audience::User,
                WarningCategory::Data,
                format!(
                    "Donation {} au profit de {} qui n'est pas dans le dossier",
                    donation.id, donation.beneficiary_id
                ),
                json!({"donation_id": donation.id}),
                &[],
            );
        }
    }

    if input.deceased.matrimonial_regime == MatrimonialRegime::CommunityUniversal {
        let has_stepchildren = input
            .heirs
            .iter()
            .any(|h| h.relationship == Relationship::Child && !h.is_from_current_union);
        if has_stepchildren {
            tracer.warn(
                Severity::Warning,
                Audience::Notary,
                WarningCategory::Legal,
                "Communauté universelle en présence d'enfants d'une autre union: \
                 risque d'action en retranchement",
                json!({}),
                &[keys::ALERT_RETRANCHEMENT],
            );
        }
    }

}

fn check_liquidation(liquidation: &LiquidationOutcome) -> Result<(), SuccessionError> {
    let cent = Decimal::new(1, 2);
    for split in &liquidation.splits {
        let sum = split.deceased_share + split.spouse_share + split.preciput_share;
        if (sum - split.divisible_value).abs() > cent {
            return Err(SuccessionError::Internal {
                stage: "liquidation".into(),
                detail: format!(
                    "répartition du bien {} ({}) incohérente avec sa valeur ({})",
                    split.asset_id, sum, split.divisible_value
                ),
            });
        }
    }
    Ok(())
}

fn check_reconstitution(
    input: &SimulationInput,
    liquidation: &LiquidationOutcome,
    reconstitution: &ReconstitutionOutcome,
) -> Result<(), SuccessionError> {
    if reconstitution.net_succession_mass < Decimal::ZERO {
        return Err(SuccessionError::Internal {
            stage: "reconstitution".into(),
            detail: "masse successorale négative".into(),
        });
    }
    // Life-insurance contracts must never have leaked into the mass.
    for asset in input.assets.iter().filter(|a| a.is_life_insurance()) {
        if liquidation.splits.iter().any(|s| s.asset_id == asset.id) {
            return Err(SuccessionError::Internal {
                stage: "reconstitution".into(),
                detail: format!("le contrat d'assurance-vie {} est entré dans la masse", asset.id),
            });
        }
    }
    Ok(())
}

fn check_allocation(
    input: &SimulationInput,
    devolution: &crate::devolution::DevolutionOutcome,
    allocation: &AllocationOutcome,
) -> Result<(), SuccessionError> {
    for alloc in &allocation.allocations {
        if alloc.gross_value < Decimal::ZERO || alloc.share_fraction < Decimal::ZERO {
            return Err(SuccessionError::Internal {
                stage: "attribution".into(),
                detail: format!("part négative pour {}", alloc.heir_id),
            });
        }
        if let Some(heir) = input.heir(&alloc.heir_id) {
            if heir.renounces() && !alloc.gross_value.is_zero() {
                return Err(SuccessionError::Internal {
                    stage: "attribution".into(),
                    detail: format!("part attribuée au renonçant {}", alloc.heir_id),
                });
            }
        }
    }

    // The fractions must cover the whole mass; a testament writing its own
    // percentages or legacies is the user's to get wrong and is only warned
    // about.
    let verbatim_testament = matches!(
        input.wishes.testament_distribution,
        TestamentDistribution::Custom | TestamentDistribution::SpecificBequests
    );
    if !verbatim_testament && devolution.order != SuccessionOrder::Vacant {
        let total: Decimal = allocation
            .allocations
            .iter()
            .map(|a| a.share_fraction)
            .sum();
        if (total - Decimal::ONE).abs() > Decimal::new(1, 6) {
            return Err(SuccessionError::Internal {
                stage: "attribution".into(),
                detail: format!("les parts totalisent {} au lieu de 1", total),
            });
        }
    }
    Ok(())
}

fn check_taxes(taxes: &InheritanceTaxOutcome) -> Result<(), SuccessionError> {
    for heir in &taxes.heirs {
        if heir.tax_amount < Decimal::ZERO {
            return Err(SuccessionError::Internal {
                stage: "droits".into(),
                detail: format!("droits négatifs pour {}", heir.heir_id),
            });
        }
        if heir.tax_amount > heir.taxable_base {
            return Err(SuccessionError::Internal {
                stage: "droits".into(),
                detail: format!(
                    "droits ({}) supérieurs à la base taxable ({}) pour {}",
                    heir.tax_amount, heir.taxable_base, heir.heir_id
                ),
            });
        }
    }
    Ok(())
}

fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    input: &SimulationInput,
    liquidation: LiquidationOutcome,
    reconstitution: ReconstitutionOutcome,
    allocation: AllocationOutcome,
    life_insurance: LifeInsuranceOutcome,
    taxes: InheritanceTaxOutcome,
    tracer: Tracer,
) -> SuccessionOutput {
    let mass = reconstitution.net_succession_mass;
    let right_of_return_total: Money = reconstitution
        .right_of_return
        .iter()
        .map(|r| r.value)
        .sum();
    let total_estate_value = mass + liquidation.preciput_value + right_of_return_total;

    let mut heirs_breakdown: Vec<HeirBreakdown> = Vec::new();
    let mut total_tax = life_insurance.total_tax;

    for heir in &input.heirs {
        let alloc = allocation
            .allocations
            .iter()
            .find(|a| a.heir_id == heir.id);
        let tax = taxes.heirs.iter().find(|t| t.heir_id == heir.id);
        let li_benefits = life_insurance.benefits_for(&heir.id);
        let li_tax = life_insurance.tax_for(&heir.id);
        let right_of_return: Vec<_> = reconstitution
            .right_of_return
            .iter()
            .filter(|r| r.parent_id == heir.id)
            .collect();
        let ror_value: Money = right_of_return.iter().map(|r| r.value).sum();

        let gross = alloc.map(|a| a.gross_value).unwrap_or(Decimal::ZERO);
        let net_of_imputation = alloc
            .map(|a| a.net_of_imputation)
            .unwrap_or(Decimal::ZERO);
        let inheritance_tax_amount = tax.map(|t| t.tax_amount).unwrap_or(Decimal::ZERO);
        let tax_amount = inheritance_tax_amount + round_money(li_tax);
        total_tax += inheritance_tax_amount;

        let net = (net_of_imputation + ror_value + li_benefits
            - inheritance_tax_amount
            - li_tax)
            .max(Decimal::ZERO);

        let mut received_assets: Vec<String> = alloc
            .map(|a| a.received_assets.clone())
            .unwrap_or_default();
        for r in &right_of_return {
            received_assets.extend(r.asset_ids.iter().cloned());
        }

        let mut explanation_keys = tax
            .map(|t| t.explanation_keys.clone())
            .unwrap_or_default();
        if alloc.is_some_and(|a| a.via_representation) {
            explanation_keys.push(keys::SHARE_REPRESENTATION.to_string());
        }
        if li_benefits > Decimal::ZERO {
            let addback = life_insurance.addback_for(&heir.id);
            let grandfathered = life_insurance
                .contracts
                .iter()
                .filter(|c| c.beneficiaries.iter().any(|b| b.heir_id == heir.id))
                .any(|c| c.regime == "ASSURANCE_VIE_EXONEREE");
            let key = if matches!(
                heir.relationship,
                Relationship::Spouse | Relationship::Partner
            ) {
                keys::LIFE_INSURANCE_SPOUSE_EXEMPT
            } else if grandfathered {
                keys::LIFE_INSURANCE_ANCIEN_EXEMPT
            } else if addback > Decimal::ZERO {
                keys::LIFE_INSURANCE_757B
            } else {
                keys::LIFE_INSURANCE_990I
            };
            explanation_keys.push(key.to_string());
        }
        if !ror_value.is_zero() {
            explanation_keys.push(keys::MASS_RIGHT_OF_RETURN.to_string());
        }

        let details = json!({
            "civil": tax.map(|t| t.details.clone()).unwrap_or(json!(null)),
            "brackets": tax.map(|t| t.brackets_applied.clone()).unwrap_or_default(),
            "imputed_gifts": alloc.map(|a| a.imputed_gifts.to_string()),
            "life_insurance_benefits": li_benefits.to_string(),
            "life_insurance_tax": li_tax.to_string(),
            "right_of_return": ror_value.to_string(),
        });

        heirs_breakdown.push(HeirBreakdown {
            id: heir.id.clone(),
            name: heir.display_name().to_string(),
            legal_share_percent: alloc.map(|a| a.share_fraction).unwrap_or(Decimal::ZERO),
            gross_share_value: round_money(gross),
            taxable_base: round_money(tax.map(|t| t.taxable_base).unwrap_or(Decimal::ZERO)),
            abatement_used: round_money(tax.map(|t| t.allowance_used).unwrap_or(Decimal::ZERO)),
            tax_amount: round_money(tax_amount),
            net_share_value: round_money(net),
            received_assets,
            tax_calculation_details: details,
            explanation_keys,
        });
    }

    let assets_breakdown: Vec<AssetBreakdown> = input
        .assets
        .iter()
        .map(|asset| {
            if asset.is_life_insurance() {
                let regime = life_insurance
                    .contracts
                    .iter()
                    .find(|c| c.asset_id == asset.id)
                    .map(|c| c.regime)
                    .unwrap_or("ASSURANCE_VIE_NON_SIMULEE");
                AssetBreakdown {
                    id: asset.id.clone(),
                    label: asset.label.clone().unwrap_or_else(|| asset.id.clone()),
                    estimated_value: asset.estimated_value,
                    deceased_share: Decimal::ZERO,
                    spouse_share: Decimal::ZERO,
                    preciput_share: Decimal::ZERO,
                    in_mass_value: Decimal::ZERO,
                    tax_treatment: regime.to_string(),
                }
            } else {
                let split = liquidation.splits.iter().find(|s| s.asset_id == asset.id);
                let (deceased, spouse, preciput, divisible) = split
                    .map(|s| {
                        (
                            s.deceased_share,
                            s.spouse_share,
                            s.preciput_share,
                            s.divisible_value,
                        )
                    })
                    .unwrap_or((Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO));
                AssetBreakdown {
                    id: asset.id.clone(),
                    label: asset.label.clone().unwrap_or_else(|| asset.id.clone()),
                    estimated_value: asset.estimated_value,
                    deceased_share: round_money(deceased),
                    spouse_share: round_money(spouse),
                    preciput_share: round_money(preciput),
                    in_mass_value: round_money(deceased),
                    tax_treatment: if divisible.is_zero() {
                        "HORS_MASSE".to_string()
                    } else {
                        "SUCCESSION".to_string()
                    },
                }
            }
        })
        .collect();

    let liquidation_details = LiquidationDetails {
        regime: input.deceased.matrimonial_regime,
        community_assets_total: round_money(liquidation.community_assets_total),
        spouse_community_share: round_money(liquidation.spouse_community_share),
        deceased_community_share: round_money(liquidation.deceased_community_share),
        has_preciput: input.matrimonial_advantages.has_preciput,
        preciput_value: round_money(liquidation.preciput_value),
        details: liquidation.details.clone(),
    };

    let explanation_keys = tracer.explanation_keys();
    let (calculation_steps, warnings, _) = tracer.into_parts();

    SuccessionOutput {
        global_metrics: GlobalMetrics {
            total_estate_value: round_money(total_estate_value),
            legal_reserve_value: round_money(allocation.reserve_value),
            disposable_quota_value: round_money(allocation.quota_value),
            total_tax_amount: round_money(total_tax),
            explanation_keys,
        },
        heirs_breakdown,
        liquidation_details,
        spouse_details: allocation.spouse_details.clone(),
        assets_breakdown,
        calculation_steps,
        warnings,
    }
}
