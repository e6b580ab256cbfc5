//! Estate reconstitution: rebuild the civil succession mass from the
//! deceased's liquidated assets, reportable gifts and deductible debts, then
//! serve the legal right of return before anything devolves.

use rust_decimal::Decimal;
use serde_json::json;

use crate::liquidation::LiquidationOutcome;
use crate::params::LegalParameters;
use crate::trace::{keys, Audience, Severity, Tracer, WarningCategory};
use crate::types::{AssetOrigin, DebtType, Money, Relationship, SimulationInput};

/// A gift from a parent going back to that parent (Art. 738-2 CC).
#[derive(Debug, Clone)]
pub(crate) struct RightOfReturn {
    pub parent_id: String,
    pub asset_ids: Vec<String>,
    pub value: Money,
}

#[derive(Debug, Clone)]
pub(crate) struct ReconstitutionOutcome {
    pub net_succession_mass: Money,
    pub reportable_donations_total: Money,
    pub deductible_debts_total: Money,
    pub right_of_return: Vec<RightOfReturn>,
}

pub(crate) fn reconstitute(
    input: &SimulationInput,
    liquidation: &LiquidationOutcome,
    params: &LegalParameters,
    tracer: &mut Tracer,
) -> ReconstitutionOutcome {
    let mut reportable_donations_total = Decimal::ZERO;
    for donation in &input.donations {
        let value = donation.reportable_value();
        if value > Decimal::ZERO {
            reportable_donations_total += value;
            tracer.explain(
                keys::MASS_REPORTABLE_DONATION,
                json!({
                    "article": "Art. 843 CC",
                    "donation_id": donation.id,
                    "beneficiary_id": donation.beneficiary_id,
                    "value": value.to_string(),
                }),
            );
        }
    }

    let mut deductible_debts_total = Decimal::ZERO;
    for debt in &input.debts {
        if !debt.is_deductible {
            continue;
        }
        let mut amount = debt.amount;

        if debt.debt_type == DebtType::FuneralExpenses
            && amount > params.funeral_expenses_cap
            && !debt.proof_provided
        {
            tracer.warn(
                Severity::Warning,
                Audience::User,
                WarningCategory::Fiscal,
                format!(
                    "Frais funéraires de {} sans justificatif: déduction plafonnée à {}",
                    amount, params.funeral_expenses_cap
                ),
                json!({"debt_id": debt.id, "claimed": amount.to_string()}),
                &[keys::MASS_FUNERAL_CAP],
            );
            amount = params.funeral_expenses_cap;
        }

        // A community debt burdens the community: only half weighs on the
        // deceased's estate.
        if debt.asset_origin == AssetOrigin::Community {
            amount /= Decimal::TWO;
        }

        // Art. 769 CGI: a debt contracted for a partially-exempt asset is
        // deductible only in the taxed proportion.
        if let Some(linked_id) = &debt.linked_asset_id {
            if let Some(asset) = input.assets.iter().find(|a| &a.id == linked_id) {
                if asset.professional_exemption {
                    let kept = Decimal::ONE - params.professional_exemption_rate;
                    let before = amount;
                    amount *= kept;
                    tracer.warn(
                        Severity::Info,
                        Audience::Notary,
                        WarningCategory::Fiscal,
                        format!(
                            "Dette {} liée à un bien exonéré à 75%: déduction ramenée \
                             de {} à {}",
                            debt.id, before, amount
                        ),
                        json!({
                            "debt_id": debt.id,
                            "linked_asset_id": linked_id,
                            "deductible": amount.to_string(),
                        }),
                        &[keys::MASS_DEBT_PRORATA_769],
                    );
                }
            }
        }

        deductible_debts_total += amount;
        tracer.explain(
            keys::MASS_DEBT_DEDUCTED,
            json!({
                "article": "Art. 768 CC",
                "debt_id": debt.id,
                "deducted": amount.to_string(),
            }),
        );
    }

    let gross_mass =
        liquidation.deceased_net_assets + reportable_donations_total - deductible_debts_total;
    let mut mass = gross_mass.max(Decimal::ZERO);
    if gross_mass < Decimal::ZERO {
        tracer.warn(
            Severity::Warning,
            Audience::User,
            WarningCategory::Data,
            "Passif supérieur à l'actif: masse successorale ramenée à zéro \
             (succession déficitaire)",
            json!({"gross_mass": gross_mass.to_string()}),
            &[],
        );
    }

    let right_of_return = apply_right_of_return(input, liquidation, mass, tracer);
    for transfer in &right_of_return {
        mass -= transfer.value;
    }

    ReconstitutionOutcome {
        net_succession_mass: mass,
        reportable_donations_total,
        deductible_debts_total,
        right_of_return,
    }
}

/// Art. 738-2 CC: when the deceased leaves no descendant, assets received
/// from a still-living parent return to that parent, within a quarter of the
/// estate per parent, outside the ordinary devolution.
fn apply_right_of_return(
    input: &SimulationInput,
    liquidation: &LiquidationOutcome,
    mass: Money,
    tracer: &mut Tracer,
) -> Vec<RightOfReturn> {
    let has_descendants = input.heirs.iter().any(|h| {
        matches!(
            h.relationship,
            Relationship::Child | Relationship::Grandchild | Relationship::GreatGrandchild
        ) && !h.renounces()
    });
    if has_descendants || mass <= Decimal::ZERO {
        return Vec::new();
    }

    let quarter = mass / Decimal::from(4);
    let mut transfers: Vec<RightOfReturn> = Vec::new();

    for parent in input
        .heirs
        .iter()
        .filter(|h| h.relationship == Relationship::Parent && !h.renounces())
    {
        let mut asset_ids: Vec<String> = Vec::new();
        let mut value = Decimal::ZERO;
        for asset in &input.assets {
            if asset.received_from_parent_id.as_deref() != Some(parent.id.as_str()) {
                continue;
            }
            // The right bears on what actually sits in the estate.
            let in_estate = liquidation
                .splits
                .iter()
                .find(|s| s.asset_id == asset.id)
                .map(|s| s.deceased_share)
                .unwrap_or(Decimal::ZERO);
            if in_estate > Decimal::ZERO {
                asset_ids.push(asset.id.clone());
                value += in_estate;
            }
        }
        if asset_ids.is_empty() {
            continue;
        }

        let capped = value.min(quarter);
        tracer.explain(
            keys::MASS_RIGHT_OF_RETURN,
            json!({
                "article": "Art. 738-2 CC",
                "parent_id": parent.id,
                "assets": asset_ids,
                "value": capped.to_string(),
            }),
        );
        transfers.push(RightOfReturn {
            parent_id: parent.id.clone(),
            asset_ids,
            value: capped,
        });
    }

    transfers
}
