//! Life-insurance taxation, outside the succession mass.
//!
//! Premiums paid before the insured's 70th birthday fall under Art. 990 I
//! CGI (per-beneficiary allowance then a two-step levy); premiums paid after
//! 70 fall under Art. 757 B (one shared allowance, the remainder re-entering
//! the inheritance-tax base). Grandfathered contracts are exempt and
//! Vie-Génération contracts earn a rebate before any allowance.

use rust_decimal::Decimal;
use serde_json::json;

use crate::params::LegalParameters;
use crate::trace::{keys, Audience, Severity, Tracer, WarningCategory};
use crate::types::{
    Asset, BeneficiaryOwnership, LifeInsuranceContractType, Money, Relationship,
    SimulationInput, SubscriberType,
};
use crate::usufruct;

#[derive(Debug, Clone)]
pub(crate) struct BeneficiaryAssessment {
    pub heir_id: String,
    /// Capital actually flowing to this beneficiary.
    pub gross_benefit: Money,
    pub tax_990i: Money,
    /// Taxable remainder re-entering the heir's civil base (Art. 757 B).
    pub addback_757b: Money,
    pub exempt: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct ContractAssessment {
    pub asset_id: String,
    pub regime: &'static str,
    pub beneficiaries: Vec<BeneficiaryAssessment>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LifeInsuranceOutcome {
    pub contracts: Vec<ContractAssessment>,
    pub total_tax: Money,
}

impl LifeInsuranceOutcome {
    pub fn addback_for(&self, heir_id: &str) -> Money {
        self.contracts
            .iter()
            .flat_map(|c| &c.beneficiaries)
            .filter(|b| b.heir_id == heir_id)
            .map(|b| b.addback_757b)
            .sum()
    }

    pub fn benefits_for(&self, heir_id: &str) -> Money {
        self.contracts
            .iter()
            .flat_map(|c| &c.beneficiaries)
            .filter(|b| b.heir_id == heir_id)
            .map(|b| b.gross_benefit)
            .sum()
    }

    pub fn tax_for(&self, heir_id: &str) -> Money {
        self.contracts
            .iter()
            .flat_map(|c| &c.beneficiaries)
            .filter(|b| b.heir_id == heir_id)
            .map(|b| b.tax_990i)
            .sum()
    }
}

pub(crate) fn assess(
    input: &SimulationInput,
    params: &LegalParameters,
    tracer: &mut Tracer,
) -> LifeInsuranceOutcome {
    let li = &params.life_insurance;
    let mut contracts: Vec<ContractAssessment> = Vec::new();

    // The Art. 757 B allowance is one envelope for the whole succession:
    // collect every taxable post-70 portion first, then share it.
    let mut post70_portions: Vec<(usize, usize, Money)> = Vec::new(); // (contract idx, beneficiary idx, portion)
    let mut post70_taxable_total = Decimal::ZERO;

    for asset in input.assets.iter().filter(|a| a.is_life_insurance()) {
        if asset.subscriber_type == Some(SubscriberType::Joint) {
            tracer.warn(
                Severity::Info,
                Audience::Notary,
                WarningCategory::Legal,
                format!(
                    "Contrat {} en co-souscription: le dénouement sous un régime \
                     communautaire mérite un examen notarial",
                    asset.id
                ),
                json!({"asset_id": asset.id}),
                &[keys::ALERT_JOINT_SUBSCRIPTION],
            );
        }
        if asset.life_insurance_beneficiaries.is_empty() {
            tracer.warn(
                Severity::Warning,
                Audience::User,
                WarningCategory::Data,
                format!(
                    "Contrat {} sans clause bénéficiaire: taxation non simulée",
                    asset.id
                ),
                json!({"asset_id": asset.id}),
                &[],
            );
            continue;
        }

        let capital = if asset.estimated_value > Decimal::ZERO {
            asset.estimated_value
        } else {
            asset.total_premiums()
        };

        if asset.life_insurance_contract_type == LifeInsuranceContractType::AncienContrat {
            tracer.explain(
                keys::LIFE_INSURANCE_ANCIEN_EXEMPT,
                json!({"article": "contrats antérieurs au 20/11/1991", "asset_id": asset.id}),
            );
            let beneficiaries = asset
                .life_insurance_beneficiaries
                .iter()
                .map(|clause| BeneficiaryAssessment {
                    heir_id: clause.heir_id.clone(),
                    gross_benefit: capital * effective_share(input, params, asset, clause, tracer),
                    tax_990i: Decimal::ZERO,
                    addback_757b: Decimal::ZERO,
                    exempt: true,
                })
                .collect();
            contracts.push(ContractAssessment {
                asset_id: asset.id.clone(),
                regime: "ASSURANCE_VIE_EXONEREE",
                beneficiaries,
            });
            continue;
        }

        let mut premiums_before = asset.premiums_before_70.unwrap_or(Decimal::ZERO);
        let premiums_after = asset.premiums_after_70.unwrap_or(Decimal::ZERO);

        if asset.life_insurance_contract_type == LifeInsuranceContractType::VieGeneration {
            let rebate = premiums_before * li.vie_generation_rebate;
            premiums_before -= rebate;
            tracer.explain(
                keys::LIFE_INSURANCE_VIE_GENERATION,
                json!({
                    "article": "Art. 990 I, I bis CGI",
                    "asset_id": asset.id,
                    "rebate": rebate.to_string(),
                }),
            );
        }

        let regime = match (premiums_before > Decimal::ZERO, premiums_after > Decimal::ZERO) {
            (true, true) => "ASSURANCE_VIE_990I_757B",
            (false, true) => "ASSURANCE_VIE_757B",
            _ => "ASSURANCE_VIE_990I",
        };

        let contract_idx = contracts.len();
        let mut beneficiaries: Vec<BeneficiaryAssessment> = Vec::new();

        for clause in &asset.life_insurance_beneficiaries {
            let share = effective_share(input, params, asset, clause, tracer);
            let gross_benefit = capital * share;
            let exempt = is_exempt_beneficiary(input, &clause.heir_id, tracer);

            let tax_990i = if exempt || premiums_before.is_zero() {
                if exempt && premiums_before > Decimal::ZERO {
                    tracer.explain(
                        keys::LIFE_INSURANCE_SPOUSE_EXEMPT,
                        json!({
                            "article": "Art. 796-0 bis CGI",
                            "asset_id": asset.id,
                            "heir_id": clause.heir_id,
                        }),
                    );
                }
                Decimal::ZERO
            } else {
                let taxable =
                    (premiums_before * share - li.per_beneficiary_allowance).max(Decimal::ZERO);
                let low = taxable.min(li.reduced_rate_threshold) * li.base_rate;
                let high =
                    (taxable - li.reduced_rate_threshold).max(Decimal::ZERO) * li.top_rate;
                let tax = low + high;
                tracer.explain(
                    keys::LIFE_INSURANCE_990I,
                    json!({
                        "article": "Art. 990 I CGI",
                        "asset_id": asset.id,
                        "heir_id": clause.heir_id,
                        "taxable": taxable.to_string(),
                        "tax": tax.to_string(),
                    }),
                );
                tax
            };

            if premiums_after > Decimal::ZERO && !exempt {
                let portion = premiums_after * share;
                post70_portions.push((contract_idx, beneficiaries.len(), portion));
                post70_taxable_total += portion;
            }

            beneficiaries.push(BeneficiaryAssessment {
                heir_id: clause.heir_id.clone(),
                gross_benefit,
                tax_990i,
                addback_757b: Decimal::ZERO,
                exempt,
            });
        }

        contracts.push(ContractAssessment {
            asset_id: asset.id.clone(),
            regime,
            beneficiaries,
        });
    }

    // Share the single Art. 757 B allowance pro-rata, then route the
    // remainders into the civil bases.
    if post70_taxable_total > Decimal::ZERO {
        let allowance = li.post70_shared_allowance;
        for (contract_idx, beneficiary_idx, portion) in post70_portions {
            let allowance_slice = allowance * portion / post70_taxable_total;
            let addback = (portion - allowance_slice).max(Decimal::ZERO);
            let b = &mut contracts[contract_idx].beneficiaries[beneficiary_idx];
            b.addback_757b = addback;
            tracer.explain(
                keys::LIFE_INSURANCE_757B,
                json!({
                    "article": "Art. 757 B CGI",
                    "asset_id": contracts[contract_idx].asset_id,
                    "heir_id": contracts[contract_idx].beneficiaries[beneficiary_idx].heir_id,
                    "portion": portion.to_string(),
                    "allowance_slice": allowance_slice.to_string(),
                    "addback": addback.to_string(),
                }),
            );
        }
    }

    let total_tax = contracts
        .iter()
        .flat_map(|c| &c.beneficiaries)
        .map(|b| b.tax_990i)
        .sum();

    LifeInsuranceOutcome {
        contracts,
        total_tax,
    }
}

/// Effective capital fraction of a clause, dismemberment resolved through
/// the Art. 669 scale.
fn effective_share(
    input: &SimulationInput,
    params: &LegalParameters,
    asset: &Asset,
    clause: &crate::types::BeneficiaryClause,
    tracer: &mut Tracer,
) -> Decimal {
    match clause.ownership {
        BeneficiaryOwnership::Full => clause.share,
        BeneficiaryOwnership::Usufruct | BeneficiaryOwnership::Bare => {
            let usufructuary_birth = asset
                .life_insurance_beneficiaries
                .iter()
                .find(|b| b.ownership == BeneficiaryOwnership::Usufruct)
                .and_then(|b| input.heir(&b.heir_id))
                .and_then(|h| h.birth_date)
                .or(asset.usufructuary_birth_date);

            let Some(birth) = usufructuary_birth else {
                tracer.warn(
                    Severity::Warning,
                    Audience::User,
                    WarningCategory::Data,
                    format!(
                        "Clause démembrée du contrat {} sans âge d'usufruitier: \
                         répartition en pleine propriété conservée",
                        asset.id
                    ),
                    json!({"asset_id": asset.id}),
                    &[],
                );
                return clause.share;
            };

            let age = usufruct::age_at(birth, input.deceased.death_date);
            let rate = usufruct::viager_rate(params, age);
            tracer.explain(
                keys::LIFE_INSURANCE_DISMEMBERED,
                json!({
                    "article": "Art. 669 CGI",
                    "asset_id": asset.id,
                    "heir_id": clause.heir_id,
                    "usufruct_rate": rate.to_string(),
                }),
            );
            match clause.ownership {
                BeneficiaryOwnership::Usufruct => clause.share * rate,
                _ => clause.share * (Decimal::ONE - rate),
            }
        }
    }
}

/// Spouse and PACS partner are exempt from both life-insurance levies.
fn is_exempt_beneficiary(input: &SimulationInput, heir_id: &str, tracer: &mut Tracer) -> bool {
    match input.heir(heir_id) {
        Some(h) => matches!(
            h.relationship,
            Relationship::Spouse | Relationship::Partner
        ),
        None => {
            tracer.warn(
                Severity::Warning,
                Audience::User,
                WarningCategory::Data,
                format!(
                    "Bénéficiaire {} inconnu du dossier: taxé comme tiers",
                    heir_id
                ),
                json!({"heir_id": heir_id}),
                &[],
            );
            false
        }
    }
}
