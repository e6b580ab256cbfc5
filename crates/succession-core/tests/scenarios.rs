//! End-to-end scenarios with independently derived reference figures.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use succession_core::{
    simulate, Asset, AssetOrigin, BeneficiaryClause, BeneficiaryOwnership, DeceasedProfile,
    Heir, LegalParameters, MatrimonialAdvantages, MatrimonialRegime, Relationship,
    SimulationInput, SpouseChoice, Wishes,
};

fn death() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn dossier(regime: MatrimonialRegime, heirs: Vec<Heir>, assets: Vec<Asset>) -> SimulationInput {
    SimulationInput {
        deceased: DeceasedProfile {
            death_date: death(),
            marriage_date: Some(NaiveDate::from_ymd_opt(1990, 6, 1).unwrap()),
            matrimonial_regime: regime,
            residence_country: None,
        },
        assets,
        heirs,
        donations: vec![],
        debts: vec![],
        wishes: Wishes::default(),
        matrimonial_advantages: MatrimonialAdvantages::default(),
    }
}

fn child(id: &str) -> Heir {
    Heir {
        id: id.into(),
        relationship: Relationship::Child,
        ..Default::default()
    }
}

fn spouse() -> Heir {
    Heir {
        id: "spouse".into(),
        relationship: Relationship::Spouse,
        birth_date: NaiveDate::from_ymd_opt(1962, 4, 2),
        ..Default::default()
    }
}

fn heir_row<'a>(
    out: &'a succession_core::SuccessionOutput,
    id: &str,
) -> &'a succession_core::HeirBreakdown {
    out.heirs_breakdown.iter().find(|h| h.id == id).unwrap()
}

#[test]
fn standard_family_community_quarter_ownership() {
    let mut input = dossier(
        MatrimonialRegime::CommunityLegal,
        vec![spouse(), child("c1"), child("c2")],
        vec![Asset {
            id: "home".into(),
            estimated_value: dec!(600_000),
            asset_origin: AssetOrigin::Community,
            acquisition_date: NaiveDate::from_ymd_opt(2005, 1, 1),
            ..Default::default()
        }],
    );
    input.wishes.spouse_choice = Some(SpouseChoice::QuarterOwnership);

    let out = simulate(&input, &LegalParameters::france_2025()).unwrap();

    // Liquidation: half the community.
    assert_eq!(out.liquidation_details.community_assets_total, dec!(600_000));
    assert_eq!(out.liquidation_details.deceased_community_share, dec!(300_000));
    assert_eq!(out.global_metrics.total_estate_value, dec!(300_000));

    // Shares: 1/4 to the spouse, 3/8 to each child.
    assert_eq!(heir_row(&out, "spouse").gross_share_value, dec!(75_000));
    assert_eq!(heir_row(&out, "c1").gross_share_value, dec!(112_500));
    assert_eq!(heir_row(&out, "c2").gross_share_value, dec!(112_500));

    // Tax: spouse exempt; each child pays the first three brackets on
    // 12,500 after the 100,000 allowance:
    // 8,072×5% + 4,037×10% + 391×15% = 865.95.
    assert_eq!(heir_row(&out, "spouse").tax_amount, Decimal::ZERO);
    assert_eq!(heir_row(&out, "c1").tax_amount, dec!(865.95));
    assert_eq!(heir_row(&out, "c2").tax_amount, dec!(865.95));
    assert_eq!(out.global_metrics.total_tax_amount, dec!(1_731.90));
}

#[test]
fn single_child_direct_line_500k() {
    let input = dossier(
        MatrimonialRegime::Separation,
        vec![child("c1")],
        vec![Asset {
            id: "estate".into(),
            estimated_value: dec!(500_000),
            ..Default::default()
        }],
    );

    let out = simulate(&input, &LegalParameters::france_2025()).unwrap();
    let c1 = heir_row(&out, "c1");

    // Base 400,000 after the allowance:
    // 403.60 + 403.70 + 573.45 + 384,068×20% = 78,194.35.
    assert_eq!(c1.gross_share_value, dec!(500_000));
    assert_eq!(c1.abatement_used, dec!(100_000));
    assert_eq!(c1.tax_amount, dec!(78_194.35));
    assert_eq!(c1.net_share_value, dec!(421_805.65));
}

#[test]
fn single_sibling_100k() {
    let input = dossier(
        MatrimonialRegime::Separation,
        vec![Heir {
            id: "s1".into(),
            relationship: Relationship::Sibling,
            ..Default::default()
        }],
        vec![Asset {
            id: "estate".into(),
            estimated_value: dec!(100_000),
            ..Default::default()
        }],
    );

    let out = simulate(&input, &LegalParameters::france_2025()).unwrap();
    let s1 = heir_row(&out, "s1");

    // Base 84,068: 24,430×35% + 59,638×45% = 8,550.50 + 26,837.10.
    assert_eq!(s1.taxable_base, dec!(100_000));
    assert_eq!(s1.abatement_used, dec!(15_932));
    assert_eq!(s1.tax_amount, dec!(35_387.60));
}

#[test]
fn life_insurance_before_70_single_child() {
    let input = dossier(
        MatrimonialRegime::Separation,
        vec![child("c1")],
        vec![Asset {
            id: "av1".into(),
            premiums_before_70: Some(dec!(300_000)),
            life_insurance_beneficiaries: vec![BeneficiaryClause {
                heir_id: "c1".into(),
                share: Decimal::ONE,
                ownership: BeneficiaryOwnership::Full,
            }],
            ..Default::default()
        }],
    );

    let out = simulate(&input, &LegalParameters::france_2025()).unwrap();
    let c1 = heir_row(&out, "c1");

    // Taxable 147,500 at 20%.
    assert_eq!(c1.tax_amount, dec!(29_500));
    assert_eq!(c1.net_share_value, dec!(270_500));
    assert_eq!(out.global_metrics.total_tax_amount, dec!(29_500));
    // Never in the mass.
    assert_eq!(out.global_metrics.total_estate_value, Decimal::ZERO);
    let av = out.assets_breakdown.iter().find(|a| a.id == "av1").unwrap();
    assert_eq!(av.in_mass_value, Decimal::ZERO);
    assert_eq!(av.tax_treatment, "ASSURANCE_VIE_990I");
}

#[test]
fn representation_of_a_predeceased_child() {
    let input = dossier(
        MatrimonialRegime::Separation,
        vec![
            child("a"),
            Heir {
                id: "g1".into(),
                relationship: Relationship::Grandchild,
                represented_heir_id: Some("b".into()),
                ..Default::default()
            },
            Heir {
                id: "g2".into(),
                relationship: Relationship::Grandchild,
                represented_heir_id: Some("b".into()),
                ..Default::default()
            },
        ],
        vec![Asset {
            id: "estate".into(),
            estimated_value: dec!(900_000),
            ..Default::default()
        }],
    );

    let out = simulate(&input, &LegalParameters::france_2025()).unwrap();

    assert_eq!(heir_row(&out, "a").gross_share_value, dec!(450_000));
    assert_eq!(heir_row(&out, "g1").gross_share_value, dec!(225_000));
    assert_eq!(heir_row(&out, "g2").gross_share_value, dec!(225_000));
    assert!(heir_row(&out, "g1")
        .explanation_keys
        .contains(&"SHARE_REPRESENTATION".to_string()));
}

#[test]
fn spouse_donation_with_disposable_quota_option() {
    let mut input = dossier(
        MatrimonialRegime::Separation,
        vec![spouse(), child("c1")],
        vec![Asset {
            id: "estate".into(),
            estimated_value: dec!(600_000),
            ..Default::default()
        }],
    );
    input.wishes.has_spouse_donation = true;
    input.wishes.spouse_choice = Some(SpouseChoice::DisposableQuota);

    let out = simulate(&input, &LegalParameters::france_2025()).unwrap();

    // One child: the spouse takes half, tax-free.
    assert_eq!(heir_row(&out, "spouse").gross_share_value, dec!(300_000));
    assert_eq!(heir_row(&out, "spouse").tax_amount, Decimal::ZERO);

    // Child: 300,000 − 100,000 allowance = 200,000 of net taxable:
    // 403.60 + 403.70 + 573.45 + 184,068×20% = 38,194.35.
    let c1 = heir_row(&out, "c1");
    assert_eq!(c1.gross_share_value, dec!(300_000));
    assert_eq!(c1.tax_amount, dec!(38_194.35));
}

#[test]
fn spouse_usufruct_option_values_through_the_scale() {
    let mut input = dossier(
        MatrimonialRegime::Separation,
        vec![spouse(), child("c1")],
        vec![Asset {
            id: "estate".into(),
            estimated_value: dec!(400_000),
            ..Default::default()
        }],
    );
    input.wishes.spouse_choice = Some(SpouseChoice::Usufruct);

    let out = simulate(&input, &LegalParameters::france_2025()).unwrap();

    // Spouse is 62 at death: usufruct 40%, children keep the bare 60%.
    assert!(out.spouse_details.has_usufruct);
    assert_eq!(out.spouse_details.usufruct_rate, dec!(0.40));
    assert_eq!(out.spouse_details.usufruct_value, dec!(160_000));
    assert_eq!(heir_row(&out, "spouse").gross_share_value, dec!(160_000));
    assert_eq!(heir_row(&out, "c1").gross_share_value, dec!(240_000));
}

#[test]
fn every_warning_and_step_is_reported_in_order() {
    let mut input = dossier(
        MatrimonialRegime::CommunityLegal,
        vec![spouse(), child("c1")],
        vec![Asset {
            id: "home".into(),
            estimated_value: dec!(200_000),
            asset_origin: AssetOrigin::Community,
            acquisition_date: NaiveDate::from_ymd_opt(2005, 1, 1),
            ..Default::default()
        }],
    );
    input.deceased.residence_country = Some("BE".into());

    let out = simulate(&input, &LegalParameters::france_2025()).unwrap();

    // Six pipeline steps, numbered from 1.
    assert_eq!(out.calculation_steps.len(), 6);
    for (i, step) in out.calculation_steps.iter().enumerate() {
        assert_eq!(step.step_number as usize, i + 1);
    }
    assert_eq!(out.calculation_steps[0].step_name, "liquidation_matrimoniale");
    assert_eq!(out.calculation_steps[5].step_name, "droits_succession");

    // The foreign residence is flagged, not fatal.
    assert!(out
        .warnings
        .iter()
        .any(|w| w.explanation_keys.contains(&"ALERT_INTERNATIONAL".to_string())));

    // Every figure is backed by at least one explanation key.
    assert!(!out.global_metrics.explanation_keys.is_empty());
    for heir in &out.heirs_breakdown {
        assert!(
            !heir.explanation_keys.is_empty(),
            "heir {} has no explanation key",
            heir.id
        );
    }
}

#[test]
fn empty_heirs_is_a_validation_error() {
    let input = dossier(MatrimonialRegime::Separation, vec![], vec![]);
    let err = simulate(&input, &LegalParameters::france_2025()).unwrap_err();
    assert!(matches!(
        err,
        succession_core::SuccessionError::InvalidInput { .. }
    ));
}

#[test]
fn negative_asset_value_is_a_validation_error() {
    let input = dossier(
        MatrimonialRegime::Separation,
        vec![child("c1")],
        vec![Asset {
            id: "bad".into(),
            estimated_value: dec!(-5),
            ..Default::default()
        }],
    );
    let err = simulate(&input, &LegalParameters::france_2025()).unwrap_err();
    assert!(matches!(
        err,
        succession_core::SuccessionError::InvalidInput { .. }
    ));
}
