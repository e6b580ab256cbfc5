//! Matrimonial liquidation: split every asset between the deceased's estate
//! and the surviving spouse before any devolution happens.
//!
//! Classification is driven by (regime, asset origin, acquisition date vs
//! marriage date). Marriage-contract clauses (preciput, unequal share, full
//! attribution) and Art. 1468 rewards adjust the community split. Life
//! insurance never enters: those contracts are handled by their own stage.

use rust_decimal::Decimal;
use serde_json::json;

use crate::params::LegalParameters;
use crate::trace::{keys, Audience, Severity, Tracer, WarningCategory};
use crate::types::{
    Asset, AssetOrigin, MatrimonialRegime, Money, OwnershipMode, Relationship,
    SimulationInput, UsufructType,
};
use crate::usufruct;

/// Per-asset attribution after liquidation.
///
/// `divisible_value` is what the split must account for: the estimated value
/// for ordinary assets, zero for a usufruct the deceased held (it
/// extinguishes at death, Art. 617 CC).
#[derive(Debug, Clone)]
pub(crate) struct AssetSplit {
    pub asset_id: String,
    pub estimated_value: Money,
    pub divisible_value: Money,
    pub deceased_share: Money,
    pub spouse_share: Money,
    pub preciput_share: Money,
    pub from_community: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct LiquidationOutcome {
    pub splits: Vec<AssetSplit>,
    /// Deceased's estate entering reconstitution (propres + community share).
    pub deceased_net_assets: Money,
    pub community_assets_total: Money,
    pub deceased_community_share: Money,
    pub spouse_community_share: Money,
    pub preciput_value: Money,
    pub details: Vec<String>,
}

pub(crate) fn liquidate(
    input: &SimulationInput,
    params: &LegalParameters,
    tracer: &mut Tracer,
) -> LiquidationOutcome {
    let regime = input.deceased.matrimonial_regime;
    let advantages = &input.matrimonial_advantages;
    let mut details: Vec<String> = Vec::new();
    let mut splits: Vec<AssetSplit> = Vec::new();

    for asset in input.assets.iter().filter(|a| !a.is_life_insurance()) {
        if asset.ownership_mode == OwnershipMode::Usufruct {
            // The deceased only held the usufruct: nothing devolves.
            tracer.explain(
                keys::USUFRUCT_EXTINGUISHED,
                json!({
                    "article": "Art. 617 CC",
                    "asset_id": asset.id,
                    "value": asset.estimated_value.to_string(),
                }),
            );
            details.push(format!(
                "{}: usufruit éteint au décès, aucune valeur transmise",
                asset.id
            ));
            splits.push(AssetSplit {
                asset_id: asset.id.clone(),
                estimated_value: asset.estimated_value,
                divisible_value: Decimal::ZERO,
                deceased_share: Decimal::ZERO,
                spouse_share: Decimal::ZERO,
                preciput_share: Decimal::ZERO,
                from_community: false,
            });
            continue;
        }

        let is_community = classify_community(input, asset, tracer, regime);
        let value = transmissible_value(input, asset, params, tracer);

        if !is_community {
            tracer.explain(
                keys::LIQUIDATION_PROPRE,
                json!({
                    "article": "Art. 1405 CC",
                    "asset_id": asset.id,
                    "value": value.to_string(),
                }),
            );
            splits.push(AssetSplit {
                asset_id: asset.id.clone(),
                estimated_value: asset.estimated_value,
                divisible_value: value,
                deceased_share: value,
                spouse_share: Decimal::ZERO,
                preciput_share: Decimal::ZERO,
                from_community: false,
            });
            continue;
        }

        // Preciput: the spouse takes the designated asset off-top.
        if advantages.has_preciput && advantages.preciput_asset_ids.contains(&asset.id) {
            tracer.explain(
                keys::LIQUIDATION_PRECIPUT,
                json!({
                    "article": "Art. 1515 CC",
                    "asset_id": asset.id,
                    "value": value.to_string(),
                }),
            );
            details.push(format!("{}: préciput au conjoint ({})", asset.id, value));
            splits.push(AssetSplit {
                asset_id: asset.id.clone(),
                estimated_value: asset.estimated_value,
                divisible_value: value,
                deceased_share: Decimal::ZERO,
                spouse_share: Decimal::ZERO,
                preciput_share: value,
                from_community: true,
            });
            continue;
        }

        let (spouse_fraction, key, article) = if advantages.has_full_attribution {
            (Decimal::ONE, keys::LIQUIDATION_FULL_ATTRIBUTION, "Art. 1524 CC")
        } else if advantages.has_unequal_share {
            (
                advantages.spouse_share_percentage / Decimal::ONE_HUNDRED,
                keys::LIQUIDATION_UNEQUAL_SHARE,
                "Art. 1520 CC",
            )
        } else {
            let key = match regime {
                MatrimonialRegime::CommunityUniversal => keys::LIQUIDATION_UNIVERSAL,
                _ => keys::LIQUIDATION_COMMUNITY_50,
            };
            (Decimal::new(5, 1), key, "Art. 1475 CC")
        };

        // Art. 1468 reward when the asset was partly financed outside the
        // community. The propre-funding spouse cannot be identified from the
        // dossier, so the reward is split half/half and flagged.
        let funding = asset.community_funding_percentage;
        let reward = if funding > Decimal::ZERO && funding < Decimal::ONE_HUNDRED {
            value * (Decimal::ONE_HUNDRED - funding) / Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        if reward > Decimal::ZERO {
            tracer.explain(
                keys::LIQUIDATION_REWARD,
                json!({
                    "article": "Art. 1468 CC",
                    "asset_id": asset.id,
                    "reward": reward.to_string(),
                }),
            );
            tracer.warn(
                Severity::Warning,
                Audience::Notary,
                WarningCategory::Legal,
                format!(
                    "Récompense de {} sur {} répartie par moitié: l'époux ayant financé \
                     sur fonds propres n'est pas identifiable",
                    reward, asset.id
                ),
                json!({"asset_id": asset.id, "reward": reward.to_string()}),
                &[keys::ALERT_REWARD_PAYER_UNKNOWN],
            );
        }

        let community_part = value - reward;
        let half_reward = reward / Decimal::TWO;
        let spouse_share = community_part * spouse_fraction + half_reward;
        let deceased_share = value - spouse_share;

        tracer.explain(
            key,
            json!({
                "article": article,
                "asset_id": asset.id,
                "deceased_share": deceased_share.to_string(),
                "spouse_share": spouse_share.to_string(),
            }),
        );
        splits.push(AssetSplit {
            asset_id: asset.id.clone(),
            estimated_value: asset.estimated_value,
            divisible_value: value,
            deceased_share,
            spouse_share,
            preciput_share: Decimal::ZERO,
            from_community: true,
        });
    }

    if advantages.has_full_attribution {
        apply_retrenchment_cap(input, &mut splits, tracer, &mut details);
    }

    let community_assets_total: Money = splits
        .iter()
        .filter(|s| s.from_community)
        .map(|s| s.divisible_value)
        .sum();
    let deceased_community_share: Money = splits
        .iter()
        .filter(|s| s.from_community)
        .map(|s| s.deceased_share)
        .sum();
    let spouse_community_share: Money = splits
        .iter()
        .filter(|s| s.from_community)
        .map(|s| s.spouse_share)
        .sum();
    let preciput_value: Money = splits.iter().map(|s| s.preciput_share).sum();
    let deceased_net_assets: Money = splits.iter().map(|s| s.deceased_share).sum();

    if community_assets_total > Decimal::ZERO {
        details.push(format!(
            "Communauté {}: part du défunt {}, part du conjoint {}",
            community_assets_total, deceased_community_share, spouse_community_share
        ));
    }

    LiquidationOutcome {
        splits,
        deceased_net_assets,
        community_assets_total,
        deceased_community_share,
        spouse_community_share,
        preciput_value,
        details,
    }
}

/// Value the deceased's right actually transmits.
///
/// Full ownership and undivided shares pass at their stated value. Bare
/// ownership passes at the Art. 669 complement of the running usufruct,
/// valued on the usufructuary's age (viager) or the remaining duration
/// (temporaire).
fn transmissible_value(
    input: &SimulationInput,
    asset: &Asset,
    params: &LegalParameters,
    tracer: &mut Tracer,
) -> Money {
    if asset.ownership_mode != OwnershipMode::Bare {
        return asset.estimated_value;
    }

    if asset.usufruct_type == Some(UsufructType::Temporaire) {
        if let Some(years) = asset.usufruct_duration_years {
            let rate = usufruct::temporary_rate(params, years);
            let bare = asset.estimated_value * (Decimal::ONE - rate);
            tracer.explain(
                keys::USUFRUCT_TEMPORAIRE,
                json!({
                    "article": "Art. 669 II CGI",
                    "asset_id": asset.id,
                    "duration_years": years,
                    "usufruct_rate": rate.to_string(),
                    "bare_value": bare.to_string(),
                }),
            );
            return bare;
        }
    }

    if let Some(birth) = asset.usufructuary_birth_date {
        let age = usufruct::age_at(birth, input.deceased.death_date);
        let (usufruct_part, bare) = usufruct::split_by_age(params, asset.estimated_value, age);
        tracer.explain(
            keys::USUFRUCT_VIAGER_SCALE,
            json!({
                "article": "Art. 669 I CGI",
                "asset_id": asset.id,
                "usufructuary_age": age,
                "usufruct_value": usufruct_part.to_string(),
                "bare_value": bare.to_string(),
            }),
        );
        return bare;
    }

    tracer.warn(
        Severity::Warning,
        Audience::User,
        WarningCategory::Data,
        format!(
            "Nue-propriété {} sans âge d'usufruitier ni durée: valeur retenue \
             en pleine propriété",
            asset.id
        ),
        json!({"asset_id": asset.id}),
        &[],
    );
    asset.estimated_value
}

/// True when the asset falls into the community pool.
fn classify_community(
    input: &SimulationInput,
    asset: &crate::types::Asset,
    tracer: &mut Tracer,
    regime: MatrimonialRegime,
) -> bool {
    match (regime, asset.asset_origin) {
        (MatrimonialRegime::Separation, AssetOrigin::Community) => {
            tracer.warn(
                Severity::Warning,
                Audience::User,
                WarningCategory::Data,
                format!(
                    "Bien {} déclaré commun sous un régime de séparation de biens; \
                     traité comme un bien personnel",
                    asset.id
                ),
                json!({"asset_id": asset.id}),
                &[keys::ALERT_SEPARATION_COMMUNITY_ASSET],
            );
            false
        }
        (MatrimonialRegime::Separation, _) => false,
        (MatrimonialRegime::CommunityUniversal, _) => true,
        (MatrimonialRegime::CommunityLegal, AssetOrigin::Personal)
        | (MatrimonialRegime::CommunityLegal, AssetOrigin::Inheritance) => false,
        (MatrimonialRegime::CommunityLegal, AssetOrigin::Community) => {
            // Acquired before the marriage: propre despite the declared origin.
            match (asset.acquisition_date, input.deceased.marriage_date) {
                (Some(acq), Some(marriage)) if acq < marriage => false,
                _ => true,
            }
        }
    }
}

/// Art. 1527 al. 2: with children of a previous union, the community
/// advantage beyond the 50% baseline is capped at the ordinary disposable
/// quota of the theoretical estate; the excess is restored to the deceased's
/// side and the retrenchment action is flagged for the notary.
fn apply_retrenchment_cap(
    input: &SimulationInput,
    splits: &mut [AssetSplit],
    tracer: &mut Tracer,
    details: &mut Vec<String>,
) {
    let has_stepchildren = input.heirs.iter().any(|h| {
        h.relationship == Relationship::Child && !h.is_from_current_union && !h.renounces()
    });
    if !has_stepchildren {
        return;
    }

    let children = input
        .heirs
        .iter()
        .filter(|h| h.relationship == Relationship::Child && !h.renounces())
        .count();
    let quota = match children {
        1 => Decimal::ONE / Decimal::TWO,
        2 => Decimal::ONE / Decimal::from(3),
        _ => Decimal::ONE / Decimal::from(4),
    };

    let community_total: Money = splits
        .iter()
        .filter(|s| s.from_community)
        .map(|s| s.divisible_value)
        .sum();
    let propres_total: Money = splits
        .iter()
        .filter(|s| !s.from_community)
        .map(|s| s.deceased_share)
        .sum();
    let half_community = community_total / Decimal::TWO;
    let spouse_total: Money = splits
        .iter()
        .filter(|s| s.from_community)
        .map(|s| s.spouse_share + s.preciput_share)
        .sum();

    let advantage = spouse_total - half_community;
    let theoretical_estate = propres_total + half_community;
    let cap = theoretical_estate * quota;
    if advantage <= cap {
        // Advantage fits inside the special quota; still worth a flag.
        tracer.warn(
            Severity::Info,
            Audience::Notary,
            WarningCategory::Legal,
            "Attribution intégrale en présence d'enfants d'une précédente union: \
             action en retranchement possible (R-1527)",
            json!({"advantage": advantage.to_string(), "cap": cap.to_string()}),
            &[keys::ALERT_RETRANCHEMENT],
        );
        return;
    }

    let mut excess = advantage - cap;
    for split in splits.iter_mut().filter(|s| s.from_community) {
        if excess <= Decimal::ZERO {
            break;
        }
        let movable = split.spouse_share.min(excess);
        split.spouse_share -= movable;
        split.deceased_share += movable;
        excess -= movable;
    }

    let clawed_back = advantage - cap;
    details.push(format!(
        "Retranchement: avantage matrimonial réduit de {} (quotité spéciale)",
        clawed_back
    ));
    tracer.warn(
        Severity::Warning,
        Audience::Notary,
        WarningCategory::Legal,
        "R-1527 action en retranchement: avantage matrimonial plafonné à la \
         quotité disponible spéciale en présence d'enfants d'une précédente union",
        json!({
            "advantage": advantage.to_string(),
            "cap": cap.to_string(),
            "reduced_by": clawed_back.to_string(),
        }),
        &[keys::ALERT_RETRANCHEMENT],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Asset, DeceasedProfile, Heir, MatrimonialAdvantages, Wishes,
    };
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn base_input(regime: MatrimonialRegime) -> SimulationInput {
        SimulationInput {
            deceased: DeceasedProfile {
                death_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                marriage_date: Some(NaiveDate::from_ymd_opt(2000, 5, 20).unwrap()),
                matrimonial_regime: regime,
                residence_country: None,
            },
            assets: vec![],
            heirs: vec![Heir {
                id: "spouse".into(),
                relationship: Relationship::Spouse,
                ..Default::default()
            }],
            donations: vec![],
            debts: vec![],
            wishes: Wishes::default(),
            matrimonial_advantages: MatrimonialAdvantages::default(),
        }
    }

    fn community_asset(id: &str, value: Decimal) -> Asset {
        Asset {
            id: id.into(),
            estimated_value: value,
            asset_origin: AssetOrigin::Community,
            acquisition_date: Some(NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_community_asset_splits_half_half() {
        let mut input = base_input(MatrimonialRegime::CommunityLegal);
        input.assets.push(community_asset("home", dec!(600_000)));

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);

        assert_eq!(out.deceased_net_assets, dec!(300_000));
        assert_eq!(out.spouse_community_share, dec!(300_000));
        assert_eq!(out.community_assets_total, dec!(600_000));
    }

    #[test]
    fn test_separation_keeps_everything_on_deceased_side() {
        let mut input = base_input(MatrimonialRegime::Separation);
        input.assets.push(Asset {
            id: "flat".into(),
            estimated_value: dec!(250_000),
            ..Default::default()
        });

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);

        assert_eq!(out.deceased_net_assets, dec!(250_000));
        assert_eq!(out.community_assets_total, Decimal::ZERO);
    }

    #[test]
    fn test_community_asset_under_separation_warns_and_reclassifies() {
        let mut input = base_input(MatrimonialRegime::Separation);
        input.assets.push(community_asset("oops", dec!(100_000)));

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);
        let (_, warnings, _) = tracer.into_parts();

        assert_eq!(out.deceased_net_assets, dec!(100_000));
        assert!(warnings
            .iter()
            .any(|w| w.explanation_keys.contains(&"ALERT_SEPARATION_COMMUNITY_ASSET".to_string())));
    }

    #[test]
    fn test_asset_acquired_before_marriage_stays_propre() {
        let mut input = base_input(MatrimonialRegime::CommunityLegal);
        let mut asset = community_asset("old", dec!(80_000));
        asset.acquisition_date = Some(NaiveDate::from_ymd_opt(1995, 1, 1).unwrap());
        input.assets.push(asset);

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);

        assert_eq!(out.deceased_net_assets, dec!(80_000));
        assert_eq!(out.community_assets_total, Decimal::ZERO);
    }

    #[test]
    fn test_universal_community_pools_personal_assets() {
        let mut input = base_input(MatrimonialRegime::CommunityUniversal);
        input.assets.push(Asset {
            id: "inherited".into(),
            estimated_value: dec!(200_000),
            asset_origin: AssetOrigin::Inheritance,
            ..Default::default()
        });

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);

        assert_eq!(out.deceased_net_assets, dec!(100_000));
        assert_eq!(out.spouse_community_share, dec!(100_000));
    }

    #[test]
    fn test_preciput_taken_off_top() {
        let mut input = base_input(MatrimonialRegime::CommunityLegal);
        input.assets.push(community_asset("home", dec!(400_000)));
        input.assets.push(community_asset("boat", dec!(60_000)));
        input.matrimonial_advantages.has_preciput = true;
        input.matrimonial_advantages.preciput_asset_ids = vec!["boat".into()];

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);

        assert_eq!(out.preciput_value, dec!(60_000));
        assert_eq!(out.deceased_net_assets, dec!(200_000));
        assert_eq!(out.spouse_community_share, dec!(200_000));
    }

    #[test]
    fn test_unequal_share_clause() {
        let mut input = base_input(MatrimonialRegime::CommunityLegal);
        input.assets.push(community_asset("home", dec!(100_000)));
        input.matrimonial_advantages.has_unequal_share = true;
        input.matrimonial_advantages.spouse_share_percentage = dec!(60);

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);

        assert_eq!(out.spouse_community_share, dec!(60_000));
        assert_eq!(out.deceased_net_assets, dec!(40_000));
    }

    #[test]
    fn test_reward_split_half_half_with_warning() {
        let mut input = base_input(MatrimonialRegime::CommunityLegal);
        let mut asset = community_asset("home", dec!(200_000));
        asset.community_funding_percentage = dec!(70);
        input.assets.push(asset);

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);
        let (_, warnings, _) = tracer.into_parts();

        // Reward 60,000: community part 140,000 split 50/50, plus 30,000
        // of reward on each side.
        assert_eq!(out.deceased_net_assets, dec!(100_000));
        assert_eq!(out.spouse_community_share, dec!(100_000));
        assert!(warnings
            .iter()
            .any(|w| w.explanation_keys.contains(&"ALERT_REWARD_PAYER_UNKNOWN".to_string())));
    }

    #[test]
    fn test_full_attribution_without_stepchildren() {
        let mut input = base_input(MatrimonialRegime::CommunityUniversal);
        input.assets.push(community_asset("all", dec!(500_000)));
        input.matrimonial_advantages.has_full_attribution = true;

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);

        assert_eq!(out.deceased_net_assets, Decimal::ZERO);
        assert_eq!(out.spouse_community_share, dec!(500_000));
    }

    #[test]
    fn test_full_attribution_with_stepchildren_is_capped() {
        let mut input = base_input(MatrimonialRegime::CommunityUniversal);
        input.assets.push(community_asset("all", dec!(600_000)));
        input.matrimonial_advantages.has_full_attribution = true;
        input.heirs.push(Heir {
            id: "step".into(),
            relationship: Relationship::Child,
            is_from_current_union: false,
            ..Default::default()
        });

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);
        let (_, warnings, _) = tracer.into_parts();

        // Advantage 300,000 against a cap of 1/2 × 300,000 = 150,000: the
        // excess returns to the deceased's side.
        assert_eq!(out.spouse_community_share, dec!(450_000));
        assert_eq!(out.deceased_net_assets, dec!(150_000));
        assert!(warnings
            .iter()
            .any(|w| w.explanation_keys.contains(&"ALERT_RETRANCHEMENT".to_string())));
    }

    #[test]
    fn test_deceased_usufruct_extinguishes() {
        let mut input = base_input(MatrimonialRegime::Separation);
        input.assets.push(Asset {
            id: "usu".into(),
            estimated_value: dec!(90_000),
            ownership_mode: OwnershipMode::Usufruct,
            ..Default::default()
        });

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);
        let (_, _, explanations) = tracer.into_parts();

        assert_eq!(out.deceased_net_assets, Decimal::ZERO);
        assert!(explanations.iter().any(|e| e.key == "USUFRUCT_EXTINGUISHED"));
    }

    #[test]
    fn test_bare_ownership_valued_through_the_scale() {
        let mut input = base_input(MatrimonialRegime::Separation);
        input.assets.push(Asset {
            id: "bare".into(),
            estimated_value: dec!(200_000),
            ownership_mode: OwnershipMode::Bare,
            // Usufructuary is 67 at death: usufruct 40%, bare 60%.
            usufructuary_birth_date: NaiveDate::from_ymd_opt(1957, 8, 1),
            ..Default::default()
        });

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);

        assert_eq!(out.deceased_net_assets, dec!(120_000));
        assert_eq!(out.splits[0].divisible_value, dec!(120_000));
        assert_eq!(out.splits[0].estimated_value, dec!(200_000));
    }

    #[test]
    fn test_bare_ownership_with_temporary_usufruct() {
        let mut input = base_input(MatrimonialRegime::Separation);
        input.assets.push(Asset {
            id: "bare".into(),
            estimated_value: dec!(100_000),
            ownership_mode: OwnershipMode::Bare,
            usufruct_type: Some(UsufructType::Temporaire),
            usufruct_duration_years: Some(12),
            ..Default::default()
        });

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);

        // Two started decades: usufruct 46%, bare 54%.
        assert_eq!(out.deceased_net_assets, dec!(54_000));
    }

    #[test]
    fn test_life_insurance_never_enters_liquidation() {
        let mut input = base_input(MatrimonialRegime::CommunityLegal);
        input.assets.push(Asset {
            id: "av".into(),
            estimated_value: dec!(300_000),
            premiums_before_70: Some(dec!(300_000)),
            ..Default::default()
        });

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);

        assert!(out.splits.is_empty());
        assert_eq!(out.deceased_net_assets, Decimal::ZERO);
    }

    #[test]
    fn test_split_accounts_for_full_value() {
        let mut input = base_input(MatrimonialRegime::CommunityLegal);
        let mut asset = community_asset("home", dec!(123_457.89));
        asset.community_funding_percentage = dec!(85);
        input.assets.push(asset);

        let mut tracer = Tracer::new();
        let out = liquidate(&input, &LegalParameters::france_2025(), &mut tracer);

        for split in &out.splits {
            let total = split.deceased_share + split.spouse_share + split.preciput_share;
            assert!((total - split.divisible_value).abs() < dec!(0.01));
        }
    }
}
