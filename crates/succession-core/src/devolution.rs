//! Devolution: who is called to the succession, in which order, and what
//! fraction of the mass the law reserves for them.
//!
//! Descendants and siblings are grouped by souche: a predeceased or
//! renouncing head is replaced by their own descendants, recursively, each
//! branch keeping the head's fractional share. A souche with no accepting
//! member disappears entirely (it neither inherits nor counts for the
//! reserve).

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde_json::json;

use crate::error::SuccessionError;
use crate::trace::{keys, Audience, Severity, Tracer, WarningCategory};
use crate::types::{Heir, Rate, Relationship, SimulationInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SuccessionOrder {
    /// Order 1: descendants (a spouse may coexist; the share allocator
    /// resolves the statutory option).
    Descendants,
    /// Order 2: spouse together with one or both parents.
    SpouseAndParents,
    /// Order 2': spouse alone.
    SpouseAlone,
    /// No spouse: parents alone.
    ParentsOnly,
    /// No spouse: parents take a quarter each, siblings share the rest.
    ParentsAndSiblings,
    /// Order 3: siblings and their descendants.
    Siblings,
    /// Orders 4–5: ascendants/collaterals split per line (fente).
    Cleft,
    /// Nobody accepts the succession.
    Vacant,
}

#[derive(Debug, Clone)]
pub(crate) struct SoucheMember {
    pub heir_id: String,
    /// Fraction of the souche's share, in [0, 1]; weights sum to 1.
    pub weight: Rate,
    pub via_representation: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Souche {
    pub root_id: String,
    pub members: Vec<SoucheMember>,
}

#[derive(Debug, Clone)]
pub(crate) struct DevolutionOutcome {
    pub order: SuccessionOrder,
    pub spouse_id: Option<String>,
    /// Descendant souches (order 1) or sibling souches (order 3 / mixed).
    pub souches: Vec<Souche>,
    /// Fully-determined mass fractions for orders without a spouse option.
    pub fixed_shares: Vec<(String, Rate)>,
    pub reserve_fraction: Rate,
    pub quota_fraction: Rate,
}

pub(crate) fn solve(
    input: &SimulationInput,
    tracer: &mut Tracer,
) -> Result<DevolutionOutcome, SuccessionError> {
    let spouse_id = input.spouse().map(|s| s.id.clone());

    let descendant_souches = build_souches(
        input,
        |h| h.relationship == Relationship::Child,
        |h| {
            matches!(
                h.relationship,
                Relationship::Grandchild | Relationship::GreatGrandchild
            )
        },
    );

    if !descendant_souches.is_empty() {
        let n = descendant_souches.len();
        let reserve = children_reserve_fraction(n);
        tracer.explain(
            keys::RESERVE_CHILDREN,
            json!({
                "article": "Art. 913 CC",
                "souches": n,
                "reserve": reserve.to_string(),
            }),
        );
        for souche in &descendant_souches {
            if souche.members.iter().any(|m| m.via_representation) {
                tracer.explain(
                    keys::SHARE_REPRESENTATION,
                    json!({
                        "article": "Art. 751 CC",
                        "souche": souche.root_id,
                        "members": souche.members.iter().map(|m| m.heir_id.clone()).collect::<Vec<_>>(),
                    }),
                );
            }
        }
        return Ok(DevolutionOutcome {
            order: SuccessionOrder::Descendants,
            spouse_id,
            souches: descendant_souches,
            fixed_shares: Vec::new(),
            reserve_fraction: reserve,
            quota_fraction: Decimal::ONE - reserve,
        });
    }

    let parents: Vec<&Heir> = input
        .heirs
        .iter()
        .filter(|h| h.relationship == Relationship::Parent && !h.renounces())
        .collect();
    let parents_reserve = parents_reserve_fraction(parents.len());
    if !parents.is_empty() {
        tracer.explain(
            keys::RESERVE_PARENTS,
            json!({
                "article": "Art. 914 CC",
                "parents": parents.len(),
                "reserve": parents_reserve.to_string(),
            }),
        );
    }

    if let Some(spouse) = &spouse_id {
        if !parents.is_empty() {
            // Each living parent takes a quarter; the spouse takes the rest.
            let quarter = Decimal::ONE / Decimal::from(4);
            let mut fixed: Vec<(String, Rate)> = Vec::new();
            let spouse_share = Decimal::ONE - quarter * Decimal::from(parents.len() as u32);
            fixed.push((spouse.clone(), spouse_share));
            for p in &parents {
                fixed.push((p.id.clone(), quarter));
            }
            tracer.explain(
                keys::SHARE_SPOUSE_WITH_PARENTS,
                json!({
                    "article": "Art. 757-1 CC",
                    "spouse_share": spouse_share.to_string(),
                    "parents": parents.len(),
                }),
            );
            return Ok(DevolutionOutcome {
                order: SuccessionOrder::SpouseAndParents,
                spouse_id,
                souches: Vec::new(),
                fixed_shares: fixed,
                reserve_fraction: parents_reserve,
                quota_fraction: Decimal::ONE - parents_reserve,
            });
        }

        tracer.explain(
            keys::SHARE_SPOUSE_ALL_ESTATE,
            json!({"article": "Art. 757-2 CC", "spouse_id": spouse}),
        );
        return Ok(DevolutionOutcome {
            order: SuccessionOrder::SpouseAlone,
            spouse_id: spouse_id.clone(),
            souches: Vec::new(),
            fixed_shares: vec![(spouse.clone(), Decimal::ONE)],
            reserve_fraction: Decimal::ZERO,
            quota_fraction: Decimal::ONE,
        });
    }

    let sibling_souches = build_souches(
        input,
        |h| h.relationship == Relationship::Sibling,
        |h| h.relationship == Relationship::NephewNiece,
    );

    if !parents.is_empty() {
        let quarter = Decimal::ONE / Decimal::from(4);
        let mut fixed: Vec<(String, Rate)> = Vec::new();

        if sibling_souches.is_empty() {
            // Parents alone share the whole estate.
            let each = Decimal::ONE / Decimal::from(parents.len() as u32);
            for p in &parents {
                fixed.push((p.id.clone(), each));
            }
            return Ok(DevolutionOutcome {
                order: SuccessionOrder::ParentsOnly,
                spouse_id: None,
                souches: Vec::new(),
                fixed_shares: fixed,
                reserve_fraction: parents_reserve,
                quota_fraction: Decimal::ONE - parents_reserve,
            });
        }

        // Art. 738 CC: a quarter per living parent, the rest to siblings.
        let sibling_pool =
            Decimal::ONE - quarter * Decimal::from(parents.len() as u32);
        for p in &parents {
            fixed.push((p.id.clone(), quarter));
        }
        let per_souche = sibling_pool / Decimal::from(sibling_souches.len() as u32);
        for souche in &sibling_souches {
            for member in &souche.members {
                fixed.push((member.heir_id.clone(), per_souche * member.weight));
            }
        }
        tracer.explain(
            keys::SHARE_PARENTS_SIBLINGS,
            json!({
                "article": "Art. 738 CC",
                "parents": parents.len(),
                "sibling_souches": sibling_souches.len(),
            }),
        );
        return Ok(DevolutionOutcome {
            order: SuccessionOrder::ParentsAndSiblings,
            spouse_id: None,
            souches: sibling_souches,
            fixed_shares: fixed,
            reserve_fraction: parents_reserve,
            quota_fraction: Decimal::ONE - parents_reserve,
        });
    }

    if !sibling_souches.is_empty() {
        let per_souche = Decimal::ONE / Decimal::from(sibling_souches.len() as u32);
        let mut fixed: Vec<(String, Rate)> = Vec::new();
        for souche in &sibling_souches {
            for member in &souche.members {
                fixed.push((member.heir_id.clone(), per_souche * member.weight));
            }
        }
        tracer.explain(
            keys::SHARE_SIBLINGS_EQUAL,
            json!({
                "article": "Art. 734 CC",
                "souches": sibling_souches.len(),
            }),
        );
        return Ok(DevolutionOutcome {
            order: SuccessionOrder::Siblings,
            spouse_id: None,
            souches: sibling_souches,
            fixed_shares: fixed,
            reserve_fraction: Decimal::ZERO,
            quota_fraction: Decimal::ONE,
        });
    }

    cleft_devolution(input, tracer)
}

/// Art. 746 CC: with neither descendants, privileged ascendants/collaterals
/// nor spouse, the estate splits in two between the paternal and maternal
/// lines, each searched independently.
fn cleft_devolution(
    input: &SimulationInput,
    tracer: &mut Tracer,
) -> Result<DevolutionOutcome, SuccessionError> {
    let candidates: Vec<&Heir> = input
        .heirs
        .iter()
        .filter(|h| {
            matches!(
                h.relationship,
                Relationship::NephewNiece | Relationship::Other
            ) && !h.renounces()
        })
        .collect();

    if candidates.is_empty() {
        tracer.warn(
            Severity::Warning,
            Audience::Notary,
            WarningCategory::Legal,
            "Aucun héritier acceptant: succession en déshérence",
            json!({}),
            &[],
        );
        return Ok(DevolutionOutcome {
            order: SuccessionOrder::Vacant,
            spouse_id: None,
            souches: Vec::new(),
            fixed_shares: Vec::new(),
            reserve_fraction: Decimal::ZERO,
            quota_fraction: Decimal::ONE,
        });
    }

    if let Some(missing) = candidates.iter().find(|h| h.paternal_line.is_none()) {
        // Guessing a line would silently halve someone's share.
        return Err(SuccessionError::InvalidInput {
            field: format!("heirs[{}].paternal_line", missing.id),
            reason: "fente successorale (Art. 746 CC): la ligne paternelle ou \
                     maternelle doit être renseignée pour chaque collatéral"
                .into(),
        });
    }

    let paternal: Vec<&&Heir> = candidates
        .iter()
        .filter(|h| h.paternal_line == Some(true))
        .collect();
    let maternal: Vec<&&Heir> = candidates
        .iter()
        .filter(|h| h.paternal_line == Some(false))
        .collect();

    let mut fixed: Vec<(String, Rate)> = Vec::new();
    let half = Decimal::ONE / Decimal::TWO;
    match (paternal.is_empty(), maternal.is_empty()) {
        (false, false) => {
            let per_paternal = half / Decimal::from(paternal.len() as u32);
            let per_maternal = half / Decimal::from(maternal.len() as u32);
            for h in &paternal {
                fixed.push((h.id.clone(), per_paternal));
            }
            for h in &maternal {
                fixed.push((h.id.clone(), per_maternal));
            }
        }
        // A single populated line takes everything.
        (false, true) => {
            let each = Decimal::ONE / Decimal::from(paternal.len() as u32);
            for h in &paternal {
                fixed.push((h.id.clone(), each));
            }
        }
        (true, false) => {
            let each = Decimal::ONE / Decimal::from(maternal.len() as u32);
            for h in &maternal {
                fixed.push((h.id.clone(), each));
            }
        }
        (true, true) => unreachable!("candidates is non-empty"),
    }

    tracer.explain(
        keys::SHARE_CLEFT_SPLIT,
        json!({
            "article": "Art. 746 CC",
            "paternal": paternal.len(),
            "maternal": maternal.len(),
        }),
    );

    Ok(DevolutionOutcome {
        order: SuccessionOrder::Cleft,
        spouse_id: None,
        souches: Vec::new(),
        fixed_shares: fixed,
        reserve_fraction: Decimal::ZERO,
        quota_fraction: Decimal::ONE,
    })
}

fn children_reserve_fraction(souches: usize) -> Rate {
    match souches {
        0 => Decimal::ZERO,
        1 => Decimal::ONE / Decimal::TWO,
        2 => Decimal::TWO / Decimal::from(3),
        _ => Decimal::from(3) / Decimal::from(4),
    }
}

fn parents_reserve_fraction(parents: usize) -> Rate {
    match parents {
        0 => Decimal::ZERO,
        1 => Decimal::ONE / Decimal::from(4),
        _ => Decimal::ONE / Decimal::TWO,
    }
}

/// Group heirs into souches. Roots are heirs matching `is_root` plus the ids
/// representers point at without a matching record (predeceased, never
/// listed). Each root resolves to its accepting members with their weights.
fn build_souches(
    input: &SimulationInput,
    is_root: impl Fn(&Heir) -> bool,
    is_representer: impl Fn(&Heir) -> bool,
) -> Vec<Souche> {
    let heirs_by_id: HashMap<&str, &Heir> =
        input.heirs.iter().map(|h| (h.id.as_str(), h)).collect();

    let mut representers_of: HashMap<&str, Vec<&Heir>> = HashMap::new();
    for heir in input.heirs.iter().filter(|h| is_representer(h)) {
        if let Some(rep) = &heir.represented_heir_id {
            representers_of.entry(rep.as_str()).or_default().push(heir);
        }
    }

    // Roots in input order, then virtual roots in order of first reference.
    let mut root_ids: Vec<&str> = input
        .heirs
        .iter()
        .filter(|h| is_root(h))
        .map(|h| h.id.as_str())
        .collect();
    for heir in input.heirs.iter().filter(|h| is_representer(h)) {
        if let Some(rep) = &heir.represented_heir_id {
            let known_root = root_ids.contains(&rep.as_str());
            let is_intermediate = heirs_by_id.contains_key(rep.as_str());
            if !known_root && !is_intermediate {
                root_ids.push(rep.as_str());
            }
        }
    }

    let mut souches = Vec::new();
    for root_id in root_ids {
        let mut visited = HashSet::new();
        let members = resolve_branch(root_id, &heirs_by_id, &representers_of, &mut visited);
        if members.is_empty() {
            continue;
        }
        let via_rep = members.len() != 1 || members[0].0 != root_id;
        souches.push(Souche {
            root_id: root_id.to_string(),
            members: members
                .into_iter()
                .map(|(id, weight)| SoucheMember {
                    heir_id: id.to_string(),
                    weight,
                    via_representation: via_rep,
                })
                .collect(),
        });
    }
    souches
}

/// Accepting members of one branch with their intra-souche weights.
fn resolve_branch<'a>(
    id: &'a str,
    heirs_by_id: &HashMap<&'a str, &'a Heir>,
    representers_of: &HashMap<&'a str, Vec<&'a Heir>>,
    visited: &mut HashSet<&'a str>,
) -> Vec<(&'a str, Rate)> {
    if !visited.insert(id) {
        return Vec::new();
    }

    if let Some(heir) = heirs_by_id.get(id).copied() {
        if !heir.renounces() {
            return vec![(id, Decimal::ONE)];
        }
    }

    // Predeceased or renouncing: the branch passes to representers.
    let branches: Vec<Vec<(&str, Rate)>> = representers_of
        .get(id)
        .map(|reps| {
            reps.iter()
                .map(|rep| resolve_branch(rep.id.as_str(), heirs_by_id, representers_of, visited))
                .filter(|b| !b.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if branches.is_empty() {
        return Vec::new();
    }

    let per_branch = Decimal::ONE / Decimal::from(branches.len() as u32);
    branches
        .into_iter()
        .flatten()
        .map(|(id, w)| (id, w * per_branch))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        DeceasedProfile, MatrimonialAdvantages, MatrimonialRegime, Wishes,
    };
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn input_with_heirs(heirs: Vec<Heir>) -> SimulationInput {
        SimulationInput {
            deceased: DeceasedProfile {
                death_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
                marriage_date: None,
                matrimonial_regime: MatrimonialRegime::Separation,
                residence_country: None,
            },
            assets: vec![],
            heirs,
            donations: vec![],
            debts: vec![],
            wishes: Wishes::default(),
            matrimonial_advantages: MatrimonialAdvantages::default(),
        }
    }

    fn heir(id: &str, relationship: Relationship) -> Heir {
        Heir {
            id: id.into(),
            relationship,
            ..Default::default()
        }
    }

    fn representer(id: &str, relationship: Relationship, represents: &str) -> Heir {
        Heir {
            id: id.into(),
            relationship,
            represented_heir_id: Some(represents.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_two_children_two_souches_reserve_two_thirds() {
        let input = input_with_heirs(vec![
            heir("c1", Relationship::Child),
            heir("c2", Relationship::Child),
        ]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        assert_eq!(out.order, SuccessionOrder::Descendants);
        assert_eq!(out.souches.len(), 2);
        assert_eq!(out.reserve_fraction, Decimal::TWO / Decimal::from(3));
    }

    #[test]
    fn test_reserve_scale_with_children_count() {
        for (n, expected) in [
            (1, Decimal::ONE / Decimal::TWO),
            (2, Decimal::TWO / Decimal::from(3)),
            (3, Decimal::from(3) / Decimal::from(4)),
            (5, Decimal::from(3) / Decimal::from(4)),
        ] {
            let heirs = (0..n)
                .map(|i| heir(&format!("c{}", i), Relationship::Child))
                .collect();
            let mut tracer = Tracer::new();
            let out = solve(&input_with_heirs(heirs), &mut tracer).unwrap();
            assert_eq!(out.reserve_fraction, expected, "n = {}", n);
        }
    }

    #[test]
    fn test_predeceased_child_represented_by_grandchildren() {
        let input = input_with_heirs(vec![
            heir("a", Relationship::Child),
            representer("g1", Relationship::Grandchild, "b"),
            representer("g2", Relationship::Grandchild, "b"),
        ]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        assert_eq!(out.souches.len(), 2);
        let souche_b = out.souches.iter().find(|s| s.root_id == "b").unwrap();
        assert_eq!(souche_b.members.len(), 2);
        for m in &souche_b.members {
            assert_eq!(m.weight, Decimal::ONE / Decimal::TWO);
            assert!(m.via_representation);
        }
        // Two souches: the reserve counts the represented child.
        assert_eq!(out.reserve_fraction, Decimal::TWO / Decimal::from(3));
    }

    #[test]
    fn test_renouncing_child_with_descendants_is_represented() {
        let mut renouncer = heir("b", Relationship::Child);
        renouncer.has_renounced = true;
        let input = input_with_heirs(vec![
            heir("a", Relationship::Child),
            renouncer,
            representer("g1", Relationship::Grandchild, "b"),
        ]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        assert_eq!(out.souches.len(), 2);
        let souche_b = out.souches.iter().find(|s| s.root_id == "b").unwrap();
        assert_eq!(souche_b.members[0].heir_id, "g1");
        assert_eq!(souche_b.members[0].weight, Decimal::ONE);
    }

    #[test]
    fn test_renouncing_child_without_descendants_drops_souche() {
        let mut renouncer = heir("b", Relationship::Child);
        renouncer.has_renounced = true;
        let input = input_with_heirs(vec![heir("a", Relationship::Child), renouncer]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        assert_eq!(out.souches.len(), 1);
        assert_eq!(out.reserve_fraction, Decimal::ONE / Decimal::TWO);
    }

    #[test]
    fn test_multi_level_representation() {
        // Child b predeceased; grandchild g1 also predeceased, leaving two
        // great-grandchildren; grandchild g2 alive.
        let input = input_with_heirs(vec![
            representer("g2", Relationship::Grandchild, "b"),
            representer("gg1", Relationship::GreatGrandchild, "g1"),
            representer("gg2", Relationship::GreatGrandchild, "g1"),
            representer("g1", Relationship::Grandchild, "b"),
        ]);
        // g1 must be marked renouncing or absent; model "predeceased" by
        // renunciation here since the record exists.
        let mut input = input;
        input.heirs[3].has_renounced = true;

        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        assert_eq!(out.souches.len(), 1);
        let souche = &out.souches[0];
        assert_eq!(souche.root_id, "b");
        let weight_of = |id: &str| {
            souche
                .members
                .iter()
                .find(|m| m.heir_id == id)
                .map(|m| m.weight)
                .unwrap()
        };
        assert_eq!(weight_of("g2"), dec!(0.5));
        assert_eq!(weight_of("gg1"), dec!(0.25));
        assert_eq!(weight_of("gg2"), dec!(0.25));
    }

    #[test]
    fn test_spouse_and_two_parents() {
        let input = input_with_heirs(vec![
            heir("spouse", Relationship::Spouse),
            heir("father", Relationship::Parent),
            heir("mother", Relationship::Parent),
        ]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        assert_eq!(out.order, SuccessionOrder::SpouseAndParents);
        let share = |id: &str| {
            out.fixed_shares
                .iter()
                .find(|(h, _)| h == id)
                .map(|(_, s)| *s)
                .unwrap()
        };
        assert_eq!(share("spouse"), dec!(0.5));
        assert_eq!(share("father"), dec!(0.25));
        assert_eq!(share("mother"), dec!(0.25));
        assert_eq!(out.reserve_fraction, dec!(0.5));
    }

    #[test]
    fn test_spouse_and_one_parent() {
        let input = input_with_heirs(vec![
            heir("spouse", Relationship::Spouse),
            heir("mother", Relationship::Parent),
        ]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        let share = |id: &str| {
            out.fixed_shares
                .iter()
                .find(|(h, _)| h == id)
                .map(|(_, s)| *s)
                .unwrap()
        };
        assert_eq!(share("spouse"), dec!(0.75));
        assert_eq!(share("mother"), dec!(0.25));
    }

    #[test]
    fn test_spouse_alone_takes_everything() {
        let input = input_with_heirs(vec![heir("spouse", Relationship::Spouse)]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        assert_eq!(out.order, SuccessionOrder::SpouseAlone);
        assert_eq!(out.fixed_shares, vec![("spouse".to_string(), Decimal::ONE)]);
        assert_eq!(out.reserve_fraction, Decimal::ZERO);
    }

    #[test]
    fn test_parents_and_siblings_mix() {
        let input = input_with_heirs(vec![
            heir("father", Relationship::Parent),
            heir("mother", Relationship::Parent),
            heir("s1", Relationship::Sibling),
            heir("s2", Relationship::Sibling),
        ]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        assert_eq!(out.order, SuccessionOrder::ParentsAndSiblings);
        let share = |id: &str| {
            out.fixed_shares
                .iter()
                .find(|(h, _)| h == id)
                .map(|(_, s)| *s)
                .unwrap()
        };
        assert_eq!(share("father"), dec!(0.25));
        assert_eq!(share("mother"), dec!(0.25));
        assert_eq!(share("s1"), dec!(0.25));
        assert_eq!(share("s2"), dec!(0.25));
    }

    #[test]
    fn test_siblings_with_nephew_representation() {
        let mut dead_sibling = heir("s2", Relationship::Sibling);
        dead_sibling.has_renounced = true;
        let input = input_with_heirs(vec![
            heir("s1", Relationship::Sibling),
            dead_sibling,
            representer("n1", Relationship::NephewNiece, "s2"),
            representer("n2", Relationship::NephewNiece, "s2"),
        ]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        assert_eq!(out.order, SuccessionOrder::Siblings);
        let share = |id: &str| {
            out.fixed_shares
                .iter()
                .find(|(h, _)| h == id)
                .map(|(_, s)| *s)
                .unwrap()
        };
        assert_eq!(share("s1"), dec!(0.5));
        assert_eq!(share("n1"), dec!(0.25));
        assert_eq!(share("n2"), dec!(0.25));
    }

    #[test]
    fn test_cleft_splits_between_lines() {
        let mut paternal = heir("uncle-p", Relationship::Other);
        paternal.paternal_line = Some(true);
        let mut maternal1 = heir("cousin-m1", Relationship::Other);
        maternal1.paternal_line = Some(false);
        let mut maternal2 = heir("cousin-m2", Relationship::Other);
        maternal2.paternal_line = Some(false);

        let input = input_with_heirs(vec![paternal, maternal1, maternal2]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        assert_eq!(out.order, SuccessionOrder::Cleft);
        let share = |id: &str| {
            out.fixed_shares
                .iter()
                .find(|(h, _)| h == id)
                .map(|(_, s)| *s)
                .unwrap()
        };
        assert_eq!(share("uncle-p"), dec!(0.5));
        assert_eq!(share("cousin-m1"), dec!(0.25));
        assert_eq!(share("cousin-m2"), dec!(0.25));
    }

    #[test]
    fn test_cleft_single_line_takes_all() {
        let mut a = heir("cousin1", Relationship::Other);
        a.paternal_line = Some(false);
        let mut b = heir("cousin2", Relationship::Other);
        b.paternal_line = Some(false);

        let input = input_with_heirs(vec![a, b]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        let total: Decimal = out.fixed_shares.iter().map(|(_, s)| *s).sum();
        assert_eq!(total, Decimal::ONE);
    }

    #[test]
    fn test_cleft_without_line_flag_is_an_error() {
        let input = input_with_heirs(vec![heir("cousin", Relationship::Other)]);
        let mut tracer = Tracer::new();
        let err = solve(&input, &mut tracer).unwrap_err();
        match err {
            SuccessionError::InvalidInput { field, .. } => {
                assert!(field.contains("paternal_line"));
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_everyone_renounced_is_vacant() {
        let mut c = heir("c1", Relationship::Child);
        c.has_renounced = true;
        let input = input_with_heirs(vec![c]);
        let mut tracer = Tracer::new();
        let out = solve(&input, &mut tracer).unwrap();

        assert_eq!(out.order, SuccessionOrder::Vacant);
        assert!(out.fixed_shares.is_empty());
    }
}
