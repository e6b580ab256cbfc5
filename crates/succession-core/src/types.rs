//! Input entities of a succession dossier.
//!
//! Every record is a closed type: the engine matches exhaustively and the
//! compiler rejects unhandled family shapes. All monetary fields are
//! `Decimal`; fractions are `Decimal` in [0, 1] unless a field documents a
//! percentage range inherited from the dossier format.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates and fractions expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Matrimonial property regime of the deceased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatrimonialRegime {
    /// Séparation de biens: each spouse keeps their own estate.
    Separation,
    /// Communauté réduite aux acquêts (default legal regime since 1966).
    CommunityLegal,
    /// Communauté universelle: everything is common.
    CommunityUniversal,
}

/// How the deceased held an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnershipMode {
    Full,
    Usufruct,
    Bare,
    Indivision,
}

impl Default for OwnershipMode {
    fn default() -> Self {
        OwnershipMode::Full
    }
}

/// Where an asset came from, for regime classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetOrigin {
    Personal,
    Community,
    Inheritance,
}

impl Default for AssetOrigin {
    fn default() -> Self {
        AssetOrigin::Personal
    }
}

/// Usufruct flavour for dismembered assets (Art. 669 I vs II CGI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsufructType {
    Viager,
    Temporaire,
}

/// Taxation family of a life-insurance contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifeInsuranceContractType {
    Standard,
    /// Vie-Génération: 20% rebate on the capital before allowances.
    VieGeneration,
    /// Contract subscribed before 20/11/1991 with premiums before 13/10/1998.
    AncienContrat,
}

impl Default for LifeInsuranceContractType {
    fn default() -> Self {
        LifeInsuranceContractType::Standard
    }
}

/// Who subscribed a life-insurance contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriberType {
    Sole,
    Joint,
}

/// Ownership split inside a dismembered beneficiary clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BeneficiaryOwnership {
    Full,
    Usufruct,
    Bare,
}

impl Default for BeneficiaryOwnership {
    fn default() -> Self {
        BeneficiaryOwnership::Full
    }
}

/// One beneficiary of a life-insurance contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeneficiaryClause {
    pub heir_id: String,
    /// Fraction of the contract capital, in [0, 1].
    pub share: Rate,
    #[serde(default)]
    pub ownership: BeneficiaryOwnership,
}

/// An element of the deceased's patrimony.
///
/// An asset is a life-insurance contract iff a premium field is set; such
/// assets never enter the succession mass and are taxed by the dedicated
/// life-insurance stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub estimated_value: Money,
    #[serde(default)]
    pub ownership_mode: OwnershipMode,
    #[serde(default)]
    pub asset_origin: AssetOrigin,
    #[serde(default)]
    pub acquisition_date: Option<NaiveDate>,
    #[serde(default)]
    pub usufructuary_birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub usufruct_type: Option<UsufructType>,
    #[serde(default)]
    pub usufruct_duration_years: Option<u32>,
    /// Share of the acquisition financed by community funds, in [0, 100].
    /// Anything under 100 on a community asset triggers a reward (Art. 1468).
    #[serde(default = "default_full_funding")]
    pub community_funding_percentage: Decimal,
    #[serde(default)]
    pub is_main_residence: bool,
    #[serde(default)]
    pub spouse_occupies_property: bool,
    #[serde(default)]
    pub premiums_before_70: Option<Money>,
    #[serde(default)]
    pub premiums_after_70: Option<Money>,
    #[serde(default)]
    pub life_insurance_contract_type: LifeInsuranceContractType,
    #[serde(default)]
    pub life_insurance_beneficiaries: Vec<BeneficiaryClause>,
    #[serde(default)]
    pub subscriber_type: Option<SubscriberType>,
    /// Current-account balance (compte courant d'associé) carried by a
    /// professional asset; excluded from the Dutreil exemption base.
    #[serde(default)]
    pub cca_value: Option<Money>,
    /// Dutreil pact (Art. 787 B CGI): 75% of the asset is exempt.
    #[serde(default)]
    pub professional_exemption: bool,
    /// Rural goods under long lease (Art. 793 CGI).
    #[serde(default)]
    pub rural_exemption: bool,
    /// Donor parent, for the legal right of return (Art. 738-2 CC).
    #[serde(default)]
    pub received_from_parent_id: Option<String>,
    #[serde(default)]
    pub location_country: Option<String>,
}

fn default_full_funding() -> Decimal {
    Decimal::ONE_HUNDRED
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            id: String::new(),
            label: None,
            estimated_value: Decimal::ZERO,
            ownership_mode: OwnershipMode::Full,
            asset_origin: AssetOrigin::Personal,
            acquisition_date: None,
            usufructuary_birth_date: None,
            usufruct_type: None,
            usufruct_duration_years: None,
            community_funding_percentage: Decimal::ONE_HUNDRED,
            is_main_residence: false,
            spouse_occupies_property: false,
            premiums_before_70: None,
            premiums_after_70: None,
            life_insurance_contract_type: LifeInsuranceContractType::Standard,
            life_insurance_beneficiaries: Vec::new(),
            subscriber_type: None,
            cca_value: None,
            professional_exemption: false,
            rural_exemption: false,
            received_from_parent_id: None,
            location_country: None,
        }
    }
}

impl Asset {
    /// A premium field marks the asset as a life-insurance contract.
    pub fn is_life_insurance(&self) -> bool {
        self.premiums_before_70.is_some() || self.premiums_after_70.is_some()
    }

    pub fn total_premiums(&self) -> Money {
        self.premiums_before_70.unwrap_or(Decimal::ZERO)
            + self.premiums_after_70.unwrap_or(Decimal::ZERO)
    }
}

/// Kinship of an heir to the deceased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relationship {
    Child,
    Spouse,
    Partner,
    Parent,
    Sibling,
    Grandchild,
    GreatGrandchild,
    NephewNiece,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdoptionType {
    None,
    Full,
    Simple,
}

impl Default for AdoptionType {
    fn default() -> Self {
        AdoptionType::None
    }
}

/// Option exercised on the succession (Art. 768 CC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcceptanceOption {
    PureSimple,
    BenefitInventory,
    Renunciation,
}

impl Default for AcceptanceOption {
    fn default() -> Self {
        AcceptanceOption::PureSimple
    }
}

/// A person called (or potentially called) to the succession.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heir {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    pub relationship: Relationship,
    #[serde(default = "default_true")]
    pub is_from_current_union: bool,
    /// Predeceased or renouncing ancestor this heir steps into the place of.
    #[serde(default)]
    pub represented_heir_id: Option<String>,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub adoption_type: AdoptionType,
    /// Continuous care during minority (simple adoption rate switch).
    #[serde(default)]
    pub has_received_continuous_care: bool,
    #[serde(default)]
    pub acceptance_option: AcceptanceOption,
    #[serde(default)]
    pub has_renounced: bool,
    /// Paternal (true) or maternal (false) line, for cleft successions.
    #[serde(default)]
    pub paternal_line: Option<bool>,
}

fn default_true() -> bool {
    true
}

impl Default for Heir {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: None,
            birth_date: None,
            relationship: Relationship::Other,
            is_from_current_union: true,
            represented_heir_id: None,
            is_disabled: false,
            adoption_type: AdoptionType::None,
            has_received_continuous_care: false,
            acceptance_option: AcceptanceOption::PureSimple,
            has_renounced: false,
            paternal_line: None,
        }
    }
}

impl Heir {
    /// Renunciation can be expressed either way in dossiers; both count.
    pub fn renounces(&self) -> bool {
        self.has_renounced || self.acceptance_option == AcceptanceOption::Renunciation
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Civil reportability family of a prior gift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationType {
    /// Revalued at death for the civil reconstitution.
    DonManuel,
    /// Values frozen at donation day; nothing to reconstitute.
    DonationPartage,
    /// Customary present, never reportable.
    PresentUsage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: String,
    #[serde(rename = "type")]
    pub donation_type: DonationType,
    pub beneficiary_id: String,
    pub donation_date: NaiveDate,
    pub original_value: Money,
    #[serde(default)]
    pub current_estimated_value: Option<Money>,
    /// Declared gifts enter the 15-year allowance recall (Art. 784 CGI).
    #[serde(default)]
    pub is_declared_to_tax: bool,
}

impl Donation {
    /// Value retained for the civil reconstitution of the mass.
    pub fn reportable_value(&self) -> Money {
        match self.donation_type {
            DonationType::DonManuel => {
                self.current_estimated_value.unwrap_or(self.original_value)
            }
            DonationType::DonationPartage | DonationType::PresentUsage => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtType {
    FuneralExpenses,
    Loan,
    TaxArrears,
    Other,
}

impl Default for DebtType {
    fn default() -> Self {
        DebtType::Other
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub amount: Money,
    #[serde(rename = "type", default)]
    pub debt_type: DebtType,
    #[serde(default = "default_true")]
    pub is_deductible: bool,
    #[serde(default)]
    pub linked_asset_id: Option<String>,
    #[serde(default)]
    pub asset_origin: AssetOrigin,
    #[serde(default)]
    pub proof_provided: bool,
}

impl Default for Debt {
    fn default() -> Self {
        Self {
            id: String::new(),
            label: None,
            amount: Decimal::ZERO,
            debt_type: DebtType::Other,
            is_deductible: true,
            linked_asset_id: None,
            asset_origin: AssetOrigin::Personal,
            proof_provided: false,
        }
    }
}

/// Testamentary distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestamentDistribution {
    Legal,
    SpecificBequests,
    Custom,
    SpouseAll,
    ChildrenAll,
}

impl Default for TestamentDistribution {
    fn default() -> Self {
        TestamentDistribution::Legal
    }
}

/// A legacy of (a fraction of) a named asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificBequest {
    pub asset_id: String,
    pub beneficiary_id: String,
    /// Fraction of the asset's value, in [0, 1].
    pub share_percentage: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomShare {
    pub beneficiary_id: String,
    /// Fraction of the mass, in [0, 1].
    pub percentage: Rate,
}

/// Surviving-spouse statutory option (Art. 757 CC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpouseChoice {
    Usufruct,
    QuarterOwnership,
    DisposableQuota,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wishes {
    #[serde(default)]
    pub has_spouse_donation: bool,
    #[serde(default)]
    pub testament_distribution: TestamentDistribution,
    #[serde(default)]
    pub specific_bequests: Vec<SpecificBequest>,
    #[serde(default)]
    pub custom_shares: Vec<CustomShare>,
    #[serde(default)]
    pub spouse_choice: Option<SpouseChoice>,
}

/// Clauses of the marriage contract altering the community split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrimonialAdvantages {
    #[serde(default)]
    pub has_full_attribution: bool,
    #[serde(default)]
    pub has_preciput: bool,
    #[serde(default)]
    pub preciput_asset_ids: Vec<String>,
    #[serde(default)]
    pub has_unequal_share: bool,
    /// Spouse's community fraction under an unequal-share clause, in [51, 99].
    #[serde(default = "default_spouse_share")]
    pub spouse_share_percentage: Decimal,
}

fn default_spouse_share() -> Decimal {
    Decimal::from(50)
}

impl Default for MatrimonialAdvantages {
    fn default() -> Self {
        Self {
            has_full_attribution: false,
            has_preciput: false,
            preciput_asset_ids: Vec::new(),
            has_unequal_share: false,
            spouse_share_percentage: Decimal::from(50),
        }
    }
}

/// Facts about the deceased that frame the whole computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeceasedProfile {
    pub death_date: NaiveDate,
    #[serde(default)]
    pub marriage_date: Option<NaiveDate>,
    pub matrimonial_regime: MatrimonialRegime,
    #[serde(default)]
    pub residence_country: Option<String>,
}

/// A fully-typed succession dossier: the single input of `simulate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub deceased: DeceasedProfile,
    #[serde(default)]
    pub assets: Vec<Asset>,
    pub heirs: Vec<Heir>,
    #[serde(default)]
    pub donations: Vec<Donation>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub wishes: Wishes,
    #[serde(default)]
    pub matrimonial_advantages: MatrimonialAdvantages,
}

impl SimulationInput {
    pub fn heir(&self, id: &str) -> Option<&Heir> {
        self.heirs.iter().find(|h| h.id == id)
    }

    pub fn spouse(&self) -> Option<&Heir> {
        self.heirs
            .iter()
            .find(|h| h.relationship == Relationship::Spouse && !h.renounces())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_life_insurance_detection() {
        let plain = Asset {
            id: "a1".into(),
            estimated_value: dec!(100_000),
            ..Default::default()
        };
        assert!(!plain.is_life_insurance());

        let contract = Asset {
            id: "a2".into(),
            premiums_before_70: Some(dec!(50_000)),
            ..Default::default()
        };
        assert!(contract.is_life_insurance());
        assert_eq!(contract.total_premiums(), dec!(50_000));
    }

    #[test]
    fn test_renunciation_both_spellings() {
        let by_flag = Heir {
            id: "h1".into(),
            relationship: Relationship::Child,
            has_renounced: true,
            ..Default::default()
        };
        let by_option = Heir {
            id: "h2".into(),
            relationship: Relationship::Child,
            acceptance_option: AcceptanceOption::Renunciation,
            ..Default::default()
        };
        assert!(by_flag.renounces());
        assert!(by_option.renounces());
    }

    #[test]
    fn test_reportable_value_by_donation_type() {
        let date = NaiveDate::from_ymd_opt(2015, 6, 1).unwrap();
        let manuel = Donation {
            id: "d1".into(),
            donation_type: DonationType::DonManuel,
            beneficiary_id: "h1".into(),
            donation_date: date,
            original_value: dec!(40_000),
            current_estimated_value: Some(dec!(55_000)),
            is_declared_to_tax: true,
        };
        // Don manuel is revalued at death.
        assert_eq!(manuel.reportable_value(), dec!(55_000));

        let partage = Donation {
            donation_type: DonationType::DonationPartage,
            ..manuel.clone()
        };
        assert_eq!(partage.reportable_value(), Decimal::ZERO);

        let usage = Donation {
            donation_type: DonationType::PresentUsage,
            ..manuel
        };
        assert_eq!(usage.reportable_value(), Decimal::ZERO);
    }

    #[test]
    fn test_don_manuel_falls_back_to_original_value() {
        let d = Donation {
            id: "d1".into(),
            donation_type: DonationType::DonManuel,
            beneficiary_id: "h1".into(),
            donation_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            original_value: dec!(10_000),
            current_estimated_value: None,
            is_declared_to_tax: false,
        };
        assert_eq!(d.reportable_value(), dec!(10_000));
    }
}
