//! Fiscal valuation of dismembered ownership (Art. 669 CGI).
//!
//! The viager scale steps down one decade at a time with the usufructuary's
//! age at death; a temporary usufruct is worth 23% of full ownership per
//! started decade, capped at full ownership.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::params::LegalParameters;
use crate::types::{Money, Rate};

/// Whole years between `birth` and `at`.
pub(crate) fn age_at(birth: NaiveDate, at: NaiveDate) -> u8 {
    let mut years = at.years_since(birth).unwrap_or(0);
    if years > u8::MAX as u32 {
        years = u8::MAX as u32;
    }
    years as u8
}

/// Art. 669 I rate for a life usufruct, by the usufructuary's age.
pub(crate) fn viager_rate(params: &LegalParameters, age: u8) -> Rate {
    for band in &params.usufruct_scale {
        if age < band.below_age {
            return band.rate;
        }
    }
    params.usufruct_floor_rate
}

/// Art. 669 II rate for a temporary usufruct of `duration_years`.
pub(crate) fn temporary_rate(params: &LegalParameters, duration_years: u32) -> Rate {
    let started_decades = Decimal::from(duration_years.div_ceil(10));
    (params.temporary_usufruct_rate_per_decade * started_decades).min(Decimal::ONE)
}

/// Split a full-ownership value into (usufruct, bare ownership) by age.
pub(crate) fn split_by_age(
    params: &LegalParameters,
    total: Money,
    age: u8,
) -> (Money, Money) {
    let rate = viager_rate(params, age);
    let usufruct = total * rate;
    (usufruct, total - usufruct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn params() -> LegalParameters {
        LegalParameters::france_2025()
    }

    #[test]
    fn test_viager_rate_bands() {
        let p = params();
        assert_eq!(viager_rate(&p, 19), dec!(0.90));
        assert_eq!(viager_rate(&p, 21), dec!(0.80));
        assert_eq!(viager_rate(&p, 30), dec!(0.80));
        assert_eq!(viager_rate(&p, 31), dec!(0.70));
        assert_eq!(viager_rate(&p, 65), dec!(0.40));
        assert_eq!(viager_rate(&p, 71), dec!(0.30));
        assert_eq!(viager_rate(&p, 90), dec!(0.20));
        assert_eq!(viager_rate(&p, 91), dec!(0.10));
        assert_eq!(viager_rate(&p, 103), dec!(0.10));
    }

    #[test]
    fn test_temporary_rate_per_started_decade() {
        let p = params();
        assert_eq!(temporary_rate(&p, 1), dec!(0.23));
        assert_eq!(temporary_rate(&p, 10), dec!(0.23));
        assert_eq!(temporary_rate(&p, 11), dec!(0.46));
        assert_eq!(temporary_rate(&p, 25), dec!(0.69));
        // Cannot exceed full ownership.
        assert_eq!(temporary_rate(&p, 55), Decimal::ONE);
    }

    #[test]
    fn test_split_by_age_sums_to_total() {
        let p = params();
        let (usu, bare) = split_by_age(&p, dec!(400_000), 72);
        assert_eq!(usu, dec!(120_000));
        assert_eq!(bare, dec!(280_000));
        assert_eq!(usu + bare, dec!(400_000));
    }

    #[test]
    fn test_age_at_counts_whole_years() {
        let birth = NaiveDate::from_ymd_opt(1950, 6, 15).unwrap();
        let before_birthday = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        let on_birthday = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(age_at(birth, before_birthday), 74);
        assert_eq!(age_at(birth, on_birthday), 75);
    }
}
