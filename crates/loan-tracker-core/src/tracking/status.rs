use rust_decimal::Decimal;

use crate::policy::DEFAULT_TOLERANCE_FRACTION;
use crate::types::{LoanStatus, Money, Rate};

/// Classify repayment progress with the standard ±10% of one installment band.
pub fn classify(total_paid: Money, expected_paid: Money, monthly_installment: Money) -> LoanStatus {
    classify_with_tolerance(
        total_paid,
        expected_paid,
        monthly_installment,
        DEFAULT_TOLERANCE_FRACTION,
    )
}

/// Classify against a band of `tolerance_fraction` installments either side
/// of the expected-paid curve. The band edges themselves are on track.
pub fn classify_with_tolerance(
    total_paid: Money,
    expected_paid: Money,
    monthly_installment: Money,
    tolerance_fraction: Rate,
) -> LoanStatus {
    let tolerance = monthly_installment.saturating_mul(tolerance_fraction).abs();

    if total_paid > expected_paid.saturating_add(tolerance) {
        LoanStatus::Ahead
    } else if total_paid < expected_paid.saturating_sub(tolerance) {
        LoanStatus::Behind
    } else {
        LoanStatus::OnTrack
    }
}

/// How far payments trail the expected curve; zero when not behind it.
pub fn arrears(total_paid: Money, expected_paid: Money) -> Money {
    expected_paid.saturating_sub(total_paid).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_behind_three_months_two_payments() {
        // expected 2830.20, tolerance 94.34
        let status = classify(dec!(1_886.80), dec!(2_830.20), dec!(943.40));
        assert_eq!(status, LoanStatus::Behind);
    }

    #[test]
    fn test_exactly_expected_is_on_track() {
        assert_eq!(
            classify(dec!(2_830.20), dec!(2_830.20), dec!(943.40)),
            LoanStatus::OnTrack
        );
    }

    #[test]
    fn test_band_edges_are_on_track() {
        let upper = dec!(2_830.20) + dec!(94.34);
        let lower = dec!(2_830.20) - dec!(94.34);
        assert_eq!(classify(upper, dec!(2_830.20), dec!(943.40)), LoanStatus::OnTrack);
        assert_eq!(classify(lower, dec!(2_830.20), dec!(943.40)), LoanStatus::OnTrack);
    }

    #[test]
    fn test_just_outside_band() {
        let above = dec!(2_830.20) + dec!(94.35);
        let below = dec!(2_830.20) - dec!(94.35);
        assert_eq!(classify(above, dec!(2_830.20), dec!(943.40)), LoanStatus::Ahead);
        assert_eq!(classify(below, dec!(2_830.20), dec!(943.40)), LoanStatus::Behind);
    }

    #[test]
    fn test_nothing_due_nothing_paid() {
        assert_eq!(classify(dec!(0), dec!(0), dec!(945.60)), LoanStatus::OnTrack);
    }

    #[test]
    fn test_prepayment_in_first_month_is_ahead() {
        assert_eq!(classify(dec!(945.60), dec!(0), dec!(945.60)), LoanStatus::Ahead);
    }

    #[test]
    fn test_zero_tolerance_has_no_band() {
        assert_eq!(
            classify_with_tolerance(dec!(100.01), dec!(100), dec!(50), dec!(0)),
            LoanStatus::Ahead
        );
        assert_eq!(
            classify_with_tolerance(dec!(100), dec!(100), dec!(50), dec!(0)),
            LoanStatus::OnTrack
        );
    }

    #[test]
    fn test_classification_is_total() {
        let expected = dec!(1_000);
        let installment = dec!(200);
        let mut paid = dec!(-500);
        while paid <= dec!(2_500) {
            let status = classify(paid, expected, installment);
            let in_band = (paid - expected).abs() <= dec!(20);
            assert_eq!(status == LoanStatus::OnTrack, in_band, "paid = {paid}");
            paid += dec!(7.5);
        }
    }

    #[test]
    fn test_arrears() {
        assert_eq!(arrears(dec!(1_886.80), dec!(2_830.20)), dec!(943.40));
        assert_eq!(arrears(dec!(3_000), dec!(2_830.20)), Decimal::ZERO);
    }
}
