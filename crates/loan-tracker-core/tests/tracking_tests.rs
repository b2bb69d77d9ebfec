use chrono::NaiveDate;
use loan_tracker_core::amortization::compute_monthly_installment;
use loan_tracker_core::tracking::{
    self, build_loan_view, classify, expected_paid, months_elapsed, remaining_balance,
};
use loan_tracker_core::{LoanStatus, LoanTerms, LoanTrackerError, Payment, TrackingPolicy};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ===========================================================================
// Installment
// ===========================================================================

#[test]
fn test_installment_reference_loans() {
    assert_eq!(
        compute_monthly_installment(dec!(10_000), dec!(2.00), 12).unwrap(),
        dec!(945.60)
    );
    assert_eq!(
        compute_monthly_installment(dec!(5_000), dec!(0), 6).unwrap(),
        dec!(833.33)
    );
}

#[test]
fn test_zero_rate_equals_principal_over_term() {
    for (principal, term) in [(dec!(1_200), 12u32), (dec!(999.99), 3), (dec!(50_000), 360)] {
        let installment = compute_monthly_installment(principal, Decimal::ZERO, term).unwrap();
        let exact = principal / Decimal::from(term);
        assert!(
            (installment - exact).abs() <= dec!(0.005),
            "{principal} over {term}: {installment} vs {exact}"
        );
    }
}

#[test]
fn test_installment_times_term_covers_principal() {
    // Annuity identity: term * installment = principal + interest, within
    // half a cent per period of rounding.
    for (principal, rate, term) in [
        (dec!(10_000), dec!(2), 12u32),
        (dec!(25_000), dec!(2), 24),
        (dec!(250_000), dec!(0.5), 360),
    ] {
        let installment = compute_monthly_installment(principal, rate, term).unwrap();
        let schedule_total = installment * Decimal::from(term);
        assert!(schedule_total > principal);

        // Discounting every installment at r recovers the principal.
        let r = rate / dec!(100);
        let mut discount = Decimal::ONE;
        let mut pv = Decimal::ZERO;
        for _ in 0..term {
            discount /= Decimal::ONE + r;
            pv += installment * discount;
        }
        let slack = dec!(0.005) * Decimal::from(term);
        assert!((pv - principal).abs() <= slack, "pv {pv} vs {principal}");
    }
}

#[test]
fn test_zero_term_is_invalid_input() {
    assert!(matches!(
        compute_monthly_installment(dec!(1_000), dec!(2), 0),
        Err(LoanTrackerError::InvalidInput { .. })
    ));
}

// ===========================================================================
// Elapsed time, expected paid, balance
// ===========================================================================

#[test]
fn test_months_elapsed_never_negative() {
    assert_eq!(months_elapsed(date(2030, 1, 1), date(2024, 1, 1)), 0);
    assert_eq!(months_elapsed(date(2024, 1, 1), date(2024, 1, 31)), 0);
    assert_eq!(months_elapsed(date(2024, 1, 1), date(2024, 2, 1)), 1);
}

#[test]
fn test_expected_paid_never_exceeds_principal() {
    for months in [0u32, 1, 6, 11, 12, 13, 120, 600] {
        let expected = expected_paid(months, dec!(945.60), dec!(10_000));
        assert!(expected <= dec!(10_000));
    }
}

#[test]
fn test_remaining_balance_is_clamped() {
    for paid in [dec!(0), dec!(5_000), dec!(10_000), dec!(12_000)] {
        let balance = remaining_balance(dec!(10_000), paid);
        assert!(balance >= Decimal::ZERO);
        assert_eq!(balance, (dec!(10_000) - paid).max(Decimal::ZERO));
    }
}

// ===========================================================================
// Status
// ===========================================================================

#[test]
fn test_three_months_two_payments_is_behind() {
    let expected = expected_paid(3, dec!(943.40), dec!(10_000));
    assert_eq!(expected, dec!(2_830.20));
    assert_eq!(classify(dec!(1_886.80), expected, dec!(943.40)), LoanStatus::Behind);
}

#[test]
fn test_paid_exactly_expected_is_on_track() {
    assert_eq!(
        classify(dec!(2_830.20), dec!(2_830.20), dec!(943.40)),
        LoanStatus::OnTrack
    );
}

#[test]
fn test_ahead_after_lump_sum() {
    assert_eq!(classify(dec!(5_000), dec!(2_830.20), dec!(943.40)), LoanStatus::Ahead);
}

// ===========================================================================
// Full view
// ===========================================================================

#[test]
fn test_view_for_seeded_loan() {
    // 10k at 2% over 12 months, started three months ago, two payments made.
    let terms = LoanTerms {
        principal: dec!(10_000),
        monthly_rate_percent: dec!(2.00),
        term_months: 12,
        start_date: date(2024, 3, 1),
    };
    let payments = vec![
        Payment { amount: dec!(943.40), payment_date: date(2024, 4, 1) },
        Payment { amount: dec!(943.40), payment_date: date(2024, 5, 1) },
    ];
    let view = build_loan_view(&terms, &payments, date(2024, 6, 1), &TrackingPolicy::default())
        .unwrap();

    assert_eq!(view.monthly_installment, dec!(945.60));
    assert_eq!(view.total_paid, dec!(1_886.80));
    assert_eq!(view.remaining_balance, dec!(8_113.20));
    assert_eq!(view.months_elapsed, 3);
    assert_eq!(view.expected_paid, dec!(2_836.80));
    assert_eq!(view.status, LoanStatus::Behind);
    assert_eq!(view.payments_count, 2);
}

#[test]
fn test_view_is_deterministic_for_fixed_date() {
    let terms = LoanTerms {
        principal: dec!(25_000),
        monthly_rate_percent: dec!(2.00),
        term_months: 24,
        start_date: date(2024, 1, 1),
    };
    let payments = vec![Payment { amount: dec!(1_313.32), payment_date: date(2024, 2, 1) }];
    let policy = TrackingPolicy::default();
    let a = build_loan_view(&terms, &payments, date(2024, 7, 1), &policy).unwrap();
    let b = build_loan_view(&terms, &payments, date(2024, 7, 1), &policy).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_view_status_serialises_with_wire_name() {
    let terms = LoanTerms {
        principal: dec!(5_000),
        monthly_rate_percent: dec!(2.00),
        term_months: 6,
        start_date: date(2024, 1, 1),
    };
    let view = tracking::build_loan_view(&terms, &[], date(2024, 1, 1), &TrackingPolicy::default())
        .unwrap();
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["status"], "On Track");
}
