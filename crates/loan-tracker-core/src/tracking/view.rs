//! Read-model projection: loan terms + payment history + evaluation date
//! in, every derived repayment figure out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::elapsed::months_elapsed;
use super::expected::{expected_paid, remaining_balance, total_paid};
use super::status::{arrears, classify_with_tolerance};
use crate::amortization::{compute_monthly_installment, repayment_totals};
use crate::policy::TrackingPolicy;
use crate::types::{with_metadata, ComputationOutput, LoanStatus, LoanTerms, Money, Payment};
use crate::LoanTrackerResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAssessmentInput {
    pub terms: LoanTerms,
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Evaluation date. Elapsed time is measured up to this day.
    pub as_of: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<TrackingPolicy>,
}

/// Derived repayment figures for one loan at one evaluation date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanView {
    pub monthly_installment: Money,
    pub total_paid: Money,
    pub remaining_balance: Money,
    pub months_elapsed: u32,
    pub expected_paid: Money,
    pub status: LoanStatus,
    /// Amount by which payments trail the expected curve.
    pub arrears: Money,
    pub payments_count: usize,
    pub total_repayable: Money,
    pub total_interest: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project `terms` and `payments` onto the derived figures as of `as_of`.
pub fn build_loan_view(
    terms: &LoanTerms,
    payments: &[Payment],
    as_of: NaiveDate,
    policy: &TrackingPolicy,
) -> LoanTrackerResult<LoanView> {
    let monthly_installment = compute_monthly_installment(
        terms.principal,
        terms.monthly_rate_percent,
        terms.term_months,
    )?;
    let paid = total_paid(payments)?;
    let elapsed = months_elapsed(terms.start_date, as_of);
    let expected = expected_paid(elapsed, monthly_installment, terms.principal);
    let status = classify_with_tolerance(
        paid,
        expected,
        monthly_installment,
        policy.tolerance_fraction,
    );
    let totals = repayment_totals(terms.principal, monthly_installment, terms.term_months)?;

    debug!(
        %monthly_installment,
        total_paid = %paid,
        months_elapsed = elapsed,
        expected_paid = %expected,
        %status,
        "loan view built"
    );

    Ok(LoanView {
        monthly_installment,
        total_paid: paid,
        remaining_balance: remaining_balance(terms.principal, paid),
        months_elapsed: elapsed,
        expected_paid: expected,
        status,
        arrears: arrears(paid, expected),
        payments_count: payments.len(),
        total_repayable: totals.total_repayable,
        total_interest: totals.total_interest,
    })
}

/// Loan view wrapped with computation metadata, flagging inconsistent history.
pub fn assess_loan(
    input: &LoanAssessmentInput,
) -> LoanTrackerResult<ComputationOutput<LoanView>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let policy = input.policy.clone().unwrap_or_default();
    policy.validate()?;

    let view = build_loan_view(&input.terms, &input.payments, input.as_of, &policy)?;

    for p in &input.payments {
        if p.payment_date > input.as_of {
            warnings.push(format!(
                "Payment of {} dated {} is after the evaluation date.",
                p.amount, p.payment_date
            ));
        }
        if p.payment_date < input.terms.start_date {
            warnings.push(format!(
                "Payment of {} dated {} predates the loan start.",
                p.amount, p.payment_date
            ));
        }
    }
    if view.total_paid > input.terms.principal {
        warnings.push(format!(
            "Payments total {} against a principal of {}.",
            view.total_paid, input.terms.principal
        ));
    }
    if view.months_elapsed > input.terms.term_months {
        warnings.push(format!(
            "Term ended {} months ago; expected paid is capped at principal.",
            view.months_elapsed - input.terms.term_months
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "as_of": input.as_of.to_string(),
        "tolerance_fraction": policy.tolerance_fraction.to_string(),
        "expected_paid_cap": "principal",
    });

    Ok(with_metadata(
        "Repayment status against level-installment schedule",
        &assumptions,
        warnings,
        elapsed,
        view,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn terms() -> LoanTerms {
        LoanTerms {
            principal: dec!(10_000),
            monthly_rate_percent: dec!(2.00),
            term_months: 12,
            start_date: date(2024, 1, 10),
        }
    }

    #[test]
    fn test_view_on_fresh_loan() {
        let view = build_loan_view(&terms(), &[], date(2024, 1, 10), &TrackingPolicy::default())
            .unwrap();
        assert_eq!(
            view,
            LoanView {
                monthly_installment: dec!(945.60),
                total_paid: Decimal::ZERO,
                remaining_balance: dec!(10_000),
                months_elapsed: 0,
                expected_paid: Decimal::ZERO,
                status: LoanStatus::OnTrack,
                arrears: Decimal::ZERO,
                payments_count: 0,
                total_repayable: dec!(11_347.20),
                total_interest: dec!(1_347.20),
            }
        );
    }

    #[test]
    fn test_view_behind_after_missed_month() {
        let payments = vec![
            Payment { amount: dec!(945.60), payment_date: date(2024, 2, 10) },
            Payment { amount: dec!(945.60), payment_date: date(2024, 3, 10) },
        ];
        let view = build_loan_view(&terms(), &payments, date(2024, 4, 12), &TrackingPolicy::default())
            .unwrap();
        assert_eq!(view.months_elapsed, 3);
        assert_eq!(view.expected_paid, dec!(2_836.80));
        assert_eq!(view.total_paid, dec!(1_891.20));
        assert_eq!(view.remaining_balance, dec!(8_108.80));
        assert_eq!(view.status, LoanStatus::Behind);
        assert_eq!(view.arrears, dec!(945.60));
    }

    #[test]
    fn test_wider_policy_band_keeps_loan_on_track() {
        let payments = vec![Payment { amount: dec!(500), payment_date: date(2024, 2, 10) }];
        let policy = TrackingPolicy {
            tolerance_fraction: dec!(0.5),
            ..TrackingPolicy::default()
        };
        let view = build_loan_view(&terms(), &payments, date(2024, 2, 10), &policy).unwrap();
        // expected 945.60, band ±472.80
        assert_eq!(view.status, LoanStatus::OnTrack);
    }

    #[test]
    fn test_assess_warns_on_future_payment_and_ended_term() {
        let input = LoanAssessmentInput {
            terms: terms(),
            payments: vec![Payment { amount: dec!(100), payment_date: date(2026, 1, 1) }],
            as_of: date(2025, 6, 10),
            policy: None,
        };
        let out = assess_loan(&input).unwrap();
        assert_eq!(out.result.expected_paid, dec!(10_000));
        assert_eq!(out.result.status, LoanStatus::Behind);
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_principal_near_decimal_max_is_error_not_panic() {
        let terms = LoanTerms {
            principal: Decimal::MAX / dec!(1.05),
            monthly_rate_percent: dec!(2),
            term_months: 12,
            start_date: date(2024, 1, 1),
        };
        let err = build_loan_view(&terms, &[], date(2026, 1, 1), &TrackingPolicy::default())
            .unwrap_err();
        match err {
            crate::LoanTrackerError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        let input = LoanAssessmentInput {
            terms,
            payments: vec![],
            as_of: date(2026, 1, 1),
            policy: None,
        };
        assert!(assess_loan(&input).is_err());
    }

    #[test]
    fn test_assess_rejects_invalid_policy() {
        let input = LoanAssessmentInput {
            terms: terms(),
            payments: vec![],
            as_of: date(2024, 2, 1),
            policy: Some(TrackingPolicy {
                tolerance_fraction: dec!(-1),
                ..TrackingPolicy::default()
            }),
        };
        assert!(assess_loan(&input).is_err());
    }

    #[test]
    fn test_assess_input_from_json() {
        let json = r#"{
            "terms": {
                "principal": "5000",
                "monthly_rate_percent": "0",
                "term_months": 6,
                "start_date": "2024-01-01"
            },
            "payments": [{"amount": "833.33", "payment_date": "2024-02-01"}],
            "as_of": "2024-02-15"
        }"#;
        let input: LoanAssessmentInput = serde_json::from_str(json).unwrap();
        let out = assess_loan(&input).unwrap();
        assert_eq!(out.result.monthly_installment, dec!(833.33));
        assert_eq!(out.result.status, LoanStatus::OnTrack);
        assert!(out.warnings.is_empty());
    }
}
