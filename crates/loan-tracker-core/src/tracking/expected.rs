use rust_decimal::Decimal;

use crate::error::LoanTrackerError;
use crate::types::{Money, Payment};
use crate::LoanTrackerResult;

/// Sum of every payment amount. Order does not matter.
pub fn total_paid(payments: &[Payment]) -> LoanTrackerResult<Money> {
    payments.iter().try_fold(Decimal::ZERO, |sum, p| {
        sum.checked_add(p.amount).ok_or_else(|| {
            LoanTrackerError::invalid("payments", "Payment total exceeds decimal range.")
        })
    })
}

/// Principal still owed, never below zero.
pub fn remaining_balance(principal: Money, total_paid: Money) -> Money {
    principal.saturating_sub(total_paid).max(Decimal::ZERO)
}

/// Cumulative amount a borrower on schedule would have paid after
/// `months_elapsed` months, capped at the original principal.
///
/// A product past the decimal range is above any principal, so it saturates
/// into the cap.
pub fn expected_paid(months_elapsed: u32, monthly_installment: Money, principal: Money) -> Money {
    Decimal::from(months_elapsed)
        .saturating_mul(monthly_installment)
        .min(principal)
}
