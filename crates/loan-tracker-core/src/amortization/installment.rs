//! Fixed monthly installment for a fully amortising loan.
//!
//! Rates arrive as percent per month. A zero rate repays principal in equal
//! slices; any positive rate uses the annuity formula
//! `P * r * (1+r)^n / ((1+r)^n - 1)`. Both branches are rounded to currency
//! precision so every installment is a payable amount.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanTrackerError;
use crate::policy::TrackingPolicy;
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, Rate, RatePercent};
use crate::LoanTrackerResult;

/// Terms longer than this were never offered through the desk UI.
const LONG_TERM_WARNING_MONTHS: u32 = 360;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentInput {
    pub principal: Money,
    /// Percent per month. Defaults to the policy's default rate when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rate_percent: Option<RatePercent>,
    pub term_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<TrackingPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentOutput {
    pub monthly_installment: Money,
    pub total_repayable: Money,
    pub total_interest: Money,
    /// `(1 + r)^12 - 1`, for comparison against annual quotes.
    pub effective_annual_rate: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepaymentTotals {
    pub total_repayable: Money,
    pub total_interest: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly installment that repays `principal` over `term_months` at
/// `monthly_rate_percent` per month.
///
/// A zero `term_months` is a caller error and is reported as
/// [`LoanTrackerError::InvalidInput`] rather than dividing by zero.
pub fn compute_monthly_installment(
    principal: Money,
    monthly_rate_percent: RatePercent,
    term_months: u32,
) -> LoanTrackerResult<Money> {
    if term_months == 0 {
        return Err(LoanTrackerError::invalid(
            "term_months",
            "Term must be at least one month.",
        ));
    }
    if principal <= Decimal::ZERO {
        return Err(LoanTrackerError::invalid(
            "principal",
            "Principal must be positive.",
        ));
    }
    if monthly_rate_percent < Decimal::ZERO {
        return Err(LoanTrackerError::invalid(
            "monthly_rate_percent",
            "Interest rate cannot be negative.",
        ));
    }

    if monthly_rate_percent.is_zero() {
        return Ok(round_currency(principal / Decimal::from(term_months)));
    }

    let r = monthly_rate_percent / dec!(100);
    let installment = match (Decimal::ONE + r).checked_powu(u64::from(term_months)) {
        Some(factor) => {
            let denom = factor - Decimal::ONE;
            if denom.is_zero() {
                return Err(LoanTrackerError::DivisionByZero {
                    context: "installment annuity factor".into(),
                });
            }
            // factor / (factor - 1) first keeps the product inside decimal range
            let ratio = factor / denom;
            principal
                .checked_mul(r)
                .and_then(|interest| interest.checked_mul(ratio))
                .ok_or_else(|| {
                    LoanTrackerError::invalid("principal", "Installment exceeds decimal range.")
                })?
        }
        // (1+r)^n beyond decimal range: factor / (factor - 1) has converged to 1
        None => principal.checked_mul(r).ok_or_else(|| {
            LoanTrackerError::invalid("principal", "Installment exceeds decimal range.")
        })?,
    };

    Ok(round_currency(installment))
}

/// Totals implied by paying `installment` for every month of the term.
///
/// Fails with [`LoanTrackerError::InvalidInput`] when the lifetime total does
/// not fit in a decimal.
pub fn repayment_totals(
    principal: Money,
    installment: Money,
    term_months: u32,
) -> LoanTrackerResult<RepaymentTotals> {
    let total_repayable = installment
        .checked_mul(Decimal::from(term_months))
        .ok_or_else(|| {
            LoanTrackerError::invalid("principal", "Total repayable exceeds decimal range.")
        })?;
    let total_interest = total_repayable.checked_sub(principal).ok_or_else(|| {
        LoanTrackerError::invalid("principal", "Total interest exceeds decimal range.")
    })?;
    Ok(RepaymentTotals {
        total_repayable,
        total_interest,
    })
}

/// Installment plus lifetime totals, wrapped with computation metadata.
pub fn calculate_installment(
    input: &InstallmentInput,
) -> LoanTrackerResult<ComputationOutput<InstallmentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let policy = input.policy.clone().unwrap_or_default();
    policy.validate()?;

    let rate_percent = input
        .monthly_rate_percent
        .unwrap_or(policy.default_rate_percent);
    let monthly_installment =
        compute_monthly_installment(input.principal, rate_percent, input.term_months)?;
    let totals = repayment_totals(input.principal, monthly_installment, input.term_months)?;

    if input.term_months > LONG_TERM_WARNING_MONTHS {
        warnings.push(format!(
            "Term of {} months exceeds the usual {} month maximum.",
            input.term_months, LONG_TERM_WARNING_MONTHS
        ));
    }
    if input.monthly_rate_percent.is_none() {
        warnings.push(format!(
            "No rate given; assumed {rate_percent}% per month."
        ));
    }

    let r = rate_percent / dec!(100);
    let effective_annual_rate = (Decimal::ONE + r)
        .checked_powu(12)
        .map(|f| f - Decimal::ONE)
        .unwrap_or(Decimal::MAX);

    let output = InstallmentOutput {
        monthly_installment,
        total_repayable: totals.total_repayable,
        total_interest: totals.total_interest,
        effective_annual_rate,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "monthly_rate_percent": rate_percent.to_string(),
        "rounding": "2dp, half away from zero",
    });

    Ok(with_metadata(
        "Level-payment amortisation (annuity formula)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}
