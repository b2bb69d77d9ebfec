//! Period-by-period amortisation table.
//!
//! Interest each month is charged on the opening balance and rounded to
//! currency precision; the rest of the installment retires principal. The
//! last row absorbs accumulated rounding so the closing balance is zero.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::installment::compute_monthly_installment;
use crate::error::LoanTrackerError;
use crate::policy::TrackingPolicy;
use crate::types::{round_currency, with_metadata, ComputationOutput, Money, RatePercent};
use crate::LoanTrackerResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub principal: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rate_percent: Option<RatePercent>,
    pub term_months: u32,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<TrackingPolicy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub period: u32,
    pub due_date: NaiveDate,
    pub installment: Money,
    pub interest: Money,
    pub principal: Money,
    /// Balance outstanding after this installment.
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub monthly_installment: Money,
    pub rows: Vec<ScheduleRow>,
    pub total_paid: Money,
    pub total_interest: Money,
}

/// Build the full repayment table for a loan starting on `start_date`.
pub fn amortization_schedule(
    principal: Money,
    monthly_rate_percent: RatePercent,
    term_months: u32,
    start_date: NaiveDate,
) -> LoanTrackerResult<Vec<ScheduleRow>> {
    let installment = compute_monthly_installment(principal, monthly_rate_percent, term_months)?;
    let r = monthly_rate_percent / dec!(100);

    let mut rows = Vec::with_capacity(term_months as usize);
    let mut balance = principal;

    for period in 1..=term_months {
        let due_date = start_date
            .checked_add_months(Months::new(period))
            .ok_or_else(|| {
                LoanTrackerError::DateError(format!(
                    "Due date for period {period} is out of range"
                ))
            })?;

        let interest = round_currency(balance * r);
        let mut principal_part = installment - interest;
        if period == term_months || principal_part > balance {
            principal_part = balance;
        }
        let paid = principal_part + interest;
        balance -= principal_part;

        rows.push(ScheduleRow {
            period,
            due_date,
            installment: paid,
            interest,
            principal: principal_part,
            balance,
        });

        if balance.is_zero() {
            break;
        }
    }

    Ok(rows)
}

/// Amortisation table plus totals, wrapped with computation metadata.
pub fn build_schedule(input: &ScheduleInput) -> LoanTrackerResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let policy = input.policy.clone().unwrap_or_default();
    policy.validate()?;

    let rate_percent = input
        .monthly_rate_percent
        .unwrap_or(policy.default_rate_percent);
    let monthly_installment =
        compute_monthly_installment(input.principal, rate_percent, input.term_months)?;
    let rows = amortization_schedule(
        input.principal,
        rate_percent,
        input.term_months,
        input.start_date,
    )?;

    let total_paid = column_total(&rows, |r| r.installment)?;
    let total_interest = column_total(&rows, |r| r.interest)?;

    if let Some(last) = rows.last() {
        let residue = last.installment - monthly_installment;
        if !residue.is_zero() {
            warnings.push(format!(
                "Final installment adjusted by {residue} to clear rounding."
            ));
        }
        if (rows.len() as u32) < input.term_months {
            warnings.push(format!(
                "Loan clears after {} of {} months.",
                rows.len(),
                input.term_months
            ));
        }
    }

    let output = ScheduleOutput {
        monthly_installment,
        rows,
        total_paid,
        total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "monthly_rate_percent": rate_percent.to_string(),
        "interest_basis": "opening balance, rounded monthly",
        "first_due": "one month after start date",
    });

    Ok(with_metadata(
        "Amortisation schedule (level payment, final-period true-up)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

fn column_total(rows: &[ScheduleRow], column: fn(&ScheduleRow) -> Money) -> LoanTrackerResult<Money> {
    rows.iter().try_fold(Decimal::ZERO, |sum, row| {
        sum.checked_add(column(row)).ok_or_else(|| {
            LoanTrackerError::invalid("principal", "Schedule total exceeds decimal range.")
        })
    })
}

impl ScheduleOutput {
    pub fn is_fully_amortised(&self) -> bool {
        self.rows
            .last()
            .map(|r| r.balance == Decimal::ZERO)
            .unwrap_or(false)
    }
}
