//! Field rules applied before anything is written to the book.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::records::{LoanUpdate, NewLoan, NewPayment, PaymentUpdate};
use crate::error::LoanTrackerError;
use crate::policy::TrackingPolicy;
use crate::types::{Money, RatePercent, CURRENCY_DP};
use crate::LoanTrackerResult;

pub fn validate_new_loan(
    loan: &NewLoan,
    today: NaiveDate,
    policy: &TrackingPolicy,
) -> LoanTrackerResult<()> {
    check_borrower_name(&loan.borrower_name, policy)?;
    check_amount("amount", loan.amount, policy)?;
    if let Some(rate) = loan.interest_rate {
        check_rate(rate, policy)?;
    }
    check_term(loan.repayment_period, policy)?;
    if let Some(start) = loan.start_date {
        if start < today {
            return Err(LoanTrackerError::invalid(
                "start_date",
                format!("Start date {start} is before today ({today})."),
            ));
        }
    }
    Ok(())
}

/// Updates may move the start date anywhere; other fields follow the
/// creation rules.
pub fn validate_loan_update(update: &LoanUpdate, policy: &TrackingPolicy) -> LoanTrackerResult<()> {
    if let Some(name) = &update.borrower_name {
        check_borrower_name(name, policy)?;
    }
    if let Some(amount) = update.amount {
        check_amount("amount", amount, policy)?;
    }
    if let Some(rate) = update.interest_rate {
        check_rate(rate, policy)?;
    }
    if let Some(term) = update.repayment_period {
        check_term(term, policy)?;
    }
    Ok(())
}

pub fn validate_new_payment(
    payment: &NewPayment,
    today: NaiveDate,
    policy: &TrackingPolicy,
) -> LoanTrackerResult<()> {
    check_amount("amount", payment.amount, policy)?;
    check_payment_date(payment.payment_date, today)?;
    if let Some(notes) = &payment.notes {
        check_notes(notes, policy)?;
    }
    Ok(())
}

pub fn validate_payment_update(
    update: &PaymentUpdate,
    today: NaiveDate,
    policy: &TrackingPolicy,
) -> LoanTrackerResult<()> {
    if let Some(amount) = update.amount {
        check_amount("amount", amount, policy)?;
    }
    if let Some(date) = update.payment_date {
        check_payment_date(date, today)?;
    }
    if let Some(notes) = &update.notes {
        check_notes(notes, policy)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

fn check_borrower_name(name: &str, policy: &TrackingPolicy) -> LoanTrackerResult<()> {
    if name.trim().is_empty() {
        return Err(LoanTrackerError::invalid(
            "borrower_name",
            "Borrower name is required.",
        ));
    }
    if name.chars().count() > policy.max_borrower_name_len {
        return Err(LoanTrackerError::invalid(
            "borrower_name",
            format!(
                "Borrower name may not exceed {} characters.",
                policy.max_borrower_name_len
            ),
        ));
    }
    Ok(())
}

fn check_amount(field: &str, amount: Money, policy: &TrackingPolicy) -> LoanTrackerResult<()> {
    if amount < policy.min_amount || amount > policy.max_amount {
        return Err(LoanTrackerError::invalid(
            field,
            format!(
                "Amount must lie between {} and {}.",
                policy.min_amount, policy.max_amount
            ),
        ));
    }
    if amount.normalize().scale() > CURRENCY_DP {
        return Err(LoanTrackerError::invalid(
            field,
            format!("Amount may carry at most {CURRENCY_DP} decimal places."),
        ));
    }
    Ok(())
}

fn check_rate(rate: RatePercent, policy: &TrackingPolicy) -> LoanTrackerResult<()> {
    if rate < Decimal::ZERO || rate > policy.max_rate_percent {
        return Err(LoanTrackerError::invalid(
            "interest_rate",
            format!(
                "Interest rate must lie between 0 and {}.",
                policy.max_rate_percent
            ),
        ));
    }
    Ok(())
}

fn check_term(term: u32, policy: &TrackingPolicy) -> LoanTrackerResult<()> {
    if term == 0 || term > policy.max_term_months {
        return Err(LoanTrackerError::invalid(
            "repayment_period",
            format!(
                "Repayment period must lie between 1 and {} months.",
                policy.max_term_months
            ),
        ));
    }
    Ok(())
}

fn check_payment_date(date: NaiveDate, today: NaiveDate) -> LoanTrackerResult<()> {
    if date > today {
        return Err(LoanTrackerError::invalid(
            "payment_date",
            format!("Payment date {date} is in the future."),
        ));
    }
    Ok(())
}

fn check_notes(notes: &str, policy: &TrackingPolicy) -> LoanTrackerResult<()> {
    if notes.chars().count() > policy.max_notes_len {
        return Err(LoanTrackerError::invalid(
            "notes",
            format!("Notes may not exceed {} characters.", policy.max_notes_len),
        ));
    }
    Ok(())
}
