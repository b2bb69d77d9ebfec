use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::records::{
    LoanDetail, LoanListing, LoanRecord, LoanUpdate, NewLoan, NewPayment, PaymentRecord,
    PaymentUpdate,
};
use super::validation::{
    validate_loan_update, validate_new_loan, validate_new_payment, validate_payment_update,
};
use crate::error::LoanTrackerError;
use crate::policy::TrackingPolicy;
use crate::tracking::{build_loan_view, remaining_balance, LoanView};
use crate::types::{Money, Payment};
use crate::LoanTrackerResult;

/// Loans and their payments, keyed by id. Deleting a loan deletes its
/// payments. All timestamps are supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanBook {
    loans: BTreeMap<u64, LoanRecord>,
    payments: BTreeMap<u64, PaymentRecord>,
    next_loan_id: u64,
    next_payment_id: u64,
    #[serde(skip)]
    policy: TrackingPolicy,
}

impl LoanBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: TrackingPolicy) -> LoanTrackerResult<Self> {
        policy.validate()?;
        Ok(LoanBook {
            policy,
            ..LoanBook::default()
        })
    }

    pub fn policy(&self) -> &TrackingPolicy {
        &self.policy
    }

    /// Swap the policy, e.g. after loading a persisted book.
    pub fn set_policy(&mut self, policy: TrackingPolicy) -> LoanTrackerResult<()> {
        policy.validate()?;
        self.policy = policy;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Loans
    // -----------------------------------------------------------------------

    pub fn create_loan(&mut self, new: NewLoan, now: NaiveDateTime) -> LoanTrackerResult<LoanRecord> {
        validate_new_loan(&new, now.date(), &self.policy)?;

        self.next_loan_id += 1;
        let loan = LoanRecord {
            id: self.next_loan_id,
            borrower_name: new.borrower_name.trim().to_string(),
            amount: new.amount,
            interest_rate: new.interest_rate.unwrap_or(self.policy.default_rate_percent),
            repayment_period: new.repayment_period,
            start_date: Some(new.start_date.unwrap_or_else(|| now.date())),
            created_at: now,
            updated_at: now,
        };
        info!(loan_id = loan.id, amount = %loan.amount, "loan created");
        self.loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    /// Amend a loan. The principal cannot drop below what has already been
    /// paid towards it.
    pub fn update_loan(
        &mut self,
        id: u64,
        update: LoanUpdate,
        now: NaiveDateTime,
    ) -> LoanTrackerResult<LoanRecord> {
        self.loan(id)?;
        validate_loan_update(&update, &self.policy)?;

        if let Some(amount) = update.amount {
            let paid = self.paid_towards(id, None);
            if amount < paid {
                warn!(loan_id = id, amount = %amount, total_paid = %paid, "loan update rejected");
                return Err(LoanTrackerError::invalid(
                    "amount",
                    format!("Amount cannot be lowered below the {paid} already paid."),
                ));
            }
        }

        let loan = self
            .loans
            .get_mut(&id)
            .ok_or_else(|| LoanTrackerError::not_found("Loan", id))?;

        if let Some(name) = update.borrower_name {
            loan.borrower_name = name.trim().to_string();
        }
        if let Some(amount) = update.amount {
            loan.amount = amount;
        }
        if let Some(rate) = update.interest_rate {
            loan.interest_rate = rate;
        }
        if let Some(term) = update.repayment_period {
            loan.repayment_period = term;
        }
        if let Some(start) = update.start_date {
            loan.start_date = Some(start);
        }
        loan.updated_at = now;

        info!(loan_id = id, "loan updated");
        Ok(loan.clone())
    }

    pub fn delete_loan(&mut self, id: u64) -> LoanTrackerResult<LoanRecord> {
        let loan = self
            .loans
            .remove(&id)
            .ok_or_else(|| LoanTrackerError::not_found("Loan", id))?;
        let before = self.payments.len();
        self.payments.retain(|_, p| p.loan_id != id);
        info!(
            loan_id = id,
            payments_removed = before - self.payments.len(),
            "loan deleted"
        );
        Ok(loan)
    }

    pub fn loan(&self, id: u64) -> LoanTrackerResult<&LoanRecord> {
        self.loans
            .get(&id)
            .ok_or_else(|| LoanTrackerError::not_found("Loan", id))
    }

    /// All loans, newest first.
    pub fn loans(&self) -> Vec<&LoanRecord> {
        let mut loans: Vec<&LoanRecord> = self.loans.values().collect();
        loans.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        loans
    }

    // -----------------------------------------------------------------------
    // Payments
    // -----------------------------------------------------------------------

    /// Record a payment. Rejected when it exceeds the loan's remaining
    /// balance.
    pub fn add_payment(
        &mut self,
        loan_id: u64,
        new: NewPayment,
        now: NaiveDateTime,
    ) -> LoanTrackerResult<PaymentRecord> {
        let principal = self.loan(loan_id)?.amount;
        validate_new_payment(&new, now.date(), &self.policy)?;

        let remaining = remaining_balance(principal, self.paid_towards(loan_id, None));
        if new.amount > remaining {
            warn!(loan_id, amount = %new.amount, remaining_balance = %remaining, "payment rejected");
            return Err(LoanTrackerError::PaymentExceedsBalance {
                amount: new.amount,
                remaining_balance: remaining,
            });
        }

        self.next_payment_id += 1;
        let payment = PaymentRecord {
            id: self.next_payment_id,
            loan_id,
            amount: new.amount,
            payment_date: new.payment_date,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        info!(loan_id, payment_id = payment.id, amount = %payment.amount, "payment recorded");
        self.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    /// Amend a payment. A new amount is checked against the balance as it
    /// stood without this payment.
    pub fn update_payment(
        &mut self,
        loan_id: u64,
        payment_id: u64,
        update: PaymentUpdate,
        now: NaiveDateTime,
    ) -> LoanTrackerResult<PaymentRecord> {
        let principal = self.loan(loan_id)?.amount;
        self.payment(loan_id, payment_id)?;
        validate_payment_update(&update, now.date(), &self.policy)?;

        if let Some(amount) = update.amount {
            let remaining =
                remaining_balance(principal, self.paid_towards(loan_id, Some(payment_id)));
            if amount > remaining {
                warn!(loan_id, payment_id, amount = %amount, remaining_balance = %remaining, "payment update rejected");
                return Err(LoanTrackerError::PaymentExceedsBalance {
                    amount,
                    remaining_balance: remaining,
                });
            }
        }

        let payment = self
            .payments
            .get_mut(&payment_id)
            .ok_or_else(|| LoanTrackerError::not_found("Payment", payment_id))?;
        if let Some(amount) = update.amount {
            payment.amount = amount;
        }
        if let Some(date) = update.payment_date {
            payment.payment_date = date;
        }
        if let Some(notes) = update.notes {
            payment.notes = Some(notes);
        }
        payment.updated_at = now;

        info!(loan_id, payment_id, "payment updated");
        Ok(payment.clone())
    }

    pub fn delete_payment(&mut self, loan_id: u64, payment_id: u64) -> LoanTrackerResult<PaymentRecord> {
        self.payment(loan_id, payment_id)?;
        let payment = self
            .payments
            .remove(&payment_id)
            .ok_or_else(|| LoanTrackerError::not_found("Payment", payment_id))?;
        info!(loan_id, payment_id, "payment deleted");
        Ok(payment)
    }

    /// A payment, only if it belongs to `loan_id`.
    pub fn payment(&self, loan_id: u64, payment_id: u64) -> LoanTrackerResult<&PaymentRecord> {
        self.payments
            .get(&payment_id)
            .filter(|p| p.loan_id == loan_id)
            .ok_or_else(|| LoanTrackerError::not_found("Payment", payment_id))
    }

    /// Payments for one loan, most recent payment date first.
    pub fn payments(&self, loan_id: u64) -> LoanTrackerResult<Vec<&PaymentRecord>> {
        self.loan(loan_id)?;
        let mut payments: Vec<&PaymentRecord> = self
            .payments
            .values()
            .filter(|p| p.loan_id == loan_id)
            .collect();
        payments.sort_by(|a, b| {
            b.payment_date
                .cmp(&a.payment_date)
                .then(b.id.cmp(&a.id))
        });
        Ok(payments)
    }

    // -----------------------------------------------------------------------
    // Read models
    // -----------------------------------------------------------------------

    pub fn loan_view(&self, loan_id: u64, as_of: NaiveDate) -> LoanTrackerResult<LoanView> {
        let loan = self.loan(loan_id)?;
        let history: Vec<Payment> = self
            .payments(loan_id)?
            .into_iter()
            .map(PaymentRecord::as_payment)
            .collect();
        build_loan_view(&loan.terms(), &history, as_of, &self.policy)
    }

    pub fn loan_detail(&self, loan_id: u64, as_of: NaiveDate) -> LoanTrackerResult<LoanDetail> {
        Ok(LoanDetail {
            loan: self.loan(loan_id)?.clone(),
            view: self.loan_view(loan_id, as_of)?,
            payments: self.payments(loan_id)?.into_iter().cloned().collect(),
        })
    }

    pub fn loan_listings(&self, as_of: NaiveDate) -> LoanTrackerResult<Vec<LoanListing>> {
        self.loans()
            .into_iter()
            .map(|loan| {
                Ok(LoanListing {
                    loan: loan.clone(),
                    view: self.loan_view(loan.id, as_of)?,
                })
            })
            .collect()
    }

    fn paid_towards(&self, loan_id: u64, excluding: Option<u64>) -> Money {
        self.payments
            .values()
            .filter(|p| p.loan_id == loan_id && Some(p.id) != excluding)
            .map(|p| p.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn new_loan(name: &str) -> NewLoan {
        NewLoan {
            borrower_name: name.into(),
            amount: dec!(1_000),
            interest_rate: None,
            repayment_period: 6,
            start_date: None,
        }
    }

    #[test]
    fn test_create_applies_defaults() {
        let mut book = LoanBook::new();
        let loan = book.create_loan(new_loan("  Jane Smith "), at(2024, 1, 5)).unwrap();
        assert_eq!(loan.id, 1);
        assert_eq!(loan.borrower_name, "Jane Smith");
        assert_eq!(loan.interest_rate, dec!(2.00));
        assert_eq!(loan.start_date, NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn test_payment_over_remaining_balance_rejected() {
        let mut book = LoanBook::new();
        let loan = book.create_loan(new_loan("A"), at(2024, 1, 1)).unwrap();
        let pay = |amount| NewPayment {
            amount,
            payment_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            notes: None,
        };
        book.add_payment(loan.id, pay(dec!(600)), at(2024, 2, 1)).unwrap();
        let err = book
            .add_payment(loan.id, pay(dec!(400.01)), at(2024, 2, 1))
            .unwrap_err();
        match err {
            LoanTrackerError::PaymentExceedsBalance {
                remaining_balance, ..
            } => assert_eq!(remaining_balance, dec!(400)),
            other => panic!("Expected PaymentExceedsBalance, got {other:?}"),
        }
        book.add_payment(loan.id, pay(dec!(400)), at(2024, 2, 1)).unwrap();
    }

    #[test]
    fn test_update_payment_ignores_its_own_amount() {
        let mut book = LoanBook::new();
        let loan = book.create_loan(new_loan("A"), at(2024, 1, 1)).unwrap();
        let p = book
            .add_payment(
                loan.id,
                NewPayment {
                    amount: dec!(900),
                    payment_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
                    notes: None,
                },
                at(2024, 2, 1),
            )
            .unwrap();
        let update = PaymentUpdate {
            amount: Some(dec!(1_000)),
            ..PaymentUpdate::default()
        };
        let updated = book.update_payment(loan.id, p.id, update, at(2024, 2, 2)).unwrap();
        assert_eq!(updated.amount, dec!(1_000));

        let too_much = PaymentUpdate {
            amount: Some(dec!(1_000.01)),
            ..PaymentUpdate::default()
        };
        assert!(book.update_payment(loan.id, p.id, too_much, at(2024, 2, 2)).is_err());
    }

    #[test]
    fn test_payment_under_wrong_loan_not_found() {
        let mut book = LoanBook::new();
        let a = book.create_loan(new_loan("A"), at(2024, 1, 1)).unwrap();
        let b = book.create_loan(new_loan("B"), at(2024, 1, 1)).unwrap();
        let p = book
            .add_payment(
                a.id,
                NewPayment {
                    amount: dec!(10),
                    payment_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    notes: None,
                },
                at(2024, 1, 1),
            )
            .unwrap();
        assert!(matches!(
            book.payment(b.id, p.id),
            Err(LoanTrackerError::NotFound { .. })
        ));
        assert!(book.delete_payment(b.id, p.id).is_err());
        assert!(book.payment(a.id, p.id).is_ok());
    }

    #[test]
    fn test_missing_loan_not_found() {
        let mut book = LoanBook::new();
        assert!(matches!(book.loan(42), Err(LoanTrackerError::NotFound { id: 42, .. })));
        assert!(book.delete_loan(42).is_err());
        assert!(book.update_loan(42, LoanUpdate::default(), at(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_update_missing_loan_reports_not_found_before_validation() {
        let mut book = LoanBook::new();
        let bad = LoanUpdate {
            repayment_period: Some(0),
            ..LoanUpdate::default()
        };
        assert!(matches!(
            book.update_loan(42, bad, at(2024, 1, 1)),
            Err(LoanTrackerError::NotFound { id: 42, .. })
        ));
    }

    #[test]
    fn test_update_cannot_lower_amount_below_paid() {
        let mut book = LoanBook::new();
        let loan = book.create_loan(new_loan("A"), at(2024, 1, 1)).unwrap();
        book.add_payment(
            loan.id,
            NewPayment {
                amount: dec!(600),
                payment_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                notes: None,
            },
            at(2024, 2, 1),
        )
        .unwrap();

        let lower = |amount| LoanUpdate {
            amount: Some(amount),
            ..LoanUpdate::default()
        };
        let err = book
            .update_loan(loan.id, lower(dec!(599.99)), at(2024, 2, 2))
            .unwrap_err();
        match err {
            LoanTrackerError::InvalidInput { field, .. } => assert_eq!(field, "amount"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
        assert_eq!(book.loan(loan.id).unwrap().amount, dec!(1_000));

        let settled = book
            .update_loan(loan.id, lower(dec!(600)), at(2024, 2, 2))
            .unwrap();
        assert_eq!(settled.amount, dec!(600));
    }
}
