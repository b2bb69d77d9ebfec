use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::tracking::LoanView;
use crate::types::{LoanTerms, Money, Payment, RatePercent};

/// A stored loan. Field names follow the loan desk's wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: u64,
    pub borrower_name: String,
    /// Principal.
    pub amount: Money,
    /// Percent per month.
    pub interest_rate: RatePercent,
    /// Term in months.
    pub repayment_period: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl LoanRecord {
    /// Calculator terms. Loans without a start date run from creation.
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.amount,
            monthly_rate_percent: self.interest_rate,
            term_months: self.repayment_period,
            start_date: self.start_date.unwrap_or_else(|| self.created_at.date()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: u64,
    pub loan_id: u64,
    pub amount: Money,
    pub payment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PaymentRecord {
    pub fn as_payment(&self) -> Payment {
        Payment {
            amount: self.amount,
            payment_date: self.payment_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLoan {
    pub borrower_name: String,
    pub amount: Money,
    #[serde(default)]
    pub interest_rate: Option<RatePercent>,
    pub repayment_period: u32,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// Partial loan update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanUpdate {
    #[serde(default)]
    pub borrower_name: Option<String>,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub interest_rate: Option<RatePercent>,
    #[serde(default)]
    pub repayment_period: Option<u32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: Money,
    pub payment_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial payment update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentUpdate {
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One loan with its derived figures and full payment history, most recent
/// payment first.
#[derive(Debug, Clone, Serialize)]
pub struct LoanDetail {
    #[serde(flatten)]
    pub loan: LoanRecord,
    #[serde(flatten)]
    pub view: LoanView,
    pub payments: Vec<PaymentRecord>,
}

/// One row of the loan list.
#[derive(Debug, Clone, Serialize)]
pub struct LoanListing {
    #[serde(flatten)]
    pub loan: LoanRecord,
    #[serde(flatten)]
    pub view: LoanView,
}
