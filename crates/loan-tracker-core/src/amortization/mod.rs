pub mod installment;

#[cfg(feature = "schedule")]
pub mod schedule;

pub use installment::{compute_monthly_installment, repayment_totals, RepaymentTotals};
