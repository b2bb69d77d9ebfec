//! Tunable limits and thresholds shared by the calculator and the loan book.
//!
//! Defaults reproduce the rules the loan desk has always applied: a ±10%
//! tolerance band, 2% per month when no rate is given, and terms of at most
//! 600 months.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanTrackerError;
use crate::types::{Money, Rate, RatePercent};
use crate::LoanTrackerResult;

pub const DEFAULT_TOLERANCE_FRACTION: Rate = dec!(0.10);
pub const DEFAULT_RATE_PERCENT: RatePercent = dec!(2.00);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingPolicy {
    /// Half-width of the on-track band, as a fraction of one installment.
    pub tolerance_fraction: Rate,
    /// Rate applied when a loan is created without one.
    pub default_rate_percent: RatePercent,
    pub max_rate_percent: RatePercent,
    /// Smallest accepted loan or payment amount.
    pub min_amount: Money,
    /// Largest accepted loan or payment amount.
    pub max_amount: Money,
    pub max_term_months: u32,
    pub max_borrower_name_len: usize,
    pub max_notes_len: usize,
}

impl Default for TrackingPolicy {
    fn default() -> Self {
        TrackingPolicy {
            tolerance_fraction: DEFAULT_TOLERANCE_FRACTION,
            default_rate_percent: DEFAULT_RATE_PERCENT,
            max_rate_percent: dec!(100),
            min_amount: dec!(0.01),
            max_amount: dec!(999_999_999.99),
            max_term_months: 600,
            max_borrower_name_len: 255,
            max_notes_len: 1000,
        }
    }
}

impl TrackingPolicy {
    /// Reject self-contradictory policies before they reach any calculation.
    pub fn validate(&self) -> LoanTrackerResult<()> {
        if self.tolerance_fraction < Decimal::ZERO {
            return Err(LoanTrackerError::invalid(
                "tolerance_fraction",
                "Tolerance cannot be negative.",
            ));
        }
        if self.max_rate_percent < Decimal::ZERO {
            return Err(LoanTrackerError::invalid(
                "max_rate_percent",
                "Maximum rate cannot be negative.",
            ));
        }
        if self.default_rate_percent < Decimal::ZERO
            || self.default_rate_percent > self.max_rate_percent
        {
            return Err(LoanTrackerError::invalid(
                "default_rate_percent",
                format!("Default rate must lie in [0, {}].", self.max_rate_percent),
            ));
        }
        if self.min_amount <= Decimal::ZERO || self.min_amount > self.max_amount {
            return Err(LoanTrackerError::invalid(
                "min_amount",
                "Minimum amount must be positive and not above the maximum.",
            ));
        }
        if self.max_term_months == 0 {
            return Err(LoanTrackerError::invalid(
                "max_term_months",
                "Maximum term must be at least one month.",
            ));
        }
        Ok(())
    }
}
