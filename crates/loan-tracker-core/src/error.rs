use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanTrackerError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: u64 },

    #[error("Payment amount {amount} exceeds remaining balance {remaining_balance}")]
    PaymentExceedsBalance {
        amount: Decimal,
        remaining_balance: Decimal,
    },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanTrackerError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanTrackerError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity: &str, id: u64) -> Self {
        LoanTrackerError::NotFound {
            entity: entity.into(),
            id,
        }
    }
}

impl From<serde_json::Error> for LoanTrackerError {
    fn from(e: serde_json::Error) -> Self {
        LoanTrackerError::SerializationError(e.to_string())
    }
}
