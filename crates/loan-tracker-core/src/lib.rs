pub mod amortization;
pub mod error;
pub mod policy;
pub mod types;

#[cfg(feature = "tracking")]
pub mod tracking;

#[cfg(feature = "book")]
pub mod book;

pub use error::LoanTrackerError;
pub use policy::TrackingPolicy;
pub use types::*;

/// Standard result type for all loan-tracker operations
pub type LoanTrackerResult<T> = Result<T, LoanTrackerError>;
