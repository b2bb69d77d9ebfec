use napi::Result as NapiResult;
use napi_derive::napi;

use loan_tracker_core::book::LoanBook;
use loan_tracker_core::TrackingPolicy;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_installment(input_json: String) -> NapiResult<String> {
    let input: loan_tracker_core::amortization::installment::InstallmentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_tracker_core::amortization::installment::calculate_installment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: loan_tracker_core::amortization::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_tracker_core::amortization::schedule::build_schedule(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tracking
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_status(input_json: String) -> NapiResult<String> {
    let input: loan_tracker_core::tracking::LoanAssessmentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_tracker_core::tracking::assess_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Derived listing for every loan in a serialised loan book.
#[napi]
pub fn book_listings(book_json: String, as_of: String, policy_json: Option<String>) -> NapiResult<String> {
    let mut book: LoanBook = serde_json::from_str(&book_json).map_err(to_napi_error)?;
    if let Some(policy_json) = policy_json {
        let policy: TrackingPolicy = serde_json::from_str(&policy_json).map_err(to_napi_error)?;
        book.set_policy(policy).map_err(to_napi_error)?;
    }
    let as_of: chrono::NaiveDate = as_of.parse().map_err(to_napi_error)?;
    let listings = book.loan_listings(as_of).map_err(to_napi_error)?;
    serde_json::to_string(&listings).map_err(to_napi_error)
}
