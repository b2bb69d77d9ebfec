pub mod elapsed;
pub mod expected;
pub mod status;
pub mod view;

pub use elapsed::months_elapsed;
pub use expected::{expected_paid, remaining_balance, total_paid};
pub use status::{arrears, classify, classify_with_tolerance};
pub use view::{assess_loan, build_loan_view, LoanAssessmentInput, LoanView};
