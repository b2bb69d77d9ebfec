//! In-memory loan book: loan and payment records, the validation applied
//! when they are written, and read models built from the calculator.

pub mod ledger;
pub mod records;
pub mod validation;

pub use ledger::LoanBook;
pub use records::{
    LoanDetail, LoanListing, LoanRecord, LoanUpdate, NewLoan, NewPayment, PaymentRecord,
    PaymentUpdate,
};
