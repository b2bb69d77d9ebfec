pub mod amortization;
pub mod book;
pub mod tracking;
