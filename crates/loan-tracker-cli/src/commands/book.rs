use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};

use loan_tracker_core::book::{LoanBook, LoanUpdate, NewLoan, NewPayment, PaymentUpdate};

use crate::config::Context;
use crate::input;

/// Location of the loan book document
#[derive(Args)]
pub struct BookArgs {
    /// Loan book file; created on first write
    #[arg(long, default_value = "loans.json")]
    pub book: String,
}

#[derive(Subcommand)]
pub enum LoanCommand {
    /// Create a loan
    Create {
        #[command(flatten)]
        book: BookArgs,
        /// Borrower's name
        #[arg(long)]
        borrower: String,
        /// Principal
        #[arg(long)]
        amount: Decimal,
        /// Interest rate, percent per month (policy default when omitted)
        #[arg(long)]
        rate: Option<Decimal>,
        /// Term in months
        #[arg(long)]
        term: u32,
        /// Start date, today or later (default: today)
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
    /// List loans with their repayment status, newest first
    List {
        #[command(flatten)]
        book: BookArgs,
    },
    /// Show one loan with derived figures and payment history
    Show {
        #[command(flatten)]
        book: BookArgs,
        id: u64,
    },
    /// Update a loan's terms or borrower
    Update {
        #[command(flatten)]
        book: BookArgs,
        id: u64,
        #[arg(long)]
        borrower: Option<String>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        rate: Option<Decimal>,
        #[arg(long)]
        term: Option<u32>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
    /// Delete a loan and all of its payments
    Delete {
        #[command(flatten)]
        book: BookArgs,
        id: u64,
    },
}

#[derive(Subcommand)]
pub enum PaymentCommand {
    /// Record a payment against a loan
    Add {
        #[command(flatten)]
        book: BookArgs,
        loan_id: u64,
        #[arg(long)]
        amount: Decimal,
        /// Payment date, not in the future (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List a loan's payments, most recent first
    List {
        #[command(flatten)]
        book: BookArgs,
        loan_id: u64,
    },
    /// Show one payment
    Show {
        #[command(flatten)]
        book: BookArgs,
        loan_id: u64,
        payment_id: u64,
    },
    /// Amend a payment
    Update {
        #[command(flatten)]
        book: BookArgs,
        loan_id: u64,
        payment_id: u64,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a payment
    Delete {
        #[command(flatten)]
        book: BookArgs,
        loan_id: u64,
        payment_id: u64,
    },
}

pub fn run_loan(cmd: LoanCommand, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    match cmd {
        LoanCommand::Create {
            book,
            borrower,
            amount,
            rate,
            term,
            start_date,
        } => {
            let mut loans = open(&book, ctx)?;
            let new = NewLoan {
                borrower_name: borrower,
                amount,
                interest_rate: rate,
                repayment_period: term,
                start_date,
            };
            let loan = loans.create_loan(new, ctx.now)?;
            save(&book, &loans)?;
            reply("Loan created successfully", &loan)
        }
        LoanCommand::List { book } => {
            let loans = open(&book, ctx)?;
            Ok(serde_json::to_value(loans.loan_listings(ctx.as_of)?)?)
        }
        LoanCommand::Show { book, id } => {
            let loans = open(&book, ctx)?;
            reply("Loan retrieved", &loans.loan_detail(id, ctx.as_of)?)
        }
        LoanCommand::Update {
            book,
            id,
            borrower,
            amount,
            rate,
            term,
            start_date,
        } => {
            let mut loans = open(&book, ctx)?;
            let update = LoanUpdate {
                borrower_name: borrower,
                amount,
                interest_rate: rate,
                repayment_period: term,
                start_date,
            };
            let loan = loans.update_loan(id, update, ctx.now)?;
            save(&book, &loans)?;
            reply("Loan updated successfully", &loan)
        }
        LoanCommand::Delete { book, id } => {
            let mut loans = open(&book, ctx)?;
            let loan = loans.delete_loan(id)?;
            save(&book, &loans)?;
            reply("Loan deleted successfully", &loan)
        }
    }
}

pub fn run_payment(cmd: PaymentCommand, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    match cmd {
        PaymentCommand::Add {
            book,
            loan_id,
            amount,
            date,
            notes,
        } => {
            let mut loans = open(&book, ctx)?;
            let new = NewPayment {
                amount,
                payment_date: date.unwrap_or_else(|| ctx.now.date()),
                notes,
            };
            let payment = loans.add_payment(loan_id, new, ctx.now)?;
            save(&book, &loans)?;
            reply("Payment added successfully", &payment)
        }
        PaymentCommand::List { book, loan_id } => {
            let loans = open(&book, ctx)?;
            Ok(serde_json::to_value(loans.payments(loan_id)?)?)
        }
        PaymentCommand::Show {
            book,
            loan_id,
            payment_id,
        } => {
            let loans = open(&book, ctx)?;
            reply("Payment retrieved", loans.payment(loan_id, payment_id)?)
        }
        PaymentCommand::Update {
            book,
            loan_id,
            payment_id,
            amount,
            date,
            notes,
        } => {
            let mut loans = open(&book, ctx)?;
            let update = PaymentUpdate {
                amount,
                payment_date: date,
                notes,
            };
            let payment = loans.update_payment(loan_id, payment_id, update, ctx.now)?;
            save(&book, &loans)?;
            reply("Payment updated successfully", &payment)
        }
        PaymentCommand::Delete {
            book,
            loan_id,
            payment_id,
        } => {
            let mut loans = open(&book, ctx)?;
            let payment = loans.delete_payment(loan_id, payment_id)?;
            save(&book, &loans)?;
            reply("Payment deleted successfully", &payment)
        }
    }
}

fn open(args: &BookArgs, ctx: &Context) -> Result<LoanBook, Box<dyn std::error::Error>> {
    let mut book: LoanBook = input::file::read_json_if_exists(&args.book)?.unwrap_or_default();
    book.set_policy(ctx.policy.clone())?;
    Ok(book)
}

fn save(args: &BookArgs, book: &LoanBook) -> Result<(), Box<dyn std::error::Error>> {
    input::file::write_json(&args.book, book)
}

fn reply(message: &str, data: &impl Serialize) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(json!({
        "result": serde_json::to_value(data)?,
        "message": message,
    }))
}
