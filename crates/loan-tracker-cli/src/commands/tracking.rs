use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

use loan_tracker_core::tracking::{self, LoanAssessmentInput};
use loan_tracker_core::{LoanTerms, Payment, TrackingPolicy};

use crate::config::Context;
use crate::input;

/// Arguments for repayment status
#[derive(Args)]
pub struct StatusArgs {
    /// Path to JSON input file with `terms`, `payments` and optional `as_of`
    #[arg(long)]
    pub input: Option<String>,

    /// Principal borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Interest rate, percent per month (default: the policy's default rate)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Loan start date
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// A payment as AMOUNT@YYYY-MM-DD; repeat for each payment
    #[arg(long = "payment", value_parser = parse_payment)]
    pub payments: Vec<Payment>,
}

/// Status request as read from a file or stdin. The evaluation date and
/// policy fall back to the command-line context.
#[derive(Deserialize)]
struct StatusRequest {
    terms: LoanTerms,
    #[serde(default)]
    payments: Vec<Payment>,
    #[serde(default)]
    as_of: Option<NaiveDate>,
    #[serde(default)]
    policy: Option<TrackingPolicy>,
}

pub fn run_status(args: StatusArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let request: StatusRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        request_from_flags(args, &ctx.policy)?
    };

    let assessment = LoanAssessmentInput {
        terms: request.terms,
        payments: request.payments,
        as_of: request.as_of.unwrap_or(ctx.as_of),
        policy: Some(request.policy.unwrap_or_else(|| ctx.policy.clone())),
    };

    let result = tracking::assess_loan(&assessment)?;
    Ok(serde_json::to_value(result)?)
}

fn request_from_flags(
    args: StatusArgs,
    policy: &TrackingPolicy,
) -> Result<StatusRequest, Box<dyn std::error::Error>> {
    Ok(StatusRequest {
        terms: LoanTerms {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            monthly_rate_percent: args.rate.unwrap_or(policy.default_rate_percent),
            term_months: args.term.ok_or("--term is required (or provide --input)")?,
            start_date: args
                .start_date
                .ok_or("--start-date is required (or provide --input)")?,
        },
        payments: args.payments,
        as_of: None,
        policy: None,
    })
}

fn parse_payment(s: &str) -> Result<Payment, String> {
    let (amount, date) = s
        .split_once('@')
        .ok_or_else(|| format!("expected AMOUNT@YYYY-MM-DD, got '{s}'"))?;
    Ok(Payment {
        amount: Decimal::from_str(amount.trim())
            .map_err(|e| format!("invalid amount '{amount}': {e}"))?,
        payment_date: NaiveDate::from_str(date.trim())
            .map_err(|e| format!("invalid date '{date}': {e}"))?,
    })
}
