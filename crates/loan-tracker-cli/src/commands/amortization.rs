use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_tracker_core::amortization::installment::{self, InstallmentInput};
use loan_tracker_core::amortization::schedule::{self, ScheduleInput};
use loan_tracker_core::TrackingPolicy;

use crate::config::Context;
use crate::input;

/// Arguments for the monthly installment calculation
#[derive(Args)]
pub struct InstallmentArgs {
    /// Path to JSON input file (overrides individual flags)
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
}

/// Arguments for the amortisation schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
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

    /// Loan start date (default: the evaluation date)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_installment(
    args: InstallmentArgs,
    ctx: &Context,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut calc_input: InstallmentInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        installment_from_flags(args, &ctx.policy)?
    };
    calc_input.policy.get_or_insert_with(|| ctx.policy.clone());

    let result = installment::calculate_installment(&calc_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let mut schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        schedule_from_flags(args, ctx)?
    };
    schedule_input
        .policy
        .get_or_insert_with(|| ctx.policy.clone());

    let result = schedule::build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

fn installment_from_flags(
    args: InstallmentArgs,
    policy: &TrackingPolicy,
) -> Result<InstallmentInput, Box<dyn std::error::Error>> {
    Ok(InstallmentInput {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        monthly_rate_percent: args.rate,
        term_months: args.term.ok_or("--term is required (or provide --input)")?,
        policy: Some(policy.clone()),
    })
}

fn schedule_from_flags(
    args: ScheduleArgs,
    ctx: &Context,
) -> Result<ScheduleInput, Box<dyn std::error::Error>> {
    Ok(ScheduleInput {
        principal: args
            .principal
            .ok_or("--principal is required (or provide --input)")?,
        monthly_rate_percent: args.rate,
        term_months: args.term.ok_or("--term is required (or provide --input)")?,
        start_date: args.start_date.unwrap_or(ctx.as_of),
        policy: Some(ctx.policy.clone()),
    })
}
