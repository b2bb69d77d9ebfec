mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{InstallmentArgs, ScheduleArgs};
use commands::book::{LoanCommand, PaymentCommand};
use commands::tracking::StatusArgs;

/// Loan installments, repayment status and a local loan book
#[derive(Parser)]
#[command(
    name = "loans",
    version,
    about = "Loan installments, repayment status and a local loan book",
    long_about = "A CLI for tracking loans and their repayments with decimal precision. \
                  Computes level monthly installments and amortisation schedules, \
                  classifies repayment progress as On Track, Ahead or Behind, and \
                  keeps a JSON loan book of loans and payments."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Tracking policy file (JSON or YAML)
    #[arg(long, global = true)]
    policy: Option<String>,

    /// Evaluation date (YYYY-MM-DD); defaults to today
    #[arg(long, global = true)]
    as_of: Option<chrono::NaiveDate>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the fixed monthly installment for a loan
    Installment(InstallmentArgs),
    /// Build a period-by-period amortisation schedule
    Schedule(ScheduleArgs),
    /// Derive repayment status from terms and payment history
    Status(StatusArgs),
    /// Manage loans in the loan book
    #[command(subcommand)]
    Loan(LoanCommand),
    /// Manage payments in the loan book
    #[command(subcommand)]
    Payment(PaymentCommand),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    config::init_logging(cli.verbose);

    let ctx = match config::Context::load(cli.policy.as_deref(), cli.as_of) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Installment(args) => commands::amortization::run_installment(args, &ctx),
        Commands::Schedule(args) => commands::amortization::run_schedule(args, &ctx),
        Commands::Status(args) => commands::tracking::run_status(args, &ctx),
        Commands::Loan(cmd) => commands::book::run_loan(cmd, &ctx),
        Commands::Payment(cmd) => commands::book::run_payment(cmd, &ctx),
        Commands::Version => {
            println!("loans {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
