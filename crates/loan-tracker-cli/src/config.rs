//! Per-invocation settings: tracking policy, evaluation date, logging.

use chrono::{Local, NaiveDate, NaiveDateTime};
use loan_tracker_core::TrackingPolicy;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::input;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub policy: TrackingPolicy,
    /// Date derived figures are evaluated at.
    pub as_of: NaiveDate,
    /// Timestamp stamped on records written by this run.
    pub now: NaiveDateTime,
}

impl Context {
    pub fn load(
        policy_path: Option<&str>,
        as_of: Option<NaiveDate>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let policy = match policy_path {
            Some(path) => input::file::read_config::<TrackingPolicy>(path)?,
            None => TrackingPolicy::default(),
        };
        policy.validate()?;

        // The clock is read here and nowhere else.
        let now = Local::now().naive_local();
        let as_of = as_of.unwrap_or_else(|| now.date());
        debug!(%as_of, tolerance = %policy.tolerance_fraction, "context loaded");

        Ok(Context { policy, as_of, now })
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
