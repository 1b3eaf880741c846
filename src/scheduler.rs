//! Cron-driven scheduling of ingest runs.
//!
//! The scheduler fires one ingest run immediately on start, then one per cron
//! tick (UTC) until the shutdown token is cancelled. Runs are spawned onto the
//! runtime so a slow run never delays the next tick. If a run outlives the
//! cadence, the next one starts anyway and both proceed concurrently.
//!
//! # States
//!
//! ```text
//! Stopped ──run()──▶ Running ──shutdown──▶ Stopping ──drained/grace──▶ Stopped
//! ```

use crate::error::{IngestError, ScheduleError};
use crate::ingest::IngestJob;
use crate::models::IngestReport;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
    Stopping,
}

pub struct Scheduler<J> {
    job: Arc<J>,
    schedule: Schedule,
    grace: Duration,
    state: watch::Sender<SchedulerState>,
}

/// Parse a cron expression, accepting standard 5-field syntax.
///
/// The `cron` crate wants a leading seconds field and numbers weekdays from
/// 1 (Sunday), so 5-field crontab expressions get `0` prepended and their
/// day-of-week field rewritten to names. Anything else passes through unchanged.
///
/// # Arguments
///
/// * `expr` - A crontab expression (`0 */6 * * *`) or a 6/7-field `cron` crate expression
///
/// # Returns
///
/// The parsed [`Schedule`], or [`ScheduleError::InvalidCron`] naming the original input.
pub fn parse_cron(expr: &str) -> Result<Schedule, ScheduleError> {
    let trimmed = expr.trim();
    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    let normalized = if fields.len() == 5 {
        format!("0 {} {}", fields[..4].join(" "), crontab_weekdays(fields[4]))
    } else {
        trimmed.to_string()
    };
    Schedule::from_str(&normalized).map_err(|source| ScheduleError::InvalidCron {
        expr: expr.to_string(),
        source,
    })
}

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Rewrite a crontab day-of-week field (0 or 7 = Sunday) to weekday names.
///
/// Tokens that are not plain numbers in `0..=7` are left for the parser to judge.
fn crontab_weekdays(field: &str) -> String {
    let day = |tok: &str| match tok.parse::<usize>() {
        Ok(n) if n <= 7 => Some(WEEKDAY_NAMES[n % 7]),
        _ => None,
    };

    field
        .split(',')
        .map(|part| {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => (range, Some(step)),
                None => (part, None),
            };
            let range = match range.split_once('-') {
                // `5-7` ends on Sunday, which names cannot express as one range
                Some((lo, "7")) if step.is_none() && lo != "0" => match day(lo) {
                    Some("Sun") => "Sun".to_string(),
                    Some("Sat") => "Sat,Sun".to_string(),
                    Some(start) => format!("{start}-Sat,Sun"),
                    None => range.to_string(),
                },
                Some((lo, hi)) => match (day(lo), day(hi)) {
                    (Some(lo), Some(hi)) => format!("{lo}-{hi}"),
                    _ => range.to_string(),
                },
                None => day(range).map_or_else(|| range.to_string(), str::to_string),
            };
            match step {
                Some(step) => format!("{range}/{step}"),
                None => range,
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

impl<J: IngestJob> Scheduler<J> {
    /// Build a scheduler for `job`.
    ///
    /// `grace` bounds how long shutdown waits for in-flight runs before
    /// aborting them.
    pub fn new(job: J, cron_expr: &str, grace: Duration) -> Result<Self, ScheduleError> {
        let schedule = parse_cron(cron_expr)?;
        let (state, _) = watch::channel(SchedulerState::Stopped);
        Ok(Self {
            job: Arc::new(job),
            schedule,
            grace,
            state,
        })
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Next fire time strictly after `after`.
    pub fn next_fire(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    /// Run until `shutdown` is cancelled, then drain in-flight runs.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut in_flight: JoinSet<Result<IngestReport, IngestError>> = JoinSet::new();
        self.set_state(SchedulerState::Running);

        info!("Scheduling initial ingest run");
        self.spawn_run(&mut in_flight);

        let mut cursor = Utc::now();
        loop {
            let Some(next) = self.next_fire(cursor.max(Utc::now())) else {
                warn!("Cron schedule has no upcoming fire times; waiting for shutdown");
                shutdown.cancelled().await;
                break;
            };
            let delay = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            debug!(next = %next, delay_secs = delay.as_secs(), "Waiting for next trigger");

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {
                    cursor = next;
                    info!(fired_at = %next, in_flight = in_flight.len(), "Cron trigger fired");
                    self.spawn_run(&mut in_flight);
                }
                Some(done) = in_flight.join_next() => log_outcome(done),
            }
        }

        self.set_state(SchedulerState::Stopping);
        info!(in_flight = in_flight.len(), "Shutdown requested; no new runs will start");
        self.drain(&mut in_flight).await;
        self.set_state(SchedulerState::Stopped);
        info!("Scheduler stopped");
    }

    fn spawn_run(&self, in_flight: &mut JoinSet<Result<IngestReport, IngestError>>) {
        let job = Arc::clone(&self.job);
        in_flight.spawn(async move { job.run().await });
    }

    async fn drain(&self, in_flight: &mut JoinSet<Result<IngestReport, IngestError>>) {
        if in_flight.is_empty() {
            return;
        }
        let waited = tokio::time::timeout(self.grace, async {
            while let Some(done) = in_flight.join_next().await {
                log_outcome(done);
            }
        })
        .await;

        if waited.is_err() {
            warn!(
                abandoned = in_flight.len(),
                grace_secs = self.grace.as_secs(),
                "Grace period elapsed; aborting in-flight runs"
            );
            in_flight.abort_all();
            while in_flight.join_next().await.is_some() {}
        }
    }

    fn set_state(&self, next: SchedulerState) {
        let prev = self.state.send_replace(next);
        debug!(?prev, ?next, "Scheduler state changed");
    }
}

fn log_outcome(done: Result<Result<IngestReport, IngestError>, JoinError>) {
    match done {
        Ok(Ok(report)) => info!(
            items = report.item_count,
            path = %report.saved_path.display(),
            "Ingest run completed"
        ),
        Ok(Err(e)) => error!(error = %e, "Ingest run failed"),
        Err(e) if e.is_cancelled() => debug!("Ingest run cancelled"),
        Err(e) => error!(error = %e, "Ingest run panicked"),
    }
}
