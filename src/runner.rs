//! Scheduled execution: cron-driven passes and signal-driven shutdown.
//!
//! The runner owns the outer loop the engine itself knows nothing about: it
//! sleeps until the next schedule occurrence, runs one pass, and stops
//! scheduling when SIGINT or SIGTERM arrives. An in-flight pass always runs
//! to completion; only future passes are cancelled.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use cron::Schedule;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{Result, ScrapeError};
use crate::scraper::Scraper;

/// Drives the engine on a cron schedule until the process is told to stop.
pub struct Runner {
    scraper: Arc<Scraper>,
    schedule: Schedule,
}

impl Runner {
    /// Build a runner from a six-field cron expression.
    pub fn new(scraper: Arc<Scraper>, cron_expr: &str) -> Result<Self> {
        let schedule = Schedule::from_str(cron_expr).map_err(|e| {
            ScrapeError::Config(format!("invalid cron schedule {cron_expr:?}: {e}"))
        })?;

        Ok(Self { scraper, schedule })
    }

    /// Run passes on the schedule until a termination signal arrives.
    pub async fn run(self) {
        let (tx, mut shutdown) = watch::channel(false);
        tokio::spawn(async move {
            termination_signal().await;
            info!("received termination signal");
            let _ = tx.send(true);
        });

        loop {
            let Some(next) = self.schedule.upcoming(Utc).next() else {
                error!("schedule has no upcoming occurrence, stopping");
                return;
            };

            let wait = (next - Utc::now()).to_std().unwrap_or_default();
            debug!(next = %next, "waiting for next pass");

            tokio::select! {
                _ = shutdown.changed() => {
                    info!("no longer scheduling passes");
                    return;
                }
                // Once the timer fires the pass runs to completion; a signal
                // arriving meanwhile is observed on the next loop iteration.
                _ = sleep(wait) => self.scraper.run_pass().await,
            }
        }
    }
}

/// Completes when SIGINT or SIGTERM is delivered.
async fn termination_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "could not install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
