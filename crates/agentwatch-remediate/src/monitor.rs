//! Monitor: a pass plus its reports, once or on an interval.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use agentwatch_core::PassConfig;

use crate::driver::{PassResult, RemediationDriver};
use crate::error::MonitorError;
use crate::reporter::Reporter;

/// Runs passes and reports their outcome.
///
/// A notification failure is logged and never undoes or retries a
/// remediation that already happened.
pub struct Monitor {
    driver: RemediationDriver,
    reporter: Option<Reporter>,
}

impl Monitor {
    pub fn new(driver: RemediationDriver) -> Self {
        Self {
            driver,
            reporter: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Run one pass and send its reports.
    pub async fn run_once(&self, config: &PassConfig) -> Result<PassResult, MonitorError> {
        let result = self
            .driver
            .run_pass(&config.cluster, config.fail_after, config.warn_only)
            .await?;

        for failure in &result.failures {
            warn!(instance_id = %failure.instance_id, error = %failure.error, "instance not remediated");
        }

        self.report(config, &result).await;
        Ok(result)
    }

    async fn report(&self, config: &PassConfig, result: &PassResult) {
        let Some(channel) = config.notify_channel.as_deref() else {
            warn!("no notify channel configured; reporting is disabled");
            return;
        };
        let Some(reporter) = &self.reporter else {
            warn!(%channel, "no notifier configured; reporting is disabled");
            return;
        };

        if let Err(e) = reporter
            .report_tracked(&result.tracked, config.fail_after, Some(channel))
            .await
        {
            error!(%channel, error = %e, "failed to send tracked report");
        }

        if let Err(e) = reporter
            .report_terminated(&result.terminated, &config.cluster, config.warn_only, Some(channel))
            .await
        {
            error!(%channel, error = %e, "failed to send termination report");
        }
    }

    /// Run passes back to back, `interval` apart, until `shutdown` fires.
    ///
    /// A pass is never interrupted; shutdown is honoured between passes.
    pub async fn run_loop(
        &self,
        config: &PassConfig,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(cluster = %config.cluster, interval_secs = interval.as_secs(), "monitor loop started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.run_once(config).await {
                error!(cluster = %config.cluster, error = %e, "pass failed");
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!(cluster = %config.cluster, "monitor loop stopped");
    }
}
