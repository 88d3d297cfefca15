use std::sync::Arc;
use tokio::time::{ interval, Duration, MissedTickBehavior };

use crate::alert_checker::AlertEvaluator;
use crate::error::AppError;

/// Drives the alert evaluator on a fixed interval, for deployments without
/// an external cron calling the trigger endpoint.
pub struct Scheduler {
    evaluator: Arc<AlertEvaluator>,
    period: Duration,
}

impl Scheduler {
    pub fn new(evaluator: Arc<AlertEvaluator>, period_secs: u64) -> Self {
        Self {
            evaluator,
            period: Duration::from_secs(period_secs.max(1)),
        }
    }

    pub async fn start(self) {
        let mut interval = interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Alert scheduler started, checking every {}s", self.period.as_secs());

        loop {
            interval.tick().await;

            match self.evaluator.run().await {
                Ok(report) => {
                    tracing::debug!(?report, "Scheduled alert check complete");
                }
                Err(AppError::EvaluationInProgress) => {
                    tracing::info!("Previous alert check still running, skipping tick");
                }
                Err(e) => {
                    tracing::error!("Scheduled alert check failed: {}", e);
                }
            }
        }
    }
}
