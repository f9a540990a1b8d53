//! Scheduled jobs for the nightly auto loop.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use smartmess_common::{AppError, AppResult, config::AutoLoopConfig};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Hour of day the auto loop fires (in `tz`).
    pub hour: u32,
    /// Minute of the hour the auto loop fires.
    pub minute: u32,
    /// Timezone the wall-clock schedule is anchored to.
    pub tz: Tz,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            hour: 21,
            minute: 0,
            tz: chrono_tz::Asia::Dhaka,
        }
    }
}

impl SchedulerConfig {
    /// Build from the application's auto-loop configuration.
    pub fn from_auto_loop(config: &AutoLoopConfig) -> AppResult<Self> {
        Ok(Self {
            hour: config.hour,
            minute: config.minute,
            tz: config.schedule_tz()?,
        })
    }
}

/// Job executor trait for scheduled jobs.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Execute the auto-loop generation job. Returns the number of meal
    /// entries generated.
    async fn run_auto_loop(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Compute the next wall-clock occurrence of the scheduled time after `now`.
pub fn next_run_at(now: DateTime<Utc>, config: &SchedulerConfig) -> AppResult<DateTime<Utc>> {
    let now_local = now.with_timezone(&config.tz);

    let today_target = config
        .tz
        .with_ymd_and_hms(
            now_local.year(),
            now_local.month(),
            now_local.day(),
            config.hour,
            config.minute,
            0,
        )
        .single()
        .ok_or_else(|| AppError::Internal("Failed to calculate next run time".to_string()))?;

    let next = if today_target > now_local {
        today_target
    } else {
        today_target + Duration::days(1)
    };

    Ok(next.with_timezone(&Utc))
}

/// Run the scheduler with the given configuration and executor.
///
/// Spawns a background task that sleeps until the next scheduled occurrence,
/// runs the job, and repeats. A failed run is logged at error level and the
/// schedule continues; the job itself is not retried before the next night.
pub fn run_scheduler<E: JobExecutor + 'static>(config: SchedulerConfig, executor: Arc<E>) {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next = match next_run_at(now, &config) {
                Ok(next) => next,
                Err(e) => {
                    tracing::error!(error = %e, "Scheduler stopped: cannot compute next run");
                    return;
                }
            };

            tracing::info!(next_run = %next, "Auto-loop run scheduled");
            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            let run_id = uuid::Uuid::new_v4();
            match executor.run_auto_loop().await {
                Ok(count) => {
                    tracing::info!(%run_id, count, "Auto-loop run succeeded");
                }
                Err(e) => {
                    tracing::error!(%run_id, error = %e, "Auto-loop run failed");
                }
            }
        }
    });
}
