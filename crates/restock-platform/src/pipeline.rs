use std::sync::atomic::{AtomicBool, Ordering};

use restock_core::{
    ForecastPolicy, ModelTable, PipelineError, PublishReceipt, PublishTarget, UsageSource,
};
use restock_inventory::{ForecastStats, forecast, to_csv};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub table: ModelTable,
    pub stats: ForecastStats,
    pub receipt: PublishReceipt,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("a forecast run is already in progress")]
    Busy,
    #[error(transparent)]
    Failed(#[from] PipelineError),
}

impl RunError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Busy => "trigger",
            Self::Failed(err) => err.stage(),
        }
    }
}

/// Load, transform, serialize, publish. Nothing is published unless every
/// earlier stage succeeded.
pub async fn run_forecast(
    source: &dyn UsageSource,
    target: &dyn PublishTarget,
    policy: &ForecastPolicy,
    file_name: &str,
) -> Result<RunReport, PipelineError> {
    let run_id = Uuid::new_v4();
    let span = info_span!("forecast_run", %run_id);

    async move {
        info!(destination = %target.describe(), "forecast run started");

        let snapshot = source.snapshot().await?;
        let result = forecast(&snapshot, policy)?;
        let body = to_csv(&result.table)?;
        let receipt = target.publish(file_name, body).await?;

        info!(
            rows = result.stats.model_rows,
            location = %receipt.location,
            "forecast run finished"
        );
        Ok(RunReport {
            run_id,
            table: result.table,
            stats: result.stats,
            receipt,
        })
    }
    .instrument(span)
    .await
}

/// The "run now" action. At most one run is in flight at a time.
pub struct Trigger<S, P>
where
    S: UsageSource,
    P: PublishTarget,
{
    pub source: S,
    pub target: P,
    pub policy: ForecastPolicy,
    pub file_name: String,
    in_flight: AtomicBool,
}

impl<S, P> Trigger<S, P>
where
    S: UsageSource,
    P: PublishTarget,
{
    pub fn new(source: S, target: P, policy: ForecastPolicy, file_name: impl Into<String>) -> Self {
        Self {
            source,
            target,
            policy,
            file_name: file_name.into(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn run_now(&self) -> Result<RunReport, RunError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            return Err(RunError::Busy);
        };

        run_forecast(&self.source, &self.target, &self.policy, &self.file_name)
            .await
            .map_err(|err| {
                error!(stage = err.stage(), "forecast run aborted: {err}");
                RunError::from(err)
            })
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
