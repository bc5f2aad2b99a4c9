//! Run-level behaviour: stage tagging, no partial publish, single flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use restock_core::{
    ForecastPolicy, InventoryRecord, PipelineError, PublishError, PublishReceipt, PublishTarget,
    SourceSnapshot, UsageRecord, UsageSource,
};
use restock_platform::{DirectoryTarget, InMemoryUsageSource, RunError, Trigger, run_forecast};
use rust_decimal::Decimal;
use tokio::sync::Notify;

const OUTPUT: &str = "ModeloAbastecimiento.csv";

fn policy() -> ForecastPolicy {
    ForecastPolicy::default()
        .with_start_year(2020)
        .with_current_year(2024)
}

fn snapshot(on_hand: i64) -> SourceSnapshot {
    let usage = [
        ("X-REC", "2020-03-01", 10),
        ("X-REC", "2021-03-01", 12),
        ("X-REC", "2023-03-01", 14),
    ]
    .into_iter()
    .map(|(code, date, quantity)| UsageRecord {
        product_code: Some(code.to_string()),
        called_at: Some(date.to_string()),
        quantity: Decimal::from(quantity),
    })
    .collect();
    let inventory = vec![InventoryRecord {
        product_code: Some("X".to_string()),
        warehouse_code: "8".to_string(),
        description: "Unidad de imagen".to_string(),
        quantity_on_hand: Decimal::from(on_hand),
    }];
    SourceSnapshot { usage, inventory }
}

/// Counts publish calls and fails every one of them.
#[derive(Default)]
struct RejectingTarget {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PublishTarget for RejectingTarget {
    fn describe(&self) -> String {
        "rejecting".to_string()
    }

    async fn publish(&self, _: &str, _: Vec<u8>) -> Result<PublishReceipt, PublishError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PublishError::Upload {
            destination: "rejecting".to_string(),
            status: 503,
        })
    }
}

/// Holds every read until released.
struct GatedSource {
    gate: Arc<Notify>,
    entered: Arc<Notify>,
}

#[async_trait]
impl UsageSource for GatedSource {
    async fn snapshot(&self) -> Result<SourceSnapshot, PipelineError> {
        self.entered.notify_one();
        self.gate.notified().await;
        Ok(snapshot(0))
    }
}

#[tokio::test]
async fn successful_run_publishes_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let source = InMemoryUsageSource::new(snapshot(0));
    let target = DirectoryTarget::new(dir.path());

    let report = run_forecast(&source, &target, &policy(), OUTPUT).await.unwrap();

    assert_eq!(report.table.rows.len(), 1);
    assert_eq!(report.table.rows[0].recommended_purchase, 2);
    let published = std::fs::read_to_string(dir.path().join(OUTPUT)).unwrap();
    assert_eq!(
        published.lines().nth(1),
        Some("X,10,12,0,14,0,Unidad de imagen,0,9,1,1,2,2")
    );
    assert_eq!(report.receipt.bytes, published.len());
}

#[tokio::test]
async fn connection_failure_is_tagged_connect() {
    let target = RejectingTarget::default();
    let source = InMemoryUsageSource::unreachable("postgres://ops:***@db/erp");

    let err = run_forecast(&source, &target, &policy(), OUTPUT)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "connect");
    assert_eq!(target.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn transform_failure_never_reaches_publish() {
    let target = RejectingTarget::default();
    let mut broken = snapshot(0);
    broken.usage[0].called_at = Some("31/02/2020".to_string());
    let source = InMemoryUsageSource::new(broken);

    let err = run_forecast(&source, &target, &policy(), OUTPUT)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "transform");
    assert_eq!(target.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn publish_failure_is_tagged_publish() {
    let target = RejectingTarget::default();
    let source = InMemoryUsageSource::new(snapshot(5));

    let err = run_forecast(&source, &target, &policy(), OUTPUT)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "publish");
    assert_eq!(target.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn each_run_recomputes_from_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = InMemoryUsageSource::new(snapshot(0));
    let trigger = Trigger::new(source, DirectoryTarget::new(dir.path()), policy(), OUTPUT);

    let first = trigger.run_now().await.unwrap();
    trigger.source.replace(snapshot(40)).await;
    let second = trigger.run_now().await.unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.table.total_recommended_units(), 2);
    assert_eq!(second.table.total_recommended_units(), 0);
    assert!(!trigger.is_running());
}

#[tokio::test]
async fn second_trigger_while_running_is_refused() {
    let gate = Arc::new(Notify::new());
    let entered = Arc::new(Notify::new());
    let source = GatedSource {
        gate: gate.clone(),
        entered: entered.clone(),
    };
    let target = RejectingTarget::default();
    let calls = target.calls.clone();
    let trigger = Trigger::new(source, target, policy(), OUTPUT);

    let first = trigger.run_now();
    let second = async {
        entered.notified().await;
        assert!(trigger.is_running());
        let refused = trigger.run_now().await;
        gate.notify_one();
        refused
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(second, Err(RunError::Busy)));
    assert_eq!(second.unwrap_err().stage(), "trigger");
    assert!(matches!(first, Err(RunError::Failed(PipelineError::Publish(_)))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!trigger.is_running());
}
