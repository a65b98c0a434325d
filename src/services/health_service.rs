use crate::adapters::queue::MessageQueue;
use crate::adapters::storage::ObjectStorage;
use opentelemetry::{KeyValue, global, metrics::Gauge};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone, Debug)]
struct Metrics {
    status: Gauge<i64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("udm-server");
        Self {
            status: meter
                .i64_gauge("udm_health_status")
                .with_description("Status of health checks (1 for ok, 0 for error)")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthService {
    storage: Arc<dyn ObjectStorage>,
    queue: Arc<dyn MessageQueue>,
    storage_timeout: Duration,
    queue_timeout: Duration,
    metrics: Metrics,
}

impl HealthService {
    #[must_use]
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        queue: Arc<dyn MessageQueue>,
        storage_timeout: Duration,
        queue_timeout: Duration,
    ) -> Self {
        Self { storage, queue, storage_timeout, queue_timeout, metrics: Metrics::new() }
    }

    /// Checks that the website bucket is reachable.
    ///
    /// # Errors
    /// Returns a string describing the failure.
    pub async fn check_storage(&self) -> Result<(), String> {
        let result = match timeout(self.storage_timeout, self.storage.check()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("Storage check failed: {e}")),
            Err(_) => Err("Storage check timed out".to_string()),
        };
        self.record("storage", result.is_ok());
        result
    }

    /// Checks that the queue's attributes can be read.
    ///
    /// # Errors
    /// Returns a string describing the failure.
    pub async fn check_queue(&self) -> Result<(), String> {
        let result = match timeout(self.queue_timeout, self.queue.approximate_depth()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(format!("Queue check failed: {e}")),
            Err(_) => Err("Queue check timed out".to_string()),
        };
        self.record("queue", result.is_ok());
        result
    }

    fn record(&self, component: &'static str, ok: bool) {
        self.metrics.status.record(i64::from(ok), &[KeyValue::new("component", component)]);
    }
}
