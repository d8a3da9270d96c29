//! Notification Fanout — dispatches one stored record to every configured
//! sink with isolated failure handling.
//!
//! Delivery semantics are single attempt, no retry, no backoff. A sink
//! failure is captured in its `SinkResult` and logged; it neither rolls back
//! persistence nor prevents other sinks from running, and it never reaches
//! the HTTP caller. `AppState` carries the sink set as trait objects
//! assembled once at startup from config.

pub mod email;
pub mod sheets;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::submission::models::StoredRecord;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("email build failed: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("address parse failed: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("invalid attachment content type: {0}")]
    ContentType(String),

    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error(transparent)]
    Sheets(#[from] sheets::SheetsError),
}

/// An independent downstream sink of a persisted record, invoked after
/// persistence succeeds.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &'static str;

    /// One delivery attempt for one record.
    async fn deliver(&self, record: &StoredRecord) -> Result<(), SinkError>;
}

/// The outcome of one sink's single delivery attempt.
#[derive(Debug)]
pub struct SinkResult {
    pub sink: &'static str,
    pub outcome: Result<(), SinkError>,
}

/// Dispatches the record to every sink concurrently and waits for all
/// attempts to settle. Never fails; a panicking sink task is logged and
/// dropped from the results.
pub async fn fan_out(
    sinks: &[Arc<dyn NotificationSink>],
    record: &StoredRecord,
) -> Vec<SinkResult> {
    let mut set = JoinSet::new();
    for sink in sinks {
        let sink = Arc::clone(sink);
        let record = record.clone();
        set.spawn(async move {
            SinkResult {
                sink: sink.name(),
                outcome: sink.deliver(&record).await,
            }
        });
    }

    let mut results = Vec::with_capacity(sinks.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => error!("notification task panicked: {e}"),
        }
    }
    results
}

/// Runs the fanout for a record and logs the settled outcomes. Used by the
/// orchestrator on a spawned task, off the response path.
pub async fn fan_out_and_log(sinks: &[Arc<dyn NotificationSink>], record: &StoredRecord) {
    let results = fan_out(sinks, record).await;
    let mut delivered = 0usize;
    for result in &results {
        match &result.outcome {
            Ok(()) => {
                delivered += 1;
                info!("{} sink delivered application {}", result.sink, record.id);
            }
            Err(e) => warn!(
                "{} sink failed for application {}: {e}",
                result.sink, record.id
            ),
        }
    }
    info!(
        "fanout settled for application {}: {delivered}/{} delivered",
        record.id,
        results.len()
    );
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::submission::models::Submission;

    struct StaticSink {
        name: &'static str,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StaticSink {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl NotificationSink for StaticSink {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn deliver(&self, _record: &StoredRecord) -> Result<(), SinkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SinkError::ContentType("simulated failure".into()))
            } else {
                Ok(())
            }
        }
    }

    fn record() -> StoredRecord {
        StoredRecord {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            submission: Submission {
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                email: "jane@x.com".into(),
                phone: "555".into(),
                profession: None,
                address: None,
                education: vec![],
                experience: vec![],
                skills: vec![],
                resume: None,
                job_position: None,
            },
        }
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_block_others() {
        let failing = StaticSink::new("failing", true);
        let healthy = StaticSink::new("healthy", false);
        let sinks: Vec<Arc<dyn NotificationSink>> = vec![failing.clone(), healthy.clone()];

        let results = fan_out(&sinks, &record()).await;

        assert_eq!(results.len(), 2);
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(healthy.calls.load(Ordering::SeqCst), 1);
        let healthy_result = results.iter().find(|r| r.sink == "healthy").unwrap();
        assert!(healthy_result.outcome.is_ok());
        let failing_result = results.iter().find(|r| r.sink == "failing").unwrap();
        assert!(failing_result.outcome.is_err());
    }

    #[tokio::test]
    async fn test_single_attempt_per_sink() {
        let sink = StaticSink::new("counting", true);
        let sinks: Vec<Arc<dyn NotificationSink>> = vec![sink.clone()];

        let _ = fan_out(&sinks, &record()).await;

        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_sinks_settles_empty() {
        let results = fan_out(&[], &record()).await;
        assert!(results.is_empty());
    }
}
