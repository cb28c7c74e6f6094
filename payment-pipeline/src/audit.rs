//! Audit sink port
//!
//! The pipeline emits structured audit events through this port. Routine
//! write failures degrade to a warning; Critical-severity events must not
//! be lost, so their failures propagate to the caller.

use async_trait::async_trait;
use parking_lot::Mutex;
use security::audit_log::{AuditError, AuditEvent, AuditLogger};

/// Write-side port for audit events
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one event
    async fn record(&self, event: AuditEvent) -> anyhow::Result<()>;
}

#[async_trait]
impl AuditSink for AuditLogger {
    async fn record(&self, event: AuditEvent) -> anyhow::Result<()> {
        self.log(event).await.map_err(anyhow::Error::new)
    }
}

/// In-memory sink for tests and embedders without a log file
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
    fail_next: Mutex<bool>,
}

impl MemoryAuditSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Make the next `record` call fail (for failure-path tests)
    pub fn fail_next(&self) {
        *self.fail_next.lock() = true;
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> anyhow::Result<()> {
        let mut fail = self.fail_next.lock();
        if *fail {
            *fail = false;
            return Err(anyhow::Error::new(AuditError::IntegrityFailure(
                "injected sink failure".into(),
            )));
        }
        drop(fail);
        self.events.lock().push(event);
        Ok(())
    }
}
