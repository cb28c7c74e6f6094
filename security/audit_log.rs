//! Audit Logging
//!
//! Append-only trail of finance- and security-relevant events:
//! - Payment outcomes (committed, challenged, blocked, rejected)
//! - Integrity and access violations
//!
//! Features:
//! - Structured JSONL records
//! - Tamper detection with hash chain
//! - Canonical payload hashing (key order never changes the digest)

use crate::canonical::audit_hash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Audit log errors
#[derive(Error, Debug)]
pub enum AuditError {
    /// IO failure on the log file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized or parsed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Hash chain or record hash broken
    #[error("Integrity check failed: {0}")]
    IntegrityFailure(String),
}

/// Result type for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Audit event type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Payment committed successfully
    PaymentCommitted,
    /// Payment committed but flagged for additional verification
    PaymentChallenged,
    /// Payment refused by risk assessment
    PaymentBlocked,
    /// Payment rejected during validation or pricing
    PaymentRejected,
    /// Attempt to reuse a transaction reference
    DuplicateTransactionAttempt,
    /// Attempt to pay a booking owned by another user
    AccessDenied,
    /// Client amount did not match the recomputed total
    AmountMismatchDetected,
}

/// Audit severity level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Routine
    Info,
    /// Worth attention
    Warning,
    /// Failure
    Error,
    /// Security-relevant, must never be dropped
    Critical,
}

/// Append-only audit record
///
/// Never mutated or deleted after creation. `payload_hash` is the
/// canonical digest of the event payload; `hash` chains over
/// `previous_hash` for tamper evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub event_id: Uuid,

    /// Event type
    pub event_type: AuditEventType,

    /// Severity level
    pub severity: AuditSeverity,

    /// User the event concerns
    pub user_id: Option<Uuid>,

    /// Source IP address
    pub ip_address: Option<String>,

    /// Client user agent
    pub user_agent: Option<String>,

    /// Session identifier
    pub session_id: Option<String>,

    /// Canonical digest of the event payload
    pub payload_hash: String,

    /// Event timestamp
    pub created_at: DateTime<Utc>,

    /// Previous event hash (for hash chain)
    pub previous_hash: String,

    /// Current event hash
    pub hash: String,
}

impl AuditEvent {
    /// Create a new audit event with a hashed payload
    pub fn new(
        event_type: AuditEventType,
        severity: AuditSeverity,
        payload: &serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut event = Self {
            event_id: Uuid::new_v4(),
            event_type,
            severity,
            user_id: None,
            ip_address: None,
            user_agent: None,
            session_id: None,
            payload_hash: audit_hash(payload),
            created_at,
            previous_hash: String::new(),
            hash: String::new(),
        };
        event.hash = event.compute_hash();
        event
    }

    /// Compute the record hash (all fields except the hash itself)
    ///
    /// Digests a canonical serialization so every field has an
    /// unambiguous boundary and an absent field hashes as an explicit
    /// null; bytes cannot be shifted between adjacent fields without
    /// changing the digest.
    fn compute_hash(&self) -> String {
        let record = serde_json::json!({
            "event_id": self.event_id,
            "event_type": self.event_type,
            "severity": self.severity,
            "user_id": self.user_id,
            "ip_address": self.ip_address,
            "user_agent": self.user_agent,
            "session_id": self.session_id,
            "payload_hash": self.payload_hash,
            "created_at": self.created_at,
            "previous_hash": self.previous_hash,
        });
        audit_hash(&record)
    }

    /// Verify the record hash
    pub fn verify_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }

    /// Set previous hash (extends the chain) and recompute
    pub fn set_previous_hash(&mut self, previous_hash: String) {
        self.previous_hash = previous_hash;
        self.hash = self.compute_hash();
    }

    /// Attach the user the event concerns
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self.hash = self.compute_hash();
        self
    }

    /// Attach the source IP
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self.hash = self.compute_hash();
        self
    }

    /// Attach the client user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self.hash = self.compute_hash();
        self
    }

    /// Attach the session identifier
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self.hash = self.compute_hash();
        self
    }
}

/// Audit log configuration
#[derive(Debug, Clone)]
pub struct AuditLogConfig {
    /// Log file path
    pub log_path: PathBuf,

    /// Minimum severity to log
    pub min_severity: AuditSeverity,
}

impl Default for AuditLogConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("./data/audit.log"),
            min_severity: AuditSeverity::Info,
        }
    }
}

/// Hash-chained append-only audit logger
#[derive(Debug)]
pub struct AuditLogger {
    config: AuditLogConfig,
    file: Arc<Mutex<File>>,
    last_hash: Arc<Mutex<String>>,
}

impl AuditLogger {
    /// Open (or create) the log and resume its hash chain
    pub fn new(config: AuditLogConfig) -> Result<Self> {
        if let Some(parent) = config.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_path)?;

        let last_hash = Self::read_last_hash(&config.log_path)?;

        Ok(Self {
            config,
            file: Arc::new(Mutex::new(file)),
            last_hash: Arc::new(Mutex::new(last_hash)),
        })
    }

    fn read_last_hash(path: &Path) -> Result<String> {
        if !path.exists() {
            return Ok(String::new());
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);

        if let Some(Ok(line)) = reader.lines().last() {
            let event: AuditEvent = serde_json::from_str(&line)
                .map_err(|e| AuditError::Serialization(e.to_string()))?;
            Ok(event.hash)
        } else {
            Ok(String::new())
        }
    }

    /// Append an event to the chain
    pub async fn log(&self, mut event: AuditEvent) -> Result<()> {
        if event.severity < self.config.min_severity {
            return Ok(());
        }

        // Serialize and write under both locks so chain order matches
        // file order
        let mut last_hash = self.last_hash.lock().await;
        event.set_previous_hash(last_hash.clone());

        let mut json = serde_json::to_string(&event)
            .map_err(|e| AuditError::Serialization(e.to_string()))?;
        json.push('\n');

        let mut file = self.file.lock().await;
        file.write_all(json.as_bytes())?;
        file.flush()?;

        *last_hash = event.hash.clone();

        tracing::debug!(
            event_id = %event.event_id,
            event_type = ?event.event_type,
            "audit event appended"
        );

        Ok(())
    }

    /// Walk the chain and report the first break
    pub async fn verify_integrity(&self) -> Result<bool> {
        let file = File::open(&self.config.log_path)?;
        let reader = BufReader::new(file);

        let mut previous_hash = String::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let event: AuditEvent = serde_json::from_str(&line)
                .map_err(|e| AuditError::Serialization(e.to_string()))?;

            if !event.verify_hash() {
                return Err(AuditError::IntegrityFailure(format!(
                    "Event hash mismatch at line {}",
                    i + 1
                )));
            }

            if event.previous_hash != previous_hash {
                return Err(AuditError::IntegrityFailure(format!(
                    "Hash chain broken at line {}",
                    i + 1
                )));
            }

            previous_hash = event.hash.clone();
        }

        Ok(true)
    }
}
