//! Behavioral signal source and in-memory activity tracker
//!
//! The scorer consumes signals through the `FraudSignalSource` port. The
//! `ActivityTracker` adapter keeps per-user rolling-window history in
//! memory for deployments without a dedicated analytics store.

use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

/// Read-side port for behavioral signals keyed by user
#[async_trait]
pub trait FraudSignalSource: Send + Sync {
    /// Average successful payment amount inside the window, if any
    async fn historical_average(&self, user_id: Uuid) -> Result<Option<Decimal>>;

    /// Number of payment attempts inside the window
    async fn transaction_count(&self, user_id: Uuid) -> Result<u32>;

    /// Number of failed attempts inside the window
    async fn failure_count(&self, user_id: Uuid) -> Result<u32>;

    /// Whether this device has been seen for the user before
    async fn is_known_device(&self, user_id: Uuid, device_id: &str) -> Result<bool>;

    /// Whether this location has been seen for the user before
    async fn is_known_location(&self, user_id: Uuid, location: &str) -> Result<bool>;
}

/// One payment attempt in the rolling window
#[derive(Debug, Clone)]
struct AttemptRecord {
    amount: Decimal,
    succeeded: bool,
    timestamp: DateTime<Utc>,
}

/// Per-user behavioral history
#[derive(Default)]
struct UserActivity {
    attempts: Vec<AttemptRecord>,
    devices: HashSet<String>,
    locations: HashSet<String>,
}

impl UserActivity {
    /// Drop attempts outside the window
    fn cleanup(&mut self, window_start: DateTime<Utc>) {
        self.attempts.retain(|a| a.timestamp >= window_start);
    }
}

/// In-memory rolling-window activity tracker
pub struct ActivityTracker {
    window_hours: i64,
    users: DashMap<Uuid, UserActivity>,
}

impl ActivityTracker {
    /// Create a tracker with the given rolling window
    pub fn new(window_hours: i64) -> Self {
        Self {
            window_hours,
            users: DashMap::new(),
        }
    }

    /// Record one payment attempt
    pub fn record_attempt(&self, user_id: Uuid, amount: Decimal, succeeded: bool) {
        let mut entry = self.users.entry(user_id).or_default();
        entry.attempts.push(AttemptRecord {
            amount,
            succeeded,
            timestamp: Utc::now(),
        });
    }

    /// Register a device as known for the user
    pub fn register_device(&self, user_id: Uuid, device_id: &str) {
        self.users
            .entry(user_id)
            .or_default()
            .devices
            .insert(device_id.to_string());
    }

    /// Register a location as known for the user
    pub fn register_location(&self, user_id: Uuid, location: &str) {
        self.users
            .entry(user_id)
            .or_default()
            .locations
            .insert(location.to_string());
    }

    /// Number of tracked users
    pub fn tracked_users(&self) -> usize {
        self.users.len()
    }

    fn window_start(&self) -> DateTime<Utc> {
        Utc::now() - Duration::hours(self.window_hours)
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new(24)
    }
}

#[async_trait]
impl FraudSignalSource for ActivityTracker {
    async fn historical_average(&self, user_id: Uuid) -> Result<Option<Decimal>> {
        let window_start = self.window_start();
        Ok(self.users.get_mut(&user_id).and_then(|mut entry| {
            entry.cleanup(window_start);
            let successes: Vec<Decimal> = entry
                .attempts
                .iter()
                .filter(|a| a.succeeded)
                .map(|a| a.amount)
                .collect();
            if successes.is_empty() {
                None
            } else {
                let total: Decimal = successes.iter().sum();
                Some(total / Decimal::from(successes.len()))
            }
        }))
    }

    async fn transaction_count(&self, user_id: Uuid) -> Result<u32> {
        let window_start = self.window_start();
        Ok(self
            .users
            .get_mut(&user_id)
            .map(|mut entry| {
                entry.cleanup(window_start);
                entry.attempts.len() as u32
            })
            .unwrap_or(0))
    }

    async fn failure_count(&self, user_id: Uuid) -> Result<u32> {
        let window_start = self.window_start();
        Ok(self
            .users
            .get_mut(&user_id)
            .map(|mut entry| {
                entry.cleanup(window_start);
                entry.attempts.iter().filter(|a| !a.succeeded).count() as u32
            })
            .unwrap_or(0))
    }

    async fn is_known_device(&self, user_id: Uuid, device_id: &str) -> Result<bool> {
        Ok(self
            .users
            .get(&user_id)
            .map(|entry| entry.devices.contains(device_id))
            .unwrap_or(false))
    }

    async fn is_known_location(&self, user_id: Uuid, location: &str) -> Result<bool> {
        Ok(self
            .users
            .get(&user_id)
            .map(|entry| entry.locations.contains(location))
            .unwrap_or(false))
    }
}
