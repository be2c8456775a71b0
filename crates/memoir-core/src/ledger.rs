//! Usage accounting ledger
//!
//! The ledger exclusively owns the [`SubscriptionStatus`] record. Every
//! mutation runs under a single async mutex so that the monthly reset, the
//! quota check, and the increment form one critical section: two
//! near-simultaneous draft requests can never both pass the limit check.
//! Mutations are written through to the key-value store before the in-memory
//! record is updated, so a failed write leaves the ledger unchanged.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::plan::PlanId;
use crate::ports::storage::{KeyValuePort, StorageError};
use crate::status::SubscriptionStatus;

/// Key the status record is stored under
pub const STATUS_KEY: &str = "subscription/status";

/// Errors that can occur while accounting usage
#[derive(Debug, Error)]
pub enum UsageError {
    /// The increment would pass the plan's monthly limit
    #[error("Monthly generation quota exceeded ({used}/{limit})")]
    QuotaExceeded { used: u32, limit: u32 },

    /// Persistence failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A plan replacement produced by purchase reconciliation
#[derive(Debug, Clone)]
pub struct PlanChange {
    pub plan_id: PlanId,
    pub expires_at: Option<DateTime<Utc>>,
    pub transaction_id: String,
    pub purchased_at: DateTime<Utc>,
    pub auto_renewal: bool,
}

/// Single-owner store for the subscription status record
pub struct UsageLedger<S: KeyValuePort> {
    storage: Arc<S>,
    state: Mutex<SubscriptionStatus>,
}

impl<S: KeyValuePort> UsageLedger<S> {
    /// Loads the ledger from storage, creating a fresh record on first run
    ///
    /// # Errors
    /// Returns `StorageError::Corrupt` if a stored record cannot be decoded;
    /// a missing record is not an error.
    pub async fn load(storage: Arc<S>, now: DateTime<Utc>) -> Result<Self, StorageError> {
        let state = match storage.get(STATUS_KEY).await? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
                    key: STATUS_KEY.to_string(),
                    reason: e.to_string(),
                })?
            }
            None => {
                let fresh = SubscriptionStatus::fresh(now);
                let bytes = encode(&fresh)?;
                storage.put(STATUS_KEY, bytes).await?;
                info!("Initialized fresh subscription record");
                fresh
            }
        };

        Ok(Self {
            storage,
            state: Mutex::new(state),
        })
    }

    /// Returns a read-only snapshot of the current record
    pub async fn snapshot(&self) -> SubscriptionStatus {
        self.state.lock().await.clone()
    }

    /// Zeroes the usage counter if the calendar month has advanced
    ///
    /// Returns whether a reset happened. Idempotent within a month.
    pub async fn reset_if_due(&self, now: DateTime<Utc>) -> Result<bool, StorageError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        if !apply_reset_if_due(&mut next, now) {
            return Ok(false);
        }
        self.persist(&next).await?;
        *state = next;
        Ok(true)
    }

    /// Consumes one generation from the monthly quota
    ///
    /// Performs reset-if-due, quota check, and increment under one lock
    /// acquisition. Returns the new usage count.
    ///
    /// # Errors
    /// `UsageError::QuotaExceeded` when the increment would pass the active
    /// plan's monthly limit; the record is left unmodified.
    pub async fn record_generation(&self, now: DateTime<Utc>) -> Result<u32, UsageError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        apply_reset_if_due(&mut next, now);

        let limit = next.plan().monthly_generation_limit;
        if next.usage_count + 1 > limit {
            debug!(used = next.usage_count, limit, "Quota check rejected increment");
            return Err(UsageError::QuotaExceeded {
                used: next.usage_count,
                limit,
            });
        }

        next.usage_count += 1;
        self.persist(&next).await?;
        *state = next;
        Ok(state.usage_count)
    }

    /// Returns one previously consumed generation to the quota
    ///
    /// Used when an AI draft fails after its quota slot was reserved.
    /// Saturates at zero. Returns the new usage count.
    pub async fn release_generation(&self) -> Result<u32, StorageError> {
        let mut state = self.state.lock().await;
        if state.usage_count == 0 {
            warn!("release_generation called with zero usage");
            return Ok(0);
        }
        let mut next = state.clone();
        next.usage_count -= 1;
        self.persist(&next).await?;
        *state = next;
        Ok(state.usage_count)
    }

    /// Applies a plan change if its transaction has not been applied before
    ///
    /// Returns `false` (and leaves the record untouched) when the stored
    /// transaction id already matches — replaying a purchase result must not
    /// double-apply entitlements. The usage counter is never modified here:
    /// monthly counters are independent of plan changes within a month.
    pub async fn set_plan(&self, change: PlanChange) -> Result<bool, StorageError> {
        let mut state = self.state.lock().await;
        if state.transaction_id.as_deref() == Some(change.transaction_id.as_str()) {
            debug!(
                transaction_id = %change.transaction_id,
                "Transaction already applied, skipping"
            );
            return Ok(false);
        }

        let mut next = state.clone();
        next.plan_id = change.plan_id;
        next.is_active = true;
        next.expires_at = change.expires_at;
        next.auto_renewal = change.auto_renewal;
        next.transaction_id = Some(change.transaction_id);
        next.last_purchase_at = Some(change.purchased_at);
        self.persist(&next).await?;
        *state = next;
        info!(plan = %state.plan_id, "Plan updated");
        Ok(true)
    }

    /// Reverts to the free tier and marks the subscription inactive
    ///
    /// Clears expiry, renewal, and transaction fields; the usage counter is
    /// left alone.
    pub async fn deactivate(&self) -> Result<SubscriptionStatus, StorageError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.plan_id = PlanId::Basic;
        next.is_active = false;
        next.expires_at = None;
        next.auto_renewal = false;
        next.transaction_id = None;
        self.persist(&next).await?;
        *state = next;
        info!("Subscription deactivated, reverted to basic");
        Ok(state.clone())
    }

    async fn persist(&self, state: &SubscriptionStatus) -> Result<(), StorageError> {
        let bytes = encode(state)?;
        self.storage.put(STATUS_KEY, bytes).await
    }
}

fn encode(state: &SubscriptionStatus) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec(state).map_err(|e| StorageError::Corrupt {
        key: STATUS_KEY.to_string(),
        reason: e.to_string(),
    })
}

/// Mutates `state` in place when `now` is in a later calendar month than the
/// last reset. Returns whether a reset was applied.
fn apply_reset_if_due(state: &mut SubscriptionStatus, now: DateTime<Utc>) -> bool {
    let last = state.last_reset_at;
    let advanced = (now.year(), now.month()) > (last.year(), last.month());
    if !advanced {
        return false;
    }
    state.usage_count = 0;
    state.last_reset_at = now;
    true
}
