//! Subscription facade
//!
//! The single entry point UI and AI callers talk to. Composes the plan
//! catalog, the usage ledger, feature access evaluation, and purchase
//! reconciliation behind one boundary; every operation returns a typed
//! result, nothing is thrown across it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::access;
use crate::ledger::{UsageError, UsageLedger};
use crate::plan::{self, Plan, PlanError, PlanId};
use crate::ports::billing::{BillingPort, PurchaseError};
use crate::ports::storage::{KeyValuePort, StorageError};
use crate::reconcile::{self, Applied, ReconcileError};
use crate::status::SubscriptionStatus;

/// Backoff before the single storage retry during initialization
const INIT_RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Errors surfaced across the facade boundary
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// The monthly generation quota is exhausted
    #[error("Monthly generation quota exceeded ({used}/{limit})")]
    QuotaExceeded { used: u32, limit: u32 },

    /// Persistence failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The purchase platform reported a failure
    #[error("Purchase error: {0}")]
    Purchase(#[from] PurchaseError),

    /// Reconciling a purchase result failed
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Unknown plan identifier
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// The requested plan cannot be bought (free tier)
    #[error("Plan '{0}' is not purchasable")]
    NotPurchasable(PlanId),
}

impl From<UsageError> for SubscriptionError {
    fn from(err: UsageError) -> Self {
        match err {
            UsageError::QuotaExceeded { used, limit } => {
                SubscriptionError::QuotaExceeded { used, limit }
            }
            UsageError::Storage(e) => SubscriptionError::Storage(e),
        }
    }
}

/// Facade over plan catalog, usage ledger, and purchase reconciliation
///
/// Generic over its collaborators so tests can inject mocks; production
/// wiring injects the SQLite and sandbox adapters.
pub struct SubscriptionService<S, B>
where
    S: KeyValuePort + 'static,
    B: BillingPort + 'static,
{
    ledger: UsageLedger<S>,
    billing: Arc<B>,
    /// Serializes purchase/restore reconciliation so idempotence checks
    /// cannot interleave
    purchase_lock: tokio::sync::Mutex<()>,
}

impl<S, B> std::fmt::Debug for SubscriptionService<S, B>
where
    S: KeyValuePort + 'static,
    B: BillingPort + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionService").finish_non_exhaustive()
    }
}

impl<S, B> SubscriptionService<S, B>
where
    S: KeyValuePort + 'static,
    B: BillingPort + 'static,
{
    /// Loads subscription state and wires the purchase platform
    ///
    /// A failed storage read is retried once after a short backoff before
    /// the error surfaces.
    pub async fn initialize(
        storage: Arc<S>,
        billing: Arc<B>,
        now: DateTime<Utc>,
    ) -> Result<Self, SubscriptionError> {
        let ledger = match UsageLedger::load(Arc::clone(&storage), now).await {
            Ok(ledger) => ledger,
            Err(first) => {
                warn!(error = %first, "Loading subscription state failed, retrying once");
                tokio::time::sleep(INIT_RETRY_BACKOFF).await;
                UsageLedger::load(storage, now).await?
            }
        };

        Ok(Self {
            ledger,
            billing,
            purchase_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Current status snapshot, with any due monthly reset applied first
    pub async fn current_status(
        &self,
        now: DateTime<Utc>,
    ) -> Result<SubscriptionStatus, SubscriptionError> {
        self.ledger.reset_if_due(now).await?;
        Ok(self.ledger.snapshot().await)
    }

    /// Catalog record for the currently active plan
    pub async fn active_plan(&self) -> &'static Plan {
        self.ledger.snapshot().await.plan()
    }

    /// Whether another AI draft is permitted right now
    pub async fn can_use_ai_generation(
        &self,
        now: DateTime<Utc>,
    ) -> Result<bool, SubscriptionError> {
        let status = self.current_status(now).await?;
        Ok(access::can_use_ai_generation(&status))
    }

    /// Consumes one generation from the monthly quota
    ///
    /// Monthly reset, quota check, and increment run as one critical
    /// section inside the ledger. Returns the new usage count.
    pub async fn increment_ai_usage(&self, now: DateTime<Utc>) -> Result<u32, SubscriptionError> {
        Ok(self.ledger.record_generation(now).await?)
    }

    /// Returns a reserved generation after a failed draft
    pub async fn release_ai_usage(&self) -> Result<u32, SubscriptionError> {
        Ok(self.ledger.release_generation().await?)
    }

    /// Buys a plan through the purchase platform and reconciles the result
    ///
    /// The free tier is not purchasable. Cancelled flows come back as
    /// [`Applied::Cancelled`] without touching state.
    pub async fn purchase_plan(
        &self,
        plan_id: PlanId,
        now: DateTime<Utc>,
    ) -> Result<Applied, SubscriptionError> {
        let plan = plan::lookup(plan_id);
        if !plan.is_premium() {
            return Err(SubscriptionError::NotPurchasable(plan_id));
        }

        let _serial = self.purchase_lock.lock().await;
        info!(plan = %plan_id, product = plan.product_id, "Starting purchase flow");
        let result = self.billing.purchase(plan.product_id).await?;
        Ok(reconcile::apply(&self.ledger, result, now).await?)
    }

    /// Replays completed purchases from the platform, one at a time
    ///
    /// An empty list leaves the status unchanged and returns no outcomes.
    pub async fn restore_purchases(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Applied>, SubscriptionError> {
        let _serial = self.purchase_lock.lock().await;
        let results = self.billing.restore_purchases().await?;
        if results.is_empty() {
            info!("No purchases to restore");
            return Ok(Vec::new());
        }

        let mut outcomes = Vec::with_capacity(results.len());
        for result in results {
            outcomes.push(reconcile::apply(&self.ledger, result, now).await?);
        }
        Ok(outcomes)
    }

    /// Reverts to the free tier and deactivates the subscription
    pub async fn cancel_subscription(&self) -> Result<SubscriptionStatus, SubscriptionError> {
        Ok(self.ledger.deactivate().await?)
    }
}
