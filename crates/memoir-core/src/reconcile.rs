//! Purchase reconciliation
//!
//! Applies a purchase platform result to local subscription state, exactly
//! once per transaction. The caller (the subscription facade) feeds results
//! through here one at a time, so the idempotence check in the ledger cannot
//! race with itself.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::ledger::{PlanChange, UsageLedger};
use crate::plan::{self, BillingPeriod, Plan, PlanId};
use crate::ports::billing::{PurchaseOutcome, PurchaseResult};
use crate::ports::storage::{KeyValuePort, StorageError};

/// Paid period granted by a monthly purchase
const MONTHLY_PERIOD_DAYS: i64 = 30;

/// Paid period granted by a yearly purchase
const YEARLY_PERIOD_DAYS: i64 = 365;

/// Errors that can occur during reconciliation
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A purchased/restored result arrived without a transaction id
    #[error("Purchase result is missing a transaction id")]
    MissingTransactionId,

    /// The platform reported a failed flow
    #[error("Purchase failed: {0}")]
    Platform(String),

    /// Persisting the plan change failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// What reconciliation did with a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The plan change was applied
    Activated { plan: PlanId },
    /// The transaction was applied previously; nothing changed
    AlreadyApplied,
    /// The user cancelled the flow; nothing changed
    Cancelled,
    /// A restored purchase whose paid period already ended; nothing changed
    Expired,
}

/// Computes the paid-period end for a plan purchased at `purchased_at`
///
/// Non-premium plans have no expiry.
pub fn compute_expiry(plan: &Plan, purchased_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match plan.billing_period {
        BillingPeriod::None => None,
        BillingPeriod::Monthly => Some(purchased_at + Duration::days(MONTHLY_PERIOD_DAYS)),
        BillingPeriod::Yearly => Some(purchased_at + Duration::days(YEARLY_PERIOD_DAYS)),
    }
}

/// Applies one purchase result to the ledger
///
/// State machine over [`PurchaseOutcome`]:
/// - `Purchased`: validate the transaction id, then activate with an expiry
///   computed from `now`.
/// - `Restored`: same application path, but the expiry is computed from the
///   original purchase timestamp; a restore whose period already ended is
///   reported as [`Applied::Expired`] without mutating anything. Usage
///   counters are never reset by either path.
/// - `Cancelled`: surfaced to the caller, no mutation.
/// - `Failed`: propagated as [`ReconcileError::Platform`], no mutation.
pub async fn apply<S: KeyValuePort>(
    ledger: &UsageLedger<S>,
    result: PurchaseResult,
    now: DateTime<Utc>,
) -> Result<Applied, ReconcileError> {
    match result.outcome {
        PurchaseOutcome::Cancelled => {
            info!(product = %result.product_id, "Purchase cancelled by user");
            Ok(Applied::Cancelled)
        }
        PurchaseOutcome::Failed { reason } => {
            warn!(product = %result.product_id, %reason, "Purchase failed");
            Err(ReconcileError::Platform(reason))
        }
        PurchaseOutcome::Purchased => {
            let transaction_id = require_transaction_id(&result)?;
            let plan = plan::lookup(result.plan);
            activate(ledger, plan, transaction_id, now).await
        }
        PurchaseOutcome::Restored => {
            let transaction_id = require_transaction_id(&result)?;
            let plan = plan::lookup(result.plan);
            let expiry = compute_expiry(plan, result.purchased_at);
            if let Some(expires_at) = expiry {
                if expires_at <= now {
                    info!(
                        product = %result.product_id,
                        %expires_at,
                        "Restored purchase already expired, ignoring"
                    );
                    return Ok(Applied::Expired);
                }
            }
            activate(ledger, plan, transaction_id, result.purchased_at).await
        }
    }
}

fn require_transaction_id(result: &PurchaseResult) -> Result<String, ReconcileError> {
    match result.transaction_id.as_deref() {
        Some(id) if !id.trim().is_empty() => Ok(id.to_string()),
        _ => Err(ReconcileError::MissingTransactionId),
    }
}

async fn activate<S: KeyValuePort>(
    ledger: &UsageLedger<S>,
    plan: &'static Plan,
    transaction_id: String,
    purchased_at: DateTime<Utc>,
) -> Result<Applied, ReconcileError> {
    let applied = ledger
        .set_plan(PlanChange {
            plan_id: plan.id,
            expires_at: compute_expiry(plan, purchased_at),
            transaction_id,
            purchased_at,
            auto_renewal: plan.is_premium(),
        })
        .await?;

    if applied {
        Ok(Applied::Activated { plan: plan.id })
    } else {
        Ok(Applied::AlreadyApplied)
    }
}
