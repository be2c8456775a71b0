//! Sandbox purchase platform adapter
//!
//! An in-process stand-in for the device app store. Purchases complete
//! immediately with deterministic sandbox transaction ids and are remembered
//! for restore. Tests (and the CLI demo flows) can script the next flow to
//! cancel or fail.

use async_trait::async_trait;
use chrono::Utc;
use memoir_core::plan;
use memoir_core::ports::billing::{BillingPort, PurchaseError, PurchaseOutcome, PurchaseResult};
use tokio::sync::Mutex;
use tracing::info;

/// How the next purchase flow should end
#[derive(Debug, Clone, Default)]
enum NextFlow {
    #[default]
    Complete,
    Cancel,
    Fail(String),
}

#[derive(Default)]
struct SandboxState {
    next_transaction: u64,
    completed: Vec<PurchaseResult>,
    next_flow: NextFlow,
}

/// Sandbox implementation of BillingPort
pub struct SandboxBillingAdapter {
    state: Mutex<SandboxState>,
}

impl SandboxBillingAdapter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SandboxState {
                next_transaction: 1000,
                ..Default::default()
            }),
        }
    }

    /// Makes the next purchase flow end with a user cancellation
    pub async fn cancel_next(&self) {
        self.state.lock().await.next_flow = NextFlow::Cancel;
    }

    /// Makes the next purchase flow fail with `reason`
    pub async fn fail_next(&self, reason: impl Into<String>) {
        self.state.lock().await.next_flow = NextFlow::Fail(reason.into());
    }

    /// Number of purchases completed in this sandbox
    pub async fn completed_count(&self) -> usize {
        self.state.lock().await.completed.len()
    }
}

impl Default for SandboxBillingAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BillingPort for SandboxBillingAdapter {
    async fn purchase(&self, product_id: &str) -> Result<PurchaseResult, PurchaseError> {
        let plan = plan::find_by_product(product_id)
            .map_err(|_| PurchaseError::ProductUnavailable(product_id.to_string()))?;

        let mut state = self.state.lock().await;
        let flow = std::mem::take(&mut state.next_flow);
        let now = Utc::now();

        match flow {
            NextFlow::Cancel => {
                info!(product = product_id, "Sandbox purchase cancelled");
                Ok(PurchaseResult {
                    outcome: PurchaseOutcome::Cancelled,
                    product_id: product_id.to_string(),
                    transaction_id: None,
                    purchased_at: now,
                    plan: plan.id,
                })
            }
            NextFlow::Fail(reason) => {
                info!(product = product_id, %reason, "Sandbox purchase failed");
                Ok(PurchaseResult {
                    outcome: PurchaseOutcome::Failed { reason },
                    product_id: product_id.to_string(),
                    transaction_id: None,
                    purchased_at: now,
                    plan: plan.id,
                })
            }
            NextFlow::Complete => {
                let transaction_id = format!("sandbox-{}", state.next_transaction);
                state.next_transaction += 1;

                let result = PurchaseResult {
                    outcome: PurchaseOutcome::Purchased,
                    product_id: product_id.to_string(),
                    transaction_id: Some(transaction_id.clone()),
                    purchased_at: now,
                    plan: plan.id,
                };
                state.completed.push(result.clone());

                info!(product = product_id, %transaction_id, "Sandbox purchase completed");
                Ok(result)
            }
        }
    }

    async fn restore_purchases(&self) -> Result<Vec<PurchaseResult>, PurchaseError> {
        let state = self.state.lock().await;
        Ok(state
            .completed
            .iter()
            .map(|completed| PurchaseResult {
                outcome: PurchaseOutcome::Restored,
                ..completed.clone()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::plan::PlanId;

    #[tokio::test]
    async fn test_purchase_completes_with_transaction_id() {
        let billing = SandboxBillingAdapter::new();
        let result = billing.purchase("com.memoir.premium.yearly").await.unwrap();

        assert_eq!(result.outcome, PurchaseOutcome::Purchased);
        assert_eq!(result.plan, PlanId::PremiumYearly);
        assert_eq!(result.transaction_id.as_deref(), Some("sandbox-1000"));
    }

    #[tokio::test]
    async fn test_transaction_ids_are_unique() {
        let billing = SandboxBillingAdapter::new();
        let first = billing.purchase("com.memoir.premium.monthly").await.unwrap();
        let second = billing.purchase("com.memoir.premium.monthly").await.unwrap();
        assert_ne!(first.transaction_id, second.transaction_id);
    }

    #[tokio::test]
    async fn test_unknown_product_is_rejected() {
        let billing = SandboxBillingAdapter::new();
        let err = billing.purchase("com.memoir.unknown").await.unwrap_err();
        assert!(matches!(err, PurchaseError::ProductUnavailable(_)));
    }

    #[tokio::test]
    async fn test_cancel_next_yields_cancelled_result() {
        let billing = SandboxBillingAdapter::new();
        billing.cancel_next().await;

        let result = billing.purchase("com.memoir.premium.yearly").await.unwrap();
        assert_eq!(result.outcome, PurchaseOutcome::Cancelled);
        assert!(result.transaction_id.is_none());

        // The scripted flow only applies once
        let result = billing.purchase("com.memoir.premium.yearly").await.unwrap();
        assert_eq!(result.outcome, PurchaseOutcome::Purchased);
    }

    #[tokio::test]
    async fn test_fail_next_carries_reason() {
        let billing = SandboxBillingAdapter::new();
        billing.fail_next("card declined").await;

        let result = billing.purchase("com.memoir.premium.monthly").await.unwrap();
        match result.outcome {
            PurchaseOutcome::Failed { reason } => assert_eq!(reason, "card declined"),
            other => panic!("Expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_restore_replays_completed_purchases() {
        let billing = SandboxBillingAdapter::new();
        assert!(billing.restore_purchases().await.unwrap().is_empty());

        billing.purchase("com.memoir.premium.yearly").await.unwrap();
        assert_eq!(billing.completed_count().await, 1);

        let restored = billing.restore_purchases().await.unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].outcome, PurchaseOutcome::Restored);
        assert_eq!(restored[0].transaction_id.as_deref(), Some("sandbox-1000"));
    }

    #[tokio::test]
    async fn test_cancelled_flows_are_not_restorable() {
        let billing = SandboxBillingAdapter::new();
        billing.cancel_next().await;
        billing.purchase("com.memoir.premium.yearly").await.unwrap();

        assert!(billing.restore_purchases().await.unwrap().is_empty());
    }
}
