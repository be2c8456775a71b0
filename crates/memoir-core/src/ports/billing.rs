//! Purchase platform port definition
//!
//! The purchase platform (the app store on device, a sandbox stand-in in
//! tests and the CLI) owns the money side of a subscription. Memoir only
//! consumes its results: each completed flow yields one [`PurchaseResult`]
//! that purchase reconciliation applies to local subscription state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::plan::PlanId;

/// Terminal state of a purchase platform flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Payment completed; entitlements should be granted
    Purchased,
    /// A previous purchase was restored on this device
    Restored,
    /// The user backed out; nothing changed
    Cancelled,
    /// The platform reported a failure
    Failed {
        /// Provider-supplied reason
        reason: String,
    },
}

/// Result of one purchase platform flow
///
/// Created by the platform callback and consumed exactly once by
/// reconciliation; never persisted directly.
#[derive(Debug, Clone)]
pub struct PurchaseResult {
    /// How the flow ended
    pub outcome: PurchaseOutcome,
    /// Store product identifier the flow was started for
    pub product_id: String,
    /// Platform transaction identifier; present on purchased/restored flows
    pub transaction_id: Option<String>,
    /// When the platform recorded the purchase
    pub purchased_at: DateTime<Utc>,
    /// Plan the product resolves to
    pub plan: PlanId,
}

/// Errors reported by the purchase platform itself
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// The product id is not sold on this platform
    #[error("Product not available: {0}")]
    ProductUnavailable(String),

    /// Purchases are disabled on this device (e.g., parental controls)
    #[error("Purchases are not allowed on this device")]
    NotAllowed,

    /// Platform-level failure
    #[error("Purchase platform error: {0}")]
    Platform(String),
}

/// Port for purchase platform operations
#[async_trait]
pub trait BillingPort: Send + Sync {
    /// Starts a purchase flow for `product_id` and waits for its result
    async fn purchase(&self, product_id: &str) -> Result<PurchaseResult, PurchaseError>;

    /// Replays previously completed purchases owned by this account
    ///
    /// An account with no purchases yields an empty list; that is not an
    /// error.
    async fn restore_purchases(&self) -> Result<Vec<PurchaseResult>, PurchaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_purchase_result_shape() {
        let result = PurchaseResult {
            outcome: PurchaseOutcome::Purchased,
            product_id: "com.memoir.premium.yearly".to_string(),
            transaction_id: Some("txn-1001".to_string()),
            purchased_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            plan: PlanId::PremiumYearly,
        };
        assert_eq!(result.outcome, PurchaseOutcome::Purchased);
        assert_eq!(result.plan, PlanId::PremiumYearly);
    }

    #[test]
    fn test_purchase_error_display() {
        let err = PurchaseError::ProductUnavailable("com.memoir.unknown".to_string());
        assert!(err.to_string().contains("com.memoir.unknown"));

        let err = PurchaseError::Platform("network unreachable".to_string());
        assert!(err.to_string().contains("network unreachable"));
    }
}
