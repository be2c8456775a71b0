//! The persisted subscription status record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::plan::{self, Plan, PlanId};

/// The single mutable subscription record for this user
///
/// Exactly one instance exists, owned by the usage ledger and serialized as
/// JSON into the key-value store. Every other component sees read-only
/// snapshots.
///
/// Invariants (enforced by the ledger):
/// - `usage_count` never exceeds the active plan's monthly limit
/// - `usage_count` resets to 0 once per calendar-month boundary relative to
///   `last_reset_at`
/// - `expires_at` is `None` iff the plan is non-premium
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    /// Active plan
    pub plan_id: PlanId,
    /// Whether the subscription is currently active
    pub is_active: bool,
    /// When this record was first activated
    pub started_at: DateTime<Utc>,
    /// When the paid period ends; `None` on the free tier
    pub expires_at: Option<DateTime<Utc>>,
    /// AI drafts consumed in the current calendar month
    pub usage_count: u32,
    /// Start of the current usage month
    pub last_reset_at: DateTime<Utc>,
    /// Whether the platform will renew the paid period automatically
    pub auto_renewal: bool,
    /// Platform transaction id of the applied purchase, if any
    pub transaction_id: Option<String>,
    /// When the applied purchase was made, if any
    pub last_purchase_at: Option<DateTime<Utc>>,
}

impl SubscriptionStatus {
    /// The record a fresh install starts from: active Basic, zero usage
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            plan_id: PlanId::Basic,
            is_active: true,
            started_at: now,
            expires_at: None,
            usage_count: 0,
            last_reset_at: now,
            auto_renewal: false,
            transaction_id: None,
            last_purchase_at: None,
        }
    }

    /// Catalog record for the active plan
    pub fn plan(&self) -> &'static Plan {
        plan::lookup(self.plan_id)
    }

    /// Drafts left in the current month, saturating at zero
    pub fn remaining_generations(&self) -> u32 {
        self.plan()
            .monthly_generation_limit
            .saturating_sub(self.usage_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_fresh_install_is_active_basic() {
        let status = SubscriptionStatus::fresh(at(2024, 6, 1));
        assert_eq!(status.plan_id, PlanId::Basic);
        assert!(status.is_active);
        assert_eq!(status.usage_count, 0);
        assert!(status.expires_at.is_none());
        assert!(status.transaction_id.is_none());
        assert!(!status.auto_renewal);
    }

    #[test]
    fn test_remaining_generations() {
        let mut status = SubscriptionStatus::fresh(at(2024, 6, 1));
        assert_eq!(status.remaining_generations(), 10);

        status.usage_count = 9;
        assert_eq!(status.remaining_generations(), 1);

        status.usage_count = 10;
        assert_eq!(status.remaining_generations(), 0);

        // Saturates if the limit shrank under the count (plan downgrade)
        status.usage_count = 42;
        assert_eq!(status.remaining_generations(), 0);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut status = SubscriptionStatus::fresh(at(2024, 6, 1));
        status.plan_id = PlanId::PremiumYearly;
        status.expires_at = Some(at(2025, 6, 1));
        status.transaction_id = Some("txn-7".to_string());

        let bytes = serde_json::to_vec(&status).unwrap();
        let back: SubscriptionStatus = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, status);
    }
}
