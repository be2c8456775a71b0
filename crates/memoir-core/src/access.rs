//! Feature access evaluation
//!
//! Pure, total functions mapping a status snapshot to capability grants.
//! Nothing here touches storage; callers are expected to refresh the
//! snapshot (month reset included) before evaluating.

use crate::plan::Plan;
use crate::status::SubscriptionStatus;

/// Whether another AI diary draft is permitted right now
pub fn can_use_ai_generation(status: &SubscriptionStatus) -> bool {
    status.is_active && status.usage_count < status.plan().monthly_generation_limit
}

/// Whether the premium feature set is unlocked
pub fn can_access_premium_features(status: &SubscriptionStatus) -> bool {
    status.is_active && status.plan().is_premium()
}

pub fn has_writing_prompts(status: &SubscriptionStatus) -> bool {
    status.is_active && status.plan().writing_prompts
}

pub fn has_advanced_filters(status: &SubscriptionStatus) -> bool {
    status.is_active && status.plan().advanced_filters
}

pub fn has_advanced_analytics(status: &SubscriptionStatus) -> bool {
    status.is_active && status.plan().advanced_analytics
}

pub fn has_priority_support(status: &SubscriptionStatus) -> bool {
    status.is_active && status.plan().priority_support
}

/// A full capability evaluation, convenient for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlements {
    pub ai_generation: bool,
    pub remaining_generations: u32,
    pub premium_features: bool,
    pub writing_prompts: bool,
    pub advanced_filters: bool,
    pub advanced_analytics: bool,
    pub priority_support: bool,
}

impl Entitlements {
    /// Evaluates every capability against one snapshot
    pub fn evaluate(status: &SubscriptionStatus) -> Self {
        Self {
            ai_generation: can_use_ai_generation(status),
            remaining_generations: status.remaining_generations(),
            premium_features: can_access_premium_features(status),
            writing_prompts: has_writing_prompts(status),
            advanced_filters: has_advanced_filters(status),
            advanced_analytics: has_advanced_analytics(status),
            priority_support: has_priority_support(status),
        }
    }

    /// Capabilities a plan would grant to an active subscriber
    ///
    /// Used by the catalog listing, where no status exists yet.
    pub fn for_plan(plan: &Plan) -> Self {
        Self {
            ai_generation: true,
            remaining_generations: plan.monthly_generation_limit,
            premium_features: plan.is_premium(),
            writing_prompts: plan.writing_prompts,
            advanced_filters: plan.advanced_filters,
            advanced_analytics: plan.advanced_analytics,
            priority_support: plan.priority_support,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanId;
    use chrono::{TimeZone, Utc};

    fn active_status(plan_id: PlanId) -> SubscriptionStatus {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut status = SubscriptionStatus::fresh(now);
        status.plan_id = plan_id;
        if plan_id.is_premium() {
            status.expires_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
        }
        status
    }

    #[test]
    fn test_inactive_blocks_everything() {
        let mut status = active_status(PlanId::PremiumYearly);
        status.is_active = false;

        assert!(!can_use_ai_generation(&status));
        assert!(!can_access_premium_features(&status));
        assert!(!has_writing_prompts(&status));
        assert!(!has_advanced_analytics(&status));
        assert!(!has_priority_support(&status));
    }

    #[test]
    fn test_inactive_blocks_generation_regardless_of_usage() {
        let mut status = active_status(PlanId::Basic);
        status.is_active = false;
        status.usage_count = 0;
        assert!(!can_use_ai_generation(&status));
    }

    #[test]
    fn test_generation_gated_by_quota() {
        let mut status = active_status(PlanId::Basic);
        assert!(can_use_ai_generation(&status));

        status.usage_count = 9;
        assert!(can_use_ai_generation(&status));

        status.usage_count = 10;
        assert!(!can_use_ai_generation(&status));
    }

    #[test]
    fn test_basic_has_no_premium_features() {
        let status = active_status(PlanId::Basic);
        assert!(!can_access_premium_features(&status));
        assert!(!has_writing_prompts(&status));
        assert!(!has_advanced_filters(&status));
    }

    #[test]
    fn test_premium_grants_flags() {
        let status = active_status(PlanId::PremiumMonthly);
        assert!(can_access_premium_features(&status));
        assert!(has_writing_prompts(&status));
        assert!(has_advanced_filters(&status));
        assert!(has_advanced_analytics(&status));
        assert!(has_priority_support(&status));
    }

    #[test]
    fn test_entitlements_summary() {
        let mut status = active_status(PlanId::PremiumYearly);
        status.usage_count = 40;

        let grants = Entitlements::evaluate(&status);
        assert!(grants.ai_generation);
        assert_eq!(grants.remaining_generations, 60);
        assert!(grants.premium_features);
    }
}
