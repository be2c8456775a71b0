//! Subscription plan catalog
//!
//! The closed set of plans Memoir sells and the entitlements each one grants.
//! The catalog is static; nothing here is persisted or mutated at runtime.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monthly AI-generation allowance on the Basic plan
pub const BASIC_MONTHLY_LIMIT: u32 = 10;

/// Monthly AI-generation allowance on the Premium plans
pub const PREMIUM_MONTHLY_LIMIT: u32 = 100;

/// Errors that can occur during plan lookup
#[derive(Debug, Error)]
pub enum PlanError {
    /// The identifier names no plan in the catalog
    #[error("Unknown plan: {0}")]
    Unknown(String),
}

/// Identifier for one of the closed set of plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanId {
    /// Free tier with a small monthly allowance
    Basic,
    /// Paid tier billed monthly
    PremiumMonthly,
    /// Paid tier billed yearly
    PremiumYearly,
}

impl PlanId {
    /// Returns the stable string form used in storage and on the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Basic => "basic",
            PlanId::PremiumMonthly => "premium_monthly",
            PlanId::PremiumYearly => "premium_yearly",
        }
    }

    /// Returns true for the paid tiers
    pub fn is_premium(&self) -> bool {
        !matches!(self, PlanId::Basic)
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlanId {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(PlanId::Basic),
            "premium_monthly" => Ok(PlanId::PremiumMonthly),
            "premium_yearly" => Ok(PlanId::PremiumYearly),
            other => Err(PlanError::Unknown(other.to_string())),
        }
    }
}

/// How a plan is billed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    /// Not billed (free tier)
    None,
    /// Billed every month
    Monthly,
    /// Billed every year
    Yearly,
}

/// An immutable plan record: quota, entitlements, and billing terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub id: PlanId,
    pub display_name: &'static str,
    /// AI diary drafts allowed per calendar month
    pub monthly_generation_limit: u32,
    pub writing_prompts: bool,
    pub advanced_filters: bool,
    pub advanced_analytics: bool,
    pub priority_support: bool,
    pub billing_period: BillingPeriod,
    /// Store product identifier; empty for the free tier
    pub product_id: &'static str,
    /// Display price
    pub price: &'static str,
}

impl Plan {
    /// Returns true for the paid tiers
    pub fn is_premium(&self) -> bool {
        self.id.is_premium()
    }
}

/// The full catalog, in presentation order: basic, premium_monthly,
/// premium_yearly.
static CATALOG: [Plan; 3] = [
    Plan {
        id: PlanId::Basic,
        display_name: "Basic",
        monthly_generation_limit: BASIC_MONTHLY_LIMIT,
        writing_prompts: false,
        advanced_filters: false,
        advanced_analytics: false,
        priority_support: false,
        billing_period: BillingPeriod::None,
        product_id: "",
        price: "Free",
    },
    Plan {
        id: PlanId::PremiumMonthly,
        display_name: "Premium Monthly",
        monthly_generation_limit: PREMIUM_MONTHLY_LIMIT,
        writing_prompts: true,
        advanced_filters: true,
        advanced_analytics: true,
        priority_support: true,
        billing_period: BillingPeriod::Monthly,
        product_id: "com.memoir.premium.monthly",
        price: "$4.99/month",
    },
    Plan {
        id: PlanId::PremiumYearly,
        display_name: "Premium Yearly",
        monthly_generation_limit: PREMIUM_MONTHLY_LIMIT,
        writing_prompts: true,
        advanced_filters: true,
        advanced_analytics: true,
        priority_support: true,
        billing_period: BillingPeriod::Yearly,
        product_id: "com.memoir.premium.yearly",
        price: "$39.99/year",
    },
];

/// Returns the plan record for a known identifier
///
/// Total over [`PlanId`]; the fallible path for externally supplied strings
/// is [`find`].
pub fn lookup(id: PlanId) -> &'static Plan {
    CATALOG
        .iter()
        .find(|plan| plan.id == id)
        .expect("every PlanId variant has a catalog entry")
}

/// Resolves an externally supplied plan identifier string
pub fn find(id: &str) -> Result<&'static Plan, PlanError> {
    let plan_id: PlanId = id.parse()?;
    Ok(lookup(plan_id))
}

/// Resolves a store product identifier to its plan
pub fn find_by_product(product_id: &str) -> Result<&'static Plan, PlanError> {
    CATALOG
        .iter()
        .find(|plan| !plan.product_id.is_empty() && plan.product_id == product_id)
        .ok_or_else(|| PlanError::Unknown(product_id.to_string()))
}

/// Returns all plans in presentation order
pub fn all() -> &'static [Plan] {
    &CATALOG
}
