use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Subscription plan offered through Stripe checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "subscription_plan", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    Free,
    ProMonthly,
    ProAnnual,
    FamilyMonthly,
    FamilyAnnual,
}

impl SubscriptionPlan {
    /// Plans that can be purchased through checkout.
    pub const PAID: [SubscriptionPlan; 4] = [
        SubscriptionPlan::FamilyMonthly,
        SubscriptionPlan::ProAnnual,
        SubscriptionPlan::FamilyAnnual,
        SubscriptionPlan::ProMonthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::ProMonthly => "pro_monthly",
            SubscriptionPlan::ProAnnual => "pro_annual",
            SubscriptionPlan::FamilyMonthly => "family_monthly",
            SubscriptionPlan::FamilyAnnual => "family_annual",
        }
    }

    /// Parse the plan key sent by the checkout form. Case-insensitive, and
    /// only paid plans are accepted.
    pub fn from_checkout_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::PAID.into_iter().find(|plan| plan.as_str() == key)
    }

    /// Environment variable holding the Stripe price id for this plan.
    pub fn price_env_var(&self) -> Option<&'static str> {
        match self {
            SubscriptionPlan::Free => None,
            SubscriptionPlan::ProMonthly => Some("PRICE_PRO_MONTHLY"),
            SubscriptionPlan::ProAnnual => Some("PRICE_PRO_ANNUAL"),
            SubscriptionPlan::FamilyMonthly => Some("PRICE_FAMILY_MONTHLY"),
            SubscriptionPlan::FamilyAnnual => Some("PRICE_FAMILY_ANNUAL"),
        }
    }
}

impl Display for SubscriptionPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubscriptionPlan {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(SubscriptionPlan::Free),
            "pro_monthly" => Ok(SubscriptionPlan::ProMonthly),
            "pro_annual" => Ok(SubscriptionPlan::ProAnnual),
            "family_monthly" => Ok(SubscriptionPlan::FamilyMonthly),
            "family_annual" => Ok(SubscriptionPlan::FamilyAnnual),
            _ => Err(anyhow::anyhow!("Invalid subscription plan: {}", s)),
        }
    }
}

/// Subscription lifecycle status, mirroring Stripe's subscription states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "subscription_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Incomplete,
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::Inactive => "inactive",
        }
    }

    /// Map a Stripe subscription status string. Unknown states (for example
    /// `unpaid` or `incomplete_expired`) count as inactive.
    pub fn from_stripe(status: &str) -> Self {
        match status {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "past_due" => SubscriptionStatus::PastDue,
            "canceled" => SubscriptionStatus::Canceled,
            "incomplete" => SubscriptionStatus::Incomplete,
            _ => SubscriptionStatus::Inactive,
        }
    }

    pub fn grants_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
