use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::subscription::{SubscriptionPlan, SubscriptionStatus};

/// User entity. The id is the subject of the externally issued JWT.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub subscription_plan: SubscriptionPlan,
    pub subscription_status: SubscriptionStatus,
    #[serde(skip_serializing)]
    pub stripe_customer_id: Option<String>,
    #[serde(skip_serializing)]
    pub stripe_subscription_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Paid users get the stronger analysis model.
    pub fn is_paid(&self) -> bool {
        is_paid(self.subscription_plan, self.subscription_status)
    }
}

pub fn is_paid(plan: SubscriptionPlan, status: SubscriptionStatus) -> bool {
    plan != SubscriptionPlan::Free && status.grants_access()
}

/// Subscription fields written after a successful checkout or a webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
}
