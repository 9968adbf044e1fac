use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TipCategory {
    Savings,
    Debt,
    Budget,
    General,
}

/// A short piece of themed advice shown by Timber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Tip {
    #[schema(value_type = String)]
    pub id: &'static str,
    pub category: TipCategory,
    #[schema(value_type = String)]
    pub title: &'static str,
    #[schema(value_type = String)]
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TipQuery {
    pub category: Option<TipCategory>,
}
