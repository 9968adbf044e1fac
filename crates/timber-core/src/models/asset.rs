use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::debt::validate_money;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "asset_type", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Savings,
    Investment,
    Property,
    Vehicle,
    #[default]
    Other,
}

impl AssetType {
    /// Best-effort mapping of a free-form label, as returned by document analysis.
    pub fn from_label(label: &str) -> Self {
        let label = label.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| label.contains(w));

        if has(&["saving", "checking", "cash", "deposit", "money market"]) {
            AssetType::Savings
        } else if has(&["invest", "401", "ira", "brokerage", "retire", "stock", "fund"]) {
            AssetType::Investment
        } else if has(&["property", "real estate", "home", "house"]) {
            AssetType::Property
        } else if has(&["vehicle", "car", "auto", "truck"]) {
            AssetType::Vehicle
        } else {
            AssetType::Other
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub asset_type: AssetType,
    pub current_value: Decimal,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub asset_type: AssetType,
    #[validate(custom(function = "validate_money"))]
    pub current_value: Decimal,
    #[validate(length(max = 1000))]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub asset_type: Option<AssetType>,
    #[validate(custom(function = "validate_money"))]
    pub current_value: Option<Decimal>,
    #[validate(length(max = 1000))]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_type_from_label() {
        assert_eq!(AssetType::from_label("High-yield Savings"), AssetType::Savings);
        assert_eq!(AssetType::from_label("Vanguard 401(k)"), AssetType::Investment);
        assert_eq!(AssetType::from_label("Primary home"), AssetType::Property);
        assert_eq!(AssetType::from_label("2019 Honda (car)"), AssetType::Vehicle);
        assert_eq!(AssetType::from_label("Art collection"), AssetType::Other);
    }

    #[test]
    fn test_create_asset_request_rejects_negative_value() {
        let req = CreateAssetRequest {
            name: "Emergency fund".to_string(),
            asset_type: AssetType::Savings,
            current_value: Decimal::from(-10),
            details: None,
        };
        assert!(req.validate().is_err());
    }
}
