use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{default_true, deserialize_some};
use crate::{
    entity::promotions::DiscountType,
    models::{Product, ProductPromotion, Promotion},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePromotionRequest {
    #[validate(length(min = 2, message = "Promotion name must be at least 2 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[validate(custom = "crate::validation::validate_money")]
    #[schema(value_type = String, example = "10")]
    pub discount_value: Decimal,
    pub code: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Products to link; duplicates are ignored.
    pub product_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePromotionRequest {
    #[validate(length(min = 2, message = "Promotion name must be at least 2 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub discount_type: Option<DiscountType>,
    #[validate(custom = "crate::validation::validate_money")]
    #[schema(value_type = Option<String>)]
    pub discount_value: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub code: Option<Option<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    /// When present (even empty) replaces every existing product link.
    pub product_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PromotionListQuery {
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default)]
    pub include_expired: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductLink {
    #[serde(flatten)]
    pub link: ProductPromotion,
    pub product: Product,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PromotionWithProducts {
    #[serde(flatten)]
    pub promotion: Promotion,
    /// Active flag set and the window contains the request time.
    pub is_live: bool,
    pub products: Vec<ProductLink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_summer_sale() {
        let req: CreatePromotionRequest = serde_json::from_value(serde_json::json!({
            "name": "Summer Sale",
            "discount_type": "PERCENTAGE",
            "discount_value": 10,
            "code": "SUMMER2023",
            "start_date": "2023-06-01T00:00:00Z",
            "end_date": "2024-08-31T00:00:00Z",
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.discount_type, DiscountType::Percentage);
        assert!(req.is_active);
        assert!(req.product_ids.is_none());
    }

    #[test]
    fn unknown_discount_type_is_rejected() {
        let parsed = serde_json::from_value::<CreatePromotionRequest>(serde_json::json!({
            "name": "Odd",
            "discount_type": "FREEBIE",
            "discount_value": 10,
            "start_date": "2023-06-01T00:00:00Z",
            "end_date": "2024-08-31T00:00:00Z",
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn discount_value_must_be_positive() {
        let req: UpdatePromotionRequest =
            serde_json::from_str(r#"{"discount_value": 0}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn discount_value_is_limited_to_cents() {
        let req: CreatePromotionRequest = serde_json::from_value(serde_json::json!({
            "name": "Tiny",
            "discount_type": "FIXED",
            "discount_value": "0.004",
            "start_date": "2023-06-01T00:00:00Z",
            "end_date": "2024-08-31T00:00:00Z",
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.field_errors()["discount_value"][0].code, "precision");

        let req: UpdatePromotionRequest =
            serde_json::from_str(r#"{"discount_value": "12.50"}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_product_ids_are_kept_distinct_from_absent() {
        let req: UpdatePromotionRequest = serde_json::from_str(r#"{"product_ids": []}"#).unwrap();
        assert_eq!(req.product_ids, Some(vec![]));
        let req: UpdatePromotionRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.product_ids, None);
    }
}
