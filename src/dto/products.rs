use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{Pagination, default_true, deserialize_some, split_csv};
use crate::models::{Category, Product, ProductPromotion, Promotion, Review};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 2, message = "Product name must be at least 2 characters"))]
    pub name: String,
    #[validate(
        length(min = 2, message = "Slug must be at least 2 characters"),
        regex(
            path = "crate::validation::SLUG_REGEX",
            message = "Slug must contain only lowercase letters, numbers, and hyphens"
        )
    )]
    pub slug: String,
    pub description: String,
    #[validate(custom = "crate::validation::validate_money")]
    #[schema(value_type = String, example = "10.99")]
    pub price: Decimal,
    #[validate(custom = "crate::validation::validate_money")]
    #[schema(value_type = Option<String>)]
    pub sale_price: Option<Decimal>,
    #[validate(url(message = "Image must be a valid URL"))]
    pub image: Option<String>,
    #[validate(custom = "crate::validation::validate_image_urls")]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    pub sku: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub region_codes: Vec<String>,
}

/// Partial update. Nullable columns accept an explicit `null` to clear them.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 2, message = "Product name must be at least 2 characters"))]
    pub name: Option<String>,
    #[validate(
        length(min = 2, message = "Slug must be at least 2 characters"),
        regex(
            path = "crate::validation::SLUG_REGEX",
            message = "Slug must contain only lowercase letters, numbers, and hyphens"
        )
    )]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "crate::validation::validate_money")]
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(custom = "crate::validation::validate_money")]
    #[schema(value_type = Option<String>)]
    pub sale_price: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(url(message = "Image must be a valid URL"))]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
    #[validate(custom = "crate::validation::validate_image_urls")]
    pub images: Option<Vec<String>>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub sku: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    pub tags: Option<Vec<String>>,
    pub region_codes: Option<Vec<String>>,
}

/// Catalog listing filters, combined with AND.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Page number, default 1
    pub page: Option<i64>,
    /// Items per page, default 10, at most 100
    pub limit: Option<i64>,
    /// Case-insensitive match on name/description, or exact tag
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    /// Comma-separated; matches products carrying any of them
    pub tags: Option<String>,
    pub region_code: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn tag_list(&self) -> Vec<String> {
        split_csv(self.tags.as_deref())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductWithCategory>,
    pub total: i64,
    pub page_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PromotionLink {
    #[serde(flatten)]
    pub link: ProductPromotion,
    pub promotion: Promotion,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub promotions: Vec<PromotionLink>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithPromotions {
    #[serde(flatten)]
    pub product: Product,
    pub promotions: Vec<PromotionLink>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn psn_10() -> serde_json::Value {
        serde_json::json!({
            "name": "PSN $10",
            "slug": "psn-10",
            "description": "PlayStation Network wallet top-up",
            "price": "10.99",
            "stock": 100
        })
    }

    #[test]
    fn create_defaults_lists_and_flags() {
        let req: CreateProductRequest = serde_json::from_value(psn_10()).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.is_active);
        assert!(!req.is_featured);
        assert!(req.tags.is_empty());
        assert!(req.region_codes.is_empty());
        assert!(req.images.is_none());
    }

    #[test]
    fn create_rejects_bad_shape_per_field() {
        let mut body = psn_10();
        body["slug"] = "PSN 10".into();
        body["price"] = "0".into();
        body["stock"] = (-1).into();
        body["image"] = "nope".into();
        let req: CreateProductRequest = serde_json::from_value(body).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("slug"));
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("stock"));
        assert!(fields.contains_key("image"));
    }

    #[test]
    fn update_validates_only_present_fields() {
        let req: UpdateProductRequest = serde_json::from_str(r#"{"name": "PSN $20"}"#).unwrap();
        assert!(req.validate().is_ok());

        let req: UpdateProductRequest =
            serde_json::from_str(r#"{"sale_price": null, "category_id": null}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.sale_price, Some(None));
        assert_eq!(req.category_id, Some(None));

        let req: UpdateProductRequest = serde_json::from_str(r#"{"sale_price": "-2"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn prices_beyond_cents_are_rejected_per_field() {
        let mut body = psn_10();
        body["price"] = "10.999".into();
        body["sale_price"] = "0.001".into();
        let req: CreateProductRequest = serde_json::from_value(body).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["price"][0].code, "precision");
        assert_eq!(fields["sale_price"][0].code, "precision");

        let req: UpdateProductRequest =
            serde_json::from_str(r#"{"price": "12.345", "sale_price": "0.001"}"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
        assert!(errors.field_errors().contains_key("sale_price"));
    }
}
