use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{default_true, deserialize_some};
use crate::{
    dto::products::ProductWithPromotions,
    models::{Category, Product},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 2, message = "Category name must be at least 2 characters"))]
    pub name: String,
    #[validate(
        length(min = 2, message = "Slug must be at least 2 characters"),
        regex(
            path = "crate::validation::SLUG_REGEX",
            message = "Slug must contain only lowercase letters, numbers, and hyphens"
        )
    )]
    pub slug: String,
    pub description: Option<String>,
    #[validate(url(message = "Image must be a valid URL"))]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 2, message = "Category name must be at least 2 characters"))]
    pub name: Option<String>,
    #[validate(
        length(min = 2, message = "Slug must be at least 2 characters"),
        regex(
            path = "crate::validation::SLUG_REGEX",
            message = "Slug must contain only lowercase letters, numbers, and hyphens"
        )
    )]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[validate(url(message = "Image must be a valid URL"))]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
    pub is_active: Option<bool>,
    /// `null` moves the category to the root.
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_id: Option<Option<Uuid>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    #[serde(default)]
    pub include_inactive: bool,
    #[serde(default)]
    pub include_products: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryWithChildren {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub parent: Option<Category>,
    pub children: Vec<Category>,
    pub products: Vec<ProductWithPromotions>,
}

/// One node of the storefront navigation tree.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryNavNode {
    #[serde(flatten)]
    pub category: Category,
    #[schema(no_recursion)]
    pub children: Vec<CategoryNavNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_to_active() {
        let req: CreateCategoryRequest =
            serde_json::from_str(r#"{"name": "Gift Cards", "slug": "gift-cards"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.is_active);
        assert!(req.parent_id.is_none());
    }

    #[test]
    fn update_parent_can_be_cleared() {
        let req: UpdateCategoryRequest = serde_json::from_str(r#"{"parent_id": null}"#).unwrap();
        assert_eq!(req.parent_id, Some(None));

        let req: UpdateCategoryRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.parent_id, None);
    }

    #[test]
    fn rejects_uppercase_slug() {
        let req: CreateCategoryRequest =
            serde_json::from_str(r#"{"name": "Gift Cards", "slug": "Gift-Cards"}"#).unwrap();
        assert!(req.validate().unwrap_err().field_errors().contains_key("slug"));
    }
}
