use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    categories, product_promotions, products, promotions, promotions::DiscountType, reviews,
    users, users::Role,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub stock: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub sku: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub region_codes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Promotion {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub code: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Promotion {
    /// Admin flag set and `now` inside `[start_date, end_date]`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.end_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductPromotion {
    pub id: Uuid,
    pub product_id: Uuid,
    pub promotion_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewAuthor {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user: Option<ReviewAuthor>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            avatar: model.avatar,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<users::Model> for ReviewAuthor {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            avatar: model.avatar,
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            price: model.price,
            sale_price: model.sale_price,
            image: model.image,
            images: model.images,
            stock: model.stock,
            is_active: model.is_active,
            is_featured: model.is_featured,
            sku: model.sku,
            category_id: model.category_id,
            tags: model.tags,
            region_codes: model.region_codes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            image: model.image,
            is_active: model.is_active,
            parent_id: model.parent_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<promotions::Model> for Promotion {
    fn from(model: promotions::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            discount_type: model.discount_type,
            discount_value: model.discount_value,
            code: model.code,
            start_date: model.start_date.with_timezone(&Utc),
            end_date: model.end_date.with_timezone(&Utc),
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<product_promotions::Model> for ProductPromotion {
    fn from(model: product_promotions::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            promotion_id: model.promotion_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl Review {
    pub fn from_parts(model: reviews::Model, author: Option<users::Model>) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
            user: author.map(ReviewAuthor::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn summer_sale(is_active: bool) -> Promotion {
        let created = Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap();
        Promotion {
            id: Uuid::new_v4(),
            name: "Summer Sale".into(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: dec!(10),
            code: Some("SUMMER2023".into()),
            start_date: Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 8, 31, 0, 0, 0).unwrap(),
            is_active,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn live_only_inside_window_and_when_flagged() {
        let promo = summer_sale(true);
        assert!(promo.is_live_at(Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap()));
        assert!(promo.is_live_at(promo.start_date));
        assert!(promo.is_live_at(promo.end_date));
        assert!(!promo.is_live_at(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
        assert!(!promo.is_live_at(Utc.with_ymd_and_hms(2023, 5, 31, 0, 0, 0).unwrap()));
    }

    #[test]
    fn inactive_flag_overrides_window() {
        let promo = summer_sale(false);
        assert!(!promo.is_live_at(Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap()));
    }
}
