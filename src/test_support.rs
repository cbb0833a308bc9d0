//! Builders shared by the MockDatabase unit tests.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, prelude::DateTimeWithTimeZone};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    entity::{categories, products, promotions, promotions::DiscountType},
    state::AppState,
};

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        jwt_expiry_hours: 1,
    }
}

pub fn test_state(db: DatabaseConnection) -> AppState {
    AppState::new(db, test_config())
}

pub fn timestamp(y: i32, m: u32, d: u32) -> DateTimeWithTimeZone {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap().fixed_offset()
}

pub fn category_model(name: &str, slug: &str, parent_id: Option<Uuid>) -> categories::Model {
    categories::Model {
        id: Uuid::new_v4(),
        name: name.into(),
        slug: slug.into(),
        description: None,
        image: None,
        is_active: true,
        parent_id,
        created_at: timestamp(2023, 1, 1),
        updated_at: timestamp(2023, 1, 1),
    }
}

pub fn product_model(name: &str, slug: &str, price: Decimal) -> products::Model {
    products::Model {
        id: Uuid::new_v4(),
        name: name.into(),
        slug: slug.into(),
        description: format!("{name} digital code"),
        price,
        sale_price: None,
        image: None,
        images: Vec::new(),
        stock: 100,
        is_active: true,
        is_featured: false,
        sku: None,
        category_id: None,
        tags: Vec::new(),
        region_codes: Vec::new(),
        created_at: timestamp(2023, 1, 1),
        updated_at: timestamp(2023, 1, 1),
    }
}

/// Summer Sale style promotion running 2023-06-01 .. 2024-08-31.
pub fn promotion_model(name: &str) -> promotions::Model {
    promotions::Model {
        id: Uuid::new_v4(),
        name: name.into(),
        description: None,
        discount_type: DiscountType::Percentage,
        discount_value: Decimal::TEN,
        code: None,
        start_date: timestamp(2023, 6, 1),
        end_date: timestamp(2024, 8, 31),
        is_active: true,
        created_at: timestamp(2023, 5, 1),
        updated_at: timestamp(2023, 5, 1),
    }
}
