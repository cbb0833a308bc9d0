use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        Categories, ProductPromotions, Products, Promotions, Reviews, Users, categories,
        product_promotions, products, promotions, promotions::DiscountType, reviews, users,
        users::Role,
    },
    services::auth_service::hash_password,
};
use uuid::Uuid;

struct SeedProduct {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    price: Decimal,
    sale_price: Option<Decimal>,
    featured: bool,
    sku: &'static str,
    category_id: Uuid,
    tags: &'static [&'static str],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    let conn = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&conn).await?;

    let admin_id = ensure_user(&conn, "admin@1moregame.com", "admin123", "Admin User", Role::Admin).await?;
    let john_id = ensure_user(&conn, "johndoe@example.com", "user123", "John Doe", Role::User).await?;
    let jane_id = ensure_user(&conn, "janesmith@example.com", "user123", "Jane Smith", Role::User).await?;

    let gift_cards = ensure_category(&conn, "Gift Cards", "gift-cards", "Digital gift cards for popular gaming platforms", None).await?;
    let game_currency = ensure_category(&conn, "Game Currency", "game-currency", "In-game currencies for popular games", None).await?;
    let subscriptions = ensure_category(&conn, "Subscriptions", "subscriptions", "Gaming subscriptions and memberships", None).await?;
    let playstation = ensure_category(&conn, "PlayStation", "playstation", "PlayStation gift cards and subscriptions", Some(gift_cards)).await?;
    let xbox = ensure_category(&conn, "Xbox", "xbox", "Xbox gift cards and subscriptions", Some(gift_cards)).await?;
    let steam = ensure_category(&conn, "Steam", "steam", "Steam gift cards and wallet codes", Some(gift_cards)).await?;
    let mobile = ensure_category(&conn, "Mobile Games", "mobile-games", "Currency for popular mobile games", Some(game_currency)).await?;

    let summer_sale = ensure_promotion(
        &conn,
        "Summer Sale 2023",
        "Get 10% off on selected items",
        DiscountType::Percentage,
        Decimal::new(10, 0),
        "SUMMER2023",
        (2023, 6, 1),
        (2024, 8, 31),
    )
    .await?;
    ensure_promotion(
        &conn,
        "New User Special",
        "Get 15% off on your first purchase",
        DiscountType::Percentage,
        Decimal::new(15, 0),
        "NEWUSER2023",
        (2023, 1, 1),
        (2024, 12, 31),
    )
    .await?;
    let bundle = ensure_promotion(
        &conn,
        "Bundle Discount",
        "Buy 2 or more items and get a special discount",
        DiscountType::Bundle,
        Decimal::new(20, 0),
        "BUNDLE2023",
        (2023, 1, 1),
        (2024, 12, 31),
    )
    .await?;

    let catalog = [
        SeedProduct {
            name: "PlayStation Network Card $10",
            slug: "playstation-network-card-10",
            description: "Add $10 to your PlayStation Network wallet.",
            price: Decimal::new(1099, 2),
            sale_price: None,
            featured: true,
            sku: "PSN-10",
            category_id: playstation,
            tags: &["playstation", "gift card", "digital"],
        },
        SeedProduct {
            name: "PlayStation Network Card $20",
            slug: "playstation-network-card-20",
            description: "Add $20 to your PlayStation Network wallet.",
            price: Decimal::new(2099, 2),
            sale_price: None,
            featured: false,
            sku: "PSN-20",
            category_id: playstation,
            tags: &["playstation", "gift card", "digital"],
        },
        SeedProduct {
            name: "PlayStation Plus 1 Month",
            slug: "playstation-plus-1-month",
            description: "One month of PlayStation Plus.",
            price: Decimal::new(999, 2),
            sale_price: Some(Decimal::new(899, 2)),
            featured: true,
            sku: "PS-PLUS-1",
            category_id: subscriptions,
            tags: &["playstation", "subscription", "digital"],
        },
        SeedProduct {
            name: "Xbox Gift Card $25",
            slug: "xbox-gift-card-25",
            description: "Add $25 to your Microsoft account.",
            price: Decimal::new(2599, 2),
            sale_price: None,
            featured: false,
            sku: "XBOX-25",
            category_id: xbox,
            tags: &["xbox", "gift card", "digital"],
        },
        SeedProduct {
            name: "Steam Wallet $20",
            slug: "steam-wallet-20",
            description: "Top up your Steam wallet with $20.",
            price: Decimal::new(2099, 2),
            sale_price: None,
            featured: true,
            sku: "STEAM-20",
            category_id: steam,
            tags: &["steam", "gift card", "pc", "digital"],
        },
        SeedProduct {
            name: "Free Fire 1080 Diamonds",
            slug: "free-fire-1080-diamonds",
            description: "1080 diamonds for Garena Free Fire.",
            price: Decimal::new(999, 2),
            sale_price: None,
            featured: false,
            sku: "FF-1080",
            category_id: mobile,
            tags: &["free fire", "mobile", "currency"],
        },
    ];

    let mut product_ids = Vec::with_capacity(catalog.len());
    for item in &catalog {
        product_ids.push(ensure_product(&conn, item).await?);
    }

    link(&conn, product_ids[0], summer_sale).await?;
    link(&conn, product_ids[1], summer_sale).await?;
    link(&conn, product_ids[3], bundle).await?;
    link(&conn, product_ids[4], bundle).await?;

    ensure_review(&conn, product_ids[0], john_id, 5, "Code arrived instantly.").await?;
    ensure_review(&conn, product_ids[0], jane_id, 4, "Works in my region.").await?;
    ensure_review(&conn, product_ids[4], jane_id, 5, "Great value.").await?;

    tracing::info!(%admin_id, products = product_ids.len(), "seed completed");
    Ok(())
}

async fn ensure_user(
    conn: &DatabaseConnection,
    email: &str,
    password: &str,
    name: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(users::Column::Email.eq(email))
        .one(conn)
        .await?
    {
        return Ok(existing.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.into()),
        password_hash: Set(password_hash),
        name: Set(name.into()),
        avatar: Set(None),
        role: Set(role),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;

    tracing::info!(email, ?role, "ensured user");
    Ok(user.id)
}

async fn ensure_category(
    conn: &DatabaseConnection,
    name: &str,
    slug: &str,
    description: &str,
    parent_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Categories::find()
        .filter(categories::Column::Slug.eq(slug))
        .one(conn)
        .await?
    {
        return Ok(existing.id);
    }

    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.into()),
        slug: Set(slug.into()),
        description: Set(Some(description.into())),
        image: Set(None),
        is_active: Set(true),
        parent_id: Set(parent_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(category.id)
}

#[allow(clippy::too_many_arguments)]
async fn ensure_promotion(
    conn: &DatabaseConnection,
    name: &str,
    description: &str,
    discount_type: DiscountType,
    discount_value: Decimal,
    code: &str,
    start: (i32, u32, u32),
    end: (i32, u32, u32),
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Promotions::find()
        .filter(promotions::Column::Code.eq(code))
        .one(conn)
        .await?
    {
        return Ok(existing.id);
    }

    let day = |(y, m, d): (i32, u32, u32)| {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
            .single()
            .ok_or_else(|| anyhow::anyhow!("invalid seed date {y}-{m}-{d}"))
    };

    let promotion = promotions::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.into()),
        description: Set(Some(description.into())),
        discount_type: Set(discount_type),
        discount_value: Set(discount_value),
        code: Set(Some(code.into())),
        start_date: Set(day(start)?.into()),
        end_date: Set(day(end)?.into()),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(promotion.id)
}

async fn ensure_product(conn: &DatabaseConnection, item: &SeedProduct) -> anyhow::Result<Uuid> {
    if let Some(existing) = Products::find()
        .filter(products::Column::Slug.eq(item.slug))
        .one(conn)
        .await?
    {
        return Ok(existing.id);
    }

    let product = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(item.name.into()),
        slug: Set(item.slug.into()),
        description: Set(item.description.into()),
        price: Set(item.price),
        sale_price: Set(item.sale_price),
        image: Set(None),
        images: Set(Vec::new()),
        stock: Set(100),
        is_active: Set(true),
        is_featured: Set(item.featured),
        sku: Set(Some(item.sku.into())),
        category_id: Set(Some(item.category_id)),
        tags: Set(item.tags.iter().map(|t| t.to_string()).collect()),
        region_codes: Set(vec!["global".to_string()]),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(product.id)
}

async fn link(conn: &DatabaseConnection, product_id: Uuid, promotion_id: Uuid) -> anyhow::Result<()> {
    let exists = ProductPromotions::find()
        .filter(product_promotions::Column::ProductId.eq(product_id))
        .filter(product_promotions::Column::PromotionId.eq(promotion_id))
        .one(conn)
        .await?
        .is_some();
    if !exists {
        product_promotions::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            promotion_id: Set(promotion_id),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn ensure_review(
    conn: &DatabaseConnection,
    product_id: Uuid,
    user_id: Uuid,
    rating: i32,
    comment: &str,
) -> anyhow::Result<()> {
    let exists = Reviews::find()
        .filter(reviews::Column::ProductId.eq(product_id))
        .filter(reviews::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .is_some();
    if !exists {
        reviews::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            user_id: Set(user_id),
            rating: Set(rating),
            comment: Set(Some(comment.into())),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}
