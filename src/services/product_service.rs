use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::{PgExpr, PgFunc};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::products::{
        CreateProductRequest, ProductDetail, ProductList, ProductQuery, ProductWithCategory,
        UpdateProductRequest,
    },
    entity::{
        Categories, OrderItems, Products, Reviews, Users, order_items,
        products::{ActiveModel, Column, Model as ProductModel},
        reviews,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Product, Review},
    response::{ApiResponse, Meta},
    services::{
        promotion_service::links_for_product,
        slug::{SlugOwner, ensure_unique_slug},
    },
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let finder = Products::find().filter(filter_condition(&query));

    let total = finder.clone().count(state.db()).await? as i64;

    let items = finder
        .find_also_related(Categories)
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(state.db())
        .await?
        .into_iter()
        .map(|(product, category)| ProductWithCategory {
            product: product.into(),
            category: category.map(Category::from),
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList {
        items,
        total,
        page_count: meta.page_count.unwrap_or_default(),
    };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

/// AND of every filter present on the query.
fn filter_condition(query: &ProductQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        condition = condition.add(
            Condition::any()
                .add(Expr::col((Products, Column::Name)).ilike(pattern.clone()))
                .add(Expr::col((Products, Column::Description)).ilike(pattern))
                .add(has_element(Column::Tags, search)),
        );
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }
    if let Some(is_active) = query.is_active {
        condition = condition.add(Column::IsActive.eq(is_active));
    }
    if let Some(is_featured) = query.is_featured {
        condition = condition.add(Column::IsFeatured.eq(is_featured));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let tags = query.tag_list();
    if !tags.is_empty() {
        let any_tag = tags
            .iter()
            .fold(Condition::any(), |acc, tag| acc.add(has_element(Column::Tags, tag)));
        condition = condition.add(any_tag);
    }

    if let Some(region) = query.region_code.as_deref().filter(|r| !r.is_empty()) {
        condition = condition.add(has_element(Column::RegionCodes, region));
    }

    condition
}

/// `value = ANY(products.<column>)` for text[] columns.
fn has_element(column: Column, value: &str) -> SimpleExpr {
    Expr::val(value).eq(PgFunc::any(Expr::col((Products, column))))
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    let detail = load_detail(state, product).await?;
    Ok(ApiResponse::success("Product", detail, None))
}

pub async fn get_product_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find()
        .filter(Column::Slug.eq(slug))
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    let detail = load_detail(state, product).await?;
    Ok(ApiResponse::success("Product", detail, None))
}

async fn load_detail(state: &AppState, product: ProductModel) -> AppResult<ProductDetail> {
    let category = match product.category_id {
        Some(category_id) => Categories::find_by_id(category_id)
            .one(state.db())
            .await?
            .map(Category::from),
        None => None,
    };

    let promotions = links_for_product(state.db(), product.id).await?;

    let reviews = Reviews::find()
        .find_also_related(Users)
        .filter(reviews::Column::ProductId.eq(product.id))
        .order_by_desc(reviews::Column::CreatedAt)
        .all(state.db())
        .await?
        .into_iter()
        .map(|(review, author)| Review::from_parts(review, author))
        .collect();

    Ok(ProductDetail {
        product: product.into(),
        category,
        promotions,
        reviews,
    })
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    ensure_unique_slug(state.db(), SlugOwner::Product, &payload.slug, None).await?;
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
    }

    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        slug: Set(payload.slug),
        description: Set(payload.description),
        price: Set(payload.price),
        sale_price: Set(payload.sale_price),
        image: Set(payload.image),
        images: Set(payload.images.unwrap_or_default()),
        stock: Set(payload.stock),
        is_active: Set(payload.is_active),
        is_featured: Set(payload.is_featured),
        sku: Set(payload.sku),
        category_id: Set(payload.category_id),
        tags: Set(payload.tags),
        region_codes: Set(payload.region_codes),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(state.db())
    .await?;

    tracing::info!(product_id = %product.id, slug = %product.slug, "product created");
    audit::record(
        state.db(),
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Products::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    if let Some(slug) = payload.slug.as_deref().filter(|s| *s != existing.slug) {
        ensure_unique_slug(state.db(), SlugOwner::Product, slug, Some(id)).await?;
    }
    if let Some(Some(category_id)) = payload.category_id {
        ensure_category_exists(state, category_id).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(slug) = payload.slug {
        active.slug = Set(slug);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(sale_price) = payload.sale_price {
        active.sale_price = Set(sale_price);
    }
    if let Some(image) = payload.image {
        active.image = Set(image);
    }
    if let Some(images) = payload.images {
        active.images = Set(images);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    if let Some(sku) = payload.sku {
        active.sku = Set(sku);
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(tags) = payload.tags {
        active.tags = Set(tags);
    }
    if let Some(region_codes) = payload.region_codes {
        active.region_codes = Set(region_codes);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(state.db()).await?;

    audit::record(
        state.db(),
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn toggle_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    toggle_flag(state, user, id, Column::IsActive, "product_toggle_status").await
}

pub async fn toggle_featured(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    toggle_flag(state, user, id, Column::IsFeatured, "product_toggle_featured").await
}

/// Flips a boolean column in one `UPDATE ... RETURNING` so the read and the
/// write cannot interleave with another toggle.
async fn toggle_flag(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    flag: Column,
    action: &str,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let product = Products::update_many()
        .col_expr(flag, Expr::col(flag).not())
        .col_expr(Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(Column::Id.eq(id))
        .exec_with_returning(state.db())
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Product"))?;

    tracing::debug!(
        product_id = %id,
        is_active = product.is_active,
        is_featured = product.is_featured,
        "product flag toggled"
    );
    audit::record(
        state.db(),
        user.user_id,
        action,
        "products",
        serde_json::json!({
            "product_id": id,
            "is_active": product.is_active,
            "is_featured": product.is_featured,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        product.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    Products::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let ordered = OrderItems::find()
        .filter(order_items::Column::ProductId.eq(id))
        .count(state.db())
        .await?;
    if ordered > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete a product that has been ordered".into(),
        ));
    }

    // Promotion links and reviews go with the product via ON DELETE CASCADE.
    Products::delete_by_id(id).exec(state.db()).await?;

    tracing::info!(product_id = %id, "product deleted");
    audit::record(
        state.db(),
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "success": true }),
        Some(Meta::empty()),
    ))
}

async fn ensure_category_exists(state: &AppState, category_id: Uuid) -> AppResult<()> {
    Categories::find_by_id(category_id)
        .one(state.db())
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Category"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{
        entity::users::Role,
        test_support::{product_model, test_state},
    };
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn admin() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
        }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_off"), r"100\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("psn"), "psn");
    }

    #[tokio::test]
    async fn toggle_returns_the_flipped_row() {
        let mut flipped = product_model("PSN $10", "psn-10", dec!(10.99));
        flipped.is_active = false;
        let id = flipped.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![flipped]])
            .into_connection();
        let state = test_state(db);

        let resp = toggle_status(&state, &admin(), id).await.unwrap();
        let product = resp.data.unwrap();
        assert_eq!(product.id, id);
        assert!(!product.is_active);
    }

    #[tokio::test]
    async fn toggling_unknown_product_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<ProductModel>::new()])
            .into_connection();
        let state = test_state(db);

        let err = toggle_featured(&state, &admin(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Product not found"));
    }

    #[tokio::test]
    async fn ordered_products_cannot_be_deleted() {
        let product = product_model("Xbox Live Gold", "xbox-live-gold", dec!(9.99));
        let id = product.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product]])
            .append_query_results([vec![count_row(2)]])
            .into_connection();
        let state = test_state(db);

        let err = delete_product(&state, &admin(), id).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected_before_any_query() {
        let state = test_state(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let payload: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "name": "PSN $10",
            "slug": "psn 10",
            "description": "wallet top-up",
            "price": "10.99",
        }))
        .unwrap();

        let err = create_product(&state, &admin(), payload).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn customers_cannot_toggle() {
        let state = test_state(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let customer = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::User,
        };

        let err = toggle_status(&state, &customer, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}
