use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::products::PromotionLink,
    dto::promotions::{
        CreatePromotionRequest, ProductLink, PromotionListQuery, PromotionWithProducts,
        UpdatePromotionRequest,
    },
    entity::{
        ProductPromotions, Products, Promotions, product_promotions,
        products::Column as ProdCol,
        promotions::{ActiveModel, Column, Model as PromotionModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Promotion,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_active(state: &AppState) -> AppResult<ApiResponse<Vec<PromotionWithProducts>>> {
    get_active_at(state, Utc::now()).await
}

/// Promotions flagged active whose window contains `now`.
pub async fn get_active_at(
    state: &AppState,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<Vec<PromotionWithProducts>>> {
    let promotions = Promotions::find()
        .filter(Column::IsActive.eq(true))
        .filter(Column::StartDate.lte(now))
        .filter(Column::EndDate.gte(now))
        .order_by_asc(Column::EndDate)
        .all(state.db())
        .await?;

    let data = with_products(state.db(), promotions, now).await?;
    Ok(ApiResponse::success("Active promotions", data, Some(Meta::empty())))
}

pub async fn get_by_product_id(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<Vec<PromotionLink>>> {
    get_by_product_id_at(state, product_id, Utc::now()).await
}

pub async fn get_by_product_id_at(
    state: &AppState,
    product_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<Vec<PromotionLink>>> {
    let mut links = live_links_for_products(state.db(), &[product_id], now).await?;
    let data = links.remove(&product_id).unwrap_or_default();
    Ok(ApiResponse::success("Product promotions", data, Some(Meta::empty())))
}

pub async fn get_all(
    state: &AppState,
    user: &AuthUser,
    query: PromotionListQuery,
) -> AppResult<ApiResponse<Vec<PromotionWithProducts>>> {
    get_all_at(state, user, query, Utc::now()).await
}

/// Back-office listing, soonest-expiring first.
pub async fn get_all_at(
    state: &AppState,
    user: &AuthUser,
    query: PromotionListQuery,
    now: DateTime<Utc>,
) -> AppResult<ApiResponse<Vec<PromotionWithProducts>>> {
    ensure_admin(user)?;

    let mut finder = Promotions::find();
    if !query.include_inactive {
        finder = finder.filter(Column::IsActive.eq(true));
    }
    if !query.include_expired {
        finder = finder.filter(Column::EndDate.gte(now));
    }
    let promotions = finder
        .order_by_asc(Column::EndDate)
        .order_by_asc(Column::Id)
        .all(state.db())
        .await?;

    let data = with_products(state.db(), promotions, now).await?;
    Ok(ApiResponse::success("Promotions", data, Some(Meta::empty())))
}

pub async fn create_promotion(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePromotionRequest,
) -> AppResult<ApiResponse<PromotionWithProducts>> {
    ensure_admin(user)?;
    payload.validate()?;
    ensure_date_range(payload.start_date, payload.end_date)?;

    if let Some(code) = payload.code.as_deref() {
        ensure_unique_code(state.db(), code, None).await?;
    }

    let product_ids = dedup(payload.product_ids.unwrap_or_default());
    ensure_products_exist(state.db(), &product_ids).await?;

    let txn = state.db().begin().await?;
    let promotion = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        description: Set(payload.description),
        discount_type: Set(payload.discount_type),
        discount_value: Set(payload.discount_value),
        code: Set(payload.code),
        start_date: Set(payload.start_date.into()),
        end_date: Set(payload.end_date.into()),
        is_active: Set(payload.is_active),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    insert_links(&txn, promotion.id, &product_ids).await?;
    txn.commit().await?;

    tracing::info!(
        promotion_id = %promotion.id,
        products = product_ids.len(),
        "promotion created"
    );
    audit::record(
        state.db(),
        user.user_id,
        "promotion_create",
        "promotions",
        serde_json::json!({ "promotion_id": promotion.id, "product_ids": product_ids }),
    )
    .await;

    let data = single_with_products(state.db(), promotion, Utc::now()).await?;
    Ok(ApiResponse::success("Promotion created", data, Some(Meta::empty())))
}

pub async fn update_promotion(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePromotionRequest,
) -> AppResult<ApiResponse<PromotionWithProducts>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Promotions::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Promotion"))?;

    if let Some(Some(code)) = payload.code.as_ref() {
        if existing.code.as_deref() != Some(code.as_str()) {
            ensure_unique_code(state.db(), code, Some(id)).await?;
        }
    }

    if payload.start_date.is_some() || payload.end_date.is_some() {
        let start = payload
            .start_date
            .unwrap_or_else(|| existing.start_date.with_timezone(&Utc));
        let end = payload
            .end_date
            .unwrap_or_else(|| existing.end_date.with_timezone(&Utc));
        ensure_date_range(start, end)?;
    }

    let product_ids = payload.product_ids.map(dedup);
    if let Some(ids) = product_ids.as_deref() {
        ensure_products_exist(state.db(), ids).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(discount_type) = payload.discount_type {
        active.discount_type = Set(discount_type);
    }
    if let Some(discount_value) = payload.discount_value {
        active.discount_value = Set(discount_value);
    }
    if let Some(code) = payload.code {
        active.code = Set(code);
    }
    if let Some(start_date) = payload.start_date {
        active.start_date = Set(start_date.into());
    }
    if let Some(end_date) = payload.end_date {
        active.end_date = Set(end_date.into());
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());

    let txn = state.db().begin().await?;
    let promotion = active.update(&txn).await?;
    if let Some(ids) = product_ids.as_deref() {
        // Links are replaced wholesale, never merged.
        ProductPromotions::delete_many()
            .filter(product_promotions::Column::PromotionId.eq(id))
            .exec(&txn)
            .await?;
        insert_links(&txn, id, ids).await?;
    }
    txn.commit().await?;

    audit::record(
        state.db(),
        user.user_id,
        "promotion_update",
        "promotions",
        serde_json::json!({ "promotion_id": id, "product_ids": product_ids }),
    )
    .await;

    let data = single_with_products(state.db(), promotion, Utc::now()).await?;
    Ok(ApiResponse::success("Updated", data, Some(Meta::empty())))
}

pub async fn delete_promotion(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    Promotions::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Promotion"))?;

    let txn = state.db().begin().await?;
    ProductPromotions::delete_many()
        .filter(product_promotions::Column::PromotionId.eq(id))
        .exec(&txn)
        .await?;
    Promotions::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(promotion_id = %id, "promotion deleted");
    audit::record(
        state.db(),
        user.user_id,
        "promotion_delete",
        "promotions",
        serde_json::json!({ "promotion_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "success": true }),
        Some(Meta::empty()),
    ))
}

/// Fails with `BadRequest` unless `end` is strictly after `start`.
pub fn ensure_date_range(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<()> {
    if end <= start {
        return Err(AppError::BadRequest(
            "End date must be after start date".into(),
        ));
    }
    Ok(())
}

/// Links of each product whose promotion is live at `now`, keyed by product id.
pub(crate) async fn live_links_for_products<C: ConnectionTrait>(
    conn: &C,
    product_ids: &[Uuid],
    now: DateTime<Utc>,
) -> AppResult<HashMap<Uuid, Vec<PromotionLink>>> {
    let mut grouped: HashMap<Uuid, Vec<PromotionLink>> = HashMap::new();
    if product_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = ProductPromotions::find()
        .find_also_related(Promotions)
        .filter(product_promotions::Column::ProductId.is_in(product_ids.to_vec()))
        .filter(Column::IsActive.eq(true))
        .filter(Column::StartDate.lte(now))
        .filter(Column::EndDate.gte(now))
        .order_by_asc(Column::EndDate)
        .all(conn)
        .await?;

    for (link, promotion) in rows {
        if let Some(promotion) = promotion {
            grouped
                .entry(link.product_id)
                .or_default()
                .push(PromotionLink {
                    link: link.into(),
                    promotion: promotion.into(),
                });
        }
    }
    Ok(grouped)
}

/// Every link of a product regardless of the promotion's window.
pub(crate) async fn links_for_product<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> AppResult<Vec<PromotionLink>> {
    let rows = ProductPromotions::find()
        .find_also_related(Promotions)
        .filter(product_promotions::Column::ProductId.eq(product_id))
        .order_by_asc(product_promotions::Column::CreatedAt)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(link, promotion)| {
            promotion.map(|promotion| PromotionLink {
                link: link.into(),
                promotion: promotion.into(),
            })
        })
        .collect())
}

async fn with_products<C: ConnectionTrait>(
    conn: &C,
    promotions: Vec<PromotionModel>,
    now: DateTime<Utc>,
) -> AppResult<Vec<PromotionWithProducts>> {
    let ids: Vec<Uuid> = promotions.iter().map(|p| p.id).collect();
    let mut grouped: HashMap<Uuid, Vec<ProductLink>> = HashMap::new();

    if !ids.is_empty() {
        let rows = ProductPromotions::find()
            .find_also_related(Products)
            .filter(product_promotions::Column::PromotionId.is_in(ids))
            .order_by_asc(ProdCol::Name)
            .all(conn)
            .await?;
        for (link, product) in rows {
            if let Some(product) = product {
                grouped
                    .entry(link.promotion_id)
                    .or_default()
                    .push(ProductLink {
                        link: link.into(),
                        product: product.into(),
                    });
            }
        }
    }

    Ok(promotions
        .into_iter()
        .map(|model| {
            let products = grouped.remove(&model.id).unwrap_or_default();
            let promotion: Promotion = model.into();
            PromotionWithProducts {
                is_live: promotion.is_live_at(now),
                promotion,
                products,
            }
        })
        .collect())
}

async fn single_with_products<C: ConnectionTrait>(
    conn: &C,
    promotion: PromotionModel,
    now: DateTime<Utc>,
) -> AppResult<PromotionWithProducts> {
    with_products(conn, vec![promotion], now)
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("promotion vanished after write")))
}

async fn ensure_unique_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = Promotions::find().filter(Column::Code.eq(code));
    if let Some(id) = exclude {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(conn).await?.is_some() {
        return Err(AppError::Conflict(
            "A promotion with this code already exists".into(),
        ));
    }
    Ok(())
}

async fn ensure_products_exist<C: ConnectionTrait>(conn: &C, ids: &[Uuid]) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = Products::find()
        .filter(ProdCol::Id.is_in(ids.to_vec()))
        .count(conn)
        .await?;
    if found as usize != ids.len() {
        return Err(AppError::not_found("Product"));
    }
    Ok(())
}

async fn insert_links<C: ConnectionTrait>(
    conn: &C,
    promotion_id: Uuid,
    product_ids: &[Uuid],
) -> AppResult<()> {
    if product_ids.is_empty() {
        return Ok(());
    }
    let links = product_ids.iter().map(|product_id| product_promotions::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(*product_id),
        promotion_id: Set(promotion_id),
        created_at: NotSet,
    });
    ProductPromotions::insert_many(links).exec(conn).await?;
    Ok(())
}

fn dedup(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
    ids
}
