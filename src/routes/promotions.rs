use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::products::PromotionLink,
    dto::promotions::{
        CreatePromotionRequest, PromotionListQuery, PromotionWithProducts, UpdatePromotionRequest,
    },
    error::AppResult,
    middleware::{auth::AuthUser, path::ApiPath},
    response::ApiResponse,
    services::promotion_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_promotions).post(create_promotion))
        .route("/active", get(active_promotions))
        .route("/product/{product_id}", get(product_promotions))
        .route("/{id}", put(update_promotion).delete(delete_promotion))
}

#[utoipa::path(
    get,
    path = "/api/promotions/active",
    responses(
        (status = 200, description = "Promotions running right now", body = ApiResponse<Vec<PromotionWithProducts>>)
    ),
    tag = "Promotions"
)]
pub async fn active_promotions(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PromotionWithProducts>>>> {
    let resp = promotion_service::get_active(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/promotions/product/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Running promotions linked to the product", body = ApiResponse<Vec<PromotionLink>>)
    ),
    tag = "Promotions"
)]
pub async fn product_promotions(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<PromotionLink>>>> {
    let resp = promotion_service::get_by_product_id(&state, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/promotions",
    params(PromotionListQuery),
    responses(
        (status = 200, description = "All promotions, soonest-expiring first", body = ApiResponse<Vec<PromotionWithProducts>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn list_promotions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PromotionListQuery>,
) -> AppResult<Json<ApiResponse<Vec<PromotionWithProducts>>>> {
    let resp = promotion_service::get_all(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/promotions",
    request_body = CreatePromotionRequest,
    responses(
        (status = 201, description = "Create promotion with its product links", body = ApiResponse<PromotionWithProducts>),
        (status = 400, description = "End date not after start date"),
        (status = 409, description = "Code already in use"),
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn create_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePromotionRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PromotionWithProducts>>)> {
    let resp = promotion_service::create_promotion(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/promotions/{id}",
    params(
        ("id" = Uuid, Path, description = "Promotion ID")
    ),
    request_body = UpdatePromotionRequest,
    responses(
        (status = 200, description = "Updated promotion", body = ApiResponse<PromotionWithProducts>),
        (status = 400, description = "End date not after start date"),
        (status = 404, description = "Promotion not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn update_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    Json(payload): Json<UpdatePromotionRequest>,
) -> AppResult<Json<ApiResponse<PromotionWithProducts>>> {
    let resp = promotion_service::update_promotion(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/promotions/{id}",
    params(
        ("id" = Uuid, Path, description = "Promotion ID")
    ),
    responses(
        (status = 200, description = "Deleted promotion and its links"),
        (status = 404, description = "Promotion not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn delete_promotion(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = promotion_service::delete_promotion(&state, &user, id).await?;
    Ok(Json(resp))
}
