use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::categories::{
        CategoryDetail, CategoryListQuery, CategoryNavNode, CategoryWithChildren,
        CreateCategoryRequest, UpdateCategoryRequest,
    },
    dto::products::ProductWithPromotions,
    entity::{
        Categories, Products,
        categories::{ActiveModel, Column, Model as CategoryModel},
        products::Column as ProdCol,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Product},
    response::{ApiResponse, Meta},
    services::{
        category_tree::{CategoryTree, build_navigation},
        promotion_service::live_links_for_products,
        slug::{SlugOwner, ensure_unique_slug},
    },
    state::AppState,
};

/// Root plus two levels below it.
const NAVIGATION_DEPTH: usize = 3;

pub async fn list_categories(
    state: &AppState,
    query: CategoryListQuery,
) -> AppResult<ApiResponse<Vec<CategoryWithChildren>>> {
    let mut finder = Categories::find();
    if !query.include_inactive {
        finder = finder.filter(Column::IsActive.eq(true));
    }
    let categories = finder.order_by_asc(Column::Name).all(state.db()).await?;
    let ids: Vec<Uuid> = categories.iter().map(|c| c.id).collect();

    let mut children: HashMap<Uuid, Vec<Category>> = HashMap::new();
    if !ids.is_empty() {
        for child in Categories::find()
            .filter(Column::ParentId.is_in(ids.clone()))
            .order_by_asc(Column::Name)
            .all(state.db())
            .await?
        {
            if let Some(parent_id) = child.parent_id {
                children.entry(parent_id).or_default().push(child.into());
            }
        }
    }

    let mut products: HashMap<Uuid, Vec<Product>> = HashMap::new();
    if query.include_products && !ids.is_empty() {
        for product in Products::find()
            .filter(ProdCol::CategoryId.is_in(ids))
            .order_by_desc(ProdCol::CreatedAt)
            .all(state.db())
            .await?
        {
            if let Some(category_id) = product.category_id {
                products.entry(category_id).or_default().push(product.into());
            }
        }
    }

    let items = categories
        .into_iter()
        .map(|model| {
            let id = model.id;
            CategoryWithChildren {
                category: model.into(),
                children: children.remove(&id).unwrap_or_default(),
                products: query
                    .include_products
                    .then(|| products.remove(&id).unwrap_or_default()),
            }
        })
        .collect();

    Ok(ApiResponse::success("Categories", items, Some(Meta::empty())))
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ApiResponse<CategoryDetail>> {
    let category = Categories::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    let detail = load_detail(state, category, Utc::now()).await?;
    Ok(ApiResponse::success("Category", detail, None))
}

pub async fn get_category_by_slug(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<CategoryDetail>> {
    let category = Categories::find()
        .filter(Column::Slug.eq(slug))
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;
    let detail = load_detail(state, category, Utc::now()).await?;
    Ok(ApiResponse::success("Category", detail, None))
}

async fn load_detail(
    state: &AppState,
    category: CategoryModel,
    now: DateTime<Utc>,
) -> AppResult<CategoryDetail> {
    let parent = match category.parent_id {
        Some(parent_id) => Categories::find_by_id(parent_id)
            .one(state.db())
            .await?
            .map(Category::from),
        None => None,
    };

    let children = Categories::find()
        .filter(Column::ParentId.eq(category.id))
        .order_by_asc(Column::Name)
        .all(state.db())
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    let products = Products::find()
        .filter(ProdCol::CategoryId.eq(category.id))
        .filter(ProdCol::IsActive.eq(true))
        .order_by_desc(ProdCol::CreatedAt)
        .all(state.db())
        .await?;
    let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let mut links = live_links_for_products(state.db(), &product_ids, now).await?;

    let products = products
        .into_iter()
        .map(|model| {
            let promotions = links.remove(&model.id).unwrap_or_default();
            ProductWithPromotions {
                product: model.into(),
                promotions,
            }
        })
        .collect();

    Ok(CategoryDetail {
        category: category.into(),
        parent,
        children,
        products,
    })
}

pub async fn get_navigation(state: &AppState) -> AppResult<ApiResponse<Vec<CategoryNavNode>>> {
    let active: Vec<Category> = Categories::find()
        .filter(Column::IsActive.eq(true))
        .order_by_asc(Column::Name)
        .all(state.db())
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    let nav = build_navigation(active, NAVIGATION_DEPTH);
    Ok(ApiResponse::success("Navigation", nav, Some(Meta::empty())))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    payload.validate()?;

    ensure_unique_slug(state.db(), SlugOwner::Category, &payload.slug, None).await?;

    if let Some(parent_id) = payload.parent_id {
        ensure_parent_exists(state, parent_id).await?;
    }

    let category = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        slug: Set(payload.slug),
        description: Set(payload.description),
        image: Set(payload.image),
        is_active: Set(payload.is_active),
        parent_id: Set(payload.parent_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(state.db())
    .await?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
    audit::record(
        state.db(),
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Categories::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

    if let Some(slug) = payload.slug.as_deref().filter(|s| *s != existing.slug) {
        ensure_unique_slug(state.db(), SlugOwner::Category, slug, Some(id)).await?;
    }

    if let Some(Some(parent_id)) = payload.parent_id {
        if parent_id == id {
            return Err(AppError::BadRequest(
                "A category cannot be its own parent".into(),
            ));
        }
        ensure_parent_exists(state, parent_id).await?;

        let edges = Categories::find()
            .all(state.db())
            .await?
            .into_iter()
            .map(|c| (c.id, c.parent_id));
        if CategoryTree::from_edges(edges).would_create_cycle(id, parent_id) {
            tracing::warn!(category_id = %id, %parent_id, "rejected cyclic parent");
            return Err(AppError::BadRequest(
                "Cannot create circular reference in category hierarchy".into(),
            ));
        }
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
    if let Some(image) = payload.image {
        active.image = Set(image);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(parent_id) = payload.parent_id {
        active.parent_id = Set(parent_id);
    }
    active.updated_at = Set(Utc::now().into());

    let category = active.update(state.db()).await?;

    audit::record(
        state.db(),
        user.user_id,
        "category_update",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        category.into(),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    Categories::find_by_id(id)
        .one(state.db())
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

    let child_count = Categories::find()
        .filter(Column::ParentId.eq(id))
        .count(state.db())
        .await?;
    if child_count > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete a category with child categories".into(),
        ));
    }

    let product_count = Products::find()
        .filter(ProdCol::CategoryId.eq(id))
        .count(state.db())
        .await?;
    if product_count > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete a category with products".into(),
        ));
    }

    Categories::delete_by_id(id).exec(state.db()).await?;

    tracing::info!(category_id = %id, "category deleted");
    audit::record(
        state.db(),
        user.user_id,
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "success": true }),
        Some(Meta::empty()),
    ))
}

async fn ensure_parent_exists(state: &AppState, parent_id: Uuid) -> AppResult<()> {
    Categories::find_by_id(parent_id)
        .one(state.db())
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Parent category"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::users::Role,
        test_support::{category_model, test_state},
    };
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn admin() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn customers_cannot_create_categories() {
        let state = test_state(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let customer = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::User,
        };
        let payload = CreateCategoryRequest {
            name: "Gift Cards".into(),
            slug: "gift-cards".into(),
            description: None,
            image: None,
            is_active: true,
            parent_id: None,
        };

        let err = create_category(&state, &customer, payload).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn missing_parent_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<CategoryModel>::new(), Vec::<CategoryModel>::new()])
            .into_connection();
        let state = test_state(db);
        let payload = CreateCategoryRequest {
            name: "PlayStation".into(),
            slug: "playstation".into(),
            description: None,
            image: None,
            is_active: true,
            parent_id: Some(Uuid::new_v4()),
        };

        let err = create_category(&state, &admin(), payload).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Parent category not found"));
    }

    #[tokio::test]
    async fn category_cannot_be_its_own_parent() {
        let gift = category_model("Gift Cards", "gift-cards", None);
        let id = gift.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![gift]])
            .into_connection();
        let state = test_state(db);
        let payload = UpdateCategoryRequest {
            parent_id: Some(Some(id)),
            ..Default::default()
        };

        let err = update_category(&state, &admin(), id, payload).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn moving_under_a_descendant_is_rejected() {
        let gift = category_model("Gift Cards", "gift-cards", None);
        let psn = category_model("PlayStation", "playstation", Some(gift.id));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // existing category, proposed parent, full edge list
            .append_query_results([
                vec![gift.clone()],
                vec![psn.clone()],
                vec![gift.clone(), psn.clone()],
            ])
            .into_connection();
        let state = test_state(db);
        let payload = UpdateCategoryRequest {
            parent_id: Some(Some(psn.id)),
            ..Default::default()
        };

        let err = update_category(&state, &admin(), gift.id, payload)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::BadRequest(msg) if msg.contains("circular reference"))
        );
    }

    #[tokio::test]
    async fn update_of_unknown_category_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<CategoryModel>::new()])
            .into_connection();
        let state = test_state(db);

        let err = update_category(&state, &admin(), Uuid::new_v4(), Default::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
