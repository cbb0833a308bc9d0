use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::{Categories, Products, categories, products},
    error::{AppError, AppResult},
};

/// Catalog entities addressed by a unique slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugOwner {
    Product,
    Category,
}

impl SlugOwner {
    pub fn label(self) -> &'static str {
        match self {
            SlugOwner::Product => "product",
            SlugOwner::Category => "category",
        }
    }
}

/// Fails with `Conflict` when another row of `owner`'s kind already uses `slug`.
/// `exclude` skips the row being updated.
pub async fn ensure_unique_slug<C: ConnectionTrait>(
    conn: &C,
    owner: SlugOwner,
    slug: &str,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let taken = match owner {
        SlugOwner::Product => {
            let mut finder = Products::find().filter(products::Column::Slug.eq(slug));
            if let Some(id) = exclude {
                finder = finder.filter(products::Column::Id.ne(id));
            }
            finder.one(conn).await?.is_some()
        }
        SlugOwner::Category => {
            let mut finder = Categories::find().filter(categories::Column::Slug.eq(slug));
            if let Some(id) = exclude {
                finder = finder.filter(categories::Column::Id.ne(id));
            }
            finder.one(conn).await?.is_some()
        }
    };

    if taken {
        tracing::debug!(slug, kind = owner.label(), "slug already taken");
        return Err(AppError::Conflict(format!(
            "A {} with this slug already exists",
            owner.label()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::category_model;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn taken_slug_is_a_conflict() {
        let existing = category_model("Gift Cards", "gift-cards", None);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .into_connection();

        let err = ensure_unique_slug(&db, SlugOwner::Category, "gift-cards", None)
            .await
            .unwrap_err();
        match err {
            AppError::Conflict(msg) => assert_eq!(msg, "A category with this slug already exists"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn free_slug_passes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<categories::Model>::new()])
            .into_connection();

        ensure_unique_slug(&db, SlugOwner::Category, "xbox", Some(Uuid::new_v4()))
            .await
            .expect("slug is free");
    }
}
