use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, SessionInfo},
        categories::{
            CategoryDetail, CategoryNavNode, CategoryWithChildren, CreateCategoryRequest,
            UpdateCategoryRequest,
        },
        products::{
            CreateProductRequest, ProductDetail, ProductList, ProductWithCategory,
            ProductWithPromotions, PromotionLink, UpdateProductRequest,
        },
        promotions::{
            CreatePromotionRequest, ProductLink, PromotionWithProducts, UpdatePromotionRequest,
        },
    },
    entity::{promotions::DiscountType, users::Role},
    models::{Category, Product, ProductPromotion, Promotion, Review, ReviewAuthor, User},
    response::{ApiResponse, Meta},
    routes::{auth, categories, health, products, promotions},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::me,
        products::list_products,
        products::get_product,
        products::get_product_by_slug,
        products::create_product,
        products::update_product,
        products::toggle_status,
        products::toggle_featured,
        products::delete_product,
        categories::list_categories,
        categories::navigation,
        categories::get_category,
        categories::get_category_by_slug,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        promotions::active_promotions,
        promotions::product_promotions,
        promotions::list_promotions,
        promotions::create_promotion,
        promotions::update_promotion,
        promotions::delete_promotion
    ),
    components(
        schemas(
            User,
            Role,
            Product,
            Category,
            Promotion,
            DiscountType,
            ProductPromotion,
            Review,
            ReviewAuthor,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            SessionInfo,
            CreateProductRequest,
            UpdateProductRequest,
            ProductWithCategory,
            ProductWithPromotions,
            ProductList,
            ProductDetail,
            PromotionLink,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryWithChildren,
            CategoryDetail,
            CategoryNavNode,
            CreatePromotionRequest,
            UpdatePromotionRequest,
            ProductLink,
            PromotionWithProducts,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<Category>,
            ApiResponse<CategoryDetail>,
            ApiResponse<PromotionWithProducts>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Categories", description = "Category tree endpoints"),
        (name = "Promotions", description = "Promotion endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
