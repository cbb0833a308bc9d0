pub mod auth_service;
pub mod category_service;
pub mod category_tree;
pub mod product_service;
pub mod promotion_service;
pub mod slug;
