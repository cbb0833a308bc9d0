pub mod audit_logs;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod product_promotions;
pub mod products;
pub mod promotions;
pub mod reviews;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_promotions::Entity as ProductPromotions;
pub use products::Entity as Products;
pub use promotions::Entity as Promotions;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
