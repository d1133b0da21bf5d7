//! Domain types returned by the repositories and serialized by the routes.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`]. All of them serialize with `camelCase` field names.

pub mod order;
pub mod pagination;
pub mod product;
pub mod shop;
pub mod user;

pub use order::{
    NewOrder, NewOrderLine, Order, OrderDetail, OrderItem, OrderScope, OrderStats,
    OrderWithItems, StatusChange, TimelineEntry,
};
pub use pagination::{Page, PageParams, Pagination};
pub use product::{Product, ProductImage, ProductSummary, ShopSummary, Specifications};
pub use shop::{
    BusinessInfo, ProductCounts, Rating, Shop, ShopContact, ShopSettings, ShopStats, SocialMedia,
};
pub use user::User;
