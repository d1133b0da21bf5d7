//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/auth/register            - Create an account, returns a token
//! POST   /api/auth/login               - Exchange credentials for a token
//! GET    /api/auth/me                  - Current account
//! POST   /api/auth/logout              - Acknowledge logout
//!
//! # Users
//! GET    /api/users                    - All accounts (admin)
//! GET    /api/users/{id}               - Profile, shop and purchase stats
//! GET    /api/users/{id}/stats         - Purchase and shop stats
//! PUT    /api/users/{id}               - Update profile
//! PUT    /api/users/{id}/password      - Change own password
//! PUT    /api/users/{id}/toggle-status - Activate/deactivate (admin)
//! DELETE /api/users/{id}               - Deactivate account
//!
//! # Shops
//! GET    /api/shops                    - Active shops
//! GET    /api/shops/my-shop            - Caller's shop (seller)
//! GET    /api/shops/{id}               - Shop page
//! GET    /api/shops/{id}/products      - Shop products
//! POST   /api/shops                    - Open a shop (seller)
//! PUT    /api/shops/{id}               - Update shop
//! PUT    /api/shops/{id}/stats         - Recompute counters
//!
//! # Products
//! GET    /api/products                 - Active products
//! GET    /api/products/my-products     - Caller's products (seller)
//! GET    /api/products/{id}            - Product detail
//! POST   /api/products                 - Create (seller with a shop)
//! PUT    /api/products/{id}            - Update
//! DELETE /api/products/{id}            - Soft delete
//!
//! # Orders
//! GET    /api/orders                   - All orders (admin)
//! GET    /api/orders/stats             - Role-scoped statistics
//! GET    /api/orders/my-orders         - Caller's purchases
//! GET    /api/orders/shop-orders       - Caller's shop orders (seller)
//! GET    /api/orders/{id}              - Order with items and timeline
//! GET    /api/orders/{id}/timeline     - Timeline only
//! POST   /api/orders                   - Place an order
//! PUT    /api/orders/{id}/status       - Lifecycle transition
//! PUT    /api/orders/{id}/cancel       - Cancel before shipping
//! PUT    /api/orders/{id}/payment      - Payment status
//! ```

pub mod address;
pub mod auth;
pub mod extract;
pub mod orders;
pub mod products;
pub mod shops;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
        .route("/{id}/stats", get(users::stats))
        .route("/{id}/password", put(users::change_password))
        .route("/{id}/toggle-status", put(users::toggle_status))
}

/// Create the shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shops::index).post(shops::create))
        .route("/my-shop", get(shops::mine))
        .route("/{id}", get(shops::show).put(shops::update))
        .route("/{id}/products", get(shops::products))
        .route("/{id}/stats", put(shops::refresh_stats))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/my-products", get(products::mine))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/stats", get(orders::stats))
        .route("/my-orders", get(orders::mine))
        .route("/shop-orders", get(orders::for_shop))
        .route("/{id}", get(orders::show))
        .route("/{id}/timeline", get(orders::timeline))
        .route("/{id}/status", put(orders::update_status))
        .route("/{id}/cancel", put(orders::cancel))
        .route("/{id}/payment", put(orders::update_payment))
}

/// Create everything under `/api`. The auth router is passed in so the
/// caller can layer rate limiting onto it.
pub fn api_routes(auth: Router<AppState>) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth)
        .nest("/users", user_routes())
        .nest("/shops", shop_routes())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
}
