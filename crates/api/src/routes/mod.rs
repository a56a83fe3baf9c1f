//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (pings the database)
//!
//! # Users & auth
//! POST   /api/users                 - Register (sets credential cookie)
//! POST   /api/users/login           - Login (sets credential cookie)
//! POST   /api/users/logout          - Logout (clears credential cookie)
//! GET    /api/users/profile         - Own profile (auth)
//! PUT    /api/users/profile         - Update own profile (auth)
//! GET    /api/users                 - List users (admin)
//! GET    /api/users/{id}            - Get user (admin)
//! PUT    /api/users/{id}            - Update user incl. admin flag (admin)
//! DELETE /api/users/{id}            - Delete non-admin user (admin)
//!
//! # Products
//! GET    /api/products              - List catalog (public)
//! GET    /api/products/{id}         - Product detail with reviews (public)
//! POST   /api/products              - Create product (admin)
//! PUT    /api/products/{id}         - Update product (admin)
//! DELETE /api/products/{id}         - Delete product (admin)
//! POST   /api/products/{id}/reviews - Add review, one per customer (auth)
//!
//! # Orders
//! POST /api/orders                  - Checkout (auth)
//! GET  /api/orders/mine             - Own orders (auth)
//! GET  /api/orders/{id}             - Order detail (owner or admin)
//! PUT  /api/orders/{id}/pay         - Capture payment (owner or admin)
//! PUT  /api/orders/{id}/deliver     - Mark delivered (admin)
//! GET  /api/orders                  - All orders (admin)
//! ```

pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the user and auth routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register).get(users::list_users))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route(
            "/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/{id}/reviews", post(products::create_review))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create_order).get(orders::list_orders))
        .route("/mine", get(orders::list_my_orders))
        .route("/{id}", get(orders::get_order))
        .route("/{id}/pay", put(orders::pay_order))
        .route("/{id}/deliver", put(orders::deliver_order))
}
