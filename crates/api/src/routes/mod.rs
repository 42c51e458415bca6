//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (database ping)
//!
//! # Users
//! POST   /api/users                - Register (201)
//! POST   /api/users/login          - Login, answers a bearer token
//! GET    /api/users/profile        - Own profile (auth)
//! PUT    /api/users/profile        - Edit own profile (auth)
//! GET    /api/users                - List accounts (admin)
//! GET    /api/users/{id}           - Fetch account (admin)
//! PUT    /api/users/{id}           - Edit account/role (admin)
//! DELETE /api/users/{id}           - Delete account (admin)
//!
//! # Products
//! GET    /api/products             - Keyword search, paginated
//! GET    /api/products/top         - Highest-rated showcase
//! GET    /api/products/{id}        - Detail with reviews
//! POST   /api/products             - Create placeholder (admin, 201)
//! PUT    /api/products/{id}        - Edit (admin)
//! DELETE /api/products/{id}        - Delete (admin)
//! POST   /api/products/{id}/reviews - Add review (auth, 201)
//!
//! # Orders
//! POST /api/orders                 - Place order (auth, 201)
//! GET  /api/orders/myorders        - Own order history (auth)
//! GET  /api/orders/{id}            - One order (owner or admin)
//! PUT  /api/orders/{id}/pay        - Record payment (owner or admin)
//! PUT  /api/orders/{id}/deliver    - Record delivery (admin)
//! GET  /api/orders                 - Every order (admin)
//! ```

pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register).get(users::list_users))
        .route("/login", post(users::login))
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
        .route("/top", get(products::top_products))
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
        .route("/", post(orders::place_order).get(orders::list_orders))
        .route("/myorders", get(orders::my_orders))
        .route("/{id}", get(orders::get_order))
        .route("/{id}/pay", put(orders::pay_order))
        .route("/{id}/deliver", put(orders::deliver_order))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/users", user_routes())
        .nest("/api/products", product_routes())
        .nest("/api/orders", order_routes())
}
