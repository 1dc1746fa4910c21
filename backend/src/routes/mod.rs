//! Route definitions for the Smart Inventory API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (register/login public, /me protected)
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes - catalog
        .nest("/products", product_routes(state.clone()))
        // Protected routes - stock movements
        .nest("/inventory", inventory_routes(state.clone()))
        // Protected routes - point of sale
        .nest("/sales", sales_routes(state.clone()))
        // Protected routes - replenishment (manager/admin)
        .nest("/replenishment", replenishment_routes(state.clone()))
        // Protected routes - dashboard
        .nest("/dashboard", dashboard_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .merge(protected)
}

/// Catalog routes (protected)
fn product_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/suppliers",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:sku",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Inventory routes (protected)
fn inventory_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/movement-types", get(handlers::list_movement_types))
        .route("/movements", get(handlers::list_movements))
        .route("/stock/:sku", get(handlers::get_stock_level))
        .route("/receipt", post(handlers::receive_stock))
        .route("/adjust", post(handlers::adjust_stock))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Sales routes (protected)
fn sales_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_sale))
        .route("/transactions", get(handlers::list_transactions))
        .route("/transactions/:transaction_id", get(handlers::get_transaction))
        .route("/summary/daily", get(handlers::daily_summary))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Replenishment routes (protected)
fn replenishment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::generate_suggestions))
        .route("/suggestions", get(handlers::list_suggestions))
        .route("/actions", post(handlers::suggestion_action))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Dashboard routes (protected)
fn dashboard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(handlers::low_stock))
        .route("/daily-sales", get(handlers::daily_sales))
        .route("/inventory", get(handlers::inventory_snapshot))
        .route("/product-performance", get(handlers::product_performance))
        .route("/summary", get(handlers::dashboard_summary))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
