pub mod handlers;

pub use handlers::*;

use axum::{routing::get, Router};
use tower::ServiceBuilder;

/// 看板路由
pub fn router(state: DashboardState) -> Router {
    let dashboard_routes = Router::new()
        .route("/api/dashboard/months", get(months))
        .route("/api/dashboard/top-products", get(top_products))
        .route("/api/dashboard/monthly-revenue", get(monthly_revenue))
        .route("/api/dashboard/vip-customers", get(vip_customers))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .merge(dashboard_routes)
        .layer(ServiceBuilder::new())
}
