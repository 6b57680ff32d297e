use crate::db::{queries, CellValue, MonthFilter, QueryRow, SqliteStore};
use crate::error::Error;
use crate::viz::{series, Chart, ChartKind};
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 看板共享状态
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub store: Arc<SqliteStore>,
    pub table: String,
    pub year: i32,
}

/// 查询参数: `month=03` / `month=all`
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub month: Option<String>,
}

/// 响应体
#[derive(Debug, Serialize)]
pub struct DashboardResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

const NO_DATA: &str = "no data for the selected period";

fn ok<T: Serialize>(message: impl Into<String>, data: Option<T>) -> Response {
    let response = DashboardResponse {
        success: true,
        message: message.into(),
        data,
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn failure(status: StatusCode, e: Error) -> Response {
    tracing::error!("Dashboard request failed: {}", e);
    let response = DashboardResponse::<()> {
        success: false,
        message: format!("Error: {}", e),
        data: None,
    };
    (status, Json(response)).into_response()
}

fn parse_filter(query: &DashboardQuery) -> Result<MonthFilter, Response> {
    MonthFilter::parse(query.month.as_deref()).map_err(|e| failure(StatusCode::BAD_REQUEST, e))
}

fn chart_response(rows: &[QueryRow], kind: ChartKind, label: &str, value: &str, title: &str) -> Response {
    if rows.is_empty() {
        return ok(NO_DATA, None::<Chart>);
    }
    let (labels, values) = series(rows, label, value);
    match Chart::new(kind, &labels, &values, title) {
        Ok(chart) => ok(format!("{} points", chart.labels.len()), Some(chart)),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 表中出现过的月份
pub async fn months(State(state): State<DashboardState>) -> Response {
    match queries::available_months(state.store.as_ref(), &state.table).await {
        Ok(rows) => {
            let labels: Vec<String> = rows
                .iter()
                .filter_map(|r| match r.get("month") {
                    Some(CellValue::Text(m)) => Some(m.clone()),
                    _ => None,
                })
                .collect();
            ok(format!("{} months", labels.len()), Some(labels))
        }
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// 销量最高的商品 (柱状图)
pub async fn top_products(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let filter = match parse_filter(&query) {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    match queries::dashboard_top_products(state.store.as_ref(), &state.table, filter, state.year).await {
        Ok(rows) => chart_response(&rows, ChartKind::Bar, "product", "total_quantity", "Top products by quantity"),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// 月度收入 (折线图)
pub async fn monthly_revenue(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let filter = match parse_filter(&query) {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    match queries::dashboard_monthly_revenue(state.store.as_ref(), &state.table, filter, state.year).await {
        Ok(rows) => chart_response(&rows, ChartKind::Line, "month", "total_revenue", "Monthly revenue"),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// VIP 客户表
pub async fn vip_customers(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let filter = match parse_filter(&query) {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    match queries::dashboard_vip_customers(state.store.as_ref(), &state.table, filter, state.year).await {
        Ok(rows) if rows.is_empty() => ok(NO_DATA, None::<Vec<QueryRow>>),
        Ok(rows) => ok(format!("{} customers", rows.len()), Some(rows)),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}
