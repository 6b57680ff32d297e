use axum::{
    body::to_bytes,
    extract::{Query, State},
    http::StatusCode,
};
use bigdecimal::ToPrimitive;
use sales_synth::{
    api::{self, DashboardQuery, DashboardState},
    create_pool,
    db::{queries, TabularStore},
    service::{period_compare, pipeline, HalfYear},
    viz::ChartCollector,
    AppConfig, CsvStore, SqliteStore,
};
use std::sync::Arc;

fn small_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.generator.seed = Some(7);
    config.generator.bookstore_rows = 120;
    config.generator.bookstore_customers = 40;
    config.generator.ecommerce_rows = 300;
    config.generator.ecommerce_customers = 60;
    config
}

async fn memory_store() -> SqliteStore {
    SqliteStore::new(create_pool("sqlite::memory:").await.unwrap())
}

#[tokio::test]
async fn batch_run_persists_and_renders() {
    let config = small_config();
    let dir = tempfile::tempdir().unwrap();
    let csv_store = CsvStore::new(dir.path());
    let store = memory_store().await;
    let mut collector = ChartCollector::default();

    let output = pipeline::run(&config, &csv_store, &store, &mut collector)
        .await
        .unwrap();

    assert_eq!(output.bookstore.records().len(), 120);
    assert_eq!(output.ecommerce.records().len(), 300);
    assert_eq!(output.rows_persisted, 300);

    let count = store
        .read_query("SELECT COUNT(*) AS n FROM sales", &[])
        .await
        .unwrap();
    assert_eq!(count[0]["n"].as_f64(), Some(300.0));

    let books = std::fs::read_to_string(dir.path().join(pipeline::BOOKSTORE_CSV)).unwrap();
    assert_eq!(books.lines().count(), 121);
    assert!(books.starts_with("sales_code,item,item_group,item_id,author,customer_id,customer,city,email"));

    let with_book_ids = store
        .read_query("SELECT COUNT(item_id) AS n FROM sales", &[])
        .await
        .unwrap();
    assert_eq!(with_book_ids[0]["n"].as_f64(), Some(0.0));
    assert!(dir.path().join(pipeline::ECOMMERCE_CSV).exists());

    // 回读样本 + 两个批次各 4 张表 + 4 个 SQL 报表
    assert_eq!(collector.tables.len(), 13);
    assert_eq!(collector.tables[0].len(), 5);
    assert_eq!(collector.charts.len(), 8);
}

#[tokio::test]
async fn sql_half_years_match_in_memory_totals() {
    let config = small_config();
    let dir = tempfile::tempdir().unwrap();
    let store = memory_store().await;
    let output = pipeline::run(&config, &CsvStore::new(dir.path()), &store, &mut ChartCollector::default())
        .await
        .unwrap();

    let in_memory = period_compare(
        output.ecommerce.records(),
        |r| r.sale_date(),
        |r| r.total_price().clone(),
        &HalfYear { year: 2024 },
    );
    let rows = queries::half_year_revenue(&store, "sales", 2024).await.unwrap();
    assert_eq!(rows.len(), in_memory.len());

    for row in rows {
        let label = row["half_year"].to_string();
        let sql_total = row["total_revenue"].as_f64().unwrap();
        let expected = in_memory[&label].to_f64().unwrap();
        assert!((sql_total - expected).abs() < 0.01, "{}: {} vs {}", label, sql_total, expected);
    }
}

#[tokio::test]
async fn reference_date_must_parse() {
    let mut config = small_config();
    config.generator.reference_date = "01/01/2025".to_string();
    let dir = tempfile::tempdir().unwrap();
    let result = pipeline::run(
        &config,
        &CsvStore::new(dir.path()),
        &memory_store().await,
        &mut ChartCollector::default(),
    )
    .await;
    assert!(matches!(result, Err(sales_synth::Error::Config(_))));
}

async fn dashboard_state() -> DashboardState {
    let config = small_config();
    let dir = tempfile::tempdir().unwrap();
    let store = memory_store().await;
    pipeline::run(&config, &CsvStore::new(dir.path()), &store, &mut ChartCollector::default())
        .await
        .unwrap();
    DashboardState {
        store: Arc::new(store),
        table: "sales".to_string(),
        year: 2024,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn dashboard_rejects_bad_month() {
    let state = dashboard_state().await;
    let response = api::top_products(
        State(state),
        Query(DashboardQuery {
            month: Some("13".to_string()),
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn dashboard_serves_charts_and_tables() {
    let state = dashboard_state().await;

    let response = api::top_products(State(state.clone()), Query(DashboardQuery::default())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["kind"], "bar");
    assert!(body["data"]["labels"].as_array().unwrap().len() <= 10);

    let response = api::monthly_revenue(
        State(state.clone()),
        Query(DashboardQuery {
            month: Some("03".to_string()),
        }),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["labels"], serde_json::json!(["03"]));

    let response = api::vip_customers(State(state.clone()), Query(DashboardQuery::default())).await;
    let body = body_json(response).await;
    let rows = body["data"].as_array().unwrap();
    assert!(!rows.is_empty() && rows.len() <= 10);
    assert!(rows[0].get("customer_id").is_some());

    let response = api::months(State(state)).await;
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().iter().all(|m| m.as_str().unwrap().ends_with("/2024")));
}
