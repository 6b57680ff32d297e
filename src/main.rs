use sales_synth::{
    api::{self, DashboardState},
    create_pool,
    service::pipeline,
    viz::TextRenderer,
    AppConfig, CsvStore, SqliteStore,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database.url).await?;
    info!("Database pool created");

    let store = Arc::new(SqliteStore::new(pool));
    let csv_store = CsvStore::new(&config.output.csv_dir);

    let mut renderer = TextRenderer::new(std::io::stdout());
    let output = pipeline::run(&config, &csv_store, &store, &mut renderer).await?;
    info!(
        "批处理完成: 书店 {} 行, 电商 {} 行, 入库 {} 行",
        output.bookstore.records().len(),
        output.ecommerce.records().len(),
        output.rows_persisted
    );

    if !config.dashboard.enabled {
        return Ok(());
    }

    // 启动看板服务
    let state = DashboardState {
        store,
        table: config.database.table.clone(),
        year: config.generator.report_year,
    };
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Dashboard listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET /api/dashboard/months");
    info!("  GET /api/dashboard/top-products?month=MM");
    info!("  GET /api/dashboard/monthly-revenue?month=MM");
    info!("  GET /api/dashboard/vip-customers?month=MM");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
