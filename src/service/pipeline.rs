use super::generator::{RecordGenerator, SamplingRanges};
use super::reports::{AnalysisSettings, SalesAnalysis};
use crate::config::AppConfig;
use crate::db::{queries, quote_identifier, CsvStore, Destination, SqliteStore, TabularStore};
use crate::error::{Error, Result};
use crate::models::{Batch, Catalog, CatalogKind};
use crate::provider::FakerProvider;
use crate::viz::Visualizer;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

pub const BOOKSTORE_CSV: &str = "sales_books.csv";
pub const ECOMMERCE_CSV: &str = "sales_ecommerce.csv";

/// 一次完整运行的产出
#[derive(Debug)]
pub struct PipelineOutput {
    pub bookstore: Batch,
    pub ecommerce: Batch,
    pub rows_persisted: u64,
}

/// 生成两个批次 -> 导出 CSV -> 写入 SQLite -> 分析并渲染
pub async fn run(
    config: &AppConfig,
    csv_store: &CsvStore,
    sql_store: &SqliteStore,
    viz: &mut dyn Visualizer,
) -> Result<PipelineOutput> {
    let generator_config = &config.generator;
    let as_of = NaiveDate::parse_from_str(&generator_config.reference_date, "%Y-%m-%d").map_err(|e| {
        Error::Config(::config::ConfigError::Message(format!(
            "generator.reference_date {:?}: {}",
            generator_config.reference_date, e
        )))
    })?;
    let mut provider = FakerProvider::new(generator_config.seed, as_of);

    // 1. 生成
    let bookstore = RecordGenerator::new(
        SamplingRanges::for_catalog(CatalogKind::Bookstore),
        generator_config.bookstore_locale,
    )
    .generate(
        generator_config.bookstore_rows,
        generator_config.bookstore_customers,
        &Catalog::bookstore(),
        &mut provider,
    )?;
    let ecommerce = RecordGenerator::new(
        SamplingRanges::for_catalog(CatalogKind::Ecommerce),
        generator_config.ecommerce_locale,
    )
    .generate(
        generator_config.ecommerce_rows,
        generator_config.ecommerce_customers,
        &Catalog::ecommerce(),
        &mut provider,
    )?;

    // 2. 持久化
    csv_store
        .write_rows(&bookstore.rows(), &Destination::File(BOOKSTORE_CSV.into()))
        .await?;
    csv_store
        .write_rows(&ecommerce.rows(), &Destination::File(ECOMMERCE_CSV.into()))
        .await?;

    let table = &config.database.table;
    let rows_persisted = sql_store
        .write_rows(&ecommerce.rows(), &Destination::Table(table.clone()))
        .await?;

    // 回读确认
    let check_sql = format!("SELECT * FROM {} LIMIT 5", quote_identifier(table)?);
    let sample = sql_store.read_query(&check_sql, &[]).await?;
    viz.render_table(&sample)?;
    tracing::info!("数据库已更新: {} 行, 回读 {} 行", rows_persisted, sample.len());

    // 3. 内存分析
    let settings = AnalysisSettings {
        top_n: generator_config.top_n,
        vip_threshold: BigDecimal::from(generator_config.vip_threshold),
        year: generator_config.report_year,
        ..AnalysisSettings::default()
    };
    SalesAnalysis::run(&bookstore, &settings)?.render(viz)?;
    SalesAnalysis::run(&ecommerce, &settings)?.render(viz)?;

    // 4. SQL 报表
    viz.render_table(&queries::top_customers_by_quantity(sql_store, table, 10).await?)?;
    viz.render_table(&queries::top_products_by_revenue(sql_store, table, 5).await?)?;
    viz.render_table(&queries::avg_price_by_category(sql_store, table).await?)?;
    viz.render_table(&queries::half_year_revenue(sql_store, table, generator_config.report_year).await?)?;

    Ok(PipelineOutput {
        bookstore,
        ecommerce,
        rows_persisted,
    })
}
