use crate::models::CatalogKind;
use crate::provider::Locale;
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub output: OutputConfig,
    pub generator: GeneratorConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub csv_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// 为空时每次运行使用不同的随机数
    pub seed: Option<u64>,
    pub bookstore_locale: Locale,
    pub ecommerce_locale: Locale,
    /// 出生日期的参考日 (YYYY-MM-DD)
    pub reference_date: String,
    pub bookstore_rows: usize,
    pub bookstore_customers: usize,
    pub ecommerce_rows: usize,
    pub ecommerce_customers: usize,
    pub vip_threshold: i64,
    pub top_n: usize,
    pub report_year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://sales_ecommerce.db".to_string(),
                table: "sales".to_string(),
            },
            output: OutputConfig {
                csv_dir: "output".to_string(),
            },
            generator: GeneratorConfig {
                seed: None,
                bookstore_locale: CatalogKind::Bookstore.default_locale(),
                ecommerce_locale: CatalogKind::Ecommerce.default_locale(),
                reference_date: "2025-01-01".to_string(),
                bookstore_rows: 1500,
                bookstore_customers: 1270,
                ecommerce_rows: 3000,
                ecommerce_customers: 1600,
                vip_threshold: 5000,
                top_n: 10,
                report_year: 2024,
            },
            dashboard: DashboardConfig { enabled: false },
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 < `sales.toml` (可选) < `SALES_` 前缀环境变量
    ///
    /// 环境变量用 `__` 分隔层级, 例如 `SALES_SERVER__PORT=9000`、`SALES_GENERATOR__SEED=42`。
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::with_prefix("SALES")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true))
    }

    fn load(env: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("sales").required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}
