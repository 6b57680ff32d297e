pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod provider;
pub mod service;
pub mod viz;

pub use config::AppConfig;
pub use db::{create_pool, CsvStore, SqliteStore};
pub use error::{Error, Result};
pub use provider::{FakeDataProvider, FakerProvider, Locale};
pub use service::{RecordGenerator, SalesAnalysis, SamplingRanges};
