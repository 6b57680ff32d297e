/// 生成与聚合流水线的统一错误
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 采样区间为空或上下界颠倒
    #[error("invalid range for {what}: [{low}, {high})")]
    InvalidRange {
        what: &'static str,
        low: String,
        high: String,
    },

    /// 唯一ID池容量不足
    #[error("capacity exceeded: requested {requested} unique values, pool holds {available}")]
    CapacityExceeded { requested: usize, available: usize },

    /// 调用方要求非空结果, 但输入为空
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("chart shape mismatch: {labels} labels, {values} values")]
    ShapeMismatch { labels: usize, values: usize },

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub(crate) fn invalid_range(what: &'static str, low: impl ToString, high: impl ToString) -> Self {
        Error::InvalidRange {
            what,
            low: low.to_string(),
            high: high.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
