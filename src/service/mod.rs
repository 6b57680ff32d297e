pub mod aggregation;
pub mod generator;
pub mod pipeline;
pub mod reports;

pub use aggregation::{
    classify, classify_sums, mean_by_group, period_compare, sum_by_group, top_n, top_n_required,
    HalfYear, Monthly, PeriodRule, TieBreak,
};
pub use generator::{RecordGenerator, SamplingRanges};
pub use pipeline::PipelineOutput;
pub use reports::{AnalysisSettings, SalesAnalysis, SalesSummary, VipEntry};
