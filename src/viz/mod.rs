pub mod text;

pub use text::TextRenderer;

use crate::db::QueryRow;
use crate::error::{Error, Result};
use serde::Serialize;

/// 可视化输出
pub trait Visualizer {
    fn render_bar_chart(&mut self, labels: &[String], values: &[f64], title: &str) -> Result<()>;

    fn render_line_chart(&mut self, x_labels: &[String], y_values: &[f64], title: &str) -> Result<()>;

    fn render_table(&mut self, rows: &[QueryRow]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
}

/// 可序列化的图表 (看板接口直接返回)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl Chart {
    pub fn new(kind: ChartKind, labels: &[String], values: &[f64], title: &str) -> Result<Self> {
        check_shape(labels, values)?;
        Ok(Self {
            kind,
            title: title.to_string(),
            labels: labels.to_vec(),
            values: values.to_vec(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

pub(crate) fn check_shape(labels: &[String], values: &[f64]) -> Result<()> {
    if labels.len() != values.len() {
        return Err(Error::ShapeMismatch {
            labels: labels.len(),
            values: values.len(),
        });
    }
    Ok(())
}

/// 从查询结果中取 (标签列, 数值列); 数值不可解析时记为 0
pub fn series(rows: &[QueryRow], label_column: &str, value_column: &str) -> (Vec<String>, Vec<f64>) {
    rows.iter()
        .map(|row| {
            let label = row.get(label_column).map(|v| v.to_string()).unwrap_or_default();
            let value = row.get(value_column).and_then(|v| v.as_f64()).unwrap_or(0.0);
            (label, value)
        })
        .unzip()
}

/// 收集图表与表格, 不做渲染
#[derive(Debug, Default)]
pub struct ChartCollector {
    pub charts: Vec<Chart>,
    pub tables: Vec<Vec<QueryRow>>,
}

impl Visualizer for ChartCollector {
    fn render_bar_chart(&mut self, labels: &[String], values: &[f64], title: &str) -> Result<()> {
        self.charts.push(Chart::new(ChartKind::Bar, labels, values, title)?);
        Ok(())
    }

    fn render_line_chart(&mut self, x_labels: &[String], y_values: &[f64], title: &str) -> Result<()> {
        self.charts.push(Chart::new(ChartKind::Line, x_labels, y_values, title)?);
        Ok(())
    }

    fn render_table(&mut self, rows: &[QueryRow]) -> Result<()> {
        self.tables.push(rows.to_vec());
        Ok(())
    }
}
