use super::aggregation::{
    classify_sums, mean_by_group, period_compare, sum_by_group, top_n, HalfYear, Monthly,
    TieBreak,
};
use crate::db::{CellValue, QueryRow};
use crate::error::{Error, Result};
use crate::models::{round_money, Batch, SalesRecord};
use crate::viz::Visualizer;
use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::Serialize;
use std::collections::BTreeMap;

/// 分析参数
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub top_n: usize,
    pub top_customers: usize,
    pub vip_threshold: BigDecimal,
    pub year: i32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            top_customers: 5,
            vip_threshold: BigDecimal::from(5000),
            year: 2024,
        }
    }
}

/// 汇总报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub sales_count: usize,
    pub items_sold: i64,
    pub revenue: BigDecimal,
    /// 收入 / 客户池大小
    pub average_per_customer: BigDecimal,
}

impl SalesSummary {
    pub fn compute(records: &[SalesRecord], customer_count: usize) -> Result<Self> {
        if customer_count == 0 {
            return Err(Error::EmptyInput("customer pool"));
        }
        let items_sold = records.iter().map(|r| r.quantity()).sum();
        let revenue = records
            .iter()
            .fold(BigDecimal::zero(), |acc, r| acc + r.total_price());
        let average_per_customer = round_money(&(&revenue / BigDecimal::from(customer_count as i64)), 2);
        Ok(Self {
            sales_count: records.len(),
            items_sold,
            revenue,
            average_per_customer,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VipEntry {
    pub customer_id: String,
    pub customer: String,
    pub total_spent: BigDecimal,
    pub vip: bool,
}

/// 一个批次上的全部分析结果
#[derive(Debug, Clone)]
pub struct SalesAnalysis {
    pub top_items: Vec<(String, i64)>,
    /// 标签为 `姓名 (ID)`
    pub top_customers: Vec<(String, BigDecimal)>,
    pub top_cities: Vec<(String, i64)>,
    /// 品类/出版社每单平均消费
    pub average_by_group: BTreeMap<String, BigDecimal>,
    pub monthly_revenue: BTreeMap<String, BigDecimal>,
    pub half_years: BTreeMap<String, BigDecimal>,
    /// 按消费金额降序
    pub customers: Vec<VipEntry>,
    pub summary: SalesSummary,
}

impl SalesAnalysis {
    pub fn run(batch: &Batch, settings: &AnalysisSettings) -> Result<Self> {
        let records = batch.records();

        let quantity_by_item = sum_by_group(records, |r| r.item(), |r| r.quantity());
        let top_items = top_n(&quantity_by_item, settings.top_n, TieBreak::KeyAscending)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let spend = sum_by_group(records, |r| r.customer_id(), |r| r.total_price().clone());
        let customer_name = |id: &str| batch.customer(id).map(|c| c.name.clone()).unwrap_or_default();
        let top_customers = top_n(&spend, settings.top_customers, TieBreak::KeyAscending)
            .into_iter()
            .map(|(id, total)| (format!("{} ({})", customer_name(id), id), total))
            .collect();

        let rows = batch.rows();
        let quantity_by_city = sum_by_group(&rows, |r| r.city.as_str(), |r| r.sales_quantity);
        let top_cities = top_n(&quantity_by_city, settings.top_n, TieBreak::KeyAscending)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let average_by_group = mean_by_group(records, |r| r.group().to_string(), |r| r.total_price().clone(), 2);

        let monthly_revenue = period_compare(records, |r| r.sale_date(), |r| r.total_price().clone(), &Monthly);
        let half_years = period_compare(
            records,
            |r| r.sale_date(),
            |r| r.total_price().clone(),
            &HalfYear { year: settings.year },
        );

        let flags = classify_sums(&spend, &settings.vip_threshold);
        let customers = top_n(&spend, spend.len(), TieBreak::KeyAscending)
            .into_iter()
            .map(|(id, total)| VipEntry {
                customer_id: id.to_string(),
                customer: customer_name(id),
                vip: flags.get(id).copied().unwrap_or(false),
                total_spent: total,
            })
            .collect();

        let summary = SalesSummary::compute(records, batch.customers().len())?;

        tracing::info!(
            "分析完成: {} 条销售, 收入 {}, 客户人均 {}",
            summary.sales_count, summary.revenue, summary.average_per_customer
        );

        Ok(Self {
            top_items,
            top_customers,
            top_cities,
            average_by_group,
            monthly_revenue,
            half_years,
            customers,
            summary,
        })
    }

    pub fn vip_customers(&self) -> impl Iterator<Item = &VipEntry> {
        self.customers.iter().filter(|c| c.vip)
    }

    pub fn render(&self, viz: &mut dyn Visualizer) -> Result<()> {
        let (labels, values) = counts(&self.top_items);
        viz.render_bar_chart(&labels, &values, "Top items by quantity")?;

        let (labels, values) = amounts(self.top_customers.iter().map(|(k, v)| (k.as_str(), v)));
        viz.render_bar_chart(&labels, &values, "Top customers by total spend")?;

        let (labels, values) = counts(&self.top_cities);
        viz.render_bar_chart(&labels, &values, "Top cities by quantity")?;

        let (labels, values) = amounts(self.monthly_revenue.iter().map(|(k, v)| (k.as_str(), v)));
        viz.render_line_chart(&labels, &values, "Monthly revenue")?;

        let average_rows: Vec<QueryRow> = self
            .average_by_group
            .iter()
            .map(|(group, avg)| {
                row([
                    ("group", CellValue::Text(group.clone())),
                    ("avg_price", CellValue::Decimal(avg.clone())),
                ])
            })
            .collect();
        viz.render_table(&average_rows)?;

        let half_rows: Vec<QueryRow> = self
            .half_years
            .iter()
            .map(|(period, total)| {
                row([
                    ("half_year", CellValue::Text(period.clone())),
                    ("total_revenue", CellValue::Decimal(total.clone())),
                ])
            })
            .collect();
        viz.render_table(&half_rows)?;

        let vip_rows: Vec<QueryRow> = self
            .vip_customers()
            .map(|c| {
                row([
                    ("customer_id", CellValue::Text(c.customer_id.clone())),
                    ("customer", CellValue::Text(c.customer.clone())),
                    ("total_spent", CellValue::Decimal(c.total_spent.clone())),
                ])
            })
            .collect();
        viz.render_table(&vip_rows)?;

        let summary = &self.summary;
        viz.render_table(&[row([
            ("sales", CellValue::Integer(summary.sales_count as i64)),
            ("items_sold", CellValue::Integer(summary.items_sold)),
            ("revenue", CellValue::Decimal(summary.revenue.clone())),
            ("avg_per_customer", CellValue::Decimal(summary.average_per_customer.clone())),
        ])])
    }
}

fn row<const N: usize>(cells: [(&str, CellValue); N]) -> QueryRow {
    cells.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn counts(entries: &[(String, i64)]) -> (Vec<String>, Vec<f64>) {
    entries.iter().map(|(k, v)| (k.clone(), *v as f64)).unzip()
}

fn amounts<'a>(entries: impl Iterator<Item = (&'a str, &'a BigDecimal)>) -> (Vec<String>, Vec<f64>) {
    entries
        .map(|(k, v)| (k.to_string(), v.to_f64().unwrap_or(0.0)))
        .unzip()
}
