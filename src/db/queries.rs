use super::store::{quote_identifier, CellValue, QueryRow, TabularStore};
use crate::error::{Error, Result};

/// 看板月份过滤 (None 表示全部)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthFilter {
    month: Option<u32>,
}

impl MonthFilter {
    pub fn all() -> Self {
        Self { month: None }
    }

    pub fn month(month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::invalid_range("month", 1, 13));
        }
        Ok(Self { month: Some(month) })
    }

    /// 接受 `None`、空串、`all`、`1`..`12` 或 `01`..`12`
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::all()),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(Self::all()),
            Some(s) => {
                let month = s
                    .parse::<u32>()
                    .map_err(|_| Error::invalid_range("month", 1, 13))?;
                Self::month(month)
            }
        }
    }

    pub fn selected(&self) -> Option<u32> {
        self.month
    }

    fn where_clause(&self, year: i32) -> (&'static str, Vec<CellValue>) {
        match self.month {
            None => ("", Vec::new()),
            Some(month) => (
                "WHERE STRFTIME('%m', sales_date) = ? AND STRFTIME('%Y', sales_date) = ?",
                vec![
                    CellValue::Text(format!("{:02}", month)),
                    CellValue::Text(year.to_string()),
                ],
            ),
        }
    }
}

/// 购买数量最多的客户
pub async fn top_customers_by_quantity(
    store: &impl TabularStore,
    table: &str,
    limit: i64,
) -> Result<Vec<QueryRow>> {
    let table = quote_identifier(table)?;
    let sql = format!(
        r#"
        SELECT customer_id, customer, SUM(sales_quantity) AS sum_quantity
        FROM {table}
        GROUP BY customer_id, customer
        ORDER BY SUM(sales_quantity) DESC, customer_id
        LIMIT ?
        "#
    );
    store.read_query(&sql, &[CellValue::Integer(limit)]).await
}

/// 收入最高的商品
pub async fn top_products_by_revenue(
    store: &impl TabularStore,
    table: &str,
    limit: i64,
) -> Result<Vec<QueryRow>> {
    let table = quote_identifier(table)?;
    let sql = format!(
        r#"
        SELECT item AS product, ROUND(SUM(total_price), 2) AS total_revenue
        FROM {table}
        GROUP BY item
        ORDER BY SUM(total_price) DESC, item
        LIMIT ?
        "#
    );
    store.read_query(&sql, &[CellValue::Integer(limit)]).await
}

/// 各品类每单平均消费
pub async fn avg_price_by_category(store: &impl TabularStore, table: &str) -> Result<Vec<QueryRow>> {
    let table = quote_identifier(table)?;
    let sql = format!(
        r#"
        SELECT item_group AS category, ROUND(AVG(total_price), 2) AS avg_price
        FROM {table}
        GROUP BY item_group
        ORDER BY AVG(total_price) DESC, item_group
        "#
    );
    store.read_query(&sql, &[]).await
}

/// 上/下半年收入对比
pub async fn half_year_revenue(store: &impl TabularStore, table: &str, year: i32) -> Result<Vec<QueryRow>> {
    let table = quote_identifier(table)?;
    let sql = format!(
        r#"
        SELECT CASE
            WHEN STRFTIME('%m', sales_date) BETWEEN '01' AND '06' THEN 'first half-year'
            WHEN STRFTIME('%m', sales_date) BETWEEN '07' AND '12' THEN 'second half-year'
        END AS half_year, ROUND(SUM(total_price), 2) AS total_revenue
        FROM {table}
        WHERE STRFTIME('%Y', sales_date) = ?
        GROUP BY half_year
        ORDER BY half_year
        "#
    );
    store.read_query(&sql, &[CellValue::Text(year.to_string())]).await
}

/// 表中出现过的月份, 标签 `MM/YYYY`
pub async fn available_months(store: &impl TabularStore, table: &str) -> Result<Vec<QueryRow>> {
    let table = quote_identifier(table)?;
    let sql = format!(
        r#"
        SELECT STRFTIME('%Y-%m', sales_date) AS year_month,
               STRFTIME('%m/%Y', sales_date) AS month
        FROM {table}
        GROUP BY year_month
        ORDER BY year_month
        "#
    );
    store.read_query(&sql, &[]).await
}

/// 看板: 销量最高的 10 个商品
pub async fn dashboard_top_products(
    store: &impl TabularStore,
    table: &str,
    filter: MonthFilter,
    year: i32,
) -> Result<Vec<QueryRow>> {
    let table = quote_identifier(table)?;
    let (where_clause, params) = filter.where_clause(year);
    let sql = format!(
        r#"
        SELECT item AS product, SUM(sales_quantity) AS total_quantity
        FROM {table}
        {where_clause}
        GROUP BY item
        ORDER BY SUM(sales_quantity) DESC, item
        LIMIT 10
        "#
    );
    store.read_query(&sql, &params).await
}

/// 看板: 月度收入
pub async fn dashboard_monthly_revenue(
    store: &impl TabularStore,
    table: &str,
    filter: MonthFilter,
    year: i32,
) -> Result<Vec<QueryRow>> {
    let table = quote_identifier(table)?;
    let (where_clause, params) = filter.where_clause(year);
    let sql = format!(
        r#"
        SELECT STRFTIME('%m', sales_date) AS month, ROUND(SUM(total_price), 2) AS total_revenue
        FROM {table}
        {where_clause}
        GROUP BY STRFTIME('%m', sales_date)
        ORDER BY STRFTIME('%m', sales_date)
        "#
    );
    store.read_query(&sql, &params).await
}

/// 看板: VIP 客户表
pub async fn dashboard_vip_customers(
    store: &impl TabularStore,
    table: &str,
    filter: MonthFilter,
    year: i32,
) -> Result<Vec<QueryRow>> {
    let table = quote_identifier(table)?;
    let (where_clause, params) = filter.where_clause(year);
    let sql = format!(
        r#"
        SELECT customer_id, customer,
               SUM(sales_quantity) AS total_quantity,
               ROUND(SUM(total_price), 2) AS total_amount
        FROM {table}
        {where_clause}
        GROUP BY customer_id, customer
        ORDER BY SUM(total_price) DESC, SUM(sales_quantity) DESC, customer
        LIMIT 10
        "#
    );
    store.read_query(&sql, &params).await
}
