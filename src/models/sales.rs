use super::Customer;
use crate::db::{CellValue, ColumnType, FlatRecord};
use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// 一笔销售的采样字段 (派生金额由 `SalesRecord::new` 计算)
#[derive(Debug, Clone)]
pub struct SaleLine {
    pub sales_code: String,
    pub item: String,
    /// 书店目录中书名对应的编号
    pub item_id: Option<u32>,
    pub author: Option<String>,
    pub group: String,
    pub customer_id: String,
    pub unit_price: BigDecimal,
    pub quantity: i64,
    pub discount_pct: BigDecimal,
    pub sale_date: NaiveDate,
}

/// 销售记录
///
/// `sales_value` 与 `total_price` 只能由采样字段推导, 因此字段不对外可写。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    sales_code: String,
    item: String,
    item_id: Option<u32>,
    author: Option<String>,
    group: String,
    customer_id: String,
    unit_price: BigDecimal,
    quantity: i64,
    discount_pct: BigDecimal,
    sale_date: NaiveDate,
    sales_value: BigDecimal,
    total_price: BigDecimal,
}

impl SalesRecord {
    pub fn new(line: SaleLine) -> Self {
        let sales_value = &line.unit_price * BigDecimal::from(line.quantity);
        let total_price = discounted_total(&sales_value, &line.discount_pct);
        Self {
            sales_code: line.sales_code,
            item: line.item,
            item_id: line.item_id,
            author: line.author,
            group: line.group,
            customer_id: line.customer_id,
            unit_price: line.unit_price,
            quantity: line.quantity,
            discount_pct: line.discount_pct,
            sale_date: line.sale_date,
            sales_value,
            total_price,
        }
    }

    pub fn sales_code(&self) -> &str {
        &self.sales_code
    }

    /// 商品/书名
    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn item_id(&self) -> Option<u32> {
        self.item_id
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// 品类/出版社
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn unit_price(&self) -> &BigDecimal {
        &self.unit_price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn discount_pct(&self) -> &BigDecimal {
        &self.discount_pct
    }

    pub fn sale_date(&self) -> NaiveDate {
        self.sale_date
    }

    pub fn sales_value(&self) -> &BigDecimal {
        &self.sales_value
    }

    pub fn total_price(&self) -> &BigDecimal {
        &self.total_price
    }
}

/// total = round(sales_value * (1 - discount_pct / 100), 2)
pub fn discounted_total(sales_value: &BigDecimal, discount_pct: &BigDecimal) -> BigDecimal {
    let percent = BigDecimal::new(1.into(), 2);
    let kept = BigDecimal::from(100) - discount_pct;
    round_money(&(sales_value * kept * percent), 2)
}

/// 金额舍入: 银行家舍入 (四舍六入五成双)
pub fn round_money(value: &BigDecimal, scale: i64) -> BigDecimal {
    value.with_scale_round(scale, RoundingMode::HalfEven)
}

/// 一次生成的批次: 客户池 + 销售记录
#[derive(Debug, Clone)]
pub struct Batch {
    customers: Vec<Customer>,
    index: HashMap<String, usize>,
    records: Vec<SalesRecord>,
}

impl Batch {
    pub(crate) fn new(customers: Vec<Customer>, records: Vec<SalesRecord>) -> Self {
        let index = customers
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        Self {
            customers,
            index,
            records,
        }
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.index.get(id).map(|&i| &self.customers[i])
    }

    /// 记录与客户拼接后的扁平行
    pub fn rows(&self) -> Vec<SalesRow> {
        self.records
            .iter()
            .filter_map(|r| self.customer(r.customer_id()).map(|c| SalesRow::join(r, c)))
            .collect()
    }
}

/// 持久化用的扁平行
#[derive(Debug, Clone, Serialize)]
pub struct SalesRow {
    pub sales_code: String,
    pub item: String,
    pub item_group: String,
    pub item_id: Option<u32>,
    pub author: Option<String>,
    pub customer_id: String,
    pub customer: String,
    pub city: String,
    pub email: String,
    pub customer_birth_date: NaiveDate,
    pub unit_price: BigDecimal,
    pub sales_quantity: i64,
    pub discount_pct: BigDecimal,
    pub sales_value: BigDecimal,
    pub total_price: BigDecimal,
    pub sales_date: NaiveDate,
}

impl SalesRow {
    pub fn join(record: &SalesRecord, customer: &Customer) -> Self {
        Self {
            sales_code: record.sales_code.clone(),
            item: record.item.clone(),
            item_group: record.group.clone(),
            item_id: record.item_id,
            author: record.author.clone(),
            customer_id: customer.id.clone(),
            customer: customer.name.clone(),
            city: customer.city.clone(),
            email: customer.email.clone(),
            customer_birth_date: customer.birth_date,
            unit_price: record.unit_price.clone(),
            sales_quantity: record.quantity,
            discount_pct: record.discount_pct.clone(),
            sales_value: record.sales_value.clone(),
            total_price: record.total_price.clone(),
            sales_date: record.sale_date,
        }
    }
}

const SALES_COLUMNS: [(&str, ColumnType); 16] = [
    ("sales_code", ColumnType::Text),
    ("item", ColumnType::Text),
    ("item_group", ColumnType::Text),
    ("item_id", ColumnType::Integer),
    ("author", ColumnType::Text),
    ("customer_id", ColumnType::Text),
    ("customer", ColumnType::Text),
    ("city", ColumnType::Text),
    ("email", ColumnType::Text),
    ("customer_birth_date", ColumnType::Date),
    ("unit_price", ColumnType::Real),
    ("sales_quantity", ColumnType::Integer),
    ("discount_pct", ColumnType::Real),
    ("sales_value", ColumnType::Real),
    ("total_price", ColumnType::Real),
    ("sales_date", ColumnType::Date),
];

impl FlatRecord for SalesRow {
    fn columns() -> &'static [(&'static str, ColumnType)] {
        &SALES_COLUMNS
    }

    fn values(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.sales_code.clone()),
            CellValue::Text(self.item.clone()),
            CellValue::Text(self.item_group.clone()),
            self.item_id.map_or(CellValue::Null, |id| CellValue::Integer(id.into())),
            self.author.clone().map_or(CellValue::Null, CellValue::Text),
            CellValue::Text(self.customer_id.clone()),
            CellValue::Text(self.customer.clone()),
            CellValue::Text(self.city.clone()),
            CellValue::Text(self.email.clone()),
            CellValue::Date(self.customer_birth_date),
            CellValue::Decimal(self.unit_price.clone()),
            CellValue::Integer(self.sales_quantity),
            CellValue::Decimal(self.discount_pct.clone()),
            CellValue::Decimal(self.sales_value.clone()),
            CellValue::Decimal(self.total_price.clone()),
            CellValue::Date(self.sales_date),
        ]
    }
}
