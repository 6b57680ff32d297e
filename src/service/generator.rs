use crate::error::{Error, Result};
use crate::models::{Batch, Catalog, CatalogDetails, CatalogKind, Customer, SaleLine, SalesRecord};
use crate::provider::{FakeDataProvider, Locale};
use bigdecimal::BigDecimal;
use chrono::{Days, NaiveDate};
use std::ops::Range;

/// 单价舍入到分之后必须仍大于零
pub const MIN_UNIT_PRICE: f64 = 0.01;
pub const MAX_CUSTOMER_AGE: u32 = 150;

/// 每行数值字段的采样区间 (价格/折扣/数量均为半开区间, 销售日期窗口为闭区间)
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingRanges {
    pub unit_price: (f64, f64),
    pub quantity: (i64, i64),
    pub discount_pct: (f64, f64),
    pub sale_window: (NaiveDate, NaiveDate),
    pub customer_age: (u32, u32),
    pub customer_ids: Range<u32>,
}

impl SamplingRanges {
    pub fn for_catalog(kind: CatalogKind) -> Self {
        let unit_price = match kind {
            CatalogKind::Bookstore => (25.0, 250.0),
            CatalogKind::Ecommerce => (25.0, 600.0),
        };
        Self {
            unit_price,
            ..Self::default()
        }
    }

    /// 在消耗任何随机数之前校验所有区间
    pub fn validate(&self) -> Result<()> {
        let (low, high) = self.unit_price;
        if !(low.is_finite() && high.is_finite() && low >= MIN_UNIT_PRICE && low < high) {
            return Err(Error::invalid_range("unit price", low, high));
        }
        let (low, high) = self.quantity;
        if low < 1 || low >= high {
            return Err(Error::invalid_range("quantity", low, high));
        }
        let (low, high) = self.discount_pct;
        if !(low >= 0.0 && high <= 10.0 && low < high) {
            return Err(Error::invalid_range("discount pct", low, high));
        }
        let (start, end) = self.sale_window;
        if start > end {
            return Err(Error::invalid_range("sale window", start, end));
        }
        let (min_age, max_age) = self.customer_age;
        if min_age > max_age || max_age > MAX_CUSTOMER_AGE {
            return Err(Error::invalid_range("customer age", min_age, max_age));
        }
        if self.customer_ids.is_empty() {
            return Err(Error::invalid_range(
                "customer ids",
                self.customer_ids.start,
                self.customer_ids.end,
            ));
        }
        Ok(())
    }
}

impl Default for SamplingRanges {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default();
        Self {
            unit_price: (25.0, 600.0),
            quantity: (1, 14),
            discount_pct: (0.0, 10.0),
            sale_window: (start, end),
            customer_age: (18, 80),
            customer_ids: 1001..9999,
        }
    }
}

/// 销售记录生成器
#[derive(Debug, Clone, Default)]
pub struct RecordGenerator {
    ranges: SamplingRanges,
    locale: Locale,
}

impl RecordGenerator {
    pub fn new(ranges: SamplingRanges, locale: Locale) -> Self {
        Self { ranges, locale }
    }

    /// 目录预设的区间与语言区域
    pub fn for_catalog(kind: CatalogKind) -> Self {
        Self::new(SamplingRanges::for_catalog(kind), kind.default_locale())
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn ranges(&self) -> &SamplingRanges {
        &self.ranges
    }

    /// 生成一个批次: 先建客户池, 再逐行有放回地抽样客户与商品
    pub fn generate(
        &self,
        row_count: usize,
        customer_count: usize,
        catalog: &Catalog,
        provider: &mut dyn FakeDataProvider,
    ) -> Result<Batch> {
        self.ranges.validate()?;
        catalog.ensure_sampleable()?;

        let pool_size = self.ranges.customer_ids.len();
        if customer_count == 0 {
            return Err(Error::invalid_range("customer count", customer_count, pool_size));
        }
        if customer_count > pool_size {
            return Err(Error::CapacityExceeded {
                requested: customer_count,
                available: pool_size,
            });
        }

        tracing::info!(
            "开始生成批次: {} 行, {} 个客户, locale {:?}",
            row_count, customer_count, self.locale
        );

        let customers = self.generate_customers(customer_count, provider)?;
        let details = catalog.details(provider, self.locale)?;

        let mut records = Vec::with_capacity(row_count);
        for idx in 0..row_count {
            let customer = &customers[provider.pick(customers.len())?];
            records.push(self.generate_record(catalog, &details, &customer.id, provider)?);

            let current_idx = idx + 1;
            if current_idx % 1000 == 0 {
                tracing::debug!("生成进度: {}/{}", current_idx, row_count);
            }
        }

        tracing::info!("批次生成完成: {} 条记录, {} 个客户", records.len(), customers.len());
        Ok(Batch::new(customers, records))
    }

    fn generate_customers(
        &self,
        count: usize,
        provider: &mut dyn FakeDataProvider,
    ) -> Result<Vec<Customer>> {
        let ids = provider.unique_sample(self.ranges.customer_ids.clone(), count)?;
        let (min_age, max_age) = self.ranges.customer_age;

        ids.into_iter()
            .map(|id| {
                Ok(Customer {
                    id: id.to_string(),
                    name: provider.person_name(self.locale),
                    email: provider.email(self.locale),
                    city: provider.city(self.locale),
                    birth_date: provider.date_of_birth(min_age, max_age)?,
                })
            })
            .collect()
    }

    fn generate_record(
        &self,
        catalog: &Catalog,
        details: &CatalogDetails,
        customer_id: &str,
        provider: &mut dyn FakeDataProvider,
    ) -> Result<SalesRecord> {
        let pick = catalog.sample(details, provider)?;

        let (low, high) = self.ranges.unit_price;
        let unit_price = decimal(provider.uniform(low, high)?, 2);
        let (low, high) = self.ranges.quantity;
        let quantity = provider.int_in(low, high)?;
        let (low, high) = self.ranges.discount_pct;
        let discount_pct = decimal(provider.uniform(low, high)?, 1);

        // 每行独立采样销售日期
        let (start, end) = self.ranges.sale_window;
        let span = (end - start).num_days();
        let offset = provider.int_in(0, span + 1)?;
        let sale_date = start
            .checked_add_days(Days::new(offset as u64))
            .ok_or_else(|| Error::invalid_range("sale window", start, end))?;

        Ok(SalesRecord::new(SaleLine {
            sales_code: provider.short_code(),
            item: pick.item,
            item_id: pick.item_id,
            author: pick.author,
            group: pick.group,
            customer_id: customer_id.to_string(),
            unit_price,
            quantity,
            discount_pct,
            sale_date,
        }))
    }
}

/// 把浮点采样值四舍五入为 `scale` 位小数
fn decimal(value: f64, scale: u32) -> BigDecimal {
    let factor = 10f64.powi(scale as i32);
    let digits = (value * factor).round() as i64;
    BigDecimal::new(digits.into(), scale as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::discounted_total;
    use crate::provider::FakerProvider;
    use bigdecimal::ToPrimitive;
    use std::collections::{HashMap, HashSet};

    fn generate(rows: usize, customers: usize, seed: u64) -> Result<Batch> {
        let generator = RecordGenerator::new(SamplingRanges::for_catalog(CatalogKind::Ecommerce), Locale::En);
        generator.generate(rows, customers, &Catalog::ecommerce(), &mut FakerProvider::seeded(seed))
    }

    #[test]
    fn total_price_is_derived_from_inputs() {
        let batch = generate(500, 40, 1).unwrap();
        for r in batch.records() {
            let value = r.unit_price() * BigDecimal::from(r.quantity());
            assert_eq!(r.sales_value(), &value);
            assert_eq!(r.total_price(), &discounted_total(&value, r.discount_pct()));

            let approx = r.quantity() as f64
                * r.unit_price().to_f64().unwrap()
                * (1.0 - r.discount_pct().to_f64().unwrap() / 100.0);
            assert!((r.total_price().to_f64().unwrap() - approx).abs() <= 0.0051);
        }
    }

    #[test]
    fn every_record_references_the_pool() {
        let batch = generate(800, 25, 2).unwrap();
        let ids: HashSet<&str> = batch.customers().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 25);
        assert_eq!(batch.customers().len(), 25);
        for r in batch.records() {
            assert!(ids.contains(r.customer_id()));
            assert!(batch.customer(r.customer_id()).is_some());
        }
    }

    #[test]
    fn sampled_fields_stay_in_range() {
        let batch = generate(1000, 10, 3).unwrap();
        let ranges = SamplingRanges::for_catalog(CatalogKind::Ecommerce);
        for r in batch.records() {
            let price = r.unit_price().to_f64().unwrap();
            assert!(price >= 25.0 && price <= 600.0);
            assert!((1..14).contains(&r.quantity()));
            let discount = r.discount_pct().to_f64().unwrap();
            assert!((0.0..=10.0).contains(&discount));
            assert!(r.sale_date() >= ranges.sale_window.0 && r.sale_date() <= ranges.sale_window.1);
        }
    }

    #[test]
    fn sale_dates_vary_per_row() {
        let batch = generate(200, 5, 4).unwrap();
        let dates: HashSet<_> = batch.records().iter().map(|r| r.sale_date()).collect();
        assert!(dates.len() > 1);
    }

    #[test]
    fn zero_rows_is_empty_not_error() {
        let batch = generate(0, 3, 5).unwrap();
        assert!(batch.records().is_empty());
        assert_eq!(batch.customers().len(), 3);
    }

    #[test]
    fn zero_customers_is_invalid_range() {
        assert!(matches!(generate(10, 0, 6), Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn customer_pool_over_capacity() {
        let ranges = SamplingRanges {
            customer_ids: 1..6,
            ..SamplingRanges::default()
        };
        let generator = RecordGenerator::new(ranges, Locale::En);
        let err = generator
            .generate(10, 6, &Catalog::bookstore(), &mut FakerProvider::seeded(7))
            .unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { requested: 6, available: 5 }));
    }

    #[test]
    fn inverted_ranges_are_rejected_before_sampling() {
        let ranges = SamplingRanges {
            quantity: (14, 1),
            ..SamplingRanges::default()
        };
        let generator = RecordGenerator::new(ranges, Locale::En);
        let err = generator
            .generate(10, 2, &Catalog::bookstore(), &mut FakerProvider::seeded(8))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRange { what: "quantity", .. }));
    }

    #[test]
    fn sub_cent_prices_are_rejected() {
        let ranges = SamplingRanges {
            unit_price: (0.001, 0.004),
            ..SamplingRanges::default()
        };
        let err = RecordGenerator::new(ranges, Locale::En)
            .generate(5, 2, &Catalog::bookstore(), &mut FakerProvider::seeded(10))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRange { what: "unit price", .. }));
    }

    #[test]
    fn cheapest_prices_stay_positive() {
        let ranges = SamplingRanges {
            unit_price: (MIN_UNIT_PRICE, 0.02),
            ..SamplingRanges::default()
        };
        let batch = RecordGenerator::new(ranges, Locale::En)
            .generate(300, 5, &Catalog::bookstore(), &mut FakerProvider::seeded(11))
            .unwrap();
        assert!(batch.records().iter().all(|r| r.unit_price() > &BigDecimal::from(0)));
    }

    #[test]
    fn absurd_ages_are_rejected() {
        let ranges = SamplingRanges {
            customer_age: (0, u32::MAX),
            ..SamplingRanges::default()
        };
        let err = RecordGenerator::new(ranges, Locale::En)
            .generate(5, 2, &Catalog::bookstore(), &mut FakerProvider::seeded(12))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRange { what: "customer age", .. }));
    }

    #[test]
    fn locale_only_changes_strings() {
        for locale in [Locale::En, Locale::PtBr, Locale::ZhCn, Locale::ZhTw] {
            let generator = RecordGenerator::new(SamplingRanges::for_catalog(CatalogKind::Ecommerce), locale);
            let batch = generator
                .generate(250, 30, &Catalog::ecommerce(), &mut FakerProvider::seeded(13))
                .unwrap();

            assert_eq!(batch.records().len(), 250, "{locale:?}");
            assert_eq!(batch.customers().len(), 30, "{locale:?}");
            let ids: HashSet<&str> = batch.customers().iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids.len(), 30, "{locale:?}");
            assert!(batch.customers().iter().all(|c| !c.name.is_empty() && c.email.contains('@')));
            for r in batch.records() {
                assert!(ids.contains(r.customer_id()));
                let value = r.unit_price() * BigDecimal::from(r.quantity());
                assert_eq!(r.sales_value(), &value);
                assert_eq!(r.total_price(), &discounted_total(&value, r.discount_pct()));
            }
        }
    }

    #[test]
    fn bookstore_rows_carry_stable_book_ids() {
        let generator = RecordGenerator::for_catalog(CatalogKind::Bookstore);
        assert_eq!(generator.locale(), Locale::En);
        let batch = generator
            .generate(400, 20, &Catalog::bookstore(), &mut FakerProvider::seeded(14))
            .unwrap();

        let mut ids: HashMap<&str, u32> = HashMap::new();
        for r in batch.records() {
            let id = r.item_id().expect("bookstore rows have a book id");
            assert_eq!(*ids.entry(r.item()).or_insert(id), id, "{}", r.item());
            assert!(r.author().is_some_and(|a| !a.is_empty()));
        }
        let distinct: HashSet<u32> = ids.values().copied().collect();
        assert_eq!(distinct.len(), ids.len());

        let ecommerce = RecordGenerator::for_catalog(CatalogKind::Ecommerce);
        assert_eq!(ecommerce.locale(), Locale::PtBr);
        let batch = ecommerce
            .generate(50, 5, &Catalog::ecommerce(), &mut FakerProvider::seeded(15))
            .unwrap();
        assert!(batch.records().iter().all(|r| r.item_id().is_none() && r.author().is_none()));
    }

    #[test]
    fn same_seed_same_batch() {
        let a = generate(100, 10, 42).unwrap();
        let b = generate(100, 10, 42).unwrap();
        assert_eq!(a.records(), b.records());
        assert_eq!(a.customers(), b.customers());
    }

    #[test]
    fn decimal_rounding() {
        assert_eq!(decimal(12.345678, 2), "12.35".parse::<BigDecimal>().unwrap());
        assert_eq!(decimal(3.04, 1), "3.0".parse::<BigDecimal>().unwrap());
    }
}
