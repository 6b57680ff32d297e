use super::{FakeDataProvider, Locale};
use crate::error::{Error, Result};
use chrono::{Days, Months, NaiveDate};
use fake::faker::address::raw::CityName;
use fake::faker::internet::raw::SafeEmail;
use fake::faker::name::raw::{FirstName, Name};
use fake::locales::{EN, PT_BR, ZH_CN, ZH_TW};
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

/// 基于 `fake` 的提供者, 所有随机性来自一个显式的 `StdRng`
pub struct FakerProvider {
    rng: StdRng,
    /// 计算出生日期的参考日
    as_of: NaiveDate,
}

impl FakerProvider {
    /// `seed` 为空时从系统熵初始化
    pub fn new(seed: Option<u64>, as_of: NaiveDate) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, as_of }
    }

    /// 固定种子与固定参考日 (2025-01-01), 主要用于测试
    pub fn seeded(seed: u64) -> Self {
        let as_of = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
        Self::new(Some(seed), as_of)
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.as_of
    }
}

impl FakeDataProvider for FakerProvider {
    fn person_name(&mut self, locale: Locale) -> String {
        match locale {
            Locale::En => FirstName(EN).fake_with_rng(&mut self.rng),
            Locale::PtBr => FirstName(PT_BR).fake_with_rng(&mut self.rng),
            Locale::ZhCn => FirstName(ZH_CN).fake_with_rng(&mut self.rng),
            Locale::ZhTw => FirstName(ZH_TW).fake_with_rng(&mut self.rng),
        }
    }

    fn full_name(&mut self, locale: Locale) -> String {
        match locale {
            Locale::En => Name(EN).fake_with_rng(&mut self.rng),
            Locale::PtBr => Name(PT_BR).fake_with_rng(&mut self.rng),
            Locale::ZhCn => Name(ZH_CN).fake_with_rng(&mut self.rng),
            Locale::ZhTw => Name(ZH_TW).fake_with_rng(&mut self.rng),
        }
    }

    fn city(&mut self, locale: Locale) -> String {
        match locale {
            Locale::En => CityName(EN).fake_with_rng(&mut self.rng),
            Locale::PtBr => CityName(PT_BR).fake_with_rng(&mut self.rng),
            Locale::ZhCn => CityName(ZH_CN).fake_with_rng(&mut self.rng),
            Locale::ZhTw => CityName(ZH_TW).fake_with_rng(&mut self.rng),
        }
    }

    fn email(&mut self, locale: Locale) -> String {
        match locale {
            Locale::En => SafeEmail(EN).fake_with_rng(&mut self.rng),
            Locale::PtBr => SafeEmail(PT_BR).fake_with_rng(&mut self.rng),
            Locale::ZhCn => SafeEmail(ZH_CN).fake_with_rng(&mut self.rng),
            Locale::ZhTw => SafeEmail(ZH_TW).fake_with_rng(&mut self.rng),
        }
    }

    fn date_of_birth(&mut self, min_age: u32, max_age: u32) -> Result<NaiveDate> {
        if min_age > max_age {
            return Err(Error::invalid_range("age", min_age, max_age));
        }

        // 最年轻: 恰好 min_age 岁; 最年长: 差一天满 max_age + 1 岁
        let months_back = |years: u32| years.checked_mul(12).map(Months::new);
        let latest = months_back(min_age).and_then(|m| self.as_of.checked_sub_months(m));
        let earliest = max_age
            .checked_add(1)
            .and_then(months_back)
            .and_then(|m| self.as_of.checked_sub_months(m))
            .and_then(|d| d.checked_add_days(Days::new(1)));
        let (Some(earliest), Some(latest)) = (earliest, latest) else {
            return Err(Error::invalid_range("age", min_age, max_age));
        };

        let span = (latest - earliest).num_days().max(0) as u64;
        let offset = self.rng.gen_range(0..=span);
        earliest
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| Error::invalid_range("age", min_age, max_age))
    }

    fn uniform(&mut self, low: f64, high: f64) -> Result<f64> {
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(Error::invalid_range("uniform", low, high));
        }
        Ok(self.rng.gen_range(low..high))
    }

    fn int_in(&mut self, low: i64, high: i64) -> Result<i64> {
        if low >= high {
            return Err(Error::invalid_range("int", low, high));
        }
        Ok(self.rng.gen_range(low..high))
    }

    fn unique_sample(&mut self, range: Range<u32>, count: usize) -> Result<Vec<u32>> {
        if range.is_empty() {
            return Err(Error::invalid_range("unique sample", range.start, range.end));
        }
        let available = range.len();
        if count > available {
            return Err(Error::CapacityExceeded {
                requested: count,
                available,
            });
        }

        let picked = rand::seq::index::sample(&mut self.rng, available, count);
        Ok(picked.into_iter().map(|i| range.start + i as u32).collect())
    }

    fn pick(&mut self, len: usize) -> Result<usize> {
        if len == 0 {
            return Err(Error::invalid_range("pick", 0, 0));
        }
        Ok(self.rng.gen_range(0..len))
    }

    fn short_code(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.gen();
        let mut code = uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .simple()
            .to_string();
        code.truncate(8);
        code
    }
}
