//! 分组求和、Top-N 排名、阈值分类与分期对比。
//!
//! 所有函数只依赖记录的形状 (通过取键/取值闭包), 与记录如何生成无关。
//! 结果统一使用 `BTreeMap`, 迭代顺序确定。

use crate::error::{Error, Result};
use crate::models::round_money;
use bigdecimal::{BigDecimal, Zero};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// 值相等时的次级排序键
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// 键按字典序升序
    #[default]
    KeyAscending,
    KeyDescending,
}

/// 按键分组求和; 未出现过的键在第一次遇到时创建
pub fn sum_by_group<'a, T, K, V>(
    records: &'a [T],
    key: impl Fn(&'a T) -> K,
    value: impl Fn(&'a T) -> V,
) -> BTreeMap<K, V>
where
    K: Ord,
    V: Zero + AddAssign,
{
    let mut sums: BTreeMap<K, V> = BTreeMap::new();
    for record in records {
        *sums.entry(key(record)).or_insert_with(V::zero) += value(record);
    }
    sums
}

/// 值最大的 n 个分组, 降序; 零个分组返回空结果
pub fn top_n<K, V>(grouped: &BTreeMap<K, V>, n: usize, tie_break: TieBreak) -> Vec<(K, V)>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    let mut entries: Vec<(&K, &V)> = grouped.iter().collect();
    entries.sort_by(|a, b| {
        b.1.cmp(a.1).then_with(|| match tie_break {
            TieBreak::KeyAscending => a.0.cmp(b.0),
            TieBreak::KeyDescending => b.0.cmp(a.0),
        })
    });
    entries
        .into_iter()
        .take(n)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// 同 `top_n`, 但调用方要求至少有一个分组
pub fn top_n_required<K, V>(
    grouped: &BTreeMap<K, V>,
    n: usize,
    tie_break: TieBreak,
) -> Result<Vec<(K, V)>>
where
    K: Ord + Clone,
    V: Ord + Clone,
{
    if grouped.is_empty() {
        return Err(Error::EmptyInput("top-n groups"));
    }
    Ok(top_n(grouped, n, tie_break))
}

/// 分组汇总值严格大于阈值时标记为 true (例如 VIP)
pub fn classify<'a, T, K, V>(
    records: &'a [T],
    key: impl Fn(&'a T) -> K,
    value: impl Fn(&'a T) -> V,
    threshold: &V,
) -> BTreeMap<K, bool>
where
    K: Ord + Clone,
    V: Zero + AddAssign + PartialOrd,
{
    classify_sums(&sum_by_group(records, key, value), threshold)
}

/// 对已汇总的映射应用阈值规则
pub fn classify_sums<K, V>(grouped: &BTreeMap<K, V>, threshold: &V) -> BTreeMap<K, bool>
where
    K: Ord + Clone,
    V: PartialOrd,
{
    grouped
        .iter()
        .map(|(k, v)| (k.clone(), v > threshold))
        .collect()
}

/// 分组平均值, 保留 `scale` 位小数
pub fn mean_by_group<'a, T, K>(
    records: &'a [T],
    key: impl Fn(&'a T) -> K,
    value: impl Fn(&'a T) -> BigDecimal,
    scale: i64,
) -> BTreeMap<K, BigDecimal>
where
    K: Ord,
{
    let mut acc: BTreeMap<K, (BigDecimal, i64)> = BTreeMap::new();
    for record in records {
        let entry = acc
            .entry(key(record))
            .or_insert_with(|| (BigDecimal::zero(), 0));
        entry.0 += value(record);
        entry.1 += 1;
    }
    acc.into_iter()
        .map(|(k, (sum, count))| (k, round_money(&(sum / BigDecimal::from(count)), scale)))
        .collect()
}

/// 把日期映射为期间标签; 返回 None 的记录不参与汇总
pub trait PeriodRule {
    fn label(&self, date: NaiveDate) -> Option<String>;
}

impl<F> PeriodRule for F
where
    F: Fn(NaiveDate) -> Option<String>,
{
    fn label(&self, date: NaiveDate) -> Option<String> {
        self(date)
    }
}

/// 指定年份的上/下半年
#[derive(Debug, Clone, Copy)]
pub struct HalfYear {
    pub year: i32,
}

pub const FIRST_HALF: &str = "first half-year";
pub const SECOND_HALF: &str = "second half-year";

impl PeriodRule for HalfYear {
    fn label(&self, date: NaiveDate) -> Option<String> {
        if date.year() != self.year {
            return None;
        }
        let label = if date.month() <= 6 { FIRST_HALF } else { SECOND_HALF };
        Some(label.to_string())
    }
}

/// 按月, 标签格式 `MM/YYYY`
#[derive(Debug, Clone, Copy)]
pub struct Monthly;

impl PeriodRule for Monthly {
    fn label(&self, date: NaiveDate) -> Option<String> {
        Some(date.format("%m/%Y").to_string())
    }
}

/// 按期间分区求和
pub fn period_compare<'a, T, V>(
    records: &'a [T],
    date: impl Fn(&'a T) -> NaiveDate,
    value: impl Fn(&'a T) -> V,
    rule: &impl PeriodRule,
) -> BTreeMap<String, V>
where
    V: Zero + AddAssign,
{
    let mut sums: BTreeMap<String, V> = BTreeMap::new();
    for record in records {
        if let Some(label) = rule.label(date(record)) {
            *sums.entry(label).or_insert_with(V::zero) += value(record);
        }
    }
    sums
}
