pub mod faker;

pub use faker::FakerProvider;

use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// 假数据语言区域 (只影响字符串内容)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    En,
    PtBr,
    ZhCn,
    ZhTw,
}

/// 假数据提供者
///
/// 生成器只通过这个接口消费随机性; 注入带种子的实现即可得到可复现的批次。
/// 所有区间都是半开区间 `[low, high)`, 空区间或颠倒区间返回 `InvalidRange`。
pub trait FakeDataProvider {
    /// 名 (客户)
    fn person_name(&mut self, locale: Locale) -> String;

    /// 全名 (作者)
    fn full_name(&mut self, locale: Locale) -> String;

    fn city(&mut self, locale: Locale) -> String;

    fn email(&mut self, locale: Locale) -> String;

    /// 年龄在 `[min_age, max_age]` 之间的出生日期
    fn date_of_birth(&mut self, min_age: u32, max_age: u32) -> Result<NaiveDate>;

    fn uniform(&mut self, low: f64, high: f64) -> Result<f64>;

    fn int_in(&mut self, low: i64, high: i64) -> Result<i64>;

    /// 无放回抽样 `count` 个不同的整数
    fn unique_sample(&mut self, range: Range<u32>, count: usize) -> Result<Vec<u32>>;

    /// 从长度为 `len` 的序列中选一个下标
    fn pick(&mut self, len: usize) -> Result<usize>;

    /// 8位十六进制销售编码 (随机UUID前缀)
    fn short_code(&mut self) -> String;
}
