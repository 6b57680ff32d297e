use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 客户 (每个批次生成一次, 之后不再修改)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,   // 批次内唯一的数字ID
    pub name: String,
    pub email: String,
    pub city: String,
    pub birth_date: NaiveDate,
}
