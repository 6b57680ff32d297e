use crate::error::{Error, Result};
use async_trait::async_trait;
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;
use futures::TryStreamExt;
use indexmap::IndexMap;
use serde::Serialize;
use sqlx::query::Query;
use sqlx::query_builder::Separated;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, QueryBuilder, Row, Sqlite, SqlitePool, TypeInfo, ValueRef};
use std::fmt;
use std::path::PathBuf;

/// SQLite 单条语句的绑定参数上限
const SQLITE_MAX_BINDS: usize = 999;

/// 列类型 (建表用)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Date,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Date => "DATE",
        }
    }
}

/// 单元格的值
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Decimal(BigDecimal),
    Text(String),
    Date(NaiveDate),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Real(v) => Some(*v),
            CellValue::Decimal(v) => v.to_f64(),
            CellValue::Text(v) => v.parse().ok(),
            CellValue::Null | CellValue::Date(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Real(v) => write!(f, "{}", v),
            CellValue::Decimal(v) => write!(f, "{}", v),
            CellValue::Text(v) => f.write_str(v),
            CellValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
        }
    }
}

/// 查询结果行 (列名 -> 值, 保持列顺序)
pub type QueryRow = IndexMap<String, CellValue>;

/// 可以扁平写出的记录: 固定的列与类型, 每行一组值
pub trait FlatRecord {
    fn columns() -> &'static [(&'static str, ColumnType)];

    fn values(&self) -> Vec<CellValue>;
}

/// 写入目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// 相对 CSV 存储根目录的文件路径
    File(PathBuf),
    /// 表名 (已存在则替换)
    Table(String),
}

/// 表格存储
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// 写出全部行, 返回写入行数
    async fn write_rows<R>(&self, rows: &[R], destination: &Destination) -> Result<u64>
    where
        R: FlatRecord + Sync;

    async fn read_query(&self, sql: &str, params: &[CellValue]) -> Result<Vec<QueryRow>>;
}

/// 表名/列名只允许字母数字与下划线, 返回加引号的标识符
pub fn quote_identifier(name: &str) -> Result<String> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name))
}

/// SQLite 表格存储
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TabularStore for SqliteStore {
    async fn write_rows<R>(&self, rows: &[R], destination: &Destination) -> Result<u64>
    where
        R: FlatRecord + Sync,
    {
        let Destination::Table(table) = destination else {
            return Err(Error::Unsupported("sqlite store only writes tables"));
        };
        let table = quote_identifier(table)?;
        let columns = R::columns();

        let definitions = columns
            .iter()
            .map(|(name, ty)| Ok(format!("{} {}", quote_identifier(name)?, ty.sql_type())))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let names = columns
            .iter()
            .map(|(name, _)| quote_identifier(name))
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        tracing::debug!("开始写入表 {}, {} 条记录", table, rows.len());
        let start_time = std::time::Instant::now();

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("CREATE TABLE {} ({})", table, definitions))
            .execute(&mut *tx)
            .await?;

        let chunk_size = (SQLITE_MAX_BINDS / columns.len().max(1)).max(1);
        let mut written = 0u64;
        for chunk in rows.chunks(chunk_size) {
            let mut query_builder: QueryBuilder<Sqlite> =
                QueryBuilder::new(format!("INSERT INTO {} ({}) ", table, names));
            query_builder.push_values(chunk, |mut b, row| {
                for value in row.values() {
                    push_cell(&mut b, value);
                }
            });
            written += query_builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        tracing::info!("✓ 写入表 {} 成功, 影响 {} 行, 耗时: {:?}", table, written, start_time.elapsed());
        Ok(written)
    }

    async fn read_query(&self, sql: &str, params: &[CellValue]) -> Result<Vec<QueryRow>> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, param.clone());
        }

        let mut stream = query.fetch(&self.pool);
        let mut rows = Vec::new();
        while let Some(row) = stream.try_next().await? {
            rows.push(decode_row(&row)?);
        }
        Ok(rows)
    }
}

fn push_cell(b: &mut Separated<'_, '_, Sqlite, &'static str>, value: CellValue) {
    match value {
        CellValue::Null => b.push_bind(Option::<String>::None),
        CellValue::Integer(v) => b.push_bind(v),
        CellValue::Real(v) => b.push_bind(v),
        CellValue::Decimal(v) => b.push_bind(v.to_f64()),
        CellValue::Text(v) => b.push_bind(v),
        CellValue::Date(v) => b.push_bind(v),
    };
}

fn bind_param<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: CellValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        CellValue::Null => query.bind(Option::<String>::None),
        CellValue::Integer(v) => query.bind(v),
        CellValue::Real(v) => query.bind(v),
        CellValue::Decimal(v) => query.bind(v.to_f64()),
        CellValue::Text(v) => query.bind(v),
        CellValue::Date(v) => query.bind(v),
    }
}

/// 按值的实际存储类型解码任意结果行
fn decode_row(row: &SqliteRow) -> Result<QueryRow> {
    let mut out = QueryRow::with_capacity(row.len());
    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            CellValue::Null
        } else {
            let type_name = raw.type_info().name().to_string();
            match type_name.as_str() {
                "INTEGER" => CellValue::Integer(row.try_get(idx)?),
                "REAL" => CellValue::Real(row.try_get(idx)?),
                "BLOB" => {
                    let bytes: Vec<u8> = row.try_get(idx)?;
                    CellValue::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
                _ => CellValue::Text(row.try_get(idx)?),
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;

    struct Pair {
        name: &'static str,
        amount: f64,
    }

    impl FlatRecord for Pair {
        fn columns() -> &'static [(&'static str, ColumnType)] {
            &[("name", ColumnType::Text), ("amount", ColumnType::Real)]
        }

        fn values(&self) -> Vec<CellValue> {
            vec![CellValue::Text(self.name.to_string()), CellValue::Real(self.amount)]
        }
    }

    async fn memory_store() -> SqliteStore {
        SqliteStore::new(create_pool("sqlite::memory:").await.unwrap())
    }

    #[tokio::test]
    async fn write_then_query() {
        let store = memory_store().await;
        let rows: Vec<Pair> = (0..250)
            .map(|i| Pair {
                name: if i % 2 == 0 { "even" } else { "odd" },
                amount: i as f64,
            })
            .collect();

        let written = store
            .write_rows(&rows, &Destination::Table("pairs".to_string()))
            .await
            .unwrap();
        assert_eq!(written, 250);

        let result = store
            .read_query(
                "SELECT name, COUNT(*) AS cnt, SUM(amount) AS total FROM pairs WHERE name = ? GROUP BY name",
                &[CellValue::Text("even".to_string())],
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["name"], CellValue::Text("even".to_string()));
        assert_eq!(result[0]["cnt"], CellValue::Integer(125));
        assert_eq!(result[0]["total"].as_f64(), Some(15500.0));
    }

    #[tokio::test]
    async fn rewrite_replaces_table() {
        let store = memory_store().await;
        let dest = Destination::Table("pairs".to_string());
        let first = vec![Pair { name: "a", amount: 1.0 }, Pair { name: "b", amount: 2.0 }];
        store.write_rows(&first, &dest).await.unwrap();
        store.write_rows(&first[..1], &dest).await.unwrap();

        let result = store.read_query("SELECT * FROM pairs", &[]).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].keys().collect::<Vec<_>>(), vec!["name", "amount"]);
    }

    #[tokio::test]
    async fn file_destination_is_unsupported() {
        let store = memory_store().await;
        let err = store
            .write_rows::<Pair>(&[], &Destination::File("x.csv".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn identifiers_are_checked() {
        assert_eq!(quote_identifier("sales").unwrap(), "\"sales\"");
        assert!(quote_identifier("sales; DROP TABLE x").is_err());
        assert!(quote_identifier("1sales").is_err());
        assert!(quote_identifier("").is_err());
    }

    #[test]
    fn null_cells_render_empty() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Decimal("12.50".parse().unwrap()).to_string(), "12.50");
    }
}
