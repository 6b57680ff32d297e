use super::store::{CellValue, Destination, FlatRecord, QueryRow, TabularStore};
use crate::error::{Error, Result};
use async_trait::async_trait;
use csv::Writer;
use std::path::{Path, PathBuf};

/// CSV 文件存储 (只写)
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl TabularStore for CsvStore {
    async fn write_rows<R>(&self, rows: &[R], destination: &Destination) -> Result<u64>
    where
        R: FlatRecord + Sync,
    {
        let Destination::File(path) = destination else {
            return Err(Error::Unsupported("csv store only writes files"));
        };
        let output_path = self.root.join(path);
        export_to_csv(rows, &output_path)?;
        tracing::info!("✓ 导出 CSV {:?}, {} 行", output_path, rows.len());
        Ok(rows.len() as u64)
    }

    async fn read_query(&self, _sql: &str, _params: &[CellValue]) -> Result<Vec<QueryRow>> {
        Err(Error::Unsupported("csv store cannot run queries"))
    }
}

/// 导出到 CSV 文件 (首行为列名)
pub fn export_to_csv<R: FlatRecord>(rows: &[R], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(output_path)?;
    writer.write_record(R::columns().iter().map(|(name, _)| *name))?;
    for row in rows {
        writer.write_record(row.values().iter().map(|v| v.to_string()))?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ColumnType;

    struct Line(&'static str, i64);

    impl FlatRecord for Line {
        fn columns() -> &'static [(&'static str, ColumnType)] {
            &[("title", ColumnType::Text), ("qty", ColumnType::Integer)]
        }

        fn values(&self) -> Vec<CellValue> {
            vec![CellValue::Text(self.0.to_string()), CellValue::Integer(self.1)]
        }
    }

    #[tokio::test]
    async fn writes_header_and_rows() {
        let root = std::env::temp_dir().join(format!("sales-synth-csv-{}", std::process::id()));
        let store = CsvStore::new(&root);
        let rows = vec![Line("Data Smart", 3), Line("Lean Analytics, 2nd", 1)];

        let written = store
            .write_rows(&rows, &Destination::File("out/books.csv".into()))
            .await
            .unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(root.join("out/books.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["title,qty", "Data Smart,3", "\"Lean Analytics, 2nd\",1"]);
        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn queries_are_unsupported() {
        let store = CsvStore::new(std::env::temp_dir());
        assert!(matches!(store.read_query("SELECT 1", &[]).await, Err(Error::Unsupported(_))));
    }
}
