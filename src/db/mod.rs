pub mod export;
pub mod pool;
pub mod queries;
pub mod store;

pub use export::{export_to_csv, CsvStore};
pub use pool::create_pool;
pub use queries::MonthFilter;
pub use store::{
    quote_identifier, CellValue, ColumnType, Destination, FlatRecord, QueryRow, SqliteStore,
    TabularStore,
};
