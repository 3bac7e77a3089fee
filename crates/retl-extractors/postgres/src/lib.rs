mod decode;
mod factory;
mod postgres_extractor;

pub use decode::{column_value, row_to_document, ColumnKind};
pub use factory::PostgresExtractorFactory;
pub use postgres_extractor::{validate_table, PostgresExtractor, PostgresSourceConfig};
