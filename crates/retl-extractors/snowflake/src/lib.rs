mod client;
mod factory;
mod snowflake_extractor;

pub use client::{cell_value, ColumnType, SqlApiClient, StatementResult};
pub use factory::SnowflakeExtractorFactory;
pub use snowflake_extractor::{SnowflakeExtractor, SnowflakeSourceConfig};
