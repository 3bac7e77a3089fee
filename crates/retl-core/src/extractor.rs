use crate::{Document, Error, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Trait for source adapters
///
/// An extractor reads one bounded result set per run. There is no polling
/// and no cursor persistence: once `documents` ends, the run is over.
#[async_trait]
pub trait Extractor: Send {
    /// Connect to the source system and open the read cursor
    async fn open(&mut self) -> Result<()>;

    /// Stream the normalized rows of the opened cursor
    ///
    /// The stream ends when the cursor is exhausted. An `Err` item is a read
    /// failure and ends the run.
    fn documents(&mut self) -> BoxStream<'_, Result<Document>>;

    /// Release the connection to the source system
    async fn close(&mut self) -> Result<()>;
}

/// Check a possibly qualified table name before it is put into SQL.
///
/// Accepts up to `max_parts` dot-separated parts, each made of ASCII letters,
/// digits and underscores and not starting with a digit.
pub fn validate_table_name(table: &str, max_parts: usize) -> Result<()> {
    let valid_part = |part: &str| {
        !part.is_empty()
            && !part.starts_with(|c: char| c.is_ascii_digit())
            && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() > max_parts || !parts.iter().all(|p| valid_part(p)) {
        return Err(Error::Configuration(format!(
            "Invalid table name '{}'",
            table
        )));
    }
    Ok(())
}
