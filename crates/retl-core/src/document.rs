use serde_json::{Map, Number, Value};

/// Ordered field -> value mapping published for one source row
pub type Document = Map<String, Value>;

/// A single column value as read from a source system
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Raw byte sequence, decoded as (lossy) UTF-8 text on normalization
    Bytes(Vec<u8>),
    Json(Value),
}

impl From<SourceValue> for Value {
    fn from(value: SourceValue) -> Self {
        match value {
            SourceValue::Null => Value::Null,
            SourceValue::Bool(b) => Value::Bool(b),
            SourceValue::Int(i) => Value::Number(i.into()),
            // NaN and infinities have no JSON representation
            SourceValue::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
            SourceValue::Text(s) => Value::String(s),
            SourceValue::Bytes(bytes) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
            SourceValue::Json(v) => v,
        }
    }
}

/// Field name used for the column at `index` when the source reports no name
pub fn positional_name(index: usize) -> String {
    format!("column_{}", index)
}

/// Normalize one source row into a document.
///
/// Field order follows column order. Unnamed (or empty-named) columns become
/// `column_N` where N is the zero-based column index; a name already taken by
/// an earlier column also falls back to `column_N`, so every column yields
/// exactly one field.
pub fn normalize_row<I>(columns: I) -> Document
where
    I: IntoIterator<Item = (Option<String>, SourceValue)>,
{
    let mut document = Document::new();
    for (index, (name, value)) in columns.into_iter().enumerate() {
        let field = match name {
            Some(name) if !name.is_empty() && !document.contains_key(&name) => name,
            _ => positional_name(index),
        };
        document.insert(field, value.into());
    }
    document
}
