use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ID_FIELD: &str = "id";

/// One catalog item: an open-ended JSON object whose only managed field is `id`.
///
/// Field order is kept as inserted (`serde_json/preserve_order`), so a record
/// reads back from disk exactly as it was written.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Product(Map<String, Value>);

impl Product {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn id(&self) -> Option<&Value> {
        self.0.get(ID_FIELD)
    }

    /// Numeric equality against `id`; strings and other types never match.
    pub fn has_id(&self, id: i64) -> bool {
        match self.id() {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(v) => v == id,
                None => n.as_f64() == Some(id as f64),
            },
            _ => false,
        }
    }

    /// Overwrite `id`, keeping its position when already present.
    pub fn set_id(&mut self, id: i64) {
        self.0.insert(ID_FIELD.to_string(), Value::from(id));
    }

    /// Shallow merge: top-level fields of `patch` replace same-named fields,
    /// new fields are appended, everything else is left alone.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            self.0.insert(key, value);
        }
    }
}

/// On-disk layout: `{ "products": [...] }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    pub products: Vec<Product>,
}

/// The `:id` path segment, read as a leading integer.
///
/// Leading whitespace and an optional sign are accepted and anything after
/// the digits is ignored (`12abc` is 12, `1.5` is 1). A segment without
/// leading digits has no value, never matches a stored product and prints
/// as `NaN`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestedId {
    value: Option<i64>,
}

impl RequestedId {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim_start();
        let sign_len = usize::from(s.starts_with(['+', '-']));
        let digits = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
        let value = match digits {
            0 => None,
            // out of i64 range is treated like no number at all
            n => s[..sign_len + n].parse().ok(),
        };
        Self { value }
    }

    pub fn value(&self) -> Option<i64> {
        self.value
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.value.is_some_and(|id| product.has_id(id))
    }
}

impl From<i64> for RequestedId {
    fn from(id: i64) -> Self {
        Self { value: Some(id) }
    }
}

impl fmt::Display for RequestedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(id) => write!(f, "{id}"),
            None => f.write_str("NaN"),
        }
    }
}
