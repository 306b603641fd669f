use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Opaque product identifier as issued by the catalog service.
///
/// Catalogs key products by string or by integer; either shape is kept and
/// written back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Text(String),
    Number(i64),
}

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self::Text(id.into())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(id) => f.write_str(id),
            Self::Number(id) => write!(f, "{}", id),
        }
    }
}

/// Catalog projection handed to the language model: only id and name survive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
}

impl ProductRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.into(),
        }
    }
}

/// A product the caller asked for, as claimed by the model.
///
/// The id is not re-checked against the catalog unless unknown-product
/// filtering is switched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuantity {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(deserialize_with = "lenient_count")]
    pub count: u32,
}

impl ProductQuantity {
    pub fn new(id: impl Into<String>, count: u32) -> Self {
        Self {
            id: ProductId::new(id),
            count,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Whole(u64),
    Fractional(f64),
    Text(String),
}

/// Accepts `2`, `2.0` and `"2"`; rejects negatives, fractions and words.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match RawCount::deserialize(deserializer)? {
        RawCount::Whole(n) => u32::try_from(n).ok(),
        RawCount::Fractional(f) if f.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&f) => {
            Some(f as u32)
        }
        RawCount::Fractional(_) => None,
        RawCount::Text(s) => s.trim().parse().ok(),
    };
    count.ok_or_else(|| de::Error::custom("count is not a whole non-negative number"))
}
