use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Signal level -> real trade size, as configured under `[quantity_mapping]`.
///
/// TOML only has string keys, so the table is deserialized as strings and
/// every key must parse as an integer level.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub struct QuantityMapping {
    levels: HashMap<i64, f64>,
}

impl QuantityMapping {
    pub fn new(levels: HashMap<i64, f64>) -> Self {
        Self { levels }
    }

    pub fn get(&self, level: i64) -> Option<f64> {
        self.levels.get(&level).copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for QuantityMapping {
    fn default() -> Self {
        Self::new(HashMap::from([(1, 0.001)]))
    }
}

impl TryFrom<BTreeMap<String, f64>> for QuantityMapping {
    type Error = String;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut levels = HashMap::with_capacity(raw.len());
        for (key, size) in raw {
            let level = key
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("quantity level '{}' is not an integer", key))?;
            if !size.is_finite() {
                return Err(format!("quantity for level {} is not a finite number", level));
            }
            if levels.insert(level, size).is_some() {
                return Err(format!("quantity level {} is defined twice", level));
            }
        }
        Ok(Self { levels })
    }
}
