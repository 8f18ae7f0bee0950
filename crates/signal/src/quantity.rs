use common::models::QuantityMapping;

/// Size per level for levels that have no configured mapping.
pub const FALLBACK_SCALE: f64 = 0.001;

/// Turns the number carried by a signal into a trade size.
#[derive(Debug, Clone, Default)]
pub struct QuantityMapper {
    mapping: QuantityMapping,
}

impl QuantityMapper {
    pub fn new(mapping: QuantityMapping) -> Self {
        Self { mapping }
    }

    /// Configured size for the truncated level, else `level * FALLBACK_SCALE`.
    /// Never fails; callers decide whether the result is tradable.
    pub fn resolve(&self, level: f64) -> f64 {
        self.mapping
            .get(level.trunc() as i64)
            .unwrap_or(level * FALLBACK_SCALE)
    }
}
