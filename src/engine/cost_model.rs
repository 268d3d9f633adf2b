//! Power-law CAPEX estimator keyed by facility/unit type.
//!
//! `cost = round(base * (capacity / reference)^exponent)` where `reference`
//! depends on the factor's capacity unit (100 000 bpd, 100 mmscfd, 50 MW).
//! Unrecognized types are priced with the configured fallback factor
//! ("Onshore" by default) instead of failing.

use std::collections::BTreeMap;
use tracing::{trace, warn};

use super::cache::{CacheStats, MemoCache};
use crate::config::{CostFactor, CostModelConfig};
use crate::error::PlanningError;

/// Cache key: exact type string and capacity bit pattern.
type CapexKey = (String, u64);

pub struct CostModel {
    factors: BTreeMap<String, CostFactor>,
    fallback_type: String,
    cache: MemoCache<CapexKey, f64>,
}

impl CostModel {
    pub fn new(config: &CostModelConfig) -> Self {
        Self {
            factors: config.factors.clone(),
            fallback_type: config.fallback_type.clone(),
            cache: MemoCache::new("capex"),
        }
    }

    /// Resolve the factor for `facility_type`, substituting the fallback
    /// for unknown types. Returns the type name actually used.
    pub fn resolve_factor(&self, facility_type: &str) -> Option<(&str, CostFactor)> {
        self.factors
            .get_key_value(facility_type)
            .or_else(|| self.factors.get_key_value(&self.fallback_type))
            .map(|(name, factor)| (name.as_str(), *factor))
    }

    /// Estimate capital cost in dollars for `capacity` units of `facility_type`.
    ///
    /// Fails with `InvalidInput` when the type is blank or the capacity is
    /// not a finite positive number.
    pub fn estimate_capex(&self, facility_type: &str, capacity: f64) -> Result<f64, PlanningError> {
        if facility_type.trim().is_empty() {
            return Err(PlanningError::InvalidInput(
                "facility type must be a non-empty identifier".to_string(),
            ));
        }
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(PlanningError::InvalidInput(format!(
                "capacity must be a finite number > 0 (got {capacity})"
            )));
        }

        self.cache
            .get_or_try_insert_with((facility_type.to_string(), capacity.to_bits()), || {
                self.compute(facility_type, capacity)
            })
    }

    fn compute(&self, facility_type: &str, capacity: f64) -> Result<f64, PlanningError> {
        let (resolved, factor) = self.resolve_factor(facility_type).ok_or_else(|| {
            PlanningError::InvalidInput(format!(
                "no cost factor for '{facility_type}' and fallback '{}' is not configured",
                self.fallback_type
            ))
        })?;
        if resolved != facility_type {
            warn!(
                facility_type = %facility_type,
                fallback = %resolved,
                "Unknown cost type, using fallback factor"
            );
        }

        let reference = factor.capacity_unit.reference_capacity();
        let cost = (factor.base * (capacity / reference).powf(factor.exponent)).round();

        trace!(
            facility_type = %facility_type,
            capacity,
            unit = %factor.capacity_unit,
            cost,
            "CAPEX estimated"
        );
        Ok(cost)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CapacityUnit;

    fn model() -> CostModel {
        CostModel::new(&CostModelConfig::default())
    }

    #[test]
    fn reference_capacity_returns_base() {
        let m = model();
        let (_, sep) = m.resolve_factor("Separation").unwrap();
        assert_eq!(m.estimate_capex("Separation", 100_000.0).unwrap(), sep.base.round());

        let (_, comp) = m.resolve_factor("Compression").unwrap();
        assert_eq!(comp.capacity_unit, CapacityUnit::Mmscfd);
        assert_eq!(m.estimate_capex("Compression", 100.0).unwrap(), comp.base.round());

        let (_, power) = m.resolve_factor("Power Generation").unwrap();
        assert_eq!(m.estimate_capex("Power Generation", 50.0).unwrap(), power.base.round());
    }

    #[test]
    fn unknown_type_uses_onshore_factor() {
        let m = model();
        let onshore = m.estimate_capex("Onshore", 80_000.0).unwrap();
        let unknown = m.estimate_capex("Floating LNG Barge", 80_000.0).unwrap();
        assert_eq!(unknown, onshore);
        assert_eq!(m.resolve_factor("Floating LNG Barge").unwrap().0, "Onshore");
    }

    #[test]
    fn invalid_inputs_fail_without_caching() {
        let m = model();
        for capacity in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = m.estimate_capex("FPSO", capacity).unwrap_err();
            assert!(matches!(err, PlanningError::InvalidInput(_)), "{capacity}: {err}");
        }
        assert!(matches!(
            m.estimate_capex("  ", 100.0),
            Err(PlanningError::InvalidInput(_))
        ));
        assert_eq!(m.cache_stats().entries, 0);
    }

    #[test]
    fn cached_and_uncached_results_match() {
        let m = model();
        let first = m.estimate_capex("Subsea Tieback", 42_500.0).unwrap();
        let cached = m.estimate_capex("Subsea Tieback", 42_500.0).unwrap();
        m.clear_cache();
        let recomputed = m.estimate_capex("Subsea Tieback", 42_500.0).unwrap();
        assert_eq!(first, cached);
        assert_eq!(first, recomputed);
    }

    #[test]
    fn missing_fallback_is_invalid_input() {
        let mut config = CostModelConfig::default();
        config.fallback_type = "Nowhere".to_string();
        let m = CostModel::new(&config);
        assert!(m.estimate_capex("FPSO", 100_000.0).is_ok());
        assert!(matches!(
            m.estimate_capex("Mystery", 100_000.0),
            Err(PlanningError::InvalidInput(_))
        ));
    }
}
