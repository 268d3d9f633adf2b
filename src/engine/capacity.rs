//! Capacity Analyzer - per-period utilization and bottleneck/turndown classification
//!
//! Utilization = demand / design capacity. A stage is a bottleneck above the
//! bottleneck threshold (0.95) and has a turndown issue when running but
//! below the turndown threshold (0.40). Water is never checked for turndown.
//!
//! Missing inputs come back as an invalid [`CapacityAnalysis`] rather than
//! an error, so batch displays can show partial issues.

use tracing::{debug, warn};

use super::cache::{CacheStats, MemoCache};
use crate::config::CapacityThresholds;
use crate::types::{
    BottleneckFlags, CapacityAnalysis, CapacityAnalysisEntry, FacilityDesign, ProductionPeriod,
    TurndownFlags,
};

/// Content fingerprint of an analysis request: facility type plus the bit
/// patterns of every number, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AnalysisKey {
    facility_type: String,
    numbers: Vec<u64>,
}

impl AnalysisKey {
    fn new(profile: &[ProductionPeriod], facility: &FacilityDesign) -> Self {
        let mut numbers = Vec::with_capacity(6 + profile.len() * 4);
        numbers.extend(
            [
                facility.design_oil_capacity_bpd,
                facility.design_gas_capacity_mmscfd,
                facility.design_water_capacity_bpd,
                facility.current_oil_capacity_bpd,
                facility.current_gas_capacity_mmscfd,
                facility.current_water_capacity_bpd,
            ]
            .map(f64::to_bits),
        );
        for p in profile {
            // sign-extending cast keeps distinct years distinct
            #[allow(clippy::cast_sign_loss)]
            let year = p.year as u64;
            numbers.push(year);
            numbers.extend([p.oil_rate_bpd, p.gas_rate_mmscfd, p.water_rate_bpd].map(f64::to_bits));
        }
        Self {
            facility_type: facility.facility_type.clone(),
            numbers,
        }
    }
}

pub struct CapacityAnalyzer {
    thresholds: CapacityThresholds,
    cache: MemoCache<AnalysisKey, CapacityAnalysis>,
}

impl CapacityAnalyzer {
    pub fn new(thresholds: CapacityThresholds) -> Self {
        Self {
            thresholds,
            cache: MemoCache::new("capacity_analysis"),
        }
    }

    /// Classify every period of `profile` against the facility's design capacities.
    ///
    /// Entries are returned in profile order.
    pub fn analyze(&self, profile: &[ProductionPeriod], facility: Option<&FacilityDesign>) -> CapacityAnalysis {
        let Some(facility) = facility else {
            warn!("Capacity analysis requested without facility design data");
            return CapacityAnalysis::invalid("Facility design data is missing");
        };
        if profile.is_empty() {
            warn!("Capacity analysis requested with an empty production profile");
            return CapacityAnalysis::invalid("Production profile is empty");
        }

        self.cache
            .get_or_insert_with(AnalysisKey::new(profile, facility), || {
                let entries: Vec<_> = profile.iter().map(|p| self.classify(p, facility)).collect();
                debug!(
                    periods = entries.len(),
                    bottleneck_periods = entries.iter().filter(|e| e.has_any_bottleneck()).count(),
                    "Capacity analysis computed"
                );
                CapacityAnalysis::valid(entries)
            })
    }

    fn classify(&self, period: &ProductionPeriod, facility: &FacilityDesign) -> CapacityAnalysisEntry {
        let oil = utilization(period.oil_rate_bpd, facility.design_oil_capacity_bpd);
        let gas = utilization(period.gas_rate_mmscfd, facility.design_gas_capacity_mmscfd);
        let water = utilization(period.water_rate_bpd, facility.design_water_capacity_bpd);

        let bottleneck = |u: f64| u > self.thresholds.bottleneck_threshold;
        let turndown = |u: f64| u > 0.0 && u < self.thresholds.turndown_threshold;

        CapacityAnalysisEntry {
            year: period.year,
            oil_utilization: oil,
            gas_utilization: gas,
            water_utilization: water,
            bottlenecks: BottleneckFlags {
                oil: bottleneck(oil),
                gas: bottleneck(gas),
                water: bottleneck(water),
            },
            turndown_issues: TurndownFlags {
                oil: turndown(oil),
                gas: turndown(gas),
            },
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Demand over capacity. A stage with no capacity is idle at zero demand and
/// infinitely loaded otherwise.
fn utilization(demand: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        demand / capacity
    } else if demand > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> CapacityAnalyzer {
        CapacityAnalyzer::new(CapacityThresholds::default())
    }

    fn facility() -> FacilityDesign {
        FacilityDesign::new("FPSO", 100_000.0, 100.0, 50_000.0)
    }

    #[test]
    fn bottleneck_threshold_is_strict() {
        let profile = vec![
            ProductionPeriod::new(2024, 95_000.0, 50.0, 10_000.0),
            ProductionPeriod::new(2025, 95_001.0, 50.0, 10_000.0),
        ];
        let analysis = analyzer().analyze(&profile, Some(&facility()));
        assert!(!analysis.entries[0].bottlenecks.oil);
        assert!(analysis.entries[1].bottlenecks.oil);
    }

    #[test]
    fn turndown_needs_nonzero_flow_and_skips_water() {
        let profile = vec![ProductionPeriod::new(2030, 0.0, 20.0, 1_000.0)];
        let entry = &analyzer().analyze(&profile, Some(&facility())).entries[0];
        assert!(!entry.turndown_issues.oil, "zero flow is shut in, not turned down");
        assert!(entry.turndown_issues.gas);
        assert!(entry.water_utilization < 0.40);
    }

    #[test]
    fn missing_inputs_soft_fail() {
        let a = analyzer();
        let no_facility = a.analyze(&[ProductionPeriod::new(2024, 1.0, 1.0, 1.0)], None);
        assert!(!no_facility.valid);
        let empty = a.analyze(&[], Some(&facility()));
        assert!(!empty.valid);
        assert!(empty.error.unwrap().contains("empty"));
    }

    #[test]
    fn zero_capacity_stage() {
        let f = FacilityDesign::new("Onshore", 100_000.0, 0.0, 50_000.0);
        let profile = vec![
            ProductionPeriod::new(2024, 1.0, 0.0, 1.0),
            ProductionPeriod::new(2025, 1.0, 5.0, 1.0),
        ];
        let analysis = analyzer().analyze(&profile, Some(&f));
        assert_eq!(analysis.entries[0].gas_utilization, 0.0);
        assert!(!analysis.entries[0].bottlenecks.gas);
        assert!(analysis.entries[1].gas_utilization.is_infinite());
        assert!(analysis.entries[1].bottlenecks.gas);
    }

    #[test]
    fn repeated_analysis_hits_cache() {
        let a = analyzer();
        let profile = vec![ProductionPeriod::new(2024, 50_000.0, 40.0, 5_000.0)];
        let first = a.analyze(&profile, Some(&facility()));
        let second = a.analyze(&profile, Some(&facility()));
        assert_eq!(first, second);
        assert_eq!(a.cache_stats().hits, 1);

        let other = vec![ProductionPeriod::new(2024, 50_000.0, 40.0, 5_001.0)];
        a.analyze(&other, Some(&facility()));
        assert_eq!(a.cache_stats().entries, 2);
    }
}
