//! Capacity analysis records: per-year utilization and bottleneck/turndown flags.

use serde::{Deserialize, Serialize};

use super::Commodity;

/// Per-commodity bottleneck flags (utilization above the bottleneck threshold).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BottleneckFlags {
    pub oil: bool,
    pub gas: bool,
    pub water: bool,
}

/// Turndown flags. Water is not checked for turndown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TurndownFlags {
    pub oil: bool,
    pub gas: bool,
}

/// Derived utilization record for one production period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapacityAnalysisEntry {
    pub year: i32,
    /// Oil demand / design oil capacity (fraction)
    pub oil_utilization: f64,
    pub gas_utilization: f64,
    pub water_utilization: f64,
    pub bottlenecks: BottleneckFlags,
    pub turndown_issues: TurndownFlags,
}

impl CapacityAnalysisEntry {
    pub const fn utilization(&self, commodity: Commodity) -> f64 {
        match commodity {
            Commodity::Oil => self.oil_utilization,
            Commodity::Gas => self.gas_utilization,
            Commodity::Water => self.water_utilization,
        }
    }

    pub const fn is_bottleneck(&self, commodity: Commodity) -> bool {
        match commodity {
            Commodity::Oil => self.bottlenecks.oil,
            Commodity::Gas => self.bottlenecks.gas,
            Commodity::Water => self.bottlenecks.water,
        }
    }

    pub const fn has_any_bottleneck(&self) -> bool {
        self.bottlenecks.oil || self.bottlenecks.gas || self.bottlenecks.water
    }
}

/// Result of a capacity analysis.
///
/// Missing inputs do not raise: the analysis comes back with `valid = false`,
/// an explanatory `error` and no entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapacityAnalysis {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub entries: Vec<CapacityAnalysisEntry>,
}

impl CapacityAnalysis {
    pub const fn valid(entries: Vec<CapacityAnalysisEntry>) -> Self {
        Self {
            valid: true,
            error: None,
            entries,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(reason.into()),
            entries: Vec::new(),
        }
    }

    /// Years flagged as bottlenecked for `commodity`, in analysis order.
    pub fn bottleneck_years(&self, commodity: Commodity) -> Vec<i32> {
        self.entries
            .iter()
            .filter(|e| e.is_bottleneck(commodity))
            .map(|e| e.year)
            .collect()
    }

    /// Highest utilization seen for `commodity`, 0.0 for an empty analysis.
    pub fn peak_utilization(&self, commodity: Commodity) -> f64 {
        self.entries
            .iter()
            .map(|e| e.utilization(commodity))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(year: i32, oil: f64, bottleneck: bool) -> CapacityAnalysisEntry {
        CapacityAnalysisEntry {
            year,
            oil_utilization: oil,
            gas_utilization: 0.0,
            water_utilization: 0.0,
            bottlenecks: BottleneckFlags {
                oil: bottleneck,
                ..BottleneckFlags::default()
            },
            turndown_issues: TurndownFlags::default(),
        }
    }

    #[test]
    fn summary_helpers() {
        let analysis = CapacityAnalysis::valid(vec![
            entry(2024, 0.8, false),
            entry(2025, 1.1, true),
            entry(2026, 0.97, true),
        ]);
        assert_eq!(analysis.bottleneck_years(Commodity::Oil), vec![2025, 2026]);
        assert!((analysis.peak_utilization(Commodity::Oil) - 1.1).abs() < 1e-12);
        assert!(analysis.bottleneck_years(Commodity::Gas).is_empty());
    }

    #[test]
    fn invalid_analysis_has_no_entries() {
        let analysis = CapacityAnalysis::invalid("no facility");
        assert!(!analysis.valid);
        assert!(analysis.entries.is_empty());
        assert_eq!(analysis.error.as_deref(), Some("no facility"));
    }
}
