//! Scenario ranking by a result metric.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::types::{Scenario, ScenarioResult};

/// Numeric field of [`ScenarioResult`] to rank by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RankingMetric {
    #[default]
    Npv,
    Irr,
    TotalCapex,
    PeakOilRate,
    PeakGasRate,
    BreakEvenOilPrice,
    ExpansionCount,
}

impl RankingMetric {
    #[allow(clippy::cast_precision_loss)]
    pub fn value(self, result: &ScenarioResult) -> f64 {
        match self {
            Self::Npv => result.npv,
            Self::Irr => result.irr,
            Self::TotalCapex => result.total_capex,
            Self::PeakOilRate => result.peak_oil_rate,
            Self::PeakGasRate => result.peak_gas_rate,
            Self::BreakEvenOilPrice => result.break_even_oil_price,
            Self::ExpansionCount => result.expansion_count as f64,
        }
    }
}

impl FromStr for RankingMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "npv" => Ok(Self::Npv),
            "irr" => Ok(Self::Irr),
            "total_capex" | "capex" => Ok(Self::TotalCapex),
            "peak_oil_rate" => Ok(Self::PeakOilRate),
            "peak_gas_rate" => Ok(Self::PeakGasRate),
            "break_even_oil_price" | "break_even" => Ok(Self::BreakEvenOilPrice),
            "expansion_count" => Ok(Self::ExpansionCount),
            other => Err(format!("unknown ranking metric '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Stable sort of `scenarios` by `metric`.
///
/// Scenarios without results rank as negative infinity: last when
/// descending, first when ascending.
pub fn rank_scenarios(scenarios: &[Scenario], metric: RankingMetric, direction: SortDirection) -> Vec<Scenario> {
    let key = |s: &Scenario| s.results.as_ref().map_or(f64::NEG_INFINITY, |r| metric.value(r));

    let mut ranked = scenarios.to_vec();
    ranked.sort_by(|a, b| {
        let ord: Ordering = key(a).total_cmp(&key(b));
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    ranked
}
