//! Planning scenarios: economic parameters, lifecycle status and results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Economic assumptions of a scenario. Prices in $/bbl and $/mcf,
/// discount rate in percent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScenarioParameters {
    pub discount_rate: f64,
    pub oil_price: f64,
    pub gas_price: f64,
    pub capex_multiplier: f64,
    pub opex_multiplier: f64,
}

/// Caller-supplied parameters; unset fields take the configured defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ParameterOverrides {
    pub discount_rate: Option<f64>,
    pub oil_price: Option<f64>,
    pub gas_price: Option<f64>,
    pub capex_multiplier: Option<f64>,
    pub opex_multiplier: Option<f64>,
}

impl ParameterOverrides {
    /// Merge over `defaults`, field by field.
    pub fn apply(&self, defaults: ScenarioParameters) -> ScenarioParameters {
        ScenarioParameters {
            discount_rate: self.discount_rate.unwrap_or(defaults.discount_rate),
            oil_price: self.oil_price.unwrap_or(defaults.oil_price),
            gas_price: self.gas_price.unwrap_or(defaults.gas_price),
            capex_multiplier: self.capex_multiplier.unwrap_or(defaults.capex_multiplier),
            opex_multiplier: self.opex_multiplier.unwrap_or(defaults.opex_multiplier),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ScenarioStatus {
    #[default]
    Draft,
    Completed,
}

impl std::fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// Cashflow breakdown for one production period, $M.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PeriodCashflow {
    pub year: i32,
    pub revenue: f64,
    pub capex: f64,
    pub opex: f64,
    pub net_cashflow: f64,
}

/// Economic outcome of a scenario run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioResult {
    /// $M, whole number
    pub npv: f64,
    /// Approximate IRR in percent, one decimal
    pub irr: f64,
    /// $M, whole number
    pub total_capex: f64,
    pub peak_oil_rate: f64,
    pub peak_gas_rate: f64,
    /// $/bbl, two decimals
    pub break_even_oil_price: f64,
    pub expansion_count: usize,
    pub cashflows: Vec<PeriodCashflow>,
}

/// A named set of economic assumptions evaluated against the shared expansion plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub scenario_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parameters: ScenarioParameters,
    #[serde(default)]
    pub results: Option<ScenarioResult>,
    #[serde(default)]
    pub status: ScenarioStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
}

impl Scenario {
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, ScenarioStatus::Completed)
    }
}

/// Scenario definition as supplied by a collaborator before creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScenarioSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: ParameterOverrides,
}
