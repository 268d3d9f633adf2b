//! Expansion plan records and CAPEX estimate requests.

use serde::{Deserialize, Serialize};

/// Kind of capacity addition proposed by the planner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExpansionType {
    #[serde(rename = "Oil Processing")]
    OilProcessing,
    #[serde(rename = "Gas Compression")]
    GasCompression,
}

impl ExpansionType {
    /// Short tag used in expansion item identifiers.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::OilProcessing => "OIL",
            Self::GasCompression => "GAS",
        }
    }
}

impl std::fmt::Display for ExpansionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OilProcessing => write!(f, "Oil Processing"),
            Self::GasCompression => write!(f, "Gas Compression"),
        }
    }
}

/// One proposed capacity addition. At most one per (year, type).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpansionItem {
    pub id: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub expansion_type: ExpansionType,
    /// Added capacity in bpd (oil) or mmscfd (gas), a whole number of blocks
    pub capacity_addition: f64,
    /// Estimated cost in dollars
    pub estimated_capex: f64,
    /// Human-readable reason the addition was proposed
    pub trigger: String,
}

/// Sum of `estimated_capex` over a plan, in dollars.
pub fn total_capex(plan: &[ExpansionItem]) -> f64 {
    plan.iter().map(|item| item.estimated_capex).sum()
}

/// A single CAPEX estimate request, as carried by the batch task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapexRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub facility_type: String,
    pub capacity: f64,
}

/// A CAPEX estimate answered by the batch task, in request order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapexEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub facility_type: String,
    pub capacity: f64,
    pub estimated_capex: f64,
}
