//! System-wide default constants.
//!
//! Built-in values used when no `planner_config.toml` overrides them.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Capacity Analyzer
// ============================================================================

/// Utilization above which a processing stage is a bottleneck (fraction).
pub const BOTTLENECK_THRESHOLD: f64 = 0.95;

/// Utilization below which a running stage is under-loaded (fraction).
///
/// Only oil and gas are checked for turndown.
pub const TURNDOWN_THRESHOLD: f64 = 0.40;

// ============================================================================
// Expansion Planner
// ============================================================================

/// Oil processing expansion block (bpd).
pub const OIL_EXPANSION_BLOCK_BPD: f64 = 25_000.0;

/// Gas compression expansion block (mmscfd).
pub const GAS_EXPANSION_BLOCK_MMSCFD: f64 = 50.0;

/// Cost-model type used to price oil processing additions.
pub const OIL_EXPANSION_COST_TYPE: &str = "Separation";

/// Cost-model type used to price gas compression additions.
pub const GAS_EXPANSION_COST_TYPE: &str = "Compression";

// ============================================================================
// Cost Model
// ============================================================================

/// Factor substituted for unrecognized facility/unit types.
pub const FALLBACK_COST_TYPE: &str = "Onshore";

/// Reference capacity for volumetric (bpd) cost factors.
pub const REFERENCE_CAPACITY_BPD: f64 = 100_000.0;

/// Reference capacity for gas (mmscfd) cost factors.
pub const REFERENCE_CAPACITY_MMSCFD: f64 = 100.0;

/// Reference capacity for power (MW) cost factors.
pub const REFERENCE_CAPACITY_MW: f64 = 50.0;

// ============================================================================
// Scenario Economics
// ============================================================================

/// Default discount rate (percent).
pub const DISCOUNT_RATE_PERCENT: f64 = 10.0;

/// Default oil price ($/bbl).
pub const OIL_PRICE_PER_BBL: f64 = 60.0;

/// Default gas price ($/mcf).
pub const GAS_PRICE_PER_MCF: f64 = 3.0;

/// Flat operating cost placeholder ($/boe).
pub const OPEX_PER_BOE: f64 = 5.0;

/// Multiplier converting mmscfd into the boe-equivalent used by the OPEX estimate.
pub const GAS_BOE_FACTOR: f64 = 100.0;

pub const DAYS_PER_YEAR: f64 = 365.0;

pub const MCF_PER_MMSCF: f64 = 1_000.0;

/// Dollars per reporting unit ($M).
pub const DOLLARS_PER_MILLION: f64 = 1_000_000.0;

// ============================================================================
// IRR Heuristic
// ============================================================================

/// IRR baseline (percent) for a scenario with positive NPV.
pub const IRR_POSITIVE_BASE: f64 = 15.0;

/// IRR percentage points per unit of NPV/CAPEX when NPV is positive.
pub const IRR_POSITIVE_SLOPE: f64 = 5.0;

/// IRR baseline (percent) for a scenario with non-positive NPV.
pub const IRR_NEGATIVE_BASE: f64 = 5.0;

/// IRR percentage points subtracted per unit of |NPV|/CAPEX when NPV is not positive.
pub const IRR_NEGATIVE_SLOPE: f64 = 2.0;

// ============================================================================
// Task Runner
// ============================================================================

/// Full-analysis progress checkpoints (percent).
pub const PROGRESS_VALIDATED: u8 = 20;
pub const PROGRESS_CAPACITY_ANALYZED: u8 = 50;
pub const PROGRESS_EXPANSION_PLANNED: u8 = 75;
pub const PROGRESS_COST_AGGREGATED: u8 = 95;
pub const PROGRESS_COMPLETE: u8 = 100;
