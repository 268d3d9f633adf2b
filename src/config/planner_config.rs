//! Planner Configuration - engine constants and cost factors as TOML values
//!
//! Every planning constant (thresholds, expansion blocks, economic defaults,
//! cost curves) is a field in this module. Each struct implements `Default`
//! with the built-in values from [`super::defaults`], so a missing config
//! file changes nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::types::ScenarioParameters;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "PLANNER_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "planner_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration of the planning engine.
///
/// Load with `PlannerConfig::load()` which searches:
/// 1. `$PLANNER_CONFIG` env var
/// 2. `./planner_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlannerConfig {
    #[serde(default)]
    pub planner: PlannerInfo,

    /// Utilization classification thresholds
    #[serde(default)]
    pub capacity: CapacityThresholds,

    /// Expansion block sizes and pricing types
    #[serde(default)]
    pub expansion: ExpansionConfig,

    /// Scenario defaults and evaluator constants
    #[serde(default)]
    pub economics: EconomicsConfig,

    /// Power-law cost curves
    #[serde(default)]
    pub cost_model: CostModelConfig,

    #[serde(default)]
    pub runner: RunnerConfig,
}

impl PlannerConfig {
    /// Load configuration using the standard search order:
    /// 1. `$PLANNER_CONFIG` environment variable
    /// 2. `./planner_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), planner = %config.planner.name, "Loaded planner config from PLANNER_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from PLANNER_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "PLANNER_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(planner = %config.planner.name, "Loaded planner config from ./planner_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./planner_config.toml, using defaults");
                }
            }
        }

        info!("No planner_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only produce warnings.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Planner config saved");
        Ok(())
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Every number must be finite
    /// - Turndown threshold must sit below the bottleneck threshold
    /// - Expansion blocks, cost bases and exponents must be positive
    /// - The fallback cost type must exist in the factor table
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let c = &self.capacity;
        Self::check_positive(c.bottleneck_threshold, "capacity.bottleneck_threshold", &mut errors);
        Self::check_positive(c.turndown_threshold, "capacity.turndown_threshold", &mut errors);
        if c.turndown_threshold >= c.bottleneck_threshold {
            errors.push(format!(
                "capacity.turndown_threshold ({:.2}) must be less than bottleneck_threshold ({:.2})",
                c.turndown_threshold, c.bottleneck_threshold
            ));
        }

        let x = &self.expansion;
        Self::check_positive(x.oil_block_bpd, "expansion.oil_block_bpd", &mut errors);
        Self::check_positive(x.gas_block_mmscfd, "expansion.gas_block_mmscfd", &mut errors);
        if x.oil_cost_type.trim().is_empty() || x.gas_cost_type.trim().is_empty() {
            errors.push("expansion cost types must not be empty".to_string());
        }

        let e = &self.economics;
        if !e.discount_rate.is_finite() || e.discount_rate < 0.0 {
            errors.push(format!("economics.discount_rate must be >= 0 (got {})", e.discount_rate));
        }
        Self::check_positive(e.oil_price, "economics.oil_price", &mut errors);
        Self::check_positive(e.gas_price, "economics.gas_price", &mut errors);
        Self::check_positive(e.capex_multiplier, "economics.capex_multiplier", &mut errors);
        Self::check_positive(e.opex_multiplier, "economics.opex_multiplier", &mut errors);
        Self::check_positive(e.opex_per_boe, "economics.opex_per_boe", &mut errors);
        Self::check_positive(e.gas_boe_factor, "economics.gas_boe_factor", &mut errors);
        Self::check_positive(e.days_per_year, "economics.days_per_year", &mut errors);
        Self::check_positive(e.mcf_per_mmscf, "economics.mcf_per_mmscf", &mut errors);

        let cm = &self.cost_model;
        if !cm.factors.contains_key(&cm.fallback_type) {
            errors.push(format!(
                "cost_model.fallback_type '{}' has no entry in cost_model.factors",
                cm.fallback_type
            ));
        }
        for (name, factor) in &cm.factors {
            Self::check_positive(factor.base, &format!("cost_model.factors.{name}.base"), &mut errors);
            Self::check_positive(factor.exponent, &format!("cost_model.factors.{name}.exponent"), &mut errors);
        }

        for w in super::validation::validate_plausible_ranges(self) {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() {
            errors.push(format!("{name} must be a finite number (got {value})"));
        } else if value <= 0.0 {
            errors.push(format!("{name} must be > 0 (got {value})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            Self::Parse(path, e) => write!(f, "Config parse error ({}): {}", path.display(), e),
            Self::Serialize(e) => write!(f, "Config serialization error: {e}"),
            Self::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Planner Info
// ============================================================================

/// Identification only; appears in logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerInfo {
    #[serde(default = "default_planner_name")]
    pub name: String,
}

fn default_planner_name() -> String {
    "facility-planner".to_string()
}

impl Default for PlannerInfo {
    fn default() -> Self {
        Self {
            name: default_planner_name(),
        }
    }
}

// ============================================================================
// Capacity Thresholds
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CapacityThresholds {
    /// Utilization strictly above this is a bottleneck
    #[serde(default = "default_bottleneck_threshold")]
    pub bottleneck_threshold: f64,

    /// Non-zero utilization strictly below this is a turndown issue (oil, gas)
    #[serde(default = "default_turndown_threshold")]
    pub turndown_threshold: f64,
}

fn default_bottleneck_threshold() -> f64 { defaults::BOTTLENECK_THRESHOLD }
fn default_turndown_threshold() -> f64 { defaults::TURNDOWN_THRESHOLD }

impl Default for CapacityThresholds {
    fn default() -> Self {
        Self {
            bottleneck_threshold: default_bottleneck_threshold(),
            turndown_threshold: default_turndown_threshold(),
        }
    }
}

// ============================================================================
// Expansion
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    #[serde(default = "default_oil_block")]
    pub oil_block_bpd: f64,

    #[serde(default = "default_gas_block")]
    pub gas_block_mmscfd: f64,

    /// Cost-model type used to price oil processing additions
    #[serde(default = "default_oil_cost_type")]
    pub oil_cost_type: String,

    /// Cost-model type used to price gas compression additions
    #[serde(default = "default_gas_cost_type")]
    pub gas_cost_type: String,
}

fn default_oil_block() -> f64 { defaults::OIL_EXPANSION_BLOCK_BPD }
fn default_gas_block() -> f64 { defaults::GAS_EXPANSION_BLOCK_MMSCFD }
fn default_oil_cost_type() -> String { defaults::OIL_EXPANSION_COST_TYPE.to_string() }
fn default_gas_cost_type() -> String { defaults::GAS_EXPANSION_COST_TYPE.to_string() }

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            oil_block_bpd: default_oil_block(),
            gas_block_mmscfd: default_gas_block(),
            oil_cost_type: default_oil_cost_type(),
            gas_cost_type: default_gas_cost_type(),
        }
    }
}

// ============================================================================
// Economics
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EconomicsConfig {
    /// Default discount rate for new scenarios (percent)
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,

    /// Default oil price for new scenarios ($/bbl)
    #[serde(default = "default_oil_price")]
    pub oil_price: f64,

    /// Default gas price for new scenarios ($/mcf)
    #[serde(default = "default_gas_price")]
    pub gas_price: f64,

    #[serde(default = "default_multiplier")]
    pub capex_multiplier: f64,

    #[serde(default = "default_multiplier")]
    pub opex_multiplier: f64,

    /// Flat operating cost placeholder ($/boe)
    #[serde(default = "default_opex_per_boe")]
    pub opex_per_boe: f64,

    /// mmscfd to boe-equivalent factor used by the OPEX estimate
    #[serde(default = "default_gas_boe_factor")]
    pub gas_boe_factor: f64,

    #[serde(default = "default_days_per_year")]
    pub days_per_year: f64,

    #[serde(default = "default_mcf_per_mmscf")]
    pub mcf_per_mmscf: f64,
}

fn default_discount_rate() -> f64 { defaults::DISCOUNT_RATE_PERCENT }
fn default_oil_price() -> f64 { defaults::OIL_PRICE_PER_BBL }
fn default_gas_price() -> f64 { defaults::GAS_PRICE_PER_MCF }
fn default_multiplier() -> f64 { 1.0 }
fn default_opex_per_boe() -> f64 { defaults::OPEX_PER_BOE }
fn default_gas_boe_factor() -> f64 { defaults::GAS_BOE_FACTOR }
fn default_days_per_year() -> f64 { defaults::DAYS_PER_YEAR }
fn default_mcf_per_mmscf() -> f64 { defaults::MCF_PER_MMSCF }

impl EconomicsConfig {
    /// Parameters a new scenario starts from.
    pub const fn scenario_defaults(&self) -> ScenarioParameters {
        ScenarioParameters {
            discount_rate: self.discount_rate,
            oil_price: self.oil_price,
            gas_price: self.gas_price,
            capex_multiplier: self.capex_multiplier,
            opex_multiplier: self.opex_multiplier,
        }
    }
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            discount_rate: default_discount_rate(),
            oil_price: default_oil_price(),
            gas_price: default_gas_price(),
            capex_multiplier: default_multiplier(),
            opex_multiplier: default_multiplier(),
            opex_per_boe: default_opex_per_boe(),
            gas_boe_factor: default_gas_boe_factor(),
            days_per_year: default_days_per_year(),
            mcf_per_mmscf: default_mcf_per_mmscf(),
        }
    }
}

// ============================================================================
// Cost Model
// ============================================================================

/// Unit a cost factor's capacity is expressed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CapacityUnit {
    Bpd,
    Mmscfd,
    Mw,
}

impl CapacityUnit {
    /// Capacity at which a factor's `base` cost applies.
    pub const fn reference_capacity(self) -> f64 {
        match self {
            Self::Bpd => defaults::REFERENCE_CAPACITY_BPD,
            Self::Mmscfd => defaults::REFERENCE_CAPACITY_MMSCFD,
            Self::Mw => defaults::REFERENCE_CAPACITY_MW,
        }
    }
}

impl std::fmt::Display for CapacityUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bpd => write!(f, "bpd"),
            Self::Mmscfd => write!(f, "mmscfd"),
            Self::Mw => write!(f, "MW"),
        }
    }
}

/// Power-law cost curve: `base * (capacity / reference)^exponent` dollars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CostFactor {
    pub base: f64,
    pub exponent: f64,
    pub capacity_unit: CapacityUnit,
}

impl CostFactor {
    pub const fn new(base: f64, exponent: f64, capacity_unit: CapacityUnit) -> Self {
        Self {
            base,
            exponent,
            capacity_unit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostModelConfig {
    /// Factor used when a type has no entry in `factors`
    #[serde(default = "default_fallback_type")]
    pub fallback_type: String,

    /// Cost curves keyed by facility/unit type
    #[serde(default = "default_cost_factors")]
    pub factors: BTreeMap<String, CostFactor>,
}

fn default_fallback_type() -> String { defaults::FALLBACK_COST_TYPE.to_string() }

/// Built-in cost curves (base in dollars at the unit's reference capacity).
pub fn default_cost_factors() -> BTreeMap<String, CostFactor> {
    use CapacityUnit::{Bpd, Mmscfd, Mw};
    [
        ("Onshore", CostFactor::new(250_000_000.0, 0.65, Bpd)),
        ("Offshore Platform", CostFactor::new(1_200_000_000.0, 0.70, Bpd)),
        ("FPSO", CostFactor::new(1_800_000_000.0, 0.68, Bpd)),
        ("Subsea Tieback", CostFactor::new(450_000_000.0, 0.60, Bpd)),
        ("Separation", CostFactor::new(85_000_000.0, 0.60, Bpd)),
        ("Compression", CostFactor::new(120_000_000.0, 0.70, Mmscfd)),
        ("Gas Processing", CostFactor::new(300_000_000.0, 0.65, Mmscfd)),
        ("Water Treatment", CostFactor::new(40_000_000.0, 0.65, Bpd)),
        ("Power Generation", CostFactor::new(90_000_000.0, 0.75, Mw)),
    ]
    .into_iter()
    .map(|(name, factor)| (name.to_string(), factor))
    .collect()
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            fallback_type: default_fallback_type(),
            factors: default_cost_factors(),
        }
    }
}

// ============================================================================
// Runner
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    /// Worker thread hint for the binary's runtime; 0 = tokio default
    #[serde(default)]
    pub worker_threads: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(PlannerConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = PlannerConfig::from_toml_str(
            r#"
[capacity]
bottleneck_threshold = 0.9

[cost_model]
fallback_type = "Compact GTL"

[cost_model.factors."Compact GTL"]
base = 500000000.0
exponent = 0.7
capacity_unit = "bpd"
"#,
        )
        .unwrap();
        assert_eq!(config.capacity.bottleneck_threshold, 0.9);
        assert_eq!(config.capacity.turndown_threshold, defaults::TURNDOWN_THRESHOLD);
        // A user factor table replaces the built-in one
        assert_eq!(config.cost_model.factors.len(), 1);
        assert!(config.cost_model.factors.contains_key("Compact GTL"));
        assert_eq!(config.economics.oil_price, defaults::OIL_PRICE_PER_BBL);
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let mut config = PlannerConfig::default();
        config.capacity.turndown_threshold = 0.96;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("turndown_threshold")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_fallback_factor_rejected() {
        let mut config = PlannerConfig::default();
        config.cost_model.fallback_type = "Moon Base".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_round_trip_preserves_factors() {
        let config = PlannerConfig::default();
        let text = config.to_toml().unwrap();
        let back = PlannerConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.cost_model.factors, config.cost_model.factors);
    }
}
