//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

/// Table holding user-named cost factors; its direct children are free-form.
const FACTOR_TABLE: &str = "cost_model.factors";

/// Fields every cost factor entry may carry.
const FACTOR_FIELDS: &[&str] = &["base", "exponent", "capacity_unit"];

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the set of valid dotted key paths for PlannerConfig.
///
/// Entries under `cost_model.factors` are named by the user and are checked
/// separately against [`FACTOR_FIELDS`].
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [planner]
        "planner",
        "planner.name",
        // [capacity]
        "capacity",
        "capacity.bottleneck_threshold",
        "capacity.turndown_threshold",
        // [expansion]
        "expansion",
        "expansion.oil_block_bpd",
        "expansion.gas_block_mmscfd",
        "expansion.oil_cost_type",
        "expansion.gas_cost_type",
        // [economics]
        "economics",
        "economics.discount_rate",
        "economics.oil_price",
        "economics.gas_price",
        "economics.capex_multiplier",
        "economics.opex_multiplier",
        "economics.opex_per_boe",
        "economics.gas_boe_factor",
        "economics.days_per_year",
        "economics.mcf_per_mmscf",
        // [cost_model]
        "cost_model",
        "cost_model.fallback_type",
        "cost_model.factors",
        // [runner]
        "runner",
        "runner.worker_threads",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction<'a, I>(unknown: &str, known: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    known
        .into_iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        // parse errors are reported by serde later
        return Vec::new();
    };

    let known = known_config_keys();
    let factor_prefix = format!("{FACTOR_TABLE}.");
    let mut warnings = Vec::new();

    for key in walk_toml_keys(&value, "") {
        if known.contains(key.as_str()) {
            continue;
        }

        if let Some(rest) = key.strip_prefix(&factor_prefix) {
            // `<Type>` and `<Type>.<field>`; type names may not contain dots
            let Some((factor, field)) = rest.split_once('.') else {
                continue;
            };
            if FACTOR_FIELDS.contains(&field) {
                continue;
            }
            let suggestion = suggest_correction(field, FACTOR_FIELDS.iter().copied())
                .map(|f| format!("{FACTOR_TABLE}.{factor}.{f}"));
            warnings.push(ValidationWarning {
                message: format!("Unknown cost factor field '{key}'"),
                field: key,
                suggestion,
            });
            continue;
        }

        let suggestion = suggest_correction(&key, known.iter().copied());
        warnings.push(ValidationWarning {
            message: format!("Unknown config key '{key}'"),
            field: key,
            suggestion,
        });
    }

    warnings
}

// ============================================================================
// Plausibility Checks
// ============================================================================

/// Suspicious but legal values in a parsed PlannerConfig.
pub fn validate_plausible_ranges(config: &super::PlannerConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let mut warn = |field: &str, message: String| {
        warnings.push(ValidationWarning {
            field: field.to_string(),
            message,
            suggestion: None,
        });
    };

    let c = &config.capacity;
    if c.bottleneck_threshold > 1.0 {
        warn(
            "capacity.bottleneck_threshold",
            format!(
                "capacity.bottleneck_threshold = {:.2} only flags stages running above design capacity",
                c.bottleneck_threshold
            ),
        );
    }

    let e = &config.economics;
    if e.discount_rate > 50.0 {
        warn(
            "economics.discount_rate",
            format!("economics.discount_rate = {:.1} percent is unusually high", e.discount_rate),
        );
    }
    if e.discount_rate > 0.0 && e.discount_rate < 1.0 {
        warn(
            "economics.discount_rate",
            format!("economics.discount_rate = {:.3} is a percent value, not a fraction", e.discount_rate),
        );
    }
    if e.oil_price > 300.0 {
        warn("economics.oil_price", format!("economics.oil_price = {:.0} $/bbl is unusually high", e.oil_price));
    }

    for (name, factor) in &config.cost_model.factors {
        if factor.exponent > 1.0 {
            warn(
                "cost_model.factors",
                format!(
                    "cost_model.factors.{name}.exponent = {:.2} implies diseconomies of scale",
                    factor.exponent
                ),
            );
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn typo_in_threshold_is_suggested() {
        let warnings = validate_unknown_keys(
            r"
[capacity]
botleneck_threshold = 0.9
",
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("capacity.bottleneck_threshold")
        );
    }

    #[test]
    fn user_named_factors_are_accepted() {
        let warnings = validate_unknown_keys(
            r#"
[cost_model.factors."Mini FPSO"]
base = 900000000.0
exponent = 0.7
capacity_unit = "bpd"
"#,
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn factor_field_typo_is_suggested() {
        let warnings = validate_unknown_keys(
            r"
[cost_model.factors.Onshore]
exponant = 0.6
",
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("cost_model.factors.Onshore.exponent")
        );
    }

    #[test]
    fn fractional_discount_rate_warns() {
        let mut config = super::super::PlannerConfig::default();
        config.economics.discount_rate = 0.1;
        let warnings = validate_plausible_ranges(&config);
        assert!(warnings.iter().any(|w| w.field == "economics.discount_rate"));
    }

    #[test]
    fn very_high_discount_rate_is_called_high() {
        let mut config = super::super::PlannerConfig::default();
        config.economics.discount_rate = 80.0;
        let warnings = validate_plausible_ranges(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("percent is unusually high"), "{warnings:?}");
        assert!(!warnings[0].message.contains("fraction"));
    }
}
