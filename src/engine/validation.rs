//! Analysis input validation.
//!
//! Problems are collected into a [`ValidationReport`] rather than raised, so
//! a caller can show every issue at once. Errors block analysis; warnings
//! do not.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::{is_ascending_by_year, Commodity, FacilityDesign, ProductionPeriod, ProjectInfo};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check that a full analysis has what it needs.
pub fn validate_analysis_inputs(
    project: Option<&ProjectInfo>,
    facility: Option<&FacilityDesign>,
    profile: &[ProductionPeriod],
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if project.is_none() {
        errors.push("Project is missing".to_string());
    }

    match facility {
        None => errors.push("Facility design is missing".to_string()),
        Some(f) => {
            for commodity in Commodity::ALL {
                let design = f.design_capacity(commodity);
                let current = f.current_capacity(commodity);
                if !design.is_finite() || design < 0.0 {
                    errors.push(format!("Design {commodity} capacity must be a non-negative number (got {design})"));
                } else if current > design {
                    warnings.push(format!(
                        "Current {commodity} capacity {current} {unit} exceeds design capacity {design} {unit}",
                        unit = commodity.unit()
                    ));
                }
            }
        }
    }

    if profile.is_empty() {
        errors.push("Production profile is empty".to_string());
    }

    errors.extend(validate_profile_rates(profile));

    if !is_ascending_by_year(profile) {
        let mut seen = HashSet::new();
        let duplicates: Vec<String> = profile
            .iter()
            .filter(|p| !seen.insert(p.year))
            .map(|p| p.year.to_string())
            .collect();
        if duplicates.is_empty() {
            warnings.push("Production profile is not in ascending year order".to_string());
        } else {
            warnings.push(format!("Production profile repeats years: {}", duplicates.join(", ")));
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Rate errors for every period: non-finite or negative oil, gas or water.
pub fn validate_profile_rates(profile: &[ProductionPeriod]) -> Vec<String> {
    let mut errors = Vec::new();
    for period in profile {
        for commodity in Commodity::ALL {
            let rate = period.rate(commodity);
            if !rate.is_finite() {
                errors.push(format!("Year {}: {commodity} rate is not a number", period.year));
            } else if rate < 0.0 {
                errors.push(format!(
                    "Year {}: {commodity} rate cannot be negative ({rate} {})",
                    period.year,
                    commodity.unit()
                ));
            }
        }
    }
    errors
}
