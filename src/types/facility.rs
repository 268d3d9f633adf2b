//! Facility design, production profile and project descriptors supplied by collaborators.

use serde::{Deserialize, Serialize};

/// Produced commodity handled by the facility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Commodity {
    Oil,
    Gas,
    Water,
}

impl Commodity {
    pub const ALL: [Self; 3] = [Self::Oil, Self::Gas, Self::Water];

    /// Unit the rates and capacities of this commodity are expressed in.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Oil | Self::Water => "bpd",
            Self::Gas => "mmscfd",
        }
    }
}

impl std::fmt::Display for Commodity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oil => write!(f, "oil"),
            Self::Gas => write!(f, "gas"),
            Self::Water => write!(f, "water"),
        }
    }
}

/// Study the analysis is run for. Not used in any calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjectInfo {
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: String,
}

/// Design and current throughput capacities of the processing facility.
///
/// `current_*` never exceeds `design_*`; that is enforced upstream and only
/// reported as a validation warning here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacilityDesign {
    /// Facility type tag, used as the cost-model lookup key (e.g. "FPSO")
    #[serde(rename = "type")]
    pub facility_type: String,
    pub design_oil_capacity_bpd: f64,
    pub design_gas_capacity_mmscfd: f64,
    pub design_water_capacity_bpd: f64,
    #[serde(default)]
    pub current_oil_capacity_bpd: f64,
    #[serde(default)]
    pub current_gas_capacity_mmscfd: f64,
    #[serde(default)]
    pub current_water_capacity_bpd: f64,
}

impl FacilityDesign {
    /// Facility with design capacities only; current throughput set to design.
    pub fn new(facility_type: impl Into<String>, oil_bpd: f64, gas_mmscfd: f64, water_bpd: f64) -> Self {
        Self {
            facility_type: facility_type.into(),
            design_oil_capacity_bpd: oil_bpd,
            design_gas_capacity_mmscfd: gas_mmscfd,
            design_water_capacity_bpd: water_bpd,
            current_oil_capacity_bpd: oil_bpd,
            current_gas_capacity_mmscfd: gas_mmscfd,
            current_water_capacity_bpd: water_bpd,
        }
    }

    pub const fn design_capacity(&self, commodity: Commodity) -> f64 {
        match commodity {
            Commodity::Oil => self.design_oil_capacity_bpd,
            Commodity::Gas => self.design_gas_capacity_mmscfd,
            Commodity::Water => self.design_water_capacity_bpd,
        }
    }

    pub const fn current_capacity(&self, commodity: Commodity) -> f64 {
        match commodity {
            Commodity::Oil => self.current_oil_capacity_bpd,
            Commodity::Gas => self.current_gas_capacity_mmscfd,
            Commodity::Water => self.current_water_capacity_bpd,
        }
    }
}

/// One yearly record of a production forecast.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProductionPeriod {
    pub year: i32,
    pub oil_rate_bpd: f64,
    pub gas_rate_mmscfd: f64,
    pub water_rate_bpd: f64,
}

impl ProductionPeriod {
    pub const fn new(year: i32, oil_rate_bpd: f64, gas_rate_mmscfd: f64, water_rate_bpd: f64) -> Self {
        Self {
            year,
            oil_rate_bpd,
            gas_rate_mmscfd,
            water_rate_bpd,
        }
    }

    pub const fn rate(&self, commodity: Commodity) -> f64 {
        match commodity {
            Commodity::Oil => self.oil_rate_bpd,
            Commodity::Gas => self.gas_rate_mmscfd,
            Commodity::Water => self.water_rate_bpd,
        }
    }
}

/// Yearly production forecast. Expected, not required, to be ascending by year.
pub type ProductionProfile = Vec<ProductionPeriod>;

/// True when every year is strictly greater than the one before it.
pub fn is_ascending_by_year(profile: &[ProductionPeriod]) -> bool {
    profile.windows(2).all(|w| w[0].year < w[1].year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facility_type_serializes_as_type() {
        let facility = FacilityDesign::new("FPSO", 100_000.0, 150.0, 80_000.0);
        let json = serde_json::to_value(&facility).unwrap();
        assert_eq!(json["type"], "FPSO");
        assert_eq!(facility.current_capacity(Commodity::Gas), 150.0);
    }

    #[test]
    fn ascending_check_rejects_duplicates_and_reversals() {
        let p = |y| ProductionPeriod::new(y, 1.0, 1.0, 1.0);
        assert!(is_ascending_by_year(&[p(2024), p(2025), p(2026)]));
        assert!(!is_ascending_by_year(&[p(2024), p(2024)]));
        assert!(!is_ascending_by_year(&[p(2026), p(2025)]));
        assert!(is_ascending_by_year(&[]));
    }
}
