//! Expansion Planner - greedy, block-sized capacity additions
//!
//! Walks the capacity analysis in the order it was produced (profile order)
//! keeping a virtual oil and gas capacity seeded from the design values.
//! When a bottlenecked period's demand exceeds the virtual capacity, the
//! shortfall is rounded up to whole expansion blocks, priced with the cost
//! model and added to the virtual capacity.
//!
//! The sweep never backtracks, and proposes at most one addition per
//! (year, type) even when one block does not cover that year's demand.
//! Profiles that are not ascending by year produce a plan in profile order.

use tracing::{debug, info, warn};

use super::cost_model::CostModel;
use crate::config::ExpansionConfig;
use crate::error::PlanningError;
use crate::types::{
    is_ascending_by_year, CapacityAnalysis, Commodity, ExpansionItem, ExpansionType,
    FacilityDesign, ProductionPeriod,
};

/// Round `shortfall` up to a whole number of `block`s.
pub fn round_up_to_block(shortfall: f64, block: f64) -> f64 {
    (shortfall / block).ceil() * block
}

/// One commodity's running state during the sweep.
struct Track<'a> {
    commodity: Commodity,
    expansion_type: ExpansionType,
    block: f64,
    cost_type: &'a str,
    virtual_capacity: f64,
}

pub struct ExpansionPlanner<'a> {
    config: &'a ExpansionConfig,
    cost_model: &'a CostModel,
}

impl<'a> ExpansionPlanner<'a> {
    pub const fn new(config: &'a ExpansionConfig, cost_model: &'a CostModel) -> Self {
        Self { config, cost_model }
    }

    /// Propose capacity additions for `profile` given its capacity `analysis`.
    ///
    /// `analysis` must have been produced from the same profile and facility.
    pub fn plan(
        &self,
        profile: &[ProductionPeriod],
        facility: &FacilityDesign,
        analysis: &CapacityAnalysis,
    ) -> Result<Vec<ExpansionItem>, PlanningError> {
        if !analysis.valid {
            return Err(PlanningError::MissingData(
                analysis
                    .error
                    .clone()
                    .unwrap_or_else(|| "capacity analysis is invalid".to_string()),
            ));
        }
        if analysis.entries.len() != profile.len() {
            return Err(PlanningError::InvalidInput(format!(
                "capacity analysis has {} entries for a {}-period profile",
                analysis.entries.len(),
                profile.len()
            )));
        }
        if !is_ascending_by_year(profile) {
            warn!("Production profile is not ascending by year, expansion plan follows profile order");
        }

        let mut tracks = [
            Track {
                commodity: Commodity::Oil,
                expansion_type: ExpansionType::OilProcessing,
                block: self.config.oil_block_bpd,
                cost_type: &self.config.oil_cost_type,
                virtual_capacity: facility.design_oil_capacity_bpd,
            },
            Track {
                commodity: Commodity::Gas,
                expansion_type: ExpansionType::GasCompression,
                block: self.config.gas_block_mmscfd,
                cost_type: &self.config.gas_cost_type,
                virtual_capacity: facility.design_gas_capacity_mmscfd,
            },
        ];

        let mut plan: Vec<ExpansionItem> = Vec::new();

        for (entry, period) in analysis.entries.iter().zip(profile) {
            for track in &mut tracks {
                if !entry.is_bottleneck(track.commodity) {
                    continue;
                }
                let required = period.rate(track.commodity);
                if required <= track.virtual_capacity {
                    continue;
                }
                let already_planned = plan
                    .iter()
                    .any(|item| item.year == entry.year && item.expansion_type == track.expansion_type);
                if already_planned {
                    debug!(
                        year = entry.year,
                        expansion_type = %track.expansion_type,
                        "Year already has an addition of this type, skipping"
                    );
                    continue;
                }

                let shortfall = required - track.virtual_capacity;
                let addition = round_up_to_block(shortfall, track.block);
                let estimated_capex = self.cost_model.estimate_capex(track.cost_type, addition)?;

                let item = ExpansionItem {
                    id: format!("EXP-{}-{}", track.expansion_type.tag(), entry.year),
                    year: entry.year,
                    expansion_type: track.expansion_type,
                    capacity_addition: addition,
                    estimated_capex,
                    trigger: format!(
                        "{} utilization {:.0}% in {}: demand {:.0} {unit} exceeds capacity {:.0} {unit}",
                        capitalize(track.commodity),
                        entry.utilization(track.commodity) * 100.0,
                        entry.year,
                        required,
                        track.virtual_capacity,
                        unit = track.commodity.unit(),
                    ),
                };
                info!(
                    year = item.year,
                    expansion_type = %item.expansion_type,
                    shortfall,
                    addition,
                    estimated_capex,
                    "Expansion proposed"
                );

                track.virtual_capacity += addition;
                plan.push(item);
            }
        }

        Ok(plan)
    }
}

fn capitalize(commodity: Commodity) -> &'static str {
    match commodity {
        Commodity::Oil => "Oil",
        Commodity::Gas => "Gas",
        Commodity::Water => "Water",
    }
}
