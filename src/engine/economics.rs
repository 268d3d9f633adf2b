//! Scenario Economics Evaluator
//!
//! Yearly cashflow ($M) for a scenario against the shared expansion plan:
//!
//! ```text
//! revenue = (oil × 365 × oil_price + gas × 1000 × 365 × gas_price) / 1e6
//! capex   = Σ plan capex in that year × capex_multiplier / 1e6
//! opex    = (oil + gas × 100) × 365 × 5 × opex_multiplier / 1e6
//! net     = revenue − capex − opex
//! ```
//!
//! NPV discounts period `i` as year `i + 1`. IRR and break-even price are
//! fixed heuristics, not solved values:
//!
//! ```text
//! irr        = 15 + (npv / capex) × 5        when npv > 0
//!            = 5 − (|npv| / capex) × 2       otherwise
//! break_even = (capex × 1e6 + Σ oil × 365 × 5) / Σ oil × 365
//! ```

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::config::{defaults, EconomicsConfig};
use crate::error::PlanningError;
use crate::types::{
    ExpansionItem, ParameterOverrides, PeriodCashflow, ProductionPeriod, Scenario,
    ScenarioParameters, ScenarioResult, ScenarioStatus,
};

/// Round to `decimals` decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Approximate IRR (percent) from NPV and total CAPEX, both in $M.
///
/// The ratio term is `|npv| / total_capex`. With no CAPEX that division is
/// undefined, so the term is taken as zero and the result is exactly the
/// positive or negative base rate. This zero-CAPEX guard is a local
/// convention, not part of the heuristic itself.
pub fn approximate_irr(npv: f64, total_capex: f64) -> f64 {
    let ratio = if total_capex > 0.0 { npv.abs() / total_capex } else { 0.0 };
    if npv > 0.0 {
        defaults::IRR_POSITIVE_BASE + ratio * defaults::IRR_POSITIVE_SLOPE
    } else {
        defaults::IRR_NEGATIVE_BASE - ratio * defaults::IRR_NEGATIVE_SLOPE
    }
}

/// Net present value of yearly cashflows; the first period is discounted one year.
pub fn net_present_value(cashflows: &[f64], discount_rate_percent: f64) -> f64 {
    let factor = 1.0 + discount_rate_percent / 100.0;
    cashflows
        .iter()
        .zip(1..)
        .map(|(cf, year)| cf / factor.powi(year))
        .sum()
}

pub struct ScenarioEvaluator<'a> {
    config: &'a EconomicsConfig,
}

impl<'a> ScenarioEvaluator<'a> {
    pub const fn new(config: &'a EconomicsConfig) -> Self {
        Self { config }
    }

    /// New Draft scenario with `overrides` merged over the configured defaults.
    pub fn create_scenario(&self, name: &str, description: &str, overrides: &ParameterOverrides) -> Scenario {
        Scenario {
            scenario_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            parameters: overrides.apply(self.config.scenario_defaults()),
            results: None,
            status: ScenarioStatus::Draft,
            created_at: Utc::now(),
            last_run: None,
        }
    }

    /// Evaluate `params` over `profile` with the capex timing of `plan`.
    ///
    /// Fails with `InvalidInput` when the parameters drive NPV non-finite
    /// (e.g. a discount rate of -100%).
    pub fn evaluate(
        &self,
        params: &ScenarioParameters,
        profile: &[ProductionPeriod],
        plan: &[ExpansionItem],
    ) -> Result<ScenarioResult, PlanningError> {
        let c = self.config;
        let mut cashflows = Vec::with_capacity(profile.len());
        let mut total_capex = 0.0;
        let mut peak_oil_rate: f64 = 0.0;
        let mut peak_gas_rate: f64 = 0.0;
        let mut oil_opex_dollars = 0.0;
        let mut oil_volume_bbl = 0.0;

        for period in profile {
            let revenue = (period.oil_rate_bpd * c.days_per_year * params.oil_price
                + period.gas_rate_mmscfd * c.mcf_per_mmscf * c.days_per_year * params.gas_price)
                / defaults::DOLLARS_PER_MILLION;

            let year_capex: f64 = plan
                .iter()
                .filter(|item| item.year == period.year)
                .map(|item| item.estimated_capex)
                .sum();
            let capex = year_capex * params.capex_multiplier / defaults::DOLLARS_PER_MILLION;
            total_capex += capex;

            let opex = (period.oil_rate_bpd + period.gas_rate_mmscfd * c.gas_boe_factor)
                * c.days_per_year
                * c.opex_per_boe
                * params.opex_multiplier
                / defaults::DOLLARS_PER_MILLION;

            let net_cashflow = revenue - capex - opex;
            cashflows.push(PeriodCashflow {
                year: period.year,
                revenue,
                capex,
                opex,
                net_cashflow,
            });

            peak_oil_rate = peak_oil_rate.max(period.oil_rate_bpd);
            peak_gas_rate = peak_gas_rate.max(period.gas_rate_mmscfd);
            oil_opex_dollars += period.oil_rate_bpd * c.days_per_year * c.opex_per_boe;
            oil_volume_bbl += period.oil_rate_bpd * c.days_per_year;
        }

        let net: Vec<f64> = cashflows.iter().map(|cf| cf.net_cashflow).collect();
        let npv = net_present_value(&net, params.discount_rate);
        if !npv.is_finite() {
            return Err(PlanningError::InvalidInput(format!(
                "NPV is not finite for discount rate {}%",
                params.discount_rate
            )));
        }

        let irr = approximate_irr(npv, total_capex);
        let break_even_oil_price = if oil_volume_bbl > 0.0 {
            (total_capex * defaults::DOLLARS_PER_MILLION + oil_opex_dollars) / oil_volume_bbl
        } else {
            0.0
        };

        debug!(
            periods = profile.len(),
            npv,
            irr,
            total_capex,
            break_even_oil_price,
            "Scenario economics evaluated"
        );

        Ok(ScenarioResult {
            npv: npv.round(),
            irr: round_to(irr, 1),
            total_capex: total_capex.round(),
            peak_oil_rate,
            peak_gas_rate,
            break_even_oil_price: round_to(break_even_oil_price, 2),
            expansion_count: plan.len(),
            cashflows,
        })
    }
}
