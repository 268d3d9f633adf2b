//! Shared data structures exchanged with the planning collaborators
//!
//! - Inputs: FacilityDesign, ProductionProfile, ProjectInfo, scenario parameters
//! - Capacity: CapacityAnalysisEntry / CapacityAnalysis (utilization charts)
//! - Expansion: ExpansionItem (roadmap and timeline displays)
//! - Economics: Scenario, ScenarioResult (comparison tables and ranking)
//!
//! Every record here is plain, serializable data with no references back
//! into engine internals.

mod facility;
mod capacity;
mod expansion;
mod scenario;

pub use facility::*;
pub use capacity::*;
pub use expansion::*;
pub use scenario::*;
