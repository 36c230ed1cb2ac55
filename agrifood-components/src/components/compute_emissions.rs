//! Final emissions aggregation

use agrifood_core::datablock::Datablock;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::impact::compute_emissions;
use agrifood_core::outcome::Outcome;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

/// Compute per-capita and annual emissions from the final weights and emission factors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComputeEmissions {}

impl ComputeEmissions {
    pub fn new() -> Self {
        Self {}
    }
}

#[typetag::serde]
impl Transformation for ComputeEmissions {
    fn phase(&self) -> StepPhase {
        StepPhase::Aggregation
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        compute_emissions(&mut datablock)?;
        Ok(Outcome::Ok(datablock))
    }
}
