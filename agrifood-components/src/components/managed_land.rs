//! Soil carbon management
//!
//! Moves a fraction of arable land and pasture into managed classes. Managed
//! land keeps producing as before.

use agrifood_core::datablock::Datablock;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::land::{cap_fraction, convert_land};
use agrifood_core::outcome::Outcome;
use agrifood_core::spatial::LandClass;
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedLandParameters {
    /// Fraction of arable land and pasture placed under management
    pub managed_fraction: FloatValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedLand {
    parameters: ManagedLandParameters,
}

impl ManagedLand {
    pub fn from_parameters(parameters: ManagedLandParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Transformation for ManagedLand {
    fn phase(&self) -> StepPhase {
        StepPhase::LandUse
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let mut reasons = vec![];
        let fraction = cap_fraction(self.parameters.managed_fraction, 1.0, &mut reasons);
        let land = &mut datablock.land.percentage_land_use;
        convert_land(land, &[LandClass::Arable], LandClass::ManagedArable, fraction, None)?;
        convert_land(land, &LandClass::PASTURE, LandClass::ManagedPasture, fraction, None)?;
        Ok(Outcome::new(datablock, reasons))
    }
}
