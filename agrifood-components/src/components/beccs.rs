//! Bioenergy crops on farm land
//!
//! Repurposes a fraction of farm land for BECCS feedstock. The land class is
//! read later by the carbon capture step to size land-based capture.

use agrifood_core::datablock::Datablock;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::items::{ItemOrigin, ItemSelector};
use agrifood_core::land::{cap_fraction, convert_land, shift_production, ProductionShift};
use agrifood_core::outcome::Outcome;
use agrifood_core::spatial::{LandClass, MaskSelector};
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

/// Parameters for the BECCS land step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeccsLandParameters {
    /// Fraction of the selected farm land used for BECCS crops
    pub farm_fraction: FloatValue,
    pub land_types: Vec<LandClass>,
    /// Items losing production capacity
    pub items: ItemSelector,
    pub mask: Option<MaskSelector>,
}

impl Default for BeccsLandParameters {
    fn default() -> Self {
        Self {
            farm_fraction: 0.0,
            land_types: vec![LandClass::Arable],
            items: ItemSelector::Origin(ItemOrigin::VegetalProducts),
            mask: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeccsLand {
    parameters: BeccsLandParameters,
}

impl BeccsLand {
    pub fn from_parameters(parameters: BeccsLandParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Transformation for BeccsLand {
    fn phase(&self) -> StepPhase {
        StepPhase::LandUse
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let mut reasons = vec![];
        let fraction = cap_fraction(self.parameters.farm_fraction, 1.0, &mut reasons);
        let mask = datablock.land.mask(self.parameters.mask.as_ref())?;

        let conversion = convert_land(
            &mut datablock.land.percentage_land_use,
            &self.parameters.land_types,
            LandClass::Beccs,
            fraction,
            mask.as_ref(),
        )?;

        let items = self.parameters.items.resolve(datablock.food.weight.items())?;
        shift_production(
            &mut datablock,
            &[ProductionShift::against_imports(items, conversion.scale)],
            false,
        )?;
        Ok(Outcome::new(datablock, reasons))
    }
}
