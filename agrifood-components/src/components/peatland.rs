//! Peatland restoration
//!
//! Restores a fraction of the selected land classes lying on peat soils. The
//! restored area leaves production, so the items grown on it lose domestic
//! production capacity in proportion and imports make up the difference.

use agrifood_core::datablock::Datablock;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::items::ItemSelector;
use agrifood_core::land::{cap_fraction, convert_land, shift_production, ProductionShift};
use agrifood_core::outcome::Outcome;
use agrifood_core::spatial::{LandClass, MaskSelector};
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

/// Parameters for the peatland restoration step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeatlandParameters {
    /// Fraction of the selected land restored
    pub restore_fraction: FloatValue,
    /// Classes the restored land is taken from
    pub land_types: Vec<LandClass>,
    /// Items produced on the restored land
    pub items: ItemSelector,
    /// Cells lying on peat, every cell if not set
    pub mask: Option<MaskSelector>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peatland {
    parameters: PeatlandParameters,
}

impl Peatland {
    pub fn from_parameters(parameters: PeatlandParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Transformation for Peatland {
    fn phase(&self) -> StepPhase {
        StepPhase::LandUse
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let mut reasons = vec![];
        let fraction = cap_fraction(self.parameters.restore_fraction, 1.0, &mut reasons);
        let mask = datablock.land.mask(self.parameters.mask.as_ref())?;

        let conversion = convert_land(
            &mut datablock.land.percentage_land_use,
            &self.parameters.land_types,
            LandClass::Peatland,
            fraction,
            mask.as_ref(),
        )?;
        log::debug!(
            "Restored {:.2}% of cell area to peatland, capacity {:.4}",
            conversion.moved_total(),
            conversion.scale
        );

        let items = self.parameters.items.resolve(datablock.food.weight.items())?;
        shift_production(
            &mut datablock,
            &[ProductionShift::against_imports(items, conversion.scale)],
            false,
        )?;
        Ok(Outcome::new(datablock, reasons))
    }
}
