//! Production changes from farming practice
//!
//! Some practices cost yield. Lost domestic production of the selected items is
//! made up by imports.

use agrifood_core::datablock::Datablock;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::items::ItemSelector;
use agrifood_core::land::{shift_production, ProductionShift};
use agrifood_core::outcome::Outcome;
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleProductionParameters {
    pub items: ItemSelector,
    /// Production scale after full adoption
    pub scale: FloatValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleProduction {
    parameters: ScaleProductionParameters,
}

impl ScaleProduction {
    pub fn from_parameters(parameters: ScaleProductionParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Transformation for ScaleProduction {
    fn phase(&self) -> StepPhase {
        StepPhase::FarmingPractice
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let items = self.parameters.items.resolve(datablock.food.weight.items())?;
        if items.is_empty() {
            return Ok(Outcome::Ok(datablock));
        }
        shift_production(
            &mut datablock,
            &[ProductionShift::against_imports(items, self.parameters.scale)],
            false,
        )?;
        Ok(Outcome::Ok(datablock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrifood_core::example_data::example_datablock;
    use agrifood_core::items::{Element, ItemId};
    use approx::assert_relative_eq;

    #[test]
    fn lost_production_is_imported() {
        let datablock = example_datablock();
        let step = ScaleProduction::from_parameters(ScaleProductionParameters {
            items: ItemSelector::items([2733_u32]),
            scale: 0.9,
        });
        let out = step.apply(datablock.clone()).unwrap().into_value();

        let pig = |d: &Datablock, element| d.food.weight.get(ItemId(2733), 2050, element).unwrap();
        assert_relative_eq!(pig(&out, Element::Production), 27.0, max_relative = 1e-12);
        assert_relative_eq!(pig(&out, Element::Imports), 33.0, max_relative = 1e-12);
        assert_eq!(pig(&out, Element::Food), pig(&datablock, Element::Food));
        assert!(out.food.weight.balance_residual().iter().all(|r| r.abs() < 1e-9));
    }
}
