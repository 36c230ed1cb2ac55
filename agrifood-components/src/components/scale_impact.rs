//! Emission factor changes from farming practice
//!
//! Methane inhibitors, manure management and similar practices reduce the
//! emissions intensity of selected items without changing how much is produced.

use agrifood_core::datablock::Datablock;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::items::ItemSelector;
use agrifood_core::outcome::Outcome;
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleImpactParameters {
    pub items: ItemSelector,
    /// Emission factor scale after full adoption
    pub scale: FloatValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleImpact {
    parameters: ScaleImpactParameters,
}

impl ScaleImpact {
    pub fn from_parameters(parameters: ScaleImpactParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Transformation for ScaleImpact {
    fn phase(&self) -> StepPhase {
        StepPhase::FarmingPractice
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let items = self
            .parameters
            .items
            .resolve(datablock.impact.emission_factors.items())?;
        if items.is_empty() {
            return Ok(Outcome::Ok(datablock));
        }
        let scale = datablock.adoption_curve(1.0, self.parameters.scale)?;
        datablock
            .impact
            .emission_factors
            .scale_items(&items, scale.view())?;
        Ok(Outcome::Ok(datablock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrifood_core::example_data::example_datablock;
    use agrifood_core::items::ItemId;
    use approx::assert_relative_eq;

    #[test]
    fn emission_factors_are_phased_down() {
        let datablock = example_datablock();
        let step = ScaleImpact::from_parameters(ScaleImpactParameters {
            items: ItemSelector::items([2731_u32, 2732]),
            scale: 0.7,
        });
        let out = step.apply(datablock.clone()).unwrap().into_value();

        let factor =
            |d: &Datablock, item, year| d.impact.emission_factors.get(ItemId(item), year).unwrap();
        assert_relative_eq!(factor(&out, 2731, 2050), 0.7 * 16.94, max_relative = 1e-12);
        assert_eq!(factor(&out, 2731, 2020), 16.94);
        assert_eq!(factor(&out, 2733, 2050), factor(&datablock, 2733, 2050));
        assert_eq!(out.food, datablock.food);
    }

    #[test]
    fn empty_group_is_a_no_op() {
        let datablock = example_datablock();
        let step = ScaleImpact::from_parameters(ScaleImpactParameters {
            items: ItemSelector::groups(["Pulses"]),
            scale: 0.5,
        });
        let out = step.apply(datablock.clone()).unwrap().into_value();
        assert_eq!(out.impact, datablock.impact);
    }
}
