//! Vertical farming
//!
//! Moves production of the selected crops indoors. The crop land they used
//! is released to woodland while production stays the same.

use agrifood_core::datablock::Datablock;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::items::{Element, ItemOrigin, ItemSelector};
use agrifood_core::outcome::Outcome;
use agrifood_core::propagate::safe_ratio;
use agrifood_core::spatial::LandClass;
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZeroLandParameters {
    /// Crops eligible for vertical farming
    pub items: ItemSelector,
    /// Share of their production moved indoors
    pub reduction_fraction: FloatValue,
    /// Classes releasing the land
    #[serde(default = "default_land_types")]
    pub land_types: Vec<LandClass>,
}

fn default_land_types() -> Vec<LandClass> {
    LandClass::CROP_LAND.to_vec()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZeroLand {
    parameters: ZeroLandParameters,
}

impl ZeroLand {
    pub fn from_parameters(parameters: ZeroLandParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Transformation for ZeroLand {
    fn phase(&self) -> StepPhase {
        StepPhase::FarmingPractice
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let weight = &datablock.food.weight;
        let vegetal = weight.items_with_origin(ItemOrigin::VegetalProducts);
        let items: Vec<_> = self
            .parameters
            .items
            .resolve(weight.items())?
            .into_iter()
            .filter(|item| vegetal.contains(item))
            .collect();
        if items.is_empty() {
            log::debug!("No crops selected for vertical farming");
            return Ok(Outcome::Ok(datablock));
        }

        // Released share of the land class follows the crops' share of vegetal production
        let last = datablock.years().len() - 1;
        let selected = weight.sum_items(Element::Production, Some(&items))?[last];
        let total = weight.sum_origin(Element::Production, ItemOrigin::VegetalProducts)[last];
        let adoption = datablock.adoption_curve(1.0, self.parameters.reduction_fraction)?[last];
        let share = safe_ratio(selected * adoption, total);
        let share = if total > 0.0 { share.clamp(0.0, 1.0) } else { 0.0 };
        log::debug!(
            "Releasing {:.2}% of {:?} to woodland",
            share * 100.0,
            self.parameters.land_types
        );

        let ratio = datablock.global_parameters.broadleaf_conifer_ratio;
        datablock.land.percentage_land_use.move_fraction_split(
            &self.parameters.land_types,
            &[
                (LandClass::BroadleafWoodland, ratio),
                (LandClass::ConiferousWoodland, 1.0 - ratio),
            ],
            share,
            None,
        )?;
        Ok(Outcome::Ok(datablock))
    }
}
