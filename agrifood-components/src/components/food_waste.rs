//! Consumer food waste reduction
//!
//! Consumption above the recommended daily energy intake is treated as waste.
//! At full ambition, energy intake in the final year falls to the recommended
//! intake; lower ambition levels remove the same fraction of the excess.

use crate::components::demand::{clamp_supply, commit_demand_change};
use agrifood_core::balance::{feed_scale, origins};
use agrifood_core::datablock::{Datablock, FoodQuantity};
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::items::Element;
use agrifood_core::outcome::{Degradation, Outcome};
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

/// Parameters for the waste reduction step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodWasteParameters {
    /// Ambition level
    /// unit: %
    pub waste_scale: FloatValue,
    /// Recommended daily energy intake
    /// unit: kCal/cap/day
    pub kcal_rda: FloatValue,
    /// Elements supplying the change in consumption
    pub source: Vec<Element>,
    pub elasticity: Option<Vec<FloatValue>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodWaste {
    parameters: FoodWasteParameters,
}

impl FoodWaste {
    pub fn from_parameters(parameters: FoodWasteParameters) -> Self {
        Self { parameters }
    }

    /// Fraction of final-year energy intake removed at full adoption.
    ///
    /// Intake already below the recommended level leaves nothing to remove.
    pub fn waste_factor(&self, intake: FloatValue, reasons: &mut Vec<Degradation>) -> FloatValue {
        let rda = self.parameters.kcal_rda;
        if intake < rda {
            reasons.push(Degradation::WasteBelowIntake {
                intake,
                recommended: rda,
            });
            return 0.0;
        }
        let factor = (intake - rda) / intake * self.parameters.waste_scale / 100.0;
        if factor.is_finite() {
            factor
        } else {
            0.0
        }
    }
}

#[typetag::serde]
impl Transformation for FoodWaste {
    fn phase(&self) -> StepPhase {
        StepPhase::ConsumerDemand
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        datablock.food.rda_kcal = Some(self.parameters.kcal_rda);
        let original = datablock.food.energy.clone();
        let intake = original.sum_items(Element::Food, None)?;
        let last = intake[intake.len() - 1];

        let mut reasons = vec![];
        let factor = self.waste_factor(last, &mut reasons);
        log::debug!("Removing {:.2}% of final-year food energy", factor * 100.0);

        let scale = datablock.adoption_curve(1.0, 1.0 - factor)?;
        let origins = origins(
            &self.parameters.source,
            true,
            self.parameters.elasticity.as_deref(),
        )?;
        let mut scaled = original.clone();
        scaled.scale_add(Element::Food, &origins, scale.view(), None)?;

        let mut out = feed_scale(&scaled, &original)?;
        clamp_supply(&mut out)?;

        reasons.extend(commit_demand_change(&mut datablock, FoodQuantity::Energy, &original, out)?);
        Ok(Outcome::new(datablock, reasons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrifood_core::example_data::example_datablock;
    use approx::assert_relative_eq;

    fn step(waste_scale: FloatValue, kcal_rda: FloatValue) -> FoodWaste {
        FoodWaste::from_parameters(FoodWasteParameters {
            waste_scale,
            kcal_rda,
            source: vec![Element::Production, Element::Imports],
            elasticity: Some(vec![0.5, 0.5]),
        })
    }

    fn intake(datablock: &Datablock, year_index: usize) -> FloatValue {
        datablock.food.energy.sum_items(Element::Food, None).unwrap()[year_index]
    }

    #[test]
    fn full_ambition_reaches_recommended_intake() {
        let datablock = example_datablock();
        let rda = intake(&datablock, 30) * 0.8;
        let out = step(100.0, rda).apply(datablock.clone()).unwrap();
        assert!(!out.is_degraded());
        let out = out.into_value();

        assert_relative_eq!(intake(&out, 30), rda, max_relative = 1e-9);
        assert_eq!(intake(&out, 0), intake(&datablock, 0));
        assert_eq!(out.food.rda_kcal, Some(rda));
    }

    #[test]
    fn weight_follows_energy() {
        let datablock = example_datablock();
        let rda = intake(&datablock, 30) * 0.9;
        let out = step(100.0, rda).apply(datablock.clone()).unwrap().into_value();

        let food = |d: &Datablock| d.food.weight.sum_items(Element::Food, None).unwrap()[30];
        assert_relative_eq!(food(&out), food(&datablock) * 0.9, max_relative = 1e-9);
    }

    #[test]
    fn intake_below_recommendation_degrades() {
        let datablock = example_datablock();
        let rda = intake(&datablock, 30) * 1.5;
        let out = step(50.0, rda).apply(datablock.clone()).unwrap();
        assert!(matches!(
            out.reasons(),
            [Degradation::WasteBelowIntake { .. }]
        ));
        assert_eq!(out.into_value().food.weight, datablock.food.weight);
    }
}
