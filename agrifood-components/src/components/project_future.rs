//! Projection of the base year onto future years
//!
//! Per-capita quantities and emission factors are held constant. Domestic
//! production can optionally be held constant in absolute terms, in which case
//! per-capita production falls as the population grows and imports supply the
//! difference.

use agrifood_core::balance::Origin;
use agrifood_core::datablock::{Datablock, FoodQuantity};
use agrifood_core::errors::{AgrifoodError, AgrifoodResult};
use agrifood_core::items::Element;
use agrifood_core::outcome::Outcome;
use agrifood_core::propagate::safe_ratio;
use agrifood_core::timeseries::{FloatValue, Year};
use agrifood_core::transformation::{StepPhase, Transformation};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Annual production retained under climate-change decline
const CLIMATE_DECLINE_RATE: FloatValue = 0.99;

/// Parameters for the future projection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFutureParameters {
    /// Last projected year, the last population year if not set
    pub end_year: Option<Year>,
    /// Keep absolute domestic production at its base-year level
    pub hold_production: bool,
    /// Reduce production by 1% per year after the pivot year
    pub climate_decline: bool,
}

impl Default for ProjectFutureParameters {
    fn default() -> Self {
        Self {
            end_year: None,
            hold_production: true,
            climate_decline: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFuture {
    parameters: ProjectFutureParameters,
}

impl ProjectFuture {
    pub fn from_parameters(parameters: ProjectFutureParameters) -> Self {
        Self { parameters }
    }

    /// Divisor applied to per-capita production and exports for every year
    fn production_divisor(
        &self,
        datablock: &Datablock,
        base_end: Year,
    ) -> AgrifoodResult<Array1<FloatValue>> {
        let years = *datablock.years();
        let pivot = datablock.global_parameters.pivot_year;
        let base_population = datablock.population.at(base_end)?;

        years
            .iter()
            .map(|year| -> AgrifoodResult<FloatValue> {
                let mut divisor = 1.0;
                if self.parameters.hold_production && year > base_end {
                    divisor *= datablock.population.at(year)? / base_population;
                }
                if self.parameters.climate_decline && year >= pivot {
                    divisor /= CLIMATE_DECLINE_RATE.powi(year - pivot);
                }
                Ok(divisor)
            })
            .collect()
    }
}

#[typetag::serde]
impl Transformation for ProjectFuture {
    fn phase(&self) -> StepPhase {
        StepPhase::Projection
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let base_end = datablock.years().end();
        let end = self
            .parameters
            .end_year
            .unwrap_or_else(|| datablock.population.years().end());
        if end < base_end {
            return Err(AgrifoodError::invalid_parameter(
                "end_year",
                format!("{} is before the last base year {}", end, base_end),
            ));
        }
        log::debug!("Projecting from {} to {}", base_end, end);

        for quantity in FoodQuantity::ALL {
            datablock.food.quantity_mut(quantity).extend_years(end)?;
        }
        let factors = &mut datablock.food.nutrient_factors;
        for table in [&mut factors.protein, &mut factors.fat, &mut factors.energy] {
            table.extend_years(end)?;
        }
        datablock.impact.emission_factors.extend_years(end)?;
        datablock.impact.co2e_sequestration.extend_years(end)?;
        datablock.impact.cost.extend_years(end)?;

        let scale = self
            .production_divisor(&datablock, base_end)?
            .mapv(|divisor| safe_ratio(1.0, divisor));

        for quantity in FoodQuantity::ALL {
            let table = datablock.food.quantity_mut(quantity);
            table.scale_add(
                Element::Production,
                &[Origin::subtracting(Element::Imports)],
                scale.view(),
                None,
            )?;
            table.scale_add(
                Element::Exports,
                &[Origin::adding(Element::Imports)],
                scale.view(),
                None,
            )?;
        }
        datablock.validate()?;
        Ok(Outcome::Ok(datablock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrifood_core::example_data::example_base_year;
    use agrifood_core::items::ItemId;
    use approx::assert_relative_eq;

    #[test]
    fn constant_per_capita_values() {
        let step = ProjectFuture::from_parameters(ProjectFutureParameters {
            hold_production: false,
            ..Default::default()
        });
        let baseline = example_base_year();
        let out = step.apply(baseline.clone()).unwrap().into_value();

        assert_eq!(out.years().end(), 2050);
        for element in Element::ALL {
            assert_eq!(
                out.food.weight.get(ItemId(2511), 2050, element).unwrap(),
                baseline.food.weight.get(ItemId(2511), 2020, element).unwrap()
            );
        }
        assert_eq!(
            out.impact.emission_factors.get(ItemId(2731), 2045).unwrap(),
            baseline.impact.emission_factors.get(ItemId(2731), 2020).unwrap()
        );
    }

    #[test]
    fn absolute_production_is_held() {
        let step = ProjectFuture::from_parameters(ProjectFutureParameters::default());
        let out = step.apply(example_base_year()).unwrap().into_value();

        let production = |year| {
            out.food.weight.get(ItemId(2511), year, Element::Production).unwrap()
                * out.population.at(year).unwrap()
        };
        assert_relative_eq!(production(2050), production(2020), max_relative = 1e-12);

        // Food is unchanged, the shortfall comes from imports
        let food = |year| out.food.weight.get(ItemId(2511), year, Element::Food).unwrap();
        assert_eq!(food(2050), food(2020));
        assert!(out.food.weight.balance_residual().iter().all(|r| r.abs() < 1e-9));
    }

    #[test]
    fn climate_decline_compounds() {
        let step = ProjectFuture::from_parameters(ProjectFutureParameters {
            hold_production: false,
            climate_decline: true,
            ..Default::default()
        });
        let out = step.apply(example_base_year()).unwrap().into_value();
        let production =
            |year| out.food.weight.get(ItemId(2511), year, Element::Production).unwrap();

        assert_eq!(production(2021), production(2020));
        assert_relative_eq!(production(2031), 600.0 * 0.99_f64.powi(10), max_relative = 1e-12);
    }

    #[test]
    fn end_before_base_fails() {
        let step = ProjectFuture::from_parameters(ProjectFutureParameters {
            end_year: Some(2010),
            ..Default::default()
        });
        assert!(matches!(
            step.apply(example_base_year()),
            Err(AgrifoodError::InvalidParameter { .. })
        ));
    }
}
