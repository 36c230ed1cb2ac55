//! Sequestration and emissions aggregation

use crate::datablock::Datablock;
use crate::errors::AgrifoodResult;
use crate::items::Element;
use crate::timeseries::FloatValue;
use ndarray::{Array1, Axis};

/// Days per year used to annualise per-day quantities
pub const DAYS_PER_YEAR: FloatValue = 365.25;

/// Grams per gigatonne
pub const G_PER_GT: FloatValue = 1e15;

/// Append a named sequestration contribution to the datablock's ledger.
pub fn append_sequestration(
    datablock: &mut Datablock,
    source: &str,
    annual: Array1<FloatValue>,
) -> AgrifoodResult<()> {
    log::debug!("Appending sequestration from {}", source);
    datablock.impact.co2e_sequestration.append(source, annual)
}

/// Append a named cost contribution to the datablock's cost ledger.
pub fn append_cost(
    datablock: &mut Datablock,
    source: &str,
    annual: Array1<FloatValue>,
) -> AgrifoodResult<()> {
    datablock.impact.cost.append(source, annual)
}

/// Compute per-capita and annual emissions from weight and emission factors.
///
/// `g_co2e/year = g/cap/day * gco2e/gfood * population * 365.25`
pub fn compute_emissions(datablock: &mut Datablock) -> AgrifoodResult<()> {
    let weight = &datablock.food.weight;
    let factors = datablock.impact.emission_factors.aligned_to(weight)?;
    let per_capita = weight.multiply_by_item_year(factors.view())?;

    let population = datablock.population.over(weight.years())?;
    let mut annual = per_capita.clone();
    for (t, mut slice) in annual.values_mut().axis_iter_mut(Axis(1)).enumerate() {
        slice *= population[t] * DAYS_PER_YEAR;
    }

    datablock.food.emissions_per_capita = Some(per_capita);
    datablock.impact.emissions = Some(annual);
    Ok(())
}

/// Total annual production emissions, if computed
///
/// unit: g_co2e/year
pub fn production_emissions(datablock: &Datablock) -> Option<AgrifoodResult<Array1<FloatValue>>> {
    datablock
        .impact
        .emissions
        .as_ref()
        .map(|emissions| emissions.sum_items(Element::Production, None))
}
