//! Interfaces to the collaborators around the calculator

use agrifood_core::datablock::{ClimateProjection, Datablock};
use agrifood_core::errors::{AgrifoodError, AgrifoodResult};
use agrifood_core::impact::{production_emissions, G_PER_GT};
use agrifood_core::timeseries::{FloatValue, YearAxis};
use ndarray::{Array1, ArrayView1};

/// Tonnes per gigatonne
const T_PER_GT: FloatValue = 1e9;

/// Supplies the base-year datablock a scenario starts from.
///
/// Building the baseline is expensive, so implementations are free to cache
/// it. Every scenario evaluation starts from its own copy.
pub trait BaselineProvider {
    fn baseline(&self) -> AgrifoodResult<Datablock>;
}

/// Provider returning a fixed datablock
impl BaselineProvider for Datablock {
    fn baseline(&self) -> AgrifoodResult<Datablock> {
        Ok(self.clone())
    }
}

/// A climate model driven by net annual emissions
pub trait ClimateResponse {
    /// unit: Gt CO2e / yr
    fn respond(
        &self,
        years: &YearAxis,
        emissions: ArrayView1<FloatValue>,
    ) -> AgrifoodResult<ClimateProjection>;
}

/// Production emissions less sequestration
///
/// unit: Gt CO2e / yr
pub fn net_emissions(datablock: &Datablock) -> AgrifoodResult<Array1<FloatValue>> {
    let emissions = production_emissions(datablock).ok_or_else(|| {
        AgrifoodError::MissingData("emissions have not been computed".to_string())
    })??;
    let sequestration = datablock.impact.co2e_sequestration.total();
    Ok(emissions / G_PER_GT - sequestration / T_PER_GT)
}

/// Run the climate model on the scenario's net emissions and store its response
pub fn attach_climate(
    datablock: &mut Datablock,
    model: &dyn ClimateResponse,
) -> AgrifoodResult<()> {
    let emissions = net_emissions(datablock)?;
    let projection = model.respond(datablock.years(), emissions.view())?;
    projection.years.check_series(projection.temperature.len(), "temperature")?;
    datablock.impact.climate = Some(projection);
    Ok(())
}
