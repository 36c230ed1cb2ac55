//! Engineered carbon removals
//!
//! Each capture source has a technology, which sets its cost per tonne, and a
//! capacity. Capacity is either a fixed annual amount or derived from the area
//! of a land class. Removals are phased in with the adoption curve and recorded
//! in the sequestration and cost ledgers under the source name.

use agrifood_core::curve::linear_scale;
use agrifood_core::datablock::Datablock;
use agrifood_core::errors::{AgrifoodError, AgrifoodResult};
use agrifood_core::impact::{append_cost, append_sequestration};
use agrifood_core::outcome::Outcome;
use agrifood_core::spatial::LandClass;
use agrifood_core::timeseries::{FloatValue, Year};
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

/// Capture rate of land growing BECCS feedstock
/// unit: t CO2e / ha / yr
pub const LAND_BECCS_RATE: FloatValue = 23.5;

/// Years at which the technology costs are quoted
const COST_YEARS: (Year, Year) = (2030, 2050);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureTechnology {
    Beccs,
    Daccs,
}

impl CaptureTechnology {
    /// Cost per tonne captured in 2030 and in 2050
    /// unit: GBP / t CO2e
    pub fn cost_per_tonne(&self) -> (FloatValue, FloatValue) {
        match self {
            CaptureTechnology::Beccs => (123.0, 93.0),
            CaptureTechnology::Daccs => (245.0, 180.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureCapacity {
    /// unit: t CO2e / yr
    Fixed(FloatValue),
    /// Capacity proportional to the area of a land class
    Land {
        class: LandClass,
        /// unit: t CO2e / ha / yr
        rate: FloatValue,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptureSource {
    pub name: String,
    pub technology: CaptureTechnology,
    pub capacity: CaptureCapacity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CcsParameters {
    pub sources: Vec<CaptureSource>,
}

impl CcsParameters {
    /// BECCS from waste, overseas biomass and land, plus DACCS.
    ///
    /// Fixed capacities are in t CO2e / yr. Land-based BECCS is sized from the
    /// BECCS land class.
    pub fn uk_default(waste: FloatValue, overseas: FloatValue, daccs: FloatValue) -> Self {
        let source = |name: &str, technology, capacity| CaptureSource {
            name: name.to_string(),
            technology,
            capacity,
        };
        Self {
            sources: vec![
                source("BECCS from waste", CaptureTechnology::Beccs, CaptureCapacity::Fixed(waste)),
                source(
                    "BECCS from overseas biomass",
                    CaptureTechnology::Beccs,
                    CaptureCapacity::Fixed(overseas),
                ),
                source(
                    "BECCS from land",
                    CaptureTechnology::Beccs,
                    CaptureCapacity::Land {
                        class: LandClass::Beccs,
                        rate: LAND_BECCS_RATE,
                    },
                ),
                source("DACCS", CaptureTechnology::Daccs, CaptureCapacity::Fixed(daccs)),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ccs {
    parameters: CcsParameters,
}

impl Ccs {
    pub fn from_parameters(parameters: CcsParameters) -> Self {
        Self { parameters }
    }

    fn capacity(source: &CaptureSource, datablock: &Datablock) -> AgrifoodResult<FloatValue> {
        let capacity = match &source.capacity {
            CaptureCapacity::Fixed(value) => *value,
            CaptureCapacity::Land { class, rate } => {
                datablock.land.percentage_land_use.area_ha(*class) * rate
            }
        };
        if capacity.is_finite() && capacity >= 0.0 {
            Ok(capacity)
        } else {
            Err(AgrifoodError::invalid_parameter(
                &source.name,
                format!("capture capacity must be non-negative, got {}", capacity),
            ))
        }
    }
}

#[typetag::serde]
impl Transformation for Ccs {
    fn phase(&self) -> StepPhase {
        StepPhase::Technology
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let years = *datablock.years();
        let adoption = datablock.adoption_curve(0.0, 1.0)?;

        for source in &self.parameters.sources {
            let capacity = Self::capacity(source, &datablock)?;
            log::debug!("{}: {:.3e} t CO2e / yr", source.name, capacity);

            let (cost_start, cost_end) = source.technology.cost_per_tonne();
            let cost_per_tonne = linear_scale(
                years.start(),
                COST_YEARS.0,
                COST_YEARS.1,
                years.end(),
                cost_start,
                cost_end,
            );
            let removals = &adoption * capacity;
            let cost = &removals * &cost_per_tonne;
            append_sequestration(&mut datablock, &source.name, removals)?;
            append_cost(&mut datablock, &source.name, cost)?;
        }
        Ok(Outcome::Ok(datablock))
    }
}
