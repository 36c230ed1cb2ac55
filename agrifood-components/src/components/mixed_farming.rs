//! Mixed farming
//!
//! Integrates livestock onto arable land. Crop production on the converted
//! land falls to a fraction of its previous level, while livestock kept on it
//! adds to the production otherwise supported by pasture. Additional livestock
//! production is exported.

use agrifood_core::datablock::Datablock;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::items::{ItemId, ItemOrigin, ItemSelector};
use agrifood_core::land::{cap_fraction, convert_land, shift_production, ProductionShift};
use agrifood_core::outcome::Outcome;
use agrifood_core::spatial::LandClass;
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

/// Parameters for the mixed farming step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MixedFarmingParameters {
    /// Fraction of the crop land converted
    pub fraction: FloatValue,
    /// Crop land classes
    pub land_types: Vec<LandClass>,
    /// Classes supporting the livestock items
    pub secondary_land_types: Vec<LandClass>,
    pub primary_items: ItemSelector,
    /// Crop production retained on converted land
    pub primary_scale: FloatValue,
    pub secondary_items: ItemSelector,
    /// Livestock production of converted land relative to the secondary classes
    pub secondary_scale: FloatValue,
}

impl Default for MixedFarmingParameters {
    fn default() -> Self {
        Self {
            fraction: 0.0,
            land_types: LandClass::CROP_LAND.to_vec(),
            secondary_land_types: LandClass::GRAZING_LAND.to_vec(),
            primary_items: ItemSelector::Origin(ItemOrigin::VegetalProducts),
            primary_scale: 0.8,
            secondary_items: ItemSelector::Items(vec![ItemId(2731), ItemId(2732)]),
            secondary_scale: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixedFarming {
    parameters: MixedFarmingParameters,
}

impl MixedFarming {
    pub fn from_parameters(parameters: MixedFarmingParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Transformation for MixedFarming {
    fn phase(&self) -> StepPhase {
        StepPhase::LandUse
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let p = &self.parameters;
        let mut reasons = vec![];
        let fraction = cap_fraction(p.fraction, 1.0, &mut reasons);

        let land = &mut datablock.land.percentage_land_use;
        let old = land.classes_total(&p.land_types);
        let conversion =
            convert_land(land, &p.land_types, LandClass::MixedFarming, fraction, None)?;
        let moved = conversion.moved_total();
        let secondary_area = land.classes_total(&p.secondary_land_types);

        let converted = if old > 0.0 { moved / old } else { 0.0 };
        let primary_scale = 1.0 - converted + converted * p.primary_scale;
        let secondary_scale = if secondary_area > 0.0 {
            1.0 + moved / secondary_area * p.secondary_scale
        } else {
            1.0
        };
        log::debug!(
            "Mixed farming crop capacity {:.4}, livestock capacity {:.4}",
            primary_scale,
            secondary_scale
        );

        let weight = &datablock.food.weight;
        let primary = p.primary_items.resolve(weight.items())?;
        let secondary = p.secondary_items.resolve(weight.items())?;
        let shifts = [
            ProductionShift::against_imports(primary, primary_scale),
            ProductionShift::against_exports(secondary, secondary_scale),
        ];
        shift_production(&mut datablock, &shifts, false)?;
        Ok(Outcome::new(datablock, reasons))
    }
}
