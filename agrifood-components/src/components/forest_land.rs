//! Afforestation and deforestation
//!
//! A positive forest fraction converts pasture to woodland. A negative fraction
//! converts woodland back to pasture and arable land in proportion to how much
//! of each the selected cells hold. In both cases production of the items grown
//! on the affected land follows the change in area.

use agrifood_core::datablock::Datablock;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::items::ItemOrigin;
use agrifood_core::land::{land_scale_factor, shift_production, ProductionShift};
use agrifood_core::outcome::{Degradation, Outcome};
use agrifood_core::spatial::{LandClass, LandUse, MaskSelector};
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

const AGRICULTURAL: [LandClass; 3] = [
    LandClass::ImprovedGrassland,
    LandClass::SemiNaturalGrassland,
    LandClass::Arable,
];

/// Parameters for the forest land step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestLandParameters {
    /// Change in forested share of the total land
    /// unit: fraction
    pub forest_fraction: FloatValue,
    /// Cells eligible for conversion, every cell if not set
    pub mask: Option<MaskSelector>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestLand {
    parameters: ForestLandParameters,
}

impl ForestLand {
    pub fn from_parameters(parameters: ForestLandParameters) -> Self {
        Self { parameters }
    }
}

/// Largest fraction of agricultural land which can be replaced from woodland
/// without any woodland class turning negative.
fn max_reforestable_fraction(
    land: &LandUse,
    mask: Option<&Array2<bool>>,
    broadleaf_ratio: FloatValue,
) -> FloatValue {
    let mut agricultural: Array2<FloatValue> = Array2::zeros(land.grid().shape());
    for class in AGRICULTURAL {
        Zip::from(&mut agricultural)
            .and(land.class(class))
            .for_each(|a, &v| {
                if v.is_finite() {
                    *a += v
                }
            });
    }
    let selected = |i: usize, j: usize| mask.map_or(true, |m| m[[i, j]]);

    let mut limit = FloatValue::INFINITY;
    for ((i, j), &agri) in agricultural.indexed_iter() {
        if !selected(i, j) || agri <= 0.0 {
            continue;
        }
        for (class, share) in [
            (LandClass::BroadleafWoodland, broadleaf_ratio),
            (LandClass::ConiferousWoodland, 1.0 - broadleaf_ratio),
        ] {
            let available = land.class(class)[[i, j]];
            if share > 0.0 && available.is_finite() {
                limit = limit.min(available / (share * agri));
            }
        }
    }
    limit
}

#[typetag::serde]
impl Transformation for ForestLand {
    fn phase(&self) -> StepPhase {
        StepPhase::LandUse
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let fraction = self.parameters.forest_fraction;
        if fraction == 0.0 {
            return Ok(Outcome::Ok(datablock));
        }
        let broadleaf_ratio = datablock.global_parameters.broadleaf_conifer_ratio;
        let mask = datablock.land.mask(self.parameters.mask.as_ref())?;
        let woodland = [
            (LandClass::BroadleafWoodland, broadleaf_ratio),
            (LandClass::ConiferousWoodland, 1.0 - broadleaf_ratio),
        ];

        let land = &mut datablock.land.percentage_land_use;
        let old_pasture = land.classes_total(&LandClass::PASTURE);
        let old_arable = land.class_total(LandClass::Arable);
        let total = land.total();
        let pasture = land.masked_total(&LandClass::PASTURE, mask.as_ref());
        let arable = land.masked_total(&[LandClass::Arable], mask.as_ref());

        let mut reasons = vec![];
        if fraction > 0.0 {
            // Every selected pasture cell loses the same share of its pasture
            let requested = fraction * total / pasture;
            let applied = if requested.is_finite() { requested.min(1.0) } else { 0.0 };
            if applied != requested {
                reasons.push(Degradation::LandFractionCapped {
                    requested: fraction,
                    applied: applied * pasture / total,
                });
            }
            land.move_fraction_split(&LandClass::PASTURE, &woodland, applied, mask.as_ref())?;
        } else {
            // Pasture and arable cells gain the same share back from woodland
            let requested = fraction * total / (pasture + arable);
            let limit = max_reforestable_fraction(land, mask.as_ref(), broadleaf_ratio);
            let applied = if requested.is_finite() { requested.max(-limit) } else { 0.0 };
            if applied != requested {
                reasons.push(Degradation::LandFractionCapped {
                    requested: fraction,
                    applied: applied * (pasture + arable) / total,
                });
            }
            land.move_fraction_split(&AGRICULTURAL, &woodland, applied, mask.as_ref())?;
        }
        for reason in &reasons {
            log::warn!("{}", reason);
        }

        let pasture_scale = land_scale_factor(land.classes_total(&LandClass::PASTURE), old_pasture);
        let arable_scale = land_scale_factor(land.class_total(LandClass::Arable), old_arable);
        log::debug!(
            "Pasture capacity {:.4}, arable capacity {:.4}",
            pasture_scale,
            arable_scale
        );

        let weight = &datablock.food.weight;
        let animal = weight.items_with_origin(ItemOrigin::AnimalProducts);
        let vegetal = weight.items_with_origin(ItemOrigin::VegetalProducts);
        let shifts = [
            ProductionShift::against_imports(animal, pasture_scale),
            ProductionShift::against_imports(vegetal, arable_scale),
        ];
        shift_production(&mut datablock, &shifts, true)?;
        Ok(Outcome::new(datablock, reasons))
    }
}
