//! Land-use reallocation primitives
//!
//! Moving area between land classes changes the capacity to produce the items
//! grown on that land. These helpers translate an area change into a production
//! change and the reverse, a production change into an area change.

use crate::balance::Origin;
use crate::datablock::Datablock;
use crate::errors::AgrifoodResult;
use crate::food_balance::FoodBalanceSheet;
use crate::guard::clamp_nonnegative;
use crate::items::{Element, ItemId, ItemOrigin};
use crate::outcome::Degradation;
use crate::propagate::{safe_ratio, update_weight};
use crate::spatial::{LandClass, LandUse};
use crate::timeseries::FloatValue;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Production capacity factor after a class changes from `old_area` to `new_area`
pub fn land_scale_factor(new_area: FloatValue, old_area: FloatValue) -> FloatValue {
    safe_ratio(new_area, old_area)
}

/// Clamp a land fraction to `[0, max]`, recording a degradation if it changed.
pub fn cap_fraction(
    requested: FloatValue,
    max: FloatValue,
    reasons: &mut Vec<Degradation>,
) -> FloatValue {
    let applied = requested.clamp(0.0, max);
    if applied != requested {
        log::warn!("Land fraction {} capped at {}", requested, applied);
        reasons.push(Degradation::LandFractionCapped { requested, applied });
    }
    applied
}

/// Result of converting part of some land classes into another class
#[derive(Clone, Debug)]
pub struct LandConversion {
    /// Percentage moved in each cell
    pub moved: Array2<FloatValue>,
    /// Production capacity left on the source classes, `new_area / old_area`
    pub scale: FloatValue,
}

impl LandConversion {
    /// Total percentage moved over all cells
    pub fn moved_total(&self) -> FloatValue {
        self.moved.iter().filter(|v| v.is_finite()).sum()
    }
}

/// Move `fraction` of the `from` classes inside `mask` into `to`.
pub fn convert_land(
    land: &mut LandUse,
    from: &[LandClass],
    to: LandClass,
    fraction: FloatValue,
    mask: Option<&Array2<bool>>,
) -> AgrifoodResult<LandConversion> {
    let old = land.classes_total(from);
    let moved = land.move_fraction(from, to, fraction, mask)?;
    let new = land.classes_total(from);
    Ok(LandConversion {
        moved,
        scale: land_scale_factor(new, old),
    })
}

/// Rescale pasture and arable land to follow a change in production.
///
/// Pasture follows the final-year ratio of animal-origin production and arable
/// land the ratio of vegetal-origin production. Any resulting deviation from a
/// full cell is absorbed by woodland, as far as woodland allows.
pub fn production_land_scale(
    land: &mut LandUse,
    observed: &FoodBalanceSheet,
    reference: &FoodBalanceSheet,
    broadleaf_ratio: FloatValue,
) -> AgrifoodResult<Option<Degradation>> {
    observed.check_aligned(reference, "production land scaling")?;
    let last = observed.years().len() - 1;
    let ratio = |origin: ItemOrigin| {
        safe_ratio(
            observed.sum_origin(Element::Production, origin)[last],
            reference.sum_origin(Element::Production, origin)[last],
        )
    };
    let livestock = ratio(ItemOrigin::AnimalProducts);
    let arable = ratio(ItemOrigin::VegetalProducts);
    log::debug!(
        "Scaling pasture by {:.4} and arable land by {:.4}",
        livestock,
        arable
    );

    land.scale_classes(&LandClass::PASTURE, livestock);
    land.scale_classes(&[LandClass::Arable], arable);
    Ok(land.rebalance_forest(broadleaf_ratio))
}

/// A change of production capacity for a set of items
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionShift {
    pub items: Vec<ItemId>,
    /// Production scale after full adoption
    pub scale: FloatValue,
    /// Element balancing the change in production
    pub origin: Origin,
}

impl ProductionShift {
    /// Production change supplied by imports
    pub fn against_imports(items: Vec<ItemId>, scale: FloatValue) -> Self {
        Self {
            items,
            scale,
            origin: Origin::subtracting(Element::Imports),
        }
    }

    /// Production change absorbed by exports
    pub fn against_exports(items: Vec<ItemId>, scale: FloatValue) -> Self {
        Self {
            items,
            scale,
            origin: Origin::adding(Element::Exports),
        }
    }
}

/// Phase in production shifts on the weight table and propagate them.
///
/// Each shift follows an adoption curve from 1 to its scale. When `clamp` is
/// set, negative production and imports are moved onto each other afterwards.
/// Nutrient quantities follow the new weights.
pub fn shift_production(
    datablock: &mut Datablock,
    shifts: &[ProductionShift],
    clamp: bool,
) -> AgrifoodResult<FoodBalanceSheet> {
    let mut out = datablock.food.weight.clone();
    for shift in shifts {
        if shift.items.is_empty() {
            continue;
        }
        let curve = datablock.adoption_curve(1.0, shift.scale)?;
        out.scale_add(Element::Production, &[shift.origin], curve.view(), Some(&shift.items))?;
    }
    if clamp {
        clamp_nonnegative(&mut out, Element::Production, Element::Imports)?;
        clamp_nonnegative(&mut out, Element::Imports, Element::Production)?;
    }
    update_weight(datablock, out.clone())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example_data::example_datablock;
    use approx::assert_relative_eq;

    #[test]
    fn scale_factor_of_empty_class_is_one() {
        assert_eq!(land_scale_factor(0.0, 0.0), 1.0);
        assert_eq!(land_scale_factor(5.0, 10.0), 0.5);
    }

    #[test]
    fn fractions_are_capped() {
        let mut reasons = vec![];
        assert_eq!(cap_fraction(0.3, 1.0, &mut reasons), 0.3);
        assert!(reasons.is_empty());
        assert_eq!(cap_fraction(1.5, 1.0, &mut reasons), 1.0);
        assert_eq!(cap_fraction(-0.1, 1.0, &mut reasons), 0.0);
        assert_eq!(reasons.len(), 2);
    }

    #[test]
    fn converting_everything_leaves_no_capacity() {
        let datablock = example_datablock();
        let mut land = datablock.land.percentage_land_use.clone();
        let arable = land.class_total(LandClass::Arable);
        let conversion =
            convert_land(&mut land, &[LandClass::Arable], LandClass::Beccs, 1.0, None).unwrap();

        assert_eq!(conversion.scale, 0.0);
        assert_relative_eq!(conversion.moved_total(), arable);
        assert_relative_eq!(land.class_total(LandClass::Beccs), arable);
        assert!(land.composition_error() < 1e-9);
    }

    #[test]
    fn production_land_scale_keeps_composition() {
        let datablock = example_datablock();
        let reference = datablock.food.weight.clone();
        let animal = reference.items_with_origin(ItemOrigin::AnimalProducts);
        let mut observed = reference.clone();
        for item in animal {
            observed
                .item_element_mut(item, Element::Production)
                .unwrap()
                .mapv_inplace(|v| v * 0.5);
        }
        let mut land = datablock.land.percentage_land_use.clone();
        let pasture_before = land.classes_total(&LandClass::PASTURE);
        let arable_before = land.class_total(LandClass::Arable);

        let reason = production_land_scale(&mut land, &observed, &reference, 0.5).unwrap();

        assert_eq!(reason, None);
        assert_relative_eq!(land.classes_total(&LandClass::PASTURE), pasture_before * 0.5);
        assert_relative_eq!(land.class_total(LandClass::Arable), arable_before);
        assert!(land.composition_error() < 1e-9);
    }

    #[test]
    fn crop_expansion_beyond_woodland_is_reported() {
        let datablock = example_datablock();
        let reference = datablock.food.weight.clone();
        let mut observed = reference.clone();
        for item in reference.items_with_origin(ItemOrigin::VegetalProducts) {
            observed
                .item_element_mut(item, Element::Production)
                .unwrap()
                .mapv_inplace(|v| v * 2.0);
        }
        let mut land = datablock.land.percentage_land_use.clone();

        // Every cell has at least 10% arable but only 10% woodland
        let reason = production_land_scale(&mut land, &observed, &reference, 0.5).unwrap();

        assert!(matches!(reason, Some(Degradation::WoodlandExhausted { .. })));
        assert_eq!(land.classes_total(&LandClass::FOREST), 0.0);
    }

    #[test]
    fn shift_to_zero_moves_production_to_imports() {
        let mut datablock = example_datablock();
        let before = datablock.food.weight.clone();
        let out = shift_production(
            &mut datablock,
            &[ProductionShift::against_imports(vec![ItemId(2511)], 0.0)],
            true,
        )
        .unwrap();

        assert_relative_eq!(out.get(ItemId(2511), 2050, Element::Production).unwrap(), 0.0);
        assert_relative_eq!(
            out.get(ItemId(2511), 2050, Element::Imports).unwrap(),
            before.get(ItemId(2511), 2050, Element::Imports).unwrap()
                + before.get(ItemId(2511), 2050, Element::Production).unwrap()
        );
        assert_eq!(datablock.food.weight, out);
        // Years before the pivot are untouched
        assert_eq!(
            out.get(ItemId(2511), 2020, Element::Production).unwrap(),
            before.get(ItemId(2511), 2020, Element::Production).unwrap()
        );
    }
}
