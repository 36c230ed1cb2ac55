//! Derived-quantity propagation
//!
//! Nutrient and energy tables are kept proportional to the weight table. When a
//! step rebalances one table the ratio of new to old values is applied to every
//! dependent table rather than recomputing them from nutrient factors.

use crate::datablock::{Datablock, FoodQuantity};
use crate::errors::AgrifoodResult;
use crate::food_balance::FoodBalanceSheet;
use crate::timeseries::FloatValue;
use ndarray::{Array3, Zip};
use num::Float;

/// `new / old`, treating `0/0`, `x/0` and any other non-finite result as no change.
pub fn safe_ratio<T: Float>(new: T, old: T) -> T {
    let ratio = new / old;
    if ratio.is_finite() {
        ratio
    } else {
        T::one()
    }
}

/// Elementwise ratio of two aligned tables
pub fn ratio_table(
    new: &FoodBalanceSheet,
    original: &FoodBalanceSheet,
) -> AgrifoodResult<Array3<FloatValue>> {
    new.check_aligned(original, "ratio")?;
    Ok(Zip::from(new.values())
        .and(original.values())
        .map_collect(|&n, &o| safe_ratio(n, o)))
}

/// Multiply every dependent quantity of the datablock by `new / original`.
pub fn propagate_ratio(
    datablock: &mut Datablock,
    new: &FoodBalanceSheet,
    original: &FoodBalanceSheet,
    dependents: &[FoodQuantity],
) -> AgrifoodResult<()> {
    let ratio = ratio_table(new, original)?;
    for quantity in dependents {
        let table = datablock.food.quantity_mut(*quantity);
        table.check_aligned(original, quantity.unit())?;
        table.multiply(&ratio)?;
    }
    Ok(())
}

/// Replace the weight table and rescale every nutrient quantity to match.
pub fn update_weight(
    datablock: &mut Datablock,
    new_weight: FoodBalanceSheet,
) -> AgrifoodResult<()> {
    let original = std::mem::replace(&mut datablock.food.weight, new_weight.clone());
    propagate_ratio(datablock, &new_weight, &original, &FoodQuantity::NUTRIENTS)?;
    Ok(())
}
