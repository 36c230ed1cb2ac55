//! Shared tail of the consumer-demand steps

use agrifood_core::datablock::{Datablock, FoodQuantity};
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::food_balance::FoodBalanceSheet;
use agrifood_core::guard::clamp_nonnegative;
use agrifood_core::items::Element;
use agrifood_core::land::production_land_scale;
use agrifood_core::outcome::Degradation;
use agrifood_core::propagate::propagate_ratio;

/// Move negative production onto imports and negative imports onto production.
pub(crate) fn clamp_supply(table: &mut FoodBalanceSheet) -> AgrifoodResult<()> {
    clamp_nonnegative(table, Element::Production, Element::Imports)?;
    clamp_nonnegative(table, Element::Imports, Element::Production)
}

/// Store a rebalanced `quantity` table in the datablock.
///
/// Land use follows the production change and every other food quantity is
/// rescaled by the ratio of the new table to `original`.
pub(crate) fn commit_demand_change(
    datablock: &mut Datablock,
    quantity: FoodQuantity,
    original: &FoodBalanceSheet,
    new: FoodBalanceSheet,
) -> AgrifoodResult<Option<Degradation>> {
    let broadleaf_ratio = datablock.global_parameters.broadleaf_conifer_ratio;
    let reason = production_land_scale(
        &mut datablock.land.percentage_land_use,
        &new,
        original,
        broadleaf_ratio,
    )?;

    let dependents: Vec<FoodQuantity> = FoodQuantity::ALL
        .into_iter()
        .filter(|q| *q != quantity)
        .collect();
    propagate_ratio(datablock, &new, original, &dependents)?;
    *datablock.food.quantity_mut(quantity) = new;
    Ok(reason)
}
