//! Negative-value guard

use crate::errors::{AgrifoodError, AgrifoodResult};
use crate::food_balance::FoodBalanceSheet;
use crate::items::Element;
use ndarray::Axis;

/// Clamp negative values of `element` to zero, moving the shortfall onto `fallback`.
///
/// For every (item, year) where `element < 0` the negative amount is added to
/// `fallback` at the same position. Applying the guard twice has no further effect.
pub fn clamp_nonnegative(
    table: &mut FoodBalanceSheet,
    element: Element,
    fallback: Element,
) -> AgrifoodResult<()> {
    if element == fallback {
        return Err(AgrifoodError::invalid_parameter(
            "fallback",
            format!("{} cannot be its own fallback", element),
        ));
    }
    let (e, f) = (element.index(), fallback.index());
    for mut cell in table.values_mut().lanes_mut(Axis(2)) {
        let shortfall = cell[e].min(0.0);
        cell[e] -= shortfall;
        cell[f] += shortfall;
    }
    Ok(())
}

/// Clamp `element` using its default fallback pairing.
pub fn clamp_default(table: &mut FoodBalanceSheet, element: Element) -> AgrifoodResult<()> {
    let fallback = element.default_fallback().ok_or_else(|| {
        AgrifoodError::invalid_parameter(
            "fallback",
            format!("{} has no default fallback element", element),
        )
    })?;
    clamp_nonnegative(table, element, fallback)
}
