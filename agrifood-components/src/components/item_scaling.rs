//! Diet shifts
//!
//! Scales the food consumption of a set of items, optionally keeping total
//! consumption constant by rescaling other items.

use crate::components::demand::{clamp_supply, commit_demand_change};
use agrifood_core::balance::{feed_scale, origins, scale_and_rebalance, BalanceRequest};
use agrifood_core::datablock::{Datablock, FoodQuantity};
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::items::{Element, ItemSelector};
use agrifood_core::outcome::Outcome;
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

/// Parameters for a diet shift
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemScalingParameters {
    /// Items whose consumption changes
    pub selection: ItemSelector,
    /// Food scale after full adoption
    pub scale: FloatValue,
    /// Elements supplying the change in consumption
    pub source: Vec<Element>,
    /// Share of the change taken by each source element, all by the first if not set
    pub elasticity: Option<Vec<FloatValue>>,
    /// Quantity in which the scaling is expressed
    pub quantity: FoodQuantity,
    /// Keep total consumption of `quantity` constant
    pub hold_constant: bool,
    /// Items compensating when holding constant, all other items if not set
    pub compensating_items: Option<ItemSelector>,
}

/// Scale consumption of selected items and rebalance supply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemScaling {
    parameters: ItemScalingParameters,
}

impl ItemScaling {
    pub fn from_parameters(parameters: ItemScalingParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Transformation for ItemScaling {
    fn phase(&self) -> StepPhase {
        StepPhase::ConsumerDemand
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let quantity = self.parameters.quantity;
        let original = datablock.food.quantity(quantity).clone();
        let items = self.parameters.selection.resolve(original.items())?;
        if items.is_empty() {
            log::debug!("No items selected for scaling");
            return Ok(Outcome::Ok(datablock));
        }

        let scale = datablock.adoption_curve(1.0, self.parameters.scale)?;
        let origins = origins(
            &self.parameters.source,
            true,
            self.parameters.elasticity.as_deref(),
        )?;
        let mut request = BalanceRequest::new(Element::Food, scale, origins).with_items(items);
        if self.parameters.hold_constant {
            // Explicit ids are checked by the balance engine, which drops unknown ones
            let compensating = match &self.parameters.compensating_items {
                Some(ItemSelector::Items(ids)) => Some(ids.clone()),
                Some(selector) => Some(selector.resolve(original.items())?),
                None => None,
            };
            request = request.holding_constant(compensating);
        }

        let mut reasons = vec![];
        let scaled = scale_and_rebalance(&original, &request)?.collect(&mut reasons);
        let mut out = feed_scale(&scaled, &original)?;
        clamp_supply(&mut out)?;

        reasons.extend(commit_demand_change(&mut datablock, quantity, &original, out)?);
        Ok(Outcome::new(datablock, reasons))
    }
}
