#![allow(dead_code)]

use crate::balance::{origins, scale_and_rebalance, BalanceRequest};
use crate::datablock::{Datablock, FoodQuantity};
use crate::errors::{AgrifoodError, AgrifoodResult};
use crate::items::{Element, ItemId};
use crate::outcome::{Degradation, Outcome};
use crate::propagate::propagate_ratio;
use crate::timeseries::FloatValue;
use crate::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

// ============================================================================
// ScaleFood - a minimal consumer-demand step
// ============================================================================

/// Parameters for the test scaling step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ScaleFoodParameters {
    pub item: ItemId,
    /// Food scale after full adoption
    pub scale: FloatValue,
    pub hold_constant: bool,
}

/// Scales food of a single item, supplied by imports
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ScaleFood {
    pub parameters: ScaleFoodParameters,
}

impl ScaleFood {
    pub fn from_parameters(parameters: ScaleFoodParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Transformation for ScaleFood {
    fn phase(&self) -> StepPhase {
        StepPhase::ConsumerDemand
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let original = datablock.food.weight.clone();
        let scale = datablock.adoption_curve(1.0, self.parameters.scale)?;
        let mut request = BalanceRequest::new(
            Element::Food,
            scale,
            origins(&[Element::Imports], true, None)?,
        )
        .with_items(vec![self.parameters.item]);
        if self.parameters.hold_constant {
            request = request.holding_constant(None);
        }
        let mut reasons = vec![];
        let new = scale_and_rebalance(&original, &request)?.collect(&mut reasons);
        propagate_ratio(&mut datablock, &new, &original, &FoodQuantity::ALL)?;
        Ok(Outcome::new(datablock, reasons))
    }
}

// ============================================================================
// Misbehaving steps used to exercise the pipeline runtime
// ============================================================================

/// Always reports a degradation without changing anything
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AlwaysDegraded {}

#[typetag::serde]
impl Transformation for AlwaysDegraded {
    fn phase(&self) -> StepPhase {
        StepPhase::LandUse
    }

    fn apply(&self, datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        Ok(Outcome::new(
            datablock,
            vec![Degradation::LandFractionCapped {
                requested: 2.0,
                applied: 1.0,
            }],
        ))
    }
}

/// Requires an item which is not part of the datablock
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct MissingItem {
    pub item: ItemId,
}

#[typetag::serde]
impl Transformation for MissingItem {
    fn phase(&self) -> StepPhase {
        StepPhase::Technology
    }

    fn apply(&self, datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        datablock.food.weight.position(self.item)?;
        Err(AgrifoodError::Error(
            "expected the item to be missing".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example_data::example_datablock;

    #[test]
    fn scale_food_reduces_imports() {
        let step = ScaleFood::from_parameters(ScaleFoodParameters {
            item: ItemId(2731),
            scale: 0.5,
            hold_constant: false,
        });
        let datablock = example_datablock();
        let out = step.apply(datablock.clone()).unwrap().into_value();

        let before = datablock.food.weight.get(ItemId(2731), 2050, Element::Food).unwrap();
        let after = out.food.weight.get(ItemId(2731), 2050, Element::Food).unwrap();
        approx::assert_relative_eq!(after, before * 0.5);
        assert_eq!(step.name(), "ScaleFood");
    }
}
