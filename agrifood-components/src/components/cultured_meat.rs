//! Substitution by cultured or alternative products
//!
//! Replaces consumption of selected items by a new alternative item on a
//! weight-for-weight basis. The alternative item takes its nutrient content
//! from an existing item and has its own emission factor. Producing it still
//! needs feedstock, which is added to feed on an energy basis.

use crate::components::demand::clamp_supply;
use agrifood_core::balance::{feed_scale, origins, scale_kcal_feed};
use agrifood_core::datablock::{Datablock, FoodQuantity};
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::items::{Element, ItemId, ItemMeta, ItemOrigin};
use agrifood_core::land::production_land_scale;
use agrifood_core::outcome::Outcome;
use agrifood_core::propagate::propagate_ratio;
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

const ALTERNATIVE_GROUP: &str = "Alternative Food";

/// Parameters for the substitution step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CulturedMeatParameters {
    /// Fraction of consumption of `items` replaced after full adoption
    pub cultured_scale: FloatValue,
    /// Emission factor of the alternative product
    /// unit: gco2e/gfood
    pub emission_factor: FloatValue,
    /// Items being replaced
    pub items: Vec<ItemId>,
    /// Item whose nutrient content the alternative product copies
    pub copy_from: ItemId,
    pub new_item: ItemId,
    pub new_item_name: String,
    /// Elements supplying the change in consumption of the replaced items
    pub source: Vec<Element>,
    pub elasticity: Option<Vec<FloatValue>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CulturedMeat {
    parameters: CulturedMeatParameters,
}

impl CulturedMeat {
    pub fn from_parameters(parameters: CulturedMeatParameters) -> Self {
        Self { parameters }
    }

    fn new_item_meta(&self) -> ItemMeta {
        ItemMeta::new(
            self.parameters.new_item,
            &self.parameters.new_item_name,
            ALTERNATIVE_GROUP,
            ItemOrigin::AlternativeFood,
        )
    }
}

#[typetag::serde]
impl Transformation for CulturedMeat {
    fn phase(&self) -> StepPhase {
        StepPhase::ConsumerDemand
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let p = &self.parameters;
        let new_item = p.new_item;
        let meta = self.new_item_meta();
        datablock.food.add_item(meta.clone(), p.copy_from)?;
        datablock.impact.emission_factors.add_item(meta, p.emission_factor)?;

        let original = datablock.food.weight.clone();
        let energy_before = datablock.food.energy.clone();

        let scale = datablock.adoption_curve(1.0, 1.0 - p.cultured_scale)?;
        let origins = origins(&p.source, true, p.elasticity.as_deref())?;
        let mut out = original.clone();
        out.scale_add(Element::Food, &origins, scale.view(), Some(&p.items))?;

        // Whatever the replaced items lose, the alternative product gains
        for element in Element::ALL {
            let removed = original.sum_items(element, Some(&p.items))?
                - out.sum_items(element, Some(&p.items))?;
            let mut target = out.item_element_mut(new_item, element)?;
            target += &removed;
        }

        clamp_supply(&mut out)?;
        let out = feed_scale(&out, &original)?;

        datablock.food.weight = out.clone();
        for quantity in FoodQuantity::NUTRIENTS {
            datablock.food.recompute_from_weight(quantity)?;
        }

        let energy = datablock.food.energy.clone();
        let fed = scale_kcal_feed(&energy, &energy_before, &[new_item])?;
        propagate_ratio(&mut datablock, &fed, &energy, &FoodQuantity::ALL)?;

        let broadleaf_ratio = datablock.global_parameters.broadleaf_conifer_ratio;
        let reason = production_land_scale(
            &mut datablock.land.percentage_land_use,
            &out,
            &original,
            broadleaf_ratio,
        )?;
        Ok(Outcome::new(datablock, reason.into_iter().collect()))
    }
}
