//! Agroecological practices such as silvopasture and agroforestry
//!
//! Part of the selected land is converted to an agroecological class where
//! trees are integrated with livestock or crops. The replaced items keep most
//! of their production on the converted land, losing only the share covered by
//! trees. The trees sequester carbon and produce new items, whose production
//! grows by the new yield even from zero and displaces imports. Any production
//! beyond what was imported is exported.

use crate::components::demand::clamp_supply;
use agrifood_core::balance::Origin;
use agrifood_core::datablock::Datablock;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::food_balance::FoodBalanceSheet;
use agrifood_core::impact::append_sequestration;
use agrifood_core::items::{Element, ItemId, ItemSelector};
use agrifood_core::land::{cap_fraction, convert_land};
use agrifood_core::outcome::Outcome;
use agrifood_core::propagate::update_weight;
use agrifood_core::spatial::LandClass;
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Default sequestration rate of agroecological land
/// unit: t CO2e / ha / yr
pub const AGROECOLOGY_SEQUESTRATION: FloatValue = 6.26;

/// Parameters for an agroecology step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgroecologyParameters {
    /// Fraction of the selected land converted
    pub land_fraction: FloatValue,
    pub land_types: Vec<LandClass>,
    /// Class receiving the converted land
    pub agroecology_class: LandClass,
    /// Items produced on the original land
    pub replaced_items: ItemSelector,
    /// Items produced by the trees
    pub new_items: ItemSelector,
    /// Yield of the new items on converted land
    /// unit: g / ha / day
    pub new_item_yield: FloatValue,
    /// Share of converted land covered by trees
    /// unit: fraction
    pub tree_coverage: FloatValue,
    /// unit: t CO2e / ha / yr
    #[serde(default = "default_sequestration")]
    pub seq_ha_yr: FloatValue,
}

fn default_sequestration() -> FloatValue {
    AGROECOLOGY_SEQUESTRATION
}

/// Add `gain` to the production of `item` in place of imports.
///
/// Imports never go negative, the surplus is exported instead.
fn displace_imports(
    table: &mut FoodBalanceSheet,
    item: ItemId,
    gain: ArrayView1<FloatValue>,
) -> AgrifoodResult<()> {
    let mut production = table.item_element_mut(item, Element::Production)?;
    production += &gain;

    let mut imports = table.item_element_mut(item, Element::Imports)?;
    imports -= &gain;
    let surplus = imports.mapv(|v| (-v).max(0.0));
    imports += &surplus;

    let mut exports = table.item_element_mut(item, Element::Exports)?;
    exports += &surplus;
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agroecology {
    parameters: AgroecologyParameters,
}

impl Agroecology {
    pub fn from_parameters(parameters: AgroecologyParameters) -> Self {
        Self { parameters }
    }

    /// Production retained by the replaced items given the land scale `r`
    fn replaced_scale(&self, r: FloatValue) -> FloatValue {
        r + (1.0 - self.parameters.tree_coverage) * (1.0 - r)
    }
}

#[typetag::serde]
impl Transformation for Agroecology {
    fn phase(&self) -> StepPhase {
        StepPhase::FarmingPractice
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let p = &self.parameters;
        let mut reasons = vec![];
        let fraction = cap_fraction(p.land_fraction, 1.0, &mut reasons);
        let class = p.agroecology_class;

        let land = &mut datablock.land.percentage_land_use;
        let area_before = land.area_ha(class);
        let conversion = convert_land(land, &p.land_types, class, fraction, None)?;
        let moved_ha = land.area_ha(class) - area_before;
        let area_ha = land.area_ha(class);
        log::debug!("Converted {:.1} ha to {}", moved_ha, class);

        let weight = &datablock.food.weight;
        let replaced = p.replaced_items.resolve(weight.items())?;
        let new_items = p.new_items.resolve(weight.items())?;
        let imports = [Origin::subtracting(Element::Imports)];
        let mut out = weight.clone();

        let scale = datablock.adoption_curve(1.0, self.replaced_scale(conversion.scale))?;
        out.scale_add(Element::Production, &imports, scale.view(), Some(&replaced))?;

        let population = datablock.population.at(datablock.years().end())?;
        let gain = datablock.adoption_curve(0.0, p.new_item_yield * moved_ha / population)?;
        for item in new_items {
            displace_imports(&mut out, item, gain.view())?;
        }
        clamp_supply(&mut out)?;

        let sequestration = datablock.adoption_curve(0.0, 1.0)? * (area_ha * p.seq_ha_yr);
        append_sequestration(&mut datablock, class.name(), sequestration)?;

        update_weight(&mut datablock, out)?;
        Ok(Outcome::new(datablock, reasons))
    }
}
