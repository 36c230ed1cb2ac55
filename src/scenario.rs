//! Scenario parameters
//!
//! One immutable struct holds every ambition level of a scenario plus a block of
//! advanced coefficients. All ambition levels default to zero, which reproduces
//! the projected baseline.

use agrifood_core::datablock::{FoodQuantity, GlobalParameters};
use agrifood_core::errors::{AgrifoodError, AgrifoodResult};
use agrifood_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Name and accepted range of an ambition level
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slider {
    pub name: &'static str,
    pub min: FloatValue,
    pub max: FloatValue,
}

const fn slider(name: &'static str, min: FloatValue, max: FloatValue) -> Slider {
    Slider { name, min, max }
}

pub const SLIDER_COUNT: usize = 25;

/// Every ambition level in record order
pub const SLIDERS: [Slider; SLIDER_COUNT] = [
    // Consumer demand, % change in consumption
    slider("ruminant", -100.0, 100.0),
    slider("dairy", -100.0, 100.0),
    slider("pig_poultry_eggs", -100.0, 100.0),
    slider("fruit_veg", -100.0, 100.0),
    slider("cereals", -100.0, 100.0),
    slider("meat_alternatives", 0.0, 100.0),
    slider("dairy_alternatives", 0.0, 100.0),
    slider("waste", 0.0, 100.0),
    // Land use, % of land
    slider("foresting_pasture", -25.0, 25.0),
    slider("land_BECCS", 0.0, 20.0),
    slider("upland_peatland", 0.0, 100.0),
    slider("lowland_peatland", 0.0, 100.0),
    slider("soil_carbon", 0.0, 100.0),
    slider("mixed_farming", 0.0, 100.0),
    // Livestock farming, % adoption
    slider("silvopasture", 0.0, 100.0),
    slider("methane_inhibitor", 0.0, 100.0),
    slider("manure_management", 0.0, 100.0),
    slider("animal_breeding", 0.0, 100.0),
    slider("fossil_livestock", 0.0, 100.0),
    // Arable farming, % adoption
    slider("agroforestry", 0.0, 100.0),
    slider("fossil_arable", 0.0, 100.0),
    slider("vertical_farming", 0.0, 100.0),
    // Technology, Mt CO2e / yr
    slider("waste_BECCS", 0.0, 100.0),
    slider("overseas_BECCS", 0.0, 100.0),
    slider("DACCS", 0.0, 20.0),
];

/// Effect of full adoption of a farming practice
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PracticeFactors {
    /// Fractional reduction of emission factors
    pub ghg: FloatValue,
    /// Fractional reduction of production
    pub prod: FloatValue,
}

impl PracticeFactors {
    pub const fn new(ghg: FloatValue, prod: FloatValue) -> Self {
        Self { ghg, prod }
    }
}

/// Coefficients behind the ambition levels
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    /// Share of a consumption change supplied by domestic production, the rest by imports
    pub elasticity: FloatValue,
    /// unit: kCal/cap/day
    pub rda_kcal: FloatValue,
    /// Quantity in which diet changes are expressed
    pub scaling_nutrient: FoodQuantity,
    /// Compensate diet changes with cereals to keep total consumption constant
    pub cereal_scaling: bool,
    /// Length of the adoption window
    /// unit: yr
    pub timescale: u32,
    pub pivot_year: i32,
    /// Share of new woodland planted as broadleaf
    pub bdleaf_conif_ratio: FloatValue,
    /// Hold absolute domestic production at its base-year level
    pub hold_production: bool,
    pub cc_production_decline: bool,
    /// unit: gco2e/gfood
    pub labmeat_co2e: FloatValue,
    /// unit: gco2e/gfood
    pub dairy_alternatives_co2e: FloatValue,
    /// unit: t CO2e / ha / yr
    pub bdleaf_seq_ha_yr: FloatValue,
    /// unit: t CO2e / ha / yr
    pub conif_seq_ha_yr: FloatValue,
    /// unit: t CO2e / ha / yr
    pub peatland_seq_ha_yr: FloatValue,
    /// unit: t CO2e / ha / yr
    pub agroecology_seq_ha_yr: FloatValue,
    pub agroecology_tree_coverage: FloatValue,
    /// Yield of fruit trees on agroecological land
    /// unit: g / ha / day
    pub agroecology_item_yield: FloatValue,
    /// Crop yield retained on mixed farming land
    pub mixed_farming_crop_scale: FloatValue,
    /// Livestock yield of mixed farming land relative to pasture
    pub mixed_farming_livestock_scale: FloatValue,
    pub methane: PracticeFactors,
    pub manure: PracticeFactors,
    pub breeding: PracticeFactors,
    pub fossil_livestock: PracticeFactors,
    pub fossil_arable: PracticeFactors,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            elasticity: 0.5,
            rda_kcal: 2250.0,
            scaling_nutrient: FoodQuantity::Weight,
            cereal_scaling: true,
            timescale: 20,
            pivot_year: 2021,
            bdleaf_conif_ratio: 0.5,
            hold_production: true,
            cc_production_decline: false,
            labmeat_co2e: 5.0,
            dairy_alternatives_co2e: 0.2,
            bdleaf_seq_ha_yr: 12.5,
            conif_seq_ha_yr: 23.5,
            peatland_seq_ha_yr: 3.5,
            agroecology_seq_ha_yr: 6.26,
            agroecology_tree_coverage: 0.1,
            agroecology_item_yield: 1e2,
            mixed_farming_crop_scale: 0.8,
            mixed_farming_livestock_scale: 0.5,
            methane: PracticeFactors::new(0.3, 0.0),
            manure: PracticeFactors::new(0.2, 0.0),
            breeding: PracticeFactors::new(0.15, 0.0),
            fossil_livestock: PracticeFactors::new(0.1, 0.0),
            fossil_arable: PracticeFactors::new(0.1, 0.0),
        }
    }
}

/// Ambition levels of one scenario
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParameters {
    pub ruminant: FloatValue,
    pub dairy: FloatValue,
    pub pig_poultry_eggs: FloatValue,
    pub fruit_veg: FloatValue,
    pub cereals: FloatValue,
    pub meat_alternatives: FloatValue,
    pub dairy_alternatives: FloatValue,
    pub waste: FloatValue,

    pub foresting_pasture: FloatValue,
    #[serde(rename = "land_BECCS")]
    pub land_beccs: FloatValue,
    pub upland_peatland: FloatValue,
    pub lowland_peatland: FloatValue,
    pub soil_carbon: FloatValue,
    pub mixed_farming: FloatValue,

    pub silvopasture: FloatValue,
    pub methane_inhibitor: FloatValue,
    pub manure_management: FloatValue,
    pub animal_breeding: FloatValue,
    pub fossil_livestock: FloatValue,

    pub agroforestry: FloatValue,
    pub fossil_arable: FloatValue,
    pub vertical_farming: FloatValue,

    #[serde(rename = "waste_BECCS")]
    pub waste_beccs: FloatValue,
    #[serde(rename = "overseas_BECCS")]
    pub overseas_beccs: FloatValue,
    #[serde(rename = "DACCS")]
    pub daccs: FloatValue,

    pub advanced: AdvancedSettings,
}

impl ScenarioParameters {
    /// Load and validate parameters from TOML. Missing values take their defaults.
    pub fn from_toml(value: &str) -> AgrifoodResult<Self> {
        let parameters: Self =
            toml::from_str(value).map_err(|e| AgrifoodError::Serialization(e.to_string()))?;
        parameters.validate()?;
        Ok(parameters)
    }

    pub fn to_toml(&self) -> AgrifoodResult<String> {
        toml::to_string(self).map_err(|e| AgrifoodError::Serialization(e.to_string()))
    }

    /// Ambition levels in record order
    pub fn slider_values(&self) -> [FloatValue; SLIDER_COUNT] {
        [
            self.ruminant,
            self.dairy,
            self.pig_poultry_eggs,
            self.fruit_veg,
            self.cereals,
            self.meat_alternatives,
            self.dairy_alternatives,
            self.waste,
            self.foresting_pasture,
            self.land_beccs,
            self.upland_peatland,
            self.lowland_peatland,
            self.soil_carbon,
            self.mixed_farming,
            self.silvopasture,
            self.methane_inhibitor,
            self.manure_management,
            self.animal_breeding,
            self.fossil_livestock,
            self.agroforestry,
            self.fossil_arable,
            self.vertical_farming,
            self.waste_beccs,
            self.overseas_beccs,
            self.daccs,
        ]
    }

    /// Mutable access to an ambition level by its record name
    pub fn slider_mut(&mut self, name: &str) -> Option<&mut FloatValue> {
        let value = match name {
            "ruminant" => &mut self.ruminant,
            "dairy" => &mut self.dairy,
            "pig_poultry_eggs" => &mut self.pig_poultry_eggs,
            "fruit_veg" => &mut self.fruit_veg,
            "cereals" => &mut self.cereals,
            "meat_alternatives" => &mut self.meat_alternatives,
            "dairy_alternatives" => &mut self.dairy_alternatives,
            "waste" => &mut self.waste,
            "foresting_pasture" => &mut self.foresting_pasture,
            "land_BECCS" => &mut self.land_beccs,
            "upland_peatland" => &mut self.upland_peatland,
            "lowland_peatland" => &mut self.lowland_peatland,
            "soil_carbon" => &mut self.soil_carbon,
            "mixed_farming" => &mut self.mixed_farming,
            "silvopasture" => &mut self.silvopasture,
            "methane_inhibitor" => &mut self.methane_inhibitor,
            "manure_management" => &mut self.manure_management,
            "animal_breeding" => &mut self.animal_breeding,
            "fossil_livestock" => &mut self.fossil_livestock,
            "agroforestry" => &mut self.agroforestry,
            "fossil_arable" => &mut self.fossil_arable,
            "vertical_farming" => &mut self.vertical_farming,
            "waste_BECCS" => &mut self.waste_beccs,
            "overseas_BECCS" => &mut self.overseas_beccs,
            "DACCS" => &mut self.daccs,
            _ => return None,
        };
        Some(value)
    }

    /// Check every ambition level and coefficient against its accepted range
    pub fn validate(&self) -> AgrifoodResult<()> {
        for (slider, value) in SLIDERS.iter().zip(self.slider_values()) {
            check_range(slider.name, value, slider.min, slider.max)?;
        }

        let a = &self.advanced;
        check_range("elasticity", a.elasticity, 0.0, 1.0)?;
        check_range("bdleaf_conif_ratio", a.bdleaf_conif_ratio, 0.0, 1.0)?;
        check_range("agroecology_tree_coverage", a.agroecology_tree_coverage, 0.0, 1.0)?;
        check_range("mixed_farming_crop_scale", a.mixed_farming_crop_scale, 0.0, 1.0)?;
        for (name, value) in [
            ("rda_kcal", a.rda_kcal),
            ("labmeat_co2e", a.labmeat_co2e),
            ("dairy_alternatives_co2e", a.dairy_alternatives_co2e),
            ("bdleaf_seq_ha_yr", a.bdleaf_seq_ha_yr),
            ("conif_seq_ha_yr", a.conif_seq_ha_yr),
            ("peatland_seq_ha_yr", a.peatland_seq_ha_yr),
            ("agroecology_seq_ha_yr", a.agroecology_seq_ha_yr),
            ("agroecology_item_yield", a.agroecology_item_yield),
            ("mixed_farming_livestock_scale", a.mixed_farming_livestock_scale),
        ] {
            check_range(name, value, 0.0, FloatValue::INFINITY)?;
        }
        for (name, factors) in [
            ("methane", a.methane),
            ("manure", a.manure),
            ("breeding", a.breeding),
            ("fossil_livestock", a.fossil_livestock),
            ("fossil_arable", a.fossil_arable),
        ] {
            check_range(name, factors.ghg, 0.0, 1.0)?;
            check_range(name, factors.prod, -1.0, 1.0)?;
        }
        Ok(())
    }

    /// Parameters shared by every step of the scenario
    pub fn global_parameters(&self) -> GlobalParameters {
        GlobalParameters {
            timescale: self.advanced.timescale,
            pivot_year: self.advanced.pivot_year,
            broadleaf_conifer_ratio: self.advanced.bdleaf_conif_ratio,
        }
    }
}

fn check_range(
    name: &str,
    value: FloatValue,
    min: FloatValue,
    max: FloatValue,
) -> AgrifoodResult<()> {
    if value.is_nan() || value < min || value > max {
        return Err(AgrifoodError::invalid_parameter(
            name,
            format!("{} is outside of [{}, {}]", value, min, max),
        ));
    }
    Ok(())
}
