//! The datablock: all data describing one scenario evaluation.
//!
//! A datablock is built once from baseline data, then threaded by value through
//! every transformation step. Its domains mirror the structure of the baseline
//! data: food quantities, land use, environmental impact, population and the
//! global parameters shared by all steps.

use crate::curve::AdoptionCurve;
use crate::errors::{AgrifoodError, AgrifoodResult};
use crate::food_balance::FoodBalanceSheet;
use crate::item_table::ItemSeries;
use crate::items::{ItemId, ItemMeta};
use crate::ledger::Ledger;
use crate::spatial::{LandUse, MaskSelector};
use crate::timeseries::{FloatValue, Year, YearAxis};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-capita food quantities tracked for every item
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodQuantity {
    Weight,
    Protein,
    Fat,
    Energy,
}

impl FoodQuantity {
    pub const ALL: [FoodQuantity; 4] = [
        FoodQuantity::Weight,
        FoodQuantity::Protein,
        FoodQuantity::Fat,
        FoodQuantity::Energy,
    ];

    /// Quantities derived from weight through nutrient factors
    pub const NUTRIENTS: [FoodQuantity; 3] =
        [FoodQuantity::Protein, FoodQuantity::Fat, FoodQuantity::Energy];

    pub fn unit(&self) -> &'static str {
        match self {
            FoodQuantity::Weight => "g/cap/day",
            FoodQuantity::Protein => "g_prot/cap/day",
            FoodQuantity::Fat => "g_fat/cap/day",
            FoodQuantity::Energy => "kCal/cap/day",
        }
    }
}

/// Nutrient content per gram of food
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NutrientFactors {
    /// unit: g_prot/g_food
    pub protein: ItemSeries,
    /// unit: g_fat/g_food
    pub fat: ItemSeries,
    /// unit: kCal/g_food
    pub energy: ItemSeries,
}

impl NutrientFactors {
    pub fn for_quantity(&self, quantity: FoodQuantity) -> Option<&ItemSeries> {
        match quantity {
            FoodQuantity::Weight => None,
            FoodQuantity::Protein => Some(&self.protein),
            FoodQuantity::Fat => Some(&self.fat),
            FoodQuantity::Energy => Some(&self.energy),
        }
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut ItemSeries> {
        [&mut self.protein, &mut self.fat, &mut self.energy].into_iter()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodDomain {
    pub weight: FoodBalanceSheet,
    pub protein: FoodBalanceSheet,
    pub fat: FoodBalanceSheet,
    pub energy: FoodBalanceSheet,
    pub nutrient_factors: NutrientFactors,
    /// Emissions per capita per day, set by the emissions aggregation
    /// unit: g_co2e/cap/day
    pub emissions_per_capita: Option<FoodBalanceSheet>,
    /// Recommended daily energy intake used by the waste reduction step
    /// unit: kCal/cap/day
    pub rda_kcal: Option<FloatValue>,
}

impl FoodDomain {
    pub fn quantity(&self, quantity: FoodQuantity) -> &FoodBalanceSheet {
        match quantity {
            FoodQuantity::Weight => &self.weight,
            FoodQuantity::Protein => &self.protein,
            FoodQuantity::Fat => &self.fat,
            FoodQuantity::Energy => &self.energy,
        }
    }

    pub fn quantity_mut(&mut self, quantity: FoodQuantity) -> &mut FoodBalanceSheet {
        match quantity {
            FoodQuantity::Weight => &mut self.weight,
            FoodQuantity::Protein => &mut self.protein,
            FoodQuantity::Fat => &mut self.fat,
            FoodQuantity::Energy => &mut self.energy,
        }
    }

    /// Add a new, empty item to every quantity and copy its nutrient content
    /// from an existing item.
    pub fn add_item(&mut self, meta: ItemMeta, nutrients_from: ItemId) -> AgrifoodResult<()> {
        for quantity in FoodQuantity::ALL {
            self.quantity_mut(quantity).add_item(meta.clone())?;
        }
        for factors in self.nutrient_factors.iter_mut() {
            factors.add_item_copy(meta.clone(), nutrients_from)?;
        }
        Ok(())
    }

    /// Recompute a nutrient quantity as weight times nutrient factor.
    pub fn recompute_from_weight(&mut self, quantity: FoodQuantity) -> AgrifoodResult<()> {
        if let Some(factors) = self.nutrient_factors.for_quantity(quantity) {
            let aligned = factors.aligned_to(&self.weight)?;
            let values = self.weight.multiply_by_item_year(aligned.view())?;
            *self.quantity_mut(quantity) = values;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandDomain {
    /// Current land-use composition
    pub percentage_land_use: LandUse,
    /// Composition before any intervention
    pub baseline: LandUse,
    /// Auxiliary maps on the land grid, e.g. `dominant_classification` or `peatland`
    pub maps: BTreeMap<String, Array2<FloatValue>>,
}

impl LandDomain {
    pub fn new(land_use: LandUse, maps: BTreeMap<String, Array2<FloatValue>>) -> Self {
        Self {
            baseline: land_use.clone(),
            percentage_land_use: land_use,
            maps,
        }
    }

    pub fn map(&self, name: &str) -> AgrifoodResult<&Array2<FloatValue>> {
        self.maps
            .get(name)
            .ok_or_else(|| AgrifoodError::LandMapNotFound(name.to_string()))
    }

    /// Cells selected by `selector`, or `None` for the whole map
    pub fn mask(&self, selector: Option<&MaskSelector>) -> AgrifoodResult<Option<Array2<bool>>> {
        match selector {
            None => Ok(None),
            Some(selector) => {
                let map = self.map(&selector.map)?;
                let shape = self.percentage_land_use.grid().shape();
                if map.dim() != shape {
                    return Err(AgrifoodError::shape_mismatch(&selector.map, shape, map.dim()));
                }
                Ok(Some(selector.select(map.view())))
            }
        }
    }
}

/// Output of an external climate response model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClimateProjection {
    pub years: YearAxis,
    /// unit: K
    pub temperature: Array1<FloatValue>,
    /// unit: ppm
    pub concentration: Array1<FloatValue>,
    /// unit: W / m^2
    pub forcing: Array1<FloatValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImpactDomain {
    /// unit: gco2e/gfood
    pub emission_factors: ItemSeries,
    /// Annual emissions per item and element
    /// unit: g_co2e/year
    pub emissions: Option<FoodBalanceSheet>,
    /// unit: t CO2e / yr
    pub co2e_sequestration: Ledger,
    /// unit: GBP / yr
    pub cost: Ledger,
    pub climate: Option<ClimateProjection>,
}

impl ImpactDomain {
    pub fn new(emission_factors: ItemSeries) -> Self {
        let years = *emission_factors.years();
        Self {
            emission_factors,
            emissions: None,
            co2e_sequestration: Ledger::new("t CO2e / yr", years),
            cost: Ledger::new("GBP / yr", years),
            climate: None,
        }
    }
}

/// Population projection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Population {
    years: YearAxis,
    values: Array1<FloatValue>,
}

impl Population {
    pub fn new(years: YearAxis, values: Array1<FloatValue>) -> AgrifoodResult<Self> {
        years.check_series(values.len(), "population")?;
        Ok(Self { years, values })
    }

    pub fn years(&self) -> &YearAxis {
        &self.years
    }

    pub fn at(&self, year: Year) -> AgrifoodResult<FloatValue> {
        let i = self.years.try_index_of(year, "population")?;
        Ok(self.values[i])
    }

    /// Population on every year of `years`
    pub fn over(&self, years: &YearAxis) -> AgrifoodResult<Array1<FloatValue>> {
        years.iter().map(|year| self.at(year)).collect()
    }
}

/// Configuration shared by every step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalParameters {
    /// Length of every adoption window
    /// unit: yr
    /// default: 20
    pub timescale: u32,
    /// Last year before interventions start to take effect
    /// default: 2021
    pub pivot_year: Year,
    /// Share of woodland compensation allocated to broadleaf woodland
    /// unit: fraction
    /// default: 0.5
    pub broadleaf_conifer_ratio: FloatValue,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            timescale: 20,
            pivot_year: 2021,
            broadleaf_conifer_ratio: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Datablock {
    pub food: FoodDomain,
    pub land: LandDomain,
    pub impact: ImpactDomain,
    pub population: Population,
    pub global_parameters: GlobalParameters,
}

impl Datablock {
    /// Year axis of the food tables
    pub fn years(&self) -> &YearAxis {
        self.food.weight.years()
    }

    /// Logistic adoption curve over the food years using the global timescale
    pub fn adoption_curve(
        &self,
        initial: FloatValue,
        target: FloatValue,
    ) -> AgrifoodResult<Array1<FloatValue>> {
        AdoptionCurve::logistic(
            self.global_parameters.pivot_year,
            self.global_parameters.timescale,
            initial,
            target,
        )
        .evaluate_checked(self.years(), "adoption curve")
    }

    /// Check that every table of the datablock is consistent with the weight table.
    pub fn validate(&self) -> AgrifoodResult<()> {
        let weight = &self.food.weight;
        for quantity in FoodQuantity::NUTRIENTS {
            self.food
                .quantity(quantity)
                .check_aligned(weight, quantity.unit())?;
        }
        for quantity in FoodQuantity::NUTRIENTS {
            if let Some(factors) = self.food.nutrient_factors.for_quantity(quantity) {
                factors.aligned_to(weight)?;
            }
        }
        self.impact.emission_factors.aligned_to(weight)?;
        for year in weight.years().iter() {
            self.population.at(year)?;
        }
        let ratio = self.global_parameters.broadleaf_conifer_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(AgrifoodError::invalid_parameter(
                "broadleaf_conifer_ratio",
                format!("must be within [0, 1], got {}", ratio),
            ));
        }
        Ok(())
    }
}
