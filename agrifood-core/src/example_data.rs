//! A small synthetic datablock.
//!
//! The numbers are made up but internally consistent: every item balances, the
//! nutrient tables equal weight times nutrient factor, and the land grid has a
//! cell outside of the study area. Used by tests across the workspace.

use crate::datablock::{
    Datablock, FoodDomain, GlobalParameters, ImpactDomain, LandDomain, NutrientFactors, Population,
};
use crate::food_balance::FoodBalanceSheet;
use crate::item_table::ItemSeries;
use crate::items::{Element, ItemMeta, ItemOrigin};
use crate::spatial::{LandClass, LandGrid, LandUse};
use crate::timeseries::{FloatValue, YearAxis};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// First and last year covered by the example population projection
pub const EXAMPLE_YEARS: (i32, i32) = (2020, 2050);

struct ExampleItem {
    meta: ItemMeta,
    /// production, imports, exports, stock, losses, processing, other, feed, seed, food
    /// unit: g/cap/day
    elements: [FloatValue; Element::COUNT],
    /// protein, fat, energy per gram
    nutrients: [FloatValue; 3],
    /// unit: gco2e/gfood
    emissions: FloatValue,
}

fn item(
    id: u32,
    name: &str,
    group: &str,
    origin: ItemOrigin,
    elements: [FloatValue; Element::COUNT],
    nutrients: [FloatValue; 3],
    emissions: FloatValue,
) -> ExampleItem {
    ExampleItem {
        meta: ItemMeta::new(id, name, group, origin),
        elements,
        nutrients,
        emissions,
    }
}

fn example_items() -> Vec<ExampleItem> {
    use ItemOrigin::*;
    vec![
        item(2731, "Bovine Meat", "Meat", AnimalProducts,
            [25.0, 25.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 50.0], [0.26, 0.15, 2.5], 16.94),
        item(2732, "Mutton & Goat Meat", "Meat", AnimalProducts,
            [6.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 12.0], [0.25, 0.2, 2.9], 11.32),
        item(2733, "Pigmeat", "Meat", AnimalProducts,
            [30.0, 30.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 55.0], [0.2, 0.25, 3.0], 4.6),
        item(2734, "Poultry Meat", "Meat", AnimalProducts,
            [50.0, 10.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 55.0], [0.22, 0.1, 1.9], 3.2),
        item(2949, "Eggs", "Eggs", AnimalProducts,
            [30.0, 3.0, 1.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 30.0], [0.13, 0.1, 1.4], 2.6),
        item(2740, "Butter, Ghee", "Animal fats", AnimalProducts,
            [4.0, 3.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 6.0], [0.01, 0.8, 7.2], 9.5),
        item(2743, "Cream", "Animal fats", AnimalProducts,
            [5.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 5.0], [0.02, 0.35, 3.4], 5.0),
        item(2948, "Milk - Excluding Butter", "Milk - Excluding Butter", AnimalProducts,
            [400.0, 40.0, 40.0, 0.0, 0.0, 50.0, 0.0, 0.0, 0.0, 350.0], [0.033, 0.036, 0.64], 1.4),
        item(2511, "Wheat and products", "Cereals - Excluding Beer", VegetalProducts,
            [600.0, 100.0, 50.0, 0.0, 30.0, 50.0, 0.0, 350.0, 20.0, 200.0], [0.11, 0.02, 3.3], 0.8),
        item(2513, "Barley and products", "Cereals - Excluding Beer", VegetalProducts,
            [300.0, 10.0, 60.0, 0.0, 0.0, 40.0, 0.0, 180.0, 10.0, 20.0], [0.1, 0.02, 3.4], 0.7),
        item(2617, "Apples and products", "Fruits - Excluding Wine", VegetalProducts,
            [10.0, 40.0, 2.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 45.0], [0.003, 0.002, 0.5], 0.3),
        item(2601, "Tomatoes and products", "Vegetables", VegetalProducts,
            [8.0, 30.0, 1.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 35.0], [0.009, 0.002, 0.18], 0.6),
    ]
}

fn weight_table(items: &[ExampleItem], years: YearAxis) -> FoodBalanceSheet {
    let metas = items.iter().map(|i| i.meta.clone()).collect();
    let shape = (items.len(), years.len(), Element::COUNT);
    let values = ndarray::Array3::from_shape_fn(shape, |(i, _, e)| items[i].elements[e]);
    FoodBalanceSheet::new(metas, years, values).expect("example weight table is well formed")
}

fn nutrient_table(
    items: &[ExampleItem],
    years: YearAxis,
    unit: &str,
    nutrient: usize,
) -> ItemSeries {
    let metas = items.iter().map(|i| i.meta.clone()).collect();
    let factors: Vec<FloatValue> = items.iter().map(|i| i.nutrients[nutrient]).collect();
    ItemSeries::constant(unit, metas, years, &factors)
        .expect("example nutrient table is well formed")
}

fn population() -> Population {
    let years = YearAxis::new(EXAMPLE_YEARS.0, EXAMPLE_YEARS.1).expect("valid years");
    let span = (EXAMPLE_YEARS.1 - EXAMPLE_YEARS.0) as FloatValue;
    let values: Array1<FloatValue> = years
        .iter()
        .map(|year| 67e6 + 5e6 * (year - EXAMPLE_YEARS.0) as FloatValue / span)
        .collect();
    Population::new(years, values).expect("example population is well formed")
}

/// Cell outside of the study area
const OUTSIDE: (usize, usize) = (3, 2);

fn land() -> LandDomain {
    let grid = LandGrid::regular(4, 3, 100.0);
    let shape = grid.shape();
    let cell = |i: usize, j: usize| i * shape.1 + j;
    let class = |f: &dyn Fn(usize) -> FloatValue| {
        Array2::from_shape_fn(shape, |(i, j)| {
            if (i, j) == OUTSIDE {
                FloatValue::NAN
            } else {
                f(cell(i, j))
            }
        })
    };

    let arable = |k: usize| 10.0 + 5.0 * (k % 4) as FloatValue;
    let improved = |k: usize| 30.0 - 2.0 * (k % 3) as FloatValue;
    let mountain = |k: usize| 100.0 - arable(k) - improved(k) - 15.0 - 5.0 - 5.0 - 5.0;

    let land_use = LandUse::from_classes(
        grid,
        vec![
            (LandClass::Arable, class(&arable)),
            (LandClass::ImprovedGrassland, class(&improved)),
            (LandClass::SemiNaturalGrassland, class(&|_| 15.0)),
            (LandClass::BroadleafWoodland, class(&|_| 5.0)),
            (LandClass::ConiferousWoodland, class(&|_| 5.0)),
            (LandClass::BuiltUpAreasAndGardens, class(&|_| 5.0)),
            (LandClass::MountainHeathBog, class(&mountain)),
        ],
    )
    .expect("example land use is well formed");

    let mut maps = BTreeMap::new();
    maps.insert(
        "dominant_classification".to_string(),
        class(&|k| 1.0 + (k % 5) as FloatValue),
    );
    maps.insert(
        "peatland".to_string(),
        // 1: lowland peat, 2: upland peat
        class(&|k| match k % 4 {
            0 => 1.0,
            1 => 2.0,
            _ => 0.0,
        }),
    );
    LandDomain::new(land_use, maps)
}

/// Example datablock with food data for a given year axis
pub fn example_datablock_for(years: YearAxis) -> Datablock {
    let items = example_items();
    let weight = weight_table(&items, years);
    let nutrient_factors = NutrientFactors {
        protein: nutrient_table(&items, years, "g_prot/g_food", 0),
        fat: nutrient_table(&items, years, "g_fat/g_food", 1),
        energy: nutrient_table(&items, years, "kCal/g_food", 2),
    };
    let scaled = |factors: &ItemSeries| {
        weight
            .multiply_by_item_year(factors.values())
            .expect("aligned example tables")
    };
    let food = FoodDomain {
        protein: scaled(&nutrient_factors.protein),
        fat: scaled(&nutrient_factors.fat),
        energy: scaled(&nutrient_factors.energy),
        weight: weight.clone(),
        nutrient_factors,
        emissions_per_capita: None,
        rda_kcal: None,
    };

    let emissions: Vec<FloatValue> = items.iter().map(|i| i.emissions).collect();
    let metas = items.iter().map(|i| i.meta.clone()).collect();
    let emission_factors = ItemSeries::constant("gco2e/gfood", metas, years, &emissions)
        .expect("example emission factors");

    Datablock {
        food,
        land: land(),
        impact: ImpactDomain::new(emission_factors),
        population: population(),
        global_parameters: GlobalParameters::default(),
    }
}

/// Example datablock covering every year of the population projection
pub fn example_datablock() -> Datablock {
    let years = YearAxis::new(EXAMPLE_YEARS.0, EXAMPLE_YEARS.1).expect("valid years");
    example_datablock_for(years)
}

/// Example datablock holding only the base year, as delivered by a baseline provider
pub fn example_base_year() -> Datablock {
    example_datablock_for(YearAxis::single(EXAMPLE_YEARS.0))
}
