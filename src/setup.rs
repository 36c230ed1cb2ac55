//! Translation of scenario parameters into a pipeline
//!
//! Steps are registered in a fixed order: projection, consumer demand, land
//! use, livestock and arable practice, technology and finally aggregation.
//! Every step is registered whatever its ambition level, so the pipeline shape
//! and ledger layout are the same for every scenario.

use crate::provider::BaselineProvider;
use crate::scenario::{PracticeFactors, ScenarioParameters};
use agrifood_components::components::*;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::items::{Element, ItemId, ItemOrigin, ItemSelector};
use agrifood_core::pipeline::{Pipeline, PipelineBuilder, ScenarioRun};
use agrifood_core::spatial::{LandClass, MaskSelector};
use agrifood_core::timeseries::FloatValue;
use std::sync::Arc;

const RUMINANT_MEAT: [u32; 2] = [2731, 2732];
const PIG_POULTRY_EGGS: [u32; 3] = [2733, 2734, 2949];
const DAIRY: [u32; 3] = [2740, 2743, 2948];
const FRUIT_VEG: [&str; 2] = ["Vegetables", "Fruits - Excluding Wine"];
const CEREALS: &str = "Cereals - Excluding Beer";
const WHEAT: u32 = 2511;
const MILK: u32 = 2948;
const APPLES: u32 = 2617;
const ALTERNATIVE_MEAT: u32 = 5000;
const ALTERNATIVE_DAIRY: u32 = 5001;

/// Map of peat soils, 1 for lowland and 2 for upland peat
const PEAT_MAP: &str = "peatland";
const LOWLAND_PEAT: FloatValue = 1.0;
const UPLAND_PEAT: FloatValue = 2.0;

/// Tonnes per megatonne
const T_PER_MT: FloatValue = 1e6;

fn diet_shift(
    parameters: &ScenarioParameters,
    selection: ItemSelector,
    scale: FloatValue,
) -> ItemScaling {
    let advanced = &parameters.advanced;
    ItemScaling::from_parameters(ItemScalingParameters {
        selection,
        scale,
        source: vec![Element::Production, Element::Imports],
        elasticity: Some(vec![advanced.elasticity, 1.0 - advanced.elasticity]),
        quantity: advanced.scaling_nutrient,
        hold_constant: advanced.cereal_scaling,
        compensating_items: Some(ItemSelector::groups([CEREALS])),
    })
}

fn peat_restoration(restore_fraction: FloatValue, peat: FloatValue) -> Peatland {
    Peatland::from_parameters(PeatlandParameters {
        restore_fraction,
        land_types: vec![
            LandClass::ImprovedGrassland,
            LandClass::SemiNaturalGrassland,
            LandClass::Arable,
        ],
        items: ItemSelector::Origin(ItemOrigin::AnimalProducts),
        mask: Some(MaskSelector::new(PEAT_MAP, &[peat])),
    })
}

/// Emission factor and production steps for a farming practice at `adoption` %
fn practice(
    builder: &mut PipelineBuilder,
    items: ItemSelector,
    factors: PracticeFactors,
    adoption: FloatValue,
) {
    builder
        .with_step(Arc::new(ScaleImpact::from_parameters(ScaleImpactParameters {
            items: items.clone(),
            scale: 1.0 - factors.ghg * adoption / 100.0,
        })))
        .with_step(Arc::new(ScaleProduction::from_parameters(
            ScaleProductionParameters {
                items,
                scale: 1.0 - factors.prod * adoption / 100.0,
            },
        )));
}

fn agroecology(
    parameters: &ScenarioParameters,
    land_fraction: FloatValue,
    land_types: Vec<LandClass>,
    agroecology_class: LandClass,
    replaced_items: ItemSelector,
) -> Agroecology {
    let advanced = &parameters.advanced;
    Agroecology::from_parameters(AgroecologyParameters {
        land_fraction,
        land_types,
        agroecology_class,
        replaced_items,
        new_items: ItemSelector::items([APPLES]),
        new_item_yield: advanced.agroecology_item_yield,
        tree_coverage: advanced.agroecology_tree_coverage,
        seq_ha_yr: advanced.agroecology_seq_ha_yr,
    })
}

/// Build the scenario pipeline for a set of validated parameters
pub fn build_pipeline(parameters: &ScenarioParameters) -> AgrifoodResult<Pipeline> {
    parameters.validate()?;
    let p = parameters;
    let advanced = &p.advanced;
    let ruminants = || ItemSelector::items(RUMINANT_MEAT);
    let mut builder = PipelineBuilder::new();

    builder.with_step(Arc::new(ProjectFuture::from_parameters(ProjectFutureParameters {
        end_year: None,
        hold_production: advanced.hold_production,
        climate_decline: advanced.cc_production_decline,
    })));

    // Consumer demand
    builder
        .with_step(Arc::new(diet_shift(p, ruminants(), 1.0 - p.ruminant / 100.0)))
        .with_step(Arc::new(diet_shift(
            p,
            ItemSelector::items(PIG_POULTRY_EGGS),
            1.0 - p.pig_poultry_eggs / 100.0,
        )))
        .with_step(Arc::new(diet_shift(p, ItemSelector::items(DAIRY), 1.0 - p.dairy / 100.0)))
        .with_step(Arc::new(diet_shift(
            p,
            ItemSelector::groups(FRUIT_VEG),
            1.0 + p.fruit_veg / 100.0,
        )))
        .with_step_if(
            !advanced.cereal_scaling,
            Arc::new(diet_shift(p, ItemSelector::groups([CEREALS]), 1.0 + p.cereals / 100.0)),
        )
        .with_step(Arc::new(CulturedMeat::from_parameters(CulturedMeatParameters {
            cultured_scale: p.meat_alternatives / 100.0,
            emission_factor: advanced.labmeat_co2e,
            items: RUMINANT_MEAT.map(ItemId).to_vec(),
            copy_from: ItemId(RUMINANT_MEAT[0]),
            new_item: ItemId(ALTERNATIVE_MEAT),
            new_item_name: "Alternative meat".to_string(),
            source: vec![Element::Production],
            elasticity: None,
        })))
        .with_step(Arc::new(CulturedMeat::from_parameters(CulturedMeatParameters {
            cultured_scale: p.dairy_alternatives / 100.0,
            emission_factor: advanced.dairy_alternatives_co2e,
            items: vec![ItemId(MILK)],
            copy_from: ItemId(MILK),
            new_item: ItemId(ALTERNATIVE_DAIRY),
            new_item_name: "Alternative dairy".to_string(),
            source: vec![Element::Production],
            elasticity: None,
        })))
        .with_step(Arc::new(FoodWaste::from_parameters(FoodWasteParameters {
            waste_scale: p.waste,
            kcal_rda: advanced.rda_kcal,
            source: vec![Element::Production, Element::Imports],
            elasticity: Some(vec![advanced.elasticity, 1.0 - advanced.elasticity]),
        })));

    // Land use
    builder
        .with_step(Arc::new(ForestLand::from_parameters(ForestLandParameters {
            forest_fraction: p.foresting_pasture / 100.0,
            mask: None,
        })))
        .with_step(Arc::new(BeccsLand::from_parameters(BeccsLandParameters {
            farm_fraction: p.land_beccs / 100.0,
            ..Default::default()
        })))
        .with_step(Arc::new(peat_restoration(p.lowland_peatland / 100.0, LOWLAND_PEAT)))
        .with_step(Arc::new(peat_restoration(p.upland_peatland / 100.0, UPLAND_PEAT)))
        .with_step(Arc::new(ManagedLand::from_parameters(ManagedLandParameters {
            managed_fraction: p.soil_carbon / 100.0,
        })))
        .with_step(Arc::new(MixedFarming::from_parameters(MixedFarmingParameters {
            fraction: p.mixed_farming / 100.0,
            primary_scale: advanced.mixed_farming_crop_scale,
            secondary_items: ruminants(),
            secondary_scale: advanced.mixed_farming_livestock_scale,
            ..Default::default()
        })));

    // Livestock farming
    builder.with_step(Arc::new(agroecology(
        p,
        p.silvopasture / 100.0,
        LandClass::GRAZING_LAND.to_vec(),
        LandClass::Silvopasture,
        ruminants(),
    )));
    practice(&mut builder, ruminants(), advanced.methane, p.methane_inhibitor);
    practice(&mut builder, ruminants(), advanced.manure, p.manure_management);
    practice(&mut builder, ruminants(), advanced.breeding, p.animal_breeding);
    practice(&mut builder, ruminants(), advanced.fossil_livestock, p.fossil_livestock);

    // Arable farming
    builder
        .with_step(Arc::new(agroecology(
            p,
            p.agroforestry / 100.0,
            LandClass::CROP_LAND.to_vec(),
            LandClass::Agroforestry,
            ItemSelector::items([WHEAT]),
        )))
        .with_step(Arc::new(ZeroLand::from_parameters(ZeroLandParameters {
            items: ItemSelector::groups(FRUIT_VEG),
            reduction_fraction: p.vertical_farming / 100.0,
            land_types: LandClass::CROP_LAND.to_vec(),
        })));
    practice(
        &mut builder,
        ItemSelector::Origin(ItemOrigin::VegetalProducts),
        advanced.fossil_arable,
        p.fossil_arable,
    );

    // Technology
    builder.with_step(Arc::new(Ccs::from_parameters(CcsParameters::uk_default(
        p.waste_beccs * T_PER_MT,
        p.overseas_beccs * T_PER_MT,
        p.daccs * T_PER_MT,
    ))));

    // Aggregation
    let sequestration = |class, rate| ClassSequestration { class, rate };
    builder
        .with_step(Arc::new(ForestSequestration::from_parameters(
            ForestSequestrationParameters {
                classes: vec![
                    sequestration(LandClass::BroadleafWoodland, advanced.bdleaf_seq_ha_yr),
                    sequestration(LandClass::ConiferousWoodland, advanced.conif_seq_ha_yr),
                    sequestration(LandClass::Peatland, advanced.peatland_seq_ha_yr),
                ],
            },
        )))
        .with_step(Arc::new(ComputeEmissions::new()));

    log::debug!("Scenario pipeline has {} steps", builder.len());
    builder.build()
}

/// Evaluate a scenario against the baseline supplied by `provider`.
///
/// A provider failure aborts the evaluation.
pub fn run_scenario(
    provider: &dyn BaselineProvider,
    parameters: &ScenarioParameters,
) -> AgrifoodResult<ScenarioRun> {
    let pipeline = build_pipeline(parameters)?;
    let mut baseline = provider.baseline()?;
    baseline.global_parameters = parameters.global_parameters();
    pipeline.run(&baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrifood_core::datablock::FoodQuantity;
    use agrifood_core::transformation::{StepPhase, Transformation};

    #[test]
    fn pipeline_layout() {
        let pipeline = build_pipeline(&ScenarioParameters::default()).unwrap();
        let names = pipeline.step_names();
        assert_eq!(names.first().map(String::as_str), Some("ProjectFuture"));
        assert_eq!(names.last().map(String::as_str), Some("ComputeEmissions"));
        assert_eq!(names.iter().filter(|n| *n == "Peatland").count(), 2);
        assert_eq!(names.iter().filter(|n| *n == "ScaleImpact").count(), 5);

        let phases: Vec<StepPhase> = pipeline.steps().iter().map(|s| s.phase()).collect();
        assert!(phases.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn cereals_step_only_without_cereal_compensation() {
        let mut parameters = ScenarioParameters::default();
        let with_compensation = build_pipeline(&parameters).unwrap().len();
        parameters.advanced.cereal_scaling = false;
        assert_eq!(build_pipeline(&parameters).unwrap().len(), with_compensation + 1);
    }

    #[test]
    fn invalid_parameters_build_nothing() {
        let parameters = ScenarioParameters {
            land_beccs: 50.0,
            ..Default::default()
        };
        assert!(build_pipeline(&parameters).is_err());
    }

    #[test]
    fn scaling_quantity_is_configurable() {
        let mut parameters = ScenarioParameters::default();
        parameters.advanced.scaling_nutrient = FoodQuantity::Energy;
        let toml = build_pipeline(&parameters).unwrap().to_toml().unwrap();
        assert!(toml.contains("quantity = \"energy\""));
    }
}
