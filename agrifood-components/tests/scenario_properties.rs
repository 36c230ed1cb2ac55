//! End-to-end properties of scenario steps run through a pipeline.

use agrifood_components::components::*;
use agrifood_core::datablock::{Datablock, FoodQuantity};
use agrifood_core::example_data::{example_base_year, example_datablock};
use agrifood_core::items::{Element, ItemId, ItemOrigin, ItemSelector};
use agrifood_core::pipeline::{Pipeline, PipelineBuilder};
use agrifood_core::spatial::{LandClass, MaskSelector};
use agrifood_core::timeseries::FloatValue;
use approx::assert_relative_eq;
use std::sync::Arc;

fn weight(d: &Datablock, item: u32, element: Element) -> FloatValue {
    d.food.weight.get(ItemId(item), 2050, element).unwrap()
}

fn supply_sources() -> Vec<Element> {
    vec![Element::Production, Element::Imports]
}

fn full_pipeline() -> Pipeline {
    let ruminants = ItemSelector::items([2731_u32, 2732]);
    let mut builder = PipelineBuilder::new();
    builder
        .with_step(Arc::new(ProjectFuture::from_parameters(ProjectFutureParameters::default())))
        .with_step(Arc::new(ItemScaling::from_parameters(ItemScalingParameters {
            selection: ruminants.clone(),
            scale: 0.5,
            source: supply_sources(),
            elasticity: Some(vec![0.5, 0.5]),
            quantity: FoodQuantity::Weight,
            hold_constant: true,
            compensating_items: Some(ItemSelector::groups(["Cereals - Excluding Beer"])),
        })))
        .with_step(Arc::new(CulturedMeat::from_parameters(CulturedMeatParameters {
            cultured_scale: 0.3,
            emission_factor: 5.0,
            items: vec![ItemId(2731), ItemId(2732)],
            copy_from: ItemId(2731),
            new_item: ItemId(5000),
            new_item_name: "Alternative meat".to_string(),
            source: vec![Element::Production],
            elasticity: None,
        })))
        .with_step(Arc::new(FoodWaste::from_parameters(FoodWasteParameters {
            waste_scale: 50.0,
            kcal_rda: 1200.0,
            source: supply_sources(),
            elasticity: Some(vec![0.5, 0.5]),
        })))
        .with_step(Arc::new(ForestLand::from_parameters(ForestLandParameters {
            forest_fraction: 0.05,
            mask: None,
        })))
        .with_step(Arc::new(BeccsLand::from_parameters(BeccsLandParameters {
            farm_fraction: 0.1,
            ..Default::default()
        })))
        .with_step(Arc::new(Peatland::from_parameters(PeatlandParameters {
            restore_fraction: 0.5,
            land_types: vec![
                LandClass::ImprovedGrassland,
                LandClass::SemiNaturalGrassland,
                LandClass::Arable,
            ],
            items: ItemSelector::Origin(ItemOrigin::AnimalProducts),
            mask: Some(MaskSelector::new("peatland", &[1.0])),
        })))
        .with_step(Arc::new(ManagedLand::from_parameters(ManagedLandParameters {
            managed_fraction: 0.2,
        })))
        .with_step(Arc::new(MixedFarming::from_parameters(MixedFarmingParameters {
            fraction: 0.1,
            ..Default::default()
        })))
        .with_step(Arc::new(Agroecology::from_parameters(AgroecologyParameters {
            land_fraction: 0.2,
            land_types: LandClass::PASTURE.to_vec(),
            agroecology_class: LandClass::Silvopasture,
            replaced_items: ruminants.clone(),
            new_items: ItemSelector::items([2617_u32]),
            new_item_yield: 1e2,
            tree_coverage: 0.1,
            seq_ha_yr: AGROECOLOGY_SEQUESTRATION,
        })))
        .with_step(Arc::new(ScaleImpact::from_parameters(ScaleImpactParameters {
            items: ruminants.clone(),
            scale: 0.85,
        })))
        .with_step(Arc::new(ScaleProduction::from_parameters(ScaleProductionParameters {
            items: ruminants,
            scale: 0.95,
        })))
        .with_step(Arc::new(ZeroLand::from_parameters(ZeroLandParameters {
            items: ItemSelector::groups(["Vegetables", "Fruits - Excluding Wine"]),
            reduction_fraction: 0.5,
            land_types: LandClass::CROP_LAND.to_vec(),
        })))
        .with_step(Arc::new(Ccs::from_parameters(CcsParameters::uk_default(1e6, 2e6, 1e6))))
        .with_step(Arc::new(ForestSequestration::from_parameters(
            ForestSequestrationParameters {
                classes: vec![
                    ClassSequestration {
                        class: LandClass::BroadleafWoodland,
                        rate: 12.5,
                    },
                    ClassSequestration {
                        class: LandClass::ConiferousWoodland,
                        rate: 23.5,
                    },
                    ClassSequestration {
                        class: LandClass::Peatland,
                        rate: 3.5,
                    },
                ],
            },
        )))
        .with_step(Arc::new(ComputeEmissions::new()));
    builder.build().unwrap()
}

mod consumer_demand {
    use super::*;

    #[test]
    fn removing_ruminant_meat_empties_its_supply() {
        let datablock = example_datablock();
        let step = ItemScaling::from_parameters(ItemScalingParameters {
            selection: ItemSelector::items([2731_u32, 2732]),
            scale: 0.0,
            source: supply_sources(),
            elasticity: Some(vec![0.5, 0.5]),
            quantity: FoodQuantity::Weight,
            hold_constant: false,
            compensating_items: None,
        });
        let mut builder = PipelineBuilder::new();
        builder.with_step(Arc::new(step));
        let out = builder.build().unwrap().run(&datablock).unwrap().datablock;

        for item in [2731, 2732] {
            assert_eq!(weight(&out, item, Element::Food), 0.0);
            assert_eq!(weight(&out, item, Element::Production), 0.0);
            assert_eq!(weight(&out, item, Element::Imports), 0.0);
        }

        // Feed follows animal production: 519 of 550 g remain
        assert_relative_eq!(
            weight(&out, 2511, Element::Feed),
            350.0 * 519.0 / 550.0,
            max_relative = 1e-9
        );
        assert!(out.food.weight.balance_residual().iter().all(|r| r.abs() < 1e-9));
    }
}

mod land_use {
    use super::*;

    #[test]
    fn restoring_all_peat_moves_animal_production_to_imports() {
        let datablock = example_datablock();
        let step = Peatland::from_parameters(PeatlandParameters {
            restore_fraction: 1.0,
            land_types: LandClass::PASTURE.to_vec(),
            items: ItemSelector::Origin(ItemOrigin::AnimalProducts),
            mask: Some(MaskSelector::new("dominant_classification", &[1.0, 2.0, 3.0, 4.0, 5.0])),
        });
        let mut builder = PipelineBuilder::new();
        builder.with_step(Arc::new(step));
        let run = builder.build().unwrap().run(&datablock).unwrap();
        assert!(!run.is_degraded());
        let out = run.datablock;

        assert_eq!(out.land.percentage_land_use.classes_total(&LandClass::PASTURE), 0.0);
        for item in [2731, 2948] {
            assert_eq!(weight(&out, item, Element::Production), 0.0);
            assert_relative_eq!(
                weight(&out, item, Element::Imports),
                weight(&datablock, item, Element::Imports)
                    + weight(&datablock, item, Element::Production)
            );
        }
        assert_eq!(weight(&out, 2511, Element::Production), 600.0);
    }

    #[test]
    fn cells_stay_complete_through_a_full_scenario() {
        let run = full_pipeline().run(&example_base_year()).unwrap();
        let land = &run.datablock.land.percentage_land_use;
        assert!(land.composition_error() < 1e-6);
        for class in LandClass::ALL {
            assert!(land.class(class).iter().filter(|v| v.is_finite()).all(|v| *v > -1e-9));
        }
        assert!(run.datablock.food.weight.balance_residual().iter().all(|r| r.abs() < 1e-6));
    }
}

mod ledgers {
    use super::*;

    #[test]
    fn separate_capture_steps_keep_their_entries() {
        let source = |name: &str, tonnes| CaptureSource {
            name: name.to_string(),
            technology: CaptureTechnology::Beccs,
            capacity: CaptureCapacity::Fixed(tonnes),
        };
        let mut builder = PipelineBuilder::new();
        builder
            .with_step(Arc::new(Ccs::from_parameters(CcsParameters {
                sources: vec![source("BECCS from waste", 1e6)],
            })))
            .with_step(Arc::new(Ccs::from_parameters(CcsParameters {
                sources: vec![source("BECCS from overseas biomass", 2e6)],
            })));
        let out = builder.build().unwrap().run(&example_datablock()).unwrap().datablock;

        let ledger = &out.impact.co2e_sequestration;
        assert_eq!(
            ledger.sources(),
            vec!["BECCS from waste", "BECCS from overseas biomass"]
        );
        assert_eq!(ledger.total_at(2050).unwrap(), 3e6);
        assert_eq!(out.impact.cost.sources().len(), 2);
    }

    #[test]
    fn full_scenario_records_every_source() {
        let out = full_pipeline().run(&example_base_year()).unwrap().datablock;
        let sources = out.impact.co2e_sequestration.sources();
        for expected in [
            "Silvopasture",
            "BECCS from waste",
            "BECCS from overseas biomass",
            "BECCS from land",
            "DACCS",
            "Broadleaf woodland",
            "Coniferous woodland",
            "Peatland",
        ] {
            assert!(sources.contains(&expected), "missing {}", expected);
        }
        assert!(out.impact.emissions.is_some());
    }
}

mod configuration {
    use super::*;

    #[test]
    fn pipeline_round_trips_through_toml() {
        let pipeline = full_pipeline();
        let serialised = pipeline.to_toml().unwrap();
        let restored = Pipeline::from_toml(&serialised).unwrap();
        assert_eq!(restored.step_names(), pipeline.step_names());

        let baseline = example_base_year();
        let expected = pipeline.run(&baseline).unwrap().datablock;
        let actual = restored.run(&baseline).unwrap().datablock;
        assert_eq!(actual.food, expected.food);
        assert_eq!(actual.impact, expected.impact);
    }

    #[test]
    fn steps_load_from_hand_written_toml() {
        let pipeline = Pipeline::from_toml(
            r#"
            [[steps]]
            type = "ScaleImpact"
            [steps.parameters]
            scale = 0.7
            items = { items = [2731, 2732] }

            [[steps]]
            type = "ComputeEmissions"
            "#,
        )
        .unwrap();
        assert_eq!(pipeline.step_names(), vec!["ScaleImpact", "ComputeEmissions"]);

        let out = pipeline.run(&example_datablock()).unwrap().datablock;
        assert_relative_eq!(
            out.impact.emission_factors.get(ItemId(2731), 2050).unwrap(),
            0.7 * 16.94,
            max_relative = 1e-12
        );
    }
}
