//! Scenario evaluation from ambition levels to metrics.

use agrifood::metrics::SequestrationFamily;
use agrifood::provider::{attach_climate, BaselineProvider, ClimateResponse};
use agrifood::record::PARAMETER_COLUMNS;
use agrifood::{replay, run_scenario, ScenarioMetrics, ScenarioParameters, ScenarioRecord};
use agrifood_components::components::{ProjectFuture, ProjectFutureParameters};
use agrifood_core::datablock::{ClimateProjection, Datablock};
use agrifood_core::errors::{AgrifoodError, AgrifoodResult};
use agrifood_core::example_data::example_base_year;
use agrifood_core::items::{Element, ItemId};
use agrifood_core::pipeline::PipelineBuilder;
use agrifood_core::spatial::LandClass;
use agrifood_core::timeseries::{FloatValue, YearAxis};
use approx::assert_relative_eq;
use ndarray::{Array1, ArrayView1};
use std::sync::Arc;

struct ExampleBaseline;

impl BaselineProvider for ExampleBaseline {
    fn baseline(&self) -> AgrifoodResult<Datablock> {
        Ok(example_base_year())
    }
}

struct Unavailable;

impl BaselineProvider for Unavailable {
    fn baseline(&self) -> AgrifoodResult<Datablock> {
        Err(AgrifoodError::MissingData("baseline tables".to_string()))
    }
}

/// Parameters with a recommended intake below the example intake
fn parameters() -> ScenarioParameters {
    let mut parameters = ScenarioParameters::default();
    parameters.advanced.rda_kcal = 1200.0;
    parameters
}

fn weight(d: &Datablock, item: u32, element: Element) -> FloatValue {
    d.food.weight.get(ItemId(item), 2050, element).unwrap()
}

mod evaluation {
    use super::*;

    #[test]
    fn zero_ambition_reproduces_the_projection() {
        let baseline = run_scenario(&ExampleBaseline, &parameters()).unwrap();
        assert!(!baseline.is_degraded());

        let mut builder = PipelineBuilder::new();
        builder.with_step(Arc::new(ProjectFuture::from_parameters(
            ProjectFutureParameters::default(),
        )));
        let projection = builder.build().unwrap().run(&example_base_year()).unwrap().datablock;

        let out = &baseline.datablock;
        for item in [2731, 2948, 2511, 2617] {
            for element in [Element::Production, Element::Imports, Element::Food, Element::Feed] {
                assert_relative_eq!(
                    weight(out, item, element),
                    weight(&projection, item, element),
                    epsilon = 1e-9,
                    max_relative = 1e-9
                );
            }
        }
        for class in [
            LandClass::Arable,
            LandClass::ImprovedGrassland,
            LandClass::BroadleafWoodland,
        ] {
            assert_relative_eq!(
                out.land.percentage_land_use.class_total(class),
                projection.land.percentage_land_use.class_total(class),
                max_relative = 1e-9
            );
        }
        assert_eq!(out.impact.co2e_sequestration.total_at(2021).unwrap(), 0.0);
        assert!(out.impact.emissions.is_some());
    }

    #[test]
    fn no_ruminant_meat_by_the_end_of_the_window() {
        let mut p = parameters();
        p.ruminant = 100.0;
        let out = run_scenario(&ExampleBaseline, &p).unwrap().datablock;
        let reference = run_scenario(&ExampleBaseline, &parameters()).unwrap().datablock;

        for item in [2731, 2732] {
            assert_relative_eq!(weight(&out, item, Element::Food), 0.0, epsilon = 1e-9);
        }
        // Total consumption by weight is held constant by cereals
        let food = |d: &Datablock| d.food.weight.sum_items(Element::Food, None).unwrap()[30];
        assert_relative_eq!(food(&out), food(&reference), max_relative = 1e-9);
        assert!(weight(&out, 2511, Element::Food) > weight(&reference, 2511, Element::Food));
    }

    #[test]
    fn ambitious_scenario_keeps_land_and_balances_consistent() {
        let p = ScenarioParameters::from_toml(
            r#"
            ruminant = 50.0
            meat_alternatives = 30.0
            waste = 50.0
            foresting_pasture = 10.0
            land_BECCS = 5.0
            lowland_peatland = 50.0
            upland_peatland = 50.0
            soil_carbon = 20.0
            mixed_farming = 10.0
            silvopasture = 20.0
            methane_inhibitor = 50.0
            agroforestry = 20.0
            vertical_farming = 20.0
            DACCS = 5.0

            [advanced]
            rda_kcal = 1200.0
            "#,
        )
        .unwrap();
        let out = run_scenario(&ExampleBaseline, &p).unwrap().datablock;

        let land = &out.land.percentage_land_use;
        assert!(land.composition_error() < 1e-6);
        for class in LandClass::ALL {
            assert!(land.class(class).iter().filter(|v| v.is_finite()).all(|v| *v > -1e-9));
        }
        assert!(land.class_total(LandClass::Peatland) > 0.0);
        assert!(land.class_total(LandClass::Beccs) > 0.0);
        assert!(out.food.weight.balance_residual().iter().all(|r| r.abs() < 1e-6));
        assert!(out.food.weight.contains(ItemId(5000)));

        let sources = out.impact.co2e_sequestration.sources();
        for expected in ["Silvopasture", "Agroforestry", "BECCS from land", "DACCS", "Peatland"] {
            assert!(sources.contains(&expected), "missing {}", expected);
        }
    }
}

mod managed_land {
    use super::*;

    fn run(soil_carbon: FloatValue) -> Datablock {
        let mut p = parameters();
        p.soil_carbon = soil_carbon;
        p.agroforestry = 50.0;
        p.silvopasture = 50.0;
        run_scenario(&ExampleBaseline, &p).unwrap().datablock
    }

    #[test]
    fn managed_soils_still_host_agroecology() {
        let unmanaged = run(0.0);
        let managed = run(100.0);

        for item in [2511, 2731, 2617] {
            assert_relative_eq!(
                weight(&managed, item, Element::Production),
                weight(&unmanaged, item, Element::Production),
                max_relative = 1e-9
            );
        }
        for class in [LandClass::Agroforestry, LandClass::Silvopasture] {
            let area = |d: &Datablock| d.land.percentage_land_use.class_total(class);
            assert!(area(&unmanaged) > 0.0);
            assert_relative_eq!(area(&managed), area(&unmanaged), max_relative = 1e-9);
        }
        assert_eq!(
            managed.land.percentage_land_use.class_total(LandClass::Arable),
            0.0
        );
    }
}

mod failures {
    use super::*;

    #[test]
    fn out_of_range_levels_are_rejected() {
        let mut p = parameters();
        p.daccs = 50.0;
        assert!(matches!(
            run_scenario(&ExampleBaseline, &p),
            Err(AgrifoodError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn provider_failure_aborts_the_run() {
        assert!(matches!(
            run_scenario(&Unavailable, &parameters()),
            Err(AgrifoodError::MissingData(_))
        ));
    }
}

mod reporting {
    use super::*;

    #[test]
    fn capture_metrics() {
        let mut p = parameters();
        p.daccs = 5.0;
        let out = run_scenario(&ExampleBaseline, &p).unwrap().datablock;
        let metrics = ScenarioMetrics::from_datablock(&out, 2050).unwrap();

        assert_relative_eq!(
            metrics.sequestration[&SequestrationFamily::Daccs],
            5.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(metrics.cost, 5e6 * 180.0, max_relative = 1e-12);
        assert!(metrics.sequestration[&SequestrationFamily::Woodland] > 0.0);
        assert_eq!(metrics.sequestration[&SequestrationFamily::Beccs], 0.0);
        assert!(metrics.self_sufficiency > 0.0 && metrics.self_sufficiency < 1.0);
        assert!(metrics.emissions > 0.0);
    }

    #[test]
    fn records_replay_into_the_same_parameters() {
        let mut p = ScenarioParameters::default();
        p.ruminant = 40.0;
        p.foresting_pasture = -5.0;
        p.daccs = 2.0;
        p.advanced.elasticity = 0.6;
        p.advanced.rda_kcal = 1200.0;
        let out = run_scenario(&ExampleBaseline, &p).unwrap().datablock;
        let record = ScenarioRecord::new(&p, &ScenarioMetrics::from_datablock(&out, 2050).unwrap());

        assert_eq!(record.columns.len(), record.values.len());
        assert_eq!(record.get("DACCS"), Some(2.0));
        assert_eq!(record.get("elasticity"), Some(0.6));
        assert!(record.get("ssr_weight").is_some());
        assert!(record.values.len() > PARAMETER_COLUMNS);

        let mut replayed = replay(&record.values).unwrap();
        replayed.advanced.rda_kcal = 1200.0;
        assert_eq!(replayed, p);
    }

    /// Warming proportional to cumulative net emissions
    struct Tcre(FloatValue);

    impl ClimateResponse for Tcre {
        fn respond(
            &self,
            years: &YearAxis,
            emissions: ArrayView1<FloatValue>,
        ) -> AgrifoodResult<ClimateProjection> {
            let mut cumulative = 0.0;
            let temperature: Array1<FloatValue> = emissions
                .iter()
                .map(|e| {
                    cumulative += e;
                    cumulative * self.0
                })
                .collect();
            Ok(ClimateProjection {
                years: *years,
                temperature,
                concentration: Array1::zeros(years.len()),
                forcing: Array1::zeros(years.len()),
            })
        }
    }

    #[test]
    fn climate_response_is_attached() {
        let mut p = parameters();
        p.daccs = 20.0;
        let mut out = run_scenario(&ExampleBaseline, &p).unwrap().datablock;
        attach_climate(&mut out, &Tcre(1e-3)).unwrap();

        let climate = out.impact.climate.as_ref().unwrap();
        assert_eq!(climate.years, *out.years());
        assert_eq!(climate.temperature.len(), out.years().len());
    }
}
