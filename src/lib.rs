//! Scenario calculator for the UK agrifood system.
//!
//! A scenario is a set of ambition levels for diet change, land use, farming
//! practice and carbon capture. [`setup::build_pipeline`] translates the
//! levels into an ordered pipeline of transformation steps from
//! `agrifood-components`, which is evaluated against a baseline datablock
//! supplied by a [`provider::BaselineProvider`].
//!
//! ```no_run
//! use agrifood::{run_scenario, ScenarioMetrics, ScenarioParameters};
//! # fn baseline() -> agrifood_core::datablock::Datablock { unimplemented!() }
//!
//! let parameters = ScenarioParameters::from_toml("ruminant = 50.0\nDACCS = 10.0").unwrap();
//! let run = run_scenario(&baseline(), &parameters).unwrap();
//! let metrics = ScenarioMetrics::from_datablock(&run.datablock, 2050).unwrap();
//! println!("Net emissions in 2050: {:.1} Mt CO2e", metrics.net_emissions());
//! ```

pub mod metrics;
pub mod provider;
pub mod record;
pub mod scenario;
pub mod setup;

pub use metrics::{ScenarioMetrics, SequestrationFamily};
pub use provider::{BaselineProvider, ClimateResponse};
pub use record::{replay, ScenarioRecord};
pub use scenario::{AdvancedSettings, ScenarioParameters};
pub use setup::{build_pipeline, run_scenario};
