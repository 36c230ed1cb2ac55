//! A pipeline is an ordered list of transformation steps applied to a datablock.
//!
//! The pipeline owns the step configuration only. Each run starts from a fresh
//! copy of the baseline datablock, so the same pipeline can be evaluated any
//! number of times and always gives the same result for the same baseline.
//!
//! Steps run in registration order and every step sees the cumulative effect of
//! the steps before it. The builder rejects registrations whose phases are out
//! of order, e.g. a land-use step registered after a technology step.

mod builder;
mod runtime;

#[cfg(test)]
mod tests;

pub use builder::PipelineBuilder;
pub use runtime::{Pipeline, ScenarioRun, StepDegradation};
