//! Pipeline struct and runtime execution.

use crate::datablock::Datablock;
use crate::errors::{AgrifoodError, AgrifoodResult};
use crate::outcome::Degradation;
use serde::{Deserialize, Serialize};

use super::builder::S;

/// A degradation reported by one step of a run
#[derive(Clone, Debug, PartialEq)]
pub struct StepDegradation {
    /// Position of the step in the pipeline
    pub step_index: usize,
    pub step: String,
    pub reason: Degradation,
}

/// Result of evaluating a pipeline against a baseline
#[derive(Clone, Debug)]
pub struct ScenarioRun {
    pub datablock: Datablock,
    pub degradations: Vec<StepDegradation>,
}

impl ScenarioRun {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// An ordered, validated list of transformation steps.
#[derive(Debug, Serialize, Deserialize)]
pub struct Pipeline {
    steps: Vec<S>,
}

impl Pipeline {
    pub(crate) fn new(steps: Vec<S>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[S] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Serialise the step configuration to TOML
    pub fn to_toml(&self) -> AgrifoodResult<String> {
        toml::to_string(self).map_err(|e| AgrifoodError::Serialization(e.to_string()))
    }

    /// Load a step configuration from TOML
    pub fn from_toml(value: &str) -> AgrifoodResult<Self> {
        toml::from_str(value).map_err(|e| AgrifoodError::Serialization(e.to_string()))
    }

    /// Names of the steps in execution order
    pub fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Evaluate every step against a copy of `baseline`.
    ///
    /// The baseline is never modified. Any step error aborts the run and no
    /// partially transformed datablock is returned.
    pub fn run(&self, baseline: &Datablock) -> AgrifoodResult<ScenarioRun> {
        baseline.validate()?;
        let mut datablock = baseline.clone();
        let mut degradations = vec![];

        for (step_index, step) in self.steps.iter().enumerate() {
            let name = step.name();
            log::debug!("Running step {} ({}): {}", step_index, step.phase(), name);

            let outcome = step
                .apply(datablock)
                .map_err(|source| AgrifoodError::StepFailed {
                    step: name.clone(),
                    source: Box::new(source),
                })?;
            let (value, reasons) = outcome.into_parts();
            for reason in reasons {
                log::warn!("{}: {}", name, reason);
                degradations.push(StepDegradation {
                    step_index,
                    step: name.clone(),
                    reason,
                });
            }
            datablock = value;
        }

        log::info!(
            "Scenario evaluated with {} steps ({} degradations)",
            self.steps.len(),
            degradations.len()
        );
        Ok(ScenarioRun {
            datablock,
            degradations,
        })
    }
}
