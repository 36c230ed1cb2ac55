//! Pipeline builder for registering steps in order.

use crate::errors::{AgrifoodError, AgrifoodResult};
use crate::transformation::{StepPhase, Transformation};
use std::sync::Arc;

use super::runtime::Pipeline;

/// Type alias for a step wrapped in an Arc for shared ownership.
pub type S = Arc<dyn Transformation>;

/// Build a new pipeline from a list of steps.
#[derive(Default)]
pub struct PipelineBuilder {
    steps: Vec<S>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self { steps: vec![] }
    }

    /// Register a step to run after all previously registered steps
    pub fn with_step(&mut self, step: S) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Register a step only if `enabled`
    pub fn with_step_if(&mut self, enabled: bool, step: S) -> &mut Self {
        if enabled {
            self.steps.push(step);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Validate the phase order and build the pipeline.
    pub fn build(&self) -> AgrifoodResult<Pipeline> {
        let mut previous: Option<StepPhase> = None;
        for step in &self.steps {
            let phase = step.phase();
            if let Some(previous) = previous {
                if phase < previous {
                    return Err(AgrifoodError::PhaseOrder {
                        step: step.name(),
                        phase: phase.to_string(),
                        previous: previous.to_string(),
                    });
                }
            }
            previous = Some(phase);
        }
        Ok(Pipeline::new(self.steps.clone()))
    }
}
