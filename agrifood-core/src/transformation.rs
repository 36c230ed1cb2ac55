use crate::datablock::Datablock;
use crate::errors::AgrifoodResult;
use crate::outcome::Outcome;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Stage of the scenario at which a step acts.
///
/// Steps must be registered in non-decreasing phase order. Land-use changes
/// depend on the production changes made by consumer-demand steps, and the
/// emissions aggregation reads the final weight and emission factor tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StepPhase {
    /// Projection of the baseline onto future years
    Projection,
    /// Diet changes, substitution and waste reduction
    ConsumerDemand,
    /// Moving area between land-use classes
    LandUse,
    /// Livestock and arable practice changes
    FarmingPractice,
    /// Engineered removals such as BECCS and DACCS
    Technology,
    /// Final emissions and sequestration aggregation
    Aggregation,
}

impl Display for StepPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepPhase::Projection => "projection",
            StepPhase::ConsumerDemand => "consumer demand",
            StepPhase::LandUse => "land use",
            StepPhase::FarmingPractice => "farming practice",
            StepPhase::Technology => "technology",
            StepPhase::Aggregation => "aggregation",
        };
        f.write_str(name)
    }
}

/// A single transformation of the datablock.
///
/// Implementations are parameter structs. A step must depend only on its
/// parameters and the datablock it receives, never on its position in the
/// pipeline.
#[typetag::serde(tag = "type")]
pub trait Transformation: Debug + Send + Sync {
    /// Phase this step belongs to
    fn phase(&self) -> StepPhase;

    /// Apply the step, returning the transformed datablock
    ///
    /// Recoverable configuration problems are reported as
    /// [`Outcome::Degraded`]. Any error aborts the scenario evaluation.
    fn apply(&self, datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>>;

    /// Name of the step, taken from its type name
    fn name(&self) -> String {
        let name = format!("{:?}", self);
        // Extract just the type name (before the first '{' or ' ')
        name.split(['{', ' ', '('])
            .next()
            .unwrap_or("UnknownStep")
            .to_string()
    }
}
