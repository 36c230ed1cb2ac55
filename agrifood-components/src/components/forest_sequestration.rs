//! Woodland and peatland sequestration

use agrifood_core::datablock::Datablock;
use agrifood_core::errors::AgrifoodResult;
use agrifood_core::impact::append_sequestration;
use agrifood_core::outcome::Outcome;
use agrifood_core::spatial::LandClass;
use agrifood_core::timeseries::FloatValue;
use agrifood_core::transformation::{StepPhase, Transformation};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassSequestration {
    pub class: LandClass,
    /// unit: t CO2e / ha / yr
    pub rate: FloatValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestSequestrationParameters {
    pub classes: Vec<ClassSequestration>,
}

/// Sequestration by the final area of each class, phased in over the adoption window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestSequestration {
    parameters: ForestSequestrationParameters,
}

impl ForestSequestration {
    pub fn from_parameters(parameters: ForestSequestrationParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Transformation for ForestSequestration {
    fn phase(&self) -> StepPhase {
        StepPhase::Aggregation
    }

    fn apply(&self, mut datablock: Datablock) -> AgrifoodResult<Outcome<Datablock>> {
        let adoption = datablock.adoption_curve(0.0, 1.0)?;
        for ClassSequestration { class, rate } in &self.parameters.classes {
            let area = datablock.land.percentage_land_use.area_ha(*class);
            append_sequestration(&mut datablock, class.name(), &adoption * (area * rate))?;
        }
        Ok(Outcome::Ok(datablock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrifood_core::example_data::example_datablock;
    use is_close::is_close;

    #[test]
    fn every_class_gets_an_entry() {
        let datablock = example_datablock();
        let step = ForestSequestration::from_parameters(ForestSequestrationParameters {
            classes: vec![
                ClassSequestration {
                    class: LandClass::BroadleafWoodland,
                    rate: 12.5,
                },
                ClassSequestration {
                    class: LandClass::Peatland,
                    rate: 3.5,
                },
            ],
        });
        let out = step.apply(datablock.clone()).unwrap().into_value();
        let ledger = &out.impact.co2e_sequestration;

        assert_eq!(ledger.sources(), vec!["Broadleaf woodland", "Peatland"]);
        let broadleaf = datablock.land.percentage_land_use.area_ha(LandClass::BroadleafWoodland);
        assert!(is_close!(ledger.source_total("Broadleaf woodland")[30], broadleaf * 12.5));
        assert_eq!(ledger.source_total("Broadleaf woodland")[0], 0.0);
        // No peatland in the baseline
        assert_eq!(ledger.source_total("Peatland")[30], 0.0);
    }
}
