//! Flat scenario records for append-only persistence
//!
//! A record holds the ambition levels in slider order, a few advanced
//! coefficients and the scenario metrics, each under a fixed column name.

use crate::metrics::ScenarioMetrics;
use crate::scenario::{ScenarioParameters, SLIDERS, SLIDER_COUNT};
use agrifood_core::errors::{AgrifoodError, AgrifoodResult};
use agrifood_core::timeseries::FloatValue;

/// Advanced coefficients stored after the ambition levels
const ADVANCED_COLUMNS: [&str; 3] = ["elasticity", "bdleaf_seq_ha_yr", "conif_seq_ha_yr"];

/// Number of leading parameter columns in a record
pub const PARAMETER_COLUMNS: usize = SLIDER_COUNT + ADVANCED_COLUMNS.len();

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioRecord {
    pub columns: Vec<String>,
    pub values: Vec<FloatValue>,
}

impl ScenarioRecord {
    pub fn new(parameters: &ScenarioParameters, metrics: &ScenarioMetrics) -> Self {
        let advanced = &parameters.advanced;
        let mut columns: Vec<String> = SLIDERS.iter().map(|s| s.name.to_string()).collect();
        columns.extend(ADVANCED_COLUMNS.iter().map(|c| c.to_string()));

        let mut values = parameters.slider_values().to_vec();
        values.extend([advanced.elasticity, advanced.bdleaf_seq_ha_yr, advanced.conif_seq_ha_yr]);

        for (name, value) in metrics.named_values() {
            columns.push(name);
            values.push(value);
        }
        Self { columns, values }
    }

    /// Value of a named column
    pub fn get(&self, column: &str) -> Option<FloatValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }
}

/// Rebuild scenario parameters from a stored parameter vector.
///
/// Values are read in record order. A short vector leaves the remaining
/// parameters at their defaults and trailing metric columns are ignored.
pub fn replay(values: &[FloatValue]) -> AgrifoodResult<ScenarioParameters> {
    let mut parameters = ScenarioParameters::default();
    let mut values = values.iter().copied();

    for slider in SLIDERS.iter() {
        let Some(value) = values.next() else { break };
        let target = parameters.slider_mut(slider.name).ok_or_else(|| {
            AgrifoodError::Error(format!("no ambition level named {}", slider.name))
        })?;
        *target = value;
    }

    let advanced = &mut parameters.advanced;
    for (target, value) in [
        &mut advanced.elasticity,
        &mut advanced.bdleaf_seq_ha_yr,
        &mut advanced.conif_seq_ha_yr,
    ]
    .into_iter()
    .zip(values)
    {
        *target = value;
    }

    parameters.validate()?;
    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_vectors_keep_defaults() {
        let parameters = replay(&[50.0, 10.0]).unwrap();
        assert_eq!(parameters.ruminant, 50.0);
        assert_eq!(parameters.dairy, 10.0);
        assert_eq!(parameters.pig_poultry_eggs, 0.0);
        assert_eq!(parameters.advanced, ScenarioParameters::default().advanced);
    }

    #[test]
    fn advanced_columns_follow_sliders() {
        let mut values = vec![0.0; SLIDER_COUNT];
        values.extend([0.7, 10.0, 20.0, 123.0]);
        let parameters = replay(&values).unwrap();
        assert_eq!(parameters.advanced.elasticity, 0.7);
        assert_eq!(parameters.advanced.bdleaf_seq_ha_yr, 10.0);
        assert_eq!(parameters.advanced.conif_seq_ha_yr, 20.0);
    }

    #[test]
    fn replayed_values_are_validated() {
        let mut values = vec![0.0; SLIDER_COUNT];
        values[SLIDER_COUNT - 1] = 80.0;
        assert!(matches!(
            replay(&values),
            Err(AgrifoodError::InvalidParameter { .. })
        ));
    }
}
