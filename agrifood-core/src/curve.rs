//! Adoption curves
//!
//! Interventions are phased in over a transition window rather than applied as a
//! step change. A curve holds `initial` for every year up to the start of the
//! window, `target` from the end of the window onwards and interpolates between
//! the two in between.

use crate::errors::{AgrifoodError, AgrifoodResult};
use crate::timeseries::{FloatValue, Year, YearAxis};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Steepness of the logistic transition over a unit window
const LOGISTIC_STEEPNESS: FloatValue = 10.0;

/// Shape of the transition between the pivot years
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdoptionShape {
    /// Constant slope between the pivot years
    Linear,
    /// Slow-fast-slow sigmoid normalised to hit both endpoints exactly
    #[default]
    Logistic,
}

/// A fully specified adoption curve over a year axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdoptionCurve {
    pub shape: AdoptionShape,
    /// Last year at the initial value
    pub pivot_year: Year,
    /// Length of the transition window in years
    pub timescale: u32,
    pub initial: FloatValue,
    pub target: FloatValue,
}

impl AdoptionCurve {
    pub fn logistic(
        pivot_year: Year,
        timescale: u32,
        initial: FloatValue,
        target: FloatValue,
    ) -> Self {
        Self {
            shape: AdoptionShape::Logistic,
            pivot_year,
            timescale,
            initial,
            target,
        }
    }

    pub fn linear(
        pivot_year: Year,
        timescale: u32,
        initial: FloatValue,
        target: FloatValue,
    ) -> Self {
        Self {
            shape: AdoptionShape::Linear,
            ..Self::logistic(pivot_year, timescale, initial, target)
        }
    }

    /// Evaluate the curve on every year of `years`.
    ///
    /// The transition window is truncated to the last year of the axis.
    pub fn evaluate(&self, years: &YearAxis) -> Array1<FloatValue> {
        let y0 = years.start();
        let y3 = years.end();
        let y1 = self.pivot_year;
        let y2 = (self.pivot_year + self.timescale as Year).min(y3);

        match self.shape {
            AdoptionShape::Linear => linear_scale(y0, y1, y2, y3, self.initial, self.target),
            AdoptionShape::Logistic => logistic_scale(y0, y1, y2, y3, self.initial, self.target),
        }
    }

    /// Evaluate the curve and check it against a table's year axis.
    pub fn evaluate_checked(
        &self,
        years: &YearAxis,
        context: &str,
    ) -> AgrifoodResult<Array1<FloatValue>> {
        if !self.initial.is_finite() || !self.target.is_finite() {
            return Err(AgrifoodError::invalid_parameter(
                context,
                format!(
                    "adoption curve endpoints must be finite, got {} -> {}",
                    self.initial, self.target
                ),
            ));
        }
        let values = self.evaluate(years);
        years.check_series(values.len(), context)?;
        Ok(values)
    }
}

/// Generic transition between `y1` and `y2` using a unit-interval shape function.
fn transition<F>(
    y0: Year,
    y1: Year,
    y2: Year,
    y3: Year,
    c_init: FloatValue,
    c_end: FloatValue,
    shape: F,
) -> Array1<FloatValue>
where
    F: Fn(FloatValue) -> FloatValue,
{
    let y2 = y2.min(y3);
    (y0..=y3)
        .map(|year| {
            if year <= y1 {
                c_init
            } else if year >= y2 {
                c_end
            } else {
                let s = (year - y1) as FloatValue / (y2 - y1) as FloatValue;
                c_init + (c_end - c_init) * shape(s)
            }
        })
        .collect()
}

/// Linear adoption from `c_init` at `y1` to `c_end` at `y2`, over the years `y0..=y3`.
pub fn linear_scale(
    y0: Year,
    y1: Year,
    y2: Year,
    y3: Year,
    c_init: FloatValue,
    c_end: FloatValue,
) -> Array1<FloatValue> {
    transition(y0, y1, y2, y3, c_init, c_end, |s| s)
}

/// Logistic adoption from `c_init` at `y1` to `c_end` at `y2`, over the years `y0..=y3`.
///
/// The sigmoid is centred on the middle of the window and rescaled so that it is
/// exactly 0 at `y1` and exactly 1 at `y2`.
pub fn logistic_scale(
    y0: Year,
    y1: Year,
    y2: Year,
    y3: Year,
    c_init: FloatValue,
    c_end: FloatValue,
) -> Array1<FloatValue> {
    let sigmoid = |s: FloatValue| 1.0 / (1.0 + (-LOGISTIC_STEEPNESS * (s - 0.5)).exp());
    let low = sigmoid(0.0);
    let high = sigmoid(1.0);
    transition(y0, y1, y2, y3, c_init, c_end, |s| (sigmoid(s) - low) / (high - low))
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn axis() -> YearAxis {
        YearAxis::new(2015, 2060).unwrap()
    }

    #[test]
    fn endpoints_are_exact() {
        for curve in [
            AdoptionCurve::logistic(2021, 20, 1.0, 0.25),
            AdoptionCurve::linear(2021, 20, 1.0, 0.25),
        ] {
            let values = curve.evaluate(&axis());
            assert_eq!(values[0], 1.0);
            // 2021 is the last year at the initial value
            assert_eq!(values[6], 1.0);
            // 2041 onwards is at the target
            for v in values.slice(ndarray::s![26..]).iter() {
                assert_eq!(*v, 0.25);
            }
        }
    }

    #[test]
    fn monotonic_in_window() {
        let values = AdoptionCurve::logistic(2021, 20, 0.0, 5.0).evaluate(&axis());
        for pair in values.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        let values = AdoptionCurve::linear(2021, 20, 2.0, -1.0).evaluate(&axis());
        for pair in values.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
    }

    #[test]
    fn linear_midpoint() {
        let values = linear_scale(2020, 2020, 2030, 2030, 0.0, 10.0);
        assert!(is_close!(values[5], 5.0));
    }

    #[test]
    fn logistic_is_symmetric() {
        let values = logistic_scale(2020, 2020, 2030, 2030, 0.0, 1.0);
        assert!(is_close!(values[5], 0.5));
        assert!(is_close!(values[3] + values[7], 1.0));
    }

    #[test]
    fn window_truncated_to_axis() {
        let years = YearAxis::new(2020, 2030).unwrap();
        let values = AdoptionCurve::logistic(2021, 50, 1.0, 0.0).evaluate(&years);
        assert_eq!(values.len(), 11);
        assert_eq!(values[10], 0.0);
    }

    #[test]
    fn zero_timescale_is_a_step() {
        let years = YearAxis::new(2020, 2025).unwrap();
        let values = AdoptionCurve::logistic(2021, 0, 1.0, 3.0).evaluate(&years);
        assert_eq!(values.to_vec(), vec![1.0, 1.0, 3.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn non_finite_target_rejected() {
        let curve = AdoptionCurve::linear(2021, 10, 1.0, FloatValue::NAN);
        assert!(curve.evaluate_checked(&axis(), "test").is_err());
    }
}
