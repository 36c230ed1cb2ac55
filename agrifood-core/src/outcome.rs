//! Results which may have been computed with reduced fidelity.
//!
//! Invalid-but-recoverable configuration does not abort a scenario. The
//! offending option is disabled and the reason is attached to the result so the
//! caller can decide whether to log it, surface it or abort.

use crate::items::{Element, ItemId};
use crate::timeseries::{FloatValue, Year};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason a computation continued with degraded fidelity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Degradation {
    /// `hold_constant` was requested on a single-item table
    SingleItemHoldConstant,
    /// `hold_constant` was requested while scaling every item
    AllItemsHoldConstant,
    /// The compensating factor was negative for these years and was clamped to zero
    NegativeCompensation { element: Element, years: Vec<Year> },
    /// Compensating items which are not part of the table were ignored
    UnknownCompensatingItems(Vec<ItemId>),
    /// No compensating supply exists to offset the change so the total was not held
    NoCompensatingSupply { element: Element },
    /// A land fraction was outside of the available land and was capped
    LandFractionCapped {
        requested: FloatValue,
        applied: FloatValue,
    },
    /// Woodland was exhausted before cells could be brought back to 100%
    /// unit: summed percentage points over cells
    WoodlandExhausted { excess: FloatValue },
    /// Current intake is already below the recommended intake so no waste can be removed
    WasteBelowIntake {
        intake: FloatValue,
        recommended: FloatValue,
    },
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::SingleItemHoldConstant => {
                write!(f, "cannot hold the total constant on a single-item table")
            }
            Degradation::AllItemsHoldConstant => {
                write!(f, "cannot hold the total constant when scaling all items")
            }
            Degradation::NegativeCompensation { element, years } => write!(
                f,
                "additional {} cannot be compensated by non-selected items in {:?}",
                element, years
            ),
            Degradation::UnknownCompensatingItems(items) => {
                write!(f, "ignored unknown compensating items {:?}", items)
            }
            Degradation::NoCompensatingSupply { element } => write!(
                f,
                "no compensating {} available, the total is not held constant",
                element
            ),
            Degradation::LandFractionCapped { requested, applied } => write!(
                f,
                "land fraction {} exceeds the available land, capped at {}",
                requested, applied
            ),
            Degradation::WoodlandExhausted { excess } => write!(
                f,
                "woodland cannot absorb {} percentage points of excess land",
                excess
            ),
            Degradation::WasteBelowIntake {
                intake,
                recommended,
            } => write!(
                f,
                "intake of {} kCal is already below the recommended {} kCal",
                intake, recommended
            ),
        }
    }
}

/// A value plus any degradations encountered while producing it
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    Degraded { value: T, reasons: Vec<Degradation> },
}

impl<T> Outcome<T> {
    /// Wrap `value`, marking it as degraded only if `reasons` is not empty.
    pub fn new(value: T, reasons: Vec<Degradation>) -> Self {
        if reasons.is_empty() {
            Outcome::Ok(value)
        } else {
            Outcome::Degraded { value, reasons }
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Ok(value) => value,
            Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        self.into_parts().0
    }

    pub fn into_parts(self) -> (T, Vec<Degradation>) {
        match self {
            Outcome::Ok(value) => (value, vec![]),
            Outcome::Degraded { value, reasons } => (value, reasons),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn reasons(&self) -> &[Degradation] {
        match self {
            Outcome::Ok(_) => &[],
            Outcome::Degraded { reasons, .. } => reasons,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        let (value, reasons) = self.into_parts();
        Outcome::new(f(value), reasons)
    }

    /// Move any degradations into `sink` and return the value.
    ///
    /// Used by steps which chain several degradable operations.
    pub fn collect(self, sink: &mut Vec<Degradation>) -> T {
        let (value, reasons) = self.into_parts();
        sink.extend(reasons);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reasons_are_ok() {
        let outcome = Outcome::new(1, vec![]);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.into_value(), 1);
    }

    #[test]
    fn collect_drains_reasons() {
        let mut sink = vec![];
        let outcome = Outcome::new(2, vec![Degradation::SingleItemHoldConstant]);
        assert!(outcome.is_degraded());
        let value = outcome.map(|v| v * 2).collect(&mut sink);
        assert_eq!(value, 4);
        assert_eq!(sink, vec![Degradation::SingleItemHoldConstant]);
    }

    #[test]
    fn display() {
        let reason = Degradation::NegativeCompensation {
            element: Element::Food,
            years: vec![2049, 2050],
        };
        assert_eq!(
            reason.to_string(),
            "additional food cannot be compensated by non-selected items in [2049, 2050]"
        );
    }
}
