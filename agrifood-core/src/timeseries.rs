//! Year axis shared by every year-indexed table.

use crate::errors::{AgrifoodError, AgrifoodResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub type FloatValue = f64;
pub type Year = i32;

/// A contiguous, inclusive range of calendar years.
///
/// Every year-indexed table in a datablock uses one of these as its `Year`
/// coordinate, so alignment checks reduce to comparing two axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearAxis {
    start: Year,
    end: Year,
}

impl YearAxis {
    pub fn new(start: Year, end: Year) -> AgrifoodResult<Self> {
        if end < start {
            return Err(AgrifoodError::invalid_parameter(
                "years",
                format!("end year {} is before start year {}", end, start),
            ));
        }
        Ok(Self { start, end })
    }

    /// An axis holding a single year.
    pub fn single(year: Year) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    pub fn start(&self) -> Year {
        self.start
    }

    pub fn end(&self) -> Year {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    /// Always false, an axis holds at least one year.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, year: Year) -> bool {
        year >= self.start && year <= self.end
    }

    /// Position of `year` along the axis
    pub fn index_of(&self, year: Year) -> Option<usize> {
        self.contains(year).then(|| (year - self.start) as usize)
    }

    /// Position of `year`, failing if the year is not covered.
    pub fn try_index_of(&self, year: Year, context: &str) -> AgrifoodResult<usize> {
        self.index_of(year).ok_or_else(|| AgrifoodError::YearNotFound {
            year,
            context: context.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Year> {
        self.start..=self.end
    }

    /// The same axis extended (never shortened) to finish at `end`.
    pub fn extended_to(&self, end: Year) -> Self {
        Self {
            start: self.start,
            end: self.end.max(end),
        }
    }

    /// Year values as floats, useful for interpolation.
    pub fn values(&self) -> Array1<FloatValue> {
        self.iter().map(|y| y as FloatValue).collect()
    }

    pub fn check_series(&self, series_len: usize, context: &str) -> AgrifoodResult<()> {
        if series_len != self.len() {
            return Err(AgrifoodError::shape_mismatch(
                context,
                self.len(),
                series_len,
            ));
        }
        Ok(())
    }
}
