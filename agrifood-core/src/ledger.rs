use crate::errors::{AgrifoodError, AgrifoodResult};
use crate::timeseries::{FloatValue, Year, YearAxis};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Name of the contributing source, e.g. `Broadleaf woodland` or `DACCS`
    pub source: String,
    pub values: Array1<FloatValue>,
}

/// An append-only collection of named annual series.
///
/// Every contributing step appends its own entries. Entries are never merged or
/// overwritten, so the same source name may appear more than once and each
/// contribution stays individually queryable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// Unit of every entry, e.g. `t CO2e / yr`
    pub unit: String,
    years: YearAxis,
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new(unit: &str, years: YearAxis) -> Self {
        Self {
            unit: unit.to_string(),
            years,
            entries: Vec::new(),
        }
    }

    pub fn years(&self) -> &YearAxis {
        &self.years
    }

    /// Append a new entry to the ledger
    pub fn append(&mut self, source: &str, values: Array1<FloatValue>) -> AgrifoodResult<()> {
        self.years.check_series(values.len(), &self.unit)?;
        self.entries.push(LedgerEntry {
            source: source.to_string(),
            values,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    pub fn sources(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.source.as_str()).collect()
    }

    /// Sum of all entries with the given source name
    pub fn source_total(&self, source: &str) -> Array1<FloatValue> {
        self.entries
            .iter()
            .filter(|e| e.source == source)
            .fold(Array1::zeros(self.years.len()), |acc, e| acc + &e.values)
    }

    /// Sum of every entry, per year
    pub fn total(&self) -> Array1<FloatValue> {
        self.entries
            .iter()
            .fold(Array1::zeros(self.years.len()), |acc, e| acc + &e.values)
    }

    pub fn total_at(&self, year: Year) -> AgrifoodResult<FloatValue> {
        let i = self.years.try_index_of(year, &self.unit)?;
        Ok(self.entries.iter().map(|e| e.values[i]).sum())
    }

    /// Extend to a longer year axis, holding the last value of every entry constant.
    pub fn extend_years(&mut self, end: Year) -> AgrifoodResult<()> {
        let extended = self.years.extended_to(end);
        let extra = extended.len() - self.years.len();
        for entry in self.entries.iter_mut() {
            let last = *entry.values.last().ok_or_else(|| {
                AgrifoodError::MissingData(format!("empty ledger entry {}", entry.source))
            })?;
            let mut values = entry.values.to_vec();
            values.extend(std::iter::repeat(last).take(extra));
            entry.values = Array1::from(values);
        }
        self.years = extended;
        Ok(())
    }
}

impl IntoIterator for Ledger {
    type Item = LedgerEntry;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
