//! Per-item coefficient tables indexed by (item, year)
//!
//! Used for emission factors (`gco2e/gfood`) and nutrient densities
//! (`g_prot/g_food`, `g_fat/g_food`, `kCal/g_food`).

use crate::errors::{AgrifoodError, AgrifoodResult};
use crate::food_balance::FoodBalanceSheet;
use crate::items::{ItemId, ItemMeta};
use crate::timeseries::{FloatValue, Year, YearAxis};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSeries {
    /// Unit of the coefficients, e.g. `gco2e/gfood`
    pub unit: String,
    items: Vec<ItemMeta>,
    years: YearAxis,
    values: Array2<FloatValue>,
}

impl ItemSeries {
    pub fn new(
        unit: &str,
        items: Vec<ItemMeta>,
        years: YearAxis,
        values: Array2<FloatValue>,
    ) -> AgrifoodResult<Self> {
        let expected = (items.len(), years.len());
        if values.dim() != expected {
            return Err(AgrifoodError::shape_mismatch(unit, expected, values.dim()));
        }
        Ok(Self {
            unit: unit.to_string(),
            items,
            years,
            values,
        })
    }

    /// A table holding one time-invariant coefficient per item.
    pub fn constant(
        unit: &str,
        items: Vec<ItemMeta>,
        years: YearAxis,
        per_item: &[FloatValue],
    ) -> AgrifoodResult<Self> {
        if per_item.len() != items.len() {
            return Err(AgrifoodError::shape_mismatch(unit, items.len(), per_item.len()));
        }
        let values = Array2::from_shape_fn((items.len(), years.len()), |(i, _)| per_item[i]);
        Self::new(unit, items, years, values)
    }

    pub fn items(&self) -> &[ItemMeta] {
        &self.items
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|meta| meta.id).collect()
    }

    pub fn years(&self) -> &YearAxis {
        &self.years
    }

    pub fn values(&self) -> ArrayView2<FloatValue> {
        self.values.view()
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.items.iter().any(|meta| meta.id == item)
    }

    fn position(&self, item: ItemId) -> AgrifoodResult<usize> {
        self.items
            .iter()
            .position(|meta| meta.id == item)
            .ok_or(AgrifoodError::ItemNotFound(item))
    }

    pub fn item(&self, item: ItemId) -> AgrifoodResult<ArrayView1<FloatValue>> {
        let i = self.position(item)?;
        Ok(self.values.row(i))
    }

    pub fn get(&self, item: ItemId, year: Year) -> AgrifoodResult<FloatValue> {
        let i = self.position(item)?;
        let t = self.years.try_index_of(year, &self.unit)?;
        Ok(self.values[[i, t]])
    }

    /// Append an item with a constant coefficient
    pub fn add_item(&mut self, meta: ItemMeta, value: FloatValue) -> AgrifoodResult<()> {
        let row = Array1::from_elem(self.years.len(), value);
        self.push_row(meta, row)
    }

    /// Append an item whose coefficients are copied from an existing item
    pub fn add_item_copy(&mut self, meta: ItemMeta, copy_from: ItemId) -> AgrifoodResult<()> {
        let row = self.item(copy_from)?.to_owned();
        self.push_row(meta, row)
    }

    fn push_row(&mut self, meta: ItemMeta, row: Array1<FloatValue>) -> AgrifoodResult<()> {
        if self.contains(meta.id) {
            return Err(AgrifoodError::DuplicateItem(meta.id));
        }
        self.values
            .push(Axis(0), row.view())
            .map_err(|e| AgrifoodError::Error(e.to_string()))?;
        self.items.push(meta);
        Ok(())
    }

    /// Multiply the coefficients of `items` by a per-year scale.
    ///
    /// Items missing from the table are skipped.
    pub fn scale_items(
        &mut self,
        items: &[ItemId],
        scale: ArrayView1<FloatValue>,
    ) -> AgrifoodResult<()> {
        self.years.check_series(scale.len(), &self.unit)?;
        for item in items {
            if let Ok(i) = self.position(*item) {
                let mut row = self.values.row_mut(i);
                row *= &scale;
            }
        }
        Ok(())
    }

    /// Extend the year axis to `end`, holding the last year's values constant.
    pub fn extend_years(&mut self, end: Year) -> AgrifoodResult<()> {
        let extended = self.years.extended_to(end);
        let extra = extended.len() - self.years.len();
        if extra == 0 {
            return Ok(());
        }
        let last = self.values.column(self.years.len() - 1).to_owned();
        for _ in 0..extra {
            self.values
                .push(Axis(1), last.view())
                .map_err(|e| AgrifoodError::Error(e.to_string()))?;
        }
        self.years = extended;
        Ok(())
    }

    /// Coefficients re-ordered to match the items of `fbs`.
    ///
    /// Every item of the sheet must have a coefficient and the year axes must agree.
    pub fn aligned_to(&self, fbs: &FoodBalanceSheet) -> AgrifoodResult<Array2<FloatValue>> {
        if self.years != *fbs.years() {
            return Err(AgrifoodError::shape_mismatch(
                &self.unit,
                (fbs.years().start(), fbs.years().end()),
                (self.years.start(), self.years.end()),
            ));
        }
        let mut out = Array2::zeros((fbs.items().len(), self.years.len()));
        for (i, meta) in fbs.items().iter().enumerate() {
            out.row_mut(i).assign(&self.item(meta.id)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemOrigin;

    fn factors() -> ItemSeries {
        ItemSeries::constant(
            "gco2e/gfood",
            vec![
                ItemMeta::new(2731, "Bovine Meat", "Meat", ItemOrigin::AnimalProducts),
                ItemMeta::new(
                    2511,
                    "Wheat",
                    "Cereals - Excluding Beer",
                    ItemOrigin::VegetalProducts,
                ),
            ],
            YearAxis::new(2020, 2022).unwrap(),
            &[16.94, 0.8],
        )
        .unwrap()
    }

    #[test]
    fn copy_item() {
        let mut table = factors();
        table
            .add_item_copy(
                ItemMeta::new(
                    5000,
                    "Alternative meat",
                    "Alternative Food",
                    ItemOrigin::AlternativeFood,
                ),
                ItemId(2731),
            )
            .unwrap();
        assert_eq!(table.get(ItemId(5000), 2021).unwrap(), 16.94);
        assert!(table
            .add_item_copy(
                ItemMeta::new(5001, "x", "x", ItemOrigin::AlternativeFood),
                ItemId(1)
            )
            .is_err());
    }

    #[test]
    fn scale_skips_missing_items() {
        let mut table = factors();
        let scale = ndarray::array![1.0, 0.5, 0.25];
        table
            .scale_items(&[ItemId(2731), ItemId(9999)], scale.view())
            .unwrap();
        assert_eq!(table.get(ItemId(2731), 2022).unwrap(), 16.94 * 0.25);
        assert_eq!(table.get(ItemId(2511), 2022).unwrap(), 0.8);
    }

    #[test]
    fn extend() {
        let mut table = factors();
        table.extend_years(2030).unwrap();
        assert_eq!(table.get(ItemId(2511), 2030).unwrap(), 0.8);
    }
}
