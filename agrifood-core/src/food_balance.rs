//! Food balance sheets
//!
//! A [`FoodBalanceSheet`] holds one value per (item, year, element). The same
//! structure is used for every per-capita food quantity (weight, protein, fat
//! and energy) and for computed emissions.

use crate::errors::{AgrifoodError, AgrifoodResult};
use crate::items::{Element, ItemId, ItemMeta, ItemOrigin};
use crate::timeseries::{FloatValue, Year, YearAxis};
use ndarray::{
    s, Array1, Array2, Array3, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis,
};
use serde::{Deserialize, Serialize};

/// Labelled (item, year, element) table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodBalanceSheet {
    items: Vec<ItemMeta>,
    years: YearAxis,
    values: Array3<FloatValue>,
}

impl FoodBalanceSheet {
    pub fn new(
        items: Vec<ItemMeta>,
        years: YearAxis,
        values: Array3<FloatValue>,
    ) -> AgrifoodResult<Self> {
        let expected = (items.len(), years.len(), Element::COUNT);
        if values.dim() != expected {
            return Err(AgrifoodError::shape_mismatch(
                "food balance sheet",
                expected,
                values.dim(),
            ));
        }
        for (i, meta) in items.iter().enumerate() {
            if items[..i].iter().any(|other| other.id == meta.id) {
                return Err(AgrifoodError::DuplicateItem(meta.id));
            }
        }
        Ok(Self {
            items,
            years,
            values,
        })
    }

    pub fn zeros(items: Vec<ItemMeta>, years: YearAxis) -> AgrifoodResult<Self> {
        let values = Array3::zeros((items.len(), years.len(), Element::COUNT));
        Self::new(items, years, values)
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

    pub fn values(&self) -> &Array3<FloatValue> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut Array3<FloatValue> {
        &mut self.values
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.items.iter().any(|meta| meta.id == item)
    }

    pub fn meta(&self, item: ItemId) -> AgrifoodResult<&ItemMeta> {
        self.items
            .iter()
            .find(|meta| meta.id == item)
            .ok_or(AgrifoodError::ItemNotFound(item))
    }

    /// Position of `item` along the item axis
    pub fn position(&self, item: ItemId) -> AgrifoodResult<usize> {
        self.items
            .iter()
            .position(|meta| meta.id == item)
            .ok_or(AgrifoodError::ItemNotFound(item))
    }

    fn positions(&self, items: &[ItemId]) -> AgrifoodResult<Vec<usize>> {
        items.iter().map(|item| self.position(*item)).collect()
    }

    /// All values of an element, indexed by (item, year)
    pub fn element(&self, element: Element) -> ArrayView2<FloatValue> {
        self.values.index_axis(Axis(2), element.index())
    }

    pub fn element_mut(&mut self, element: Element) -> ArrayViewMut2<FloatValue> {
        self.values.index_axis_mut(Axis(2), element.index())
    }

    /// Time series of one element of one item
    pub fn item_element(
        &self,
        item: ItemId,
        element: Element,
    ) -> AgrifoodResult<ArrayView1<FloatValue>> {
        let i = self.position(item)?;
        Ok(self.values.slice(s![i, .., element.index()]))
    }

    pub fn item_element_mut(
        &mut self,
        item: ItemId,
        element: Element,
    ) -> AgrifoodResult<ArrayViewMut1<FloatValue>> {
        let i = self.position(item)?;
        Ok(self.values.slice_mut(s![i, .., element.index()]))
    }

    pub fn get(&self, item: ItemId, year: Year, element: Element) -> AgrifoodResult<FloatValue> {
        let i = self.position(item)?;
        let t = self.years.try_index_of(year, "food balance sheet")?;
        Ok(self.values[[i, t, element.index()]])
    }

    pub fn set_value(
        &mut self,
        item: ItemId,
        year: Year,
        element: Element,
        value: FloatValue,
    ) -> AgrifoodResult<()> {
        let i = self.position(item)?;
        let t = self.years.try_index_of(year, "food balance sheet")?;
        self.values[[i, t, element.index()]] = value;
        Ok(())
    }

    /// Set the same value for every year of an item element
    pub fn fill_item_element(
        &mut self,
        item: ItemId,
        element: Element,
        value: FloatValue,
    ) -> AgrifoodResult<()> {
        self.item_element_mut(item, element)?.fill(value);
        Ok(())
    }

    /// Sum of an element over a set of items (all items if `None`), per year
    pub fn sum_items(
        &self,
        element: Element,
        items: Option<&[ItemId]>,
    ) -> AgrifoodResult<Array1<FloatValue>> {
        let view = self.element(element);
        match items {
            None => Ok(view.sum_axis(Axis(0))),
            Some(items) => {
                let mut total = Array1::zeros(self.years.len());
                for i in self.positions(items)? {
                    total += &view.row(i);
                }
                Ok(total)
            }
        }
    }

    pub fn items_with_origin(&self, origin: ItemOrigin) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|meta| meta.origin == origin)
            .map(|meta| meta.id)
            .collect()
    }

    /// Sum of an element over all items of a given origin, per year
    pub fn sum_origin(&self, element: Element, origin: ItemOrigin) -> Array1<FloatValue> {
        let view = self.element(element);
        let mut total = Array1::zeros(self.years.len());
        for (i, meta) in self.items.iter().enumerate() {
            if meta.origin == origin {
                total += &view.row(i);
            }
        }
        total
    }

    /// Total of every element summed over items, indexed by (year, element)
    pub fn totals(&self) -> Array2<FloatValue> {
        self.values.sum_axis(Axis(0))
    }

    /// Residual of the supply/utilisation balance, indexed by (item, year)
    pub fn balance_residual(&self) -> Array2<FloatValue> {
        let mut residual = Array2::zeros((self.items.len(), self.years.len()));
        for element in Element::ALL {
            residual.scaled_add(element.balance_sign(), &self.element(element));
        }
        residual
    }

    /// Append a new item with all values set to zero
    pub fn add_item(&mut self, meta: ItemMeta) -> AgrifoodResult<()> {
        if self.contains(meta.id) {
            return Err(AgrifoodError::DuplicateItem(meta.id));
        }
        let row = Array3::zeros((1, self.years.len(), Element::COUNT));
        self.values
            .append(Axis(0), row.view())
            .map_err(|e| AgrifoodError::Error(e.to_string()))?;
        self.items.push(meta);
        Ok(())
    }

    /// Extend the year axis to `end`, holding the last year's values constant.
    pub fn extend_years(&mut self, end: Year) -> AgrifoodResult<()> {
        let extended = self.years.extended_to(end);
        let extra = extended.len() - self.years.len();
        if extra == 0 {
            return Ok(());
        }
        let last = self.values.index_axis(Axis(1), self.years.len() - 1).to_owned();
        for _ in 0..extra {
            self.values
                .push(Axis(1), last.view())
                .map_err(|e| AgrifoodError::Error(e.to_string()))?;
        }
        self.years = extended;
        Ok(())
    }

    /// Fail unless `other` has the same items and years as `self`
    pub fn check_aligned(&self, other: &FoodBalanceSheet, context: &str) -> AgrifoodResult<()> {
        if self.years != other.years {
            return Err(AgrifoodError::shape_mismatch(
                context,
                (self.years.start(), self.years.end()),
                (other.years.start(), other.years.end()),
            ));
        }
        if self.item_ids() != other.item_ids() {
            return Err(AgrifoodError::shape_mismatch(
                context,
                self.item_ids(),
                other.item_ids(),
            ));
        }
        Ok(())
    }

    /// Multiply every element of every item by the matching entry of `ratio`.
    ///
    /// `ratio` must have the same shape as the table.
    pub fn multiply(&mut self, ratio: &Array3<FloatValue>) -> AgrifoodResult<()> {
        if ratio.dim() != self.values.dim() {
            return Err(AgrifoodError::shape_mismatch(
                "ratio propagation",
                self.values.dim(),
                ratio.dim(),
            ));
        }
        self.values *= ratio;
        Ok(())
    }

    /// Elementwise product with an (item, year) table, e.g. nutrient or emission factors
    pub fn multiply_by_item_year(
        &self,
        factors: ArrayView2<FloatValue>,
    ) -> AgrifoodResult<FoodBalanceSheet> {
        let expected = (self.items.len(), self.years.len());
        if factors.dim() != expected {
            return Err(AgrifoodError::shape_mismatch(
                "item factors",
                expected,
                factors.dim(),
            ));
        }
        let mut out = self.clone();
        for ((i, t, _), value) in out.values.indexed_iter_mut() {
            *value *= factors[[i, t]];
        }
        Ok(out)
    }
}
