//! Land-use composition grids
//!
//! Land use is held as a percentage composition per grid cell over a closed set
//! of [`LandClass`]es. Every class which any intervention can introduce has a
//! reserved slot from the start. Introduced classes start at zero inside the study
//! area and NaN outside of it, so "no land of this class" stays distinguishable
//! from "not part of the map".
//!
//! # Examples
//!
//! ```rust
//! use agrifood_core::spatial::{LandClass, LandGrid, LandUse};
//! use ndarray::array;
//!
//! let grid = LandGrid::regular(2, 1, 100.0);
//! let land = LandUse::from_classes(
//!     grid,
//!     vec![
//!         (LandClass::Arable, array![[60.0], [20.0]]),
//!         (LandClass::ImprovedGrassland, array![[40.0], [80.0]]),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(land.class_total(LandClass::Arable), 80.0);
//! assert_eq!(land.class_total(LandClass::Peatland), 0.0);
//! ```

use crate::errors::{AgrifoodError, AgrifoodResult};
use crate::outcome::Degradation;
use crate::timeseries::FloatValue;
use is_close::is_close;
use ndarray::{Array2, Array3, ArrayView2, ArrayViewMut2, Axis, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sum of all class percentages in a cell inside the study area
pub const CELL_TOTAL: FloatValue = 100.0;

/// Land-use aggregate class
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LandClass {
    #[serde(rename = "Broadleaf woodland")]
    BroadleafWoodland,
    #[serde(rename = "Coniferous woodland")]
    ConiferousWoodland,
    #[serde(rename = "Arable")]
    Arable,
    #[serde(rename = "Improved grassland")]
    ImprovedGrassland,
    #[serde(rename = "Semi-natural grassland")]
    SemiNaturalGrassland,
    #[serde(rename = "Mountain, heath, bog")]
    MountainHeathBog,
    #[serde(rename = "Saltwater")]
    Saltwater,
    #[serde(rename = "Freshwater")]
    Freshwater,
    #[serde(rename = "Coastal")]
    Coastal,
    #[serde(rename = "Built-up areas and gardens")]
    BuiltUpAreasAndGardens,
    // Classes introduced by interventions
    #[serde(rename = "BECCS")]
    Beccs,
    #[serde(rename = "Peatland")]
    Peatland,
    #[serde(rename = "Managed arable")]
    ManagedArable,
    #[serde(rename = "Managed pasture")]
    ManagedPasture,
    #[serde(rename = "Mixed farming")]
    MixedFarming,
    #[serde(rename = "Silvopasture")]
    Silvopasture,
    #[serde(rename = "Agroforestry")]
    Agroforestry,
    #[serde(rename = "Agroecology")]
    Agroecology,
}

impl LandClass {
    pub const ALL: [LandClass; 18] = [
        LandClass::BroadleafWoodland,
        LandClass::ConiferousWoodland,
        LandClass::Arable,
        LandClass::ImprovedGrassland,
        LandClass::SemiNaturalGrassland,
        LandClass::MountainHeathBog,
        LandClass::Saltwater,
        LandClass::Freshwater,
        LandClass::Coastal,
        LandClass::BuiltUpAreasAndGardens,
        LandClass::Beccs,
        LandClass::Peatland,
        LandClass::ManagedArable,
        LandClass::ManagedPasture,
        LandClass::MixedFarming,
        LandClass::Silvopasture,
        LandClass::Agroforestry,
        LandClass::Agroecology,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Grassland classes supporting livestock production
    pub const PASTURE: [LandClass; 2] =
        [LandClass::ImprovedGrassland, LandClass::SemiNaturalGrassland];

    /// Land growing crops, whether or not under managed soil practices
    pub const CROP_LAND: [LandClass; 2] = [LandClass::Arable, LandClass::ManagedArable];

    /// Land grazed by livestock, whether or not under managed soil practices
    pub const GRAZING_LAND: [LandClass; 3] = [
        LandClass::ImprovedGrassland,
        LandClass::SemiNaturalGrassland,
        LandClass::ManagedPasture,
    ];

    pub const FOREST: [LandClass; 2] =
        [LandClass::BroadleafWoodland, LandClass::ConiferousWoodland];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            LandClass::BroadleafWoodland => "Broadleaf woodland",
            LandClass::ConiferousWoodland => "Coniferous woodland",
            LandClass::Arable => "Arable",
            LandClass::ImprovedGrassland => "Improved grassland",
            LandClass::SemiNaturalGrassland => "Semi-natural grassland",
            LandClass::MountainHeathBog => "Mountain, heath, bog",
            LandClass::Saltwater => "Saltwater",
            LandClass::Freshwater => "Freshwater",
            LandClass::Coastal => "Coastal",
            LandClass::BuiltUpAreasAndGardens => "Built-up areas and gardens",
            LandClass::Beccs => "BECCS",
            LandClass::Peatland => "Peatland",
            LandClass::ManagedArable => "Managed arable",
            LandClass::ManagedPasture => "Managed pasture",
            LandClass::MixedFarming => "Mixed farming",
            LandClass::Silvopasture => "Silvopasture",
            LandClass::Agroforestry => "Agroforestry",
            LandClass::Agroecology => "Agroecology",
        }
    }

    pub fn from_name(name: &str) -> Option<LandClass> {
        Self::ALL.into_iter().find(|class| class.name() == name)
    }

    /// True for classes which only exist once an intervention creates them
    pub fn is_introduced(&self) -> bool {
        self.index() >= LandClass::Beccs.index()
    }
}

impl fmt::Display for LandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Regular grid of square cells
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandGrid {
    /// Cell centre coordinates along x (e.g. British National Grid eastings)
    pub x: Vec<FloatValue>,
    /// Cell centre coordinates along y
    pub y: Vec<FloatValue>,
    /// Area of a single cell
    /// unit: ha
    pub cell_area_ha: FloatValue,
}

impl LandGrid {
    /// Grid with unit coordinate spacing
    pub fn regular(nx: usize, ny: usize, cell_area_ha: FloatValue) -> Self {
        Self {
            x: (0..nx).map(|i| i as FloatValue).collect(),
            y: (0..ny).map(|j| j as FloatValue).collect(),
            cell_area_ha,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.x.len(), self.y.len())
    }
}

/// Selects the cells of a named land map whose value is one of `values`.
///
/// For example the agricultural land classification map with grades `[4, 5]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskSelector {
    pub map: String,
    pub values: Vec<FloatValue>,
}

impl MaskSelector {
    pub fn new(map: &str, values: &[FloatValue]) -> Self {
        Self {
            map: map.to_string(),
            values: values.to_vec(),
        }
    }

    /// Apply the selector to the values of its map
    pub fn select(&self, map: ArrayView2<FloatValue>) -> Array2<bool> {
        map.mapv(|v| self.values.iter().any(|target| *target == v))
    }
}

/// Percentage land-use composition, indexed by (class, x, y)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandUse {
    grid: LandGrid,
    values: Array3<FloatValue>,
}

impl LandUse {
    /// Build a composition from the classes present in the baseline.
    ///
    /// The study area is the set of cells where the first given class is finite.
    /// All other classes are zero there and NaN outside of it.
    pub fn from_classes(
        grid: LandGrid,
        classes: Vec<(LandClass, Array2<FloatValue>)>,
    ) -> AgrifoodResult<Self> {
        let shape = grid.shape();
        let inside = match classes.first() {
            Some((_, values)) => values.mapv(FloatValue::is_finite),
            None => {
                return Err(AgrifoodError::MissingData(
                    "land use requires at least one class".to_string(),
                ))
            }
        };

        let mut values = Array3::from_elem((LandClass::COUNT, shape.0, shape.1), FloatValue::NAN);
        for class in LandClass::ALL {
            let mut slot = values.index_axis_mut(Axis(0), class.index());
            Zip::from(&mut slot).and(&inside).for_each(|v, &inside| {
                if inside {
                    *v = 0.0
                }
            });
        }
        for (class, class_values) in classes {
            if class_values.dim() != shape {
                return Err(AgrifoodError::shape_mismatch(class.name(), shape, class_values.dim()));
            }
            values.index_axis_mut(Axis(0), class.index()).assign(&class_values);
        }
        Ok(Self { grid, values })
    }

    pub fn grid(&self) -> &LandGrid {
        &self.grid
    }

    pub fn class(&self, class: LandClass) -> ArrayView2<FloatValue> {
        self.values.index_axis(Axis(0), class.index())
    }

    pub fn class_mut(&mut self, class: LandClass) -> ArrayViewMut2<FloatValue> {
        self.values.index_axis_mut(Axis(0), class.index())
    }

    /// Cells belonging to the study area
    pub fn inside(&self) -> Array2<bool> {
        self.cell_totals().mapv(FloatValue::is_finite)
    }

    /// Sum of a class over all cells, ignoring cells outside the study area
    pub fn class_total(&self, class: LandClass) -> FloatValue {
        self.class(class).iter().filter(|v| v.is_finite()).sum()
    }

    pub fn classes_total(&self, classes: &[LandClass]) -> FloatValue {
        classes.iter().map(|class| self.class_total(*class)).sum()
    }

    /// Sum of a class over cells selected by `mask`
    pub fn masked_total(&self, classes: &[LandClass], mask: Option<&Array2<bool>>) -> FloatValue {
        classes
            .iter()
            .map(|class| {
                Zip::from(self.class(*class))
                    .and(&self.mask_or_all(mask))
                    .fold(0.0, |acc, &v, &m| if m && v.is_finite() { acc + v } else { acc })
            })
            .sum()
    }

    /// Sum of every class over every cell of the study area
    pub fn total(&self) -> FloatValue {
        self.values.iter().filter(|v| v.is_finite()).sum()
    }

    /// Area of a class in hectares
    pub fn area_ha(&self, class: LandClass) -> FloatValue {
        self.class_total(class) * self.grid.cell_area_ha / CELL_TOTAL
    }

    /// Sum over classes for each cell, NaN outside the study area
    pub fn cell_totals(&self) -> Array2<FloatValue> {
        let mut totals = Array2::zeros(self.grid.shape());
        let mut outside = Array2::from_elem(self.grid.shape(), true);
        for class in self.values.outer_iter() {
            Zip::from(&mut totals)
                .and(&mut outside)
                .and(&class)
                .for_each(|t, o, &v| {
                    if v.is_finite() {
                        *t += v;
                        *o = false;
                    }
                });
        }
        Zip::from(&mut totals).and(&outside).for_each(|t, &o| {
            if o {
                *t = FloatValue::NAN
            }
        });
        totals
    }

    /// Largest deviation of any cell total from 100
    pub fn composition_error(&self) -> FloatValue {
        self.cell_totals()
            .iter()
            .filter(|v| v.is_finite())
            .fold(0.0, |acc: FloatValue, v| acc.max((v - CELL_TOTAL).abs()))
    }

    fn mask_or_all(&self, mask: Option<&Array2<bool>>) -> Array2<bool> {
        match mask {
            Some(mask) => mask.clone(),
            None => Array2::from_elem(self.grid.shape(), true),
        }
    }

    /// Move `fraction` of each `from` class into the `targets`, split by weight.
    ///
    /// Only cells selected by `mask` (all cells if `None`) are changed. Returns the
    /// per-cell area moved. Weights must be non-negative and sum to one.
    pub fn move_fraction_split(
        &mut self,
        from: &[LandClass],
        targets: &[(LandClass, FloatValue)],
        fraction: FloatValue,
        mask: Option<&Array2<bool>>,
    ) -> AgrifoodResult<Array2<FloatValue>> {
        let weights: Vec<FloatValue> = targets.iter().map(|(_, w)| *w).collect();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(AgrifoodError::invalid_parameter(
                "targets",
                format!("split weights must be non-negative, got {:?}", weights),
            ));
        }
        let total: FloatValue = weights.iter().sum();
        if !is_close!(total, 1.0, abs_tol = 1e-9) {
            return Err(AgrifoodError::invalid_parameter(
                "targets",
                format!("split weights must sum to 1, got {}", total),
            ));
        }

        let mask = self.mask_or_all(mask);
        if mask.dim() != self.grid.shape() {
            return Err(AgrifoodError::shape_mismatch("land mask", self.grid.shape(), mask.dim()));
        }
        let mut moved = Array2::zeros(self.grid.shape());
        for class in from {
            let mut slot = self.class_mut(*class);
            Zip::from(&mut slot)
                .and(&mut moved)
                .and(&mask)
                .for_each(|v, m, &selected| {
                    if selected && v.is_finite() {
                        let delta = *v * fraction;
                        *v -= delta;
                        *m += delta;
                    }
                });
        }
        for (target, weight) in targets {
            let mut slot = self.class_mut(*target);
            Zip::from(&mut slot).and(&moved).for_each(|v, &m| {
                if v.is_finite() {
                    *v += m * weight
                }
            });
        }
        Ok(moved)
    }

    /// Move `fraction` of each `from` class into `to`.
    pub fn move_fraction(
        &mut self,
        from: &[LandClass],
        to: LandClass,
        fraction: FloatValue,
        mask: Option<&Array2<bool>>,
    ) -> AgrifoodResult<Array2<FloatValue>> {
        self.move_fraction_split(from, &[(to, 1.0)], fraction, mask)
    }

    /// Multiply the given classes by `factor` in every cell
    pub fn scale_classes(&mut self, classes: &[LandClass], factor: FloatValue) {
        for class in classes {
            self.class_mut(*class).mapv_inplace(|v| v * factor);
        }
    }

    /// Push any deviation of a cell total from 100 into woodland.
    ///
    /// `broadleaf_ratio` of the residual goes to broadleaf, the rest to conifers.
    /// Woodland never drops below zero. Excess land that woodland cannot absorb
    /// stays in the cell and is reported as [`Degradation::WoodlandExhausted`].
    pub fn rebalance_forest(&mut self, broadleaf_ratio: FloatValue) -> Option<Degradation> {
        let residual = self.cell_totals().mapv(|t| CELL_TOTAL - t);
        let mut excess = 0.0;
        for (class, weight) in [
            (LandClass::BroadleafWoodland, broadleaf_ratio),
            (LandClass::ConiferousWoodland, 1.0 - broadleaf_ratio),
        ] {
            let mut slot = self.class_mut(class);
            Zip::from(&mut slot).and(&residual).for_each(|v, &r| {
                if r.is_finite() && v.is_finite() {
                    *v += r * weight;
                    if *v < 0.0 {
                        excess -= *v;
                        *v = 0.0;
                    }
                }
            });
        }

        if excess > 0.0 {
            log::warn!("Woodland cannot absorb {:.3}% of excess land", excess);
            Some(Degradation::WoodlandExhausted { excess })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn land() -> LandUse {
        LandUse::from_classes(
            LandGrid::regular(2, 2, 100.0),
            vec![
                (LandClass::Arable, array![[50.0, 20.0], [0.0, FloatValue::NAN]]),
                (LandClass::ImprovedGrassland, array![[30.0, 40.0], [60.0, FloatValue::NAN]]),
                (LandClass::BroadleafWoodland, array![[20.0, 40.0], [40.0, FloatValue::NAN]]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn introduced_classes_respect_study_area() {
        let land = land();
        let peat = land.class(LandClass::Peatland);
        assert_eq!(peat[[0, 0]], 0.0);
        assert!(peat[[1, 1]].is_nan());
        assert_eq!(land.inside(), array![[true, true], [true, false]]);
    }

    #[test]
    fn moving_preserves_cell_totals() {
        let mut land = land();
        assert!(land.composition_error() < 1e-12);
        let mask = array![[true, false], [true, true]];
        let moved = land
            .move_fraction(&LandClass::PASTURE, LandClass::Peatland, 0.5, Some(&mask))
            .unwrap();
        assert_eq!(moved[[0, 0]], 15.0);
        assert_eq!(moved[[0, 1]], 0.0);
        assert_relative_eq!(land.class_total(LandClass::Peatland), 45.0);
        assert!(land.composition_error() < 1e-12);
        assert!(land.class(LandClass::Peatland)[[1, 1]].is_nan());
    }

    #[test]
    fn split_into_forest() {
        let mut land = land();
        land.move_fraction_split(
            &[LandClass::Arable],
            &[
                (LandClass::BroadleafWoodland, 0.25),
                (LandClass::ConiferousWoodland, 0.75),
            ],
            1.0,
            None,
        )
        .unwrap();
        assert_relative_eq!(land.class_total(LandClass::Arable), 0.0);
        assert_relative_eq!(land.class_total(LandClass::ConiferousWoodland), 52.5);
        assert!(land.composition_error() < 1e-12);
    }

    #[test]
    fn rebalance_restores_composition() {
        let mut land = land();
        land.scale_classes(&[LandClass::Arable], 0.5);
        assert!(land.composition_error() > 1.0);
        land.rebalance_forest(0.5);
        assert!(land.composition_error() < 1e-12);
        assert_relative_eq!(land.class(LandClass::ConiferousWoodland)[[0, 0]], 12.5);
    }

    #[test]
    fn split_weights_are_validated() {
        let mut land = land();
        let arable = land.class_total(LandClass::Arable);
        for targets in [
            [
                (LandClass::BroadleafWoodland, 1.5),
                (LandClass::ConiferousWoodland, -0.5),
            ],
            [
                (LandClass::BroadleafWoodland, 0.5),
                (LandClass::ConiferousWoodland, 0.4),
            ],
        ] {
            let result = land.move_fraction_split(&[LandClass::Arable], &targets, 0.5, None);
            assert!(matches!(result, Err(AgrifoodError::InvalidParameter { .. })));
        }
        assert_eq!(land.class_total(LandClass::Arable), arable);
        assert_eq!(land.classes_total(&LandClass::FOREST), 100.0);
    }

    #[test]
    fn woodland_is_never_negative() {
        let mut land = land();
        // Cell (0, 0) overflows by 100 with only 20 of woodland to give up
        land.scale_classes(&[LandClass::Arable], 3.0);
        let reason = land.rebalance_forest(0.5);

        for class in LandClass::FOREST {
            assert!(land.class(class).iter().all(|v| v.is_nan() || *v >= 0.0));
        }
        assert_eq!(land.class(LandClass::BroadleafWoodland)[[0, 0]], 0.0);
        assert!(matches!(
            reason,
            Some(Degradation::WoodlandExhausted { excess }) if excess > 0.0
        ));
    }

    #[test]
    fn area_in_hectares() {
        let land = land();
        assert_relative_eq!(land.area_ha(LandClass::Arable), 70.0);
        assert_relative_eq!(land.total(), 300.0);
    }

    #[test]
    fn class_names_round_trip() {
        for class in LandClass::ALL {
            assert_eq!(LandClass::from_name(class.name()), Some(class));
        }
        assert!(LandClass::Agroecology.is_introduced());
        assert!(!LandClass::Arable.is_introduced());
    }
}
