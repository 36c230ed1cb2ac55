//! Balance engine
//!
//! Scaling one element of a food balance sheet breaks the supply/utilisation
//! balance of the affected items. The engine restores it by moving the change
//! onto one or more origin elements, optionally holding the total of the scaled
//! element constant by rescaling the remaining items.
//!
//! For example reducing `food` of beef by half with `production` and `imports`
//! as origins (50/50 elasticity) removes a quarter of the original food
//! quantity from each supply element.

use crate::errors::{AgrifoodError, AgrifoodResult};
use crate::food_balance::FoodBalanceSheet;
use crate::guard::clamp_nonnegative;
use crate::items::{Element, ItemId, ItemOrigin};
use crate::outcome::{Degradation, Outcome};
use crate::propagate::safe_ratio;
use crate::timeseries::FloatValue;
use is_close::is_close;
use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

/// Element which absorbs part of a scaling change
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub element: Element,
    /// If true the change is added to the origin, otherwise it is subtracted.
    pub add: bool,
    /// Fraction of the change taken by this origin
    pub elasticity: FloatValue,
}

impl Origin {
    pub fn adding(element: Element) -> Self {
        Self {
            element,
            add: true,
            elasticity: 1.0,
        }
    }

    pub fn subtracting(element: Element) -> Self {
        Self {
            element,
            add: false,
            elasticity: 1.0,
        }
    }

    pub fn with_elasticity(self, elasticity: FloatValue) -> Self {
        Self { elasticity, ..self }
    }

    fn sign(&self) -> FloatValue {
        if self.add {
            1.0
        } else {
            -1.0
        }
    }
}

/// Build a list of origins sharing the same sign.
///
/// Without elasticities the whole change goes to the first origin. When given,
/// there must be one elasticity per origin and they must sum to one.
pub fn origins(
    elements: &[Element],
    add: bool,
    elasticity: Option<&[FloatValue]>,
) -> AgrifoodResult<Vec<Origin>> {
    if elements.is_empty() {
        return Err(AgrifoodError::invalid_parameter(
            "origin",
            "at least one origin element is required",
        ));
    }
    let fractions: Vec<FloatValue> = match elasticity {
        None => (0..elements.len())
            .map(|i| if i == 0 { 1.0 } else { 0.0 })
            .collect(),
        Some(values) => {
            if values.len() != elements.len() {
                return Err(AgrifoodError::invalid_parameter(
                    "elasticity",
                    format!(
                        "{} elasticities given for {} origins",
                        values.len(),
                        elements.len()
                    ),
                ));
            }
            let total: FloatValue = values.iter().sum();
            if !is_close!(total, 1.0, abs_tol = 1e-9) {
                return Err(AgrifoodError::invalid_parameter(
                    "elasticity",
                    format!("elasticities must sum to 1, got {}", total),
                ));
            }
            values.to_vec()
        }
    };
    Ok(elements
        .iter()
        .zip(fractions)
        .map(|(element, fraction)| Origin {
            element: *element,
            add,
            elasticity: fraction,
        })
        .collect())
}

impl FoodBalanceSheet {
    /// Scale `element` of the selected items (all items if `None`) by a per-year
    /// `scale` and offset each origin by `±delta * elasticity`.
    pub fn scale_add(
        &mut self,
        element: Element,
        origins: &[Origin],
        scale: ArrayView1<FloatValue>,
        items: Option<&[ItemId]>,
    ) -> AgrifoodResult<()> {
        self.years().check_series(scale.len(), "scale")?;
        if let Some(origin) = origins.iter().find(|o| o.element == element) {
            return Err(AgrifoodError::invalid_parameter(
                "origin",
                format!("{} cannot be its own origin", origin.element),
            ));
        }

        let selected = match items {
            Some(items) => items.to_vec(),
            None => self.item_ids(),
        };

        for item in selected {
            let old = self.item_element(item, element)?.to_owned();
            let new = &old * &scale;
            let delta = &new - &old;
            self.item_element_mut(item, element)?.assign(&new);

            for origin in origins {
                let mut target = self.item_element_mut(item, origin.element)?;
                target.scaled_add(origin.sign() * origin.elasticity, &delta);
            }
        }
        Ok(())
    }
}

/// A single balanced scaling operation
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceRequest {
    pub element: Element,
    /// Items to scale, all items if `None`
    pub items: Option<Vec<ItemId>>,
    /// Per-year scale factor
    pub scale: Array1<FloatValue>,
    pub origins: Vec<Origin>,
    /// Keep the total of `element` over all items unchanged
    pub hold_constant: bool,
    /// Items used to compensate when holding constant, all unselected items if `None`
    pub compensating_items: Option<Vec<ItemId>>,
    /// Element receiving any negative shortfall of the origins
    pub fallback: Option<Element>,
}

impl BalanceRequest {
    pub fn new(element: Element, scale: Array1<FloatValue>, origins: Vec<Origin>) -> Self {
        Self {
            element,
            items: None,
            scale,
            origins,
            hold_constant: false,
            compensating_items: None,
            fallback: None,
        }
    }

    pub fn with_items(mut self, items: Vec<ItemId>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn holding_constant(mut self, compensating_items: Option<Vec<ItemId>>) -> Self {
        self.hold_constant = true;
        self.compensating_items = compensating_items;
        self
    }

    pub fn with_fallback(mut self, fallback: Element) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

/// Scale an element of `table` and rebalance the origins.
///
/// When holding the total constant the compensating items are scaled by
/// `(sum_comp - delta) / sum_comp` per year. Years where that factor would be
/// negative are clamped to zero, in which case the total is no longer preserved
/// and a [`Degradation::NegativeCompensation`] is reported.
///
/// If the compensating items are empty, or hold none of `element` in a year
/// with a non-zero change, nothing can absorb the change. The total is then
/// left unbalanced and [`Degradation::NoCompensatingSupply`] is reported.
pub fn scale_and_rebalance(
    table: &FoodBalanceSheet,
    request: &BalanceRequest,
) -> AgrifoodResult<Outcome<FoodBalanceSheet>> {
    let element = request.element;
    table.years().check_series(request.scale.len(), "balance scale")?;

    let mut reasons = vec![];
    let mut hold_constant = request.hold_constant;
    let all_items = table.item_ids();

    if hold_constant && all_items.len() == 1 {
        reasons.push(Degradation::SingleItemHoldConstant);
        hold_constant = false;
    }

    let selected = match &request.items {
        Some(items) => {
            for item in items {
                table.position(*item)?;
            }
            items.clone()
        }
        None => all_items.clone(),
    };

    if hold_constant && all_items.iter().all(|item| selected.contains(item)) {
        reasons.push(Degradation::AllItemsHoldConstant);
        hold_constant = false;
    }

    let mut out = table.clone();
    out.scale_add(element, &request.origins, request.scale.view(), Some(&selected))?;

    if hold_constant {
        let compensating: Vec<ItemId> = match &request.compensating_items {
            Some(items) => {
                let (known, unknown): (Vec<ItemId>, Vec<ItemId>) =
                    items.iter().copied().partition(|item| table.contains(*item));
                if !unknown.is_empty() {
                    reasons.push(Degradation::UnknownCompensatingItems(unknown));
                }
                known
            }
            None => all_items
                .iter()
                .filter(|item| !selected.contains(*item))
                .copied()
                .collect(),
        };

        let delta = out.sum_items(element, None)? - table.sum_items(element, None)?;
        let comp_total = table.sum_items(element, Some(&compensating))?;
        let unsupplied = comp_total
            .iter()
            .zip(delta.iter())
            .any(|(&total, &d)| {
                is_close!(total, 0.0, abs_tol = 1e-12) && !is_close!(d, 0.0, abs_tol = 1e-12)
            });

        if compensating.is_empty() || unsupplied {
            log::warn!("No compensating {} available, total is not held constant", element);
            reasons.push(Degradation::NoCompensatingSupply { element });
        } else {
            let mut factor = Array1::zeros(delta.len());
            Zip::from(&mut factor)
                .and(&comp_total)
                .and(&delta)
                .for_each(|f, &total, &d| *f = safe_ratio(total - d, total));

            let negative_years: Vec<_> = table
                .years()
                .iter()
                .zip(factor.iter())
                .filter(|(_, f)| **f < 0.0)
                .map(|(year, _)| year)
                .collect();
            if !negative_years.is_empty() {
                log::warn!(
                    "Additional {} cannot be compensated by reduction of non-selected items",
                    element
                );
                factor.mapv_inplace(|f| f.max(0.0));
                reasons.push(Degradation::NegativeCompensation {
                    element,
                    years: negative_years,
                });
            }

            out.scale_add(element, &request.origins, factor.view(), Some(&compensating))?;
        }
    }

    if let Some(fallback) = request.fallback {
        for origin in &request.origins {
            clamp_nonnegative(&mut out, origin.element, fallback)?;
        }
    }

    Ok(Outcome::new(out, reasons))
}

fn origin_ratio(
    obs: &FoodBalanceSheet,
    reference: &FoodBalanceSheet,
    origin: ItemOrigin,
) -> Array1<FloatValue> {
    let reference = reference.sum_origin(Element::Production, origin);
    let observed = obs.sum_origin(Element::Production, origin);
    Zip::from(&observed)
        .and(&reference)
        .map_collect(|&o, &r| {
            if is_close!(r, 0.0, abs_tol = 1e-8) {
                1.0
            } else {
                o / r
            }
        })
}

/// Rescale feed, seed and processing after a change in production.
///
/// Feed follows animal-origin production, seed follows vegetal-origin
/// production and processing follows total production, each relative to
/// `reference` and offset against production.
pub fn feed_scale(
    out: &FoodBalanceSheet,
    reference: &FoodBalanceSheet,
) -> AgrifoodResult<FoodBalanceSheet> {
    if out.years() != reference.years() {
        return Err(AgrifoodError::shape_mismatch(
            "feed scaling",
            reference.years().len(),
            out.years().len(),
        ));
    }
    let feed = origin_ratio(out, reference, ItemOrigin::AnimalProducts);
    let seed = origin_ratio(out, reference, ItemOrigin::VegetalProducts);
    let processing = Zip::from(&out.sum_items(Element::Production, None)?)
        .and(&reference.sum_items(Element::Production, None)?)
        .map_collect(|&o, &r| safe_ratio(o, r));

    let production = [Origin::adding(Element::Production)];
    let mut scaled = out.clone();
    scaled.scale_add(Element::Feed, &production, feed.view(), None)?;
    scaled.scale_add(Element::Seed, &production, seed.view(), None)?;
    scaled.scale_add(Element::Processing, &production, processing.view(), None)?;
    Ok(scaled)
}

/// Grow total feed by the production change of `items` on a like-for-like basis.
///
/// Intended for energy tables, where replacing animal products by alternative
/// products still requires feedstock of equivalent energy.
pub fn scale_kcal_feed(
    obs: &FoodBalanceSheet,
    reference: &FoodBalanceSheet,
    items: &[ItemId],
) -> AgrifoodResult<FoodBalanceSheet> {
    obs.check_aligned(reference, "calorie feed scaling")?;
    let delta = obs.sum_items(Element::Production, Some(items))?
        - reference.sum_items(Element::Production, Some(items))?;
    let feed = obs.sum_items(Element::Feed, None)?;
    let factor = Zip::from(&feed)
        .and(&delta)
        .map_collect(|&f, &d| safe_ratio(f + d, f));

    let mut out = obs.clone();
    out.scale_add(
        Element::Feed,
        &[Origin::adding(Element::Production)],
        factor.view(),
        None,
    )?;
    Ok(out)
}
