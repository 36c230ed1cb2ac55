//! Food items and food-supply elements.
//!
//! Items are identified by their FAOSTAT item code (e.g. `2731` for bovine meat)
//! and carry a name, a commodity group and an origin. Elements are the fixed set
//! of food balance sheet quantities that every item holds for every year.

use crate::errors::{AgrifoodError, AgrifoodResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// FAOSTAT item code
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ItemId {
    fn from(value: u32) -> Self {
        ItemId(value)
    }
}

/// Broad origin of a food item.
///
/// Animal products are tied to pasture land and vegetal products to arable land
/// when land-use changes are propagated back into production.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemOrigin {
    #[serde(rename = "Animal Products")]
    AnimalProducts,
    #[serde(rename = "Vegetal Products")]
    VegetalProducts,
    #[serde(rename = "Alternative Food")]
    AlternativeFood,
}

impl ItemOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemOrigin::AnimalProducts => "Animal Products",
            ItemOrigin::VegetalProducts => "Vegetal Products",
            ItemOrigin::AlternativeFood => "Alternative Food",
        }
    }
}

impl fmt::Display for ItemOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinate metadata attached to every item of a food table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    pub id: ItemId,
    pub name: String,
    pub group: String,
    pub origin: ItemOrigin,
}

impl ItemMeta {
    pub fn new(id: impl Into<ItemId>, name: &str, group: &str, origin: ItemOrigin) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            group: group.to_string(),
            origin,
        }
    }
}

/// Food balance sheet element.
///
/// The intended balance for every item and year is
/// `production + imports - exports - stock == food + feed + seed + processing + losses + other`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Production,
    Imports,
    Exports,
    Stock,
    Losses,
    Processing,
    Other,
    Feed,
    Seed,
    Food,
}

impl Element {
    pub const ALL: [Element; 10] = [
        Element::Production,
        Element::Imports,
        Element::Exports,
        Element::Stock,
        Element::Losses,
        Element::Processing,
        Element::Other,
        Element::Feed,
        Element::Seed,
        Element::Food,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position of the element along the element axis of a food table.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Production => "production",
            Element::Imports => "imports",
            Element::Exports => "exports",
            Element::Stock => "stock",
            Element::Losses => "losses",
            Element::Processing => "processing",
            Element::Other => "other",
            Element::Feed => "feed",
            Element::Seed => "seed",
            Element::Food => "food",
        }
    }

    /// Element that absorbs a negative shortfall of this element.
    pub fn default_fallback(self) -> Option<Element> {
        match self {
            Element::Production => Some(Element::Imports),
            Element::Imports => Some(Element::Production),
            Element::Exports => Some(Element::Production),
            _ => None,
        }
    }

    /// Sign of the element on the supply side of the balance.
    ///
    /// Supply elements count positively, utilisation elements negatively, so
    /// summing `sign * value` over all elements gives the balance residual.
    pub fn balance_sign(self) -> f64 {
        match self {
            Element::Production | Element::Imports => 1.0,
            _ => -1.0,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selection of items by explicit id, commodity group or origin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSelector {
    Items(Vec<ItemId>),
    Groups(Vec<String>),
    Origin(ItemOrigin),
    All,
}

impl ItemSelector {
    pub fn items<I: Into<ItemId>>(items: impl IntoIterator<Item = I>) -> Self {
        ItemSelector::Items(items.into_iter().map(Into::into).collect())
    }

    pub fn groups<S: ToString>(groups: impl IntoIterator<Item = S>) -> Self {
        ItemSelector::Groups(groups.into_iter().map(|g| g.to_string()).collect())
    }

    /// Resolve the selector against the item coordinate of a table.
    ///
    /// Explicit item ids must all exist. Group and origin selections may
    /// legitimately resolve to no items.
    pub fn resolve(&self, items: &[ItemMeta]) -> AgrifoodResult<Vec<ItemId>> {
        match self {
            ItemSelector::Items(ids) => {
                for id in ids {
                    if !items.iter().any(|meta| meta.id == *id) {
                        return Err(AgrifoodError::ItemNotFound(*id));
                    }
                }
                Ok(ids.clone())
            }
            ItemSelector::Groups(groups) => Ok(items
                .iter()
                .filter(|meta| groups.iter().any(|g| *g == meta.group))
                .map(|meta| meta.id)
                .collect()),
            ItemSelector::Origin(origin) => Ok(items
                .iter()
                .filter(|meta| meta.origin == *origin)
                .map(|meta| meta.id)
                .collect()),
            ItemSelector::All => Ok(items.iter().map(|meta| meta.id).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<ItemMeta> {
        vec![
            ItemMeta::new(2731, "Bovine Meat", "Meat", ItemOrigin::AnimalProducts),
            ItemMeta::new(2511, "Wheat", "Cereals - Excluding Beer", ItemOrigin::VegetalProducts),
            ItemMeta::new(2513, "Barley", "Cereals - Excluding Beer", ItemOrigin::VegetalProducts),
        ]
    }

    #[test]
    fn resolve_groups() {
        let selected = ItemSelector::groups(["Cereals - Excluding Beer"])
            .resolve(&items())
            .unwrap();
        assert_eq!(selected, vec![ItemId(2511), ItemId(2513)]);
    }

    #[test]
    fn resolve_origin() {
        let selected = ItemSelector::Origin(ItemOrigin::AnimalProducts)
            .resolve(&items())
            .unwrap();
        assert_eq!(selected, vec![ItemId(2731)]);
    }

    #[test]
    fn unknown_item_fails() {
        let result = ItemSelector::items([2731u32, 9999]).resolve(&items());
        assert!(matches!(result, Err(AgrifoodError::ItemNotFound(ItemId(9999)))));
    }

    #[test]
    fn element_indices_follow_declaration_order() {
        for (i, element) in Element::ALL.iter().enumerate() {
            assert_eq!(element.index(), i);
        }
        assert_eq!(Element::Exports.default_fallback(), Some(Element::Production));
        assert_eq!(Element::Food.default_fallback(), None);
    }
}
