//! Derived quantities read out of a transformed datablock

use agrifood_core::datablock::{Datablock, FoodQuantity};
use agrifood_core::errors::{AgrifoodError, AgrifoodResult};
use agrifood_core::impact::production_emissions;
use agrifood_core::items::Element;
use agrifood_core::spatial::LandClass;
use agrifood_core::timeseries::{FloatValue, Year};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Grams per megatonne
const G_PER_MT: FloatValue = 1e12;
/// Tonnes per megatonne
const T_PER_MT: FloatValue = 1e6;

/// Domestic production over domestic use, summed over every item.
///
/// Domestic use is `production + imports - exports`.
pub fn self_sufficiency_ratio(
    datablock: &Datablock,
    quantity: FoodQuantity,
    year: Year,
) -> AgrifoodResult<FloatValue> {
    let table = datablock.food.quantity(quantity);
    let i = table.years().try_index_of(year, "self-sufficiency ratio")?;
    let total = |element| -> AgrifoodResult<FloatValue> { Ok(table.sum_items(element, None)?[i]) };

    let production = total(Element::Production)?;
    let domestic_use = production + total(Element::Imports)? - total(Element::Exports)?;
    Ok(production / domestic_use)
}

/// Annual production emissions
///
/// unit: Mt CO2e / yr
pub fn total_emissions(datablock: &Datablock, year: Year) -> AgrifoodResult<FloatValue> {
    let emissions = production_emissions(datablock).ok_or_else(|| {
        AgrifoodError::MissingData("emissions have not been computed".to_string())
    })??;
    let i = datablock.years().try_index_of(year, "emissions")?;
    Ok(emissions[i] / G_PER_MT)
}

/// Groups of sequestration sources reported together
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SequestrationFamily {
    Woodland,
    Peatland,
    Agroecology,
    Beccs,
    Daccs,
    Other,
}

impl SequestrationFamily {
    pub const ALL: [SequestrationFamily; 6] = [
        SequestrationFamily::Woodland,
        SequestrationFamily::Peatland,
        SequestrationFamily::Agroecology,
        SequestrationFamily::Beccs,
        SequestrationFamily::Daccs,
        SequestrationFamily::Other,
    ];

    /// Family of a ledger source
    pub fn of_source(source: &str) -> Self {
        match LandClass::from_name(source) {
            Some(LandClass::BroadleafWoodland | LandClass::ConiferousWoodland) => {
                return SequestrationFamily::Woodland
            }
            Some(LandClass::Peatland) => return SequestrationFamily::Peatland,
            Some(LandClass::Silvopasture | LandClass::Agroforestry | LandClass::Agroecology) => {
                return SequestrationFamily::Agroecology
            }
            _ => {}
        }
        if source.contains("DACCS") {
            SequestrationFamily::Daccs
        } else if source.contains("BECCS") {
            SequestrationFamily::Beccs
        } else {
            SequestrationFamily::Other
        }
    }
}

impl Display for SequestrationFamily {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SequestrationFamily::Woodland => "woodland",
            SequestrationFamily::Peatland => "peatland",
            SequestrationFamily::Agroecology => "agroecology",
            SequestrationFamily::Beccs => "BECCS",
            SequestrationFamily::Daccs => "DACCS",
            SequestrationFamily::Other => "other",
        };
        f.write_str(name)
    }
}

/// Sequestration per family, every family present
///
/// unit: Mt CO2e / yr
pub fn sequestration_by_family(
    datablock: &Datablock,
    year: Year,
) -> AgrifoodResult<BTreeMap<SequestrationFamily, FloatValue>> {
    let ledger = &datablock.impact.co2e_sequestration;
    let i = ledger.years().try_index_of(year, "sequestration")?;

    let mut totals: BTreeMap<_, _> = SequestrationFamily::ALL.iter().map(|f| (*f, 0.0)).collect();
    for entry in ledger.iter() {
        let family = SequestrationFamily::of_source(&entry.source);
        *totals.entry(family).or_default() += entry.values[i] / T_PER_MT;
    }
    Ok(totals)
}

/// Selected metrics of a scenario for a single year
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioMetrics {
    pub year: Year,
    /// Self-sufficiency ratio by weight
    pub self_sufficiency: FloatValue,
    /// unit: kCal/cap/day
    pub food_energy: FloatValue,
    /// unit: Mt CO2e / yr
    pub emissions: FloatValue,
    /// unit: Mt CO2e / yr
    pub sequestration: BTreeMap<SequestrationFamily, FloatValue>,
    /// unit: GBP / yr
    pub cost: FloatValue,
    /// unit: ha
    pub land: BTreeMap<LandClass, FloatValue>,
}

impl ScenarioMetrics {
    pub fn from_datablock(datablock: &Datablock, year: Year) -> AgrifoodResult<Self> {
        let energy = &datablock.food.energy;
        let i = energy.years().try_index_of(year, "food energy")?;
        let land_use = &datablock.land.percentage_land_use;

        Ok(Self {
            year,
            self_sufficiency: self_sufficiency_ratio(datablock, FoodQuantity::Weight, year)?,
            food_energy: energy.sum_items(Element::Food, None)?[i],
            emissions: total_emissions(datablock, year)?,
            sequestration: sequestration_by_family(datablock, year)?,
            cost: datablock.impact.cost.total_at(year)?,
            land: LandClass::ALL.iter().map(|c| (*c, land_use.area_ha(*c))).collect(),
        })
    }

    /// unit: Mt CO2e / yr
    pub fn total_sequestration(&self) -> FloatValue {
        self.sequestration.values().sum()
    }

    /// unit: Mt CO2e / yr
    pub fn net_emissions(&self) -> FloatValue {
        self.emissions - self.total_sequestration()
    }

    /// Metric names and values in a fixed order
    pub fn named_values(&self) -> Vec<(String, FloatValue)> {
        let mut values = vec![
            ("ssr_weight".to_string(), self.self_sufficiency),
            ("food_kcal".to_string(), self.food_energy),
            ("emissions_mt".to_string(), self.emissions),
            ("sequestration_mt".to_string(), self.total_sequestration()),
            ("net_emissions_mt".to_string(), self.net_emissions()),
            ("cost_gbp".to_string(), self.cost),
        ];
        values.extend(
            self.sequestration
                .iter()
                .map(|(family, value)| (format!("sequestration_{}_mt", family), *value)),
        );
        values.extend(
            self.land
                .iter()
                .map(|(class, value)| (format!("land_{}_ha", class.name()), *value)),
        );
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrifood_core::example_data::example_datablock;
    use agrifood_core::impact::compute_emissions;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    #[test]
    fn ssr_of_example_data() {
        let datablock = example_datablock();
        let table = &datablock.food.weight;
        let total = |e| table.sum_items(e, None).unwrap()[0];
        let expected = total(Element::Production)
            / (total(Element::Production) + total(Element::Imports) - total(Element::Exports));

        let ssr = self_sufficiency_ratio(&datablock, FoodQuantity::Weight, 2020).unwrap();
        assert_relative_eq!(ssr, expected);
        assert!(ssr > 0.0 && ssr < 1.0);
    }

    #[test]
    fn unknown_year_fails() {
        let datablock = example_datablock();
        assert!(self_sufficiency_ratio(&datablock, FoodQuantity::Weight, 1990).is_err());
    }

    #[test]
    fn source_families() {
        assert_eq!(
            SequestrationFamily::of_source("Broadleaf woodland"),
            SequestrationFamily::Woodland
        );
        assert_eq!(SequestrationFamily::of_source("Peatland"), SequestrationFamily::Peatland);
        assert_eq!(
            SequestrationFamily::of_source("Silvopasture"),
            SequestrationFamily::Agroecology
        );
        assert_eq!(SequestrationFamily::of_source("BECCS from land"), SequestrationFamily::Beccs);
        assert_eq!(SequestrationFamily::of_source("DACCS"), SequestrationFamily::Daccs);
        assert_eq!(SequestrationFamily::of_source("Hedgerows"), SequestrationFamily::Other);
    }

    #[test]
    fn metrics_need_emissions() {
        let datablock = example_datablock();
        assert!(matches!(
            ScenarioMetrics::from_datablock(&datablock, 2050),
            Err(AgrifoodError::MissingData(_))
        ));
    }

    #[test]
    fn metric_columns_are_stable() {
        let mut datablock = example_datablock();
        compute_emissions(&mut datablock).unwrap();
        let empty = ScenarioMetrics::from_datablock(&datablock, 2050).unwrap();

        datablock
            .impact
            .co2e_sequestration
            .append("BECCS from waste", Array1::from_elem(31, 2e6))
            .unwrap();
        let metrics = ScenarioMetrics::from_datablock(&datablock, 2050).unwrap();

        let names =
            |m: &ScenarioMetrics| m.named_values().into_iter().map(|(n, _)| n).collect::<Vec<_>>();
        assert_eq!(names(&empty), names(&metrics));
        assert_eq!(metrics.sequestration[&SequestrationFamily::Beccs], 2.0);
        assert_relative_eq!(
            metrics.net_emissions(),
            empty.net_emissions() - 2.0,
            max_relative = 1e-12
        );
    }
}
