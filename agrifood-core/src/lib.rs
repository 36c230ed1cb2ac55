pub mod balance;
pub mod curve;
pub mod datablock;
pub mod errors;
pub mod example_data;
pub mod food_balance;
pub mod guard;
pub mod impact;
pub mod item_table;
pub mod items;
pub mod land;
pub mod ledger;
pub mod outcome;
pub mod pipeline;
pub mod propagate;
pub mod spatial;
pub mod timeseries;
pub mod transformation;

mod example_components;
