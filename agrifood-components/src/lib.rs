//! Transformation steps for agrifood scenarios.
//!
//! Each step is a parameter struct implementing
//! [`agrifood_core::transformation::Transformation`]. Steps are grouped by the
//! phase of the scenario they act in: consumer demand, land use, farming
//! practice, technology and the final aggregation.

pub mod components;
