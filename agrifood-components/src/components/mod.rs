mod agroecology;
mod beccs;
mod ccs;
mod compute_emissions;
mod cultured_meat;
mod demand;
mod food_waste;
mod forest_land;
mod forest_sequestration;
mod item_scaling;
mod managed_land;
mod mixed_farming;
mod peatland;
mod project_future;
mod scale_impact;
mod scale_production;
mod zero_land;

pub use agroecology::{Agroecology, AgroecologyParameters, AGROECOLOGY_SEQUESTRATION};
pub use beccs::{BeccsLand, BeccsLandParameters};
pub use ccs::{
    CaptureCapacity, CaptureSource, CaptureTechnology, Ccs, CcsParameters, LAND_BECCS_RATE,
};
pub use compute_emissions::ComputeEmissions;
pub use cultured_meat::{CulturedMeat, CulturedMeatParameters};
pub use food_waste::{FoodWaste, FoodWasteParameters};
pub use forest_land::{ForestLand, ForestLandParameters};
pub use forest_sequestration::{
    ClassSequestration, ForestSequestration, ForestSequestrationParameters,
};
pub use item_scaling::{ItemScaling, ItemScalingParameters};
pub use managed_land::{ManagedLand, ManagedLandParameters};
pub use mixed_farming::{MixedFarming, MixedFarmingParameters};
pub use peatland::{Peatland, PeatlandParameters};
pub use project_future::{ProjectFuture, ProjectFutureParameters};
pub use scale_impact::{ScaleImpact, ScaleImpactParameters};
pub use scale_production::{ScaleProduction, ScaleProductionParameters};
pub use zero_land::{ZeroLand, ZeroLandParameters};
