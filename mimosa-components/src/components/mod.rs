mod climate;
mod costs;
mod economy;
mod learning;
mod welfare;

pub use climate::{ClimateComponent, ClimateParameters};
pub use costs::{CostComponent, CostParameters};
pub use economy::{EconomyComponent, EconomyParameters};
pub use learning::{LearningComponent, LearningParameters};
pub use welfare::{WelfareComponent, WelfareParameters};
