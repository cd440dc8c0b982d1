//! Names of the variables and parameters shared between components.
//!
//! Components refer to each other's quantities by name only, so every name
//! used by more than one component is defined here.

// Control
pub const RELATIVE_ABATEMENT: &str = "relative_abatement";

// Climate
pub const REGIONAL_EMISSIONS: &str = "regional_emissions";
pub const GLOBAL_EMISSIONS: &str = "global_emissions";
pub const CUMULATIVE_EMISSIONS: &str = "cumulative_emissions";
pub const TEMPERATURE: &str = "temperature";
pub const T0: &str = "T0";
pub const TCRE: &str = "TCRE";

// Learning
pub const LBD_FACTOR: &str = "LBD_factor";
pub const LOT_FACTOR: &str = "LOT_factor";
pub const LEARNING_FACTOR: &str = "learning_factor";
pub const LBD_RATE: &str = "LBD_rate";
pub const LOG_LBD_RATE: &str = "log_LBD_rate";
pub const LBD_SCALING: &str = "LBD_scaling";
pub const LOT_RATE: &str = "LOT_rate";

// Costs
pub const DAMAGE_COSTS: &str = "damage_costs";
pub const ABATEMENT_COSTS: &str = "abatement_costs";
pub const CARBONPRICE: &str = "carbonprice";
pub const DAMAGE_FACTOR: &str = "damage_factor";
pub const DAMAGE_COEFF: &str = "damage_coeff";
pub const MAC_GAMMA: &str = "MAC_gamma";
pub const MAC_BETA: &str = "MAC_beta";

// Economy
pub const CAPITAL_STOCK: &str = "capital_stock";
pub const GDP_GROSS: &str = "GDP_gross";
pub const GDP_NET: &str = "GDP_net";
pub const INVESTMENTS: &str = "investments";
pub const CONSUMPTION: &str = "consumption";
pub const UTILITY: &str = "utility";
pub const ALPHA: &str = "alpha";
pub const DK: &str = "dk";
pub const SR: &str = "sr";
pub const ELASMU: &str = "elasmu";
pub const INIT_CAPITALSTOCK: &str = "init_capitalstock";

// Welfare
pub const NPV: &str = "NPV";
pub const PRTP: &str = "PRTP";

// Time
pub const BEGINYEAR: &str = "beginyear";
pub const ENDYEAR: &str = "endyear";
pub const TF: &str = "tf";
pub const YEAR2100: &str = "year2100";
