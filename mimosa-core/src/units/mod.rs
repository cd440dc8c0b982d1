//! Unit parsing and conversion for model parameters.
//!
//! Parameters are written as quantity strings such as `"1000 GtCO2"` or
//! `"2601.7 USD/tCO2"` and converted into the run's [`UnitSystem`] before the
//! model is assembled.
//!
//! ```
//! use mimosa_core::units::{QuantityKind, UnitSystem};
//!
//! let units = UnitSystem::default();
//! let budget = units
//!     .convert("emissions.carbonbudget", "1 TtCO2", QuantityKind::Emissions)
//!     .unwrap();
//! assert!((budget - 1000.0).abs() < 1e-9);
//! ```
//!
//! # Supported syntax
//!
//! | Notation | Meaning |
//! |----------|---------|
//! | `GtCO2/yr`, `GtCO2 yr^-1`, `GtCO2 per yr` | Gigatonnes of CO2 per year |
//! | `trillion USD`, `trillion*USD` | 10^12 US dollars |
//! | `delta_degC / TtCO2` | Warming per teratonne of CO2 |
//!
//! Carbon and CO2 masses inter-convert through the 44/12 molecular weight
//! ratio. Temperatures are always differences.
//!
//! # Module structure
//!
//! - [`dimension`]: base dimensions (M, T, Θ, $)
//! - [`registry`]: known unit symbols and their factors
//! - [`parser`]: unit string parsing
//! - [`conversion`]: the [`Unit`] type and conversion factors
//! - [`quantity`]: magnitudes with units
//! - [`system`]: the internal unit system

pub mod conversion;
pub mod dimension;
pub mod parser;
pub mod quantity;
pub mod registry;
pub mod system;

pub use conversion::{conversion_factor, ConversionError, Unit};
pub use dimension::Dimension;
pub use parser::{ParseError, ParsedUnit};
pub use quantity::Quantity;
pub use system::{QuantityKind, UnitSystem};
