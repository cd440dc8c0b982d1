pub mod components;
pub mod economics;
mod model;
pub mod python;
pub mod variables;

pub use model::{build_model, standard_components};

#[cfg(test)]
pub(crate) mod test_utils;
