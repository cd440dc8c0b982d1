pub mod component;
pub mod config;
pub mod errors;
pub mod expression;
pub mod forward;
pub mod model;
pub mod python;
pub mod timeseries;
pub mod trajectories;
pub mod units;

#[cfg(test)]
mod example_components;
