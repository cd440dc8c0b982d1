//! Tests for model assembly, sealing and validation.

#[cfg(test)]
mod basic;

use crate::timeseries::Timeseries;
use crate::trajectories::{ScenarioData, Series};

/// Constant scenario data for the given regions over 2015-2200.
pub(crate) fn flat_scenario(regions: &[&str], baseline: f64) -> ScenarioData {
    let years: Vec<f64> = (2015..=2200).map(f64::from).collect();
    let mut data = ScenarioData::new();
    for region in regions {
        for (series, value) in [
            (Series::Baseline, baseline),
            (Series::Population, 1.0),
            (Series::Gdp, 10.0),
            (Series::Tfp, 1.0),
        ] {
            let values = vec![value; years.len()];
            data.with_series(
                region,
                series,
                Timeseries::from_values(years.clone(), values, "1").unwrap(),
            );
        }
    }
    data
}
