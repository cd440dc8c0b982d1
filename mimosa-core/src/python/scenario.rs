use crate::timeseries::{FloatValue, Time, Timeseries};
use crate::trajectories::{ScenarioData, Series, TrajectoryProvider};
use numpy::{PyArray1, PyReadonlyArray1, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn series(name: &str) -> PyResult<Series> {
    name.parse::<Series>()
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Scenario trajectories per region, on a calendar-year grid.
///
/// Example:
///     data = ScenarioData()
///     data.add_series("WORLD", "baseline", years, emissions, "GtCO2/yr")
#[pyclass]
#[pyo3(name = "ScenarioData")]
#[derive(Debug, Clone)]
pub struct PyScenarioData(pub ScenarioData);

#[pymethods]
impl PyScenarioData {
    #[new]
    fn new() -> Self {
        Self(ScenarioData::new())
    }

    /// Add a series ("baseline", "population", "GDP" or "TFP") for a region.
    /// Values are converted into the model's internal units when it is built.
    fn add_series(
        &mut self,
        region: &str,
        series_name: &str,
        years: PyReadonlyArray1<Time>,
        values: PyReadonlyArray1<FloatValue>,
        units: &str,
    ) -> PyResult<()> {
        let timeseries = Timeseries::new(
            years.as_array().to_owned(),
            values.as_array().to_owned(),
            units,
        )?;
        self.0.with_series(region, series(series_name)?, timeseries);
        Ok(())
    }

    fn regions(&self) -> Vec<String> {
        self.0.regions()
    }

    /// Value in calendar year `year`, in the units the series was given in
    fn lookup(&self, year: f64, region: &str, series_name: &str) -> PyResult<FloatValue> {
        Ok(self.0.lookup(year, region, series(series_name)?)?)
    }

    fn lookup_many<'py>(
        &self,
        py: Python<'py>,
        years: PyReadonlyArray1<f64>,
        region: &str,
        series_name: &str,
    ) -> PyResult<Bound<'py, PyArray1<FloatValue>>> {
        let years = years.as_array().to_vec();
        let values = self.0.lookup_many(&years, region, series(series_name)?)?;
        Ok(values.to_pyarray(py))
    }

    /// Baseline emissions accumulated between two calendar years
    fn cumulative_baseline(&self, from_year: f64, to_year: f64, region: &str) -> PyResult<FloatValue> {
        Ok(self.0.cumulative_baseline(from_year, to_year, region)?)
    }

    fn check_coverage(&self, regions: Vec<String>, begin_year: f64, end_year: f64) -> PyResult<()> {
        Ok(self.0.check_coverage(&regions, begin_year, end_year)?)
    }

    fn __repr__(&self) -> String {
        format!("ScenarioData(regions={:?})", self.0.regions())
    }
}
