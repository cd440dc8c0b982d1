//! Python bindings for the core types.
//!
//! Exposed as `mimosa._lib.core`.

use crate::config::Parameters;
use crate::errors::MimosaError;
use crate::units::{Quantity, Unit};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

mod model;
mod scenario;

pub use model::PyModel;
pub use scenario::PyScenarioData;

impl From<MimosaError> for PyErr {
    fn from(e: MimosaError) -> PyErr {
        PyValueError::new_err(e.to_string())
    }
}

/// The default run parameters as a nested dict.
#[pyfunction]
pub fn default_parameters(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
    Ok(pythonize::pythonize(py, &Parameters::default())?)
}

/// Validates a parameter dict and returns it converted to internal units.
///
/// Raises ValueError naming the offending parameter.
#[pyfunction]
pub fn validate_parameters<'py>(
    py: Python<'py>,
    parameters: Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    let parameters: Parameters = pythonize::depythonize(&parameters)
        .map_err(|e| PyValueError::new_err(format!("{e}")))?;
    let config = parameters.validate()?;
    Ok(pythonize::pythonize(py, &config)?)
}

/// Converts a quantity string such as "1000 GtCO2" to a number in `unit`.
#[pyfunction]
pub fn convert_quantity(quantity: &str, unit: &str) -> PyResult<f64> {
    let quantity = Quantity::parse(quantity).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let unit = Unit::parse(unit).map_err(|e| PyValueError::new_err(e.to_string()))?;
    quantity
        .value_in(&unit)
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pymodule]
pub fn core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyScenarioData>()?;
    m.add_class::<PyModel>()?;
    m.add_function(wrap_pyfunction!(default_parameters, m)?)?;
    m.add_function(wrap_pyfunction!(validate_parameters, m)?)?;
    m.add_function(wrap_pyfunction!(convert_quantity, m)?)?;
    Ok(())
}
