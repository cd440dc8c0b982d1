//! Python bindings for the standard formulation.
//!
//! Exposed as `mimosa._lib.components`.

use crate::build_model as build;
use crate::economics::{damage_fct, lbd_fct, mac};
use mimosa_core::config::Parameters;
use mimosa_core::errors::MimosaResult;
use mimosa_core::expression::Expr;
use mimosa_core::python::{PyModel, PyScenarioData};
use numpy::{PyArray1, PyReadonlyArray1, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::sync::Arc;

/// Builds the standard MIMOSA model.
///
/// `parameters` is a nested dict in the layout of `default_parameters()`;
/// missing sections take their defaults. Uses the shipped defaults if omitted.
#[pyfunction]
#[pyo3(signature = (scenario, parameters=None))]
pub fn build_model(
    scenario: PyRef<'_, PyScenarioData>,
    parameters: Option<Bound<'_, PyAny>>,
) -> PyResult<PyModel> {
    let parameters: Parameters = match parameters {
        Some(p) => {
            pythonize::depythonize(&p).map_err(|e| PyValueError::new_err(format!("{e}")))?
        }
        None => Parameters::default(),
    };
    let model = build(&parameters, Arc::new(scenario.0.clone()))?;
    Ok(PyModel(model))
}

fn evaluate_each(values: &[f64], f: impl Fn(f64) -> Expr) -> MimosaResult<Vec<f64>> {
    values.iter().map(|v| f(*v).evaluate(&|_| None)).collect()
}

/// Carbon price along a range of relative abatement levels.
#[pyfunction]
pub fn mac_curve<'py>(
    py: Python<'py>,
    abatement: PyReadonlyArray1<'py, f64>,
    learning_factor: f64,
    gamma: f64,
    beta: f64,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let prices = evaluate_each(abatement.as_slice()?, |a| {
        mac(
            Expr::constant(a),
            Expr::constant(learning_factor),
            Expr::constant(gamma),
            Expr::constant(beta),
        )
    })?;
    Ok(prices.to_pyarray(py))
}

/// Damages as a fraction of gross output for a range of temperatures.
#[pyfunction]
pub fn damage_curve<'py>(
    py: Python<'py>,
    temperature: PyReadonlyArray1<'py, f64>,
    coeff: f64,
    t0: f64,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let damages = evaluate_each(temperature.as_slice()?, |t| {
        damage_fct(Expr::constant(t), Expr::constant(coeff), Expr::constant(t0))
    })?;
    Ok(damages.to_pyarray(py))
}

/// Learning-by-doing cost multiplier for a range of cumulative abated emissions.
#[pyfunction]
pub fn lbd_curve<'py>(
    py: Python<'py>,
    abated: PyReadonlyArray1<'py, f64>,
    scaling: f64,
    progress_ratio: f64,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let factors = evaluate_each(abated.as_slice()?, |a| {
        lbd_fct(
            Expr::constant(a),
            Expr::constant(scaling),
            Expr::constant(progress_ratio.log2()),
        )
    })?;
    Ok(factors.to_pyarray(py))
}

#[pymodule]
pub fn components(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(build_model, m)?)?;
    m.add_function(wrap_pyfunction!(mac_curve, m)?)?;
    m.add_function(wrap_pyfunction!(damage_curve, m)?)?;
    m.add_function(wrap_pyfunction!(lbd_curve, m)?)?;
    Ok(())
}
