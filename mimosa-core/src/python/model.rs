use crate::forward::simulate;
use crate::model::Model;
use crate::timeseries::Time;
use numpy::ToPyArray;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::cell::RefCell;

/// A sealed model.
///
/// Read-only: relations can be listed and instantiated, and the model can be
/// integrated along a prescribed abatement pathway.
#[pyclass]
#[pyo3(name = "Model")]
#[derive(Debug, Clone)]
pub struct PyModel(pub Model);

#[pymethods]
impl PyModel {
    #[getter]
    fn tf(&self) -> Time {
        self.0.domain().tf()
    }

    #[getter]
    fn begin_year(&self) -> f64 {
        self.0.domain().begin_year()
    }

    #[getter]
    fn regions(&self) -> Vec<String> {
        self.0.regions().names().to_vec()
    }

    fn variable_names(&self) -> Vec<String> {
        self.0.variables().iter().map(|v| v.name.clone()).collect()
    }

    fn parameter_names(&self) -> Vec<String> {
        self.0.parameters().iter().map(|p| p.name.clone()).collect()
    }

    fn constraint_names(&self) -> Vec<String> {
        self.0
            .constraint_names()
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn has_constraint(&self, name: &str) -> bool {
        self.0.has_constraint(name)
    }

    /// Counts of variables, parameters and constraints as a dict
    fn summary<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        Ok(pythonize::pythonize(py, &self.0.summary())?)
    }

    /// Every relation instantiated at time `t`, as strings
    fn relations_at(&self, t: Time) -> PyResult<Vec<String>> {
        Ok(self
            .0
            .relations_at(t)?
            .iter()
            .map(|r| r.relation.to_string())
            .collect())
    }

    fn initial_conditions(&self) -> Vec<String> {
        self.0
            .initial_conditions()
            .iter()
            .map(|r| r.to_string())
            .collect()
    }

    fn objective(&self) -> String {
        self.0.objective().expr.to_string()
    }

    /// Integrate the model with every control set by `policy(t, region_index)`.
    ///
    /// Returns a dict with the time grid under "time", the objective under
    /// "objective" and one array per variable, keyed `name` or `name[region]`.
    #[pyo3(signature = (policy, step=1.0))]
    fn simulate<'py>(
        &self,
        py: Python<'py>,
        policy: Bound<'py, PyAny>,
        step: Time,
    ) -> PyResult<Bound<'py, PyDict>> {
        let error: RefCell<Option<PyErr>> = RefCell::new(None);
        let callback = |t: Time, r: usize| -> f64 {
            match policy.call1((t, r)).and_then(|v| v.extract::<f64>()) {
                Ok(value) => value,
                Err(e) => {
                    error.borrow_mut().get_or_insert(e);
                    f64::NAN
                }
            }
        };
        let result = simulate(&self.0, &callback, step);
        if let Some(e) = error.into_inner() {
            return Err(e);
        }
        let trajectories = result?;

        let regions = self.0.regions();
        let dict = PyDict::new(py);
        dict.set_item("time", trajectories.times().to_pyarray(py))?;
        dict.set_item("objective", trajectories.objective())?;
        for (name, region) in trajectories.names() {
            let key = match region {
                Some(r) => format!("{name}[{}]", regions.name(r)?),
                None => name.to_string(),
            };
            if let Some(values) = trajectories.get(name, region) {
                dict.set_item(key, values.to_pyarray(py))?;
            }
        }
        Ok(dict)
    }

    fn __repr__(&self) -> String {
        format!("Model({})", self.0.summary())
    }
}
