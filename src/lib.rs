//! Python extension module bundling the MIMOSA crates.
//!
//! Imported as `mimosa._lib`, with `core` and `components` submodules.

use mimosa_components::python::components;
use mimosa_core::python::core;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pymodule;
use std::ffi::CString;

#[pymodule]
#[pyo3(name = "_lib")]
fn mimosa(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_wrapped(wrap_pymodule!(core))?;
    m.add_wrapped(wrap_pymodule!(components))?;

    set_path(m, "mimosa._lib.core", "core")?;
    set_path(m, "mimosa._lib.components", "components")?;

    Ok(())
}

/// Registers a submodule in `sys.modules` so that `import mimosa._lib.core` works.
fn set_path(m: &Bound<'_, PyModule>, path: &str, module: &str) -> PyResult<()> {
    let code = CString::new(format!(
        "\
import sys
sys.modules['{path}'] = {module}
    "
    ))
    .map_err(|e| PyValueError::new_err(e.to_string()))?;
    m.py().run(code.as_c_str(), None, Some(&m.dict()))
}
