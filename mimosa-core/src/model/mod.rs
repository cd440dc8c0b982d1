//! A model is the continuous-time formulation assembled from a set of components.
//!
//! Components are declared in order into a fresh [`Assembly`]: each one
//! registers the variables and parameters it owns and appends named constraint
//! rules. The assembly is then sealed into an immutable [`Model`], which
//! exposes everything a transcription method needs: the time domain, the
//! region set, variable and parameter definitions, constraints that can be
//! instantiated at any time point, the initial conditions and the objective.
//!
//! Sealing checks that the formulation is structurally sound. References to
//! undeclared variables, derivatives of variables without one, conflicting
//! differential equations and differential states without exactly one
//! initial condition are all rejected.

mod builder;
mod constraint;
mod context;
mod domain;
mod registry;
mod runtime;
mod validation;

#[cfg(test)]
mod tests;

// Public re-exports
pub use builder::{Assembly, ModelBuilder};
pub use constraint::{
    ConstraintBuilder, ConstraintRule, GlobalRuleFn, IndexedConstraint, RegionalRuleFn, Rule,
};
pub use context::ModelContext;
pub use domain::{RegionSet, TimeDomain, BUDGET_YEAR};
pub use registry::{
    Bounds, IndexSet, ParameterDefinition, ParameterValue, Registry, VariableDefinition,
    VariableKind,
};
pub use runtime::{InstantiatedRelation, Model, ModelSummary};
