//! Model builder for constructing a formulation from components.

use crate::component::Component;
use crate::errors::{MimosaError, MimosaResult};
use crate::expression::{Objective, Relation};
use crate::timeseries::Time;
use crate::trajectories::TrajectoryProvider;
use log::{debug, info};
use std::sync::Arc;

use super::constraint::{ConstraintBuilder, Rule};
use super::context::ModelContext;
use super::domain::{RegionSet, TimeDomain};
use super::registry::{ParameterDefinition, VariableDefinition};
use super::runtime::Model;
use super::validation::validate;

pub type C = Arc<dyn Component>;

/// Mutable state of a single `build()`.
///
/// Components declare themselves into an assembly; once every component has
/// been declared the assembly is sealed into an immutable [`Model`].
#[derive(Debug)]
pub struct Assembly {
    context: ModelContext,
    constraints: ConstraintBuilder,
    initial_conditions: Vec<Relation>,
    objective: Option<Objective>,
}

impl Assembly {
    fn new(context: ModelContext) -> Self {
        Self {
            context,
            constraints: ConstraintBuilder::new(),
            initial_conditions: Vec::new(),
            objective: None,
        }
    }

    pub fn context(&self) -> &ModelContext {
        &self.context
    }

    pub fn declare_variable(&mut self, definition: VariableDefinition) -> MimosaResult<()> {
        self.context.registry_mut().declare_variable(definition)
    }

    pub fn declare_parameter(&mut self, definition: ParameterDefinition) -> MimosaResult<()> {
        self.context.registry_mut().declare_parameter(definition)
    }

    pub fn add_global<F>(&mut self, name: &str, rule: F) -> MimosaResult<()>
    where
        F: Fn(&ModelContext, Time) -> MimosaResult<Rule> + Send + Sync + 'static,
    {
        self.constraints.add_global(name, rule).map(|_| ())
    }

    pub fn add_regional<F>(&mut self, name: &str, rule: F) -> MimosaResult<()>
    where
        F: Fn(&ModelContext, Time, usize) -> MimosaResult<Rule> + Send + Sync + 'static,
    {
        self.constraints.add_regional(name, rule).map(|_| ())
    }

    /// Appends an initial condition of the form `variable(0) == expression`.
    pub fn add_initial_condition(&mut self, relation: Relation) -> MimosaResult<()> {
        match relation.defined_variable() {
            Some(v) if v.time == 0.0 => {}
            _ => return Err(MimosaError::InvalidInitialCondition(relation.to_string())),
        }
        self.initial_conditions.push(relation);
        Ok(())
    }

    pub fn set_objective(&mut self, objective: Objective) -> MimosaResult<()> {
        if self.objective.is_some() {
            return Err(MimosaError::DuplicateObjective);
        }
        self.objective = Some(objective);
        Ok(())
    }

    fn seal(self) -> MimosaResult<Model> {
        let objective = self.objective.ok_or(MimosaError::MissingObjective)?;
        let constraints = self
            .constraints
            .seal(self.context.domain(), self.context.regions());
        let model = Model::new(self.context, constraints, self.initial_conditions, objective);
        validate(&model)?;
        Ok(model)
    }
}

/// Build a new model from a set of components.
///
/// The builder holds only configuration. Every call to [`ModelBuilder::build`]
/// starts from an empty assembly, so building twice from the same builder
/// yields two independent, identical models.
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    domain: TimeDomain,
    regions: RegionSet,
    provider: Arc<dyn TrajectoryProvider>,
    components: Vec<C>,
}

impl ModelBuilder {
    pub fn new(
        domain: TimeDomain,
        regions: RegionSet,
        provider: Arc<dyn TrajectoryProvider>,
    ) -> Self {
        Self {
            domain,
            regions,
            provider,
            components: vec![],
        }
    }

    /// Register a component with the builder.
    pub fn with_component(&mut self, component: Arc<dyn Component>) -> &mut Self {
        self.components.push(component);
        self
    }

    pub fn components(&self) -> &[C] {
        &self.components
    }

    /// Declares every component in order and seals the result.
    ///
    /// Scenario coverage is checked before any constraint is registered.
    pub fn build(&self) -> MimosaResult<Model> {
        self.provider.check_coverage(
            self.regions.names(),
            self.domain.begin_year(),
            self.domain.end_year(),
        )?;

        let context = ModelContext::new(self.domain, self.regions.clone(), self.provider.clone());
        let mut assembly = Assembly::new(context);

        for component in &self.components {
            let before = assembly.constraints.len();
            component.declare(&mut assembly)?;
            debug!(
                "{} added {} constraints",
                component_name(component),
                assembly.constraints.len() - before
            );
        }

        let model = assembly.seal()?;
        info!("Built model: {}", model.summary());
        Ok(model)
    }
}

/// Type name of a component, taken from its `Debug` output.
fn component_name(component: &C) -> String {
    format!("{component:?}")
        .split(['{', ' ', '('])
        .next()
        .unwrap_or("UnknownComponent")
        .to_string()
}

