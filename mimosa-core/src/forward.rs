//! Forward evaluation of a model along a prescribed control pathway.
//!
//! With the controls fixed by a policy, the formulation reduces to an initial
//! value problem: differential states are integrated from their initial
//! conditions and every other variable follows from its explicit definition
//! (`variable == expression`). The result is a consistent trajectory that can
//! seed a transcription method with an initial guess, or be checked against
//! the model's relations directly.

use crate::errors::{MimosaError, MimosaResult};
use crate::expression::{Relation, Symbol};
use crate::model::{Model, VariableKind};
use crate::timeseries::{FloatValue, Time};
use log::debug;
use nalgebra::DVector;
use ode_solvers::{Rk4, System};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// A variable at one index of the region set (`None` for global variables).
type Key = (String, Option<usize>);

type ModelState = DVector<FloatValue>;

fn describe(key: &Key) -> String {
    match key.1 {
        Some(r) => format!("{}[{r}]", key.0),
        None => key.0.clone(),
    }
}

fn lookup(values: &HashMap<Key, f64>, symbol: &Symbol) -> Option<f64> {
    match symbol {
        Symbol::Variable(v) => values.get(&(v.name.clone(), v.region)).copied(),
        _ => None,
    }
}

/// How the variables of a model are determined during forward evaluation.
#[derive(Debug)]
struct Plan {
    states: Vec<Key>,
    controls: Vec<Key>,
    /// Explicitly defined variables, dependencies first
    order: Vec<Key>,
}

impl Plan {
    fn new(model: &Model) -> MimosaResult<Self> {
        let keys = |name: &str| -> Vec<Key> {
            match model.variable(name) {
                Some(v) if v.is_regional() => model
                    .regions()
                    .indices()
                    .map(|r| (name.to_string(), Some(r)))
                    .collect(),
                _ => vec![(name.to_string(), None)],
            }
        };

        let states: Vec<Key> = model
            .differential_states()?
            .iter()
            .flat_map(|name| keys(name))
            .collect();

        let mut controls = Vec::new();
        for variable in model.variables() {
            if variable.kind == VariableKind::Control {
                if !variable.is_regional() {
                    return Err(MimosaError::Error(format!(
                        "control '{}' must be indexed by region for forward evaluation",
                        variable.name
                    )));
                }
                controls.extend(keys(&variable.name));
            }
        }

        let known: HashSet<&Key> = states.iter().chain(controls.iter()).collect();

        let relations = model.relations_at(0.0)?;
        let mut definitions: Vec<(Key, &Relation)> = Vec::new();
        let mut defined: HashSet<Key> = HashSet::new();
        for instance in &relations {
            if let Some(v) = instance.relation.defined_variable() {
                let key = (v.name.clone(), v.region);
                if !known.contains(&key) && defined.insert(key.clone()) {
                    definitions.push((key, &instance.relation));
                }
            }
        }

        let mut graph: DiGraph<Key, ()> = DiGraph::new();
        let nodes: HashMap<Key, NodeIndex> = definitions
            .iter()
            .map(|(key, _)| (key.clone(), graph.add_node(key.clone())))
            .collect();

        let mut require = |symbol: &Symbol, target: Option<NodeIndex>| -> MimosaResult<()> {
            match symbol {
                Symbol::Parameter(_) => Ok(()),
                Symbol::Derivative(v) => Err(MimosaError::UndeterminedVariable(format!(
                    "d{}/dt",
                    describe(&(v.name.clone(), v.region))
                ))),
                Symbol::Variable(v) => {
                    let dependency = (v.name.clone(), v.region);
                    if known.contains(&dependency) {
                        Ok(())
                    } else if let Some(&source) = nodes.get(&dependency) {
                        if let Some(target) = target {
                            graph.add_edge(source, target, ());
                        }
                        Ok(())
                    } else {
                        Err(MimosaError::UndeterminedVariable(describe(&dependency)))
                    }
                }
            }
        };

        for (key, relation) in &definitions {
            let target = nodes.get(key).copied();
            for symbol in relation.rhs.symbols() {
                require(symbol, target)?;
            }
        }
        for instance in &relations {
            if instance.relation.defined_derivative().is_some() {
                for symbol in instance.relation.rhs.symbols() {
                    require(symbol, None)?;
                }
            }
        }

        let order = toposort(&graph, None)
            .map_err(|cycle| MimosaError::AlgebraicLoop(describe(&graph[cycle.node_id()])))?
            .into_iter()
            .map(|node| graph[node].clone())
            .collect();

        Ok(Self {
            states,
            controls,
            order,
        })
    }
}

/// Every variable and state derivative at one time point.
struct Evaluation {
    values: HashMap<Key, f64>,
    derivatives: Vec<f64>,
}

fn evaluate(
    model: &Model,
    plan: &Plan,
    policy: &dyn Fn(Time, usize) -> f64,
    t: Time,
    y: &[f64],
) -> MimosaResult<Evaluation> {
    let mut values: HashMap<Key, f64> = plan.states.iter().cloned().zip(y.iter().copied()).collect();
    for key in &plan.controls {
        if let Some(r) = key.1 {
            values.insert(key.clone(), policy(t, r));
        }
    }

    let relations = model.relations_at(t)?;
    let mut definitions = HashMap::new();
    let mut odes = HashMap::new();
    for instance in &relations {
        let relation = &instance.relation;
        if let Some(v) = relation.defined_variable() {
            definitions.entry((v.name.clone(), v.region)).or_insert(relation);
        } else if let Some(v) = relation.defined_derivative() {
            odes.insert((v.name.clone(), v.region), relation);
        }
    }

    for key in &plan.order {
        let relation = definitions
            .get(key)
            .ok_or_else(|| MimosaError::UndeterminedVariable(describe(key)))?;
        let value = {
            let variables = |symbol: &Symbol| lookup(&values, symbol);
            let value = relation.rhs.evaluate(&model.valuation(&variables))?;
            value
        };
        values.insert(key.clone(), value);
    }

    let derivatives = {
        let variables = |symbol: &Symbol| lookup(&values, symbol);
        let valuation = model.valuation(&variables);
        let derivatives = plan
            .states
            .iter()
            .map(|key| {
                odes.get(key)
                    .ok_or_else(|| {
                        MimosaError::UndeterminedVariable(format!("d{}/dt", describe(key)))
                    })?
                    .rhs
                    .evaluate(&valuation)
            })
            .collect::<MimosaResult<Vec<f64>>>()?;
        derivatives
    };

    Ok(Evaluation {
        values,
        derivatives,
    })
}

/// The right-hand side of the state equations for one integration step.
struct ForwardSystem<'a> {
    model: &'a Model,
    plan: &'a Plan,
    policy: &'a dyn Fn(Time, usize) -> f64,
    /// First evaluation error; the solver itself cannot propagate one
    error: Rc<RefCell<Option<MimosaError>>>,
}

impl System<Time, ModelState> for ForwardSystem<'_> {
    fn system(&self, t: Time, y: &ModelState, dy: &mut ModelState) {
        match evaluate(self.model, self.plan, self.policy, t, y.as_slice()) {
            Ok(evaluation) => {
                for (i, derivative) in evaluation.derivatives.into_iter().enumerate() {
                    dy[i] = derivative;
                }
            }
            Err(e) => {
                dy.fill(f64::NAN);
                let mut error = self.error.borrow_mut();
                if error.is_none() {
                    *error = Some(e);
                }
            }
        }
    }
}

/// Values of every variable on the evaluation grid.
#[derive(Debug, Clone)]
pub struct Trajectories {
    times: Vec<Time>,
    values: HashMap<Key, Vec<f64>>,
    derivatives: HashMap<Key, Vec<f64>>,
    objective: f64,
}

impl Trajectories {
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Values of a variable (in one region, for regional variables).
    pub fn get(&self, name: &str, region: Option<usize>) -> Option<&[f64]> {
        self.values
            .get(&(name.to_string(), region))
            .map(|v| v.as_slice())
    }

    /// Every recorded variable with its region index, sorted by name.
    pub fn names(&self) -> Vec<(&str, Option<usize>)> {
        let mut names: Vec<(&str, Option<usize>)> = self
            .values
            .keys()
            .map(|(name, region)| (name.as_str(), *region))
            .collect();
        names.sort();
        names
    }

    /// Time derivative of a differential state.
    pub fn derivative(&self, name: &str, region: Option<usize>) -> Option<&[f64]> {
        self.derivatives
            .get(&(name.to_string(), region))
            .map(|v| v.as_slice())
    }

    /// The last value of a variable.
    pub fn last(&self, name: &str, region: Option<usize>) -> Option<f64> {
        self.get(name, region).and_then(|v| v.last().copied())
    }

    /// Variable and derivative values at grid point `i`, for evaluating
    /// relations instantiated at `times()[i]`. Combine with
    /// [`Model::valuation`] to resolve parameters.
    pub fn valuation_at(&self, i: usize) -> impl Fn(&Symbol) -> Option<f64> + '_ {
        move |symbol| {
            let (series, v) = match symbol {
                Symbol::Variable(v) => (&self.values, v),
                Symbol::Derivative(v) => (&self.derivatives, v),
                Symbol::Parameter(_) => return None,
            };
            series
                .get(&(v.name.clone(), v.region))
                .and_then(|values| values.get(i).copied())
        }
    }

    /// Value of the model objective along this trajectory.
    pub fn objective(&self) -> f64 {
        self.objective
    }
}

fn initial_state(model: &Model, plan: &Plan) -> MimosaResult<Vec<f64>> {
    let none = |_: &Symbol| -> Option<f64> { None };
    let valuation = model.valuation(&none);
    plan.states
        .iter()
        .map(|key| {
            let relation = model
                .initial_conditions()
                .iter()
                .find(|relation| {
                    relation
                        .defined_variable()
                        .is_some_and(|v| v.name == key.0 && v.region == key.1)
                })
                .ok_or_else(|| MimosaError::InitialConditionCount {
                    variable: describe(key),
                    count: 0,
                })?;
            relation.rhs.evaluate(&valuation)
        })
        .collect()
}

/// Integrates `model` over its time domain with every control set by
/// `policy(t, region)`.
///
/// States are integrated with fourth-order Runge-Kutta on a uniform grid with
/// at most `step` years between points; the grid always ends exactly at `tf`.
pub fn simulate(
    model: &Model,
    policy: &dyn Fn(Time, usize) -> f64,
    step: Time,
) -> MimosaResult<Trajectories> {
    if !(step.is_finite() && step > 0.0) {
        return Err(MimosaError::InvalidParameter {
            parameter: "step".to_string(),
            reason: format!("{step} is not a positive step size"),
        });
    }

    let plan = Plan::new(model)?;
    debug!(
        "forward evaluation: {} states, {} controls, {} definitions",
        plan.states.len(),
        plan.controls.len(),
        plan.order.len()
    );

    let tf = model.domain().tf();
    let n_steps = (tf / step).ceil().max(1.0) as usize;
    let times: Vec<Time> = (0..=n_steps)
        .map(|i| tf * i as f64 / n_steps as f64)
        .collect();

    let mut values: HashMap<Key, Vec<f64>> = HashMap::new();
    let mut derivatives: HashMap<Key, Vec<f64>> = HashMap::new();
    let mut record = |evaluation: Evaluation| {
        for (key, value) in evaluation.values {
            values.entry(key).or_default().push(value);
        }
        for (key, derivative) in plan.states.iter().zip(evaluation.derivatives) {
            derivatives.entry(key.clone()).or_default().push(derivative);
        }
    };

    let mut y = ModelState::from_vec(initial_state(model, &plan)?);
    record(evaluate(model, &plan, policy, times[0], y.as_slice())?);

    let error = Rc::new(RefCell::new(None));
    for window in times.windows(2) {
        let (t_current, t_next) = (window[0], window[1]);
        let system = ForwardSystem {
            model,
            plan: &plan,
            policy,
            error: Rc::clone(&error),
        };
        let mut solver = Rk4::new(system, t_current, y.clone(), t_next, t_next - t_current);
        solver
            .integrate()
            .map_err(|e| MimosaError::IntegrationFailed(format!("{e:?}")))?;
        if let Some(e) = error.borrow_mut().take() {
            return Err(e);
        }

        let (_, states) = solver.results().get();
        y = states
            .last()
            .cloned()
            .ok_or_else(|| MimosaError::IntegrationFailed(format!("no step taken at t={t_current}")))?;
        record(evaluate(model, &plan, policy, t_next, y.as_slice())?);
    }

    let mut trajectories = Trajectories {
        times,
        values,
        derivatives,
        objective: f64::NAN,
    };
    let last = trajectories.len() - 1;
    let objective = {
        let variables = trajectories.valuation_at(last);
        let objective = model.objective().expr.evaluate(&model.valuation(&variables))?;
        objective
    };
    trajectories.objective = objective;
    Ok(trajectories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::example_components::{TestComponent, TestComponentParameters};
    use crate::expression::{Expr, Objective};
    use crate::model::{Assembly, ModelBuilder, RegionSet, TimeDomain, VariableDefinition};
    use crate::timeseries::Timeseries;
    use crate::trajectories::{ScenarioData, Series};
    use approx::assert_relative_eq;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    fn scenario(regions: &[&str], baseline: f64, population: f64) -> ScenarioData {
        let years = vec![2015.0, 2100.0, 2200.0];
        let mut data = ScenarioData::new();
        for region in regions {
            for (series, value) in [
                (Series::Baseline, baseline),
                (Series::Population, population),
                (Series::Gdp, 10.0),
                (Series::Tfp, 1.0),
            ] {
                data.with_series(
                    region,
                    series,
                    Timeseries::from_values(years.clone(), vec![value; 3], "1").unwrap(),
                );
            }
        }
        data
    }

    fn build(component: Arc<dyn Component>, regions: &[&str]) -> MimosaResult<Model> {
        let mut builder = ModelBuilder::new(
            TimeDomain::new(2015.0, 2100.0).unwrap(),
            RegionSet::new(regions.iter().copied()).unwrap(),
            Arc::new(scenario(regions, 2.0, 1.0)),
        );
        builder.with_component(component);
        builder.build()
    }

    fn test_model(regions: &[&str]) -> Model {
        build(
            Arc::new(TestComponent::from_parameters(
                TestComponentParameters::default(),
            )),
            regions,
        )
        .unwrap()
    }

    #[test]
    fn matches_analytical_solution() {
        let model = test_model(&["A"]);
        let trajectories = simulate(&model, &|_, _| 0.5, 0.5).unwrap();

        assert_eq!(trajectories.times()[0], 0.0);
        assert_eq!(*trajectories.times().last().unwrap(), 85.0);
        assert_eq!(trajectories.len(), 171);

        // dS/dt = -0.1 S + 1, S(0) = 1
        let expected = |t: f64| 10.0 - 9.0 * (-0.1 * t).exp();
        let stock = trajectories.get("stock", Some(0)).unwrap();
        for (t, value) in trajectories.times().iter().zip(stock) {
            assert_relative_eq!(*value, expected(*t), max_relative = 1e-6);
        }
        assert!(trajectories
            .get("inflow", Some(0))
            .unwrap()
            .iter()
            .all(|v| *v == 1.0));
        assert_relative_eq!(trajectories.objective(), expected(85.0), max_relative = 1e-6);
    }

    #[test]
    fn relations_hold_along_the_trajectory() {
        let model = test_model(&["A", "B"]);
        let policy = |t: Time, r: usize| if r == 0 { 0.2 } else { (t / 85.0).min(1.0) };
        let trajectories = simulate(&model, &policy, 1.0).unwrap();

        for (i, t) in trajectories.times().iter().enumerate() {
            let variables = trajectories.valuation_at(i);
            let values = model.valuation(&variables);
            for instance in model.relations_at(*t).unwrap() {
                assert!(
                    instance.relation.is_satisfied(&values, 1e-9).unwrap(),
                    "{} violated at t={t}",
                    instance.relation
                );
            }
        }
    }

    #[test]
    fn grid_ends_at_final_time() {
        let model = test_model(&["A"]);
        let trajectories = simulate(&model, &|_, _| 0.0, 10.0).unwrap();
        // 85 / 10 rounds up to 9 intervals
        assert_eq!(trajectories.len(), 10);
        assert_eq!(*trajectories.times().last().unwrap(), 85.0);
    }

    #[test]
    fn invalid_step() {
        let model = test_model(&["A"]);
        assert!(simulate(&model, &|_, _| 0.0, 0.0).is_err());
        assert!(simulate(&model, &|_, _| 0.0, f64::NAN).is_err());
    }

    /// Two variables defined in terms of each other.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct CircularDefinitions;

    #[typetag::serde]
    impl Component for CircularDefinitions {
        fn declare(&self, assembly: &mut Assembly) -> MimosaResult<()> {
            assembly.declare_variable(VariableDefinition::global("x"))?;
            assembly.declare_variable(VariableDefinition::global("y"))?;
            assembly.add_global("x", |ctx, t| Ok(ctx.var("x", t).equals(ctx.var("y", t) + 1.0).into()))?;
            assembly.add_global("y", |ctx, t| Ok(ctx.var("y", t).equals(ctx.var("x", t) * 2.0).into()))?;
            assembly.set_objective(Objective::maximize(Expr::var("x", 0.0, None)))
        }
    }

    /// Uses a variable that only appears in an inequality.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct ImplicitVariable;

    #[typetag::serde]
    impl Component for ImplicitVariable {
        fn declare(&self, assembly: &mut Assembly) -> MimosaResult<()> {
            assembly.declare_variable(VariableDefinition::global("x"))?;
            assembly.declare_variable(VariableDefinition::global("z"))?;
            assembly.add_global("x", |ctx, t| Ok(ctx.var("x", t).equals(ctx.var("z", t)).into()))?;
            assembly.add_global("z_floor", |ctx, t| Ok(ctx.var("z", t).at_least(0.0).into()))?;
            assembly.set_objective(Objective::maximize(Expr::var("x", 0.0, None)))
        }
    }

    #[test]
    fn algebraic_loop_is_reported() {
        let model = build(Arc::new(CircularDefinitions), &["A"]).unwrap();
        assert!(matches!(
            simulate(&model, &|_, _| 0.0, 1.0),
            Err(MimosaError::AlgebraicLoop(_))
        ));
    }

    #[test]
    fn undetermined_variable_is_reported() {
        let model = build(Arc::new(ImplicitVariable), &["A"]).unwrap();
        assert!(matches!(
            simulate(&model, &|_, _| 0.0, 1.0),
            Err(MimosaError::UndeterminedVariable(name)) if name == "z"
        ));
    }
}
