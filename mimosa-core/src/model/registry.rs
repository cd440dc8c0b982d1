//! Declarations of the model's variables and parameters.

use crate::errors::{MimosaError, MimosaResult};
use crate::expression::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The index set a variable is defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexSet {
    /// Indexed by time only
    Time,
    /// Indexed by time and region
    TimeRegion,
}

impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSet::Time => write!(f, "T"),
            IndexSet::TimeRegion => write!(f, "T × R"),
        }
    }
}

/// The role a variable plays in the optimal control problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    /// A free decision variable
    Control,
    /// A state of the dynamic system
    State,
    /// A quantity fully determined by algebraic relations
    Algebraic,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Bounds {
    pub fn contains(&self, value: f64) -> bool {
        self.lower.is_none_or(|l| value >= l) && self.upper.is_none_or(|u| value <= u)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    pub index: IndexSet,
    pub kind: VariableKind,
    pub bounds: Bounds,
    /// Starting value handed to the solver
    pub initial_guess: Option<f64>,
    /// Whether the variable carries a time-derivative variable
    pub has_derivative: bool,
    pub unit: Option<String>,
    pub description: String,
}

impl VariableDefinition {
    fn new(name: &str, index: IndexSet) -> Self {
        Self {
            name: name.to_string(),
            index,
            kind: VariableKind::Algebraic,
            bounds: Bounds::default(),
            initial_guess: None,
            has_derivative: false,
            unit: None,
            description: String::new(),
        }
    }

    /// An algebraic variable indexed by time.
    pub fn global(name: &str) -> Self {
        Self::new(name, IndexSet::Time)
    }

    /// An algebraic variable indexed by time and region.
    pub fn regional(name: &str) -> Self {
        Self::new(name, IndexSet::TimeRegion)
    }

    pub fn state(mut self) -> Self {
        self.kind = VariableKind::State;
        self
    }

    pub fn control(mut self) -> Self {
        self.kind = VariableKind::Control;
        self
    }

    pub fn with_derivative(mut self) -> Self {
        self.has_derivative = true;
        self
    }

    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.bounds = Bounds { lower, upper };
        self
    }

    pub fn with_initial_guess(mut self, value: f64) -> Self {
        self.initial_guess = Some(value);
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn is_regional(&self) -> bool {
        self.index == IndexSet::TimeRegion
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Scalar(f64),
    /// One value per region, in region order
    Regional(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    pub value: ParameterValue,
    pub unit: Option<String>,
    pub description: String,
}

impl ParameterDefinition {
    pub fn scalar(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value: ParameterValue::Scalar(value),
            unit: None,
            description: String::new(),
        }
    }

    pub fn regional(name: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            value: ParameterValue::Regional(values),
            unit: None,
            description: String::new(),
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn is_regional(&self) -> bool {
        matches!(self.value, ParameterValue::Regional(_))
    }
}

/// Ordered declarations of variables and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    n_regions: usize,
    variables: Vec<VariableDefinition>,
    parameters: Vec<ParameterDefinition>,
}

impl Registry {
    pub fn new(n_regions: usize) -> Self {
        Self {
            n_regions,
            variables: Vec::new(),
            parameters: Vec::new(),
        }
    }

    pub fn declare_variable(&mut self, definition: VariableDefinition) -> MimosaResult<()> {
        if self.variable(&definition.name).is_some() {
            return Err(MimosaError::DuplicateVariable(definition.name));
        }
        if definition.kind == VariableKind::Control && definition.has_derivative {
            return Err(MimosaError::InvalidParameter {
                parameter: definition.name,
                reason: "a control cannot carry a derivative".to_string(),
            });
        }
        self.variables.push(definition);
        Ok(())
    }

    pub fn declare_parameter(&mut self, definition: ParameterDefinition) -> MimosaResult<()> {
        if self.parameter(&definition.name).is_some() {
            return Err(MimosaError::DuplicateParameter(definition.name));
        }
        let values = match &definition.value {
            ParameterValue::Scalar(v) => vec![*v],
            ParameterValue::Regional(values) => {
                if values.len() != self.n_regions {
                    return Err(MimosaError::InvalidParameter {
                        parameter: definition.name,
                        reason: format!(
                            "expected {} regional values, found {}",
                            self.n_regions,
                            values.len()
                        ),
                    });
                }
                values.clone()
            }
        };
        if let Some(value) = values.iter().find(|v| !v.is_finite()) {
            return Err(MimosaError::InvalidParameter {
                parameter: definition.name,
                reason: format!("value {value} is not finite"),
            });
        }
        self.parameters.push(definition);
        Ok(())
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDefinition> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn variables(&self) -> &[VariableDefinition] {
        &self.variables
    }

    pub fn parameters(&self) -> &[ParameterDefinition] {
        &self.parameters
    }

    pub fn n_regions(&self) -> usize {
        self.n_regions
    }

    /// The value of a parameter, indexed by region for regional parameters.
    pub fn parameter_value(&self, name: &str, region: Option<usize>) -> MimosaResult<f64> {
        let definition = self
            .parameter(name)
            .ok_or_else(|| MimosaError::UnknownParameter(name.to_string()))?;
        match (&definition.value, region) {
            (ParameterValue::Scalar(v), None) => Ok(*v),
            (ParameterValue::Regional(values), Some(r)) => {
                values.get(r).copied().ok_or(MimosaError::UnknownRegion(r))
            }
            (ParameterValue::Scalar(_), Some(_)) => Err(MimosaError::IndexMismatch {
                variable: name.to_string(),
                expected: "a scalar".to_string(),
                found: "a regional reference".to_string(),
            }),
            (ParameterValue::Regional(_), None) => Err(MimosaError::IndexMismatch {
                variable: name.to_string(),
                expected: "R".to_string(),
                found: "a scalar reference".to_string(),
            }),
        }
    }

    /// Checks that a symbol refers to a declared variable or parameter with
    /// the right indices.
    pub fn check_symbol(&self, symbol: &Symbol) -> MimosaResult<()> {
        match symbol {
            Symbol::Variable(v) | Symbol::Derivative(v) => {
                let definition = self
                    .variable(&v.name)
                    .ok_or_else(|| MimosaError::UnknownVariable(v.name.clone()))?;
                match (definition.index, v.region) {
                    (IndexSet::Time, None) => {}
                    (IndexSet::TimeRegion, Some(r)) if r < self.n_regions => {}
                    (IndexSet::TimeRegion, Some(r)) => return Err(MimosaError::UnknownRegion(r)),
                    (expected, _) => {
                        return Err(MimosaError::IndexMismatch {
                            variable: v.name.clone(),
                            expected: expected.to_string(),
                            found: symbol.to_string(),
                        })
                    }
                }
                if matches!(symbol, Symbol::Derivative(_)) && !definition.has_derivative {
                    return Err(MimosaError::NoDerivative(v.name.clone()));
                }
                Ok(())
            }
            Symbol::Parameter(p) => self.parameter_value(&p.name, p.region).map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{ParamRef, VarRef};

    fn registry() -> Registry {
        let mut registry = Registry::new(2);
        registry
            .declare_variable(VariableDefinition::global("temperature").state())
            .unwrap();
        registry
            .declare_variable(
                VariableDefinition::regional("capital_stock")
                    .state()
                    .with_derivative()
                    .with_bounds(Some(0.0), None),
            )
            .unwrap();
        registry
            .declare_parameter(ParameterDefinition::scalar("T0", 1.0))
            .unwrap();
        registry
            .declare_parameter(ParameterDefinition::regional("damage_factor", vec![1.0, 2.0]))
            .unwrap();
        registry
    }

    fn var(name: &str, region: Option<usize>) -> VarRef {
        VarRef {
            name: name.to_string(),
            time: 0.0,
            region,
        }
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let mut registry = registry();
        assert!(matches!(
            registry.declare_variable(VariableDefinition::global("temperature")),
            Err(MimosaError::DuplicateVariable(_))
        ));
        assert!(matches!(
            registry.declare_parameter(ParameterDefinition::scalar("T0", 2.0)),
            Err(MimosaError::DuplicateParameter(_))
        ));
    }

    #[test]
    fn regional_parameter_needs_one_value_per_region() {
        let mut registry = registry();
        assert!(registry
            .declare_parameter(ParameterDefinition::regional("init_capitalstock", vec![1.0]))
            .is_err());
        assert!(registry
            .declare_parameter(ParameterDefinition::scalar("alpha", f64::NAN))
            .is_err());
    }

    #[test]
    fn parameter_values() {
        let registry = registry();
        assert_eq!(registry.parameter_value("T0", None).unwrap(), 1.0);
        assert_eq!(registry.parameter_value("damage_factor", Some(1)).unwrap(), 2.0);
        assert!(registry.parameter_value("damage_factor", None).is_err());
        assert!(registry.parameter_value("T0", Some(0)).is_err());
        assert!(matches!(
            registry.parameter_value("TCRE", None),
            Err(MimosaError::UnknownParameter(_))
        ));
    }

    #[test]
    fn symbol_checks() {
        let registry = registry();
        registry
            .check_symbol(&Symbol::Variable(var("temperature", None)))
            .unwrap();
        registry
            .check_symbol(&Symbol::Derivative(var("capital_stock", Some(1))))
            .unwrap();

        assert!(matches!(
            registry.check_symbol(&Symbol::Derivative(var("temperature", None))),
            Err(MimosaError::NoDerivative(_))
        ));
        assert!(matches!(
            registry.check_symbol(&Symbol::Variable(var("temperature", Some(0)))),
            Err(MimosaError::IndexMismatch { .. })
        ));
        assert!(matches!(
            registry.check_symbol(&Symbol::Variable(var("capital_stock", Some(2)))),
            Err(MimosaError::UnknownRegion(2))
        ));
        assert!(matches!(
            registry.check_symbol(&Symbol::Variable(var("utility", Some(0)))),
            Err(MimosaError::UnknownVariable(_))
        ));
        assert!(registry
            .check_symbol(&Symbol::Parameter(ParamRef {
                name: "damage_factor".to_string(),
                region: Some(0),
            }))
            .is_ok());
    }

    #[test]
    fn bounds() {
        let bounds = Bounds {
            lower: Some(0.0),
            upper: Some(2.0),
        };
        assert!(bounds.contains(2.0));
        assert!(!bounds.contains(-0.1));
        assert!(Bounds::default().contains(f64::MAX));
    }
}
