use thiserror::Error;

/// Error type for invalid operations.
///
/// Configuration problems are reported before any constraint is registered and
/// always carry the name of the offending parameter, variable or region.
#[derive(Error, Debug)]
pub enum MimosaError {
    #[error("{0}")]
    Error(String),
    #[error("Extrapolation is not allowed. Target={target}, interpolation range=[{start}, {end}]")]
    ExtrapolationNotAllowed { target: f64, start: f64, end: f64 },
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },
    #[error("Parameter '{parameter}' could not be converted to '{unit}': {details}")]
    UnitConversion {
        parameter: String,
        unit: String,
        details: String,
    },
    #[error("Parameter '{parameter}' requires a unit compatible with '{unit}' but was given a bare number")]
    MissingUnit { parameter: String, unit: String },
    #[error("Invalid time span: end year {end} must be after start year {start}")]
    InvalidTimeSpan { start: f64, end: f64 },
    #[error("The region set is empty")]
    EmptyRegionSet,
    #[error("Region '{0}' is defined more than once")]
    DuplicateRegion(String),
    #[error("Unknown region index {0}")]
    UnknownRegion(usize),
    #[error("No '{series}' data for region '{region}'")]
    MissingSeries { region: String, series: String },
    #[error("Variable '{0}' has not been declared")]
    UnknownVariable(String),
    #[error("Parameter '{0}' has not been declared")]
    UnknownParameter(String),
    #[error("Variable '{0}' is already declared")]
    DuplicateVariable(String),
    #[error("Parameter '{0}' is already declared")]
    DuplicateParameter(String),
    #[error("Variable '{variable}' is indexed by {expected} but was referenced as {found}")]
    IndexMismatch {
        variable: String,
        expected: String,
        found: String,
    },
    #[error("Variable '{0}' has no derivative with respect to time")]
    NoDerivative(String),
    #[error("Symbol '{0}' has no value")]
    UnboundSymbol(String),
    #[error("Expression '{expression}' evaluated to a non-finite value ({value})")]
    NonFiniteValue { expression: String, value: f64 },
    #[error("The derivative of '{0}' is defined by more than one differential equation")]
    DuplicateDifferentialEquation(String),
    #[error("Differential state '{variable}' has {count} initial conditions, expected exactly one")]
    InitialConditionCount { variable: String, count: usize },
    #[error("A constraint named '{0}' is already registered")]
    DuplicateConstraint(String),
    #[error("Initial condition '{0}' must fix a variable at t = 0")]
    InvalidInitialCondition(String),
    #[error("The model has no objective")]
    MissingObjective,
    #[error("The model objective is already set")]
    DuplicateObjective,
    #[error("Algebraic loop detected involving '{0}'")]
    AlgebraicLoop(String),
    #[error("Variable '{0}' could not be determined from the explicit definitions")]
    UndeterminedVariable(String),
    #[error("Integration failed: {0}")]
    IntegrationFailed(String),
    #[error("Could not parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Could not read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type for `Result<T, MimosaError>`.
pub type MimosaResult<T> = Result<T, MimosaError>;
