use crate::errors::MimosaResult;
use crate::model::Assembly;
use std::fmt::Debug;

/// A building block of the model formulation.
///
/// A component declares the variables and parameters it owns and appends the
/// constraint rules that tie them together. Components are declared in the
/// order they are added to the [`crate::model::ModelBuilder`], so a component
/// may refer to variables declared by an earlier one.
///
/// Components are serialisable together with their parameters, so that a
/// configured model can be stored and recreated.
#[typetag::serde(tag = "type")]
pub trait Component: Debug + Send + Sync {
    /// Registers variables, parameters, constraints and (optionally) initial
    /// conditions and the objective with the assembly.
    fn declare(&self, assembly: &mut Assembly) -> MimosaResult<()>;
}
