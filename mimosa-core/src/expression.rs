//! Symbolic expressions over model variables and parameters.
//!
//! Constraint rules return [`Relation`]s built from [`Expr`] trees rather than
//! numbers, so that a transcription method can discretise them and the
//! forward evaluator can compute residuals. Expressions are instantiated at a
//! concrete time point, so every variable reference carries its time and
//! (for regional variables) its region index.

use crate::errors::{MimosaError, MimosaResult};
use crate::timeseries::Time;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A variable instantiated at one point of its index set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarRef {
    pub name: String,
    pub time: Time,
    pub region: Option<usize>,
}

/// A parameter, optionally indexed by region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamRef {
    pub name: String,
    pub region: Option<usize>,
}

/// A leaf of an expression that needs an outside value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Symbol {
    Variable(VarRef),
    /// The time derivative of a variable
    Derivative(VarRef),
    Parameter(ParamRef),
}

impl Symbol {
    /// Name of the underlying variable or parameter.
    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable(v) | Symbol::Derivative(v) => &v.name,
            Symbol::Parameter(p) => &p.name,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Variable(v) => write_indexed(f, &v.name, Some(v.time), v.region),
            Symbol::Derivative(v) => {
                write!(f, "d")?;
                write_indexed(f, &v.name, Some(v.time), v.region)?;
                write!(f, "/dt")
            }
            Symbol::Parameter(p) => write_indexed(f, &p.name, None, p.region),
        }
    }
}

fn write_indexed(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    time: Option<Time>,
    region: Option<usize>,
) -> fmt::Result {
    match (time, region) {
        (Some(t), Some(r)) => write!(f, "{name}[{t}, {r}]"),
        (Some(t), None) => write!(f, "{name}[{t}]"),
        (None, Some(r)) => write!(f, "{name}[{r}]"),
        (None, None) => write!(f, "{name}"),
    }
}

/// An expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Const(f64),
    Symbol(Symbol),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Exp(Box<Expr>),
    Ln(Box<Expr>),
    Sum(Vec<Expr>),
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Const(value)
    }

    pub fn var(name: &str, time: Time, region: Option<usize>) -> Self {
        Expr::Symbol(Symbol::Variable(VarRef {
            name: name.to_string(),
            time,
            region,
        }))
    }

    pub fn derivative(name: &str, time: Time, region: Option<usize>) -> Self {
        Expr::Symbol(Symbol::Derivative(VarRef {
            name: name.to_string(),
            time,
            region,
        }))
    }

    pub fn param(name: &str, region: Option<usize>) -> Self {
        Expr::Symbol(Symbol::Parameter(ParamRef {
            name: name.to_string(),
            region,
        }))
    }

    /// Sum of a sequence of expressions; an empty sum is zero.
    pub fn sum<I: IntoIterator<Item = Expr>>(terms: I) -> Self {
        Expr::Sum(terms.into_iter().collect())
    }

    pub fn pow(self, exponent: impl Into<Expr>) -> Self {
        Expr::Pow(Box::new(self), Box::new(exponent.into()))
    }

    pub fn exp(self) -> Self {
        Expr::Exp(Box::new(self))
    }

    pub fn ln(self) -> Self {
        Expr::Ln(Box::new(self))
    }

    /// `self == rhs`
    pub fn equals(self, rhs: impl Into<Expr>) -> Relation {
        Relation::new(self, Sense::Eq, rhs.into())
    }

    /// `self <= rhs`
    pub fn at_most(self, rhs: impl Into<Expr>) -> Relation {
        Relation::new(self, Sense::Le, rhs.into())
    }

    /// `self >= rhs`
    pub fn at_least(self, rhs: impl Into<Expr>) -> Relation {
        Relation::new(self, Sense::Ge, rhs.into())
    }

    /// Evaluates the expression, asking `values` for every symbol.
    ///
    /// Fails if a symbol has no value or the result is not finite.
    pub fn evaluate(&self, values: &dyn Fn(&Symbol) -> Option<f64>) -> MimosaResult<f64> {
        self.eval(values)
    }

    /// Every intermediate value must be finite, so a division by zero is
    /// reported even when a later operation would hide it.
    fn eval(&self, values: &dyn Fn(&Symbol) -> Option<f64>) -> MimosaResult<f64> {
        let value = match self {
            Expr::Const(c) => *c,
            Expr::Symbol(s) => values(s).ok_or_else(|| MimosaError::UnboundSymbol(s.to_string()))?,
            Expr::Neg(a) => -a.eval(values)?,
            Expr::Add(a, b) => a.eval(values)? + b.eval(values)?,
            Expr::Sub(a, b) => a.eval(values)? - b.eval(values)?,
            Expr::Mul(a, b) => a.eval(values)? * b.eval(values)?,
            Expr::Div(a, b) => a.eval(values)? / b.eval(values)?,
            Expr::Pow(a, b) => a.eval(values)?.powf(b.eval(values)?),
            Expr::Exp(a) => a.eval(values)?.exp(),
            Expr::Ln(a) => a.eval(values)?.ln(),
            Expr::Sum(terms) => {
                let mut total = 0.0;
                for term in terms {
                    total += term.eval(values)?;
                }
                total
            }
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(MimosaError::NonFiniteValue {
                expression: self.to_string(),
                value,
            })
        }
    }

    /// Visits every symbol in the expression, left to right.
    pub fn visit_symbols<'a>(&'a self, visit: &mut dyn FnMut(&'a Symbol)) {
        match self {
            Expr::Const(_) => {}
            Expr::Symbol(s) => visit(s),
            Expr::Neg(a) | Expr::Exp(a) | Expr::Ln(a) => a.visit_symbols(visit),
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => {
                a.visit_symbols(visit);
                b.visit_symbols(visit);
            }
            Expr::Sum(terms) => terms.iter().for_each(|t| t.visit_symbols(visit)),
        }
    }

    pub fn symbols(&self) -> Vec<&Symbol> {
        let mut symbols = Vec::new();
        self.visit_symbols(&mut |s| symbols.push(s));
        symbols
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Sum(terms) if terms.len() == 1 => terms[0].precedence(),
            Expr::Add(..) | Expr::Sub(..) | Expr::Sum(_) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(_) => 3,
            Expr::Pow(..) => 4,
            Expr::Const(c) if *c < 0.0 => 3,
            _ => 5,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(c) => write!(f, "{c}"),
            Expr::Symbol(s) => write!(f, "{s}"),
            Expr::Neg(a) => {
                write!(f, "-")?;
                a.fmt_child(f, 4)
            }
            Expr::Add(a, b) => {
                a.fmt_child(f, 1)?;
                write!(f, " + ")?;
                b.fmt_child(f, 1)
            }
            Expr::Sub(a, b) => {
                a.fmt_child(f, 1)?;
                write!(f, " - ")?;
                b.fmt_child(f, 2)
            }
            Expr::Mul(a, b) => {
                a.fmt_child(f, 2)?;
                write!(f, " * ")?;
                b.fmt_child(f, 2)
            }
            Expr::Div(a, b) => {
                a.fmt_child(f, 2)?;
                write!(f, " / ")?;
                b.fmt_child(f, 3)
            }
            Expr::Pow(a, b) => {
                a.fmt_child(f, 5)?;
                write!(f, "^")?;
                b.fmt_child(f, 5)
            }
            Expr::Exp(a) => write!(f, "exp({a})"),
            Expr::Ln(a) => write!(f, "ln({a})"),
            Expr::Sum(terms) if terms.is_empty() => write!(f, "0"),
            Expr::Sum(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    term.fmt_child(f, 1)?;
                }
                Ok(())
            }
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Const(value)
    }
}

macro_rules! binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl<R: Into<Expr>> $trait<R> for Expr {
            type Output = Expr;

            fn $method(self, rhs: R) -> Expr {
                Expr::$variant(Box::new(self), Box::new(rhs.into()))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(Expr::Const(self)), Box::new(rhs))
            }
        }
    };
}

binary_op!(Add, add, Add);
binary_op!(Sub, sub, Sub);
binary_op!(Mul, mul, Mul);
binary_op!(Div, div, Div);

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

/// Direction of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    Eq,
    Le,
    Ge,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Sense::Eq => "==",
            Sense::Le => "<=",
            Sense::Ge => ">=",
        };
        write!(f, "{op}")
    }
}

/// `lhs ⋚ rhs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub lhs: Expr,
    pub sense: Sense,
    pub rhs: Expr,
}

impl Relation {
    pub fn new(lhs: Expr, sense: Sense, rhs: Expr) -> Self {
        Self { lhs, sense, rhs }
    }

    /// `lhs - rhs`
    pub fn residual(&self, values: &dyn Fn(&Symbol) -> Option<f64>) -> MimosaResult<f64> {
        Ok(self.lhs.evaluate(values)? - self.rhs.evaluate(values)?)
    }

    /// Whether the relation holds within an absolute tolerance.
    pub fn is_satisfied(
        &self,
        values: &dyn Fn(&Symbol) -> Option<f64>,
        tolerance: f64,
    ) -> MimosaResult<bool> {
        let residual = self.residual(values)?;
        Ok(match self.sense {
            Sense::Eq => residual.abs() <= tolerance,
            Sense::Le => residual <= tolerance,
            Sense::Ge => residual >= -tolerance,
        })
    }

    /// The variable this relation defines explicitly, if it has the form
    /// `variable == expression`.
    pub fn defined_variable(&self) -> Option<&VarRef> {
        match (&self.sense, &self.lhs) {
            (Sense::Eq, Expr::Symbol(Symbol::Variable(v))) => Some(v),
            _ => None,
        }
    }

    /// The derivative this relation defines, if it has the form
    /// `d(variable)/dt == expression`.
    pub fn defined_derivative(&self) -> Option<&VarRef> {
        match (&self.sense, &self.lhs) {
            (Sense::Eq, Expr::Symbol(Symbol::Derivative(v))) => Some(v),
            _ => None,
        }
    }

    pub fn symbols(&self) -> Vec<&Symbol> {
        let mut symbols = self.lhs.symbols();
        symbols.extend(self.rhs.symbols());
        symbols
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.sense, self.rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveSense {
    Maximize,
    Minimize,
}

/// The quantity the optimiser acts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub expr: Expr,
    pub sense: ObjectiveSense,
}

impl Objective {
    pub fn maximize(expr: Expr) -> Self {
        Self {
            expr,
            sense: ObjectiveSense::Maximize,
        }
    }
}
