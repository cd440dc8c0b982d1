//! Unit string parser.
//!
//! A unit string is read as a product of registered symbols raised to
//! integer powers. Accepted spellings:
//!
//! - powers: `yr^-1`, `yr**-1`
//! - products: `trillion USD`, `trillion*USD`, `trillion·USD`
//! - quotients: `USD/tCO2`, `USD per tCO2`
//! - grouping: `trillion USD / (GtCO2 yr^-1)`
//!
//! ```text
//! quotient = product (('/' | "per") product)*
//! product  = power (('*' | '·')? power)*
//! power    = (symbol | '(' quotient ')') (('^' | "**") integer)?
//! ```

use super::dimension::Dimension;
use super::registry::UNIT_REGISTRY;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty unit string")]
    EmptyUnit,
    #[error("unknown unit: '{0}'")]
    UnknownUnit(String),
    #[error("invalid exponent: '{0}'")]
    InvalidExponent(String),
    #[error("parse failed: {0}")]
    ParseFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Symbol(String),
    Integer(String),
    Times,
    Divide,
    Power,
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '(' => Token::Open,
            ')' => Token::Close,
            '/' => Token::Divide,
            '^' => Token::Power,
            '·' => Token::Times,
            '*' if chars.next_if(|&(_, n)| n == '*').is_some() => Token::Power,
            '*' => Token::Times,
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start + 1;
                while let Some((i, _)) =
                    chars.next_if(|&(_, n)| n.is_ascii_alphanumeric() || n == '_')
                {
                    end = i + 1;
                }
                match &input[start..end] {
                    "per" => Token::Divide,
                    word => Token::Symbol(word.to_string()),
                }
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut end = start + 1;
                while let Some((i, _)) = chars.next_if(|&(_, n)| n.is_ascii_digit()) {
                    end = i + 1;
                }
                Token::Integer(input[start..end].to_string())
            }
            other => {
                return Err(ParseError::ParseFailed(format!(
                    "unexpected character '{other}' in '{input}'"
                )))
            }
        };
        tokens.push(token);
    }
    Ok(tokens)
}

/// A parsed unit expression.
///
/// `trillion USD/yr` is held as `{USD: 1, trillion: 1, yr: -1}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedUnit {
    components: BTreeMap<String, i32>,
}

impl ParsedUnit {
    /// The empty product.
    #[must_use]
    pub fn dimensionless() -> Self {
        Self::default()
    }

    fn symbol(symbol: String) -> Self {
        Self {
            components: BTreeMap::from([(symbol, 1)]),
        }
    }

    /// Parses a unit string whose symbols are all known to the registry.
    ///
    /// ```
    /// use mimosa_core::units::parser::ParsedUnit;
    ///
    /// assert_eq!(
    ///     ParsedUnit::parse("USD/tCO2").unwrap(),
    ///     ParsedUnit::parse("USD per tCO2").unwrap()
    /// );
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::EmptyUnit);
        }
        if input == "1" || input.eq_ignore_ascii_case("dimensionless") {
            return Ok(Self::dimensionless());
        }

        let mut tokens = tokenize(input)?.into_iter().peekable();
        let parsed = quotient(&mut tokens)?;
        if let Some(token) = tokens.next() {
            return Err(ParseError::ParseFailed(format!(
                "unexpected {token:?} in '{input}'"
            )));
        }

        match parsed
            .components
            .keys()
            .find(|symbol| UNIT_REGISTRY.lookup(symbol).is_none())
        {
            Some(unknown) => Err(ParseError::UnknownUnit(unknown.clone())),
            None => Ok(parsed),
        }
    }

    /// Symbols and their exponents.
    #[must_use]
    pub fn components(&self) -> &BTreeMap<String, i32> {
        &self.components
    }

    fn fold<T>(
        &self,
        init: T,
        f: impl Fn(T, super::registry::UnitInfo, i32) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.components.iter().try_fold(init, |acc, (symbol, &exp)| {
            let info = UNIT_REGISTRY
                .lookup(symbol)
                .ok_or_else(|| ParseError::UnknownUnit(symbol.clone()))?;
            f(acc, info, exp)
        })
    }

    pub fn dimension(&self) -> Result<Dimension, ParseError> {
        self.fold(Dimension::dimensionless(), |acc, info, exp| {
            let exp =
                i8::try_from(exp).map_err(|_| ParseError::InvalidExponent(exp.to_string()))?;
            Ok(acc * info.dimension.pow(exp))
        })
    }

    /// Multiplier taking a value in this unit to base units.
    pub fn to_base_factor(&self) -> Result<f64, ParseError> {
        self.fold(1.0, |acc, info, exp| Ok(acc * info.to_base_factor.powi(exp)))
    }

    #[must_use]
    pub fn multiply(mut self, other: Self) -> Self {
        for (symbol, exp) in other.components {
            *self.components.entry(symbol).or_insert(0) += exp;
        }
        self.components.retain(|_, exp| *exp != 0);
        self
    }

    #[must_use]
    pub fn pow(mut self, exp: i32) -> Self {
        self.components.values_mut().for_each(|e| *e *= exp);
        self.components.retain(|_, e| *e != 0);
        self
    }
}

/// Positive powers, then `/`, then negative powers.
impl fmt::Display for ParsedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |positive: bool| {
            self.components
                .iter()
                .filter(|(_, e)| (**e > 0) == positive)
                .map(|(s, e)| match e.abs() {
                    1 => s.clone(),
                    n => format!("{s}^{n}"),
                })
                .collect::<Vec<_>>()
                .join(" ")
        };
        match (side(true), side(false)) {
            (num, den) if den.is_empty() && num.is_empty() => write!(f, "1"),
            (num, den) if den.is_empty() => write!(f, "{num}"),
            (num, den) if num.is_empty() => write!(f, "1 / {den}"),
            (num, den) => write!(f, "{num} / {den}"),
        }
    }
}

type Tokens = Peekable<IntoIter<Token>>;

fn quotient(tokens: &mut Tokens) -> Result<ParsedUnit, ParseError> {
    let mut result = product(tokens)?;
    while tokens.next_if_eq(&Token::Divide).is_some() {
        result = result.multiply(product(tokens)?.pow(-1));
    }
    Ok(result)
}

fn product(tokens: &mut Tokens) -> Result<ParsedUnit, ParseError> {
    let mut result = power(tokens)?;
    loop {
        let explicit = tokens.next_if_eq(&Token::Times).is_some();
        match tokens.peek() {
            Some(Token::Symbol(_) | Token::Open) => result = result.multiply(power(tokens)?),
            _ if explicit => {
                return Err(ParseError::ParseFailed("expected unit after '*'".into()))
            }
            _ => return Ok(result),
        }
    }
}

fn power(tokens: &mut Tokens) -> Result<ParsedUnit, ParseError> {
    let base = match tokens.next() {
        Some(Token::Symbol(symbol)) => ParsedUnit::symbol(symbol),
        Some(Token::Open) => {
            let inner = quotient(tokens)?;
            if tokens.next() != Some(Token::Close) {
                return Err(ParseError::ParseFailed("missing closing parenthesis".into()));
            }
            inner
        }
        other => {
            return Err(ParseError::ParseFailed(format!(
                "expected unit symbol, found {other:?}"
            )))
        }
    };
    if tokens.next_if_eq(&Token::Power).is_none() {
        return Ok(base);
    }
    match tokens.next() {
        Some(Token::Integer(text)) => text
            .parse()
            .map(|exp| base.pow(exp))
            .map_err(|_| ParseError::InvalidExponent(text)),
        other => Err(ParseError::InvalidExponent(
            other.map(|t| format!("{t:?}")).unwrap_or_default(),
        )),
    }
}
