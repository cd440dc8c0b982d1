//! Index sets: the continuous time domain and the ordered region set.

use crate::errors::{MimosaError, MimosaResult};
use crate::timeseries::Time;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference year for the carbon budget.
pub const BUDGET_YEAR: f64 = 2100.0;

/// The continuous model time domain `[0, tf]`, where `t = 0` is `begin_year`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDomain {
    begin_year: f64,
    end_year: f64,
}

impl TimeDomain {
    pub fn new(begin_year: f64, end_year: f64) -> MimosaResult<Self> {
        if !(begin_year.is_finite() && end_year.is_finite()) || end_year <= begin_year {
            return Err(MimosaError::InvalidTimeSpan {
                start: begin_year,
                end: end_year,
            });
        }
        Ok(Self {
            begin_year,
            end_year,
        })
    }

    pub fn begin_year(&self) -> f64 {
        self.begin_year
    }

    pub fn end_year(&self) -> f64 {
        self.end_year
    }

    /// Final model time.
    pub fn tf(&self) -> Time {
        self.end_year - self.begin_year
    }

    /// Model time of the year 2100.
    pub fn year2100(&self) -> Time {
        BUDGET_YEAR - self.begin_year
    }

    pub fn contains(&self, t: Time) -> bool {
        (0.0..=self.tf()).contains(&t)
    }

    /// Calendar year of model time `t`.
    pub fn year(&self, t: Time) -> f64 {
        self.begin_year + t
    }
}

impl fmt::Display for TimeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0, {}] ({}-{})", self.tf(), self.begin_year, self.end_year)
    }
}

/// A fixed, ordered, non-empty set of unique region names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSet {
    names: Vec<String>,
}

impl RegionSet {
    pub fn new<I, S>(names: I) -> MimosaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(MimosaError::EmptyRegionSet);
        }
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(MimosaError::InvalidParameter {
                    parameter: format!("regions[{i}].name"),
                    reason: "region names must not be empty".to_string(),
                });
            }
            if names[..i].contains(name) {
                return Err(MimosaError::DuplicateRegion(name.clone()));
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> MimosaResult<&str> {
        self.names
            .get(index)
            .map(String::as_str)
            .ok_or(MimosaError::UnknownRegion(index))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Region indices in order.
    pub fn indices(&self) -> std::ops::Range<usize> {
        0..self.names.len()
    }
}
