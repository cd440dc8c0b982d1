use crate::errors::{MimosaError, MimosaResult};
use ndarray::{Array, Array1};
use serde::{Deserialize, Serialize};

pub type Time = f64;
pub type FloatValue = f64;

/// Values sampled on a strictly increasing time grid.
///
/// Values between grid points are linearly interpolated. Requests outside the
/// grid are rejected rather than extrapolated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeseries {
    time: Array1<Time>,
    values: Array1<FloatValue>,
    units: String,
}

impl Timeseries {
    pub fn new(time: Array1<Time>, values: Array1<FloatValue>, units: &str) -> MimosaResult<Self> {
        if time.len() != values.len() {
            return Err(MimosaError::Error(format!(
                "time ({}) and values ({}) must have the same length",
                time.len(),
                values.len()
            )));
        }
        if time.is_empty() {
            return Err(MimosaError::Error("a timeseries needs at least one point".into()));
        }
        if time.windows(2).into_iter().any(|w| w[1] <= w[0]) {
            return Err(MimosaError::Error(
                "time values must be strictly increasing".into(),
            ));
        }

        Ok(Self {
            time,
            values,
            units: units.to_string(),
        })
    }

    pub fn from_values(time: Vec<Time>, values: Vec<FloatValue>, units: &str) -> MimosaResult<Self> {
        Self::new(Array::from_vec(time), Array::from_vec(values), units)
    }

    pub fn time(&self) -> &Array1<Time> {
        &self.time
    }

    pub fn values(&self) -> &Array1<FloatValue> {
        &self.values
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// First and last time of the grid.
    pub fn span(&self) -> (Time, Time) {
        (self.time[0], self.time[self.time.len() - 1])
    }

    /// True if `[start, end]` lies within the grid.
    pub fn covers(&self, start: Time, end: Time) -> bool {
        let (first, last) = self.span();
        start >= first && end <= last
    }

    /// Linearly interpolated value at `t`.
    pub fn at_time(&self, t: Time) -> MimosaResult<FloatValue> {
        let (first, last) = self.span();
        if !(first..=last).contains(&t) {
            return Err(MimosaError::ExtrapolationNotAllowed {
                target: t,
                start: first,
                end: last,
            });
        }

        // Index of the first grid point strictly after t
        let upper = self.time.iter().position(|&x| x > t).unwrap_or(self.len());
        if upper == self.len() {
            return Ok(self.values[self.len() - 1]);
        }
        let lower = upper - 1;
        let (t0, t1) = (self.time[lower], self.time[upper]);
        let (y0, y1) = (self.values[lower], self.values[upper]);
        Ok(y0 + (y1 - y0) * (t - t0) / (t1 - t0))
    }
}

/// Trapezoidal integral of `values` sampled at `x`.
pub fn trapezoid(x: &[f64], values: &[f64]) -> f64 {
    x.windows(2)
        .zip(values.windows(2))
        .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
        .sum()
}

/// `n` evenly spaced points over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series() -> Timeseries {
        Timeseries::from_values(vec![2015.0, 2016.0, 2018.0], vec![10.0, 12.0, 8.0], "GtCO2/yr")
            .unwrap()
    }

    #[test]
    fn interpolates_between_points() {
        let ts = series();
        assert_eq!(ts.at_time(2015.0).unwrap(), 10.0);
        assert_relative_eq!(ts.at_time(2015.5).unwrap(), 11.0);
        assert_relative_eq!(ts.at_time(2017.0).unwrap(), 10.0);
        assert_eq!(ts.at_time(2018.0).unwrap(), 8.0);
    }

    #[test]
    fn rejects_extrapolation() {
        let ts = series();
        let err = ts.at_time(2019.0).unwrap_err();
        assert!(matches!(
            err,
            MimosaError::ExtrapolationNotAllowed { target, .. } if target == 2019.0
        ));
        assert!(ts.at_time(2014.9).is_err());
    }

    #[test]
    fn rejects_unsorted_time() {
        assert!(Timeseries::from_values(vec![1.0, 1.0], vec![0.0, 0.0], "1").is_err());
        assert!(Timeseries::from_values(vec![1.0, 2.0], vec![0.0], "1").is_err());
        assert!(Timeseries::from_values(vec![], vec![], "1").is_err());
    }

    #[test]
    fn serialises_with_units() {
        let ts = series();
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("GtCO2/yr"));
        let restored: Timeseries = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ts);
    }

    #[test]
    fn coverage() {
        let ts = series();
        assert!(ts.covers(2015.0, 2018.0));
        assert!(!ts.covers(2015.0, 2100.0));
    }

    #[test]
    fn trapezoid_of_linear_function_is_exact() {
        let x = linspace(0.0, 10.0, 100);
        let y: Vec<f64> = x.iter().map(|x| 2.0 * x + 1.0).collect();
        assert_relative_eq!(trapezoid(&x, &y), 110.0, max_relative = 1e-12);
    }

    #[test]
    fn linspace_endpoints() {
        let x = linspace(0.0, 3.0, 4);
        assert_eq!(x, vec![0.0, 1.0, 2.0, 3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
