//! Exogenous scenario trajectories.
//!
//! Components never read scenario files; they query a [`TrajectoryProvider`]
//! by calendar year and region name. The model context maps model time onto
//! calendar years using the time domain of the run.

use crate::errors::{MimosaError, MimosaResult};
use crate::timeseries::{linspace, trapezoid, FloatValue, Timeseries};
use crate::units::{ConversionError, QuantityKind, Unit, UnitSystem};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;
use std::sync::Arc;

/// Number of samples used when integrating baseline emissions.
pub const CUMULATIVE_SAMPLES: usize = 100;

/// The exogenous series every region needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Series {
    /// Baseline emissions, in the internal emissions-rate unit
    Baseline,
    Population,
    Gdp,
    /// Total factor productivity
    Tfp,
}

impl Series {
    pub const ALL: [Series; 4] = [Series::Baseline, Series::Population, Series::Gdp, Series::Tfp];

    pub fn name(&self) -> &'static str {
        match self {
            Series::Baseline => "baseline",
            Series::Population => "population",
            Series::Gdp => "GDP",
            Series::Tfp => "TFP",
        }
    }

    /// The internal unit kind of this series. TFP is dimensionless.
    pub fn kind(&self) -> Option<QuantityKind> {
        match self {
            Series::Baseline => Some(QuantityKind::EmissionsRate),
            Series::Population => Some(QuantityKind::Population),
            Series::Gdp => Some(QuantityKind::CurrencyRate),
            Series::Tfp => None,
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Series {
    type Err = MimosaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" | "emissions" => Ok(Series::Baseline),
            "population" => Ok(Series::Population),
            "gdp" => Ok(Series::Gdp),
            "tfp" => Ok(Series::Tfp),
            _ => Err(MimosaError::Error(format!("unknown series '{s}'"))),
        }
    }
}

/// Source of exogenous data indexed by calendar year and region.
pub trait TrajectoryProvider: Debug + Send + Sync {
    /// Value of `series` for `region` in calendar year `year`.
    fn lookup(&self, year: f64, region: &str, series: Series) -> MimosaResult<FloatValue>;

    fn lookup_many(
        &self,
        years: &[f64],
        region: &str,
        series: Series,
    ) -> MimosaResult<Vec<FloatValue>> {
        years
            .iter()
            .map(|&year| self.lookup(year, region, series))
            .collect()
    }

    /// Baseline emissions of `region` accumulated from `from_year` to `to_year`.
    fn cumulative_baseline(
        &self,
        from_year: f64,
        to_year: f64,
        region: &str,
    ) -> MimosaResult<FloatValue> {
        let years = linspace(from_year, to_year, CUMULATIVE_SAMPLES);
        let values = self.lookup_many(&years, region, Series::Baseline)?;
        Ok(trapezoid(&years, &values))
    }

    /// Unit string the values of `series` are given in.
    fn units(&self, region: &str, series: Series) -> MimosaResult<String>;

    /// Checks that every series is available for every region over the
    /// calendar years `[begin_year, end_year]`.
    fn check_coverage(&self, regions: &[String], begin_year: f64, end_year: f64)
        -> MimosaResult<()>;
}

/// In-memory scenario data on a calendar-year grid.
#[derive(Debug, Clone, Default)]
pub struct ScenarioData {
    series: HashMap<(String, Series), Timeseries>,
}

impl ScenarioData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a series for a region.
    pub fn with_series(&mut self, region: &str, series: Series, timeseries: Timeseries) -> &mut Self {
        self.series.insert((region.to_string(), series), timeseries);
        self
    }

    pub fn get(&self, region: &str, series: Series) -> Option<&Timeseries> {
        self.series.get(&(region.to_string(), series))
    }

    fn require(&self, region: &str, series: Series) -> MimosaResult<&Timeseries> {
        self.get(region, series).ok_or_else(|| MimosaError::MissingSeries {
            region: region.to_string(),
            series: series.to_string(),
        })
    }

    /// Regions with at least one series, sorted.
    pub fn regions(&self) -> Vec<String> {
        let mut regions: Vec<String> = self.series.keys().map(|(r, _)| r.clone()).collect();
        regions.sort();
        regions.dedup();
        regions
    }
}

impl TrajectoryProvider for ScenarioData {
    fn lookup(&self, year: f64, region: &str, series: Series) -> MimosaResult<FloatValue> {
        self.require(region, series)?.at_time(year)
    }

    fn units(&self, region: &str, series: Series) -> MimosaResult<String> {
        Ok(self.require(region, series)?.units().to_string())
    }

    fn check_coverage(
        &self,
        regions: &[String],
        begin_year: f64,
        end_year: f64,
    ) -> MimosaResult<()> {
        for region in regions {
            for series in Series::ALL {
                let timeseries = self.require(region, series)?;
                if !timeseries.covers(begin_year, end_year) {
                    let (start, end) = timeseries.span();
                    let target = if begin_year < start { begin_year } else { end_year };
                    return Err(MimosaError::ExtrapolationNotAllowed { target, start, end });
                }
            }
        }
        Ok(())
    }
}

/// Factor taking values of `series`, given in `from`, into the internal unit.
fn series_factor(
    region: &str,
    series: Series,
    from: &str,
    units: &UnitSystem,
) -> MimosaResult<FloatValue> {
    let target = series
        .kind()
        .map_or_else(|| "1".to_string(), |kind| units.unit_string(kind));
    let error = |details: String| MimosaError::UnitConversion {
        parameter: format!("scenario.{region}.{series}"),
        unit: target.clone(),
        details,
    };
    let factor = Unit::parse(from)
        .map_err(ConversionError::from)
        .and_then(|source| source.conversion_factor(&Unit::parse(&target)?))
        .map_err(|e| error(format!("'{from}': {e}")))?;
    Ok(factor)
}

/// A provider whose values come back in the internal unit system.
///
/// Conversion factors are resolved once for every region and series, so a
/// series in the wrong dimension fails here rather than during assembly.
#[derive(Debug)]
pub struct InternalUnits {
    inner: Arc<dyn TrajectoryProvider>,
    units: UnitSystem,
    factors: HashMap<(String, Series), FloatValue>,
}

impl InternalUnits {
    pub fn new(
        inner: Arc<dyn TrajectoryProvider>,
        regions: &[String],
        units: &UnitSystem,
    ) -> MimosaResult<Self> {
        let mut factors = HashMap::new();
        for region in regions {
            for series in Series::ALL {
                let from = inner.units(region, series)?;
                let factor = series_factor(region, series, &from, units)?;
                if factor != 1.0 {
                    debug!("Scaling {series} of {region} from '{from}' by {factor}");
                }
                factors.insert((region.clone(), series), factor);
            }
        }
        Ok(Self {
            inner,
            units: units.clone(),
            factors,
        })
    }
}

impl TrajectoryProvider for InternalUnits {
    fn lookup(&self, year: f64, region: &str, series: Series) -> MimosaResult<FloatValue> {
        let factor = self
            .factors
            .get(&(region.to_string(), series))
            .ok_or_else(|| MimosaError::MissingSeries {
                region: region.to_string(),
                series: series.to_string(),
            })?;
        Ok(self.inner.lookup(year, region, series)? * factor)
    }

    fn units(&self, _region: &str, series: Series) -> MimosaResult<String> {
        Ok(series
            .kind()
            .map_or_else(|| "1".to_string(), |kind| self.units.unit_string(kind)))
    }

    fn check_coverage(
        &self,
        regions: &[String],
        begin_year: f64,
        end_year: f64,
    ) -> MimosaResult<()> {
        self.inner.check_coverage(regions, begin_year, end_year)
    }
}
