//! Read-only view of the declared model handed to constraint rules.

use super::domain::{RegionSet, TimeDomain};
use super::registry::Registry;
use crate::errors::MimosaResult;
use crate::expression::Expr;
use crate::timeseries::{FloatValue, Time};
use crate::trajectories::{Series, TrajectoryProvider};
use std::sync::Arc;

/// Everything a constraint rule may consult.
///
/// Variables and parameters come back as symbolic expressions. Exogenous
/// data (baseline emissions, population, productivity) come back as numbers,
/// because they are fixed before the problem is discretised.
#[derive(Debug, Clone)]
pub struct ModelContext {
    domain: TimeDomain,
    regions: RegionSet,
    registry: Registry,
    provider: Arc<dyn TrajectoryProvider>,
}

impl ModelContext {
    pub fn new(
        domain: TimeDomain,
        regions: RegionSet,
        provider: Arc<dyn TrajectoryProvider>,
    ) -> Self {
        let registry = Registry::new(regions.len());
        Self {
            domain,
            regions,
            registry,
            provider,
        }
    }

    pub fn domain(&self) -> &TimeDomain {
        &self.domain
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn provider(&self) -> &Arc<dyn TrajectoryProvider> {
        &self.provider
    }

    /// Global variable at time `t`.
    pub fn var(&self, name: &str, t: Time) -> Expr {
        Expr::var(name, t, None)
    }

    /// Regional variable at time `t` in region `r`.
    pub fn rvar(&self, name: &str, t: Time, r: usize) -> Expr {
        Expr::var(name, t, Some(r))
    }

    /// Time derivative of a global variable.
    pub fn dot(&self, name: &str, t: Time) -> Expr {
        Expr::derivative(name, t, None)
    }

    /// Time derivative of a regional variable.
    pub fn rdot(&self, name: &str, t: Time, r: usize) -> Expr {
        Expr::derivative(name, t, Some(r))
    }

    /// Sum of a regional variable over all regions.
    pub fn sum_regions(&self, name: &str, t: Time) -> Expr {
        Expr::sum(self.regions.indices().map(|r| self.rvar(name, t, r)))
    }

    pub fn param(&self, name: &str) -> Expr {
        Expr::param(name, None)
    }

    pub fn rparam(&self, name: &str, r: usize) -> Expr {
        Expr::param(name, Some(r))
    }

    pub fn param_value(&self, name: &str) -> MimosaResult<f64> {
        self.registry.parameter_value(name, None)
    }

    pub fn rparam_value(&self, name: &str, r: usize) -> MimosaResult<f64> {
        self.registry.parameter_value(name, Some(r))
    }

    /// Scenario value at model time `t`, read in calendar year `begin_year + t`.
    pub fn lookup(&self, t: Time, r: usize, series: Series) -> MimosaResult<FloatValue> {
        self.provider
            .lookup(self.domain.year(t), self.regions.name(r)?, series)
    }

    pub fn baseline(&self, t: Time, r: usize) -> MimosaResult<FloatValue> {
        self.lookup(t, r, Series::Baseline)
    }

    /// Baseline emissions of every region summed.
    pub fn global_baseline(&self, t: Time) -> MimosaResult<FloatValue> {
        self.regions.indices().map(|r| self.baseline(t, r)).sum()
    }

    /// Baseline emissions of region `r` accumulated over `[0, t]`.
    pub fn cumulative_baseline(&self, t: Time, r: usize) -> MimosaResult<FloatValue> {
        self.provider.cumulative_baseline(
            self.domain.begin_year(),
            self.domain.year(t),
            self.regions.name(r)?,
        )
    }
}
