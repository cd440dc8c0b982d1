//! Named constraint rules and the collect-then-commit builder.
//!
//! Components append rules while the model is assembled. Sealing commits the
//! whole batch at once: every global rule in insertion order, then every
//! regional rule in insertion order. A constraint that a configuration
//! disables is never added, and a rule that does not apply at a particular
//! time returns [`Rule::Skip`].

use super::context::ModelContext;
use super::domain::{RegionSet, TimeDomain};
use super::registry::IndexSet;
use crate::errors::{MimosaError, MimosaResult};
use crate::expression::Relation;
use crate::timeseries::Time;
use log::debug;
use std::fmt;
use std::sync::Arc;

/// The outcome of a rule at one index.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Relation(Relation),
    /// The constraint does not exist at this index
    Skip,
}

impl From<Relation> for Rule {
    fn from(relation: Relation) -> Self {
        Rule::Relation(relation)
    }
}

pub type GlobalRuleFn = Arc<dyn Fn(&ModelContext, Time) -> MimosaResult<Rule> + Send + Sync>;
pub type RegionalRuleFn =
    Arc<dyn Fn(&ModelContext, Time, usize) -> MimosaResult<Rule> + Send + Sync>;

#[derive(Clone)]
pub enum ConstraintRule {
    Global { name: String, rule: GlobalRuleFn },
    Regional { name: String, rule: RegionalRuleFn },
}

impl ConstraintRule {
    pub fn name(&self) -> &str {
        match self {
            ConstraintRule::Global { name, .. } | ConstraintRule::Regional { name, .. } => name,
        }
    }
}

impl fmt::Debug for ConstraintRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintRule::Global { name, .. } => write!(f, "Global({name})"),
            ConstraintRule::Regional { name, .. } => write!(f, "Regional({name})"),
        }
    }
}

/// A sealed constraint bound to its index set.
#[derive(Debug, Clone)]
pub struct IndexedConstraint {
    rule: ConstraintRule,
}

impl IndexedConstraint {
    pub fn name(&self) -> &str {
        self.rule.name()
    }

    pub fn index(&self) -> IndexSet {
        match self.rule {
            ConstraintRule::Global { .. } => IndexSet::Time,
            ConstraintRule::Regional { .. } => IndexSet::TimeRegion,
        }
    }

    pub fn rule(&self) -> &ConstraintRule {
        &self.rule
    }

    /// Evaluates the rule at time `t`, for every region if it is regional.
    ///
    /// Skipped indices are left out of the result.
    pub fn instantiate(
        &self,
        context: &ModelContext,
        t: Time,
    ) -> MimosaResult<Vec<(Option<usize>, Relation)>> {
        let mut relations = Vec::new();
        match &self.rule {
            ConstraintRule::Global { rule, .. } => {
                if let Rule::Relation(relation) = rule(context, t)? {
                    relations.push((None, relation));
                }
            }
            ConstraintRule::Regional { rule, .. } => {
                for r in context.regions().indices() {
                    if let Rule::Relation(relation) = rule(context, t, r)? {
                        relations.push((Some(r), relation));
                    }
                }
            }
        }
        Ok(relations)
    }
}

/// Staging area for constraint rules.
#[derive(Default)]
pub struct ConstraintBuilder {
    global: Vec<(String, GlobalRuleFn)>,
    regional: Vec<(String, RegionalRuleFn)>,
}

impl ConstraintBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_name(&self, name: &str) -> MimosaResult<()> {
        let taken = self.global.iter().any(|(n, _)| n == name)
            || self.regional.iter().any(|(n, _)| n == name);
        if taken {
            return Err(MimosaError::DuplicateConstraint(name.to_string()));
        }
        Ok(())
    }

    /// Appends a rule indexed by time.
    pub fn add_global<F>(&mut self, name: &str, rule: F) -> MimosaResult<&mut Self>
    where
        F: Fn(&ModelContext, Time) -> MimosaResult<Rule> + Send + Sync + 'static,
    {
        self.check_name(name)?;
        self.global.push((name.to_string(), Arc::new(rule)));
        Ok(self)
    }

    /// Appends a rule indexed by time and region.
    pub fn add_regional<F>(&mut self, name: &str, rule: F) -> MimosaResult<&mut Self>
    where
        F: Fn(&ModelContext, Time, usize) -> MimosaResult<Rule> + Send + Sync + 'static,
    {
        self.check_name(name)?;
        self.regional.push((name.to_string(), Arc::new(rule)));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.regional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Commits the staged rules: globals first, then regionals.
    pub fn seal(self, domain: &TimeDomain, regions: &RegionSet) -> Vec<IndexedConstraint> {
        debug!(
            "Sealing {} global and {} regional constraints over t in [0, {}] and {} regions",
            self.global.len(),
            self.regional.len(),
            domain.tf(),
            regions.len()
        );
        let global = self.global.into_iter().map(|(name, rule)| IndexedConstraint {
            rule: ConstraintRule::Global { name, rule },
        });
        let regional = self
            .regional
            .into_iter()
            .map(|(name, rule)| IndexedConstraint {
                rule: ConstraintRule::Regional { name, rule },
            });
        global.chain(regional).collect()
    }
}

impl fmt::Debug for ConstraintBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintBuilder")
            .field("global", &self.global.iter().map(|(n, _)| n).collect::<Vec<_>>())
            .field(
                "regional",
                &self.regional.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expr;
    use crate::trajectories::ScenarioData;

    fn context() -> ModelContext {
        ModelContext::new(
            TimeDomain::new(2015.0, 2200.0).unwrap(),
            RegionSet::new(["A", "B"]).unwrap(),
            Arc::new(ScenarioData::new()),
        )
    }

    #[test]
    fn seal_orders_globals_before_regionals() {
        let ctx = context();
        let mut builder = ConstraintBuilder::new();
        builder
            .add_regional("r1", |_, t, r| Ok(Expr::var("x", t, Some(r)).equals(0.0).into()))
            .unwrap()
            .add_global("g1", |_, t| Ok(Expr::var("y", t, None).equals(0.0).into()))
            .unwrap()
            .add_regional("r2", |_, _, _| Ok(Rule::Skip))
            .unwrap()
            .add_global("g2", |_, _| Ok(Rule::Skip))
            .unwrap();

        let sealed = builder.seal(ctx.domain(), ctx.regions());
        let names: Vec<&str> = sealed.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["g1", "g2", "r1", "r2"]);
        assert_eq!(sealed[0].index(), IndexSet::Time);
        assert_eq!(sealed[2].index(), IndexSet::TimeRegion);
    }

    #[test]
    fn instantiate_expands_regions_and_drops_skips() {
        let ctx = context();
        let mut builder = ConstraintBuilder::new();
        builder
            .add_regional("only_first", |_, t, r| {
                if r == 0 {
                    Ok(Expr::var("x", t, Some(r)).at_least(0.0).into())
                } else {
                    Ok(Rule::Skip)
                }
            })
            .unwrap()
            .add_regional("all", |_, t, r| Ok(Expr::var("x", t, Some(r)).at_most(1.0).into()))
            .unwrap();
        let sealed = builder.seal(ctx.domain(), ctx.regions());

        let first = sealed[0].instantiate(&ctx, 3.0).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].0, Some(0));

        let all = sealed[1].instantiate(&ctx, 3.0).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].1.to_string(), "x[3, 1] <= 1");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut builder = ConstraintBuilder::new();
        builder.add_global("c", |_, _| Ok(Rule::Skip)).unwrap();
        assert!(matches!(
            builder.add_regional("c", |_, _, _| Ok(Rule::Skip)),
            Err(MimosaError::DuplicateConstraint(_))
        ));
    }
}
