//! Economic functional forms shared by the cost and growth components.
//!
//! Every function builds an expression, so it can be used in constraint rules
//! with variables and parameters as arguments, or evaluated directly on
//! constants.

use mimosa_core::expression::Expr;

/// Below this distance from one, the isoelastic utility is replaced by its
/// logarithmic limit.
pub const LOG_UTILITY_TOLERANCE: f64 = 1e-9;

/// Fraction of output lost to climate damages.
///
/// $$ D(T) = c T^2 - c T_0^2 $$
///
/// Zero at the initial temperature $T_0$ and increasing for positive
/// temperatures.
pub fn damage_fct(temperature: Expr, coeff: Expr, t0: Expr) -> Expr {
    coeff.clone() * temperature.pow(2.0) - coeff * t0.pow(2.0)
}

/// Marginal abatement cost (the carbon price) at relative abatement `a`.
///
/// $$ MAC(a) = \gamma f a^\beta $$
///
/// where $f$ is the learning factor.
pub fn mac(a: Expr, factor: Expr, gamma: Expr, beta: Expr) -> Expr {
    gamma * factor * a.pow(beta)
}

/// Abatement cost per unit of baseline emissions: the integral of [`mac`]
/// over `[0, a]`.
///
/// $$ AC(a) = \frac{\gamma f a^{\beta + 1}}{\beta + 1} $$
pub fn ac(a: Expr, factor: Expr, gamma: Expr, beta: Expr) -> Expr {
    gamma * factor * a.pow(beta.clone() + 1.0) / (beta + 1.0)
}

/// Learning-by-doing cost multiplier after `abated` cumulative emissions.
///
/// $$ LBD = \left(\frac{abated}{S} + 1\right)^{\log_2 \rho} $$
///
/// Each doubling of `abated + S` multiplies costs by the progress ratio $\rho$.
pub fn lbd_fct(abated: Expr, scaling: Expr, log_rate: Expr) -> Expr {
    (abated / scaling + 1.0).pow(log_rate)
}

/// Cobb-Douglas gross output.
///
/// $$ Y = A L^{1 - \alpha} K^\alpha $$
pub fn calc_gdp(tfp: Expr, population: Expr, capital: Expr, alpha: Expr) -> Expr {
    tfp * population.pow(1.0 - alpha.clone()) * capital.pow(alpha)
}

/// Isoelastic utility of consumption `c` shared by a population `l`.
///
/// $$ U = L \frac{(C / L)^{1 - \eta} - 1}{1 - \eta} $$
///
/// `elasmu_value` selects the form: within [`LOG_UTILITY_TOLERANCE`] of one the
/// limit $U = L \ln(C / L)$ is used instead.
pub fn utility(consumption: Expr, population: Expr, elasmu: Expr, elasmu_value: f64) -> Expr {
    let per_capita = consumption / population.clone();
    if (elasmu_value - 1.0).abs() < LOG_UTILITY_TOLERANCE {
        population * per_capita.ln()
    } else {
        population * (per_capita.pow(1.0 - elasmu.clone()) - 1.0) / (1.0 - elasmu)
    }
}
