use std::fmt::Debug;
use thiserror::Error;
use crate::calc::Loss;

/// Beta prior and posterior for the success probability of Bernoulli trials.
pub mod beta;

pub use beta::{Beta, BetaParams, BetaPrior, BetaPosterior, BernoulliObservations};

/// Normal prior and posterior for the mean of Normal observations with known variance.
pub mod normal;

pub use normal::{Normal, NormalParams, GaussianPrior, GaussianPosterior, GaussianObservations, log_joint};

/// Error raised synchronously by any operation receiving malformed distribution
/// parameters, or whose arithmetic degenerates. Operations never partially
/// update their inputs, so the caller can always retry with corrected parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {

    /// Non-positive shape or variance, probability level outside (0,1), empty
    /// observation set where a mean is required, etc.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A precision or variance computation produced a value that is zero, negative
    /// or not finite.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String)

}

impl InferenceError {

    pub(crate) fn invalid(msg : impl Into<String>) -> Self {
        InferenceError::InvalidParameter(msg.into())
    }

    pub(crate) fn unstable(msg : impl Into<String>) -> Self {
        InferenceError::NumericalInstability(msg.into())
    }

}

/// Trait shared by the scalar distributions of this crate, whether they play the role
/// of a prior, a posterior or a posterior predictive. Implementors are immutable: every
/// summary is a function of the parameters set at construction. Sampling goes through
/// rand_distr::Distribution, so the caller always decides which (possibly seeded)
/// generator is used.
pub trait Univariate
where
    Self : rand_distr::Distribution<f64> + Debug
{

    /// Expected value.
    fn mean(&self) -> f64;

    /// Variance around the expected value.
    fn var(&self) -> f64;

    fn std_dev(&self) -> f64 {
        self.var().sqrt()
    }

    /// Global maximum of the density, when it is unique and lies in the interior of
    /// the support. Bounded distributions with mass piling at one of the limits return None.
    fn mode(&self) -> Option<f64>;

    /// Log-density evaluated at x. Returns negative infinity outside the support.
    fn log_prob(&self, x : f64) -> f64;

    fn prob(&self, x : f64) -> f64 {
        self.log_prob(x).exp()
    }

    /// Cumulative probability P(X <= x).
    fn cdf(&self, x : f64) -> f64;

    /// Inverse of the cumulative distribution function (percent point function).
    fn quantile(&self, p : f64) -> f64;

    fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    /// Posterior expected loss E[loss(estimate, X)], in closed form.
    fn expected_loss(&self, estimate : f64, loss : Loss) -> f64;

}

const BISECTION_STEPS : usize = 200;

const QUANTILE_TOL : f64 = 1E-14;

/// Inverts a non-decreasing cdf over the bracket [low, high] by bisection. Used for
/// distributions whose quantile function has no closed form.
pub(crate) fn bisect_quantile<F>(cdf : F, p : f64, mut low : f64, mut high : f64) -> f64
where
    F : Fn(f64) -> f64
{
    if p <= 0.0 {
        return low;
    }
    if p >= 1.0 {
        return high;
    }
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (low + high);
        if cdf(mid) < p {
            low = mid;
        } else {
            high = mid;
        }
        if high - low <= QUANTILE_TOL {
            break;
        }
    }
    0.5 * (low + high)
}

pub(crate) fn check_positive(name : &str, val : f64) -> Result<f64, InferenceError> {
    if val.is_finite() && val > 0.0 {
        Ok(val)
    } else {
        Err(InferenceError::invalid(format!("{} should be positive and finite (informed {})", name, val)))
    }
}

pub(crate) fn check_finite(name : &str, val : f64) -> Result<f64, InferenceError> {
    if val.is_finite() {
        Ok(val)
    } else {
        Err(InferenceError::invalid(format!("{} should be finite (informed {})", name, val)))
    }
}

// x * ln(y), taken as zero when x is zero so that boundary probabilities
// with no matching observations do not yield NaN.
pub(crate) fn xlny(x : f64, y : f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x * y.ln()
    }
}
