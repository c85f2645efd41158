use super::*;
use crate::approx::{self, CredibleInterval, Empirical};
use crate::calc::{self, Loss, PointEstimate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};
use statrs::distribution::ContinuousCDF;
use statrs::function::factorial::ln_binomial;
use statrs::function::gamma::ln_gamma;
use std::convert::TryFrom;
use std::fmt;

/// Plain shape parameters of a Beta distribution, as read from or written to
/// the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaParams {
    pub alpha : f64,
    pub beta : f64
}

/// A beta distribution yields ratios over the interval [0, 1]. It is commonly used to
/// model prior Bernoulli probabilities, where alpha and beta act as pseudo-counts of
/// successes and failures. By setting alpha = beta = 1, Beta equals a uniform distribution
/// bounded at [0,1]; by setting alpha = beta >> 1 it approaches a gaussian centered at 0.5.
/// Observing k successes in n Bernoulli trials takes Beta(alpha, beta) into
/// Beta(alpha + k, beta + n - k), which is why the same structure represents both
/// the prior and the posterior of the success probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "BetaParams", into = "BetaParams")]
pub struct Beta {

    alpha : f64,

    beta : f64,

    // Cumulative probabilities (regularized incomplete beta function).
    exact : statrs::distribution::Beta,

    // Beta(alpha + 1, beta). Its cdf at t equals the share of the mean
    // accumulated below t, which gives the L1 expected loss in closed form.
    shifted : statrs::distribution::Beta,

    sampler : rand_distr::Beta<f64>

}

/// A Beta distribution used as the prior of a success probability.
pub type BetaPrior = Beta;

impl Beta {

    pub fn new(alpha : f64, beta : f64) -> Result<Self, InferenceError> {
        check_positive("alpha", alpha)?;
        check_positive("beta", beta)?;
        let exact = statrs::distribution::Beta::new(alpha, beta)
            .map_err(|e| InferenceError::invalid(format!("{}", e)))?;
        let shifted = statrs::distribution::Beta::new(alpha + 1.0, beta)
            .map_err(|e| InferenceError::invalid(format!("{}", e)))?;
        let sampler = rand_distr::Beta::new(alpha, beta)
            .map_err(|e| InferenceError::invalid(format!("{}", e)))?;
        Ok(Self { alpha, beta, exact, shifted, sampler })
    }

    /// The uniform distribution over [0,1], Beta(1, 1).
    pub fn uniform() -> Result<Self, InferenceError> {
        Self::new(1.0, 1.0)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn params(&self) -> BetaParams {
        BetaParams { alpha : self.alpha, beta : self.beta }
    }

    /// Conditions this prior on the observations. See [update_posterior].
    pub fn update(&self, obs : &BernoulliObservations) -> Result<BetaPosterior, InferenceError> {
        update_posterior(self, obs)
    }

}

impl PartialEq for Beta {

    fn eq(&self, other : &Self) -> bool {
        self.alpha == other.alpha && self.beta == other.beta
    }

}

impl TryFrom<BetaParams> for Beta {

    type Error = InferenceError;

    fn try_from(p : BetaParams) -> Result<Self, InferenceError> {
        Beta::new(p.alpha, p.beta)
    }

}

impl From<Beta> for BetaParams {

    fn from(b : Beta) -> Self {
        b.params()
    }

}

impl fmt::Display for Beta {

    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Beta({}, {})", self.alpha, self.beta)
    }

}

// Reference: https://github.com/kthohr/stats/blob/master/include/stats_incl/dens/dbeta.ipp
fn beta_log_prob(x : f64, a : f64, b : f64) -> f64 {
    -1.0*(ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)) +
        (a - 1.0)*x.ln() + (b - 1.0)*(1.0 - x).ln()
}

// Log-density at x = 0 (shape = alpha) or x = 1 (shape = beta), where the power term
// is either one, zero or unbounded.
fn boundary_log_prob(shape : f64, a : f64, b : f64) -> f64 {
    if shape < 1.0 {
        f64::INFINITY
    } else if shape > 1.0 {
        f64::NEG_INFINITY
    } else {
        -1.0*(ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b))
    }
}

impl rand_distr::Distribution<f64> for Beta {

    fn sample<R>(&self, rng : &mut R) -> f64
    where
        R : Rng + ?Sized
    {
        rand_distr::Distribution::sample(&self.sampler, rng)
    }

}

impl Univariate for Beta {

    fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    fn var(&self) -> f64 {
        let (a, b) = (self.alpha, self.beta);
        a*b / ((a + b).powf(2.) * (a + b + 1.))
    }

    fn mode(&self) -> Option<f64> {
        let (a, b) = (self.alpha, self.beta);
        if a > 1.0 && b > 1.0 {
            Some((a - 1.) / (a + b - 2.))
        } else {
            None
        }
    }

    /// At the limits of the support the density is finite only when the matching shape
    /// parameter equals one (e.g. Beta(1, b) at zero equals b); it diverges for shapes
    /// below one and vanishes for shapes above one.
    fn log_prob(&self, x : f64) -> f64 {
        if x > 0.0 && x < 1.0 {
            beta_log_prob(x, self.alpha, self.beta)
        } else if x == 0.0 {
            boundary_log_prob(self.alpha, self.alpha, self.beta)
        } else if x == 1.0 {
            boundary_log_prob(self.beta, self.alpha, self.beta)
        } else {
            f64::NEG_INFINITY
        }
    }

    fn cdf(&self, x : f64) -> f64 {
        if x <= 0.0 {
            0.0
        } else if x >= 1.0 {
            1.0
        } else {
            self.exact.cdf(x)
        }
    }

    fn quantile(&self, p : f64) -> f64 {
        bisect_quantile(|x| self.cdf(x), p, 0.0, 1.0)
    }

    fn expected_loss(&self, estimate : f64, loss : Loss) -> f64 {
        let m = self.mean();
        match loss {
            Loss::L2 => (estimate - m).powf(2.) + self.var(),
            Loss::L1 => {
                let (cdf, partial) = if estimate <= 0.0 {
                    (0.0, 0.0)
                } else if estimate >= 1.0 {
                    (1.0, 1.0)
                } else {
                    (self.exact.cdf(estimate), self.shifted.cdf(estimate))
                };
                estimate * (2.0 * cdf - 1.0) + m - 2.0 * m * partial
            }
        }
    }

}

/// Sufficient statistic of an ordered sequence of Bernoulli outcomes: the number
/// of trials and the number of successes among them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BernoulliObservations {
    trials : u64,
    successes : u64
}

impl BernoulliObservations {

    pub fn new(trials : u64, successes : u64) -> Result<Self, InferenceError> {
        if successes > trials {
            return Err(InferenceError::invalid(
                format!("Number of successes ({}) exceeds number of trials ({})", successes, trials)
            ));
        }
        Ok(Self { trials, successes })
    }

    /// Collapses a sequence of outcomes (true = success) into its sufficient statistic.
    pub fn from_outcomes<I>(outcomes : I) -> Self
    where
        I : IntoIterator<Item=bool>
    {
        outcomes.into_iter().fold(Self::default(), |obs, y| {
            Self { trials : obs.trials + 1, successes : obs.successes + y as u64 }
        })
    }

    /// Reads outcomes coded as 0.0 (failure) and 1.0 (success), such as a column
    /// parsed from a table. Any other value is rejected.
    pub fn from_slice(y : &[f64]) -> Result<Self, InferenceError> {
        let mut outcomes = Vec::with_capacity(y.len());
        for (i, v) in y.iter().enumerate() {
            if *v == 0.0 {
                outcomes.push(false);
            } else if *v == 1.0 {
                outcomes.push(true);
            } else {
                return Err(InferenceError::invalid(
                    format!("Bernoulli outcome at position {} should be 0 or 1 (informed {})", i, v)
                ));
            }
        }
        Ok(Self::from_outcomes(outcomes))
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.trials - self.successes
    }

    /// Sufficient statistic of the concatenation of both sequences.
    pub fn combine(&self, other : &Self) -> Self {
        Self {
            trials : self.trials + other.trials,
            successes : self.successes + other.successes
        }
    }

    /// Binomial log-probability of the observed success count when the success
    /// probability equals theta.
    pub fn log_likelihood(&self, theta : f64) -> f64 {
        if !(0.0..=1.0).contains(&theta) {
            return f64::NEG_INFINITY;
        }
        ln_binomial(self.trials, self.successes) +
            xlny(self.successes as f64, theta) +
            xlny(self.failures() as f64, 1.0 - theta)
    }

}

/// Beta posterior of a success probability. The only way to build it is by conditioning
/// a prior on Bernoulli observations, so its shape parameters are never smaller than
/// those of the prior it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetaPosterior {

    prior : Beta,

    observations : BernoulliObservations,

    posterior : Beta

}

/// Conjugate update of a Beta prior: the posterior is
/// Beta(alpha + successes, beta + trials - successes), computed exactly.
pub fn update_posterior(
    prior : &BetaPrior,
    obs : &BernoulliObservations
) -> Result<BetaPosterior, InferenceError> {
    if obs.successes > obs.trials {
        return Err(InferenceError::invalid("Number of successes exceeds number of trials"));
    }
    let alpha = prior.alpha + obs.successes as f64;
    let beta = prior.beta + obs.failures() as f64;
    tracing::debug!(
        prior_alpha = prior.alpha,
        prior_beta = prior.beta,
        trials = obs.trials,
        successes = obs.successes,
        alpha,
        beta,
        "beta posterior update"
    );
    let posterior = Beta::new(alpha, beta)?;
    Ok(BetaPosterior { prior : prior.clone(), observations : *obs, posterior })
}

impl BetaPosterior {

    pub fn prior(&self) -> &Beta {
        &self.prior
    }

    /// All observations accumulated since the original prior.
    pub fn observations(&self) -> &BernoulliObservations {
        &self.observations
    }

    pub fn distribution(&self) -> &Beta {
        &self.posterior
    }

    pub fn alpha(&self) -> f64 {
        self.posterior.alpha
    }

    pub fn beta(&self) -> f64 {
        self.posterior.beta
    }

    pub fn params(&self) -> BetaParams {
        self.posterior.params()
    }

    /// Uses this posterior as the prior of a fresh analysis.
    pub fn as_prior(&self) -> BetaPrior {
        self.posterior.clone()
    }

    /// Sequential update: conditions the original prior on the union of the
    /// observations seen so far and the new ones.
    pub fn update(&self, obs : &BernoulliObservations) -> Result<BetaPosterior, InferenceError> {
        update_posterior(&self.prior, &self.observations.combine(obs))
    }

    /// Posterior predictive probability that the next trial is a success.
    pub fn predictive_success(&self) -> f64 {
        self.posterior.mean()
    }

    /// Central credible interval leaving (1 - level) / 2 of the posterior mass on each tail.
    pub fn credible_interval(&self, level : f64) -> Result<CredibleInterval, InferenceError> {
        approx::central(&self.posterior, level)
    }

    /// Same tails as credible_interval(.), but taken as the empirical percentiles of
    /// num_samples posterior draws generated from the informed seed.
    pub fn monte_carlo_credible_interval(
        &self,
        level : f64,
        num_samples : usize,
        seed : u64
    ) -> Result<CredibleInterval, InferenceError> {
        let mut rng = StdRng::seed_from_u64(seed);
        approx::monte_carlo(&self.posterior, level, num_samples, &mut rng)
    }

    /// Independent draws from the posterior, generated from the informed seed.
    pub fn draws(&self, num_samples : usize, seed : u64) -> Result<Empirical, InferenceError> {
        let mut rng = StdRng::seed_from_u64(seed);
        Empirical::from_distribution(&self.posterior, num_samples, &mut rng)
    }

    /// Grid point minimizing the posterior expected loss (posterior mean for L2,
    /// posterior median for L1, up to the grid resolution). Ties resolve to the
    /// first grid point.
    pub fn point_estimate(&self, loss : Loss, grid : &[f64]) -> Result<PointEstimate, InferenceError> {
        if let Some(t) = grid.iter().find(|t| !(0.0..=1.0).contains(*t) ) {
            return Err(InferenceError::invalid(format!("Grid point {} outside [0, 1]", t)));
        }
        calc::minimize_expected_loss(grid, loss, |t| self.posterior.expected_loss(t, loss) )
    }

}

impl rand_distr::Distribution<f64> for BetaPosterior {

    fn sample<R>(&self, rng : &mut R) -> f64
    where
        R : Rng + ?Sized
    {
        rand_distr::Distribution::sample(&self.posterior, rng)
    }

}

impl Univariate for BetaPosterior {

    fn mean(&self) -> f64 {
        self.posterior.mean()
    }

    fn var(&self) -> f64 {
        self.posterior.var()
    }

    fn mode(&self) -> Option<f64> {
        self.posterior.mode()
    }

    fn log_prob(&self, x : f64) -> f64 {
        self.posterior.log_prob(x)
    }

    fn cdf(&self, x : f64) -> f64 {
        self.posterior.cdf(x)
    }

    fn quantile(&self, p : f64) -> f64 {
        self.posterior.quantile(p)
    }

    fn expected_loss(&self, estimate : f64, loss : Loss) -> f64 {
        self.posterior.expected_loss(estimate, loss)
    }

}

impl fmt::Display for BetaPosterior {

    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p(θ|D) = {} ({} trials, {} successes)",
            self.posterior,
            self.observations.trials,
            self.observations.successes
        )
    }

}
