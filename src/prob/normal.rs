use super::*;
use crate::approx::{self, CredibleInterval, Empirical};
use crate::calc::{self, Loss, PointEstimate, running};
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};
use statrs::distribution::ContinuousCDF;
use std::convert::TryFrom;
use std::fmt;

/// Location and variance of a Normal distribution, as read from or written to
/// the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
    pub mean : f64,
    pub variance : f64
}

/// Univariate Normal distribution, parametrized by its mean and variance. Plays the role of the
/// prior for an unknown mean, of the conjugate posterior of that mean, and of the posterior
/// predictive distribution of a new observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "NormalParams", into = "NormalParams")]
pub struct Normal {

    loc : f64,

    scale : f64,

    exact : statrs::distribution::Normal,

    sampler : rand_distr::Normal<f64>

}

/// A Normal distribution used as the prior of an unknown mean.
pub type GaussianPrior = Normal;

impl Normal {

    pub fn new(mean : f64, variance : f64) -> Result<Self, InferenceError> {
        check_finite("mean", mean)?;
        check_positive("variance", variance)?;
        let sd = variance.sqrt();
        let exact = statrs::distribution::Normal::new(mean, sd)
            .map_err(|e| InferenceError::invalid(format!("{}", e)))?;
        let sampler = rand_distr::Normal::new(mean, sd)
            .map_err(|e| InferenceError::invalid(format!("{}", e)))?;
        Ok(Self { loc : mean, scale : variance, exact, sampler })
    }

    pub fn from_std_dev(mean : f64, std_dev : f64) -> Result<Self, InferenceError> {
        check_positive("standard deviation", std_dev)?;
        Self::new(mean, std_dev.powf(2.))
    }

    pub fn location(&self) -> f64 {
        self.loc
    }

    pub fn variance(&self) -> f64 {
        self.scale
    }

    pub fn params(&self) -> NormalParams {
        NormalParams { mean : self.loc, variance : self.scale }
    }

    /// Conditions this prior on the observations. See [update_posterior].
    pub fn update(&self, obs : &GaussianObservations) -> Result<GaussianPosterior, InferenceError> {
        update_posterior(self, obs)
    }

}

impl PartialEq for Normal {

    fn eq(&self, other : &Self) -> bool {
        self.loc == other.loc && self.scale == other.scale
    }

}

impl TryFrom<NormalParams> for Normal {

    type Error = InferenceError;

    fn try_from(p : NormalParams) -> Result<Self, InferenceError> {
        Normal::new(p.mean, p.variance)
    }

}

impl From<Normal> for NormalParams {

    fn from(n : Normal) -> Self {
        n.params()
    }

}

impl fmt::Display for Normal {

    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N({:.3}, {:.3})", self.loc, self.scale)
    }

}

// based on stats::dnorm.ipp
pub(crate) fn normal_log_prob(x : f64, mu : f64, stddev : f64) -> f64 {
    std_normal_log_prob((x - mu) / stddev, stddev)
}

// based on stats::dnorm.ipp
pub(crate) fn std_normal_log_prob(z : f64, stddev : f64) -> f64 {
    -0.5 * (2.0*std::f64::consts::PI).ln() - stddev.ln() - z.powf(2.0) / 2.0
}

impl rand_distr::Distribution<f64> for Normal {

    fn sample<R>(&self, rng : &mut R) -> f64
    where
        R : Rng + ?Sized
    {
        rand_distr::Distribution::sample(&self.sampler, rng)
    }

}

impl Univariate for Normal {

    fn mean(&self) -> f64 {
        self.loc
    }

    fn var(&self) -> f64 {
        self.scale
    }

    fn mode(&self) -> Option<f64> {
        Some(self.loc)
    }

    fn log_prob(&self, x : f64) -> f64 {
        normal_log_prob(x, self.loc, self.scale.sqrt())
    }

    fn cdf(&self, x : f64) -> f64 {
        self.exact.cdf(x)
    }

    fn quantile(&self, p : f64) -> f64 {
        if p <= 0.0 {
            f64::NEG_INFINITY
        } else if p >= 1.0 {
            f64::INFINITY
        } else {
            self.exact.inverse_cdf(p)
        }
    }

    fn median(&self) -> f64 {
        self.loc
    }

    fn expected_loss(&self, estimate : f64, loss : Loss) -> f64 {
        match loss {
            Loss::L2 => (estimate - self.loc).powf(2.) + self.scale,
            Loss::L1 => {
                // E|t - X| = sd * (2 phi(z) + z (2 Phi(z) - 1)), z = (t - mean) / sd
                let sd = self.scale.sqrt();
                let z = (estimate - self.loc) / sd;
                let density = std_normal_log_prob(z, 1.0).exp();
                sd * (2.0 * density + z * (2.0 * self.exact.cdf(estimate) - 1.0))
            }
        }
    }

}

/// Real-valued observations assumed independent draws from a Normal distribution with
/// unknown mean and known, fixed variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaussianObservations {

    values : DVector<f64>,

    obs_variance : f64

}

impl GaussianObservations {

    pub fn new(values : DVector<f64>, obs_variance : f64) -> Result<Self, InferenceError> {
        check_positive("observation variance", obs_variance)?;
        if let Some(v) = values.iter().find(|v| !v.is_finite() ) {
            return Err(InferenceError::invalid(format!("Observation {} is not finite", v)));
        }
        Ok(Self { values, obs_variance })
    }

    pub fn from_slice(values : &[f64], obs_variance : f64) -> Result<Self, InferenceError> {
        Self::new(DVector::from_column_slice(values), obs_variance)
    }

    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    pub fn observation_variance(&self) -> f64 {
        self.obs_variance
    }

    pub fn observation_std_dev(&self) -> f64 {
        self.obs_variance.sqrt()
    }

    pub fn sum(&self) -> f64 {
        self.values.sum()
    }

    pub fn sample_mean(&self) -> Result<f64, InferenceError> {
        if self.is_empty() {
            return Err(InferenceError::invalid("Sample mean of an empty observation set"));
        }
        Ok(self.sum() / self.len() as f64)
    }

    /// Maximum likelihood (biased) variance of the observations, which is unrelated to
    /// the known observation variance used by the conjugate update.
    pub fn sample_variance(&self) -> Result<f64, InferenceError> {
        if self.is_empty() {
            return Err(InferenceError::invalid("Sample variance of an empty observation set"));
        }
        let (_, var, _) = running::mean_var(self.values.iter());
        Ok(var)
    }

}

/// Normal posterior for the mean of Normal observations with known variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaussianPosterior {

    prior : Normal,

    n : usize,

    obs_variance : f64,

    posterior : Normal

}

/// Bayes rule for Gaussians: prior and likelihood are combined by precision weighting,
///
/// posterior_variance = 1 / (1 / prior_variance + n / obs_variance)
/// posterior_mean = posterior_variance * (n * sample_mean / obs_variance + prior_mean / prior_variance)
///
/// An empty observation set leaves the prior unchanged.
pub fn update_posterior(
    prior : &GaussianPrior,
    obs : &GaussianObservations
) -> Result<GaussianPosterior, InferenceError> {
    check_positive("prior variance", prior.scale)?;
    check_positive("observation variance", obs.obs_variance)?;
    let n = obs.len();
    if n == 0 {
        return Ok(GaussianPosterior { prior : prior.clone(), n, obs_variance : obs.obs_variance, posterior : prior.clone() });
    }
    let precision = 1.0 / prior.scale + n as f64 / obs.obs_variance;
    if !precision.is_finite() || precision <= 0.0 {
        return Err(InferenceError::unstable(format!("Posterior precision evaluated to {}", precision)));
    }
    let variance = 1.0 / precision;
    if !variance.is_finite() || variance <= 0.0 {
        return Err(InferenceError::unstable(format!("Posterior variance evaluated to {}", variance)));
    }
    let mean = variance * (obs.sum() / obs.obs_variance + prior.loc / prior.scale);
    if !mean.is_finite() {
        return Err(InferenceError::unstable(format!("Posterior mean evaluated to {}", mean)));
    }
    tracing::debug!(
        prior_mean = prior.loc,
        prior_variance = prior.scale,
        n,
        obs_variance = obs.obs_variance,
        mean,
        variance,
        "gaussian posterior update"
    );
    let posterior = Normal::new(mean, variance)?;
    Ok(GaussianPosterior { prior : prior.clone(), n, obs_variance : obs.obs_variance, posterior })
}

/// Log of the joint density p(mu, D) = p(mu) prod_i p(x_i | mu) with mu clamped at
/// mu_candidate and observations with standard deviation observation_std_dev. The
/// conjugate posterior is proportional to exp(log_joint) as a function of mu, so this is
/// useful for checking the closed-form update against a brute-force evaluation.
pub fn log_joint(
    prior : &GaussianPrior,
    obs : &GaussianObservations,
    mu_candidate : f64,
    observation_std_dev : f64
) -> Result<f64, InferenceError> {
    check_finite("mean candidate", mu_candidate)?;
    check_positive("observation standard deviation", observation_std_dev)?;
    let log_prior = prior.log_prob(mu_candidate);
    let log_lik : f64 = obs.values.iter()
        .map(|x| normal_log_prob(*x, mu_candidate, observation_std_dev) )
        .sum();
    Ok(log_prior + log_lik)
}

impl GaussianPosterior {

    pub fn prior(&self) -> &Normal {
        &self.prior
    }

    pub fn distribution(&self) -> &Normal {
        &self.posterior
    }

    /// Number of observations the prior was conditioned on.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn observation_variance(&self) -> f64 {
        self.obs_variance
    }

    pub fn params(&self) -> NormalParams {
        self.posterior.params()
    }

    /// Posterior predictive distribution of a new observation: the posterior
    /// uncertainty about the mean adds to the observation noise.
    pub fn predictive(&self) -> Result<Normal, InferenceError> {
        Normal::new(self.posterior.loc, self.posterior.scale + self.obs_variance)
    }

    pub fn credible_interval(&self, level : f64) -> Result<CredibleInterval, InferenceError> {
        approx::central(&self.posterior, level)
    }

    pub fn monte_carlo_credible_interval(
        &self,
        level : f64,
        num_samples : usize,
        seed : u64
    ) -> Result<CredibleInterval, InferenceError> {
        let mut rng = StdRng::seed_from_u64(seed);
        approx::monte_carlo(&self.posterior, level, num_samples, &mut rng)
    }

    pub fn draws(&self, num_samples : usize, seed : u64) -> Result<Empirical, InferenceError> {
        let mut rng = StdRng::seed_from_u64(seed);
        Empirical::from_distribution(&self.posterior, num_samples, &mut rng)
    }

    pub fn point_estimate(&self, loss : Loss, grid : &[f64]) -> Result<PointEstimate, InferenceError> {
        calc::minimize_expected_loss(grid, loss, |t| self.posterior.expected_loss(t, loss) )
    }

}

impl rand_distr::Distribution<f64> for GaussianPosterior {

    fn sample<R>(&self, rng : &mut R) -> f64
    where
        R : Rng + ?Sized
    {
        rand_distr::Distribution::sample(&self.posterior, rng)
    }

}

impl Univariate for GaussianPosterior {

    fn mean(&self) -> f64 {
        self.posterior.loc
    }

    fn var(&self) -> f64 {
        self.posterior.scale
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

impl fmt::Display for GaussianPosterior {

    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p(mu|D) = {}", self.posterior)
    }

}

#[cfg(test)]
mod tests {

    use super::*;
    use statrs::distribution::Continuous;

    #[test]
    fn empty_observations_keep_prior() {
        let prior = Normal::new(1.1, 1.44).unwrap();
        let obs = GaussianObservations::from_slice(&[], 1.69).unwrap();
        let post = prior.update(&obs).unwrap();
        assert_eq!(post.distribution(), &prior);
        assert_eq!(post.n(), 0);
        assert!(obs.sample_mean().is_err());
    }

    #[test]
    fn single_observation_precision_weighting() {
        // Equal precisions: the posterior mean is halfway between the prior mean and the datum.
        let prior = Normal::new(0.0, 1.0).unwrap();
        let obs = GaussianObservations::from_slice(&[2.0], 1.0).unwrap();
        let post = prior.update(&obs).unwrap();
        assert!((post.mean() - 1.0).abs() < 1E-12);
        assert!((post.var() - 0.5).abs() < 1E-12);
        let pred = post.predictive().unwrap();
        assert!((pred.var() - 1.5).abs() < 1E-12);
    }

    #[test]
    fn invalid_variances() {
        assert!(Normal::new(0.0, 0.0).is_err());
        assert!(Normal::new(f64::NAN, 1.0).is_err());
        assert!(Normal::from_std_dev(0.0, -1.0).is_err());
        assert!(GaussianObservations::from_slice(&[1.0], 0.0).is_err());
        assert!(GaussianObservations::from_slice(&[f64::INFINITY], 1.0).is_err());
        let prior = Normal::new(0.0, 1.0).unwrap();
        let obs = GaussianObservations::from_slice(&[1.0, 2.0], 1.0).unwrap();
        assert!(log_joint(&prior, &obs, 0.0, 0.0).is_err());
    }

    #[test]
    fn density_and_quantiles_match_statrs() {
        let n = Normal::new(-0.5, 2.25).unwrap();
        let reference = statrs::distribution::Normal::new(-0.5, 1.5).unwrap();
        for x in [-3.0, -0.5, 0.0, 2.7].iter() {
            assert!((n.log_prob(*x) - reference.ln_pdf(*x)).abs() < 1E-10);
        }
        assert!((n.quantile(0.975) - (-0.5 + 1.5 * 1.959963984540054)).abs() < 1E-6);
        assert_eq!(n.quantile(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn l1_expected_loss_is_minimal_at_the_mean() {
        let n = Normal::new(2.0, 4.0).unwrap();
        let at_mean = n.expected_loss(2.0, Loss::L1);
        // E|X - mu| = sd * sqrt(2 / pi)
        assert!((at_mean - 2.0 * (2.0 / std::f64::consts::PI).sqrt()).abs() < 1E-10);
        assert!(n.expected_loss(2.5, Loss::L1) > at_mean);
        assert!(n.expected_loss(1.5, Loss::L1) > at_mean);
    }

}
