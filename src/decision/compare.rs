use crate::approx::{Empirical, Interval};
use crate::calc::{Summary, running};
use crate::prob::{InferenceError, GaussianPrior, GaussianObservations};
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::Distribution;
use serde::Serialize;

/// Posterior draws of the mean and standard deviation of several groups. Draws are
/// arranged over rows and groups over columns; both matrices share the same shape
/// and the column order of the group names.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDraws {

    names : Vec<String>,

    mu : DMatrix<f64>,

    sigma : DMatrix<f64>

}

impl GroupDraws {

    /// Wraps draws produced by any posterior sampler.
    pub fn new(names : Vec<String>, mu : DMatrix<f64>, sigma : DMatrix<f64>) -> Result<Self, InferenceError> {
        if mu.shape() != sigma.shape() {
            return Err(InferenceError::invalid(
                format!("Mean draws {:?} and scale draws {:?} differ in shape", mu.shape(), sigma.shape())
            ));
        }
        if mu.ncols() != names.len() {
            return Err(InferenceError::invalid(
                format!("{} group names informed for {} groups", names.len(), mu.ncols())
            ));
        }
        if mu.nrows() == 0 {
            return Err(InferenceError::invalid("Group comparison requires at least one draw"));
        }
        if mu.iter().any(|m| !m.is_finite() ) {
            return Err(InferenceError::invalid("Mean draws should be finite"));
        }
        if sigma.iter().any(|s| !(s.is_finite() && *s > 0.0) ) {
            return Err(InferenceError::invalid("Scale draws should be positive and finite"));
        }
        Ok(Self { names, mu, sigma })
    }

    /// Draws for each group mean from its conjugate Gaussian posterior, taking the
    /// group (population) variance as the known observation variance. The scale
    /// column of each group is constant at the plug-in standard deviation.
    pub fn from_conjugate<R>(
        groups : &[(String, DVector<f64>)],
        prior : &GaussianPrior,
        num_draws : usize,
        rng : &mut R
    ) -> Result<Self, InferenceError>
    where
        R : Rng + ?Sized
    {
        if num_draws == 0 {
            return Err(InferenceError::invalid("Number of draws should be at least one"));
        }
        let mut mu = DMatrix::zeros(num_draws, groups.len());
        let mut sigma = DMatrix::zeros(num_draws, groups.len());
        let mut names = Vec::with_capacity(groups.len());
        for (j, (name, values)) in groups.iter().enumerate() {
            let (_, var, n) = running::mean_var(values.iter());
            if n < 2 || !(var > 0.0) {
                return Err(InferenceError::invalid(
                    format!("Group {} needs at least two distinct observations", name)
                ));
            }
            let obs = GaussianObservations::new(values.clone(), var)?;
            let post = prior.update(&obs)?;
            tracing::debug!(group = name.as_str(), n, plug_in_variance = var, "group posterior");
            for i in 0..num_draws {
                mu[(i, j)] = post.sample(rng);
                sigma[(i, j)] = var.sqrt();
            }
            names.push(name.clone());
        }
        Self::new(names, mu, sigma)
    }

    pub fn names(&self) -> &[String] {
        &self.names[..]
    }

    pub fn num_groups(&self) -> usize {
        self.mu.ncols()
    }

    pub fn num_draws(&self) -> usize {
        self.mu.nrows()
    }

    pub fn mu(&self) -> &DMatrix<f64> {
        &self.mu
    }

    pub fn sigma(&self) -> &DMatrix<f64> {
        &self.sigma
    }

}

/// Comparison between the means of two groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contrast {

    pub first : String,

    pub second : String,

    /// Summary of the posterior of mean(first) - mean(second).
    pub diff : Summary,

    /// Mean difference over the pooled standard deviation, averaged over draws.
    pub cohen_d : f64,

    /// Posterior probability that mean(first) < mean(second).
    pub mass_below_zero : f64,

    /// Whether zero lies outside the highest-density interval of the difference.
    pub credible : bool

}

/// Compares every pair of groups (i, j) with i < j, in group order.
pub fn pairwise(draws : &GroupDraws, level : f64) -> Result<Vec<Contrast>, InferenceError> {
    let k = draws.num_groups();
    let n = draws.num_draws();
    let mut contrasts = Vec::with_capacity(k * k.saturating_sub(1) / 2);
    for i in 0..k {
        for j in (i+1)..k {
            let mut diffs = Vec::with_capacity(n);
            let mut d_total = 0.0;
            for r in 0..n {
                let diff = draws.mu[(r, i)] - draws.mu[(r, j)];
                let pooled = ((draws.sigma[(r, i)].powf(2.) + draws.sigma[(r, j)].powf(2.)) / 2.).sqrt();
                d_total += diff / pooled;
                diffs.push(diff);
            }
            let diffs = Empirical::new(diffs)?;
            let diff = Summary::from_draws(&diffs, level)?;
            contrasts.push(Contrast {
                first : draws.names[i].clone(),
                second : draws.names[j].clone(),
                diff,
                cohen_d : d_total / n as f64,
                mass_below_zero : diffs.mass_below(0.0),
                credible : !diff.contains(&0.0)
            });
        }
    }
    Ok(contrasts)
}
