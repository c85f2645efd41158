use num_traits::AsPrimitive;
use crate::prob::{InferenceError, Univariate};
use crate::calc::{self, Loss, PointEstimate, running};
use super::{CredibleInterval, tail_mass};
use rand::Rng;
use serde::Serialize;
use std::cmp::Ordering;

/// Kolmogorov-Smirnov statistic: Maximum over which two Empirical CDFs
/// or an Emprirical and analytical CDF differ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KS {
    pub val : f64,
    pub diff : f64
}

/// Distribution represented by a finite set of independent draws, kept sorted so that
/// percentiles and cumulative probabilities are cheap to evaluate. Used for posteriors
/// that are only known through sampling, and to check exact posteriors against their
/// Monte Carlo approximation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Empirical {
    sorted : Vec<f64>
}

impl Empirical {

    /// Builds the distribution from draws of any primitive numeric type. Fails if there
    /// are no draws or if any of them is not finite.
    pub fn new<I, T>(draws : I) -> Result<Self, InferenceError>
    where
        I : IntoIterator<Item=T>,
        T : AsPrimitive<f64>
    {
        let mut sorted : Vec<f64> = draws.into_iter().map(|d| d.as_() ).collect();
        if sorted.is_empty() {
            return Err(InferenceError::invalid("Empirical distribution requires at least one draw"));
        }
        if let Some(d) = sorted.iter().find(|d| !d.is_finite() ) {
            return Err(InferenceError::invalid(format!("Draw {} is not finite", d)));
        }
        sorted.sort_unstable_by(|s1, s2| s1.partial_cmp(s2).unwrap_or(Ordering::Equal) );
        Ok(Self { sorted })
    }

    /// Takes num_samples independent draws from dist using the informed generator.
    pub fn from_distribution<D, R>(dist : &D, num_samples : usize, rng : &mut R) -> Result<Self, InferenceError>
    where
        D : rand_distr::Distribution<f64>,
        R : Rng + ?Sized
    {
        if num_samples == 0 {
            return Err(InferenceError::invalid("Number of samples should be at least one"));
        }
        let draws : Vec<f64> = (0..num_samples).map(|_| dist.sample(rng) ).collect();
        Self::new(draws)
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Draws in increasing order.
    pub fn as_slice(&self) -> &[f64] {
        &self.sorted[..]
    }

    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    pub fn mean(&self) -> f64 {
        running::mean_var(self.sorted.iter()).0
    }

    /// Population (maximum likelihood) variance of the draws.
    pub fn var(&self) -> f64 {
        running::mean_var(self.sorted.iter()).1
    }

    pub fn std_dev(&self) -> f64 {
        self.var().sqrt()
    }

    /// Percentile at q in [0, 1], linearly interpolated between the two closest order
    /// statistics (position q * (n - 1)).
    pub fn percentile(&self, q : f64) -> Result<f64, InferenceError> {
        if !(0.0..=1.0).contains(&q) {
            return Err(InferenceError::invalid(format!("Percentile should be in [0, 1] (informed {})", q)));
        }
        let n = self.sorted.len();
        let pos = q * (n - 1) as f64;
        let below = pos.floor() as usize;
        let frac = pos - below as f64;
        if below + 1 < n {
            Ok(self.sorted[below] + frac * (self.sorted[below + 1] - self.sorted[below]))
        } else {
            Ok(self.sorted[n - 1])
        }
    }

    pub fn median(&self) -> f64 {
        let n = self.sorted.len();
        if n % 2 == 1 {
            self.sorted[n / 2]
        } else {
            0.5 * (self.sorted[n / 2 - 1] + self.sorted[n / 2])
        }
    }

    /// Central interval leaving (1 - level) / 2 of the draws on each tail.
    pub fn interval(&self, level : f64) -> Result<CredibleInterval, InferenceError> {
        let tail = tail_mass(level)?;
        let low = self.percentile(tail)?;
        let high = self.percentile(1.0 - tail)?;
        CredibleInterval::new(low, high, level)
    }

    /// Narrowest interval containing a share of level of the draws.
    pub fn hdi(&self, level : f64) -> Result<CredibleInterval, InferenceError> {
        super::hdi::hdi_sorted(&self.sorted[..], level)
    }

    /// Share of draws strictly smaller than val.
    pub fn mass_below(&self, val : f64) -> f64 {
        let ix = self.sorted.partition_point(|d| *d < val );
        ix as f64 / self.sorted.len() as f64
    }

    /// Share of draws within the closed interval [low, high].
    pub fn mass_between(&self, low : f64, high : f64) -> f64 {
        if low > high {
            return 0.0;
        }
        let start = self.sorted.partition_point(|d| *d < low );
        let end = self.sorted.partition_point(|d| *d <= high );
        (end - start) as f64 / self.sorted.len() as f64
    }

    /// Average loss of the estimate over the draws.
    pub fn expected_loss(&self, estimate : f64, loss : Loss) -> f64 {
        let total : f64 = self.sorted.iter().map(|d| loss.eval(estimate, *d) ).sum();
        total / self.sorted.len() as f64
    }

    /// Grid point minimizing the loss averaged over the draws. Ties resolve to the first grid point.
    pub fn point_estimate(&self, loss : Loss, grid : &[f64]) -> Result<PointEstimate, InferenceError> {
        calc::minimize_expected_loss(grid, loss, |t| self.expected_loss(t, loss) )
    }

    /// Largest distance between the empirical cdf and the cdf of model, evaluated
    /// at both sides of each step of the empirical cdf.
    pub fn analytical_ks(&self, model : &impl Univariate) -> KS {
        let n = self.sorted.len() as f64;
        let mut max_prob_diff = 0.0;
        let mut max_val = self.sorted[0];
        for (i, v) in self.sorted.iter().enumerate() {
            let p = model.cdf(*v);
            let before = (p - i as f64 / n).abs();
            let after = (p - (i + 1) as f64 / n).abs();
            let pdiff = before.max(after);
            if pdiff > max_prob_diff {
                max_prob_diff = pdiff;
                max_val = *v;
            }
        }
        KS { val : max_val, diff : max_prob_diff }
    }

}
