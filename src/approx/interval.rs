use crate::prob::{InferenceError, Univariate};
use super::Empirical;
use rand::Rng;
use serde::{Serialize, Deserialize};
use std::fmt;

/// Trait shared by structures that represents a bounded interval in the real line.
pub trait Interval {

    fn low(&self) -> f64;

    fn high(&self) -> f64;

    /// Verify if value is within the closed interval (self.low(), self.high())
    fn contains(&self, val : &f64) -> bool {
        *val >= self.low() && *val <= self.high()
    }

    fn width(&self) -> f64 {
        self.high() - self.low()
    }

    /// Verify if the other interval lies entirely within this one.
    fn contains_interval<I>(&self, other : &I) -> bool
    where
        I : Interval
    {
        other.low() >= self.low() && other.high() <= self.high()
    }

}

/// Range containing a given probability mass (level) of a posterior distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CredibleInterval {
    low : f64,
    high : f64,
    level : f64
}

impl CredibleInterval {

    pub fn new(low : f64, high : f64, level : f64) -> Result<Self, InferenceError> {
        tail_mass(level)?;
        if low.is_nan() || high.is_nan() || low > high {
            return Err(InferenceError::invalid(format!("Invalid interval bounds [{}, {}]", low, high)));
        }
        Ok(Self { low, high, level })
    }

    pub fn level(&self) -> f64 {
        self.level
    }

}

impl Interval for CredibleInterval {

    fn low(&self) -> f64 {
        self.low
    }

    fn high(&self) -> f64 {
        self.high
    }

}

impl fmt::Display for CredibleInterval {

    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0.2}--{:0.2} ({}%)", self.low, self.high, 100. * self.level)
    }

}

/// Probability mass left at each tail of a symmetric interval with the
/// informed level. The level must lie in the open interval (0, 1).
pub fn tail_mass(level : f64) -> Result<f64, InferenceError> {
    if level.is_finite() && level > 0.0 && level < 1.0 {
        Ok((1.0 - level) / 2.0)
    } else {
        Err(InferenceError::invalid(format!("Probability level should be in (0, 1) (informed {})", level)))
    }
}

/// Central credible interval from the inverse cdf: [q((1 - level) / 2), q(1 - (1 - level) / 2)].
pub fn central<D>(dist : &D, level : f64) -> Result<CredibleInterval, InferenceError>
where
    D : Univariate
{
    let tail = tail_mass(level)?;
    let (low, high) = (dist.quantile(tail), dist.quantile(1.0 - tail));
    tracing::trace!(level, low, high, "central credible interval");
    CredibleInterval::new(low, high, level)
}

/// Central credible interval taken as the empirical percentiles of num_samples independent
/// draws from dist. Reproducible whenever the generator is seeded.
pub fn monte_carlo<D, R>(
    dist : &D,
    level : f64,
    num_samples : usize,
    rng : &mut R
) -> Result<CredibleInterval, InferenceError>
where
    D : rand_distr::Distribution<f64>,
    R : Rng + ?Sized
{
    tail_mass(level)?;
    let draws = Empirical::from_distribution(dist, num_samples, rng)?;
    draws.interval(level)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn level_bounds() {
        assert!(tail_mass(0.0).is_err());
        assert!(tail_mass(1.0).is_err());
        assert!(tail_mass(f64::NAN).is_err());
        assert!((tail_mass(0.95).unwrap() - 0.025).abs() < 1E-12);
    }

    #[test]
    fn bounds_are_ordered() {
        assert!(CredibleInterval::new(0.6, 0.4, 0.9).is_err());
        let a = CredibleInterval::new(0.2, 0.8, 0.9).unwrap();
        let b = CredibleInterval::new(0.3, 0.7, 0.5).unwrap();
        assert!(a.contains_interval(&b));
        assert!(!b.contains_interval(&a));
        assert!(a.contains(&0.2));
        assert!((a.width() - 0.6).abs() < 1E-12);
        assert_eq!(format!("{}", a), "0.20--0.80 (90%)");
    }

}
