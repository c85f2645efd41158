use crate::approx::{self, Empirical, Interval};
use crate::prob::{InferenceError, Univariate};
use serde::{Serialize, Deserialize};
use std::fmt;

/// Posterior summary: mean, standard deviation and the bounds of a credible
/// interval. Built from draws, the bounds are those of the highest-density
/// interval; built from a distribution, they are the exact central interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {

    /// Number of draws, when the summary was built from draws.
    pub n : Option<usize>,

    pub mean : f64,

    pub sd : f64,

    pub hdi_low : f64,

    pub hdi_high : f64,

    pub level : f64

}

impl Summary {

    pub fn from_draws(draws : &Empirical, level : f64) -> Result<Self, InferenceError> {
        let hdi = draws.hdi(level)?;
        Ok(Self {
            n : Some(draws.len()),
            mean : draws.mean(),
            sd : draws.std_dev(),
            hdi_low : hdi.low(),
            hdi_high : hdi.high(),
            level
        })
    }

    pub fn from_distribution<D>(dist : &D, level : f64) -> Result<Self, InferenceError>
    where
        D : Univariate
    {
        let intv = approx::central(dist, level)?;
        Ok(Self {
            n : None,
            mean : dist.mean(),
            sd : dist.std_dev(),
            hdi_low : intv.low(),
            hdi_high : intv.high(),
            level
        })
    }

}

impl Interval for Summary {

    fn low(&self) -> f64 {
        self.hdi_low
    }

    fn high(&self) -> f64 {
        self.hdi_high
    }

}

impl fmt::Display for Summary {

    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail = 100. * (1. - self.level) / 2.;
        writeln!(f, "{:>8} {:>8} {:>8} {:>8}", "mean", "sd", format!("hdi_{}%", tail), format!("hdi_{}%", 100. - tail))?;
        write!(f, "{:>8.3} {:>8.3} {:>8.3} {:>8.3}", self.mean, self.sd, self.hdi_low, self.hdi_high)
    }

}
