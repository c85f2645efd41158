use crate::approx::{Empirical, Interval};
use crate::prob::{InferenceError, check_finite};
use serde::{Serialize, Deserialize};

/// Region of practical equivalence: values of the parameter that are, for
/// practical purposes, indistinguishable from a null value (e.g. [0.45, 0.55]
/// for the fairness of a coin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rope {
    low : f64,
    high : f64
}

/// Outcome of comparing a credible interval against a ROPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RopeDecision {

    /// The interval lies entirely outside the ROPE: the parameter differs from the null value.
    Reject,

    /// The interval lies entirely inside the ROPE: the parameter is practically equivalent to the null value.
    Accept,

    /// The interval and the ROPE overlap partially.
    Undecided

}

impl Rope {

    pub fn new(low : f64, high : f64) -> Result<Self, InferenceError> {
        check_finite("ROPE lower bound", low)?;
        check_finite("ROPE upper bound", high)?;
        if low > high {
            return Err(InferenceError::invalid(format!("Invalid ROPE [{}, {}]", low, high)));
        }
        Ok(Self { low, high })
    }

    /// ROPE centered at a null value.
    pub fn around(center : f64, half_width : f64) -> Result<Self, InferenceError> {
        if !(half_width >= 0.0) {
            return Err(InferenceError::invalid(format!("ROPE half-width should be non-negative (informed {})", half_width)));
        }
        Self::new(center - half_width, center + half_width)
    }

    pub fn decide<I>(&self, interval : &I) -> RopeDecision
    where
        I : Interval
    {
        if interval.high() < self.low || interval.low() > self.high {
            RopeDecision::Reject
        } else if self.contains_interval(interval) {
            RopeDecision::Accept
        } else {
            RopeDecision::Undecided
        }
    }

    /// Posterior mass inside the ROPE.
    pub fn mass_inside(&self, draws : &Empirical) -> f64 {
        draws.mass_between(self.low, self.high)
    }

}

impl Interval for Rope {

    fn low(&self) -> f64 {
        self.low
    }

    fn high(&self) -> f64 {
        self.high
    }

}

/// Posterior mass at each side of a reference value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceMass {
    pub ref_val : f64,
    pub below : f64,
    pub above : f64
}

pub fn reference_mass(draws : &Empirical, ref_val : f64) -> ReferenceMass {
    let below = draws.mass_below(ref_val);
    ReferenceMass { ref_val, below, above : 1.0 - below }
}
