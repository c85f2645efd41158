use crate::prob::InferenceError;
use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

/// Loss incurred by reporting a point estimate when the parameter takes a given value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loss {

    /// Absolute error. Its posterior expectation is minimized by the posterior median.
    L1,

    /// Squared error. Its posterior expectation is minimized by the posterior mean.
    L2

}

impl Loss {

    pub fn eval(&self, estimate : f64, theta : f64) -> f64 {
        match self {
            Loss::L1 => (estimate - theta).abs(),
            Loss::L2 => (estimate - theta).powf(2.)
        }
    }

}

impl Default for Loss {

    fn default() -> Self {
        Loss::L2
    }

}

impl FromStr for Loss {

    type Err = InferenceError;

    fn from_str(s : &str) -> Result<Self, InferenceError> {
        match s.to_lowercase().as_str() {
            "l1" | "abs" | "absolute" => Ok(Loss::L1),
            "l2" | "sq" | "squared" | "quadratic" => Ok(Loss::L2),
            other => Err(InferenceError::invalid(format!("Unknown loss {}", other)))
        }
    }

}

impl fmt::Display for Loss {

    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loss::L1 => write!(f, "l1"),
            Loss::L2 => write!(f, "l2")
        }
    }

}

/// Scalar minimizing an expected loss over a candidate grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointEstimate {
    pub value : f64,
    pub expected_loss : f64,
    pub loss : Loss
}

/// Evaluates risk (the expected loss as a function of the estimate) at each grid point
/// and returns the minimizer. Ties resolve to the first occurrence in grid order.
pub fn minimize_expected_loss<F>(grid : &[f64], loss : Loss, risk : F) -> Result<PointEstimate, InferenceError>
where
    F : Fn(f64) -> f64
{
    if grid.is_empty() {
        return Err(InferenceError::invalid("Point estimate requires a non-empty grid"));
    }
    let mut best : Option<PointEstimate> = None;
    for t in grid.iter() {
        if !t.is_finite() {
            return Err(InferenceError::invalid(format!("Grid point {} is not finite", t)));
        }
        let r = risk(*t);
        if r.is_nan() {
            return Err(InferenceError::unstable(format!("Expected loss at {} is not a number", t)));
        }
        match best {
            Some(ref b) if r >= b.expected_loss => { },
            _ => best = Some(PointEstimate { value : *t, expected_loss : r, loss })
        }
    }
    best.ok_or_else(|| InferenceError::invalid("Point estimate requires a non-empty grid") )
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn ties_resolve_to_first_point() {
        let grid = [-1.0, 1.0, 0.0];
        let est = minimize_expected_loss(&grid, Loss::L2, |t| t * t - 1.0 ).unwrap();
        assert_eq!(est.value, 0.0);
        let tie = minimize_expected_loss(&grid, Loss::L2, |t| (t * t - 1.0).abs() ).unwrap();
        assert_eq!(tie.value, -1.0);
    }

    #[test]
    fn empty_or_invalid_grid() {
        assert!(minimize_expected_loss(&[], Loss::L1, |t| t ).is_err());
        assert!(minimize_expected_loss(&[0.0, f64::NAN], Loss::L1, |t| t ).is_err());
    }

    #[test]
    fn parse_loss() {
        assert_eq!("L1".parse::<Loss>().unwrap(), Loss::L1);
        assert_eq!("quadratic".parse::<Loss>().unwrap(), Loss::L2);
        assert!("l3".parse::<Loss>().is_err());
        assert_eq!(Loss::L1.to_string(), "l1");
    }

}
