use crate::prob::InferenceError;
use super::{CredibleInterval, tail_mass};
use std::cmp::Ordering;

/// Highest-density interval of a set of draws (in any order): the narrowest
/// interval spanning floor(level * n) consecutive order statistics. For unimodal
/// posteriors this approximates the highest posterior density region; for skewed
/// posteriors it is narrower than the central interval with same level.
pub fn hdi(draws : &[f64], level : f64) -> Result<CredibleInterval, InferenceError> {
    if let Some(d) = draws.iter().find(|d| !d.is_finite() ) {
        return Err(InferenceError::invalid(format!("Draw {} is not finite", d)));
    }
    let mut sorted = draws.to_vec();
    sorted.sort_unstable_by(|s1, s2| s1.partial_cmp(s2).unwrap_or(Ordering::Equal) );
    hdi_sorted(&sorted[..], level)
}

// Exhaustively search the windows of fixed mass, keeping the first narrowest one.
pub(crate) fn hdi_sorted(sorted : &[f64], level : f64) -> Result<CredibleInterval, InferenceError> {
    tail_mass(level)?;
    let n = sorted.len();
    let interval_inc = (level * n as f64).floor() as usize;
    if interval_inc == 0 || interval_inc >= n {
        return Err(InferenceError::invalid(
            format!("Too few draws ({}) for a highest-density interval at level {}", n, level)
        ));
    }
    let n_intervals = n - interval_inc;
    let mut best_start = 0;
    let mut best_width = f64::INFINITY;
    for start in 0..n_intervals {
        let width = sorted[start + interval_inc] - sorted[start];
        if width < best_width {
            best_width = width;
            best_start = start;
        }
    }
    CredibleInterval::new(sorted[best_start], sorted[best_start + interval_inc], level)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::approx::Interval;

    #[test]
    fn hdi_follows_the_densest_region() {
        // Nine draws packed around 1.0 and one far outlier.
        let draws = [0.9, 1.0, 1.1, 0.95, 1.05, 1.02, 0.98, 1.01, 0.99, 10.0];
        let i = hdi(&draws, 0.8).unwrap();
        assert!(i.high() < 2.0);
        assert!(i.low() >= 0.9);
    }

    #[test]
    fn too_few_draws() {
        assert!(hdi(&[1.0], 0.5).is_err());
        assert!(hdi(&[], 0.5).is_err());
        assert!(hdi(&[1.0, 2.0, 3.0], 1.0).is_err());
    }

}
