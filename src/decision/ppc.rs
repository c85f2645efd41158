use crate::calc::running;
use crate::prob::{InferenceError, GaussianPosterior};
use nalgebra::{DMatrix, DVector, RowDVector};
use rand::Rng;
use rand_distr::{Distribution, Normal as NormalSampler};
use serde::Serialize;

/// Replicates num_sets datasets of n_obs observations each from the posterior predictive
/// of a Gaussian mean with known variance. Each dataset draws its own mean from the
/// posterior, then draws the observations around it with the observation variance, so
/// datasets are laid over rows and observations over columns.
pub fn replicate<R>(
    posterior : &GaussianPosterior,
    n_obs : usize,
    num_sets : usize,
    rng : &mut R
) -> Result<DMatrix<f64>, InferenceError>
where
    R : Rng + ?Sized
{
    if n_obs == 0 || num_sets == 0 {
        return Err(InferenceError::invalid("Replicated datasets should have at least one row and one column"));
    }
    let obs_sd = posterior.observation_variance().sqrt();
    let mut rep = DMatrix::zeros(num_sets, n_obs);
    for i in 0..num_sets {
        let mu = posterior.sample(rng);
        let lik = NormalSampler::new(mu, obs_sd)
            .map_err(|e| InferenceError::unstable(format!("{}", e)) )?;
        for j in 0..n_obs {
            rep[(i, j)] = lik.sample(rng);
        }
    }
    tracing::trace!(num_sets, n_obs, "replicated posterior predictive datasets");
    Ok(rep)
}

/// Test statistic evaluated at the observed data and at each replicated dataset. The
/// p-value is the fraction of replicates for which the statistic is at least as large
/// as the observed one; values close to 0 or 1 flag a misfit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictiveCheck {
    pub statistic : String,
    pub observed : f64,
    pub replicated_mean : f64,
    pub p_value : f64
}

pub fn check<F>(
    observed : &DVector<f64>,
    replicated : &DMatrix<f64>,
    name : &str,
    stat : F
) -> Result<PredictiveCheck, InferenceError>
where
    F : Fn(&[f64]) -> f64
{
    if replicated.nrows() == 0 {
        return Err(InferenceError::invalid("No replicated datasets to check against"));
    }
    let obs_stat = stat(observed.as_slice());
    let rep_stats : Vec<f64> = replicated.row_iter()
        .map(|row| {
            let row : RowDVector<f64> = row.into_owned();
            stat(row.as_slice())
        })
        .collect();
    let (replicated_mean, _, n) = running::mean_var(rep_stats.iter());
    let above = rep_stats.iter().filter(|s| **s >= obs_stat ).count();
    Ok(PredictiveCheck {
        statistic : name.to_string(),
        observed : obs_stat,
        replicated_mean,
        p_value : above as f64 / n as f64
    })
}

pub fn check_mean(observed : &DVector<f64>, replicated : &DMatrix<f64>) -> Result<PredictiveCheck, InferenceError> {
    check(observed, replicated, "mean", |s| running::mean_var(s.iter()).0 )
}

pub fn check_std_dev(observed : &DVector<f64>, replicated : &DMatrix<f64>) -> Result<PredictiveCheck, InferenceError> {
    check(observed, replicated, "std_dev", |s| running::mean_var(s.iter()).1.sqrt() )
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::prob::{Normal, GaussianObservations};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn replicated_shape() {
        let prior = Normal::new(0.0, 1.0).unwrap();
        let obs = GaussianObservations::from_slice(&[0.1, -0.3, 0.2, 0.5], 1.0).unwrap();
        let post = prior.update(&obs).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let rep = replicate(&post, 4, 50, &mut rng).unwrap();
        assert_eq!(rep.shape(), (50, 4));
        assert!(replicate(&post, 0, 50, &mut rng).is_err());
    }

    #[test]
    fn p_value_counts_replicates() {
        let observed = DVector::from_vec(vec![1.0, 1.0]);
        let replicated = DMatrix::from_row_slice(4, 2, &[
            0.0, 0.0,
            1.0, 1.0,
            2.0, 2.0,
            3.0, 3.0
        ]);
        let c = check_mean(&observed, &replicated).unwrap();
        assert_eq!(c.statistic, "mean");
        assert!((c.observed - 1.0).abs() < 1E-12);
        assert!((c.replicated_mean - 1.5).abs() < 1E-12);
        assert!((c.p_value - 0.75).abs() < 1E-12);
        let sd = check_std_dev(&observed, &replicated).unwrap();
        assert_eq!(sd.observed, 0.0);
        assert_eq!(sd.p_value, 1.0);
    }

}
