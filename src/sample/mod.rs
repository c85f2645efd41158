use crate::approx::Empirical;
use crate::prob::InferenceError;

pub mod table;

pub use table::*;

/// Removes observations outside the fence [Q1 - constant * IQR, Q3 + constant * IQR],
/// where the quartiles are linearly interpolated between order statistics. Kept
/// values preserve their original order. The usual constant is 1.5.
pub fn remove_outliers(values : &[f64], constant : f64) -> Result<Vec<f64>, InferenceError> {
    if !(constant.is_finite() && constant >= 0.0) {
        return Err(InferenceError::invalid(format!("Outlier constant should be non-negative (informed {})", constant)));
    }
    let emp = Empirical::new(values.iter().copied())?;
    let q1 = emp.percentile(0.25)?;
    let q3 = emp.percentile(0.75)?;
    let iqr = q3 - q1;
    let (low, high) = (q1 - constant * iqr, q3 + constant * iqr);
    let kept : Vec<f64> = values.iter().copied().filter(|v| *v >= low && *v <= high ).collect();
    tracing::debug!(low, high, removed = values.len() - kept.len(), "outlier fence");
    Ok(kept)
}
