/// Loss functions, and point estimates minimizing their posterior expectation.
pub mod loss;

pub use loss::*;

/// Posterior summaries (mean, standard deviation and credible bounds).
pub mod summary;

pub use summary::*;

/// Single-pass statistics over streams of observations.
pub mod running {

    /// Mean, population variance and count of the observations in a single
    /// pass (Welford's update). Returns (0.0, 0.0, 0) for an empty iterator.
    pub fn mean_var<'a>(sample : impl Iterator<Item=&'a f64>) -> (f64, f64, usize) {
        let (mut mean, mut m2, mut n) = (0.0, 0.0, 0usize);
        for y in sample {
            n += 1;
            let delta = y - mean;
            mean += delta / n as f64;
            m2 += delta * (y - mean);
        }
        if n == 0 {
            (0.0, 0.0, 0)
        } else {
            (mean, m2 / n as f64, n)
        }
    }

}

/// n evenly spaced points over the closed interval [start, stop].
pub fn linspace(start : f64, stop : f64, n : usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| if i == n - 1 { stop } else { start + step * i as f64 } ).collect()
        }
    }
}
