/// Univariate distributions with closed-form (conjugate) posterior updates:
/// Beta prior for Bernoulli/Binomial observations; Normal prior for the mean of
/// Normal observations with known variance.
pub mod prob;

/// Non-parametric representations of posteriors (sorted draws) and the
/// intervals extracted from them: central credible intervals, Monte Carlo
/// percentile intervals and highest-density intervals.
pub mod approx;

/// Loss functions and point estimates, posterior summaries and small
/// numerical utilities shared by the other modules.
pub mod calc;

// Decisions taken over posterior draws: region of practical equivalence,
// pairwise comparison of group means and posterior predictive checks.
pub mod decision;

/// Observation columns read from delimited text files, and dataset cleaning.
pub mod sample;

/// Analyses described by JSON files, and the reports they produce.
pub mod model;
