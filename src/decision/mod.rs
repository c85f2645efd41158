/// Region of practical equivalence and reference-value checks.
pub mod rope;

pub use rope::*;

/// Pairwise comparison of group means from per-group posterior draws.
pub mod compare;

pub use compare::*;

/// Posterior predictive replication of datasets, and the checks run over them.
pub mod ppc;

pub use ppc::*;
