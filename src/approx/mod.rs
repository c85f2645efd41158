/// Intervals over the real line, and the central credible interval of a distribution.
pub mod interval;

pub use interval::*;

/// Posterior represented non-parametrically by a set of sorted draws.
pub mod empirical;

pub use empirical::*;

/// Highest-density intervals of a set of draws.
pub mod hdi;

pub use hdi::*;
