use crate::approx::{CredibleInterval, Interval};
use crate::calc::{self, Loss, PointEstimate, Summary};
use crate::decision::{self, PredictiveCheck, Rope, RopeDecision};
use crate::prob::*;
use crate::sample::{Table, TableError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};
use std::convert::{AsRef, TryFrom};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid analysis file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Table(#[from] TableError)

}

fn default_level() -> f64 {
    0.95
}

fn default_draws() -> usize {
    10_000
}

fn default_grid_points() -> usize {
    1001
}

fn default_ppc_sets() -> usize {
    500
}

/// Where Gaussian observations come from: either listed inline in the analysis file,
/// or read from a column of a CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataSource {
    Inline(Vec<f64>),
    Csv { path : PathBuf, column : String }
}

impl DataSource {

    pub fn values(&self) -> Result<Vec<f64>, ModelError> {
        match self {
            DataSource::Inline(v) => Ok(v.clone()),
            DataSource::Csv { path, column } => {
                let tbl = Table::load_from_path(path)?;
                Ok(tbl.column(column.as_str())?.iter().copied().collect())
            }
        }
    }

}

/// Beta prior over the success probability of Bernoulli trials. Observations are either
/// the sufficient statistic (trials, successes) or the sequence of outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaBinomialAnalysis {

    pub prior : BetaParams,

    #[serde(default)]
    pub trials : Option<u64>,

    #[serde(default)]
    pub successes : Option<u64>,

    #[serde(default)]
    pub outcomes : Option<Vec<bool>>,

    #[serde(default = "default_level")]
    pub level : f64,

    /// Draws used by the Monte Carlo interval and the draw-based summary.
    #[serde(default = "default_draws")]
    pub draws : usize,

    #[serde(default)]
    pub seed : u64,

    #[serde(default)]
    pub loss : Loss,

    #[serde(default)]
    pub rope : Option<Rope>,

    #[serde(default = "default_grid_points")]
    pub grid_points : usize

}

/// Normal prior over the mean of Normal observations with known variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianAnalysis {

    pub prior : NormalParams,

    pub observation_variance : f64,

    pub data : DataSource,

    #[serde(default = "default_level")]
    pub level : f64,

    #[serde(default = "default_draws")]
    pub draws : usize,

    #[serde(default)]
    pub seed : u64,

    #[serde(default)]
    pub loss : Loss,

    #[serde(default = "default_grid_points")]
    pub grid_points : usize,

    /// Number of replicated datasets for the posterior predictive checks.
    #[serde(default = "default_ppc_sets")]
    pub predictive_sets : usize

}

/// Analysis read from the outside world (e.g. a JSON file), anchored by the
/// conjugate model it refers to. The variant is selected by the "kind" field:
///
/// ```json
/// { "kind" : "beta_binomial", "prior" : { "alpha" : 1.0, "beta" : 1.0 }, "trials" : 10, "successes" : 3 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    BetaBinomial(BetaBinomialAnalysis),
    Gaussian(GaussianAnalysis)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RopeReport {
    pub rope : Rope,
    pub decision : RopeDecision,
    pub mass_inside : f64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetaBinomialReport {
    pub prior : BetaParams,
    pub observations : BernoulliObservations,
    pub posterior : BetaParams,
    pub credible_interval : CredibleInterval,
    pub monte_carlo_interval : CredibleInterval,
    pub summary : Summary,
    pub point_estimate : PointEstimate,
    pub predictive_success : f64,
    pub rope : Option<RopeReport>
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaussianReport {
    pub prior : NormalParams,
    pub n : usize,
    pub sample_mean : f64,
    pub posterior : NormalParams,
    pub credible_interval : CredibleInterval,
    pub monte_carlo_interval : CredibleInterval,
    pub summary : Summary,
    pub point_estimate : PointEstimate,
    pub predictive : NormalParams,
    pub checks : Vec<PredictiveCheck>
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    BetaBinomial(BetaBinomialReport),
    Gaussian(GaussianReport)
}

impl Analysis {

    pub fn load_from_path<P>(path : P) -> Result<Self, ModelError>
    where
        P : AsRef<Path>
    {
        let f = File::open(path)?;
        Self::load(f)
    }

    pub fn load<R>(mut reader : R) -> Result<Self, ModelError>
    where
        R : Read
    {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let analysis = serde_json::from_str(&content[..])?;
        Ok(analysis)
    }

    pub fn run(&self) -> Result<Report, ModelError> {
        match self {
            Analysis::BetaBinomial(a) => Ok(Report::BetaBinomial(a.run()?)),
            Analysis::Gaussian(a) => Ok(Report::Gaussian(a.run()?))
        }
    }

}

impl FromStr for Analysis {

    type Err = ModelError;

    fn from_str(s : &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(s)?)
    }

}

impl BetaBinomialAnalysis {

    /// Analysis over the sufficient statistic of obs, with default level, draws, seed,
    /// loss and grid.
    pub fn from_observations(prior : BetaParams, obs : &BernoulliObservations) -> Self {
        Self {
            prior,
            trials : Some(obs.trials()),
            successes : Some(obs.successes()),
            outcomes : None,
            level : default_level(),
            draws : default_draws(),
            seed : 0,
            loss : Loss::default(),
            rope : None,
            grid_points : default_grid_points()
        }
    }

    pub fn observations(&self) -> Result<BernoulliObservations, InferenceError> {
        match (self.trials, self.successes, &self.outcomes) {
            (Some(n), Some(k), None) => BernoulliObservations::new(n, k),
            (None, None, Some(out)) => Ok(BernoulliObservations::from_outcomes(out.iter().copied())),
            _ => Err(InferenceError::invalid("Inform either trials and successes, or the outcome sequence"))
        }
    }

    pub fn run(&self) -> Result<BetaBinomialReport, ModelError> {
        let prior = Beta::try_from(self.prior)?;
        let obs = self.observations()?;
        let post = prior.update(&obs)?;
        tracing::info!(posterior = %post, "beta-binomial analysis");
        let credible_interval = post.credible_interval(self.level)?;
        let monte_carlo_interval = post.monte_carlo_credible_interval(self.level, self.draws, self.seed)?;
        let draws = post.draws(self.draws, self.seed)?;
        let summary = Summary::from_draws(&draws, self.level)?;
        let grid = calc::linspace(0.0, 1.0, self.grid_points);
        let point_estimate = post.point_estimate(self.loss, &grid[..])?;
        let rope = match self.rope {
            Some(r) => {
                let rope = Rope::new(r.low(), r.high())?;
                Some(RopeReport {
                    rope,
                    decision : rope.decide(&credible_interval),
                    mass_inside : rope.mass_inside(&draws)
                })
            },
            None => None
        };
        Ok(BetaBinomialReport {
            prior : self.prior,
            observations : obs,
            posterior : post.params(),
            credible_interval,
            monte_carlo_interval,
            summary,
            point_estimate,
            predictive_success : post.predictive_success(),
            rope
        })
    }

}

impl GaussianAnalysis {

    /// Analysis parametrized by standard deviations instead of variances, with default
    /// level, draws, seed, loss and grid. Standard deviations must be positive before
    /// they are squared.
    pub fn from_std_devs(
        prior_mean : f64,
        prior_sd : f64,
        obs_sd : f64,
        data : DataSource
    ) -> Result<Self, InferenceError> {
        let prior = Normal::from_std_dev(prior_mean, prior_sd)?.params();
        let obs_sd = check_positive("observation standard deviation", obs_sd)?;
        Ok(Self {
            prior,
            observation_variance : obs_sd.powf(2.),
            data,
            level : default_level(),
            draws : default_draws(),
            seed : 0,
            loss : Loss::default(),
            grid_points : default_grid_points(),
            predictive_sets : default_ppc_sets()
        })
    }

    pub fn run(&self) -> Result<GaussianReport, ModelError> {
        let prior = Normal::try_from(self.prior)?;
        let values = self.data.values()?;
        let obs = GaussianObservations::from_slice(&values[..], self.observation_variance)?;
        let sample_mean = obs.sample_mean()?;
        let post = prior.update(&obs)?;
        tracing::info!(posterior = %post, "gaussian analysis");
        let credible_interval = post.credible_interval(self.level)?;
        let monte_carlo_interval = post.monte_carlo_credible_interval(self.level, self.draws, self.seed)?;
        let draws = post.draws(self.draws, self.seed)?;
        let summary = Summary::from_draws(&draws, self.level)?;
        let sd = post.std_dev();
        let grid = calc::linspace(post.mean() - 5. * sd, post.mean() + 5. * sd, self.grid_points);
        let point_estimate = post.point_estimate(self.loss, &grid[..])?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let rep = decision::replicate(&post, obs.len(), self.predictive_sets, &mut rng)?;
        let checks = vec![
            decision::check_mean(obs.values(), &rep)?,
            decision::check_std_dev(obs.values(), &rep)?
        ];
        Ok(GaussianReport {
            prior : self.prior,
            n : obs.len(),
            sample_mean,
            posterior : post.params(),
            credible_interval,
            monte_carlo_interval,
            summary,
            point_estimate,
            predictive : post.predictive()?.params(),
            checks
        })
    }

}
