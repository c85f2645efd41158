use anyhow::{Context, anyhow};
use bayes_intro::calc::Loss;
use bayes_intro::decision::{self, GroupDraws};
use bayes_intro::model::{Analysis, BetaBinomialAnalysis, GaussianAnalysis, DataSource, Report};
use bayes_intro::prob::{BernoulliObservations, BetaParams, Normal};
use bayes_intro::sample::table::Table;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use tracing::Level;

/// Conjugate posterior updates, credible intervals and point estimates from the command line
#[derive(StructOpt, Debug)]
#[structopt(name = "bayes-intro")]
pub struct Opt {

    /// Logging verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[structopt(short, long, parse(from_occurrences))]
    verbose : u8,

    /// Writes the JSON report to this file instead of stdout
    #[structopt(short, long, parse(from_os_str))]
    output : Option<PathBuf>,

    #[structopt(subcommand)]
    cmd : Bayes

}

#[derive(StructOpt, Debug)]
pub enum Bayes {

    /// Beta prior for the success probability of Bernoulli trials. Observations are either
    /// counts (--trials and --successes) or a 0/1 column of a CSV file (--data and --column).
    Beta {

        #[structopt(long, default_value = "1.0")]
        alpha : f64,

        #[structopt(long, default_value = "1.0")]
        beta : f64,

        #[structopt(long)]
        trials : Option<u64>,

        #[structopt(long)]
        successes : Option<u64>,

        #[structopt(long, parse(from_os_str))]
        data : Option<PathBuf>,

        #[structopt(long)]
        column : Option<String>,

        #[structopt(long, default_value = "0.95")]
        level : f64,

        #[structopt(long, default_value = "10000")]
        draws : usize,

        #[structopt(long, default_value = "0")]
        seed : u64,

        /// l1 (posterior median) or l2 (posterior mean)
        #[structopt(long, default_value = "l2")]
        loss : Loss
    },

    /// Normal prior for the mean of Normal observations with known standard deviation.
    Gaussian {

        #[structopt(long)]
        prior_mean : f64,

        #[structopt(long)]
        prior_sd : f64,

        #[structopt(long)]
        obs_sd : f64,

        #[structopt(long, parse(from_os_str))]
        data : PathBuf,

        #[structopt(long)]
        column : String,

        #[structopt(long, default_value = "0.95")]
        level : f64,

        #[structopt(long, default_value = "10000")]
        draws : usize,

        #[structopt(long, default_value = "0")]
        seed : u64
    },

    /// Pairwise comparison of the mean of a value column across the categories of a label column.
    Compare {

        #[structopt(long, parse(from_os_str))]
        data : PathBuf,

        #[structopt(long)]
        group : String,

        #[structopt(long)]
        value : String,

        /// Comma-separated categories, compared in the informed order
        #[structopt(long, use_delimiter = true)]
        categories : Vec<String>,

        #[structopt(long, default_value = "10000")]
        draws : usize,

        #[structopt(long, default_value = "0")]
        seed : u64,

        #[structopt(long, default_value = "0.95")]
        level : f64
    },

    /// Runs an analysis described by a JSON file.
    Run {

        #[structopt(parse(from_os_str))]
        config : PathBuf
    }

}

fn init_logging(verbose : u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn print_or_save<T>(out : &T, opt_path : &Option<PathBuf>) -> anyhow::Result<()>
where
    T : Serialize
{
    let content = serde_json::to_string_pretty(out)?;
    match opt_path {
        Some(path) => {
            let mut f = File::create(path)
                .with_context(|| format!("Could not create {}", path.display()) )?;
            writeln!(f, "{}", content)?;
            Ok(())
        },
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

fn open_table(path : &Path) -> anyhow::Result<Table> {
    Table::load_from_path(path)
        .with_context(|| format!("Error opening table {}", path.display()) )
}

fn beta_analysis(
    alpha : f64,
    beta : f64,
    trials : Option<u64>,
    successes : Option<u64>,
    data : &Option<PathBuf>,
    column : &Option<String>
) -> anyhow::Result<BetaBinomialAnalysis> {
    let obs = match (trials, successes, data, column) {
        (Some(n), Some(k), None, None) => BernoulliObservations::new(n, k)?,
        (None, None, Some(path), Some(col)) => {
            let y = open_table(path)?.column(col.as_str())?;
            BernoulliObservations::from_slice(y.as_slice())
                .with_context(|| format!("Column {} should hold only 0/1 outcomes", col) )?
        },
        _ => return Err(anyhow!("Inform either --trials and --successes, or --data and --column"))
    };
    Ok(BetaBinomialAnalysis::from_observations(BetaParams { alpha, beta }, &obs))
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    init_logging(opt.verbose);
    match opt.cmd {
        Bayes::Beta { alpha, beta, trials, successes, ref data, ref column, level, draws, seed, loss } => {
            let mut analysis = beta_analysis(alpha, beta, trials, successes, data, column)?;
            analysis.level = level;
            analysis.draws = draws;
            analysis.seed = seed;
            analysis.loss = loss;
            let report = Analysis::BetaBinomial(analysis).run()?;
            print_or_save(&report, &opt.output)
        },
        Bayes::Gaussian { prior_mean, prior_sd, obs_sd, ref data, ref column, level, draws, seed } => {
            let data = DataSource::Csv { path : data.clone(), column : column.clone() };
            let mut analysis = GaussianAnalysis::from_std_devs(prior_mean, prior_sd, obs_sd, data)?;
            analysis.level = level;
            analysis.draws = draws;
            analysis.seed = seed;
            let report : Report = Analysis::Gaussian(analysis).run()?;
            print_or_save(&report, &opt.output)
        },
        Bayes::Compare { ref data, ref group, ref value, ref categories, draws, seed, level } => {
            if categories.len() < 2 {
                return Err(anyhow!("Inform at least two categories to compare"));
            }
            let tbl = open_table(data)?;
            let groups = tbl.grouped(group.as_str(), value.as_str(), &categories[..])?;
            let prior = Normal::new(0.0, 100.0)?;
            let mut rng = StdRng::seed_from_u64(seed);
            let group_draws = GroupDraws::from_conjugate(&groups[..], &prior, draws, &mut rng)?;
            let contrasts = decision::pairwise(&group_draws, level)?;
            print_or_save(&contrasts, &opt.output)
        },
        Bayes::Run { ref config } => {
            let analysis = Analysis::load_from_path(config)
                .with_context(|| format!("Error loading analysis {}", config.display()) )?;
            let report = analysis.run()?;
            print_or_save(&report, &opt.output)
        }
    }
}
