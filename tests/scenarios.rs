use bayes_intro::approx::Interval;
use bayes_intro::calc::{self, Loss};
use bayes_intro::decision::{self, GroupDraws, Rope, RopeDecision};
use bayes_intro::model::{Analysis, Report};
use bayes_intro::prob::*;
use bayes_intro::sample::{self, Table};
use nalgebra::DVector;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Bernoulli, Distribution, StandardNormal};
use std::io::Write;

fn coin_flips(n : usize, p : f64, seed : u64) -> Vec<bool> {
    let mut rng = StdRng::seed_from_u64(seed);
    let bern = Bernoulli::new(p).unwrap();
    (0..n).map(|_| bern.sample(&mut rng) ).collect()
}

fn standard_normal(n : usize, seed : u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| StandardNormal.sample(&mut rng) ).collect()
}

#[test]
fn exact_and_monte_carlo_intervals_agree() {
    let prior = Beta::uniform().unwrap();
    let flips = coin_flips(100, 0.35, 42);
    let obs = BernoulliObservations::from_outcomes(flips.iter().copied());
    let post = prior.update(&obs).unwrap();
    assert_eq!(post.alpha(), 1.0 + obs.successes() as f64);
    assert_eq!(post.beta(), 1.0 + obs.failures() as f64);
    let exact = post.credible_interval(0.95).unwrap();
    let mc = post.monte_carlo_credible_interval(0.95, 10_000, 1).unwrap();
    assert!((exact.low() - mc.low()).abs() < 0.01);
    assert!((exact.high() - mc.high()).abs() < 0.01);
    assert!(exact.contains(&post.mean()));

    // Same seed, same interval.
    let again = post.monte_carlo_credible_interval(0.95, 10_000, 1).unwrap();
    assert_eq!(mc, again);
}

#[test]
fn brute_force_log_joint_matches_conjugate_update() {
    let prior = Normal::new(1.1, 1.44).unwrap();
    let y = standard_normal(100, 42);
    let obs = GaussianObservations::from_slice(&y[..], 1.69).unwrap();
    let post = prior.update(&obs).unwrap();

    let grid : Vec<f64> = (0..=3000).map(|i| -1.0 + 1E-3 * i as f64 ).collect();
    let lj : Vec<f64> = grid.iter().map(|mu| log_joint(&prior, &obs, *mu, 1.3).unwrap() ).collect();
    let max = lj.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let w : Vec<f64> = lj.iter().map(|l| (l - max).exp() ).collect();
    let total : f64 = w.iter().sum();
    let mean : f64 = grid.iter().zip(w.iter()).map(|(mu, w)| mu * w ).sum::<f64>() / total;
    let var : f64 = grid.iter().zip(w.iter()).map(|(mu, w)| (mu - mean).powf(2.) * w ).sum::<f64>() / total;

    let expected_var = 1.0 / (1.0 / 1.44 + 100.0 / 1.69);
    let expected_mean = expected_var * (y.iter().sum::<f64>() / 1.69 + 1.1 / 1.44);
    assert!((post.mean() - expected_mean).abs() < 1E-12);
    assert!((post.var() - expected_var).abs() < 1E-12);
    assert!((mean - post.mean()).abs() < 1E-2);
    assert!((var - post.var()).abs() < 1E-2);
}

#[test]
fn point_estimates_track_mean_and_median() {
    let post = Beta::new(2.0, 2.0).unwrap()
        .update(&BernoulliObservations::new(30, 9).unwrap())
        .unwrap();
    let grid = calc::linspace(0.0, 1.0, 1001);
    let l2 = post.point_estimate(Loss::L2, &grid[..]).unwrap();
    let l1 = post.point_estimate(Loss::L1, &grid[..]).unwrap();
    assert!((l2.value - post.mean()).abs() <= 5E-4 + 1E-12);
    assert!((l1.value - post.median()).abs() <= 1E-3 + 1E-12);
    assert!((l2.expected_loss - post.var()).abs() < 1E-6);

    // The estimates from draws approach the exact ones.
    let draws = post.draws(20_000, 3).unwrap();
    let coarse = calc::linspace(0.0, 1.0, 101);
    let from_draws = draws.point_estimate(Loss::L2, &coarse[..]).unwrap();
    assert!((from_draws.value - post.mean()).abs() < 0.02);
    assert!(post.point_estimate(Loss::L2, &[1.5]).is_err());
}

#[test]
fn sequential_updates_and_rope() {
    let prior = Beta::uniform().unwrap();
    let first = prior.update(&BernoulliObservations::new(50, 10).unwrap()).unwrap();
    let second = first.update(&BernoulliObservations::new(50, 12).unwrap()).unwrap();
    let batch = prior.update(&BernoulliObservations::new(100, 22).unwrap()).unwrap();
    assert_eq!(second.params(), batch.params());
    let intv = batch.credible_interval(0.95).unwrap();
    let rope = Rope::around(0.5, 0.05).unwrap();
    assert_eq!(rope.decide(&intv), RopeDecision::Reject);
}

#[test]
fn group_comparison() {
    let csv = "group,value\n\
        a,1.0\na,1.2\na,0.8\na,1.1\n\
        b,2.0\nb,2.2\nb,1.9\nb,2.1\n\
        c,1.0\nc,1.3\nc,0.9\nc,0.8\n";
    let tbl : Table = csv.parse().unwrap();
    let categories = ["a", "b", "c"];
    let groups = tbl.grouped("group", "value", &categories[..]).unwrap();
    let prior = Normal::new(0.0, 100.0).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let draws = GroupDraws::from_conjugate(&groups[..], &prior, 4000, &mut rng).unwrap();
    assert_eq!(draws.num_draws(), 4000);
    assert_eq!(draws.num_groups(), 3);
    let contrasts = decision::pairwise(&draws, 0.95).unwrap();
    assert_eq!(contrasts.len(), 3);
    assert_eq!(contrasts[0].first, "a");
    assert_eq!(contrasts[0].second, "b");
    assert!(contrasts[0].credible);
    assert!(contrasts[0].diff.mean < 0.0);
    assert!(contrasts[0].mass_below_zero > 0.99);
    assert!(!contrasts[1].credible);

    let single = vec![(String::from("a"), DVector::from_vec(vec![1.0]))];
    assert!(GroupDraws::from_conjugate(&single[..], &prior, 10, &mut rng).is_err());
}

#[test]
fn predictive_checks() {
    let prior = Normal::new(0.0, 10.0).unwrap();
    let y = standard_normal(30, 5);
    let obs = GaussianObservations::from_slice(&y[..], 1.0).unwrap();
    let post = prior.update(&obs).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let rep = decision::replicate(&post, obs.len(), 200, &mut rng).unwrap();
    assert_eq!(rep.shape(), (200, 30));
    let c = decision::check_mean(obs.values(), &rep).unwrap();
    assert!(c.p_value >= 0.0 && c.p_value <= 1.0);
    let predictive = post.predictive().unwrap();
    assert!((predictive.var() - post.var() - 1.0).abs() < 1E-12);
}

#[test]
fn outliers_are_removed() {
    let mut y = standard_normal(50, 9);
    y.push(40.0);
    let kept = sample::remove_outliers(&y[..], 1.5).unwrap();
    assert!(kept.len() < y.len());
    assert!(!kept.contains(&40.0));
}

#[test]
fn analysis_from_file() {
    let dir = std::env::temp_dir();
    let data_path = dir.join("bayes_intro_scenario_data.csv");
    let mut f = std::fs::File::create(&data_path).unwrap();
    writeln!(f, "y").unwrap();
    for v in standard_normal(40, 13) {
        writeln!(f, "{}", 2.0 + v).unwrap();
    }
    drop(f);
    let config = format!(
        r#"{{ "kind" : "gaussian", "prior" : {{ "mean" : 0.0, "variance" : 25.0 }},
            "observation_variance" : 1.0, "data" : {{ "path" : {:?}, "column" : "y" }},
            "draws" : 2000, "predictive_sets" : 100 }}"#,
        data_path.to_string_lossy()
    );
    let config_path = dir.join("bayes_intro_scenario_config.json");
    std::fs::write(&config_path, config).unwrap();
    let analysis = Analysis::load_from_path(&config_path).unwrap();
    match analysis.run().unwrap() {
        Report::Gaussian(r) => {
            assert_eq!(r.n, 40);
            assert!(r.credible_interval.contains(&r.posterior.mean));
            assert!((r.posterior.mean - 2.0).abs() < 0.5);
        },
        _ => panic!("Expected gaussian report")
    }
    std::fs::remove_file(&data_path).ok();
    std::fs::remove_file(&config_path).ok();
}

#[test]
fn invalid_levels_and_sample_sizes() {
    let beta_post = Beta::uniform().unwrap()
        .update(&BernoulliObservations::new(20, 7).unwrap())
        .unwrap();
    let gauss_post = Normal::new(0.0, 1.0).unwrap()
        .update(&GaussianObservations::from_slice(&[0.4, -0.2, 1.1], 1.0).unwrap())
        .unwrap();
    for level in [0.0, 1.0, 1.5, -0.1, f64::NAN].iter() {
        assert!(matches!(beta_post.credible_interval(*level), Err(InferenceError::InvalidParameter(_))));
        assert!(matches!(gauss_post.credible_interval(*level), Err(InferenceError::InvalidParameter(_))));
        assert!(matches!(
            beta_post.monte_carlo_credible_interval(*level, 100, 0),
            Err(InferenceError::InvalidParameter(_))
        ));
    }
    assert!(matches!(
        beta_post.monte_carlo_credible_interval(0.95, 0, 0),
        Err(InferenceError::InvalidParameter(_))
    ));
    assert!(matches!(
        gauss_post.monte_carlo_credible_interval(0.95, 0, 0),
        Err(InferenceError::InvalidParameter(_))
    ));
}

#[test]
fn overflowing_precision_is_unstable() {
    // A subnormal observation variance is positive and finite, but its inverse overflows.
    let prior = Normal::new(0.0, 1.0).unwrap();
    let obs = GaussianObservations::from_slice(&vec![0.5; 1000][..], 1E-320).unwrap();
    assert!(matches!(prior.update(&obs), Err(InferenceError::NumericalInstability(_))));
    assert!(matches!(
        bayes_intro::prob::normal::update_posterior(&prior, &obs),
        Err(InferenceError::NumericalInstability(_))
    ));
}
