use bayes_intro::prob::*;
use statrs::distribution::{Continuous, Discrete};

const EPS : f64 = 10E-8;

#[test]
fn beta() {
    for (a, b) in [(1.0, 1.0), (0.5, 0.5), (2.0, 5.0), (10.0, 3.0)].iter() {
        let beta = Beta::new(*a, *b).unwrap();
        let reference = statrs::distribution::Beta::new(*a, *b).unwrap();
        for x in (1..100).map(|x| 0.01 * x as f64) {
            assert!( (reference.ln_pdf(x) - beta.log_prob(x)).abs() < EPS);
            assert!( (reference.pdf(x) - beta.prob(x)).abs() < EPS * reference.pdf(x).max(1.0));
        }
    }
}

#[test]
fn normal() {
    let n = Normal::new(1.1, 1.44).unwrap();
    let reference = statrs::distribution::Normal::new(1.1, 1.2).unwrap();
    for x in (-50..50).map(|x| 0.1 * x as f64) {
        assert!( (reference.ln_pdf(x) - n.log_prob(x)).abs() < EPS);
    }
}

#[test]
fn bernoulli_likelihood() {
    let obs = BernoulliObservations::new(20, 7).unwrap();
    for p in (1..100).map(|p| 0.01 * p as f64) {
        let reference = statrs::distribution::Binomial::new(p, 20).unwrap();
        assert!( (reference.ln_pmf(7) - obs.log_likelihood(p)).abs() < EPS);
    }
}

#[test]
fn gaussian_log_joint() {
    let prior = Normal::new(1.1, 1.44).unwrap();
    let y = [0.3, -1.2, 0.8, 2.5, 1.1, -0.4];
    let obs = GaussianObservations::from_slice(&y, 1.69).unwrap();
    let prior_ref = statrs::distribution::Normal::new(1.1, 1.2).unwrap();
    for mu in (-20..20).map(|m| 0.1 * m as f64) {
        let lik_ref = statrs::distribution::Normal::new(mu, 1.3).unwrap();
        let expected = prior_ref.ln_pdf(mu) + y.iter().map(|x| lik_ref.ln_pdf(*x) ).sum::<f64>();
        let lj = log_joint(&prior, &obs, mu, 1.3).unwrap();
        assert!( (expected - lj).abs() < 1E-9);
    }
    assert!(log_joint(&prior, &obs, 0.0, 0.0).is_err());
}
