//! Integration tests for error handling across the public API
//!
//! Bad input must be rejected before any numeric work, degenerate series
//! must be handled deterministically and a refinement that cannot converge
//! must fail instead of running forever.

use assert_approx_eq::assert_approx_eq;
use iaaft_surrogates::input::{parse_count, parse_flag, parse_series};
use iaaft_surrogates::{
    generate_surrogates, DegeneratePolicy, SurrogateConfig, SurrogateError, SurrogateTargets,
};
use std::time::Duration;

fn wiggle(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| ((i as f64) * 0.41).sin() + 0.3 * ((i as f64) * 1.7).cos())
        .collect()
}

#[test]
fn test_two_dimensional_input_rejected() {
    let err = parse_series("1 2\n3 4\n").unwrap_err();
    assert!(err.is_input_error());
    match err {
        SurrogateError::InvalidInput { argument, .. } => assert_eq!(argument, "original_data"),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
}

#[test]
fn test_count_rejected() {
    assert!(matches!(
        parse_count("0"),
        Err(SurrogateError::InvalidInput { .. })
    ));
    assert!(matches!(
        parse_count("many"),
        Err(SurrogateError::InvalidInput { .. })
    ));

    match generate_surrogates(&wiggle(16), &SurrogateConfig::new(0)) {
        Err(SurrogateError::InvalidInput { argument, .. }) => assert_eq!(argument, "count"),
        other => panic!("Expected InvalidInput for count, got {:?}", other),
    }
}

#[test]
fn test_non_boolean_flags_rejected() {
    for text in ["yes", "1", "", "maybe"] {
        assert!(parse_flag("detrend", text).is_err());
        assert!(parse_flag("verbose", text).is_err());
    }
}

#[test]
fn test_non_finite_and_short_input_rejected() {
    let config = SurrogateConfig::quiet(1);

    let mut data = wiggle(16);
    data[7] = f64::NAN;
    let err = generate_surrogates(&data, &config).unwrap_err();
    assert!(err.to_string().contains("original_data"));

    assert!(matches!(
        generate_surrogates(&[], &config),
        Err(SurrogateError::InsufficientData { required: 2, actual: 0 })
    ));
    assert!(matches!(
        generate_surrogates(&[4.0], &config),
        Err(SurrogateError::InsufficientData { .. })
    ));
}

#[test]
fn test_invalid_parameters_rejected() {
    let data = wiggle(16);
    for config in [
        SurrogateConfig::quiet(1).with_tolerance(0.0),
        SurrogateConfig::quiet(1).with_tolerance(f64::NAN),
        SurrogateConfig::quiet(1).with_max_iterations(0),
        SurrogateConfig::quiet(1).with_timeout(Duration::ZERO),
    ] {
        assert!(matches!(
            generate_surrogates(&data, &config),
            Err(SurrogateError::InvalidParameter { .. })
        ));
    }
}

#[test]
fn test_linear_series_with_detrending_is_degenerate() {
    let linear: Vec<f64> = (0..32).map(|i| -4.0 + 0.5 * i as f64).collect();

    let targets = SurrogateTargets::from_series(&linear, true).unwrap();
    assert!(targets.is_degenerate());

    // rejected every time, never a hang
    let reject = SurrogateConfig::reproducible(3, 8).with_detrend(true);
    for _ in 0..2 {
        assert!(matches!(
            generate_surrogates(&linear, &reject),
            Err(SurrogateError::DegenerateSequence { .. })
        ));
    }

    let pass = reject
        .clone()
        .with_degenerate_policy(DegeneratePolicy::PassThrough);
    let set = generate_surrogates(&linear, &pass).unwrap();
    assert_eq!(set.shape(), (3, 32));
    for &value in set.as_flat() {
        assert_approx_eq!(value, 0.0, 1e-9);
    }
    assert!(set.diagnostics().iter().all(|d| d.iterations == 0));

    // the removed line is still available
    let restored = set.retrended_row(0).unwrap();
    let mut sorted_restored = restored.clone();
    sorted_restored.sort_by(|a, b| a.partial_cmp(b).unwrap());
    for (r, x) in sorted_restored.iter().zip(&linear) {
        assert_approx_eq!(*r, *x, 1e-9);
    }
}

#[test]
fn test_constant_series_without_detrending_is_degenerate() {
    let constant = vec![0.0; 10];
    assert!(matches!(
        generate_surrogates(&constant, &SurrogateConfig::quiet(1)),
        Err(SurrogateError::DegenerateSequence { .. })
    ));

    // a nonzero constant has energy and converges immediately
    let set = generate_surrogates(&[2.5; 10], &SurrogateConfig::reproducible(1, 0)).unwrap();
    assert!(set.as_flat().iter().all(|&v| v == 2.5));
}

#[test]
fn test_iteration_budget_reports_non_termination() {
    let data = wiggle(64);
    let config = SurrogateConfig::reproducible(2, 21)
        .with_verbose(false)
        .with_max_iterations(1);

    match generate_surrogates(&data, &config) {
        Err(SurrogateError::NonTermination {
            iterations,
            last_ratio,
            ..
        }) => {
            assert_eq!(iterations, 1);
            assert!(last_ratio > 1e-6);
        }
        other => panic!("Expected NonTermination, got {:?}", other),
    }
}
