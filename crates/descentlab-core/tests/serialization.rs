//! JSON marshalling of configuration and trace types.

#![cfg(feature = "serde")]

use descentlab_core::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn stopping_criterion_round_trips() {
    let criterion = StoppingCriterion::new()
        .with_max_iterations(42)
        .with_gradient_tolerance(1e-7);

    let json = serde_json::to_string(&criterion).unwrap();
    let back: StoppingCriterion = serde_json::from_str(&json).unwrap();
    assert_eq!(criterion, back);
}

#[test]
fn line_search_mode_uses_lowercase_names() {
    assert_eq!(
        serde_json::to_string(&LineSearchMode::Armijo).unwrap(),
        "\"armijo\""
    );
    let mode: LineSearchMode = serde_json::from_str("\"none\"").unwrap();
    assert_eq!(mode, LineSearchMode::None);
}

#[test]
fn trace_serializes_records_and_failure() {
    let record = IterationBase {
        iteration: 0,
        w_old: DVector::from_vec(vec![1.0, 1.0]),
        w_new: DVector::from_vec(vec![0.0, 0.0]),
        loss: 2.0,
        grad: DVector::from_vec(vec![2.0, 2.0]),
        grad_norm: 8.0_f64.sqrt(),
        direction: DVector::from_vec(vec![-2.0, -2.0]),
        alpha: 0.5,
        new_loss: 0.0,
        new_grad_norm: 0.0,
        line_search: None,
    };
    let trace = OptimizationTrace::new(
        vec![record],
        DVector::from_vec(vec![1.0, 1.0]),
        DVector::from_vec(vec![0.0, 0.0]),
        0.0,
        0.0,
        TerminationReason::ConvergedGradient,
    )
    .with_failure(LinalgError::singular_system(2, 0.0));

    let value = serde_json::to_value(&trace).unwrap();
    assert_eq!(value["termination"], "ConvergedGradient");
    assert_eq!(value["records"][0]["alpha"], 0.5);
    assert!(value["failure"]["SingularSystem"].is_object());

    let back: OptimizationTrace<IterationBase> = serde_json::from_value(value).unwrap();
    assert_eq!(trace, back);
}
