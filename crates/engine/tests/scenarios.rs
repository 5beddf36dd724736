//! End-to-end controller scenarios on synthetic rain fields.

use approx::assert_abs_diff_eq;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use nimbus_engine::{
    AnalysisMode, EngineConfig, FieldInput, MotionStatus, ResetReason, RunController, RunState,
    StepOutcome, TimestepRecord,
};

/// Rain field made of random Gaussian cells on a light background.
fn textured_rain(n: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let cells: Vec<(f64, f64, f64, f64)> = (0..60)
        .map(|_| {
            (
                rng.random_range(0.0..n as f64),
                rng.random_range(0.0..n as f64),
                rng.random_range(3.0..6.0),
                rng.random_range(5.0..60.0),
            )
        })
        .collect();
    Array2::from_shape_fn((n, n), |(r, c)| {
        let (y, x) = (r as f64, c as f64);
        0.2 + cells
            .iter()
            .map(|&(cy, cx, s, a)| a * (-((y - cy).powi(2) + (x - cx).powi(2)) / (2.0 * s * s)).exp())
            .sum::<f64>()
    })
}

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 14)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn at(step: i64) -> NaiveDateTime {
    start() + Duration::minutes(5 * step)
}

fn expect_record(out: StepOutcome) -> TimestepRecord {
    match out {
        StepOutcome::Record(r) => *r,
        StepOutcome::Reset { reason, .. } => panic!("unexpected reset: {reason:?}"),
    }
}

#[test]
fn static_field_tracks_with_perfect_persistence() {
    let field = textured_rain(96, 3);
    let config = EngineConfig::new()
        .with_threshold(0.08)
        .with_max_lag(2)
        .with_flow_retention(2);
    let mut controller = RunController::new(config).unwrap();

    let mut records = Vec::new();
    for step in 0..5 {
        let out = controller
            .step(FieldInput::valid(at(step), field.clone()))
            .unwrap();
        records.push(expect_record(out));
    }

    assert_eq!(records[0].state, RunState::Warming);
    assert_eq!(records[0].correlation.eulerian_at(1), None);
    assert_eq!(records[0].correlation.lagrangian_at(1), None);
    assert_eq!(records[0].motion.status, MotionStatus::NotRun);

    for rec in &records[1..] {
        assert_eq!(rec.state, RunState::Tracking);
        assert_eq!(rec.motion.status, MotionStatus::Estimated);
        assert_eq!(rec.motion.mean_u, Some(0.0));
        assert_abs_diff_eq!(rec.motion.mean_v.unwrap(), 0.0, epsilon = 1e-12);
        let eul = rec.correlation.eulerian_at(1).unwrap();
        let lagr = rec.correlation.lagrangian_at(1).unwrap();
        assert_abs_diff_eq!(eul, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(lagr, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rec.correlation.difference_at(1).unwrap(), 0.0, epsilon = 1e-3);
    }

    // Lag 2 needs three fields.
    assert_eq!(records[1].correlation.eulerian_at(2), None);
    assert_abs_diff_eq!(records[2].correlation.eulerian_at(2).unwrap(), 1.0, epsilon = 1e-3);
    assert_abs_diff_eq!(
        records[2].correlation.lagrangian_at(2).unwrap(),
        1.0,
        epsilon = 1e-3
    );

    assert_eq!(controller.flows().count(), 2);
    assert_eq!(controller.latest_flow().unwrap().0, at(4));
    assert!(records.iter().all(|r| r.war == 1.0));
}

#[test]
fn dry_field_resets_history() {
    let n = 64;
    let mut controller = RunController::new(EngineConfig::default()).unwrap();
    let wet = |seed| FieldInput::valid(at(0), textured_rain(n, seed));

    expect_record(controller.step(wet(1)).unwrap());
    let rec = expect_record(controller.step(wet(2)).unwrap());
    assert_eq!(rec.state, RunState::Tracking);
    assert_eq!(controller.stack().len(), 2);

    let dry = controller
        .step(FieldInput::valid(at(2), Array2::zeros((n, n))))
        .unwrap();
    match dry {
        StepOutcome::Reset {
            timestamp,
            reason: ResetReason::Dry { war },
        } => {
            assert_eq!(timestamp, at(2));
            assert_eq!(war, 0.0);
        }
        other => panic!("expected a dry reset, got {other:?}"),
    }
    assert_eq!(controller.state(), RunState::Cold);
    assert_eq!(controller.stack().len(), 0);
    assert!(controller.motion_window().is_empty());

    let rec = expect_record(controller.step(wet(3)).unwrap());
    assert_eq!(rec.state, RunState::Warming);
    assert_eq!(rec.motion.status, MotionStatus::NotRun);
    assert_eq!(rec.correlation.eulerian_at(1), None);

    let rec = expect_record(controller.step(wet(4)).unwrap());
    assert_eq!(rec.state, RunState::Tracking);
    assert!(rec.correlation.eulerian_at(1).is_some());
}

#[test]
fn missing_pixels_alone_count_as_dry() {
    let mut controller = RunController::new(EngineConfig::default()).unwrap();
    let all_missing = Array2::from_elem((32, 32), -999.0);
    let out = controller
        .step(FieldInput::valid(at(0), all_missing))
        .unwrap();
    assert!(matches!(
        out,
        StepOutcome::Reset {
            reason: ResetReason::Dry { .. },
            ..
        }
    ));

    let mut nan_field = textured_rain(32, 9);
    nan_field[[0, 0]] = f64::NAN;
    let rec = expect_record(controller.step(FieldInput::valid(at(1), nan_field)).unwrap());
    assert!(rec.war > 0.99 && rec.war <= 1.0);
    assert!(rec.rain.mean.unwrap().is_finite());
}

#[test]
fn record_iterator_skips_resets_and_honours_stop() {
    let mut controller =
        RunController::new(EngineConfig::new().with_mode(AnalysisMode::Spectral)).unwrap();
    let inputs = vec![
        FieldInput::valid(at(0), textured_rain(32, 1)),
        FieldInput::unreadable(at(1)),
        FieldInput::valid(at(2), textured_rain(32, 2)),
        FieldInput::valid(at(3), textured_rain(32, 3)),
        FieldInput::valid(at(4), textured_rain(32, 4)),
    ];

    let stop = controller.stop_handle().clone();
    let mut seen = Vec::new();
    for record in controller.records(inputs) {
        let record = record.unwrap();
        seen.push((record.timestamp, record.state));
        if seen.len() == 3 {
            stop.request_stop();
        }
    }
    assert_eq!(
        seen,
        vec![
            (at(0), RunState::Warming),
            (at(2), RunState::Warming),
            (at(3), RunState::Tracking),
        ]
    );

    // History survives the stop; a new iterator continues the run.
    stop.reset();
    let more: Vec<_> = controller
        .records(vec![FieldInput::valid(at(5), textured_rain(32, 5))])
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(more.len(), 1);
    assert_eq!(more[0].state, RunState::Tracking);
    assert_eq!(controller.stack().len(), 3);
}

#[test]
fn records_serialize_with_missing_values_as_null() {
    let mut controller =
        RunController::new(EngineConfig::new().with_mode(AnalysisMode::Spectral)).unwrap();
    let rec = expect_record(
        controller
            .step(FieldInput::valid(at(0), textured_rain(32, 7)))
            .unwrap(),
    );
    let json = serde_json::to_value(&rec).unwrap();
    assert_eq!(json["state"], "warming");
    assert_eq!(json["motion"]["status"], "notrun");
    assert!(json["correlation"]["eulerian"][0].is_null());
    assert!(json["war"].as_f64().unwrap() > 0.0);
}

#[test]
fn missing_half_does_not_enter_reflectivity_statistics() {
    let n = 32;
    let raw = Array2::from_shape_fn((n, n), |(r, c)| {
        if c < n / 2 { -999.0 } else { 1.0 + (r + c) as f64 / 8.0 }
    });
    let mut controller = RunController::new(EngineConfig::new()).unwrap();
    let rec = expect_record(controller.step(FieldInput::valid(at(0), raw)).unwrap());

    assert_eq!(rec.war, 1.0);
    assert_abs_diff_eq!(rec.rain.mean.unwrap(), rec.rain.cond_mean.unwrap(), epsilon = 1e-9);
    assert_abs_diff_eq!(rec.dbz.mean.unwrap(), rec.dbz.cond_mean.unwrap(), epsilon = 1e-9);
    assert_abs_diff_eq!(rec.dbz.std.unwrap(), rec.dbz.cond_std.unwrap(), epsilon = 1e-9);
    // Every valid pixel rains at least 1 mm/h.
    let floor = controller.config().zr().to_dbz(1.0);
    assert!(rec.dbz.mean.unwrap() > floor);
}

#[test]
fn featureless_pair_leaves_motion_undefined_but_keeps_eulerian() {
    // Rain varies along columns only: no corners, but non-zero variance.
    let n = 64;
    let ramp = Array2::from_shape_fn((n, n), |(_, c)| 1.0 + 9.0 * c as f64 / (n - 1) as f64);
    let mut controller = RunController::new(EngineConfig::new()).unwrap();

    let first = expect_record(controller.step(FieldInput::valid(at(0), ramp.clone())).unwrap());
    assert_eq!(first.state, RunState::Warming);
    assert_eq!(first.motion.status, MotionStatus::NotRun);

    let second = expect_record(controller.step(FieldInput::valid(at(1), ramp)).unwrap());
    assert_eq!(second.state, RunState::Tracking);
    assert_eq!(second.motion.status, MotionStatus::Insufficient);
    assert!(second.motion.mean_u.is_none());
    assert_abs_diff_eq!(second.correlation.eulerian_at(1).unwrap(), 1.0, epsilon = 1e-9);
    assert!(second.correlation.lagrangian_at(1).is_none());
    assert!(second.correlation.difference_at(1).is_none());
    assert_eq!(controller.flows().count(), 0);
    assert!(controller.latest_flow().is_none());
}
