use approx::assert_relative_eq;
use pacer::{
    Course, CoursePoint, ExtrapolationConfig, Optimizer, PowerSchedule, RiderParameters, RunStatus,
    SearchMethod, Segment, Simulator, extrapolate, extrapolate_schedule,
    physics::{Conditions, ResistiveForces},
};

fn hilly() -> Course {
    let rows = [
        (1000.0, 0.02, 100.0, 0.0),
        (1500.0, 0.06, 120.0, 0.0),
        (800.0, -0.03, 115.0, 2.0),
        (1200.0, 0.01, 110.0, -1.0),
        (900.0, 0.04, 125.0, 0.0),
    ];
    let segments = rows
        .into_iter()
        .map(|(d, g, h, w)| {
            Segment::new(d, g)
                .and_then(|s| s.with_altitude(h))
                .and_then(|s| s.with_wind(w))
                .unwrap()
        })
        .collect();
    Course::new(segments).unwrap()
}

#[test]
fn flat_ride_at_critical_power_is_in_equilibrium() {
    let course = Course::new(vec![Segment::new(1000.0, 0.0).unwrap()]).unwrap();
    let rider = RiderParameters::new(250.0, 20_000.0, 75.0).unwrap();

    let run = Simulator::new(&course, &rider).run(250.0).unwrap();

    let segment = run.segments[0];
    let conditions = Conditions::on(&course.segments()[0], &rider);
    let resisting = ResistiveForces::at(segment.speed, &conditions, &rider).total();
    assert_relative_eq!(resisting * segment.speed, 250.0, epsilon = 1e-6);
    assert_relative_eq!(segment.time, 1000.0 / segment.speed);

    assert!(run.is_completed());
    assert_eq!(segment.reserve_delta, 0.0);
    assert_eq!(run.final_reserve, 20_000.0);
    assert_eq!(run.total_energy, 0.0);
    assert_relative_eq!(run.total_work, 250.0 * segment.time);
    assert_relative_eq!(segment.work, run.total_work);
}

#[test]
fn climb_above_critical_power_drains_excess_work() {
    let course = Course::new(vec![Segment::new(1000.0, 0.06).unwrap()]).unwrap();
    let rider = RiderParameters::new(300.0, 40_000.0, 75.0).unwrap();

    let run = Simulator::new(&course, &rider).run(450.0).unwrap();

    let segment = run.segments[0];
    let expected = (450.0 - 300.0) * segment.time;
    assert!(run.is_completed());
    assert_relative_eq!(segment.time, 1000.0 / segment.speed);
    assert_relative_eq!(-segment.reserve_delta, expected, epsilon = 1e-6);
    assert_relative_eq!(run.final_reserve, 40_000.0 - expected, epsilon = 1e-6);
}

#[test]
fn optimizer_spends_target_share_of_reserve() {
    let course = hilly();
    let rider = RiderParameters::new(300.0, 25_000.0, 75.0).unwrap();

    let result = Optimizer::default().optimize(&course, &rider).unwrap();

    assert_eq!(result.method, SearchMethod::Primary);
    assert!(result.power > 300.0);
    assert!((0.83..=0.87).contains(&result.achieved_utilization));
    assert!(result.total_time().is_some());
    assert_eq!(result.run.segments.len(), course.len());
    assert_eq!(result.metrics.critical_segments.len(), 3);
}

#[test]
fn excessive_power_fails_on_an_identifiable_segment() {
    let course = hilly();
    let rider = RiderParameters::new(300.0, 10_000.0, 75.0).unwrap();

    let run = Simulator::new(&course, &rider).run(480.0).unwrap();

    assert!(!run.is_completed());
    assert_eq!(run.total_time(), None);
    let failed = run.failed_segment().unwrap();
    assert!(failed < course.len() - 1);
    assert_eq!(run.segments.len(), failed + 1);
    match run.status {
        RunStatus::Exhausted {
            segment_index,
            unreached,
            elapsed_time,
            ..
        } => {
            assert_eq!(segment_index, failed);
            assert_eq!(unreached, course.len() - failed - 1);
            assert!(elapsed_time.is_finite());
        }
        RunStatus::Completed { .. } => unreachable!(),
    }
}

#[test]
fn power_step_gives_gradual_speed_change() {
    let course = Course::new(vec![
        Segment::new(1000.0, 0.0).unwrap(),
        Segment::new(1000.0, 0.0).unwrap(),
    ])
    .unwrap();
    let rider = RiderParameters::new(300.0, 20_000.0, 75.0).unwrap();
    let run = Simulator::new(&course, &rider)
        .run_schedule(&[280.0, 320.0])
        .unwrap();
    let schedule = PowerSchedule::from_run(&run).unwrap();
    let points: Vec<_> = (0..100)
        .map(|i| CoursePoint::new(f64::from(i) * 20.0, 0.0))
        .collect();

    let trace =
        extrapolate_schedule(&schedule, &points, &rider, &ExtrapolationConfig::default()).unwrap();

    assert_eq!(trace[0].entry_speed, run.segments[0].speed);

    let before = run.segments[0].speed;
    let after = run.segments[1].speed;
    let boundary = trace.iter().position(|p| p.power > 300.0).unwrap();
    assert_relative_eq!(trace[boundary].position, 1000.0);

    // Speed rises over several points instead of jumping.
    let rising: Vec<_> = trace[boundary..]
        .iter()
        .take_while(|p| p.exit_speed < after - 0.01)
        .collect();
    assert!(rising.len() > 3);
    for pair in trace[boundary..].windows(2) {
        assert!(pair[1].exit_speed >= pair[0].exit_speed);
    }
    assert!(trace[boundary].exit_speed < before + 0.5 * (after - before));
}

#[test]
fn extrapolates_an_optimized_result() {
    let course = hilly();
    let rider = RiderParameters::new(300.0, 25_000.0, 75.0).unwrap();
    let result = Optimizer::default().optimize(&course, &rider).unwrap();

    let points: Vec<_> = (0..270)
        .map(|i| {
            let position = f64::from(i) * 20.0;
            let segment = course.segments()[course.segment_at(position)];
            CoursePoint::new(position, segment.gradient())
                .with_altitude(segment.altitude())
                .with_wind(segment.wind())
        })
        .collect();

    let trace = extrapolate(&result, &points, &rider).unwrap();

    assert_eq!(trace.len(), points.len());
    assert_eq!(trace[0].entry_speed, result.run.segments[0].speed);
    for point in &trace {
        assert_relative_eq!(point.power, result.power);
        assert!(point.exit_speed > 0.0);
    }
    for pair in trace.windows(2) {
        assert_eq!(pair[1].entry_speed, pair[0].exit_speed);
        assert!(pair[1].cumulative_time > pair[0].cumulative_time);
    }

    // Inertia smooths transitions but the total stays close to the coarse time.
    let coarse = result.total_time().unwrap();
    let fine = trace.last().unwrap().cumulative_time;
    assert!((fine - coarse).abs() / coarse < 0.05);
}
