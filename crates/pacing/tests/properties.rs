//! Randomized checks over seeded course generators.

use approx::assert_relative_eq;
use pacer::{
    Course, CoursePoint, ExtrapolationConfig, Optimizer, PowerSchedule, RecoveryModel,
    RiderParameters, SearchMethod, Segment, Simulator, extrapolate_schedule,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn random_course(rng: &mut StdRng, min_distance: f64) -> Course {
    let mut segments = Vec::new();
    let mut total = 0.0;
    while segments.len() < 2 || total < min_distance {
        let distance = rng.gen_range(100.0..3000.0);
        let segment = Segment::new(distance, rng.gen_range(-0.08..0.10))
            .and_then(|s| s.with_altitude(rng.gen_range(0.0..1500.0)))
            .and_then(|s| s.with_wind(rng.gen_range(-3.0..3.0)))
            .unwrap();
        total += distance;
        segments.push(segment);
    }
    Course::new(segments).unwrap()
}

fn random_rider(rng: &mut StdRng, w_prime: f64) -> RiderParameters {
    RiderParameters::new(rng.gen_range(200.0..380.0), w_prime, rng.gen_range(55.0..95.0))
        .and_then(|r| r.with_aero(rng.gen_range(0.22..0.40), rng.gen_range(0.003..0.006)))
        .unwrap()
}

#[test]
fn reserve_is_untouched_at_critical_power() {
    let mut rng = StdRng::seed_from_u64(7);

    for case in 0..50 {
        let course = random_course(&mut rng, 0.0);
        let w_prime = rng.gen_range(5_000.0..30_000.0);
        let mut rider = random_rider(&mut rng, w_prime);
        if case % 2 == 1 {
            rider = rider.with_recovery(RecoveryModel::exponential()).unwrap();
        }

        let run = Simulator::new(&course, &rider)
            .run(rider.critical_power())
            .unwrap();

        assert!(run.is_completed());
        for segment in &run.segments {
            assert_eq!(segment.reserve_after, rider.w_prime());
        }
        assert_eq!(run.utilization(), 0.0);
    }
}

#[test]
fn demand_beyond_capacity_always_fails() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..50 {
        let course = random_course(&mut rng, 0.0);
        let unlimited = random_rider(&mut rng, 1.0e9);
        let power = unlimited.critical_power() + rng.gen_range(5.0..300.0);

        let reference = Simulator::new(&course, &unlimited).run(power).unwrap();
        let demand = (power - unlimited.critical_power()) * reference.total_time().unwrap();

        let w_prime = demand * rng.gen_range(0.2..1.8);
        if (w_prime - demand).abs() < 1.0 {
            continue;
        }
        let rider = RiderParameters::new(unlimited.critical_power(), w_prime, unlimited.mass())
            .and_then(|r| r.with_aero(unlimited.drag_area(), unlimited.rolling_resistance()))
            .unwrap();

        let run = Simulator::new(&course, &rider).run(power).unwrap();

        if demand > w_prime {
            assert!(!run.is_completed());
            assert_eq!(run.total_time(), None);
            assert!(run.failed_segment().is_some());
        } else {
            assert!(run.is_completed());
            assert_relative_eq!(run.final_reserve, w_prime - demand, epsilon = 1e-6);
        }
    }
}

#[test]
fn more_power_is_never_slower() {
    let mut rng = StdRng::seed_from_u64(23);

    for _ in 0..20 {
        let course = random_course(&mut rng, 0.0);
        let w_prime = rng.gen_range(10_000.0..30_000.0);
        let rider = random_rider(&mut rng, w_prime);
        let simulator = Simulator::new(&course, &rider);

        let mut previous: Option<f64> = None;
        for step in 0..30 {
            let power = 100.0 + 20.0 * f64::from(step);
            let run = simulator.run(power).unwrap();
            let Some(time) = run.total_time() else {
                break;
            };
            if let Some(slower) = previous {
                assert!(time < slower, "{power} W took {time} s, slower than {slower} s");
            }
            previous = Some(time);
        }
    }
}

#[test]
fn optimizer_lands_within_utilization_tolerance() {
    let mut rng = StdRng::seed_from_u64(31);

    for _ in 0..5 {
        let course = random_course(&mut rng, 4000.0);
        let rider = RiderParameters::new(300.0, 20_000.0, rng.gen_range(60.0..85.0)).unwrap();

        let result = Optimizer::default().optimize(&course, &rider).unwrap();

        assert_eq!(result.method, SearchMethod::Primary);
        assert!(result.run.is_completed());
        assert!(
            (result.achieved_utilization - 0.85).abs() <= 0.02,
            "achieved {} at {} W",
            result.achieved_utilization,
            result.power
        );
    }
}

#[test]
fn fine_points_chain_exactly() {
    let mut rng = StdRng::seed_from_u64(43);

    for _ in 0..10 {
        let course = random_course(&mut rng, 0.0);
        let rider = random_rider(&mut rng, 1.0e7);
        let powers: Vec<_> = (0..course.len())
            .map(|_| rng.gen_range(120.0..450.0))
            .collect();
        let run = Simulator::new(&course, &rider)
            .run_schedule(&powers)
            .unwrap();
        let schedule = PowerSchedule::from_run(&run).unwrap();

        let mut positions: Vec<f64> = (0..200)
            .map(|_| rng.gen_range(0.0..course.total_distance()))
            .collect();
        positions.sort_by(f64::total_cmp);
        positions.dedup();
        let points: Vec<_> = positions
            .into_iter()
            .map(|position| {
                let segment = course.segments()[course.segment_at(position)];
                CoursePoint::new(position, segment.gradient())
                    .with_altitude(segment.altitude())
                    .with_wind(segment.wind())
            })
            .collect();

        let trace =
            extrapolate_schedule(&schedule, &points, &rider, &ExtrapolationConfig::default())
                .unwrap();

        assert_eq!(trace[0].entry_speed, run.segments[0].speed);
        for pair in trace.windows(2) {
            assert_eq!(pair[1].entry_speed, pair[0].exit_speed);
        }
        for point in &trace {
            assert!(point.exit_speed > 0.0);
            assert!(point.acceleration.abs() <= 4.0 + 1e-9);
        }
    }
}
