//! Walks a course segment by segment at a prescribed power.
//!
//! Each segment's steady speed gives its duration, and the duration drives
//! the energy reserve. The reserve leaving one segment is the reserve
//! entering the next. A run ends early as soon as the reserve is exhausted;
//! the remaining segments are reported as unreached and no finish time
//! exists.

use pacer_core::Model;
use serde::{Deserialize, Serialize};

use crate::{
    Course, EnergyReserve, InvalidInput, RiderParameters, Segment, Transition,
    physics::{Conditions, steady_speed},
};

/// Per-segment trace of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub index: usize,
    /// Distance from the route start to the start of the segment, m.
    pub start: f64,
    pub distance: f64,
    pub power: f64,
    /// Steady speed, which is also the segment's average speed, m/s.
    pub speed: f64,
    pub time: f64,
    /// Mechanical work done on the segment, `P·t`, J.
    pub work: f64,
    /// Signed reserve change: negative when drawn down, positive when
    /// recovered, J.
    pub reserve_delta: f64,
    pub reserve_after: f64,
    pub cumulative_time: f64,
    /// Reserve energy drawn so far, J.
    pub cumulative_energy: f64,
    /// Mechanical work done so far, J.
    pub cumulative_work: f64,
}

/// How a simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Every segment was ridden with reserve to spare.
    Completed { total_time: f64 },

    /// The reserve ran out on `segment_index` after `elapsed_time` seconds.
    ///
    /// `unreached` segments follow the failing one, and `shortfall` joules of
    /// demand could not be met.
    Exhausted {
        segment_index: usize,
        elapsed_time: f64,
        unreached: usize,
        shortfall: f64,
    },
}

/// The outcome of riding a course at a given power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    /// Power prescribed for every segment, in route order.
    pub powers: Vec<f64>,
    /// Results for the segments that were ridden.
    pub segments: Vec<SegmentResult>,
    pub capacity: f64,
    pub final_reserve: f64,
    /// Total reserve energy drawn, J.
    pub total_energy: f64,
    /// Total mechanical work over the ridden segments, J.
    pub total_work: f64,
    pub status: RunStatus,
}

impl SimulationRun {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.status, RunStatus::Completed { .. })
    }

    /// Finish time, or `None` if the reserve ran out.
    #[must_use]
    pub fn total_time(&self) -> Option<f64> {
        match self.status {
            RunStatus::Completed { total_time } => Some(total_time),
            RunStatus::Exhausted { .. } => None,
        }
    }

    /// Fraction of the reserve spent by the end of the run.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        1.0 - self.final_reserve / self.capacity
    }

    /// Index of the segment where the reserve ran out.
    #[must_use]
    pub fn failed_segment(&self) -> Option<usize> {
        match self.status {
            RunStatus::Completed { .. } => None,
            RunStatus::Exhausted { segment_index, .. } => Some(segment_index),
        }
    }

    /// Time-weighted mean power over the ridden segments.
    #[must_use]
    pub fn average_power(&self) -> f64 {
        let time: f64 = self.segments.iter().map(|s| s.time).sum();
        if time > 0.0 { self.total_work / time } else { 0.0 }
    }
}

/// Simulates a fixed course and rider at any power.
///
/// Segment conditions (including air density) are computed once, so
/// repeated runs only pay for the speed solves.
#[derive(Debug, Clone)]
pub struct Simulator<'a> {
    course: &'a Course,
    rider: &'a RiderParameters,
    conditions: Vec<Conditions>,
}

impl<'a> Simulator<'a> {
    #[must_use]
    pub fn new(course: &'a Course, rider: &'a RiderParameters) -> Self {
        let conditions = course
            .segments()
            .iter()
            .map(|segment| Conditions::on(segment, rider))
            .collect();

        Self {
            course,
            rider,
            conditions,
        }
    }

    #[must_use]
    pub fn course(&self) -> &'a Course {
        self.course
    }

    #[must_use]
    pub fn rider(&self) -> &'a RiderParameters {
        self.rider
    }

    /// Rides the whole course at a constant `power`.
    ///
    /// # Errors
    ///
    /// Returns an error if `power` is negative or non-finite.
    pub fn run(&self, power: f64) -> Result<SimulationRun, InvalidInput> {
        self.run_schedule(&[power])
    }

    /// Rides the course with one power per segment.
    ///
    /// A single-entry schedule applies that power to every segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule length matches neither one nor the
    /// number of segments, or if any power is negative or non-finite.
    pub fn run_schedule(&self, schedule: &[f64]) -> Result<SimulationRun, InvalidInput> {
        let count = self.course.len();
        let powers = match schedule.len() {
            1 => vec![schedule[0]; count],
            n if n == count => schedule.to_vec(),
            got => {
                return Err(InvalidInput::ScheduleLength {
                    expected: count,
                    got,
                });
            }
        };
        if let Some(&bad) = powers.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(InvalidInput::Power(bad));
        }

        let rider = self.rider;
        let mut reserve = EnergyReserve::new(rider.w_prime()).with_recovery(rider.recovery())?;
        let mut segments = Vec::with_capacity(count);
        let mut cumulative_time = 0.0;
        let mut cumulative_energy = 0.0;
        let mut cumulative_work = 0.0;
        let mut start = 0.0;

        for (index, (segment, conditions)) in self
            .course
            .segments()
            .iter()
            .zip(&self.conditions)
            .enumerate()
        {
            let power = powers[index];
            let speed = steady_speed(power, conditions, rider);
            let time = segment.distance() / speed;
            let transition = reserve.apply(power, rider.critical_power(), time);

            cumulative_time += time;
            let work = power * time;
            cumulative_energy += transition.used();
            cumulative_work += work;
            segments.push(SegmentResult {
                index,
                start,
                distance: segment.distance(),
                power,
                speed,
                time,
                work,
                reserve_delta: transition.delta(),
                reserve_after: reserve.remaining(),
                cumulative_time,
                cumulative_energy,
                cumulative_work,
            });
            start += segment.distance();

            if let Transition::Exhausted { shortfall, .. } = transition {
                return Ok(SimulationRun {
                    powers,
                    segments,
                    capacity: reserve.capacity(),
                    final_reserve: reserve.remaining(),
                    total_energy: cumulative_energy,
                    total_work: cumulative_work,
                    status: RunStatus::Exhausted {
                        segment_index: index,
                        elapsed_time: cumulative_time,
                        unreached: count - index - 1,
                        shortfall,
                    },
                });
            }
        }

        Ok(SimulationRun {
            powers,
            segments,
            capacity: reserve.capacity(),
            final_reserve: reserve.remaining(),
            total_energy: cumulative_energy,
            total_work: cumulative_work,
            status: RunStatus::Completed {
                total_time: cumulative_time,
            },
        })
    }
}

impl Model for Simulator<'_> {
    type Input = f64;
    type Output = SimulationRun;
    type Error = InvalidInput;

    fn call(&self, power: &f64) -> Result<SimulationRun, Self::Error> {
        self.run(*power)
    }
}

/// Rides `segments` at a constant `power`.
///
/// # Errors
///
/// Returns an error if `segments` is empty or `power` is invalid.
pub fn simulate(
    power: f64,
    segments: &[Segment],
    rider: &RiderParameters,
) -> Result<SimulationRun, InvalidInput> {
    let course = Course::new(segments.to_vec())?;
    Simulator::new(&course, rider).run(power)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::physics::solve_speed;

    fn rider() -> RiderParameters {
        RiderParameters::new(250.0, 20_000.0, 75.0).unwrap()
    }

    fn course() -> Course {
        Course::new(vec![
            Segment::new(1000.0, 0.0).unwrap(),
            Segment::new(1500.0, 0.05).unwrap(),
            Segment::new(800.0, -0.03).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn accumulates_time_and_energy() {
        let course = course();
        let rider = rider();

        let run = Simulator::new(&course, &rider).run(290.0).unwrap();

        assert!(run.is_completed());
        assert_eq!(run.segments.len(), 3);

        let time: f64 = run.segments.iter().map(|s| s.time).sum();
        assert_relative_eq!(run.total_time().unwrap(), time, epsilon = 1e-9);

        let used = 40.0 * time;
        assert_relative_eq!(run.total_energy, used, epsilon = 1e-6);
        assert_relative_eq!(run.final_reserve, 20_000.0 - used, epsilon = 1e-6);
        assert_relative_eq!(run.segments[2].start, 2500.0);

        assert_relative_eq!(run.total_work, 290.0 * time, max_relative = 1e-12);
        assert!(run.total_work > run.total_energy);
        for segment in &run.segments {
            assert_relative_eq!(segment.work, 290.0 * segment.time);
        }
        assert_relative_eq!(run.segments[2].cumulative_work, run.total_work);
    }

    #[test]
    fn segment_speed_matches_speed_solver() {
        let course = course();
        let rider = rider();

        let run = Simulator::new(&course, &rider).run(280.0).unwrap();

        let expected = solve_speed(280.0, 0.05, 0.0, 0.0, &rider);
        assert_relative_eq!(run.segments[1].speed, expected);
        assert_relative_eq!(run.segments[1].time, 1500.0 / expected);
    }

    #[test]
    fn reserve_chains_between_segments() {
        let course = course();
        let rider = rider();

        let run = Simulator::new(&course, &rider)
            .run_schedule(&[300.0, 300.0, 150.0])
            .unwrap();

        let mut reserve = 20_000.0;
        for segment in &run.segments {
            reserve = (reserve + segment.reserve_delta).min(20_000.0);
            assert_relative_eq!(segment.reserve_after, reserve, epsilon = 1e-9);
        }
        assert!(run.segments[2].reserve_delta > 0.0);

        let work: f64 = run.segments.iter().map(|s| s.power * s.time).sum();
        assert_relative_eq!(
            run.average_power(),
            work / run.total_time().unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn exhaustion_stops_the_run() {
        let course = course();
        let rider = RiderParameters::new(250.0, 5_000.0, 75.0).unwrap();

        let run = Simulator::new(&course, &rider).run(300.0).unwrap();

        assert!(!run.is_completed());
        assert_eq!(run.total_time(), None);
        assert_eq!(run.failed_segment(), Some(1));
        assert_eq!(run.segments.len(), 2);
        assert_relative_eq!(run.final_reserve, 0.0);
        assert_relative_eq!(run.utilization(), 1.0);
        match run.status {
            RunStatus::Exhausted {
                unreached,
                shortfall,
                ..
            } => {
                assert_eq!(unreached, 1);
                assert!(shortfall > 0.0);
            }
            RunStatus::Completed { .. } => unreachable!(),
        }
    }

    #[test]
    fn rejects_bad_schedules() {
        let course = course();
        let rider = rider();
        let simulator = Simulator::new(&course, &rider);

        assert_eq!(
            simulator.run_schedule(&[200.0, 300.0]),
            Err(InvalidInput::ScheduleLength {
                expected: 3,
                got: 2
            })
        );
        assert_eq!(simulator.run(-10.0), Err(InvalidInput::Power(-10.0)));
        assert!(simulator.run(f64::NAN).is_err());
    }

    #[test]
    fn free_function_matches_simulator() {
        let course = course();
        let rider = rider();

        let direct = simulate(275.0, course.segments(), &rider).unwrap();
        let via_model = Simulator::new(&course, &rider).call(&275.0).unwrap();

        assert_eq!(direct, via_model);
        assert_eq!(simulate(275.0, &[], &rider), Err(InvalidInput::EmptyCourse));
    }
}
