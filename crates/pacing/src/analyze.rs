//! Summary metrics derived from a completed run.
//!
//! Everything here is arithmetic over an already-solved
//! [`SimulationRun`], cheap enough to recompute whenever the caller wants a
//! different number of critical segments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Course, RiderParameters, SimulationRun};

/// Number of critical segments reported by default.
pub const DEFAULT_CRITICAL_SEGMENTS: usize = 3;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeError {
    /// The run ended with the reserve exhausted.
    #[error("run exhausted the reserve on segment {segment_index}; no finish time to analyze")]
    Incomplete { segment_index: usize },
}

/// Whether a critical segment drew on or refilled the reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriticalKind {
    Depleting,
    Recovering,
}

/// A segment that moved the reserve the most.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalSegment {
    pub index: usize,
    pub kind: CriticalKind,
    /// Joules used or recovered.
    pub energy: f64,
    pub reserve_after: f64,
}

/// Route-level totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub total_distance: f64,
    pub total_time: f64,
    pub average_speed: f64,
    pub elevation_gain: f64,
    /// Fraction of the reserve spent by the finish.
    pub utilization: f64,
    pub final_reserve: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingMetrics {
    /// Average power over critical power.
    pub normalized_effort: f64,
    /// `hours · effort² · 100`.
    pub training_load: f64,
    /// W/kg
    pub power_to_mass: f64,
    /// Ranked by energy moved, largest first; ties keep route order.
    pub critical_segments: Vec<CriticalSegment>,
    pub summary: CourseSummary,
}

/// Derives pacing metrics from a completed run.
///
/// The power used for the effort metrics is the run's time-weighted average
/// power, which is the prescribed power for constant-power runs.
///
/// # Errors
///
/// Returns [`AnalyzeError::Incomplete`] if the run exhausted the reserve.
pub fn analyze(
    run: &SimulationRun,
    course: &Course,
    rider: &RiderParameters,
    top_k: usize,
) -> Result<PacingMetrics, AnalyzeError> {
    let Some(total_time) = run.total_time() else {
        return Err(AnalyzeError::Incomplete {
            segment_index: run.failed_segment().unwrap_or_default(),
        });
    };

    let power = run.average_power();
    let normalized_effort = power / rider.critical_power();

    let mut ranked: Vec<_> = run
        .segments
        .iter()
        .map(|segment| CriticalSegment {
            index: segment.index,
            kind: if segment.reserve_delta < 0.0 {
                CriticalKind::Depleting
            } else {
                CriticalKind::Recovering
            },
            energy: segment.reserve_delta.abs(),
            reserve_after: segment.reserve_after,
        })
        .collect();
    ranked.sort_by(|a, b| b.energy.total_cmp(&a.energy).then(a.index.cmp(&b.index)));
    ranked.truncate(top_k);

    let total_distance = course.total_distance();
    Ok(PacingMetrics {
        normalized_effort,
        training_load: total_time / 3600.0 * normalized_effort.powi(2) * 100.0,
        power_to_mass: power / rider.mass(),
        critical_segments: ranked,
        summary: CourseSummary {
            total_distance,
            total_time,
            average_speed: total_distance / total_time,
            elevation_gain: course.elevation_gain(),
            utilization: run.utilization(),
            final_reserve: run.final_reserve,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::{Segment, Simulator};

    fn course() -> Course {
        Course::new(vec![
            Segment::new(2000.0, 0.0).unwrap(),
            Segment::new(1000.0, 0.06).unwrap(),
            Segment::new(1500.0, -0.04).unwrap(),
            Segment::new(1000.0, 0.06).unwrap(),
        ])
        .unwrap()
    }

    fn rider() -> RiderParameters {
        RiderParameters::new(300.0, 25_000.0, 72.0).unwrap()
    }

    #[test]
    fn effort_metrics_follow_power() {
        let course = course();
        let rider = rider();
        let run = Simulator::new(&course, &rider).run(330.0).unwrap();

        let metrics = analyze(&run, &course, &rider, 3).unwrap();

        let hours = run.total_time().unwrap() / 3600.0;
        assert_relative_eq!(metrics.normalized_effort, 1.1, epsilon = 1e-12);
        assert_relative_eq!(metrics.training_load, hours * 1.21 * 100.0, epsilon = 1e-9);
        assert_relative_eq!(metrics.power_to_mass, 330.0 / 72.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.summary.total_distance, 5500.0);
        assert_relative_eq!(
            metrics.summary.average_speed,
            5500.0 / run.total_time().unwrap()
        );
        assert_relative_eq!(metrics.summary.utilization, run.utilization());
    }

    #[test]
    fn critical_segments_rank_by_energy() {
        let course = course();
        let rider = rider();
        let run = Simulator::new(&course, &rider)
            .run_schedule(&[320.0, 360.0, 100.0, 360.0])
            .unwrap();

        let metrics = analyze(&run, &course, &rider, 10).unwrap();
        let critical = &metrics.critical_segments;

        assert_eq!(critical.len(), 4);
        for pair in critical.windows(2) {
            assert!(pair[0].energy >= pair[1].energy);
        }
        let descent = critical.iter().find(|c| c.index == 2).unwrap();
        assert_eq!(descent.kind, CriticalKind::Recovering);
        let depleting = critical
            .iter()
            .filter(|c| c.kind == CriticalKind::Depleting)
            .count();
        assert_eq!(depleting, 3);
    }

    #[test]
    fn ties_keep_route_order() {
        let course = Course::new(vec![Segment::new(1000.0, 0.0).unwrap(); 3]).unwrap();
        let rider = rider();
        let run = Simulator::new(&course, &rider).run(310.0).unwrap();

        let metrics = analyze(&run, &course, &rider, 2).unwrap();

        let order: Vec<_> = metrics.critical_segments.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn exhausted_run_is_rejected() {
        let course = course();
        let rider = RiderParameters::new(300.0, 2_000.0, 72.0).unwrap();
        let run = Simulator::new(&course, &rider).run(450.0).unwrap();

        assert_eq!(
            analyze(&run, &course, &rider, 3),
            Err(AnalyzeError::Incomplete { segment_index: 0 })
        );
    }
}
