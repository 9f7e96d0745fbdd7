//! Constant-power pacing for cycling routes.
//!
//! A route is a [`Course`] of [`Segment`]s, each with a length, gradient,
//! altitude, and wind. A rider is described by [`RiderParameters`]: critical
//! power (CP), the anaerobic reserve W′, mass, and aerodynamic and rolling
//! resistance.
//!
//! The engine answers one question: which single power finishes the course
//! fastest while spending a target fraction of W′?
//!
//! - [`physics`] solves the steady speed a power sustains on a segment
//! - [`EnergyReserve`] tracks W′ as it is drawn down above CP and recovered
//!   below it
//! - [`Simulator`] rides a course at a power, chaining speed and reserve
//!   segment to segment
//! - [`Optimizer`] searches the power bounds for the fastest feasible power
//! - [`analyze()`] derives effort metrics and the most critical segments
//! - [`extrapolate()`] turns the coarse result into a continuous speed trace
//!   over dense route points
//!
//! ```no_run
//! use pacer::{Course, Optimizer, RiderParameters, Segment};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let course = Course::new(vec![
//!     Segment::new(5_000.0, 0.0)?,
//!     Segment::new(2_000.0, 0.06)?.with_altitude(150.0)?,
//! ])?;
//! let rider = RiderParameters::new(300.0, 20_000.0, 72.0)?;
//!
//! let result = Optimizer::default().optimize(&course, &rider)?;
//! println!("{:.0} W, {:?} s", result.power, result.total_time());
//! # Ok(())
//! # }
//! ```

pub mod analyze;
pub mod atmosphere;
pub mod energy;
pub mod extrapolate;
pub mod optimize;
pub mod physics;
pub mod rider;
pub mod simulate;

mod error;
mod segment;

pub use analyze::{
    AnalyzeError, CourseSummary, CriticalKind, CriticalSegment, PacingMetrics, analyze,
};
pub use atmosphere::Atmosphere;
pub use energy::{EnergyReserve, RecoveryModel, Transition};
pub use error::InvalidInput;
pub use extrapolate::{
    ExtrapolateError, ExtrapolationConfig, FinePoint, PowerSchedule, PowerSpan, extrapolate,
    extrapolate_schedule,
};
pub use optimize::{
    OptimizationResult, OptimizeError, Optimizer, OptimizerConfig, PacingObjective, PowerBounds,
    SearchMethod, optimize,
};
pub use physics::solve_speed;
pub use rider::{
    BikeType, CriticalPowerFit, Position, RiderParameters, RiderType, estimate_cda,
    fit_critical_power,
};
pub use segment::{Course, CoursePoint, MAX_GRADIENT, Segment};
pub use simulate::{RunStatus, SegmentResult, SimulationRun, Simulator, simulate};
