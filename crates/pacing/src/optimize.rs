//! Constant-power search.
//!
//! The optimizer looks for the constant power that minimizes finish time
//! while spending a target fraction of the energy reserve. It drives the
//! [`Simulator`] through two tiers:
//!
//! 1. **Primary**: golden-section search on each of `seeds` equal
//!    sub-brackets of the power bounds. Each seed gets an equal share of the
//!    evaluation budget; running out of budget returns the best point so far.
//! 2. **Fallback**: when no seed lands on a feasible power, a grid scan over
//!    the full bounds picks the best feasible grid point.
//!
//! Only when both tiers fail is [`OptimizeError::NoFeasiblePower`] returned.

mod config;

pub use config::{ConfigError, OptimizerConfig, PowerBounds};

use std::convert::Infallible;
use std::error::Error as StdError;

use pacer_core::MinimizationProblem;
use pacer_solvers::{
    Tolerance,
    optimization::{golden_section, grid},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    AnalyzeError, Course, InvalidInput, PacingMetrics, RiderParameters, RunStatus, Segment,
    SimulationRun, Simulator, analyze,
};

/// Base objective for a run that exhausts the reserve, s.
///
/// Larger than any feasible objective the optimizer can produce.
pub const FAILURE_PENALTY: f64 = 1.0e9;

/// Objective added per watt above the lower bound for failing runs, s/W.
pub const PENALTY_SLOPE: f64 = 1.0e3;

/// Which tier produced the chosen power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMethod {
    Primary,
    Fallback,
}

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("invalid optimizer configuration: {0}")]
    Config(#[from] ConfigError),

    /// Every power in the bounds exhausts the reserve.
    #[error("no power in [{lower:.1}, {upper:.1}] W finishes the course")]
    NoFeasiblePower { lower: f64, upper: f64 },

    #[error("power search failed: {0}")]
    Solver(#[source] Box<dyn StdError + Send + Sync>),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),
}

impl From<golden_section::Error> for OptimizeError {
    fn from(err: golden_section::Error) -> Self {
        Self::Solver(Box::new(err))
    }
}

impl From<grid::Error> for OptimizeError {
    fn from(err: grid::Error) -> Self {
        Self::Solver(Box::new(err))
    }
}

/// The objective minimized over candidate powers.
///
/// A completed run scores its finish time plus
/// `utilization_weight · (achieved − target)²`. A run that exhausts the
/// reserve scores `FAILURE_PENALTY + PENALTY_SLOPE · (power − lower_bound)`,
/// which is finite and grows with power so failing candidates still rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingObjective {
    target_utilization: f64,
    utilization_weight: f64,
    lower_bound: f64,
}

impl PacingObjective {
    #[must_use]
    pub fn new(target_utilization: f64, utilization_weight: f64, lower_bound: f64) -> Self {
        Self {
            target_utilization,
            utilization_weight,
            lower_bound,
        }
    }

    /// Scores a run produced at `power`.
    #[must_use]
    pub fn score(&self, power: f64, run: &SimulationRun) -> f64 {
        match run.status {
            RunStatus::Completed { total_time } => {
                let miss = run.utilization() - self.target_utilization;
                total_time + self.utilization_weight * miss * miss
            }
            RunStatus::Exhausted { .. } => {
                FAILURE_PENALTY + PENALTY_SLOPE * (power - self.lower_bound)
            }
        }
    }
}

impl MinimizationProblem<1> for PacingObjective {
    type Input = f64;
    type Output = SimulationRun;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<f64, Self::Error> {
        Ok(x[0])
    }

    fn objective(&self, power: &f64, run: &SimulationRun) -> Result<f64, Self::Error> {
        Ok(self.score(*power, run))
    }
}

/// The chosen constant power and everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub power: f64,
    pub run: SimulationRun,
    pub target_utilization: f64,
    pub achieved_utilization: f64,
    /// Allowed undershoot before a result counts as conservative.
    pub utilization_tolerance: f64,
    pub method: SearchMethod,
    /// Simulations run across both tiers.
    pub evaluations: usize,
    pub metrics: PacingMetrics,
}

impl OptimizationResult {
    /// True when the chosen power spends noticeably less of the reserve than
    /// requested, typically because the bounds cap the power.
    #[must_use]
    pub fn is_conservative(&self) -> bool {
        self.achieved_utilization < self.target_utilization - self.utilization_tolerance
    }

    /// Finish time at the chosen power.
    #[must_use]
    pub fn total_time(&self) -> Option<f64> {
        self.run.total_time()
    }
}

/// Runs the two-tier power search.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    #[must_use]
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Finds the best constant power for `course` and `rider`.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::NoFeasiblePower`] if neither tier finds a
    /// power that finishes, or [`OptimizeError::Solver`] if a search fails.
    pub fn optimize(
        &self,
        course: &Course,
        rider: &RiderParameters,
    ) -> Result<OptimizationResult, OptimizeError> {
        let config = &self.config;
        let [lower, upper] = config.bounds(rider.critical_power());
        let simulator = Simulator::new(course, rider);
        let objective = PacingObjective::new(
            config.target_utilization(),
            config.utilization_weight(),
            lower,
        );

        let seeds = seed_brackets(lower, upper, config.seeds());
        let budget = config.max_evaluations() / config.seeds();
        let power_tol = Tolerance::absolute(config.power_tolerance())
            .map_err(|_| ConfigError::PowerTolerance(config.power_tolerance()))?;
        let search = golden_section::Config::new(budget, power_tol);

        let outcomes = search_seeds(&simulator, &objective, &seeds, &search, budget)?;

        let mut evaluations = 0;
        let mut best: Option<golden_section::Solution<f64, SimulationRun>> = None;
        for (index, solution) in outcomes.into_iter().enumerate() {
            evaluations += solution.evaluations;
            let feasible = solution.snapshot.output.is_completed();
            log::debug!(
                "seed {index} [{:.1}, {:.1}] W: {:.2} W, objective {:.3}, {:?}, feasible {feasible}",
                seeds[index][0],
                seeds[index][1],
                solution.x,
                solution.objective,
                solution.status,
            );

            if feasible
                && best
                    .as_ref()
                    .is_none_or(|best| solution.objective < best.objective)
            {
                best = Some(solution);
            }
        }

        let (power, run, method) = if let Some(best) = best {
            (best.x, best.snapshot.output, SearchMethod::Primary)
        } else {
            log::info!(
                "no seed found a feasible power; scanning {} points over [{lower:.1}, {upper:.1}] W",
                config.grid_points()
            );
            let scan = grid::scan(&simulator, &objective, [lower, upper], config.grid_points())?;
            evaluations += scan.evaluations;

            if !scan.snapshot.output.is_completed() {
                return Err(OptimizeError::NoFeasiblePower { lower, upper });
            }
            (scan.x, scan.snapshot.output, SearchMethod::Fallback)
        };

        let metrics = analyze(&run, course, rider, config.critical_segments())?;
        let achieved_utilization = run.utilization();
        log::info!(
            "chose {power:.1} W via {method:?}: utilization {achieved_utilization:.3} (target {:.3}), {evaluations} evaluations",
            config.target_utilization()
        );

        Ok(OptimizationResult {
            power,
            run,
            target_utilization: config.target_utilization(),
            achieved_utilization,
            utilization_tolerance: config.utilization_tolerance(),
            method,
            evaluations,
            metrics,
        })
    }
}

/// Finds the best constant power for `segments` with default settings and
/// the given target utilization.
///
/// # Errors
///
/// Returns an error if the inputs are invalid or no feasible power exists.
/// See [`Optimizer::optimize`].
pub fn optimize(
    segments: &[Segment],
    rider: &RiderParameters,
    target_utilization: f64,
) -> Result<OptimizationResult, OptimizeError> {
    let course = Course::new(segments.to_vec())?;
    let config = OptimizerConfig::default().with_target_utilization(target_utilization)?;
    Optimizer::new(config).optimize(&course, rider)
}

/// Splits `[lower, upper]` into `count` equal sub-brackets.
fn seed_brackets(lower: f64, upper: f64, count: usize) -> Vec<[f64; 2]> {
    #[allow(clippy::cast_precision_loss)]
    let width = (upper - lower) / count as f64;

    (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let left = lower + width * i as f64;
            let right = if i + 1 == count { upper } else { left + width };
            [left, right]
        })
        .collect()
}

type SeedResult = Result<golden_section::Solution<f64, SimulationRun>, golden_section::Error>;

fn search_seed(
    simulator: &Simulator<'_>,
    objective: &PacingObjective,
    bracket: [f64; 2],
    config: &golden_section::Config,
    budget: usize,
) -> SeedResult {
    golden_section::minimize(
        simulator,
        objective,
        bracket,
        config,
        |event: &golden_section::Event| {
            // The initial event already accounts for two evaluations.
            (event.iter + 2 >= budget).then_some(golden_section::Action::StopEarly)
        },
    )
}

#[cfg(not(feature = "parallel"))]
fn search_seeds(
    simulator: &Simulator<'_>,
    objective: &PacingObjective,
    seeds: &[[f64; 2]],
    config: &golden_section::Config,
    budget: usize,
) -> Result<Vec<golden_section::Solution<f64, SimulationRun>>, golden_section::Error> {
    seeds
        .iter()
        .map(|&bracket| search_seed(simulator, objective, bracket, config, budget))
        .collect()
}

#[cfg(feature = "parallel")]
fn search_seeds(
    simulator: &Simulator<'_>,
    objective: &PacingObjective,
    seeds: &[[f64; 2]],
    config: &golden_section::Config,
    budget: usize,
) -> Result<Vec<golden_section::Solution<f64, SimulationRun>>, golden_section::Error> {
    use rayon::prelude::*;

    seeds
        .par_iter()
        .map(|&bracket| search_seed(simulator, objective, bracket, config, budget))
        .collect()
}
