//! Controller inputs, states and per-step reports.

use crate::aco::{AcoConfig, AcoResult};
use crate::ga::{GaConfig, GaResult};
use crate::tour::Tour;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which engine a run uses, with its parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Genetic Algorithm, refined by 2-opt and SA on completion.
    Genetic(GaConfig),
    /// Ant Colony Optimization.
    AntColony(AcoConfig),
}

impl Algorithm {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Algorithm::Genetic(_) => AlgorithmKind::Genetic,
            Algorithm::AntColony(_) => AlgorithmKind::AntColony,
        }
    }

    /// Configured number of steps (generations or iterations).
    pub fn total_steps(&self) -> usize {
        match self {
            Algorithm::Genetic(config) => config.generations,
            Algorithm::AntColony(config) => config.iterations,
        }
    }
}

/// Engine tag without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlgorithmKind {
    Genetic,
    AntColony,
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmKind::Genetic => write!(f, "genetic algorithm"),
            AlgorithmKind::AntColony => write!(f, "ant colony optimization"),
        }
    }
}

/// Lifecycle of the controller's current run.
///
/// `Idle → Running` on start, `Running → Cancelled` when a cancel request is
/// seen at the start of a step, `Running → Completed` once every step ran.
/// A finished controller may start a new run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Cancelled,
    Completed,
}

/// Shared stop flag for one run.
///
/// Clones observe the same flag, so a token can be handed to another thread
/// or a UI callback while the controller keeps stepping.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Takes effect at the start of the next step.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// The underlying flag, in the form the engines' `run_with_cancel` take.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

/// Progress report for one completed step.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StepProgress {
    pub algorithm: AlgorithmKind,

    /// Zero-based index of the step that just ran.
    pub step: usize,

    /// Configured number of steps.
    pub total_steps: usize,

    /// Best tour of this step: the population best at the start of the
    /// generation (GA) or the best ant of the iteration (ACO).
    pub current_best: Tour,

    /// Best tour seen since the run started.
    pub best: Tour,

    /// Value appended to the best-distance series by this step.
    pub series_value: f64,
}

/// Engine-specific final result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RunDetail {
    Genetic(GaResult),
    AntColony(AcoResult),
}

/// Final report of a run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RunOutcome {
    pub algorithm: AlgorithmKind,

    /// [`RunState::Completed`] or [`RunState::Cancelled`].
    pub state: RunState,

    /// Number of steps executed.
    pub steps: usize,

    /// The reported tour. For a completed GA run this is the 2-opt + SA
    /// refinement of the final population's best.
    pub best: Option<Tour>,

    pub detail: RunDetail,

    /// One best distance per executed step.
    pub series: Vec<f64>,

    /// Report of the step that exhausted the run. `None` when cancelled.
    pub last_step: Option<StepProgress>,
}

impl RunOutcome {
    pub fn best_distance(&self) -> Option<f64> {
        self.best.as_ref().map(Tour::distance)
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == RunState::Cancelled
    }
}

/// What a call to [`RunController::step`](super::RunController::step)
/// produced.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StepOutcome {
    /// A step ran; the run is still active.
    Progress(StepProgress),
    /// The run ended with this call.
    Finished(RunOutcome),
}
