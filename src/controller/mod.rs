//! Stepwise driver for GA and ACO runs.
//!
//! A [`RunController`] owns at most one active run. The caller starts it,
//! calls [`step`](RunController::step) from its own loop (a UI tick, a
//! request handler, a CLI progress loop), and may request cancellation
//! between steps through [`cancel`](RunController::cancel) or a
//! [`CancelToken`]. Every step appends one value to the best-distance
//! series; the final [`RunOutcome`] carries the reported tour, the
//! engine-specific result and the full series.

mod runner;
mod types;

pub use runner::RunController;
pub use types::{
    Algorithm, AlgorithmKind, CancelToken, RunDetail, RunOutcome, RunState, StepOutcome,
    StepProgress,
};
