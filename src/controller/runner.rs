//! Stepwise run driver.

use super::types::{
    Algorithm, AlgorithmKind, CancelToken, RunDetail, RunOutcome, RunState, StepOutcome,
    StepProgress,
};
use crate::aco::AcoRunner;
use crate::error::{TspError, TspResult};
use crate::ga::GaRunner;
use crate::geometry::CityMap;
use crate::random::{create_rng, entropy_rng};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info};

/// Engine state of the active run.
#[derive(Debug)]
enum ActiveRun {
    Genetic(GaRunner),
    AntColony(AcoRunner),
}

impl ActiveRun {
    fn kind(&self) -> AlgorithmKind {
        match self {
            ActiveRun::Genetic(_) => AlgorithmKind::Genetic,
            ActiveRun::AntColony(_) => AlgorithmKind::AntColony,
        }
    }

    fn is_done(&self) -> bool {
        match self {
            ActiveRun::Genetic(runner) => runner.is_done(),
            ActiveRun::AntColony(runner) => runner.is_done(),
        }
    }
}

/// Drives one GA or ACO run as a sequence of discrete steps.
///
/// At most one run is active at a time. Each [`step`](Self::step) first
/// checks the cancel flag, then advances the engine by one generation or
/// iteration and appends one value to the best-distance series. The call
/// that runs the last configured step returns [`StepOutcome::Finished`] and
/// leaves the controller [`RunState::Completed`]; a completed GA run is
/// refined with 2-opt and Simulated Annealing at that point.
///
/// # Usage
///
/// ```
/// use u_tsp::aco::AcoConfig;
/// use u_tsp::controller::{Algorithm, RunController, RunState, StepOutcome};
/// use u_tsp::geometry::CityMap;
///
/// let mut controller = RunController::seeded(3);
/// let config = AcoConfig::default().with_num_ants(8).with_iterations(5);
/// controller.start(Algorithm::AntColony(config), &CityMap::demo()).unwrap();
///
/// loop {
///     match controller.step().unwrap() {
///         StepOutcome::Progress(p) => {
///             assert!(p.best.distance() <= p.current_best.distance())
///         }
///         StepOutcome::Finished(outcome) => {
///             assert_eq!(outcome.state, RunState::Completed);
///             assert_eq!(outcome.series.len(), 5);
///             break;
///         }
///     }
/// }
/// assert!(!controller.is_running());
/// ```
#[derive(Debug)]
pub struct RunController<R: Rng = StdRng> {
    rng: R,
    state: RunState,
    active: Option<ActiveRun>,
    cancel: CancelToken,
    total_steps: usize,
    series: Vec<f64>,
}

impl RunController<StdRng> {
    /// Controller with an entropy-seeded generator.
    pub fn new() -> Self {
        Self::with_rng(entropy_rng())
    }

    /// Controller whose runs are reproducible for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(create_rng(seed))
    }
}

impl Default for RunController<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RunController<R> {
    /// Controller drawing every random decision from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            state: RunState::Idle,
            active: None,
            cancel: CancelToken::new(),
            total_steps: 0,
            series: Vec::new(),
        }
    }

    /// Starts a run over `cities`.
    ///
    /// # Errors
    ///
    /// - [`TspError::AlreadyRunning`] if a run is active; that run is left
    ///   untouched.
    /// - [`TspError::InsufficientCities`] or [`TspError::InvalidParameter`]
    ///   from the engine; the controller state is left unchanged.
    pub fn start(&mut self, algorithm: Algorithm, cities: &CityMap) -> TspResult<()> {
        if self.is_running() {
            return Err(TspError::AlreadyRunning);
        }

        let total_steps = algorithm.total_steps();
        let active = match algorithm {
            Algorithm::Genetic(config) => {
                ActiveRun::Genetic(GaRunner::new(cities, config, &mut self.rng)?)
            }
            Algorithm::AntColony(config) => {
                ActiveRun::AntColony(AcoRunner::new(cities, config)?)
            }
        };

        info!(
            algorithm = %active.kind(),
            cities = cities.len(),
            steps = total_steps,
            "run started"
        );

        self.active = Some(active);
        self.state = RunState::Running;
        self.cancel = CancelToken::new();
        self.total_steps = total_steps;
        self.series = Vec::with_capacity(total_steps);
        Ok(())
    }

    /// Requests cancellation of the active run.
    ///
    /// The request is honored at the start of the next [`step`](Self::step).
    /// Returns `false` if no run is active.
    pub fn cancel(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        debug!("cancel requested");
        self.cancel.cancel();
        true
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Stop flag of the current run, for cancelling from elsewhere.
    ///
    /// Every [`start`](Self::start) creates a fresh token, so a token from an
    /// earlier run cannot cancel a later one.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Best-distance series of the current or most recent run.
    pub fn series(&self) -> &[f64] {
        &self.series
    }

    /// Advances the active run by one step.
    ///
    /// # Errors
    ///
    /// [`TspError::NoActiveRun`] if nothing is running.
    pub fn step(&mut self) -> TspResult<StepOutcome> {
        if !self.is_running() {
            return Err(TspError::NoActiveRun);
        }
        let Some(mut active) = self.active.take() else {
            return Err(TspError::NoActiveRun);
        };

        if self.cancel.is_cancelled() {
            return self
                .conclude(active, RunState::Cancelled, None)
                .map(StepOutcome::Finished);
        }

        let total_steps = self.total_steps;
        let progress = match &mut active {
            ActiveRun::Genetic(runner) => {
                runner.step(&mut self.rng).map(|stats| StepProgress {
                    algorithm: AlgorithmKind::Genetic,
                    step: stats.generation,
                    total_steps,
                    series_value: stats.best.distance(),
                    current_best: stats.best,
                    best: runner.best().clone(),
                })
            }
            ActiveRun::AntColony(runner) => {
                runner.step(&mut self.rng).map(|stats| StepProgress {
                    algorithm: AlgorithmKind::AntColony,
                    step: stats.iteration,
                    total_steps,
                    series_value: stats.best.distance(),
                    current_best: stats.iteration_best,
                    best: stats.best,
                })
            }
        };
        if let Some(progress) = &progress {
            self.series.push(progress.series_value);
        }

        match progress {
            Some(progress) if !active.is_done() => {
                self.active = Some(active);
                Ok(StepOutcome::Progress(progress))
            }
            last_step => self
                .conclude(active, RunState::Completed, last_step)
                .map(StepOutcome::Finished),
        }
    }

    /// Steps until the run finishes, reporting every step to `on_progress`.
    pub fn run_to_end<F>(&mut self, mut on_progress: F) -> TspResult<RunOutcome>
    where
        F: FnMut(&StepProgress),
    {
        loop {
            match self.step()? {
                StepOutcome::Progress(progress) => on_progress(&progress),
                StepOutcome::Finished(outcome) => {
                    if let Some(progress) = &outcome.last_step {
                        on_progress(progress);
                    }
                    return Ok(outcome);
                }
            }
        }
    }

    fn conclude(
        &mut self,
        active: ActiveRun,
        state: RunState,
        last_step: Option<StepProgress>,
    ) -> TspResult<RunOutcome> {
        let algorithm = active.kind();
        let detail = match (active, state) {
            (ActiveRun::Genetic(runner), RunState::Completed) => {
                match runner.finish(&mut self.rng) {
                    Ok(result) => RunDetail::Genetic(result),
                    Err(e) => {
                        self.state = RunState::Idle;
                        return Err(e);
                    }
                }
            }
            (ActiveRun::Genetic(runner), _) => RunDetail::Genetic(runner.cancel()),
            (ActiveRun::AntColony(runner), RunState::Completed) => {
                RunDetail::AntColony(runner.finish())
            }
            (ActiveRun::AntColony(runner), _) => RunDetail::AntColony(runner.cancel()),
        };

        let (best, steps) = match &detail {
            RunDetail::Genetic(result) => (Some(result.best().clone()), result.generations),
            RunDetail::AntColony(result) => (result.best.clone(), result.iterations),
        };

        self.state = state;
        info!(
            algorithm = %algorithm,
            state = ?state,
            steps,
            best = best.as_ref().map(|t| t.distance()),
            "run finished"
        );

        Ok(RunOutcome {
            algorithm,
            state,
            steps,
            best,
            detail,
            series: self.series.clone(),
            last_step,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aco::AcoConfig;
    use crate::ga::GaConfig;

    fn small_ga(generations: usize) -> Algorithm {
        Algorithm::Genetic(
            GaConfig::default()
                .with_population_size(20)
                .with_generations(generations),
        )
    }

    fn small_aco(iterations: usize) -> Algorithm {
        Algorithm::AntColony(
            AcoConfig::default()
                .with_num_ants(6)
                .with_iterations(iterations),
        )
    }

    fn progress(outcome: StepOutcome) -> StepProgress {
        match outcome {
            StepOutcome::Progress(p) => p,
            StepOutcome::Finished(o) => panic!("run finished early: {:?}", o.state),
        }
    }

    fn finished(outcome: StepOutcome) -> RunOutcome {
        match outcome {
            StepOutcome::Finished(o) => o,
            StepOutcome::Progress(p) => panic!("run still going at step {}", p.step),
        }
    }

    #[test]
    fn test_starts_idle() {
        let controller = RunController::seeded(1);
        assert_eq!(controller.state(), RunState::Idle);
        assert!(!controller.is_running());
        assert!(controller.series().is_empty());
    }

    #[test]
    fn test_step_without_run_fails() {
        let mut controller = RunController::seeded(1);
        assert_eq!(controller.step().unwrap_err(), TspError::NoActiveRun);
        assert!(!controller.cancel());
    }

    #[test]
    fn test_ga_steps_then_completes_with_refinement() {
        let mut controller = RunController::seeded(5);
        controller.start(small_ga(4), &CityMap::demo()).unwrap();
        assert!(controller.is_running());

        for i in 0..3 {
            let p = progress(controller.step().unwrap());
            assert_eq!(p.algorithm, AlgorithmKind::Genetic);
            assert_eq!(p.step, i);
            assert_eq!(p.total_steps, 4);
            assert!(p.best.distance() <= p.current_best.distance());
            assert_eq!(controller.series().len(), i + 1);
        }

        // The fourth generation exhausts the run in the same call.
        let outcome = finished(controller.step().unwrap());
        assert_eq!(outcome.state, RunState::Completed);
        assert_eq!(outcome.steps, 4);
        assert_eq!(outcome.series.len(), 4);
        assert_eq!(outcome.last_step.as_ref().map(|p| p.step), Some(3));
        assert_eq!(controller.state(), RunState::Completed);
        assert!(!controller.is_running());

        let RunDetail::Genetic(result) = &outcome.detail else {
            panic!("expected GA detail");
        };
        let refined = result.refined.as_ref().unwrap();
        assert!(refined.distance() <= result.raw_best.distance());
        assert_eq!(outcome.best.as_ref(), Some(refined));
    }

    #[test]
    fn test_cancel_after_last_step_keeps_refinement() {
        let mut controller = RunController::seeded(12);
        controller.start(small_ga(2), &CityMap::demo()).unwrap();
        progress(controller.step().unwrap());
        let outcome = finished(controller.step().unwrap());

        assert_eq!(controller.state(), RunState::Completed);
        assert!(!controller.cancel());
        assert_eq!(controller.state(), RunState::Completed);
        assert_eq!(controller.step().unwrap_err(), TspError::NoActiveRun);

        assert_eq!(outcome.state, RunState::Completed);
        let RunDetail::Genetic(result) = outcome.detail else {
            panic!("expected GA detail");
        };
        assert!(!result.cancelled);
        assert!(result.two_opt.is_some());
        assert!(result.refined.is_some());
    }

    #[test]
    fn test_single_step_run_finishes_immediately() {
        let mut controller = RunController::seeded(13);
        controller.start(small_aco(1), &CityMap::demo()).unwrap();
        let mut seen = 0;
        let outcome = controller.run_to_end(|_| seen += 1).unwrap();
        assert_eq!(seen, 1);
        assert_eq!(outcome.state, RunState::Completed);
        assert_eq!(outcome.series.len(), 1);
    }

    #[test]
    fn test_second_start_rejected_and_first_run_untouched() {
        let cities = CityMap::demo();
        let mut controller = RunController::seeded(9);
        controller.start(small_ga(10), &cities).unwrap();
        controller.step().unwrap();
        controller.step().unwrap();
        let before = controller.series().to_vec();

        assert_eq!(
            controller.start(small_aco(5), &cities).unwrap_err(),
            TspError::AlreadyRunning
        );
        assert_eq!(controller.state(), RunState::Running);
        assert_eq!(controller.series(), before.as_slice());

        let p = progress(controller.step().unwrap());
        assert_eq!(p.algorithm, AlgorithmKind::Genetic);
        assert_eq!(p.step, 2);
    }

    #[test]
    fn test_cancel_keeps_accumulated_series() {
        let mut controller = RunController::seeded(2);
        controller.start(small_ga(50), &CityMap::demo()).unwrap();
        for _ in 0..3 {
            controller.step().unwrap();
        }
        assert!(controller.cancel());
        assert!(controller.is_running());

        let outcome = finished(controller.step().unwrap());
        assert_eq!(outcome.state, RunState::Cancelled);
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.steps, 3);
        assert_eq!(outcome.series.len(), 3);
        assert!(!controller.is_running());

        let RunDetail::Genetic(result) = outcome.detail else {
            panic!("expected GA detail");
        };
        assert!(result.cancelled);
        assert!(result.two_opt.is_none());
        assert!(result.refined.is_none());

        assert_eq!(controller.step().unwrap_err(), TspError::NoActiveRun);
    }

    #[test]
    fn test_cancel_token_from_outside() {
        let mut controller = RunController::seeded(4);
        controller.start(small_aco(20), &CityMap::demo()).unwrap();
        controller.step().unwrap();

        let token = controller.cancel_token();
        std::thread::spawn(move || token.cancel()).join().unwrap();

        let outcome = finished(controller.step().unwrap());
        assert_eq!(outcome.state, RunState::Cancelled);
        assert_eq!(outcome.series.len(), 1);
    }

    #[test]
    fn test_old_token_does_not_cancel_new_run() {
        let cities = CityMap::demo();
        let mut controller = RunController::seeded(4);
        controller.start(small_aco(2), &cities).unwrap();
        let stale = controller.cancel_token();
        controller.run_to_end(|_| {}).unwrap();

        controller.start(small_aco(2), &cities).unwrap();
        stale.cancel();
        let outcome = controller.run_to_end(|_| {}).unwrap();
        assert_eq!(outcome.state, RunState::Completed);
    }

    #[test]
    fn test_start_errors_leave_state() {
        let mut controller = RunController::seeded(1);
        let two = CityMap::from_pairs([("A", 0.0, 0.0), ("B", 1.0, 1.0)]).unwrap();

        assert_eq!(
            controller.start(small_ga(5), &two).unwrap_err(),
            TspError::InsufficientCities { required: 3, actual: 2 }
        );
        assert_eq!(controller.state(), RunState::Idle);

        let bad = Algorithm::Genetic(GaConfig::default().with_mutation_rate(1.5));
        assert!(matches!(
            controller.start(bad, &CityMap::demo()),
            Err(TspError::InvalidParameter(_))
        ));
        assert_eq!(controller.state(), RunState::Idle);

        // ACO accepts two cities.
        controller.start(small_aco(3), &two).unwrap();
        assert!(controller.is_running());
    }

    #[test]
    fn test_aco_series_is_running_best() {
        let mut controller = RunController::seeded(8);
        controller.start(small_aco(25), &CityMap::demo()).unwrap();

        let mut reported = Vec::new();
        let outcome = controller.run_to_end(|p| reported.push(p.series_value)).unwrap();

        assert_eq!(outcome.state, RunState::Completed);
        assert_eq!(outcome.series, reported);
        for w in outcome.series.windows(2) {
            assert!(w[1] <= w[0]);
        }
        assert_eq!(outcome.best_distance(), outcome.series.last().copied());
    }

    #[test]
    fn test_restart_after_completion_resets_series() {
        let cities = CityMap::demo();
        let mut controller = RunController::seeded(6);
        controller.start(small_aco(4), &cities).unwrap();
        controller.run_to_end(|_| {}).unwrap();
        assert_eq!(controller.series().len(), 4);

        controller.start(small_ga(2), &cities).unwrap();
        assert!(controller.series().is_empty());
        let outcome = controller.run_to_end(|_| {}).unwrap();
        assert_eq!(outcome.algorithm, AlgorithmKind::Genetic);
        assert_eq!(outcome.series.len(), 2);
    }

    #[test]
    fn test_seeded_controllers_agree() {
        let cities = CityMap::demo();
        let run = |seed| {
            let mut controller = RunController::seeded(seed);
            controller.start(small_ga(15), &cities).unwrap();
            controller.run_to_end(|_| {}).unwrap()
        };
        let a = run(77);
        let b = run(77);
        assert_eq!(a.series, b.series);
        assert_eq!(a.best, b.best);
    }
}
