//! Batch execution of model tests against a solver
use indexmap::IndexMap;
use thiserror::Error;

use crate::metabolic_model::keys::ModelTestKey;
use crate::metabolic_model::model::{Model, ModelError};
use crate::model_test::{ModelTest, ReactionSetting, Setting};
use crate::optimize::{ProblemSolution, Solver, SolverError};

/// Receiver of progress updates with a cooperative cancellation flag
pub trait Progress {
    /// Checked before each test, a running solver call is never interrupted
    fn is_cancelled(&self) -> bool;
    fn set_value(&mut self, value: usize);
    fn set_maximum(&mut self, maximum: usize);
}

/// Progress receiver ignoring every update
#[derive(Copy, Clone, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn is_cancelled(&self) -> bool {
        false
    }

    fn set_value(&mut self, _value: usize) {}

    fn set_maximum(&mut self, _maximum: usize) {}
}

/// Result of a single model test
#[derive(Clone, Debug, PartialEq)]
pub struct TestResult {
    /// True if the solution was usable and every outcome holds
    pub passed: bool,
    pub solution: ProblemSolution,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TestRunError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Settings putting the model into a neutral state for testing
///
/// Pure consumption boundaries are restricted to production, pure production boundaries to
/// consumption. Any other reaction in the objective keeps its bounds but leaves the objective.
/// Reactions without metabolites are never treated as boundaries.
pub fn get_original_settings(model: &Model) -> Vec<ReactionSetting> {
    let mut settings = Vec::new();
    for (key, reaction) in model.reactions() {
        let coefficients = reaction.metabolites();
        let filled = !coefficients.is_empty();
        if filled && coefficients.values().all(|c| *c < 0.) {
            settings.push(ReactionSetting::new(*key, 0., reaction.upper_bound, 0.));
        } else if filled && coefficients.values().all(|c| *c > 0.) {
            settings.push(ReactionSetting::new(*key, reaction.lower_bound, 0., 0.));
        } else if reaction.objective_coefficient != 0. {
            settings.push(ReactionSetting::new(
                *key,
                reaction.lower_bound,
                reaction.upper_bound,
                0.,
            ));
        }
    }
    settings
}

/// Undo settings in reverse order of application
fn undo_all(settings: &mut [Setting], model: &mut Model) {
    for setting in settings.iter_mut().rev() {
        setting.undo(model);
    }
}

/// Apply settings in order, on failure the ones already applied are undone again
fn apply_all(settings: &mut [Setting], model: &mut Model) -> Result<(), ModelError> {
    for index in 0..settings.len() {
        if let Err(err) = settings[index].apply(model) {
            undo_all(&mut settings[..index], model);
            return Err(err);
        }
    }
    Ok(())
}

fn run_single(
    test: &ModelTest,
    model: &mut Model,
    solver: &mut dyn Solver,
) -> Result<TestResult, TestRunError> {
    let mut settings = test.all_settings();
    apply_all(&mut settings, model)?;
    let solution = solver.optimize(model);
    undo_all(&mut settings, model);
    let solution = solution?;

    let passed = match solution.usable_fluxes() {
        Some(fluxes) => test.outcomes.iter().all(|o| o.check(model, fluxes)),
        None => false,
    };
    tracing::debug!(test = %test.id, passed, status = ?solution.status, "model test finished");
    Ok(TestResult { passed, solution })
}

/// Run the given tests one after another
///
/// The model is put into a neutral state once for the whole batch, every test layers its own
/// settings on top of it and removes them again after solving. When the call returns, all
/// bounds, objective coefficients and gene states are back to their values before the call,
/// also if an error is returned or the run is cancelled.
///
/// # Examples
/// ```rust
/// use gemeditor_core::metabolic_model::model::Model;
/// use gemeditor_core::model_test::runner::{run_tests, NoProgress};
/// use gemeditor_core::optimize::{OptimizationStatus, ProblemSolution, Solver, SolverError};
///
/// struct Infeasible;
///
/// impl Solver for Infeasible {
///     fn optimize(&mut self, _model: &Model) -> Result<ProblemSolution, SolverError> {
///         Ok(ProblemSolution::failed(OptimizationStatus::Infeasible))
///     }
/// }
///
/// let mut model = Model::new_empty();
/// let results = run_tests(&[], &mut model, &mut Infeasible, &mut NoProgress).unwrap();
/// assert!(results.is_empty());
/// ```
pub fn run_tests(
    tests: &[ModelTestKey],
    model: &mut Model,
    solver: &mut dyn Solver,
    progress: &mut dyn Progress,
) -> Result<IndexMap<ModelTestKey, TestResult>, TestRunError> {
    let cases = tests
        .iter()
        .map(|key| model.test(*key).cloned())
        .collect::<Result<Vec<ModelTest>, ModelError>>()?;

    let mut neutral: Vec<Setting> = get_original_settings(model)
        .into_iter()
        .map(Setting::Reaction)
        .collect();
    apply_all(&mut neutral, model)?;
    tracing::debug!(settings = neutral.len(), "model put into neutral state");

    progress.set_maximum(cases.len());
    let mut results = IndexMap::new();
    for (index, (key, test)) in tests.iter().zip(cases.iter()).enumerate() {
        if progress.is_cancelled() {
            tracing::debug!(completed = index, "test run cancelled");
            break;
        }
        progress.set_value(index);
        match run_single(test, model, solver) {
            Ok(result) => {
                results.insert(*key, result);
            }
            Err(err) => {
                undo_all(&mut neutral, model);
                return Err(err);
            }
        }
    }
    progress.set_value(results.len());

    undo_all(&mut neutral, model);
    Ok(results)
}
