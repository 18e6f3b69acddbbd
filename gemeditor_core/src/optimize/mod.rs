//! Interface to the flux balance solver used when running model tests
//!
//! Solving itself is done by an external linear programming library, this module only defines
//! what is handed to it and what comes back.
use indexmap::IndexMap;
use thiserror::Error;

use crate::metabolic_model::model::Model;

/// Struct representing the solution of a flux balance problem
#[derive(Clone, Debug, PartialEq)]
pub struct ProblemSolution {
    /// The status of the optimization problem, representing if the optimization was
    /// completed successfully
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    ///
    /// Some(f64) if the optimization was completed successfully, None otherwise
    pub objective_value: Option<f64>,
    /// Flux through each reaction at the optimum, keyed by reaction id
    ///
    /// None if the problem could not be solved
    pub fluxes: Option<IndexMap<String, f64>>,
}

impl ProblemSolution {
    /// Create an optimal solution from the fluxes
    pub fn optimal(objective_value: f64, fluxes: IndexMap<String, f64>) -> ProblemSolution {
        ProblemSolution {
            status: OptimizationStatus::Optimal,
            objective_value: Some(objective_value),
            fluxes: Some(fluxes),
        }
    }

    /// Create a solution without values, e.g. for an infeasible problem
    pub fn failed(status: OptimizationStatus) -> ProblemSolution {
        ProblemSolution {
            status,
            objective_value: None,
            fluxes: None,
        }
    }

    /// Fluxes of the solution if it can be used to check outcomes
    pub fn usable_fluxes(&self) -> Option<&IndexMap<String, f64>> {
        match self.status {
            OptimizationStatus::Optimal => self.fluxes.as_ref(),
            _ => None,
        }
    }
}

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OptimizationStatus {
    /// Problem has been optimized
    Optimal,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
    /// A numerical error occurred during solving
    NumericalError,
    /// The solver hit the maximum allowed iterations, or max time, or made insufficient progress
    SolverHalted,
}

/// Errors raised by a solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The problem could not be built from the model
    #[error("Failed to build the optimization problem: {0}")]
    ProblemConstruction(String),
    /// The solver itself failed
    #[error("Solver failed: {0}")]
    Failed(String),
}

/// Anything able to run a flux balance analysis on the current state of a model
pub trait Solver {
    /// Optimize the objective of the model under its current bounds and gene states
    fn optimize(&mut self, model: &Model) -> Result<ProblemSolution, SolverError>;
}
