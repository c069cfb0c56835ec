//! Asynchronous handle to a running minimisation.

use tokio::task::JoinHandle;

use crate::cancellation::CancellationToken;
use crate::error::OptimiserError;
use crate::minimizer::MinimizationReport;

/// Pending result of a minimisation running on tokio's blocking pool.
///
/// Dropping the handle detaches the run; it continues until it terminates
/// on its own or the token is cancelled.
///
/// # Example
///
/// ```
/// use linalg_core::Vector;
/// use linalg_optimiser::{problems, BfgsMinimizer, CancellationToken, Minimizer};
///
/// # #[tokio::main(flavor = "multi_thread", worker_threads = 1)]
/// # async fn main() {
/// let minimizer = BfgsMinimizer::new(problems::paraboloid());
/// let x0 = Vector::from_vec(vec![1.0, 4.0, -5.0]).unwrap();
///
/// let handle = minimizer.spawn(x0, CancellationToken::new());
/// let report = handle.join().await.unwrap();
/// assert!(report.termination.is_converged());
/// # }
/// ```
#[derive(Debug)]
pub struct MinimizationHandle {
    task: JoinHandle<Result<MinimizationReport, OptimiserError>>,
    token: CancellationToken,
}

impl MinimizationHandle {
    /// Run `job` on the blocking pool.
    pub(crate) fn spawn<F>(token: CancellationToken, job: F) -> Self
    where
        F: FnOnce() -> Result<MinimizationReport, OptimiserError> + Send + 'static,
    {
        Self {
            task: tokio::task::spawn_blocking(job),
            token,
        }
    }

    /// Request cancellation of the run.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token driving the run.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Whether the run has terminated.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the run to terminate.
    ///
    /// # Errors
    ///
    /// Returns the run's own error, or `OptimiserError::TaskFailed` if the
    /// task panicked.
    pub async fn join(self) -> Result<MinimizationReport, OptimiserError> {
        self.task
            .await
            .map_err(|e| OptimiserError::TaskFailed(e.to_string()))?
    }
}
