//! Per-stage error isolation
//!
//! Converts an escaped stage failure into an ordinary assistant turn instead
//! of letting it abort the pipeline. Composed outside the retry wrapper:
//! retries run first, and only a stage whose retries are exhausted reaches
//! this net. With isolation in place a wrapped stage cannot fail, only
//! answer apologetically, so the pipeline always terminates with
//! exactly one new assistant turn.

use sdk::types::Turn;
use std::future::Future;
use tracing::error;

/// Await a stage, absorbing any failure into an apology turn.
///
/// The turn content is the stage-specific `prefix` followed by the error's
/// description, never a raw backtrace.
pub async fn isolate<E, F>(prefix: &str, stage: F) -> Turn
where
    F: Future<Output = Result<Turn, E>>,
    E: std::fmt::Display,
{
    match stage.await {
        Ok(turn) => turn,
        Err(e) => {
            error!(prefix, error = %e, "Stage failed, answering with apology turn");
            Turn::assistant(format!("{prefix}: {e}"))
        }
    }
}
