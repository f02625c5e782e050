//! Model-loaded predicate.
//!
//! The engine has no "is a model loaded" query, so this is inferred by
//! evaluating a reporter that is defined as soon as any model has been
//! loaded. `ticks` is unsuitable because it errors until `reset-ticks` runs.

use super::workspace::Workspace;
use tracing::debug;

/// Reporter used to detect a loaded model.
pub const PROBE_REPORTER: &str = "max-pxcor";

/// Whether the workspace currently has a model loaded.
pub fn model_loaded(workspace: &mut dyn Workspace) -> bool {
    match workspace.report(PROBE_REPORTER) {
        Ok(_) => true,
        Err(failure) => {
            debug!(reason = %failure, "model probe failed");
            false
        }
    }
}
