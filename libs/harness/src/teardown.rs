//! Best-effort resource deletion.
//!
//! Teardown never fails the caller: each deletion is bounded by a timeout,
//! failures are logged and returned as values, and one failing handle does
//! not stop the rest.

use std::sync::Arc;
use std::time::Duration;

use cfat_platform::Platform;
use tracing::{debug, info, instrument, warn};

use crate::error::{ExternalError, TeardownError};
use crate::handle::{HandleState, ResourceHandle};

/// What a single teardown call did.
#[derive(Debug)]
pub enum TeardownOutcome {
    /// This call deleted the resource.
    Destroyed,

    /// This call attempted the deletion and it failed. The handle is still
    /// `TornDown`; deletion is not retried.
    Failed(TeardownError),

    /// Another call already tore the handle down.
    AlreadyTornDown,

    /// The handle never reached `Provisioned`; there is nothing to delete.
    NeverProvisioned,
}

impl TeardownOutcome {
    pub fn into_error(self) -> Option<TeardownError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[instrument(skip_all, fields(handle = %handle.id(), kind = %handle.kind(), name = %handle.name()))]
pub(crate) async fn teardown_handle(
    handle: &ResourceHandle,
    platform: &Platform,
    timeout: Duration,
) -> TeardownOutcome {
    let previous = match handle.claim_teardown() {
        Some(state) => state,
        None if handle.state() == HandleState::Requested => {
            debug!("Handle was never provisioned; nothing to tear down");
            return TeardownOutcome::NeverProvisioned;
        }
        None => {
            debug!("Handle already torn down");
            return TeardownOutcome::AlreadyTornDown;
        }
    };

    let destroy = handle
        .resource()
        .destroy(handle.name(), handle.guid(), platform);

    let cause = match tokio::time::timeout(timeout, destroy).await {
        Ok(Ok(())) => {
            info!(uses = handle.uses(), previous = ?previous, "Resource torn down");
            return TeardownOutcome::Destroyed;
        }
        Ok(Err(cause)) => cause,
        Err(_) => ExternalError::TimedOut(timeout),
    };

    let err = TeardownError {
        handle: handle.id(),
        kind: handle.kind(),
        name: handle.name().to_string(),
        cause,
    };
    warn!(error = %err, "Teardown failed; continuing");
    TeardownOutcome::Failed(err)
}

/// Tears down `handles` newest first, collecting failures.
pub(crate) async fn teardown_in_reverse(
    handles: &[Arc<ResourceHandle>],
    platform: &Platform,
    timeout: Duration,
) -> Vec<TeardownError> {
    let mut failures = Vec::new();

    for handle in handles.iter().rev() {
        if handle.state() == HandleState::Requested {
            warn!(
                handle = %handle.id(),
                kind = %handle.kind(),
                name = %handle.name(),
                "Creation was interrupted; the resource may have been left behind"
            );
            continue;
        }
        if let Some(err) = teardown_handle(handle, platform, timeout).await.into_error() {
            failures.push(err);
        }
    }

    if !failures.is_empty() {
        warn!(failed = failures.len(), total = handles.len(), "Teardown finished with failures");
    }

    failures
}
