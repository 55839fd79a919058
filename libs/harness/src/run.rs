//! Running a test case under a deadline with guaranteed teardown.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cfat_id::TestCaseId;
use tokio::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

use crate::case::{Harness, TestCase};
use crate::error::{HarnessError, TeardownError};

/// Result of one test case, including any cleanup that went wrong.
#[derive(Debug)]
pub struct TestOutcome {
    pub case_id: TestCaseId,
    pub name: String,
    pub result: Result<(), HarnessError>,
    /// Recorded for the report; never affects `passed()`.
    pub teardown_failures: Vec<TeardownError>,
    pub elapsed: Duration,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs `body` as its own task, bounded by `deadline`, then tears down every
/// handle the case provisioned.
///
/// Teardown runs whether the body succeeded, failed, panicked or ran out of
/// time. When the deadline expires the body task is aborted, which abandons
/// any in-flight eventual-state wait. Teardown itself runs on a separate
/// task that dropping the returned future does not cancel.
pub async fn run_test_case<F, Fut>(case: TestCase, deadline: Duration, body: F) -> TestOutcome
where
    F: FnOnce(Arc<TestCase>) -> Fut,
    Fut: Future<Output = Result<(), HarnessError>> + Send + 'static,
{
    let case = Arc::new(case);
    let span = info_span!("test_case", case = %case.name(), id = %case.id());
    let started = Instant::now();

    info!(parent: &span, deadline_secs = deadline.as_secs(), "Test case started");

    let mut task = tokio::spawn(body(Arc::clone(&case)).instrument(span.clone()));

    let result = match tokio::time::timeout(deadline, &mut task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) if join_err.is_panic() => {
            let message = panic_message(join_err.into_panic());
            error!(parent: &span, panic = %message, "Test body panicked");
            Err(HarnessError::Panicked(message))
        }
        Ok(Err(_)) => Err(HarnessError::Cancelled),
        Err(_) => {
            task.abort();
            // Wait for the abort to land so the body cannot touch the
            // handle list while teardown walks it.
            let _ = (&mut task).await;
            warn!(parent: &span, deadline_secs = deadline.as_secs(), "Deadline exceeded; abandoning test body");
            Err(HarnessError::DeadlineExceeded(deadline))
        }
    };

    let teardown_case = Arc::clone(&case);
    let teardown = tokio::spawn(async move { teardown_case.teardown_all().await }.instrument(span.clone()));
    let teardown_failures = match teardown.await {
        Ok(failures) => failures,
        Err(e) => {
            error!(parent: &span, error = %e, "Teardown task failed");
            Vec::new()
        }
    };

    let outcome = TestOutcome {
        case_id: case.id(),
        name: case.name().to_string(),
        result,
        teardown_failures,
        elapsed: started.elapsed(),
    };

    match &outcome.result {
        Ok(()) => info!(parent: &span, elapsed_ms = outcome.elapsed.as_millis() as u64, "Test case passed"),
        Err(e) => warn!(
            parent: &span,
            reason = e.reason_code(),
            error = %e,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "Test case failed"
        ),
    }

    outcome
}

impl Harness {
    /// Runs a named test case with the configured deadline.
    pub async fn run<F, Fut>(&self, name: impl Into<String>, body: F) -> TestOutcome
    where
        F: FnOnce(Arc<TestCase>) -> Fut,
        Fut: Future<Output = Result<(), HarnessError>> + Send + 'static,
    {
        run_test_case(self.test_case(name), self.config().test_deadline(), body).await
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
