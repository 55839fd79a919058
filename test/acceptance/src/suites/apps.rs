//! Apps: an app that writes a lot of output keeps running.

use std::sync::Arc;

use cfat_harness::{ensure, HarnessError, TestCase};

use super::{CaseFuture, CaseSpec, Suite};
use crate::cf::{curl_app, curl_app_with_timeout};
use crate::resources::PushedApp;

const DORA: &str = "dora";
const SPEW_BYTES: u64 = 32 * 1024 * 1024;

pub(super) fn cases() -> Vec<CaseSpec> {
    vec![CaseSpec {
        suite: Suite::Apps,
        name: "survives printing 32MB of output",
        body: output_volume,
    }]
}

fn output_volume(case: Arc<TestCase>) -> CaseFuture {
    Box::pin(async move {
        let config = case.config();
        let app = case.provision(PushedApp::new(config, DORA)).await?;
        let host = app.name().as_str();
        app.mark_in_use();

        let before = instance_id(&case, host).await?;

        let spew = curl_app_with_timeout(&case, host, &format!("/logspew/{SPEW_BYTES}"), config.long_curl_timeout())
            .await?;
        let expected = format!("Just wrote {SPEW_BYTES} random bytes to the log");
        ensure(spew.body.contains(&expected), || {
            format!("expected `{expected}`, got `{}`", spew.body.trim())
        })?;

        // Give the platform time to react to the output, e.g. by killing the app.
        tokio::time::sleep(config.log_settle()).await;

        let after = instance_id(&case, host).await?;
        ensure(before == after, || {
            format!("app instance changed from {before} to {after} after writing output")
        })?;

        let small = curl_app(&case, host, "/logspew/2").await?;
        ensure(small.body.contains("Just wrote 2 random bytes to the log"), || {
            format!("unexpected /logspew/2 response `{}`", small.body.trim())
        })
    })
}

async fn instance_id(case: &TestCase, host: &str) -> Result<String, HarnessError> {
    let response = curl_app(case, host, "/id").await?;
    ensure(response.is_success(), || format!("GET /id returned {}", response.status))?;
    Ok(response.body.trim().to_string())
}
