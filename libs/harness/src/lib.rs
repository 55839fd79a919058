//! # cfat-harness
//!
//! Orchestration for acceptance tests against a live platform.
//!
//! A [`Harness`] holds what every test case shares: the [`Platform`]
//! capabilities, the configuration and the name generator. Each
//! [`TestCase`] provisions resources through [`TestCase::provision`],
//! waits for eventual state with [`TestCase::eventually`] and relies on
//! [`run_test_case`] to tear everything down afterwards, whatever happened
//! in the body.
//!
//! ```ignore
//! let outcome = harness
//!     .run("pushes an app", |case| async move {
//!         let app = case.provision(PushedApp::dora(case.config())).await?;
//!         case.eventually("app to answer")
//!             .until(|| curl_app(&case, app.name(), "/"), |r| r.is_success())
//!             .await?;
//!         Ok(())
//!     })
//!     .await;
//! ```
//!
//! [`Platform`]: cfat_platform::Platform

pub mod config;
pub mod logging;

mod case;
mod error;
mod handle;
mod resource;
mod run;
mod teardown;

pub use case::{Harness, TestCase};
pub use config::CatsConfig;
pub use error::{ensure, ConfigError, ExternalError, HarnessError, ProvisioningError, TeardownError, TimeoutError};
pub use handle::{HandleState, ResourceHandle, ResourceKind};
pub use resource::{Created, Resource};
pub use run::{run_test_case, TestOutcome};
pub use teardown::TeardownOutcome;

pub use cfat_eventually::{Eventually, Observation};
pub use cfat_id::{HandleId, ResourceName, TestCaseId};
pub use cfat_platform::Platform;
