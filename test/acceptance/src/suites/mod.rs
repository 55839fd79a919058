//! Suite catalog.
//!
//! Every test case is a plain function from its [`TestCase`] scope to a
//! boxed future, so the runner can list, filter and schedule cases
//! without knowing what they do.

mod apps;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use cfat_harness::{CatsConfig, Harness, HarnessError, ResourceHandle, TestCase, TestOutcome};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::cf::{Cf, During};

pub type CaseFuture = Pin<Box<dyn Future<Output = Result<(), HarnessError>> + Send>>;
pub type CaseBody = fn(Arc<TestCase>) -> CaseFuture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suite {
    Apps,
    Routing,
    Services,
    Tasks,
}

impl Suite {
    pub const ALL: [Suite; 4] = [Suite::Apps, Suite::Routing, Suite::Services, Suite::Tasks];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Apps => "apps",
            Self::Routing => "routing",
            Self::Services => "services",
            Self::Tasks => "v3",
        }
    }

    /// Whether the config's `include_*` gate lets this suite run.
    pub fn enabled(&self, config: &CatsConfig) -> bool {
        match self {
            Self::Apps => config.include_apps,
            Self::Routing => config.include_routing,
            Self::Services => config.include_services,
            Self::Tasks => config.include_tasks,
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("unknown suite `{0}` (expected one of: apps, routing, services, v3)")]
pub struct UnknownSuite(String);

impl FromStr for Suite {
    type Err = UnknownSuite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|suite| suite.name().eq_ignore_ascii_case(s) || (s == "tasks" && *suite == Self::Tasks))
            .ok_or_else(|| UnknownSuite(s.to_string()))
    }
}

/// One runnable test case.
#[derive(Debug, Clone, Copy)]
pub struct CaseSpec {
    pub suite: Suite,
    pub name: &'static str,
    pub body: CaseBody,
}

impl CaseSpec {
    /// `suite/case name`, used as the test case name.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.suite, self.name)
    }

    pub async fn run(&self, harness: &Harness) -> TestOutcome {
        harness.run(self.full_name(), self.body).await
    }
}

/// Every known test case, in suite order.
pub fn catalog() -> Vec<CaseSpec> {
    let mut cases = apps::cases();
    cases.extend(routing::cases());
    cases.extend(services::cases());
    cases.extend(tasks::cases());
    cases
}

/// Cases of the requested suites (all when `suites` is empty) that the
/// config enables and whose full name contains `filter`.
pub fn select(config: &CatsConfig, suites: &[Suite], filter: Option<&str>) -> Vec<CaseSpec> {
    catalog()
        .into_iter()
        .filter(|case| suites.is_empty() || suites.contains(&case.suite))
        .filter(|case| case.suite.enabled(config))
        .filter(|case| filter.map_or(true, |f| case.full_name().contains(f)))
        .collect()
}

fn configured_space(config: &CatsConfig) -> Result<&str, HarnessError> {
    config
        .space
        .as_deref()
        .ok_or_else(|| HarnessError::NotFound("space (set `space` in the config)".to_string()))
}

fn required_guid(handle: &ResourceHandle) -> Result<String, HarnessError> {
    handle
        .guid()
        .map(str::to_string)
        .ok_or_else(|| HarnessError::NotFound(format!("guid of {} {}", handle.kind(), handle.name())))
}

fn to_body<T: Serialize>(what: &str, value: &T) -> Result<String, HarnessError> {
    serde_json::to_string(value).map_err(|e| HarnessError::decode(what, e))
}

async fn get<T: DeserializeOwned>(case: &TestCase, path: &str) -> Result<T, cfat_harness::ExternalError> {
    Cf::new(case.config())
        .curl(case.platform(), cfat_platform::Method::Get, path, None)
        .await
}

/// `cf marketplace` output.
async fn marketplace(case: &TestCase) -> Result<String, HarnessError> {
    Cf::new(case.config())
        .run(case.platform(), &["marketplace"])
        .await
        .map(|output| output.stdout)
        .during("cf marketplace")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("apps", Suite::Apps)]
    #[case("ROUTING", Suite::Routing)]
    #[case("v3", Suite::Tasks)]
    #[case("tasks", Suite::Tasks)]
    fn parses_suite_names(#[case] input: &str, #[case] expected: Suite) {
        assert_eq!(input.parse::<Suite>().unwrap(), expected);
    }

    #[test]
    fn unknown_suite_is_rejected() {
        let err = "security_groups".parse::<Suite>().unwrap_err();
        assert!(err.to_string().contains("security_groups"));
    }

    #[test]
    fn catalog_names_are_unique() {
        let cases = catalog();
        let mut names: Vec<String> = cases.iter().map(CaseSpec::full_name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), cases.len());
        for suite in Suite::ALL {
            assert!(cases.iter().any(|c| c.suite == suite), "{suite} has no cases");
        }
    }

    #[test]
    fn select_honours_gates_suites_and_filter() {
        let config = CatsConfig {
            include_tasks: false,
            ..CatsConfig::default()
        };

        assert!(select(&config, &[], None).iter().all(|c| c.suite != Suite::Tasks));
        assert!(select(&config, &[Suite::Tasks], None).is_empty());

        let routing = select(&config, &[Suite::Routing], Some("multiple"));
        assert_eq!(routing.len(), 1);
        assert_eq!(routing[0].suite, Suite::Routing);
    }
}
