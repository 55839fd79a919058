//! Test cases and the shared harness context.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cfat_eventually::Eventually;
use cfat_id::{NameGenerator, ResourceName, RunId, TestCaseId};
use cfat_platform::Platform;
use tracing::{debug, info, instrument, warn};

use crate::config::CatsConfig;
use crate::error::{ConfigError, ProvisioningError, TeardownError};
use crate::handle::ResourceHandle;
use crate::resource::Resource;
use crate::teardown::{teardown_handle, teardown_in_reverse, TeardownOutcome};

/// State shared by every test case in one run.
#[derive(Debug, Clone)]
pub struct Harness {
    run_id: RunId,
    platform: Platform,
    names: Arc<NameGenerator>,
    config: Arc<CatsConfig>,
}

impl Harness {
    pub fn new(config: CatsConfig, platform: Platform) -> Result<Self, ConfigError> {
        let names = NameGenerator::new(&config.name_prefix)?;
        Ok(Self::with_names(config, platform, names))
    }

    /// Uses a caller-supplied generator, e.g. one with a fixed session.
    pub fn with_names(config: CatsConfig, platform: Platform, names: NameGenerator) -> Self {
        let run_id = RunId::new();
        info!(run_id = %run_id, session = %names.session(), "Harness ready");
        Self {
            run_id,
            platform,
            names: Arc::new(names),
            config: Arc::new(config),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn config(&self) -> &CatsConfig {
        &self.config
    }

    pub fn names(&self) -> &NameGenerator {
        &self.names
    }

    /// Starts a new test case owning no resources yet.
    pub fn test_case(&self, name: impl Into<String>) -> TestCase {
        TestCase {
            id: TestCaseId::new(),
            name: name.into(),
            platform: self.platform.clone(),
            names: Arc::clone(&self.names),
            config: Arc::clone(&self.config),
            handles: Mutex::new(Vec::new()),
        }
    }
}

/// One execution of a test: owns the handles it provisions.
#[derive(Debug)]
pub struct TestCase {
    id: TestCaseId,
    name: String,
    platform: Platform,
    names: Arc<NameGenerator>,
    config: Arc<CatsConfig>,
    handles: Mutex<Vec<Arc<ResourceHandle>>>,
}

impl TestCase {
    pub fn id(&self) -> TestCaseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn config(&self) -> &CatsConfig {
        &self.config
    }

    /// A fresh unique name for something this test creates outside the
    /// harness (e.g. a task name).
    pub fn unique_name(&self, kind: &str) -> ResourceName {
        self.names.next(kind)
    }

    /// An eventual-state assertion with the configured default budget.
    pub fn eventually(&self, description: impl Into<String>) -> Eventually {
        Eventually::new(self.config.default_timeout(), self.config.poll_interval()).described(description)
    }

    /// Handles registered so far, oldest first.
    pub fn handles(&self) -> Vec<Arc<ResourceHandle>> {
        self.lock_handles().clone()
    }

    /// Provisions `resource` under a freshly generated name.
    pub async fn provision<R: Resource>(&self, resource: R) -> Result<Arc<ResourceHandle>, ProvisioningError> {
        let name = self.names.next(resource.kind().label());
        self.provision_named(name, resource).await
    }

    /// Provisions `resource` under a caller-chosen name.
    ///
    /// On failure nothing is registered, so teardown never runs for the
    /// failed resource.
    #[instrument(skip_all, fields(case = %self.name, kind = %resource.kind(), name = %name))]
    pub async fn provision_named<R: Resource>(
        &self,
        name: ResourceName,
        resource: R,
    ) -> Result<Arc<ResourceHandle>, ProvisioningError> {
        let handle = Arc::new(ResourceHandle::requested(name, self.id, Arc::new(resource)));

        // Registered before the create call so an aborted creation is
        // visible to teardown.
        self.lock_handles().push(Arc::clone(&handle));

        debug!(handle = %handle.id(), "Provisioning");
        match handle.resource().create(handle.name(), &self.platform).await {
            Ok(created) => {
                handle.mark_provisioned(created.guid);
                info!(handle = %handle.id(), guid = ?handle.guid(), "Provisioned");
                Ok(handle)
            }
            Err(cause) => {
                self.lock_handles().retain(|h| !Arc::ptr_eq(h, &handle));
                let err = ProvisioningError {
                    kind: handle.kind(),
                    name: handle.name().to_string(),
                    cause,
                };
                warn!(error = %err, "Provisioning failed");
                Err(err)
            }
        }
    }

    /// Tears down one handle. Idempotent; failures are logged and returned,
    /// never propagated.
    pub async fn teardown(&self, handle: &ResourceHandle) -> TeardownOutcome {
        teardown_handle(handle, &self.platform, self.config.teardown_timeout()).await
    }

    /// Tears down every registered handle, newest first.
    pub async fn teardown_all(&self) -> Vec<TeardownError> {
        let handles = self.handles();
        teardown_in_reverse(&handles, &self.platform, self.config.teardown_timeout()).await
    }

    fn lock_handles(&self) -> MutexGuard<'_, Vec<Arc<ResourceHandle>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
