//! The seam between the harness and concrete platform resources.

use async_trait::async_trait;
use cfat_id::ResourceName;
use cfat_platform::Platform;

use crate::error::ExternalError;
use crate::handle::ResourceKind;

/// Result of a successful create call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Created {
    /// Platform-assigned identifier, if the create call returned one.
    pub guid: Option<String>,
}

impl Created {
    pub fn with_guid(guid: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
        }
    }
}

/// A kind of external resource the harness can provision and tear down.
///
/// The implementing value describes the resource: it carries everything
/// needed to create the resource except its name, which the harness
/// assigns. The harness keeps the value alive until teardown.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    fn kind(&self) -> ResourceKind;

    /// Creates the resource. Non-success exit codes or statuses must be
    /// reported as errors.
    async fn create(&self, name: &ResourceName, platform: &Platform) -> Result<Created, ExternalError>;

    /// Deletes the resource. Called at most once per handle.
    async fn destroy(
        &self,
        name: &ResourceName,
        guid: Option<&str>,
        platform: &Platform,
    ) -> Result<(), ExternalError>;
}
