//! Resource handles and their lifecycle.
//!
//! ```text
//! Requested -> Provisioned -> (InUse)* -> TornDown
//! ```
//!
//! `TornDown` is terminal. The transition into it is claimed atomically, so
//! of any number of concurrent teardown calls exactly one performs the
//! deletion.

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use cfat_id::{HandleId, ResourceName, TestCaseId};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::resource::Resource;

/// Kind of external entity a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    App,
    Route,
    ServiceBroker,
    Task,
    Package,
    Droplet,
}

impl ResourceKind {
    /// Short label embedded in generated names.
    pub fn label(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Route => "route",
            Self::ServiceBroker => "broker",
            Self::Task => "task",
            Self::Package => "pkg",
            Self::Droplet => "droplet",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::App => "app",
            Self::Route => "route",
            Self::ServiceBroker => "service broker",
            Self::Task => "task",
            Self::Package => "package",
            Self::Droplet => "droplet",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleState {
    Requested,
    Provisioned,
    InUse,
    TornDown,
}

impl HandleState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Requested,
            1 => Self::Provisioned,
            2 => Self::InUse,
            _ => Self::TornDown,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Requested => 0,
            Self::Provisioned => 1,
            Self::InUse => 2,
            Self::TornDown => 3,
        }
    }
}

/// Harness-side reference to an externally provisioned resource.
pub struct ResourceHandle {
    id: HandleId,
    kind: ResourceKind,
    name: ResourceName,
    owner: TestCaseId,
    created_at: DateTime<Utc>,
    guid: OnceLock<String>,
    state: AtomicU8,
    uses: AtomicU32,
    resource: Arc<dyn Resource>,
}

impl ResourceHandle {
    pub(crate) fn requested(name: ResourceName, owner: TestCaseId, resource: Arc<dyn Resource>) -> Self {
        Self {
            id: HandleId::new(),
            kind: resource.kind(),
            name,
            owner,
            created_at: Utc::now(),
            guid: OnceLock::new(),
            state: AtomicU8::new(HandleState::Requested.as_u8()),
            uses: AtomicU32::new(0),
            resource,
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    /// Test case that provisioned this resource.
    pub fn owner(&self) -> TestCaseId {
        self.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Platform-assigned identifier, when creation reported one.
    pub fn guid(&self) -> Option<&str> {
        self.guid.get().map(String::as_str)
    }

    pub fn state(&self) -> HandleState {
        HandleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// How many times the test body marked this handle as used.
    pub fn uses(&self) -> u32 {
        self.uses.load(Ordering::Relaxed)
    }

    /// Records a use by the test body. Returns false once torn down or if
    /// the handle was never provisioned.
    pub fn mark_in_use(&self) -> bool {
        let moved = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
                match HandleState::from_u8(s) {
                    HandleState::Provisioned | HandleState::InUse => Some(HandleState::InUse.as_u8()),
                    _ => None,
                }
            })
            .is_ok();
        if moved {
            self.uses.fetch_add(1, Ordering::Relaxed);
        }
        moved
    }

    pub(crate) fn resource(&self) -> &Arc<dyn Resource> {
        &self.resource
    }

    pub(crate) fn mark_provisioned(&self, guid: Option<String>) {
        if let Some(guid) = guid {
            let _ = self.guid.set(guid);
        }
        let _ = self.state.compare_exchange(
            HandleState::Requested.as_u8(),
            HandleState::Provisioned.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Claims the transition to `TornDown`.
    ///
    /// Returns the state the handle was in if this caller won the claim and
    /// must perform the deletion, `None` if the handle was never provisioned
    /// or another caller already claimed it.
    pub(crate) fn claim_teardown(&self) -> Option<HandleState> {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
                match HandleState::from_u8(s) {
                    HandleState::Provisioned | HandleState::InUse => Some(HandleState::TornDown.as_u8()),
                    _ => None,
                }
            })
            .ok()
            .map(HandleState::from_u8)
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("guid", &self.guid.get())
            .field("state", &self.state())
            .finish()
    }
}
