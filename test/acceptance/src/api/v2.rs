//! v2 API shapes.

use cfat_harness::HarnessError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub guid: String,
    #[serde(default)]
    pub url: String,
}

/// `GET /v2/services?inline-relations-depth=1`
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesResponse {
    #[serde(default)]
    pub resources: Vec<Service>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    pub entity: ServiceEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceEntity {
    pub label: String,
    #[serde(default)]
    pub service_plans: Vec<ServicePlan>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServicePlan {
    pub metadata: Metadata,
    pub entity: ServicePlanEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServicePlanEntity {
    pub name: String,
    #[serde(default)]
    pub public: bool,
}

impl ServicesResponse {
    /// The plan named `plan` of the service labelled `label`.
    pub fn find_plan(&self, label: &str, plan: &str) -> Result<&ServicePlan, HarnessError> {
        let service = self
            .resources
            .iter()
            .find(|s| s.entity.label == label)
            .ok_or_else(|| HarnessError::NotFound(format!("service `{label}`")))?;

        service
            .entity
            .service_plans
            .iter()
            .find(|p| p.entity.name == plan)
            .ok_or_else(|| HarnessError::NotFound(format!("plan `{plan}` of service `{label}`")))
    }
}

/// `GET /v2/routes?q=host:HOST`
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesResponse {
    #[serde(default)]
    pub resources: Vec<Route>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub metadata: Metadata,
}

/// `PUT /v2/apps/:guid` bodies.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diego: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<u16>>,
}

/// `POST /v2/route_mappings`
#[derive(Debug, Clone, Serialize)]
pub struct RouteMapping<'a> {
    pub app_guid: &'a str,
    pub route_guid: &'a str,
    pub app_port: u16,
}

/// `GET /v2/app_usage_events`
#[derive(Debug, Clone, Deserialize)]
pub struct UsageEventsResponse {
    #[serde(default)]
    pub resources: Vec<UsageEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsageEvent {
    pub entity: UsageEventEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UsageEventEntity {
    pub state: String,
    #[serde(default)]
    pub parent_app_guid: Option<String>,
    #[serde(default)]
    pub parent_app_name: Option<String>,
    #[serde(default)]
    pub task_guid: Option<String>,
}

impl UsageEventsResponse {
    /// True if an event in `state` was recorded for `task_guid` of `app_guid`.
    pub fn has_task_event(&self, state: &str, app_guid: &str, task_guid: &str) -> bool {
        self.resources.iter().any(|e| {
            e.entity.state == state
                && e.entity.parent_app_guid.as_deref() == Some(app_guid)
                && e.entity.task_guid.as_deref() == Some(task_guid)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICES: &str = r#"{
        "total_results": 2,
        "resources": [
            {
                "metadata": {"guid": "svc-1"},
                "entity": {
                    "label": "fake-service",
                    "service_plans": [
                        {
                            "metadata": {"guid": "plan-1", "url": "/v2/service_plans/plan-1"},
                            "entity": {"name": "fake-plan", "public": false}
                        }
                    ]
                }
            },
            {
                "metadata": {"guid": "svc-2"},
                "entity": {"label": "other-service"}
            }
        ]
    }"#;

    #[test]
    fn finds_plan_by_label_and_name() {
        let services: ServicesResponse = serde_json::from_str(SERVICES).unwrap();
        let plan = services.find_plan("fake-service", "fake-plan").unwrap();
        assert_eq!(plan.metadata.url, "/v2/service_plans/plan-1");
        assert!(!plan.entity.public);
    }

    #[test]
    fn missing_service_or_plan_is_not_found() {
        let services: ServicesResponse = serde_json::from_str(SERVICES).unwrap();

        let err = services.find_plan("nope", "fake-plan").unwrap_err();
        assert!(matches!(err, HarnessError::NotFound(ref what) if what.contains("nope")));

        let err = services.find_plan("other-service", "fake-plan").unwrap_err();
        assert_eq!(err.reason_code(), "not_found");
    }

    #[test]
    fn app_update_omits_unset_fields() {
        let body = serde_json::to_string(&AppUpdate {
            ports: Some(vec![7777, 8080]),
            ..AppUpdate::default()
        })
        .unwrap();
        assert_eq!(body, r#"{"ports":[7777,8080]}"#);
    }

    #[test]
    fn task_events_match_on_state_app_and_task() {
        let events: UsageEventsResponse = serde_json::from_str(
            r#"{"resources": [
                {"entity": {"state": "STARTED", "parent_app_guid": "app-1"}},
                {"entity": {"state": "TASK_STARTED", "parent_app_guid": "app-1", "parent_app_name": "a", "task_guid": "t-1"}}
            ]}"#,
        )
        .unwrap();

        assert!(events.has_task_event("TASK_STARTED", "app-1", "t-1"));
        assert!(!events.has_task_event("TASK_STOPPED", "app-1", "t-1"));
        assert!(!events.has_task_event("TASK_STARTED", "app-2", "t-1"));
    }
}
