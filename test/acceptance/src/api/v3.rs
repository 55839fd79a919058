//! v3 API shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    pub guid: String,
    pub name: String,
}

/// `POST /v3/apps`
#[derive(Debug, Clone, Serialize)]
pub struct CreateApp<'a> {
    pub name: &'a str,
    pub relationships: Relationships<'a>,
    pub environment_variables: &'a Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Relationships<'a> {
    pub space: GuidRef<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GuidRef<'a> {
    pub guid: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    pub guid: String,
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Droplet {
    pub guid: String,
    pub state: String,
}

/// `PUT /v3/apps/:guid/current_droplet`
#[derive(Debug, Clone, Serialize)]
pub struct AssignDroplet<'a> {
    pub droplet_guid: &'a str,
}

/// `POST /v3/apps/:guid/tasks`
#[derive(Debug, Clone, Serialize)]
pub struct CreateTask<'a> {
    pub command: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub guid: String,
    pub command: String,
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub result: TaskResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub failure_reason: Option<String>,
}

impl Task {
    pub fn is_terminal(&self) -> bool {
        matches!(self.state.as_str(), "SUCCEEDED" | "FAILED")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_cancelled_task() {
        let task: Task = serde_json::from_value(json!({
            "guid": "t-1",
            "command": "sleep 100;",
            "name": "mreow",
            "state": "FAILED",
            "result": {"failure_reason": "task was canceled"},
            "memory_in_mb": 256
        }))
        .unwrap();

        assert!(task.is_terminal());
        assert_eq!(task.result.failure_reason.as_deref(), Some("task was canceled"));
    }

    #[test]
    fn running_task_without_result_is_not_terminal() {
        let task: Task = serde_json::from_value(json!({
            "guid": "t-2", "command": "echo 0", "name": "mreow", "state": "RUNNING"
        }))
        .unwrap();

        assert!(!task.is_terminal());
        assert!(task.result.failure_reason.is_none());
    }

    #[test]
    fn create_app_body_shape() {
        let env = json!({"foo": "bar"});
        let body = serde_json::to_value(CreateApp {
            name: "cats-app-1",
            relationships: Relationships {
                space: GuidRef { guid: "space-1" },
            },
            environment_variables: &env,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "name": "cats-app-1",
                "relationships": {"space": {"guid": "space-1"}},
                "environment_variables": {"foo": "bar"}
            })
        );
    }
}
