use async_trait::async_trait;
use cfat_harness::{CatsConfig, Created, ExternalError, Platform, Resource, ResourceKind, ResourceName};
use cfat_platform::Invocation;

use crate::cf::Cf;

/// A service broker registered against a pushed broker app.
#[derive(Debug, Clone)]
pub struct ServiceBroker {
    cf: Cf,
    username: String,
    password: String,
    url: String,
}

impl ServiceBroker {
    pub fn new(config: &CatsConfig, url: impl Into<String>) -> Self {
        Self {
            cf: Cf::new(config),
            username: config.broker_username.clone(),
            password: config.broker_password.clone(),
            url: url.into(),
        }
    }

    /// `cf create-service-broker` / `cf update-service-broker` with the
    /// password redacted from logs.
    pub fn invocation(&self, verb: &str, name: &str) -> Invocation {
        self.cf
            .invocation(&[verb, name, self.username.as_str()])
            .secret_arg(&self.password)
            .arg(&self.url)
    }

    /// Re-reads the broker catalog.
    pub async fn update(&self, name: &str, platform: &Platform) -> Result<(), ExternalError> {
        let output = platform.execute(&self.invocation("update-service-broker", name)).await?;
        ExternalError::check_exit(&output)
    }
}

#[async_trait]
impl Resource for ServiceBroker {
    fn kind(&self) -> ResourceKind {
        ResourceKind::ServiceBroker
    }

    async fn create(&self, name: &ResourceName, platform: &Platform) -> Result<Created, ExternalError> {
        let output = platform
            .execute(&self.invocation("create-service-broker", name.as_str()))
            .await?;
        ExternalError::check_exit(&output)?;
        Ok(Created::default())
    }

    async fn destroy(&self, name: &ResourceName, _guid: Option<&str>, platform: &Platform) -> Result<(), ExternalError> {
        self.cf
            .run(platform, &["delete-service-broker", name.as_str(), "-f"])
            .await
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_redacted_in_display() {
        let config = CatsConfig {
            broker_password: "hunter2".to_string(),
            ..CatsConfig::default()
        };
        let broker = ServiceBroker::new(&config, "https://broker.example.com");
        let invocation = broker.invocation("create-service-broker", "cats-broker-1");

        assert_eq!(
            invocation.args,
            ["create-service-broker", "cats-broker-1", "username", "hunter2", "https://broker.example.com"]
        );
        let shown = invocation.to_string();
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("***"));
    }
}
