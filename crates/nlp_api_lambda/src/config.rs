use nlp_api_core::contract::{NlpOperation, ValidationError};
use nlp_api_core::provisioning::{DeploymentEnvironment, ENVIRONMENT_ENV_VAR, OPERATION_ENV_VAR};
use serde_json::Value;

pub const REGION_ENV_VAR: &str = "AWS_REGION";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Operation pinned by the provisioner. When unset the operation is taken
    /// from the event's route.
    pub operation: Option<NlpOperation>,
    pub region: Option<String>,
    pub environment: Option<DeploymentEnvironment>,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ValidationError> {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            operation: present(OPERATION_ENV_VAR)
                .map(|value| value.parse::<NlpOperation>())
                .transpose()?,
            region: present(REGION_ENV_VAR),
            environment: present(ENVIRONMENT_ENV_VAR)
                .map(|value| value.parse::<DeploymentEnvironment>())
                .transpose()?,
        })
    }

    pub fn resolve_operation(&self, event: &Value) -> Result<NlpOperation, ValidationError> {
        if let Some(operation) = self.operation {
            return Ok(operation);
        }

        ["resource", "path", "rawPath"]
            .into_iter()
            .filter_map(|key| event.get(key).and_then(Value::as_str))
            .find_map(NlpOperation::from_route_path)
            .ok_or_else(|| {
                ValidationError::new(format!(
                    "{OPERATION_ENV_VAR} is not configured and the event route matches no operation"
                ))
            })
    }
}
