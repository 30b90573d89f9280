//! Deployment-time description of the API: which functions exist, what each
//! one may call, and which route reaches it.
//!
//! Nothing here runs per request. The plan is a pure function of the
//! deployment environment, so synthesizing it twice yields identical output.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::contract::{NlpOperation, ValidationError};

pub const REST_API_NAME: &str = "NLP Service";
pub const OPERATION_ENV_VAR: &str = "NLP_OPERATION";
pub const ENVIRONMENT_ENV_VAR: &str = "DEPLOYMENT_ENVIRONMENT";
const WILDCARD_RESOURCE: &str = "*";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentEnvironment {
    #[default]
    Staging,
    Prod,
}

impl DeploymentEnvironment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }
}

impl fmt::Display for DeploymentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentEnvironment {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "staging" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Prod),
            _ => Err(ValidationError::new(format!(
                "Unknown deployment environment '{value}', expected 'staging' or 'prod'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub method: &'static str,
    pub operation: NlpOperation,
}

impl RouteDescriptor {
    pub fn path(&self) -> String {
        self.operation.route_path()
    }
}

/// Every routable operation. Adding an operation means adding a row here.
pub const ROUTE_TABLE: &[RouteDescriptor] = &[
    RouteDescriptor {
        method: "POST",
        operation: NlpOperation::Translate,
    },
    RouteDescriptor {
        method: "POST",
        operation: NlpOperation::DetectSentiment,
    },
    RouteDescriptor {
        method: "POST",
        operation: NlpOperation::ContainsPii,
    },
    RouteDescriptor {
        method: "POST",
        operation: NlpOperation::DetectEntities,
    },
    RouteDescriptor {
        method: "POST",
        operation: NlpOperation::DetectKeyPhrases,
    },
];

/// Input to [`provision_function`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub handler_entry: NlpOperation,
    pub function_name: String,
    pub policy_actions: Vec<String>,
    pub policy_name: String,
}

impl FunctionSpec {
    pub fn for_operation(operation: NlpOperation) -> Self {
        Self {
            handler_entry: operation,
            function_name: operation.function_name().to_string(),
            policy_actions: operation
                .policy_actions()
                .iter()
                .map(|action| action.to_string())
                .collect(),
            policy_name: operation.policy_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub effect: String,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlinePolicy {
    pub name: String,
    pub statements: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedFunction {
    pub function_id: String,
    pub handler: NlpOperation,
    pub environment: BTreeMap<String, String>,
    pub policy: InlinePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRoute {
    pub method: String,
    pub path: String,
    pub function_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPlan {
    pub api_id: String,
    pub rest_api_name: String,
    pub stage_name: String,
    pub environment: DeploymentEnvironment,
    pub functions: Vec<ProvisionedFunction>,
    pub routes: Vec<ApiRoute>,
}

/// Creates one deployable function holding exactly `spec.policy_actions`,
/// each as its own statement on the wildcard resource.
pub fn provision_function(
    environment: DeploymentEnvironment,
    spec: &FunctionSpec,
) -> ProvisionedFunction {
    let statements = spec
        .policy_actions
        .iter()
        .map(|action| PolicyStatement {
            effect: "Allow".to_string(),
            actions: vec![action.clone()],
            resources: vec![WILDCARD_RESOURCE.to_string()],
        })
        .collect();

    ProvisionedFunction {
        function_id: format!("{environment}-{}", spec.function_name),
        handler: spec.handler_entry,
        environment: BTreeMap::from([
            (
                OPERATION_ENV_VAR.to_string(),
                spec.handler_entry.as_str().to_string(),
            ),
            (ENVIRONMENT_ENV_VAR.to_string(), environment.as_str().to_string()),
        ]),
        policy: InlinePolicy {
            name: spec.policy_name.clone(),
            statements,
        },
    }
}

pub fn assemble_api(environment: DeploymentEnvironment) -> ApiPlan {
    assemble_api_from(environment, ROUTE_TABLE)
}

pub fn assemble_api_from(
    environment: DeploymentEnvironment,
    routes: &[RouteDescriptor],
) -> ApiPlan {
    let mut functions = Vec::with_capacity(routes.len());
    let mut api_routes = Vec::with_capacity(routes.len());

    for route in routes {
        let spec = FunctionSpec::for_operation(route.operation);
        let function = provision_function(environment, &spec);
        api_routes.push(ApiRoute {
            method: route.method.to_string(),
            path: route.path(),
            function_id: function.function_id.clone(),
        });
        functions.push(function);
    }

    ApiPlan {
        api_id: format!("{environment}-nlpApi"),
        rest_api_name: REST_API_NAME.to_string(),
        stage_name: environment.as_str().to_string(),
        environment,
        functions,
        routes: api_routes,
    }
}

pub fn plan_fingerprint(plan: &ApiPlan) -> Result<String, serde_json::Error> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(plan)?);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisioned_policy_holds_exactly_the_listed_actions() {
        let spec = FunctionSpec::for_operation(NlpOperation::Translate);
        let function = provision_function(DeploymentEnvironment::Staging, &spec);

        assert_eq!(function.function_id, "staging-translateText");
        assert_eq!(function.policy.name, "translate-text-policy");
        let actions: Vec<&str> = function
            .policy
            .statements
            .iter()
            .flat_map(|statement| statement.actions.iter().map(String::as_str))
            .collect();
        assert_eq!(
            actions,
            vec!["translate:TranslateText", "comprehend:DetectDominantLanguage"]
        );
        assert!(function
            .policy
            .statements
            .iter()
            .all(|statement| statement.resources == vec!["*".to_string()]));
        assert_eq!(
            function.environment.get(OPERATION_ENV_VAR).map(String::as_str),
            Some("translate")
        );
    }

    #[test]
    fn handler_entry_pins_the_function_operation() {
        let spec = FunctionSpec::for_operation(NlpOperation::DetectEntities);
        assert_eq!(spec.handler_entry, NlpOperation::DetectEntities);

        let function = provision_function(DeploymentEnvironment::Prod, &spec);
        assert_eq!(function.handler, spec.handler_entry);
        assert_eq!(
            function.environment.get(OPERATION_ENV_VAR).map(String::as_str),
            Some("detect-entities")
        );
    }

    #[test]
    fn assembled_api_exposes_one_post_route_per_operation() {
        let plan = assemble_api(DeploymentEnvironment::Prod);

        assert_eq!(plan.stage_name, "prod");
        assert_eq!(plan.api_id, "prod-nlpApi");
        let paths: Vec<&str> = plan.routes.iter().map(|route| route.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/translate",
                "/comprehend/sentiment",
                "/comprehend/detect-pii",
                "/comprehend/detect-entities",
                "/comprehend/detect-key-phrases",
            ]
        );
        assert!(plan.routes.iter().all(|route| route.method == "POST"));
        assert_eq!(plan.functions.len(), plan.routes.len());
    }

    #[test]
    fn assembly_is_deterministic_for_identical_environment() {
        let first = assemble_api(DeploymentEnvironment::Staging);
        let second = assemble_api(DeploymentEnvironment::Staging);

        assert_eq!(first, second);
        assert_eq!(
            plan_fingerprint(&first).expect("fingerprint"),
            plan_fingerprint(&second).expect("fingerprint")
        );
        assert_ne!(
            plan_fingerprint(&first).expect("fingerprint"),
            plan_fingerprint(&assemble_api(DeploymentEnvironment::Prod)).expect("fingerprint")
        );
    }

    #[test]
    fn environment_parses_aliases_and_defaults_to_staging() {
        assert_eq!(DeploymentEnvironment::default(), DeploymentEnvironment::Staging);
        assert_eq!(
            "production".parse::<DeploymentEnvironment>().expect("should parse"),
            DeploymentEnvironment::Prod
        );
        assert!("dev".parse::<DeploymentEnvironment>().is_err());
    }
}
