//! Renders an [`ApiPlan`] as a CloudFormation template.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::provisioning::{plan_fingerprint, ApiPlan, ProvisionedFunction};

pub const LAMBDA_RUNTIME: &str = "provided.al2023";
pub const LAMBDA_HANDLER: &str = "bootstrap";
const DEPLOYMENT_HASH_LEN: usize = 8;

/// Where the packaged `bootstrap` zip lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocation {
    pub bucket: String,
    pub key: String,
}

/// Converts an id such as `staging-translateText` into `StagingTranslateText`.
pub fn logical_id(raw: &str) -> String {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn resource_logical_id(api_id: &str, segments: &[&str]) -> String {
    format!("{}Resource{}", logical_id(api_id), logical_id(&segments.join("-")))
}

/// The deployment logical id carries a prefix of the plan fingerprint, so a
/// stack update that changes routes or methods creates a fresh deployment.
pub fn render_template(
    plan: &ApiPlan,
    artifact: &ArtifactLocation,
) -> Result<Value, serde_json::Error> {
    let fingerprint = plan_fingerprint(plan)?;
    let api = logical_id(&plan.api_id);
    let mut resources = Map::new();

    resources.insert(
        api.clone(),
        json!({
            "Type": "AWS::ApiGateway::RestApi",
            "Properties": { "Name": plan.rest_api_name },
        }),
    );

    for function in &plan.functions {
        insert_function_resources(&mut resources, function, artifact);
    }

    let mut path_resources = BTreeSet::new();
    let mut method_ids = Vec::with_capacity(plan.routes.len());
    for route in &plan.routes {
        let segments: Vec<&str> = route.path.split('/').filter(|s| !s.is_empty()).collect();

        for depth in 1..=segments.len() {
            let prefix = &segments[..depth];
            let resource_id = resource_logical_id(&plan.api_id, prefix);
            if !path_resources.insert(resource_id.clone()) {
                continue;
            }
            let parent = if depth == 1 {
                json!({ "Fn::GetAtt": [api, "RootResourceId"] })
            } else {
                json!({ "Ref": resource_logical_id(&plan.api_id, &segments[..depth - 1]) })
            };
            resources.insert(
                resource_id,
                json!({
                    "Type": "AWS::ApiGateway::Resource",
                    "Properties": {
                        "RestApiId": { "Ref": api },
                        "ParentId": parent,
                        "PathPart": prefix[depth - 1],
                    },
                }),
            );
        }

        let function = format!("{}Function", logical_id(&route.function_id));
        let method_id = format!(
            "{}{}",
            resource_logical_id(&plan.api_id, &segments),
            logical_id(&route.method.to_ascii_lowercase())
        );
        resources.insert(
            method_id.clone(),
            json!({
                "Type": "AWS::ApiGateway::Method",
                "Properties": {
                    "RestApiId": { "Ref": api },
                    "ResourceId": { "Ref": resource_logical_id(&plan.api_id, &segments) },
                    "HttpMethod": route.method,
                    "AuthorizationType": "NONE",
                    "Integration": {
                        "Type": "AWS_PROXY",
                        "IntegrationHttpMethod": "POST",
                        "Uri": {
                            "Fn::Sub": format!(
                                "arn:${{AWS::Partition}}:apigateway:${{AWS::Region}}:lambda:path/2015-03-31/functions/${{{function}.Arn}}/invocations"
                            ),
                        },
                    },
                },
            }),
        );
        resources.insert(
            format!("{}InvokePermission", logical_id(&route.function_id)),
            json!({
                "Type": "AWS::Lambda::Permission",
                "Properties": {
                    "Action": "lambda:InvokeFunction",
                    "FunctionName": { "Fn::GetAtt": [function, "Arn"] },
                    "Principal": "apigateway.amazonaws.com",
                    "SourceArn": {
                        "Fn::Sub": format!(
                            "arn:${{AWS::Partition}}:execute-api:${{AWS::Region}}:${{AWS::AccountId}}:${{{api}}}/*/{}{}",
                            route.method, route.path
                        ),
                    },
                },
            }),
        );
        method_ids.push(method_id);
    }

    let deployment = format!("{api}Deployment{}", &fingerprint[..DEPLOYMENT_HASH_LEN]);
    resources.insert(
        deployment.clone(),
        json!({
            "Type": "AWS::ApiGateway::Deployment",
            "DependsOn": method_ids,
            "Properties": { "RestApiId": { "Ref": api } },
        }),
    );
    resources.insert(
        format!("{api}Stage"),
        json!({
            "Type": "AWS::ApiGateway::Stage",
            "Properties": {
                "RestApiId": { "Ref": api },
                "DeploymentId": { "Ref": deployment },
                "StageName": plan.stage_name,
            },
        }),
    );

    Ok(json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": format!("{} ({})", plan.rest_api_name, plan.stage_name),
        "Resources": resources,
        "Outputs": {
            "ApiEndpoint": {
                "Value": {
                    "Fn::Sub": format!(
                        "https://${{{api}}}.execute-api.${{AWS::Region}}.${{AWS::URLSuffix}}/{}/",
                        plan.stage_name
                    ),
                },
            },
        },
    }))
}

fn insert_function_resources(
    resources: &mut Map<String, Value>,
    function: &ProvisionedFunction,
    artifact: &ArtifactLocation,
) {
    let base = logical_id(&function.function_id);
    let role = format!("{base}Role");
    let policy = format!("{base}Policy");

    resources.insert(
        role.clone(),
        json!({
            "Type": "AWS::IAM::Role",
            "Properties": {
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "Service": "lambda.amazonaws.com" },
                        "Action": "sts:AssumeRole",
                    }],
                },
                "ManagedPolicyArns": [{
                    "Fn::Sub": "arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole",
                }],
            },
        }),
    );

    let statements: Vec<Value> = function
        .policy
        .statements
        .iter()
        .map(|statement| {
            json!({
                "Effect": statement.effect,
                "Action": statement.actions,
                "Resource": statement.resources,
            })
        })
        .collect();
    resources.insert(
        policy.clone(),
        json!({
            "Type": "AWS::IAM::Policy",
            "Properties": {
                "PolicyName": function.policy.name,
                "PolicyDocument": { "Version": "2012-10-17", "Statement": statements },
                "Roles": [{ "Ref": role }],
            },
        }),
    );

    resources.insert(
        format!("{base}Function"),
        json!({
            "Type": "AWS::Lambda::Function",
            "DependsOn": [policy],
            "Properties": {
                "FunctionName": function.function_id,
                "Runtime": LAMBDA_RUNTIME,
                "Handler": LAMBDA_HANDLER,
                "Code": { "S3Bucket": artifact.bucket, "S3Key": artifact.key },
                "Role": { "Fn::GetAtt": [role, "Arn"] },
                "Environment": { "Variables": function.environment },
            },
        }),
    );
}
