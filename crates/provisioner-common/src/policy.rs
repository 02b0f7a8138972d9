//! Typed IAM/SNS policy documents
//!
//! Policy documents are built as typed values and serialized to the standard
//! IAM JSON shape at the API boundary, so tests can assert on structure
//! instead of string equality. Documents are generated fresh per request and
//! never mutated after construction.

use serde::Serialize;

/// An IAM-style policy document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: &'static str,
    #[serde(rename = "Statement")]
    pub statement: Vec<Statement>,
}

/// A single policy statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    #[serde(rename = "Sid", skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(rename = "Effect")]
    pub effect: Effect,
    #[serde(rename = "Principal", skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    #[serde(rename = "Action")]
    pub action: Vec<String>,
    #[serde(rename = "Resource", skip_serializing_if = "Vec::is_empty")]
    pub resource: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Statement principal, serialized as `{"AWS": ...}` or `{"Service": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Principal {
    #[serde(rename = "AWS")]
    Aws(String),
    #[serde(rename = "Service")]
    Service(String),
}

const POLICY_VERSION: &str = "2012-10-17";

impl PolicyDocument {
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION,
            statement,
        }
    }

    /// Trust policy allowing `service` (e.g. `lambda.amazonaws.com`) to
    /// assume the role.
    pub fn trust_for_service(service: &str) -> Self {
        Self::new(vec![Statement {
            sid: None,
            effect: Effect::Allow,
            principal: Some(Principal::Service(service.to_string())),
            action: vec!["sts:AssumeRole".to_string()],
            resource: Vec::new(),
        }])
    }

    /// Inline policy for the client role: object access on the client bucket
    /// plus log delivery into the client log group.
    pub fn role_access(bucket_arn: &str, log_group_arn: &str) -> Self {
        Self::new(vec![
            Statement {
                sid: Some("BucketAccess".to_string()),
                effect: Effect::Allow,
                principal: None,
                action: s3_object_actions(),
                resource: vec![bucket_arn.to_string(), format!("{bucket_arn}/*")],
            },
            Statement {
                sid: Some("LogDelivery".to_string()),
                effect: Effect::Allow,
                principal: None,
                action: vec![
                    "logs:CreateLogStream".to_string(),
                    "logs:PutLogEvents".to_string(),
                ],
                resource: vec![log_group_arn.to_string()],
            },
        ])
    }

    /// Bucket access policy granting the client role object access.
    ///
    /// The role ARN is derived from the naming strategy, so this document can
    /// be attached before the role itself exists.
    pub fn bucket_access(bucket_arn: &str, role_arn: &str) -> Self {
        Self::new(vec![Statement {
            sid: Some("AllowRoleAccess".to_string()),
            effect: Effect::Allow,
            principal: Some(Principal::Aws(role_arn.to_string())),
            action: s3_object_actions(),
            resource: vec![bucket_arn.to_string(), format!("{bucket_arn}/*")],
        }])
    }

    /// Topic policy allowing CloudWatch to publish alarm notifications.
    pub fn topic_publish(topic_arn: &str) -> Self {
        Self::new(vec![Statement {
            sid: None,
            effect: Effect::Allow,
            principal: Some(Principal::Service("cloudwatch.amazonaws.com".to_string())),
            action: vec!["sns:Publish".to_string()],
            resource: vec![topic_arn.to_string()],
        }])
    }

    /// Serialize to the JSON form the remote API expects.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn s3_object_actions() -> Vec<String> {
    [
        "s3:GetObject",
        "s3:PutObject",
        "s3:ListBucket",
        "s3:DeleteObject",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
