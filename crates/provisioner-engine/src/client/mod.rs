//! Resource client facade
//!
//! Narrow surface between the orchestrator and remote provider APIs: one
//! operation per resource kind and verb, taking plain typed parameters and
//! returning already-classified errors. The orchestrator never touches SDK
//! types; tests substitute a recording fake.
//!
//! No operation here is assumed atomic or reversible. Compensation is the
//! orchestrator's job.

pub mod aws;

use std::future::Future;

pub use aws::{AwsContext, AwsResourceClient};

use crate::error::ProvisionError;

type Outcome<T> = Result<T, ProvisionError>;

/// Parameters for bucket creation.
///
/// The access policy references the role by its derived ARN; the role does
/// not exist yet when the bucket is created.
#[derive(Debug, Clone)]
pub struct BucketParams {
    pub name: String,
    pub access_policy_json: String,
    pub tags: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct RoleParams {
    pub name: String,
    pub trust_policy_json: String,
    pub inline_policy_name: String,
    pub inline_policy_json: String,
    pub tags: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct LogGroupParams {
    pub name: String,
    pub retention_days: Option<i32>,
    pub tags: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct FunctionParams {
    pub name: String,
    pub execution_role_arn: String,
    /// Injected into the function environment as `TARGET_BUCKET`
    pub target_bucket: String,
    pub tags: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct EventRuleParams {
    pub name: String,
    pub pattern_json: String,
}

#[derive(Debug, Clone)]
pub struct TopicParams {
    pub name: String,
    pub tags: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct AlarmParams {
    pub name: String,
    pub description: String,
    pub metric_name: String,
    pub namespace: String,
    pub statistic: String,
    pub period_seconds: i32,
    pub evaluation_periods: i32,
    pub threshold: f64,
    pub dimensions: Vec<(String, String)>,
    pub alarm_actions: Vec<String>,
}

/// Provider operations needed by the provisioning pipeline.
///
/// Readiness probes (`bucket_ready`, `role_ready`) answer whether the
/// resource is observable yet; the bounded wait combinator drives them.
/// Deletes report `NotFound` for missing resources and leave the
/// treat-as-success decision to the caller.
pub trait ResourceClient: Send + Sync {
    fn create_bucket(&self, params: &BucketParams) -> impl Future<Output = Outcome<String>> + Send;
    fn bucket_ready(&self, name: &str) -> impl Future<Output = Outcome<bool>> + Send;
    fn delete_bucket(&self, name: &str) -> impl Future<Output = Outcome<()>> + Send;

    /// Returns the role ARN.
    fn create_role(&self, params: &RoleParams) -> impl Future<Output = Outcome<String>> + Send;
    fn role_ready(&self, name: &str) -> impl Future<Output = Outcome<bool>> + Send;
    /// Removes the inline policy, then the role.
    fn delete_role(&self, name: &str) -> impl Future<Output = Outcome<()>> + Send;

    fn create_log_group(
        &self,
        params: &LogGroupParams,
    ) -> impl Future<Output = Outcome<String>> + Send;
    fn delete_log_group(&self, name: &str) -> impl Future<Output = Outcome<()>> + Send;

    /// Returns the function ARN.
    fn create_function(
        &self,
        params: &FunctionParams,
    ) -> impl Future<Output = Outcome<String>> + Send;
    fn delete_function(&self, name: &str) -> impl Future<Output = Outcome<()>> + Send;

    /// Creates the rule without any target; targets are attached separately
    /// so a failed attach can still roll the rule back.
    fn create_event_rule(
        &self,
        params: &EventRuleParams,
    ) -> impl Future<Output = Outcome<String>> + Send;
    fn attach_rule_target(
        &self,
        rule_name: &str,
        target_id: &str,
        target_arn: &str,
    ) -> impl Future<Output = Outcome<()>> + Send;
    /// Removes targets, then the rule.
    fn delete_event_rule(&self, name: &str) -> impl Future<Output = Outcome<()>> + Send;

    /// Returns the topic ARN; the CloudWatch publish policy is applied as
    /// part of creation.
    fn create_topic(&self, params: &TopicParams) -> impl Future<Output = Outcome<String>> + Send;
    fn delete_topic(&self, arn: &str) -> impl Future<Output = Outcome<()>> + Send;

    fn put_alarm(&self, params: &AlarmParams) -> impl Future<Output = Outcome<String>> + Send;
    fn delete_alarms(&self, names: &[String]) -> impl Future<Output = Outcome<()>> + Send;
}
