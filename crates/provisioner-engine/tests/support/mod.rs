//! Recording in-memory resource client for orchestrator tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use provisioner_common::ResourceKind;
use provisioner_engine::client::{
    AlarmParams, BucketParams, EventRuleParams, FunctionParams, LogGroupParams, ResourceClient,
    RoleParams, TopicParams,
};
use provisioner_engine::ProvisionError;

pub const ACCOUNT_ID: &str = "123456789012";

/// Every facade call, in invocation order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateBucket(String),
    BucketReady(String),
    DeleteBucket(String),
    CreateRole(String),
    RoleReady(String),
    DeleteRole(String),
    CreateLogGroup(String),
    DeleteLogGroup(String),
    CreateFunction(String),
    DeleteFunction(String),
    CreateEventRule(String),
    AttachRuleTarget {
        rule: String,
        target_id: String,
        target_arn: String,
    },
    DeleteEventRule(String),
    CreateTopic(String),
    DeleteTopic(String),
    PutAlarm(String),
    DeleteAlarms(Vec<String>),
}

/// In-memory facade: creations populate a resource set, deletions drain it,
/// and a missing resource deletes as `NotFound`. Failures are injected per
/// (operation, identifier); `"*"` matches any identifier.
#[derive(Default)]
pub struct FakeResourceClient {
    calls: Mutex<Vec<Call>>,
    existing: Mutex<HashSet<String>>,
    fail_on: Mutex<HashMap<(String, String), ProvisionError>>,
    not_ready_polls: Mutex<HashMap<String, u32>>,
}

impl FakeResourceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a failure for one operation and identifier.
    pub fn fail(&self, op: &str, identifier: &str, error: ProvisionError) {
        self.fail_on
            .lock()
            .unwrap()
            .insert((op.to_string(), identifier.to_string()), error);
    }

    /// Inject a failure for one operation regardless of identifier.
    pub fn fail_op(&self, op: &str, error: ProvisionError) {
        self.fail(op, "*", error);
    }

    /// Report the resource as not ready for the first `polls` probes.
    pub fn not_ready_for(&self, name: &str, polls: u32) {
        self.not_ready_polls
            .lock()
            .unwrap()
            .insert(name.to_string(), polls);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn exists(&self, identifier: &str) -> bool {
        self.existing.lock().unwrap().contains(identifier)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn injected(&self, op: &str, identifier: &str) -> Option<ProvisionError> {
        let fail_on = self.fail_on.lock().unwrap();
        fail_on
            .get(&(op.to_string(), identifier.to_string()))
            .or_else(|| fail_on.get(&(op.to_string(), "*".to_string())))
            .cloned()
    }

    fn create(&self, kind: ResourceKind, op: &str, identifier: &str) -> Result<(), ProvisionError> {
        if let Some(error) = self.injected(op, identifier) {
            return Err(error);
        }
        let mut existing = self.existing.lock().unwrap();
        if !existing.insert(identifier.to_string()) {
            return Err(ProvisionError::Conflict {
                kind,
                identifier: identifier.to_string(),
            });
        }
        Ok(())
    }

    fn delete(&self, kind: ResourceKind, op: &str, identifier: &str) -> Result<(), ProvisionError> {
        if let Some(error) = self.injected(op, identifier) {
            return Err(error);
        }
        if self.existing.lock().unwrap().remove(identifier) {
            Ok(())
        } else {
            Err(ProvisionError::NotFound {
                kind,
                identifier: identifier.to_string(),
            })
        }
    }

    fn probe(&self, op: &str, name: &str) -> Result<bool, ProvisionError> {
        if let Some(error) = self.injected(op, name) {
            return Err(error);
        }
        let mut polls = self.not_ready_polls.lock().unwrap();
        match polls.get_mut(name) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Ok(false)
            }
            _ => Ok(true),
        }
    }
}

impl ResourceClient for FakeResourceClient {
    async fn create_bucket(&self, params: &BucketParams) -> Result<String, ProvisionError> {
        self.record(Call::CreateBucket(params.name.clone()));
        self.create(ResourceKind::Bucket, "create_bucket", &params.name)?;
        Ok(params.name.clone())
    }

    async fn bucket_ready(&self, name: &str) -> Result<bool, ProvisionError> {
        self.record(Call::BucketReady(name.to_string()));
        self.probe("bucket_ready", name)
    }

    async fn delete_bucket(&self, name: &str) -> Result<(), ProvisionError> {
        self.record(Call::DeleteBucket(name.to_string()));
        self.delete(ResourceKind::Bucket, "delete_bucket", name)
    }

    async fn create_role(&self, params: &RoleParams) -> Result<String, ProvisionError> {
        self.record(Call::CreateRole(params.name.clone()));
        self.create(ResourceKind::Role, "create_role", &params.name)?;
        Ok(format!("arn:aws:iam::{ACCOUNT_ID}:role/{}", params.name))
    }

    async fn role_ready(&self, name: &str) -> Result<bool, ProvisionError> {
        self.record(Call::RoleReady(name.to_string()));
        self.probe("role_ready", name)
    }

    async fn delete_role(&self, name: &str) -> Result<(), ProvisionError> {
        self.record(Call::DeleteRole(name.to_string()));
        self.delete(ResourceKind::Role, "delete_role", name)
    }

    async fn create_log_group(&self, params: &LogGroupParams) -> Result<String, ProvisionError> {
        self.record(Call::CreateLogGroup(params.name.clone()));
        self.create(ResourceKind::LogGroup, "create_log_group", &params.name)?;
        Ok(params.name.clone())
    }

    async fn delete_log_group(&self, name: &str) -> Result<(), ProvisionError> {
        self.record(Call::DeleteLogGroup(name.to_string()));
        self.delete(ResourceKind::LogGroup, "delete_log_group", name)
    }

    async fn create_function(&self, params: &FunctionParams) -> Result<String, ProvisionError> {
        self.record(Call::CreateFunction(params.name.clone()));
        self.create(ResourceKind::Function, "create_function", &params.name)?;
        Ok(format!(
            "arn:aws:lambda:us-east-1:{ACCOUNT_ID}:function:{}",
            params.name
        ))
    }

    async fn delete_function(&self, name: &str) -> Result<(), ProvisionError> {
        self.record(Call::DeleteFunction(name.to_string()));
        self.delete(ResourceKind::Function, "delete_function", name)
    }

    async fn create_event_rule(&self, params: &EventRuleParams) -> Result<String, ProvisionError> {
        self.record(Call::CreateEventRule(params.name.clone()));
        self.create(ResourceKind::EventRule, "create_event_rule", &params.name)?;
        Ok(params.name.clone())
    }

    async fn attach_rule_target(
        &self,
        rule_name: &str,
        target_id: &str,
        target_arn: &str,
    ) -> Result<(), ProvisionError> {
        self.record(Call::AttachRuleTarget {
            rule: rule_name.to_string(),
            target_id: target_id.to_string(),
            target_arn: target_arn.to_string(),
        });
        if let Some(error) = self.injected("attach_rule_target", rule_name) {
            return Err(error);
        }
        Ok(())
    }

    async fn delete_event_rule(&self, name: &str) -> Result<(), ProvisionError> {
        self.record(Call::DeleteEventRule(name.to_string()));
        self.delete(ResourceKind::EventRule, "delete_event_rule", name)
    }

    async fn create_topic(&self, params: &TopicParams) -> Result<String, ProvisionError> {
        self.record(Call::CreateTopic(params.name.clone()));
        let arn = format!("arn:aws:sns:us-east-1:{ACCOUNT_ID}:{}", params.name);
        self.create(ResourceKind::Topic, "create_topic", &arn)?;
        Ok(arn)
    }

    async fn delete_topic(&self, arn: &str) -> Result<(), ProvisionError> {
        self.record(Call::DeleteTopic(arn.to_string()));
        self.delete(ResourceKind::Topic, "delete_topic", arn)
    }

    async fn put_alarm(&self, params: &AlarmParams) -> Result<String, ProvisionError> {
        self.record(Call::PutAlarm(params.name.clone()));
        self.create(ResourceKind::Alarm, "put_alarm", &params.name)?;
        Ok(params.name.clone())
    }

    async fn delete_alarms(&self, names: &[String]) -> Result<(), ProvisionError> {
        self.record(Call::DeleteAlarms(names.to_vec()));
        if let Some(error) = self.injected("delete_alarms", "*") {
            return Err(error);
        }
        let mut existing = self.existing.lock().unwrap();
        let mut any = false;
        for name in names {
            any |= existing.remove(name);
        }
        if any {
            Ok(())
        } else {
            Err(ProvisionError::NotFound {
                kind: ResourceKind::Alarm,
                identifier: names.join(", "),
            })
        }
    }
}
