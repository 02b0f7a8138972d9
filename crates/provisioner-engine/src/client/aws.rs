//! AWS SDK implementation of the resource client facade

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use provisioner_common::ResourceKind;
use tracing::{debug, info};

use crate::client::{
    AlarmParams, BucketParams, EventRuleParams, FunctionParams, LogGroupParams, ResourceClient,
    RoleParams, TopicParams,
};
use crate::error::{classify_aws_error, ProvisionError};

/// Shared AWS configuration context.
///
/// Loads SDK configuration once; every service client is created from the
/// same config.
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
}

impl AwsContext {
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            config: Arc::new(config),
            region: region.to_string(),
        }
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Resolve the account id of the active credentials via STS.
    pub async fn account_id(&self) -> anyhow::Result<String> {
        let identity = aws_sdk_sts::Client::new(self.sdk_config())
            .get_caller_identity()
            .send()
            .await
            .context("failed to resolve account id via STS")?;
        identity
            .account()
            .map(str::to_string)
            .context("STS caller identity carried no account id")
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Map an SDK operation error onto the provisioning taxonomy using its
/// typed error code.
fn classify_sdk<E>(kind: ResourceKind, identifier: &str, err: &SdkError<E>) -> ProvisionError
where
    E: ProvideErrorMetadata,
{
    classify_aws_error(kind, identifier, err.code(), err.message())
}

/// Map a client-side builder rejection (missing required field).
fn build_error(
    kind: ResourceKind,
    identifier: &str,
    err: impl std::fmt::Display,
) -> ProvisionError {
    ProvisionError::Permanent {
        kind,
        identifier: identifier.to_string(),
        code: None,
        message: format!("invalid request parameters: {err}"),
    }
}

/// Inline source of the log-processor function; copies each triggering
/// event into the client bucket.
const LOG_PROCESSOR_SOURCE: &str = r#"const { S3Client, PutObjectCommand } = require('@aws-sdk/client-s3');

const s3 = new S3Client({});

exports.handler = async (event) => {
    const key = `events/${Date.now()}.json`;
    await s3.send(new PutObjectCommand({
        Bucket: process.env.TARGET_BUCKET,
        Key: key,
        Body: JSON.stringify(event),
        ContentType: 'application/json',
    }));
    return { statusCode: 200, key };
};
"#;

/// Zip a single in-memory source file for a function deployment package.
fn zip_inline_source(file_name: &str, source: &str) -> zip::result::ZipResult<Vec<u8>> {
    use std::io::Write;

    let mut buffer = std::io::Cursor::new(Vec::new());
    let mut writer = zip::ZipWriter::new(&mut buffer);
    writer.start_file(file_name, zip::write::SimpleFileOptions::default())?;
    writer.write_all(source.as_bytes())?;
    writer.finish()?;
    Ok(buffer.into_inner())
}

/// Resource client backed by the AWS SDK, one service client per API.
pub struct AwsResourceClient {
    s3: aws_sdk_s3::Client,
    iam: aws_sdk_iam::Client,
    logs: aws_sdk_cloudwatchlogs::Client,
    lambda: aws_sdk_lambda::Client,
    events: aws_sdk_eventbridge::Client,
    sns: aws_sdk_sns::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
    region: String,
}

impl AwsResourceClient {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            s3: aws_sdk_s3::Client::new(ctx.sdk_config()),
            iam: aws_sdk_iam::Client::new(ctx.sdk_config()),
            logs: aws_sdk_cloudwatchlogs::Client::new(ctx.sdk_config()),
            lambda: aws_sdk_lambda::Client::new(ctx.sdk_config()),
            events: aws_sdk_eventbridge::Client::new(ctx.sdk_config()),
            sns: aws_sdk_sns::Client::new(ctx.sdk_config()),
            cloudwatch: aws_sdk_cloudwatch::Client::new(ctx.sdk_config()),
            region: ctx.region().to_string(),
        }
    }
}

impl ResourceClient for AwsResourceClient {
    async fn create_bucket(&self, params: &BucketParams) -> Result<String, ProvisionError> {
        use aws_sdk_s3::types::{
            BucketLocationConstraint, BucketVersioningStatus, CreateBucketConfiguration,
            ServerSideEncryption, ServerSideEncryptionByDefault, ServerSideEncryptionConfiguration,
            ServerSideEncryptionRule, Tag, Tagging, VersioningConfiguration,
        };

        let name = params.name.as_str();
        info!(bucket = %name, region = %self.region, "creating bucket");

        let mut request = self.s3.create_bucket().bucket(name);
        // us-east-1 is the default location and rejects an explicit constraint
        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        request
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Bucket, name, &e))?;

        self.s3
            .put_bucket_versioning()
            .bucket(name)
            .versioning_configuration(
                VersioningConfiguration::builder()
                    .status(BucketVersioningStatus::Enabled)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Bucket, name, &e))?;

        let encryption = ServerSideEncryptionConfiguration::builder()
            .rules(
                ServerSideEncryptionRule::builder()
                    .apply_server_side_encryption_by_default(
                        ServerSideEncryptionByDefault::builder()
                            .sse_algorithm(ServerSideEncryption::Aes256)
                            .build()
                            .map_err(|e| build_error(ResourceKind::Bucket, name, e))?,
                    )
                    .build(),
            )
            .build()
            .map_err(|e| build_error(ResourceKind::Bucket, name, e))?;
        self.s3
            .put_bucket_encryption()
            .bucket(name)
            .server_side_encryption_configuration(encryption)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Bucket, name, &e))?;

        self.s3
            .put_bucket_policy()
            .bucket(name)
            .policy(&params.access_policy_json)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Bucket, name, &e))?;

        let mut tag_set = Vec::with_capacity(params.tags.len());
        for (key, value) in &params.tags {
            tag_set.push(
                Tag::builder()
                    .key(key)
                    .value(value)
                    .build()
                    .map_err(|e| build_error(ResourceKind::Bucket, name, e))?,
            );
        }
        self.s3
            .put_bucket_tagging()
            .bucket(name)
            .tagging(
                Tagging::builder()
                    .set_tag_set(Some(tag_set))
                    .build()
                    .map_err(|e| build_error(ResourceKind::Bucket, name, e))?,
            )
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Bucket, name, &e))?;

        debug!(bucket = %name, "bucket configured");
        Ok(name.to_string())
    }

    async fn bucket_ready(&self, name: &str) -> Result<bool, ProvisionError> {
        match self.s3.head_bucket().bucket(name).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let classified = classify_sdk(ResourceKind::Bucket, name, &e);
                if classified.is_not_found() {
                    Ok(false)
                } else {
                    Err(classified)
                }
            }
        }
    }

    async fn delete_bucket(&self, name: &str) -> Result<(), ProvisionError> {
        info!(bucket = %name, "deleting bucket and contents");

        // The bucket is versioned, so emptying it means deleting every
        // object version and delete marker, not just the current objects.
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;
        loop {
            let mut request = self.s3.list_object_versions().bucket(name);
            if let Some(marker) = &key_marker {
                request = request.key_marker(marker);
            }
            if let Some(marker) = &version_id_marker {
                request = request.version_id_marker(marker);
            }
            let response = request
                .send()
                .await
                .map_err(|e| classify_sdk(ResourceKind::Bucket, name, &e))?;

            let entries = response
                .versions()
                .iter()
                .map(|v| (v.key(), v.version_id()))
                .chain(
                    response
                        .delete_markers()
                        .iter()
                        .map(|m| (m.key(), m.version_id())),
                );
            for (key, version_id) in entries {
                let Some(key) = key else { continue };
                let mut delete = self.s3.delete_object().bucket(name).key(key);
                if let Some(version_id) = version_id {
                    delete = delete.version_id(version_id);
                }
                delete
                    .send()
                    .await
                    .map_err(|e| classify_sdk(ResourceKind::Bucket, name, &e))?;
            }

            if response.is_truncated() == Some(true) {
                key_marker = response.next_key_marker().map(str::to_string);
                version_id_marker = response.next_version_id_marker().map(str::to_string);
            } else {
                break;
            }
        }

        self.s3
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Bucket, name, &e))?;
        Ok(())
    }

    async fn create_role(&self, params: &RoleParams) -> Result<String, ProvisionError> {
        use aws_sdk_iam::types::Tag;

        let name = params.name.as_str();
        info!(role = %name, "creating role");

        let mut request = self
            .iam
            .create_role()
            .role_name(name)
            .assume_role_policy_document(&params.trust_policy_json);
        for (key, value) in &params.tags {
            request = request.tags(
                Tag::builder()
                    .key(key)
                    .value(value)
                    .build()
                    .map_err(|e| build_error(ResourceKind::Role, name, e))?,
            );
        }
        let created = request
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Role, name, &e))?;

        self.iam
            .put_role_policy()
            .role_name(name)
            .policy_name(&params.inline_policy_name)
            .policy_document(&params.inline_policy_json)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Role, name, &e))?;

        created
            .role()
            .map(|role| role.arn().to_string())
            .ok_or_else(|| ProvisionError::Permanent {
                kind: ResourceKind::Role,
                identifier: name.to_string(),
                code: None,
                message: "create_role response carried no role".to_string(),
            })
    }

    async fn role_ready(&self, name: &str) -> Result<bool, ProvisionError> {
        match self.iam.get_role().role_name(name).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let classified = classify_sdk(ResourceKind::Role, name, &e);
                if classified.is_not_found() {
                    Ok(false)
                } else {
                    Err(classified)
                }
            }
        }
    }

    async fn delete_role(&self, name: &str) -> Result<(), ProvisionError> {
        info!(role = %name, "deleting role");

        // Inline policies block role deletion
        let policies = self
            .iam
            .list_role_policies()
            .role_name(name)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Role, name, &e))?;
        for policy_name in policies.policy_names() {
            self.iam
                .delete_role_policy()
                .role_name(name)
                .policy_name(policy_name)
                .send()
                .await
                .map_err(|e| classify_sdk(ResourceKind::Role, name, &e))?;
        }

        self.iam
            .delete_role()
            .role_name(name)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Role, name, &e))?;
        Ok(())
    }

    async fn create_log_group(&self, params: &LogGroupParams) -> Result<String, ProvisionError> {
        let name = params.name.as_str();
        info!(log_group = %name, "creating log group");

        let tags: HashMap<String, String> = params.tags.iter().cloned().collect();
        self.logs
            .create_log_group()
            .log_group_name(name)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::LogGroup, name, &e))?;

        if let Some(days) = params.retention_days {
            self.logs
                .put_retention_policy()
                .log_group_name(name)
                .retention_in_days(days)
                .send()
                .await
                .map_err(|e| classify_sdk(ResourceKind::LogGroup, name, &e))?;
        }

        Ok(name.to_string())
    }

    async fn delete_log_group(&self, name: &str) -> Result<(), ProvisionError> {
        info!(log_group = %name, "deleting log group");
        self.logs
            .delete_log_group()
            .log_group_name(name)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::LogGroup, name, &e))?;
        Ok(())
    }

    async fn create_function(&self, params: &FunctionParams) -> Result<String, ProvisionError> {
        use aws_sdk_lambda::primitives::Blob;
        use aws_sdk_lambda::types::{Environment, FunctionCode, Runtime};

        let name = params.name.as_str();
        info!(function = %name, "creating function");

        let package = zip_inline_source("index.js", LOG_PROCESSOR_SOURCE).map_err(|e| {
            ProvisionError::Permanent {
                kind: ResourceKind::Function,
                identifier: name.to_string(),
                code: None,
                message: format!("failed to package function source: {e}"),
            }
        })?;

        let tags: HashMap<String, String> = params.tags.iter().cloned().collect();
        let created = self
            .lambda
            .create_function()
            .function_name(name)
            .runtime(Runtime::Nodejs18x)
            .handler("index.handler")
            .role(&params.execution_role_arn)
            .code(FunctionCode::builder().zip_file(Blob::new(package)).build())
            .environment(
                Environment::builder()
                    .variables("TARGET_BUCKET", &params.target_bucket)
                    .build(),
            )
            .timeout(30)
            .memory_size(128)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Function, name, &e))?;

        created
            .function_arn()
            .map(str::to_string)
            .ok_or_else(|| ProvisionError::Permanent {
                kind: ResourceKind::Function,
                identifier: name.to_string(),
                code: None,
                message: "create_function response carried no ARN".to_string(),
            })
    }

    async fn delete_function(&self, name: &str) -> Result<(), ProvisionError> {
        info!(function = %name, "deleting function");
        self.lambda
            .delete_function()
            .function_name(name)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Function, name, &e))?;
        Ok(())
    }

    async fn create_event_rule(&self, params: &EventRuleParams) -> Result<String, ProvisionError> {
        use aws_sdk_eventbridge::types::RuleState;

        let name = params.name.as_str();
        info!(rule = %name, "creating event rule");

        self.events
            .put_rule()
            .name(name)
            .event_pattern(&params.pattern_json)
            .state(RuleState::Enabled)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::EventRule, name, &e))?;
        Ok(name.to_string())
    }

    async fn attach_rule_target(
        &self,
        rule_name: &str,
        target_id: &str,
        target_arn: &str,
    ) -> Result<(), ProvisionError> {
        use aws_sdk_eventbridge::types::Target;

        debug!(rule = %rule_name, target = %target_arn, "attaching rule target");
        let target = Target::builder()
            .id(target_id)
            .arn(target_arn)
            .build()
            .map_err(|e| build_error(ResourceKind::EventRule, rule_name, e))?;
        self.events
            .put_targets()
            .rule(rule_name)
            .targets(target)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::EventRule, rule_name, &e))?;
        Ok(())
    }

    async fn delete_event_rule(&self, name: &str) -> Result<(), ProvisionError> {
        info!(rule = %name, "deleting event rule");

        // Attached targets block rule deletion
        let targets = self
            .events
            .list_targets_by_rule()
            .rule(name)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::EventRule, name, &e))?;
        let ids: Vec<String> = targets
            .targets()
            .iter()
            .map(|t| t.id().to_string())
            .collect();
        if !ids.is_empty() {
            self.events
                .remove_targets()
                .rule(name)
                .set_ids(Some(ids))
                .send()
                .await
                .map_err(|e| classify_sdk(ResourceKind::EventRule, name, &e))?;
        }

        self.events
            .delete_rule()
            .name(name)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::EventRule, name, &e))?;
        Ok(())
    }

    async fn create_topic(&self, params: &TopicParams) -> Result<String, ProvisionError> {
        use aws_sdk_sns::types::Tag;

        let name = params.name.as_str();
        info!(topic = %name, "creating topic");

        let mut request = self.sns.create_topic().name(name);
        for (key, value) in &params.tags {
            request = request.tags(
                Tag::builder()
                    .key(key)
                    .value(value)
                    .build()
                    .map_err(|e| build_error(ResourceKind::Topic, name, e))?,
            );
        }
        let created = request
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Topic, name, &e))?;
        let arn = created
            .topic_arn()
            .map(str::to_string)
            .ok_or_else(|| ProvisionError::Permanent {
                kind: ResourceKind::Topic,
                identifier: name.to_string(),
                code: None,
                message: "create_topic response carried no ARN".to_string(),
            })?;

        // Alarms publish through CloudWatch, which needs explicit permission
        let policy = provisioner_common::policy::PolicyDocument::topic_publish(&arn)
            .to_json()
            .map_err(|e| build_error(ResourceKind::Topic, name, e))?;
        self.sns
            .set_topic_attributes()
            .topic_arn(&arn)
            .attribute_name("Policy")
            .attribute_value(policy)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Topic, &arn, &e))?;

        Ok(arn)
    }

    async fn delete_topic(&self, arn: &str) -> Result<(), ProvisionError> {
        info!(topic = %arn, "deleting topic");
        self.sns
            .delete_topic()
            .topic_arn(arn)
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Topic, arn, &e))?;
        Ok(())
    }

    async fn put_alarm(&self, params: &AlarmParams) -> Result<String, ProvisionError> {
        use aws_sdk_cloudwatch::types::{ComparisonOperator, Dimension, Statistic};

        let name = params.name.as_str();
        info!(alarm = %name, metric = %params.metric_name, "creating alarm");

        let mut request = self
            .cloudwatch
            .put_metric_alarm()
            .alarm_name(name)
            .alarm_description(&params.description)
            .metric_name(&params.metric_name)
            .namespace(&params.namespace)
            .statistic(Statistic::from(params.statistic.as_str()))
            .comparison_operator(ComparisonOperator::GreaterThanThreshold)
            .period(params.period_seconds)
            .evaluation_periods(params.evaluation_periods)
            .threshold(params.threshold);
        for (key, value) in &params.dimensions {
            request = request.dimensions(
                Dimension::builder().name(key).value(value).build(),
            );
        }
        for action in &params.alarm_actions {
            request = request.alarm_actions(action);
        }
        request
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Alarm, name, &e))?;
        Ok(name.to_string())
    }

    async fn delete_alarms(&self, names: &[String]) -> Result<(), ProvisionError> {
        info!(alarms = ?names, "deleting alarms");
        self.cloudwatch
            .delete_alarms()
            .set_alarm_names(Some(names.to_vec()))
            .send()
            .await
            .map_err(|e| classify_sdk(ResourceKind::Alarm, &names.join(", "), &e))?;
        Ok(())
    }
}
