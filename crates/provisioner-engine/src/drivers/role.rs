//! Client role step
//!
//! The role is the log-processor function's execution role, so the trust
//! policy lets Lambda assume it. Its inline policy grants object access on
//! the client bucket and log delivery into the client log group, both
//! referenced by derived ARN.

use provisioner_common::{
    bucket_arn, log_group_arn, policy::PolicyDocument, tags, ResourceKind,
};
use tokio_util::sync::CancellationToken;

use crate::client::{ResourceClient, RoleParams};
use crate::drivers::{ignore_not_found, policy_json, StepContext};
use crate::error::ProvisionError;
use crate::wait::{wait_until_ready, WaitConfig};

/// Returns the role ARN.
pub async fn create<C: ResourceClient>(
    client: &C,
    ctx: &StepContext<'_>,
) -> Result<String, ProvisionError> {
    let role = &ctx.names.role;
    let trust = PolicyDocument::trust_for_service("lambda.amazonaws.com");
    let access = PolicyDocument::role_access(
        &bucket_arn(&ctx.names.bucket),
        &log_group_arn(ctx.region, ctx.account_id, &ctx.names.log_group),
    );
    let params = RoleParams {
        name: role.clone(),
        trust_policy_json: policy_json(ResourceKind::Role, role, &trust)?,
        inline_policy_name: ctx.names.role_policy(),
        inline_policy_json: policy_json(ResourceKind::Role, role, &access)?,
        tags: tags::standard_tags(ctx.environment, ctx.client_id),
    };
    client.create_role(&params).await
}

/// Poll until IAM reports the role; dependent services lag role creation.
pub async fn await_ready<C: ResourceClient>(
    client: &C,
    ctx: &StepContext<'_>,
    wait: &WaitConfig,
    cancel: Option<&CancellationToken>,
) -> Result<(), ProvisionError> {
    wait_until_ready(wait, cancel, &ctx.names.role, || {
        client.role_ready(&ctx.names.role)
    })
    .await
}

pub async fn delete<C: ResourceClient>(client: &C, name: &str) -> Result<(), ProvisionError> {
    ignore_not_found(client.delete_role(name).await)
}
