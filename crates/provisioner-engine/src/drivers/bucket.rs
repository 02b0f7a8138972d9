//! Client bucket step
//!
//! The bucket's access policy names the client role by its derived ARN;
//! the role is created later in the pipeline, which IAM permits as long as
//! the ARN is well formed.

use provisioner_common::{bucket_arn, policy::PolicyDocument, role_arn, tags, ResourceKind};
use tokio_util::sync::CancellationToken;

use crate::client::{BucketParams, ResourceClient};
use crate::drivers::{ignore_not_found, policy_json, StepContext};
use crate::error::ProvisionError;
use crate::wait::{wait_until_ready, WaitConfig};

pub async fn create<C: ResourceClient>(
    client: &C,
    ctx: &StepContext<'_>,
) -> Result<String, ProvisionError> {
    let bucket = &ctx.names.bucket;
    let access_policy = PolicyDocument::bucket_access(
        &bucket_arn(bucket),
        &role_arn(ctx.account_id, &ctx.names.role),
    );
    let params = BucketParams {
        name: bucket.clone(),
        access_policy_json: policy_json(ResourceKind::Bucket, bucket, &access_policy)?,
        tags: tags::standard_tags(ctx.environment, ctx.client_id),
    };
    client.create_bucket(&params).await
}

/// Poll until the bucket answers HEAD requests.
pub async fn await_ready<C: ResourceClient>(
    client: &C,
    ctx: &StepContext<'_>,
    wait: &WaitConfig,
    cancel: Option<&CancellationToken>,
) -> Result<(), ProvisionError> {
    wait_until_ready(wait, cancel, &ctx.names.bucket, || {
        client.bucket_ready(&ctx.names.bucket)
    })
    .await
}

pub async fn delete<C: ResourceClient>(client: &C, name: &str) -> Result<(), ProvisionError> {
    ignore_not_found(client.delete_bucket(name).await)
}
