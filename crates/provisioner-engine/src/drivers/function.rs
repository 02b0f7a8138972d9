//! Log-processor function step
//!
//! The function runs under the client role and writes into the client
//! bucket, wired through the `TARGET_BUCKET` environment variable.

use provisioner_common::{role_arn, tags};

use crate::client::{FunctionParams, ResourceClient};
use crate::drivers::{ignore_not_found, StepContext};
use crate::error::ProvisionError;

/// Returns the function ARN.
pub async fn create<C: ResourceClient>(
    client: &C,
    ctx: &StepContext<'_>,
) -> Result<String, ProvisionError> {
    let params = FunctionParams {
        name: ctx.names.function.clone(),
        execution_role_arn: role_arn(ctx.account_id, &ctx.names.role),
        target_bucket: ctx.names.bucket.clone(),
        tags: tags::standard_tags(ctx.environment, ctx.client_id),
    };
    client.create_function(&params).await
}

pub async fn delete<C: ResourceClient>(client: &C, name: &str) -> Result<(), ProvisionError> {
    ignore_not_found(client.delete_function(name).await)
}
