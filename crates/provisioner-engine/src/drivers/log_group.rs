//! Client log group step

use provisioner_common::tags;

use crate::client::{LogGroupParams, ResourceClient};
use crate::drivers::{ignore_not_found, StepContext};
use crate::error::ProvisionError;

pub async fn create<C: ResourceClient>(
    client: &C,
    ctx: &StepContext<'_>,
) -> Result<String, ProvisionError> {
    let params = LogGroupParams {
        name: ctx.names.log_group.clone(),
        retention_days: None,
        tags: tags::standard_tags(ctx.environment, ctx.client_id),
    };
    client.create_log_group(&params).await
}

pub async fn delete<C: ResourceClient>(client: &C, name: &str) -> Result<(), ProvisionError> {
    ignore_not_found(client.delete_log_group(name).await)
}
