//! Alert topic step

use provisioner_common::tags;

use crate::client::{ResourceClient, TopicParams};
use crate::drivers::{ignore_not_found, StepContext};
use crate::error::ProvisionError;

/// Returns the topic ARN.
pub async fn create<C: ResourceClient>(
    client: &C,
    ctx: &StepContext<'_>,
) -> Result<String, ProvisionError> {
    let params = TopicParams {
        name: ctx.names.topic.clone(),
        tags: tags::standard_tags(ctx.environment, ctx.client_id),
    };
    client.create_topic(&params).await
}

pub async fn delete<C: ResourceClient>(client: &C, arn: &str) -> Result<(), ProvisionError> {
    ignore_not_found(client.delete_topic(arn).await)
}
