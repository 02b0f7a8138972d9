//! Log event rule step
//!
//! Matches CloudTrail `PutLogEvents` calls against the client log group and
//! routes them to the log-processor function. Rule creation and target
//! attachment are separate calls; the orchestrator records the rule between
//! them so a failed attach still rolls the rule back.

use crate::client::{EventRuleParams, ResourceClient};
use crate::drivers::{ignore_not_found, StepContext};
use crate::error::ProvisionError;

pub const TARGET_ID: &str = "ProcessLogsFunction";

fn log_event_pattern(log_group: &str) -> String {
    serde_json::json!({
        "source": ["aws.logs"],
        "detail-type": ["AWS API Call via CloudTrail"],
        "detail": {
            "eventSource": ["logs.amazonaws.com"],
            "eventName": ["PutLogEvents"],
            "requestParameters": {
                "logGroupName": [log_group]
            }
        }
    })
    .to_string()
}

/// Returns the rule name.
pub async fn create<C: ResourceClient>(
    client: &C,
    ctx: &StepContext<'_>,
) -> Result<String, ProvisionError> {
    let params = EventRuleParams {
        name: ctx.names.event_rule.clone(),
        pattern_json: log_event_pattern(&ctx.names.log_group),
    };
    client.create_event_rule(&params).await
}

pub async fn attach_target<C: ResourceClient>(
    client: &C,
    ctx: &StepContext<'_>,
    function_arn: &str,
) -> Result<(), ProvisionError> {
    client
        .attach_rule_target(&ctx.names.event_rule, TARGET_ID, function_arn)
        .await
}

pub async fn delete<C: ResourceClient>(client: &C, name: &str) -> Result<(), ProvisionError> {
    ignore_not_found(client.delete_event_rule(name).await)
}
