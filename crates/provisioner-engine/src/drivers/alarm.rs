//! Monitoring alarm step
//!
//! Two alarms per client, created together and rolled back as one unit:
//! an error-rate alarm on the client's custom error metric and a log-volume
//! alarm on the client log group. Both notify the client alert topic.

use crate::client::{AlarmParams, ResourceClient};
use crate::drivers::{ignore_not_found, StepContext};
use crate::error::ProvisionError;

const PERIOD_SECONDS: i32 = 300;

fn error_rate_params(ctx: &StepContext<'_>, topic_arn: &str) -> AlarmParams {
    AlarmParams {
        name: ctx.names.error_alarm.clone(),
        description: format!("Error rate for client {}", ctx.client_id),
        metric_name: "ErrorCount".to_string(),
        namespace: "Custom/ClientLogs".to_string(),
        statistic: "Sum".to_string(),
        period_seconds: PERIOD_SECONDS,
        evaluation_periods: 1,
        threshold: 10.0,
        dimensions: vec![("ClientID".to_string(), ctx.client_id.to_string())],
        alarm_actions: vec![topic_arn.to_string()],
    }
}

fn log_volume_params(ctx: &StepContext<'_>, topic_arn: &str) -> AlarmParams {
    AlarmParams {
        name: ctx.names.log_volume_alarm.clone(),
        description: format!("Log volume for client {}", ctx.client_id),
        metric_name: "IncomingLogEvents".to_string(),
        namespace: "AWS/Logs".to_string(),
        statistic: "Sum".to_string(),
        period_seconds: PERIOD_SECONDS,
        evaluation_periods: 2,
        threshold: 1000.0,
        dimensions: vec![(
            "LogGroupName".to_string(),
            ctx.names.log_group.clone(),
        )],
        alarm_actions: vec![topic_arn.to_string()],
    }
}

/// Both alarm names for a client, whether or not they exist yet. Used to
/// clean up the whole unit after a partial creation failure.
pub fn alarm_names(ctx: &StepContext<'_>) -> Vec<String> {
    vec![
        ctx.names.error_alarm.clone(),
        ctx.names.log_volume_alarm.clone(),
    ]
}

/// Create both alarms; either failure fails the step.
pub async fn create_all<C: ResourceClient>(
    client: &C,
    ctx: &StepContext<'_>,
    topic_arn: &str,
) -> Result<Vec<String>, ProvisionError> {
    let error_rate = error_rate_params(ctx, topic_arn);
    let log_volume = log_volume_params(ctx, topic_arn);
    let (first, second) = tokio::join!(client.put_alarm(&error_rate), client.put_alarm(&log_volume));
    match (first, second) {
        (Ok(a), Ok(b)) => Ok(vec![a, b]),
        (Err(e), _) | (_, Err(e)) => Err(e),
    }
}

pub async fn delete_all<C: ResourceClient>(
    client: &C,
    names: &[String],
) -> Result<(), ProvisionError> {
    ignore_not_found(client.delete_alarms(names).await)
}
