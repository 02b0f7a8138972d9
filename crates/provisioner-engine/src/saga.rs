//! Provisioning orchestrator
//!
//! Runs the fixed forward pass (bucket, role, log group, function, event
//! rule, topic, alarms), recording every successful creation. On any
//! failure the pass stops and every recorded resource is deleted in exact
//! reverse creation order; every delete is attempted even when earlier
//! deletes fail, and rollback errors are aggregated next to the original
//! cause rather than replacing it.

use provisioner_common::{names, ResourceKind, ResourceNames};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::ResourceClient;
use crate::config::ProvisionerConfig;
use crate::drivers::{alarm, bucket, event_rule, function, log_group, role, topic, StepContext};
use crate::error::{ProvisionError, ProvisionFailure, RollbackError};
use crate::models::{ProvisionRequest, ProvisionReceipt};
use crate::state::{ProvisioningState, ResourceId};
use crate::wait::WaitConfig;

type StepResult<T> = Result<T, (ResourceKind, ProvisionError)>;

pub struct Provisioner<C> {
    client: C,
    config: ProvisionerConfig,
    bucket_wait: WaitConfig,
    role_wait: WaitConfig,
}

impl<C: ResourceClient> Provisioner<C> {
    pub fn new(client: C, config: ProvisionerConfig) -> Self {
        Self {
            client,
            config,
            bucket_wait: WaitConfig::bucket(),
            role_wait: WaitConfig::role(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Override the propagation wait budgets. Tests shrink the intervals.
    pub fn with_waits(mut self, bucket_wait: WaitConfig, role_wait: WaitConfig) -> Self {
        self.bucket_wait = bucket_wait;
        self.role_wait = role_wait;
        self
    }

    /// Provision the full resource chain for one client.
    ///
    /// Either every resource exists (receipt) or the attempt failed and
    /// everything it created has been deleted, with any leftover deletions
    /// reported in the failure.
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<ProvisionReceipt, ProvisionFailure> {
        request.validate().map_err(ProvisionFailure::before_start)?;
        let account_id = self
            .config
            .account_id()
            .map_err(|e| ProvisionFailure::before_start(ProvisionError::Validation(e.to_string())))?
            .to_string();

        let names = ResourceNames::for_client(&self.config.environment, &request.client_id);
        let ctx = StepContext {
            names: &names,
            environment: &self.config.environment,
            region: &self.config.aws_region,
            account_id: &account_id,
            client_id: &request.client_id,
        };

        info!(
            client_id = %request.client_id,
            client_name = %request.client_name,
            environment = %self.config.environment,
            "provisioning client infrastructure"
        );

        let mut state = ProvisioningState::new();
        match self.forward(&ctx, &mut state, cancel).await {
            Ok(receipt) => {
                info!(client_id = %request.client_id, "provisioning complete");
                Ok(receipt)
            }
            Err((step, cause)) => {
                warn!(
                    client_id = %request.client_id,
                    step = %step,
                    error = %cause,
                    created = state.len(),
                    "provisioning failed, rolling back"
                );
                let rollback_errors = self.rollback(&mut state).await;
                Err(ProvisionFailure {
                    step: Some(step),
                    cause,
                    rollback_errors,
                })
            }
        }
    }

    async fn forward(
        &self,
        ctx: &StepContext<'_>,
        state: &mut ProvisioningState,
        cancel: Option<&CancellationToken>,
    ) -> StepResult<ProvisionReceipt> {
        let client = &self.client;

        check_cancelled(cancel, ResourceKind::Bucket)?;
        let bucket_name = bucket::create(client, ctx).await.map_err(at(ResourceKind::Bucket))?;
        // Recorded before the wait: a propagation timeout still means the
        // bucket exists and must be rolled back.
        state.record(ResourceId::Bucket(bucket_name.clone()));
        bucket::await_ready(client, ctx, &self.bucket_wait, cancel)
            .await
            .map_err(at(ResourceKind::Bucket))?;

        check_cancelled(cancel, ResourceKind::Role)?;
        let role_arn = role::create(client, ctx).await.map_err(at(ResourceKind::Role))?;
        state.record(ResourceId::Role(ctx.names.role.clone()));
        role::await_ready(client, ctx, &self.role_wait, cancel)
            .await
            .map_err(at(ResourceKind::Role))?;

        check_cancelled(cancel, ResourceKind::LogGroup)?;
        let log_group_name = log_group::create(client, ctx)
            .await
            .map_err(at(ResourceKind::LogGroup))?;
        state.record(ResourceId::LogGroup(log_group_name.clone()));

        check_cancelled(cancel, ResourceKind::Function)?;
        let function_arn = function::create(client, ctx)
            .await
            .map_err(at(ResourceKind::Function))?;
        state.record(ResourceId::Function(ctx.names.function.clone()));

        check_cancelled(cancel, ResourceKind::EventRule)?;
        let rule_name = event_rule::create(client, ctx)
            .await
            .map_err(at(ResourceKind::EventRule))?;
        // Recorded between rule creation and target attachment, so a failed
        // attach still rolls the rule back.
        state.record(ResourceId::EventRule(rule_name.clone()));
        event_rule::attach_target(client, ctx, &function_arn)
            .await
            .map_err(at(ResourceKind::EventRule))?;

        check_cancelled(cancel, ResourceKind::Topic)?;
        let topic_arn = topic::create(client, ctx).await.map_err(at(ResourceKind::Topic))?;
        state.record(ResourceId::Topic(topic_arn.clone()));

        check_cancelled(cancel, ResourceKind::Alarm)?;
        match alarm::create_all(client, ctx, &topic_arn).await {
            Ok(alarm_names) => state.record(ResourceId::Alarms(alarm_names)),
            Err(e) => {
                // The pair is one rollback unit: a partial failure records
                // both names so cleanup deletes whichever alarm exists.
                state.record(ResourceId::Alarms(alarm::alarm_names(ctx)));
                return Err((ResourceKind::Alarm, e));
            }
        }

        Ok(ProvisionReceipt {
            status: "success",
            bucket_name,
            role_arn,
            log_group_name,
            function_arn,
            event_rule_name: rule_name,
            topic_arn,
        })
    }

    /// Delete everything recorded, newest first, attempting every delete.
    async fn rollback(&self, state: &mut ProvisioningState) -> Vec<RollbackError> {
        let mut failures = Vec::new();
        for resource in state.drain_reverse() {
            let result = self.delete_resource(&resource).await;
            match result {
                Ok(()) => info!(resource = %resource, "rolled back"),
                Err(error) => {
                    warn!(resource = %resource, error = %error, "rollback delete failed");
                    failures.push(RollbackError { resource, error });
                }
            }
        }
        failures
    }

    async fn delete_resource(&self, resource: &ResourceId) -> Result<(), ProvisionError> {
        let client = &self.client;
        match resource {
            ResourceId::Bucket(name) => bucket::delete(client, name).await,
            ResourceId::Role(name) => role::delete(client, name).await,
            ResourceId::LogGroup(name) => log_group::delete(client, name).await,
            ResourceId::Function(name) => function::delete(client, name).await,
            ResourceId::EventRule(name) => event_rule::delete(client, name).await,
            ResourceId::Topic(arn) => topic::delete(client, arn).await,
            ResourceId::Alarms(alarm_names) => alarm::delete_all(client, alarm_names).await,
        }
    }

    /// Tear down every resource a client may have, in reverse provisioning
    /// order, regardless of what actually exists. Missing resources are
    /// skipped; real delete failures are aggregated.
    pub async fn deprovision(&self, client_id: &str) -> Result<Vec<RollbackError>, ProvisionError> {
        let request = ProvisionRequest {
            client_id: client_id.to_string(),
            client_name: "teardown".to_string(),
        };
        request.validate()?;
        let account_id = self
            .config
            .account_id()
            .map_err(|e| ProvisionError::Validation(e.to_string()))?
            .to_string();

        let n = ResourceNames::for_client(&self.config.environment, client_id);
        let topic_arn = names::topic_arn(&self.config.aws_region, &account_id, &n.topic);

        info!(client_id = %client_id, "tearing down client infrastructure");

        let mut state = ProvisioningState::new();
        state.record(ResourceId::Bucket(n.bucket.clone()));
        state.record(ResourceId::Role(n.role.clone()));
        state.record(ResourceId::LogGroup(n.log_group.clone()));
        state.record(ResourceId::Function(n.function.clone()));
        state.record(ResourceId::EventRule(n.event_rule.clone()));
        state.record(ResourceId::Topic(topic_arn));
        state.record(ResourceId::Alarms(vec![
            n.error_alarm.clone(),
            n.log_volume_alarm.clone(),
        ]));

        Ok(self.rollback(&mut state).await)
    }
}

fn at(step: ResourceKind) -> impl Fn(ProvisionError) -> (ResourceKind, ProvisionError) {
    move |e| (step, e)
}

fn check_cancelled(
    cancel: Option<&CancellationToken>,
    step: ResourceKind,
) -> Result<(), (ResourceKind, ProvisionError)> {
    if let Some(token) = cancel {
        if token.is_cancelled() {
            return Err((
                step,
                ProvisionError::Cancelled {
                    context: format!("{step} step"),
                },
            ));
        }
    }
    Ok(())
}
