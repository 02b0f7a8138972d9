//! End-to-end orchestrator behavior against the recording fake

mod support;

use std::time::Duration;

use provisioner_common::ResourceKind;
use provisioner_engine::wait::WaitConfig;
use provisioner_engine::{
    Provisioner, ProvisionerConfig, ProvisionError, ProvisionRequest,
};
use support::{Call, FakeResourceClient, ACCOUNT_ID};
use tokio_util::sync::CancellationToken;

fn config() -> ProvisionerConfig {
    ProvisionerConfig {
        environment: "dev".to_string(),
        aws_region: "us-east-1".to_string(),
        aws_account_id: Some(ACCOUNT_ID.to_string()),
    }
}

fn instant_waits() -> (WaitConfig, WaitConfig) {
    let wait = WaitConfig {
        max_attempts: 10,
        interval: Duration::ZERO,
    };
    (wait.clone(), wait)
}

fn provisioner(client: FakeResourceClient) -> Provisioner<FakeResourceClient> {
    let (bucket_wait, role_wait) = instant_waits();
    Provisioner::new(client, config()).with_waits(bucket_wait, role_wait)
}

fn acme_request() -> ProvisionRequest {
    ProvisionRequest {
        client_id: "acme".to_string(),
        client_name: "Acme Corp".to_string(),
    }
}

fn creates(calls: &[Call]) -> Vec<&Call> {
    calls
        .iter()
        .filter(|c| {
            matches!(
                c,
                Call::CreateBucket(_)
                    | Call::CreateRole(_)
                    | Call::CreateLogGroup(_)
                    | Call::CreateFunction(_)
                    | Call::CreateEventRule(_)
                    | Call::CreateTopic(_)
                    | Call::PutAlarm(_)
            )
        })
        .collect()
}

#[tokio::test]
async fn happy_path_yields_full_receipt() {
    let provisioner = provisioner(FakeResourceClient::new());
    let receipt = provisioner
        .provision(&acme_request(), None)
        .await
        .expect("provisioning should succeed");

    assert_eq!(receipt.status, "success");
    assert_eq!(receipt.bucket_name, "dev-acme-bucket");
    assert_eq!(
        receipt.role_arn,
        format!("arn:aws:iam::{ACCOUNT_ID}:role/dev-acme-role")
    );
    assert_eq!(receipt.log_group_name, "dev-acme-logs");
    assert!(receipt.function_arn.ends_with(":function:dev-acme-log-processor"));
    assert_eq!(receipt.event_rule_name, "dev-acme-log-rule");
    assert!(receipt.topic_arn.ends_with(":dev-acme-alerts"));

    let calls = provisioner.client().calls();
    let created: Vec<&Call> = creates(&calls);
    assert_eq!(created.len(), 8, "one create per resource, two alarms");

    // Fixed forward order, target attached after rule creation
    let rule_pos = calls
        .iter()
        .position(|c| matches!(c, Call::CreateEventRule(_)))
        .unwrap();
    let attach_pos = calls
        .iter()
        .position(|c| matches!(c, Call::AttachRuleTarget { .. }))
        .unwrap();
    assert!(rule_pos < attach_pos);
    assert!(matches!(
        &calls[attach_pos],
        Call::AttachRuleTarget { rule, target_id, target_arn }
            if rule == "dev-acme-log-rule"
                && target_id == "ProcessLogsFunction"
                && target_arn.ends_with(":function:dev-acme-log-processor")
    ));
}

#[tokio::test]
async fn function_failure_rolls_back_in_reverse_order() {
    let client = FakeResourceClient::new();
    client.fail_op(
        "create_function",
        ProvisionError::Permanent {
            kind: ResourceKind::Function,
            identifier: "dev-acme-log-processor".to_string(),
            code: Some("InvalidParameterValueException".to_string()),
            message: "role not assumable".to_string(),
        },
    );
    let provisioner = provisioner(client);

    let failure = provisioner
        .provision(&acme_request(), None)
        .await
        .expect_err("function creation failure must fail the attempt");

    assert_eq!(failure.step, Some(ResourceKind::Function));
    assert!(failure.rolled_back_cleanly());
    assert!(matches!(failure.cause, ProvisionError::Permanent { .. }));

    let calls = provisioner.client().calls();
    let deletes: Vec<&Call> = calls
        .iter()
        .filter(|c| {
            matches!(
                c,
                Call::DeleteBucket(_)
                    | Call::DeleteRole(_)
                    | Call::DeleteLogGroup(_)
                    | Call::DeleteFunction(_)
                    | Call::DeleteEventRule(_)
                    | Call::DeleteTopic(_)
                    | Call::DeleteAlarms(_)
            )
        })
        .collect();
    assert_eq!(
        deletes,
        vec![
            &Call::DeleteLogGroup("dev-acme-logs".to_string()),
            &Call::DeleteRole("dev-acme-role".to_string()),
            &Call::DeleteBucket("dev-acme-bucket".to_string()),
        ],
        "reverse creation order, nothing else deleted"
    );

    // Later steps never ran
    assert!(!calls.iter().any(|c| matches!(c, Call::CreateEventRule(_))));
    assert!(!calls.iter().any(|c| matches!(c, Call::CreateTopic(_))));
    assert!(!calls.iter().any(|c| matches!(c, Call::PutAlarm(_))));
}

#[tokio::test]
async fn rollback_attempts_every_delete_despite_failures() {
    let client = FakeResourceClient::new();
    client.fail_op(
        "create_function",
        ProvisionError::Validation("induced".to_string()),
    );
    client.fail_op(
        "delete_role",
        ProvisionError::Transient {
            kind: ResourceKind::Role,
            identifier: "dev-acme-role".to_string(),
            message: "throttled".to_string(),
        },
    );
    let provisioner = provisioner(client);

    let failure = provisioner.provision(&acme_request(), None).await.unwrap_err();

    // The original cause survives; the rollback failure is reported beside it
    assert!(matches!(failure.cause, ProvisionError::Validation(_)));
    assert_eq!(failure.rollback_errors.len(), 1);
    assert!(matches!(
        failure.rollback_errors[0].error,
        ProvisionError::Transient { .. }
    ));

    // The bucket delete after the failed role delete was still attempted
    let calls = provisioner.client().calls();
    assert!(calls.contains(&Call::DeleteBucket("dev-acme-bucket".to_string())));
    assert!(!provisioner.client().exists("dev-acme-bucket"));
}

#[tokio::test]
async fn propagation_timeout_counts_resource_as_created() {
    let client = FakeResourceClient::new();
    client.not_ready_for("dev-acme-role", u32::MAX);
    let provisioner = provisioner(client);

    let failure = provisioner.provision(&acme_request(), None).await.unwrap_err();

    assert_eq!(failure.step, Some(ResourceKind::Role));
    assert!(matches!(
        failure.cause,
        ProvisionError::PropagationTimeout { attempts: 10, .. }
    ));

    // The role was created before the wait, so it must be rolled back
    let calls = provisioner.client().calls();
    assert_eq!(
        calls
            .iter()
            .filter(|c| matches!(c, Call::RoleReady(_)))
            .count(),
        10
    );
    assert!(calls.contains(&Call::DeleteRole("dev-acme-role".to_string())));
    assert!(calls.contains(&Call::DeleteBucket("dev-acme-bucket".to_string())));
    assert!(failure.rolled_back_cleanly());
}

#[tokio::test]
async fn failed_target_attach_rolls_back_the_rule() {
    let client = FakeResourceClient::new();
    client.fail_op(
        "attach_rule_target",
        ProvisionError::Permanent {
            kind: ResourceKind::EventRule,
            identifier: "dev-acme-log-rule".to_string(),
            code: None,
            message: "rejected".to_string(),
        },
    );
    let provisioner = provisioner(client);

    let failure = provisioner.provision(&acme_request(), None).await.unwrap_err();

    assert_eq!(failure.step, Some(ResourceKind::EventRule));
    let calls = provisioner.client().calls();
    assert!(calls.contains(&Call::DeleteEventRule("dev-acme-log-rule".to_string())));
    assert!(failure.rolled_back_cleanly());
}

#[tokio::test]
async fn partial_alarm_failure_cleans_up_both_alarms() {
    let client = FakeResourceClient::new();
    client.fail(
        "put_alarm",
        "acme-log-volume-alarm",
        ProvisionError::Permanent {
            kind: ResourceKind::Alarm,
            identifier: "acme-log-volume-alarm".to_string(),
            code: None,
            message: "rejected".to_string(),
        },
    );
    let provisioner = provisioner(client);

    let failure = provisioner.provision(&acme_request(), None).await.unwrap_err();

    assert_eq!(failure.step, Some(ResourceKind::Alarm));
    assert!(failure.rolled_back_cleanly());

    // Both names are deleted as one unit even though only one was created
    let calls = provisioner.client().calls();
    assert!(calls.contains(&Call::DeleteAlarms(vec![
        "acme-error-rate-alarm".to_string(),
        "acme-log-volume-alarm".to_string(),
    ])));
    assert!(!provisioner.client().exists("acme-error-rate-alarm"));
}

#[tokio::test]
async fn cancellation_before_any_step_creates_nothing() {
    let provisioner = provisioner(FakeResourceClient::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let failure = provisioner
        .provision(&acme_request(), Some(&cancel))
        .await
        .unwrap_err();

    assert_eq!(failure.step, Some(ResourceKind::Bucket));
    assert!(matches!(failure.cause, ProvisionError::Cancelled { .. }));
    assert!(failure.rolled_back_cleanly());
    assert!(creates(&provisioner.client().calls()).is_empty());
}

#[tokio::test]
async fn cancellation_mid_pass_rolls_back_created_resources() {
    let client = FakeResourceClient::new();
    // Park the attempt in the role propagation wait, then cancel
    client.not_ready_for("dev-acme-role", u32::MAX);
    let (bucket_wait, _) = instant_waits();
    let role_wait = WaitConfig {
        max_attempts: 1_000,
        interval: Duration::from_millis(20),
    };
    let provisioner = Provisioner::new(client, config()).with_waits(bucket_wait, role_wait);
    let cancel = CancellationToken::new();

    let attempt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let result = provisioner.provision(&acme_request(), Some(&cancel)).await;
            (provisioner, result)
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    let (provisioner, result) = attempt.await.unwrap();

    let failure = result.expect_err("cancellation must fail the attempt");
    assert_eq!(failure.step, Some(ResourceKind::Role));
    assert!(matches!(failure.cause, ProvisionError::Cancelled { .. }));
    assert!(failure.rolled_back_cleanly());

    // Everything created before the cancellation is deleted, newest first
    let calls = provisioner.client().calls();
    let role_delete = calls
        .iter()
        .position(|c| matches!(c, Call::DeleteRole(_)))
        .expect("role must be rolled back");
    let bucket_delete = calls
        .iter()
        .position(|c| matches!(c, Call::DeleteBucket(_)))
        .expect("bucket must be rolled back");
    assert!(role_delete < bucket_delete);
    assert!(!provisioner.client().exists("dev-acme-bucket"));
    assert!(!provisioner.client().exists("dev-acme-role"));
}

#[tokio::test]
async fn invalid_request_rejected_before_any_call() {
    let provisioner = provisioner(FakeResourceClient::new());
    let request = ProvisionRequest {
        client_id: "Acme Corp".to_string(),
        client_name: "Acme".to_string(),
    };

    let failure = provisioner.provision(&request, None).await.unwrap_err();

    assert_eq!(failure.step, None);
    assert!(matches!(failure.cause, ProvisionError::Validation(_)));
    assert!(provisioner.client().calls().is_empty());
}

#[tokio::test]
async fn reprovisioning_an_existing_client_conflicts() {
    let provisioner = provisioner(FakeResourceClient::new());
    provisioner.provision(&acme_request(), None).await.unwrap();

    let failure = provisioner.provision(&acme_request(), None).await.unwrap_err();
    assert_eq!(failure.step, Some(ResourceKind::Bucket));
    assert!(failure.cause.is_conflict());
    // The first attempt's resources are untouched
    assert!(provisioner.client().exists("dev-acme-bucket"));
    assert!(provisioner.client().exists("dev-acme-logs"));
}

#[tokio::test]
async fn deprovision_deletes_everything_in_reverse_order() {
    let provisioner = provisioner(FakeResourceClient::new());
    provisioner.provision(&acme_request(), None).await.unwrap();

    let failures = provisioner.deprovision("acme").await.unwrap();
    assert!(failures.is_empty());

    for identifier in [
        "dev-acme-bucket",
        "dev-acme-role",
        "dev-acme-logs",
        "dev-acme-log-processor",
        "dev-acme-log-rule",
    ] {
        assert!(
            !provisioner.client().exists(identifier),
            "{identifier} should be gone"
        );
    }
}

#[tokio::test]
async fn deprovision_of_absent_client_is_clean() {
    let provisioner = provisioner(FakeResourceClient::new());
    // Nothing exists; every delete reports NotFound, which is success
    let failures = provisioner.deprovision("ghost").await.unwrap();
    assert!(failures.is_empty());
}
