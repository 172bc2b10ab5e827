use std::time::Duration;

use cirrus_core::CoreError;
use cirrus_provisioner::error::format_err_chain;
use cirrus_provisioner::{ErrorKind, ProvisionerError, Step};

fn transient() -> ProvisionerError {
    ProvisionerError::Transient {
        message: "agent pool is Updating".into(),
        retry_after: Duration::from_secs(20),
    }
}

#[test]
fn context_keeps_inner_classification() {
    let err = transient()
        .with_context(Step::Parameters, "agent pool", "my-rg", "pool1")
        .with_context(Step::Get, "agent pool", "my-rg", "pool1");

    assert_eq!(err.kind(), ErrorKind::Transient);
    assert_eq!(err.retry_after(), Some(Duration::from_secs(20)));
    assert!(matches!(err.root(), ProvisionerError::Transient { .. }));
}

#[test]
fn error_chain_is_joined() {
    let err = transient().with_context(Step::Parameters, "agent pool", "my-rg", "pool1");

    assert_eq!(
        format_err_chain(&err),
        "failed to build parameters for agent pool pool1 in resource group my-rg: \
         agent pool is Updating (retry after 20s)"
    );
}

#[test]
fn nested_context_names_each_cause_once() {
    let err = transient()
        .with_context(Step::Parameters, "agent pool", "my-rg", "pool1")
        .with_context(Step::Wait, "agent pool", "my-rg", "pool1");

    let chain = format_err_chain(&err);
    assert_eq!(chain.matches("agent pool is Updating").count(), 1, "{chain}");
    assert_eq!(chain.matches("failed to build parameters").count(), 1, "{chain}");
    assert_eq!(
        err.to_string(),
        "failed to wait for agent pool pool1 in resource group my-rg"
    );
}

#[test]
fn classification() {
    let not_found = ProvisionerError::NotFound {
        kind: "virtual machine".into(),
        resource_group: "my-rg".into(),
        name: "machine-0".into(),
    };
    assert!(not_found.is_not_found());
    assert!(!not_found.is_retryable());

    let transport = ProvisionerError::Transport {
        status: Some(503),
        message: "service unavailable".into(),
    };
    assert_eq!(transport.kind(), ErrorKind::Provider);
    assert!(transport.is_retryable());
    assert_eq!(transport.retry_after(), None);
    assert_eq!(
        transport.to_string(),
        "remote API error (HTTP 503): service unavailable"
    );

    let missing = ProvisionerError::DependencyMissing {
        kind: "network interface".into(),
        resource_group: "my-rg".into(),
        name: "nic".into(),
    };
    assert_eq!(missing.kind(), ErrorKind::Validation);
    assert!(!missing.is_retryable());
}

#[test]
fn image_errors_become_validation() {
    let err = ProvisionerError::from(CoreError::MissingImageField("Offer"));

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err.to_string(),
        "invalid resource spec: image reference cannot be generated, as Offer field is missing"
    );
}
