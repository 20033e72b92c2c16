// tests/coordinator_test.rs
//! Command dispatch and lifecycle scenarios against in-memory collaborators

mod common;

use bloc_miner_control::coordinator::FrontendConfig;
use bloc_miner_control::network::template::SHOW_ALL_MARKER;
use bloc_miner_control::{HardwareProfile, LifecycleState, MinerError, UiEvent};
use common::{Harness, MockBackend, MockPoolApi, assert_fatal, fatal_messages};
use serde_json::{Value, json};
use std::fs;
use std::sync::atomic::Ordering;

fn configure_payload(hardware_type: u8) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "address": "addr1",
        "pool": "pool1",
        "coinType": "BLOC",
        "coinAlgo": "cryptonight_haven",
        "xmrigAlgo": "cryptonight-heavy",
        "xmrigVariant": "xhv",
        "hardwareType": hardware_type,
        "threads": 4,
        "maxCPU": 80
    }))
    .unwrap()
}

#[tokio::test]
async fn fresh_session_reports_default_config() {
    let harness = Harness::fresh(MockBackend::default(), MockPoolApi::with_pools(1));

    assert_eq!(
        harness.coordinator.lifecycle_state().await,
        LifecycleState::Unconfigured
    );
    let session = harness.coordinator.session_config().await;
    assert_eq!(session.hardware_profile, HardwareProfile::Cpu);
    assert_eq!(session.session_id.len(), 36);

    let reply = harness.coordinator.handle("get-config", &[]).await.unwrap();
    let config: FrontendConfig = serde_json::from_str(reply.as_str().unwrap()).unwrap();
    assert_eq!(config.hardware_type, HardwareProfile::Cpu);
    assert_eq!(config.coin_type, "BLOC");
    assert_eq!(config.backend_algo, "cryptonight-heavy");
}

#[tokio::test]
async fn save_configuration_writes_cpu_endpoint() {
    let harness = Harness::fresh(MockBackend::default(), MockPoolApi::with_pools(2));

    let reply = harness
        .coordinator
        .handle("save-configuration", &configure_payload(1))
        .await
        .unwrap();
    assert_eq!(reply, json!("Ok"));

    let written = harness.backend.written();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].endpoint, "p1:1111");
    assert_eq!(written[0].address, "addr1");
    assert_eq!(written[0].coin_algo, "cryptonight_haven");
    assert_eq!(written[0].processing.threads, 4);
    assert_eq!(written[0].processing.max_usage, 80);

    let saved = harness.store.saved.lock().unwrap().clone();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].address, "addr1");
    assert_eq!(saved[0].pool_id, "pool1");
    assert!(saved[0].miner.is_some());

    let created = harness.factory.created.lock().unwrap().clone();
    assert_eq!(created[0].hardware_profile, HardwareProfile::Cpu);
    assert!(created[0].path.ends_with("miner/xmrig"));

    assert_eq!(
        harness.coordinator.lifecycle_state().await,
        LifecycleState::Configured
    );
}

#[tokio::test]
async fn empty_backend_variant_replaces_the_previous_one() {
    let harness = Harness::fresh(MockBackend::default(), MockPoolApi::with_pools(1));
    let payload = json!({
        "address": "addr1",
        "pool": "pool1",
        "coinType": "OTHER",
        "coinAlgo": "cn",
        "xmrigAlgo": "cn/r",
        "xmrigVariant": "",
        "hardwareType": 1
    });

    harness
        .coordinator
        .handle("save-configuration", &serde_json::to_vec(&payload).unwrap())
        .await
        .unwrap();

    let written = harness.backend.written();
    assert_eq!(written[0].coin_algo, "cn");
    assert_eq!(written[0].backend_algo, "cn/r");
    assert_eq!(written[0].backend_variant, "");

    let session = harness.coordinator.session_config().await;
    assert_eq!(session.coin_type, "OTHER");
    assert_eq!(session.backend_variant, "");
}

#[tokio::test]
async fn endpoint_follows_hardware_profile() {
    for (code, expected) in [(2u8, "p1:2222"), (0, "p1:3333"), (3, "p1:3333"), (255, "p1:3333")] {
        let harness = Harness::fresh(MockBackend::default(), MockPoolApi::with_pools(1));
        harness
            .coordinator
            .handle("save-configuration", &configure_payload(code))
            .await
            .unwrap();

        assert_eq!(harness.backend.written()[0].endpoint, expected, "profile {}", code);
        let created = harness.factory.created.lock().unwrap().clone();
        assert_eq!(created[0].hardware_profile, HardwareProfile::from(code));
    }
}

#[tokio::test]
async fn stop_failure_is_reported_once_without_terminating() {
    let mut harness = Harness::configured(MockBackend::failing_stop("E"), MockPoolApi::default());

    let err = harness.coordinator.handle("stop", &[]).await.unwrap_err();
    assert!(err.to_string().contains('E'));

    let messages = fatal_messages(&harness.drain_events());
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("'Backend error: E'"));
    assert!(!*harness.coordinator.termination().borrow());
}

#[tokio::test]
async fn stop_without_backend_is_silent() {
    let mut harness = Harness::fresh(MockBackend::default(), MockPoolApi::default());

    let reply = harness.coordinator.handle("stop", &[]).await.unwrap();
    assert_eq!(reply, Value::Null);
    assert!(harness.drain_events().is_empty());
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test]
async fn pool_list_is_idempotent() {
    let harness = Harness::fresh(MockBackend::default(), MockPoolApi::with_pools(4));
    let payload = br#"{"coinType":"XHV"}"#;

    let first = harness.coordinator.handle("get-pool-list", payload).await.unwrap();
    let second = harness.coordinator.handle("get-pool-list", payload).await.unwrap();

    assert_eq!(first, second);
    let markup = first.as_str().unwrap();
    assert_eq!(markup.matches(SHOW_ALL_MARKER).count(), 1);
    assert!(markup.find("pool3").unwrap() < markup.find(SHOW_ALL_MARKER).unwrap());
    assert!(markup.find(SHOW_ALL_MARKER).unwrap() < markup.find("pool4").unwrap());
    assert_eq!(harness.coordinator.session_config().await.coin_type, "XHV");
}

#[tokio::test]
async fn pool_list_uses_installed_template() {
    let harness = Harness::fresh(MockBackend::default(), MockPoolApi::with_pools(2));
    let resources = harness.dir.path().join("resources");
    fs::create_dir_all(&resources).unwrap();
    fs::write(resources.join("pool.html"), "<li>{{name}}@{{mining_ports.cpu}}</li>").unwrap();

    let reply = harness
        .coordinator
        .handle("get-pool-list", br#"{"coinType":"BLOC"}"#)
        .await
        .unwrap();
    assert_eq!(reply, json!("<li>Pool 1@p1:1111</li><li>Pool 2@p2:1111</li>"));
}

#[tokio::test(start_paused = true)]
async fn fatal_error_waits_for_acknowledgement() {
    let mut harness = Harness::fresh(MockBackend::default(), MockPoolApi::default());
    let coordinator = harness.coordinator.clone();
    let mut termination = coordinator.termination();

    let pending = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.handle("save-configuration", b"not json").await })
    };

    let event = harness.events.recv().await.unwrap();
    assert!(matches!(event, UiEvent::FatalError { .. }));
    assert!(!*termination.borrow());

    coordinator.handle("acknowledge-fatal", &[]).await.unwrap();
    termination.wait_for(|fatal| *fatal).await.unwrap();

    let err = pending.await.unwrap().unwrap_err();
    assert!(err.is_fatal());
    assert!(harness.drain_events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pool_list_failure_is_fatal() {
    let pools = MockPoolApi {
        fail_list: true,
        ..MockPoolApi::default()
    };
    let mut harness = Harness::fresh(MockBackend::default(), pools);

    let err = harness
        .coordinator
        .handle("get-pool-list", br#"{"coinType":"BLOC"}"#)
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    assert!(err.to_string().contains("service unavailable"));
    assert_eq!(fatal_messages(&harness.drain_events()).len(), 1);
    assert!(*harness.coordinator.termination().borrow());
}

#[tokio::test(start_paused = true)]
async fn missing_miner_executable_is_fatal() {
    let mut harness = Harness::fresh(MockBackend::default(), MockPoolApi::with_pools(1));
    fs::remove_file(harness.dir.path().join("miner").join("xmrig")).unwrap();

    let err = harness
        .coordinator
        .handle("save-configuration", &configure_payload(1))
        .await
        .unwrap_err();

    assert_fatal(&mut harness, &err, "Could not determine the miner type");
    assert!(harness.factory.created.lock().unwrap().is_empty());
    assert!(harness.store.saved.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn backend_construction_failure_is_fatal() {
    let mut harness = Harness::fresh(MockBackend::default(), MockPoolApi::with_pools(1));
    harness.factory.fail_create.store(true, Ordering::SeqCst);

    let err = harness
        .coordinator
        .handle("save-configuration", &configure_payload(1))
        .await
        .unwrap_err();

    assert_fatal(&mut harness, &err, "cannot use");
    assert!(harness.backend.written().is_empty());
    assert_eq!(
        harness.coordinator.lifecycle_state().await,
        LifecycleState::Unconfigured
    );
}

#[tokio::test(start_paused = true)]
async fn unknown_pool_is_fatal() {
    let mut harness = Harness::fresh(MockBackend::default(), MockPoolApi::with_pools(1));
    let payload = json!({"address": "addr1", "pool": "nope", "hardwareType": 1});

    let err = harness
        .coordinator
        .handle("save-configuration", &serde_json::to_vec(&payload).unwrap())
        .await
        .unwrap_err();

    assert_fatal(&mut harness, &err, "unknown pool nope");
    assert!(harness.backend.written().is_empty());
    assert!(harness.store.saved.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn backend_config_write_failure_is_fatal() {
    let mut harness = Harness::fresh(MockBackend::failing_write("EACCES"), MockPoolApi::with_pools(1));

    let err = harness
        .coordinator
        .handle("save-configuration", &configure_payload(1))
        .await
        .unwrap_err();

    assert_fatal(&mut harness, &err, "EACCES");
    assert!(harness.store.saved.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn session_save_failure_is_fatal() {
    let mut harness = Harness::fresh(MockBackend::default(), MockPoolApi::with_pools(1));
    harness.store.fail_save.store(true, Ordering::SeqCst);

    let err = harness
        .coordinator
        .handle("save-configuration", &configure_payload(1))
        .await
        .unwrap_err();

    assert_fatal(&mut harness, &err, "read-only volume");
    assert_eq!(harness.backend.written().len(), 1);
}

#[tokio::test]
async fn reconfiguring_while_running_is_rejected() {
    let harness = Harness::configured(MockBackend::default(), MockPoolApi::with_pools(1));
    harness.coordinator.handle("start", &[]).await.unwrap();
    assert_eq!(
        harness.coordinator.lifecycle_state().await,
        LifecycleState::Running
    );

    let err = harness
        .coordinator
        .handle("save-configuration", &configure_payload(1))
        .await
        .unwrap_err();

    assert!(matches!(err, MinerError::InvalidTransition(_)));
    assert!(harness.backend.written().is_empty());
    assert_eq!(harness.factory.created.lock().unwrap().len(), 1);
    assert_eq!(harness.backend.calls(), vec!["start"]);
    assert!(!*harness.coordinator.termination().borrow());
}

#[tokio::test]
async fn stop_then_reconfigure_replaces_backend() {
    let harness = Harness::configured(MockBackend::default(), MockPoolApi::with_pools(1));
    harness.coordinator.handle("start", &[]).await.unwrap();
    harness.coordinator.handle("stop", &[]).await.unwrap();

    harness
        .coordinator
        .handle("save-configuration", &configure_payload(2))
        .await
        .unwrap();

    assert_eq!(harness.factory.created.lock().unwrap().len(), 2);
    assert_eq!(
        harness.coordinator.session_config().await.hardware_profile,
        HardwareProfile::Gpu
    );
}

#[tokio::test]
async fn start_requires_configuration() {
    let mut harness = Harness::fresh(MockBackend::default(), MockPoolApi::default());

    let err = harness.coordinator.handle("start", &[]).await.unwrap_err();
    assert!(matches!(err, MinerError::InvalidTransition(_)));
    assert!(harness.drain_events().is_empty());
}

#[tokio::test]
async fn second_start_is_a_no_op() {
    let harness = Harness::configured(MockBackend::default(), MockPoolApi::default());
    harness.coordinator.handle("start", &[]).await.unwrap();
    harness.coordinator.handle("start", &[]).await.unwrap();
    assert_eq!(harness.backend.calls(), vec!["start"]);
}

#[tokio::test(start_paused = true)]
async fn start_failure_is_fatal() {
    let mut harness = Harness::configured(MockBackend::failing_start("no exec"), MockPoolApi::default());

    let err = harness.coordinator.handle("start", &[]).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("'mock'"));

    let messages = fatal_messages(&harness.drain_events());
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("no exec"));
    assert!(*harness.coordinator.termination().borrow());
    assert_eq!(
        harness.coordinator.lifecycle_state().await,
        LifecycleState::Configured
    );
}

#[tokio::test]
async fn unknown_command_is_returned_to_caller() {
    let mut harness = Harness::fresh(MockBackend::default(), MockPoolApi::default());

    let err = harness.coordinator.handle("dance", &[]).await.unwrap_err();
    assert_eq!(err.to_string(), "'dance' is an unknown command");
    assert!(harness.drain_events().is_empty());
}

#[tokio::test]
async fn processing_config_needs_a_backend() {
    let mut harness = Harness::fresh(MockBackend::default(), MockPoolApi::default());

    let reply = harness
        .coordinator
        .handle("get-processing-config", &[])
        .await
        .unwrap();
    assert_eq!(reply, json!(""));
    assert_eq!(fatal_messages(&harness.drain_events()).len(), 1);
    assert!(!*harness.coordinator.termination().borrow());
}

#[tokio::test]
async fn processing_config_refreshes_stats_first() {
    let harness = Harness::configured(MockBackend::default(), MockPoolApi::default());

    let reply = harness
        .coordinator
        .handle("get-processing-config", &[])
        .await
        .unwrap();
    let config: Value = serde_json::from_str(reply.as_str().unwrap()).unwrap();
    assert_eq!(config, json!({"threads": 4, "maxUsage": 80}));
    assert_eq!(harness.backend.calls(), vec!["stats"]);
}

#[tokio::test]
async fn content_is_validated_json() {
    let harness = Harness::fresh(MockBackend::default(), MockPoolApi::default());
    assert_eq!(
        harness.coordinator.handle("get-content", &[]).await.unwrap(),
        json!("")
    );

    let resources = harness.dir.path().join("resources");
    fs::create_dir_all(&resources).unwrap();
    fs::write(resources.join("content.json"), "{not json").unwrap();
    assert_eq!(
        harness.coordinator.handle("get-content", &[]).await.unwrap(),
        json!("")
    );

    fs::write(resources.join("content.json"), r#"{"news":[]}"#).unwrap();
    assert_eq!(
        harness.coordinator.handle("get-content", &[]).await.unwrap(),
        json!(r#"{"news":[]}"#)
    );
}

#[tokio::test]
async fn backend_kind_and_path_describe_the_installation() {
    let harness = Harness::fresh(MockBackend::default(), MockPoolApi::default());

    let kind = harness.coordinator.handle("get-backend-kind", &[]).await.unwrap();
    assert_eq!(kind, json!("xmrig"));

    let path = harness.coordinator.handle("get-backend-path", &[]).await.unwrap();
    assert_eq!(
        path,
        json!(harness.dir.path().join("miner").display().to_string())
    );

    fs::remove_file(harness.dir.path().join("miner").join("xmrig")).unwrap();
    let kind = harness.coordinator.handle("get-backend-kind", &[]).await.unwrap();
    assert_eq!(kind, json!(""));
}

#[tokio::test]
async fn identity_is_a_string() {
    let harness = Harness::fresh(MockBackend::default(), MockPoolApi::default());
    let identity = harness.coordinator.handle("get-identity", &[]).await.unwrap();
    assert!(identity.is_string());
}

#[tokio::test]
async fn shutdown_stops_backend_and_joins_pollers() {
    let harness = Harness::configured(MockBackend::default(), MockPoolApi::with_pools(1));
    harness.coordinator.handle("start", &[]).await.unwrap();

    let poller = harness.coordinator.spawn_pollers();
    harness.coordinator.shutdown(poller).await.unwrap();

    assert!(harness.backend.calls().contains(&"stop"));
    assert_eq!(
        harness.coordinator.lifecycle_state().await,
        LifecycleState::Configured
    );
}
