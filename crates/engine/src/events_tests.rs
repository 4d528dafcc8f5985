use super::*;
use crate::context::Context;
use kgsm_adapters::{FakeSocketTransport, FakeWebhookTransport};
use kgsm_config::document::Value;

fn dispatcher() -> EventDispatcher<FakeSocketTransport, FakeWebhookTransport> {
    EventDispatcher::new(FakeSocketTransport::default(), FakeWebhookTransport::default())
}

#[tokio::test]
async fn emit_is_a_no_op_when_no_transport_is_enabled() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let dispatcher = dispatcher();

    dispatcher
        .emit(
            &ctx,
            EventType::InstanceCreated,
            EventData::Instance {
                instance_name: "factorio".into(),
                blueprint: Some("factorio".into()),
            },
        )
        .await
        .expect("emit");
}

#[tokio::test]
async fn emit_sends_one_ndjson_line_over_the_socket_when_enabled() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    ctx.config_store
        .set(&ctx.config_path(), "enable_event_broadcasting", Value::Scalar("true".into()), None)
        .expect("set");

    let socket = FakeSocketTransport::default();
    let dispatcher = EventDispatcher::new(socket.clone(), FakeWebhookTransport::default());

    dispatcher
        .emit(
            &ctx,
            EventType::InstanceStarted,
            EventData::Instance {
                instance_name: "factorio".into(),
                blueprint: None,
            },
        )
        .await
        .expect("emit");

    let sent = socket.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].socket_path, ctx.event_socket_path());
    assert!(sent[0].line.contains("instance_started"));
    assert!(sent[0].line.ends_with('\n'));
}

#[tokio::test]
async fn emit_fans_out_to_every_configured_webhook_url() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    ctx.config_store
        .set(&ctx.config_path(), "enable_webhook_events", Value::Scalar("true".into()), None)
        .expect("set");
    ctx.config_store
        .set(
            &ctx.config_path(),
            "webhook_urls",
            Value::Scalar("https://a.example/hook, https://b.example/hook".into()),
            None,
        )
        .expect("set");

    let webhook = FakeWebhookTransport::default();
    let dispatcher = EventDispatcher::new(FakeSocketTransport::default(), webhook.clone());

    dispatcher
        .emit(
            &ctx,
            EventType::InstanceUpdated,
            EventData::Instance {
                instance_name: "factorio".into(),
                blueprint: None,
            },
        )
        .await
        .expect("emit");

    let calls = webhook.calls.lock();
    assert_eq!(calls.len(), 2);
    let mut urls: Vec<_> = calls.iter().map(|c| c.url.clone()).collect();
    urls.sort();
    assert_eq!(urls, vec!["https://a.example/hook", "https://b.example/hook"]);
}

#[tokio::test]
async fn emit_rejects_a_mismatched_event_data_shape() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ctx = Context::for_test(dir.path().to_path_buf());
    let dispatcher = dispatcher();

    let err = dispatcher
        .emit(
            &ctx,
            EventType::InstanceVersionUpdated,
            EventData::Instance {
                instance_name: "factorio".into(),
                blueprint: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Envelope(_)));
}
