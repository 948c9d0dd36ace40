//! End-to-end dialog flows: voice turn, text turns, wake-word verification,
//! and the v2 multi-group variant.

mod mock_gateway;

use mock_gateway::{GatewayBehavior, MockGateway, Recorded, recorder};
use speechlink::{DialogAssistant, DialogConfig, SpeechClient, TaskState};
use std::time::Duration;

#[tokio::test]
async fn test_voice_turn_concludes_on_dialog_result() {
    let gateway = MockGateway::spawn(GatewayBehavior::Normal).await;
    let client = SpeechClient::with_endpoint(gateway.url(), "test-token").unwrap();
    let (listener, mut events) = recorder(false);

    let mut dialog = DialogAssistant::new(&client, DialogConfig::new("test-app"), listener)
        .await
        .unwrap();
    dialog.start().await.unwrap();
    assert_eq!(dialog.state(), TaskState::RequestConfirmed);

    dialog.send(vec![0u8; 3200]).await.unwrap();
    dialog.stop().await.unwrap();
    assert_eq!(dialog.state(), TaskState::Complete);

    // RecognitionCompleted arrives as an intermediate; DialogResultGenerated
    // concludes the turn.
    let mut saw_rec_completed = false;
    let mut result_payload = None;
    while let Ok(Some(recorded)) =
        tokio::time::timeout(Duration::from_secs(1), events.recv()).await
    {
        match recorded {
            Recorded::Started(_) => {}
            Recorded::Event(response) if response.name() == "RecognitionCompleted" => {
                saw_rec_completed = true;
            }
            Recorded::Event(_) => {}
            Recorded::Completed(response) => {
                result_payload = response.payload_str("action").map(str::to_string);
                break;
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert!(saw_rec_completed);
    assert_eq!(result_payload.as_deref(), Some("lights_on"));

    dialog.close().await;
}

#[tokio::test]
async fn test_text_turns_reuse_the_connection() {
    let gateway = MockGateway::spawn(GatewayBehavior::Normal).await;
    let client = SpeechClient::with_endpoint(gateway.url(), "test-token").unwrap();
    let (listener, mut events) = recorder(false);

    let mut dialog = DialogAssistant::new(&client, DialogConfig::new("test-app"), listener)
        .await
        .unwrap();
    dialog.add_dialog_param("device", serde_json::json!("kitchen-panel"));
    dialog.start().await.unwrap();
    let first_task = dialog.task_id().unwrap();

    dialog.query("what time is it").await.unwrap();
    let second_task = dialog.task_id().unwrap();
    assert_ne!(first_task, second_task);
    assert_eq!(dialog.state(), TaskState::Complete);

    // A further turn is legal after the previous one completed.
    dialog.query("and the weather").await.unwrap();
    assert_ne!(dialog.task_id().unwrap(), second_task);

    let mut completions = 0;
    while let Ok(Some(recorded)) =
        tokio::time::timeout(Duration::from_millis(500), events.recv()).await
    {
        if let Recorded::Completed(response) = recorded {
            assert_eq!(response.payload_str("action"), Some("answer"));
            completions += 1;
        }
    }
    assert_eq!(completions, 2);

    dialog.close().await;
}

#[tokio::test]
async fn test_wake_word_verification_accepted() {
    let gateway = MockGateway::spawn(GatewayBehavior::Normal).await;
    let client = SpeechClient::with_endpoint(gateway.url(), "test-token").unwrap();
    let (listener, mut events) = recorder(true);

    let config = DialogConfig {
        wake_word: Some("hey gadget".to_string()),
        enable_wake_word_verification: true,
        ..DialogConfig::new("test-app")
    };
    let mut dialog = DialogAssistant::new(&client, config, listener).await.unwrap();
    dialog.start().await.unwrap();
    assert!(!dialog.is_wake_word_verified());

    dialog.stop_wake_word_verification().await.unwrap();
    assert!(dialog.is_wake_word_verified());
    // An accepted wake word leaves the exchange running.
    assert_eq!(dialog.state(), TaskState::RequestConfirmed);

    let mut saw_wake_word = false;
    while let Ok(Some(recorded)) =
        tokio::time::timeout(Duration::from_millis(500), events.recv()).await
    {
        if let Recorded::WakeWord(response) = recorded {
            assert_eq!(response.name(), "WakeWordVerificationCompleted");
            saw_wake_word = true;
        }
    }
    assert!(saw_wake_word);

    dialog.close().await;
}

#[tokio::test]
async fn test_multi_group_variant_speaks_v2_namespace() {
    let gateway = MockGateway::spawn(GatewayBehavior::Normal).await;
    let client = SpeechClient::with_endpoint(gateway.url(), "test-token").unwrap();
    let (listener, mut events) = recorder(false);

    let config = DialogConfig {
        multi_group: true,
        ..DialogConfig::new("test-app")
    };
    let mut dialog = DialogAssistant::new(&client, config, listener).await.unwrap();
    dialog.start().await.unwrap();

    // The mock echoes the namespace it was addressed with.
    match tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .unwrap()
        .unwrap()
    {
        Recorded::Started(response) => {
            assert_eq!(response.header.namespace, "DialogAssistant.v2");
        }
        other => panic!("expected Started, got {other:?}"),
    }

    dialog.stop().await.unwrap();
    assert_eq!(dialog.state(), TaskState::Complete);
    dialog.close().await;
}
