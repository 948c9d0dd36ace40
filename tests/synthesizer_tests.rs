//! End-to-end synthesis flow: non-blocking start, pushed audio frames,
//! explicit completion wait.

mod mock_gateway;

use mock_gateway::{GatewayBehavior, MockGateway, Recorded, recorder};
use speechlink::{SpeechClient, SpeechSynthesizer, SynthesizerConfig, TaskState};
use std::time::Duration;

#[tokio::test]
async fn test_synthesis_streams_audio_then_completes() {
    let gateway = MockGateway::spawn(GatewayBehavior::Normal).await;
    let client = SpeechClient::with_endpoint(gateway.url(), "test-token").unwrap();
    let (listener, mut events) = recorder(false);

    let config = SynthesizerConfig {
        voice: Some("aria".to_string()),
        ..SynthesizerConfig::new("test-app")
    };
    let mut synthesizer = SpeechSynthesizer::new(&client, config, listener).await.unwrap();

    synthesizer.start("hello out there").await.unwrap();
    // start does not block for confirmation; completion is awaited explicitly.
    synthesizer
        .wait_for_complete(Some(Duration::from_secs(10)))
        .await
        .unwrap();
    assert_eq!(synthesizer.state(), TaskState::Complete);

    let mut audio_bytes = 0usize;
    let mut completed = false;
    while let Ok(Some(recorded)) =
        tokio::time::timeout(Duration::from_millis(500), events.recv()).await
    {
        match recorded {
            Recorded::Binary(len) => audio_bytes += len,
            Recorded::Completed(response) => {
                assert_eq!(response.name(), "SynthesisCompleted");
                completed = true;
            }
            Recorded::Started(_) | Recorded::Event(_) => {}
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(audio_bytes, 3 * 1024);
    assert!(completed);

    synthesizer.close().await;
}

#[tokio::test]
async fn test_bounded_wait_expires_silently_without_events() {
    // A gateway that never answers: the bounded wait comes back quietly,
    // not as an error.
    let gateway = MockGateway::spawn(GatewayBehavior::Silent).await;
    let client = SpeechClient::with_endpoint(gateway.url(), "test-token").unwrap();
    let (listener, _events) = recorder(false);

    let mut synthesizer =
        SpeechSynthesizer::new(&client, SynthesizerConfig::new("test-app"), listener)
            .await
            .unwrap();
    synthesizer.start("never finished").await.unwrap();

    let started = std::time::Instant::now();
    synthesizer
        .wait_for_complete(Some(Duration::from_millis(300)))
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_task_failure_surfaces_through_wait() {
    let gateway = MockGateway::spawn(GatewayBehavior::FailTasks).await;
    let client = SpeechClient::with_endpoint(gateway.url(), "test-token").unwrap();
    let (listener, _events) = recorder(false);

    let mut synthesizer =
        SpeechSynthesizer::new(&client, SynthesizerConfig::new("test-app"), listener)
            .await
            .unwrap();
    // start is non-blocking, so the rejection lands on the explicit wait.
    synthesizer.start("rejected").await.unwrap();

    let err = synthesizer
        .wait_for_complete(Some(Duration::from_secs(5)))
        .await
        .unwrap_err();
    assert!(matches!(err, speechlink::SpeechError::TaskFailed { .. }));
    assert_eq!(synthesizer.state(), TaskState::Fail);
}

#[tokio::test]
async fn test_wait_without_start_is_a_usage_error() {
    let gateway = MockGateway::spawn(GatewayBehavior::Normal).await;
    let client = SpeechClient::with_endpoint(gateway.url(), "test-token").unwrap();
    let (listener, _events) = recorder(false);

    let synthesizer =
        SpeechSynthesizer::new(&client, SynthesizerConfig::new("test-app"), listener)
            .await
            .unwrap();
    let result = synthesizer.wait_for_complete(Some(Duration::from_millis(100))).await;
    assert!(matches!(
        result,
        Err(speechlink::SpeechError::Configuration(_))
    ));
}
