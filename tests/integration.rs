use base64::Engine as _;
use pic_bot::{
    art::{ImageGenerationService, ManualClock, PollSettings, YandexArtClient},
    bot::{Command, Controller, Event, Input, MockTransport, Sent},
    config::{Config, YANDEX_API_TOKEN},
    state::{ConversationState, StateStore},
    Error,
};
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::{ChatId, UserId};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER: UserId = UserId(1001);
const CHAT: ChatId = ChatId(1001);

fn encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn art_client(server: &MockServer, clock: &ManualClock) -> YandexArtClient {
    YandexArtClient::new(
        "test-token".to_string(),
        "art://b1gtest/yandex-art/latest".to_string(),
        PollSettings::default(),
    )
    .with_base_url(server.uri())
    .with_clock(Arc::new(clock.clone()))
}

async fn mount_submit(server: &MockServer, request_id: &str) {
    Mock::given(method("POST"))
        .and(path("/foundationModels/v1/imageGenerationAsync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": request_id,
            "done": false
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_pending(server: &MockServer, request_id: &str, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(format!("/operations/{}", request_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": request_id,
            "done": false
        })));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

async fn mount_done(server: &MockServer, request_id: &str, image: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/operations/{}", request_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": request_id,
            "done": true,
            "response": { "image": encode(image), "modelVersion": "test" }
        })))
        .mount(server)
        .await;
}

async fn status_polls(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count()
}

#[tokio::test]
async fn test_full_conversation_delivers_image_and_cleans_up() {
    let server = MockServer::start().await;
    mount_submit(&server, "abc123").await;
    mount_pending(&server, "abc123", Some(2)).await;
    mount_done(&server, "abc123", b"PNGDATA").await;

    let clock = ManualClock::new();
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let controller = Controller::new(
        Box::new(art_client(&server, &clock)),
        Box::new(transport.clone()),
        StateStore::new(),
        dir.path().to_path_buf(),
    );

    controller
        .handle(Event {
            user: USER,
            chat: CHAT,
            input: Input::Command(Command::Pic),
        })
        .await
        .unwrap();
    assert_eq!(
        controller.states().get(USER),
        ConversationState::AwaitingDescription
    );

    controller
        .handle(Event {
            user: USER,
            chat: CHAT,
            input: Input::Text("a red fox in the snow".to_string()),
        })
        .await
        .unwrap();

    let expected_path = dir.path().join("image_abc123.jpeg");
    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    match &sent[2] {
        Sent::Photo {
            chat,
            path,
            caption,
            contents,
        } => {
            assert_eq!(*chat, CHAT);
            assert_eq!(path, &expected_path);
            assert!(caption.starts_with("Вот ваше изображение! (Seed: "));
            assert_eq!(contents.as_deref(), Some(&b"PNGDATA"[..]));
        }
        other => panic!("expected photo, got {:?}", other),
    }

    assert_eq!(status_polls(&server).await, 3);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(5); 2]);
    assert!(!expected_path.exists());
    assert_eq!(controller.states().get(USER), ConversationState::Idle);
}

#[tokio::test]
async fn test_timeout_reports_and_leaves_no_file() {
    let server = MockServer::start().await;
    mount_submit(&server, "never").await;
    mount_pending(&server, "never", None).await;

    let clock = ManualClock::new();
    let dir = tempfile::tempdir().unwrap();
    let transport = MockTransport::new();
    let controller = Controller::new(
        Box::new(art_client(&server, &clock)),
        Box::new(transport.clone()),
        StateStore::new(),
        dir.path().to_path_buf(),
    );

    controller.on_pic_command(USER, CHAT).await.unwrap();
    controller.on_text_message(USER, CHAT, "a slow painting").await;

    assert_eq!(
        transport.sent().last(),
        Some(&Sent::Text(
            CHAT,
            "Превышено время ожидания результата".to_string()
        ))
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(controller.states().get(USER), ConversationState::Idle);
}

#[tokio::test]
async fn test_generate_returns_exact_decoded_payload() {
    let payloads: [&[u8]; 3] = [
        b"PNGDATA",
        &[0x00, 0xFF, 0x10, 0x80, 0x7F],
        &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46],
    ];

    for (i, payload) in payloads.iter().enumerate() {
        let server = MockServer::start().await;
        let request_id = format!("op-{}", i);
        mount_submit(&server, &request_id).await;
        mount_done(&server, &request_id, payload).await;

        let clock = ManualClock::new();
        let image = art_client(&server, &clock)
            .generate("payload check")
            .await
            .unwrap();
        assert_eq!(image.bytes, payload.to_vec());
        assert_eq!(image.request_id, request_id);
    }
}

#[tokio::test]
async fn test_done_without_image_is_missing_image() {
    let server = MockServer::start().await;
    mount_submit(&server, "blank").await;
    Mock::given(method("GET"))
        .and(path("/operations/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "blank",
            "done": true
        })))
        .mount(&server)
        .await;

    let clock = ManualClock::new();
    let err = art_client(&server, &clock)
        .generate("nothing")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingImage(_)));
}

#[test]
fn test_missing_api_token_fails_before_startup() {
    let err = Config::from_lookup(|name| match name {
        "TELEGRAM_BOT_TOKEN" => Some("123:abc".to_string()),
        "YANDEX_CATALOG_ID" => Some("b1gtest".to_string()),
        _ => None,
    })
    .unwrap_err();

    assert!(matches!(err, Error::Config(msg) if msg.contains(YANDEX_API_TOKEN)));
}
