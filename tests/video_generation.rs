//! Mock-upstream tests for the generative AI client: the video
//! submit → poll → download workflow plus the single-shot text/image calls.

use std::time::{Duration, Instant};

use genai_social_proxy::config::DEFAULT_VIDEO_MODEL;
use genai_social_proxy::{AppError, GenAiClient, GenerationRequest};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-key";
const OPERATION: &str = "models/veo/operations/op-1";
const INTERVAL: Duration = Duration::from_millis(50);

fn client(server: &MockServer, max_polls: Option<u32>) -> GenAiClient {
    GenAiClient::new(server.uri(), Some(KEY.to_string())).with_poll_policy(INTERVAL, max_polls)
}

fn submit_path() -> String {
    format!("/v1beta/models/{}:predictLongRunning", DEFAULT_VIDEO_MODEL)
}

fn pending() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"name": OPERATION, "done": false}))
}

fn finished(server: &MockServer) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "name": OPERATION,
        "done": true,
        "response": {"generateVideoResponse": {"generatedSamples": [
            {"video": {"uri": format!("{}/files/video-1:download?alt=media", server.uri())}}
        ]}}
    }))
}

async fn mount_download(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/files/video-1:download"))
        .and(query_param("alt", "media"))
        .and(query_param("key", KEY))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "video/mp4")
                .set_body_bytes(b"fake-mp4".to_vec()),
        )
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn polls_until_done_then_downloads() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(submit_path()))
        .and(header("x-goog-api-key", KEY))
        .respond_with(pending())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1beta/{}", OPERATION)))
        .respond_with(pending())
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1beta/{}", OPERATION)))
        .respond_with(finished(&server))
        .expect(1)
        .mount(&server)
        .await;
    mount_download(&server, 1).await;

    let started = Instant::now();
    let video = client(&server, Some(10))
        .generate_video(&GenerationRequest::new("a lighthouse at dusk"))
        .await
        .unwrap();

    assert!(started.elapsed() >= INTERVAL * 2);
    assert_eq!(video.mime_type(), "video/mp4");
    assert_eq!(video.into_bytes(), b"fake-mp4".to_vec());
}

#[tokio::test]
async fn seed_image_is_sent_and_finished_submission_skips_polling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(submit_path()))
        .and(body_json(json!({
            "instances": [{
                "prompt": "animate this",
                "image": {"bytesBase64Encoded": "aGk=", "mimeType": "image/png"}
            }],
            "parameters": {"sampleCount": 1}
        })))
        .respond_with(finished(&server))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1beta/{}", OPERATION)))
        .respond_with(pending())
        .expect(0)
        .mount(&server)
        .await;
    mount_download(&server, 1).await;

    let request = GenerationRequest::new("animate this").with_seed_image(b"hi".to_vec(), "image/png");
    let video = client(&server, Some(10)).generate_video(&request).await.unwrap();
    assert_eq!(video.len(), 8);
}

#[tokio::test]
async fn done_without_link_is_incomplete_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(submit_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": OPERATION,
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": []}}
        })))
        .mount(&server)
        .await;
    mount_download(&server, 0).await;

    let err = client(&server, Some(10))
        .generate_video(&GenerationRequest::new("empty"))
        .await
        .unwrap_err();
    match err {
        AppError::IncompleteResult(message) => assert_eq!(message, "no download link"),
        other => panic!("expected IncompleteResult, got {:?}", other),
    }
}

#[tokio::test]
async fn poll_bound_exceeded_is_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(submit_path()))
        .respond_with(pending())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1beta/{}", OPERATION)))
        .respond_with(pending())
        .expect(2)
        .mount(&server)
        .await;

    let err = client(&server, Some(2))
        .generate_video(&GenerationRequest::new("slow"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Timeout { polls: 2, .. }), "got {:?}", err);
}

#[tokio::test]
async fn failed_operation_surfaces_upstream_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(submit_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": OPERATION,
            "done": true,
            "error": {"code": 3, "message": "prompt blocked by safety filters"}
        })))
        .mount(&server)
        .await;
    mount_download(&server, 0).await;

    let err = client(&server, Some(10))
        .generate_video(&GenerationRequest::new("blocked"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Upstream { .. }));
    assert_eq!(err.to_string(), "prompt blocked by safety filters");
}

#[tokio::test]
async fn download_failure_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(submit_path()))
        .respond_with(finished(&server))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/video-1:download"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, Some(10))
        .generate_video(&GenerationRequest::new("forbidden"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "download failed: 403 Forbidden");
}

#[tokio::test]
async fn submission_rejection_uses_upstream_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(submit_path()))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": {"code": 400, "message": "API key not valid."}})),
        )
        .mount(&server)
        .await;

    let err = client(&server, Some(10))
        .generate_video(&GenerationRequest::new("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Upstream { status: Some(400), .. }));
    assert_eq!(err.to_string(), "API key not valid.");
}

#[tokio::test]
async fn empty_prompt_is_rejected_without_calls() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, Some(10))
        .generate_video(&GenerationRequest::new("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn generate_text_returns_joined_parts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", KEY))
        .and(body_json(json!({"contents": [{"parts": [{"text": "Write a haiku"}]}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Old pond, "}, {"text": "frog jumps in"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server, None).generate_text("Write a haiku").await.unwrap();
    assert_eq!(text, "Old pond, frog jumps in");
}

#[tokio::test]
async fn generate_text_with_no_candidates_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let err = client(&server, None).generate_text("anything").await.unwrap_err();
    assert!(matches!(err, AppError::IncompleteResult(_)));
}

#[tokio::test]
async fn generate_image_returns_data_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash-image:generateContent"))
        .and(body_json(json!({
            "contents": [{"parts": [{"text": "a red fox"}]}],
            "generationConfig": {"responseModalities": ["IMAGE"]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [
                {"text": "Here you go"},
                {"inlineData": {"mimeType": "image/png", "data": "aGk="}}
            ]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let image = client(&server, None).generate_image("a red fox").await.unwrap();
    assert_eq!(image, "data:image/png;base64,aGk=");
}
