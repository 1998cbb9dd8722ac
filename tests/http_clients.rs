use moodsearch::llm::openai::{OpenAiClient, OpenAiConfig};
use moodsearch::llm::{CoordinateMapper, Embedder, MoodLabeler};
use moodsearch::storage::{ObjectSource, SupabaseStorage, list_all};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(OpenAiConfig::new("sk-test").base_url(server.uri()))
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
async fn embed_returns_first_vector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "text-embedding-ada-002", "input": "serene" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "index": 0, "embedding": [0.25, -0.5, 1.0] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedding = openai(&server).embed("serene").await.unwrap();
    assert_eq!(embedding, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn embed_without_data_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    assert!(openai(&server).embed("serene").await.is_err());
}

#[tokio::test]
async fn api_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limit exceeded"))
        .mount(&server)
        .await;

    let err = openai(&server).embed("serene").await.unwrap_err().to_string();
    assert!(err.contains("429"), "{err}");
    assert!(err.contains("rate limit exceeded"), "{err}");
}

#[tokio::test]
async fn label_image_sends_url_to_vision_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "gpt-4o", "max_tokens": 20 })))
        .respond_with(chat_reply("  Calm and peaceful.\n"))
        .expect(1)
        .mount(&server)
        .await;

    let mood = openai(&server).label_image("https://cdn.example.com/a.jpg").await.unwrap();
    assert_eq!(mood, "Calm and peaceful.");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    let content = &body["messages"][0]["content"];
    assert_eq!(content[0]["text"], "What is the mood of this image?");
    assert_eq!(content[1]["image_url"]["url"], "https://cdn.example.com/a.jpg");
}

#[tokio::test]
async fn map_mood_returns_raw_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "gpt-3.5-turbo", "temperature": 0.0 })))
        .respond_with(chat_reply(r#"{"x": 0.5, "y": -0.2}"#))
        .mount(&server)
        .await;

    let content = openai(&server).map_mood("melancholy").await.unwrap();
    assert_eq!(content, r#"{"x": 0.5, "y": -0.2}"#);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert!(body["messages"][0]["content"].as_str().unwrap().contains("\"melancholy\""));
}

#[tokio::test]
async fn supabase_list_skips_folders() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/list/Moods"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .and(body_partial_json(json!({ "limit": 3, "offset": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": ".emptyFolderPlaceholder", "id": "p" },
            { "name": "a.jpg", "id": "1" },
            { "name": "nested", "id": null },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/list/Moods"))
        .and(body_partial_json(json!({ "limit": 3, "offset": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "b.png", "id": "2" },
        ])))
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(&server.uri(), "service-key", "Moods").unwrap();
    let names = list_all(&storage, 3).await.unwrap();
    assert_eq!(names, vec!["a.jpg", "b.png"]);
    assert_eq!(
        storage.public_url("a.jpg").unwrap(),
        format!("{}/storage/v1/object/public/Moods/a.jpg", server.uri())
    );
}

#[tokio::test]
async fn supabase_list_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/list/Moods"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"Bucket not found"}"#))
        .mount(&server)
        .await;

    let storage = SupabaseStorage::new(&server.uri(), "service-key", "Moods").unwrap();
    let err = list_all(&storage, 100).await.unwrap_err();
    assert!(format!("{err:#}").contains("Bucket not found"));
}
