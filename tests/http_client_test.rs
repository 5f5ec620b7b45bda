//! Integration tests for the HTTP client against a mock backend.
//!
//! Covers status classification, empty bodies, timeouts, bearer injection,
//! query merging and completion-queue delivery.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;
use tumba_client::api::{
    completion_queue, CommentEndpoint, MultipartForm, PostEndpoint, ProfileEndpoint, TagEndpoint,
};
use tumba_client::{CredentialStore, HttpClient, NetworkError, NoContent, Request, Session};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize)]
struct Thing {
    id: u64,
}

fn client_for(server: &MockServer) -> Arc<HttpClient> {
    let session = Arc::new(Session::new(CredentialStore::in_memory(), "com.tumba.tests"));
    Arc::new(HttpClient::new(&server.uri(), session).with_logging(false))
}

#[tokio::test]
async fn not_found_is_resource_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/7"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "Not Found"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .execute::<Thing>(&Request::get(PostEndpoint::Show { id: 7 }))
        .await;
    assert!(matches!(result, Err(NetworkError::ResourceNotFound)));
}

#[tokio::test]
async fn unauthorized_is_authentication_required() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.execute::<Thing>(&Request::get(ProfileEndpoint::Me)).await;
    assert!(matches!(result, Err(NetworkError::AuthenticationRequired)));
}

#[tokio::test]
async fn server_error_keeps_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tags"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(serde_json::json!({"errors": ["Name is taken"]})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .execute::<Thing>(&Request::get(TagEndpoint::List))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    match err {
        NetworkError::ServerError { message, body, .. } => {
            assert!(message.contains("Name is taken"));
            assert!(body.is_some());
        }
        other => panic!("expected ServerError, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_success_body_is_empty_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.execute::<Thing>(&Request::get(PostEndpoint::List)).await;
    assert!(matches!(result, Err(NetworkError::EmptyData)));

    let void = client.execute::<NoContent>(&Request::get(PostEndpoint::List)).await;
    assert!(void.is_ok());
}

#[tokio::test]
async fn slow_response_is_a_transport_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": 1}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = Request::get(PostEndpoint::List).timeout(Duration::from_millis(200));
    let err = client.execute::<Thing>(&request).await.unwrap_err();
    assert!(matches!(err, NetworkError::Transport(_)));
    assert!(err.is_timeout());
}

#[tokio::test]
async fn stored_token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/profile"))
        .and(header("Authorization", "Bearer secret-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 5})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.session().store_token("secret-token");
    let thing: Thing = client.execute(&Request::get(ProfileEndpoint::Me)).await.unwrap();
    assert_eq!(thing.id, 5);
}

#[tokio::test]
async fn route_query_merges_with_caller_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/comments"))
        .and(query_param("post_id", "9"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = Request::get(CommentEndpoint::List { post_id: 9 }).query("page", "2");
    let thing: Thing = client.execute(&request).await.unwrap();
    assert_eq!(thing.id, 1);
}

#[tokio::test]
async fn dispatched_results_arrive_through_the_completion_queue() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 3})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts/4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (handle, mut queue) = completion_queue();
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let ok_seen = Arc::clone(&seen);
    let first = client.dispatch::<Thing, _>(
        Request::get(PostEndpoint::Show { id: 3 }),
        &handle,
        move |result| ok_seen.lock().unwrap().push(format!("ok {}", result.unwrap().id)),
    );
    let err_seen = Arc::clone(&seen);
    let second = client.dispatch::<Thing, _>(
        Request::get(PostEndpoint::Show { id: 4 }),
        &handle,
        move |result| {
            let missing = matches!(result, Err(NetworkError::ResourceNotFound));
            err_seen.lock().unwrap().push(format!("missing {missing}"));
        },
    );
    first.await.unwrap();
    second.await.unwrap();

    // Nothing runs until the queue is drained.
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(queue.drain(), 2);

    let mut seen = seen.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec!["missing true".to_string(), "ok 3".to_string()]);
}

#[tokio::test]
async fn caller_headers_win_over_route_headers_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 1})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.session().store_token("stored");
    let request = Request::get(PostEndpoint::List)
        .header("AUTHORIZATION", "Bearer override")
        .header("ACCEPT", "text/plain");
    client.execute::<Thing>(&request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let headers = &received[0].headers;
    let auth: Vec<_> = headers.get_all("authorization").iter().collect();
    assert_eq!(auth.len(), 1);
    assert_eq!(auth[0], "Bearer override");
    assert_eq!(headers.get("accept").unwrap(), "text/plain");
}

#[tokio::test]
async fn text_only_multipart_has_exactly_its_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 2})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let form = MultipartForm::new()
        .text("post[title]", "A")
        .text("post[public]", "true");
    client
        .execute::<Thing>(&Request::post(PostEndpoint::List).multipart(form))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let content_type = received[0].headers.get("content-type").unwrap().to_str().unwrap();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();
    let body = String::from_utf8(received[0].body.clone()).unwrap();

    assert_eq!(body.matches("Content-Disposition: form-data; name=\"").count(), 2);
    assert!(body.contains("name=\"post[title]\"\r\n\r\nA\r\n"));
    assert!(body.contains("name=\"post[public]\"\r\n\r\ntrue\r\n"));
    assert!(body.find("post[public]").unwrap() < body.find("post[title]").unwrap());
    assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    assert!(!body.contains("image/jpeg"));
}

#[tokio::test]
async fn multipart_field_names_cannot_break_out_of_their_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uploads"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 3})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let form = MultipartForm::new().text("evil\"\r\nname", "x");
    client
        .execute::<Thing>(&Request::post(PostEndpoint::Uploads).multipart(form))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8(received[0].body.clone()).unwrap();
    assert_eq!(body.matches("Content-Disposition: form-data;").count(), 1);
    assert!(!body.contains("name=\"evil\""));
    assert!(!body.contains("evil\"\r\n"));
}

#[test]
fn dispatch_on_starts_requests_from_outside_the_runtime() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts/8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 8})))
            .mount(&server)
            .await;
        server
    });

    let client = client_for(&server);
    let (handle, mut queue) = completion_queue();
    let seen: Arc<Mutex<Option<u64>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let task = client.dispatch_on::<Thing, _>(
        runtime.handle(),
        Request::get(PostEndpoint::Show { id: 8 }),
        &handle,
        move |result| *sink.lock().unwrap() = result.ok().map(|thing| thing.id),
    );
    runtime.block_on(task).unwrap();

    assert_eq!(queue.drain(), 1);
    assert_eq!(*seen.lock().unwrap(), Some(8));
}
