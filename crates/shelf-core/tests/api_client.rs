//! Request pipeline: bearer handling and error mapping.

mod fixtures;

use fixtures::{FakeBookService, can_bind_localhost};
use serde_json::json;
use shelf_core::ApiError;
use shelf_core::api::queries::{self, BooksData, LoginUserData};
use shelf_core::api::{ApiClient, decode, operations};
use shelf_core::models::LoginUserInput;
use shelf_core::session::SessionStore;
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_request_carries_token_set_before_it_and_not_after_clear() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    let fake = FakeBookService::new();
    fake.add_user("u1", "ann");
    Mock::given(method("POST"))
        .respond_with(fake.clone())
        .mount(&server)
        .await;

    let session = SessionStore::in_memory();
    let client = ApiClient::new(server.uri(), session.clone());

    client
        .execute(operations::GET_BOOKS, json!({}))
        .await
        .unwrap();

    let login = queries::login_user(&LoginUserInput {
        username: "ann".into(),
        password: "secret".into(),
    });
    let data = client.execute(login.operation, login.variables).await.unwrap();
    let payload = decode::<LoginUserData>(&data).unwrap().payload;
    session.set_session(payload.user, payload.token);

    client
        .execute(operations::GET_BOOKS, json!({}))
        .await
        .unwrap();

    session.clear_session();
    client
        .execute(operations::GET_BOOKS, json!({}))
        .await
        .unwrap();

    let auth: Vec<_> = fake
        .requests_for("GetBooks")
        .into_iter()
        .map(|r| r.authorization)
        .collect();
    assert_eq!(
        auth,
        vec![None, Some("Bearer token-u1".to_string()), None]
    );
}

#[tokio::test]
async fn test_request_body_names_the_operation() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "operationName": "GetBook",
            "variables": { "id": "b1" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "book": null }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), SessionStore::in_memory());
    let query = queries::get_book("b1");
    let data = client.execute(query.operation, query.variables).await.unwrap();
    assert_eq!(data, json!({ "book": null }));
}

#[tokio::test]
async fn test_graphql_errors_surface_first_message() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [
                { "message": "Variable \"$input\" got invalid value" },
                { "message": "second" }
            ]
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), SessionStore::in_memory());
    let err = client
        .execute(operations::GET_BOOKS, json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Graphql { .. }));
    assert_eq!(err.to_string(), "Variable \"$input\" got invalid value");
}

#[tokio::test]
async fn test_http_failure_maps_to_status_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri(), SessionStore::in_memory());
    let err = client
        .execute(operations::GET_BOOKS, json!({}))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 502,
            body: "bad gateway".to_string()
        }
    );
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let client = ApiClient::new("http://127.0.0.1:9/graphql", SessionStore::in_memory());
    let err = client
        .execute(operations::GET_BOOKS, json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_decode_rejects_wrong_shape() {
    let err = decode::<BooksData>(&json!({ "books": [{ "id": 1 }] })).unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}
