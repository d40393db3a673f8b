//! Tests for the HTTP identity directory client, against a wiremock server.

mod common;

use common::init_test_logging;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ursa_api_roles::error::RolesApiError;
use ursa_api_roles::services::identity_resolver::{HttpIdentityDirectory, IdentityDirectory};

fn client(server: &MockServer) -> HttpIdentityDirectory {
    HttpIdentityDirectory::with_http_client(server.uri(), reqwest::Client::new())
}

#[tokio::test]
async fn lookup_returns_matches_and_sends_bearer_token() {
    init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users/lookup"))
        .and(query_param("loginId", "a1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": [{ "userLoginId": "uid-1" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let matches = client(&server)
        .lookup_by_login_id("test-token", "a1")
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].user_login_id, "uid-1");
}

#[tokio::test]
async fn lookup_with_no_match_returns_empty() {
    init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users/lookup"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": [] })),
        )
        .mount(&server)
        .await;

    let matches = client(&server)
        .lookup_by_login_id("test-token", "ghost")
        .await
        .unwrap();

    assert!(matches.is_empty());
}

#[tokio::test]
async fn lookup_tolerates_missing_result_field() {
    init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let matches = client(&server)
        .lookup_by_login_id("test-token", "a1")
        .await
        .unwrap();

    assert!(matches.is_empty());
}

#[tokio::test]
async fn lookup_maps_server_error_to_directory_error() {
    init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users/lookup"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server)
        .lookup_by_login_id("test-token", "a1")
        .await
        .unwrap_err();

    assert!(matches!(err, RolesApiError::IdentityDirectory(_)));
}
