/// Integration tests with a mocked upstream profile API
/// Exercises the fetch -> normalize -> compute pipeline without hitting a
/// real service, including envelope variants and failure handling.
use profile_progress_api::errors::AppError;
use profile_progress_api::models::ProfileRecord;
use profile_progress_api::profile_client::ProfileApiClient;
use profile_progress_api::progress::compute_progress;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(mock_server: &MockServer) -> ProfileApiClient {
    ProfileApiClient::new(mock_server.uri(), "test_token".to_string()).unwrap()
}

#[tokio::test]
async fn test_fetch_double_envelope_profile() {
    let mock_server = MockServer::start().await;

    let mock_response = serde_json::json!({
        "data": {
            "profile": {
                "bio": "hello",
                "nationality_id": 3,
                "height": 170,
                "photos": ["a.jpg"]
            }
        }
    });

    Mock::given(method("GET"))
        .and(path("/users/42/profile"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&mock_response))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let raw = client.fetch_profile("42").await.unwrap();

    let record = ProfileRecord::from_value(&raw);
    assert_eq!(record.get("nationality_id"), Some(&serde_json::json!(3)));

    let report = compute_progress(Some(&record), None);
    assert!(report.progress > 0);
}

#[tokio::test]
async fn test_fetch_bare_profile_matches_wrapped() {
    let mock_server = MockServer::start().await;

    let fields = serde_json::json!({"bio": "hi", "country_id": 2});

    Mock::given(method("GET"))
        .and(path("/users/1/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&fields))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/2/profile"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"profile": fields})),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let bare = ProfileRecord::from_value(&client.fetch_profile("1").await.unwrap());
    let wrapped = ProfileRecord::from_value(&client.fetch_profile("2").await.unwrap());

    assert_eq!(
        compute_progress(Some(&bare), None),
        compute_progress(Some(&wrapped), None)
    );
}

#[tokio::test]
async fn test_fetch_missing_user_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/missing/profile"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch_profile("missing").await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_fetch_upstream_error_surfaces() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/3/profile"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.fetch_profile("3").await;

    assert!(matches!(result, Err(AppError::UpstreamApiError(_))));
}

#[tokio::test]
async fn test_circuit_opens_after_consecutive_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/5/profile"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    for _ in 0..5 {
        assert!(client.fetch_profile("5").await.is_err());
    }

    // Circuit is now open; the next call fails fast without a request.
    let received_before = mock_server.received_requests().await.unwrap().len();
    let result = client.fetch_profile("5").await;
    let received_after = mock_server.received_requests().await.unwrap().len();

    assert!(matches!(result, Err(AppError::UpstreamApiError(_))));
    assert_eq!(received_before, received_after);
}

#[tokio::test]
async fn test_not_found_does_not_trip_circuit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/ghost/profile"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    for _ in 0..6 {
        assert!(matches!(
            client.fetch_profile("ghost").await,
            Err(AppError::NotFound(_))
        ));
    }
}
