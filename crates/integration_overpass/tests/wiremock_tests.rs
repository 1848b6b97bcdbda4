//! Integration tests for the Overpass client (wiremock-based)

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use integration_overpass::{HttpOverpassClient, OverpassClient, OverpassConfig, OverpassError};

fn config_for_mock(base_url: &str) -> OverpassConfig {
    OverpassConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..OverpassConfig::default()
    }
}

const fn sample_elements_json() -> &'static str {
    r#"{
        "version": 0.6,
        "generator": "Overpass API",
        "elements": [
            {
                "type": "node",
                "id": 245009012,
                "lat": 9.9658,
                "lon": 76.2421,
                "tags": { "highway": "bus_stop", "name": "Kaloor", "route_ref": "12;14A" }
            },
            {
                "type": "node",
                "id": 245009013,
                "lat": 9.9671,
                "lon": 76.2897,
                "tags": { "highway": "bus_stop", "name": "Vyttila Hub" }
            }
        ]
    }"#
}

fn many_elements_json(count: usize) -> String {
    let elements: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{ "type": "node", "id": {i}, "lat": 9.93, "lon": 76.26, "tags": {{ "highway": "bus_stop" }} }}"#
            )
        })
        .collect();
    format!(r#"{{ "elements": [{}] }}"#, elements.join(","))
}

#[tokio::test]
async fn test_find_bus_stops_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/interpreter"))
        .and(header("content-type", "text/plain"))
        .and(body_string_contains(
            r#"node["highway"="bus_stop"](around:2000,9.9312,76.2673); out 30;"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(sample_elements_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpOverpassClient::new(&config_for_mock(&server.uri())).unwrap();
    let nodes = client
        .find_bus_stops(9.9312, 76.2673, 2000, 30)
        .await
        .unwrap();

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].id, 245_009_012);
    assert_eq!(nodes[0].name(), Some("Kaloor"));
    assert_eq!(nodes[0].route_refs(), vec!["12", "14A"]);
    assert_eq!(nodes[1].name(), Some("Vyttila Hub"));
}

#[tokio::test]
async fn test_find_bus_stops_passes_through_oversized_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_string(many_elements_json(45)))
        .mount(&server)
        .await;

    let client = HttpOverpassClient::new(&config_for_mock(&server.uri())).unwrap();
    let nodes = client
        .find_bus_stops(9.9312, 76.2673, 2000, 30)
        .await
        .unwrap();

    // Capping is the caller's job; the client reports what the server sent
    assert_eq!(nodes.len(), 45);
}

#[tokio::test]
async fn test_find_bus_stops_drops_missing_coordinates() {
    let server = MockServer::start().await;

    let body = r#"{
        "elements": [
            { "type": "node", "id": 1, "tags": { "name": "Nowhere" } },
            { "type": "node", "id": 2, "lat": 9.95, "lon": 76.27 }
        ]
    }"#;

    Mock::given(method("POST"))
        .and(path("/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = HttpOverpassClient::new(&config_for_mock(&server.uri())).unwrap();
    let nodes = client
        .find_bus_stops(9.9312, 76.2673, 2000, 30)
        .await
        .unwrap();

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].id, 2);
}

#[tokio::test]
async fn test_find_bus_stops_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/interpreter"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let client = HttpOverpassClient::new(&config_for_mock(&server.uri())).unwrap();
    let err = client
        .find_bus_stops(9.9312, 76.2673, 2000, 30)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OverpassError::RateLimitExceeded {
            retry_after_secs: Some(30)
        }
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_find_bus_stops_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/interpreter"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = HttpOverpassClient::new(&config_for_mock(&server.uri())).unwrap();
    let err = client
        .find_bus_stops(9.9312, 76.2673, 2000, 30)
        .await
        .unwrap_err();

    assert!(matches!(err, OverpassError::RequestFailed(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_find_bus_stops_gateway_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/interpreter"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;

    let client = HttpOverpassClient::new(&config_for_mock(&server.uri())).unwrap();
    let err = client
        .find_bus_stops(9.9312, 76.2673, 2000, 30)
        .await
        .unwrap_err();

    assert!(matches!(err, OverpassError::ServiceUnavailable(_)));
}

#[tokio::test]
async fn test_find_bus_stops_malformed_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let client = HttpOverpassClient::new(&config_for_mock(&server.uri())).unwrap();
    let err = client
        .find_bus_stops(9.9312, 76.2673, 2000, 30)
        .await
        .unwrap_err();

    assert!(matches!(err, OverpassError::ParseError(_)));
}

#[tokio::test]
async fn test_is_healthy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Connected as: 1"))
        .mount(&server)
        .await;

    let client = HttpOverpassClient::new(&config_for_mock(&server.uri())).unwrap();
    assert!(client.is_healthy().await);
}

#[tokio::test]
async fn test_is_unhealthy_when_unreachable() {
    // Nothing listens on port 9 on a test machine
    let client = HttpOverpassClient::new(&config_for_mock("http://127.0.0.1:9")).unwrap();
    assert!(!client.is_healthy().await);
}
