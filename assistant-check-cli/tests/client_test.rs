use assistant_check::api::{ApiError, AssistantClient};
use assistant_check::config::{ApiConfig, Config};
use mockito::Matcher;
use serde_json::json;
use tokio::net::TcpListener;

fn config_for(base_url: String) -> Config {
    Config {
        api: ApiConfig {
            base_url,
            timeout_seconds: 5,
            ..ApiConfig::default()
        },
        ..Config::default()
    }
}

/// Accepts connections and never answers, so every request hits the timeout
async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    url
}

#[tokio::test]
async fn test_send_posts_single_user_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/admin-assistant")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "messages": [{"role": "user", "content": "Hola"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "¡Hola! Soy tu asistente del gimnasio."}"#)
        .create_async()
        .await;

    let client = AssistantClient::new(&config_for(server.url())).unwrap();
    let exchange = client.send("Hola").await.unwrap();

    mock.assert_async().await;
    assert_eq!(exchange.status.as_u16(), 200);
    assert_eq!(
        exchange.response.message.as_deref(),
        Some("¡Hola! Soy tu asistente del gimnasio.")
    );
    assert!(exchange.response.tool_results.is_none());
}

#[tokio::test]
async fn test_send_parses_tool_results() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/admin-assistant")
        .with_status(200)
        .with_body(
            json!({
                "toolResults": {
                    "call_1": {"success": true, "members": [{"name": "Said"}], "count": 1}
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = AssistantClient::new(&config_for(server.url())).unwrap();
    let exchange = client.send("Lista todos los socios").await.unwrap();

    let tools = exchange.response.tool_results.unwrap();
    assert_eq!(tools["call_1"]["members"][0]["name"], json!("Said"));
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/admin-assistant")
        .with_status(500)
        .with_body(r#"{"error": "Error del asistente"}"#)
        .create_async()
        .await;

    let client = AssistantClient::new(&config_for(server.url())).unwrap();
    let err = client.send("Hola").await.unwrap_err();

    assert!(matches!(err, ApiError::Status { .. }));
    assert!(!err.is_rate_limited());
    assert!(err.to_string().starts_with("HTTP 500:"));
    assert!(err.to_string().contains("Error del asistente"));
}

#[tokio::test]
async fn test_too_many_requests_is_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/admin-assistant")
        .with_status(429)
        .with_body("Too Many Requests")
        .create_async()
        .await;

    let client = AssistantClient::new(&config_for(server.url())).unwrap();
    let err = client.send("Lista las rutinas disponibles").await.unwrap_err();

    assert!(matches!(err, ApiError::RateLimited { .. }));
    assert_eq!(err.status().map(|s| s.as_u16()), Some(429));
}

#[tokio::test]
async fn test_non_json_body_is_invalid() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/admin-assistant")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = AssistantClient::new(&config_for(server.url())).unwrap();
    let err = client.send("Hola").await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidBody(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Nothing listens on the discard port
    let client = AssistantClient::new(&config_for("http://127.0.0.1:9".to_string())).unwrap();
    let err = client.send("Hola").await.unwrap_err();

    assert!(matches!(err, ApiError::NetworkError(_) | ApiError::Timeout(_)));
    assert!(!err.is_rate_limited());
}

#[tokio::test]
async fn test_silent_server_is_timeout() {
    let mut config = config_for(silent_server().await);
    config.api.timeout_seconds = 1;

    let client = AssistantClient::new(&config).unwrap();
    let started = std::time::Instant::now();
    let err = client.send("Hola").await.unwrap_err();

    assert!(matches!(err, ApiError::Timeout(1)));
    assert_eq!(err.to_string(), "Request timed out after 1 seconds");
    assert!(err.status().is_none());
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}

#[tokio::test]
async fn test_structured_error_field_still_parses() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/admin-assistant")
        .with_status(200)
        .with_body(
            json!({
                "error": {"message": "Rate limit reached for gpt-4o", "code": "rate_limit_exceeded"},
                "toolResults": []
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = AssistantClient::new(&config_for(server.url())).unwrap();
    let exchange = client.send("Lista las rutinas disponibles").await.unwrap();

    assert!(exchange.response.tool_results.is_none());
    assert!(exchange
        .response
        .error_text()
        .unwrap()
        .contains("rate_limit_exceeded"));
}

#[tokio::test]
async fn test_send_raw_keeps_any_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/admin-assistant")
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let client = AssistantClient::new(&config_for(server.url())).unwrap();
    let (status, body) = client.send_raw("Hola").await.unwrap();

    assert_eq!(status.as_u16(), 503);
    assert_eq!(body, json!("upstream unavailable"));
}
