use crate::helpers::spawn_app;
use serde_json::json;
use tickets_api::function_url::{FunctionUrlRequest, LocalForwarder};
use tickets_api::routes::index::ServiceBanner;
use tickets_api::utils::ResponseMessage;

fn function_url_event(method: &str, path: &str, body: Option<&str>) -> FunctionUrlRequest {
    serde_json::from_value(json!({
        "version": "2.0",
        "routeKey": "$default",
        "rawPath": path,
        "rawQueryString": "",
        "headers": {
            "content-type": "application/json",
            "host": "abc123.lambda-url.sa-east-1.on.aws",
            "origin": "https://tickets.example.com"
        },
        "requestContext": {"http": {"method": method, "path": path}},
        "body": body,
        "isBase64Encoded": false
    }))
    .unwrap()
}

#[tokio::test]
async fn login_events_reach_the_login_route() {
    // Arrange
    let app = spawn_app().await;
    let forwarder = LocalForwarder::new(app.address.clone()).unwrap();
    let event = function_url_event(
        "POST",
        "/api/auth/login",
        Some(r#"{"email":"test@test.com","password":"test123"}"#),
    );

    // Act
    let response = forwarder.forward(event).await.unwrap();

    // Assert
    assert_eq!(200, response.status_code);
    assert!(!response.is_base64_encoded);
    let message: ResponseMessage = serde_json::from_str(&response.body).unwrap();
    assert_eq!("Login endpoint - to be implemented", message.message);
    assert_eq!(
        Some("*"),
        response
            .headers
            .get("access-control-allow-origin")
            .map(String::as_str)
    );
}

#[tokio::test]
async fn index_events_return_the_service_banner() {
    // Arrange
    let app = spawn_app().await;
    let forwarder = LocalForwarder::new(app.address.clone()).unwrap();

    // Act
    let response = forwarder
        .forward(function_url_event("GET", "/", None))
        .await
        .unwrap();

    // Assert
    assert_eq!(200, response.status_code);
    let banner: ServiceBanner = serde_json::from_str(&response.body).unwrap();
    assert_eq!("Tickets App Backend API", banner.message);
}

#[tokio::test]
async fn unknown_routes_keep_their_status() {
    // Arrange
    let app = spawn_app().await;
    let forwarder = LocalForwarder::new(app.address.clone()).unwrap();

    // Act
    let response = forwarder
        .forward(function_url_event("GET", "/missing", None))
        .await
        .unwrap();

    // Assert
    assert_eq!(404, response.status_code);
}

#[tokio::test]
async fn an_unreachable_application_is_an_error() {
    // Arrange
    let forwarder = LocalForwarder::new("http://127.0.0.1:1").unwrap();

    // Act
    let outcome = forwarder
        .forward(function_url_event("GET", "/", None))
        .await;

    // Assert
    assert!(outcome.is_err());
}
