use crate::helpers::{spawn_app, spawn_app_with};
use tickets_api::utils::{ResponseErrorMessage, ResponseMessage};

const PLACEHOLDER: &str = "Login endpoint - to be implemented";

#[tokio::test]
async fn post_login_acknowledges_credentials_with_the_placeholder() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let login_body = serde_json::json!({
        "email": "test@test.com",
        "password": "test123"
    });
    let response = app.post_login(&login_body).await;

    // Assert
    assert_eq!(200, response.status().as_u16());

    let response_body: ResponseMessage = response.json().await.unwrap();
    assert_eq!(PLACEHOLDER, response_body.message);
}

#[tokio::test]
async fn post_login_returns_the_placeholder_for_any_input() {
    // Arrange
    let app = spawn_app().await;
    let test_cases = vec![
        (r#"{"email": "test@test.com""#, "application/json", "truncated JSON"),
        ("not json at all", "application/json", "plain text as JSON"),
        ("", "application/json", "empty body"),
        ("[1, 2, 3]", "application/json", "JSON array"),
        (r#"{"email": 42}"#, "application/json", "wrongly typed field"),
        ("email=a%40b.com&password=x", "application/x-www-form-urlencoded", "form body"),
    ];

    for (body, content_type, description) in test_cases {
        // Act
        let response = app.post_login_raw(body, content_type).await;

        // Assert
        assert_eq!(
            200,
            response.status().as_u16(),
            "The API did not return a 200 OK when the payload was {}.",
            description
        );
        let response_body: ResponseMessage = response.json().await.unwrap();
        assert_eq!(PLACEHOLDER, response_body.message);
    }
}

#[tokio::test]
async fn post_login_returns_a_500_when_the_body_cannot_be_read() {
    // Arrange
    let app = spawn_app_with(|c| c.application.login_payload_limit = 32).await;

    // Act
    let response = app
        .post_login(&serde_json::json!({
            "email": "test@test.com",
            "password": "a-password-well-beyond-the-configured-limit"
        }))
        .await;

    // Assert
    assert_eq!(500, response.status().as_u16());

    let response_body: ResponseErrorMessage = response.json().await.unwrap();
    assert_eq!("Internal server error", response_body.error);
}
