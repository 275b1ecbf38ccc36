use crate::helpers::spawn_app;
use tickets_api::routes::index::ServiceBanner;

#[tokio::test]
async fn index_returns_the_service_banner() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get_index().await;

    // Assert
    assert_eq!(200, response.status().as_u16());

    let response_body: ServiceBanner = response.json().await.unwrap();
    assert_eq!("Tickets App Backend API", response_body.message);
    assert_eq!("1.0.0", response_body.version);
}

#[tokio::test]
async fn cross_origin_preflight_is_allowed_from_any_origin() {
    // Arrange
    let app = spawn_app().await;
    let origin = "https://tickets.example.com";

    // Act
    let response = app.preflight_login(origin).await;

    // Assert
    assert!(response.status().is_success());
    let allowed_origin = response
        .headers()
        .get(reqwest::header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .expect("Missing Access-Control-Allow-Origin header.")
        .to_str()
        .unwrap();
    assert_eq!("*", allowed_origin);
}

#[tokio::test]
async fn simple_cross_origin_requests_get_a_wildcard_origin() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .api_client
        .get(format!("{}/", &app.address))
        .header(reqwest::header::ORIGIN, "https://tickets.example.com")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        Some("*"),
        response
            .headers()
            .get(reqwest::header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok())
    );
}
