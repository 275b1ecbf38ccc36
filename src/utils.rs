use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Catch-all for server errors raised anywhere in the application: the
/// original error is logged and the body is replaced with an opaque message.
pub fn error_handlers<B: MessageBody + 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new().default_handler_server(render_internal_error)
}

fn render_internal_error<B>(
    res: ServiceResponse<B>,
) -> Result<ErrorHandlerResponse<B>, actix_web::Error> {
    match res.response().error() {
        Some(e) => tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            path = %res.request().path(),
            "Unhandled server error"
        ),
        None => tracing::error!(
            status = %res.status(),
            path = %res.request().path(),
            "Unhandled server error"
        ),
    }

    let status = res.status();
    let (req, _) = res.into_parts();
    let res = ServiceResponse::new(req, internal_error_response(status)).map_into_right_body();

    Ok(ErrorHandlerResponse::Response(res))
}

pub fn internal_error_response(status: StatusCode) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::json())
        .json(ResponseErrorMessage {
            error: INTERNAL_SERVER_ERROR.to_string(),
        })
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ResponseMessage {
    pub message: String,
}

impl From<&str> for ResponseMessage {
    fn from(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ResponseErrorMessage {
    pub error: String,
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;

    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::utils::{ResponseErrorMessage, error_handlers};
    use actix_web::error::ErrorInternalServerError;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    async fn failing_route() -> Result<HttpResponse, actix_web::Error> {
        Err(ErrorInternalServerError("database exploded: password=hunter2"))
    }

    async fn bad_gateway_route() -> HttpResponse {
        HttpResponse::BadGateway().body("upstream stack trace")
    }

    async fn missing_route() -> HttpResponse {
        HttpResponse::NotFound().body("nothing here")
    }

    #[actix_web::test]
    async fn server_errors_are_rendered_as_an_opaque_json_body() {
        let app = test::init_service(
            App::new()
                .wrap(error_handlers())
                .route("/boom", web::get().to(failing_route)),
        )
        .await;

        let request = test::TestRequest::get().uri("/boom").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ResponseErrorMessage = test::read_body_json(response).await;
        assert_eq!(body.error, "Internal server error");
    }

    #[actix_web::test]
    async fn non_500_server_errors_keep_their_status() {
        let app = test::init_service(
            App::new()
                .wrap(error_handlers())
                .route("/gateway", web::get().to(bad_gateway_route)),
        )
        .await;

        let request = test::TestRequest::get().uri("/gateway").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: ResponseErrorMessage = test::read_body_json(response).await;
        assert_eq!(body.error, "Internal server error");
    }

    #[actix_web::test]
    async fn client_errors_are_left_untouched() {
        let app = test::init_service(
            App::new()
                .wrap(error_handlers())
                .route("/missing", web::get().to(missing_route)),
        )
        .await;

        let request = test::TestRequest::get().uri("/missing").to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = test::read_body(response).await;
        assert_eq!(body, "nothing here");
    }
}
