use actix_web::{HttpResponse, route};

/// Liveness probe for the load balancer and the Lambda readiness check.
#[route("/health_check", method = "GET", method = "HEAD")]
pub async fn get() -> HttpResponse {
    HttpResponse::Ok().finish()
}
