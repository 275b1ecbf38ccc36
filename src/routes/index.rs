use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get};
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "Tickets App Backend API";
pub const SERVICE_VERSION: &str = "1.0.0";

#[derive(Serialize, Deserialize, Debug)]
pub struct ServiceBanner {
    pub message: String,
    pub version: String,
}

#[get("/")]
pub async fn get() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::json())
        .json(ServiceBanner {
            message: SERVICE_NAME.to_string(),
            version: SERVICE_VERSION.to_string(),
        })
}
