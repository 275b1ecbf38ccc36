//! Bridge between Lambda function URL events and the HTTP application.
//!
//! Inside Lambda the actix server listens on loopback and every invocation is
//! replayed against it as a plain HTTP request.
use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Recomputed by the HTTP client or meaningless once the payload is buffered.
const SKIPPED_REQUEST_HEADERS: [&str; 3] = ["host", "content-length", "connection"];
const SKIPPED_RESPONSE_HEADERS: [&str; 3] = ["content-length", "connection", "transfer-encoding"];

/// Payload format 2.0 event delivered by a function URL.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FunctionUrlRequest {
    #[serde(default = "root_path")]
    pub raw_path: String,
    #[serde(default)]
    pub raw_query_string: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub cookies: Vec<String>,
    pub request_context: RequestContext,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RequestContext {
    pub http: HttpDescription,
}

#[derive(Deserialize, Debug, Clone)]
pub struct HttpDescription {
    pub method: String,
}

fn root_path() -> String {
    "/".into()
}

impl FunctionUrlRequest {
    pub fn method(&self) -> &str {
        &self.request_context.http.method
    }

    /// The same path and query, rooted at `base_url`.
    pub fn target_url(&self, base_url: &str) -> String {
        let base_url = base_url.trim_end_matches('/');
        if self.raw_query_string.is_empty() {
            format!("{}{}", base_url, self.raw_path)
        } else {
            format!("{}{}?{}", base_url, self.raw_path, self.raw_query_string)
        }
    }

    pub fn decoded_body(&self) -> Result<Vec<u8>, anyhow::Error> {
        match &self.body {
            None => Ok(Vec::new()),
            Some(body) if self.is_base64_encoded => STANDARD
                .decode(body)
                .context("Request body is not valid base64"),
            Some(body) => Ok(body.clone().into_bytes()),
        }
    }
}

/// Response shape a function URL turns back into an HTTP response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionUrlResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cookies: Vec<String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl FunctionUrlResponse {
    async fn read(response: reqwest::Response) -> Result<Self, anyhow::Error> {
        let status_code = response.status().as_u16();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        let mut cookies = Vec::new();
        for (name, value) in response.headers() {
            let name = name.as_str();
            if SKIPPED_RESPONSE_HEADERS.contains(&name) {
                continue;
            }
            let Ok(value) = value.to_str() else {
                tracing::warn!(header = name, "Dropping non-ASCII response header");
                continue;
            };
            if name == "set-cookie" {
                cookies.push(value.to_string());
                continue;
            }
            headers
                .entry(name.to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read the application response")?;
        let (body, is_base64_encoded) = match String::from_utf8(bytes.to_vec()) {
            Ok(text) => (text, false),
            Err(_) => (STANDARD.encode(&bytes), true),
        };

        Ok(Self {
            status_code,
            headers,
            cookies,
            body,
            is_base64_encoded,
        })
    }
}

/// Replays function URL events against an application listening on `base_url`.
#[derive(Debug, Clone)]
pub struct LocalForwarder {
    client: reqwest::Client,
    base_url: String,
}

impl LocalForwarder {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    #[tracing::instrument(
        name = "Forwarding function URL request",
        skip(self, request),
        fields(method = %request.method(), path = %request.raw_path)
    )]
    pub async fn forward(
        &self,
        request: FunctionUrlRequest,
    ) -> Result<FunctionUrlResponse, anyhow::Error> {
        let method = reqwest::Method::from_bytes(request.method().as_bytes())
            .with_context(|| format!("{} is not a valid HTTP method", request.method()))?;
        let body = request.decoded_body()?;

        let mut builder = self
            .client
            .request(method, request.target_url(&self.base_url));
        for (name, value) in &request.headers {
            if SKIPPED_REQUEST_HEADERS.contains(&name.to_lowercase().as_str()) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.cookies.is_empty() {
            builder = builder.header(reqwest::header::COOKIE, request.cookies.join("; "));
        }

        let response = builder
            .body(body)
            .send()
            .await
            .context("Failed to reach the application")?;
        FunctionUrlResponse::read(response).await
    }
}
