use crate::domain::UserEmail;
use secrecy::Secret;
use serde::Deserialize;

/// Whatever a client sent to the login route, read leniently.
///
/// Missing fields are tolerated and unknown fields ignored; a body that is not
/// a JSON object yields no attempt at all rather than an error.
#[derive(Deserialize, Debug, Default)]
pub struct LoginAttempt {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<Secret<String>>,
}

impl LoginAttempt {
    pub fn from_body(body: &[u8]) -> Option<LoginAttempt> {
        serde_json::from_slice(body).ok()
    }

    /// The submitted email, if it is a syntactically valid address.
    pub fn email(&self) -> Option<UserEmail> {
        self.email
            .as_ref()
            .and_then(|email| UserEmail::parse(email.trim().to_string()).ok())
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}
