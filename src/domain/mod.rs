mod login_attempt;
mod user_email;

pub use login_attempt::LoginAttempt;
pub use user_email::UserEmail;
