mod function_url;
mod health_check;
mod helpers;
mod index;
mod login;
