pub mod configuration;
pub mod deployment;
pub mod domain;
pub mod function_url;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
