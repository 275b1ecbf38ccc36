use crate::configuration::{ApplicationSettings, Settings};
use crate::routes::{auth, health_check, index};
use crate::utils::error_handlers;
use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, configuration.application)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

fn run(listener: TcpListener, settings: ApplicationSettings) -> Result<Server, anyhow::Error> {
    let login_payload_limit = settings.login_payload_limit;

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .send_wildcard()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(error_handlers())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .service(index::get)
            .service(health_check::get)
            .service(
                web::scope("/api/auth")
                    .app_data(web::PayloadConfig::new(login_payload_limit))
                    .service(auth::login::post),
            )
    })
    .listen(listener)?
    .run();
    Ok(server)
}
