use crate::authentication::{self, CronSecret};
use crate::configuration::{Configuration, NewsletterSettings, RotationSettings};
use crate::ghost_client::GhostClient;
use crate::routes::{cron_routes, health_check};
use actix_web::dev::Server;
use actix_web::{App, HttpServer, middleware, web};
use anyhow::Context;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: Configuration) -> Result<Self, anyhow::Error> {
        let ghost_client = config.ghost.client()?;
        let cron_secret = CronSecret(config.application.cron_secret().cloned());

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)
            .with_context(|| "Failed to bind TCP listener for application")?;
        let port = listener
            .local_addr()
            .with_context(|| "Failed to read local address of TCP listener")?
            .port();
        let server = run(
            listener,
            ghost_client,
            config.rotation,
            config.newsletter,
            cron_secret,
        )
        .context("Failed to run Actix web server")?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        self.server.await.context("Server stopped with an error")
    }
}

fn run(
    tcp_listener: TcpListener,
    ghost_client: GhostClient,
    rotation: RotationSettings,
    newsletter: NewsletterSettings,
    cron_secret: CronSecret,
) -> Result<Server, anyhow::Error> {
    let ghost_client = web::Data::new(ghost_client);
    let rotation = web::Data::new(rotation);
    let newsletter = web::Data::new(newsletter);
    let cron_secret = web::Data::new(cron_secret);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(configure_routes)
            // one reqwest pool shared by every worker
            .app_data(ghost_client.clone())
            .app_data(rotation.clone())
            .app_data(newsletter.clone())
            .app_data(cron_secret.clone())
    })
    .listen(tcp_listener)
    .with_context(|| "Failed to bind Actix server to TCP listener")?
    .run();

    Ok(server)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health_check", web::get().to(health_check))
        .service(
            web::scope("/api")
                .wrap(middleware::from_fn(
                    authentication::reject_unauthorized_cron_calls,
                ))
                .configure(cron_routes),
        );
}
