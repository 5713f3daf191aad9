use ghostcron::configuration::get_config;
use ghostcron::startup::Application;
use ghostcron::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("ghostcron".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber)?;

    let config = get_config()?;
    let application = Application::build(config).await?;
    tracing::info!(port = application.port(), "Cron handlers listening");
    application.run_until_stopped().await
}
