use laundry::{configuration::Settings, startup::Application, telemetry::{get_subscriber, init_subscriber}};

#[actix_web::main]
async fn main() -> anyhow::Result<()>{
    let subscriber = get_subscriber("laundry".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = Settings::try_get()?;

    let application = Application::new(config).await?;
    tracing::info!(host = %application.host, port = application.port, "Starting server");
    application.run_until_stopped().await?;
    Ok(())
}
