use anyhow::Context;
use bookclub_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load book-club settings")?;
    bookclub_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookclub-app starting"
    );

    bookclub_app::app::serve(&settings).await
}
