use anyhow::Context;
use bookclub_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookclub", version, about = "Book-club service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve HTTP until interrupted
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Load settings and print the non-secret values as JSON
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load book-club settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            bookclub_telemetry::init(&settings.telemetry)?;
            bookclub_app::app::serve(&settings).await
        }
        Command::Migrate => {
            bookclub_telemetry::init(&settings.telemetry)?;
            let applied = bookclub_app::app::migrate(&settings).await?;
            tracing::info!(applied, "migrations complete");
            Ok(())
        }
        Command::CheckConfig => {
            println!("{}", serde_json::to_string_pretty(&redacted(&settings))?);
            Ok(())
        }
    }
}

/// Settings without the signing secret.
fn redacted(settings: &Settings) -> serde_json::Value {
    serde_json::json!({
        "environment": settings.environment,
        "server": {
            "host": settings.server.host,
            "port": settings.server.port,
            "request_timeout_ms": settings.server.request_timeout_ms,
        },
        "database": {
            "url": settings.database.url,
            "max_connections": settings.database.max_connections,
        },
        "telemetry": {
            "log_format": settings.telemetry.log_format,
            "filter": settings.telemetry.filter,
        },
        "auth": {
            "token_ttl_minutes": settings.auth.token_ttl_minutes,
            "jwt_secret_configured": settings.auth.jwt_secret != bookclub_kernel::settings::DEV_JWT_SECRET,
            "password_hash": {
                "memory_kib": settings.auth.password_hash.memory_kib,
                "iterations": settings.auth.password_hash.iterations,
                "parallelism": settings.auth.password_hash.parallelism,
            },
        },
    })
}
