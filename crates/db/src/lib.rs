//! Database bootstrap: SeaORM connection factory and the migration runner
//! that applies module-contributed DDL.

use std::time::Duration;

use anyhow::Context;
use bookclub_kernel::settings::DatabaseSettings;
use bookclub_kernel::Migration;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement,
    TransactionTrait,
};

const MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    module TEXT NOT NULL,
    id TEXT NOT NULL,
    applied_at TEXT NOT NULL,
    PRIMARY KEY (module, id)
)";

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Open a connection pool for the configured database.
///
/// In-memory SQLite databases live and die with a single connection, so the
/// pool is pinned to exactly one.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    if is_in_memory(&settings.url) {
        options.max_connections(1).min_connections(1);
    } else {
        options.max_connections(settings.max_connections.max(1));
    }

    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to database '{}'", settings.url))?;

    if db.get_database_backend() == DbBackend::Sqlite {
        db.execute_unprepared("PRAGMA foreign_keys = ON")
            .await
            .context("failed to enable sqlite foreign keys")?;
    }

    tracing::info!(target: "bookclub-db", url = %settings.url, "database connected");
    Ok(db)
}

async fn is_applied(db: &DatabaseConnection, module: &str, id: &str) -> anyhow::Result<bool> {
    let row = db
        .query_one(Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT 1 FROM schema_migrations WHERE module = ? AND id = ?",
            [module.into(), id.into()],
        ))
        .await
        .context("failed to read schema_migrations")?;
    Ok(row.is_some())
}

/// Apply every migration not yet recorded in `schema_migrations`.
///
/// Each migration runs in its own transaction together with its bookkeeping
/// row. Returns the number of migrations applied by this call.
pub async fn migrate(
    db: &DatabaseConnection,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    db.execute_unprepared(MIGRATIONS_TABLE)
        .await
        .context("failed to create schema_migrations")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        if is_applied(db, module, migration.id).await? {
            tracing::debug!(target: "bookclub-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        let txn = db.begin().await.context("failed to open migration transaction")?;
        for statement in migration
            .up
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            txn.execute_unprepared(statement).await.with_context(|| {
                format!("migration {module}/{} failed on: {statement}", migration.id)
            })?;
        }
        txn.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO schema_migrations (module, id, applied_at) VALUES (?, ?, ?)",
            [
                module.as_str().into(),
                migration.id.into(),
                chrono::Utc::now().to_rfc3339().into(),
            ],
        ))
        .await
        .context("failed to record migration")?;
        txn.commit().await.context("failed to commit migration")?;

        tracing::info!(target: "bookclub-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
