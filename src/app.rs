//! Application assembly: registry, database, authenticator and router.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookclub_authz::Authenticator;
use bookclub_http::Services;
use bookclub_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sea_orm::DatabaseConnection;

use crate::modules;

/// A migrated database with every module initialized and started.
pub struct App {
    pub registry: ModuleRegistry,
    pub db: DatabaseConnection,
    pub auth: Arc<Authenticator>,
}

impl App {
    pub fn router(&self, settings: &Settings) -> Router {
        bookclub_http::build_router(
            &self.registry,
            settings,
            Services {
                db: self.db.clone(),
                auth: Arc::clone(&self.auth),
            },
        )
    }
}

pub fn build_registry() -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry)?;
    Ok(registry)
}

/// Connect, migrate, then run the module lifecycle up to `start`.
pub async fn prepare(settings: &Settings) -> anyhow::Result<App> {
    let registry = build_registry()?;
    let db = bookclub_db::connect(&settings.database).await?;

    let applied = bookclub_db::migrate(&db, &registry.collect_migrations()).await?;
    tracing::info!(applied, modules = registry.module_count(), "database ready");

    let auth = Authenticator::from_settings(&settings.auth)
        .context("failed to build authenticator")?;

    let ctx = InitCtx {
        settings,
        db: &db,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    Ok(App {
        registry,
        db,
        auth: Arc::new(auth),
    })
}

/// Apply pending migrations and return how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let registry = build_registry()?;
    let db = bookclub_db::connect(&settings.database).await?;
    let applied = bookclub_db::migrate(&db, &registry.collect_migrations()).await?;
    db.close().await.context("failed to close database")?;
    Ok(applied)
}

/// Run the HTTP server until a shutdown signal, then stop modules.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let app = prepare(settings).await?;
    let router = app.router(settings);

    bookclub_http::start_server(router, settings).await?;

    app.registry.stop_modules().await?;
    app.db.close().await.context("failed to close database")?;
    Ok(())
}
