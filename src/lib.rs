//! Bookshelf application library
//!
//! Assembles the `auth` and `books` modules into a registry and serves them.

pub mod modules;

use anyhow::Context;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Build the module registry for the given settings
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings)?;
    Ok(registry)
}

/// Build the complete HTTP application without binding a socket
pub fn build_app(settings: &Settings) -> anyhow::Result<Router> {
    let registry = build_registry(settings)?;
    Ok(bookshelf_http::build_router(&registry, settings))
}

/// Run the service until a shutdown signal arrives
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("bookshelf bootstrap complete");

    let served =
        bookshelf_http::start_server(&registry, &settings, bookshelf_http::shutdown_signal()).await;

    registry
        .stop_all()
        .await
        .context("failed to stop modules")?;

    served
}
