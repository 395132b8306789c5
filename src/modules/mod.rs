pub mod auth;
pub mod books;

use anyhow::Context;
use bookshelf_authz::Authenticator;
use bookshelf_kernel::{settings::Settings, ModuleRegistry};

/// Register every application module according to the auth mode.
///
/// With auth enabled the `auth` module serves `/login` and the book routes sit
/// behind the token gate; with auth disabled only the open book routes exist.
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let gate = if settings.auth.mode.is_enabled() {
        let authenticator = Authenticator::from_settings(&settings.auth)
            .context("invalid auth configuration")?;
        let tokens = authenticator.tokens().clone();
        registry.register(auth::create_module(authenticator))?;
        Some(tokens)
    } else {
        tracing::warn!("authentication disabled; book routes are open");
        None
    };

    registry.register(books::create_module(&settings.books, gate))?;
    Ok(())
}
