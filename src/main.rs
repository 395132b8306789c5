use anyhow::Context;
use bookshelf_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        auth = ?settings.auth.mode,
        address = %settings.bind_address(),
        "bookshelf bootstrap starting"
    );

    bookshelf_app::run(settings).await
}
