use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshelf_authz::TokenService;
use bookshelf_kernel::settings::{AuthMode, Settings};

#[derive(Parser)]
#[command(name = "bookshelf-cli", version, about = "Bookshelf service command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the bind port
        #[arg(long)]
        port: Option<u16>,

        /// Override the auth mode (enabled or disabled)
        #[arg(long)]
        auth: Option<AuthMode>,
    },

    /// Issue or inspect session tokens signed with the configured secret
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Print a freshly signed token
    Issue {
        #[arg(long, default_value = "admin")]
        username: String,
    },

    /// Print the claims of a token, failing if it is invalid or expired
    Verify { token: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Commands::Serve { host, port, auth } => serve(settings, host, port, auth),
        Commands::Token { action } => token(&settings, action),
    }
}

fn serve(
    mut settings: Settings,
    host: Option<String>,
    port: Option<u16>,
    auth: Option<AuthMode>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(auth) = auth {
        settings.auth.mode = auth;
    }

    bookshelf_telemetry::init(&settings.telemetry)?;
    tracing::info!(
        env = ?settings.environment,
        auth = ?settings.auth.mode,
        "bookshelf-cli serving"
    );

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(bookshelf_app::run(settings))
}

fn token(settings: &Settings, action: TokenAction) -> anyhow::Result<()> {
    let tokens = TokenService::from_settings(&settings.auth).context("invalid auth configuration")?;

    match action {
        TokenAction::Issue { username } => {
            let issued = tokens.issue(&username).context("failed to sign token")?;
            println!("{}", issued.token);
            eprintln!("expires at {}", issued.expires_at);
        }
        TokenAction::Verify { token } => {
            let claims = tokens.verify(&token).context("token rejected")?;
            println!(
                "{}",
                serde_json::json!({
                    "username": claims.username,
                    "issued_at": claims.iat,
                    "expires_at": claims.exp,
                })
            );
        }
    }

    Ok(())
}
