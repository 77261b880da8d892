use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use db::DBService;
use server::{AppState, app, config::Config};
use services::services::{
    auth::AuthService,
    database_validator::DatabaseValidator,
    mailer::{Mailer, SmtpMailer},
    uploads::optimize_directory,
};
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "portfolio-cms", version, about = "Portfolio site content server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API and serve the public site (default).
    Serve,
    /// Write a WebP copy next to every JPEG/PNG in the upload directory.
    OptimizeImages {
        /// Directory to scan; defaults to the configured upload directory.
        #[arg(long, env = "UPLOAD_DIR")]
        dir: Option<PathBuf>,
    },
    /// Set a new password for an admin account without knowing the old one.
    ResetAdminPassword {
        #[arg(long, default_value = "admin")]
        username: String,
        #[arg(long, env = "ADMIN_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Failed to load .env: {e}");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("invalid configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::OptimizeImages { dir } => {
            optimize_images(dir.unwrap_or_else(|| config.upload_dir.clone())).await
        }
        Command::ResetAdminPassword { username, password } => {
            reset_admin_password(&config, &username, &password).await
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let db = DBService::connect(config.database_backend, &config.database_url)
        .await
        .context("failed to open database")?;

    let validation = DatabaseValidator::new(&db).validate().await?;
    if validation.is_ok() {
        info!("{}", validation.summary());
    } else {
        warn!("{}", validation.summary());
    }

    AuthService::ensure_admin(
        &db.pool,
        &config.admin_username,
        &config.admin_password_hash,
    )
    .await?;

    let mailer: Option<Arc<dyn Mailer>> = match &config.smtp {
        Some(settings) => {
            let mailer = SmtpMailer::new(settings).context("invalid SMTP settings")?;
            info!(host = %settings.host, port = settings.port, "SMTP mailer configured");
            Some(Arc::new(mailer))
        }
        None => None,
    };

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("failed to create {}", config.upload_dir.display()))?;

    let address = config.bind_address();
    let state = AppState::new(config, db, mailer)?;

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server listening on http://{address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn reset_admin_password(
    config: &Config,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let db = DBService::connect(config.database_backend, &config.database_url)
        .await
        .context("failed to open database")?;
    let auth = AuthService::new(
        &config.jwt_secret,
        chrono::Duration::hours(config.jwt_ttl_hours),
        config.bcrypt_cost,
    );
    auth.reset_password(&db.pool, username, password)
        .await
        .with_context(|| format!("failed to reset password for {username}"))?;
    println!("Password updated for {username}");
    Ok(())
}

async fn optimize_images(dir: PathBuf) -> anyhow::Result<()> {
    info!(dir = %dir.display(), "Optimizing images");
    let optimized = optimize_directory(&dir).await?;

    if optimized.is_empty() {
        println!("No images to optimize in {}", dir.display());
        return Ok(());
    }

    let mut original_total = 0;
    let mut optimized_total = 0;
    for image in &optimized {
        original_total += image.original_bytes;
        optimized_total += image.optimized_bytes;
        println!(
            "{} -> {} ({} KB -> {} KB, {:.1}% saved)",
            image.source.display(),
            image.output.display(),
            image.original_bytes / 1024,
            image.optimized_bytes / 1024,
            image.savings_percent(),
        );
    }
    println!(
        "Optimized {} images: {} KB -> {} KB",
        optimized.len(),
        original_total / 1024,
        optimized_total / 1024,
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
