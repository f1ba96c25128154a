use anime_service::{
    AppState,
    auth::hash_password,
    cli::{Cli, Commands},
    config::{AppConfig, Env},
    create_router,
    models::NewCustomUser,
    repository::{PostgresRepository, Repository, RepositoryState},
    security::parse_authorities,
};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use std::{error::Error, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration and logging, then dispatches the chosen subcommand.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load();

    init_tracing(&config);

    match cli.command() {
        Commands::Serve => serve(config).await,
        Commands::HashPassword { password } => {
            println!("{}", hash_password(&password)?);
            Ok(())
        }
        Commands::CreateUser {
            username,
            password,
            name,
            authorities,
        } => {
            if parse_authorities(&authorities).is_empty() {
                return Err(format!("no known role in authorities {authorities:?}").into());
            }
            let repo = connect(&config).await?;
            let user = repo
                .create_user(NewCustomUser {
                    username,
                    password_hash: hash_password(&password)?,
                    name,
                    authorities,
                })
                .await?;
            tracing::info!(id = user.id, username = %user.username, "user created");
            Ok(())
        }
    }
}

/// Pretty output locally, JSON in production. `RUST_LOG` overrides the default filter.
fn init_tracing(config: &AppConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "anime_service=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }
}

/// Opens the pool and applies the embedded migrations.
async fn connect(config: &AppConfig) -> Result<PostgresRepository, Box<dyn Error>> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database migrations applied");

    Ok(PostgresRepository::new(pool))
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn Error>> {
    tracing::info!("Application starting in {:?} mode", config.env);

    let repo = Arc::new(connect(&config).await?) as RepositoryState;
    let port = config.port;
    let app = create_router(AppState::new(repo, config));

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on 0.0.0.0:{port}");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:{port}/swagger-ui");

    axum::serve(listener, app).await?;
    Ok(())
}
