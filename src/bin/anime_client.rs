//! Walks the full create / read / update / delete cycle against a running service.

use anime_service::client::AnimeClient;
use clap::Parser;
use std::error::Error;

#[derive(Parser, Debug)]
#[command(name = "anime-client", about = "Exercise the anime endpoints over HTTP")]
struct Args {
    #[arg(long, env = "ANIME_BASE_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Must hold ROLE_ADMIN for the final delete to succeed
    #[arg(long, env = "ANIME_USERNAME")]
    username: String,

    #[arg(long, env = "ANIME_PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long, default_value = "Samurai")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anime_client=info".into()),
        )
        .init();

    let args = Args::parse();
    let client = AnimeClient::new(&args.base_url, &args.username, &args.password);

    let all = client.list_all().await?;
    tracing::info!(count = all.len(), "listed all anime");

    let mut saved = client.save(&args.name).await?;
    tracing::info!(id = saved.id, name = %saved.name, "created");

    let found = client.find_by_id(saved.id).await?;
    tracing::info!(?found, "fetched by id");

    saved.name = format!("{} 2", args.name);
    client.replace(&saved).await?;
    tracing::info!(id = saved.id, name = %saved.name, "replaced");

    let page = client.list_page(0, 5, Some("name,desc")).await?;
    tracing::info!(total = page.total_elements, pages = page.total_pages, "first page");

    client.delete(saved.id).await?;
    tracing::info!(id = saved.id, "deleted");

    Ok(())
}
