use anyhow::Context;
use oneanddone::{api, config::Config, db::init_db, CsvSeasonFeed, Repository, Season, SystemClock};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;
    let port = config.port;
    let standings_mode = config.standings_mode;

    let pool = init_db(&config.database_path)
        .await
        .with_context(|| format!("Failed to initialize database at {}", config.database_path))?;

    let repo = Arc::new(Repository::new(pool));
    let season = Season::new(repo.clone(), Arc::new(SystemClock), standings_mode);

    if let Some(files) = &config.season_files {
        let feed = CsvSeasonFeed::new(&files.events, &files.candidates);
        let report = season
            .sync(&feed)
            .await
            .context("Failed to load season files")?;
        tracing::info!(
            events_new = report.events_new,
            candidates = report.candidates_upserted,
            "Season files loaded"
        );
    }

    let app = api::create_router(api::AppState::new(season, repo, config));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(%standings_mode, "Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
