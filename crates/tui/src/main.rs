mod app;

use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use anyhow::{Context, Result};
use prepline_core::{
    config::{self, AppConfig},
    journal::FileLogSink,
    session::{Session, SessionLoader},
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let config_path = config::ensure_default_config()?;
    let config = AppConfig::load()?;
    info!(path = %config_path.display(), "configuration loaded");

    let loader = SessionLoader::new(&config.customers_path, &config.ingredients_path);
    let input = loader.load().await?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let engine = input.into_engine(&mut rng)?;
    let session = Session::new(engine, config.served_target);
    let sink = FileLogSink::new(&config.log_dir, config.log_format);
    info!(
        seed = ?config.seed,
        target = session.target(),
        log = %sink.path().display(),
        "session ready"
    );

    let mut app = app::PreplineApp::new(session, sink);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("prepline.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
